// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Extrator de idioma: só a tag primária do primeiro idioma do Accept-Language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .first() // Pega o primeiro idioma (ex: "es-MX")
            .map(|tag_string| {
                // "es-MX" -> split vira ["es", "MX"] -> next() pega "es"
                let primary = tag_string.split('-').next().unwrap_or(tag_string);
                Locale(primary.to_lowercase())
            })
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_primary_subtag_of_the_preferred_language() {
        assert_eq!(Locale::from_header("es-MX,es;q=0.9,en;q=0.8").0, "es");
        assert_eq!(Locale::from_header("pt-BR").0, "pt");
        assert_eq!(Locale::from_header("").0, "en");
    }
}
