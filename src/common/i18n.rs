// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LANG: &str = "en";

// Os catálogos vão embutidos no binário; não dependemos do diretório de execução.
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("es", include_str!("../../locales/es.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens traduzidas, indexadas por idioma e depois por chave.
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens inválido: locales/{}.json", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Procura no idioma pedido, depois em inglês; sem tradução devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.translate(lang, key), |msg, (name, value)| {
            msg.replace(&format!("{{{}}}", name), value)
        })
    }

    pub fn has_key(&self, lang: &str, key: &str) -> bool {
        self.lookup(lang, key).is_some()
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_has_the_english_keys() {
        let store = I18nStore::load().unwrap();
        let english = &store.catalogs[DEFAULT_LANG];
        for (lang, _) in CATALOGS {
            for key in english.keys() {
                assert!(store.has_key(lang, key), "{} sem a chave {}", lang, key);
            }
        }
    }

    #[test]
    fn falls_back_to_english_then_to_the_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("fr", "errors.link_not_found"), "Link not found");
        assert_eq!(store.translate("es", "errors.link_not_found"), "Vínculo no encontrado");
        assert_eq!(store.translate("es", "errors.nao_existe"), "errors.nao_existe");
    }

    #[test]
    fn substitutes_placeholders() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate_with(
            "en",
            "errors.forbidden",
            &[("permission", "read:sucursales")],
        );
        assert_eq!(msg, "You need the 'read:sucursales' permission to perform this action.");
    }
}
