// src/common/patch.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Campo de um payload PATCH.
///
/// `Missing` quando a chave não veio no JSON, `Null` quando veio como `null`
/// e `Value` quando veio com um valor. Use sempre com `#[serde(default)]`,
/// senão a ausência da chave vira erro de desserialização.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Para colunas NOT NULL: só o valor interessa (`Null` já foi barrado na validação).
    pub fn into_value(self) -> Option<T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Para colunas anuláveis: `None` = não mexer, `Some(None)` = limpar.
    pub fn into_nullable(self) -> Option<Option<T>> {
        match self {
            Patch::Missing => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Só chegamos aqui se a chave existe; a ausência cai no Default.
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

// O validator registra o valor do campo no erro, então precisa serializar.
impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => v.serialize(serializer),
            Patch::Missing | Patch::Null => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{Validate, ValidationError};

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[serde(default)]
        #[validate(custom(function = "short_phone"))]
        telefono: Patch<String>,
    }

    fn short_phone(value: &Patch<String>) -> Result<(), ValidationError> {
        match value {
            Patch::Value(v) if v.len() > 15 => Err(ValidationError::new("too_long")),
            _ => Ok(()),
        }
    }

    #[test]
    fn distinguishes_missing_null_and_value() {
        let missing: Payload = serde_json::from_str("{}").unwrap();
        assert!(missing.telefono.is_missing());

        let null: Payload = serde_json::from_str(r#"{"telefono": null}"#).unwrap();
        assert!(null.telefono.is_null());

        let value: Payload = serde_json::from_str(r#"{"telefono": "555-0101"}"#).unwrap();
        assert_eq!(value.telefono.as_value().map(String::as_str), Some("555-0101"));
    }

    #[test]
    fn nullable_conversion_keeps_the_clear_intent() {
        assert_eq!(Patch::<String>::Missing.into_nullable(), None);
        assert_eq!(Patch::<String>::Null.into_nullable(), Some(None));
        assert_eq!(
            Patch::Value("x".to_string()).into_nullable(),
            Some(Some("x".to_string()))
        );
        assert_eq!(Patch::<bool>::Null.into_value(), None);
    }

    #[test]
    fn custom_validation_failure_carries_the_value() {
        let payload: Payload =
            serde_json::from_str(r#"{"telefono": "1234567890123456"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let telefono = &field_errors["telefono"];
        assert_eq!(telefono[0].code, "too_long");
        assert_eq!(telefono[0].params["value"], serde_json::json!("1234567890123456"));
    }

    #[test]
    fn serializes_like_an_option() {
        assert_eq!(serde_json::to_value(Patch::Value(3)).unwrap(), serde_json::json!(3));
        assert!(serde_json::to_value(Patch::<i32>::Null).unwrap().is_null());
        assert!(serde_json::to_value(Patch::<i32>::Missing).unwrap().is_null());
    }
}
