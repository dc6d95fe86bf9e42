use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::error::Category;
use tracing::warn;

use crate::error::AppError;

pub const INVALID_FIELDS: &str = "Dados inválidos: verifique os tipos dos campos";

/// Parses a fully buffered request body. Well-formed JSON of the wrong shape
/// (e.g. a number where text is expected) is a validation error; anything that
/// is not JSON at all is an internal error.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    match serde_json::from_slice::<T>(body) {
        Ok(value) => Ok(value),
        Err(e) if e.classify() == Category::Data => {
            warn!(error = %e, "request body has unexpected field types");
            Err(AppError::validation(INVALID_FIELDS))
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context("parse request body as JSON")
            .into()),
    }
}

/// Lets `Option<Option<T>>` tell an absent field (`None`) from an explicit `null` (`Some(None)`).
pub fn present<'de, T, D>(de: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "present")]
        field: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let p: Patch = parse_body(br#"{}"#).unwrap();
        assert_eq!(p.field, None);
        let p: Patch = parse_body(br#"{"field": null}"#).unwrap();
        assert_eq!(p.field, Some(None));
        let p: Patch = parse_body(br#"{"field": "x"}"#).unwrap();
        assert_eq!(p.field, Some(Some("x".into())));
    }

    #[test]
    fn malformed_json_is_internal() {
        let err = parse_body::<Patch>(b"{not json").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        let err = parse_body::<Patch>(b"").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn wrong_field_types_are_validation_errors() {
        let err = parse_body::<Patch>(br#"{"field": 1}"#).unwrap_err();
        assert_eq!(err.to_string(), INVALID_FIELDS);
        let err = parse_body::<Patch>(br#""just text""#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
