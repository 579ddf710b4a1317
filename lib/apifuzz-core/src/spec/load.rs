//! Spec document loading: size-bounded reads, format detection, version detection.

use serde_json::Value;

use crate::error::FuzzError;

/// Maximum accepted spec document size (16 MiB), following the convention
/// other OpenAPI tooling in this space uses to keep a corrupt or hostile
/// spec file from exhausting memory during parsing.
pub const MAX_SPEC_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// The detected OpenAPI/Swagger document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// Swagger 2.0 (top-level `swagger` key).
    Swagger2,
    /// OpenAPI 3.x (top-level `openapi` key, major version 3).
    OpenApi3,
}

/// Parses a spec document from its raw text, auto-detecting JSON vs YAML by
/// content: JSON documents begin (after whitespace) with `{`.
///
/// # Errors
///
/// Returns [`FuzzError::JsonError`] / `FuzzError::YamlError` if the text is
/// not valid JSON/YAML, or [`FuzzError::SpecTooLarge`] if `text` exceeds
/// [`MAX_SPEC_FILE_SIZE`].
pub fn parse_spec_document(text: &str) -> Result<Value, FuzzError> {
    if text.len() as u64 > MAX_SPEC_FILE_SIZE {
        return Err(FuzzError::SpecTooLarge {
            size: text.len() as u64,
            max: MAX_SPEC_FILE_SIZE,
        });
    }

    let trimmed = text.trim_start();
    if trimmed.starts_with('{') {
        let value = serde_json::from_str(text)?;
        Ok(value)
    } else {
        parse_yaml(text)
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml(text: &str) -> Result<Value, FuzzError> {
    serde_saphyr::from_str(text).map_err(|error| FuzzError::YamlError {
        message: error.to_string(),
    })
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(text: &str) -> Result<Value, FuzzError> {
    // Without the `yaml` feature, fall back to strict JSON parsing so the
    // error at least points at the real problem instead of panicking.
    let value = serde_json::from_str(text)?;
    Ok(value)
}

/// Detects the spec version from its top-level keys.
///
/// Presence of `swagger` wins over `openapi` if both are somehow present
/// (mirrors the prototype's `if 'swagger' in spec elif 'openapi' in spec`).
///
/// # Errors
///
/// Returns [`FuzzError::UnknownSpecVersion`] if neither key is present, or
/// `openapi`'s value is not a string starting with `"3"`.
pub fn detect_version(document: &Value) -> Result<SpecVersion, FuzzError> {
    let Some(object) = document.as_object() else {
        return Err(FuzzError::UnknownSpecVersion { keys: Vec::new() });
    };

    if object.contains_key("swagger") {
        return Ok(SpecVersion::Swagger2);
    }

    if let Some(version) = object.get("openapi").and_then(Value::as_str) {
        if version.split('.').next() == Some("3") {
            return Ok(SpecVersion::OpenApi3);
        }
    }

    Err(FuzzError::UnknownSpecVersion {
        keys: object.keys().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_swagger2() {
        let doc = serde_json::json!({"swagger": "2.0", "paths": {}});
        assert_eq!(detect_version(&doc).unwrap(), SpecVersion::Swagger2);
    }

    #[test]
    fn test_detect_openapi3() {
        let doc = serde_json::json!({"openapi": "3.0.1", "paths": {}});
        assert_eq!(detect_version(&doc).unwrap(), SpecVersion::OpenApi3);
    }

    #[test]
    fn test_detect_unknown_version() {
        let doc = serde_json::json!({"foo": "bar"});
        let error = detect_version(&doc).unwrap_err();
        assert!(matches!(error, FuzzError::UnknownSpecVersion { .. }));
    }

    #[test]
    fn test_detect_openapi_4_is_unknown() {
        let doc = serde_json::json!({"openapi": "4.0.0"});
        assert!(detect_version(&doc).is_err());
    }

    #[test]
    fn test_parse_json_document() {
        let value = parse_spec_document(r#"{"openapi": "3.0.0"}"#).unwrap();
        assert_eq!(value["openapi"], "3.0.0");
    }

    #[test]
    fn test_spec_too_large_is_rejected() {
        let huge = "{".to_string() + &"a".repeat(MAX_SPEC_FILE_SIZE as usize + 1);
        let error = parse_spec_document(&huge).unwrap_err();
        assert!(matches!(error, FuzzError::SpecTooLarge { .. }));
    }

    #[test]
    fn test_swagger_key_wins_over_openapi_key() {
        let doc = serde_json::json!({"swagger": "2.0", "openapi": "3.0.0"});
        assert_eq!(detect_version(&doc).unwrap(), SpecVersion::Swagger2);
    }
}
