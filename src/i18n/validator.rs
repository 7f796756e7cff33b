//! Translation payload validation.
//!
//! Two jobs live here: schema checks for payloads coming off disk or the wire
//! (is this really a flat translation map?), and an audit comparing one
//! language's keys against the fallback language's keys.

use crate::error::SchemaError;
use crate::i18n::document::{FlatTranslations, LanguageBundle};
use crate::i18n::manifest::Manifest;
use crate::i18n::registry::is_valid_language_code;
use serde_json::Value;

/// Validation report containing errors and warnings about a translation set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys the reference language has and this language lacks
    pub errors: Vec<String>,

    /// Non-critical findings (extra keys, empty values)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation payloads.
pub struct TranslationValidator;

impl TranslationValidator {
    /// Accept `value` only if it is an object whose values are all leaves.
    pub fn validate_namespace(value: Value) -> Result<FlatTranslations, SchemaError> {
        let Value::Object(map) = value else {
            return Err(SchemaError::NotAnObject(json_kind(&value)));
        };

        let mut flat = FlatTranslations::new();
        for (key, entry) in map {
            if entry.is_object() {
                return Err(SchemaError::NestedObject(key));
            }
            flat.insert(key, entry);
        }
        Ok(flat)
    }

    /// Accept `value` only if it is an object of flat namespace objects.
    pub fn validate_bundle(value: Value) -> Result<LanguageBundle, SchemaError> {
        let Value::Object(map) = value else {
            return Err(SchemaError::NotAnObject(json_kind(&value)));
        };

        let mut bundle = LanguageBundle::new();
        for (namespace, entry) in map {
            let flat = Self::validate_namespace(entry).map_err(|e| {
                SchemaError::InvalidNamespace {
                    namespace: namespace.clone(),
                    reason: e.to_string(),
                }
            })?;
            bundle.insert(namespace, flat);
        }
        Ok(bundle)
    }

    /// Parse a manifest and check that its language codes are usable.
    pub fn validate_manifest(value: Value) -> Result<Manifest, SchemaError> {
        let manifest: Manifest = serde_json::from_value(value)
            .map_err(|e| SchemaError::InvalidManifest(e.to_string()))?;

        if manifest.languages.is_empty() {
            return Err(SchemaError::InvalidManifest(
                "manifest lists no languages".to_string(),
            ));
        }
        if let Some(bad) = manifest
            .languages
            .iter()
            .find(|code| !is_valid_language_code(code))
        {
            return Err(SchemaError::InvalidManifest(format!(
                "invalid language code '{}'",
                bad
            )));
        }
        Ok(manifest)
    }

    /// Compare a language's flat keys against the reference (fallback) language.
    ///
    /// Missing keys are errors, keys the reference does not have are warnings,
    /// and empty string values are warnings.
    pub fn compare(reference: &FlatTranslations, candidate: &FlatTranslations) -> ValidationReport {
        let mut report = ValidationReport::new();

        for key in reference.keys() {
            if !candidate.contains_key(key) {
                report.errors.push(format!("Missing key: {}", key));
            }
        }

        for (key, value) in candidate {
            if !reference.contains_key(key) {
                report.warnings.push(format!("Extra key: {}", key));
            }
            if value.as_str().is_some_and(|s| s.trim().is_empty()) {
                report.warnings.push(format!("Empty value: {}", key));
            }
        }

        report
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(value: Value) -> FlatTranslations {
        TranslationValidator::validate_namespace(value).unwrap()
    }

    // ==================== Namespace Schema Tests ====================

    #[test]
    fn test_validate_namespace_accepts_flat_strings() {
        let result = flat(json!({"validation.required": "Required", "validation.email": "Bad email"}));
        assert_eq!(result.len(), 2);
        assert_eq!(result["validation.required"], "Required");
    }

    #[test]
    fn test_validate_namespace_accepts_opaque_leaves() {
        let result = flat(json!({"products.tiers": ["basic", "gold"], "products.count": 2}));
        assert_eq!(result["products.tiers"], json!(["basic", "gold"]));
    }

    #[test]
    fn test_validate_namespace_rejects_nested_object() {
        let err = TranslationValidator::validate_namespace(json!({"a": {"b": "c"}})).unwrap_err();
        assert_eq!(err, SchemaError::NestedObject("a".to_string()));
    }

    #[test]
    fn test_validate_namespace_rejects_non_object() {
        let err = TranslationValidator::validate_namespace(json!(["a"])).unwrap_err();
        assert_eq!(err, SchemaError::NotAnObject("an array"));
    }

    #[test]
    fn test_validate_bundle_names_bad_namespace() {
        let err = TranslationValidator::validate_bundle(json!({
            "common": {"common.ok": "OK"},
            "documents": "not an object"
        }))
        .unwrap_err();

        match err {
            SchemaError::InvalidNamespace { namespace, .. } => assert_eq!(namespace, "documents"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    // ==================== Manifest Schema Tests ====================

    #[test]
    fn test_validate_manifest_ok() {
        let manifest = TranslationValidator::validate_manifest(json!({
            "languages": ["en", "es"],
            "namespaces": ["common"],
            "version": "1.0.0",
            "lastModified": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(manifest.languages, vec!["en", "es"]);
    }

    #[test]
    fn test_validate_manifest_accepts_regional_tags() {
        let manifest = TranslationValidator::validate_manifest(json!({
            "languages": ["en", "es-419", "zh-Hant"],
            "namespaces": [],
            "version": "1.0.0",
            "lastModified": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(manifest.languages, vec!["en", "es-419", "zh-Hant"]);
    }

    #[test]
    fn test_validate_manifest_rejects_missing_fields() {
        let err = TranslationValidator::validate_manifest(json!({"languages": ["en"]})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidManifest(_)));
    }

    #[test]
    fn test_validate_manifest_rejects_bad_language_code() {
        let err = TranslationValidator::validate_manifest(json!({
            "languages": ["../../etc"],
            "namespaces": [],
            "version": "1.0.0",
            "lastModified": "2024-05-01T12:00:00Z"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid language code"));
    }

    // ==================== Audit Tests ====================

    #[test]
    fn test_compare_clean() {
        let en = flat(json!({"common.ok": "OK"}));
        let es = flat(json!({"common.ok": "Vale"}));
        assert!(TranslationValidator::compare(&en, &es).is_clean());
    }

    #[test]
    fn test_compare_missing_and_extra_keys() {
        let en = flat(json!({"common.ok": "OK", "common.cancel": "Cancel"}));
        let es = flat(json!({"common.ok": "Vale", "common.extra": ""}));

        let report = TranslationValidator::compare(&en, &es);
        assert_eq!(report.errors, vec!["Missing key: common.cancel"]);
        assert_eq!(
            report.warnings,
            vec!["Extra key: common.extra", "Empty value: common.extra"]
        );
        assert!(report.has_errors());
        assert!(report.has_warnings());
    }
}
