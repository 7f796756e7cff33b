//! Language registry: the set of languages the store and service accept.
//!
//! Unlike a process-wide singleton, a registry is built from configuration and
//! owned by whoever needs it (the service state, the splitter), so tests can
//! construct as many independent registries as they like.

use anyhow::{bail, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Language code as it appears in paths and file names (e.g., "en", "es", "pt-BR")
    pub code: String,

    /// English name of the language (e.g., "English", "Spanish")
    pub name: String,

    /// Native name of the language (e.g., "English", "Español")
    pub native_name: String,

    /// Whether this is the fallback language (exactly one should be true)
    pub is_fallback: bool,

    /// Whether this language is served
    pub enabled: bool,
}

/// Ordered registry of supported languages.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static LANGUAGE_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Check that a string looks like a language tag: a language subtag, an
/// optional script subtag and an optional region (`en`, `pt-BR`, `es-419`,
/// `zh-Hant`, `zh-Hant-TW`).
///
/// Codes end up in file paths, so anything else is rejected up front.
pub fn is_valid_language_code(code: &str) -> bool {
    let regex = LANGUAGE_CODE_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}(-[A-Z][a-z]{3})?(-([A-Z]{2}|[0-9]{3}))?$")
            .expect("static regex is valid")
    });
    regex.is_match(code)
}

impl LanguageRegistry {
    /// Build a registry from an ordered list of codes.
    ///
    /// # Errors
    /// Fails when the list is empty, a code is malformed or duplicated, or the
    /// fallback language is not part of the list.
    pub fn from_codes<S: AsRef<str>>(codes: &[S], fallback: &str) -> Result<Self> {
        if codes.is_empty() {
            bail!("At least one supported language is required");
        }

        let mut languages: Vec<LanguageConfig> = Vec::with_capacity(codes.len());
        for code in codes {
            let code = code.as_ref().trim();
            if !is_valid_language_code(code) {
                bail!("Invalid language code: '{}'", code);
            }
            if languages.iter().any(|lang| lang.code == code) {
                bail!("Duplicate language code: '{}'", code);
            }
            let (name, native_name) = known_names(code);
            languages.push(LanguageConfig {
                code: code.to_string(),
                name: name.to_string(),
                native_name: native_name.to_string(),
                is_fallback: code == fallback,
                enabled: true,
            });
        }

        if !languages.iter().any(|lang| lang.is_fallback) {
            bail!(
                "Fallback language '{}' is not in the supported languages",
                fallback
            );
        }

        Ok(Self { languages })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in configuration order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Codes of all enabled languages, in configuration order.
    pub fn enabled_codes(&self) -> Vec<String> {
        self.list_enabled()
            .into_iter()
            .map(|lang| lang.code.clone())
            .collect()
    }

    /// The fallback language configuration.
    ///
    /// `from_codes` guarantees one exists.
    pub fn fallback(&self) -> &LanguageConfig {
        self.languages
            .iter()
            .find(|lang| lang.is_fallback)
            .unwrap_or(&self.languages[0])
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

impl Default for LanguageRegistry {
    /// English (fallback) and Spanish.
    fn default() -> Self {
        Self::from_codes(&["en", "es"], "en").expect("default languages are valid")
    }
}

/// Display names for languages we know about; unknown codes use the code itself.
fn known_names(code: &str) -> (&str, &str) {
    match code {
        "en" => ("English", "English"),
        "es" => ("Spanish", "Español"),
        "fr" => ("French", "Français"),
        "de" => ("German", "Deutsch"),
        "pt" => ("Portuguese", "Português"),
        "it" => ("Italian", "Italiano"),
        other => (other, other),
    }
}
