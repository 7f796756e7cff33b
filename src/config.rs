use anyhow::{Context, Result};
use std::time::Duration;

use crate::i18n::LanguageRegistry;
use crate::retry::RetryConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Translation store
    pub translations_dir: String,
    pub source_dir: String,

    // Languages
    pub supported_languages: Vec<String>,
    pub fallback_language: String,

    // HTTP caching
    pub cache_max_age_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            // Server
            port: std::env::var("PORT")
                .ok()
                .map(|v| v.parse::<u16>().context("PORT must be a valid port number"))
                .transpose()?
                .unwrap_or(3001),

            // Translation store
            translations_dir: std::env::var("TRANSLATIONS_DIR")
                .unwrap_or_else(|_| "translations".to_string()),
            source_dir: std::env::var("TRANSLATIONS_SOURCE_DIR")
                .unwrap_or_else(|_| "locales".to_string()),

            // Languages
            supported_languages: std::env::var("SUPPORTED_LANGUAGES")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| vec!["en".to_string(), "es".to_string()]),
            fallback_language: std::env::var("FALLBACK_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),

            // HTTP caching
            cache_max_age_secs: std::env::var("CACHE_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        };

        // Fail at startup rather than on the first request
        config.language_registry()?;

        Ok(config)
    }

    /// Build the language registry these settings describe.
    pub fn language_registry(&self) -> Result<LanguageRegistry> {
        LanguageRegistry::from_codes(&self.supported_languages, &self.fallback_language)
            .context("Invalid SUPPORTED_LANGUAGES / FALLBACK_LANGUAGE")
    }
}

/// Settings for a `TranslationLoader`. Every field has a default.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Base URL of the translation service, e.g. `http://localhost:3001/api/translations`
    pub base_url: String,

    pub cache_enabled: bool,
    pub cache_ttl: Duration,

    /// Language substituted when the requested one cannot be loaded
    pub fallback_language: String,

    /// Upper bound on a single HTTP request
    pub request_timeout: Duration,

    pub retry: RetryConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api/translations".to_string(),
            cache_enabled: true,
            cache_ttl: Duration::from_millis(300_000),
            fallback_language: "en".to_string(),
            request_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

impl LoaderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("TRANSLATIONS_API_URL").unwrap_or(defaults.base_url),
            cache_enabled: std::env::var("TRANSLATION_CACHE_ENABLED")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(defaults.cache_enabled),
            cache_ttl: std::env::var("TRANSLATION_CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.cache_ttl),
            fallback_language: std::env::var("FALLBACK_LANGUAGE")
                .unwrap_or(defaults.fallback_language),
            request_timeout: std::env::var("TRANSLATION_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            retry: defaults.retry,
        }
    }
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
