//! Client-side translation loader.
//!
//! Fetches bundles and namespaces from the translation service, caches them in
//! memory with a TTL, persists the cache through a [`CacheStorage`], and falls
//! back to the configured fallback language when a fetch or validation fails.

use crate::cache::{bundle_key, namespace_key, Clock, SystemClock, TranslationCache};
use crate::config::LoaderConfig;
use crate::error::{LoadError, SchemaError};
use crate::i18n::{
    FlatTranslations, LanguageBundle, LoaderMetrics, Manifest, MetricsReport, TranslationValidator,
};
use crate::retry::with_retry_if;
use crate::storage::CacheStorage;
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Translation loader owning its cache, HTTP client and metrics.
///
/// The cache lock is never held across an `.await`, so a write and the
/// persist that follows it are observed together by every other task.
#[derive(Debug)]
pub struct TranslationLoader {
    config: LoaderConfig,
    client: reqwest::Client,
    cache: Mutex<TranslationCache>,
    storage: Arc<dyn CacheStorage>,
    metrics: LoaderMetrics,
}

impl TranslationLoader {
    pub fn new(config: LoaderConfig, storage: Arc<dyn CacheStorage>) -> Result<Self> {
        Self::with_clock(config, storage, Arc::new(SystemClock))
    }

    /// Like [`TranslationLoader::new`], reading time from `clock`.
    pub fn with_clock(
        config: LoaderConfig,
        storage: Arc<dyn CacheStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let mut cache = TranslationCache::new(config.cache_ttl, clock);
        if config.cache_enabled && storage.is_available() {
            match storage.load() {
                Ok(Some(blob)) => match cache.restore(&blob) {
                    Ok(restored) => debug!("Restored {} cached translation entries", restored),
                    Err(e) => warn!("Ignoring unreadable translation cache: {}", e),
                },
                Ok(None) => {}
                Err(e) => warn!("Failed to read translation cache: {}", e),
            }
        }

        Ok(Self {
            config,
            client,
            cache: Mutex::new(cache),
            storage,
            metrics: LoaderMetrics::new(),
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    /// Keys currently in the in-memory cache, sorted.
    pub fn cached_keys(&self) -> Vec<String> {
        self.cache().keys()
    }

    /// Every namespace of `language`.
    ///
    /// On failure, loads the fallback language instead (once). If `language`
    /// is the fallback, the failure is returned.
    pub async fn load_language(&self, language: &str) -> Result<LanguageBundle, LoadError> {
        let fallback = self.config.fallback_language.as_str();
        match self.load_language_once(language).await {
            Ok(bundle) => Ok(bundle),
            Err(e) if language != fallback => {
                warn!(
                    "Failed to load translations for {} ({}), falling back to {}",
                    language, e, fallback
                );
                self.metrics.record_fallback();
                self.load_language_once(fallback).await
            }
            Err(e) => {
                error!("Failed to load fallback translations for {}: {}", language, e);
                Err(e)
            }
        }
    }

    async fn load_language_once(&self, language: &str) -> Result<LanguageBundle, LoadError> {
        let key = bundle_key(language);
        if let Some(data) = self.cached(&key) {
            match TranslationValidator::validate_bundle(data) {
                Ok(bundle) => return Ok(bundle),
                Err(e) => warn!("Discarding invalid cache entry {}: {}", key, e),
            }
        }

        let url = self.endpoint(&[language]);
        let value = self.fetch_json(&url).await?;
        let bundle = TranslationValidator::validate_bundle(value.clone())
            .map_err(|source| LoadError::Schema { url, source })?;

        self.store(key, value);
        Ok(bundle)
    }

    /// One namespace of `language`. Never fails.
    ///
    /// On failure, loads the fallback language's namespace instead; if that
    /// fails too, or `language` is the fallback, returns an empty map.
    pub async fn load_namespace(&self, language: &str, namespace: &str) -> FlatTranslations {
        let fallback = self.config.fallback_language.as_str();
        match self.load_namespace_once(language, namespace).await {
            Ok(translations) => translations,
            Err(e) if language != fallback => {
                warn!(
                    "Failed to load {}/{} ({}), falling back to {}",
                    language, namespace, e, fallback
                );
                self.metrics.record_fallback();
                self.load_namespace_once(fallback, namespace)
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Fallback {}/{} unavailable: {}", fallback, namespace, e);
                        FlatTranslations::new()
                    })
            }
            Err(e) => {
                warn!("Failed to load {}/{}: {}", language, namespace, e);
                FlatTranslations::new()
            }
        }
    }

    async fn load_namespace_once(
        &self,
        language: &str,
        namespace: &str,
    ) -> Result<FlatTranslations, LoadError> {
        let key = namespace_key(language, namespace);
        if let Some(data) = self.cached(&key) {
            match TranslationValidator::validate_namespace(data) {
                Ok(translations) => return Ok(translations),
                Err(e) => warn!("Discarding invalid cache entry {}: {}", key, e),
            }
        }

        let url = self.endpoint(&[language, namespace]);
        let value = self.fetch_json(&url).await?;
        let translations = TranslationValidator::validate_namespace(value.clone())
            .map_err(|source| LoadError::Schema { url, source })?;

        self.store(key, value);
        Ok(translations)
    }

    /// The service's manifest, or a minimal default if it cannot be fetched
    /// or does not validate.
    pub async fn get_manifest(&self) -> Manifest {
        let url = self.endpoint(&["manifest"]);
        let result = match self.fetch_json(&url).await {
            Ok(value) => TranslationValidator::validate_manifest(value)
                .map_err(|source| LoadError::Schema { url, source }),
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            warn!("Using default manifest: {}", e);
            self.default_manifest()
        })
    }

    /// Fallback language only, no namespaces.
    pub fn default_manifest(&self) -> Manifest {
        Manifest::new(vec![self.config.fallback_language.clone()], Vec::new())
    }

    /// Drop every cached entry, in memory and in storage.
    pub fn clear_cache(&self) {
        self.cache().clear();
        if self.storage.is_available() {
            if let Err(e) = self.storage.remove() {
                warn!("Failed to remove persisted translation cache: {}", e);
            }
        }
        info!("Translation cache cleared");
    }

    /// Evict everything cached for `language` and load it again.
    ///
    /// Only keys that belong to `language` go: `en`, `all-en` and `en/...`
    /// for `en`, never `en-US/...`.
    pub async fn reload_language(&self, language: &str) -> Result<LanguageBundle, LoadError> {
        let blob = {
            let mut cache = self.cache();
            let evicted = cache.evict_language(language);
            debug!("Evicted {} cache entries for {}", evicted, language);
            cache.to_blob()
        };
        self.persist(blob);

        self.load_language(language).await
    }

    fn cache(&self) -> MutexGuard<'_, TranslationCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self, key: &str) -> Option<Value> {
        if !self.config.cache_enabled {
            return None;
        }

        let hit = self.cache().get(key);
        if hit.is_some() {
            self.metrics.record_cache_hit();
        } else {
            self.metrics.record_cache_miss();
        }
        hit
    }

    fn store(&self, key: String, data: Value) {
        if !self.config.cache_enabled {
            return;
        }

        let blob = {
            let mut cache = self.cache();
            cache.insert(key, data);
            cache.to_blob()
        };
        self.persist(blob);
    }

    fn persist(&self, blob: serde_json::Result<String>) {
        if !self.config.cache_enabled || !self.storage.is_available() {
            return;
        }

        match blob {
            Ok(blob) => {
                if let Err(e) = self.storage.save(&blob) {
                    warn!("Failed to persist translation cache: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize translation cache: {}", e),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            segments.join("/")
        )
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, LoadError> {
        with_retry_if(
            &self.config.retry,
            &format!("GET {}", url),
            move || async move {
                self.metrics.record_fetch();
                let result = self.fetch_once(url).await;
                if result.is_err() {
                    self.metrics.record_fetch_failure();
                }
                result
            },
            LoadError::is_retryable,
        )
        .await
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| LoadError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| LoadError::Request {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|e| LoadError::Schema {
            url: url.to_string(),
            source: SchemaError::InvalidJson(e.to_string()),
        })
    }
}
