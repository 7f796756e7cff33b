//! Read-only access to the translation store on disk.
//!
//! Layout: `<root>/<language>/<namespace>.json` and `<root>/manifest.json`.
//! A file that does not exist is an empty translation set, not an error.

use crate::error::StoreError;
use crate::i18n::{FlatTranslations, LanguageBundle, Manifest, TranslationValidator, MANIFEST_FILE};
use futures::future::join_all;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TranslationStore {
    root: PathBuf,
}

impl TranslationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace_path(&self, language: &str, namespace: &str) -> PathBuf {
        self.root.join(language).join(format!("{namespace}.json"))
    }

    /// Whether the store's root directory can be reached.
    pub async fn check_accessible(&self) -> Result<(), StoreError> {
        let metadata = tokio::fs::metadata(&self.root)
            .await
            .map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;

        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Io {
                path: self.root.clone(),
                source: std::io::Error::new(ErrorKind::Other, "not a directory"),
            })
        }
    }

    /// Read one namespace file.
    ///
    /// Returns `Ok(None)` when the file does not exist. Any other read, parse
    /// or shape problem is an error.
    pub async fn read_namespace(
        &self,
        language: &str,
        namespace: &str,
    ) -> Result<Option<FlatTranslations>, StoreError> {
        let path = self.namespace_path(language, namespace);
        let Some(content) = read_optional(&path).await? else {
            debug!("No translations at {}", path.display());
            return Ok(None);
        };

        let value: serde_json::Value =
            serde_json::from_slice(&content).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
        let flat = TranslationValidator::validate_namespace(value)
            .map_err(|source| StoreError::Schema { path, source })?;
        Ok(Some(flat))
    }

    /// Load every namespace of a language concurrently.
    ///
    /// Each read is independent: a missing file, or one that fails to read or
    /// parse, becomes `{}` for that namespace and the rest still load.
    pub async fn load_language(&self, language: &str, namespaces: &[String]) -> LanguageBundle {
        let reads = namespaces.iter().map(|namespace| async move {
            let translations = match self.read_namespace(language, namespace).await {
                Ok(found) => found.unwrap_or_default(),
                Err(e) => {
                    warn!("Substituting empty translations for {}/{}: {}", language, namespace, e);
                    FlatTranslations::new()
                }
            };
            (namespace.clone(), translations)
        });

        join_all(reads).await.into_iter().collect()
    }

    /// Read `manifest.json`, or `Ok(None)` when the store has none.
    pub async fn read_manifest(&self) -> Result<Option<Manifest>, StoreError> {
        let path = self.root.join(MANIFEST_FILE);
        let Some(content) = read_optional(&path).await? else {
            return Ok(None);
        };

        let value: serde_json::Value =
            serde_json::from_slice(&content).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
        let manifest = TranslationValidator::validate_manifest(value)
            .map_err(|source| StoreError::Schema { path, source })?;
        Ok(Some(manifest))
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(temp_dir: &TempDir, relative: &str, content: &str) {
        let path = temp_dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_read_namespace_present() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "en/common.json", r#"{"common.next": "Next"}"#);

        let store = TranslationStore::new(temp_dir.path());
        let flat = store.read_namespace("en", "common").await.unwrap().unwrap();
        assert_eq!(flat["common.next"], "Next");
    }

    #[tokio::test]
    async fn test_read_namespace_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = TranslationStore::new(temp_dir.path());

        assert!(store.read_namespace("en", "documents").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_namespace_corrupt_is_error() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "en/common.json", "{ broken");

        let store = TranslationStore::new(temp_dir.path());
        let err = store.read_namespace("en", "common").await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_read_namespace_nested_is_schema_error() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "en/common.json", r#"{"common": {"next": "Next"}}"#);

        let store = TranslationStore::new(temp_dir.path());
        let err = store.read_namespace("en", "common").await.unwrap_err();
        assert!(matches!(err, StoreError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_load_language_tolerates_missing_and_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "es/common.json", r#"{"common.next": "Siguiente"}"#);
        write(&temp_dir, "es/validation.json", "not json at all");

        let store = TranslationStore::new(temp_dir.path());
        let namespaces = vec![
            "common".to_string(),
            "validation".to_string(),
            "documents".to_string(),
        ];
        let bundle = store.load_language("es", &namespaces).await;

        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle["common"]["common.next"], json!("Siguiente"));
        assert!(bundle["validation"].is_empty());
        assert!(bundle["documents"].is_empty());
    }

    #[tokio::test]
    async fn test_check_accessible() {
        let temp_dir = TempDir::new().unwrap();
        assert!(TranslationStore::new(temp_dir.path()).check_accessible().await.is_ok());

        let missing = TranslationStore::new(temp_dir.path().join("nope"));
        assert!(missing.check_accessible().await.is_err());

        write(&temp_dir, "file.txt", "x");
        let file = TranslationStore::new(temp_dir.path().join("file.txt"));
        assert!(file.check_accessible().await.is_err());
    }

    #[tokio::test]
    async fn test_read_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let store = TranslationStore::new(temp_dir.path());
        assert!(store.read_manifest().await.unwrap().is_none());

        let manifest = Manifest::new(vec!["en".into()], vec!["common".into()]);
        write(&temp_dir, "manifest.json", &serde_json::to_string(&manifest).unwrap());
        assert_eq!(store.read_manifest().await.unwrap(), Some(manifest));
    }
}
