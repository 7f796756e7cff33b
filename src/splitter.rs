//! Offline namespace splitter.
//!
//! Reads one nested translation document per language, flattens it to
//! dot-separated keys, partitions the keys into namespaces and writes the
//! translation store: `<output>/<language>/<namespace>.json` plus a manifest.

use crate::error::SplitError;
use crate::i18n::{
    FlatTranslations, LanguageBundle, Manifest, NamespaceTable, TranslationValidator,
    ValidationReport, KEY_SEPARATOR, MANIFEST_FILE,
};
use serde_json::{Map, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Flatten a nested document into `path.to.leaf -> value`.
///
/// Objects are recursed into; everything else (strings, arrays, numbers,
/// booleans, null) is a leaf. A non-object root has no paths and flattens to
/// an empty map. When two leaf paths produce the same key (`{"a": {"b": ..}}`
/// and `{"a.b": ..}`), the first one in document order is kept and the
/// collision is logged; see [`flatten_checked`] to reject such documents.
pub fn flatten(document: &Value) -> FlatTranslations {
    let (flat, collisions) = flatten_with_collisions(document);
    for key in &collisions {
        warn!("Key '{}' is produced by more than one path, keeping the first", key);
    }
    flat
}

/// Like [`flatten`], but fails on the first key produced by more than one
/// leaf path.
pub fn flatten_checked(document: &Value) -> Result<FlatTranslations, String> {
    let (flat, collisions) = flatten_with_collisions(document);
    match collisions.into_iter().next() {
        Some(key) => Err(key),
        None => Ok(flat),
    }
}

fn flatten_with_collisions(document: &Value) -> (FlatTranslations, Vec<String>) {
    let mut flat = FlatTranslations::new();
    let mut collisions = Vec::new();
    if let Value::Object(map) = document {
        flatten_into(map, None, &mut flat, &mut collisions);
    }
    (flat, collisions)
}

fn flatten_into(
    map: &Map<String, Value>,
    prefix: Option<&str>,
    out: &mut FlatTranslations,
    collisions: &mut Vec<String>,
) {
    for (key, value) in map {
        let path = match prefix {
            Some(p) => format!("{p}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(child, Some(&path), out, collisions),
            leaf => match out.entry(path) {
                Entry::Vacant(slot) => {
                    slot.insert(leaf.clone());
                }
                Entry::Occupied(slot) => collisions.push(slot.key().clone()),
            },
        }
    }
}

/// Re-nest flat keys on the separator. Inverse of [`flatten`] for documents
/// without empty objects.
///
/// If a key is both a leaf and a parent (`"a": "x"` and `"a.b": "y"`), the
/// parent wins and the leaf is dropped with a warning.
pub fn unflatten(flat: &FlatTranslations) -> Value {
    let mut root = Map::new();

    for (key, value) in flat {
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut current = &mut root;
        for segment in parents {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                warn!("Key {} shadows leaf value at segment '{}'", key, segment);
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => unreachable!("slot was just made an object"),
            };
        }

        if current.get(*last).is_some_and(Value::is_object) {
            warn!("Dropping leaf {} because other keys nest under it", key);
            continue;
        }
        current.insert(last.to_string(), value.clone());
    }

    Value::Object(root)
}

/// Result of partitioning one language's keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutcome {
    /// Non-empty namespaces and their keys
    pub namespaces: LanguageBundle,

    /// Keys no rule claimed; they were put in the default namespace
    pub unmatched: Vec<String>,
}

/// Assign every key to the first namespace whose prefixes match it.
///
/// Keys no rule claims go to the table's default namespace and are reported
/// in [`SplitOutcome::unmatched`]. Every input key lands in exactly one
/// namespace.
pub fn split_by_namespace(flat: &FlatTranslations, table: &NamespaceTable) -> SplitOutcome {
    let mut outcome = SplitOutcome::default();

    for (key, value) in flat {
        let namespace = match table.assign(key) {
            Some(namespace) => namespace,
            None => {
                warn!(
                    "No namespace prefix matches key '{}', assigning to '{}'",
                    key,
                    table.default_namespace()
                );
                outcome.unmatched.push(key.clone());
                table.default_namespace()
            }
        };

        outcome
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.clone(), value.clone());
    }

    outcome
}

/// Where the splitter reads from, writes to, and how it partitions.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Directory holding `<language>.json` nested sources
    pub source_dir: PathBuf,

    /// Root of the translation store to write
    pub output_dir: PathBuf,

    /// Languages to process, in manifest order
    pub languages: Vec<String>,

    /// Reference language for the completeness audit
    pub fallback_language: String,

    pub table: NamespaceTable,
}

/// What a splitter run produced.
#[derive(Debug, Clone)]
pub struct SplitSummary {
    pub files_written: Vec<PathBuf>,

    /// Namespace files left by an earlier run whose namespace is now empty
    pub files_removed: Vec<PathBuf>,

    /// Unmatched keys per language
    pub unmatched: BTreeMap<String, Vec<String>>,

    /// Completeness audit per non-fallback language
    pub audits: BTreeMap<String, ValidationReport>,

    pub manifest: Manifest,
}

pub struct Splitter {
    config: SplitterConfig,
}

impl Splitter {
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Read and flatten one language's nested source document.
    pub fn load_source(&self, language: &str) -> Result<FlatTranslations, SplitError> {
        let path = self.config.source_dir.join(format!("{language}.json"));
        let content = fs::read_to_string(&path).map_err(|source| SplitError::ReadSource {
            path: path.clone(),
            source,
        })?;
        let document: Value = serde_json::from_str(&content).map_err(|source| {
            SplitError::ParseSource {
                path: path.clone(),
                source,
            }
        })?;
        flatten_checked(&document).map_err(|key| SplitError::KeyCollision { path, key })
    }

    /// Run the whole pipeline and write the translation store.
    ///
    /// Every source is read and parsed before anything is written, so a bad
    /// source aborts the run without leaving partial output behind.
    pub fn write_all(&self) -> Result<SplitSummary, SplitError> {
        let mut flattened: Vec<(String, FlatTranslations)> = Vec::new();
        for language in &self.config.languages {
            let flat = self.load_source(language)?;
            info!("Loaded {} keys for {}", flat.len(), language);
            flattened.push((language.clone(), flat));
        }

        fs::create_dir_all(&self.config.output_dir).map_err(|source| SplitError::CreateDir {
            path: self.config.output_dir.clone(),
            source,
        })?;

        let mut files_written = Vec::new();
        let mut files_removed = Vec::new();
        let mut unmatched = BTreeMap::new();

        for (language, flat) in &flattened {
            let outcome = split_by_namespace(flat, &self.config.table);
            let language_dir = self.config.output_dir.join(language);
            fs::create_dir_all(&language_dir).map_err(|source| SplitError::CreateDir {
                path: language_dir.clone(),
                source,
            })?;

            for namespace in self.config.table.names() {
                let path = language_dir.join(format!("{namespace}.json"));
                match outcome.namespaces.get(&namespace).filter(|keys| !keys.is_empty()) {
                    Some(keys) => {
                        write_json(&path, keys)?;
                        info!("✓ {}/{}: {} keys", language, namespace, keys.len());
                        files_written.push(path);
                    }
                    None => {
                        if remove_stale(&path)? {
                            info!("Removed stale {}/{}", language, namespace);
                            files_removed.push(path);
                        }
                    }
                }
            }

            if !outcome.unmatched.is_empty() {
                warn!(
                    "{}: {} keys had no namespace and went to '{}'",
                    language,
                    outcome.unmatched.len(),
                    self.config.table.default_namespace()
                );
                unmatched.insert(language.clone(), outcome.unmatched);
            }
        }

        let manifest = Manifest::new(self.config.languages.clone(), self.config.table.names());
        let manifest_path = self.config.output_dir.join(MANIFEST_FILE);
        write_json(&manifest_path, &manifest)?;
        files_written.push(manifest_path);

        let audits = self.audit(&flattened);

        info!(
            "Split {} languages into {} files",
            self.config.languages.len(),
            files_written.len()
        );

        Ok(SplitSummary {
            files_written,
            files_removed,
            unmatched,
            audits,
            manifest,
        })
    }

    /// Compare each language against the fallback language. Findings are
    /// logged, never fatal.
    fn audit(&self, flattened: &[(String, FlatTranslations)]) -> BTreeMap<String, ValidationReport> {
        let mut audits = BTreeMap::new();
        let reference = flattened
            .iter()
            .find(|(language, _)| *language == self.config.fallback_language);
        let Some((_, reference)) = reference else {
            warn!(
                "Fallback language {} was not processed, skipping audit",
                self.config.fallback_language
            );
            return audits;
        };

        for (language, flat) in flattened {
            if *language == self.config.fallback_language {
                continue;
            }
            let report = TranslationValidator::compare(reference, flat);
            if !report.errors.is_empty() {
                warn!(
                    "{} is missing {} keys present in {}: {:?}",
                    language,
                    report.errors.len(),
                    self.config.fallback_language,
                    report.errors
                );
            }
            if !report.warnings.is_empty() {
                warn!("{} audit warnings: {:?}", language, report.warnings);
            }
            audits.insert(language.clone(), report);
        }
        audits
    }
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SplitError> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    fs::write(path, content).map_err(|source| SplitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Delete a namespace file that has no keys this run. Returns whether one
/// existed.
fn remove_stale(path: &Path) -> Result<bool, SplitError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SplitError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
