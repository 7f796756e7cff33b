//! Manifest: which languages and namespaces the store holds, and when it was written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written by the splitter.
pub const MANIFEST_VERSION: &str = "1.0.0";

/// File name of the manifest at the root of the translation store.
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub languages: Vec<String>,
    pub namespaces: Vec<String>,
    pub version: String,
    pub last_modified: DateTime<Utc>,
}

impl Manifest {
    /// A manifest stamped with the current time and the current schema version.
    pub fn new(languages: Vec<String>, namespaces: Vec<String>) -> Self {
        Self::at(languages, namespaces, Utc::now())
    }

    pub fn at(languages: Vec<String>, namespaces: Vec<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            languages,
            namespaces,
            version: MANIFEST_VERSION.to_string(),
            last_modified,
        }
    }
}
