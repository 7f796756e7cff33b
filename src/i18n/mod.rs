//! Internationalization (i18n) building blocks shared by every component.
//!
//! # Architecture
//!
//! - `document`: flat translation maps and per-language bundles
//! - `namespace`: the ordered prefix table that partitions keys into namespaces
//! - `manifest`: the store's table of contents
//! - `registry`: supported languages and the fallback language
//! - `validator`: payload schema checks and cross-language audits
//! - `metrics`: per-loader cache and fetch counters

mod document;
mod manifest;
mod metrics;
mod namespace;
mod registry;
mod validator;

pub use document::{FlatTranslations, LanguageBundle, KEY_SEPARATOR};
pub use manifest::{Manifest, MANIFEST_FILE, MANIFEST_VERSION};
pub use metrics::{LoaderMetrics, MetricsReport};
pub use namespace::{key_has_prefix, NamespaceRule, NamespaceTable, DEFAULT_NAMESPACE};
pub use registry::{is_valid_language_code, LanguageConfig, LanguageRegistry};
pub use validator::{TranslationValidator, ValidationReport};
