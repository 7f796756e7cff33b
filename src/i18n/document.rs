//! Translation document types shared by the splitter, store, service and loader.

use serde_json::Value;
use std::collections::BTreeMap;

/// A flat translation document: dot-separated key to leaf value.
///
/// Values are normally strings. Arrays, numbers, booleans and nulls are opaque
/// leaves carried through unchanged; an object is never a value here.
pub type FlatTranslations = BTreeMap<String, Value>;

/// Every namespace of one language, keyed by namespace name.
pub type LanguageBundle = BTreeMap<String, FlatTranslations>;

/// Separator between path segments in a flat key.
pub const KEY_SEPARATOR: char = '.';
