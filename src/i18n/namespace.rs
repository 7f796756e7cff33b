//! Namespace table: routes flat keys into named partitions by key prefix.

use crate::i18n::document::KEY_SEPARATOR;

/// Namespace that receives every key no prefix claims.
pub const DEFAULT_NAMESPACE: &str = "common";

/// One row of the namespace table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRule {
    /// Namespace name, also the file stem on disk (e.g., "customer-info")
    pub name: String,

    /// Key prefixes routed into this namespace, checked in order
    pub prefixes: Vec<String>,
}

impl NamespaceRule {
    pub fn new(name: &str, prefixes: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// True when `key` equals one of the prefixes or lives underneath one.
    pub fn matches(&self, key: &str) -> bool {
        self.prefixes.iter().any(|prefix| key_has_prefix(key, prefix))
    }
}

/// `key == prefix` or `key` starts with `prefix` followed by the separator.
///
/// `"validationX.a"` does not match `"validation"`.
pub fn key_has_prefix(key: &str, prefix: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(KEY_SEPARATOR),
        None => false,
    }
}

/// Ordered namespace table. The first rule that matches a key wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTable {
    rules: Vec<NamespaceRule>,
    default_namespace: String,
}

impl NamespaceTable {
    pub fn new(rules: Vec<NamespaceRule>) -> Self {
        Self {
            rules,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Use a different namespace for unmatched keys.
    pub fn with_default_namespace(mut self, name: &str) -> Self {
        self.default_namespace = name.to_string();
        self
    }

    pub fn rules(&self) -> &[NamespaceRule] {
        &self.rules
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// Namespace names in table order. The default namespace is appended if no
    /// rule names it, since unmatched keys can always land there.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.iter().map(|rule| rule.name.clone()).collect();
        if !names.iter().any(|name| name == &self.default_namespace) {
            names.push(self.default_namespace.clone());
        }
        names
    }

    /// Whether `name` is a namespace of this table.
    pub fn contains(&self, name: &str) -> bool {
        name == self.default_namespace || self.rules.iter().any(|rule| rule.name == name)
    }

    /// Namespace for `key`, or `None` when no rule claims it.
    pub fn assign(&self, key: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(key))
            .map(|rule| rule.name.as_str())
    }
}

impl Default for NamespaceTable {
    /// The onboarding app's namespaces and the key prefixes that feed them.
    fn default() -> Self {
        Self::new(vec![
            NamespaceRule::new("common", &["common", "app", "actions"]),
            NamespaceRule::new("navigation", &["navigation", "nav", "steps"]),
            NamespaceRule::new("products", &["products", "product"]),
            NamespaceRule::new("customer-info", &["customerInfo", "customer"]),
            NamespaceRule::new("identification", &["identification", "identity"]),
            NamespaceRule::new("documents", &["documents", "document"]),
            NamespaceRule::new("confirmation", &["confirmation"]),
            NamespaceRule::new("validation", &["validation", "errors"]),
            NamespaceRule::new("bank-info", &["bankInfo", "bank"]),
        ])
    }
}
