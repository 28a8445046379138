//! Namespace allow-list, parsed once at startup.

use serde::{Deserialize, Serialize};

/// Either every namespace (a single cluster-wide pass) or an explicit ordered list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum NamespaceFilter {
    #[default]
    All,
    Only(Vec<String>),
}

impl NamespaceFilter {
    /// Parse a comma separated list. Blank and repeated entries are skipped (first occurrence keeps
    /// its position); nothing left means all namespaces.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in raw.unwrap_or_default().split(',').map(str::trim) {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        if names.is_empty() { Self::All } else { Self::Only(names) }
    }

    /// Namespace scopes to query, `None` meaning cluster-wide.
    pub fn scopes(&self) -> Vec<Option<&str>> {
        match self {
            Self::All => vec![None],
            Self::Only(names) => names.iter().map(|n| Some(n.as_str())).collect(),
        }
    }

    /// Whether an object living in `namespace` belongs to the filter.
    pub fn admits(&self, namespace: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.iter().any(|n| n == namespace),
        }
    }
}
