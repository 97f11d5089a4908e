//! Resource identity

use crate::Gvk;
use std::fmt;

/// Identity of a resource within a collection.
///
/// `name` is the name the resource was declared with, before any prefixing
/// or hashing. `prefix` accumulates every name prefix applied so far, so two
/// bases that prefix the same declared resource differently remain distinct
/// once an overlay merges them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResId {
    pub gvk: Gvk,
    pub name: String,
    pub prefix: String,
}

impl ResId {
    pub fn new(gvk: Gvk, name: impl Into<String>) -> Self {
        Self {
            gvk,
            name: name.into(),
            prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Partial-id match: gvk with wildcards plus declared name, ignoring prefix.
    pub fn matches(&self, partial: &ResId) -> bool {
        self.name == partial.name && self.gvk.is_selected(&partial.gvk)
    }
}

impl fmt::Display for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}|{}", self.gvk, self.name)
        } else {
            write!(f, "{}|{}|{}", self.gvk, self.prefix, self.name)
        }
    }
}
