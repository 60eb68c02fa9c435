use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::gc_root::GcRootKind;
use crate::remap::SymbolRemapping;

/// Options applied while an index is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub symbol_remapping: SymbolRemapping,
    /// GC root kinds kept in the index; roots of any other kind are dropped.
    pub indexed_gc_roots: BTreeSet<GcRootKind>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            symbol_remapping: SymbolRemapping::default(),
            indexed_gc_roots: GcRootKind::DEFAULT_INDEXED.into_iter().collect(),
        }
    }
}
