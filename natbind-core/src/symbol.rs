//! Interned symbol identity.
//!
//! Declarations are referred to by a documentation-comment style key
//! (`N:Demo`, `T:Demo.Outer+Inner`, `M:Demo.Outer.Init(uint)`, ...). The
//! [`SymbolTable`] turns those keys into small copyable [`SymbolId`]s whose
//! numeric value is the order of first interning, so two passes over the same
//! input produce the same ids.

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

/// Stable handle to an interned symbol key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interner mapping symbol keys to [`SymbolId`]s.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    keys: IndexSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `key`, returning the existing id if it was seen before.
    pub fn intern(&mut self, key: &str) -> SymbolId {
        if let Some(index) = self.keys.get_index_of(key) {
            return SymbolId(index as u32);
        }
        let (index, _) = self.keys.insert_full(key.to_string());
        SymbolId(index as u32)
    }

    /// Look up a key without interning it.
    pub fn get(&self, key: &str) -> Option<SymbolId> {
        self.keys.get_index_of(key).map(|i| SymbolId(i as u32))
    }

    /// Resolve an id back to its key.
    pub fn resolve(&self, id: SymbolId) -> Option<&str> {
        self.keys.get_index(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
