//! Core types shared across the natbind generators.
//!
//! This crate carries the small, dependency-light pieces every other crate
//! needs: interned symbol identity, tool version metadata and the on-disk
//! representation of a generated source unit.

mod file;
mod symbol;
mod version;

pub use file::{GeneratedFile, SourceFile, WriteResult};
pub use symbol::{SymbolId, SymbolTable};
pub use version::{ToolInfo, Version};
