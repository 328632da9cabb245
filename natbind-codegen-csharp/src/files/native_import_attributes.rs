use std::path::{Path, PathBuf};

use natbind_core::GeneratedFile;

use super::{Unit, instantiate};

const TEMPLATE: &str = include_str!("../../templates/NativeImportAttributes.cs");

/// Marker types for native imports: the symbol kind enum, the library and
/// condition interfaces and the four import attributes.
pub struct NativeImportAttributes {
    namespace: String,
}

impl NativeImportAttributes {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl GeneratedFile for NativeImportAttributes {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(Unit::NativeImportAttributes.file_name(&self.namespace))
    }

    fn render(&self) -> String {
        instantiate(TEMPLATE, &self.namespace)
    }
}
