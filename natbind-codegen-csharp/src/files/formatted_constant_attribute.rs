use std::path::{Path, PathBuf};

use natbind_core::GeneratedFile;

use super::{Unit, instantiate};

const TEMPLATE: &str = include_str!("../../templates/FormattedConstantAttribute.cs");

/// Marker types for formatted constants: `FormatCulture` and the attribute.
pub struct FormattedConstantAttribute {
    namespace: String,
}

impl FormattedConstantAttribute {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl GeneratedFile for FormattedConstantAttribute {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(Unit::FormattedConstantAttribute.file_name(&self.namespace))
    }

    fn render(&self) -> String {
        instantiate(TEMPLATE, &self.namespace)
    }
}
