//! Generated unit names and the fixed marker-type units.

mod formatted_constant_attribute;
mod native_import_attributes;

pub use formatted_constant_attribute::FormattedConstantAttribute;
pub use native_import_attributes::NativeImportAttributes;

/// The four units a generator run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    NativeImports,
    NativeImportAttributes,
    FormattedConstants,
    FormattedConstantAttribute,
}

impl Unit {
    pub const ALL: [Unit; 4] = [
        Unit::NativeImportAttributes,
        Unit::FormattedConstantAttribute,
        Unit::NativeImports,
        Unit::FormattedConstants,
    ];

    fn suffix(self) -> &'static str {
        match self {
            Unit::NativeImports => "NativeImports",
            Unit::NativeImportAttributes => "NativeImportAttributes",
            Unit::FormattedConstants => "FormattedConstants",
            Unit::FormattedConstantAttribute => "FormattedConstantAttribute",
        }
    }

    /// File name of the unit, e.g. `Natbind.SourceGeneration.NativeImports.g.cs`.
    pub fn file_name(self, namespace: &str) -> String {
        format!("{namespace}.{}.g.cs", self.suffix())
    }
}

/// Fill the `{{namespace}}` placeholder of a marker template.
fn instantiate(template: &str, namespace: &str) -> String {
    template.replace("{{namespace}}", namespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(
            Unit::NativeImports.file_name("Natbind.SourceGeneration"),
            "Natbind.SourceGeneration.NativeImports.g.cs"
        );
        assert_eq!(
            Unit::FormattedConstantAttribute.file_name("Demo"),
            "Demo.FormattedConstantAttribute.g.cs"
        );
    }
}
