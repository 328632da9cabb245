//! Structural contracts for descriptors.
//!
//! Validators return typed errors; the owning pipeline phase turns them into
//! diagnostics via [`BindingError::kind`] and [`ConstantError::kind`].

mod binding;
mod constant;

pub use binding::{BindingError, validate_binding};
pub use constant::{ConstantError, evaluate_constant, validate_constant};
use natbind_ir::{Accessibility, Compilation, TypeHandle};

/// Answers whether a referenced type can be named from the consuming assembly's
/// global scope.
pub trait AccessibilityOracle {
    fn is_accessible(&self, ty: &TypeHandle, compilation: &Compilation) -> bool;
}

/// Oracle that trusts the declared accessibility of each type.
///
/// `public`, `internal` and `protected internal` are reachable from the global
/// scope; everything narrower, and unresolved types, is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredAccessibility;

impl AccessibilityOracle for DeclaredAccessibility {
    fn is_accessible(&self, ty: &TypeHandle, _compilation: &Compilation) -> bool {
        matches!(
            ty.accessibility,
            Accessibility::Public | Accessibility::Internal | Accessibility::ProtectedInternal
        )
    }
}

#[cfg(test)]
mod tests {
    use natbind_core::SymbolTable;

    use super::*;

    #[test]
    fn test_declared_accessibility() {
        let mut table = SymbolTable::new();
        let compilation = Compilation::default();
        let oracle = DeclaredAccessibility;

        for (accessibility, expected) in [
            (Accessibility::Public, true),
            (Accessibility::Internal, true),
            (Accessibility::ProtectedInternal, true),
            (Accessibility::Protected, false),
            (Accessibility::PrivateProtected, false),
            (Accessibility::Private, false),
            (Accessibility::File, false),
            (Accessibility::Unresolved, false),
        ] {
            let ty = TypeHandle::new(table.intern("T:Demo.Lib"), "Demo.Lib", accessibility);
            assert_eq!(
                oracle.is_accessible(&ty, &compilation),
                expected,
                "{accessibility:?}"
            );
        }
    }
}
