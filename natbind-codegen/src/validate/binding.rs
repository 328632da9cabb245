//! Native import binding contracts.

use natbind_ir::{AccessKind, BindingDescriptor, BindingVariant, Compilation, MemberDecl};
use thiserror::Error;

use super::AccessibilityOracle;
use crate::pipeline::DiagnosticKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error(
        "The target method declaration of \"{0}\" must be 'static' and 'partial' without a provided implementation part"
    )]
    UnsupportedDeclarationSignature(String),

    #[error(
        "The import library type \"{0}\" must be accessible from a global scope within the consuming assembly (at least 'internal'), in order for it to be used as such"
    )]
    InaccessibleLibrary(String),

    #[error(
        "The condition type \"{0}\" must be accessible from a global scope within the consuming assembly (at least 'internal'), in order to use it as a condition for a conditionally imported native symbol"
    )]
    InaccessibleCondition(String),

    #[error(
        "The kind \"{0}\" for an imported native symbol is unknown and unsupported. Only \"Auto\", \"Getter\", \"Setter\", or \"Reference\" are allowed kind values."
    )]
    UnsupportedAccessKind(i32),

    #[error(
        "The target method declaration of \"{0}\" must either take no arguments and return non-void or take exactly one argument and return void, in order to be used as an \"Auto\" kind imported native symbol. The return type or the argument type respectively must be either a blittable ('unmanaged') type, a type parameter constrained to be 'unmanaged', or a 'ref'/'ref readonly'/'in' reference to such types."
    )]
    UnsupportedAuto(String),

    #[error(
        "The target method declaration of \"{0}\" must take no arguments and return non-void, in order to be used as a getter for an imported native symbol. The return type must be either a blittable ('unmanaged') type, a type parameter constrained to be 'unmanaged', or a 'ref'/'ref readonly' reference to such types."
    )]
    UnsupportedGetter(String),

    #[error(
        "The target method declaration of \"{0}\" must take exactly one argument and return void, in order to be used as a setter for an imported native symbol. The argument type must be either a blittable ('unmanaged') type, a type parameter constrained to be 'unmanaged', or a 'ref'/'ref readonly'/'in' reference to such types."
    )]
    UnsupportedSetter(String),

    #[error(
        "The target method declaration of \"{0}\" must take no arguments and return non-void by-ref, in order to be used as a reference getter for an imported native symbol. The return type must be a 'ref'/'ref readonly' reference to either a blittable ('unmanaged') type, or a type parameter constrained to be 'unmanaged'."
    )]
    UnsupportedReference(String),

    #[error(
        "The return type and all of the argument types of the target method declaration of \"{0}\" must be either a blittable ('unmanaged') type, a type parameter constrained to be 'unmanaged', or a 'ref'/'ref readonly'/'in' reference to such types"
    )]
    UnsupportedFunction(String),
}

impl BindingError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            BindingError::UnsupportedDeclarationSignature(_) => {
                DiagnosticKind::UnsupportedDeclarationSignature
            }
            BindingError::InaccessibleLibrary(_) => DiagnosticKind::InvalidOrInaccessibleLibraryType,
            BindingError::InaccessibleCondition(_) => DiagnosticKind::InaccessibleConditionType,
            BindingError::UnsupportedAccessKind(_) => DiagnosticKind::UnsupportedAccessKind,
            BindingError::UnsupportedAuto(_) => DiagnosticKind::UnsupportedAutoSignature,
            BindingError::UnsupportedGetter(_) => DiagnosticKind::UnsupportedGetterSignature,
            BindingError::UnsupportedSetter(_) => DiagnosticKind::UnsupportedSetterSignature,
            BindingError::UnsupportedReference(_) => DiagnosticKind::UnsupportedReferenceSignature,
            BindingError::UnsupportedFunction(_) => DiagnosticKind::UnsupportedFunctionSignature,
        }
    }
}

/// Non-void, fixed-layout return and no parameters. By-ref returns allowed.
fn is_getter_shape(target: &MemberDecl) -> bool {
    target.params.is_empty() && !target.return_type.is_void() && target.return_type.is_unmanaged()
}

/// Exactly one fixed-layout parameter and a void return.
fn is_setter_shape(target: &MemberDecl) -> bool {
    target.return_type.is_void()
        && matches!(target.params.as_slice(), [param] if param.ty.is_unmanaged())
}

/// Check `descriptor` and return its variant with `Auto` resolved.
pub fn validate_binding(
    descriptor: &BindingDescriptor,
    compilation: &Compilation,
    oracle: &dyn AccessibilityOracle,
) -> Result<BindingVariant, BindingError> {
    let target = &descriptor.target;
    let name = || target.display_name();

    if target.is_abstract() || !target.is_static() || !target.is_partial() || target.has_body {
        return Err(BindingError::UnsupportedDeclarationSignature(name()));
    }

    if !oracle.is_accessible(&descriptor.library, compilation) {
        return Err(BindingError::InaccessibleLibrary(descriptor.library.to_string()));
    }

    if let Some(condition) = &descriptor.condition
        && !oracle.is_accessible(condition, compilation)
    {
        return Err(BindingError::InaccessibleCondition(condition.to_string()));
    }

    match &descriptor.variant {
        BindingVariant::Symbol { kind } => {
            let resolved = match *kind {
                AccessKind::Auto if is_getter_shape(target) => AccessKind::Getter,
                AccessKind::Auto if is_setter_shape(target) => AccessKind::Setter,
                AccessKind::Auto => return Err(BindingError::UnsupportedAuto(name())),
                AccessKind::Getter if is_getter_shape(target) => AccessKind::Getter,
                AccessKind::Getter => return Err(BindingError::UnsupportedGetter(name())),
                AccessKind::Setter if is_setter_shape(target) => AccessKind::Setter,
                AccessKind::Setter => return Err(BindingError::UnsupportedSetter(name())),
                AccessKind::Reference
                    if is_getter_shape(target) && target.return_ref.is_by_ref() =>
                {
                    AccessKind::Reference
                }
                AccessKind::Reference => return Err(BindingError::UnsupportedReference(name())),
                AccessKind::Unknown(raw) => return Err(BindingError::UnsupportedAccessKind(raw)),
            };
            Ok(BindingVariant::Symbol { kind: resolved })
        }
        BindingVariant::Function { call_convs } => {
            let returns_ok = target.return_type.is_void() || target.return_type.is_unmanaged();
            let params_ok = target.params.iter().all(|p| p.ty.is_unmanaged());
            if !returns_ok || !params_ok {
                return Err(BindingError::UnsupportedFunction(name()));
            }
            Ok(BindingVariant::Function {
                call_convs: call_convs.clone(),
            })
        }
    }
}
