//! Formatted constant contracts.

use natbind_ir::{ConstantDescriptor, MemberShape, ReturnKind, TypeKind, TypeRef};
use thiserror::Error;

use crate::format::{self, FormatError};
use crate::pipeline::DiagnosticKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstantError {
    #[error(
        "The target declaration of \"{0}\" must be a 'static' 'partial' method or a 'static' 'partial' property with only a 'get' accessor, returning 'string', 'string?', 'ReadOnlySpan<char>', or 'ReadOnlySpan<byte>'"
    )]
    UnsupportedDeclarationSignature(String),

    #[error("The format string cannot be null")]
    NullFormatString,

    #[error("Error formatting string: {0}")]
    Format(#[from] FormatError),
}

impl ConstantError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ConstantError::UnsupportedDeclarationSignature(_) => {
                DiagnosticKind::UnsupportedDeclarationSignature
            }
            ConstantError::NullFormatString => DiagnosticKind::NullFormatString,
            ConstantError::Format(_) => DiagnosticKind::FormatStringError,
        }
    }
}

fn return_kind(ty: &TypeRef) -> Option<ReturnKind> {
    match &ty.kind {
        TypeKind::String if ty.nullable => Some(ReturnKind::NullableString),
        TypeKind::String => Some(ReturnKind::String),
        TypeKind::ReadOnlySpan(element) => match element.kind {
            TypeKind::Char => Some(ReturnKind::SpanOfChar),
            TypeKind::Byte => Some(ReturnKind::SpanOfBytes),
            _ => None,
        },
        _ => None,
    }
}

/// Check the target shape and resolve its return kind.
pub fn validate_constant(descriptor: &ConstantDescriptor) -> Result<ReturnKind, ConstantError> {
    let target = &descriptor.target;
    let shape_ok = target.is_static()
        && target.is_partial()
        && match target.shape {
            MemberShape::Method => !target.has_body,
            MemberShape::Property { has_get, has_set } => has_get && !has_set,
        };

    shape_ok
        .then(|| return_kind(&target.return_type))
        .flatten()
        .ok_or_else(|| ConstantError::UnsupportedDeclarationSignature(target.display_name()))
}

/// Evaluate the template of a validated descriptor.
pub fn evaluate_constant(descriptor: &ConstantDescriptor) -> Result<String, ConstantError> {
    let template = descriptor
        .format
        .as_deref()
        .ok_or(ConstantError::NullFormatString)?;
    Ok(format::format(template, &descriptor.args, descriptor.culture)?)
}
