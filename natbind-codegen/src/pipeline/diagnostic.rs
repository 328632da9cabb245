//! Diagnostic records surfaced to the host.
//!
//! Every per-declaration or pass-wide problem becomes a [`Diagnostic`] with a
//! stable id (`NBIMP0022`, `NBFMT0003`, ...) instead of an error crossing the
//! pipeline boundary.

use natbind_ir::Location;
use serde::Serialize;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Generator family a diagnostic belongs to; determines the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticFamily {
    NativeImports,
    FormattedConstants,
}

impl DiagnosticFamily {
    pub fn prefix(self) -> &'static str {
        match self {
            DiagnosticFamily::NativeImports => "NBIMP",
            DiagnosticFamily::FormattedConstants => "NBFMT",
        }
    }
}

/// Coarse classification of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    UnsupportedDeclarationShape,
    InaccessibleReferencedType,
    UnsupportedAccessKindSignature,
    UnsupportedFunctionSignature,
    MissingRequiredRuntimeType,
    UnsafeCodeNotAllowed,
    NullFormatTemplate,
    FormatEvaluationFailure,
}

/// Every diagnostic the generators can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    UnsafeNotAllowed,
    MissingRequiredType,
    NullFormatString,
    FormatStringError,
    UnsupportedTypeDeclaration,
    UnsupportedDeclarationSignature,
    InvalidOrInaccessibleLibraryType,
    InaccessibleConditionType,
    UnsupportedAccessKind,
    UnsupportedAutoSignature,
    UnsupportedGetterSignature,
    UnsupportedSetterSignature,
    UnsupportedReferenceSignature,
    UnsupportedFunctionSignature,
}

impl DiagnosticKind {
    /// Numeric part of the id within `family`.
    pub fn code(self, family: DiagnosticFamily) -> u16 {
        match self {
            DiagnosticKind::UnsafeNotAllowed | DiagnosticKind::MissingRequiredType => 1,
            DiagnosticKind::NullFormatString => 2,
            DiagnosticKind::FormatStringError => 3,
            DiagnosticKind::UnsupportedTypeDeclaration => 11,
            DiagnosticKind::UnsupportedDeclarationSignature => match family {
                DiagnosticFamily::NativeImports => 21,
                DiagnosticFamily::FormattedConstants => 31,
            },
            DiagnosticKind::InvalidOrInaccessibleLibraryType => 22,
            DiagnosticKind::InaccessibleConditionType => 23,
            DiagnosticKind::UnsupportedAccessKind => 30,
            DiagnosticKind::UnsupportedAutoSignature => 31,
            DiagnosticKind::UnsupportedGetterSignature => 32,
            DiagnosticKind::UnsupportedSetterSignature => 33,
            DiagnosticKind::UnsupportedReferenceSignature => 34,
            DiagnosticKind::UnsupportedFunctionSignature => 41,
        }
    }

    pub fn category(self) -> ErrorCategory {
        match self {
            DiagnosticKind::UnsafeNotAllowed => ErrorCategory::UnsafeCodeNotAllowed,
            DiagnosticKind::MissingRequiredType => ErrorCategory::MissingRequiredRuntimeType,
            DiagnosticKind::NullFormatString => ErrorCategory::NullFormatTemplate,
            DiagnosticKind::FormatStringError => ErrorCategory::FormatEvaluationFailure,
            DiagnosticKind::UnsupportedTypeDeclaration
            | DiagnosticKind::UnsupportedDeclarationSignature => {
                ErrorCategory::UnsupportedDeclarationShape
            }
            DiagnosticKind::InvalidOrInaccessibleLibraryType
            | DiagnosticKind::InaccessibleConditionType => ErrorCategory::InaccessibleReferencedType,
            DiagnosticKind::UnsupportedAccessKind
            | DiagnosticKind::UnsupportedAutoSignature
            | DiagnosticKind::UnsupportedGetterSignature
            | DiagnosticKind::UnsupportedSetterSignature
            | DiagnosticKind::UnsupportedReferenceSignature => {
                ErrorCategory::UnsupportedAccessKindSignature
            }
            DiagnosticKind::UnsupportedFunctionSignature => {
                ErrorCategory::UnsupportedFunctionSignature
            }
        }
    }

    /// Pass-wide failures abort the whole output unit.
    pub fn is_pass_wide(self) -> bool {
        matches!(
            self,
            DiagnosticKind::UnsafeNotAllowed | DiagnosticKind::MissingRequiredType
        )
    }

    pub fn id(self, family: DiagnosticFamily) -> String {
        format!("{}{:04}", family.prefix(), self.code(family))
    }
}

/// A diagnostic message produced during generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Stable id, e.g. `NBIMP0031`.
    pub id: String,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(
        family: DiagnosticFamily,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: kind.id(family),
            kind,
            severity: Severity::Error,
            message: message.into(),
            location: None,
        }
    }

    /// Attach a location, if one is known.
    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}

/// Anything that accepts diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
