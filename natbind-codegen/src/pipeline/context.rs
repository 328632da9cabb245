//! Generation context passed through pipeline phases.

use natbind_ir::{Compilation, Location, MemberDecl};

use super::diagnostic::{Diagnostic, DiagnosticFamily, DiagnosticKind, DiagnosticSink};
use crate::validate::{AccessibilityOracle, DeclaredAccessibility};

/// Context passed through all phases of one generator pass.
///
/// Carries the pass inputs and accumulates diagnostics. A pass-wide failure
/// marks the context aborted; the runner skips the remaining phases and no
/// output unit is produced.
pub struct GenerationContext<'a> {
    pub compilation: &'a Compilation,
    /// Every member supplied by the declaration provider.
    pub members: &'a [MemberDecl],
    pub family: DiagnosticFamily,
    pub oracle: &'a dyn AccessibilityOracle,
    pub diagnostics: Vec<Diagnostic>,
    aborted: bool,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        compilation: &'a Compilation,
        members: &'a [MemberDecl],
        family: DiagnosticFamily,
    ) -> Self {
        Self {
            compilation,
            members,
            family,
            oracle: &DeclaredAccessibility,
            diagnostics: Vec::new(),
            aborted: false,
        }
    }

    /// Replace the accessibility oracle.
    pub fn with_oracle(mut self, oracle: &'a dyn AccessibilityOracle) -> Self {
        self.oracle = oracle;
        self
    }

    /// Report an error of `kind` for this context's family.
    pub fn report_kind(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.report(Diagnostic::error(self.family, kind, message).at(location));
    }

    /// Report a pass-wide failure and stop the pass.
    pub fn abort(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.report_kind(kind, message, None);
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_error())
    }
}

impl DiagnosticSink for GenerationContext<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(id = %diagnostic.id, message = %diagnostic.message, "diagnostic");
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let compilation = Compilation::default();
        let ctx = GenerationContext::new(&compilation, &[], DiagnosticFamily::NativeImports);

        assert!(ctx.diagnostics.is_empty());
        assert!(!ctx.is_aborted());
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_report_uses_family_prefix() {
        let compilation = Compilation::default();
        let mut ctx =
            GenerationContext::new(&compilation, &[], DiagnosticFamily::FormattedConstants);

        ctx.report_kind(
            DiagnosticKind::UnsupportedTypeDeclaration,
            "not partial",
            Some(Location::new("natbind.toml", 3, 1)),
        );

        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.diagnostics[0].id, "NBFMT0011");
        assert!(!ctx.is_aborted());
    }

    #[test]
    fn test_abort() {
        let compilation = Compilation::default();
        let mut ctx = GenerationContext::new(&compilation, &[], DiagnosticFamily::NativeImports);

        ctx.abort(DiagnosticKind::UnsafeNotAllowed, "unsafe");

        assert!(ctx.is_aborted());
        assert_eq!(ctx.diagnostics[0].id, "NBIMP0001");
        assert!(ctx.diagnostics[0].location.is_none());
    }
}
