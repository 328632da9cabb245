//! Formatted constant phases.

use eyre::Result;
use natbind_ir::{Compilation, ConstantDescriptor};

use crate::extract::extract_constant;
use crate::pipeline::{
    Diagnostic, DiagnosticFamily, DiagnosticKind, DiagnosticSink, GenerationContext, Phase,
};
use crate::tree::SymbolTree;
use crate::validate::{ConstantError, evaluate_constant, validate_constant};

pub const MISSING_SPAN: &str = "The required type 'System.ReadOnlySpan<T>' could not be found";

/// A validated constant and its evaluated literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantOutput {
    pub descriptor: ConstantDescriptor,
    pub value: String,
}

/// State of one formatted constant pass.
#[derive(Debug)]
pub struct ConstantsState {
    pub descriptors: Vec<ConstantDescriptor>,
    pub tree: SymbolTree<ConstantOutput>,
    pub output: Option<String>,
}

impl Default for ConstantsState {
    fn default() -> Self {
        Self {
            descriptors: Vec::new(),
            tree: SymbolTree::new(DiagnosticFamily::FormattedConstants),
            output: None,
        }
    }
}

/// Collects constant descriptors from marked methods and properties.
pub struct ExtractConstantsPhase;

impl Phase<ConstantsState> for ExtractConstantsPhase {
    fn name(&self) -> &'static str {
        "extract-constants"
    }

    fn description(&self) -> &'static str {
        "Collect constant descriptors from marked members"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>, state: &mut ConstantsState) -> Result<()> {
        state.descriptors = ctx.members.iter().filter_map(extract_constant).collect();
        tracing::debug!(count = state.descriptors.len(), "extracted constants");
        Ok(())
    }
}

/// Aborts the pass when constants exist but `ReadOnlySpan<T>` is unknown.
pub struct SpanGatePhase;

impl Phase<ConstantsState> for SpanGatePhase {
    fn name(&self) -> &'static str {
        "span-gate"
    }

    fn description(&self) -> &'static str {
        "Require System.ReadOnlySpan<T> to be available"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>, state: &mut ConstantsState) -> Result<()> {
        if !state.descriptors.is_empty() && !ctx.compilation.knows_type(Compilation::READ_ONLY_SPAN)
        {
            ctx.abort(DiagnosticKind::MissingRequiredType, MISSING_SPAN);
        }
        Ok(())
    }
}

/// Validates and evaluates constants, then builds the symbol tree.
pub struct BuildConstantsPhase;

impl BuildConstantsPhase {
    fn evaluate(descriptor: &mut ConstantDescriptor) -> Result<String, ConstantError> {
        descriptor.return_kind = Some(validate_constant(descriptor)?);
        evaluate_constant(descriptor)
    }
}

impl Phase<ConstantsState> for BuildConstantsPhase {
    fn name(&self) -> &'static str {
        "build-constants"
    }

    fn description(&self) -> &'static str {
        "Validate and evaluate constants, build the symbol tree"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>, state: &mut ConstantsState) -> Result<()> {
        for mut descriptor in std::mem::take(&mut state.descriptors) {
            let chain = descriptor.target.containing.clone();
            let member = descriptor.target.id;
            // Evaluated ahead of insertion; repeated identities are skipped here.
            if state.tree.is_known(member) {
                continue;
            }

            let value = match Self::evaluate(&mut descriptor) {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(
                        member = %descriptor.target.display_name(),
                        error = %err,
                        "constant rejected"
                    );
                    let family = ctx.family;
                    ctx.report(
                        Diagnostic::error(family, err.kind(), err.to_string())
                            .at(descriptor.location.clone()),
                    );
                    state.tree.mark_rejected(member);
                    continue;
                }
            };

            state.tree.insert_with(&chain, member, ctx, |_| {
                Some(ConstantOutput { descriptor, value })
            });
        }

        state.tree.consolidate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use natbind_ir::{FormatArg, MemberDecl, ReturnKind, TypeDeclKind, TypeRef};

    use super::*;
    use crate::{pipeline::Pipeline, testing::Fixtures};

    fn run(compilation: &Compilation, members: &[MemberDecl]) -> (ConstantsState, Vec<Diagnostic>, bool) {
        let mut ctx =
            GenerationContext::new(compilation, members, DiagnosticFamily::FormattedConstants);
        let mut state = ConstantsState::default();
        Pipeline::new()
            .phase(ExtractConstantsPhase)
            .phase(SpanGatePhase)
            .phase(BuildConstantsPhase)
            .run(&mut ctx, &mut state)
            .unwrap();
        let aborted = ctx.is_aborted();
        (state, ctx.diagnostics, aborted)
    }

    #[test]
    fn test_hello_world() {
        let mut fx = Fixtures::new();
        let members = vec![
            fx.method("Demo.Consts", "Greeting")
                .returns(TypeRef::string())
                .constant(Some("Hello, {0}!"), vec![FormatArg::String("World".into())])
                .build(),
        ];

        let (state, diagnostics, _) = run(&Compilation::default(), &members);

        assert!(diagnostics.is_empty());
        let output = state.tree.members().next().unwrap();
        assert_eq!(output.value, "Hello, World!");
        assert_eq!(output.descriptor.return_kind, Some(ReturnKind::String));
    }

    #[test]
    fn test_failures_are_local() {
        let mut fx = Fixtures::new();
        let members = vec![
            fx.method("Demo.Consts", "Missing")
                .returns(TypeRef::string())
                .constant(None, Vec::new())
                .located(2)
                .build(),
            fx.method("Demo.Consts", "Broken")
                .returns(TypeRef::string())
                .constant(Some("{0"), vec![FormatArg::Int(1)])
                .located(5)
                .build(),
            fx.method("Demo.Consts", "Fine")
                .returns(TypeRef::string())
                .constant(Some("ok"), Vec::new())
                .build(),
        ];

        let (state, diagnostics, aborted) = run(&Compilation::default(), &members);

        assert!(!aborted);
        let ids: Vec<_> = diagnostics.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["NBFMT0002", "NBFMT0003"]);
        assert_eq!(
            diagnostics[1].message,
            "Error formatting string: Input string was not in a correct format."
        );
        assert_eq!(state.tree.member_count(), 1);
    }

    #[test]
    fn test_signature_checked_before_ancestors() {
        let mut fx = Fixtures::new();
        fx.declare_type("Demo.Flags", TypeDeclKind::Enum, true);
        let members = vec![
            fx.method("Demo.Flags", "A")
                .returns(TypeRef::primitive("int"))
                .constant(Some("x"), Vec::new())
                .build(),
            fx.method("Demo.Flags", "B")
                .returns(TypeRef::string())
                .constant(Some("x"), Vec::new())
                .build(),
        ];

        let (state, diagnostics, _) = run(&Compilation::default(), &members);

        let ids: Vec<_> = diagnostics.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["NBFMT0031", "NBFMT0011"]);
        assert!(state.tree.is_empty());
    }

    #[test]
    fn test_missing_span_aborts() {
        let mut fx = Fixtures::new();
        let members = vec![
            fx.method("Demo.Consts", "Greeting")
                .returns(TypeRef::string())
                .constant(Some("x"), Vec::new())
                .build(),
        ];
        let compilation = Compilation {
            known_types: Vec::new(),
            ..Compilation::default()
        };

        let (state, diagnostics, aborted) = run(&compilation, &members);

        assert!(aborted);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, "NBFMT0001");
        assert_eq!(diagnostics[0].message, MISSING_SPAN);
        assert!(state.tree.is_empty());
    }

    #[test]
    fn test_duplicate_constant_kept_once() {
        let mut fx = Fixtures::new();
        let member = fx
            .method("Demo.Consts", "Greeting")
            .returns(TypeRef::string())
            .constant(Some("a"), Vec::new())
            .build();

        let (state, diagnostics, _) = run(&Compilation::default(), &[member.clone(), member]);
        assert!(diagnostics.is_empty());
        assert_eq!(state.tree.member_count(), 1);
    }

    #[test]
    fn test_duplicate_failing_constant_reported_once() {
        let mut fx = Fixtures::new();
        let member = fx
            .method("Demo.Consts", "Broken")
            .returns(TypeRef::string())
            .constant(Some("{0"), vec![FormatArg::Int(1)])
            .build();

        let (state, diagnostics, _) = run(&Compilation::default(), &[member.clone(), member]);
        let ids: Vec<_> = diagnostics.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["NBFMT0003"]);
        assert!(state.tree.is_empty());
    }
}
