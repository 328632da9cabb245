//! Native import phases.

use eyre::Result;
use natbind_ir::BindingDescriptor;

use crate::extract::extract_binding;
use crate::grouping::LibraryGroups;
use crate::pipeline::{
    Diagnostic, DiagnosticFamily, DiagnosticKind, DiagnosticSink, GenerationContext, Phase,
};
use crate::tree::{Insertion, SymbolTree};
use crate::validate::validate_binding;

pub const UNSAFE_NOT_ALLOWED: &str = "The compilation does not allow for usage of unsafe regions/blocks. This is needed in order for the generated source code to work. Allow it by adding \"<AllowUnsafeBlocks>true</AllowUnsafeBlocks>\" to the project file, or by compiling with the \"-unsafe\" option.";

/// State of one native import pass.
#[derive(Debug)]
pub struct ImportsState {
    pub descriptors: Vec<BindingDescriptor>,
    /// Accepted bindings, with resolved access kind and assigned slot.
    pub tree: SymbolTree<BindingDescriptor>,
    pub groups: LibraryGroups,
    /// The rendered unit, set by the backend's render phase.
    pub output: Option<String>,
}

impl Default for ImportsState {
    fn default() -> Self {
        Self {
            descriptors: Vec::new(),
            tree: SymbolTree::new(DiagnosticFamily::NativeImports),
            groups: LibraryGroups::new(),
            output: None,
        }
    }
}

/// Collects binding descriptors from marked methods.
pub struct ExtractBindingsPhase;

impl Phase<ImportsState> for ExtractBindingsPhase {
    fn name(&self) -> &'static str {
        "extract-bindings"
    }

    fn description(&self) -> &'static str {
        "Collect binding descriptors from marked methods"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>, state: &mut ImportsState) -> Result<()> {
        state.descriptors = ctx.members.iter().filter_map(extract_binding).collect();
        tracing::debug!(count = state.descriptors.len(), "extracted bindings");
        Ok(())
    }
}

/// Aborts the pass when bindings exist but unsafe code is not allowed.
pub struct UnsafeGatePhase;

impl Phase<ImportsState> for UnsafeGatePhase {
    fn name(&self) -> &'static str {
        "unsafe-gate"
    }

    fn description(&self) -> &'static str {
        "Require unsafe code to be allowed"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>, state: &mut ImportsState) -> Result<()> {
        if !state.descriptors.is_empty() && !ctx.compilation.allow_unsafe {
            ctx.abort(DiagnosticKind::UnsafeNotAllowed, UNSAFE_NOT_ALLOWED);
        }
        Ok(())
    }
}

/// Validates bindings, inserts them into the tree and assigns slots.
pub struct BuildImportsPhase;

impl Phase<ImportsState> for BuildImportsPhase {
    fn name(&self) -> &'static str {
        "build-imports"
    }

    fn description(&self) -> &'static str {
        "Validate bindings, build the symbol tree and group slots"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>, state: &mut ImportsState) -> Result<()> {
        let compilation = ctx.compilation;
        let oracle = ctx.oracle;
        let family = ctx.family;

        for descriptor in std::mem::take(&mut state.descriptors) {
            let chain = descriptor.target.containing.clone();
            let member = descriptor.target.id;
            let member_name = descriptor.target.display_name();
            let groups = &mut state.groups;

            let outcome = state.tree.insert_with(
                &chain,
                member,
                ctx,
                |sink: &mut dyn DiagnosticSink| match validate_binding(
                    &descriptor,
                    compilation,
                    oracle,
                ) {
                    Ok(variant) => {
                        let mut accepted = descriptor;
                        accepted.variant = variant;
                        accepted.slot = Some(groups.register(&accepted));
                        Some(accepted)
                    }
                    Err(err) => {
                        sink.report(
                            Diagnostic::error(family, err.kind(), err.to_string())
                                .at(descriptor.location.clone()),
                        );
                        None
                    }
                },
            );

            let verdict = match outcome {
                Insertion::Inserted => "accepted",
                Insertion::Duplicate => "already present",
                Insertion::Rejected => "rejected",
            };
            tracing::debug!(member = %member_name, verdict, "binding");
        }

        state.tree.consolidate();
        Ok(())
    }
}
