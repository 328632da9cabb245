//! Formatted constants unit.

use eyre::Result;
use natbind_codegen::pipeline::phases::{ConstantOutput, ConstantsState};
use natbind_codegen::tree::{SymbolTree, TreeSyntax};
use natbind_codegen::{CodeBuilder, CodeFragment, GenerationContext, Phase};
use natbind_core::ToolInfo;
use natbind_ir::{ReturnKind, TypeDecl};

use crate::literal::{constant_expression, return_type};
use crate::syntax::{
    AUTO_GENERATED_HEADER, METHOD_IMPL_ATTRIBUTE, NULLABLE_ENABLE, NULLABLE_RESTORE,
    constraint_clauses, generated_code_attribute, namespace_header, parameter_list, type_header,
    type_parameter_list,
};

/// Renders constant members inside the symbol tree.
pub struct ConstantsSyntax<'a> {
    pub tool: &'a ToolInfo,
}

impl TreeSyntax<ConstantOutput> for ConstantsSyntax<'_> {
    fn namespace_header(&self, qualified_name: &str) -> String {
        namespace_header(qualified_name)
    }

    fn type_header(&self, decl: &TypeDecl) -> String {
        type_header(decl)
    }

    fn member(&self, output: &ConstantOutput) -> Vec<CodeFragment> {
        let descriptor = &output.descriptor;
        let target = &descriptor.target;
        // Validated constants always carry their return kind.
        let kind = descriptor.return_kind.unwrap_or(ReturnKind::String);
        let head = format!(
            "{} {} {}",
            target.modifiers_text(),
            return_type(kind),
            target.name
        );
        let value = constant_expression(&output.value, kind);

        if descriptor.is_property {
            return vec![
                CodeFragment::line(generated_code_attribute(self.tool)),
                CodeFragment::braced(
                    head,
                    vec![
                        CodeFragment::line(METHOD_IMPL_ATTRIBUTE),
                        CodeFragment::line(format!("get => {value};")),
                    ],
                ),
            ];
        }

        // Parameters exist only to satisfy the partial declaration.
        let unused_params = !target.params.is_empty();
        let mut fragments = Vec::new();
        if unused_params {
            fragments.push(CodeFragment::directive("#pragma warning disable IDE0060"));
        }
        fragments.extend([
            CodeFragment::line(generated_code_attribute(self.tool)),
            CodeFragment::line(METHOD_IMPL_ATTRIBUTE),
            CodeFragment::line(format!(
                "{head}{}{}{} => {value};",
                type_parameter_list(target),
                parameter_list(target),
                constraint_clauses(target)
            )),
        ]);
        if unused_params {
            fragments.push(CodeFragment::directive("#pragma warning restore IDE0060"));
        }
        fragments
    }
}

/// Render the complete constants unit.
pub fn render_constants(tree: &SymbolTree<ConstantOutput>, tool: &ToolInfo) -> String {
    let mut builder = CodeBuilder::csharp();
    builder
        .push_line(AUTO_GENERATED_HEADER)
        .push_directive(NULLABLE_ENABLE)
        .push_blank()
        .emit_all(tree.render(&ConstantsSyntax { tool }))
        .push_blank()
        .push_directive(NULLABLE_RESTORE);
    builder.build()
}

/// Renders the constants unit once the tree is built.
pub struct RenderConstantsPhase {
    pub tool: ToolInfo,
}

impl Phase<ConstantsState> for RenderConstantsPhase {
    fn name(&self) -> &'static str {
        "render-constants"
    }

    fn description(&self) -> &'static str {
        "Render formatted constant members as C#"
    }

    fn run(&self, _ctx: &mut GenerationContext<'_>, state: &mut ConstantsState) -> Result<()> {
        if state.tree.is_empty() {
            tracing::debug!("no accepted constants, constants unit skipped");
            return Ok(());
        }
        tracing::debug!(members = state.tree.member_count(), "rendering constants");
        state.output = Some(render_constants(&state.tree, &self.tool));
        Ok(())
    }
}
