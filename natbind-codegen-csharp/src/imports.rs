//! Native imports unit.
//!
//! The unit has two halves. Each library group becomes a file-local static
//! class holding one `IntPtr` field per slot and a module initializer that
//! loads the library and resolves every slot. The symbol tree then
//! re-declares the containing types with one accessor per binding, whose
//! body dereferences, writes or calls through its slot.

use eyre::Result;
use natbind_codegen::grouping::{LibraryGroups, NativeLibraryGroup, SymbolBucket};
use natbind_codegen::pipeline::phases::ImportsState;
use natbind_codegen::tree::{SymbolTree, TreeSyntax};
use natbind_codegen::{CodeBuilder, CodeFragment, GenerationContext, Phase};
use natbind_core::ToolInfo;
use natbind_ir::{
    AccessKind, BindingDescriptor, BindingVariant, MemberDecl, SlotId, TypeDecl, TypeHandle,
};

use crate::literal::quote;
use crate::syntax::{
    AUTO_GENERATED_HEADER, METHOD_IMPL_ATTRIBUTE, NULLABLE_ENABLE, NULLABLE_RESTORE,
    generated_code_attribute, method_signature, namespace_header, type_header,
};

const CAPTURE_EXCEPTION: &str =
    "info = global::System.Runtime.ExceptionServices.ExceptionDispatchInfo.Capture(exception);";

fn library_class_name(index: u32) -> String {
    format!("_Lib{index}")
}

fn slot_field_name(slot: SlotId) -> String {
    format!("_Sym{}", slot.symbol)
}

/// Fully qualified slot field, e.g. `global::_Lib0._Sym1`.
fn slot_path(slot: SlotId) -> String {
    format!(
        "global::{}.{}",
        library_class_name(slot.library),
        slot_field_name(slot)
    )
}

/// Calling convention name as written in a function pointer, e.g. `Cdecl`.
fn call_conv_name(handle: &TypeHandle) -> &str {
    let name = handle.simple_name();
    name.strip_prefix("CallConv").unwrap_or(name)
}

/// Renders import accessors inside the symbol tree.
pub struct ImportsSyntax<'a> {
    pub tool: &'a ToolInfo,
}

impl TreeSyntax<BindingDescriptor> for ImportsSyntax<'_> {
    fn namespace_header(&self, qualified_name: &str) -> String {
        namespace_header(qualified_name)
    }

    fn type_header(&self, decl: &TypeDecl) -> String {
        type_header(decl)
    }

    fn member(&self, descriptor: &BindingDescriptor) -> Vec<CodeFragment> {
        // Accepted bindings always carry their slot.
        let body = match descriptor.slot {
            Some(slot) => accessor_body(descriptor, &slot_path(slot)),
            None => Vec::new(),
        };

        vec![
            CodeFragment::directive("#pragma warning disable CS8500"),
            CodeFragment::line(generated_code_attribute(self.tool)),
            CodeFragment::line(METHOD_IMPL_ATTRIBUTE),
            CodeFragment::braced(
                method_signature(&descriptor.target),
                vec![CodeFragment::braced("unsafe", body)],
            ),
            CodeFragment::directive("#pragma warning restore CS8500"),
        ]
    }
}

/// Statements of an accessor body for a binding resolved to `slot`.
pub fn accessor_body(descriptor: &BindingDescriptor, slot: &str) -> Vec<CodeFragment> {
    let target = &descriptor.target;
    match &descriptor.variant {
        BindingVariant::Symbol { kind } => symbol_body(*kind, target, slot),
        BindingVariant::Function { call_convs } => vec![function_call(target, call_convs, slot)],
    }
}

fn symbol_body(kind: AccessKind, target: &MemberDecl, slot: &str) -> Vec<CodeFragment> {
    let returned = target.return_type.pointer_to();
    match kind {
        AccessKind::Getter if target.return_ref.is_by_ref() => vec![CodeFragment::line(format!(
            "return ref **unchecked(({}*){slot});",
            returned
        ))],
        AccessKind::Getter => vec![CodeFragment::line(format!(
            "return *unchecked(({}){slot});",
            returned
        ))],
        AccessKind::Reference => vec![CodeFragment::line(format!(
            "return ref *unchecked(({}){slot});",
            returned
        ))],
        AccessKind::Setter => match target.params.first() {
            Some(param) if param.ref_kind.is_pinnable() => {
                let pointer = param.ty.pointer_to();
                vec![CodeFragment::braced(
                    format!("fixed({pointer} p_{0} = &{0})", param.name),
                    vec![CodeFragment::line(format!(
                        "*unchecked(({pointer}*){slot}) = p_{};",
                        param.name
                    ))],
                )]
            }
            Some(param) => vec![CodeFragment::line(format!(
                "*unchecked(({}){slot}) = {};",
                param.ty.pointer_to(),
                param.name
            ))],
            None => Vec::new(),
        },
        // Auto is resolved during validation and unknown kinds are rejected there.
        AccessKind::Auto | AccessKind::Unknown(_) => Vec::new(),
    }
}

fn function_call(target: &MemberDecl, call_convs: &[TypeHandle], slot: &str) -> CodeFragment {
    let signature: Vec<String> = target
        .params
        .iter()
        .map(|p| format!("{}{}", p.ref_kind.keyword(), p.ty))
        .chain(std::iter::once(format!(
            "{}{}",
            target.return_ref.keyword(),
            target.return_type
        )))
        .collect();

    let convention = if call_convs.is_empty() {
        "unmanaged".to_string()
    } else {
        let names: Vec<_> = call_convs.iter().map(call_conv_name).collect();
        format!("unmanaged[{}]", names.join(", "))
    };

    let prefix = if target.return_type.is_void() {
        ""
    } else if target.return_ref.is_by_ref() {
        "return ref "
    } else {
        "return "
    };

    let args: Vec<String> = target
        .params
        .iter()
        .map(|p| format!("{}{}", p.ref_kind.argument_keyword(), p.name))
        .collect();

    CodeFragment::line(format!(
        "{prefix}unchecked((delegate* {convention}<{}>){slot})({});",
        signature.join(", "),
        args.join(", ")
    ))
}

/// Comment block and field declaration of one slot.
fn slot_declaration(bucket: &SymbolBucket, condition: Option<&TypeHandle>) -> Vec<CodeFragment> {
    let mut fragments = vec![CodeFragment::line(format!("// Symbol: {}", bucket.symbol_name))];
    if let Some(condition) = condition {
        fragments.push(CodeFragment::line(format!("// Condition: {condition}")));
    }
    fragments.push(CodeFragment::line("// imported by:"));
    fragments.extend(
        bucket
            .importers
            .iter()
            .map(|importer| CodeFragment::line(format!("//  - {}", importer.signature))),
    );
    fragments.push(CodeFragment::line(format!(
        "internal static global::System.IntPtr {};",
        slot_field_name(bucket.slot)
    )));
    fragments
}

/// `do { ... } while (...)` around one resolution attempt.
///
/// The attempt breaks out on success. On failure the error handler either
/// declines, returning from the initializer, or lets the loop go on: another
/// round when `retry` is set, the next statement otherwise.
fn attempt(
    preamble: Vec<CodeFragment>,
    name: &str,
    action: String,
    handler: String,
    retry: bool,
) -> CodeFragment {
    let mut body = preamble;
    body.extend([
        CodeFragment::braced(
            format!("if (!string.IsNullOrWhiteSpace({name}))"),
            vec![
                CodeFragment::braced(
                    "try",
                    vec![
                        CodeFragment::line(action),
                        CodeFragment::blank(),
                        CodeFragment::line("break;"),
                    ],
                ),
                CodeFragment::braced(
                    "catch (global::System.Exception exception)",
                    vec![CodeFragment::line(CAPTURE_EXCEPTION)],
                ),
            ],
        ),
        CodeFragment::braced("else", vec![CodeFragment::line("info = null;")]),
        CodeFragment::blank(),
        CodeFragment::braced(format!("if (!{handler})"), vec![CodeFragment::line("return;")]),
    ]);

    CodeFragment::sequence(vec![
        CodeFragment::braced("do", body),
        CodeFragment::line(if retry { "while (true);" } else { "while (false);" }),
    ])
}

/// Renders the slot class and module initializer of each library group.
struct LibraryRenderer<'a> {
    namespace: &'a str,
    tool: &'a ToolInfo,
}

impl LibraryRenderer<'_> {
    fn library_api(&self, method: &str, library: &TypeHandle) -> String {
        format!(
            "global::{}.INativeImportLibrary.{method}<{}>",
            self.namespace,
            library.qualified()
        )
    }

    fn evaluate(&self, condition: &TypeHandle) -> String {
        format!(
            "global::{}.INativeImportCondition.Evaluate<{}>()",
            self.namespace,
            condition.qualified()
        )
    }

    fn class(&self, group: &NativeLibraryGroup) -> Vec<CodeFragment> {
        let mut members: Vec<CodeFragment> = Vec::new();
        for (condition, bucket) in group.buckets() {
            members.extend(slot_declaration(bucket, condition));
            members.push(CodeFragment::blank());
        }
        members.extend([
            CodeFragment::line("[global::System.Runtime.CompilerServices.SkipLocalsInit]"),
            CodeFragment::line("[global::System.Runtime.CompilerServices.ModuleInitializer]"),
            CodeFragment::braced(
                "internal static void ModuleInitializer()",
                self.initializer(group),
            ),
        ]);

        vec![
            CodeFragment::line(generated_code_attribute(self.tool)),
            CodeFragment::braced(
                format!("file static class {}", library_class_name(group.index)),
                members,
            ),
        ]
    }

    fn initializer(&self, group: &NativeLibraryGroup) -> Vec<CodeFragment> {
        let library = &group.library;
        let mut body = Vec::new();

        // Without unconditional imports the library is only worth loading
        // when at least one condition holds.
        let precheck = !group.has_unconditional();
        if precheck {
            let locals: Vec<String> = (0..group.conditional.len()).map(|i| format!("b{i}")).collect();
            for (local, condition_group) in locals.iter().zip(group.conditional.values()) {
                body.push(CodeFragment::line(format!(
                    "var {local} = {};",
                    self.evaluate(&condition_group.condition)
                )));
            }
            body.push(CodeFragment::blank());
            body.push(CodeFragment::braced(
                format!("if (!({}))", locals.join(" || ")),
                vec![CodeFragment::line("return;")],
            ));
            body.push(CodeFragment::blank());
        }

        body.extend([
            CodeFragment::line(
                "global::System.Runtime.ExceptionServices.ExceptionDispatchInfo? info;",
            ),
            CodeFragment::line("string? libraryName;"),
            CodeFragment::line("global::System.Runtime.InteropServices.DllImportSearchPath? searchPath;"),
            CodeFragment::line("global::System.IntPtr libraryHandle;"),
            CodeFragment::blank(),
            self.load_library(group),
        ]);

        for bucket in group.unconditional.values() {
            body.push(CodeFragment::blank());
            body.push(self.resolve_symbol(library, bucket));
        }

        for (i, condition_group) in group.conditional.values().enumerate() {
            let gate = if precheck {
                format!("b{i}")
            } else {
                self.evaluate(&condition_group.condition)
            };
            let mut gated = Vec::new();
            for bucket in condition_group.buckets.values() {
                if !gated.is_empty() {
                    gated.push(CodeFragment::blank());
                }
                gated.push(self.resolve_symbol(library, bucket));
            }
            body.push(CodeFragment::blank());
            body.push(CodeFragment::braced(format!("if ({gate})"), gated));
        }

        body.push(CodeFragment::blank());
        body.push(CodeFragment::line(format!(
            "{}(libraryName, searchPath);",
            self.library_api("AfterSuccessfullyLoaded", library)
        )));
        body
    }

    fn load_library(&self, group: &NativeLibraryGroup) -> CodeFragment {
        let library = &group.library;
        attempt(
            vec![
                CodeFragment::line(format!(
                    "(libraryName, searchPath) = {}();",
                    self.library_api("GetLibraryNameAndSearchPath", library)
                )),
                CodeFragment::blank(),
            ],
            "libraryName",
            format!(
                "libraryHandle = global::System.Runtime.InteropServices.NativeLibrary.Load(libraryName, typeof(global::{}).Assembly, searchPath);",
                library_class_name(group.index)
            ),
            format!(
                "{}(libraryName, searchPath, info)",
                self.library_api("HandleLibraryImportError", library)
            ),
            true,
        )
    }

    fn resolve_symbol(&self, library: &TypeHandle, bucket: &SymbolBucket) -> CodeFragment {
        let name = quote(&bucket.symbol_name);
        attempt(
            Vec::new(),
            &name,
            format!(
                "{} = global::System.Runtime.InteropServices.NativeLibrary.GetExport(libraryHandle, {name});",
                slot_field_name(bucket.slot)
            ),
            format!(
                "{}({name}, info)",
                self.library_api("HandleSymbolImportError", library)
            ),
            false,
        )
    }
}

/// Render the complete imports unit.
pub fn render_imports(
    tree: &SymbolTree<BindingDescriptor>,
    groups: &LibraryGroups,
    namespace: &str,
    tool: &ToolInfo,
) -> String {
    let libraries = LibraryRenderer { namespace, tool };

    let mut builder = CodeBuilder::csharp();
    builder
        .push_line(AUTO_GENERATED_HEADER)
        .push_directive(NULLABLE_ENABLE)
        .push_blank();
    for group in groups.iter() {
        builder.emit_all(libraries.class(group)).push_blank();
    }
    builder
        .emit_all(tree.render(&ImportsSyntax { tool }))
        .push_blank()
        .push_directive(NULLABLE_RESTORE);
    builder.build()
}

/// Renders the imports unit once the tree is built.
pub struct RenderImportsPhase {
    pub namespace: String,
    pub tool: ToolInfo,
}

impl Phase<ImportsState> for RenderImportsPhase {
    fn name(&self) -> &'static str {
        "render-imports"
    }

    fn description(&self) -> &'static str {
        "Render library slots, module initializers and accessors as C#"
    }

    fn run(&self, _ctx: &mut GenerationContext<'_>, state: &mut ImportsState) -> Result<()> {
        if state.tree.is_empty() {
            tracing::debug!("no accepted bindings, imports unit skipped");
            return Ok(());
        }
        tracing::debug!(
            libraries = state.groups.len(),
            slots = state.groups.slot_count(),
            accessors = state.tree.member_count(),
            "rendering imports"
        );
        state.output = Some(render_imports(
            &state.tree,
            &state.groups,
            &self.namespace,
            &self.tool,
        ));
        Ok(())
    }
}
