//! C# declaration syntax shared by both units.

use natbind_core::ToolInfo;
use natbind_ir::{MemberDecl, Param, TypeDecl};

pub const METHOD_IMPL_ATTRIBUTE: &str = "[global::System.Runtime.CompilerServices.MethodImpl(global::System.Runtime.CompilerServices.MethodImplOptions.AggressiveInlining | global::System.Runtime.CompilerServices.MethodImplOptions.AggressiveOptimization)]";

/// First line of every generated unit.
pub const AUTO_GENERATED_HEADER: &str = "// <auto-generated/>";

pub const NULLABLE_ENABLE: &str = "#nullable enable";
pub const NULLABLE_RESTORE: &str = "#nullable restore";

/// `[GeneratedCode(tool, version)]` attribute line.
pub fn generated_code_attribute(tool: &ToolInfo) -> String {
    format!(
        "[global::System.CodeDom.Compiler.GeneratedCode(\"{}\", \"{}\")]",
        tool.name, tool.version
    )
}

pub fn namespace_header(qualified_name: &str) -> String {
    format!("namespace {qualified_name}")
}

/// `partial class Sdl`, `partial record struct Point<T>`, ...
pub fn type_header(decl: &TypeDecl) -> String {
    match decl.kind.keyword() {
        Some(keyword) => format!("partial {keyword} {}", decl.header_name()),
        None => format!("partial {}", decl.header_name()),
    }
}

/// A parameter as declared, e.g. `ref readonly int value = default`.
pub fn parameter(param: &Param) -> String {
    let mut out = format!("{}{} {}", param.ref_kind.keyword(), param.ty, param.name);
    if let Some(default) = &param.default {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

pub fn parameter_list(member: &MemberDecl) -> String {
    let params: Vec<_> = member.params.iter().map(parameter).collect();
    format!("({})", params.join(", "))
}

pub fn type_parameter_list(member: &MemberDecl) -> String {
    if member.type_params.is_empty() {
        return String::new();
    }
    let names: Vec<_> = member.type_params.iter().map(|t| t.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}

pub fn constraint_clauses(member: &MemberDecl) -> String {
    member
        .type_params
        .iter()
        .filter_map(|t| {
            t.constraint
                .as_ref()
                .map(|c| format!(" where {} : {c}", t.name))
        })
        .collect()
}

/// Modifiers, by-ref return, type and name, e.g. `internal static partial ref int Value`.
pub fn member_head(member: &MemberDecl) -> String {
    format!(
        "{} {}{} {}",
        member.modifiers_text(),
        member.return_ref.keyword(),
        member.return_type,
        member.name
    )
}

/// The full implementing method declaration without a body.
pub fn method_signature(member: &MemberDecl) -> String {
    format!(
        "{}{}{}{}",
        member_head(member),
        type_parameter_list(member),
        parameter_list(member),
        constraint_clauses(member)
    )
}
