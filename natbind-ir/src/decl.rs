//! Declarations as supplied by a declaration provider.

use std::fmt;

use natbind_core::SymbolId;
use serde::{Deserialize, Serialize};

use crate::{RefKind, ReturnRefKind, TypeDeclKind, TypeHandle, TypeRef};

/// Source position of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One namespace segment of a containing chain.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub id: SymbolId,
    pub name: String,
}

/// One containing type of a member.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub id: SymbolId,
    pub name: String,
    pub kind: TypeDeclKind,
    pub type_params: Vec<String>,
    /// Every declaration of the type carries the `partial` modifier.
    pub is_partial: bool,
    pub location: Option<Location>,
}

impl TypeDecl {
    /// Name with its type parameter list, e.g. `Buffer<T>`.
    pub fn header_name(&self) -> String {
        if self.type_params.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, self.type_params.join(", "))
        }
    }

    /// Whether the type can be re-declared to host generated members.
    pub fn is_extensible(&self) -> bool {
        self.is_partial && self.kind.keyword().is_some()
    }
}

/// Namespaces and types enclosing a member, outermost first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainingChain {
    pub namespaces: Vec<NamespaceDecl>,
    pub types: Vec<TypeDecl>,
}

impl ContainingChain {
    /// Dotted namespace, empty for the global namespace.
    pub fn namespace_path(&self) -> String {
        self.namespaces
            .iter()
            .map(|ns| ns.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Dotted path of namespace and enclosing types up to `depth` types.
    pub fn qualified_type_name(&self, depth: usize) -> String {
        self.namespaces
            .iter()
            .map(|ns| ns.name.clone())
            .chain(self.types.iter().take(depth).map(TypeDecl::header_name))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The innermost containing type.
    pub fn innermost(&self) -> Option<&TypeDecl> {
        self.types.last()
    }
}

/// A C# declaration modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    File,
    New,
    Static,
    Abstract,
    Virtual,
    Override,
    Sealed,
    Extern,
    Unsafe,
    Readonly,
    Required,
    Partial,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Internal => "internal",
            Modifier::File => "file",
            Modifier::New => "new",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::Sealed => "sealed",
            Modifier::Extern => "extern",
            Modifier::Unsafe => "unsafe",
            Modifier::Readonly => "readonly",
            Modifier::Required => "required",
            Modifier::Partial => "partial",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub ref_kind: RefKind,
    /// Default value expression, rendered verbatim.
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    /// `where` constraint clause body, e.g. `unmanaged`.
    pub constraint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberShape {
    Method,
    Property { has_get: bool, has_set: bool },
}

/// A member declaration, possibly carrying a generator marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub id: SymbolId,
    pub name: String,
    pub shape: MemberShape,
    /// Modifiers in declaration order.
    pub modifiers: Vec<Modifier>,
    pub has_body: bool,
    pub params: Vec<Param>,
    pub type_params: Vec<TypeParam>,
    /// Return type for methods, property type for properties.
    pub return_type: TypeRef,
    pub return_ref: ReturnRefKind,
    pub containing: ContainingChain,
    pub location: Option<Location>,
    pub marker: Option<Marker>,
}

impl MemberDecl {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has(Modifier::Static)
    }

    pub fn is_partial(&self) -> bool {
        self.has(Modifier::Partial)
    }

    pub fn is_abstract(&self) -> bool {
        self.has(Modifier::Abstract)
    }

    pub fn is_method(&self) -> bool {
        matches!(self.shape, MemberShape::Method)
    }

    pub fn is_property(&self) -> bool {
        matches!(self.shape, MemberShape::Property { .. })
    }

    /// Modifiers as they should be repeated on the implementing declaration.
    pub fn modifiers_text(&self) -> String {
        self.modifiers
            .iter()
            .map(|m| m.keyword())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Qualified name of the declaring type, e.g. `Demo.Sdl`.
    pub fn container_name(&self) -> String {
        self.containing
            .qualified_type_name(self.containing.types.len())
    }

    fn type_param_suffix(&self) -> String {
        if self.type_params.is_empty() {
            String::new()
        } else {
            let names: Vec<_> = self.type_params.iter().map(|t| t.name.as_str()).collect();
            format!("<{}>", names.join(", "))
        }
    }

    /// Name used in diagnostics, e.g. `Demo.Sdl.Init(uint)`.
    pub fn display_name(&self) -> String {
        let mut out = format!(
            "{}.{}{}",
            self.container_name(),
            self.name,
            self.type_param_suffix()
        );
        if self.is_method() {
            let params: Vec<_> = self
                .params
                .iter()
                .map(|p| format!("{}{}", p.ref_kind.keyword(), p.ty.short_name()))
                .collect();
            out.push('(');
            out.push_str(&params.join(", "));
            out.push(')');
        }
        out
    }

    /// Signature including the return type, e.g. `uint Demo.Sdl.Init(uint)`.
    pub fn signature_display(&self) -> String {
        format!(
            "{}{} {}",
            self.return_ref.keyword(),
            self.return_type.short_name(),
            self.display_name()
        )
    }
}

/// Argument of a formatted constant.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    String(String),
    /// Renders as the empty string.
    Null,
}

/// Payload of a native symbol marker.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolMarker {
    pub library: Option<TypeHandle>,
    pub condition: Option<TypeHandle>,
    /// Explicit symbol name; the member name is used when absent.
    pub symbol_name: Option<String>,
    /// Raw access kind value.
    pub kind: i32,
}

/// Payload of a native function marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionMarker {
    pub library: Option<TypeHandle>,
    pub condition: Option<TypeHandle>,
    pub symbol_name: Option<String>,
    pub call_convs: Vec<TypeHandle>,
}

/// Payload of a formatted constant marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantMarker {
    pub format: Option<String>,
    pub args: Vec<FormatArg>,
    /// Raw culture value.
    pub culture: i32,
}

/// Generator marker attached to a member.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    NativeSymbol(SymbolMarker),
    NativeFunction(FunctionMarker),
    FormattedConstant(ConstantMarker),
}

/// Pass-wide facts about the consuming compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub assembly: String,
    pub allow_unsafe: bool,
    /// Metadata names of runtime types available to the compilation.
    pub known_types: Vec<String>,
}

impl Compilation {
    pub const READ_ONLY_SPAN: &'static str = "System.ReadOnlySpan`1";

    pub fn knows_type(&self, metadata_name: &str) -> bool {
        self.known_types.iter().any(|t| t == metadata_name)
    }
}

impl Default for Compilation {
    fn default() -> Self {
        Self {
            assembly: "Natbind.Generated".to_string(),
            allow_unsafe: true,
            known_types: vec![Self::READ_ONLY_SPAN.to_string()],
        }
    }
}
