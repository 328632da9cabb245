//! Tables of `natbind.toml`.

use std::fmt;

use natbind_core::{ToolInfo, Version};
use natbind_ir::{
    AccessKind, Accessibility, Compilation, Modifier, RefKind, ReturnRefKind, TypeDeclKind,
};
use serde::Deserialize;

/// `[generator]`: attribution and marker namespace.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Namespace of the marker types and prefix of every unit name.
    pub namespace: Option<String>,
    /// Tool name written into `GeneratedCode` attributes.
    pub tool: Option<String>,
    pub version: Option<Version>,
}

impl GeneratorConfig {
    pub fn tool_info(&self) -> ToolInfo {
        let default = ToolInfo::default();
        ToolInfo::new(
            self.tool.clone().unwrap_or(default.name),
            self.version.clone().unwrap_or(default.version),
        )
    }
}

/// `[compilation]`: facts about the consuming compilation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilationConfig {
    pub assembly: Option<String>,
    #[serde(default = "default_true")]
    pub allow_unsafe: bool,
    /// Replaces the default list when present.
    pub known_types: Option<Vec<String>>,
}

impl Default for CompilationConfig {
    fn default() -> Self {
        Self {
            assembly: None,
            allow_unsafe: true,
            known_types: None,
        }
    }
}

impl CompilationConfig {
    pub fn to_compilation(&self) -> Compilation {
        let default = Compilation::default();
        Compilation {
            assembly: self.assembly.clone().unwrap_or(default.assembly),
            allow_unsafe: self.allow_unsafe,
            known_types: self.known_types.clone().unwrap_or(default.known_types),
        }
    }
}

/// `[types."Ns.Outer+Inner"]`: a declared type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeConfig {
    #[serde(default)]
    pub kind: TypeDeclKind,
    #[serde(default = "default_true")]
    pub partial: bool,
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Value type with a fixed layout; enums always are.
    #[serde(default)]
    pub unmanaged: bool,
    #[serde(default)]
    pub type_params: Vec<String>,
}

impl Default for TypeConfig {
    fn default() -> Self {
        Self {
            kind: TypeDeclKind::Class,
            partial: true,
            accessibility: Accessibility::Internal,
            unmanaged: false,
            type_params: Vec::new(),
        }
    }
}

impl TypeConfig {
    pub fn is_unmanaged(&self) -> bool {
        match self.kind {
            TypeDeclKind::Enum => true,
            TypeDeclKind::Struct | TypeDeclKind::RecordStruct => self.unmanaged,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeConfig {
    #[default]
    Method,
    Property,
}

/// One `[[members]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberConfig {
    /// Metadata-style container key, e.g. `Demo.Video.Sdl+Inner`.
    pub container: String,
    pub name: String,
    #[serde(default)]
    pub shape: ShapeConfig,
    #[serde(default = "default_modifiers")]
    pub modifiers: Vec<Modifier>,
    #[serde(default = "default_returns")]
    pub returns: String,
    #[serde(default)]
    pub return_ref: ReturnRefKind,
    #[serde(default)]
    pub params: Vec<ParamConfig>,
    #[serde(default)]
    pub type_params: Vec<TypeParamConfig>,
    /// The declaration already has an implementation.
    #[serde(default)]
    pub body: bool,
    #[serde(default = "default_true")]
    pub get: bool,
    #[serde(default)]
    pub set: bool,
    pub symbol: Option<SymbolConfig>,
    pub function: Option<FunctionConfig>,
    pub constant: Option<ConstantConfig>,
}

impl MemberConfig {
    /// `Container.Name`, used in error messages.
    pub fn display_name(&self) -> String {
        format!("{}.{}", self.container.replace('+', "."), self.name)
    }

    pub fn marker_count(&self) -> usize {
        [
            self.symbol.is_some(),
            self.function.is_some(),
            self.constant.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "ref")]
    pub ref_kind: RefKind,
    /// Default value expression, copied verbatim.
    pub default: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeParamConfig {
    pub name: String,
    pub constraint: Option<String>,
}

impl TypeParamConfig {
    pub fn is_unmanaged(&self) -> bool {
        self.constraint
            .as_deref()
            .is_some_and(|c| c.split(',').any(|part| part.trim() == "unmanaged"))
    }
}

/// An enum member given by name or by raw value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Raw(i32),
    Name(String),
}

impl Default for EnumValue {
    fn default() -> Self {
        EnumValue::Raw(0)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Raw(raw) => write!(f, "{raw}"),
            EnumValue::Name(name) => f.write_str(name),
        }
    }
}

impl EnumValue {
    /// Raw value of a symbol access kind; `None` for an unknown name.
    pub fn access_kind(&self) -> Option<i32> {
        match self {
            EnumValue::Raw(raw) => Some(*raw),
            EnumValue::Name(name) => AccessKind::from_name(name).map(AccessKind::raw),
        }
    }

    /// Raw value of a format culture; `None` for an unknown name.
    pub fn culture(&self) -> Option<i32> {
        match self {
            EnumValue::Raw(raw) => Some(*raw),
            EnumValue::Name(name) => match name.as_str() {
                "Default" | "default" => Some(0),
                "Invariant" | "invariant" => Some(1),
                _ => None,
            },
        }
    }
}

/// `[members.symbol]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymbolConfig {
    /// Type key of the library descriptor.
    pub library: Option<String>,
    pub condition: Option<String>,
    /// Exported symbol name; the member name when absent.
    pub name: Option<String>,
    /// `auto`, `getter`, `setter`, `reference` or a raw value.
    #[serde(default)]
    pub kind: EnumValue,
}

/// `[members.function]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionConfig {
    pub library: Option<String>,
    pub condition: Option<String>,
    pub name: Option<String>,
    /// Calling conventions, e.g. `Cdecl` or `SuppressGCTransition`.
    #[serde(default)]
    pub call_convs: Vec<String>,
}

/// `[members.constant]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstantConfig {
    pub format: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgValue>,
    /// `default`, `invariant` or a raw value.
    #[serde(default)]
    pub culture: EnumValue,
}

/// A format argument. Plain TOML values map to themselves; characters,
/// unsigned integers and null use a one-key inline table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Typed(TypedArg),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypedArg {
    Char(char),
    Uint(u64),
    /// `{ null = true }`
    Null(bool),
}

fn default_true() -> bool {
    true
}

fn default_returns() -> String {
    "void".to_string()
}

fn default_modifiers() -> Vec<Modifier> {
    vec![Modifier::Internal, Modifier::Static, Modifier::Partial]
}
