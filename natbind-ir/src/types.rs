//! Type references and type-level metadata.

use std::fmt;

use natbind_core::SymbolId;
use serde::{Deserialize, Serialize};

/// Classification of a referenced type, as far as the generators care.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `void`.
    Void,
    /// A built-in numeric or `bool` value type.
    Primitive,
    /// `string`.
    String,
    /// `char`.
    Char,
    /// `byte`.
    Byte,
    /// `T*` or a function pointer.
    Pointer,
    /// A user value type with a fixed layout (enum or unmanaged struct).
    Unmanaged,
    /// A method type parameter; fixed-layout only under an `unmanaged` constraint.
    TypeParameter { unmanaged: bool },
    /// `System.ReadOnlySpan<T>`.
    ReadOnlySpan(Box<TypeRef>),
    /// Anything else: classes, interfaces, managed structs.
    Managed,
}

/// A reference to a type as it appears in a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    /// Display name in generated code, e.g. `uint` or `global::Demo.Point`.
    pub name: String,
    pub kind: TypeKind,
    /// Declared with a trailing `?`.
    pub nullable: bool,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
        }
    }

    pub fn void() -> Self {
        Self::new("void", TypeKind::Void)
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Primitive)
    }

    pub fn string() -> Self {
        Self::new("string", TypeKind::String)
    }

    /// Mark this type as nullable, appending `?` to its display name.
    pub fn nullable(mut self) -> Self {
        if !self.nullable {
            self.name.push('?');
            self.nullable = true;
        }
        self
    }

    /// The pointer type `T*` for this type.
    pub fn pointer_to(&self) -> TypeRef {
        TypeRef::new(format!("{}*", self.name), TypeKind::Pointer)
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }

    /// Whether the type has a fixed memory layout (C# `unmanaged`).
    pub fn is_unmanaged(&self) -> bool {
        match &self.kind {
            TypeKind::Primitive
            | TypeKind::Char
            | TypeKind::Byte
            | TypeKind::Pointer
            | TypeKind::Unmanaged => true,
            TypeKind::TypeParameter { unmanaged } => *unmanaged,
            TypeKind::Void | TypeKind::String | TypeKind::ReadOnlySpan(_) | TypeKind::Managed => {
                false
            }
        }
    }

    /// Display name without the `global::` qualifier, for comments and messages.
    pub fn short_name(&self) -> String {
        self.name.replace("global::", "")
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// By-reference kind of a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
    RefReadonly,
}

impl RefKind {
    /// Modifier as written in a parameter list, with trailing space.
    pub fn keyword(self) -> &'static str {
        match self {
            RefKind::None => "",
            RefKind::Ref => "ref ",
            RefKind::Out => "out ",
            RefKind::In => "in ",
            RefKind::RefReadonly => "ref readonly ",
        }
    }

    /// Modifier as written at a call site, with trailing space.
    pub fn argument_keyword(self) -> &'static str {
        match self {
            RefKind::None => "",
            RefKind::Ref => "ref ",
            RefKind::Out => "out ",
            RefKind::In | RefKind::RefReadonly => "in ",
        }
    }

    /// True for parameters whose address can be pinned (`ref`, `in`, `ref readonly`).
    pub fn is_pinnable(self) -> bool {
        matches!(self, RefKind::Ref | RefKind::In | RefKind::RefReadonly)
    }
}

/// By-reference kind of a return value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnRefKind {
    #[default]
    None,
    Ref,
    RefReadonly,
}

impl ReturnRefKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ReturnRefKind::None => "",
            ReturnRefKind::Ref => "ref ",
            ReturnRefKind::RefReadonly => "ref readonly ",
        }
    }

    pub fn is_by_ref(self) -> bool {
        !matches!(self, ReturnRefKind::None)
    }
}

/// Declared accessibility of a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accessibility {
    Public,
    #[default]
    Internal,
    ProtectedInternal,
    Protected,
    PrivateProtected,
    Private,
    File,
    /// The type could not be found by the declaration provider.
    Unresolved,
}

impl Accessibility {
    /// Reach from outside the declaring type; wider is larger.
    fn reach(self) -> u8 {
        match self {
            Accessibility::Public => 7,
            Accessibility::ProtectedInternal => 6,
            Accessibility::Internal => 5,
            Accessibility::Protected => 4,
            Accessibility::PrivateProtected => 3,
            Accessibility::Private => 2,
            Accessibility::File => 1,
            Accessibility::Unresolved => 0,
        }
    }

    /// The narrower of two accessibilities.
    ///
    /// A nested type is never more visible than its container, so folding
    /// this over a containing chain gives the effective accessibility.
    pub fn narrower(self, other: Accessibility) -> Accessibility {
        if other.reach() < self.reach() { other } else { self }
    }
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeDeclKind {
    #[default]
    Class,
    Struct,
    Record,
    RecordStruct,
    Interface,
    Enum,
    Delegate,
}

impl TypeDeclKind {
    /// Keyword used in a `partial` re-declaration, if the kind can be re-declared.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            TypeDeclKind::Class => Some("class"),
            TypeDeclKind::Struct => Some("struct"),
            TypeDeclKind::Record => Some("record"),
            TypeDeclKind::RecordStruct => Some("record struct"),
            TypeDeclKind::Interface => Some("interface"),
            TypeDeclKind::Enum | TypeDeclKind::Delegate => None,
        }
    }
}

/// Opaque identity of a referenced type (library, condition, calling convention).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    pub id: SymbolId,
    /// Dotted name without `global::`, nested types joined with `.`.
    pub name: String,
    pub accessibility: Accessibility,
}

impl TypeHandle {
    pub fn new(id: SymbolId, name: impl Into<String>, accessibility: Accessibility) -> Self {
        Self {
            id,
            name: name.into(),
            accessibility,
        }
    }

    /// `global::`-qualified name for use in generated code.
    pub fn qualified(&self) -> String {
        format!("global::{}", self.name)
    }

    /// Simple name, the last dotted segment.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use natbind_core::SymbolTable;

    use super::*;

    #[test]
    fn test_unmanaged_classification() {
        assert!(TypeRef::primitive("int").is_unmanaged());
        assert!(TypeRef::new("byte", TypeKind::Byte).is_unmanaged());
        assert!(TypeRef::string().pointer_to().is_unmanaged());
        assert!(!TypeRef::string().is_unmanaged());
        assert!(!TypeRef::void().is_unmanaged());
        assert!(
            TypeRef::new("T", TypeKind::TypeParameter { unmanaged: true }).is_unmanaged()
        );
        assert!(
            !TypeRef::new("T", TypeKind::TypeParameter { unmanaged: false }).is_unmanaged()
        );
    }

    #[test]
    fn test_nullable_appends_once() {
        let ty = TypeRef::string().nullable().nullable();
        assert_eq!(ty.name, "string?");
        assert!(ty.nullable);
    }

    #[test]
    fn test_pointer_to() {
        let ty = TypeRef::new("global::Demo.Point", TypeKind::Unmanaged);
        assert_eq!(ty.pointer_to().name, "global::Demo.Point*");
        assert_eq!(ty.pointer_to().pointer_to().name, "global::Demo.Point**");
        assert_eq!(ty.short_name(), "Demo.Point");
    }

    #[test]
    fn test_ref_keywords() {
        assert_eq!(RefKind::RefReadonly.keyword(), "ref readonly ");
        assert_eq!(RefKind::RefReadonly.argument_keyword(), "in ");
        assert!(RefKind::In.is_pinnable());
        assert!(!RefKind::Out.is_pinnable());
        assert!(ReturnRefKind::RefReadonly.is_by_ref());
    }

    #[test]
    fn test_narrower_accessibility() {
        use Accessibility::*;

        assert_eq!(Public.narrower(Internal), Internal);
        assert_eq!(Internal.narrower(Public), Internal);
        assert_eq!(Public.narrower(Private), Private);
        assert_eq!(ProtectedInternal.narrower(Protected), Protected);
        assert_eq!(Private.narrower(Unresolved), Unresolved);
        assert_eq!(Public.narrower(Public), Public);
    }

    #[test]
    fn test_type_decl_keyword() {
        assert_eq!(TypeDeclKind::RecordStruct.keyword(), Some("record struct"));
        assert_eq!(TypeDeclKind::Enum.keyword(), None);
    }

    #[test]
    fn test_type_handle_names() {
        let mut table = SymbolTable::new();
        let handle = TypeHandle::new(
            table.intern("T:Demo.Native+Sdl"),
            "Demo.Native.Sdl",
            Accessibility::Internal,
        );
        assert_eq!(handle.qualified(), "global::Demo.Native.Sdl");
        assert_eq!(handle.simple_name(), "Sdl");
    }

    #[test]
    fn test_type_handles_dedupe_in_sets() {
        let mut table = SymbolTable::new();
        let id = table.intern("T:Demo.Lib");
        let handles: std::collections::HashSet<_> = [
            TypeHandle::new(id, "Demo.Lib", Accessibility::Public),
            TypeHandle::new(id, "Demo.Lib", Accessibility::Public),
            TypeHandle::new(id, "Demo.Lib", Accessibility::Private),
        ]
        .into_iter()
        .collect();
        assert_eq!(handles.len(), 2);
    }
}
