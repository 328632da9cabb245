//! Declaration fixtures for tests.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.
//!
//! Containers use metadata-style keys: `Demo.Video.Sdl+Inner` is the type
//! `Inner` nested in `Sdl`, inside namespace `Demo.Video`.

use std::collections::HashMap;

use natbind_core::{SymbolId, SymbolTable};
use natbind_ir::{
    Accessibility, ConstantMarker, ContainingChain, FormatArg, FunctionMarker, Location, Marker,
    MemberDecl, MemberShape, Modifier, NamespaceDecl, Param, RefKind, ReturnRefKind,
    SymbolMarker, TypeDecl, TypeDeclKind, TypeHandle, TypeKind, TypeParam, TypeRef,
};

/// Interns ids and builds declarations with sensible defaults.
#[derive(Debug, Default)]
pub struct Fixtures {
    symbols: SymbolTable,
    types: HashMap<String, (TypeDeclKind, bool)>,
}

impl Fixtures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn intern(&mut self, key: &str) -> SymbolId {
        self.symbols.intern(key)
    }

    /// Override the kind and partial flag of a container type.
    pub fn declare_type(&mut self, key: &str, kind: TypeDeclKind, partial: bool) -> &mut Self {
        self.types.insert(key.to_string(), (kind, partial));
        self
    }

    /// An `internal` type handle.
    pub fn library(&mut self, name: &str) -> TypeHandle {
        self.handle(name, Accessibility::Internal)
    }

    pub fn handle(&mut self, name: &str, accessibility: Accessibility) -> TypeHandle {
        let id = self.symbols.intern(&format!("T:{name}"));
        TypeHandle::new(id, name.replace('+', "."), accessibility)
    }

    /// Containing chain for a metadata-style container key.
    pub fn chain(&mut self, container: &str) -> ContainingChain {
        let (outer, nested) = match container.split_once('+') {
            Some((outer, nested)) => (outer, Some(nested)),
            None => (container, None),
        };
        let (namespace, first_type) = match outer.rsplit_once('.') {
            Some((ns, ty)) => (Some(ns), ty),
            None => (None, outer),
        };

        let mut chain = ContainingChain::default();
        if let Some(namespace) = namespace {
            let mut path = String::new();
            for segment in namespace.split('.') {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(segment);
                chain.namespaces.push(NamespaceDecl {
                    id: self.symbols.intern(&format!("N:{path}")),
                    name: segment.to_string(),
                });
            }
        }

        let mut key = outer.to_string();
        let names = std::iter::once(first_type).chain(nested.into_iter().flat_map(|n| n.split('+')));
        for (i, name) in names.enumerate() {
            if i > 0 {
                key.push('+');
                key.push_str(name);
            }
            let (kind, is_partial) = self
                .types
                .get(&key)
                .copied()
                .unwrap_or((TypeDeclKind::Class, true));
            chain.types.push(TypeDecl {
                id: self.symbols.intern(&format!("T:{key}")),
                name: name.to_string(),
                kind,
                type_params: Vec::new(),
                is_partial,
                location: None,
            });
        }
        chain
    }

    /// An `internal static partial` method returning `void`.
    pub fn method(&mut self, container: &str, name: &str) -> MemberBuilder {
        self.member(container, name, MemberShape::Method)
    }

    /// An `internal static partial` property.
    pub fn property(
        &mut self,
        container: &str,
        name: &str,
        has_get: bool,
        has_set: bool,
    ) -> MemberBuilder {
        self.member(container, name, MemberShape::Property { has_get, has_set })
    }

    fn member(&mut self, container: &str, name: &str, shape: MemberShape) -> MemberBuilder {
        let containing = self.chain(container);
        MemberBuilder {
            decl: MemberDecl {
                id: self.symbols.intern(&format!("M:{container}.{name}")),
                name: name.to_string(),
                shape,
                modifiers: vec![Modifier::Internal, Modifier::Static, Modifier::Partial],
                has_body: false,
                params: Vec::new(),
                type_params: Vec::new(),
                return_type: TypeRef::void(),
                return_ref: ReturnRefKind::None,
                containing,
                location: None,
                marker: None,
            },
        }
    }

    pub fn span_of_char() -> TypeRef {
        TypeRef::new(
            "global::System.ReadOnlySpan<char>",
            TypeKind::ReadOnlySpan(Box::new(TypeRef::new("char", TypeKind::Char))),
        )
    }

    pub fn span_of_bytes() -> TypeRef {
        TypeRef::new(
            "global::System.ReadOnlySpan<byte>",
            TypeKind::ReadOnlySpan(Box::new(TypeRef::new("byte", TypeKind::Byte))),
        )
    }
}

/// Fluent builder for a [`MemberDecl`].
#[derive(Debug, Clone)]
pub struct MemberBuilder {
    decl: MemberDecl,
}

impl MemberBuilder {
    pub fn id(mut self, id: SymbolId) -> Self {
        self.decl.id = id;
        self
    }

    pub fn modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.decl.modifiers = modifiers.to_vec();
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.decl.return_type = ty;
        self
    }

    pub fn returns_ref(mut self, kind: ReturnRefKind) -> Self {
        self.decl.return_ref = kind;
        self
    }

    pub fn param(self, name: &str, ty: TypeRef) -> Self {
        self.ref_param(name, ty, RefKind::None)
    }

    pub fn ref_param(mut self, name: &str, ty: TypeRef, ref_kind: RefKind) -> Self {
        self.decl.params.push(Param {
            name: name.to_string(),
            ty,
            ref_kind,
            default: None,
        });
        self
    }

    pub fn type_param(mut self, name: &str, constraint: Option<&str>) -> Self {
        self.decl.type_params.push(TypeParam {
            name: name.to_string(),
            constraint: constraint.map(str::to_string),
        });
        self
    }

    pub fn with_body(mut self) -> Self {
        self.decl.has_body = true;
        self
    }

    pub fn located(mut self, line: u32) -> Self {
        self.decl.location = Some(Location::new("natbind.toml", line, 1));
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.decl.marker = Some(marker);
        self
    }

    pub fn symbol(self, library: TypeHandle, name: Option<&str>, kind: i32) -> Self {
        self.marker(Marker::NativeSymbol(SymbolMarker {
            library: Some(library),
            condition: None,
            symbol_name: name.map(str::to_string),
            kind,
        }))
    }

    pub fn conditional_symbol(
        self,
        library: TypeHandle,
        condition: TypeHandle,
        name: Option<&str>,
        kind: i32,
    ) -> Self {
        self.marker(Marker::NativeSymbol(SymbolMarker {
            library: Some(library),
            condition: Some(condition),
            symbol_name: name.map(str::to_string),
            kind,
        }))
    }

    pub fn function(self, library: TypeHandle, name: Option<&str>) -> Self {
        self.function_with(library, name, Vec::new())
    }

    pub fn function_with(
        self,
        library: TypeHandle,
        name: Option<&str>,
        call_convs: Vec<TypeHandle>,
    ) -> Self {
        self.marker(Marker::NativeFunction(FunctionMarker {
            library: Some(library),
            condition: None,
            symbol_name: name.map(str::to_string),
            call_convs,
        }))
    }

    pub fn constant(self, format: Option<&str>, args: Vec<FormatArg>) -> Self {
        self.marker(Marker::FormattedConstant(ConstantMarker {
            format: format.map(str::to_string),
            args,
            culture: 0,
        }))
    }

    pub fn build(self) -> MemberDecl {
        self.decl
    }
}
