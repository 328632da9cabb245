//! Resolution of manifest type strings to [`TypeRef`]s.

use indexmap::IndexMap;
use natbind_ir::{TypeKind, TypeRef};

use crate::schema::{TypeConfig, TypeParamConfig};

/// Built-in value types that are neither `char` nor `byte`.
const PRIMITIVES: &[&str] = &[
    "bool", "sbyte", "short", "ushort", "int", "uint", "long", "ulong", "nint", "nuint", "float",
    "double", "decimal",
];

const SPAN_PREFIXES: &[&str] = &[
    "ReadOnlySpan<",
    "System.ReadOnlySpan<",
    "global::System.ReadOnlySpan<",
];

/// Resolves type strings against the declared types and a member's type
/// parameters.
///
/// Accepted forms: C# keywords, `T?`, `T*`, `ReadOnlySpan<T>`, declared type
/// keys (`Demo.Point`, `Demo.Outer+Inner`) and type parameter names.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    types: &'a IndexMap<String, TypeConfig>,
    type_params: &'a [TypeParamConfig],
}

impl<'a> TypeResolver<'a> {
    pub fn new(types: &'a IndexMap<String, TypeConfig>, type_params: &'a [TypeParamConfig]) -> Self {
        Self { types, type_params }
    }

    /// `None` when the string names nothing known.
    pub fn resolve(&self, text: &str) -> Option<TypeRef> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(inner) = text.strip_suffix('?') {
            return self.resolve(inner).map(TypeRef::nullable);
        }
        if let Some(inner) = text.strip_suffix('*') {
            return self.resolve(inner).map(|ty| ty.pointer_to());
        }
        if let Some(inner) = span_element(text) {
            let element = self.resolve(inner)?;
            return Some(TypeRef::new(
                format!("global::System.ReadOnlySpan<{}>", element.name),
                TypeKind::ReadOnlySpan(Box::new(element)),
            ));
        }
        keyword(text)
            .or_else(|| self.type_param(text))
            .or_else(|| self.declared(text))
    }

    fn type_param(&self, text: &str) -> Option<TypeRef> {
        self.type_params.iter().find(|t| t.name == text).map(|t| {
            TypeRef::new(
                t.name.clone(),
                TypeKind::TypeParameter {
                    unmanaged: t.is_unmanaged(),
                },
            )
        })
    }

    fn declared(&self, text: &str) -> Option<TypeRef> {
        let key = text.strip_prefix("global::").unwrap_or(text);
        let config = self.types.get(key)?;
        let kind = if config.is_unmanaged() {
            TypeKind::Unmanaged
        } else {
            TypeKind::Managed
        };
        Some(TypeRef::new(format!("global::{}", key.replace('+', ".")), kind))
    }
}

fn span_element(text: &str) -> Option<&str> {
    let body = text.strip_suffix('>')?;
    SPAN_PREFIXES
        .iter()
        .find_map(|prefix| body.strip_prefix(prefix))
}

fn keyword(text: &str) -> Option<TypeRef> {
    let ty = match text {
        "void" => TypeRef::void(),
        "string" => TypeRef::string(),
        "char" => TypeRef::new("char", TypeKind::Char),
        "byte" => TypeRef::new("byte", TypeKind::Byte),
        "object" => TypeRef::new("object", TypeKind::Managed),
        other if PRIMITIVES.contains(&other) => TypeRef::primitive(other),
        _ => return None,
    };
    Some(ty)
}

#[cfg(test)]
mod tests {
    use natbind_ir::TypeDeclKind;

    use super::*;

    fn types() -> IndexMap<String, TypeConfig> {
        let mut types = IndexMap::new();
        types.insert(
            "Demo.Point".to_string(),
            TypeConfig {
                kind: TypeDeclKind::Struct,
                unmanaged: true,
                ..TypeConfig::default()
            },
        );
        types.insert("Demo.Native+Handle".to_string(), TypeConfig::default());
        types
    }

    #[test]
    fn test_keywords() {
        let types = types();
        let resolver = TypeResolver::new(&types, &[]);
        assert_eq!(resolver.resolve("uint"), Some(TypeRef::primitive("uint")));
        assert!(resolver.resolve("void").unwrap().is_void());
        assert_eq!(resolver.resolve("byte").unwrap().kind, TypeKind::Byte);
        assert_eq!(resolver.resolve("string?").unwrap().name, "string?");
    }

    #[test]
    fn test_pointers_and_spans() {
        let types = types();
        let resolver = TypeResolver::new(&types, &[]);

        let ptr = resolver.resolve("Demo.Point**").unwrap();
        assert_eq!(ptr.name, "global::Demo.Point**");
        assert_eq!(ptr.kind, TypeKind::Pointer);

        let span = resolver.resolve("ReadOnlySpan<byte>").unwrap();
        assert_eq!(span.name, "global::System.ReadOnlySpan<byte>");
        assert!(matches!(span.kind, TypeKind::ReadOnlySpan(ref e) if e.kind == TypeKind::Byte));
    }

    #[test]
    fn test_declared_types() {
        let types = types();
        let resolver = TypeResolver::new(&types, &[]);

        let point = resolver.resolve("Demo.Point").unwrap();
        assert_eq!(point.kind, TypeKind::Unmanaged);
        let handle = resolver.resolve("global::Demo.Native+Handle").unwrap();
        assert_eq!(handle.name, "global::Demo.Native.Handle");
        assert_eq!(handle.kind, TypeKind::Managed);
        assert!(resolver.resolve("Demo.Missing").is_none());
    }

    #[test]
    fn test_type_parameters() {
        let types = types();
        let params = vec![
            TypeParamConfig {
                name: "T".into(),
                constraint: Some("unmanaged".into()),
            },
            TypeParamConfig {
                name: "U".into(),
                constraint: None,
            },
        ];
        let resolver = TypeResolver::new(&types, &params);

        assert!(resolver.resolve("T").unwrap().is_unmanaged());
        assert!(!resolver.resolve("U").unwrap().is_unmanaged());
        assert_eq!(resolver.resolve("T*").unwrap().name, "T*");
    }
}
