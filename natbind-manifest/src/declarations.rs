//! Conversion of a parsed manifest into the declaration model.

use natbind_core::SymbolTable;
use natbind_ir::{
    Accessibility, Compilation, ConstantMarker, ContainingChain, FormatArg, FunctionMarker,
    Marker, MemberDecl, MemberShape, NamespaceDecl, Param, SymbolMarker, TypeDecl, TypeHandle,
    TypeParam, TypeRef,
};
use toml::Spanned;

use crate::{
    Manifest, Result,
    manifest::find_quoted,
    schema::{ArgValue, MemberConfig, ShapeConfig, TypeConfig, TypedArg},
    types::TypeResolver,
};

/// Namespace of the runtime's calling convention marker types.
const CALL_CONV_NAMESPACE: &str = "System.Runtime.CompilerServices";

/// Everything the generators need from a manifest.
#[derive(Debug, Clone)]
pub struct Declarations {
    pub compilation: Compilation,
    /// Members in manifest order.
    pub members: Vec<MemberDecl>,
    /// Interner holding every namespace, type and member key.
    pub symbols: SymbolTable,
}

impl Manifest {
    /// Build the compilation facts and member declarations.
    ///
    /// Library and condition types that are not declared under `[types]`
    /// resolve to handles with [`Accessibility::Unresolved`]; the generator
    /// reports them.
    pub fn declarations(&self) -> Result<Declarations> {
        let mut builder = DeclarationBuilder {
            manifest: self,
            symbols: SymbolTable::new(),
        };
        let members = self
            .members
            .iter()
            .map(|member| builder.member(member))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            members = members.len(),
            symbols = builder.symbols.len(),
            "resolved declarations"
        );
        Ok(Declarations {
            compilation: self.compilation.to_compilation(),
            members,
            symbols: builder.symbols,
        })
    }
}

struct DeclarationBuilder<'a> {
    manifest: &'a Manifest,
    symbols: SymbolTable,
}

impl DeclarationBuilder<'_> {
    fn member(&mut self, member: &Spanned<MemberConfig>) -> Result<MemberDecl> {
        let manifest = self.manifest;
        let ctx = manifest.source();
        let config = member.get_ref();
        let display = config.display_name();
        let resolver = TypeResolver::new(&manifest.types, &config.type_params);
        let resolve = |text: &str, context: String| -> Result<TypeRef> {
            resolver.resolve(text).ok_or_else(|| {
                let span = find_quoted(ctx.src(), member.span(), text);
                ctx.unknown_type_error(text, context, span)
            })
        };

        let return_type = resolve(&config.returns, format!("return type of '{display}'"))?;
        let params = config
            .params
            .iter()
            .map(|p| {
                Ok(Param {
                    name: p.name.clone(),
                    ty: resolve(&p.ty, format!("parameter '{}' of '{display}'", p.name))?,
                    ref_kind: p.ref_kind,
                    default: p.default.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (shape, key) = match config.shape {
            ShapeConfig::Method => {
                let types: Vec<_> = config.params.iter().map(|p| p.ty.trim()).collect();
                (
                    MemberShape::Method,
                    format!("M:{}.{}({})", config.container, config.name, types.join(",")),
                )
            }
            ShapeConfig::Property => (
                MemberShape::Property {
                    has_get: config.get,
                    has_set: config.set,
                },
                format!("P:{}.{}", config.container, config.name),
            ),
        };

        let containing = self.chain(&config.container);
        let marker = self.marker(config);
        Ok(MemberDecl {
            id: self.symbols.intern(&key),
            name: config.name.clone(),
            shape,
            modifiers: config.modifiers.clone(),
            has_body: config.body,
            params,
            type_params: config
                .type_params
                .iter()
                .map(|t| TypeParam {
                    name: t.name.clone(),
                    constraint: t.constraint.clone(),
                })
                .collect(),
            return_type,
            return_ref: config.return_ref,
            containing,
            location: Some(manifest.location(member.span().start)),
            marker,
        })
    }

    /// Containing chain for a metadata-style key such as `Demo.Video.Sdl+Inner`.
    fn chain(&mut self, container: &str) -> ContainingChain {
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

        let default = TypeConfig::default();
        let mut key = outer.to_string();
        let names =
            std::iter::once(first_type).chain(nested.into_iter().flat_map(|n| n.split('+')));
        for (i, name) in names.enumerate() {
            if i > 0 {
                key.push('+');
                key.push_str(name);
            }
            let config = self.manifest.types.get(&key).unwrap_or(&default);
            chain.types.push(TypeDecl {
                id: self.symbols.intern(&format!("T:{key}")),
                name: name.to_string(),
                kind: config.kind,
                type_params: config.type_params.clone(),
                is_partial: config.partial,
                location: self.manifest.type_location(&key),
            });
        }
        chain
    }

    fn marker(&mut self, config: &MemberConfig) -> Option<Marker> {
        if let Some(symbol) = &config.symbol {
            return Some(Marker::NativeSymbol(SymbolMarker {
                library: symbol.library.as_deref().map(|key| self.handle(key)),
                condition: symbol.condition.as_deref().map(|key| self.handle(key)),
                symbol_name: symbol.name.clone(),
                // Unknown names are rejected at parse time.
                kind: symbol.kind.access_kind().unwrap_or_default(),
            }));
        }
        if let Some(function) = &config.function {
            return Some(Marker::NativeFunction(FunctionMarker {
                library: function.library.as_deref().map(|key| self.handle(key)),
                condition: function.condition.as_deref().map(|key| self.handle(key)),
                symbol_name: function.name.clone(),
                call_convs: function
                    .call_convs
                    .iter()
                    .map(|name| self.call_conv(name))
                    .collect(),
            }));
        }
        config.constant.as_ref().map(|constant| {
            Marker::FormattedConstant(ConstantMarker {
                format: constant.format.clone(),
                args: constant.args.iter().map(format_arg).collect(),
                culture: constant.culture.culture().unwrap_or_default(),
            })
        })
    }

    fn handle(&mut self, key: &str) -> TypeHandle {
        let key = key.strip_prefix("global::").unwrap_or(key);
        let accessibility = self.effective_accessibility(key);
        TypeHandle::new(
            self.symbols.intern(&format!("T:{key}")),
            key.replace('+', "."),
            accessibility,
        )
    }

    /// Narrowest accessibility along `Outer+Inner`; an undeclared link makes
    /// the whole chain unresolved.
    fn effective_accessibility(&self, key: &str) -> Accessibility {
        let mut prefix = String::new();
        key.split('+')
            .fold(Accessibility::Public, |effective, segment| {
                if !prefix.is_empty() {
                    prefix.push('+');
                }
                prefix.push_str(segment);
                let declared = self
                    .manifest
                    .types
                    .get(&prefix)
                    .map_or(Accessibility::Unresolved, |t| t.accessibility);
                effective.narrower(declared)
            })
    }

    /// `Cdecl`, `CallConvCdecl` and the fully qualified name all denote the
    /// same runtime type.
    fn call_conv(&mut self, name: &str) -> TypeHandle {
        let simple = name.rsplit('.').next().unwrap_or(name);
        let full = if simple.starts_with("CallConv") {
            format!("{CALL_CONV_NAMESPACE}.{simple}")
        } else {
            format!("{CALL_CONV_NAMESPACE}.CallConv{simple}")
        };
        if self.manifest.types.contains_key(&full) {
            return self.handle(&full);
        }
        TypeHandle::new(
            self.symbols.intern(&format!("T:{full}")),
            full,
            Accessibility::Public,
        )
    }
}

fn format_arg(value: &ArgValue) -> FormatArg {
    match value {
        ArgValue::Bool(b) => FormatArg::Bool(*b),
        ArgValue::Int(i) => FormatArg::Int(*i),
        ArgValue::Float(f) => FormatArg::Float(*f),
        ArgValue::String(s) => FormatArg::String(s.clone()),
        ArgValue::Typed(TypedArg::Char(c)) => FormatArg::Char(*c),
        ArgValue::Typed(TypedArg::Uint(u)) => FormatArg::UInt(*u),
        ArgValue::Typed(TypedArg::Null(_)) => FormatArg::Null,
    }
}

#[cfg(test)]
mod tests {
    use natbind_ir::{RefKind, TypeDeclKind, TypeKind};

    use super::*;

    const SDL: &str = r#"
[compilation]
assembly = "Demo"

[types."Demo.SdlLibrary"]
accessibility = "public"

[types."Demo.Video+Sdl"]
kind = "struct"

[types."Demo.Event"]
kind = "struct"
unmanaged = true

[[members]]
container = "Demo.Video+Sdl"
name = "Init"
returns = "uint"
params = [{ name = "flags", type = "uint" }]
[members.symbol]
library = "Demo.SdlLibrary"
name = "SDL_Init"

[[members]]
container = "Demo.Video+Sdl"
name = "PollEvent"
returns = "int"
params = [{ name = "ev", type = "Demo.Event", ref = "out" }]
[members.function]
library = "Demo.Missing"
call_convs = ["Cdecl", "System.Runtime.CompilerServices.CallConvSuppressGCTransition"]

[[members]]
container = "Demo.Consts"
name = "Greeting"
shape = "property"
returns = "string"
[members.constant]
format = "{0} {1}"
args = ["Hi", { char = "!" }]
culture = "invariant"
"#;

    fn declarations() -> Declarations {
        SDL.parse::<Manifest>().unwrap().declarations().unwrap()
    }

    #[test]
    fn test_compilation_from_manifest() {
        let decls = declarations();
        assert_eq!(decls.compilation.assembly, "Demo");
        assert!(decls.compilation.allow_unsafe);
        assert_eq!(decls.members.len(), 3);
    }

    #[test]
    fn test_nested_container_chain() {
        let decls = declarations();
        let init = &decls.members[0];

        let namespaces: Vec<_> = init.containing.namespaces.iter().map(|n| &n.name).collect();
        let types: Vec<_> = init.containing.types.iter().map(|t| &t.name).collect();
        assert_eq!(namespaces, vec!["Demo"]);
        assert_eq!(types, vec!["Video", "Sdl"]);
        assert_eq!(init.containing.types[0].kind, TypeDeclKind::Class);
        assert_eq!(init.containing.types[1].kind, TypeDeclKind::Struct);
        assert!(init.containing.types[1].location.is_some());
        assert_eq!(init.display_name(), "Demo.Video.Sdl.Init(uint)");
    }

    #[test]
    fn test_symbol_marker() {
        let decls = declarations();
        let Some(Marker::NativeSymbol(symbol)) = &decls.members[0].marker else {
            panic!("expected a symbol marker");
        };
        let library = symbol.library.as_ref().unwrap();
        assert_eq!(library.name, "Demo.SdlLibrary");
        assert_eq!(library.accessibility, Accessibility::Public);
        assert_eq!(symbol.symbol_name.as_deref(), Some("SDL_Init"));
        assert_eq!(symbol.kind, 0);
    }

    #[test]
    fn test_function_marker_call_convs_and_unresolved_library() {
        let decls = declarations();
        let member = &decls.members[1];
        assert_eq!(member.params[0].ref_kind, RefKind::Out);
        assert_eq!(member.params[0].ty.kind, TypeKind::Unmanaged);

        let Some(Marker::NativeFunction(function)) = &member.marker else {
            panic!("expected a function marker");
        };
        assert_eq!(
            function.library.as_ref().unwrap().accessibility,
            Accessibility::Unresolved
        );
        let convs: Vec<_> = function.call_convs.iter().map(|c| c.simple_name()).collect();
        assert_eq!(convs, vec!["CallConvCdecl", "CallConvSuppressGCTransition"]);
        assert!(
            function
                .call_convs
                .iter()
                .all(|c| c.accessibility == Accessibility::Public)
        );
    }

    #[test]
    fn test_nested_library_takes_narrowest_accessibility() {
        let manifest: Manifest = r#"
[types."Demo.Host"]
[types."Demo.Host+Hidden"]
accessibility = "private"
[types."Demo.Host+Hidden+Lib"]
accessibility = "public"
[types."Demo.Host+Open"]
accessibility = "public"
[types."Demo.Host+Open+Lib"]
accessibility = "public"
[types."Demo.Loose+Lib"]
accessibility = "public"

[[members]]
container = "Demo.Sdl"
name = "A"
[members.function]
library = "Demo.Host+Hidden+Lib"
condition = "Demo.Loose+Lib"

[[members]]
container = "Demo.Sdl"
name = "B"
[members.function]
library = "Demo.Host+Open+Lib"
"#
        .parse()
        .unwrap();
        let decls = manifest.declarations().unwrap();

        let handles: Vec<_> = decls
            .members
            .iter()
            .map(|m| match &m.marker {
                Some(Marker::NativeFunction(f)) => f,
                _ => panic!("expected a function marker"),
            })
            .collect();
        let hidden = handles[0].library.as_ref().unwrap();
        assert_eq!(hidden.accessibility, Accessibility::Private);
        assert_eq!(hidden.name, "Demo.Host.Hidden.Lib");
        // `Demo.Loose` itself is not declared.
        let loose = handles[0].condition.as_ref().unwrap();
        assert_eq!(loose.accessibility, Accessibility::Unresolved);
        let open = handles[1].library.as_ref().unwrap();
        assert_eq!(open.accessibility, Accessibility::Internal);
    }

    #[test]
    fn test_constant_marker() {
        let decls = declarations();
        let member = &decls.members[2];
        assert!(member.is_property());
        let Some(Marker::FormattedConstant(constant)) = &member.marker else {
            panic!("expected a constant marker");
        };
        assert_eq!(
            constant.args,
            vec![FormatArg::String("Hi".into()), FormatArg::Char('!')]
        );
        assert_eq!(constant.culture, 1);
    }

    #[test]
    fn test_member_locations() {
        let decls = declarations();
        let lines: Vec<_> = decls
            .members
            .iter()
            .map(|m| m.location.as_ref().unwrap().line)
            .collect();
        assert!(lines.windows(2).all(|w| w[0] < w[1]), "{lines:?}");
        assert_eq!(decls.members[0].location.as_ref().unwrap().file, "natbind.toml");
    }

    #[test]
    fn test_same_keys_share_ids() {
        let decls = declarations();
        let sdl = decls.members[0].containing.types[1].id;
        assert_eq!(decls.members[1].containing.types[1].id, sdl);
        assert_ne!(decls.members[0].id, decls.members[1].id);
        assert_eq!(decls.symbols.get("T:Demo.Video+Sdl"), Some(sdl));
    }
}
