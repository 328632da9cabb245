//! Descriptor extraction from marked member declarations.
//!
//! Extraction only locates the marker payload. Members without a usable
//! payload are skipped silently; everything else is checked later by
//! [`crate::validate`].

use natbind_ir::{
    AccessKind, BindingDescriptor, BindingVariant, ConstantDescriptor, FormatCulture, Marker,
    MemberDecl,
};

/// Binding descriptor for a method carrying a native symbol or function marker.
///
/// Returns `None` for properties, unmarked members and a missing library type.
/// The member name is used when no symbol name is given. A blank name is kept;
/// the emitted loader reports it through the library's error handler.
pub fn extract_binding(member: &MemberDecl) -> Option<BindingDescriptor> {
    if !member.is_method() {
        return None;
    }

    let (library, condition, symbol_name, variant) = match member.marker.as_ref()? {
        Marker::NativeSymbol(marker) => (
            marker.library.as_ref()?,
            marker.condition.clone(),
            marker.symbol_name.as_deref(),
            BindingVariant::Symbol {
                kind: AccessKind::from_raw(marker.kind),
            },
        ),
        Marker::NativeFunction(marker) => (
            marker.library.as_ref()?,
            marker.condition.clone(),
            marker.symbol_name.as_deref(),
            BindingVariant::Function {
                call_convs: marker.call_convs.clone(),
            },
        ),
        Marker::FormattedConstant(_) => return None,
    };

    let symbol_name = symbol_name.unwrap_or(member.name.as_str());

    Some(BindingDescriptor {
        library: library.clone(),
        condition,
        symbol_name: symbol_name.to_string(),
        slot: None,
        target: member.clone(),
        variant,
        location: member.location.clone(),
    })
}

/// Constant descriptor for a method or property carrying a formatted constant marker.
pub fn extract_constant(member: &MemberDecl) -> Option<ConstantDescriptor> {
    let Some(Marker::FormattedConstant(marker)) = &member.marker else {
        return None;
    };

    Some(ConstantDescriptor {
        format: marker.format.clone(),
        args: marker.args.clone(),
        culture: FormatCulture::from_raw(marker.culture),
        target: member.clone(),
        is_property: member.is_property(),
        return_kind: None,
        location: member.location.clone(),
    })
}

#[cfg(test)]
mod tests {
    use natbind_ir::{FormatArg, SymbolMarker, TypeRef};

    use super::*;
    use crate::testing::Fixtures;

    #[test]
    fn test_symbol_name_defaults_to_member_name() {
        let mut fx = Fixtures::new();
        let lib = fx.library("Demo.SdlLibrary");
        let member = fx
            .method("Demo.Sdl", "SDL_GetTicks")
            .returns(TypeRef::primitive("uint"))
            .symbol(lib.clone(), None, 0)
            .build();

        let descriptor = extract_binding(&member).unwrap();
        assert_eq!(descriptor.symbol_name, "SDL_GetTicks");
        assert_eq!(descriptor.library, lib);
        assert_eq!(descriptor.access_kind(), Some(AccessKind::Auto));
        assert!(descriptor.slot.is_none());
    }

    #[test]
    fn test_blank_symbol_name_is_kept() {
        let mut fx = Fixtures::new();
        let lib = fx.library("Demo.SdlLibrary");
        let member = fx
            .method("Demo.Sdl", "Blank")
            .returns(TypeRef::primitive("int"))
            .symbol(lib, Some("   "), 0)
            .build();

        let descriptor = extract_binding(&member).unwrap();
        assert_eq!(descriptor.symbol_name, "   ");
    }

    #[test]
    fn test_function_marker() {
        let mut fx = Fixtures::new();
        let lib = fx.library("Demo.SdlLibrary");
        let cdecl = fx.library("System.Runtime.CompilerServices.CallConvCdecl");
        let member = fx
            .method("Demo.Sdl", "Init")
            .function_with(lib, Some("SDL_Init"), vec![cdecl])
            .build();

        let descriptor = extract_binding(&member).unwrap();
        assert!(descriptor.is_function());
        assert_eq!(descriptor.symbol_name, "SDL_Init");
        assert_eq!(descriptor.access_kind(), None);
    }

    #[test]
    fn test_skips_without_payload() {
        let mut fx = Fixtures::new();
        let lib = fx.library("Demo.SdlLibrary");

        let unmarked = fx.method("Demo.Sdl", "Plain").build();
        assert!(extract_binding(&unmarked).is_none());

        let no_library = fx
            .method("Demo.Sdl", "Orphan")
            .marker(Marker::NativeSymbol(SymbolMarker {
                library: None,
                condition: None,
                symbol_name: None,
                kind: 0,
            }))
            .build();
        assert!(extract_binding(&no_library).is_none());

        let property = fx
            .property("Demo.Sdl", "Value", true, false)
            .symbol(lib, None, 0)
            .build();
        assert!(extract_binding(&property).is_none());
    }

    #[test]
    fn test_constant_on_method_and_property() {
        let mut fx = Fixtures::new();
        let method = fx
            .method("Demo.Consts", "Greeting")
            .constant(Some("Hi {0}"), vec![FormatArg::Int(1)])
            .build();
        let descriptor = extract_constant(&method).unwrap();
        assert!(!descriptor.is_property);
        assert_eq!(descriptor.format.as_deref(), Some("Hi {0}"));
        assert_eq!(descriptor.culture, FormatCulture::Default);

        let property = fx
            .property("Demo.Consts", "Name", true, false)
            .constant(None, Vec::new())
            .build();
        let descriptor = extract_constant(&property).unwrap();
        assert!(descriptor.is_property);
        assert!(descriptor.format.is_none());
    }

    #[test]
    fn test_constant_ignores_binding_markers() {
        let mut fx = Fixtures::new();
        let lib = fx.library("Demo.SdlLibrary");
        let member = fx.method("Demo.Sdl", "Init").symbol(lib, None, 0).build();
        assert!(extract_constant(&member).is_none());
    }
}
