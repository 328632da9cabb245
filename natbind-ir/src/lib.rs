//! Declaration model and descriptor types for natbind.
//!
//! This crate is the boundary between a declaration provider (for example
//! `natbind-manifest`) and the generator core:
//!
//! ```text
//! natbind.toml → natbind-manifest → natbind-ir (MemberDecl + Marker) → natbind-codegen
//! ```
//!
//! The declaration types mirror what a host compiler would hand to a source
//! generator: the containing namespace/type chain, modifiers, parameters with
//! their by-ref kind, the return type and the marker payload. Descriptors are
//! what the extractor produces from a marked declaration.

mod decl;
mod descriptor;
mod types;

pub use decl::{
    Compilation, ConstantMarker, ContainingChain, FormatArg, FunctionMarker, Location, Marker,
    MemberDecl, MemberShape, Modifier, NamespaceDecl, Param, SymbolMarker, TypeDecl, TypeParam,
};
pub use descriptor::{
    AccessKind, BindingDescriptor, BindingVariant, ConstantDescriptor, FormatCulture, ReturnKind,
    SlotId,
};
pub use types::{Accessibility, RefKind, ReturnRefKind, TypeDeclKind, TypeHandle, TypeKind, TypeRef};
