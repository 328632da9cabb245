//! TOML declaration manifests for natbind.
//!
//! A `natbind.toml` stands in for the host compiler: it declares the types
//! and partial members of the consuming project together with their markers.
//! Parsing validates the structure and reports problems as [`miette`]
//! diagnostics pointing into the file; [`Manifest::declarations`] then builds
//! the [`natbind_ir`] model the generators run on.
//!
//! ```ignore
//! let manifest = Manifest::from_file("natbind.toml")?;
//! let decls = manifest.declarations()?;
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod declarations;
mod error;
mod manifest;
mod schema;
mod types;

pub use declarations::Declarations;
pub use error::{Error, Result, SourceContext};
pub use manifest::{Manifest, find_quoted, validate_identifier};
pub use schema::{
    ArgValue, CompilationConfig, ConstantConfig, EnumValue, FunctionConfig, GeneratorConfig,
    MemberConfig, ParamConfig, ShapeConfig, SymbolConfig, TypeConfig, TypeParamConfig, TypedArg,
};
pub use types::TypeResolver;
