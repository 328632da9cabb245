//! C# backend for natbind.
//!
//! Renders the two generator passes of `natbind-codegen` as C# units and
//! supplies the fixed marker-type units user code is written against.

mod constants;
mod generator;
mod imports;
mod literal;
mod syntax;

pub mod files;

pub use constants::{ConstantsSyntax, RenderConstantsPhase, render_constants};
pub use generator::{DEFAULT_NAMESPACE, Generator, GeneratorOptions, PassOutput};
pub use imports::{ImportsSyntax, RenderImportsPhase, accessor_body, render_imports};
pub use literal::{constant_expression, quote};
pub use natbind_codegen::{GenerateOutput, GenerateResult, LanguageCodegen};
