//! Core operations.
//!
//! This module contains the business logic for natbind commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod generate;

pub use check::check;
pub use generate::{GenerateOptions, generate};
use natbind_codegen_csharp::{DEFAULT_NAMESPACE, Generator, GeneratorOptions};
use natbind_manifest::{Declarations, Manifest};

/// C# generator configured from the `[generator]` table.
pub(crate) fn generator<'a>(manifest: &Manifest, declarations: &'a Declarations) -> Generator<'a> {
    let options = GeneratorOptions {
        namespace: manifest
            .generator
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        tool: manifest.generator.tool_info(),
    };
    Generator::new(&declarations.compilation, &declarations.members).with_options(options)
}
