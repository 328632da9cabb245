//! Manifest types and parsing for natbind.toml files.

mod parse;
mod validate;

use indexmap::IndexMap;
use natbind_ir::Location;
use serde::Deserialize;
use toml::Spanned;
pub use validate::{find_quoted, validate_identifier};

use crate::{
    error::SourceContext,
    schema::{CompilationConfig, GeneratorConfig, MemberConfig, TypeConfig},
};

/// Root manifest for natbind.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub compilation: CompilationConfig,

    /// Declared types keyed by metadata name, in declaration order
    #[serde(default)]
    pub types: IndexMap<String, TypeConfig>,

    /// Member declarations with their byte spans in the source
    #[serde(default)]
    pub members: Vec<Spanned<MemberConfig>>,

    #[serde(skip)]
    source: SourceContext,
}

impl Manifest {
    /// The text and filename the manifest was parsed from.
    pub fn source(&self) -> &SourceContext {
        &self.source
    }

    /// Location of the start of a span.
    pub fn location(&self, offset: usize) -> Location {
        let (line, column) = self.source.line_column(offset);
        Location::new(self.source.filename(), line, column)
    }

    /// Location of a `[types."Key"]` header, if present.
    pub fn type_location(&self, key: &str) -> Option<Location> {
        let header = format!("[types.\"{key}\"]");
        self.source
            .src()
            .find(&header)
            .map(|offset| self.location(offset))
    }
}
