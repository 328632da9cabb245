//! Check command report data structures.

use std::path::PathBuf;

use natbind_codegen::Diagnostic;
use serde::Serialize;

use super::output::{Output, Report};

/// Report data from running the generators without writing.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// Number of `[[members]]` entries.
    pub member_count: usize,
    pub markers: MarkerCounts,
    /// Units a `generate` run would write.
    pub units: Vec<String>,
}

/// Members per marker kind.
#[derive(Debug, Default, Serialize)]
pub struct MarkerCounts {
    pub symbols: usize,
    pub functions: usize,
    pub constants: usize,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for diagnostic in self.errors.iter().chain(&self.warnings) {
            out.diagnostic(diagnostic);
        }

        if !self.warnings.is_empty() || !self.errors.is_empty() {
            out.newline();
        }

        if !self.is_valid() {
            out.preformatted(&format!(
                "✗ {} has {} error{}",
                self.config_path.display(),
                self.errors.len(),
                plural(self.errors.len())
            ));
            return;
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();
        out.preformatted(&format!(
            "  {} member{}: {} symbol{}, {} function{}, {} constant{}",
            self.member_count,
            plural(self.member_count),
            self.markers.symbols,
            plural(self.markers.symbols),
            self.markers.functions,
            plural(self.markers.functions),
            self.markers.constants,
            plural(self.markers.constants),
        ));
        out.section(&format!(
            "  {} unit{}",
            self.units.len(),
            plural(self.units.len())
        ));
        for unit in &self.units {
            out.list_item(&format!("  {}", unit));
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
