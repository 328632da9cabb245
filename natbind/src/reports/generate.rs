//! Generate command report data structures.

use std::path::PathBuf;

use natbind_codegen::Diagnostic;

use super::output::{Output, Report};

/// Report data from code generation.
#[derive(Debug)]
pub struct GenerateReport {
    /// Diagnostics from both passes.
    pub diagnostics: Vec<Diagnostic>,
    /// Generation result (files written or preview).
    pub result: GenerationResult,
}

/// Result of code generation.
#[derive(Debug)]
pub enum GenerationResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(Vec<PreviewFile>),
}

/// Result when files were written to disk.
#[derive(Debug)]
pub struct WrittenResult {
    pub output_dir: PathBuf,
    /// Units created or replaced.
    pub written: Vec<PathBuf>,
    /// Units whose content was already on disk.
    pub unchanged: Vec<PathBuf>,
    /// Stale units deleted because this run no longer produces them.
    pub removed: Vec<PathBuf>,
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    pub path: String,
    pub content: String,
}

impl GenerateReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        for diagnostic in &self.diagnostics {
            out.diagnostic(diagnostic);
        }
        if !self.diagnostics.is_empty() {
            out.newline();
        }

        match &self.result {
            GenerationResult::Written(written) => render_written(out, written),
            GenerationResult::Preview(files) => render_preview(out, files),
        }
    }
}

fn render_written(out: &mut dyn Output, written: &WrittenResult) {
    out.key_value("Generated", &written.output_dir.display().to_string());

    if !written.written.is_empty() {
        out.newline();
        out.section("Written");
        for path in &written.written {
            out.added_item(&path.display().to_string());
        }
    }

    if !written.removed.is_empty() {
        out.newline();
        out.section("Removed");
        for path in &written.removed {
            out.removed_item(&path.display().to_string());
        }
    }

    if !written.unchanged.is_empty() {
        out.newline();
        out.section("Unchanged");
        for path in &written.unchanged {
            out.list_item(&path.display().to_string());
        }
    }
}

fn render_preview(out: &mut dyn Output, files: &[PreviewFile]) {
    for file in files {
        out.divider(&file.path);
        out.preformatted(&file.content);
    }

    out.divider("Summary");
    out.preformatted(&format!("{} files would be generated", files.len()));
}
