//! Language-agnostic generator traits.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use natbind_core::{GeneratedFile, SourceFile, WriteResult};

use crate::pipeline::Diagnostic;

/// Trait for language-specific generators.
///
/// Implement this trait to render the symbol trees and import groups for a
/// new target language.
pub trait LanguageCodegen {
    /// Language identifier (e.g., "csharp")
    fn language(&self) -> &'static str;

    /// File extension for generated units (e.g., "cs")
    fn file_extension(&self) -> &'static str;

    /// File names of every unit this generator can produce.
    fn unit_names(&self) -> Vec<String>;

    /// Run every generator pass without touching the disk.
    fn preview(&self) -> Result<GenerateOutput>;

    /// Run every generator pass and write the produced units below `output_dir`.
    ///
    /// Units whose content is already on disk are left untouched. Known units
    /// left over from an earlier run that this run did not produce are deleted.
    fn generate(&self, output_dir: &Path) -> Result<GenerateResult> {
        let GenerateOutput { files, diagnostics } = self.preview()?;
        let mut result = GenerateResult {
            diagnostics,
            ..GenerateResult::default()
        };

        for file in &files {
            let path = file.path(output_dir);
            match file.write(output_dir)? {
                WriteResult::Written => {
                    tracing::info!(path = %path.display(), "wrote unit");
                    result.written.push(path);
                }
                WriteResult::Unchanged => {
                    tracing::debug!(path = %path.display(), "unit unchanged");
                    result.unchanged.push(path);
                }
            }
        }

        for name in self.unit_names() {
            if files.iter().any(|f| f.hint_name == name) {
                continue;
            }
            let path = output_dir.join(&name);
            if !path.is_file() {
                continue;
            }
            std::fs::remove_file(&path)
                .wrap_err_with(|| format!("failed to remove '{}'", path.display()))?;
            tracing::info!(path = %path.display(), "removed stale unit");
            result.removed.push(path);
        }

        Ok(result)
    }
}

/// Units and diagnostics of one generator run.
#[derive(Debug, Default)]
pub struct GenerateOutput {
    pub files: Vec<SourceFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerateOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn file(&self, hint_name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.hint_name == hint_name)
    }
}

/// Result of writing a generator run to disk.
#[derive(Debug, Default)]
pub struct GenerateResult {
    /// Units that were created or replaced
    pub written: Vec<PathBuf>,
    /// Units that already had the same content
    pub unchanged: Vec<PathBuf>,
    /// Stale units from an earlier run that were deleted
    pub removed: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerateResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }
}
