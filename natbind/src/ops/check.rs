//! Check operation - run both passes without writing.

use std::path::Path;

use eyre::{Context, Result};
use natbind_codegen::LanguageCodegen;
use natbind_ir::Marker;
use natbind_manifest::{Declarations, Manifest};

use crate::reports::{CheckReport, MarkerCounts};

/// Execute the check operation.
///
/// Runs the generator in preview mode and collects its diagnostics together
/// with the units a `generate` would produce.
pub fn check(
    manifest: &Manifest,
    declarations: &Declarations,
    config_path: &Path,
) -> Result<CheckReport> {
    let output = super::generator(manifest, declarations)
        .preview()
        .wrap_err("Validation failed")?;

    let mut markers = MarkerCounts::default();
    for member in &declarations.members {
        match &member.marker {
            Some(Marker::NativeSymbol(_)) => markers.symbols += 1,
            Some(Marker::NativeFunction(_)) => markers.functions += 1,
            Some(Marker::FormattedConstant(_)) => markers.constants += 1,
            None => {}
        }
    }

    let (errors, warnings): (Vec<_>, Vec<_>) = output
        .diagnostics
        .into_iter()
        .partition(|d| d.severity.is_error());

    Ok(CheckReport {
        config_path: config_path.to_path_buf(),
        errors,
        warnings,
        member_count: declarations.members.len(),
        markers,
        units: output.files.into_iter().map(|f| f.hint_name).collect(),
    })
}
