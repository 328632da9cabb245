//! Generate operation - code generation from the manifest.

use std::path::Path;

use eyre::{Context, Result};
use natbind_codegen::LanguageCodegen;
use natbind_manifest::{Declarations, Manifest};

use crate::reports::{GenerateReport, GenerationResult, PreviewFile, WrittenResult};

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    /// Directory the units are written to.
    pub output_dir: &'a Path,
    /// Whether to preview without writing files.
    pub dry_run: bool,
}

/// Execute the generate operation.
pub fn generate(
    manifest: &Manifest,
    declarations: &Declarations,
    opts: GenerateOptions,
) -> Result<GenerateReport> {
    let generator = super::generator(manifest, declarations);
    tracing::debug!(
        members = declarations.members.len(),
        dry_run = opts.dry_run,
        "generating"
    );

    if opts.dry_run {
        let output = generator.preview().wrap_err("Failed to generate code")?;
        let files = output
            .files
            .into_iter()
            .map(|f| PreviewFile {
                path: f.hint_name,
                content: f.content,
            })
            .collect();
        return Ok(GenerateReport {
            diagnostics: output.diagnostics,
            result: GenerationResult::Preview(files),
        });
    }

    let result = generator
        .generate(opts.output_dir)
        .wrap_err("Failed to generate code")?;
    Ok(GenerateReport {
        diagnostics: result.diagnostics,
        result: GenerationResult::Written(WrittenResult {
            output_dir: opts.output_dir.to_path_buf(),
            written: result.written,
            unchanged: result.unchanged,
            removed: result.removed,
        }),
    })
}

#[cfg(test)]
mod tests {
    use std::{fs, str::FromStr};

    use tempfile::TempDir;

    use super::*;

    const MANIFEST: &str = r#"
[generator]
namespace = "Demo.Gen"

[[members]]
container = "Demo.Consts"
name = "Answer"
shape = "property"
returns = "string"
[members.constant]
format = "{0:D3}"
args = [42]
"#;

    fn declarations() -> (Manifest, Declarations) {
        let manifest = Manifest::from_str(MANIFEST).unwrap();
        let declarations = manifest.declarations().unwrap();
        (manifest, declarations)
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let (manifest, declarations) = declarations();

        let report = generate(
            &manifest,
            &declarations,
            GenerateOptions {
                output_dir: temp.path(),
                dry_run: true,
            },
        )
        .unwrap();

        let GenerationResult::Preview(files) = &report.result else {
            panic!("expected a preview");
        };
        assert_eq!(files.len(), 3);
        let constants = files
            .iter()
            .find(|f| f.path == "Demo.Gen.FormattedConstants.g.cs")
            .unwrap();
        assert!(constants.content.contains("\"042\""));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let temp = TempDir::new().unwrap();
        let (manifest, declarations) = declarations();
        let opts = || GenerateOptions {
            output_dir: temp.path(),
            dry_run: false,
        };

        let first = generate(&manifest, &declarations, opts()).unwrap();
        let GenerationResult::Written(written) = &first.result else {
            panic!("expected written files");
        };
        assert_eq!(written.written.len(), 3);
        assert!(temp.path().join("Demo.Gen.FormattedConstants.g.cs").exists());

        let second = generate(&manifest, &declarations, opts()).unwrap();
        let GenerationResult::Written(written) = &second.result else {
            panic!("expected written files");
        };
        assert!(written.written.is_empty());
        assert_eq!(written.unchanged.len(), 3);
        assert!(written.removed.is_empty());
        assert!(!second.has_errors());
    }

    #[test]
    fn test_stale_unit_is_removed() {
        let temp = TempDir::new().unwrap();
        let (manifest, declarations) = declarations();
        let stale = temp.path().join("Demo.Gen.NativeImports.g.cs");
        fs::write(&stale, "// from an earlier run").unwrap();

        let report = generate(
            &manifest,
            &declarations,
            GenerateOptions {
                output_dir: temp.path(),
                dry_run: false,
            },
        )
        .unwrap();

        let GenerationResult::Written(written) = &report.result else {
            panic!("expected written files");
        };
        assert_eq!(written.removed, vec![stale.clone()]);
        assert!(!stale.exists());
    }
}
