use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

/// Trait for types that represent a generated source unit.
pub trait GeneratedFile {
    /// File path relative to the output directory.
    fn path(&self, base: &Path) -> PathBuf;

    /// Render the file content.
    fn render(&self) -> String;

    /// Write the file below `base`.
    ///
    /// An existing file with identical content is left untouched, so repeated
    /// runs over unchanged input do not bump modification times.
    fn write(&self, base: &Path) -> Result<WriteResult> {
        let path = self.path(base);
        let content = self.render();

        if let Ok(existing) = std::fs::read_to_string(&path)
            && existing == content
        {
            return Ok(WriteResult::Unchanged);
        }

        write_file(&path, &content)?;
        Ok(WriteResult::Written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create '{}'", parent.display()))?;
    }
    std::fs::write(path, content).wrap_err_with(|| format!("failed to write '{}'", path.display()))
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was created or its content replaced
    Written,
    /// File already had the same content
    Unchanged,
}

/// A named unit of generated source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name hint, e.g. `Natbind.SourceGeneration.NativeImports.g.cs`.
    pub hint_name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(hint_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            hint_name: hint_name.into(),
            content: content.into(),
        }
    }
}

impl GeneratedFile for SourceFile {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(&self.hint_name)
    }

    fn render(&self) -> String {
        self.content.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("a").join("b");

        let file = SourceFile::new("Out.g.cs", "// hello");
        let result = file.write(&base).unwrap();

        assert_eq!(result, WriteResult::Written);
        assert_eq!(fs::read_to_string(base.join("Out.g.cs")).unwrap(), "// hello");
    }

    #[test]
    fn test_write_same_content_is_unchanged() {
        let temp = TempDir::new().unwrap();
        let file = SourceFile::new("Out.g.cs", "// same");

        assert_eq!(file.write(temp.path()).unwrap(), WriteResult::Written);
        assert_eq!(file.write(temp.path()).unwrap(), WriteResult::Unchanged);
    }

    #[test]
    fn test_write_replaces_changed_content() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Out.g.cs"), "// old").unwrap();

        let file = SourceFile::new("Out.g.cs", "// new");

        assert_eq!(file.write(temp.path()).unwrap(), WriteResult::Written);
        assert_eq!(
            fs::read_to_string(temp.path().join("Out.g.cs")).unwrap(),
            "// new"
        );
    }
}
