//! Intermediate pieces of generated text.

/// Represents a fragment of generated text.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeFragment {
    /// A single line at the current indentation.
    Line(String),
    /// A line written at column zero regardless of indentation (preprocessor directives).
    Directive(String),
    /// A blank line.
    Blank,
    /// A block with header, indented body and optional closing line.
    Block {
        header: String,
        body: Vec<CodeFragment>,
        close: Option<String>,
    },
    /// A sequence of fragments.
    Sequence(Vec<CodeFragment>),
}

impl CodeFragment {
    pub fn line(s: impl Into<String>) -> Self {
        Self::Line(s.into())
    }

    pub fn directive(s: impl Into<String>) -> Self {
        Self::Directive(s.into())
    }

    pub fn blank() -> Self {
        Self::Blank
    }

    /// A header line followed by a `{ ... }` block on their own lines.
    pub fn braced(header: impl Into<String>, body: Vec<CodeFragment>) -> Self {
        Self::Sequence(vec![
            Self::Line(header.into()),
            Self::Block {
                header: "{".to_string(),
                body,
                close: Some("}".to_string()),
            },
        ])
    }

    pub fn sequence(fragments: Vec<CodeFragment>) -> Self {
        Self::Sequence(fragments)
    }
}
