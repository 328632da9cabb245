use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Keeps the manifest text and its filename so every error can point back
/// into the file it came from.
///
/// # Example
///
/// ```ignore
/// let ctx = SourceContext::new(content, "natbind.toml");
/// ctx.unknown_type_error("Point", "return type of 'Demo.Sdl.Init'", span);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// 1-based line and column of a byte offset.
    pub fn line_column(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.src.len());
        let before = &self.src[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        (line as u32, column as u32)
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error with a span.
    pub fn validation_error_at(
        &self,
        message: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: span.into(),
            message: message.into(),
        })
    }

    pub fn unknown_type_error(
        &self,
        ty: impl Into<String>,
        context: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UnknownType {
            src: self.named_source(),
            span,
            ty: ty.into(),
            context: context.into(),
        })
    }

    pub fn multiple_markers_error(
        &self,
        member: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::MultipleMarkers {
            src: self.named_source(),
            span: span.into(),
            member: member.into(),
        })
    }

    pub fn invalid_identifier_error(
        &self,
        name: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidIdentifier {
            src: self.named_source(),
            span,
            name: name.into(),
            context: context.into(),
            reason: reason.into(),
        })
    }

    pub fn unknown_value_error(
        &self,
        value: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UnknownValue {
            src: self.named_source(),
            span,
            value: value.into(),
            field: field.into(),
            expected: expected.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("pass the manifest path with '--config <path>'"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse natbind.toml")]
    #[diagnostic(code(natbind::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown type '{ty}' in {context}")]
    #[diagnostic(
        code(natbind::unknown_type),
        help(
            "use a C# keyword, 'ReadOnlySpan<T>', a member type parameter, or declare it under [types.\"Namespace.Name\"]"
        )
    )]
    UnknownType {
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown type")]
        span: Option<SourceSpan>,
        ty: String,
        context: String,
    },

    #[error("member '{member}' carries more than one marker")]
    #[diagnostic(
        code(natbind::multiple_markers),
        help("keep only one of [members.symbol], [members.function] or [members.constant]")
    )]
    MultipleMarkers {
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: SourceSpan,
        member: String,
    },

    #[error("invalid {context} name '{name}'")]
    #[diagnostic(
        code(natbind::invalid_identifier),
        help("{reason}. Use only letters, numbers, and underscores, starting with a letter or underscore.")
    )]
    InvalidIdentifier {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid identifier")]
        span: Option<SourceSpan>,
        name: String,
        context: String,
        reason: String,
    },

    #[error("unknown {field} '{value}'")]
    #[diagnostic(code(natbind::unknown_value), help("expected one of: {expected}"))]
    UnknownValue {
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown value")]
        span: Option<SourceSpan>,
        value: String,
        field: String,
        expected: String,
    },

    #[error("{message}")]
    #[diagnostic(code(natbind::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },
}
