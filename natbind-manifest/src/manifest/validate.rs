//! Structural checks run right after parsing.

use std::{collections::HashSet, ops::Range};

use miette::SourceSpan;
use toml::Spanned;

use super::Manifest;
use crate::{
    Result,
    error::SourceContext,
    schema::{MemberConfig, ShapeConfig},
    types::TypeResolver,
};

/// C# reserved keywords; contextual keywords are valid identifiers.
pub(crate) const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event",
    "explicit", "extern", "false", "finally", "fixed", "float", "for", "foreach", "goto", "if",
    "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new",
    "null", "object", "operator", "out", "override", "params", "private", "protected", "public",
    "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static",
    "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
    "unchecked", "unsafe", "ushort", "using", "virtual", "void", "volatile", "while",
];

/// Validate that a name is a C# identifier.
/// Returns None if valid, Some(reason) if invalid.
///
/// A leading `@` escapes a keyword, as in C#.
pub fn validate_identifier(name: &str) -> Option<&'static str> {
    let (escaped, name) = match name.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, name),
    };

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
        None => return Some("name cannot be empty"),
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return Some("name must contain only letters, numbers, and underscores");
    }
    if !escaped && CSHARP_KEYWORDS.contains(&name) {
        return Some("name is a C# keyword; prefix it with '@'");
    }
    None
}

/// Span of a quoted `text` inside `within`, pointing at the text itself.
pub fn find_quoted(src: &str, within: Range<usize>, text: &str) -> Option<SourceSpan> {
    let region = src.get(within.clone())?;
    [format!("\"{text}\""), format!("'{text}'")]
        .iter()
        .find_map(|pattern| region.find(pattern.as_str()))
        .map(|pos| SourceSpan::from((within.start + pos + 1, text.len())))
}

pub(crate) fn validate_manifest(manifest: &Manifest) -> Result<()> {
    let ctx = manifest.source();

    for (key, ty) in &manifest.types {
        validate_type_key(ctx, key)?;
        for param in &ty.type_params {
            check_identifier(ctx, param, "type parameter", None)?;
        }
    }

    let mut seen = HashSet::new();
    for member in &manifest.members {
        validate_member(manifest, member)?;

        let config = member.get_ref();
        let param_types: Vec<_> = config.params.iter().map(|p| p.ty.trim()).collect();
        let signature = format!("{}({})", config.display_name(), param_types.join(","));
        if !seen.insert(signature) {
            return Err(ctx.validation_error_at(
                format!("duplicate member '{}'", config.display_name()),
                member.span(),
            ));
        }
    }
    Ok(())
}

fn validate_type_key(ctx: &SourceContext, key: &str) -> Result<()> {
    for segment in key.split(['.', '+']) {
        check_identifier(ctx, segment, "type", find_quoted(ctx.src(), 0..ctx.src().len(), key))?;
    }
    Ok(())
}

fn validate_member(manifest: &Manifest, member: &Spanned<MemberConfig>) -> Result<()> {
    let ctx = manifest.source();
    let span = member.span();
    let config = member.get_ref();
    let display = config.display_name();
    let quoted = |text: &str| {
        find_quoted(ctx.src(), span.clone(), text)
            .or_else(|| find_quoted(ctx.src(), 0..ctx.src().len(), text))
    };

    for segment in config.container.split(['.', '+']) {
        check_identifier(ctx, segment, "container", quoted(&config.container))?;
    }
    check_identifier(ctx, &config.name, "member", quoted(&config.name))?;

    if config.marker_count() > 1 {
        return Err(ctx.multiple_markers_error(display, span));
    }

    if config.shape == ShapeConfig::Property {
        if !config.params.is_empty() || !config.type_params.is_empty() {
            return Err(ctx.validation_error_at(
                format!("property '{display}' cannot declare parameters"),
                span,
            ));
        }
        if !config.get && !config.set {
            return Err(ctx.validation_error_at(
                format!("property '{display}' declares neither get nor set"),
                span,
            ));
        }
    }

    for param in &config.type_params {
        check_identifier(ctx, &param.name, "type parameter", quoted(&param.name))?;
    }
    for param in &config.params {
        check_identifier(ctx, &param.name, "parameter", quoted(&param.name))?;
    }

    let resolver = TypeResolver::new(&manifest.types, &config.type_params);
    if resolver.resolve(&config.returns).is_none() {
        return Err(ctx.unknown_type_error(
            &config.returns,
            format!("return type of '{display}'"),
            quoted(&config.returns),
        ));
    }
    for param in &config.params {
        if resolver.resolve(&param.ty).is_none() {
            return Err(ctx.unknown_type_error(
                &param.ty,
                format!("parameter '{}' of '{display}'", param.name),
                quoted(&param.ty),
            ));
        }
    }

    if let Some(symbol) = &config.symbol
        && symbol.kind.access_kind().is_none()
    {
        return Err(ctx.unknown_value_error(
            symbol.kind.to_string(),
            "symbol kind",
            "auto, getter, setter, reference",
            None,
        ));
    }
    if let Some(constant) = &config.constant
        && constant.culture.culture().is_none()
    {
        return Err(ctx.unknown_value_error(
            constant.culture.to_string(),
            "culture",
            "default, invariant",
            None,
        ));
    }
    Ok(())
}

fn check_identifier(
    ctx: &SourceContext,
    name: &str,
    context: &str,
    span: Option<SourceSpan>,
) -> Result<()> {
    match validate_identifier(name) {
        Some(reason) => Err(ctx.invalid_identifier_error(name, context, reason, span)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("Init").is_none());
        assert!(validate_identifier("_value").is_none());
        assert!(validate_identifier("@event").is_none());
        assert!(validate_identifier("Größe").is_none());
        assert!(validate_identifier("var").is_none());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_some());
        assert!(validate_identifier("1st").is_some());
        assert!(validate_identifier("my-name").is_some());
        assert!(validate_identifier("event").is_some());
        assert!(validate_identifier("@").is_some());
    }

    #[test]
    fn test_find_quoted() {
        let src = "a = \"x\"\nname = \"Init\"\n";
        let span = find_quoted(src, 0..src.len(), "Init").unwrap();
        assert_eq!(span.offset(), 16);
        assert_eq!(span.len(), 4);
        assert!(find_quoted(src, 0..6, "Init").is_none());
    }

    #[test]
    fn test_multiple_markers() {
        let src = r#"
[[members]]
container = "Demo.Sdl"
name = "Init"
[members.symbol]
library = "Demo.Lib"
[members.constant]
format = "x"
"#;
        let err = src.parse::<Manifest>().unwrap_err();
        assert!(matches!(*err, Error::MultipleMarkers { .. }));
    }

    #[test]
    fn test_unknown_return_type_points_at_it() {
        let src = r#"
[[members]]
container = "Demo.Sdl"
name = "Init"
returns = "Demo.Missing"
"#;
        let err = src.parse::<Manifest>().unwrap_err();
        match *err {
            Error::UnknownType { ty, span, .. } => {
                assert_eq!(ty, "Demo.Missing");
                let span = span.unwrap();
                assert_eq!(&src[span.offset()..span.offset() + span.len()], "Demo.Missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_property_without_accessors() {
        let src = r#"
[[members]]
container = "Demo.Sdl"
name = "Version"
shape = "property"
returns = "int"
get = false
"#;
        let err = src.parse::<Manifest>().unwrap_err();
        assert!(err.to_string().contains("neither get nor set"));
    }

    #[test]
    fn test_keyword_member_name() {
        let src = r#"
[[members]]
container = "Demo.Sdl"
name = "class"
"#;
        let err = src.parse::<Manifest>().unwrap_err();
        assert!(matches!(*err, Error::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_unknown_symbol_kind() {
        let src = r#"
[[members]]
container = "Demo.Sdl"
name = "Value"
returns = "int"
[members.symbol]
kind = "pointer"
"#;
        let err = src.parse::<Manifest>().unwrap_err();
        assert!(matches!(*err, Error::UnknownValue { .. }));
    }

    #[test]
    fn test_duplicate_member() {
        let src = r#"
[[members]]
container = "Demo.Sdl"
name = "Init"

[[members]]
container = "Demo.Sdl"
name = "Init"
"#;
        let err = src.parse::<Manifest>().unwrap_err();
        assert!(err.to_string().contains("duplicate member 'Demo.Sdl.Init'"));
    }
}
