//! Composite formatting of constant templates.
//!
//! Templates follow .NET composite format syntax: `{index[,alignment][:format]}`
//! items, with `{{` and `}}` as escaped braces.

mod decimal;
mod number;

use natbind_ir::{FormatArg, FormatCulture};
use thiserror::Error;

pub use number::NumberFormat;
use number::{Number, format_number};

/// Largest index or alignment accepted in a format item.
const MAX_ITEM_VALUE: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Input string was not in a correct format.")]
    InvalidTemplate,

    #[error(
        "Index (zero based) must be greater than or equal to zero and less than the size of the argument list."
    )]
    IndexOutOfRange,

    #[error("Format specifier was invalid.")]
    InvalidSpecifier,
}

/// Symbols used for `culture`.
pub fn number_format(culture: FormatCulture) -> &'static NumberFormat {
    // The host culture is not modeled; both resolve to invariant symbols.
    match culture {
        FormatCulture::Default | FormatCulture::Invariant => &NumberFormat::INVARIANT,
    }
}

/// Evaluate `template` against `args`.
pub fn format(
    template: &str,
    args: &[FormatArg],
    culture: FormatCulture,
) -> Result<String, FormatError> {
    let nf = number_format(culture);
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '{' if chars.get(i + 1) == Some(&'{') => {
                out.push('{');
                i += 2;
            }
            '}' if chars.get(i + 1) == Some(&'}') => {
                out.push('}');
                i += 2;
            }
            '}' => return Err(FormatError::InvalidTemplate),
            '{' => {
                let (item, next) = parse_item(&chars, i + 1)?;
                let arg = args.get(item.index).ok_or(FormatError::IndexOutOfRange)?;
                let text = format_arg(arg, item.format.as_deref(), nf)?;
                push_aligned(&mut out, &text, item.alignment);
                i = next;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    Ok(out)
}

struct FormatItem {
    index: usize,
    alignment: i64,
    format: Option<String>,
}

fn skip_spaces(chars: &[char], mut i: usize) -> usize {
    while chars.get(i) == Some(&' ') {
        i += 1;
    }
    i
}

fn parse_digits(chars: &[char], mut i: usize) -> Result<(usize, usize), FormatError> {
    let start = i;
    let mut value = 0usize;
    while let Some(d) = chars.get(i).and_then(|c| c.to_digit(10)) {
        value = value * 10 + d as usize;
        if value >= MAX_ITEM_VALUE {
            return Err(FormatError::InvalidTemplate);
        }
        i += 1;
    }
    if i == start {
        return Err(FormatError::InvalidTemplate);
    }
    Ok((value, i))
}

/// Parse an item starting just after its `{`; returns the index after `}`.
fn parse_item(chars: &[char], i: usize) -> Result<(FormatItem, usize), FormatError> {
    let (index, i) = parse_digits(chars, i)?;
    let mut i = skip_spaces(chars, i);

    let mut alignment = 0i64;
    if chars.get(i) == Some(&',') {
        i = skip_spaces(chars, i + 1);
        let negative = chars.get(i) == Some(&'-');
        if negative {
            i += 1;
        }
        let (width, next) = parse_digits(chars, i)?;
        alignment = if negative {
            -(width as i64)
        } else {
            width as i64
        };
        i = skip_spaces(chars, next);
    }

    let mut format = None;
    if chars.get(i) == Some(&':') {
        let mut spec = String::new();
        i += 1;
        loop {
            match chars.get(i) {
                Some('}') => break,
                Some('{') | None => return Err(FormatError::InvalidTemplate),
                Some(&c) => spec.push(c),
            }
            i += 1;
        }
        format = Some(spec);
    }

    if chars.get(i) != Some(&'}') {
        return Err(FormatError::InvalidTemplate);
    }
    Ok((
        FormatItem {
            index,
            alignment,
            format,
        },
        i + 1,
    ))
}

fn format_arg(
    arg: &FormatArg,
    spec: Option<&str>,
    nf: &NumberFormat,
) -> Result<String, FormatError> {
    let spec = spec.unwrap_or("");
    match arg {
        FormatArg::Null => Ok(String::new()),
        FormatArg::String(s) => Ok(s.clone()),
        FormatArg::Char(c) => Ok(c.to_string()),
        FormatArg::Bool(b) => Ok(if *b { "True" } else { "False" }.to_string()),
        FormatArg::Int(v) => format_number(Number::from_i64(*v), spec, nf),
        FormatArg::UInt(v) => format_number(Number::from_u64(*v), spec, nf),
        FormatArg::Float(v) => format_number(Number::Float(*v), spec, nf),
    }
}

fn push_aligned(out: &mut String, text: &str, alignment: i64) {
    let width = alignment.unsigned_abs() as usize;
    let len = text.chars().count();
    let padding = width.saturating_sub(len);
    if alignment > 0 {
        out.extend(std::iter::repeat_n(' ', padding));
        out.push_str(text);
    } else {
        out.push_str(text);
        out.extend(std::iter::repeat_n(' ', padding));
    }
}
