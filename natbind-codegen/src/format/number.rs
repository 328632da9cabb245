//! Standard and custom numeric format strings.

use super::FormatError;
use super::decimal::Decimal;

/// Culture symbols used while formatting numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: &'static str,
    pub group_separator: &'static str,
    pub currency_symbol: &'static str,
    pub percent_symbol: &'static str,
    pub per_mille_symbol: &'static str,
    pub negative_sign: &'static str,
    pub nan_symbol: &'static str,
    pub positive_infinity: &'static str,
    pub negative_infinity: &'static str,
}

impl NumberFormat {
    pub const INVARIANT: NumberFormat = NumberFormat {
        decimal_separator: ".",
        group_separator: ",",
        currency_symbol: "\u{a4}",
        percent_symbol: "%",
        per_mille_symbol: "\u{2030}",
        negative_sign: "-",
        nan_symbol: "NaN",
        positive_infinity: "Infinity",
        negative_infinity: "-Infinity",
    };
}

/// Largest precision accepted in a standard format specifier.
const MAX_PRECISION: u32 = 999;

/// Scientific notation switches on at this exponent for round-trip output.
const ROUND_TRIP_THRESHOLD: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    /// `width` is the two's complement width used by `X` and `B`.
    Int { value: i128, width: u32 },
    Float(f64),
}

impl Number {
    pub fn from_i64(value: i64) -> Self {
        let width = if i32::try_from(value).is_ok() { 32 } else { 64 };
        Number::Int {
            value: value as i128,
            width,
        }
    }

    pub fn from_u64(value: u64) -> Self {
        let width = if u32::try_from(value).is_ok() { 32 } else { 64 };
        Number::Int {
            value: value as i128,
            width,
        }
    }

    fn exact(self) -> Decimal {
        match self {
            Number::Int { value, .. } => Decimal::from_int(value),
            Number::Float(v) => Decimal::from_f64_exact(v),
        }
    }
}

pub(crate) fn format_number(
    number: Number,
    spec: &str,
    nf: &NumberFormat,
) -> Result<String, FormatError> {
    if let Number::Float(v) = number
        && !v.is_finite()
    {
        let symbol = if v.is_nan() {
            nf.nan_symbol
        } else if v > 0.0 {
            nf.positive_infinity
        } else {
            nf.negative_infinity
        };
        return Ok(symbol.to_string());
    }

    match parse_standard(spec)? {
        Some((letter, precision)) => standard(number, letter, precision, nf),
        None => Ok(custom(number, spec, nf)),
    }
}

/// `None` when `spec` is a custom pattern rather than `Lnn`.
fn parse_standard(spec: &str) -> Result<Option<(char, Option<u32>)>, FormatError> {
    let mut chars = spec.chars();
    let Some(letter) = chars.next() else {
        return Ok(Some(('G', None)));
    };
    let rest = chars.as_str();
    if !letter.is_ascii_alphabetic() || rest.len() > 9 || !rest.bytes().all(|b| b.is_ascii_digit())
    {
        return Ok(None);
    }
    if rest.is_empty() {
        return Ok(Some((letter, None)));
    }
    let precision: u32 = rest.parse().map_err(|_| FormatError::InvalidSpecifier)?;
    if precision > MAX_PRECISION {
        return Err(FormatError::InvalidSpecifier);
    }
    Ok(Some((letter, Some(precision))))
}

fn standard(
    number: Number,
    letter: char,
    precision: Option<u32>,
    nf: &NumberFormat,
) -> Result<String, FormatError> {
    let upper = letter.to_ascii_uppercase();
    let exponent_char = if letter.is_ascii_uppercase() { 'E' } else { 'e' };

    match (upper, number) {
        ('D', Number::Int { value, .. }) => {
            let digits = pad_left(value.unsigned_abs().to_string(), precision.unwrap_or(0));
            Ok(signed(value < 0, digits, nf))
        }
        ('X', Number::Int { value, width }) => {
            let bits = twos_complement(value, width);
            let digits = if letter == 'X' {
                format!("{bits:X}")
            } else {
                format!("{bits:x}")
            };
            Ok(pad_left(digits, precision.unwrap_or(0)))
        }
        ('B', Number::Int { value, width }) => {
            let bits = twos_complement(value, width);
            Ok(pad_left(format!("{bits:b}"), precision.unwrap_or(0)))
        }
        ('R', Number::Float(v)) => Ok(general(
            Decimal::from_f64_shortest(v),
            ROUND_TRIP_THRESHOLD,
            exponent_char,
            nf,
        )),
        ('G', Number::Int { value, .. }) => match precision {
            None | Some(0) => Ok(signed(value < 0, value.unsigned_abs().to_string(), nf)),
            Some(p) => {
                let mut d = Decimal::from_int(value);
                d.round_significant(p as i32);
                Ok(general(d, p as i32, exponent_char, nf))
            }
        },
        ('G', Number::Float(v)) => match precision {
            None | Some(0) => Ok(general(
                Decimal::from_f64_shortest(v),
                ROUND_TRIP_THRESHOLD,
                exponent_char,
                nf,
            )),
            Some(p) => {
                let mut d = Decimal::from_f64_exact(v);
                d.round_significant(p as i32);
                Ok(general(d, p as i32, exponent_char, nf))
            }
        },
        ('F', _) => Ok(fixed(number, precision.unwrap_or(2), false, nf)),
        ('N', _) => Ok(fixed(number, precision.unwrap_or(2), true, nf)),
        ('E', _) => Ok(scientific(number.exact(), precision.unwrap_or(6), exponent_char, nf)),
        ('P', _) => {
            let mut d = number.exact();
            d.shift(2);
            let places = precision.unwrap_or(2);
            d.round_fraction(places as i32);
            let body = format!("{} {}", fixed_digits(&d, places, true, nf), nf.percent_symbol);
            Ok(signed(d.negative, body, nf))
        }
        ('C', _) => {
            let mut d = number.exact();
            let places = precision.unwrap_or(2);
            d.round_fraction(places as i32);
            let body = format!("{}{}", nf.currency_symbol, fixed_digits(&d, places, true, nf));
            Ok(if d.negative {
                format!("({body})")
            } else {
                body
            })
        }
        _ => Err(FormatError::InvalidSpecifier),
    }
}

fn twos_complement(value: i128, width: u32) -> u128 {
    if value >= 0 {
        value as u128
    } else if width == 32 {
        value as i32 as u32 as u128
    } else {
        value as i64 as u64 as u128
    }
}

fn pad_left(digits: String, width: u32) -> String {
    format!("{digits:0>width$}", width = width as usize)
}

fn signed(negative: bool, body: String, nf: &NumberFormat) -> String {
    if negative {
        format!("{}{body}", nf.negative_sign)
    } else {
        body
    }
}

fn group(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

fn fixed_digits(d: &Decimal, places: u32, grouped: bool, nf: &NumberFormat) -> String {
    let integer = d.integer_digits();
    let mut out = if grouped {
        group(&integer, nf.group_separator)
    } else {
        integer
    };
    if places > 0 {
        out.push_str(nf.decimal_separator);
        out.push_str(&d.fraction_digits(places as i32));
    }
    out
}

fn fixed(number: Number, places: u32, grouped: bool, nf: &NumberFormat) -> String {
    let mut d = number.exact();
    d.round_fraction(places as i32);
    let body = fixed_digits(&d, places, grouped, nf);
    signed(d.negative, body, nf)
}

fn exponent_suffix(exponent: i32, exponent_char: char, min_digits: usize) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!(
        "{exponent_char}{sign}{:0>min_digits$}",
        exponent.unsigned_abs()
    )
}

fn scientific(mut d: Decimal, places: u32, exponent_char: char, nf: &NumberFormat) -> String {
    d.round_significant(places as i32 + 1);
    let (lead, rest) = d.mantissa_digits(places as i32);
    let mut body = lead.to_string();
    if places > 0 {
        body.push_str(nf.decimal_separator);
        body.push_str(&rest);
    }
    body.push_str(&exponent_suffix(d.exponent(), exponent_char, 3));
    signed(d.negative, body, nf)
}

/// Fixed notation while `-5 < exponent < threshold`.
fn general(d: Decimal, threshold: i32, exponent_char: char, nf: &NumberFormat) -> String {
    let exponent = d.exponent();
    let mut body;
    if exponent >= threshold || exponent <= -5 {
        let (lead, _) = d.mantissa_digits(0);
        body = lead.to_string();
        let tail = d.mantissa_tail();
        if !tail.is_empty() {
            body.push_str(nf.decimal_separator);
            body.push_str(&tail);
        }
        body.push_str(&exponent_suffix(exponent, exponent_char, 2));
    } else {
        body = d.integer_digits();
        let fraction = d.significant_fraction();
        if !fraction.is_empty() {
            body.push_str(nf.decimal_separator);
            body.push_str(&fraction);
        }
    }
    signed(d.negative, body, nf)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// `0` when true, `#` otherwise.
    Digit(bool),
    Point,
    Group,
    Percent,
    PerMille,
    /// `E+0`, `e-00`, ...; `always_sign` when written with `+`.
    Exponent {
        symbol: char,
        always_sign: bool,
        min_digits: usize,
    },
    Literal(String),
}

fn split_sections(pattern: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\\') => escaped = true,
            (None, '\'' | '"') => quote = Some(c),
            (None, ';') => {
                sections.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    sections.push(&pattern[start..]);
    sections
}

fn tokenize(section: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = section.chars();
    let mut seen_point = false;
    while let Some(c) = chars.next() {
        let token = match c {
            '0' => Token::Digit(true),
            '#' => Token::Digit(false),
            '.' if !seen_point => {
                seen_point = true;
                Token::Point
            }
            '.' => continue,
            ',' => Token::Group,
            '%' => Token::Percent,
            '\u{2030}' => Token::PerMille,
            'E' | 'e' => match exponent(&mut chars) {
                Some((always_sign, min_digits)) => Token::Exponent {
                    symbol: c,
                    always_sign,
                    min_digits,
                },
                None => Token::Literal(c.to_string()),
            },
            '\\' => match chars.next() {
                Some(next) => Token::Literal(next.to_string()),
                None => continue,
            },
            '\'' | '"' => {
                let text: String = chars.by_ref().take_while(|&q| q != c).collect();
                Token::Literal(text)
            }
            other => Token::Literal(other.to_string()),
        };
        tokens.push(token);
    }
    tokens
}

/// Consume the optional sign and the run of `0`s after an exponent symbol.
/// Returns `None` and consumes nothing when no `0` follows.
fn exponent(chars: &mut std::str::Chars<'_>) -> Option<(bool, usize)> {
    let mut look = chars.clone();
    let always_sign = match look.clone().next() {
        Some('+') => {
            look.next();
            true
        }
        Some('-') => {
            look.next();
            false
        }
        _ => false,
    };
    let mut min_digits = 0;
    while look.clone().next() == Some('0') {
        look.next();
        min_digits += 1;
    }
    if min_digits == 0 {
        return None;
    }
    *chars = look;
    Some((always_sign, min_digits))
}

struct Layout {
    integer_placeholders: usize,
    min_integer: usize,
    min_fraction: usize,
    max_fraction: usize,
    grouping: bool,
    scale: i32,
}

fn layout(tokens: &[Token]) -> Layout {
    let point = tokens
        .iter()
        .position(|t| *t == Token::Point)
        .unwrap_or(tokens.len());
    let (integer, fraction) = tokens.split_at(point);

    let integer_digits: Vec<bool> = integer
        .iter()
        .filter_map(|t| match t {
            Token::Digit(zero) => Some(*zero),
            _ => None,
        })
        .collect();
    let min_integer = integer_digits
        .iter()
        .position(|zero| *zero)
        .map_or(0, |first| integer_digits.len() - first);

    let fraction_digits: Vec<bool> = fraction
        .iter()
        .filter_map(|t| match t {
            Token::Digit(zero) => Some(*zero),
            _ => None,
        })
        .collect();
    let min_fraction = fraction_digits.iter().rposition(|zero| *zero).map_or(0, |i| i + 1);

    let first_digit = integer.iter().position(|t| matches!(t, Token::Digit(_)));
    let last_digit = integer.iter().rposition(|t| matches!(t, Token::Digit(_)));
    let grouping = match (first_digit, last_digit) {
        (Some(first), Some(last)) => integer[first..last].contains(&Token::Group),
        _ => false,
    };

    // Separators directly left of the point divide by 1000 each.
    let scaling_groups = match last_digit {
        Some(last) => integer[last + 1..]
            .iter()
            .take_while(|t| **t == Token::Group)
            .count(),
        None => 0,
    };

    let percent = tokens.iter().filter(|t| **t == Token::Percent).count() as i32;
    let per_mille = tokens.iter().filter(|t| **t == Token::PerMille).count() as i32;

    Layout {
        integer_placeholders: integer_digits.len(),
        min_integer,
        min_fraction,
        max_fraction: fraction_digits.len(),
        grouping,
        scale: 2 * percent + 3 * per_mille - 3 * scaling_groups as i32,
    }
}

fn custom(number: Number, pattern: &str, nf: &NumberFormat) -> String {
    let sections = split_sections(pattern);
    let value = number.exact();
    let (section, use_sign) = if value.is_zero() && sections.len() >= 3 && !sections[2].is_empty()
    {
        (sections[2], false)
    } else if value.negative && sections.len() >= 2 && !sections[1].is_empty() {
        (sections[1], false)
    } else {
        (sections[0], true)
    };

    let tokens = tokenize(section);
    let layout = layout(&tokens);
    let scientific = tokens.iter().any(|t| matches!(t, Token::Exponent { .. }));

    let mut d = value;
    d.shift(layout.scale);
    // The mantissa keeps one digit per integer placeholder.
    let mut exponent = 0;
    if scientific && !d.is_zero() {
        let significant = (layout.integer_placeholders + layout.max_fraction).max(1);
        d.round_significant(significant as i32);
        exponent = d.point - layout.integer_placeholders as i32;
        d.shift(-exponent);
    }
    d.round_fraction(layout.max_fraction as i32);

    let mut integer = if d.point > 0 {
        d.integer_digits()
    } else {
        String::new()
    };
    if integer.len() < layout.min_integer {
        integer = pad_left(integer, layout.min_integer as u32);
    }
    let mut fraction = d.fraction_digits(layout.max_fraction as i32);
    while fraction.len() > layout.min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }

    let integer_chars: Vec<char> = integer.chars().collect();
    let offset = integer_chars.len() as isize - layout.integer_placeholders as isize;
    let mut out = String::new();
    let mut integer_index = 0usize;
    let mut fraction_index = 0usize;
    let mut in_fraction = false;

    for token in &tokens {
        match token {
            Token::Digit(_) if !in_fraction => {
                let slot = integer_index as isize + offset;
                if layout.grouping {
                    if integer_index == 0 {
                        out.push_str(&group(&integer, nf.group_separator));
                    }
                } else if integer_index == 0 && offset > 0 {
                    out.extend(&integer_chars[..=offset as usize]);
                } else if slot >= 0 {
                    out.push(integer_chars[slot as usize]);
                }
                integer_index += 1;
            }
            Token::Digit(_) => {
                if let Some(c) = fraction.chars().nth(fraction_index) {
                    out.push(c);
                }
                fraction_index += 1;
            }
            Token::Point => {
                if layout.integer_placeholders == 0 {
                    out.push_str(&integer);
                }
                in_fraction = true;
                if !fraction.is_empty() {
                    out.push_str(nf.decimal_separator);
                }
            }
            Token::Group => {}
            Token::Percent => out.push_str(nf.percent_symbol),
            Token::PerMille => out.push_str(nf.per_mille_symbol),
            Token::Exponent {
                symbol,
                always_sign,
                min_digits,
            } => {
                out.push(*symbol);
                if exponent < 0 {
                    out.push_str(nf.negative_sign);
                } else if *always_sign {
                    out.push('+');
                }
                out.push_str(&pad_left(exponent.unsigned_abs().to_string(), *min_digits as u32));
            }
            Token::Literal(text) => out.push_str(text),
        }
    }

    if use_sign && d.negative && !d.is_zero() {
        format!("{}{out}", nf.negative_sign)
    } else {
        out
    }
}
