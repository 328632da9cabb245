//! Exact decimal digit strings used by numeric formatting.

/// `0.d0 d1 d2 ... * 10^point`, sign kept separately.
///
/// `digits` never has leading or trailing zeros; zero has no digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decimal {
    pub negative: bool,
    pub digits: Vec<u8>,
    pub point: i32,
}

impl Decimal {
    pub fn from_int(value: i128) -> Self {
        let digits: Vec<u8> = value
            .unsigned_abs()
            .to_string()
            .bytes()
            .map(|b| b - b'0')
            .collect();
        let mut decimal = Self {
            negative: value < 0,
            point: digits.len() as i32,
            digits,
        };
        decimal.trim();
        decimal
    }

    /// Exact decimal expansion of `value` (to 60 significant digits).
    pub fn from_f64_exact(value: f64) -> Self {
        Self::parse_exponential(&format!("{:.60e}", value.abs()), value.is_sign_negative())
    }

    /// Shortest digits that round-trip to `value`.
    pub fn from_f64_shortest(value: f64) -> Self {
        Self::parse_exponential(&format!("{:e}", value.abs()), value.is_sign_negative())
    }

    fn parse_exponential(text: &str, negative: bool) -> Self {
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text, "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let digits: Vec<u8> = mantissa
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .collect();
        let mut decimal = Self {
            negative,
            digits,
            point: exponent + 1,
        };
        decimal.trim();
        decimal
    }

    fn trim(&mut self) {
        let leading = self.digits.iter().take_while(|&&d| d == 0).count();
        if leading > 0 {
            self.digits.drain(..leading);
            self.point -= leading as i32;
        }
        while self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        if self.digits.is_empty() {
            self.point = 0;
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Multiply by `10^shift`.
    pub fn shift(&mut self, shift: i32) {
        if !self.is_zero() {
            self.point += shift;
        }
    }

    /// Keep `keep` leading digits, rounding half away from zero.
    fn round_to_digits(&mut self, keep: i32) {
        if keep >= self.digits.len() as i32 {
            return;
        }
        if keep < 0 {
            self.digits.clear();
            self.trim();
            return;
        }
        let keep = keep as usize;
        let round_up = self.digits[keep] >= 5;
        self.digits.truncate(keep);
        if round_up {
            let mut index = keep;
            loop {
                if index == 0 {
                    self.digits.insert(0, 1);
                    self.point += 1;
                    break;
                }
                index -= 1;
                if self.digits[index] == 9 {
                    self.digits[index] = 0;
                } else {
                    self.digits[index] += 1;
                    break;
                }
            }
        }
        self.trim();
    }

    /// Round to `places` digits after the decimal point.
    pub fn round_fraction(&mut self, places: i32) {
        self.round_to_digits(self.point + places);
    }

    /// Round to `precision` significant digits.
    pub fn round_significant(&mut self, precision: i32) {
        self.round_to_digits(precision);
    }

    fn digit_at(&self, index: i32) -> u8 {
        if index < 0 {
            return 0;
        }
        self.digits.get(index as usize).copied().unwrap_or(0)
    }

    /// Integer part digits, `"0"` when there are none.
    pub fn integer_digits(&self) -> String {
        if self.point <= 0 {
            return "0".to_string();
        }
        (0..self.point)
            .map(|i| char::from(b'0' + self.digit_at(i)))
            .collect()
    }

    /// Exactly `places` fraction digits.
    pub fn fraction_digits(&self, places: i32) -> String {
        (0..places)
            .map(|i| char::from(b'0' + self.digit_at(self.point + i)))
            .collect()
    }

    /// Fraction digits up to the last non-zero one.
    pub fn significant_fraction(&self) -> String {
        let len = (self.digits.len() as i32 - self.point).max(0);
        self.fraction_digits(len)
    }

    /// Decimal exponent of the leading digit.
    pub fn exponent(&self) -> i32 {
        if self.is_zero() { 0 } else { self.point - 1 }
    }

    /// Leading digit followed by exactly `places` digits.
    pub fn mantissa_digits(&self, places: i32) -> (char, String) {
        let lead = char::from(b'0' + self.digit_at(0));
        let rest = (1..=places)
            .map(|i| char::from(b'0' + self.digit_at(i)))
            .collect();
        (lead, rest)
    }

    /// Mantissa digits after the leading one, without trailing zeros.
    pub fn mantissa_tail(&self) -> String {
        self.digits
            .iter()
            .skip(1)
            .map(|d| char::from(b'0' + d))
            .collect()
    }
}
