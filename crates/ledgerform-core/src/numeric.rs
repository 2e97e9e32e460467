//! Locale-aware number parsing and formatting.
//!
//! The default locale groups digits with `.` and separates decimals with `,`
//! (`1.234.567,5`). Parsing strips group separators before reading the
//! decimal separator, so user input with or without grouping is accepted.
//! Formatting keeps at most `max_fraction_digits` fraction digits and drops
//! trailing zeros; `parse(format(x)) == x` holds for every finite `x` that
//! needs no more fraction digits than that.

use serde_json::Value;

use crate::value::display_text;

/// Separators and precision for one display locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub group_separator: char,
    pub decimal_separator: char,
    pub max_fraction_digits: u8,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            group_separator: '.',
            decimal_separator: ',',
            max_fraction_digits: 3,
        }
    }
}

impl NumberLocale {
    /// Parses user or stored text. Empty, malformed and non-finite input
    /// yield `None`.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized: String = trimmed
            .chars()
            .filter(|ch| *ch != self.group_separator)
            .map(|ch| if ch == self.decimal_separator { '.' } else { ch })
            .collect();
        normalized.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Numeric reading of a stored value: numbers as-is, strings parsed.
    #[must_use]
    pub fn parse_value(&self, value: &Value) -> Option<f64> {
        match value {
            Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
            Value::String(text) => self.parse(text),
            _ => None,
        }
    }

    /// Grouped display string for a number. Non-finite input formats empty.
    #[must_use]
    pub fn format(&self, n: f64) -> String {
        if !n.is_finite() {
            return String::new();
        }
        let digits = usize::from(self.max_fraction_digits);
        let fixed = format!("{:.*}", digits, n.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
        let frac_part = frac_part.trim_end_matches('0');

        let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 2);
        let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
        if n.is_sign_negative() && !is_zero {
            out.push('-');
        }
        let len = int_part.len();
        for (idx, ch) in int_part.chars().enumerate() {
            if idx > 0 && (len - idx) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(ch);
        }
        if !frac_part.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }

    /// Display string for a stored value: blanks format empty, strings are
    /// parsed first and format empty when unparseable.
    #[must_use]
    pub fn format_value(&self, value: &Value) -> String {
        self.parse_value(value)
            .map(|n| self.format(n))
            .unwrap_or_default()
    }

    /// Read-only reading of a numeric or computed cell: formatted when the
    /// value is numeric or parseable, otherwise the raw text.
    #[must_use]
    pub fn display_value(&self, value: &Value) -> String {
        match self.parse_value(value) {
            Some(n) => self.format(n),
            None => display_text(value),
        }
    }
}
