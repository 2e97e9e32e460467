//! Loose-value helpers shared by the formatters.
//!
//! Field values arrive as JSON from the backend and from user edits, so a
//! text field can hold a number and a select can hold either a string or a
//! numeric id. These helpers give every such value one display form.

use serde_json::{Number, Value};

/// Text shown for a value in a plain (text/email/textarea) read-only box.
///
/// Booleans and objects have no text form; arrays (e.g. tag lists) are joined.
#[must_use]
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(_) | Value::Object(_) => String::new(),
        Value::Number(number) => number_text(number),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_text)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Stringified identity used to match stored values against option values.
#[must_use]
pub fn option_key(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number_text(number),
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Truthiness as the checkbox read-only label sees it.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `null` or the empty string.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Wraps a finite float as a JSON number, storing integral values as integers.
#[must_use]
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        #[allow(clippy::cast_possible_truncation)]
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn number_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e21 => format!("{float:.0}"),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_text_covers_loose_values() {
        assert_eq!(display_text(&json!(null)), "");
        assert_eq!(display_text(&json!("Hà Nội")), "Hà Nội");
        assert_eq!(display_text(&json!(0)), "0");
        assert_eq!(display_text(&json!(2.5)), "2.5");
        assert_eq!(display_text(&json!(true)), "");
        assert_eq!(display_text(&json!(["vip", "", "retail"])), "vip, retail");
    }

    #[test]
    fn option_key_normalizes_integral_floats() {
        assert_eq!(option_key(&json!(1.0)), "1");
        assert_eq!(option_key(&json!(7)), "7");
        assert_eq!(option_key(&json!("7")), "7");
        assert_eq!(option_key(&json!(null)), "");
    }

    #[test]
    fn truthiness_matches_checkbox_reading() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(3)));
    }

    #[test]
    fn number_value_keeps_integers_integral() {
        assert_eq!(number_value(1234567.0), json!(1234567));
        assert_eq!(number_value(1234567.5), json!(1234567.5));
        assert!(is_blank(&json!("")));
        assert!(!is_blank(&json!(0)));
    }
}
