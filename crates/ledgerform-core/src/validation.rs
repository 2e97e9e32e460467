//! Validation rules registered by the renderers against form-state paths.
//!
//! The engine only declares rules (required, email pattern); evaluation and
//! error storage belong to the form state.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Default message for an invalid email address.
pub const INVALID_EMAIL_MESSAGE: &str = "Email không hợp lệ";

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Pattern check applied to non-empty string values.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    pub message: String,
}

impl PartialEq for PatternRule {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str() && self.message == other.message
    }
}

/// Rules registered for one path. `required` holds the message to report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationRules {
    pub required: Option<String>,
    pub pattern: Option<PatternRule>,
}

impl ValidationRules {
    #[must_use]
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            required: Some(message.into()),
            pattern: None,
        }
    }

    /// Email format rule with the given message.
    #[must_use]
    pub fn email(message: impl Into<String>) -> Self {
        Self {
            required: None,
            pattern: email_regex().map(|regex| PatternRule {
                regex: regex.clone(),
                message: message.into(),
            }),
        }
    }

    /// Combines two rule sets; `other` wins where both set the same rule.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        if other.required.is_some() {
            self.required = other.required;
        }
        if other.pattern.is_some() {
            self.pattern = other.pattern;
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_none() && self.pattern.is_none()
    }

    /// First failing rule's message, if any.
    ///
    /// Required fails on null, `""`, `false` and empty arrays; `0` passes.
    #[must_use]
    pub fn check(&self, value: &Value) -> Option<String> {
        if let Some(message) = &self.required {
            if is_missing(value) {
                return Some(message.clone());
            }
        }
        if let (Some(rule), Value::String(text)) = (&self.pattern, value) {
            if !text.is_empty() && !rule.regex.is_match(text) {
                return Some(rule.message.clone());
            }
        }
        None
    }
}

/// Matches the email pattern used by `email` fields.
#[must_use]
pub fn is_valid_email(text: &str) -> bool {
    email_regex().is_some_and(|regex| regex.is_match(text))
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_rule_carries_compiled_pattern() {
        let rules = ValidationRules::email("Email không hợp lệ");
        assert!(rules.pattern.is_some());
        assert_eq!(rules.check(&json!("a@b")).as_deref(), Some("Email không hợp lệ"));
    }

    #[test]
    fn required_rejects_blank_values_only() {
        let rules = ValidationRules::required("Số tiền là bắt buộc");
        assert_eq!(rules.check(&json!(null)).as_deref(), Some("Số tiền là bắt buộc"));
        assert_eq!(rules.check(&json!("")).as_deref(), Some("Số tiền là bắt buộc"));
        assert_eq!(rules.check(&json!(false)).as_deref(), Some("Số tiền là bắt buộc"));
        assert_eq!(rules.check(&json!([])).as_deref(), Some("Số tiền là bắt buộc"));
        assert_eq!(rules.check(&json!(0)), None);
        assert_eq!(rules.check(&json!("x")), None);
    }

    #[test]
    fn email_rule_skips_empty_and_flags_bad_text() {
        let rules = ValidationRules::email(INVALID_EMAIL_MESSAGE);
        assert_eq!(rules.check(&json!("")), None);
        assert_eq!(rules.check(&json!(null)), None);
        assert_eq!(rules.check(&json!("a@b.co")), None);
        assert_eq!(rules.check(&json!("a@b")).as_deref(), Some(INVALID_EMAIL_MESSAGE));
        assert_eq!(rules.check(&json!("a b@c.d")).as_deref(), Some(INVALID_EMAIL_MESSAGE));
    }

    #[test]
    fn required_is_reported_before_pattern() {
        let rules = ValidationRules::email(INVALID_EMAIL_MESSAGE).merge(ValidationRules::required("Email là bắt buộc"));
        assert_eq!(rules.check(&json!("")).as_deref(), Some("Email là bắt buộc"));
        assert!(!rules.is_empty());
        assert!(ValidationRules::default().is_empty());
    }

    #[test]
    fn email_helper_matches_rule() {
        assert!(is_valid_email("ke.toan@congty.vn"));
        assert!(!is_valid_email("@congty.vn"));
    }
}
