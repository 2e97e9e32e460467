//! Date canonicalization for `date` and `datetime` fields.
//!
//! Whatever the picker hands back (a calendar date, a picked local moment, a
//! list of dates, or typed `dd/mm/yyyy` text) is stored as the ISO-8601
//! instant of that calendar day at UTC midnight. Re-canonicalizing a stored
//! value yields the same string. Display uses a configurable `strftime`
//! pattern, `%d/%m/%Y` by default.

use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;

/// Default display pattern (`05/03/2024`).
pub const DEFAULT_DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Raw output of a date picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerValue {
    /// Picker was cleared.
    Empty,
    /// A calendar date in the user's local calendar.
    Date(NaiveDate),
    /// A picked local moment; only its calendar date is kept.
    LocalDateTime(NaiveDateTime),
    /// Range/multi pickers report a list; the first entry wins.
    Many(Vec<PickerValue>),
    /// Typed or pre-formatted text (`dd/mm/yyyy`, ISO date or instant).
    Text(String),
}

impl PickerValue {
    /// Reads a picker payload delivered as JSON (null, string or array).
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(items) => Self::Many(items.iter().map(Self::from_json).collect()),
            _ => Self::Empty,
        }
    }
}

/// Canonical UTC-midnight ISO instant for a picker value, or `None` when it
/// holds no readable date.
#[must_use]
pub fn canonicalize(value: &PickerValue) -> Option<String> {
    calendar_date(value).map(iso_midnight)
}

/// Stored-value form of [`canonicalize`]: a string or JSON null.
#[must_use]
pub fn canonical_value(value: &PickerValue) -> Value {
    canonicalize(value).map_or(Value::Null, Value::String)
}

/// Calendar date carried by a picker value.
#[must_use]
pub fn calendar_date(value: &PickerValue) -> Option<NaiveDate> {
    match value {
        PickerValue::Empty => None,
        PickerValue::Date(date) => Some(*date),
        PickerValue::LocalDateTime(moment) => Some(moment.date()),
        PickerValue::Many(items) => items.first().and_then(calendar_date),
        PickerValue::Text(text) => parse_date_text(text),
    }
}

/// Reads `dd/mm/yyyy`, RFC 3339 instants (date taken in the instant's own
/// offset), `yyyy-mm-dd` and offset-less ISO date-times.
#[must_use]
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(caps) = day_first_pattern().and_then(|re| re.captures(text)) {
        let day = caps.get(1)?.as_str().parse().ok()?;
        let month = caps.get(2)?.as_str().parse().ok()?;
        let year = caps.get(3)?.as_str().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|moment| moment.date())
}

/// Read-only text for a stored date value.
///
/// Blank values show nothing; unreadable text is echoed unchanged; numbers
/// are epoch milliseconds.
#[must_use]
pub fn format_display(value: &Value, pattern: &str) -> String {
    let date = match value {
        Value::String(text) if text.is_empty() => return String::new(),
        Value::String(text) => match parse_date_text(text) {
            Some(date) => date,
            None => return text.clone(),
        },
        Value::Number(number) => match number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
        {
            Some(instant) => instant.date_naive(),
            None => return String::new(),
        },
        _ => return String::new(),
    };
    format_date(date, pattern)
}

/// Formats a date, falling back to the default pattern if `pattern` is not
/// a usable strftime string.
#[must_use]
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let pattern = if is_valid_pattern(pattern) {
        pattern
    } else {
        DEFAULT_DISPLAY_FORMAT
    };
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        out.clear();
    }
    out
}

/// True when `pattern` parses as strftime without error items.
#[must_use]
pub fn is_valid_pattern(pattern: &str) -> bool {
    !pattern.is_empty() && StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

fn iso_midnight(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

fn day_first_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").ok())
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => date,
            None => panic!("bad test date {year}-{month}-{day}"),
        }
    }

    #[test]
    fn day_first_pattern_compiles() {
        assert!(day_first_pattern().is_some_and(|re| re.is_match("5/3/2024")));
    }

    #[test]
    fn picked_local_date_stores_utc_midnight() {
        let stored = canonicalize(&PickerValue::Date(ymd(2024, 3, 5)));
        assert_eq!(stored.as_deref(), Some("2024-03-05T00:00:00.000Z"));
        let display = format_display(&json!(stored), DEFAULT_DISPLAY_FORMAT);
        assert_eq!(display, "05/03/2024");
    }

    #[test]
    fn picked_local_moment_keeps_calendar_day() {
        let moment = ymd(2024, 3, 5).and_hms_opt(23, 30, 0);
        let Some(moment) = moment else {
            panic!("bad test time");
        };
        assert_eq!(
            canonicalize(&PickerValue::LocalDateTime(moment)).as_deref(),
            Some("2024-03-05T00:00:00.000Z")
        );
    }

    #[test]
    fn lists_use_first_entry() {
        let picked = PickerValue::Many(vec![
            PickerValue::Date(ymd(2024, 1, 31)),
            PickerValue::Date(ymd(2024, 2, 29)),
        ]);
        assert_eq!(canonicalize(&picked).as_deref(), Some("2024-01-31T00:00:00.000Z"));
        assert_eq!(canonicalize(&PickerValue::Many(vec![])), None);
    }

    #[test]
    fn day_first_text_is_accepted() {
        let picked = PickerValue::Text("5/3/2024".into());
        assert_eq!(canonicalize(&picked).as_deref(), Some("2024-03-05T00:00:00.000Z"));
        assert_eq!(canonicalize(&PickerValue::Text("31/02/2024".into())), None);
        assert_eq!(canonicalize(&PickerValue::Text("soon".into())), None);
        assert_eq!(canonicalize(&PickerValue::Empty), None);
    }

    #[test]
    fn offset_instants_keep_their_own_calendar_day() {
        let picked = PickerValue::Text("2024-03-05T00:00:00+07:00".into());
        assert_eq!(canonicalize(&picked).as_deref(), Some("2024-03-05T00:00:00.000Z"));
        let plain = PickerValue::Text("2024-03-05".into());
        assert_eq!(canonicalize(&plain).as_deref(), Some("2024-03-05T00:00:00.000Z"));
    }

    #[test]
    fn json_payloads_map_to_picker_values() {
        assert_eq!(PickerValue::from_json(&json!(null)), PickerValue::Empty);
        assert_eq!(
            canonical_value(&PickerValue::from_json(&json!(["05/03/2024"]))),
            json!("2024-03-05T00:00:00.000Z")
        );
        assert_eq!(canonical_value(&PickerValue::from_json(&json!(7))), Value::Null);
    }

    #[test]
    fn display_degrades_softly() {
        assert_eq!(format_display(&json!(null), DEFAULT_DISPLAY_FORMAT), "");
        assert_eq!(format_display(&json!(""), DEFAULT_DISPLAY_FORMAT), "");
        assert_eq!(format_display(&json!("later"), DEFAULT_DISPLAY_FORMAT), "later");
        assert_eq!(format_display(&json!(1709596800000i64), DEFAULT_DISPLAY_FORMAT), "05/03/2024");
        assert_eq!(format_display(&json!("2024-03-05"), "%Y.%m.%d"), "2024.03.05");
    }

    #[test]
    fn invalid_patterns_fall_back() {
        assert!(is_valid_pattern("%d/%m/%Y"));
        assert!(!is_valid_pattern("%Q"));
        assert!(!is_valid_pattern(""));
        assert_eq!(format_date(ymd(2024, 3, 5), "%Q"), "05/03/2024");
    }

    proptest! {
        #[test]
        fn canonicalization_is_idempotent(days in 0i64..200_000) {
            let base = ymd(1900, 1, 1);
            let date = base + chrono::Duration::days(days);
            let once = canonicalize(&PickerValue::Date(date));
            let twice = once.clone().and_then(|iso| canonicalize(&PickerValue::Text(iso)));
            prop_assert!(once.is_some());
            prop_assert_eq!(once, twice);
        }
    }
}
