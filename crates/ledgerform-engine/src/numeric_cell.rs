//! Edit buffer for numeric inputs.
//!
//! While the user types, the input shows exactly what was typed (a trailing
//! `,` or a half-typed `1.2` must not be reformatted away) even though the
//! form state only ever receives parsed numbers or `""`. The cell tracks that
//! window explicitly:
//!
//! - `Committed(v)`: the input shows `format(v)`.
//! - `Editing { display, committed }`: the input shows `display`;
//!   `committed` is what this cell last wrote.
//!
//! `blur` always returns to `Committed`. `reconcile` drops an `Editing` cell
//! back to `Committed` when the stored value changed underneath it.

use ledgerform_core::numeric::NumberLocale;
use ledgerform_core::value::number_value;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum NumericCell {
    Committed(Option<f64>),
    Editing {
        display: String,
        committed: Option<f64>,
    },
}

impl Default for NumericCell {
    fn default() -> Self {
        Self::Committed(None)
    }
}

impl NumericCell {
    /// Applies one input change. Returns the value to write to the form
    /// state, or `None` when the text does not parse yet.
    pub fn input(&mut self, raw: &str, locale: &NumberLocale) -> Option<Value> {
        let previous = self.committed();
        let (committed, write) = if raw.trim().is_empty() {
            (None, Some(Value::String(String::new())))
        } else {
            match locale.parse(raw) {
                Some(n) => (Some(n), Some(number_value(n))),
                None => (previous, None),
            }
        };
        *self = Self::Editing {
            display: raw.to_owned(),
            committed,
        };
        write
    }

    /// Ends the edit and returns the value to write: the parsed number, or
    /// `""` when the display does not parse.
    pub fn blur(&mut self, locale: &NumberLocale) -> Value {
        let parsed = match self {
            Self::Editing { display, .. } => locale.parse(display),
            Self::Committed(value) => *value,
        };
        *self = Self::Committed(parsed);
        parsed.map_or_else(|| Value::String(String::new()), number_value)
    }

    /// Brings the cell in line with the stored value before rendering.
    pub fn reconcile(&mut self, stored: &Value, locale: &NumberLocale) {
        let stored = locale.parse_value(stored);
        let keep_editing = matches!(self, Self::Editing { committed, .. } if *committed == stored);
        if !keep_editing {
            *self = Self::Committed(stored);
        }
    }

    /// Text shown in the input.
    #[must_use]
    pub fn display(&self, locale: &NumberLocale) -> String {
        match self {
            Self::Editing { display, .. } => display.clone(),
            Self::Committed(Some(n)) => locale.format(*n),
            Self::Committed(None) => String::new(),
        }
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    fn committed(&self) -> Option<f64> {
        match self {
            Self::Committed(value) | Self::Editing { committed: value, .. } => *value,
        }
    }
}
