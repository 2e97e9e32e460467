//! Declarative field schema delivered by the backend metadata endpoints.
//!
//! Each entry describes one bound attribute: name, label, type tag, grid
//! width, flags and (for choice fields) options. Parsing is lenient: unknown
//! type tags fall back to `text`, odd widths fall back to full width, and
//! entries that cannot be read at all are skipped with a warning so the rest
//! of the form still renders.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::SchemaError;
use crate::value::{is_truthy, option_key};

/// Closed set of renderable field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "&'static str")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Select,
    Date,
    Datetime,
    Number,
    Email,
    Checkbox,
    /// Derived, always read-only cell. Only meaningful inside a notebook.
    Computed,
}

impl FieldType {
    /// Maps a wire tag to a type; unknown tags render as text.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "date" => Self::Date,
            "datetime" => Self::Datetime,
            "number" => Self::Number,
            "email" => Self::Email,
            "checkbox" => Self::Checkbox,
            "computed" | "compute" => Self::Computed,
            _ => Self::Text,
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Number => "number",
            Self::Email => "email",
            Self::Checkbox => "checkbox",
            Self::Computed => "computed",
        }
    }

    /// Date-valued kinds share the picker and the `dd/mm/yyyy` display.
    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(self, Self::Date | Self::Datetime)
    }
}

impl From<FieldType> for &'static str {
    fn from(value: FieldType) -> Self {
        value.tag()
    }
}

/// Layout span on the 12-unit grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u8")]
pub enum WidthSpan {
    Quarter,
    Third,
    Half,
    TwoThirds,
    #[default]
    Full,
}

impl WidthSpan {
    /// Width of the layout grid in units.
    pub const GRID_UNITS: u8 = 12;

    /// Grid units this span covers.
    #[must_use]
    pub fn units(self) -> u8 {
        match self {
            Self::Quarter => 3,
            Self::Third => 4,
            Self::Half => 6,
            Self::TwoThirds => 8,
            Self::Full => 12,
        }
    }

    /// Exact match on the supported spans; anything else is full width.
    #[must_use]
    pub fn from_units(units: u64) -> Self {
        match units {
            3 => Self::Quarter,
            4 => Self::Third,
            6 => Self::Half,
            8 => Self::TwoThirds,
            _ => Self::Full,
        }
    }
}

impl From<WidthSpan> for u8 {
    fn from(value: WidthSpan) -> Self {
        value.units()
    }
}

/// One selectable choice of a `select` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// String or numeric identity stored into the form state.
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub disabled: bool,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<Value>, label: &str) -> Self {
        Self {
            value: value.into(),
            label: Some(label.to_owned()),
            disabled: false,
        }
    }

    /// Display label; falls back to the stringified value.
    #[must_use]
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => option_key(&self.value),
        }
    }

    /// Stringified identity used for matching.
    #[must_use]
    pub fn key(&self) -> String {
        option_key(&self.value)
    }
}

/// Declarative description of one form field or notebook column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_field_type")]
    pub field_type: FieldType,
    #[serde(default, deserialize_with = "lenient_width")]
    pub width: WidthSpan,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub required: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub disabled: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub hidden: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    /// Where the host should load this field's option list from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch: Option<String>,
}

impl FieldSchema {
    #[must_use]
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            field_type,
            width: WidthSpan::Full,
            required: false,
            disabled: false,
            hidden: false,
            options: Vec::new(),
            fetch: None,
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: WidthSpan) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Externally supplied option lists keyed by field name.
pub type OptionsMap = BTreeMap<String, Vec<SelectOption>>;

/// Effective options of a field: the external list wins when present.
#[must_use]
pub fn resolve_options<'a>(field: &'a FieldSchema, options_map: Option<&'a OptionsMap>) -> &'a [SelectOption] {
    options_map
        .and_then(|map| map.get(&field.name))
        .map_or(field.options.as_slice(), Vec::as_slice)
}

/// Label of the option whose stringified value equals the stored value's.
/// A miss yields an empty label, never the raw value.
#[must_use]
pub fn option_label(options: &[SelectOption], value: &Value) -> String {
    let key = option_key(value);
    options
        .iter()
        .find(|option| option.key() == key)
        .map(SelectOption::display_label)
        .unwrap_or_default()
}

/// A field list as received, or the marker that it was not a list at all.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldsInput {
    Fields(Vec<FieldSchema>),
    Malformed { found: &'static str },
}

impl FieldsInput {
    /// Reads a JSON field list. Non-arrays become [`FieldsInput::Malformed`];
    /// unreadable entries are skipped.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Value::Array(items) = value else {
            let found = json_kind(value);
            warn!(found, "field schema is not an array");
            return Self::Malformed { found };
        };

        let mut fields = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match FieldSchema::deserialize(item) {
                Ok(field) if field.name.trim().is_empty() => {
                    warn!(index, "skipping field schema entry with empty name");
                }
                Ok(field) => fields.push(field),
                Err(error) => {
                    warn!(index, %error, "skipping unreadable field schema entry");
                }
            }
        }
        Self::Fields(fields)
    }

    /// Every parsed entry, hidden ones included. Empty when malformed.
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        match self {
            Self::Fields(fields) => fields,
            Self::Malformed { .. } => &[],
        }
    }

    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Entries that take part in layout.
    pub fn visible(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields().iter().filter(|field| !field.hidden)
    }
}

impl From<Vec<FieldSchema>> for FieldsInput {
    fn from(fields: Vec<FieldSchema>) -> Self {
        Self::Fields(fields)
    }
}

/// A metadata document: named sections, each carrying a `fields` list.
///
/// Sections without `fields` (list-grid columns, search settings) are not
/// part of the rendering engine and are ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaDocument {
    sections: BTreeMap<String, FieldsInput>,
}

impl SchemaDocument {
    pub fn from_json(root: &Value) -> Result<Self, SchemaError> {
        let Value::Object(map) = root else {
            return Err(SchemaError::NotAnObject {
                found: json_kind(root),
            });
        };
        let mut sections = BTreeMap::new();
        for (name, section) in map {
            if let Some(fields) = section.get("fields") {
                sections.insert(name.clone(), FieldsInput::from_json(fields));
            }
        }
        Ok(Self { sections })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        let root: Value = serde_json::from_str(raw)?;
        Self::from_json(&root)
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&FieldsInput> {
        self.sections.get(name)
    }

    /// The single-record form section.
    #[must_use]
    pub fn form(&self) -> Option<&FieldsInput> {
        self.section("form")
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// A select field whose options the host must load itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSource {
    pub field: String,
    pub source: String,
}

/// Lookup hints of every select field that declares a `fetch` source.
#[must_use]
pub fn lookup_sources(fields: &[FieldSchema]) -> Vec<LookupSource> {
    fields
        .iter()
        .filter(|field| field.field_type == FieldType::Select)
        .filter_map(|field| {
            let source = field.fetch.as_deref()?.trim();
            (!source.is_empty()).then(|| LookupSource {
                field: field.name.clone(),
                source: source.to_owned(),
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_field_type<'de, D>(deserializer: D) -> Result<FieldType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(tag)) => FieldType::from_tag(&tag),
        _ => FieldType::Text,
    })
}

fn lenient_width<'de, D>(deserializer: D) -> Result<WidthSpan, D::Error>
where
    D: Deserializer<'de>,
{
    let units = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(units.map_or(WidthSpan::Full, WidthSpan::from_units))
}

/// Flags follow loose truthiness (`1`, `"true"`) instead of failing the entry.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.is_some_and(|value| is_truthy(&value)))
}
