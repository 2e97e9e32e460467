//! Per-type rendering and edit handling shared by both orchestrators.
//!
//! [`render_field`] turns one schema entry plus its current value into a
//! [`FieldNode`]; [`apply_event`] routes one user edit into the form state.
//! Both dispatch over the closed [`FieldType`] set with a single exhaustive
//! match.

use ledgerform_core::config::EngineConfig;
use ledgerform_core::date::{self, PickerValue};
use ledgerform_core::form_state::FormState;
use ledgerform_core::numeric::NumberLocale;
use ledgerform_core::path::FieldPath;
use ledgerform_core::schema::{option_label, FieldSchema, FieldType, SelectOption};
use ledgerform_core::validation::ValidationRules;
use ledgerform_core::value::{display_text, is_truthy, option_key};
use ledgerform_term_adapter::input::{Key, KeyEvent};
use serde_json::Value;
use tracing::debug;

use crate::node::{ChoiceNode, Control, FieldNode, InputKind};
use crate::numeric_cell::NumericCell;

/// Where a field is being rendered; selects the empty-select placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Form,
    NotebookCell,
}

/// Everything the renderer needs for one field.
#[derive(Debug, Clone)]
pub struct FieldContext<'a> {
    pub field: &'a FieldSchema,
    pub path: FieldPath,
    /// Watched value at `path`.
    pub value: Value,
    /// Numeric edit buffer, already reconciled with `value`.
    pub draft: Option<&'a NumericCell>,
    pub editable: bool,
    /// Resolved options (external map over schema-local).
    pub options: &'a [SelectOption],
    pub error: Option<String>,
    pub placement: Placement,
    pub config: &'a EngineConfig,
}

/// One user edit addressed to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    /// Text changed (text, textarea, email, number).
    Input(String),
    /// Focus left a numeric input.
    Blur,
    /// Raw keystroke, checked against the numeric filter.
    Key(KeyEvent),
    Toggle(bool),
    /// Date picker output.
    Pick(PickerValue),
    /// Select choice by stringified option value; `""` is the placeholder.
    Choose(String),
}

/// What [`apply_event`] did with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The value was written to the form state.
    Committed(Value),
    /// Numeric text kept on screen only; nothing written.
    Drafted,
    /// The keystroke may proceed.
    KeyAllowed,
    /// The keystroke should be suppressed.
    KeyBlocked,
    /// The event does not apply to this field in its current state.
    Ignored,
}

/// Renders one field in editable or read-only mode.
#[must_use]
pub fn render_field(ctx: &FieldContext<'_>) -> FieldNode {
    let field = ctx.field;
    let editable = ctx.editable && field.field_type != FieldType::Computed;
    let control = if editable {
        editable_control(ctx)
    } else {
        Control::ReadOnly {
            text: read_only_text(field.field_type, &ctx.value, ctx.options, ctx.config),
            multiline: field.field_type == FieldType::Textarea,
        }
    };
    FieldNode {
        path: ctx.path.clone(),
        label: field.label.clone(),
        field_type: field.field_type,
        required: field.required,
        control,
        error: ctx.error.clone(),
    }
}

/// Read-only text of a stored value. Shared by both orchestrators so a
/// column renders identically in a form and in a notebook.
#[must_use]
pub fn read_only_text(
    field_type: FieldType,
    value: &Value,
    options: &[SelectOption],
    config: &EngineConfig,
) -> String {
    let locale = config.number_locale();
    match field_type {
        FieldType::Text | FieldType::Textarea | FieldType::Email => display_text(value),
        FieldType::Select => option_label(options, value),
        FieldType::Date | FieldType::Datetime => {
            date::format_display(value, &config.date.display_format)
        }
        FieldType::Number => locale.format_value(value),
        FieldType::Checkbox => {
            if is_truthy(value) {
                config.labels.yes.clone()
            } else {
                config.labels.no.clone()
            }
        }
        FieldType::Computed => locale.display_value(value),
    }
}

fn editable_control(ctx: &FieldContext<'_>) -> Control {
    let field = ctx.field;
    match field.field_type {
        FieldType::Text => Control::TextInput {
            text: display_text(&ctx.value),
            kind: InputKind::Text,
        },
        FieldType::Email => Control::TextInput {
            text: display_text(&ctx.value),
            kind: InputKind::Email,
        },
        FieldType::Textarea => Control::TextArea {
            text: display_text(&ctx.value),
        },
        FieldType::Number => {
            let locale = ctx.config.number_locale();
            let text = match ctx.draft {
                Some(cell) => cell.display(&locale),
                None => locale.format_value(&ctx.value),
            };
            Control::TextInput {
                text,
                kind: InputKind::Numeric,
            }
        }
        FieldType::Select => {
            let key = option_key(&ctx.value);
            let choices: Vec<ChoiceNode> = ctx
                .options
                .iter()
                .map(|option| ChoiceNode {
                    key: option.key(),
                    label: option.display_label(),
                    disabled: option.disabled,
                })
                .collect();
            let selected = choices
                .iter()
                .find(|choice| choice.key == key)
                .map(|choice| choice.key.clone());
            let placeholder = match ctx.placement {
                Placement::Form => ctx.config.select_placeholder(&field.label),
                Placement::NotebookCell => ctx.config.labels.cell_select_placeholder.clone(),
            };
            Control::Select {
                placeholder,
                choices,
                selected,
            }
        }
        FieldType::Date | FieldType::Datetime => Control::DatePicker {
            placeholder: ctx.config.labels.date_placeholder.clone(),
            display: date::format_display(&ctx.value, &ctx.config.date.display_format),
            with_time: field.field_type == FieldType::Datetime,
        },
        FieldType::Checkbox => Control::Checkbox {
            checked: is_truthy(&ctx.value),
        },
        FieldType::Computed => Control::ReadOnly {
            text: ctx.config.number_locale().display_value(&ctx.value),
            multiline: false,
        },
    }
}

/// Declares the rules a field contributes at `path`: required (with the
/// configured message) and, for email fields, the address pattern. Read-only
/// and computed fields contribute none; any rule left from an earlier
/// editable render is cleared.
pub fn register_rules<S: FormState + ?Sized>(
    state: &mut S,
    field: &FieldSchema,
    path: &FieldPath,
    editable: bool,
    config: &EngineConfig,
) {
    let mut rules = ValidationRules::default();
    if editable && field.field_type != FieldType::Computed {
        if field.field_type == FieldType::Email {
            rules = rules.merge(ValidationRules::email(config.labels.invalid_email.clone()));
        }
        if field.required {
            rules = rules.merge(ValidationRules::required(config.required_message(&field.label)));
        }
    }
    state.register_validation(path, rules);
}

/// Advisory keystroke filter for numeric inputs: digits, the locale's two
/// separators, editing/navigation keys, and Ctrl+A/C/V/X.
#[must_use]
pub fn allows_numeric_keystroke(event: &KeyEvent, locale: &NumberLocale) -> bool {
    match event.key {
        Key::Backspace
        | Key::Delete
        | Key::Tab
        | Key::Enter
        | Key::Left
        | Key::Right
        | Key::Home
        | Key::End => true,
        Key::Char(ch) if event.modifiers.ctrl => {
            matches!(ch.to_ascii_lowercase(), 'a' | 'c' | 'v' | 'x')
        }
        Key::Char(ch) => {
            ch.is_ascii_digit() || ch == locale.group_separator || ch == locale.decimal_separator
        }
        Key::Escape | Key::Up | Key::Down => false,
    }
}

/// Applies one edit to an editable field bound at `path`.
///
/// The caller has already checked editability. `cell` is the numeric edit
/// buffer for this field; it is only touched for `number` fields.
pub fn apply_event<S: FormState + ?Sized>(
    state: &mut S,
    field: &FieldSchema,
    path: &FieldPath,
    options: &[SelectOption],
    cell: &mut NumericCell,
    event: FieldEvent,
    config: &EngineConfig,
) -> EventOutcome {
    let outcome = match (field.field_type, event) {
        (FieldType::Number, FieldEvent::Input(raw)) => {
            match cell.input(&raw, &config.number_locale()) {
                Some(value) => commit(state, path, value),
                None => EventOutcome::Drafted,
            }
        }
        (FieldType::Number, FieldEvent::Blur) => {
            let value = cell.blur(&config.number_locale());
            commit(state, path, value)
        }
        (FieldType::Number, FieldEvent::Key(key)) => {
            if allows_numeric_keystroke(&key, &config.number_locale()) {
                EventOutcome::KeyAllowed
            } else {
                EventOutcome::KeyBlocked
            }
        }
        (FieldType::Text | FieldType::Textarea | FieldType::Email, FieldEvent::Input(text)) => {
            commit(state, path, Value::String(text))
        }
        (FieldType::Text | FieldType::Textarea | FieldType::Email, FieldEvent::Key(_)) => {
            EventOutcome::KeyAllowed
        }
        (FieldType::Select, FieldEvent::Choose(key)) if key.is_empty() => {
            commit(state, path, Value::String(String::new()))
        }
        (FieldType::Select, FieldEvent::Choose(key)) => {
            match options.iter().find(|option| option.key() == key && !option.disabled) {
                Some(option) => commit(state, path, option.value.clone()),
                None => EventOutcome::Ignored,
            }
        }
        (FieldType::Date | FieldType::Datetime, FieldEvent::Pick(picked)) => {
            commit(state, path, date::canonical_value(&picked))
        }
        (FieldType::Checkbox, FieldEvent::Toggle(checked)) => {
            commit(state, path, Value::Bool(checked))
        }
        (
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Select
            | FieldType::Date
            | FieldType::Datetime
            | FieldType::Number
            | FieldType::Checkbox
            | FieldType::Computed,
            _,
        ) => EventOutcome::Ignored,
    };
    if outcome == EventOutcome::Ignored {
        debug!(path = %path, field_type = field.field_type.tag(), "event ignored");
    }
    outcome
}

fn commit<S: FormState + ?Sized>(state: &mut S, path: &FieldPath, value: Value) -> EventOutcome {
    debug!(path = %path, value = %value, "field committed");
    state.set(path, value.clone());
    EventOutcome::Committed(value)
}
