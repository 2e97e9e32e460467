//! Single-record form orchestrator.
//!
//! Lays the visible fields of a schema onto the 12-unit grid, binds each to
//! its top-level path in the form state, and routes edits back through the
//! field renderer.

use std::collections::{BTreeMap, BTreeSet};

use ledgerform_core::config::EngineConfig;
use ledgerform_core::form_state::FormState;
use ledgerform_core::path::FieldPath;
use ledgerform_core::schema::{resolve_options, FieldSchema, FieldType, FieldsInput, OptionsMap};
use tracing::{debug, warn};

use crate::field_renderer::{
    apply_event, register_rules, render_field, EventOutcome, FieldContext, FieldEvent, Placement,
};
use crate::node::{FormNode, GridCell};
use crate::numeric_cell::NumericCell;

/// Renders one record's fields and applies edits to them.
///
/// The form keeps only numeric edit buffers between renders; every value
/// lives in the injected form state.
#[derive(Debug, Clone, Default)]
pub struct DynamicForm {
    config: EngineConfig,
    drafts: BTreeMap<String, NumericCell>,
}

impl DynamicForm {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            drafts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Renders the form. Never fails: a malformed field list yields one
    /// warning and no fields.
    pub fn render<S: FormState + ?Sized>(
        &mut self,
        fields: &FieldsInput,
        state: &mut S,
        options_map: Option<&OptionsMap>,
        disabled: bool,
    ) -> FormNode {
        if let FieldsInput::Malformed { found } = fields {
            warn!(found, "form fields are not a list; rendering warning only");
            self.drafts.clear();
            return FormNode {
                warning: Some(self.config.labels.malformed_fields.clone()),
                cells: Vec::new(),
            };
        }

        let locale = self.config.number_locale();
        let mut numeric_fields = BTreeSet::new();
        let mut cells = Vec::new();
        for field in fields.visible() {
            let path = FieldPath::field(&field.name);
            let editable = is_editable(field, disabled);
            register_rules(state, field, &path, editable, &self.config);
            let value = state.watch(&path);
            let error = state.error(&path);

            if editable && field.field_type == FieldType::Number {
                numeric_fields.insert(field.name.clone());
                self.drafts
                    .entry(field.name.clone())
                    .or_default()
                    .reconcile(&value, &locale);
            }

            let ctx = FieldContext {
                field,
                path,
                value,
                draft: self.drafts.get(&field.name),
                editable,
                options: resolve_options(field, options_map),
                error,
                placement: Placement::Form,
                config: &self.config,
            };
            cells.push(GridCell {
                span: field.width,
                field: render_field(&ctx),
            });
        }
        self.drafts.retain(|name, _| numeric_fields.contains(name));

        FormNode {
            warning: None,
            cells,
        }
    }

    /// Applies one edit to the field called `name`. Hidden, unknown,
    /// read-only and computed fields ignore every event.
    pub fn handle<S: FormState + ?Sized>(
        &mut self,
        fields: &FieldsInput,
        state: &mut S,
        options_map: Option<&OptionsMap>,
        disabled: bool,
        name: &str,
        event: FieldEvent,
    ) -> EventOutcome {
        let Some(field) = fields.visible().find(|field| field.name == name) else {
            debug!(name, "event for unknown or hidden field ignored");
            return EventOutcome::Ignored;
        };
        if !is_editable(field, disabled) || field.field_type == FieldType::Computed {
            debug!(name, "event for read-only field ignored");
            return EventOutcome::Ignored;
        }

        let path = FieldPath::field(&field.name);
        let cell = self.drafts.entry(field.name.clone()).or_default();
        cell.reconcile(&state.get(&path), &self.config.number_locale());
        apply_event(
            state,
            field,
            &path,
            resolve_options(field, options_map),
            cell,
            event,
            &self.config,
        )
    }
}

fn is_editable(field: &FieldSchema, disabled: bool) -> bool {
    !(disabled || field.disabled)
}
