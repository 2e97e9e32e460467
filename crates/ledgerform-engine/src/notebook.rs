//! Repeating-row table editor bound to an array in the form state.
//!
//! Rows live at `state[name]`; each cell is rendered by the field renderer
//! at `name.index.column`. Row identity comes from a [`RowArena`] of
//! synthetic keys assigned on creation, so numeric edit buffers follow their
//! row when earlier rows are removed.

use std::collections::{BTreeMap, BTreeSet};

use ledgerform_core::config::EngineConfig;
use ledgerform_core::form_state::FormState;
use ledgerform_core::path::FieldPath;
use ledgerform_core::schema::{resolve_options, FieldSchema, FieldType, OptionsMap};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::field_renderer::{
    apply_event, register_rules, render_field, EventOutcome, FieldContext, FieldEvent, Placement,
};
use crate::node::{ColumnNode, NotebookNode, RowKey, RowNode};
use crate::numeric_cell::NumericCell;

/// Ordered row keys, parallel to the bound array.
#[derive(Debug, Clone, Default)]
pub struct RowArena {
    keys: Vec<RowKey>,
    next: u64,
}

impl RowArena {
    /// Assigns a fresh key to a new last row.
    pub fn push(&mut self) -> RowKey {
        let key = RowKey(self.next);
        self.next += 1;
        self.keys.push(key);
        key
    }

    /// Forgets the key at `index`; later keys move down.
    pub fn remove(&mut self, index: usize) -> Option<RowKey> {
        (index < self.keys.len()).then(|| self.keys.remove(index))
    }

    /// Matches the key list to an array length changed outside the engine.
    /// Surplus trailing keys are returned; missing ones are assigned.
    pub fn reconcile(&mut self, len: usize) -> Vec<RowKey> {
        if self.keys.len() > len {
            return self.keys.split_off(len);
        }
        while self.keys.len() < len {
            self.push();
        }
        Vec::new()
    }

    #[must_use]
    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<RowKey> {
        self.keys.get(index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A row-level or cell-level edit.
#[derive(Debug, Clone, PartialEq)]
pub enum NotebookEvent {
    AddRow,
    RemoveRow(usize),
    Cell {
        row: usize,
        column: String,
        event: FieldEvent,
    },
}

/// What [`Notebook::handle`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum NotebookOutcome {
    RowAdded(RowKey),
    RowRemoved(RowKey),
    Cell(EventOutcome),
    /// Read-only notebook, unknown row or unknown column.
    Rejected,
}

/// Table editor for one array-valued field.
#[derive(Debug, Clone)]
pub struct Notebook {
    name: String,
    columns: Vec<FieldSchema>,
    options_map: Option<OptionsMap>,
    config: EngineConfig,
    arena: RowArena,
    drafts: BTreeMap<(RowKey, String), NumericCell>,
}

impl Notebook {
    #[must_use]
    pub fn new(name: &str, columns: Vec<FieldSchema>) -> Self {
        Self {
            name: name.to_owned(),
            columns,
            options_map: None,
            config: EngineConfig::default(),
            arena: RowArena::default(),
            drafts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_options_map(mut self, options_map: OptionsMap) -> Self {
        self.options_map = Some(options_map);
        self
    }

    pub fn set_options_map(&mut self, options_map: Option<OptionsMap>) {
        self.options_map = options_map;
    }

    /// Replaces the column schema. Uncommitted numeric input is discarded.
    pub fn set_columns(&mut self, columns: Vec<FieldSchema>) {
        self.columns = columns;
        self.drafts.clear();
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[FieldSchema] {
        &self.columns
    }

    #[must_use]
    pub fn row_keys(&self) -> &[RowKey] {
        self.arena.keys()
    }

    /// Values of a freshly added row: `0` for numbers, `null` for dates, the
    /// first option for selects, `""` otherwise.
    #[must_use]
    pub fn default_row(&self) -> Value {
        let mut row = Map::new();
        for column in self.columns.iter().filter(|column| !column.hidden) {
            let value = match column.field_type {
                FieldType::Number => Value::from(0),
                FieldType::Date | FieldType::Datetime => Value::Null,
                FieldType::Select => resolve_options(column, self.options_map.as_ref())
                    .first()
                    .map_or_else(|| Value::String(String::new()), |option| option.value.clone()),
                FieldType::Text
                | FieldType::Textarea
                | FieldType::Email
                | FieldType::Checkbox
                | FieldType::Computed => Value::String(String::new()),
            };
            row.insert(column.name.clone(), value);
        }
        Value::Object(row)
    }

    /// Appends one default row and returns its key.
    pub fn add_row<S: FormState + ?Sized>(&mut self, state: &mut S) -> RowKey {
        self.sync_rows(state);
        state.append(&self.array_path(), self.default_row());
        let key = self.arena.push();
        debug!(notebook = %self.name, key = key.0, rows = self.arena.len(), "row added");
        key
    }

    /// Removes the row at `index`; later rows shift down and keep their keys.
    pub fn remove_row<S: FormState + ?Sized>(&mut self, state: &mut S, index: usize) -> Option<RowKey> {
        self.sync_rows(state);
        if index >= self.arena.len() {
            warn!(notebook = %self.name, index, "remove of missing row ignored");
            return None;
        }
        state.remove(&self.array_path(), index);
        let key = self.arena.remove(index)?;
        self.drafts.retain(|(row, _), _| *row != key);
        debug!(notebook = %self.name, key = key.0, index, "row removed");
        Some(key)
    }

    /// Renders every row. Add/remove labels are present only when editable.
    pub fn render<S: FormState + ?Sized>(&mut self, state: &mut S, editable: bool) -> NotebookNode {
        let array = self.array_path();
        let _ = state.watch(&array);
        self.sync_rows(state);

        let locale = self.config.number_locale();
        let keys = self.arena.keys().to_vec();
        let mut live_drafts = BTreeSet::new();
        let mut rows = Vec::with_capacity(keys.len());
        for (index, key) in keys.into_iter().enumerate() {
            let mut cells = Vec::new();
            for column in self.columns.iter().filter(|column| !column.hidden) {
                let path = FieldPath::cell(&self.name, index, &column.name);
                let cell_editable = editable && !column.disabled;
                register_rules(state, column, &path, cell_editable, &self.config);
                let value = state.watch(&path);
                let error = state.error(&path);

                let draft_key = (key, column.name.clone());
                if cell_editable && column.field_type == FieldType::Number {
                    self.drafts
                        .entry(draft_key.clone())
                        .or_default()
                        .reconcile(&value, &locale);
                    live_drafts.insert(draft_key.clone());
                }

                let ctx = FieldContext {
                    field: column,
                    path,
                    value,
                    draft: self.drafts.get(&draft_key),
                    editable: cell_editable,
                    options: resolve_options(column, self.options_map.as_ref()),
                    error,
                    placement: Placement::NotebookCell,
                    config: &self.config,
                };
                cells.push(render_field(&ctx));
            }
            rows.push(RowNode { key, index, cells });
        }
        self.drafts.retain(|draft_key, _| live_drafts.contains(draft_key));

        let labels = &self.config.labels;
        NotebookNode {
            title: labels.notebook_title.clone(),
            columns: self
                .columns
                .iter()
                .filter(|column| !column.hidden)
                .map(|column| ColumnNode {
                    name: column.name.clone(),
                    label: column.label.clone(),
                    field_type: column.field_type,
                })
                .collect(),
            rows,
            add_label: editable.then(|| labels.add_row.clone()),
            remove_label: editable.then(|| labels.remove_row.clone()),
        }
    }

    /// Applies a row or cell edit. Every event is rejected when the notebook
    /// is not editable.
    pub fn handle<S: FormState + ?Sized>(
        &mut self,
        state: &mut S,
        editable: bool,
        event: NotebookEvent,
    ) -> NotebookOutcome {
        if !editable {
            debug!(notebook = %self.name, "event rejected: notebook is read-only");
            return NotebookOutcome::Rejected;
        }
        match event {
            NotebookEvent::AddRow => NotebookOutcome::RowAdded(self.add_row(state)),
            NotebookEvent::RemoveRow(index) => match self.remove_row(state, index) {
                Some(key) => NotebookOutcome::RowRemoved(key),
                None => NotebookOutcome::Rejected,
            },
            NotebookEvent::Cell { row, column, event } => self.handle_cell(state, row, &column, event),
        }
    }

    fn handle_cell<S: FormState + ?Sized>(
        &mut self,
        state: &mut S,
        row: usize,
        column: &str,
        event: FieldEvent,
    ) -> NotebookOutcome {
        self.sync_rows(state);
        let Some(key) = self.arena.key_at(row) else {
            return NotebookOutcome::Rejected;
        };
        let Some(field) = self
            .columns
            .iter()
            .find(|field| field.name == column && !field.hidden)
        else {
            return NotebookOutcome::Rejected;
        };
        if field.disabled || field.field_type == FieldType::Computed {
            return NotebookOutcome::Cell(EventOutcome::Ignored);
        }

        let path = FieldPath::cell(&self.name, row, &field.name);
        let cell = self.drafts.entry((key, field.name.clone())).or_default();
        cell.reconcile(&state.get(&path), &self.config.number_locale());
        NotebookOutcome::Cell(apply_event(
            state,
            field,
            &path,
            resolve_options(field, self.options_map.as_ref()),
            cell,
            event,
            &self.config,
        ))
    }

    fn array_path(&self) -> FieldPath {
        FieldPath::field(&self.name)
    }

    fn sync_rows<S: FormState + ?Sized>(&mut self, state: &S) {
        let len = state.len(&self.array_path());
        if len == self.arena.len() {
            return;
        }
        let dropped = self.arena.reconcile(len);
        if !dropped.is_empty() {
            self.drafts.retain(|(row, _), _| !dropped.contains(row));
        }
        debug!(notebook = %self.name, rows = len, "row keys reconciled with bound array");
    }
}
