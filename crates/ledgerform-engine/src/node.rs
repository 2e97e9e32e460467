//! Rendered node tree handed to the host UI.
//!
//! Nodes are plain data: the host maps each [`Control`] onto its own widget
//! and routes user edits back as [`crate::field_renderer::FieldEvent`]s.

use ledgerform_core::path::FieldPath;
use ledgerform_core::schema::{FieldType, WidthSpan};

/// Kind of single-line input an editable text control needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Numeric,
}

/// One entry of an editable select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceNode {
    /// Stringified option value; send it back with `FieldEvent::Choose`.
    pub key: String,
    pub label: String,
    pub disabled: bool,
}

/// Presentation of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    TextInput {
        text: String,
        kind: InputKind,
    },
    TextArea {
        text: String,
    },
    Select {
        placeholder: String,
        choices: Vec<ChoiceNode>,
        /// Key of the matching choice, if the stored value matches one.
        selected: Option<String>,
    },
    DatePicker {
        placeholder: String,
        /// Formatted stored date, empty when unset.
        display: String,
        with_time: bool,
    },
    Checkbox {
        checked: bool,
    },
    /// Inert box. Single-line boxes never wrap and are cut with an ellipsis
    /// by the painter; `multiline` boxes keep line breaks.
    ReadOnly {
        text: String,
        multiline: bool,
    },
}

impl Control {
    /// The text a user sees in the control, for parity checks and painting.
    #[must_use]
    pub fn visible_text(&self) -> String {
        match self {
            Self::TextInput { text, .. }
            | Self::TextArea { text }
            | Self::ReadOnly { text, .. } => text.clone(),
            Self::Select {
                choices, selected, ..
            } => selected
                .as_ref()
                .and_then(|key| choices.iter().find(|choice| &choice.key == key))
                .map(|choice| choice.label.clone())
                .unwrap_or_default(),
            Self::DatePicker { display, .. } => display.clone(),
            Self::Checkbox { .. } => String::new(),
        }
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly { .. })
    }
}

/// One rendered field or notebook cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    pub path: FieldPath,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub control: Control,
    /// Error reported by the form state, shown beneath the control.
    pub error: Option<String>,
}

impl FieldNode {
    #[must_use]
    pub fn editable(&self) -> bool {
        !self.control.is_read_only()
    }
}

/// A field placed on the 12-unit layout grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub span: WidthSpan,
    pub field: FieldNode,
}

/// Rendered Dynamic Form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormNode {
    /// Inline warning for a malformed field list.
    pub warning: Option<String>,
    pub cells: Vec<GridCell>,
}

impl FormNode {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.cells
            .iter()
            .map(|cell| &cell.field)
            .find(|field| field.path.as_str() == name)
    }

    /// Groups cells into grid lines, wrapping when a cell would overflow the
    /// 12 units of the current line.
    #[must_use]
    pub fn grid_lines(&self) -> Vec<Vec<&GridCell>> {
        let mut lines: Vec<Vec<&GridCell>> = Vec::new();
        let mut used = 0u8;
        for cell in &self.cells {
            let units = cell.span.units();
            match lines.last_mut() {
                Some(line) if used + units <= WidthSpan::GRID_UNITS => {
                    line.push(cell);
                    used += units;
                }
                _ => {
                    lines.push(vec![cell]);
                    used = units;
                }
            }
        }
        lines
    }
}

/// Stable synthetic identity of a notebook row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(pub u64);

/// Header entry of a notebook column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNode {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
}

/// One rendered notebook row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowNode {
    pub key: RowKey,
    pub index: usize,
    pub cells: Vec<FieldNode>,
}

/// Rendered Notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookNode {
    pub title: String,
    pub columns: Vec<ColumnNode>,
    pub rows: Vec<RowNode>,
    /// Add-row button label; `None` when the notebook is read-only.
    pub add_label: Option<String>,
    /// Per-row remove button label; `None` when the notebook is read-only.
    pub remove_label: Option<String>,
}

impl NotebookNode {
    #[must_use]
    pub fn editable(&self) -> bool {
        self.add_label.is_some()
    }

    #[must_use]
    pub fn cell(&self, index: usize, column: &str) -> Option<&FieldNode> {
        let row = self.rows.get(index)?;
        let position = self.columns.iter().position(|col| col.name == column)?;
        row.cells.get(position)
    }
}
