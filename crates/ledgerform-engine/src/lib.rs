//! ledgerform-engine: metadata-driven form and table rendering.
//!
//! [`dynamic_form::DynamicForm`] renders one record's fields on a 12-unit
//! grid; [`notebook::Notebook`] renders a repeating-row table bound to an
//! array. Both share the per-type logic in [`field_renderer`] and read and
//! write values only through the injected
//! [`ledgerform_core::form_state::FormState`].

pub mod cli;
pub mod dynamic_form;
pub mod field_renderer;
pub mod node;
pub mod notebook;
pub mod numeric_cell;
pub mod paint;

pub use dynamic_form::DynamicForm;
pub use field_renderer::{EventOutcome, FieldEvent};
pub use node::{Control, FieldNode, FormNode, NotebookNode, RowKey};
pub use notebook::{Notebook, NotebookEvent, NotebookOutcome};

/// Crate identity label used for parity verification.
pub fn crate_label() -> &'static str {
    "ledgerform-engine"
}
