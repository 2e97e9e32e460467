//! Paints rendered node trees onto adapter frames.
//!
//! Used for text snapshots and by the `ledgerform` binary. Form fields are
//! laid out on the 12-unit grid; notebooks become a fixed-width table.

use ledgerform_core::schema::{FieldType, WidthSpan};
use ledgerform_term_adapter::render::{FrameSize, Rect, RenderFrame, TextRole};
use ledgerform_term_adapter::style::ThemeSpec;
use ledgerform_term_adapter::widgets::{even_column_widths, TableColumnSpec, TextAlign};

use crate::node::{Control, FieldNode, FormNode, NotebookNode};

const GRID_UNITS: usize = WidthSpan::GRID_UNITS as usize;

/// Paints a form `width` cells wide; the height fits the content.
#[must_use]
pub fn paint_form(node: &FormNode, width: usize, theme: ThemeSpec) -> RenderFrame {
    let lines = node.grid_lines();
    let line_heights: Vec<usize> = lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|cell| field_height(&cell.field))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let warning_rows = usize::from(node.warning.is_some());
    let height = warning_rows
        + line_heights.iter().sum::<usize>()
        + line_heights.len().saturating_sub(1);

    let mut frame = RenderFrame::new(FrameSize { width, height }, theme);
    if let Some(warning) = &node.warning {
        frame.draw_text_truncated(frame.area(), 0, warning, TextRole::Warning);
    }

    let mut y = warning_rows;
    for (line, line_height) in lines.iter().zip(line_heights) {
        let band = Rect {
            x: 0,
            y,
            width,
            height: line_height,
        };
        let mut start = 0;
        for cell in line {
            let span = usize::from(cell.span.units());
            let slot = band.grid_slice(GRID_UNITS, start, span);
            start += span;
            let inner = Rect {
                width: slot.width.saturating_sub(1),
                ..slot
            };
            paint_field(&mut frame, inner, &cell.field);
        }
        y += line_height + 1;
    }
    frame
}

/// Paints a notebook as a table `width` cells wide.
#[must_use]
pub fn paint_notebook(node: &NotebookNode, width: usize, theme: ThemeSpec) -> RenderFrame {
    let error_rows: usize = node
        .rows
        .iter()
        .map(|row| row.cells.iter().filter(|cell| cell.error.is_some()).count())
        .sum();
    let button_rows = usize::from(node.add_label.is_some());
    let height = 3 + node.rows.len() + error_rows + button_rows;
    let mut frame = RenderFrame::new(FrameSize { width, height }, theme);

    let remove_button = node.remove_label.as_ref().map(|label| format!("[{label}]"));
    let action_width = remove_button
        .as_ref()
        .map_or(0, |button| button.chars().count() + 1);
    let table_width = width.saturating_sub(action_width);
    let specs = column_specs(node, table_width);

    frame.draw_text_truncated(frame.area(), 0, &node.title, TextRole::Accent);
    let mut x = 0;
    for spec in &specs {
        frame.draw_text(x, 1, &spec.fit(&spec.title), TextRole::Accent);
        x += usize::from(spec.width) + 1;
    }
    frame.draw_horizontal_rule(0, 2, width, TextRole::Muted);

    let mut y = 3;
    for row in &node.rows {
        let mut x = 0;
        for (spec, cell) in specs.iter().zip(&row.cells) {
            let (text, role) = control_line(&cell.control);
            frame.draw_text(x, y, &spec.fit(&text), role);
            x += usize::from(spec.width) + 1;
        }
        if let Some(button) = &remove_button {
            frame.draw_text(table_width, y, button, TextRole::Danger);
        }
        y += 1;
        for cell in row.cells.iter() {
            if let Some(error) = &cell.error {
                let message = format!("  {}: {error}", cell.label);
                frame.draw_text_truncated(line_rect(width, y), 0, &message, TextRole::Danger);
                y += 1;
            }
        }
    }

    if let Some(label) = &node.add_label {
        frame.draw_text(0, y, &format!("[{label}]"), TextRole::Accent);
    }
    frame
}

fn column_specs(node: &NotebookNode, table_width: usize) -> Vec<TableColumnSpec> {
    let widths = even_column_widths(table_width, node.columns.len());
    node.columns
        .iter()
        .zip(widths)
        .map(|(column, width)| TableColumnSpec {
            key: column.name.clone(),
            title: column.label.clone(),
            width: width.saturating_sub(1),
            align: match column.field_type {
                FieldType::Number | FieldType::Computed => TextAlign::Right,
                _ => TextAlign::Left,
            },
        })
        .collect()
}

fn field_height(field: &FieldNode) -> usize {
    1 + control_rows(&field.control) + usize::from(field.error.is_some())
}

fn control_rows(control: &Control) -> usize {
    match control {
        Control::TextArea { text } | Control::ReadOnly { text, multiline: true } => {
            text.lines().count().max(1)
        }
        _ => 1,
    }
}

fn paint_field(frame: &mut RenderFrame, rect: Rect, field: &FieldNode) {
    let label = if field.required && field.editable() {
        format!("{} *", field.label)
    } else {
        field.label.clone()
    };
    frame.draw_text_truncated(rect, 0, &label, TextRole::Primary);

    let mut row = 1;
    match &field.control {
        Control::TextArea { text } | Control::ReadOnly { text, multiline: true } => {
            let role = if field.editable() {
                TextRole::Primary
            } else {
                TextRole::Muted
            };
            for line in text.lines() {
                frame.draw_text_truncated(rect, row, line, role);
                row += 1;
            }
            row = row.max(2);
        }
        control => {
            let (text, role) = control_line(control);
            frame.draw_text_truncated(rect, row, &text, role);
            row += 1;
        }
    }
    if let Some(error) = &field.error {
        frame.draw_text_truncated(rect, row, error, TextRole::Danger);
    }
}

/// Single-line text and role for a control.
fn control_line(control: &Control) -> (String, TextRole) {
    match control {
        Control::TextInput { text, .. } | Control::TextArea { text } => {
            (text.clone(), TextRole::Primary)
        }
        Control::Select { placeholder, .. } => {
            let shown = control.visible_text();
            if shown.is_empty() {
                (placeholder.clone(), TextRole::Muted)
            } else {
                (shown, TextRole::Primary)
            }
        }
        Control::DatePicker {
            placeholder,
            display,
            ..
        } => {
            if display.is_empty() {
                (placeholder.clone(), TextRole::Muted)
            } else {
                (display.clone(), TextRole::Primary)
            }
        }
        Control::Checkbox { checked } => {
            let mark = if *checked { "[x]" } else { "[ ]" };
            (mark.to_owned(), TextRole::Primary)
        }
        Control::ReadOnly { text, .. } => (text.clone(), TextRole::Muted),
    }
}

fn line_rect(width: usize, y: usize) -> Rect {
    Rect {
        x: 0,
        y,
        width,
        height: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerform_core::path::FieldPath;
    use ledgerform_term_adapter::snapshot::assert_trimmed_snapshot;

    fn read_only(name: &str, label: &str, text: &str) -> FieldNode {
        FieldNode {
            path: FieldPath::field(name),
            label: label.into(),
            field_type: FieldType::Text,
            required: false,
            control: Control::ReadOnly {
                text: text.into(),
                multiline: false,
            },
            error: None,
        }
    }

    #[test]
    fn warning_only_form_is_one_row() {
        let node = FormNode {
            warning: Some("⚠️ Metadata form.fields không hợp lệ".into()),
            cells: Vec::new(),
        };
        let frame = paint_form(&node, 40, ThemeSpec::default());
        assert_eq!(frame.size().height, 1);
        assert!(frame.row_text(0).starts_with("⚠️ Metadata"));
    }

    #[test]
    fn long_read_only_value_is_cut_with_ellipsis() {
        let node = FormNode {
            warning: None,
            cells: vec![crate::node::GridCell {
                span: WidthSpan::Full,
                field: read_only("note", "Ghi chú", "một dòng rất dài không xuống hàng"),
            }],
        };
        let frame = paint_form(&node, 16, ThemeSpec::default());
        assert_trimmed_snapshot("read_only_ellipsis", &frame, "Ghi chú\nmột dòng rất d…");
    }
}
