use ledgerform_core::form_state::MemoryFormState;
use ledgerform_core::schema::{FieldSchema, FieldType, FieldsInput, SelectOption, WidthSpan};
use ledgerform_engine::paint::{paint_form, paint_notebook};
use ledgerform_engine::{DynamicForm, Notebook};
use ledgerform_term_adapter::snapshot::assert_trimmed_snapshot;
use ledgerform_term_adapter::style::ThemeSpec;
use serde_json::json;

fn ledger_columns() -> Vec<FieldSchema> {
    vec![
        FieldSchema::new("date", "Ngày", FieldType::Date),
        FieldSchema::new("amount", "Số tiền", FieldType::Number),
        FieldSchema::new("note", "Ghi chú", FieldType::Text),
    ]
}

#[test]
fn form_lays_fields_on_the_grid() {
    let fields = FieldsInput::from(vec![
        FieldSchema::new("name", "Tên", FieldType::Text)
            .required()
            .with_width(WidthSpan::Half),
        FieldSchema::new("amount", "Số tiền", FieldType::Number).with_width(WidthSpan::Half),
        FieldSchema::new("note", "Ghi chú", FieldType::Textarea),
        FieldSchema::new("status", "Trạng thái", FieldType::Select).with_options(vec![
            SelectOption::new("open", "Mở"),
            SelectOption::new("closed", "Đóng"),
        ]),
    ]);
    let mut state = MemoryFormState::with_values(json!({
        "amount": 1500000,
        "note": "dòng 1\ndòng 2"
    }));
    let mut form = DynamicForm::default();
    let _ = form.render(&fields, &mut state, None, false);
    assert!(!state.validate());
    let node = form.render(&fields, &mut state, None, false);

    let frame = paint_form(&node, 40, ThemeSpec::default());
    let expected = [
        format!("{:<20}{}", "Tên *", "Số tiền"),
        format!("{:<20}{}", "", "1.500.000"),
        "Tên là bắt buộc".to_owned(),
        String::new(),
        "Ghi chú".to_owned(),
        "dòng 1".to_owned(),
        "dòng 2".to_owned(),
        String::new(),
        "Trạng thái".to_owned(),
        "-- Chọn Trạng thái --".to_owned(),
    ]
    .join("\n");
    assert_trimmed_snapshot("form_grid", &frame, &expected);
}

#[test]
fn read_only_form_drops_required_marker() {
    let fields = FieldsInput::from(vec![
        FieldSchema::new("name", "Tên", FieldType::Text).required(),
        FieldSchema::new("active", "Hoạt động", FieldType::Checkbox),
    ]);
    let mut state = MemoryFormState::with_values(json!({ "name": "Công ty A", "active": false }));
    let mut form = DynamicForm::default();
    let node = form.render(&fields, &mut state, None, true);
    let frame = paint_form(&node, 30, ThemeSpec::default());
    assert_trimmed_snapshot(
        "read_only_form",
        &frame,
        "Tên\nCông ty A\n\nHoạt động\nKhông",
    );
}

#[test]
fn editable_notebook_table() {
    let mut notebook = Notebook::new("transactions", ledger_columns());
    let mut state = MemoryFormState::with_values(json!({
        "transactions": [{ "date": null, "amount": 1500000, "note": "" }]
    }));
    let node = notebook.render(&mut state, true);
    let frame = paint_notebook(&node, 52, ThemeSpec::default());
    let expected = [
        "Lịch sử giao dịch".to_owned(),
        format!("{:<16}{:>14} {}", "Ngày", "Số tiền", "Ghi chú"),
        "─".repeat(52),
        format!("{:<16}{:>14} {:<15}{}", "Chọn ngày...", "1.500.000", "", "[Xóa]"),
        "[+ Thêm dòng]".to_owned(),
    ]
    .join("\n");
    assert_trimmed_snapshot("notebook_editable", &frame, &expected);
}

#[test]
fn read_only_notebook_table_has_no_buttons() {
    let mut notebook = Notebook::new("transactions", ledger_columns());
    let mut state = MemoryFormState::with_values(json!({
        "transactions": [{ "date": "2024-03-05T00:00:00.000Z", "amount": 1500000, "note": "phí" }]
    }));
    let node = notebook.render(&mut state, false);
    let frame = paint_notebook(&node, 52, ThemeSpec::default());
    let expected = [
        "Lịch sử giao dịch".to_owned(),
        format!("{:<18}{:>16} {}", "Ngày", "Số tiền", "Ghi chú"),
        "─".repeat(52),
        format!("{:<18}{:>16} {}", "05/03/2024", "1.500.000", "phí"),
    ]
    .join("\n");
    assert_trimmed_snapshot("notebook_read_only", &frame, &expected);
}

#[test]
fn notebook_row_errors_follow_their_row() {
    let mut notebook = Notebook::new(
        "transactions",
        vec![FieldSchema::new("note", "Ghi chú", FieldType::Text).required()],
    );
    let mut state = MemoryFormState::new();
    let _ = notebook.add_row(&mut state);
    let _ = notebook.render(&mut state, true);
    assert!(!state.validate());
    let node = notebook.render(&mut state, true);
    let frame = paint_notebook(&node, 40, ThemeSpec::default());
    assert_eq!(frame.row_text(4).trim_end(), "  Ghi chú: Ghi chú là bắt buộc");
    assert_eq!(frame.row_text(5).trim_end(), "[+ Thêm dòng]");
}
