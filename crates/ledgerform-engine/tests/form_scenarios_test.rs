use chrono::NaiveDate;
use ledgerform_core::date::PickerValue;
use ledgerform_core::form_state::{FormState, MemoryFormState};
use ledgerform_core::path::FieldPath;
use ledgerform_core::schema::{FieldSchema, FieldType, FieldsInput};
use ledgerform_engine::node::Control;
use ledgerform_engine::{DynamicForm, EventOutcome, FieldEvent, FormNode};
use proptest::prelude::*;
use serde_json::{json, Value};

fn visible_text(node: &FormNode, name: &str) -> String {
    match node.field(name) {
        Some(field) => field.control.visible_text(),
        None => panic!("field {name} not rendered"),
    }
}

fn amount_schema() -> FieldsInput {
    FieldsInput::from_json(&json!([{ "name": "amount", "label": "Amount", "type": "number" }]))
}

#[test]
fn typed_amount_commits_number_and_formats_on_blur() {
    let fields = amount_schema();
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::new();
    let _ = form.render(&fields, &mut state, None, false);

    let outcome = form.handle(
        &fields,
        &mut state,
        None,
        false,
        "amount",
        FieldEvent::Input("1234567,5".into()),
    );
    assert_eq!(outcome, EventOutcome::Committed(json!(1234567.5)));
    assert_eq!(state.get(&FieldPath::field("amount")), json!(1234567.5));

    let node = form.render(&fields, &mut state, None, false);
    assert_eq!(visible_text(&node, "amount"), "1234567,5");

    let outcome = form.handle(&fields, &mut state, None, false, "amount", FieldEvent::Blur);
    assert_eq!(outcome, EventOutcome::Committed(json!(1234567.5)));
    let node = form.render(&fields, &mut state, None, false);
    assert_eq!(visible_text(&node, "amount"), "1.234.567,5");

    let read_only = form.render(&fields, &mut state, None, true);
    assert_eq!(visible_text(&read_only, "amount"), "1.234.567,5");
}

#[test]
fn unparseable_amount_keeps_echo_until_blur() {
    let fields = amount_schema();
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::with_values(json!({ "amount": 10 }));
    let outcome = form.handle(
        &fields,
        &mut state,
        None,
        false,
        "amount",
        FieldEvent::Input("10a".into()),
    );
    assert_eq!(outcome, EventOutcome::Drafted);
    assert_eq!(state.get(&FieldPath::field("amount")), json!(10));
    let node = form.render(&fields, &mut state, None, false);
    assert_eq!(visible_text(&node, "amount"), "10a");

    let outcome = form.handle(&fields, &mut state, None, false, "amount", FieldEvent::Blur);
    assert_eq!(outcome, EventOutcome::Committed(json!("")));
    let node = form.render(&fields, &mut state, None, false);
    assert_eq!(visible_text(&node, "amount"), "");
}

#[test]
fn host_reset_replaces_numeric_echo() {
    let fields = amount_schema();
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::new();
    let _ = form.handle(
        &fields,
        &mut state,
        None,
        false,
        "amount",
        FieldEvent::Input("12,".into()),
    );
    state.set(&FieldPath::field("amount"), json!(99));
    let node = form.render(&fields, &mut state, None, false);
    assert_eq!(visible_text(&node, "amount"), "99");
}

#[test]
fn picked_date_is_stored_as_utc_midnight_and_shown_day_first() {
    let fields = FieldsInput::from_json(&json!([{ "name": "due", "label": "Due", "type": "date" }]));
    let Some(day) = NaiveDate::from_ymd_opt(2024, 3, 5) else {
        panic!("bad date");
    };
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::new();

    let outcome = form.handle(&fields, &mut state, None, false, "due", FieldEvent::Pick(PickerValue::Date(day)));
    assert_eq!(outcome, EventOutcome::Committed(json!("2024-03-05T00:00:00.000Z")));
    assert_eq!(state.get(&FieldPath::field("due")), json!("2024-03-05T00:00:00.000Z"));

    let read_only = form.render(&fields, &mut state, None, true);
    assert_eq!(visible_text(&read_only, "due"), "05/03/2024");
    let editable = form.render(&fields, &mut state, None, false);
    assert_eq!(visible_text(&editable, "due"), "05/03/2024");

    let outcome = form.handle(
        &fields,
        &mut state,
        None,
        false,
        "due",
        FieldEvent::Pick(PickerValue::Text("2024-03-05T00:00:00.000Z".into())),
    );
    assert_eq!(outcome, EventOutcome::Committed(json!("2024-03-05T00:00:00.000Z")));

    let _ = form.handle(&fields, &mut state, None, false, "due", FieldEvent::Pick(PickerValue::Empty));
    assert_eq!(state.get(&FieldPath::field("due")), Value::Null);
}

#[test]
fn malformed_field_list_renders_warning_only() {
    for junk in [json!({ "fields": [] }), json!(null), json!("amount"), json!(12)] {
        let fields = FieldsInput::from_json(&junk);
        let mut form = DynamicForm::default();
        let mut state = MemoryFormState::new();
        let node = form.render(&fields, &mut state, None, false);
        assert_eq!(node.warning.as_deref(), Some("⚠️ Metadata form.fields không hợp lệ"));
        assert!(node.cells.is_empty());
        let outcome = form.handle(&fields, &mut state, None, false, "amount", FieldEvent::Blur);
        assert_eq!(outcome, EventOutcome::Ignored);
    }
}

#[test]
fn unreadable_entries_are_skipped_not_fatal() {
    let fields = FieldsInput::from_json(&json!([
        42,
        { "label": "No name" },
        { "name": "tags", "label": "Tags", "type": "tags", "width": 7 },
        { "name": "qty", "label": "Qty", "type": "compute", "width": "4" }
    ]));
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::with_values(json!({ "tags": ["vip", "retail"], "qty": 3 }));
    let node = form.render(&fields, &mut state, None, false);
    assert_eq!(node.cells.len(), 2);
    assert_eq!(visible_text(&node, "tags"), "vip, retail");
    assert_eq!(node.field("qty").map(|f| f.field_type), Some(FieldType::Computed));
    assert!(node.field("qty").is_some_and(|f| !f.editable()));
}

#[test]
fn email_field_surfaces_pattern_error() {
    let fields = FieldsInput::from(vec![FieldSchema::new("email", "Email", FieldType::Email)]);
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::new();
    let _ = form.render(&fields, &mut state, None, false);
    let _ = form.handle(&fields, &mut state, None, false, "email", FieldEvent::Input("ke.toan@".into()));
    assert!(!state.validate());
    let node = form.render(&fields, &mut state, None, false);
    assert_eq!(node.field("email").and_then(|f| f.error.clone()).as_deref(), Some("Email không hợp lệ"));

    let _ = form.handle(
        &fields,
        &mut state,
        None,
        false,
        "email",
        FieldEvent::Input("ke.toan@congty.vn".into()),
    );
    let node = form.render(&fields, &mut state, None, true);
    assert_eq!(node.field("email").and_then(|f| f.error.clone()), None);
    assert_eq!(visible_text(&node, "email"), "ke.toan@congty.vn");
}

#[test]
fn read_only_fields_still_show_external_errors() {
    let fields = FieldsInput::from(vec![FieldSchema::new("code", "Mã", FieldType::Text).disabled()]);
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::new();
    state.set_error(&FieldPath::field("code"), "Mã đã tồn tại");
    let node = form.render(&fields, &mut state, None, false);
    let Some(code) = node.field("code") else {
        panic!("code not rendered");
    };
    assert!(matches!(code.control, Control::ReadOnly { .. }));
    assert_eq!(code.error.as_deref(), Some("Mã đã tồn tại"));
}

#[test]
fn checkbox_toggle_and_read_only_label() {
    let fields = FieldsInput::from(vec![FieldSchema::new("active", "Hoạt động", FieldType::Checkbox)]);
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::new();
    let outcome = form.handle(&fields, &mut state, None, false, "active", FieldEvent::Toggle(true));
    assert_eq!(outcome, EventOutcome::Committed(json!(true)));
    let editable = form.render(&fields, &mut state, None, false);
    assert_eq!(
        editable.field("active").map(|f| f.control.clone()),
        Some(Control::Checkbox { checked: true })
    );
    let read_only = form.render(&fields, &mut state, None, true);
    assert_eq!(visible_text(&read_only, "active"), "Có");
}

fn flagged_fields(flags: &[(bool, bool, bool)]) -> FieldsInput {
    let fields = flags
        .iter()
        .enumerate()
        .map(|(idx, (hidden, disabled, required))| {
            let mut field = FieldSchema::new(&format!("f{idx}"), &format!("F{idx}"), FieldType::Text);
            field.hidden = *hidden;
            field.disabled = *disabled;
            field.required = *required;
            field
        })
        .collect::<Vec<_>>();
    FieldsInput::from(fields)
}

proptest! {
    #[test]
    fn hidden_fields_never_render(
        flags in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 0..12),
        disabled in any::<bool>(),
    ) {
        let fields = flagged_fields(&flags);
        let mut form = DynamicForm::default();
        let mut state = MemoryFormState::new();
        let node = form.render(&fields, &mut state, None, disabled);
        let expected: Vec<String> = flags
            .iter()
            .enumerate()
            .filter(|(_, (hidden, _, _))| !hidden)
            .map(|(idx, _)| format!("f{idx}"))
            .collect();
        let rendered: Vec<String> = node.cells.iter().map(|cell| cell.field.path.to_string()).collect();
        prop_assert_eq!(rendered, expected);
    }

    #[test]
    fn number_read_only_matches_editable_after_blur(
        whole in 0u64..10_000_000_000,
        thousandths in 0u32..1000,
    ) {
        let fields = amount_schema();
        let raw = format!("{whole},{thousandths:03}");
        let mut form = DynamicForm::default();
        let mut state = MemoryFormState::new();
        let _ = form.handle(&fields, &mut state, None, false, "amount", FieldEvent::Input(raw));
        let _ = form.handle(&fields, &mut state, None, false, "amount", FieldEvent::Blur);
        let editable = form.render(&fields, &mut state, None, false);
        let read_only = form.render(&fields, &mut state, None, true);
        prop_assert_eq!(visible_text(&editable, "amount"), visible_text(&read_only, "amount"));
    }

    #[test]
    fn text_like_fields_show_the_same_value_in_both_modes(raw in "[a-zA-Z0-9 @.]{0,24}") {
        for field_type in [FieldType::Text, FieldType::Email, FieldType::Textarea] {
            let fields = FieldsInput::from(vec![FieldSchema::new("v", "V", field_type)]);
            let mut form = DynamicForm::default();
            let mut state = MemoryFormState::new();
            let _ = form.handle(&fields, &mut state, None, false, "v", FieldEvent::Input(raw.clone()));
            let editable = form.render(&fields, &mut state, None, false);
            let read_only = form.render(&fields, &mut state, None, true);
            prop_assert_eq!(visible_text(&editable, "v"), visible_text(&read_only, "v"));
        }
    }
}

#[test]
fn disabled_required_field_does_not_block_validation() {
    let fields = FieldsInput::from(vec![
        FieldSchema::new("contract_number", "Số hợp đồng", FieldType::Text)
            .required()
            .disabled(),
    ]);
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::new();
    let _ = form.render(&fields, &mut state, None, false);
    assert!(state.validate());
    assert_eq!(state.error(&FieldPath::field("contract_number")), None);
}

#[test]
fn switching_form_to_read_only_clears_its_rules() {
    let fields = FieldsInput::from(vec![FieldSchema::new("name", "Tên", FieldType::Text).required()]);
    let mut form = DynamicForm::default();
    let mut state = MemoryFormState::new();
    let _ = form.render(&fields, &mut state, None, false);
    assert!(state.rules(&FieldPath::field("name")).is_some());

    let _ = form.render(&fields, &mut state, None, true);
    assert!(state.rules(&FieldPath::field("name")).is_none());
    assert!(state.validate());
}
