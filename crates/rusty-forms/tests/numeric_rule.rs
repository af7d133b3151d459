/// isNumeric behaviour observed through a real form and field
use rstest::rstest;
use rusty_forms::{FieldProps, Form, FormConfig};
use serde_json::{json, Value};
use std::rc::Rc;

fn numeric_field(value: Value) -> bool {
    let form = Rc::new(Form::new(FormConfig::default()));
    let field = form
        .field(FieldProps::new("foo").value(value).validations("isNumeric"))
        .unwrap();
    assert_eq!(form.is_form_valid(), field.is_valid());
    field.is_valid()
}

#[test]
fn test_pass_with_default_value() {
    let form = Rc::new(Form::new(FormConfig::default()));
    let field = form
        .field(FieldProps::new("foo").validations("isNumeric"))
        .unwrap();
    assert!(field.is_valid());
}

#[rstest]
#[case::empty_string(json!(""), true)]
#[case::plain_text(json!("foo"), false)]
#[case::signed_number_text(json!("+42"), true)]
#[case::text_with_number(json!("42 is an answer"), false)]
#[case::integer(json!(42), true)]
#[case::float(json!(std::f64::consts::PI), true)]
#[case::science_notation_text(json!("-1e3"), false)]
#[case::null(Value::Null, true)]
#[case::zero(json!(0), true)]
fn test_is_numeric(#[case] value: Value, #[case] expected: bool) {
    assert_eq!(numeric_field(value), expected);
}

#[test]
fn test_revalidates_when_value_changes() {
    let form = Rc::new(Form::new(FormConfig::default()));
    let field = form
        .field(FieldProps::new("foo").value("12").validations("isNumeric"))
        .unwrap();
    assert!(field.is_valid());

    field.set_value("twelve").unwrap();
    assert!(!field.is_valid());
    assert!(!form.is_form_valid());

    field.set_value(12).unwrap();
    assert!(field.is_valid());
    assert!(form.is_form_valid());
}
