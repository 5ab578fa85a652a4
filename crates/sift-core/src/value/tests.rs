use crate::value::{LiteralError, ScalarKind, Value};
use serde_json::json;
use std::cmp::Ordering;

#[test]
fn numeric_comparison_widens_across_integer_variants() {
    assert_eq!(Value::Int(-1).cmp_numeric(&Value::Uint(0)), Some(Ordering::Less));
    assert_eq!(Value::Uint(7).cmp_numeric(&Value::Int(7)), Some(Ordering::Equal));
    assert_eq!(
        Value::Uint(u64::MAX).cmp_numeric(&Value::Int(i64::MAX)),
        Some(Ordering::Greater)
    );
}

#[test]
fn numeric_comparison_rejects_unsafe_float_widening() {
    assert_eq!(Value::Int(3).cmp_numeric(&Value::Float(2.5)), Some(Ordering::Greater));
    assert_eq!(Value::Uint(u64::MAX).cmp_numeric(&Value::Float(1.0)), None);
    assert_eq!(Value::Int(i64::MIN).cmp_numeric(&Value::Float(1.0)), None);
}

#[test]
fn ordered_comparison_stays_within_family() {
    assert_eq!(
        Value::from("a").cmp_ordered(&Value::from("b")),
        Some(Ordering::Less)
    );
    assert_eq!(Value::from("1").cmp_ordered(&Value::Int(1)), None);
    assert_eq!(Value::Null.cmp_ordered(&Value::Null), None);
}

#[test]
fn text_operations_are_case_sensitive() {
    let street = Value::from("Some Street");

    assert_eq!(street.text_contains(&Value::from("street")), Some(false));
    assert_eq!(street.text_contains(&Value::from("Street")), Some(true));
    assert_eq!(street.text_starts_with(&Value::from("Some")), Some(true));
    assert_eq!(street.text_ends_with(&Value::Int(1)), None);
    assert_eq!(Value::Null.text_contains(&Value::from("S")), None);
}

#[test]
fn literal_kind_matching_allows_representable_integers() {
    assert!(Value::Int(4).matches_scalar(ScalarKind::Float));
    assert!(Value::Int(4).matches_scalar(ScalarKind::Uint));
    assert!(!Value::Int(-4).matches_scalar(ScalarKind::Uint));
    assert!(!Value::Uint(u64::MAX).matches_scalar(ScalarKind::Int));
    assert!(!Value::Float(1.5).matches_scalar(ScalarKind::Int));
    assert!(!Value::Null.matches_scalar(ScalarKind::Text));
}

#[test]
fn json_literals_convert_by_number_shape() {
    let value = Value::try_from(&json!([1, 18_446_744_073_709_551_615_u64, 1.5, "x", null]))
        .expect("array literal should convert");

    assert_eq!(
        value,
        Value::List(vec![
            Value::Int(1),
            Value::Uint(u64::MAX),
            Value::Float(1.5),
            Value::from("x"),
            Value::Null,
        ])
    );
}

#[test]
fn json_objects_are_not_literals() {
    let err = Value::try_from(json!({ "eq": 1 })).expect_err("object must be rejected");

    assert_eq!(err, LiteralError::Object);
}
