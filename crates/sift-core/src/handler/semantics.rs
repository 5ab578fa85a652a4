//! Module: handler::semantics
//! Responsibility: value comparison semantics used by the default handlers.
//! Does not own: operation dispatch or operand validation.
//! Boundary: handlers delegate every compare decision here.

use crate::value::Value;
use std::cmp::Ordering;

///
/// TextOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

/// Equality with numeric widening.
///
/// `null` equals only `null`; any other pairing with `null` is a valid
/// comparison that yields `false`. Values of unrelated kinds do not compare.
#[must_use]
pub(crate) fn compare_eq(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(true),
        (Value::Null, _) | (_, Value::Null) => Some(false),
        _ if left.is_numeric() && right.is_numeric() => {
            left.cmp_numeric(right).map(Ordering::is_eq)
        }
        _ if std::mem::discriminant(left) == std::mem::discriminant(right) => Some(left == right),
        _ => None,
    }
}

/// Ordering for text, bool and numeric values; `None` otherwise.
#[must_use]
pub(crate) fn compare_order(left: &Value, right: &Value) -> Option<Ordering> {
    left.cmp_ordered(right)
}

/// Case-sensitive text matching.
#[must_use]
pub(crate) fn compare_text(left: &Value, right: &Value, op: TextOp) -> Option<bool> {
    match op {
        TextOp::Contains => left.text_contains(right),
        TextOp::StartsWith => left.text_starts_with(right),
        TextOp::EndsWith => left.text_ends_with(right),
    }
}

/// Membership of `actual` in a list literal.
///
/// An empty list holds nothing, so it yields `Some(false)`. `None` when
/// no element of a non-empty list was comparable with `actual`.
#[must_use]
pub(crate) fn in_list(actual: &Value, list: &Value) -> Option<bool> {
    let Value::List(items) = list else {
        return None;
    };
    if items.is_empty() {
        return Some(false);
    }

    let mut saw_valid = false;
    for item in items {
        match compare_eq(actual, item) {
            Some(true) => return Some(true),
            Some(false) => saw_valid = true,
            None => {}
        }
    }

    saw_valid.then_some(false)
}
