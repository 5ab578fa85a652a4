use crate::{
    descriptor::FieldDescriptor,
    handler::{
        FilterContext, Fragment, HandlerError, OperationHandler,
        semantics::{TextOp, compare_eq, compare_order, compare_text, in_list},
    },
    model::FieldRef,
    operation::{Operation, OperationId},
    value::{ScalarKind, Value},
};
use std::{cmp::Ordering, sync::Arc};

/// Built-in handlers in their default table order.
///
/// Every negated operation is the complement of its positive form over any
/// present value, `null` included. Missing fields match neither form.
#[must_use]
pub fn default_handlers() -> Vec<Arc<dyn OperationHandler>> {
    vec![
        Arc::new(EqualityHandler),
        Arc::new(MembershipHandler),
        Arc::new(ComparisonHandler),
        Arc::new(TextHandler),
        Arc::new(PresenceHandler),
    ]
}

///
/// EqualityHandler
///
/// `eq` / `neq` on scalar fields and scalar-list elements.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct EqualityHandler;

impl OperationHandler for EqualityHandler {
    fn id(&self) -> &str {
        "equality"
    }

    fn can_handle(&self, field: &FieldDescriptor, operation: &Operation) -> bool {
        field.scalar().is_some()
            && matches!(
                operation.id,
                OperationId::EQUALS | OperationId::NOT_EQUALS
            )
    }

    fn handle(
        &self,
        _cx: &FilterContext<'_>,
        _field: &FieldDescriptor,
        operation: &Operation,
        value: &Value,
    ) -> Result<Fragment, HandlerError> {
        let expected = value.clone();

        match operation.id {
            OperationId::EQUALS => Ok(Fragment::on_value(move |actual| {
                compare_eq(actual, &expected).unwrap_or(false)
            })),
            OperationId::NOT_EQUALS => Ok(Fragment::on_value(move |actual| {
                !compare_eq(actual, &expected).unwrap_or(false)
            })),
            _ => Err(HandlerError::not_implemented(operation)),
        }
    }
}

///
/// MembershipHandler
///
/// `in` / `nin` against a list literal.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct MembershipHandler;

impl OperationHandler for MembershipHandler {
    fn id(&self) -> &str {
        "membership"
    }

    fn can_handle(&self, field: &FieldDescriptor, operation: &Operation) -> bool {
        field.scalar().is_some() && matches!(operation.id, OperationId::IN | OperationId::NOT_IN)
    }

    fn handle(
        &self,
        _cx: &FilterContext<'_>,
        _field: &FieldDescriptor,
        operation: &Operation,
        value: &Value,
    ) -> Result<Fragment, HandlerError> {
        if value.as_list().is_none() {
            return Err(HandlerError::new(format!(
                "operation '{operation}' expects a list operand, found {}",
                value.type_label()
            )));
        }
        let list = value.clone();

        match operation.id {
            OperationId::IN => Ok(Fragment::on_value(move |actual| {
                in_list(actual, &list).unwrap_or(false)
            })),
            OperationId::NOT_IN => Ok(Fragment::on_value(move |actual| {
                !in_list(actual, &list).unwrap_or(false)
            })),
            _ => Err(HandlerError::not_implemented(operation)),
        }
    }
}

///
/// ComparisonHandler
///
/// Ordering operations with numeric widening across int, uint and float.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ComparisonHandler;

impl ComparisonHandler {
    // ordering test plus whether its result is negated
    fn ordering_test(id: OperationId) -> Option<(fn(Ordering) -> bool, bool)> {
        use OperationId as Id;

        let test: fn(Ordering) -> bool = match id {
            Id::GREATER_THAN | Id::NOT_GREATER_THAN => Ordering::is_gt,
            Id::GREATER_THAN_OR_EQUALS | Id::NOT_GREATER_THAN_OR_EQUALS => Ordering::is_ge,
            Id::LOWER_THAN | Id::NOT_LOWER_THAN => Ordering::is_lt,
            Id::LOWER_THAN_OR_EQUALS | Id::NOT_LOWER_THAN_OR_EQUALS => Ordering::is_le,
            _ => return None,
        };
        let negated = matches!(
            id,
            Id::NOT_GREATER_THAN
                | Id::NOT_GREATER_THAN_OR_EQUALS
                | Id::NOT_LOWER_THAN
                | Id::NOT_LOWER_THAN_OR_EQUALS
        );

        Some((test, negated))
    }
}

impl OperationHandler for ComparisonHandler {
    fn id(&self) -> &str {
        "comparison"
    }

    fn can_handle(&self, field: &FieldDescriptor, operation: &Operation) -> bool {
        field.scalar().is_some() && Self::ordering_test(operation.id).is_some()
    }

    fn handle(
        &self,
        _cx: &FilterContext<'_>,
        _field: &FieldDescriptor,
        operation: &Operation,
        value: &Value,
    ) -> Result<Fragment, HandlerError> {
        let (test, negated) = Self::ordering_test(operation.id)
            .ok_or_else(|| HandlerError::not_implemented(operation))?;
        let bound = value.clone();

        Ok(Fragment::on_value(move |actual| {
            compare_order(actual, &bound).is_some_and(test) != negated
        }))
    }
}

///
/// TextHandler
///
/// Case-sensitive substring, prefix and suffix matching on text fields.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TextHandler;

impl TextHandler {
    fn text_op(id: OperationId) -> Option<(TextOp, bool)> {
        use OperationId as Id;

        match id {
            Id::CONTAINS => Some((TextOp::Contains, false)),
            Id::NOT_CONTAINS => Some((TextOp::Contains, true)),
            Id::STARTS_WITH => Some((TextOp::StartsWith, false)),
            Id::NOT_STARTS_WITH => Some((TextOp::StartsWith, true)),
            Id::ENDS_WITH => Some((TextOp::EndsWith, false)),
            Id::NOT_ENDS_WITH => Some((TextOp::EndsWith, true)),
            _ => None,
        }
    }
}

impl OperationHandler for TextHandler {
    fn id(&self) -> &str {
        "text"
    }

    fn can_handle(&self, field: &FieldDescriptor, operation: &Operation) -> bool {
        field.scalar() == Some(ScalarKind::Text) && Self::text_op(operation.id).is_some()
    }

    fn handle(
        &self,
        _cx: &FilterContext<'_>,
        _field: &FieldDescriptor,
        operation: &Operation,
        value: &Value,
    ) -> Result<Fragment, HandlerError> {
        let (op, negated) =
            Self::text_op(operation.id).ok_or_else(|| HandlerError::not_implemented(operation))?;
        let needle = value.clone();

        Ok(Fragment::on_value(move |actual| {
            compare_text(actual, &needle, op).unwrap_or(false) != negated
        }))
    }
}

///
/// PresenceHandler
///
/// `any: true` keeps non-empty lists and collections, `any: false` keeps
/// empty ones. Missing fields never match.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PresenceHandler;

impl OperationHandler for PresenceHandler {
    fn id(&self) -> &str {
        "presence"
    }

    fn can_handle(&self, field: &FieldDescriptor, operation: &Operation) -> bool {
        field.kind.is_many() && operation.id == OperationId::ANY
    }

    fn handle(
        &self,
        _cx: &FilterContext<'_>,
        _field: &FieldDescriptor,
        operation: &Operation,
        value: &Value,
    ) -> Result<Fragment, HandlerError> {
        let Value::Bool(want_elements) = *value else {
            return Err(HandlerError::new(format!(
                "operation '{operation}' expects a bool operand, found {}",
                value.type_label()
            )));
        };

        Ok(Fragment::new(move |field| match field {
            FieldRef::Value(Value::Null) => !want_elements,
            other => other
                .is_empty()
                .is_some_and(|empty| empty != want_elements),
        }))
    }
}
