//! Module: operation
//! Responsibility: operation identity, metadata, and the id → operation registry.
//! Does not own: which fields expose an operation, or how it evaluates.
//! Boundary: descriptors reference operations by id; handlers dispatch on them.

mod registry;


use crate::value::{ScalarKind, Value};
use derive_more::{Display, From};
use std::fmt;

// re-exports
pub use registry::{OperationRegistry, RegistryError};

///
/// OperationId
///
/// Stable numeric identifier of a filter operation.
/// Ids below `OperationId::FIRST_CUSTOM` are reserved for built-in operations.
///

#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
pub struct OperationId(u32);

impl OperationId {
    pub const EQUALS: Self = Self(0);
    pub const NOT_EQUALS: Self = Self(1);
    pub const CONTAINS: Self = Self(2);
    pub const NOT_CONTAINS: Self = Self(3);
    pub const IN: Self = Self(4);
    pub const NOT_IN: Self = Self(5);
    pub const STARTS_WITH: Self = Self(6);
    pub const NOT_STARTS_WITH: Self = Self(7);
    pub const ENDS_WITH: Self = Self(8);
    pub const NOT_ENDS_WITH: Self = Self(9);
    pub const AND: Self = Self(10);
    pub const OR: Self = Self(11);
    pub const GREATER_THAN: Self = Self(13);
    pub const NOT_GREATER_THAN: Self = Self(14);
    pub const GREATER_THAN_OR_EQUALS: Self = Self(15);
    pub const NOT_GREATER_THAN_OR_EQUALS: Self = Self(16);
    pub const LOWER_THAN: Self = Self(17);
    pub const NOT_LOWER_THAN: Self = Self(18);
    pub const LOWER_THAN_OR_EQUALS: Self = Self(19);
    pub const NOT_LOWER_THAN_OR_EQUALS: Self = Self(20);
    pub const ALL: Self = Self(21);
    pub const NONE: Self = Self(22);
    pub const SOME: Self = Self(23);
    pub const ANY: Self = Self(24);
    pub const NOT: Self = Self(25);

    /// First id free for host-defined operations.
    pub const FIRST_CUSTOM: u32 = 100;

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Logical combinators appear at record level, not under a field.
    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self.0, 10 | 11 | 25)
    }

    /// Quantifiers over lists and collections that take a nested filter.
    #[must_use]
    pub const fn is_quantifier(self) -> bool {
        matches!(self.0, 21..=23)
    }
}

///
/// ValueKind
///
/// Operand shape an operation accepts, checked by the parser.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    /// Same scalar kind as the field (or its elements); `null` allowed.
    Field,
    /// List of the field's scalar kind.
    FieldList,
    /// A fixed scalar kind regardless of the field.
    Scalar(ScalarKind),
    /// A nested filter object.
    Filter,
    /// Any literal.
    Any,
}

impl ValueKind {
    /// Check a literal against this kind for a field whose scalar kind is
    /// `field_scalar` (`None` for non-scalar fields).
    #[must_use]
    pub fn accepts(self, value: &Value, field_scalar: Option<ScalarKind>) -> bool {
        match self {
            Self::Any => true,
            Self::Filter => false,
            Self::Scalar(kind) => value.matches_scalar(kind),
            Self::Field => match (value, field_scalar) {
                (Value::Null, _) => true,
                (value, Some(kind)) => value.matches_scalar(kind),
                (_, None) => false,
            },
            Self::FieldList => match (value, field_scalar) {
                (Value::List(items), Some(kind)) => {
                    items.iter().all(|item| item.matches_scalar(kind))
                }
                _ => false,
            },
        }
    }

    /// Human-readable expectation for a field of `field_scalar`.
    #[must_use]
    pub fn describe(self, field_scalar: Option<ScalarKind>) -> String {
        match (self, field_scalar) {
            (Self::Field, Some(kind)) => kind.to_string(),
            (Self::FieldList, Some(kind)) => format!("list of {kind}"),
            (Self::Field | Self::FieldList, None) => "scalar field".to_string(),
            (Self::Scalar(kind), _) => kind.to_string(),
            (Self::Filter, _) => "filter object".to_string(),
            (Self::Any, _) => "any literal".to_string(),
        }
    }
}

///
/// Operation
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Operation {
    pub id: OperationId,
    pub name: String,
    pub description: Option<String>,
    pub accepts: ValueKind,
}

impl Operation {
    #[must_use]
    pub fn new(id: OperationId, name: impl Into<String>, accepts: ValueKind) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            accepts,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Built-in operations, in id order.
#[must_use]
pub(crate) fn default_operations() -> Vec<Operation> {
    use OperationId as Id;
    use ValueKind::{Field, FieldList, Filter};

    vec![
        Operation::new(Id::EQUALS, "eq", Field),
        Operation::new(Id::NOT_EQUALS, "neq", Field),
        Operation::new(Id::CONTAINS, "contains", Field),
        Operation::new(Id::NOT_CONTAINS, "ncontains", Field),
        Operation::new(Id::IN, "in", FieldList),
        Operation::new(Id::NOT_IN, "nin", FieldList),
        Operation::new(Id::STARTS_WITH, "startsWith", Field),
        Operation::new(Id::NOT_STARTS_WITH, "nstartsWith", Field),
        Operation::new(Id::ENDS_WITH, "endsWith", Field),
        Operation::new(Id::NOT_ENDS_WITH, "nendsWith", Field),
        Operation::new(Id::AND, "and", Filter),
        Operation::new(Id::OR, "or", Filter),
        Operation::new(Id::GREATER_THAN, "gt", Field),
        Operation::new(Id::NOT_GREATER_THAN, "ngt", Field),
        Operation::new(Id::GREATER_THAN_OR_EQUALS, "gte", Field),
        Operation::new(Id::NOT_GREATER_THAN_OR_EQUALS, "ngte", Field),
        Operation::new(Id::LOWER_THAN, "lt", Field),
        Operation::new(Id::NOT_LOWER_THAN, "nlt", Field),
        Operation::new(Id::LOWER_THAN_OR_EQUALS, "lte", Field),
        Operation::new(Id::NOT_LOWER_THAN_OR_EQUALS, "nlte", Field),
        Operation::new(Id::ALL, "all", Filter),
        Operation::new(Id::NONE, "none", Filter),
        Operation::new(Id::SOME, "some", Filter),
        Operation::new(Id::ANY, "any", ValueKind::Scalar(ScalarKind::Bool)),
        Operation::new(Id::NOT, "not", Filter),
    ]
}
