use crate::{operation::OperationId, value::Value};
use std::fmt;

///
/// Quantifier
///
/// How a nested filter applies across a relation or a scalar list.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Quantifier {
    /// Single object relation; an absent object never matches.
    One,
    /// At least one element matches.
    Any,
    /// Every element matches; vacuously true when empty.
    All,
    /// No element matches.
    None,
}

impl Quantifier {
    /// Quantifier selected by a quantifier operation.
    #[must_use]
    pub const fn from_operation(id: OperationId) -> Option<Self> {
        match id.get() {
            21 => Some(Self::All),
            22 => Some(Self::None),
            23 => Some(Self::Any),
            _ => None,
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::One => "one",
            Self::Any => "any",
            Self::All => "all",
            Self::None => "none",
        };

        f.write_str(label)
    }
}

///
/// FilterNode
///
/// Validated filter tree for one request.
/// Field names are relative to the descriptor of the enclosing level.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FilterNode {
    Operation {
        field: String,
        operation: OperationId,
        value: Value,
    },
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    /// Nested filter over an object or collection field.
    Relation {
        field: String,
        quantifier: Quantifier,
        filter: Box<Self>,
    },
    /// Element filter over a scalar list field.
    Elements {
        field: String,
        quantifier: Quantifier,
        filter: Box<Self>,
    },
}

impl FilterNode {
    /// Filter that accepts every record.
    #[must_use]
    pub const fn accept_all() -> Self {
        Self::And(Vec::new())
    }

    /// Filter that rejects every record.
    #[must_use]
    pub const fn reject_all() -> Self {
        Self::Or(Vec::new())
    }

    /// Total number of nodes in this tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + match self {
            Self::Operation { .. } => 0,
            Self::And(children) | Self::Or(children) => {
                children.iter().map(Self::node_count).sum()
            }
            Self::Not(child)
            | Self::Relation { filter: child, .. }
            | Self::Elements { filter: child, .. } => child.node_count(),
        }
    }

    /// Visit every operation leaf with the chain of fields leading to it.
    pub fn for_each_operation(&self, mut f: impl FnMut(&[&str], OperationId, &Value)) {
        let mut path = Vec::new();
        self.walk_operations(&mut path, &mut f);
    }

    fn walk_operations<'a>(
        &'a self,
        path: &mut Vec<&'a str>,
        f: &mut impl FnMut(&[&str], OperationId, &Value),
    ) {
        match self {
            Self::Operation {
                field,
                operation,
                value,
            } => {
                path.push(field);
                f(path, *operation, value);
                path.pop();
            }
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.walk_operations(path, f);
                }
            }
            Self::Not(child) => child.walk_operations(path, f),
            Self::Relation { field, filter, .. } => {
                path.push(field);
                filter.walk_operations(path, f);
                path.pop();
            }
            Self::Elements { filter, .. } => filter.walk_operations(path, f),
        }
    }
}
