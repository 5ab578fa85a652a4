//! Module: filter
//! Responsibility: the abstract filter tree and the parser that builds it.
//! Does not own: predicate evaluation or handler dispatch.
//! Boundary: raw JSON in, validated `FilterNode` out; never touches records.

mod node;
mod parse;


use crate::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, model::TypeRef};
use thiserror::Error as ThisError;

// re-exports
pub use node::{FilterNode, Quantifier};
pub use parse::Parser;

///
/// ParseLimits
///
/// Upper bounds on the size of one filter request.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseLimits {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

///
/// ParseError
///
/// Client input errors. `path` is the dotted location of the offending key
/// (empty at the root).
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ParseError {
    #[error("unknown field '{field}' on '{record}' at '{path}'")]
    UnknownField {
        path: String,
        record: TypeRef,
        field: String,
    },

    #[error("unknown combinator '{key}' at '{path}'")]
    UnknownCombinator { path: String, key: String },

    #[error("operation '{operation}' is not allowed on field '{field}' at '{path}'")]
    OperationNotAllowed {
        path: String,
        field: String,
        operation: String,
    },

    #[error("operation '{operation}' on '{field}' expects {expected}, found {found} at '{path}'")]
    TypeMismatch {
        path: String,
        field: String,
        operation: String,
        expected: String,
        found: &'static str,
    },

    #[error("expected {expected}, found {found} at '{path}'")]
    InvalidShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("filter nesting exceeds the maximum depth of {max}")]
    DepthLimitExceeded { max: usize },

    #[error("filter exceeds the maximum of {max} nodes")]
    NodeLimitExceeded { max: usize },

    #[error("record type '{record}' is not filterable in this configuration")]
    UnknownRecordType { record: TypeRef },
}

impl ParseError {
    /// Dotted location of the error, when it has one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnknownField { path, .. }
            | Self::UnknownCombinator { path, .. }
            | Self::OperationNotAllowed { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::InvalidShape { path, .. } => Some(path),
            Self::DepthLimitExceeded { .. }
            | Self::NodeLimitExceeded { .. }
            | Self::UnknownRecordType { .. } => None,
        }
    }
}
