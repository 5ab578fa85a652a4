//! Core runtime for Sift: record models, the operation registry, filter
//! descriptors, the filter parser, handler dispatch, and the expression
//! compiler that turns a raw filter into an executable predicate.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod compile;
pub mod convention;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod handler;
pub mod model;
pub mod obs;
pub mod operation;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Default name of the top-level filter argument a host reads the filter from.
pub const DEFAULT_ARGUMENT_NAME: &str = "where";

/// Default maximum nesting depth accepted by the filter parser.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Default maximum number of filter nodes accepted in one request.
pub const DEFAULT_MAX_NODES: usize = 256;

// re-exports
pub use convention::{Configuration, build_configuration, parse_and_compile};
pub use error::FilterError;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, registries, or handler internals are re-exported here.
///

pub mod prelude {
    pub use crate::{
        compile::Predicate,
        convention::{Configuration, ConventionBuilder},
        descriptor::describe_type,
        model::{FieldKind, FieldModel, FieldRef, Filterable, Record, RecordModel, ScalarKind},
        operation::{OperationId, ValueKind},
        value::Value,
    };
}
