//! ## Crate layout
//! - `core`: record models, operations, descriptors, the filter parser,
//!   handler dispatch, the compiler and observability.
//!
//! The `prelude` module holds what a host needs to describe its records,
//! assemble a convention and run filters against in-memory collections.

pub use sift_core as core;

/// re-exports
///
/// hosts building filters from JSON need the same serde_json the core uses
pub mod __reexports {
    pub use serde;
    pub use serde_json;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Entry points
//

pub use crate::core::{
    Configuration, FilterError, build_configuration,
    compile::{CompileError, ExpressionCompiler, Predicate},
    convention::{ConfigIssue, ConfigurationError, ConventionOptions},
    filter::ParseError,
    parse_and_compile,
};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        descriptor::FieldDescriptor,
        handler::{FilterContext, FnHandler, Fragment, HandlerError, OperationHandler, Position},
        operation::Operation,
        prelude::*,
    };
    pub use serde_json::{Value as JsonValue, json};
}
