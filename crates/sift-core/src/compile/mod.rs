//! Module: compile
//! Responsibility: lowering validated filter trees into executable predicates.
//! Does not own: input parsing or the semantics of individual operations.
//! Boundary: handlers supply leaf fragments; this module supplies structure.

mod predicate;
mod program;

#[cfg(test)]
mod tests;

use crate::{
    descriptor::{DescriptorSet, FieldDescriptor, FilterDescriptor},
    filter::FilterNode,
    handler::{FilterContext, HandlerError, HandlerTable},
    model::TypeRef,
    operation::{OperationId, OperationRegistry},
};
use thiserror::Error as ThisError;

// re-exports
pub use predicate::Predicate;
pub use program::{Accessor, Program, Subject};

///
/// CompileError
///
/// Server-side configuration faults found while lowering a filter.
/// A validated filter only fails here when handlers or descriptors are
/// misconfigured.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("no handler claims operation '{operation}' on '{record}.{field}'")]
    UnhandledOperation {
        record: TypeRef,
        field: String,
        operation: String,
    },

    #[error("handler '{handler}' failed on '{field}' for operation '{operation}': {source}")]
    Handler {
        handler: String,
        field: String,
        operation: String,
        #[source]
        source: HandlerError,
    },

    #[error("field '{record}.{field}' has no nested descriptor")]
    UnknownDescriptor { record: TypeRef, field: String },

    #[error("field '{field}' is not described on '{record}'")]
    UnknownField { record: TypeRef, field: String },

    #[error("record type '{record}' has no descriptor in this configuration")]
    UnknownRecordType { record: TypeRef },
}

///
/// CompileContext
///
/// Everything a compiler reads while lowering one filter.
///

#[derive(Clone, Copy, Debug)]
pub struct CompileContext<'a> {
    pub registry: &'a OperationRegistry,
    pub descriptors: &'a DescriptorSet,
    pub handlers: &'a HandlerTable,
    /// Descriptor of the record type the filter targets.
    pub root: &'a FilterDescriptor,
}

///
/// ExpressionCompiler
///
/// Strategy that turns a `FilterNode` into a `Program`.
///

pub trait ExpressionCompiler: Send + Sync {
    fn compile(&self, cx: &CompileContext<'_>, node: &FilterNode) -> Result<Program, CompileError>;
}

///
/// DefaultCompiler
///
/// Resolves one handler per operation leaf and composes the fragments with
/// the logical and quantifier structure of the tree.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCompiler;

impl ExpressionCompiler for DefaultCompiler {
    fn compile(&self, cx: &CompileContext<'_>, node: &FilterNode) -> Result<Program, CompileError> {
        let program = Self::lower(cx, cx.root, false, node)?;

        tracing::debug!(record = %cx.root.record, "filter compiled");

        Ok(program)
    }
}

impl DefaultCompiler {
    fn lower(
        cx: &CompileContext<'_>,
        descriptor: &FilterDescriptor,
        element: bool,
        node: &FilterNode,
    ) -> Result<Program, CompileError> {
        match node {
            FilterNode::Operation {
                field,
                operation,
                value,
            } => {
                let field = Self::field(descriptor, field)?;
                let op = cx
                    .registry
                    .get(*operation)
                    .ok_or_else(|| unhandled(descriptor, field, *operation, None))?;
                let handler = cx
                    .handlers
                    .resolve(field, op)
                    .ok_or_else(|| unhandled(descriptor, field, op.id, Some(&op.name)))?;

                let fx = FilterContext {
                    registry: cx.registry,
                    descriptor,
                    element,
                };
                let fragment = handler
                    .handle(&fx, field, op, value)
                    .map_err(|source| CompileError::Handler {
                        handler: handler.id().to_string(),
                        field: field.name.clone(),
                        operation: op.name.clone(),
                        source,
                    })?;

                let accessor = if element {
                    Accessor::Element
                } else {
                    Accessor::Field(field.name.clone())
                };

                Ok(Program::Match { accessor, fragment })
            }

            FilterNode::And(children) => {
                let mut program = Program::True;
                for child in children {
                    program = program.and(Self::lower(cx, descriptor, element, child)?);
                }

                Ok(program)
            }

            FilterNode::Or(children) => {
                let mut program = Program::False;
                for child in children {
                    program = program.or(Self::lower(cx, descriptor, element, child)?);
                }

                Ok(program)
            }

            FilterNode::Not(child) => Ok(Self::lower(cx, descriptor, element, child)?.negate()),

            FilterNode::Relation {
                field,
                quantifier,
                filter,
            } => {
                let field = Self::field(descriptor, field)?;
                let nested = field
                    .nested
                    .and_then(|id| cx.descriptors.get(id))
                    .ok_or_else(|| CompileError::UnknownDescriptor {
                        record: descriptor.record,
                        field: field.name.clone(),
                    })?;

                Ok(Program::Relation {
                    field: field.name.clone(),
                    quantifier: *quantifier,
                    inner: Box::new(Self::lower(cx, nested, false, filter)?),
                })
            }

            FilterNode::Elements {
                field,
                quantifier,
                filter,
            } => {
                let field = Self::field(descriptor, field)?;

                Ok(Program::Elements {
                    field: field.name.clone(),
                    quantifier: *quantifier,
                    inner: Box::new(Self::lower(cx, descriptor, true, filter)?),
                })
            }
        }
    }

    fn field<'d>(
        descriptor: &'d FilterDescriptor,
        name: &str,
    ) -> Result<&'d FieldDescriptor, CompileError> {
        descriptor
            .field(name)
            .ok_or_else(|| CompileError::UnknownField {
                record: descriptor.record,
                field: name.to_string(),
            })
    }
}

fn unhandled(
    descriptor: &FilterDescriptor,
    field: &FieldDescriptor,
    operation: OperationId,
    name: Option<&str>,
) -> CompileError {
    let operation = name.map_or_else(|| operation.to_string(), str::to_string);

    tracing::error!(
        record = %descriptor.record,
        field = %field.name,
        operation = %operation,
        "no handler for filter operation"
    );

    CompileError::UnhandledOperation {
        record: descriptor.record,
        field: field.name.clone(),
        operation,
    }
}
