//! Module: handler
//! Responsibility: the ordered table of operation handlers and the fragments they emit.
//! Does not own: filter tree traversal or logical composition.
//! Boundary: the compiler asks the table for a handler per (field, operation) leaf.

mod defaults;
pub(crate) mod semantics;


use crate::{
    descriptor::{FieldDescriptor, FilterDescriptor},
    model::{FieldRef, TypeRef},
    operation::{Operation, OperationRegistry},
    value::Value,
};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

// re-exports
pub use defaults::{
    ComparisonHandler, EqualityHandler, MembershipHandler, PresenceHandler, TextHandler,
    default_handlers,
};

///
/// FilterContext
///
/// What a handler can see while compiling one operation leaf.
///

#[derive(Clone, Copy, Debug)]
pub struct FilterContext<'a> {
    pub registry: &'a OperationRegistry,
    /// Descriptor of the record level the leaf belongs to.
    pub descriptor: &'a FilterDescriptor,
    /// The leaf applies to each element of a scalar list, not to the field.
    pub element: bool,
}

impl FilterContext<'_> {
    #[must_use]
    pub const fn record(&self) -> TypeRef {
        self.descriptor.record
    }
}

///
/// Fragment
///
/// Compiled test for one field read. Missing fields reach the fragment as
/// `FieldRef::Missing` so a handler can decide how absence behaves.
///

#[derive(Clone)]
pub struct Fragment(Arc<dyn Fn(&FieldRef<'_>) -> bool + Send + Sync>);

impl Fragment {
    pub fn new(f: impl Fn(&FieldRef<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Fragment that only inspects present scalar values.
    /// Missing fields and nested records never match.
    pub fn on_value(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::new(move |field| field.as_value().is_some_and(&f))
    }

    /// Fragment that accepts every field read, present or not.
    #[must_use]
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    #[must_use]
    pub fn eval(&self, field: &FieldRef<'_>) -> bool {
        (self.0)(field)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fragment")
    }
}

///
/// HandlerError
///
/// Failure raised by a handler while building a fragment.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The handler claimed the operation but has no implementation for it.
    #[must_use]
    pub fn not_implemented(operation: &Operation) -> Self {
        Self::new(format!("operation '{operation}' is not implemented"))
    }
}

///
/// OperationHandler
///
/// One entry of the handler table. The first handler whose `can_handle`
/// returns `true` for a leaf compiles it.
///

pub trait OperationHandler: Send + Sync {
    /// Stable identifier used to position other handlers around this one.
    fn id(&self) -> &str;

    fn can_handle(&self, field: &FieldDescriptor, operation: &Operation) -> bool;

    fn handle(
        &self,
        cx: &FilterContext<'_>,
        field: &FieldDescriptor,
        operation: &Operation,
        value: &Value,
    ) -> Result<Fragment, HandlerError>;
}

type CanHandleFn = dyn Fn(&FieldDescriptor, &Operation) -> bool + Send + Sync;
type HandleFn = dyn Fn(&FilterContext<'_>, &FieldDescriptor, &Operation, &Value) -> Result<Fragment, HandlerError>
    + Send
    + Sync;

///
/// FnHandler
///
/// Closure-backed handler for hosts that do not need a dedicated type.
///

pub struct FnHandler {
    id: String,
    can_handle: Box<CanHandleFn>,
    handle: Box<HandleFn>,
}

impl FnHandler {
    pub fn new(
        id: impl Into<String>,
        can_handle: impl Fn(&FieldDescriptor, &Operation) -> bool + Send + Sync + 'static,
        handle: impl Fn(&FilterContext<'_>, &FieldDescriptor, &Operation, &Value) -> Result<Fragment, HandlerError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            can_handle: Box::new(can_handle),
            handle: Box::new(handle),
        }
    }
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("id", &self.id).finish()
    }
}

impl OperationHandler for FnHandler {
    fn id(&self) -> &str {
        &self.id
    }

    fn can_handle(&self, field: &FieldDescriptor, operation: &Operation) -> bool {
        (self.can_handle)(field, operation)
    }

    fn handle(
        &self,
        cx: &FilterContext<'_>,
        field: &FieldDescriptor,
        operation: &Operation,
        value: &Value,
    ) -> Result<Fragment, HandlerError> {
        (self.handle)(cx, field, operation, value)
    }
}

///
/// Position
///
/// Where a handler is inserted into the table. Anchors refer to handler ids.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Position {
    Append,
    Prepend,
    Before(String),
    After(String),
}

///
/// HandlerTableError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum HandlerTableError {
    #[error("handler '{0}' is already registered")]
    DuplicateHandler(String),

    #[error("anchor handler '{0}' is not registered")]
    UnknownAnchor(String),
}

///
/// HandlerTable
///
/// Ordered handler list; resolution is first match in table order.
///

#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: Vec<Arc<dyn OperationHandler>>,
}

impl HandlerTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding only the built-in handlers.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            handlers: default_handlers(),
        }
    }

    pub fn register(
        &mut self,
        handler: Arc<dyn OperationHandler>,
        position: Position,
    ) -> Result<(), HandlerTableError> {
        if self.position_of(handler.id()).is_some() {
            return Err(HandlerTableError::DuplicateHandler(handler.id().to_string()));
        }

        let index = match &position {
            Position::Append => self.handlers.len(),
            Position::Prepend => 0,
            Position::Before(anchor) => self.anchor(anchor)?,
            Position::After(anchor) => self.anchor(anchor)? + 1,
        };
        self.handlers.insert(index, handler);

        Ok(())
    }

    /// First handler claiming `(field, operation)`.
    #[must_use]
    pub fn resolve(
        &self,
        field: &FieldDescriptor,
        operation: &Operation,
    ) -> Option<&Arc<dyn OperationHandler>> {
        self.handlers
            .iter()
            .find(|handler| handler.can_handle(field, operation))
    }

    /// Handler ids in table order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|handler| handler.id())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.handlers.iter().position(|handler| handler.id() == id)
    }

    fn anchor(&self, id: &str) -> Result<usize, HandlerTableError> {
        self.position_of(id)
            .ok_or_else(|| HandlerTableError::UnknownAnchor(id.to_string()))
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
