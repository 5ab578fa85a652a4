//! Module: model
//! Responsibility: static record/field metadata and the runtime record read surface.
//! Does not own: filter descriptors or operation availability.
//! Boundary: descriptors are derived from models; evaluation reads records.

mod record;


use std::fmt;

// re-exports
pub use crate::value::ScalarKind;
pub use record::{FieldRef, Filterable, Record};

///
/// TypeRef
///
/// Stable identity of a filterable record type.
/// Record type names must be unique within one configuration.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeRef(&'static str);

impl TypeRef {
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self(name)
    }

    /// Identity of a filterable record type, taken from its model.
    #[must_use]
    pub fn of<T: Filterable>() -> Self {
        T::model().type_ref()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

///
/// RecordModel
///
/// Declarative field list for one record type.
/// Models may reference each other cyclically through `FieldKind`, so they
/// are expected to live in `static` items.
///

pub struct RecordModel {
    /// Record type name; doubles as its `TypeRef`.
    pub name: &'static str,
    pub fields: &'static [FieldModel],
}

impl RecordModel {
    #[must_use]
    pub const fn type_ref(&self) -> TypeRef {
        TypeRef(self.name)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl fmt::Debug for RecordModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordModel")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

///
/// FieldModel
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field name as used in filter expressions.
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

///
/// FieldKind
///
/// Declared type of a record field, reduced to what filtering needs.
///

#[derive(Clone, Copy)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// Ordered list of scalars.
    List(ScalarKind),
    /// Single nested record; may be absent at runtime.
    Object(&'static RecordModel),
    /// Collection of nested records.
    Collection(&'static RecordModel),
}

impl FieldKind {
    #[must_use]
    pub const fn scalar(self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    /// Scalar kind of the field itself, or of its elements for scalar lists.
    #[must_use]
    pub const fn element_scalar(self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) | Self::List(kind) => Some(kind),
            Self::Object(_) | Self::Collection(_) => None,
        }
    }

    /// Nested record model for object and collection fields.
    #[must_use]
    pub const fn nested_model(self) -> Option<&'static RecordModel> {
        match self {
            Self::Object(model) | Self::Collection(model) => Some(model),
            Self::Scalar(_) | Self::List(_) => None,
        }
    }

    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::List(_) | Self::Collection(_))
    }
}

impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) | (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) | (Self::Collection(a), Self::Collection(b)) => {
                a.name == b.name
            }
            _ => false,
        }
    }
}

impl Eq for FieldKind {}

// Nested models print by name only; models can be cyclic.
impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "Scalar({kind:?})"),
            Self::List(kind) => write!(f, "List({kind:?})"),
            Self::Object(model) => write!(f, "Object({})", model.name),
            Self::Collection(model) => write!(f, "Collection({})", model.name),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::List(kind) => write!(f, "List<{kind}>"),
            Self::Object(model) => write!(f, "{}", model.name),
            Self::Collection(model) => write!(f, "List<{}>", model.name),
        }
    }
}
