use crate::{model::RecordModel, value::Value};
use std::fmt;

///
/// Record
///
/// Abstraction over a record that can expose its fields by name.
/// This decouples predicate evaluation from concrete record types and is
/// object-safe so nested relations can be walked without knowing their type.
///

pub trait Record {
    fn field(&self, name: &str) -> FieldRef<'_>;
}

///
/// Filterable
///
/// A record type with a static model, usable as a filter root.
///

pub trait Filterable: Record + 'static {
    fn model() -> &'static RecordModel;
}

///
/// FieldRef
///
/// Result of reading one field from a record during evaluation.
/// Distinguishes a missing field from a present field holding `Value::Null`.
///

pub enum FieldRef<'a> {
    /// Field is not present on the record.
    Missing,

    /// Scalar or scalar-list field value (including `Value::Null`).
    Value(Value),

    /// Single nested record; `None` when the relation is empty.
    Object(Option<&'a dyn Record>),

    /// Collection of nested records.
    Many(Vec<&'a dyn Record>),
}

impl<'a> FieldRef<'a> {
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    #[must_use]
    pub fn object<T: Record>(record: Option<&'a T>) -> Self {
        Self::Object(record.map(|record| record as &dyn Record))
    }

    #[must_use]
    pub fn many<T: Record + 'a>(records: impl IntoIterator<Item = &'a T>) -> Self {
        Self::Many(
            records
                .into_iter()
                .map(|record| record as &dyn Record)
                .collect(),
        )
    }

    /// Borrow the scalar value, if this read produced one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Number of elements for list-shaped reads.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Value(Value::List(items)) => Some(items.len()),
            Self::Many(records) => Some(records.len()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("Missing"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Object(record) => write!(f, "Object(present={})", record.is_some()),
            Self::Many(records) => write!(f, "Many(len={})", records.len()),
        }
    }
}
