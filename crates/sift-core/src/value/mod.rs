mod compare;
mod json;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub use json::LiteralError;

///
/// CONSTANTS
///

const F64_SAFE_U64: u64 = 1u64 << 53;

///
/// ScalarKind
///
/// Scalar classification shared by record models, operation inputs and
/// literal compatibility checks.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
}

impl ScalarKind {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Float)
    }

    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Text => "text",
        };

        f.write_str(label)
    }
}

///
/// Value
///
/// Literal operand of a filter operation and the runtime shape of a scalar
/// field read from a record.
///
/// Null → the field is present but holds no value.
/// List → ordered scalar values; order is preserved.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    List(Vec<Self>),
}

impl Value {
    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Uint(_) | Self::Float(_))
    }

    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Bool(_) => Some(ScalarKind::Bool),
            Self::Int(_) => Some(ScalarKind::Int),
            Self::Uint(_) => Some(ScalarKind::Uint),
            Self::Float(_) => Some(ScalarKind::Float),
            Self::Text(_) => Some(ScalarKind::Text),
            Self::Null | Self::List(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Short label used in validation messages.
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }

    /// Whether this literal can be compared against a field of `kind`.
    ///
    /// Integer literals widen into any numeric field as long as the value is
    /// representable; `null` is never a scalar match.
    #[must_use]
    pub const fn matches_scalar(&self, kind: ScalarKind) -> bool {
        match (kind, self) {
            (ScalarKind::Bool, Self::Bool(_))
            | (ScalarKind::Text, Self::Text(_))
            | (ScalarKind::Int, Self::Int(_))
            | (ScalarKind::Uint, Self::Uint(_))
            | (ScalarKind::Float, Self::Int(_) | Self::Uint(_) | Self::Float(_)) => true,
            (ScalarKind::Int, Self::Uint(v)) => *v <= i64::MAX as u64,
            (ScalarKind::Uint, Self::Int(v)) => *v >= 0,
            _ => false,
        }
    }

    ///
    /// TEXT COMPARISON
    ///

    // case-sensitive; `None` unless both sides are text
    fn text_op(&self, other: &Self, f: impl Fn(&str, &str) -> bool) -> Option<bool> {
        let (a, b) = (self.as_text()?, other.as_text()?);

        Some(f(a, b))
    }

    /// Check whether `self` contains `needle`.
    #[must_use]
    pub fn text_contains(&self, needle: &Self) -> Option<bool> {
        self.text_op(needle, |a, b| a.contains(b))
    }

    /// Check whether `self` starts with `needle`.
    #[must_use]
    pub fn text_starts_with(&self, needle: &Self) -> Option<bool> {
        self.text_op(needle, |a, b| a.starts_with(b))
    }

    /// Check whether `self` ends with `needle`.
    #[must_use]
    pub fn text_ends_with(&self, needle: &Self) -> Option<bool> {
        self.text_op(needle, |a, b| a.ends_with(b))
    }

    ///
    /// EMPTY
    ///

    #[must_use]
    pub fn is_empty(&self) -> Option<bool> {
        match self {
            Self::List(items) => Some(items.is_empty()),
            Self::Text(text) => Some(text.is_empty()),
            Self::Null => Some(true),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

///
/// Conversions
///

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Uint(u64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
