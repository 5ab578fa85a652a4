use crate::value::Value;
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;

///
/// LiteralError
///
/// Raised when a host-supplied JSON node cannot be used as a filter literal.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum LiteralError {
    #[error("objects are not valid literals")]
    Object,

    #[error("number '{0}' is not representable")]
    Number(String),
}

impl TryFrom<&JsonValue> for Value {
    type Error = LiteralError;

    fn try_from(json: &JsonValue) -> Result<Self, Self::Error> {
        match json {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(*v)),
            JsonValue::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(Self::Int(v))
                } else if let Some(v) = n.as_u64() {
                    Ok(Self::Uint(v))
                } else {
                    n.as_f64()
                        .map(Self::Float)
                        .ok_or_else(|| LiteralError::Number(n.to_string()))
                }
            }
            JsonValue::String(v) => Ok(Self::Text(v.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            JsonValue::Object(_) => Err(LiteralError::Object),
        }
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = LiteralError;

    fn try_from(json: JsonValue) -> Result<Self, Self::Error> {
        Self::try_from(&json)
    }
}
