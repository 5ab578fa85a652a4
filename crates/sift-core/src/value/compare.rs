use crate::value::{F64_SAFE_U64, Value};
use std::cmp::Ordering;

///
/// NumericRepr
///

enum NumericRepr {
    Signed(i64),
    Unsigned(u64),
    F64(f64),
}

impl Value {
    const fn numeric_repr(&self) -> Option<NumericRepr> {
        match self {
            Self::Int(v) => Some(NumericRepr::Signed(*v)),
            Self::Uint(v) => Some(NumericRepr::Unsigned(*v)),
            Self::Float(v) => Some(NumericRepr::F64(*v)),
            _ => None,
        }
    }

    /// Compare two numeric values across Int/Uint/Float.
    ///
    /// Integer/float mixes only compare when the integer is exactly
    /// representable as `f64`; anything else is incomparable.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn cmp_numeric(&self, other: &Self) -> Option<Ordering> {
        match (self.numeric_repr()?, other.numeric_repr()?) {
            (NumericRepr::Signed(a), NumericRepr::Signed(b)) => Some(a.cmp(&b)),
            (NumericRepr::Unsigned(a), NumericRepr::Unsigned(b)) => Some(a.cmp(&b)),
            (NumericRepr::Signed(a), NumericRepr::Unsigned(b)) => Some(cmp_signed_unsigned(a, b)),
            (NumericRepr::Unsigned(a), NumericRepr::Signed(b)) => {
                Some(cmp_signed_unsigned(b, a).reverse())
            }
            (NumericRepr::F64(a), NumericRepr::F64(b)) => a.partial_cmp(&b),
            (NumericRepr::Signed(a), NumericRepr::F64(b)) => {
                (a.unsigned_abs() <= F64_SAFE_U64).then_some(a as f64)?.partial_cmp(&b)
            }
            (NumericRepr::F64(a), NumericRepr::Signed(b)) => {
                a.partial_cmp(&(b.unsigned_abs() <= F64_SAFE_U64).then_some(b as f64)?)
            }
            (NumericRepr::Unsigned(a), NumericRepr::F64(b)) => {
                (a <= F64_SAFE_U64).then_some(a as f64)?.partial_cmp(&b)
            }
            (NumericRepr::F64(a), NumericRepr::Unsigned(b)) => {
                a.partial_cmp(&(b <= F64_SAFE_U64).then_some(b as f64)?)
            }
        }
    }

    /// Same-family ordering: numbers widen, text and bool compare within
    /// their own variant. Everything else is unordered.
    #[must_use]
    pub fn cmp_ordered(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => self.cmp_numeric(other),
        }
    }
}

fn cmp_signed_unsigned(signed: i64, unsigned: u64) -> Ordering {
    u64::try_from(signed).map_or(Ordering::Less, |signed| signed.cmp(&unsigned))
}
