use crate::{
    filter::Quantifier,
    handler::Fragment,
    model::{FieldRef, Record},
    value::Value,
};

///
/// Accessor
///
/// Where a compiled leaf reads its input from.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Accessor {
    /// A named field of the current record.
    Field(String),
    /// The current scalar-list element itself.
    Element,
}

///
/// Subject
///
/// What a program is evaluated against at one level.
///

#[derive(Clone, Copy)]
pub enum Subject<'a> {
    Record(&'a dyn Record),
    Element(&'a Value),
}

///
/// Program
///
/// Executable predicate tree produced by the compiler.
/// Field names are bound once at compile time; evaluation never consults
/// descriptors or handlers.
///

#[derive(Clone, Debug)]
pub enum Program {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Match {
        accessor: Accessor,
        fragment: Fragment,
    },
    Relation {
        field: String,
        quantifier: Quantifier,
        inner: Box<Self>,
    },
    Elements {
        field: String,
        quantifier: Quantifier,
        inner: Box<Self>,
    },
}

impl Program {
    /// Evaluate against one subject.
    #[must_use]
    pub fn eval(&self, subject: Subject<'_>) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::And(children) => children.iter().all(|child| child.eval(subject)),
            Self::Or(children) => children.iter().any(|child| child.eval(subject)),
            Self::Not(inner) => !inner.eval(subject),
            Self::Match { accessor, fragment } => eval_match(accessor, fragment, subject),
            Self::Relation {
                field,
                quantifier,
                inner,
            } => {
                let Subject::Record(record) = subject else {
                    return false;
                };

                eval_relation(&record.field(field), *quantifier, inner)
            }
            Self::Elements {
                field,
                quantifier,
                inner,
            } => {
                let Subject::Record(record) = subject else {
                    return false;
                };

                eval_elements(&record.field(field), *quantifier, inner)
            }
        }
    }

    /// Conjunction that flattens nested `And`s and drops `True`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut children = Vec::new();
        for side in [self, other] {
            match side {
                Self::True => {}
                Self::And(inner) => children.extend(inner),
                other => children.push(other),
            }
        }

        match children.len() {
            0 => Self::True,
            1 => children.pop().unwrap_or(Self::True),
            _ => Self::And(children),
        }
    }

    /// Disjunction that flattens nested `Or`s and drops `False`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut children = Vec::new();
        for side in [self, other] {
            match side {
                Self::False => {}
                Self::Or(inner) => children.extend(inner),
                other => children.push(other),
            }
        }

        match children.len() {
            0 => Self::False,
            1 => children.pop().unwrap_or(Self::False),
            _ => Self::Or(children),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

fn eval_match(accessor: &Accessor, fragment: &Fragment, subject: Subject<'_>) -> bool {
    match (accessor, subject) {
        (Accessor::Field(name), Subject::Record(record)) => fragment.eval(&record.field(name)),
        (Accessor::Element, Subject::Element(value)) => {
            fragment.eval(&FieldRef::Value(value.clone()))
        }
        _ => false,
    }
}

fn eval_relation(field: &FieldRef<'_>, quantifier: Quantifier, inner: &Program) -> bool {
    let test = |record: &&dyn Record| inner.eval(Subject::Record(*record));

    match field {
        FieldRef::Object(object) => match quantifier {
            Quantifier::One | Quantifier::Any => object.as_ref().is_some_and(test),
            Quantifier::All => object.as_ref().is_none_or(test),
            Quantifier::None => !object.as_ref().is_some_and(test),
        },
        FieldRef::Many(records) => quantify(quantifier, records.iter().map(test)),
        FieldRef::Missing | FieldRef::Value(_) => false,
    }
}

fn eval_elements(field: &FieldRef<'_>, quantifier: Quantifier, inner: &Program) -> bool {
    match field {
        FieldRef::Value(Value::List(items)) => quantify(
            quantifier,
            items.iter().map(|item| inner.eval(Subject::Element(item))),
        ),
        FieldRef::Value(Value::Null) => quantify(quantifier, std::iter::empty()),
        _ => false,
    }
}

fn quantify(quantifier: Quantifier, mut results: impl Iterator<Item = bool>) -> bool {
    match quantifier {
        Quantifier::One | Quantifier::Any => results.any(|hit| hit),
        Quantifier::All => results.all(|hit| hit),
        Quantifier::None => !results.any(|hit| hit),
    }
}
