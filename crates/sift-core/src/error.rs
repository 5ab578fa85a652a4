use crate::{compile::CompileError, filter::ParseError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// FilterError
///
/// Failure of one filter request, from raw input to compiled predicate.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FilterError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl FilterError {
    /// Parse failures are the caller's fault; compile failures are ours.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Parse(_) => ErrorClass::InvalidInput,
            Self::Compile(_) => ErrorClass::Configuration,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Parse(_) => ErrorOrigin::Parse,
            Self::Compile(_) => ErrorOrigin::Compile,
        }
    }
}

///
/// ErrorClass
/// Stable classification hosts map onto client or internal errors.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidInput,
    Configuration,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidInput => "invalid_input",
            Self::Configuration => "configuration",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Stage of the filter pipeline an error was raised in.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Parse,
    Compile,
    Convention,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Parse => "parse",
            Self::Compile => "compile",
            Self::Convention => "convention",
        };
        write!(f, "{label}")
    }
}
