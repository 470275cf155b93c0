use std::error;
use std::fmt;

/// Failures surfaced to callers before or during setup. Running out of
/// budget or stalling is not an error; those are normal terminations and
/// live on `RunOutcome`.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The point set or distance matrix cannot define a tour.
    InvalidInstance(String),
    /// A tour does not visit every city of the instance exactly once.
    InvalidPermutation(String),
    /// A hyperparameter lies outside its valid range.
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInstance(message) => write!(f, "invalid instance: {}", message),
            Error::InvalidPermutation(message) => write!(f, "invalid permutation: {}", message),
            Error::InvalidConfig(message) => write!(f, "invalid configuration: {}", message),
        }
    }
}

impl error::Error for Error {}
