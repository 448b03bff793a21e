//! Error types for state and strategy construction

use thiserror::Error;

/// Errors raised when input cannot be turned into a state or strategy.
///
/// Every variant is recoverable: fix the input and retry.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A raw state field is not one of the two action symbols.
    #[error("invalid state: field {field} is {value:?}, expected 'c' or 'd'")]
    InvalidState { field: &'static str, value: char },

    /// A state id outside [0, 15].
    #[error("invalid argument: state id {id} is outside [0, 15]")]
    InvalidArgument { id: i64 },

    /// A string that is not exactly `expected_len` characters over {c, d}.
    #[error("invalid format: {input:?} is not {expected_len} characters over {{c, d}}")]
    InvalidFormat { input: String, expected_len: usize },

    /// An action sequence that does not have one entry per state.
    #[error("invalid strategy: expected 16 actions, got {len}")]
    InvalidStrategy { len: usize },

    /// A state representation of the wrong shape.
    #[error("invalid input: a state needs 4 actions, got {len}")]
    InvalidInput { len: usize },

    /// An error rate outside the open interval (0, 1).
    #[error("invalid error rate: {e} is outside (0, 1)")]
    InvalidErrorRate { e: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
