// src/error.rs
//
// Error taxonomy for the guesser core.
//
// Every variant is a local, synchronous contract violation. Nothing here is
// retried or recovered: operations validate up front and surface the error
// to the caller without touching the policy.

use std::fmt;

/// Errors raised by the agent, the rubrics and the experiment driver.
#[derive(Debug, Clone, PartialEq)]
pub enum GuesserError {
    /// Invalid construction / configuration parameters.
    Configuration { field: &'static str, message: String },
    /// A reward vector whose length does not match the action space.
    ShapeMismatch { expected: usize, received: usize },
    /// A guess that lies outside the declared action space.
    ActionOutOfRange { action: i64, min: i64, max: i64 },
    /// A zero-length batch (sampling or evaluation).
    EmptyBatch,
    /// NaN or infinite entry in a reward vector.
    NonFiniteReward { index: usize, value: f64 },
    /// The weighted sampler rejected the current policy.
    DegeneratePolicy { reason: String },
}

impl GuesserError {
    pub(crate) fn config(field: &'static str, message: impl Into<String>) -> Self {
        GuesserError::Configuration {
            field,
            message: message.into(),
        }
    }

    /// True for errors raised at construction / validation time.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GuesserError::Configuration { .. })
    }
}

impl fmt::Display for GuesserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuesserError::Configuration { field, message } => {
                write!(f, "invalid configuration for '{field}': {message}")
            }
            GuesserError::ShapeMismatch { expected, received } => write!(
                f,
                "reward vector must have length {expected} but received {received}"
            ),
            GuesserError::ActionOutOfRange { action, min, max } => {
                write!(f, "action {action} lies outside the action space [{min}, {max}]")
            }
            GuesserError::EmptyBatch => write!(f, "batch must contain at least one guess"),
            GuesserError::NonFiniteReward { index, value } => {
                write!(f, "reward vector entry {index} is not finite ({value})")
            }
            GuesserError::DegeneratePolicy { reason } => {
                write!(f, "policy cannot be sampled: {reason}")
            }
        }
    }
}

impl std::error::Error for GuesserError {}

/// Convenient result alias for the guesser core.
pub type GuesserResult<T> = Result<T, GuesserError>;
