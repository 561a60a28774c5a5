//! Error types for the detection pipeline.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors surfaced by the crate.
///
/// Malformed frames are not errors: the decoder and pipeline degrade them to an
/// empty detection list. Only allocation failure escapes a per-frame cycle.
#[derive(Debug, Error)]
pub enum Error {
    /// A buffer sized by the tensor could not be allocated.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(#[from] TryReserveError),

    /// The tensor adapter could not normalise its input into a flat buffer.
    #[error("malformed tensor: {0}")]
    MalformedTensor(String),

    /// Configuration values violate a cross-field constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
