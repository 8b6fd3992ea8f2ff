//! Result type aliases for Chirp.

use crate::ChirpError;

/// A specialized `Result` type for Chirp operations.
pub type ChirpResult<T> = Result<T, ChirpError>;
