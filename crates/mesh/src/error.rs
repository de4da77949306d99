//! Error types for SignalMesh network values and diagnostics.
//!
//! Network operations themselves never fail: skipping unloaded positions and
//! closed directions is policy, not error. These errors cover building
//! values from untrusted input and exporting diagnostics.

use thiserror::Error;

/// Errors that can occur when constructing or exporting mesh values.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Signal strength outside `0..=MAX_STRENGTH`
    #[error("Signal strength {strength} exceeds maximum {max}")]
    StrengthOutOfRange {
        /// Requested strength
        strength: u32,
        /// Largest accepted strength
        max: u8,
    },

    /// Channel name not recognised
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
