//! Remote document store errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by a leaderboard store backend.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum StoreError {
    /// Store could not be reached (network down, timeout, connection refused)
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Description of the transport failure
        message: String,
    },

    /// Store answered but refused the operation
    #[error("Store rejected request ({status}): {message}")]
    Rejected {
        /// Status code reported by the store
        status: u16,
        /// Body or reason returned with the rejection
        message: String,
    },

    /// Document could not be encoded or decoded
    #[error("Store serialization error: {message}")]
    Serialization {
        /// Description of the codec failure
        message: String,
    },

    /// Requested document or collection does not exist
    #[error("Not found: {what}")]
    NotFound {
        /// Identifier of the missing resource
        what: String,
    },
}

impl StoreError {
    /// Whether a later trigger may succeed without any change on our side.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Serialization { .. } | Self::NotFound { .. } => false,
        }
    }

    /// Create a serialization error from a serde_json error.
    pub fn from_json_error(e: &serde_json::Error) -> Self {
        Self::Serialization { message: e.to_string() }
    }
}
