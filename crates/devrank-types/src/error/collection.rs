//! Measurement collection errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a metric source may report for one upstream subsystem.
///
/// These never abort a collection pass; the collector folds them into an
/// absent category and a lower data quality.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum CollectionError {
    /// A runtime permission needed for the measurement was not granted
    #[error("Permission missing: {permission}")]
    PermissionMissing {
        /// Name of the missing permission
        permission: String,
    },

    /// The sensor or subsystem is not present on this device
    #[error("Sensor unavailable: {sensor}")]
    SensorUnavailable {
        /// Name of the unavailable sensor
        sensor: String,
    },

    /// The upstream store returned data that could not be interpreted
    #[error("Malformed data from {source_name}: {message}")]
    Malformed {
        /// Subsystem that produced the data
        source_name: String,
        /// Description of what was wrong
        message: String,
    },

    /// The render loop did not answer an FPS sample request in time
    #[error("Render loop did not respond within {timeout_ms}ms")]
    RenderLoopTimeout {
        /// Timeout that elapsed, in milliseconds
        timeout_ms: u64,
    },
}
