//! # devrank Types
//!
//! Core types, models, and error definitions for the devrank leaderboard pipeline.
//!
//! - **`error`** - Typed error hierarchy for configuration, collection, and the remote store
//! - **`models`** - Domain models (devices, metric inputs, categories, entries, rankings, config)
//!
//! ## Architecture Role
//!
//! `devrank-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          devrank-types (this crate)
//!                  │
//!                  ▼
//!            devrank-core
//!                  │
//!                  ▼
//!             devrank-cli
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde, with field names stable on the wire
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{CollectionError, ConfigError, StoreError};

// Re-export core model types
pub use models::{
    BestDeviceEntry, Category, CategoryInputs, CategoryScore, DeviceContext, DeviceInsight,
    DeviceScoreRecord, FpsSample, LeaderboardConfig, LeaderboardEntry, MetricSnapshot, NormalizedDevice,
    RawDeviceInfo,
};
