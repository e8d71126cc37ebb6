//! # devrank Core
//!
//! Leaderboard scoring and submission pipeline.
//!
//! ```text
//! RawDeviceInfo ──► normalizer ──┐
//!                                ├──► collector ──► LeaderboardEntry
//! MetricSource + FpsSampler ─────┘        │  (scoring per category)
//!                                         ▼
//!                                    readiness gate
//!                                         │
//!                                         ▼
//!                         upload scheduler (throttle via KeyValueStore)
//!                                         │
//!                                         ▼
//!                                 LeaderboardStore ──► aggregator ──► rankings
//! ```
//!
//! Every port (local key-value state, remote store, metric sources, clock)
//! is a trait object injected at construction, so the whole pipeline runs
//! against in-memory fakes in tests.

#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::float_cmp,
        clippy::unwrap_used,
        clippy::expect_used
    )
)]

pub mod error;
pub mod modules;
pub mod utils;

// Re-export commonly used types
pub use error::{AppError, AppResult};
pub use modules::aggregator::BestDevicesAggregator;
pub use modules::collector::{
    DataCollector, FpsSampler, MetricSource, RenderLoop, RenderLoopHandle, StaticMetricSource,
};
pub use modules::kv::{JsonFileKvStore, KeyValueStore, MemoryKvStore};
pub use modules::normalizer::{normalize, normalize_raw};
pub use modules::readiness::{NotReadyReason, ReadinessGate, ReadinessOutcome, ReadinessVerdict};
pub use modules::repository::{
    HttpDocumentStore, JsonFileLeaderboardStore, LeaderboardStore, MemoryLeaderboardStore,
    StoreResult,
};
pub use modules::upload::{UploadHandle, UploadOutcome, UploadScheduler, UploadTrigger};
pub use utils::clock::{Clock, ManualClock, SystemClock};
