//! Throttled upload of leaderboard entries.
//!
//! Every trigger follows the same template:
//!
//! ```text
//! single-flight guard ─► throttle ─► readiness gate ─► append to store
//!                                                          │
//!                                      success ◄───────────┘
//!                                         │
//!                                persist last_upload_time
//! ```
//!
//! Nothing here returns an error to the caller. Each pass ends in an
//! [`UploadOutcome`] and a log line; only a successful append moves the
//! throttle forward, so a failed pass is retried on the next trigger.

mod guard;
mod scheduler;
mod types;

#[cfg(test)]
mod tests;

pub use guard::InFlightGuard;
pub use scheduler::UploadScheduler;
pub use types::{UploadHandle, UploadOutcome, UploadTrigger};
