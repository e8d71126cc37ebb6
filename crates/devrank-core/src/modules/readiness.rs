//! Readiness gate: decides whether an entry is complete enough to publish.
//!
//! Strictness depends on whether this device has uploaded before. A device
//! that never uploaded is admitted with weaker evidence so new models can
//! appear on the board at all.

use devrank_types::models::ReadinessConfig;
use devrank_types::{DeviceContext, LeaderboardEntry};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::modules::collector::DataCollector;
use crate::utils::clock::Clock;

/// Hard ceiling on one polling wait, whatever the config says.
const MAX_WAIT: Duration = Duration::from_secs(24 * 3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NotReadyReason {
    InsufficientQuality { have: u8, need: u8 },
    AllScoresZero,
    TooFewCategories { have: usize, need: usize },
    Stale { age_secs: i64 },
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientQuality { have, need } => {
                write!(f, "data quality {} below {}", have, need)
            },
            Self::AllScoresZero => write!(f, "all category scores are zero"),
            Self::TooFewCategories { have, need } => {
                write!(f, "{} non-zero categories, need {}", have, need)
            },
            Self::Stale { age_secs } => write!(f, "entry is {}s old", age_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ReadinessVerdict {
    Ready,
    NotReady(NotReadyReason),
}

impl ReadinessVerdict {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Result of a gated collection: the last entry collected and its verdict.
#[derive(Debug, Clone)]
pub struct ReadinessOutcome {
    pub verdict: ReadinessVerdict,
    pub entry: LeaderboardEntry,
    pub attempts: u32,
}

impl ReadinessOutcome {
    pub fn is_ready(&self) -> bool {
        self.verdict.is_ready()
    }
}

pub struct ReadinessGate {
    config: ReadinessConfig,
    clock: Arc<dyn Clock>,
}

impl ReadinessGate {
    pub fn new(config: ReadinessConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Evaluate one entry. Checks run in order: quality, all-zero, category
    /// count, staleness; the first failure is reported.
    pub fn check(&self, entry: &LeaderboardEntry, is_first_upload: bool) -> ReadinessVerdict {
        let (min_quality, min_categories) = if is_first_upload {
            (self.config.first_upload_min_quality, self.config.first_upload_min_categories)
        } else {
            (self.config.min_quality, self.config.min_categories)
        };

        if entry.data_quality < min_quality {
            return ReadinessVerdict::NotReady(NotReadyReason::InsufficientQuality {
                have: entry.data_quality,
                need: min_quality,
            });
        }

        let nonzero = entry.nonzero_category_count();
        if nonzero == 0 {
            return ReadinessVerdict::NotReady(NotReadyReason::AllScoresZero);
        }
        if nonzero < min_categories {
            return ReadinessVerdict::NotReady(NotReadyReason::TooFewCategories {
                have: nonzero,
                need: min_categories,
            });
        }

        let age_ms = self.clock.now_millis().saturating_sub(entry.timestamp);
        let max_age_ms = i64::try_from(self.config.max_entry_age_secs.saturating_mul(1000))
            .unwrap_or(i64::MAX);
        if age_ms > max_age_ms {
            return ReadinessVerdict::NotReady(NotReadyReason::Stale { age_secs: age_ms / 1000 });
        }

        ReadinessVerdict::Ready
    }

    pub fn is_ready(&self, entry: &LeaderboardEntry, is_first_upload: bool) -> bool {
        self.check(entry, is_first_upload).is_ready()
    }

    /// Collect once and check once.
    pub async fn check_once(
        &self,
        collector: &DataCollector,
        ctx: &DeviceContext,
        is_first_upload: bool,
    ) -> ReadinessOutcome {
        let entry = collector.collect(ctx).await;
        let verdict = self.check(&entry, is_first_upload);
        log_verdict(&verdict, 1);
        ReadinessOutcome { verdict, entry, attempts: 1 }
    }

    /// Re-collect and re-check every poll interval until the entry passes or
    /// the wait budget runs out. The check at the deadline is final.
    ///
    /// Dropping the returned future cancels the wait.
    pub async fn wait_for_ready(
        &self,
        collector: &DataCollector,
        ctx: &DeviceContext,
        is_first_upload: bool,
    ) -> ReadinessOutcome {
        let budget = Duration::from_millis(self.config.max_wait_ms).min(MAX_WAIT);
        let poll = Duration::from_millis(self.config.poll_interval_ms).min(budget);
        let deadline = Instant::now() + budget;
        let mut attempts = 0u32;

        loop {
            let entry = collector.collect(ctx).await;
            attempts += 1;
            let verdict = self.check(&entry, is_first_upload);

            if verdict.is_ready() || Instant::now() >= deadline {
                log_verdict(&verdict, attempts);
                return ReadinessOutcome { verdict, entry, attempts };
            }

            if let ReadinessVerdict::NotReady(reason) = verdict {
                tracing::debug!("[Readiness] Attempt {} not ready: {}", attempts, reason);
            }
            tokio::time::sleep_until((Instant::now() + poll).min(deadline)).await;
        }
    }
}

fn log_verdict(verdict: &ReadinessVerdict, attempts: u32) {
    match verdict {
        ReadinessVerdict::Ready => {
            tracing::info!("[Readiness] Entry ready after {} attempt(s)", attempts)
        },
        ReadinessVerdict::NotReady(reason) => {
            tracing::info!("[Readiness] Entry not ready after {} attempt(s): {}", attempts, reason)
        },
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod readiness_tests;
