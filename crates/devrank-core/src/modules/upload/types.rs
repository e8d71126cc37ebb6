use devrank_types::LeaderboardEntry;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

use crate::modules::readiness::NotReadyReason;

/// Event that asked for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadTrigger {
    HealthScan,
    PowerTest,
    CpuTest,
    CameraTest,
    DisplayTest,
    AppStart,
    DailyBackground,
    Force,
}

impl UploadTrigger {
    pub const ALL: [UploadTrigger; 8] = [
        Self::HealthScan,
        Self::PowerTest,
        Self::CpuTest,
        Self::CameraTest,
        Self::DisplayTest,
        Self::AppStart,
        Self::DailyBackground,
        Self::Force,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HealthScan => "health_scan",
            Self::PowerTest => "power_test",
            Self::CpuTest => "cpu_test",
            Self::CameraTest => "camera_test",
            Self::DisplayTest => "display_test",
            Self::AppStart => "app_start",
            Self::DailyBackground => "daily_background",
            Self::Force => "force",
        }
    }

    pub fn bypasses_throttle(&self) -> bool {
        matches!(self, Self::Force)
    }

    /// App start and background runs can afford to wait for data to settle;
    /// user-triggered paths check once.
    pub fn uses_polling_gate(&self) -> bool {
        matches!(self, Self::AppStart | Self::DailyBackground)
    }
}

impl fmt::Display for UploadTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { document_id: String, entry: LeaderboardEntry },
    Throttled { retry_in_secs: u64 },
    NotReady { reason: NotReadyReason },
    InFlight,
    /// `retryable` is set when a later trigger may succeed unchanged.
    Failed { message: String, retryable: bool },
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploaded { document_id, .. } => write!(f, "uploaded as {}", document_id),
            Self::Throttled { retry_in_secs } => write!(f, "throttled, retry in {}s", retry_in_secs),
            Self::NotReady { reason } => write!(f, "not ready: {}", reason),
            Self::InFlight => f.write_str("another upload is in flight"),
            Self::Failed { message, retryable: true } => {
                write!(f, "failed (will retry): {}", message)
            },
            Self::Failed { message, retryable: false } => write!(f, "failed: {}", message),
        }
    }
}

/// Background upload task. Awaiting it yields the outcome; dropping it
/// detaches the task.
pub struct UploadHandle {
    task: JoinHandle<UploadOutcome>,
}

impl UploadHandle {
    pub(super) fn new(task: JoinHandle<UploadOutcome>) -> Self {
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Future for UploadHandle {
    type Output = UploadOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| {
            joined.unwrap_or_else(|e| UploadOutcome::Failed {
                message: format!("upload task ended abnormally: {}", e),
                retryable: e.is_cancelled(),
            })
        })
    }
}
