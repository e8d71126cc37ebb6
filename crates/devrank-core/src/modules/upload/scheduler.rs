use devrank_types::models::UploadConfig;
use devrank_types::DeviceContext;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::guard::InFlightGuard;
use super::types::{UploadHandle, UploadOutcome, UploadTrigger};
use crate::modules::collector::DataCollector;
use crate::modules::kv::{KeyValueStore, LAST_UPLOAD_TIME};
use crate::modules::readiness::{ReadinessGate, ReadinessVerdict};
use crate::modules::repository::LeaderboardStore;
use crate::utils::clock::Clock;

struct SchedulerInner {
    ctx: DeviceContext,
    collector: DataCollector,
    gate: ReadinessGate,
    store: Arc<dyn LeaderboardStore>,
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: UploadConfig,
    in_flight: Arc<AtomicBool>,
}

/// Decides when to publish this device's entry and publishes it.
///
/// Cheap to clone; clones share ports and the single-flight slot.
#[derive(Clone)]
pub struct UploadScheduler {
    inner: Arc<SchedulerInner>,
}

impl UploadScheduler {
    pub fn new(
        ctx: DeviceContext,
        collector: DataCollector,
        gate: ReadinessGate,
        store: Arc<dyn LeaderboardStore>,
        kv: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: UploadConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                ctx,
                collector,
                gate,
                store,
                kv,
                clock,
                config,
                in_flight: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    /// Epoch millis of the last successful upload, 0 if none.
    pub async fn last_upload_time(&self) -> i64 {
        match self.inner.kv.get_i64(LAST_UPLOAD_TIME).await {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                tracing::warn!("[Upload] Failed to read throttle state: {}", e);
                0
            },
        }
    }

    pub async fn is_first_upload(&self) -> bool {
        self.last_upload_time().await == 0
    }

    pub async fn should_upload(&self) -> bool {
        self.throttle_remaining_secs().await.is_none()
    }

    /// Seconds until the throttle opens, `None` when it already is.
    async fn throttle_remaining_secs(&self) -> Option<u64> {
        let last = self.last_upload_time().await;
        if last == 0 {
            return None;
        }
        let interval_ms =
            i64::try_from(self.inner.config.throttle_interval_secs.saturating_mul(1000))
                .unwrap_or(i64::MAX);
        let elapsed_ms = self.inner.clock.now_millis().saturating_sub(last);
        if elapsed_ms >= interval_ms {
            return None;
        }
        let remaining_ms = interval_ms.saturating_sub(elapsed_ms);
        Some(u64::try_from(remaining_ms).unwrap_or(0).div_ceil(1000))
    }

    pub fn after_health_scan(&self) -> UploadHandle {
        self.spawn(UploadTrigger::HealthScan)
    }

    pub fn after_power_test(&self) -> UploadHandle {
        self.spawn(UploadTrigger::PowerTest)
    }

    pub fn after_cpu_test(&self) -> UploadHandle {
        self.spawn(UploadTrigger::CpuTest)
    }

    pub fn after_camera_test(&self) -> UploadHandle {
        self.spawn(UploadTrigger::CameraTest)
    }

    pub fn after_display_test(&self) -> UploadHandle {
        self.spawn(UploadTrigger::DisplayTest)
    }

    pub fn on_app_start(&self) -> UploadHandle {
        self.spawn(UploadTrigger::AppStart)
    }

    pub fn daily_background(&self) -> UploadHandle {
        self.spawn(UploadTrigger::DailyBackground)
    }

    /// Upload now regardless of the throttle. The readiness gate still applies.
    pub fn force_upload(&self) -> UploadHandle {
        self.spawn(UploadTrigger::Force)
    }

    /// Run `trigger` on a background task.
    pub fn spawn(&self, trigger: UploadTrigger) -> UploadHandle {
        let scheduler = self.clone();
        UploadHandle::new(tokio::spawn(async move { scheduler.run(trigger).await }))
    }

    /// Run one upload pass on the current task.
    pub async fn run(&self, trigger: UploadTrigger) -> UploadOutcome {
        let _slot = if self.inner.config.single_flight {
            match InFlightGuard::try_acquire(&self.inner.in_flight) {
                Some(slot) => Some(slot),
                None => {
                    tracing::info!("[Upload] {}: skipped, another upload is in flight", trigger);
                    return UploadOutcome::InFlight;
                },
            }
        } else {
            None
        };

        if !trigger.bypasses_throttle() {
            if let Some(retry_in_secs) = self.throttle_remaining_secs().await {
                tracing::debug!("[Upload] {}: throttled for {}s", trigger, retry_in_secs);
                return UploadOutcome::Throttled { retry_in_secs };
            }
        }

        let is_first_upload = self.is_first_upload().await;
        let inner = &self.inner;
        let readiness = if trigger.uses_polling_gate() {
            inner.gate.wait_for_ready(&inner.collector, &inner.ctx, is_first_upload).await
        } else {
            inner.gate.check_once(&inner.collector, &inner.ctx, is_first_upload).await
        };

        if let ReadinessVerdict::NotReady(reason) = readiness.verdict {
            tracing::info!("[Upload] {}: entry not ready ({}), skipping", trigger, reason);
            return UploadOutcome::NotReady { reason };
        }

        let entry = readiness.entry;
        match inner.store.append_entry(&entry).await {
            Ok(document_id) => {
                let now = inner.clock.now_millis();
                if let Err(e) = inner.kv.set_i64(LAST_UPLOAD_TIME, now).await {
                    tracing::warn!("[Upload] {}: uploaded but failed to persist throttle: {}", trigger, e);
                }
                tracing::info!(
                    "[Upload] {}: uploaded {} as {} ({} categories)",
                    trigger,
                    entry.normalized_device_id,
                    document_id,
                    entry.scores.len()
                );
                UploadOutcome::Uploaded { document_id, entry }
            },
            Err(e) => {
                tracing::warn!("[Upload] {}: store rejected upload: {}", trigger, e);
                UploadOutcome::Failed { message: e.to_string(), retryable: e.is_transient() }
            },
        }
    }
}
