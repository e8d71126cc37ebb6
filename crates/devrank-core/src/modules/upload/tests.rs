use super::*;
use crate::modules::collector::{DataCollector, FpsSampler, StaticMetricSource};
use crate::modules::kv::{KeyValueStore, MemoryKvStore, LAST_UPLOAD_TIME};
use crate::modules::readiness::{NotReadyReason, ReadinessGate};
use crate::modules::repository::{LeaderboardStore, MemoryLeaderboardStore, StoreResult};
use crate::utils::clock::ManualClock;
use async_trait::async_trait;
use devrank_types::models::{
    CpuBenchmarkRun, FpsConfig, PowerAggregate, PowerTrendDirection, ReadinessConfig, UploadConfig,
};
use devrank_types::{
    Category, DeviceContext, DeviceScoreRecord, LeaderboardEntry, MetricSnapshot, RawDeviceInfo,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Notify;

const NOW: i64 = 1_700_000_000_000;

fn ready_snapshot() -> MetricSnapshot {
    MetricSnapshot {
        power: Some(PowerAggregate {
            avg_power_watts: 5.0,
            trend: PowerTrendDirection::Stable,
            improvement_percent: 2.0,
            components: BTreeMap::new(),
            sample_count: 4,
            measured_at: None,
        }),
        cpu_benchmarks: vec![CpuBenchmarkRun {
            utilization_percent: 40.0,
            delta_power_watts: 8.0,
            measured_at: None,
        }],
        ..MetricSnapshot::default()
    }
}

fn ctx() -> DeviceContext {
    DeviceContext {
        user_id: "user-1".to_string(),
        device: RawDeviceInfo {
            model: "Pixel 7".to_string(),
            brand: "google".to_string(),
            manufacturer: "Google".to_string(),
            fingerprint: "google/panther/panther:14/UQ1A/10:user/release-keys".to_string(),
            os_version: "14".to_string(),
        },
    }
}

struct Harness {
    scheduler: UploadScheduler,
    source: Arc<StaticMetricSource>,
    store: Arc<MemoryLeaderboardStore>,
    kv: Arc<MemoryKvStore>,
    clock: Arc<ManualClock>,
}

fn harness_with(snapshot: MetricSnapshot, store: Arc<dyn LeaderboardStore>) -> UploadScheduler {
    let clock = Arc::new(ManualClock::new(NOW));
    let kv = Arc::new(MemoryKvStore::new());
    build(Arc::new(StaticMetricSource::new(snapshot)), store, kv, clock)
}

fn build(
    source: Arc<StaticMetricSource>,
    store: Arc<dyn LeaderboardStore>,
    kv: Arc<MemoryKvStore>,
    clock: Arc<ManualClock>,
) -> UploadScheduler {
    let fps = FpsSampler::new(kv.clone(), clock.clone(), FpsConfig::default());
    let collector = DataCollector::new(source, fps, clock.clone());
    let readiness =
        ReadinessConfig { max_wait_ms: 200, poll_interval_ms: 5, ..ReadinessConfig::default() };
    let gate = ReadinessGate::new(readiness, clock.clone());
    UploadScheduler::new(ctx(), collector, gate, store, kv, clock, UploadConfig::default())
}

fn harness(snapshot: MetricSnapshot) -> Harness {
    let source = Arc::new(StaticMetricSource::new(snapshot));
    let store = Arc::new(MemoryLeaderboardStore::new());
    let kv = Arc::new(MemoryKvStore::new());
    let clock = Arc::new(ManualClock::new(NOW));
    let scheduler = build(source.clone(), store.clone(), kv.clone(), clock.clone());
    Harness { scheduler, source, store, kv, clock }
}

#[tokio::test]
async fn test_first_upload_and_throttle_window() {
    let h = harness(ready_snapshot());
    assert!(h.scheduler.should_upload().await);
    assert!(h.scheduler.is_first_upload().await);

    let outcome = h.scheduler.after_health_scan().await;
    assert!(outcome.is_uploaded(), "got {}", outcome);
    assert_eq!(h.store.len(), 1);
    assert_eq!(h.kv.get_i64(LAST_UPLOAD_TIME).await.unwrap(), Some(NOW));
    assert!(!h.scheduler.is_first_upload().await);
    assert!(!h.scheduler.should_upload().await);

    h.clock.advance_secs(3599);
    assert!(!h.scheduler.should_upload().await);
    assert!(matches!(
        h.scheduler.after_cpu_test().await,
        UploadOutcome::Throttled { retry_in_secs: 1 }
    ));

    h.clock.advance_secs(1);
    assert!(h.scheduler.should_upload().await);
    assert!(h.scheduler.after_power_test().await.is_uploaded());
    assert_eq!(h.store.len(), 2);
}

#[tokio::test]
async fn test_uploaded_entry_matches_device() {
    let h = harness(ready_snapshot());

    let UploadOutcome::Uploaded { entry, .. } = h.scheduler.run(UploadTrigger::CameraTest).await
    else {
        panic!("expected upload");
    };
    assert_eq!(entry.normalized_device_id, "google_pixel_7");
    assert_eq!(entry.hardware_id, "google_panther");
    assert_eq!(entry.timestamp, NOW);
    assert_eq!(h.store.entries(), vec![entry]);
}

#[tokio::test]
async fn test_store_failure_keeps_throttle_open() {
    let h = harness(ready_snapshot());
    h.store.set_available(false);

    let outcome = h.scheduler.after_display_test().await;
    assert!(matches!(outcome, UploadOutcome::Failed { retryable: true, .. }));
    assert_eq!(h.kv.get_i64(LAST_UPLOAD_TIME).await.unwrap(), None);
    assert!(h.scheduler.should_upload().await);

    h.store.set_available(true);
    assert!(h.scheduler.after_display_test().await.is_uploaded());
}

#[tokio::test]
async fn test_not_ready_keeps_throttle_open() {
    let h = harness(MetricSnapshot::default());

    let outcome = h.scheduler.after_health_scan().await;
    assert!(matches!(
        outcome,
        UploadOutcome::NotReady { reason: NotReadyReason::InsufficientQuality { have: 0, need: 1 } }
    ));
    assert!(h.store.is_empty());
    assert!(h.scheduler.is_first_upload().await);
}

#[tokio::test]
async fn test_returning_device_held_to_stricter_bar() {
    let h = harness(MetricSnapshot {
        cpu_benchmarks: ready_snapshot().cpu_benchmarks,
        ..MetricSnapshot::default()
    });
    // Quality 1 with one category: enough only for a first upload
    h.kv.set_i64(LAST_UPLOAD_TIME, NOW - 7_200_000).await.unwrap();

    let outcome = h.scheduler.after_cpu_test().await;
    assert!(matches!(
        outcome,
        UploadOutcome::NotReady { reason: NotReadyReason::InsufficientQuality { have: 1, need: 2 } }
    ));

    h.kv.remove(LAST_UPLOAD_TIME).await.unwrap();
    assert!(h.scheduler.after_cpu_test().await.is_uploaded());
}

#[tokio::test]
async fn test_force_upload_bypasses_throttle() {
    let h = harness(ready_snapshot());
    assert!(h.scheduler.after_health_scan().await.is_uploaded());
    assert!(!h.scheduler.should_upload().await);

    h.clock.advance_secs(60);
    let outcome = h.scheduler.force_upload().await;
    assert!(outcome.is_uploaded());
    assert_eq!(h.store.len(), 2);
    assert_eq!(h.kv.get_i64(LAST_UPLOAD_TIME).await.unwrap(), Some(NOW + 60_000));
}

#[tokio::test]
async fn test_force_upload_still_gated() {
    let h = harness(MetricSnapshot::default());
    assert!(matches!(h.scheduler.force_upload().await, UploadOutcome::NotReady { .. }));
}

#[tokio::test]
async fn test_app_start_waits_for_data() {
    let h = harness(MetricSnapshot::default());
    let source = h.source.clone();
    let handle = h.scheduler.on_app_start();

    tokio::time::sleep(std::time::Duration::from_millis(15)).await;
    source.update(ready_snapshot());

    assert!(handle.await.is_uploaded());
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn test_daily_background_times_out() {
    let h = harness(MetricSnapshot::default());
    let outcome = h.scheduler.daily_background().await;
    assert!(matches!(outcome, UploadOutcome::NotReady { .. }));
}

/// Holds every append until released.
struct BlockingStore {
    inner: MemoryLeaderboardStore,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl LeaderboardStore for BlockingStore {
    async fn append_entry(&self, entry: &LeaderboardEntry) -> StoreResult<String> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.append_entry(entry).await
    }

    async fn fetch_category(
        &self,
        category: Category,
        limit: usize,
    ) -> StoreResult<Vec<DeviceScoreRecord>> {
        self.inner.fetch_category(category, limit).await
    }

    async fn fetch_device_entries(
        &self,
        normalized_device_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        self.inner.fetch_device_entries(normalized_device_id, limit).await
    }
}

#[tokio::test]
async fn test_concurrent_trigger_reports_in_flight() {
    let store = Arc::new(BlockingStore {
        inner: MemoryLeaderboardStore::new(),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let scheduler = harness_with(ready_snapshot(), store.clone());

    let first = scheduler.after_health_scan();
    store.entered.notified().await;

    assert!(matches!(scheduler.run(UploadTrigger::Force).await, UploadOutcome::InFlight));

    store.release.notify_one();
    assert!(first.await.is_uploaded());
    assert_eq!(store.inner.len(), 1);
}

#[tokio::test]
async fn test_single_flight_released_after_abort() {
    let store = Arc::new(BlockingStore {
        inner: MemoryLeaderboardStore::new(),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let scheduler = harness_with(ready_snapshot(), store.clone());

    let first = scheduler.force_upload();
    store.entered.notified().await;
    first.abort();
    assert!(matches!(first.await, UploadOutcome::Failed { retryable: true, .. }));

    store.release.notify_one();
    assert!(scheduler.force_upload().await.is_uploaded());
}

#[test]
fn test_trigger_gate_selection() {
    for trigger in UploadTrigger::ALL {
        assert_eq!(
            trigger.uses_polling_gate(),
            matches!(trigger, UploadTrigger::AppStart | UploadTrigger::DailyBackground)
        );
        assert_eq!(trigger.bypasses_throttle(), trigger == UploadTrigger::Force);
    }
}
