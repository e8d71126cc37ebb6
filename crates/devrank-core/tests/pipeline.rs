#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "integration test, panics are the assertion mechanism")]

use devrank_core::{
    BestDevicesAggregator, DataCollector, FpsSampler, HttpDocumentStore, JsonFileKvStore,
    KeyValueStore, LeaderboardStore, ManualClock, MemoryLeaderboardStore, ReadinessGate,
    StaticMetricSource, UploadOutcome, UploadScheduler, UploadTrigger,
};
use devrank_types::models::{
    CameraTest, CpuBenchmarkRun, FpsConfig, HealthSnapshot, PowerAggregate, PowerTrendDirection,
    QueryConfig, ReadinessConfig, UploadConfig,
};
use devrank_types::{Category, DeviceContext, MetricSnapshot, RawDeviceInfo};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOW: i64 = 1_700_000_000_000;

fn galaxy(model: &str, user_id: &str) -> DeviceContext {
    DeviceContext {
        user_id: user_id.to_string(),
        device: RawDeviceInfo {
            model: model.to_string(),
            brand: "samsung".to_string(),
            manufacturer: "samsung".to_string(),
            fingerprint: format!("samsung/dm3q{}/dm3q:14/UP1A/1:user/release-keys", user_id),
            os_version: "14".to_string(),
        },
    }
}

fn snapshot(watts: f64) -> MetricSnapshot {
    MetricSnapshot {
        power: Some(PowerAggregate {
            avg_power_watts: watts,
            trend: PowerTrendDirection::Decreasing,
            improvement_percent: 4.0,
            components: [("cpu".to_string(), 2.0), ("display".to_string(), 2.0)].into(),
            sample_count: 12,
            measured_at: None,
        }),
        cpu_benchmarks: vec![CpuBenchmarkRun {
            utilization_percent: 40.0,
            delta_power_watts: 8.0,
            measured_at: None,
        }],
        camera_tests: vec![CameraTest { energy_joules: 4.0, photos: 8, measured_at: None }],
        health: Some(HealthSnapshot {
            current_score: 7.5,
            streak_days: 3,
            total_scans: 12,
            measured_at: None,
        }),
        ..MetricSnapshot::default()
    }
}

fn scheduler(
    ctx: DeviceContext,
    snapshot: MetricSnapshot,
    store: Arc<dyn LeaderboardStore>,
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<ManualClock>,
) -> UploadScheduler {
    let fps = FpsSampler::new(kv.clone(), clock.clone(), FpsConfig::default());
    let collector = DataCollector::new(Arc::new(StaticMetricSource::new(snapshot)), fps, clock.clone());
    let gate = ReadinessGate::new(ReadinessConfig::default(), clock.clone());
    UploadScheduler::new(ctx, collector, gate, store, kv, clock, UploadConfig::default())
}

#[tokio::test]
async fn test_regional_variants_rank_as_one_device() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(ManualClock::new(NOW));
    let store = Arc::new(MemoryLeaderboardStore::new());

    let uploads = [
        (galaxy("SM-S918B", "eu"), snapshot(3.0)),
        (galaxy("SM-S918U", "us"), snapshot(5.0)),
    ];
    for (ctx, snapshot) in uploads {
        let kv = Arc::new(JsonFileKvStore::new(dir.path().join(format!("{}.json", ctx.user_id))));
        let scheduler = scheduler(ctx, snapshot, store.clone(), kv, clock.clone());
        let outcome = scheduler.after_health_scan().await;
        assert!(outcome.is_uploaded(), "got {}", outcome);
    }
    assert_eq!(store.len(), 2);

    let aggregator = BestDevicesAggregator::new(store, QueryConfig::default());
    let ranked = aggregator.best_devices(Category::PowerEfficiency, 10).await;

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].normalized_device_id, "samsung_sm_s918");
    assert_eq!(ranked[0].user_count, 2);
    // 3 W -> 70 + 10 + 5 = 85, 5 W -> 50 + 10 + 5 = 65
    assert_eq!(ranked[0].avg_score, 75.0);
    assert_eq!(ranked[0].top_score, 85.0);
}

#[tokio::test]
async fn test_throttle_state_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(ManualClock::new(NOW));
    let store = Arc::new(MemoryLeaderboardStore::new());
    let state_file = dir.path().join("local_state.json");

    let first = scheduler(
        galaxy("SM-S918B", "eu"),
        snapshot(3.0),
        store.clone(),
        Arc::new(JsonFileKvStore::new(&state_file)),
        clock.clone(),
    );
    assert!(first.on_app_start().await.is_uploaded());

    // New process, same state file
    clock.advance_secs(600);
    let restarted = scheduler(
        galaxy("SM-S918B", "eu"),
        snapshot(3.0),
        store.clone(),
        Arc::new(JsonFileKvStore::new(&state_file)),
        clock.clone(),
    );
    assert!(!restarted.is_first_upload().await);
    assert!(matches!(
        restarted.run(UploadTrigger::PowerTest).await,
        UploadOutcome::Throttled { retry_in_secs: 3000 }
    ));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_upload_to_http_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/collections/leaderboard_entries/documents"))
        .and(body_partial_json(serde_json::json!({
            "normalizedDeviceId": "samsung_sm_s918",
            "userId": "eu"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "doc-42"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpDocumentStore::new(reqwest::Client::new(), &server.uri(), "leaderboard_entries")
        .expect("store url");
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(ManualClock::new(NOW));
    let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileKvStore::in_dir(dir.path()));
    let scheduler = scheduler(galaxy("SM-S918B", "eu"), snapshot(3.0), Arc::new(store), kv.clone(), clock);

    match scheduler.force_upload().await {
        UploadOutcome::Uploaded { document_id, .. } => assert_eq!(document_id, "doc-42"),
        other => panic!("unexpected outcome: {}", other),
    }
    assert_eq!(kv.get_i64("last_upload_time").await.expect("kv read"), Some(NOW));
}

#[tokio::test]
async fn test_http_store_outage_leaves_throttle_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let store = HttpDocumentStore::new(reqwest::Client::new(), &server.uri(), "leaderboard_entries")
        .expect("store url");
    let clock = Arc::new(ManualClock::new(NOW));
    let kv: Arc<dyn KeyValueStore> = Arc::new(devrank_core::MemoryKvStore::new());
    let scheduler = scheduler(galaxy("SM-S918B", "eu"), snapshot(3.0), Arc::new(store), kv, clock);

    assert!(matches!(
        scheduler.after_cpu_test().await,
        UploadOutcome::Failed { retryable: true, .. }
    ));
    assert!(scheduler.should_upload().await);
}

#[tokio::test]
async fn test_http_store_rejection_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let store = HttpDocumentStore::new(reqwest::Client::new(), &server.uri(), "leaderboard_entries")
        .expect("store url");
    let clock = Arc::new(ManualClock::new(NOW));
    let kv: Arc<dyn KeyValueStore> = Arc::new(devrank_core::MemoryKvStore::new());
    let scheduler = scheduler(galaxy("SM-S918B", "eu"), snapshot(3.0), Arc::new(store), kv, clock);

    match scheduler.force_upload().await {
        UploadOutcome::Failed { message, retryable } => {
            assert!(!retryable);
            assert!(message.contains("403"), "got {}", message);
        },
        other => panic!("unexpected outcome: {}", other),
    }
}
