//! Assembles a [`LeaderboardEntry`] from the measurement subsystems.
//!
//! The collector reads what is already measured; it never starts a test.

mod fps;
mod source;

pub use fps::{FpsSampler, RenderLoop, RenderLoopHandle};
pub use source::{MetricSource, StaticMetricSource};

use devrank_types::{CategoryScore, DeviceContext, LeaderboardEntry, MetricSnapshot};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::AppResult;
use crate::modules::{normalizer, scoring};
use crate::utils::clock::Clock;

pub struct DataCollector {
    source: Arc<dyn MetricSource>,
    fps: FpsSampler,
    clock: Arc<dyn Clock>,
}

/// Missing subsystem data is "no data", never a collection failure.
fn or_absent<T: Default>(subsystem: &str, result: AppResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("[Collector] {} unavailable: {}", subsystem, e);
        T::default()
    })
}

impl DataCollector {
    pub fn new(source: Arc<dyn MetricSource>, fps: FpsSampler, clock: Arc<dyn Clock>) -> Self {
        Self { source, fps, clock }
    }

    /// Read every subsystem concurrently into one snapshot.
    pub async fn collect_snapshot(&self) -> MetricSnapshot {
        let (power, cpu, camera, display, health, thermal, fps) = tokio::join!(
            self.source.power_aggregate(),
            self.source.cpu_benchmarks(),
            self.source.camera_tests(),
            self.source.display_sweep(),
            self.source.health_score(),
            self.source.thermal_reading(),
            self.fps.sample(),
        );

        MetricSnapshot {
            power: or_absent("power aggregate", power),
            cpu_benchmarks: or_absent("cpu benchmarks", cpu),
            camera_tests: or_absent("camera tests", camera),
            display_sweep: or_absent("display sweep", display),
            health: or_absent("health score", health),
            thermal: or_absent("thermal reading", thermal),
            fps,
        }
    }

    /// One collection pass. Always produces an entry, possibly with no scores.
    pub async fn collect(&self, ctx: &DeviceContext) -> LeaderboardEntry {
        let snapshot = self.collect_snapshot().await;
        let entry = build_entry(ctx, &snapshot, self.clock.now_millis());
        tracing::info!(
            "[Collector] Collected {} ({} categories, quality {}, {} measurements)",
            entry.normalized_device_id,
            entry.scores.len(),
            entry.data_quality,
            entry.measurement_count
        );
        entry
    }
}

/// Pure assembly of an entry from an already gathered snapshot.
pub fn build_entry(ctx: &DeviceContext, snapshot: &MetricSnapshot, now_ms: i64) -> LeaderboardEntry {
    let device = normalizer::normalize_raw(&ctx.device);

    let scores: BTreeMap<_, _> = scoring::score_all(snapshot)
        .into_iter()
        .filter_map(|(category, score)| match score {
            CategoryScore::Present { score, .. } => Some((category, score)),
            CategoryScore::Absent => None,
        })
        .collect();

    LeaderboardEntry {
        user_id: ctx.user_id.clone(),
        normalized_device_id: device.normalized_id,
        hardware_id: device.hardware_id,
        timestamp: now_ms,
        normalized_brand: device.normalized_brand,
        normalized_model: device.normalized_model,
        display_name: device.display_name,
        os_version: ctx.device.os_version.clone(),
        scores,
        data_quality: scoring::data_quality(snapshot),
        measurement_count: snapshot.measurement_count(),
        last_measurement_date: snapshot
            .latest_measurement()
            .map(|at| at.format("%Y-%m-%d").to_string()),
    }
}
