//! Upstream measurement subsystems as seen by the collector.

use async_trait::async_trait;
use devrank_types::models::{
    CameraTest, CpuBenchmarkRun, DisplaySweepPoint, HealthSnapshot, PowerAggregate, ThermalReading,
};
use devrank_types::MetricSnapshot;
use parking_lot::RwLock;

use crate::error::AppResult;

/// Latest cached output of each measurement subsystem.
///
/// Implementations return what is already computed; they must not start a
/// new measurement. An `Err` means the subsystem could not be read at all
/// (missing permission, absent sensor) and is treated as "no data".
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn power_aggregate(&self) -> AppResult<Option<PowerAggregate>>;
    async fn cpu_benchmarks(&self) -> AppResult<Vec<CpuBenchmarkRun>>;
    async fn camera_tests(&self) -> AppResult<Vec<CameraTest>>;
    async fn display_sweep(&self) -> AppResult<Vec<DisplaySweepPoint>>;
    async fn health_score(&self) -> AppResult<Option<HealthSnapshot>>;
    async fn thermal_reading(&self) -> AppResult<Option<ThermalReading>>;
}

/// Serves a fixed snapshot. `update` swaps it, e.g. when a test finishes.
#[derive(Default)]
pub struct StaticMetricSource {
    snapshot: RwLock<MetricSnapshot>,
}

impl StaticMetricSource {
    pub fn new(snapshot: MetricSnapshot) -> Self {
        Self { snapshot: RwLock::new(snapshot) }
    }

    pub fn update(&self, snapshot: MetricSnapshot) {
        *self.snapshot.write() = snapshot;
    }
}

#[async_trait]
impl MetricSource for StaticMetricSource {
    async fn power_aggregate(&self) -> AppResult<Option<PowerAggregate>> {
        Ok(self.snapshot.read().power.clone())
    }

    async fn cpu_benchmarks(&self) -> AppResult<Vec<CpuBenchmarkRun>> {
        Ok(self.snapshot.read().cpu_benchmarks.clone())
    }

    async fn camera_tests(&self) -> AppResult<Vec<CameraTest>> {
        Ok(self.snapshot.read().camera_tests.clone())
    }

    async fn display_sweep(&self) -> AppResult<Vec<DisplaySweepPoint>> {
        Ok(self.snapshot.read().display_sweep.clone())
    }

    async fn health_score(&self) -> AppResult<Option<HealthSnapshot>> {
        Ok(self.snapshot.read().health.clone())
    }

    async fn thermal_reading(&self) -> AppResult<Option<ThermalReading>> {
        Ok(self.snapshot.read().thermal.clone())
    }
}
