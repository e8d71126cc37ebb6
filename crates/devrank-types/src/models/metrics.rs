//! Measurement snapshots from upstream subsystems and the per-category
//! inputs derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::fps::FpsSample;

/// Direction of the device's average power draw over recent sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerTrendDirection {
    Decreasing,
    Stable,
    Increasing,
    #[default]
    Unknown,
}

/// Latest output of the power aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PowerAggregate {
    pub avg_power_watts: f64,
    #[serde(default)]
    pub trend: PowerTrendDirection,
    /// Change versus the previous window, positive when power went down
    #[serde(default)]
    pub improvement_percent: f64,
    /// Average draw per component (cpu, display, radio, ...) in watts
    #[serde(default)]
    pub components: BTreeMap<String, f64>,
    #[serde(default)]
    pub sample_count: u32,
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
}

impl PowerAggregate {
    /// Percentage share of each component in the total draw.
    pub fn component_shares(&self) -> Vec<f64> {
        let total: f64 = self.components.values().filter(|w| w.is_finite()).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        self.components
            .values()
            .filter(|w| w.is_finite())
            .map(|w| w / total * 100.0)
            .collect()
    }

    /// Highest single-component draw in watts.
    pub fn max_component_watts(&self) -> Option<f64> {
        self.components.values().copied().filter(|w| w.is_finite()).reduce(f64::max)
    }
}

/// One CPU benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CpuBenchmarkRun {
    pub utilization_percent: f64,
    /// Power above idle while the benchmark ran
    pub delta_power_watts: f64,
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
}

/// One camera energy test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CameraTest {
    pub energy_joules: f64,
    pub photos: u32,
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
}

/// One point of a display brightness sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DisplaySweepPoint {
    /// Brightness in percent
    pub brightness: f64,
    pub power_watts: f64,
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
}

/// Current state of the health score store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HealthSnapshot {
    /// Latest health score on a 0-10 scale
    pub current_score: f64,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub total_scans: u32,
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
}

/// Aggregate of the thermal sensors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ThermalReading {
    pub avg_temp_celsius: f64,
    #[serde(default)]
    pub sample_count: u32,
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
}

/// Everything the collector pulled from upstream for one pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MetricSnapshot {
    #[serde(default)]
    pub power: Option<PowerAggregate>,
    #[serde(default)]
    pub cpu_benchmarks: Vec<CpuBenchmarkRun>,
    #[serde(default)]
    pub camera_tests: Vec<CameraTest>,
    #[serde(default)]
    pub display_sweep: Vec<DisplaySweepPoint>,
    #[serde(default)]
    pub health: Option<HealthSnapshot>,
    #[serde(default)]
    pub thermal: Option<ThermalReading>,
    #[serde(default)]
    pub fps: Option<FpsSample>,
}

impl MetricSnapshot {
    /// Number of underlying measurements across all sources.
    pub fn measurement_count(&self) -> u32 {
        let logs = self.cpu_benchmarks.len() + self.camera_tests.len() + self.display_sweep.len();
        let logs = u32::try_from(logs).unwrap_or(u32::MAX);
        let power = self.power.as_ref().map_or(0, |p| p.sample_count);
        let thermal = self.thermal.as_ref().map_or(0, |t| t.sample_count);
        let health = self.health.as_ref().map_or(0, |h| h.total_scans);
        let fps = u32::from(self.fps.is_some());
        logs.saturating_add(power)
            .saturating_add(thermal)
            .saturating_add(health)
            .saturating_add(fps)
    }

    /// Timestamp of the newest measurement, if any carries one.
    pub fn latest_measurement(&self) -> Option<DateTime<Utc>> {
        let fps = self.fps.as_ref().and_then(|f| DateTime::from_timestamp_millis(f.timestamp));
        self.power
            .as_ref()
            .and_then(|p| p.measured_at)
            .into_iter()
            .chain(self.cpu_benchmarks.iter().filter_map(|r| r.measured_at))
            .chain(self.camera_tests.iter().filter_map(|t| t.measured_at))
            .chain(self.display_sweep.iter().filter_map(|p| p.measured_at))
            .chain(self.health.as_ref().and_then(|h| h.measured_at))
            .chain(self.thermal.as_ref().and_then(|t| t.measured_at))
            .chain(fps)
            .max()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PowerEfficiencyInputs {
    pub avg_power_watts: f64,
    pub trend: PowerTrendDirection,
    /// 1 minus the normalized std dev of component shares, in [0, 1]
    pub component_balance: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CpuPerformanceInputs {
    pub avg_utilization: f64,
    pub avg_delta_power: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraEfficiencyInputs {
    pub energy_per_photo_joules: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DisplayEfficiencyInputs {
    pub avg_brightness: f64,
    pub avg_power: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HealthScoreInputs {
    pub current_score: f64,
    pub streak_days: u32,
    pub total_scans: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PowerTrendInputs {
    pub trend: PowerTrendDirection,
    pub improvement_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ComponentOptimizationInputs {
    pub max_component_power_watts: f64,
    pub balance_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThermalEfficiencyInputs {
    pub avg_temp_celsius: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerformanceConsistencyInputs {
    pub avg_fps: f64,
    pub frame_drop_rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UserEngagementInputs {
    pub streak_days: u32,
    pub total_scans: u32,
}
