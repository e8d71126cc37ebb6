//! Core domain models for devrank.
//!
//! This module contains all shared data structures used across the pipeline.

mod category;
pub mod config;
mod device;
mod entry;
mod fps;
mod metrics;
mod ranking;

// Re-export all models
pub use category::{Category, CategoryInputs, CategoryScore, ParseCategoryError};
pub use config::{
    FpsConfig, LeaderboardConfig, QueryConfig, ReadinessConfig, StoreConfig, UploadConfig,
};
pub use device::{NormalizedDevice, RawDeviceInfo};
pub use entry::{DeviceContext, LeaderboardEntry};
pub use fps::FpsSample;
pub use metrics::{
    CameraEfficiencyInputs, CameraTest, ComponentOptimizationInputs, CpuBenchmarkRun,
    CpuPerformanceInputs, DisplayEfficiencyInputs, DisplaySweepPoint, HealthScoreInputs,
    HealthSnapshot, MetricSnapshot, PerformanceConsistencyInputs, PowerAggregate,
    PowerEfficiencyInputs, PowerTrendDirection, PowerTrendInputs, ThermalEfficiencyInputs,
    ThermalReading, UserEngagementInputs,
};
pub use ranking::{BestDeviceEntry, DeviceInsight, DeviceScoreRecord};
