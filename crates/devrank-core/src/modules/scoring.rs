//! Per-category score calculators.
//!
//! Each calculator is a pure function from one category's raw aggregate to a
//! score in [0, 100]. A non-finite input scores 0.

use devrank_types::models::{
    CameraEfficiencyInputs, ComponentOptimizationInputs, CpuPerformanceInputs,
    DisplayEfficiencyInputs, HealthScoreInputs, PerformanceConsistencyInputs,
    PowerEfficiencyInputs, PowerTrendDirection, PowerTrendInputs, ThermalEfficiencyInputs,
    UserEngagementInputs,
};
use devrank_types::{Category, CategoryInputs, CategoryScore, MetricSnapshot};
use std::collections::BTreeMap;

/// Clamp to `[min, max]`, mapping NaN to `min`.
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn clamp_score(value: f64) -> f64 {
    clamp(value, 0.0, 100.0)
}

/// Balance of per-component power shares in [0, 1].
///
/// `shares` are percentage contributions; their population std dev is
/// normalized by 50 and inverted, so an even split scores 1.
pub fn component_balance(shares: &[f64]) -> f64 {
    if shares.len() < 2 {
        return 1.0;
    }
    let n = shares.len() as f64;
    let mean = shares.iter().sum::<f64>() / n;
    let variance = shares.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    1.0 - clamp(variance.sqrt() / 50.0, 0.0, 1.0)
}

pub fn power_efficiency(inputs: &PowerEfficiencyInputs) -> f64 {
    if !all_finite(&[inputs.avg_power_watts, inputs.component_balance]) {
        return 0.0;
    }
    let base = clamp(100.0 - inputs.avg_power_watts * 10.0, 0.0, 100.0);
    let trend_bonus = match inputs.trend {
        PowerTrendDirection::Decreasing => 10.0,
        PowerTrendDirection::Stable => 5.0,
        PowerTrendDirection::Increasing | PowerTrendDirection::Unknown => 0.0,
    };
    let balance_bonus = clamp(inputs.component_balance * 5.0, 0.0, 10.0);
    clamp_score(base + trend_bonus + balance_bonus)
}

pub fn cpu_performance(inputs: &CpuPerformanceInputs) -> f64 {
    if !all_finite(&[inputs.avg_utilization, inputs.avg_delta_power]) {
        return 0.0;
    }
    let efficiency = if inputs.avg_delta_power > 0.0 {
        (inputs.avg_utilization / inputs.avg_delta_power) * 10.0
    } else {
        inputs.avg_utilization * 2.0
    };
    clamp_score(efficiency)
}

pub fn camera_efficiency(inputs: &CameraEfficiencyInputs) -> f64 {
    if !all_finite(&[inputs.energy_per_photo_joules]) {
        return 0.0;
    }
    clamp_score(100.0 - inputs.energy_per_photo_joules * 50.0)
}

pub fn display_efficiency(inputs: &DisplayEfficiencyInputs) -> f64 {
    if !all_finite(&[inputs.avg_brightness, inputs.avg_power]) {
        return 0.0;
    }
    if inputs.avg_power <= 0.0 {
        return 0.0;
    }
    clamp_score((inputs.avg_brightness / inputs.avg_power) * 2.0)
}

pub fn thermal_efficiency(inputs: &ThermalEfficiencyInputs) -> f64 {
    if !all_finite(&[inputs.avg_temp_celsius]) {
        return 0.0;
    }
    clamp_score(100.0 - inputs.avg_temp_celsius / 2.0)
}

pub fn health_score(inputs: &HealthScoreInputs) -> f64 {
    if !all_finite(&[inputs.current_score]) {
        return 0.0;
    }
    let streak_bonus = clamp(f64::from(inputs.streak_days) * 0.5, 0.0, 5.0);
    let engagement_bonus = clamp(f64::from(inputs.total_scans) * 0.1, 0.0, 5.0);
    clamp_score(inputs.current_score * 10.0 + streak_bonus + engagement_bonus)
}

pub fn power_trend(inputs: &PowerTrendInputs) -> f64 {
    if !all_finite(&[inputs.improvement_percent]) {
        return 0.0;
    }
    let base = match inputs.trend {
        PowerTrendDirection::Decreasing => 100.0,
        PowerTrendDirection::Stable => 50.0,
        PowerTrendDirection::Increasing => 0.0,
        PowerTrendDirection::Unknown => 25.0,
    };
    clamp_score(base + clamp(inputs.improvement_percent * 10.0, 0.0, 20.0))
}

pub fn component_optimization(inputs: &ComponentOptimizationInputs) -> f64 {
    if !all_finite(&[inputs.max_component_power_watts, inputs.balance_score]) {
        return 0.0;
    }
    let base = clamp(100.0 - inputs.max_component_power_watts * 5.0, 0.0, 100.0);
    clamp_score(base + clamp(inputs.balance_score * 10.0, 0.0, 20.0))
}

pub fn performance_consistency(inputs: &PerformanceConsistencyInputs) -> f64 {
    if !all_finite(&[inputs.avg_fps, inputs.frame_drop_rate]) {
        return 0.0;
    }
    let fps = clamp(inputs.avg_fps, 0.0, 60.0);
    let drops = 40.0 - clamp(inputs.frame_drop_rate * 10.0, 0.0, 40.0);
    clamp_score(fps + drops)
}

pub fn user_engagement(inputs: &UserEngagementInputs) -> f64 {
    let streak = clamp(f64::from(inputs.streak_days) * 5.0, 0.0, 50.0);
    let scans = clamp(f64::from(inputs.total_scans) * 0.5, 0.0, 50.0);
    clamp_score(streak + scans)
}

/// Score one category from its inputs.
pub fn score_category(inputs: &CategoryInputs) -> f64 {
    match inputs {
        CategoryInputs::PowerEfficiency(i) => power_efficiency(i),
        CategoryInputs::CpuPerformance(i) => cpu_performance(i),
        CategoryInputs::CameraEfficiency(i) => camera_efficiency(i),
        CategoryInputs::DisplayEfficiency(i) => display_efficiency(i),
        CategoryInputs::HealthScore(i) => health_score(i),
        CategoryInputs::PowerTrend(i) => power_trend(i),
        CategoryInputs::ComponentOptimization(i) => component_optimization(i),
        CategoryInputs::ThermalEfficiency(i) => thermal_efficiency(i),
        CategoryInputs::PerformanceConsistency(i) => performance_consistency(i),
        CategoryInputs::UserEngagement(i) => user_engagement(i),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Derive each category's inputs from a snapshot. Categories with no usable
/// measurement are left out.
pub fn derive_inputs(snapshot: &MetricSnapshot) -> Vec<CategoryInputs> {
    let mut inputs = Vec::with_capacity(Category::ALL.len());

    if let Some(power) = &snapshot.power {
        let balance = component_balance(&power.component_shares());
        if power.avg_power_watts > 0.0 {
            inputs.push(CategoryInputs::PowerEfficiency(PowerEfficiencyInputs {
                avg_power_watts: power.avg_power_watts,
                trend: power.trend,
                component_balance: balance,
            }));
        }
        inputs.push(CategoryInputs::PowerTrend(PowerTrendInputs {
            trend: power.trend,
            improvement_percent: power.improvement_percent,
        }));
        if let Some(max_watts) = power.max_component_watts() {
            inputs.push(CategoryInputs::ComponentOptimization(ComponentOptimizationInputs {
                max_component_power_watts: max_watts,
                balance_score: balance,
            }));
        }
    }

    if let (Some(avg_utilization), Some(avg_delta_power)) = (
        mean(snapshot.cpu_benchmarks.iter().map(|r| r.utilization_percent)),
        mean(snapshot.cpu_benchmarks.iter().map(|r| r.delta_power_watts)),
    ) {
        inputs.push(CategoryInputs::CpuPerformance(CpuPerformanceInputs {
            avg_utilization,
            avg_delta_power,
        }));
    }

    let photos: u64 = snapshot.camera_tests.iter().map(|t| u64::from(t.photos)).sum();
    if photos > 0 {
        let energy: f64 = snapshot.camera_tests.iter().map(|t| t.energy_joules).sum();
        inputs.push(CategoryInputs::CameraEfficiency(CameraEfficiencyInputs {
            energy_per_photo_joules: energy / photos as f64,
        }));
    }

    if let (Some(avg_brightness), Some(avg_power)) = (
        mean(snapshot.display_sweep.iter().map(|p| p.brightness)),
        mean(snapshot.display_sweep.iter().map(|p| p.power_watts)),
    ) {
        if avg_power > 0.0 {
            inputs.push(CategoryInputs::DisplayEfficiency(DisplayEfficiencyInputs {
                avg_brightness,
                avg_power,
            }));
        }
    }

    if let Some(health) = &snapshot.health {
        inputs.push(CategoryInputs::HealthScore(HealthScoreInputs {
            current_score: health.current_score,
            streak_days: health.streak_days,
            total_scans: health.total_scans,
        }));
        inputs.push(CategoryInputs::UserEngagement(UserEngagementInputs {
            streak_days: health.streak_days,
            total_scans: health.total_scans,
        }));
    }

    if let Some(thermal) = &snapshot.thermal {
        inputs.push(CategoryInputs::ThermalEfficiency(ThermalEfficiencyInputs {
            avg_temp_celsius: thermal.avg_temp_celsius,
        }));
    }

    if let Some(fps) = snapshot.fps.as_ref().filter(|f| f.fps > 0) {
        inputs.push(CategoryInputs::PerformanceConsistency(PerformanceConsistencyInputs {
            avg_fps: f64::from(fps.fps),
            frame_drop_rate: fps.frame_drop_rate,
        }));
    }

    inputs
}

/// Score every category; categories without inputs are `Absent`.
pub fn score_all(snapshot: &MetricSnapshot) -> BTreeMap<Category, CategoryScore> {
    let mut scores: BTreeMap<Category, CategoryScore> =
        Category::ALL.iter().map(|c| (*c, CategoryScore::Absent)).collect();

    for inputs in derive_inputs(snapshot) {
        let score = score_category(&inputs);
        scores.insert(inputs.category(), CategoryScore::Present { score, inputs });
    }
    scores
}

/// Trust signal: one point per measurement domain that contributed data.
pub fn data_quality(snapshot: &MetricSnapshot) -> u8 {
    let checks = [
        snapshot.power.as_ref().is_some_and(|p| p.avg_power_watts > 0.0),
        !snapshot.cpu_benchmarks.is_empty(),
        snapshot.camera_tests.iter().any(|t| t.photos > 0),
        !snapshot.display_sweep.is_empty(),
        snapshot.health.as_ref().is_some_and(|h| h.current_score > 0.0),
    ];
    let points = checks.iter().filter(|ok| **ok).count();
    points.min(5) as u8
}
