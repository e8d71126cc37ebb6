//! Leaderboard categories and per-category score records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::metrics::{
    CameraEfficiencyInputs, ComponentOptimizationInputs, CpuPerformanceInputs,
    DisplayEfficiencyInputs, HealthScoreInputs, PerformanceConsistencyInputs,
    PowerEfficiencyInputs, PowerTrendInputs, ThermalEfficiencyInputs, UserEngagementInputs,
};

/// One metric domain a device is ranked on.
///
/// The serialized form is the stable category id used as the key of
/// `LeaderboardEntry::scores` and in store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PowerEfficiency,
    CpuPerformance,
    CameraEfficiency,
    DisplayEfficiency,
    HealthScore,
    PowerTrend,
    ComponentOptimization,
    ThermalEfficiency,
    PerformanceConsistency,
    UserEngagement,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 10] = [
        Category::PowerEfficiency,
        Category::CpuPerformance,
        Category::CameraEfficiency,
        Category::DisplayEfficiency,
        Category::HealthScore,
        Category::PowerTrend,
        Category::ComponentOptimization,
        Category::ThermalEfficiency,
        Category::PerformanceConsistency,
        Category::UserEngagement,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PowerEfficiency => "power_efficiency",
            Self::CpuPerformance => "cpu_performance",
            Self::CameraEfficiency => "camera_efficiency",
            Self::DisplayEfficiency => "display_efficiency",
            Self::HealthScore => "health_score",
            Self::PowerTrend => "power_trend",
            Self::ComponentOptimization => "component_optimization",
            Self::ThermalEfficiency => "thermal_efficiency",
            Self::PerformanceConsistency => "performance_consistency",
            Self::UserEngagement => "user_engagement",
        }
    }

    /// Human-readable label for tables and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PowerEfficiency => "Power Efficiency",
            Self::CpuPerformance => "CPU Performance",
            Self::CameraEfficiency => "Camera Efficiency",
            Self::DisplayEfficiency => "Display Efficiency",
            Self::HealthScore => "Health Score",
            Self::PowerTrend => "Power Trend",
            Self::ComponentOptimization => "Component Optimization",
            Self::ThermalEfficiency => "Thermal Efficiency",
            Self::PerformanceConsistency => "Performance Consistency",
            Self::UserEngagement => "User Engagement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known category id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Raw aggregate a category score was computed from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", content = "inputs", rename_all = "snake_case")]
pub enum CategoryInputs {
    PowerEfficiency(PowerEfficiencyInputs),
    CpuPerformance(CpuPerformanceInputs),
    CameraEfficiency(CameraEfficiencyInputs),
    DisplayEfficiency(DisplayEfficiencyInputs),
    HealthScore(HealthScoreInputs),
    PowerTrend(PowerTrendInputs),
    ComponentOptimization(ComponentOptimizationInputs),
    ThermalEfficiency(ThermalEfficiencyInputs),
    PerformanceConsistency(PerformanceConsistencyInputs),
    UserEngagement(UserEngagementInputs),
}

impl CategoryInputs {
    pub const fn category(&self) -> Category {
        match self {
            Self::PowerEfficiency(_) => Category::PowerEfficiency,
            Self::CpuPerformance(_) => Category::CpuPerformance,
            Self::CameraEfficiency(_) => Category::CameraEfficiency,
            Self::DisplayEfficiency(_) => Category::DisplayEfficiency,
            Self::HealthScore(_) => Category::HealthScore,
            Self::PowerTrend(_) => Category::PowerTrend,
            Self::ComponentOptimization(_) => Category::ComponentOptimization,
            Self::ThermalEfficiency(_) => Category::ThermalEfficiency,
            Self::PerformanceConsistency(_) => Category::PerformanceConsistency,
            Self::UserEngagement(_) => Category::UserEngagement,
        }
    }
}

/// Outcome of scoring one category.
///
/// `Absent` means no measurement was available. A `Present` score of 0.0 is
/// a real, worst-possible result and is kept distinct from `Absent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CategoryScore {
    Present {
        /// Score in [0, 100]
        score: f64,
        inputs: CategoryInputs,
    },
    Absent,
}

impl CategoryScore {
    /// Score if present.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Present { score, .. } => Some(*score),
            Self::Absent => None,
        }
    }

    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ids_are_stable() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_parse_accepts_loose_forms() {
        assert_eq!("Power-Efficiency".parse::<Category>().unwrap(), Category::PowerEfficiency);
        assert_eq!("user engagement".parse::<Category>().unwrap(), Category::UserEngagement);
        assert!("battery".parse::<Category>().is_err());
    }

    #[test]
    fn test_absent_has_no_value() {
        assert_eq!(CategoryScore::Absent.value(), None);
        let zero = CategoryScore::Present {
            score: 0.0,
            inputs: CategoryInputs::ThermalEfficiency(ThermalEfficiencyInputs {
                avg_temp_celsius: 250.0,
            }),
        };
        assert_eq!(zero.value(), Some(0.0));
        assert!(zero.is_present());
    }
}
