//! Frame-rate sample taken on the render loop.

use serde::{Deserialize, Serialize};

/// One FPS measurement as cached between collection passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FpsSample {
    pub fps: u32,
    pub frame_drop_rate: f64,
    /// Unparsed sample as reported by the frame monitor
    #[serde(default)]
    pub raw_sample: String,
    /// Epoch millis at which the sample was taken
    pub timestamp: i64,
}

impl FpsSample {
    /// Whether the sample is younger than `ttl_ms` at `now_ms`. Samples
    /// stamped in the future are never fresh.
    pub const fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        let age = now_ms.saturating_sub(self.timestamp);
        age >= 0 && age < ttl_ms
    }
}
