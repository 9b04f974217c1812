use foundation::math::{ARC_POINTS, CONNECTING_BEND, DIRECT_BEND};
use serde::{Deserialize, Serialize};

use crate::route::RouteKind;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid config {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Timing and geometry knobs of the route animation.
///
/// Every field has a default, so a config file only lists what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Half-open `[lo, hi)` range of the random delay before zooming starts.
    pub zoom_jitter_ms: [u64; 2],
    pub zoom_ms: u64,
    pub draw_preroll_ms: u64,
    /// Nominal time to reveal the whole arc.
    pub draw_ms: u64,
    pub draw_tick_ms: u64,
    pub completion_pause_ms: u64,
    pub takeoff_burst_ms: u64,
    pub fly_tick_ms: u64,
    pub landing_pause_ms: u64,
    pub replay_wait_ms: u64,
    pub replay_probability: f64,
    pub arc_points: usize,
    pub direct_bend: f64,
    pub connecting_bend: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            zoom_jitter_ms: [500, 1500],
            zoom_ms: 2500,
            draw_preroll_ms: 300,
            draw_ms: 4000,
            draw_tick_ms: 16,
            completion_pause_ms: 1500,
            takeoff_burst_ms: 1000,
            fly_tick_ms: 80,
            landing_pause_ms: 3000,
            replay_wait_ms: 8000,
            replay_probability: 0.5,
            arc_points: ARC_POINTS,
            direct_bend: DIRECT_BEND,
            connecting_bend: CONNECTING_BEND,
        }
    }
}

impl AnimationConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let [lo, hi] = self.zoom_jitter_ms;
        if lo > hi {
            return Err(invalid("zoom_jitter_ms", format!("range is reversed: [{lo}, {hi})")));
        }
        if self.draw_tick_ms == 0 {
            return Err(invalid("draw_tick_ms", "must be positive"));
        }
        if self.fly_tick_ms == 0 {
            return Err(invalid("fly_tick_ms", "must be positive"));
        }
        if self.draw_ms < self.draw_tick_ms {
            return Err(invalid("draw_ms", "must be at least one draw tick"));
        }
        if !(0.0..=1.0).contains(&self.replay_probability) {
            return Err(invalid(
                "replay_probability",
                format!("{} is outside [0, 1]", self.replay_probability),
            ));
        }
        if self.arc_points < 2 {
            return Err(invalid("arc_points", "must be at least 2"));
        }
        for (field, bend) in [
            ("direct_bend", self.direct_bend),
            ("connecting_bend", self.connecting_bend),
        ] {
            if !bend.is_finite() || bend <= 0.0 {
                return Err(invalid(field, format!("{bend} is not a positive number")));
            }
        }
        Ok(())
    }

    pub fn bend_for(&self, kind: RouteKind) -> f64 {
        match kind {
            RouteKind::Direct => self.direct_bend,
            RouteKind::Connecting => self.connecting_bend,
        }
    }

    /// Arc points revealed per draw tick: `ceil(points / (draw_ms / tick_ms))`.
    pub fn reveal_step(&self, points: usize) -> usize {
        let ticks = self.draw_ms as f64 / self.draw_tick_ms.max(1) as f64;
        ((points as f64 / ticks).ceil() as usize).max(1)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
