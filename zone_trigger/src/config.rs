// THEORY:
// The `config` module holds every fixed operating parameter of the engine. None
// of these values are learned or adapted at runtime: the color ranges, size
// floors, history depth, and timings are chosen once at process start and stay
// constant for the lifetime of the pipeline.
//
// Key architectural principles:
// 1.  **Reference Defaults**: `PipelineConfig::default()` reproduces the tuned
//     reference behavior (a 10-frame history with a 7-vote stability threshold,
//     a 0.6 s cooldown, a 120 Hz tick). A YAML file only needs to list the
//     values it wants to change.
// 2.  **Validation Up Front**: `validate` rejects impossible combinations (a
//     threshold larger than the window, an inverted HSV range) before any frame
//     is processed, so the hot loop never has to second-guess its parameters.

use crate::error::{Result, TriggerError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The largest hue value in the 8-bit HSV space (hue is stored as degrees / 2).
pub const HUE_MAX: u8 = 180;

/// An inclusive box in 8-bit HSV space, `[h, s, v]` for each bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.lower.iter().zip(self.upper.iter()).any(|(lo, hi)| lo > hi) {
            return Err(TriggerError::InvalidConfig(format!(
                "{name}: lower bound {:?} exceeds upper bound {:?}",
                self.lower, self.upper
            )));
        }
        if self.upper[0] > HUE_MAX {
            return Err(TriggerError::InvalidConfig(format!(
                "{name}: hue {} is above {HUE_MAX}",
                self.upper[0]
            )));
        }
        Ok(())
    }
}

/// Which slot of the zone history feeds the intersection test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSlot {
    /// The oldest retained slot. Imposes a lag of up to the full window length.
    #[default]
    Oldest,
    /// A fixed number of ticks behind the newest slot (`0` is the newest).
    FramesAgo(usize),
}

/// Configuration for the trigger pipeline, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Resolution requested from the capture device.
    pub capture_width: u32,
    pub capture_height: u32,

    /// Cursor boxes narrower or shorter than this are discarded as noise.
    pub min_cursor_width: u32,
    pub min_cursor_height: u32,
    /// Zone boxes narrower or shorter than this are discarded as noise.
    pub min_zone_width: u32,
    pub min_zone_height: u32,

    /// Radius of the circle drawn around each cursor center and used for the hit test.
    pub cursor_radius: i32,

    /// The cursor mask is the union of these ranges (red wraps around hue 0).
    pub cursor_ranges: Vec<HsvRange>,
    /// Near-white, low-saturation pixels that make up a target zone.
    pub zone_range: HsvRange,

    /// Number of ticks kept in the zone history window (N).
    pub history_length: usize,
    /// Votes (including itself) a zone needs across the window to be stable (K).
    pub stable_min_count: usize,
    /// Maximum per-field difference for two rectangles to count as the same zone.
    pub zone_match_tolerance: i32,
    /// Written as `oldest` or as a `frames_ago: n` mapping.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub trigger_slot: TriggerSlot,

    /// Minimum time between two fired actions.
    pub cooldown_secs: f64,
    /// Target duration of one loop iteration.
    pub tick_period_secs: f64,
    /// Pause after a toggle so a held key does not flip the state again.
    pub toggle_debounce_secs: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capture_width: 640,
            capture_height: 360,
            min_cursor_width: 5,
            min_cursor_height: 5,
            min_zone_width: 8,
            min_zone_height: 8,
            cursor_radius: 8,
            cursor_ranges: vec![
                HsvRange::new([0, 120, 120], [10, 255, 255]),
                HsvRange::new([160, 120, 120], [180, 255, 255]),
            ],
            zone_range: HsvRange::new([0, 0, 155], [180, 15, 175]),
            history_length: 10,
            stable_min_count: 7,
            zone_match_tolerance: 15,
            trigger_slot: TriggerSlot::Oldest,
            cooldown_secs: 0.6,
            tick_period_secs: 1.0 / 120.0,
            toggle_debounce_secs: 0.3,
        }
    }
}

impl PipelineConfig {
    /// Reads a YAML file. Missing keys fall back to the reference defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| TriggerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_length == 0 {
            return Err(TriggerError::InvalidConfig("history_length must be at least 1".into()));
        }
        if self.stable_min_count == 0 || self.stable_min_count > self.history_length {
            return Err(TriggerError::InvalidConfig(format!(
                "stable_min_count must be in 1..={}, got {}",
                self.history_length, self.stable_min_count
            )));
        }
        if let TriggerSlot::FramesAgo(n) = self.trigger_slot {
            if n >= self.history_length {
                return Err(TriggerError::InvalidConfig(format!(
                    "trigger_slot frames_ago {n} does not fit a window of {}",
                    self.history_length
                )));
            }
        }
        if self.cursor_radius <= 0 {
            return Err(TriggerError::InvalidConfig("cursor_radius must be positive".into()));
        }
        if self.zone_match_tolerance < 0 {
            return Err(TriggerError::InvalidConfig("zone_match_tolerance must not be negative".into()));
        }
        if self.cursor_ranges.is_empty() {
            return Err(TriggerError::InvalidConfig("cursor_ranges must not be empty".into()));
        }
        for (i, range) in self.cursor_ranges.iter().enumerate() {
            range.validate(&format!("cursor_ranges[{i}]"))?;
        }
        self.zone_range.validate("zone_range")?;

        if !self.tick_period_secs.is_finite() || self.tick_period_secs <= 0.0 {
            return Err(TriggerError::InvalidConfig("tick_period_secs must be positive".into()));
        }
        for (name, value) in [
            ("cooldown_secs", self.cooldown_secs),
            ("toggle_debounce_secs", self.toggle_debounce_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TriggerError::InvalidConfig(format!("{name} must be a non-negative number")));
            }
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.cooldown_secs)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(self.tick_period_secs)
    }

    pub fn toggle_debounce(&self) -> Duration {
        Duration::from_secs_f64(self.toggle_debounce_secs)
    }
}
