//! Simulation configuration
//!
//! Loaded from defaults or a partial JSON object, validated once at `start()`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Lane geometry derived from the viewport. Acts as the package width provider:
/// new packages take `item_width` at spawn time, existing ones keep theirs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSizing {
    /// Visible lane width; packages past this x are off-screen
    pub lane_width: f32,
    /// x coordinate of the inspection line
    pub inspection_line: f32,
    /// Width given to newly spawned packages
    pub item_width: f32,
}

impl LaneSizing {
    /// Derive sizing from a viewport width (line at the center, width ~8% of viewport)
    pub fn from_viewport_width(width: f32) -> Self {
        let item_width = (width * ITEM_WIDTH_VIEWPORT_FRACTION)
            .round()
            .clamp(ITEM_WIDTH_MIN, ITEM_WIDTH_MAX);
        Self {
            lane_width: width,
            inspection_line: width / 2.0,
            item_width,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.lane_width.is_finite()
            && self.lane_width > 0.0
            && self.item_width.is_finite()
            && self.item_width > 0.0
            && self.inspection_line.is_finite();
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidSizing {
                lane_width: self.lane_width,
                item_width: self.item_width,
            })
        }
    }
}

/// Half-open delay range in milliseconds: `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: f64,
    pub max: f64,
}

impl DelayRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min < self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Nominal lane speed (px/s); also the divisor for the spawn-gap floor
    pub initial_lane_speed: f32,
    /// Lane geometry; required
    pub sizing: Option<LaneSizing>,
    pub malicious_probability: f64,
    /// Inclusive burst size bounds
    pub burst_size_min: u32,
    pub burst_size_max: u32,
    pub intra_burst_delay_ms: DelayRange,
    pub post_burst_delay_ms: DelayRange,
    pub inspection_resolution_delay_ms: f64,
    pub max_item_lifetime_ms: f64,
    /// Fraction of package width the center must pass beyond the line to count as crossed
    pub miss_tolerance: f32,
    pub spawn_offset: f32,
    pub spawn_gap_padding: f32,
    pub spawn_retry_delay_ms: f64,
    pub press_visual_ms: f64,
    /// RNG seed for spawn decisions
    pub seed: u64,
    /// Start with auto-pilot engaged
    pub auto_pilot: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_lane_speed: LANE_SPEED,
            sizing: None,
            malicious_probability: MALICIOUS_PROBABILITY,
            burst_size_min: BURST_SIZE_MIN,
            burst_size_max: BURST_SIZE_MAX,
            intra_burst_delay_ms: DelayRange::new(INTRA_BURST_DELAY_MS.0, INTRA_BURST_DELAY_MS.1),
            post_burst_delay_ms: DelayRange::new(POST_BURST_DELAY_MS.0, POST_BURST_DELAY_MS.1),
            inspection_resolution_delay_ms: INSPECTION_RESOLUTION_DELAY_MS,
            max_item_lifetime_ms: MAX_ITEM_LIFETIME_MS,
            miss_tolerance: MISS_TOLERANCE,
            spawn_offset: SPAWN_OFFSET,
            spawn_gap_padding: SPAWN_GAP_PADDING,
            spawn_retry_delay_ms: SPAWN_RETRY_DELAY_MS,
            press_visual_ms: PRESS_VISUAL_MS,
            seed: 0,
            auto_pilot: false,
        }
    }
}

impl SimConfig {
    /// Defaults with sizing derived from a viewport width
    pub fn for_viewport(width: f32) -> Self {
        Self {
            sizing: Some(LaneSizing::from_viewport_width(width)),
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON object; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sizing, or `MissingSizing`
    pub fn sizing(&self) -> Result<LaneSizing, ConfigError> {
        self.sizing.ok_or(ConfigError::MissingSizing)
    }

    /// Check every field; the first violation is reported
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sizing()?.validate()?;

        let p = self.malicious_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }

        if self.burst_size_min == 0 || self.burst_size_min > self.burst_size_max {
            return Err(ConfigError::InvalidBurstSize {
                min: self.burst_size_min,
                max: self.burst_size_max,
            });
        }

        self.intra_burst_delay_ms.validate("intra_burst_delay_ms")?;
        self.post_burst_delay_ms.validate("post_burst_delay_ms")?;

        positive("initial_lane_speed", self.initial_lane_speed as f64)?;
        positive(
            "inspection_resolution_delay_ms",
            self.inspection_resolution_delay_ms,
        )?;
        positive("max_item_lifetime_ms", self.max_item_lifetime_ms)?;
        positive("spawn_retry_delay_ms", self.spawn_retry_delay_ms)?;
        positive("press_visual_ms", self.press_visual_ms)?;

        if !self.miss_tolerance.is_finite() || self.miss_tolerance < 0.0 {
            return Err(ConfigError::Negative {
                name: "miss_tolerance",
                value: self.miss_tolerance as f64,
            });
        }
        finite("spawn_offset", self.spawn_offset as f64)?;
        finite("spawn_gap_padding", self.spawn_gap_padding as f64)?;

        if self.max_item_lifetime_ms <= self.inspection_resolution_delay_ms {
            log::warn!(
                "max_item_lifetime_ms ({}) does not exceed inspection_resolution_delay_ms ({}); \
                 inspections may resolve against evicted packages",
                self.max_item_lifetime_ms,
                self.inspection_resolution_delay_ms
            );
        }

        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}
