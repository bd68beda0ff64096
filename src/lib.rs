//! Package Inspection - a conveyor-lane reflex game
//!
//! Core modules:
//! - `sim`: Simulation core (spawning, motion, inspection state machine, retention)
//! - `gesture`: Touch/pen gesture recognition for the logo actor
//! - `scheduler`: Frame-driven session (start/stop, snapshots, timed delays)
//! - `platform`: Browser/native frame and clock sources
//! - `config`: Validated simulation configuration
//! - `speed`: Lane speed easing collaborator

pub mod config;
pub mod error;
pub mod gesture;
pub mod platform;
pub mod scheduler;
pub mod sim;
pub mod speed;

pub use config::{DelayRange, LaneSizing, SimConfig};
pub use error::{ConfigError, SchedulerError, StartError};
pub use gesture::{Gesture, GestureRecognizer, PointerKind, PointerSample};
pub use scheduler::{Clock, FrameDriver, FrameRequest, GameHandle, start};
pub use sim::{ItemKind, Lifecycle, Score, Snapshot};

/// Game configuration constants
pub mod consts {
    /// Nominal conveyor speed (pixels per second)
    pub const LANE_SPEED: f32 = 120.0;
    /// Probability that a spawned package is malicious
    pub const MALICIOUS_PROBABILITY: f64 = 0.4;

    /// Burst size bounds (inclusive)
    pub const BURST_SIZE_MIN: u32 = 1;
    pub const BURST_SIZE_MAX: u32 = 4;
    /// Delay between packages inside a burst (ms, half-open)
    pub const INTRA_BURST_DELAY_MS: (f64, f64) = (10.0, 25.0);
    /// Pause after a burst (ms, half-open)
    pub const POST_BURST_DELAY_MS: (f64, f64) = (1200.0, 3000.0);

    /// Packages enter the lane off-screen at this x offset
    pub const SPAWN_OFFSET: f32 = -60.0;
    /// Extra clearance required behind the previous package before spawning
    pub const SPAWN_GAP_PADDING: f32 = 5.0;
    /// Retry delay when the gap guard blocks a spawn (ms)
    pub const SPAWN_RETRY_DELAY_MS: f64 = 50.0;

    /// How long an inspection takes before it resolves (ms)
    pub const INSPECTION_RESOLUTION_DELAY_MS: f64 = 650.0;
    /// Packages older than this are evicted regardless of position (ms)
    pub const MAX_ITEM_LIFETIME_MS: f64 = 13_000.0;
    /// Fraction of package width past the line before it counts as crossed
    pub const MISS_TOLERANCE: f32 = 0.2;
    /// Logo press visualization (ms)
    pub const PRESS_VISUAL_MS: f64 = 200.0;

    /// Package width bounds derived from the viewport
    pub const ITEM_WIDTH_MIN: f32 = 60.0;
    pub const ITEM_WIDTH_MAX: f32 = 110.0;
    pub const ITEM_WIDTH_VIEWPORT_FRACTION: f32 = 0.08;
}

/// Cubic ease-in-out over `t` in [0, 1]
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
