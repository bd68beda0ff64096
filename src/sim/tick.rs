//! Per-frame simulation step
//!
//! `Simulation` is the owned context for one game session. A frame runs, in
//! order: due delays, spawner, motion/crossing, auto-pilot inspection check,
//! retention.

use super::inspect;
use super::motion;
use super::retention;
use super::snapshot::Snapshot;
use super::spawn;
use super::state::{ItemId, SimState};
use super::timers::{DelayedAction, TimerQueue};
use crate::config::{LaneSizing, SimConfig};
use crate::error::ConfigError;

/// One game session's simulation
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    state: SimState,
    timers: TimerQueue,
    torn_down: bool,
}

impl Simulation {
    /// Validate `config` and build a fresh session
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sizing = config.sizing()?;
        let state = SimState::new(sizing, &config);
        Ok(Self {
            config,
            state,
            timers: TimerQueue::new(),
            torn_down: false,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Stage scenarios in tests; bypasses the lifecycle rules
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    /// Advance one display frame. The first frame has a zero delta; a long gap
    /// (backgrounded tab) is applied as a single step without catch-up.
    pub fn frame(&mut self, timestamp: f64) {
        if self.torn_down {
            return;
        }
        let dt = self
            .state
            .last_timestamp
            .map(|last| (timestamp - last).max(0.0))
            .unwrap_or(0.0);
        self.state.last_timestamp = Some(timestamp);

        self.poll_timers(timestamp);

        let Self {
            config,
            state,
            timers,
            ..
        } = self;
        spawn::spawn_step(state, config, timestamp);
        motion::advance(state, config, dt, timestamp);
        inspect::auto_pilot_step(state, config, timers, timestamp);
        retention::evict(state, config, timestamp);
    }

    /// Fire every delay due at or before `now`
    pub fn poll_timers(&mut self, now: f64) {
        if self.torn_down {
            return;
        }
        // Stamp outcomes with the due time, not the frame that noticed it
        for (due, action) in self.timers.take_due(now) {
            match action {
                DelayedAction::ResolveInspection { id } => {
                    inspect::resolve(&mut self.state, id, due);
                }
                DelayedAction::ReleasePress => self.state.logo_pressed = false,
            }
        }
    }

    /// Discrete inspect action (tap, downward swipe, or auto-pilot)
    pub fn trigger_inspect(&mut self, now: f64) -> Option<ItemId> {
        if self.torn_down {
            return None;
        }
        inspect::trigger(&mut self.state, &self.config, &mut self.timers, now)
    }

    /// Apply new viewport geometry; existing packages keep their width.
    /// Degenerate geometry (zero or non-finite widths) is refused and the
    /// previous sizing stays in effect.
    pub fn resize(&mut self, sizing: LaneSizing) -> Result<(), ConfigError> {
        sizing.validate()?;
        self.state.sizing = sizing;
        self.config.sizing = Some(sizing);
        Ok(())
    }

    /// Set the live lane speed; negative or non-finite values stop the lane
    pub fn set_lane_speed(&mut self, speed: f32) {
        self.state.lane_speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
    }

    pub fn set_auto_pilot(&mut self, enabled: bool) {
        if self.state.auto_pilot != enabled {
            log::info!("auto-pilot {}", if enabled { "engaged" } else { "released" });
        }
        self.state.auto_pilot = enabled;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Forget events already delivered in a snapshot
    pub fn clear_events(&mut self) {
        self.state.events.clear();
    }

    /// Cancel all outstanding delays; afterwards every entry point is inert
    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn pending_delays(&self) -> usize {
        self.timers.pending()
    }
}
