//! Motion integration and inspection-line crossing

use super::state::{ItemKind, Lifecycle, SimEvent, SimState};
use crate::config::SimConfig;

/// Advance every movable package by `lane_speed * dt` and settle any
/// unprocessed package whose center has passed the line.
///
/// The package under inspection is frozen unless auto-pilot is on. Crossing is
/// decided in the same pass as the move, so a package cannot be moved past the
/// line and then inspected within one tick.
pub fn advance(state: &mut SimState, config: &SimConfig, dt_ms: f64, timestamp: f64) {
    let step = state.lane_speed * (dt_ms / 1000.0) as f32;
    let line = state.sizing.inspection_line;
    let auto_pilot = state.auto_pilot;

    for item in &mut state.items {
        if item.lifecycle() == Lifecycle::Inspecting && !auto_pilot {
            continue;
        }
        item.position += step;

        if item.lifecycle() != Lifecycle::Unprocessed {
            continue;
        }
        let threshold = line + item.width * config.miss_tolerance;
        if item.center() <= threshold {
            continue;
        }

        match item.kind() {
            ItemKind::Malicious => {
                item.transition(Lifecycle::Missed, timestamp);
                state.score.missed_threats += 1;
                state.events.push(SimEvent::Missed { id: item.id });
                log::debug!("missed malicious package {}", item.id);
            }
            ItemKind::Benign => {
                item.transition(Lifecycle::ResolvedSafe, timestamp);
                state.events.push(SimEvent::Passed { id: item.id });
            }
        }
    }
}
