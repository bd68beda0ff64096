//! Package spawner with burst scheduling

use rand::Rng;

use super::state::{BurstState, ItemId, ItemKind, SimState};
use crate::config::SimConfig;

/// Run one spawn attempt for the tick at `timestamp`.
///
/// Spawns when the deadline has passed and the newest package has cleared the
/// entry point by `item_width + padding`. A blocked attempt retries after
/// `spawn_retry_delay_ms` and leaves the burst untouched.
pub fn spawn_step(state: &mut SimState, config: &SimConfig, timestamp: f64) -> Option<ItemId> {
    if timestamp < state.next_spawn_deadline {
        return None;
    }

    let width = state.sizing.item_width;
    let min_gap = width + config.spawn_gap_padding;
    let gap_clear = state.items.last().is_none_or(|last| last.position > min_gap);
    if !gap_clear {
        state.next_spawn_deadline = timestamp + config.spawn_retry_delay_ms;
        return None;
    }

    let kind = if state.rng.random::<f64>() < config.malicious_probability {
        ItemKind::Malicious
    } else {
        ItemKind::Benign
    };
    let id = state.spawn_item(kind, config.spawn_offset, width, timestamp);
    log::debug!("spawned package {id} ({kind:?}) at t={timestamp:.1}");

    let burst = match state.burst {
        Some(burst) if burst.remaining > 0 => burst,
        _ => start_burst(state, config),
    };
    let remaining = burst.remaining - 1;
    let delay = if remaining > 1 {
        burst.intra_delay_ms
    } else {
        burst.post_delay_ms
    };
    state.burst = Some(BurstState { remaining, ..burst });

    // Nominal speed, not the live one: an eased-to-zero lane must not push the deadline to infinity
    let floor = (min_gap / config.initial_lane_speed) as f64 * 1000.0;
    state.next_spawn_deadline = timestamp + delay.max(floor);

    Some(id)
}

fn start_burst(state: &mut SimState, config: &SimConfig) -> BurstState {
    let rng = &mut state.rng;
    let remaining = rng.random_range(config.burst_size_min..=config.burst_size_max);
    let intra_delay_ms =
        rng.random_range(config.intra_burst_delay_ms.min..config.intra_burst_delay_ms.max);
    let post_delay_ms =
        rng.random_range(config.post_burst_delay_ms.min..config.post_burst_delay_ms.max);
    BurstState {
        remaining,
        intra_delay_ms,
        post_delay_ms,
    }
}
