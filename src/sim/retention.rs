//! Retention policy: drop packages that left the lane or lived too long

use super::state::{SimEvent, SimState};
use crate::config::SimConfig;

/// Evict off-lane and expired packages. Returns how many were removed.
pub fn evict(state: &mut SimState, config: &SimConfig, timestamp: f64) -> usize {
    let lane_end = state.sizing.lane_width;
    let before = state.items.len();
    let events = &mut state.events;

    state.items.retain(|item| {
        let off_lane = item.position > lane_end;
        let expired = timestamp - item.created_at > config.max_item_lifetime_ms;
        if off_lane || expired {
            events.push(SimEvent::Evicted { id: item.id });
            log::debug!(
                "evicted package {} ({})",
                item.id,
                if off_lane { "off lane" } else { "expired" }
            );
            false
        } else {
            true
        }
    });

    before - state.items.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ItemKind;

    fn setup() -> (SimState, SimConfig) {
        let config = SimConfig::for_viewport(800.0);
        let state = SimState::new(config.sizing.unwrap(), &config);
        (state, config)
    }

    #[test]
    fn test_evicts_off_lane() {
        let (mut state, config) = setup();
        let gone = state.spawn_item(ItemKind::Benign, 801.0, 64.0, 0.0);
        let edge = state.spawn_item(ItemKind::Benign, 800.0, 64.0, 0.0);
        assert_eq!(evict(&mut state, &config, 10.0), 1);
        assert!(state.item(gone).is_none());
        assert!(state.item(edge).is_some());
        assert!(state.events.contains(&SimEvent::Evicted { id: gone }));
    }

    #[test]
    fn test_evicts_expired() {
        let (mut state, config) = setup();
        let old = state.spawn_item(ItemKind::Malicious, 10.0, 64.0, 0.0);
        let young = state.spawn_item(ItemKind::Malicious, 10.0, 64.0, 5000.0);

        assert_eq!(evict(&mut state, &config, 13_000.0), 0);
        assert_eq!(evict(&mut state, &config, 13_000.5), 1);
        assert!(state.item(old).is_none());
        assert!(state.item(young).is_some());
    }

    #[test]
    fn test_keeps_spawn_order() {
        let (mut state, config) = setup();
        let a = state.spawn_item(ItemKind::Benign, 10.0, 64.0, 0.0);
        state.spawn_item(ItemKind::Benign, 900.0, 64.0, 0.0);
        let c = state.spawn_item(ItemKind::Benign, 20.0, 64.0, 0.0);
        evict(&mut state, &config, 1.0);
        let ids: Vec<_> = state.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a, c]);
    }
}
