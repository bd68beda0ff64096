//! Inspection state machine
//!
//! A discrete inspect action picks the first unprocessed package (spawn order)
//! whose span covers the inspection line, freezes it in `Inspecting`, and
//! schedules its resolution. Only one inspection is ever in flight.

use super::state::{ItemId, ItemKind, Lifecycle, SimEvent, SimState};
use super::timers::{DelayedAction, TimerQueue};
use crate::config::SimConfig;

/// First unprocessed package covering the line, FIFO by spawn order
pub fn find_target(state: &SimState) -> Option<ItemId> {
    let line = state.sizing.inspection_line;
    state
        .items
        .iter()
        .find(|item| item.lifecycle() == Lifecycle::Unprocessed && item.covers(line))
        .map(|item| item.id)
}

/// Handle an inspect action at `now`. No-op while an inspection is in flight or
/// when nothing covers the line.
pub fn trigger(
    state: &mut SimState,
    config: &SimConfig,
    timers: &mut TimerQueue,
    now: f64,
) -> Option<ItemId> {
    if state.is_inspecting() {
        log::trace!("inspect ignored: inspection already in flight");
        return None;
    }
    let id = find_target(state)?;
    let item = state.item_mut(id)?;
    if !item.transition(Lifecycle::Inspecting, now) {
        return None;
    }

    state.inspecting = Some(id);
    state.events.push(SimEvent::InspectionStarted { id });
    timers.schedule(
        now + config.inspection_resolution_delay_ms,
        DelayedAction::ResolveInspection { id },
    );

    state.logo_pressed = true;
    timers.schedule(now + config.press_visual_ms, DelayedAction::ReleasePress);

    log::debug!("inspecting package {id} at t={now:.1}");
    Some(id)
}

/// Finish the inspection of `id`. The package is re-fetched from the current
/// list; if it is gone the score is untouched, but the in-flight flag still
/// clears so the next inspection can start.
pub fn resolve(state: &mut SimState, id: ItemId, now: f64) -> Option<Lifecycle> {
    state.inspecting = None;

    let Some(item) = state.item_mut(id) else {
        log::warn!("inspection of package {id} resolved after it was evicted");
        return None;
    };
    let outcome = match item.kind() {
        ItemKind::Malicious => Lifecycle::ResolvedThreat,
        ItemKind::Benign => Lifecycle::ResolvedSafe,
    };
    if !item.transition(outcome, now) {
        log::warn!(
            "package {id} was {:?} when its inspection resolved",
            item.lifecycle()
        );
        return None;
    }

    match outcome {
        Lifecycle::ResolvedThreat => state.score.threats_caught += 1,
        _ => state.score.safe_cleared += 1,
    }
    state.events.push(SimEvent::InspectionResolved { id, outcome });
    log::debug!("package {id} resolved as {outcome:?}");
    Some(outcome)
}

/// Auto-pilot decision: inspect when the package the trigger would select is
/// malicious. Goes through `trigger`, so the one-at-a-time rule still holds.
pub fn auto_pilot_step(
    state: &mut SimState,
    config: &SimConfig,
    timers: &mut TimerQueue,
    now: f64,
) -> Option<ItemId> {
    if !state.auto_pilot || state.is_inspecting() {
        return None;
    }
    let id = find_target(state)?;
    if state.item(id)?.kind() != ItemKind::Malicious {
        return None;
    }
    trigger(state, config, timers, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaneSizing;
    use crate::sim::Score;

    fn setup() -> (SimState, SimConfig, TimerQueue) {
        let mut config = SimConfig::for_viewport(800.0);
        config.sizing = Some(LaneSizing {
            lane_width: 800.0,
            inspection_line: 400.0,
            item_width: 80.0,
        });
        let state = SimState::new(config.sizing.unwrap(), &config);
        (state, config, TimerQueue::new())
    }

    fn fire(state: &mut SimState, timers: &mut TimerQueue, now: f64) {
        for (due, action) in timers.take_due(now) {
            match action {
                DelayedAction::ResolveInspection { id } => {
                    resolve(state, id, due);
                }
                DelayedAction::ReleasePress => state.logo_pressed = false,
            }
        }
    }

    #[test]
    fn test_trigger_and_resolve_threat() {
        let (mut state, config, mut timers) = setup();
        let id = state.spawn_item(ItemKind::Malicious, 350.0, 80.0, 0.0);

        assert_eq!(trigger(&mut state, &config, &mut timers, 1000.0), Some(id));
        assert_eq!(state.item(id).unwrap().lifecycle(), Lifecycle::Inspecting);
        assert_eq!(state.inspecting, Some(id));
        assert!(state.logo_pressed);

        fire(&mut state, &mut timers, 1649.9);
        assert_eq!(state.item(id).unwrap().lifecycle(), Lifecycle::Inspecting);
        assert!(!state.logo_pressed);

        fire(&mut state, &mut timers, 1650.0);
        let item = state.item(id).unwrap();
        assert_eq!(item.lifecycle(), Lifecycle::ResolvedThreat);
        assert_eq!(item.resolved_at, Some(1650.0));
        assert_eq!(state.score.threats_caught, 1);
        assert_eq!(state.inspecting, None);
    }

    #[test]
    fn test_resolve_benign_counts_safe() {
        let (mut state, config, mut timers) = setup();
        let id = state.spawn_item(ItemKind::Benign, 390.0, 80.0, 0.0);
        trigger(&mut state, &config, &mut timers, 0.0).unwrap();
        assert_eq!(resolve(&mut state, id, 650.0), Some(Lifecycle::ResolvedSafe));
        assert_eq!(
            state.score,
            Score {
                safe_cleared: 1,
                ..Score::default()
            }
        );
    }

    #[test]
    fn test_second_trigger_is_noop() {
        let (mut state, config, mut timers) = setup();
        let first = state.spawn_item(ItemKind::Benign, 330.0, 80.0, 0.0);
        let second = state.spawn_item(ItemKind::Malicious, 360.0, 80.0, 0.0);

        assert_eq!(trigger(&mut state, &config, &mut timers, 0.0), Some(first));
        assert_eq!(trigger(&mut state, &config, &mut timers, 10.0), None);
        assert_eq!(state.item(second).unwrap().lifecycle(), Lifecycle::Unprocessed);
        // One resolution + one press release
        assert_eq!(timers.pending(), 2);
    }

    #[test]
    fn test_fifo_tie_break() {
        let (mut state, config, mut timers) = setup();
        // Later spawn sits closer to the line; the earlier one still wins
        let earlier = state.spawn_item(ItemKind::Benign, 322.0, 80.0, 0.0);
        state.spawn_item(ItemKind::Malicious, 361.0, 80.0, 0.0);
        assert_eq!(trigger(&mut state, &config, &mut timers, 0.0), Some(earlier));
    }

    #[test]
    fn test_nothing_on_the_line() {
        let (mut state, config, mut timers) = setup();
        state.spawn_item(ItemKind::Malicious, 100.0, 80.0, 0.0);
        state.spawn_item(ItemKind::Malicious, 400.5, 80.0, 0.0);
        assert_eq!(trigger(&mut state, &config, &mut timers, 0.0), None);
        assert!(!state.is_inspecting());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_resolution_after_eviction_is_noop() {
        let (mut state, config, mut timers) = setup();
        let id = state.spawn_item(ItemKind::Malicious, 350.0, 80.0, 0.0);
        trigger(&mut state, &config, &mut timers, 0.0).unwrap();
        state.items.clear();

        fire(&mut state, &mut timers, 650.0);
        assert_eq!(state.score, Score::default());
        assert!(!state.is_inspecting());

        // A new package can be inspected afterwards
        let next = state.spawn_item(ItemKind::Benign, 380.0, 80.0, 700.0);
        assert_eq!(trigger(&mut state, &config, &mut timers, 700.0), Some(next));
        assert_ne!(next, id);
    }

    #[test]
    fn test_custom_resolution_delay() {
        let (mut state, mut config, mut timers) = setup();
        config.inspection_resolution_delay_ms = 350.0;
        let id = state.spawn_item(ItemKind::Benign, 350.0, 80.0, 0.0);
        trigger(&mut state, &config, &mut timers, 100.0).unwrap();
        fire(&mut state, &mut timers, 449.0);
        assert_eq!(state.item(id).unwrap().lifecycle(), Lifecycle::Inspecting);
        fire(&mut state, &mut timers, 450.0);
        assert_eq!(state.item(id).unwrap().lifecycle(), Lifecycle::ResolvedSafe);
    }

    #[test]
    fn test_auto_pilot_only_targets_malicious() {
        let (mut state, config, mut timers) = setup();
        state.auto_pilot = true;
        let benign = state.spawn_item(ItemKind::Benign, 350.0, 80.0, 0.0);
        assert_eq!(auto_pilot_step(&mut state, &config, &mut timers, 0.0), None);

        state.items.clear();
        let malicious = state.spawn_item(ItemKind::Malicious, 350.0, 80.0, 0.0);
        assert_eq!(
            auto_pilot_step(&mut state, &config, &mut timers, 0.0),
            Some(malicious)
        );
        assert_ne!(benign, malicious);

        // Respects the in-flight rule
        state.spawn_item(ItemKind::Malicious, 340.0, 80.0, 0.0);
        assert_eq!(auto_pilot_step(&mut state, &config, &mut timers, 1.0), None);
    }

    #[test]
    fn test_auto_pilot_off_does_nothing() {
        let (mut state, config, mut timers) = setup();
        state.spawn_item(ItemKind::Malicious, 350.0, 80.0, 0.0);
        assert_eq!(auto_pilot_step(&mut state, &config, &mut timers, 0.0), None);
    }
}
