//! Frame scheduler and session handle
//!
//! `start()` validates the config, requests the first display refresh and
//! returns a `GameHandle`. Every refresh runs one simulation frame, emits a
//! snapshot to the registered listeners and requests the next refresh.
//! `stop()` cancels the pending refresh and tears the simulation down, so no
//! frame or delayed action mutates state afterwards.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::{LaneSizing, SimConfig};
use crate::error::{ConfigError, SchedulerError, StartError};
use crate::gesture::Gesture;
use crate::sim::{ItemId, Simulation, Snapshot};

/// Callback invoked with the refresh timestamp (ms)
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Identifier of a requested refresh, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(pub i64);

/// Source of display refresh signals
pub trait FrameDriver {
    /// Run `callback` once on the next refresh
    fn request_frame(&mut self, callback: FrameCallback) -> Result<FrameRequest, SchedulerError>;

    /// Cancel a request that has not fired yet
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Monotonic clock sharing the refresh timestamps' time base
pub trait Clock {
    fn now_ms(&self) -> f64;
}

type Listener = Box<dyn FnMut(&Snapshot)>;

struct Session {
    sim: RefCell<Simulation>,
    driver: RefCell<Box<dyn FrameDriver>>,
    clock: Box<dyn Clock>,
    pending: Cell<Option<FrameRequest>>,
    running: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl Session {
    fn schedule_next(session: &Rc<Session>) -> Result<(), SchedulerError> {
        let weak = Rc::downgrade(session);
        let request = session
            .driver
            .borrow_mut()
            .request_frame(Box::new(move |timestamp| {
                if let Some(session) = weak.upgrade() {
                    Session::on_frame(&session, timestamp);
                }
            }))?;
        session.pending.set(Some(request));
        Ok(())
    }

    fn on_frame(session: &Rc<Session>, timestamp: f64) {
        if !session.running.get() {
            return;
        }
        session.pending.set(None);

        let snapshot = {
            let mut sim = session.sim.borrow_mut();
            sim.frame(timestamp);
            let snapshot = sim.snapshot();
            sim.clear_events();
            snapshot
        };
        session.notify(&snapshot);

        // A listener may have stopped the session
        if !session.running.get() {
            return;
        }
        if let Err(err) = Session::schedule_next(session) {
            log::error!("frame request failed, stopping session: {err}");
            session.shutdown();
        }
    }

    fn notify(&self, snapshot: &Snapshot) {
        // Listeners may subscribe more listeners while being called
        let mut active = std::mem::take(&mut *self.listeners.borrow_mut());
        for listener in active.iter_mut() {
            listener(snapshot);
        }
        let mut slot = self.listeners.borrow_mut();
        active.append(&mut slot);
        *slot = active;
    }

    fn shutdown(&self) {
        if !self.running.replace(false) {
            return;
        }
        if let Some(request) = self.pending.take() {
            self.driver.borrow_mut().cancel_frame(request);
        }
        self.sim.borrow_mut().teardown();
        log::info!("session stopped");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(request) = self.pending.take() {
            self.driver.get_mut().cancel_frame(request);
        }
    }
}

/// Handle to a running game session. Clones share the session.
#[derive(Clone)]
pub struct GameHandle {
    session: Rc<Session>,
}

/// Start a session: validate `config`, then begin the frame loop on `driver`.
/// Nothing is left running when this fails.
pub fn start(
    config: SimConfig,
    driver: impl FrameDriver + 'static,
    clock: impl Clock + 'static,
) -> Result<GameHandle, StartError> {
    let seed = config.seed;
    let sim = Simulation::new(config)?;
    let session = Rc::new(Session {
        sim: RefCell::new(sim),
        driver: RefCell::new(Box::new(driver)),
        clock: Box::new(clock),
        pending: Cell::new(None),
        running: Cell::new(true),
        listeners: RefCell::new(Vec::new()),
    });

    if let Err(err) = Session::schedule_next(&session) {
        session.running.set(false);
        session.sim.borrow_mut().teardown();
        return Err(err.into());
    }

    log::info!("session started (seed {seed})");
    Ok(GameHandle { session })
}

impl GameHandle {
    /// Stop the frame loop. Safe to call repeatedly.
    pub fn stop(&self) {
        self.session.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.session.running.get()
    }

    /// Discrete inspect action, stamped with the session clock
    pub fn trigger_inspect(&self) -> Option<ItemId> {
        if !self.is_running() {
            return None;
        }
        let now = self.session.clock.now_ms();
        self.session.sim.borrow_mut().trigger_inspect(now)
    }

    /// Feed a recognized gesture; only inspecting gestures reach the core
    pub fn handle_gesture(&self, gesture: Gesture) -> Option<ItemId> {
        if gesture.fires_inspect() {
            self.trigger_inspect()
        } else {
            None
        }
    }

    /// Fire delays that came due between frames
    pub fn poll_timers(&self) {
        let now = self.session.clock.now_ms();
        self.session.sim.borrow_mut().poll_timers(now);
    }

    /// Current state (events are only delivered through listeners)
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = self.session.sim.borrow().snapshot();
        snapshot.events.clear();
        snapshot
    }

    /// Register a listener called with a snapshot after every frame
    pub fn on_state_change(&self, listener: impl FnMut(&Snapshot) + 'static) {
        self.session.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Viewport changed; takes effect on the next frame without a restart.
    /// Degenerate sizing is refused and the current geometry kept.
    pub fn resize(&self, sizing: LaneSizing) -> Result<(), ConfigError> {
        self.session.sim.borrow_mut().resize(sizing)
    }

    pub fn set_lane_speed(&self, speed: f32) {
        self.session.sim.borrow_mut().set_lane_speed(speed);
    }

    pub fn set_auto_pilot(&self, enabled: bool) {
        self.session.sim.borrow_mut().set_auto_pilot(enabled);
    }

    /// Stage scenarios in tests
    #[cfg(test)]
    pub(crate) fn with_simulation<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> R {
        f(&mut self.session.sim.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{GestureRecognizer, PointerKind, PointerSample};
    use crate::platform::{ManualClock, ManualFrameDriver};
    use crate::sim::{ItemKind, Lifecycle};

    fn config() -> SimConfig {
        let mut config = SimConfig::for_viewport(800.0);
        config.sizing = Some(LaneSizing {
            lane_width: 800.0,
            inspection_line: 400.0,
            item_width: 80.0,
        });
        config
    }

    fn started() -> (GameHandle, ManualFrameDriver, ManualClock) {
        let driver = ManualFrameDriver::new();
        let clock = ManualClock::new();
        let handle = start(config(), driver.clone(), clock.clone()).unwrap();
        (handle, driver, clock)
    }

    fn stage(handle: &GameHandle, kind: ItemKind, position: f32) -> ItemId {
        handle.with_simulation(|sim| {
            let state = sim.state_mut();
            state.next_spawn_deadline = f64::INFINITY;
            state.spawn_item(kind, position, 80.0, 0.0)
        })
    }

    #[test]
    fn test_start_requests_first_frame() {
        let (handle, driver, _) = started();
        assert!(handle.is_running());
        assert_eq!(driver.pending(), 1);
        assert_eq!(driver.fire(0.0), 1);
        // Loop re-arms itself
        assert_eq!(driver.pending(), 1);
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let driver = ManualFrameDriver::new();
        let result = start(SimConfig::default(), driver.clone(), ManualClock::new());
        assert!(matches!(
            result,
            Err(StartError::Config(ConfigError::MissingSizing))
        ));
        assert_eq!(driver.pending(), 0);
    }

    #[test]
    fn test_start_without_refresh_source() {
        let result = start(config(), ManualFrameDriver::unavailable(), ManualClock::new());
        assert!(matches!(result, Err(StartError::NoRefreshSource(_))));
    }

    #[test]
    fn test_listener_receives_snapshots() {
        let (handle, driver, _) = started();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        handle.on_state_change(move |snap| sink.borrow_mut().push(snap.clone()));

        driver.fire(0.0);
        driver.fire(16.0);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].timestamp, 0.0);
        assert_eq!(seen[1].timestamp, 16.0);
        // Spawn event delivered once
        assert_eq!(seen[0].items.len(), 1);
        assert!(!seen[0].events.is_empty());
        assert!(seen[1].events.is_empty());
    }

    #[test]
    fn test_stop_is_idempotent_and_final() {
        let (handle, driver, _) = started();
        let frames = Rc::new(Cell::new(0));
        let counter = frames.clone();
        handle.on_state_change(move |_| counter.set(counter.get() + 1));

        driver.fire(0.0);
        handle.stop();
        handle.stop();
        assert!(!handle.is_running());
        assert_eq!(driver.pending(), 0);
        driver.fire(16.0);
        assert_eq!(frames.get(), 1);
    }

    #[test]
    fn test_stop_from_listener() {
        let (handle, driver, _) = started();
        let inner = handle.clone();
        handle.on_state_change(move |_| inner.stop());
        driver.fire(0.0);
        assert!(!handle.is_running());
        assert_eq!(driver.pending(), 0);
    }

    #[test]
    fn test_stale_callback_after_stop_is_noop() {
        let (handle, driver, _) = started();
        // Grab the armed callback before stop can cancel it
        let stale = driver.take_pending();
        handle.stop();
        for callback in stale {
            callback(100.0);
        }
        assert_eq!(handle.snapshot().timestamp, 0.0);
        assert!(handle.snapshot().items.is_empty());
    }

    #[test]
    fn test_inspect_through_handle() {
        let (handle, driver, clock) = started();
        let id = stage(&handle, ItemKind::Malicious, 350.0);
        driver.fire(0.0);

        clock.set(1000.0);
        assert_eq!(handle.trigger_inspect(), Some(id));
        assert!(handle.snapshot().inspecting);
        assert_eq!(handle.trigger_inspect(), None);

        clock.set(1649.0);
        handle.poll_timers();
        assert!(handle.snapshot().inspecting);
        clock.set(1650.0);
        handle.poll_timers();
        let snap = handle.snapshot();
        assert!(!snap.inspecting);
        assert_eq!(snap.score.threats_caught, 1);
        assert_eq!(snap.items[0].lifecycle, Lifecycle::ResolvedThreat);
    }

    #[test]
    fn test_pending_resolution_inert_after_stop() {
        let (handle, driver, clock) = started();
        let id = stage(&handle, ItemKind::Benign, 350.0);
        driver.fire(0.0);
        assert_eq!(handle.trigger_inspect(), Some(id));

        handle.stop();
        clock.set(5000.0);
        handle.poll_timers();
        driver.fire(5000.0);
        let snap = handle.snapshot();
        assert_eq!(snap.score.safe_cleared, 0);
        assert_eq!(snap.items[0].lifecycle, Lifecycle::Inspecting);
        assert_eq!(handle.trigger_inspect(), None);
    }

    #[test]
    fn test_downward_swipe_fires_inspect() {
        let (handle, driver, clock) = started();
        let id = stage(&handle, ItemKind::Malicious, 350.0);
        driver.fire(0.0);

        let mut recognizer = GestureRecognizer::default();
        let touch = |y: f32, time_ms: f64| PointerSample {
            pointer_id: 7,
            kind: PointerKind::Touch,
            y,
            time_ms,
        };
        recognizer.press(touch(200.0, 0.0));
        recognizer.move_to(touch(260.0, 50.0));
        let gesture = recognizer.release(touch(260.0, 100.0));
        assert_eq!(
            gesture,
            Gesture::SwipeDown {
                strength: 0.375,
                velocity: 0.6
            }
        );

        clock.set(10.0);
        assert_eq!(handle.handle_gesture(gesture), Some(id));
    }

    #[test]
    fn test_upward_swipe_does_not_inspect() {
        let (handle, driver, _) = started();
        stage(&handle, ItemKind::Malicious, 350.0);
        driver.fire(0.0);
        let gesture = Gesture::SwipeUp {
            strength: 0.5,
            velocity: 1.0,
        };
        assert_eq!(handle.handle_gesture(gesture), None);
        assert!(!handle.snapshot().inspecting);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let (a, driver_a, _) = started();
        let (b, driver_b, _) = started();
        stage(&a, ItemKind::Malicious, 350.0);
        driver_a.fire(0.0);
        driver_b.fire(0.0);
        assert!(a.trigger_inspect().is_some());
        assert!(!b.snapshot().inspecting);
    }

    #[test]
    fn test_resize_without_restart() {
        let (handle, driver, _) = started();
        driver.fire(0.0);
        handle.resize(LaneSizing::from_viewport_width(1200.0)).unwrap();
        driver.fire(16.0);
        assert!(handle.is_running());
        assert_eq!(handle.snapshot().inspection_line, 600.0);

        // Hidden iframe reports a zero-width viewport
        assert!(handle.resize(LaneSizing::from_viewport_width(0.0)).is_err());
        driver.fire(32.0);
        assert!(handle.is_running());
        assert_eq!(handle.snapshot().inspection_line, 600.0);
    }
}
