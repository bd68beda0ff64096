//! Session-owned delayed actions
//!
//! Every timed suspension (inspection resolution, logo press release) is queued
//! here with a `CancelToken`. The queue is pumped from the frame loop, so a delay
//! always observes the state as it is when it fires.

use std::cell::Cell;
use std::rc::Rc;

use super::state::ItemId;

/// Shared cancellation flag for one scheduled delay
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Work performed when a delay elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedAction {
    /// Finish the inspection of a package (looked up by id at fire time)
    ResolveInspection { id: ItemId },
    /// Return the logo actor to its rest pose
    ReleasePress,
}

#[derive(Debug)]
struct Timer {
    due: f64,
    seq: u64,
    token: CancelToken,
    action: DelayedAction,
}

/// Pending delays ordered by due time, then by scheduling order
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire at `due` (ms)
    pub fn schedule(&mut self, due: f64, action: DelayedAction) -> CancelToken {
        let token = CancelToken::default();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            due,
            seq,
            token: token.clone(),
            action,
        });
        token
    }

    /// Remove and return every live action due at or before `now` with its due
    /// time, oldest first. Cancelled entries are dropped silently.
    pub fn take_due(&mut self, now: f64) -> Vec<(f64, DelayedAction)> {
        self.timers.retain(|t| !t.token.is_cancelled());

        let mut due: Vec<Timer> = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].due <= now {
                due.push(self.timers.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| (t.due, t.action)).collect()
    }

    /// Mark every outstanding delay inert and forget it
    pub fn cancel_all(&mut self) {
        for timer in self.timers.drain(..) {
            timer.token.cancel();
        }
    }

    /// Number of live (uncancelled) delays
    pub fn pending(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }
}
