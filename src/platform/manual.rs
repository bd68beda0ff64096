//! Caller-driven frame source and clock

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::SchedulerError;
use crate::scheduler::{Clock, FrameCallback, FrameDriver, FrameRequest};

struct Queue {
    next_id: i64,
    pending: Vec<(FrameRequest, FrameCallback)>,
    available: bool,
}

/// Frame driver that only fires when told to. Clones share one queue, so a
/// caller can keep a clone after handing one to `start()`.
#[derive(Clone)]
pub struct ManualFrameDriver {
    queue: Rc<RefCell<Queue>>,
}

impl Default for ManualFrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualFrameDriver {
    pub fn new() -> Self {
        Self::with_availability(true)
    }

    /// A driver that refuses every request (no refresh signal)
    pub fn unavailable() -> Self {
        Self::with_availability(false)
    }

    fn with_availability(available: bool) -> Self {
        Self {
            queue: Rc::new(RefCell::new(Queue {
                next_id: 1,
                pending: Vec::new(),
                available,
            })),
        }
    }

    /// Run every callback requested so far with `timestamp`. Requests made by
    /// those callbacks wait for the next call. Returns how many ran.
    pub fn fire(&self, timestamp: f64) -> usize {
        let callbacks = self.take_pending();
        let count = callbacks.len();
        for callback in callbacks {
            callback(timestamp);
        }
        count
    }

    /// Remove and return the queued callbacks without running them
    pub fn take_pending(&self) -> Vec<FrameCallback> {
        let pending = std::mem::take(&mut self.queue.borrow_mut().pending);
        pending.into_iter().map(|(_, callback)| callback).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }
}

impl FrameDriver for ManualFrameDriver {
    fn request_frame(&mut self, callback: FrameCallback) -> Result<FrameRequest, SchedulerError> {
        let mut queue = self.queue.borrow_mut();
        if !queue.available {
            return Err(SchedulerError::Unavailable(
                "manual frame driver disabled".to_string(),
            ));
        }
        let request = FrameRequest(queue.next_id);
        queue.next_id += 1;
        queue.pending.push((request, callback));
        Ok(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.queue
            .borrow_mut()
            .pending
            .retain(|(pending, _)| *pending != request);
    }
}

/// Settable clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: f64) {
        self.0.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.0.set(self.0.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}
