//! Browser refresh signal and clock

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::error::SchedulerError;
use crate::scheduler::{Clock, FrameCallback, FrameDriver, FrameRequest};

/// `requestAnimationFrame`-backed frame driver
pub struct AnimationFrameDriver {
    window: web_sys::Window,
}

impl AnimationFrameDriver {
    pub fn new() -> Result<Self, SchedulerError> {
        let window = web_sys::window()
            .ok_or_else(|| SchedulerError::Unavailable("no window".to_string()))?;
        Ok(Self { window })
    }
}

impl FrameDriver for AnimationFrameDriver {
    fn request_frame(&mut self, callback: FrameCallback) -> Result<FrameRequest, SchedulerError> {
        let closure = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        self.window
            .request_animation_frame(closure.unchecked_ref())
            .map(|id| FrameRequest(id as i64))
            .map_err(|err| SchedulerError::Unavailable(format!("{err:?}")))
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if let Err(err) = self.window.cancel_animation_frame(request.0 as i32) {
            log::warn!("cancelAnimationFrame failed: {err:?}");
        }
    }
}

/// `performance.now()`; same time base as animation frame timestamps
pub struct PerformanceClock {
    performance: web_sys::Performance,
}

impl PerformanceClock {
    pub fn new() -> Result<Self, SchedulerError> {
        let performance = web_sys::window()
            .and_then(|w| w.performance())
            .ok_or_else(|| SchedulerError::Unavailable("no performance timer".to_string()))?;
        Ok(Self { performance })
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.performance.now()
    }
}
