//! Platform abstraction layer
//!
//! Supplies the refresh signal and clock the scheduler runs on:
//! - `web`: `requestAnimationFrame` + `performance.now()` (wasm32 only)
//! - `manual`: caller-driven frames and time (native runs, tests)

pub mod manual;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use manual::{ManualClock, ManualFrameDriver};
#[cfg(target_arch = "wasm32")]
pub use web::{AnimationFrameDriver, PerformanceClock};
