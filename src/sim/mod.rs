//! Simulation core
//!
//! All gameplay logic lives here. This module must stay free of platform code:
//! - Timestamps come in from the caller, never from a clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering dependencies

pub mod inspect;
pub mod motion;
pub mod retention;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use snapshot::{ItemView, Snapshot};
pub use state::{BurstState, Item, ItemId, ItemKind, Lifecycle, Score, SimEvent, SimState};
pub use tick::Simulation;
pub use timers::{CancelToken, DelayedAction, TimerQueue};
