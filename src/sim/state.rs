//! Simulation state and core types
//!
//! Everything the frame loop mutates lives in `SimState`; there are no globals,
//! so independent sessions (and tests) never share state.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{LaneSizing, SimConfig};

/// Package identifier. Allocated monotonically, never reused.
pub type ItemId = u64;

/// What a package really is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Benign,
    Malicious,
}

/// Package lifecycle
///
/// ```text
/// Unprocessed -> Inspecting -> ResolvedSafe | ResolvedThreat
/// Unprocessed -> ResolvedSafe (benign crossed the line)
/// Unprocessed -> Missed       (malicious crossed the line)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Unprocessed,
    Inspecting,
    ResolvedSafe,
    ResolvedThreat,
    Missed,
}

impl Lifecycle {
    /// Whether `self -> next` is an edge of the lifecycle graph
    pub fn can_transition_to(self, next: Lifecycle) -> bool {
        use Lifecycle::*;
        matches!(
            (self, next),
            (Unprocessed, Inspecting)
                | (Unprocessed, ResolvedSafe)
                | (Unprocessed, Missed)
                | (Inspecting, ResolvedSafe)
                | (Inspecting, ResolvedThreat)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Lifecycle::ResolvedSafe | Lifecycle::ResolvedThreat | Lifecycle::Missed
        )
    }
}

/// A package travelling along the lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Left edge x (lane-relative)
    pub position: f32,
    pub width: f32,
    kind: ItemKind,
    lifecycle: Lifecycle,
    /// Spawn timestamp (ms)
    pub created_at: f64,
    /// When the package left Unprocessed/Inspecting for a terminal state (ms)
    pub resolved_at: Option<f64>,
}

impl Item {
    pub fn new(id: ItemId, kind: ItemKind, position: f32, width: f32, created_at: f64) -> Self {
        Self {
            id,
            position,
            width,
            kind,
            lifecycle: Lifecycle::Unprocessed,
            created_at,
            resolved_at: None,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Center x, the coordinate used for crossing tests
    pub fn center(&self) -> f32 {
        self.position + self.width / 2.0
    }

    /// Whether the package span covers `x` (edges inclusive)
    pub fn covers(&self, x: f32) -> bool {
        self.position <= x && x <= self.position + self.width
    }

    /// Move along the lifecycle graph. Returns false (and changes nothing) for
    /// any edge not in the graph.
    pub fn transition(&mut self, next: Lifecycle, at: f64) -> bool {
        if !self.lifecycle.can_transition_to(next) {
            return false;
        }
        self.lifecycle = next;
        if next.is_terminal() {
            self.resolved_at = Some(at);
        }
        true
    }
}

/// Player score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub safe_cleared: u32,
    pub threats_caught: u32,
    pub missed_threats: u32,
}

/// Clustered spawning state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstState {
    pub remaining: u32,
    pub intra_delay_ms: f64,
    pub post_delay_ms: f64,
}

/// Lifecycle events produced by the simulation, drained into each snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Spawned { id: ItemId, kind: ItemKind },
    /// Benign package crossed the line untouched
    Passed { id: ItemId },
    /// Malicious package crossed the line untouched
    Missed { id: ItemId },
    InspectionStarted { id: ItemId },
    InspectionResolved { id: ItemId, outcome: Lifecycle },
    Evicted { id: ItemId },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Active packages in spawn order
    pub items: Vec<Item>,
    /// No spawn before this timestamp (ms)
    pub next_spawn_deadline: f64,
    pub burst: Option<BurstState>,
    pub sizing: LaneSizing,
    /// Current lane speed (px/s), may be changed externally between ticks
    pub lane_speed: f32,
    pub score: Score,
    /// Package currently being inspected, if any
    pub inspecting: Option<ItemId>,
    pub auto_pilot: bool,
    /// Logo actor is visually pressed
    pub logo_pressed: bool,
    /// Timestamp of the previous tick (ms)
    pub last_timestamp: Option<f64>,
    pub events: Vec<SimEvent>,
    pub rng: Pcg32,
    next_id: ItemId,
}

impl SimState {
    pub fn new(sizing: LaneSizing, config: &SimConfig) -> Self {
        Self {
            items: Vec::new(),
            next_spawn_deadline: 0.0,
            burst: None,
            sizing,
            lane_speed: config.initial_lane_speed,
            score: Score::default(),
            inspecting: None,
            auto_pilot: config.auto_pilot,
            logo_pressed: false,
            last_timestamp: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(config.seed),
            next_id: 1,
        }
    }

    /// Allocate a new package ID
    pub fn next_item_id(&mut self) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a package to the lane and return its ID
    pub fn spawn_item(&mut self, kind: ItemKind, position: f32, width: f32, at: f64) -> ItemId {
        let id = self.next_item_id();
        self.items.push(Item::new(id, kind, position, width, at));
        self.events.push(SimEvent::Spawned { id, kind });
        id
    }

    /// Look a package up by ID in the current list
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn is_inspecting(&self) -> bool {
        self.inspecting.is_some()
    }
}
