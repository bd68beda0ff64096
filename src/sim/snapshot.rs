//! Read-only view of the simulation handed to the renderer each frame

use serde::{Deserialize, Serialize};

use super::state::{Item, ItemId, ItemKind, Lifecycle, Score, SimEvent, SimState};

/// One package as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub position: f32,
    pub center: f32,
    pub width: f32,
    pub kind: ItemKind,
    pub lifecycle: Lifecycle,
    pub created_at: f64,
    /// Used by the renderer for fade timing only
    pub resolved_at: Option<f64>,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            position: item.position,
            center: item.center(),
            width: item.width,
            kind: item.kind(),
            lifecycle: item.lifecycle(),
            created_at: item.created_at,
            resolved_at: item.resolved_at,
        }
    }
}

/// Frame snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Timestamp of the last processed tick (ms)
    pub timestamp: f64,
    pub items: Vec<ItemView>,
    pub score: Score,
    pub inspecting: bool,
    pub inspecting_id: Option<ItemId>,
    pub auto_pilot: bool,
    pub logo_pressed: bool,
    pub lane_speed: f32,
    pub inspection_line: f32,
    /// Events since the previous emitted snapshot
    pub events: Vec<SimEvent>,
}

impl Snapshot {
    pub fn capture(state: &SimState) -> Self {
        Self {
            timestamp: state.last_timestamp.unwrap_or(0.0),
            items: state.items.iter().map(ItemView::from).collect(),
            score: state.score,
            inspecting: state.is_inspecting(),
            inspecting_id: state.inspecting,
            auto_pilot: state.auto_pilot,
            logo_pressed: state.logo_pressed,
            lane_speed: state.lane_speed,
            inspection_line: state.sizing.inspection_line,
            events: state.events.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
