//! Gesture recognition for the logo actor
//!
//! Touch and pen interactions are classified on release into a tap, a
//! downward slam (which is also the inspect action), an upward flick (cosmetic),
//! or nothing. Mouse input bypasses the recognizer and uses the plain click path.

use serde::{Deserialize, Serialize};

/// Input device class of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Map a DOM `pointerType` string; unknown types are treated as touch
    pub fn from_dom(pointer_type: &str) -> Self {
        match pointer_type {
            "mouse" => PointerKind::Mouse,
            "pen" => PointerKind::Pen,
            _ => PointerKind::Touch,
        }
    }
}

/// One pointer event sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pointer_id: i32,
    pub kind: PointerKind,
    /// Vertical client coordinate (px, grows downward)
    pub y: f32,
    /// Event timestamp (ms)
    pub time_ms: f64,
}

/// Classified interaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    Tap,
    SwipeDown { strength: f32, velocity: f32 },
    SwipeUp { strength: f32, velocity: f32 },
    None,
}

impl Gesture {
    /// Tap and downward slam both inspect; an upward flick never does
    pub fn fires_inspect(&self) -> bool {
        matches!(self, Gesture::Tap | Gesture::SwipeDown { .. })
    }

    /// Normalized strength in [0, 1] (zero for tap/none)
    pub fn strength(&self) -> f32 {
        match *self {
            Gesture::SwipeDown { strength, .. } | Gesture::SwipeUp { strength, .. } => strength,
            Gesture::Tap | Gesture::None => 0.0,
        }
    }
}

/// Classification thresholds (px, px/ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThresholds {
    pub tap_slop: f32,
    /// Travel that qualifies a swipe regardless of speed
    pub swipe_distance: f32,
    /// Shorter travel that qualifies when fast enough
    pub flick_distance: f32,
    pub flick_velocity: f32,
    /// Travel mapping to full strength
    pub down_full_strength: f32,
    pub up_full_strength: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            tap_slop: 10.0,
            swipe_distance: 55.0,
            flick_distance: 28.0,
            flick_velocity: 0.35,
            down_full_strength: 160.0,
            up_full_strength: 180.0,
        }
    }
}

/// Classify a finished interaction from its vertical travel and duration
pub fn classify(thresholds: &GestureThresholds, delta_y: f32, elapsed_ms: f64) -> Gesture {
    let distance = delta_y.abs();
    if distance <= thresholds.tap_slop {
        return Gesture::Tap;
    }

    let elapsed = elapsed_ms.max(1.0) as f32;
    let velocity = distance / elapsed;
    let flick = distance >= thresholds.flick_distance && velocity > thresholds.flick_velocity;

    if delta_y > 0.0 && (delta_y >= thresholds.swipe_distance || flick) {
        Gesture::SwipeDown {
            strength: (delta_y / thresholds.down_full_strength).min(1.0),
            velocity,
        }
    } else if delta_y < 0.0 && (delta_y <= -thresholds.swipe_distance || flick) {
        Gesture::SwipeUp {
            strength: (distance / thresholds.up_full_strength).min(1.0),
            velocity,
        }
    } else {
        Gesture::None
    }
}

#[derive(Debug, Clone, Copy)]
struct ActivePress {
    pointer_id: i32,
    start_y: f32,
    last_y: f32,
    start_time: f64,
}

/// Single-pointer gesture tracker
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    thresholds: GestureThresholds,
    active: Option<ActivePress>,
    suppress_click: bool,
}

impl GestureRecognizer {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            active: None,
            suppress_click: false,
        }
    }

    /// Start tracking. Returns false for mouse input and for a second pointer
    /// while one is already tracked.
    pub fn press(&mut self, sample: PointerSample) -> bool {
        if sample.kind == PointerKind::Mouse || self.active.is_some() {
            return false;
        }
        self.suppress_click = false;
        self.active = Some(ActivePress {
            pointer_id: sample.pointer_id,
            start_y: sample.y,
            last_y: sample.y,
            start_time: sample.time_ms,
        });
        true
    }

    /// Record movement. Returns true when the caller should suppress default
    /// scrolling for this event.
    pub fn move_to(&mut self, sample: PointerSample) -> bool {
        match self.active.as_mut() {
            Some(press) if press.pointer_id == sample.pointer_id => {
                press.last_y = sample.y;
                true
            }
            _ => false,
        }
    }

    /// Finish the tracked interaction and classify it. Releases from other
    /// pointers are ignored and yield `Gesture::None`.
    pub fn release(&mut self, sample: PointerSample) -> Gesture {
        let press = match self.active {
            Some(press) if press.pointer_id == sample.pointer_id => press,
            _ => return Gesture::None,
        };
        self.active = None;
        // The browser follows a touch release with a synthetic click; the
        // recognizer already handled this interaction.
        self.suppress_click = true;

        let delta_y = press.last_y - press.start_y;
        let gesture = classify(&self.thresholds, delta_y, sample.time_ms - press.start_time);
        log::trace!("gesture {gesture:?} (dy={delta_y:.1})");
        gesture
    }

    /// Drop the tracked interaction without classifying it
    pub fn cancel(&mut self, pointer_id: i32) -> bool {
        match self.active {
            Some(press) if press.pointer_id == pointer_id => {
                self.active = None;
                self.suppress_click = true;
                true
            }
            _ => false,
        }
    }

    /// Whether a click event should act as an inspect. Consumes the
    /// suppression left by a recognized touch interaction.
    pub fn take_click(&mut self) -> bool {
        !std::mem::take(&mut self.suppress_click)
    }

    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }
}
