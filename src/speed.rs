//! Lane speed easing
//!
//! Lives outside the simulation core: the shell feeds it the inspecting flag
//! each frame and pushes the result back through `set_lane_speed`. While a manual
//! inspection is in flight the lane brakes to a stop; afterwards it spins back up.

use crate::ease_in_out_cubic;

/// Time to brake to a stop (ms)
pub const BRAKE_MS: f64 = 50.0;
/// Time to return to nominal speed (ms)
pub const RESTORE_MS: f64 = 250.0;

#[derive(Debug, Clone, Copy)]
struct Ramp {
    from: f32,
    to: f32,
    start: f64,
    duration: f64,
}

impl Ramp {
    fn sample(&self, now: f64) -> f32 {
        let progress = ((now - self.start) / self.duration).clamp(0.0, 1.0) as f32;
        self.from + (self.to - self.from) * ease_in_out_cubic(progress)
    }
}

/// Eases the lane between nominal speed and a full stop
#[derive(Debug, Clone)]
pub struct LaneSpeedEaser {
    nominal: f32,
    braking: bool,
    ramp: Option<Ramp>,
    current: f32,
}

impl LaneSpeedEaser {
    pub fn new(nominal: f32) -> Self {
        Self {
            nominal,
            braking: false,
            ramp: None,
            current: nominal,
        }
    }

    /// Speed for the frame at `now`. `brake` is true while a manual inspection
    /// holds the lane.
    pub fn update(&mut self, brake: bool, now: f64) -> f32 {
        if brake != self.braking {
            self.braking = brake;
            let (to, duration) = if brake {
                (0.0, BRAKE_MS)
            } else {
                (self.nominal, RESTORE_MS)
            };
            self.ramp = Some(Ramp {
                from: self.current,
                to,
                start: now,
                duration,
            });
        }

        if let Some(ramp) = self.ramp {
            self.current = ramp.sample(now);
            if now - ramp.start >= ramp.duration {
                self.current = ramp.to;
                self.ramp = None;
            }
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }
}
