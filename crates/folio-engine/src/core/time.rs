/// Fixed timestep accumulator.
/// Ensures game logic runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        // Small epsilon so an exact multiple of dt is not lost to rounding.
        let steps = ((self.accumulator + 1e-6) / self.dt) as u32;
        self.accumulator = (self.accumulator - steps as f32 * self.dt).max(0.0);
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Countdown driven by explicit `dt` ticks. Replaces wall-clock delayed callbacks so
/// every delay in the engine is deterministic under test.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    duration: f32,
    remaining: f32,
    repeating: bool,
    active: bool,
}

impl Timer {
    /// Fires once after `duration` seconds.
    pub fn once(duration: f32) -> Self {
        Self {
            duration,
            remaining: duration,
            repeating: false,
            active: true,
        }
    }

    /// Fires every `duration` seconds until cancelled.
    pub fn repeating(duration: f32) -> Self {
        Self {
            repeating: true,
            ..Self::once(duration)
        }
    }

    /// Advance by `dt`. Returns true on the tick the timer fires.
    /// A repeating timer fires at most once per tick.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= dt;
        if self.remaining > 1e-6 {
            return false;
        }
        if self.repeating && self.duration > 0.0 {
            self.remaining += self.duration;
            if self.remaining <= 0.0 {
                self.remaining = self.duration;
            }
        } else {
            self.active = false;
        }
        true
    }

    /// Stop without firing.
    pub fn cancel(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0 / 60.0);
        assert_eq!(steps, 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(0.008); // half a frame
        assert_eq!(steps, 0);
        let steps = ts.accumulate(0.010); // over one frame total
        assert_eq!(steps, 1);
    }

    #[test]
    fn caps_at_ten_steps() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0); // 60 frames worth, but capped at 10
        assert_eq!(steps, 10);
    }

    #[test]
    fn remainder_carries_into_the_next_frame() {
        let mut ts = FixedTimestep::new(0.25);
        assert_eq!(ts.accumulate(0.4), 1);
        assert_eq!(ts.accumulate(0.1), 1);
        assert_eq!(ts.accumulate(0.1), 0);
    }

    #[test]
    fn once_timer_fires_exactly_once() {
        let mut timer = Timer::once(0.5);
        assert!(!timer.tick(0.25));
        assert!(timer.tick(0.25));
        assert!(!timer.tick(1.0));
    }

    #[test]
    fn repeating_timer_keeps_firing() {
        let mut timer = Timer::repeating(0.5);
        let fired = (0..8).filter(|_| timer.tick(0.25)).count();
        assert_eq!(fired, 4);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = Timer::once(0.1);
        timer.cancel();
        assert!(!timer.tick(1.0));
    }

    #[test]
    fn zero_length_timer_fires_on_first_tick() {
        let mut timer = Timer::repeating(0.0);
        assert!(timer.tick(0.0));
        assert!(!timer.tick(1.0));
    }
}
