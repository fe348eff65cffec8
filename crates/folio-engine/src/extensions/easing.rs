// extensions/easing.rs
//
// Easing curves for the area slide and the box bounce.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity (no easing).
    #[default]
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end. Used for the box bounce.
    QuadOut,
    /// Slow start and end. Used for the area slide.
    QuadInOut,
}

impl Easing {
    /// Map progress `t` (clamped to 0..=1) onto the curve.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        for easing in [Easing::Linear, Easing::QuadIn, Easing::QuadOut, Easing::QuadInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }

    #[test]
    fn quad_out_faster_start() {
        let mid = Easing::QuadOut.apply(0.5);
        assert!(mid > 0.5, "QuadOut at 0.5 should be > 0.5, got {}", mid);
        assert!(Easing::QuadIn.apply(0.5) < 0.5);
    }

    #[test]
    fn ease_interpolates() {
        let result = ease(100.0, 200.0, 0.5, Easing::Linear);
        assert!((result - 150.0).abs() < 0.001);
        assert_eq!(ease(0.0, 10.0, 2.0, Easing::Linear), 10.0);
    }
}
