//! Easing curves for time-based animations

use serde::{Deserialize, Serialize};

/// An easing curve mapping linear progress `t ∈ [0, 1]` to eased progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// CSS `ease-in-out`
    pub const fn ease_in_out() -> Self {
        Easing::CubicBezier(0.42, 0.0, 0.58, 1.0)
    }

    /// Fast start, long soft landing; used for entrances
    pub const fn entrance() -> Self {
        Easing::CubicBezier(0.22, 1.0, 0.36, 1.0)
    }

    /// Apply the curve. Progress outside `[0, 1]` is clamped.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::CubicBezier(x1, y1, x2, y2) => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let x = Polynomial::through(x1, x2);
                let y = Polynomial::through(y1, y2);
                y.at(x.solve(t as f64)) as f32
            }
        }
    }
}

/// One axis of a cubic bezier from (0, 0) to (1, 1), as `((a·p + b)·p + c)·p`
struct Polynomial {
    a: f64,
    b: f64,
    c: f64,
}

impl Polynomial {
    fn through(p1: f32, p2: f32) -> Self {
        let (p1, p2) = (p1 as f64, p2 as f64);
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        Self {
            a: 1.0 - c - b,
            b,
            c,
        }
    }

    fn at(&self, p: f64) -> f64 {
        ((self.a * p + self.b) * p + self.c) * p
    }

    fn derivative(&self, p: f64) -> f64 {
        (3.0 * self.a * p + 2.0 * self.b) * p + self.c
    }

    /// Parameter `p ∈ [0, 1]` where the polynomial equals `target`
    ///
    /// Newton steps inside a shrinking bracket; a step that leaves the
    /// bracket falls back to its midpoint. x control points are within
    /// `[0, 1]`, so the polynomial is monotonic there.
    fn solve(&self, target: f64) -> f64 {
        const TOLERANCE: f64 = 1e-7;

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut p = target;
        for _ in 0..32 {
            let error = self.at(p) - target;
            if error.abs() < TOLERANCE {
                break;
            }
            if error < 0.0 {
                lo = p;
            } else {
                hi = p;
            }

            let slope = self.derivative(p);
            let next = p - error / slope;
            p = if slope.abs() > TOLERANCE && next > lo && next < hi {
                next
            } else {
                0.5 * (lo + hi)
            };
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 3] = [Easing::Linear, Easing::ease_in_out(), Easing::entrance()];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn test_clamps_progress() {
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
        assert_eq!(Easing::entrance().apply(2.0), 1.0);
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        let easing = Easing::ease_in_out();
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-4);
        let a = easing.apply(0.2);
        let b = easing.apply(0.8);
        assert!((a + b - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_straight_bezier_is_linear() {
        let easing = Easing::CubicBezier(0.25, 0.25, 0.75, 0.75);
        for i in 1..10 {
            let t = i as f32 / 10.0;
            assert!((easing.apply(t) - t).abs() < 1e-5);
        }
    }

    #[test]
    fn test_flat_start_still_solves() {
        // x'(0) = 0, where an unguarded Newton step divides by zero
        let easing = Easing::CubicBezier(0.0, 0.0, 1.0, 1.0);
        let value = easing.apply(0.01);
        assert!(value.is_finite());
        assert!(value >= 0.0 && value < 0.05);
    }

    #[test]
    fn test_entrance_front_loaded() {
        // Most of the distance is covered in the first half.
        assert!(Easing::entrance().apply(0.5) > 0.8);
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut previous = easing.apply(0.0);
            for i in 1..=100 {
                let value = easing.apply(i as f32 / 100.0);
                assert!(value + 1e-4 >= previous, "{easing:?} at {i}");
                previous = value;
            }
        }
    }
}
