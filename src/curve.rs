//! Segment Curve Shaping
//!
//! Power-curve easings used to shape each envelope segment. A curve amount
//! `c` in [-1, 1] selects the exponent `1 + 2|c|`, so the exponent sweeps
//! [1, 3] as the amount goes from linear to fully bent.
//!
//! Two mirrored families exist:
//! - **ease-in** shapes rising segments (attack)
//! - **ease-out** shapes falling segments (decay, release)

use serde::{Deserialize, Serialize};

/// Lower bound of the curve amount
pub const CURVE_MIN: f64 = -1.0;

/// Upper bound of the curve amount
pub const CURVE_MAX: f64 = 1.0;

/// Exponent for a curve amount. Linear at 0, cubic at ±1.
#[inline]
pub fn curve_exponent(curve: f64) -> f64 {
    1.0 + 2.0 * libm::fabs(curve)
}

/// Ease-in shaping for rising segments.
///
/// Positive curves accelerate toward the end, negative curves start fast.
/// `t` is clamped to [0, 1].
#[inline]
pub fn ease_in(t: f64, curve: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if curve == 0.0 {
        t
    } else if curve > 0.0 {
        libm::pow(t, curve_exponent(curve))
    } else {
        1.0 - libm::pow(1.0 - t, curve_exponent(curve))
    }
}

/// Ease-out shaping for falling segments, the mirror of [`ease_in`].
#[inline]
pub fn ease_out(t: f64, curve: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if curve == 0.0 {
        t
    } else if curve > 0.0 {
        1.0 - libm::pow(1.0 - t, curve_exponent(curve))
    } else {
        libm::pow(t, curve_exponent(curve))
    }
}

/// Which easing family a segment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveFamily {
    EaseIn,
    EaseOut,
}

impl CurveFamily {
    pub fn apply(&self, t: f64, curve: f64) -> f64 {
        match self {
            CurveFamily::EaseIn => ease_in(t, curve),
            CurveFamily::EaseOut => ease_out(t, curve),
        }
    }
}

/// Qualitative description of a curve amount, used by editors for labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    Linear,
    /// Exponent applied to `t` directly (slow start)
    Convex,
    /// Exponent applied to `1 - t` (fast start)
    Concave,
}

impl CurveKind {
    /// Classify a curve amount within a family
    pub fn classify(family: CurveFamily, curve: f64) -> Self {
        if curve == 0.0 {
            return CurveKind::Linear;
        }
        let convex = match family {
            CurveFamily::EaseIn => curve > 0.0,
            CurveFamily::EaseOut => curve < 0.0,
        };
        if convex {
            CurveKind::Convex
        } else {
            CurveKind::Concave
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const CURVES: [f64; 7] = [-1.0, -0.6, -0.25, 0.0, 0.3, 0.75, 1.0];

    #[test]
    fn test_exponent_range() {
        assert_eq!(curve_exponent(0.0), 1.0);
        assert_eq!(curve_exponent(1.0), 3.0);
        assert_eq!(curve_exponent(-1.0), 3.0);
        assert_eq!(curve_exponent(-0.5), 2.0);
    }

    #[test]
    fn test_linear_is_identity() {
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_eq!(ease_in(t, 0.0), t);
            assert_eq!(ease_out(t, 0.0), t);
        }
    }

    #[test]
    fn test_endpoints_fixed_for_every_curve() {
        for &c in &CURVES {
            assert_abs_diff_eq!(ease_in(0.0, c), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(ease_in(1.0, c), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(ease_out(0.0, c), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(ease_out(1.0, c), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_known_values() {
        // c = 1 → cubic
        assert_abs_diff_eq!(ease_in(0.5, 1.0), 0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(ease_in(0.5, -1.0), 0.875, epsilon = 1e-12);
        assert_abs_diff_eq!(ease_out(0.5, 1.0), 0.875, epsilon = 1e-12);
        assert_abs_diff_eq!(ease_out(0.5, -1.0), 0.125, epsilon = 1e-12);
        // c = 0.5 → quadratic
        assert_abs_diff_eq!(ease_in(0.5, 0.5), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_ease_in_mirror_complement() {
        for &c in &CURVES {
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                assert_abs_diff_eq!(
                    ease_in(t, c),
                    1.0 - ease_in(1.0 - t, -c),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_families_are_mirrors() {
        for &c in &CURVES {
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                assert_abs_diff_eq!(ease_out(t, c), ease_in(t, -c), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_monotonic() {
        for &c in &CURVES {
            let mut prev_in = 0.0;
            let mut prev_out = 0.0;
            for i in 1..=100 {
                let t = i as f64 / 100.0;
                let a = ease_in(t, c);
                let b = ease_out(t, c);
                assert!(a >= prev_in, "ease_in not monotonic at c={c}, t={t}");
                assert!(b >= prev_out, "ease_out not monotonic at c={c}, t={t}");
                prev_in = a;
                prev_out = b;
            }
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(ease_in(-0.5, 0.4), 0.0);
        assert_eq!(ease_in(1.5, 0.4), 1.0);
        assert_eq!(ease_out(2.0, -0.4), 1.0);
    }

    #[test]
    fn test_curve_kind_classify() {
        assert_eq!(CurveKind::classify(CurveFamily::EaseIn, 0.0), CurveKind::Linear);
        assert_eq!(CurveKind::classify(CurveFamily::EaseIn, 0.5), CurveKind::Convex);
        assert_eq!(CurveKind::classify(CurveFamily::EaseIn, -0.5), CurveKind::Concave);
        assert_eq!(CurveKind::classify(CurveFamily::EaseOut, 0.5), CurveKind::Concave);
        assert_eq!(CurveKind::classify(CurveFamily::EaseOut, -0.5), CurveKind::Convex);
    }

    #[test]
    fn test_family_apply() {
        assert_eq!(CurveFamily::EaseIn.apply(0.5, 1.0), ease_in(0.5, 1.0));
        assert_eq!(CurveFamily::EaseOut.apply(0.5, 1.0), ease_out(0.5, 1.0));
    }
}
