use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Timing curves for transitions. Input and output are normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadInOut,
    /// Default for element transitions.
    #[default]
    CubicInOut,
    /// Used for viewport framing.
    SineInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0f64).mul_add(t, 2.0).powi(2) / 2.0
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0f64).mul_add(t, 2.0).powi(3) / 2.0
                }
            }
            Self::SineInOut => (1.0 - (PI * t).cos()) / 2.0,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "quad-in-out" | "quad" => Some(Self::QuadInOut),
            "cubic-in-out" | "cubic" => Some(Self::CubicInOut),
            "sine-in-out" | "sin" | "sine" => Some(Self::SineInOut),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        for e in [
            Easing::Linear,
            Easing::QuadInOut,
            Easing::CubicInOut,
            Easing::SineInOut,
        ] {
            assert!(e.apply(0.0).abs() < 1e-12, "{e:?}");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
            assert!((e.apply(0.5) - 0.5).abs() < 1e-12, "{e:?}");
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::CubicInOut.apply(-3.0), 0.0);
        assert_eq!(Easing::CubicInOut.apply(7.0), 1.0);
    }

    #[test]
    fn names_parse() {
        assert_eq!(Easing::from_name("Sine-In-Out"), Some(Easing::SineInOut));
        assert_eq!(Easing::from_name("cubic"), Some(Easing::CubicInOut));
        assert_eq!(Easing::from_name("bounce"), None);
    }
}
