//! Easing curves mapping linear time progress to eased progress.
//!
//! Curves take `t` in `[0, 1]` and return exactly `0` at `t = 0` and `1` at `t = 1`.
//! In between, `back` and `elastic` overshoot outside `[0, 1]`.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::trigger::GrammarError;

/// Default overshoot of the `back` family.
pub const DEFAULT_OVERSHOOT: f32 = 1.701_58;
/// Default amplitude of the `elastic` family.
pub const DEFAULT_AMPLITUDE: f32 = 1.0;
/// Default period of the `elastic` family.
pub const DEFAULT_PERIOD: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Which end of the curve is shaped.
pub enum Ease {
    /// Slow start.
    In,
    /// Slow end.
    Out,
    /// Slow start and end.
    InOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Easing curve.
pub enum Easing {
    /// Identity mapping.
    Linear,
    /// Polynomial curve of degree `power + 1` (`power1` is quadratic).
    Power {
        /// Strength, 1 to 4.
        power: u8,
        /// Shaped end.
        ease: Ease,
    },
    /// Sinusoidal curve.
    Sine(Ease),
    /// Curve that pulls back past its endpoint before settling.
    Back {
        /// Shaped end.
        ease: Ease,
        /// Amount of overshoot.
        overshoot: f32,
    },
    /// Oscillating spring-like curve.
    Elastic {
        /// Shaped end.
        ease: Ease,
        /// Oscillation amplitude, values below 1 are treated as 1.
        amplitude: f32,
        /// Oscillation period as a fraction of the duration.
        period: f32,
    },
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Power {
            power: 1,
            ease: Ease::Out,
        }
    }
}

impl Easing {
    /// Map linear progress to eased progress. Input is clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::Power { power, ease } => {
                let exponent = i32::from(power.clamp(1, 4)) + 1;
                shape(ease, t, |x| x.powi(exponent))
            }
            Easing::Sine(ease) => shape(ease, t, |x| 1.0 - (x * FRAC_PI_2).cos()),
            Easing::Back { ease, overshoot } => {
                shape(ease, t, |x| x * x * ((overshoot + 1.0) * x - overshoot))
            }
            Easing::Elastic {
                ease,
                amplitude,
                period,
            } => {
                let amplitude = amplitude.max(1.0);
                let period = if period > 0.0 { period } else { DEFAULT_PERIOD };
                let phase = period / TAU * (1.0 / amplitude).asin();
                shape(ease, t, |x| {
                    let shifted = x - 1.0;
                    let decay = amplitude * 2_f32.powf(10.0 * shifted);
                    -(decay * ((shifted - phase) * TAU / period).sin())
                })
            }
        }
    }
}

// Derive the out/in-out variants from an ease-in curve.
fn shape(ease: Ease, t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    match ease {
        Ease::In => ease_in(t),
        Ease::Out => 1.0 - ease_in(1.0 - t),
        Ease::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0) / 2.0
            } else {
                1.0 - ease_in((1.0 - t) * 2.0) / 2.0
            }
        }
    }
}

impl FromStr for Easing {
    type Err = GrammarError;

    /// Parse names such as `none`, `power2.out`, `sine.inOut`, `back.out(1.7)`
    /// or `elastic.out(1, 0.6)`. A family without a variant defaults to `.out`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || GrammarError::Easing(raw.to_owned());
        let text = raw.trim();

        let (name, args) = match text.split_once('(') {
            Some((name, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(invalid)?;
                let args = inner
                    .split(',')
                    .map(str::trim)
                    .filter(|arg| !arg.is_empty())
                    .map(str::parse::<f32>)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_parse| invalid())?;
                (name.trim(), args)
            }
            None => (text, Vec::new()),
        };

        let (family, variant) = name.split_once('.').unwrap_or((name, "out"));
        let ease = match variant {
            "in" => Ease::In,
            "out" => Ease::Out,
            "inOut" => Ease::InOut,
            _ => return Err(invalid()),
        };

        let power = |power: u8| Easing::Power { power, ease };
        let easing = match family {
            "none" | "linear" | "power0" => Easing::Linear,
            "power1" | "quad" => power(1),
            "power2" | "cubic" => power(2),
            "power3" | "quart" => power(3),
            "power4" | "quint" | "strong" => power(4),
            "sine" => Easing::Sine(ease),
            "back" => Easing::Back {
                ease,
                overshoot: args.first().copied().unwrap_or(DEFAULT_OVERSHOOT),
            },
            "elastic" => Easing::Elastic {
                ease,
                amplitude: args.first().copied().unwrap_or(DEFAULT_AMPLITUDE),
                period: args.get(1).copied().unwrap_or(DEFAULT_PERIOD),
            },
            _ => return Err(invalid()),
        };
        Ok(easing)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = |ease: &Ease| match ease {
            Ease::In => "in",
            Ease::Out => "out",
            Ease::InOut => "inOut",
        };
        match self {
            Easing::Linear => write!(formatter, "none"),
            Easing::Power { power, ease } => write!(formatter, "power{power}.{}", variant(ease)),
            Easing::Sine(ease) => write!(formatter, "sine.{}", variant(ease)),
            Easing::Back { ease, overshoot } => {
                write!(formatter, "back.{}({overshoot})", variant(ease))
            }
            Easing::Elastic {
                ease,
                amplitude,
                period,
            } => write!(
                formatter,
                "elastic.{}({amplitude}, {period})",
                variant(ease)
            ),
        }
    }
}

/// Ease used for smoothed scrubbing.
pub(crate) const SCRUB_SMOOTHING: Easing = Easing::Power {
    power: 3,
    ease: Ease::Out,
};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn all_curves() -> Vec<Easing> {
        [
            "none",
            "power1.out",
            "power2.in",
            "power3.inOut",
            "sine.inOut",
            "back.out(1.7)",
            "back.inOut",
            "elastic.out(1, 0.6)",
            "elastic.in",
        ]
        .into_iter()
        .map(|name| name.parse().expect("valid easing name"))
        .collect()
    }

    #[test]
    fn parses_source_names() {
        assert_eq!("none".parse::<Easing>().ok(), Some(Easing::Linear));
        assert_eq!(
            "power2.out".parse::<Easing>().ok(),
            Some(Easing::Power {
                power: 2,
                ease: Ease::Out
            })
        );
        assert_eq!(
            "power2".parse::<Easing>().ok(),
            Some(Easing::Power {
                power: 2,
                ease: Ease::Out
            })
        );
        assert_eq!(
            "back.out(2)".parse::<Easing>().ok(),
            Some(Easing::Back {
                ease: Ease::Out,
                overshoot: 2.0
            })
        );
        assert_eq!(
            "elastic.out(1, 0.6)".parse::<Easing>().ok(),
            Some(Easing::Elastic {
                ease: Ease::Out,
                amplitude: 1.0,
                period: 0.6
            })
        );
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("bounce.out".parse::<Easing>().is_err(), "unknown family");
        assert!("power2.sideways".parse::<Easing>().is_err(), "unknown variant");
        assert!("back.out(1.7".parse::<Easing>().is_err(), "unclosed arguments");
        assert!("back.out(x)".parse::<Easing>().is_err(), "non-numeric argument");
    }

    #[test]
    fn display_round_trips_through_parse() {
        for easing in all_curves() {
            let reparsed: Easing = easing.to_string().parse().expect("display output parses");
            assert_eq!(reparsed, easing);
        }
    }

    #[test]
    fn back_out_overshoots() {
        let easing: Easing = "back.out(1.7)".parse().expect("valid easing name");
        let peak = (1..100)
            .map(|step| easing.apply(step as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "back.out should exceed 1 before settling");
    }

    #[test]
    fn in_out_is_symmetric_at_midpoint() {
        let easing: Easing = "power2.inOut".parse().expect("valid easing name");
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn endpoints_are_exact(index in 0_usize..9) {
            let curves = all_curves();
            let easing = curves[index % curves.len()];
            prop_assert!((easing.apply(0.0)).abs() < f32::EPSILON);
            prop_assert!((easing.apply(1.0) - 1.0).abs() < f32::EPSILON);
        }

        #[test]
        fn power_curves_stay_in_unit_range(t in 0.0_f32..=1.0, power in 1_u8..=4) {
            for ease in [Ease::In, Ease::Out, Ease::InOut] {
                let value = Easing::Power { power, ease }.apply(t);
                prop_assert!((0.0..=1.0).contains(&value));
            }
        }

        #[test]
        fn out_of_range_input_is_clamped(t in -5.0_f32..5.0) {
            let value = Easing::Linear.apply(t);
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
