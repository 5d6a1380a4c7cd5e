//! Easing curves.
//!
//! Curves are addressed by the names designers use in presets (`"easeOut"`,
//! `"backOut"`) or given as a CSS-style cubic bezier. The performance
//! controller collapses expensive or overshooting curves to [`Easing::Ease`]
//! in battery mode and everything collapses to [`Easing::Linear`] under
//! reduced motion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    /// Constant speed
    Linear,
    /// The CSS `ease` keyword
    Ease,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
    CircIn,
    CircOut,
    /// Overshoots slightly, then settles
    BackOut,
    /// Pulls back before launching forward
    Anticipate,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier([f32; 4]),
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the curve.
    /// Overshooting curves may leave `[0, 1]` in the middle of the range.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Ease => cubic_bezier(t, 0.25, 0.1, 0.25, 1.0),
            Easing::EaseIn => cubic_bezier(t, 0.42, 0.0, 1.0, 1.0),
            Easing::EaseOut => cubic_bezier(t, 0.0, 0.0, 0.58, 1.0),
            Easing::EaseInOut => cubic_bezier(t, 0.42, 0.0, 0.58, 1.0),
            Easing::CircIn => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::CircOut => (1.0 - (t - 1.0) * (t - 1.0)).max(0.0).sqrt(),
            Easing::BackOut => cubic_bezier(t, 0.33, 1.53, 0.69, 0.99),
            Easing::Anticipate => anticipate(t),
            Easing::CubicBezier([x1, y1, x2, y2]) => cubic_bezier(t, *x1, *y1, *x2, *y2),
        }
    }

    /// The cheaper curve used when the device is in battery mode.
    pub fn simplified(&self) -> Easing {
        match self {
            Easing::Linear => Easing::Linear,
            _ => Easing::Ease,
        }
    }

    /// Preset name, or `None` for a raw bezier.
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            Easing::Linear => "linear",
            Easing::Ease => "ease",
            Easing::EaseIn => "easeIn",
            Easing::EaseOut => "easeOut",
            Easing::EaseInOut => "easeInOut",
            Easing::CircIn => "circIn",
            Easing::CircOut => "circOut",
            Easing::BackOut => "backOut",
            Easing::Anticipate => "anticipate",
            Easing::CubicBezier(_) => return None,
        })
    }

    pub fn from_name(name: &str) -> Option<Easing> {
        let easing = match name {
            "linear" => Easing::Linear,
            "ease" => Easing::Ease,
            "easeIn" | "ease-in" => Easing::EaseIn,
            "easeOut" | "ease-out" => Easing::EaseOut,
            "easeInOut" | "ease-in-out" => Easing::EaseInOut,
            "circIn" => Easing::CircIn,
            "circOut" => Easing::CircOut,
            "backOut" => Easing::BackOut,
            "anticipate" => Easing::Anticipate,
            _ => return parse_cubic_bezier(name),
        };
        Some(easing)
    }

    /// Render as a CSS `transition-timing-function` value.
    pub fn to_css(&self) -> String {
        match self {
            Easing::Linear => "linear".into(),
            Easing::Ease => "ease".into(),
            Easing::EaseIn => "ease-in".into(),
            Easing::EaseOut => "ease-out".into(),
            Easing::EaseInOut => "ease-in-out".into(),
            Easing::CircIn => "cubic-bezier(0.55, 0, 1, 0.45)".into(),
            Easing::CircOut => "cubic-bezier(0, 0.55, 0.45, 1)".into(),
            Easing::BackOut => "cubic-bezier(0.33, 1.53, 0.69, 0.99)".into(),
            Easing::Anticipate => "cubic-bezier(0.36, 0, 0.66, -0.56)".into(),
            Easing::CubicBezier([x1, y1, x2, y2]) => {
                format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.to_css()),
        }
    }
}

impl FromStr for Easing {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::from_name(s.trim()).ok_or_else(|| MotionError::UnknownEasing(s.to_string()))
    }
}

fn parse_cubic_bezier(s: &str) -> Option<Easing> {
    let body = s.strip_prefix("cubic-bezier(")?.strip_suffix(')')?;
    let points: Vec<f32> = body
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match points.as_slice() {
        [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
            Some(Easing::CubicBezier([*x1, *y1, *x2, *y2]))
        }
        _ => None,
    }
}

fn anticipate(t: f32) -> f32 {
    let t = t * 2.0;
    if t < 1.0 {
        0.5 * cubic_bezier(t, 0.31, 0.01, 0.66, -0.59)
    } else {
        0.5 * (2.0 - 2f32.powf(-10.0 * (t - 1.0)))
    }
}

/// Solve the bezier for `x = t` with Newton-Raphson, then read off `y`.
/// Assumes x1 and x2 lie in [0, 1], which keeps x monotonic.
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let mut u = t;
    for _ in 0..8 {
        let x = bezier_component(u, x1, x2) - t;
        let slope = bezier_slope(u, x1, x2);
        if x.abs() < 1e-6 || slope.abs() < 1e-6 {
            break;
        }
        u -= x / slope;
    }
    bezier_component(u.clamp(0.0, 1.0), y1, y2)
}

fn bezier_component(u: f32, p1: f32, p2: f32) -> f32 {
    let mu = 1.0 - u;
    3.0 * mu * mu * u * p1 + 3.0 * mu * u * u * p2 + u * u * u
}

fn bezier_slope(u: f32, p1: f32, p2: f32) -> f32 {
    let mu = 1.0 - u;
    3.0 * mu * mu * p1 + 6.0 * mu * u * (p2 - p1) + 3.0 * u * u * (1.0 - p2)
}
