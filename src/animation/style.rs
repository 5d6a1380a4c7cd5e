use serde::{Deserialize, Serialize};

use super::Animatable;
use crate::MotionFields;

/// The animatable visual state of one element.
///
/// Only compositor-friendly properties are modelled: opacity, translation,
/// uniform scale, rotation (degrees) and blur radius (px). Presets describe
/// an animation as a pair of styles, `from` and `to`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, MotionFields)]
#[serde(default)]
pub struct Style {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotate: f32,
    pub blur: f32,
}

impl Style {
    /// Fully visible, untransformed.
    pub const VISIBLE: Self = Self {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        rotate: 0.0,
        blur: 0.0,
    };

    /// Transparent but otherwise untransformed.
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        ..Self::VISIBLE
    };

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn translate(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotate(mut self, degrees: f32) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn blur(mut self, px: f32) -> Self {
        self.blur = px;
        self
    }

    /// False if any component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        [
            self.opacity,
            self.x,
            self.y,
            self.scale,
            self.rotate,
            self.blur,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Replace a malformed style with `fallback` so a bad preset renders
    /// statically instead of propagating NaN into layout.
    pub fn sanitized(self, fallback: Style) -> Style {
        if self.is_finite() {
            Style {
                opacity: self.opacity.clamp(0.0, 1.0),
                blur: self.blur.max(0.0),
                ..self
            }
        } else {
            log::warn!("discarding non-finite style {self:?}");
            fallback
        }
    }

    /// CSS `transform` value for this style.
    pub fn transform_css(&self) -> String {
        format!(
            "translate3d({}px, {}px, 0) scale({}) rotate({}deg)",
            self.x, self.y, self.scale, self.rotate
        )
    }

    /// CSS `filter` value, `None` when there is no blur.
    pub fn filter_css(&self) -> Option<String> {
        (self.blur > 0.0).then(|| format!("blur({}px)", self.blur))
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::VISIBLE
    }
}

impl Animatable for Style {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self {
            opacity: f32::lerp(&from.opacity, &to.opacity, t),
            x: f32::lerp(&from.x, &to.x, t),
            y: f32::lerp(&from.y, &to.y, t),
            scale: f32::lerp(&from.scale, &to.scale, t),
            rotate: f32::lerp(&from.rotate, &to.rotate, t),
            blur: f32::lerp(&from.blur, &to.blur, t),
        }
    }
}
