mod animatable;
mod easing;
mod spring;
mod style;

pub use animatable::{Animatable, interpolate, use_transform};
pub use easing::Easing;
pub use spring::{
    REST_EPSILON, SPRING_TIMESTEP, SpringConfig, SpringDrive, SpringHandle, SpringState,
    animate_spring,
};
pub use style::{Style, StyleValues};

use serde::{Deserialize, Serialize};

/// How a style change should play out, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub easing: Easing,
}

impl Transition {
    pub fn new(duration_ms: f32, easing: Easing) -> Self {
        Self {
            duration_ms,
            delay_ms: 0.0,
            easing,
        }
    }

    /// A transition that applies its end state immediately.
    pub fn instant() -> Self {
        Self::new(0.0, Easing::Linear)
    }

    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// The seconds-based form handed to the view layer.
    pub fn to_spec(&self) -> TransitionSpec {
        TransitionSpec {
            duration: self.duration_ms.max(0.0) / 1000.0,
            delay: self.delay_ms.max(0.0) / 1000.0,
            ease: self.easing,
        }
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(600.0, Easing::EaseOut)
    }
}

/// Transition timing as the renderer consumes it (seconds).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub duration: f32,
    pub delay: f32,
    pub ease: Easing,
}

impl TransitionSpec {
    pub fn is_instant(&self) -> bool {
        self.duration == 0.0 && self.delay == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_to_spec_converts_to_seconds() {
        let spec = Transition::new(400.0, Easing::EaseOut).delay(100.0).to_spec();
        assert!((spec.duration - 0.4).abs() < 1e-6);
        assert!((spec.delay - 0.1).abs() < 1e-6);
        assert_eq!(spec.ease, Easing::EaseOut);
    }

    #[test]
    fn test_instant() {
        assert!(Transition::instant().to_spec().is_instant());
    }
}
