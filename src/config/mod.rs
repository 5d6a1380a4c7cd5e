//! Animation configuration: triggers, timing, and the preset registry.

mod presets;
mod registry;

pub use presets::{FALLBACK_PRESET, PRESET_IDS, builtin_presets};
pub use registry::{AnimationRegistry, ConfigOverride, ResolvedAnimation};

use serde::{Deserialize, Serialize};

use crate::animation::{Easing, SpringConfig, Style, Transition};
use crate::error::{MotionError, Result};

/// Intersection parameters for viewport-triggered animations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewportOptions {
    /// Fraction of the element that must be visible, in `[0, 1]`.
    pub threshold: f32,
    /// Pixels added to (or, negative, removed from) every side of the
    /// viewport before testing.
    pub root_margin: f32,
    /// Stay triggered after the first entry.
    pub once: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: 0.0,
            once: true,
        }
    }
}

/// What activates an animation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Trigger {
    Viewport(ViewportOptions),
    Hover,
    /// Pointer or keyboard press.
    Click,
    Focus,
    /// Continuously driven by scroll progress.
    Scroll,
    /// Only `trigger_animation()` activates it.
    Manual,
}

impl Trigger {
    pub fn name(&self) -> &'static str {
        match self {
            Trigger::Viewport(_) => "viewport",
            Trigger::Hover => "hover",
            Trigger::Click => "click",
            Trigger::Focus => "focus",
            Trigger::Scroll => "scroll",
            Trigger::Manual => "manual",
        }
    }

    /// Triggers that reveal content, as opposed to reacting to input or
    /// following scroll.
    pub fn is_entrance(&self) -> bool {
        matches!(self, Trigger::Viewport(_) | Trigger::Manual)
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::Viewport(ViewportOptions::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationProperties {
    pub duration_ms: f32,
    pub easing: Easing,
    pub delay_ms: f32,
    /// Gap between consecutive items when used in a stagger.
    pub stagger_ms: Option<f32>,
    pub from: Style,
    pub to: Style,
    /// Drive with a spring instead of a timed curve.
    pub spring: Option<SpringConfig>,
}

impl AnimationProperties {
    pub fn transition(&self) -> Transition {
        Transition::new(self.duration_ms, self.easing).delay(self.delay_ms)
    }
}

impl Default for AnimationProperties {
    fn default() -> Self {
        Self {
            duration_ms: 600.0,
            easing: Easing::EaseOut,
            delay_ms: 0.0,
            stagger_ms: None,
            from: Style::HIDDEN,
            to: Style::VISIBLE,
            spring: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityOptions {
    /// Honour reduced motion. Turning this off is only sensible for motion
    /// that carries meaning, such as a progress indicator.
    pub respect_reduced_motion: bool,
    /// Spoken politely when the animation activates.
    pub announcement: Option<String>,
}

impl Default for AccessibilityOptions {
    fn default() -> Self {
        Self {
            respect_reduced_motion: true,
            announcement: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub id: String,
    pub component: String,
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default)]
    pub properties: AnimationProperties,
    #[serde(default)]
    pub accessibility: AccessibilityOptions,
}

impl AnimationConfig {
    pub fn new(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            trigger: Trigger::default(),
            properties: AnimationProperties::default(),
            accessibility: AccessibilityOptions::default(),
        }
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.properties.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.properties.easing = easing;
        self
    }

    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.properties.delay_ms = delay_ms;
        self
    }

    pub fn stagger(mut self, stagger_ms: f32) -> Self {
        self.properties.stagger_ms = Some(stagger_ms);
        self
    }

    /// Start and end styles.
    pub fn styles(mut self, from: Style, to: Style) -> Self {
        self.properties.from = from;
        self.properties.to = to;
        self
    }

    pub fn spring(mut self, spring: SpringConfig) -> Self {
        self.properties.spring = Some(spring);
        self
    }

    pub fn announce(mut self, message: impl Into<String>) -> Self {
        self.accessibility.announcement = Some(message.into());
        self
    }

    /// Reject values that cannot be animated.
    pub fn validate(&self) -> Result<()> {
        let props = &self.properties;
        if !props.duration_ms.is_finite() || props.duration_ms < 0.0 {
            return Err(MotionError::InvalidDuration {
                id: self.id.clone(),
                value: props.duration_ms,
            });
        }
        check_non_negative("delay", props.delay_ms)?;
        if let Some(stagger) = props.stagger_ms {
            check_non_negative("stagger", stagger)?;
        }
        if let Trigger::Viewport(options) = &self.trigger
            && !(0.0..=1.0).contains(&options.threshold)
        {
            return Err(MotionError::InvalidParameter {
                name: "threshold",
                value: options.threshold as f64,
            });
        }
        if let Some(spring) = &props.spring {
            check_positive("stiffness", spring.stiffness)?;
            check_non_negative("damping", spring.damping)?;
            check_positive("mass", spring.mass)?;
        }
        if !props.from.is_finite() || !props.to.is_finite() {
            return Err(MotionError::InvalidParameter {
                name: "style",
                value: f64::NAN,
            });
        }
        Ok(())
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MotionError::InvalidParameter {
            name,
            value: value as f64,
        })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MotionError::InvalidParameter {
            name,
            value: value as f64,
        })
    }
}
