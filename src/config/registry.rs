use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::presets::{FALLBACK_PRESET, builtin_presets};
use super::{AnimationConfig, Trigger};
use crate::animation::{Easing, Style, Transition};
use crate::error::{MotionError, Result};
use crate::performance::PerformanceController;

/// Per-use adjustments layered over a registered config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverride {
    pub duration_ms: Option<f32>,
    pub easing: Option<Easing>,
    pub delay_ms: Option<f32>,
    pub stagger_ms: Option<f32>,
    pub trigger: Option<Trigger>,
    pub from: Option<Style>,
    pub to: Option<Style>,
}

impl ConfigOverride {
    /// Merge into `config`. Invalid numbers are logged and skipped so the
    /// base value stays in effect.
    pub fn apply(&self, config: &mut AnimationConfig) {
        let props = &mut config.properties;
        if let Some(duration) = self.duration_ms {
            if duration.is_finite() && duration >= 0.0 {
                props.duration_ms = duration;
            } else {
                log::warn!("ignoring invalid duration override {duration} for {}", config.id);
            }
        }
        if let Some(delay) = self.delay_ms {
            if delay.is_finite() && delay >= 0.0 {
                props.delay_ms = delay;
            } else {
                log::warn!("ignoring invalid delay override {delay} for {}", config.id);
            }
        }
        if let Some(stagger) = self.stagger_ms {
            if stagger.is_finite() && stagger >= 0.0 {
                props.stagger_ms = Some(stagger);
            } else {
                log::warn!("ignoring invalid stagger override {stagger} for {}", config.id);
            }
        }
        if let Some(easing) = self.easing {
            props.easing = easing;
        }
        if let Some(from) = self.from {
            props.from = from.sanitized(props.from);
        }
        if let Some(to) = self.to {
            props.to = to.sanitized(props.to);
        }
        if let Some(trigger) = self.trigger {
            config.trigger = trigger;
        }
    }
}

/// A config ready to play: overrides merged, timing adjusted for the
/// current performance mode and motion preference.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAnimation {
    pub config: AnimationConfig,
    pub transition: Transition,
    pub reduced_motion: bool,
    /// The requested id was unknown and the fallback was used.
    pub fell_back: bool,
}

impl ResolvedAnimation {
    /// Recompute timing and the motion flag for the controller's current
    /// mode and preference.
    pub fn refresh(&mut self, controller: &PerformanceController) {
        let respect = self.config.accessibility.respect_reduced_motion;
        let base = self.config.properties.transition();
        self.reduced_motion = respect && controller.is_reduced_motion();
        self.transition = if respect {
            controller.adjust(&base)
        } else {
            Transition {
                duration_ms: base.duration_ms * controller.mode().duration_factor(),
                ..base
            }
        };
    }

    /// The style to render before activation. Under reduced motion an
    /// entrance starts in its final state and anything else stays at rest.
    pub fn initial(&self) -> Style {
        if self.reduced_motion {
            self.resting()
        } else {
            self.config.properties.from
        }
    }

    /// What a static render shows when motion is off.
    pub fn resting(&self) -> Style {
        if self.config.trigger.is_entrance() {
            self.config.properties.to
        } else {
            self.config.properties.from
        }
    }

    pub fn target(&self) -> Style {
        self.config.properties.to
    }
}

struct RegistryInner {
    configs: RefCell<BTreeMap<String, AnimationConfig>>,
    presets: BTreeSet<String>,
}

/// Named animation configs: the read-only preset catalog plus whatever the
/// application registers at runtime.
#[derive(Clone)]
pub struct AnimationRegistry {
    inner: Rc<RegistryInner>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        let presets = builtin_presets();
        let ids = presets.iter().map(|p| p.id.clone()).collect();
        let configs = presets.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            inner: Rc::new(RegistryInner {
                configs: RefCell::new(configs),
                presets: ids,
            }),
        }
    }

    /// Add a runtime config. Presets and existing ids are rejected.
    pub fn register(&self, config: AnimationConfig) -> Result<()> {
        config.validate()?;
        if self.is_preset(&config.id) {
            return Err(MotionError::ReadOnlyPreset(config.id));
        }
        let mut configs = self.inner.configs.borrow_mut();
        if configs.contains_key(&config.id) {
            return Err(MotionError::DuplicateId(config.id));
        }
        log::debug!("registered animation {} for {}", config.id, config.component);
        configs.insert(config.id.clone(), config);
        Ok(())
    }

    /// Import one config object or an array of them. Nothing is registered
    /// unless every entry is valid.
    pub fn register_json(&self, json: &str) -> Result<usize> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Import {
            Many(Vec<AnimationConfig>),
            One(Box<AnimationConfig>),
        }

        let configs = match serde_json::from_str::<Import>(json) {
            Ok(Import::Many(configs)) => configs,
            Ok(Import::One(config)) => vec![*config],
            // Re-parse as a single config for a precise error message.
            Err(_) => vec![serde_json::from_str::<AnimationConfig>(json)?],
        };

        let mut seen = BTreeSet::new();
        for config in &configs {
            config.validate()?;
            if self.is_preset(&config.id) {
                return Err(MotionError::ReadOnlyPreset(config.id.clone()));
            }
            if self.contains(&config.id) || !seen.insert(config.id.as_str()) {
                return Err(MotionError::DuplicateId(config.id.clone()));
            }
        }

        let count = configs.len();
        for config in configs {
            self.register(config)?;
        }
        Ok(count)
    }

    /// Look up a config. A miss is logged, not an error.
    pub fn get(&self, id: &str) -> Option<AnimationConfig> {
        let found = self.inner.configs.borrow().get(id).cloned();
        if found.is_none() {
            log::warn!("animation preset `{id}` not found");
        }
        found
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.configs.borrow().contains_key(id)
    }

    pub fn is_preset(&self, id: &str) -> bool {
        self.inner.presets.contains(id)
    }

    pub fn for_component(&self, component: &str) -> Vec<AnimationConfig> {
        self.inner
            .configs
            .borrow()
            .values()
            .filter(|config| config.component == component)
            .cloned()
            .collect()
    }

    pub fn remove(&self, id: &str) -> Result<AnimationConfig> {
        if self.is_preset(id) {
            return Err(MotionError::ReadOnlyPreset(id.to_string()));
        }
        self.inner
            .configs
            .borrow_mut()
            .remove(id)
            .ok_or_else(|| MotionError::UnknownPreset(id.to_string()))
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.configs.borrow().keys().cloned().collect()
    }

    pub fn preset_ids(&self) -> impl Iterator<Item = &str> {
        self.inner.presets.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.configs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every config, keyed by id.
    pub fn snapshot(&self) -> BTreeMap<String, AnimationConfig> {
        self.inner.configs.borrow().clone()
    }

    /// Preset, then overrides, then performance adjustment. Unknown ids fall
    /// back to the base fade-in.
    pub fn resolve(
        &self,
        id: &str,
        overrides: Option<&ConfigOverride>,
        controller: &PerformanceController,
    ) -> ResolvedAnimation {
        let (mut config, fell_back) = match self.get(id) {
            Some(config) => (config, false),
            None => {
                log::warn!("falling back to `{FALLBACK_PRESET}` for `{id}`");
                let fallback = self
                    .inner
                    .configs
                    .borrow()
                    .get(FALLBACK_PRESET)
                    .cloned()
                    .unwrap_or_else(|| AnimationConfig::new(FALLBACK_PRESET, "preset"));
                (fallback, true)
            }
        };

        if let Some(overrides) = overrides {
            overrides.apply(&mut config);
        }

        let transition = config.properties.transition();
        let mut resolved = ResolvedAnimation {
            config,
            transition,
            reduced_motion: false,
            fell_back,
        };
        resolved.refresh(controller);
        resolved
    }
}

impl Default for AnimationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PRESET_IDS;
    use crate::performance::PerformanceMode;
    use crate::value::MotionValue;

    fn controller(mode: PerformanceMode, reduced: bool) -> PerformanceController {
        PerformanceController::new(mode, MotionValue::new(reduced))
    }

    #[test]
    fn test_seeded_with_presets() {
        let registry = AnimationRegistry::new();
        assert_eq!(registry.len(), PRESET_IDS.len());
        assert!(registry.get("fadeInUp").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_register_and_filter_by_component() {
        let registry = AnimationRegistry::new();
        registry
            .register(AnimationConfig::new("hero-title", "Hero"))
            .unwrap();
        registry
            .register(AnimationConfig::new("hero-cta", "Hero").trigger(Trigger::Hover))
            .unwrap();
        assert_eq!(registry.for_component("Hero").len(), 2);
        assert!(matches!(
            registry.register(AnimationConfig::new("hero-cta", "Hero")),
            Err(MotionError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_presets_are_read_only() {
        let registry = AnimationRegistry::new();
        assert!(matches!(
            registry.remove("fadeIn"),
            Err(MotionError::ReadOnlyPreset(_))
        ));
        assert!(matches!(
            registry.register(AnimationConfig::new("scaleIn", "Card")),
            Err(MotionError::ReadOnlyPreset(_))
        ));
        assert!(matches!(
            registry.remove("missing"),
            Err(MotionError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let registry = AnimationRegistry::new();
        let err = registry
            .register(AnimationConfig::new("broken", "Card").duration(-1.0))
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidDuration { .. }));
        assert!(!registry.contains("broken"));
    }

    #[test]
    fn test_resolve_applies_override_and_mode() {
        let registry = AnimationRegistry::new();
        let overrides = ConfigOverride {
            duration_ms: Some(300.0),
            ..Default::default()
        };
        let resolved = registry.resolve(
            "fadeInUp",
            Some(&overrides),
            &controller(PerformanceMode::Battery, false),
        );
        assert!(!resolved.fell_back);
        assert_eq!(resolved.transition.duration_ms, 150.0);
        assert_eq!(resolved.initial(), Style::HIDDEN.translate(0.0, 24.0));
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_fade_in() {
        let registry = AnimationRegistry::new();
        let resolved = registry.resolve("doesNotExist", None, &controller(PerformanceMode::High, false));
        assert!(resolved.fell_back);
        assert_eq!(resolved.config.id, "fadeIn");
        assert_eq!(resolved.transition.duration_ms, 600.0);
    }

    #[test]
    fn test_resolve_under_reduced_motion() {
        let registry = AnimationRegistry::new();
        let resolved = registry.resolve("slideInLeft", None, &controller(PerformanceMode::High, true));
        assert!(resolved.reduced_motion);
        assert_eq!(resolved.transition.duration_ms, 0.0);
        assert_eq!(resolved.initial(), Style::VISIBLE);

        let hover = registry.resolve("hoverLift", None, &controller(PerformanceMode::High, true));
        assert_eq!(hover.initial(), Style::VISIBLE);
        assert_eq!(hover.resting(), hover.config.properties.from);
    }

    #[test]
    fn test_refresh_follows_mode_changes() {
        let registry = AnimationRegistry::new();
        let controller = controller(PerformanceMode::High, false);
        let mut resolved = registry.resolve("fadeIn", None, &controller);
        assert_eq!(resolved.transition.duration_ms, 600.0);
        controller.set_mode(PerformanceMode::Battery);
        resolved.refresh(&controller);
        assert_eq!(resolved.transition.duration_ms, 300.0);
    }

    #[test]
    fn test_invalid_override_is_ignored() {
        let registry = AnimationRegistry::new();
        let overrides = ConfigOverride {
            duration_ms: Some(f32::NAN),
            ..Default::default()
        };
        let resolved = registry.resolve("fadeIn", Some(&overrides), &controller(PerformanceMode::High, false));
        assert_eq!(resolved.transition.duration_ms, 600.0);
    }

    #[test]
    fn test_register_json() {
        let registry = AnimationRegistry::new();
        let json = r#"[
            {"id": "team-card", "component": "TeamCard",
             "trigger": {"type": "hover"},
             "properties": {"durationMs": 250, "easing": "backOut"}},
            {"id": "contact-form", "component": "ContactForm"}
        ]"#;
        assert_eq!(registry.register_json(json).unwrap(), 2);
        let card = registry.get("team-card").unwrap();
        assert_eq!(card.trigger, Trigger::Hover);
        assert_eq!(card.properties.easing, Easing::BackOut);

        let bad = r#"[{"id": "a", "component": "A"}, {"id": "fadeIn", "component": "B"}]"#;
        assert!(registry.register_json(bad).is_err());
        assert!(!registry.contains("a"));

        assert!(matches!(
            registry.register_json("not json"),
            Err(MotionError::Serialization(_))
        ));
    }
}
