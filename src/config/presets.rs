use super::{AnimationConfig, Trigger};
use crate::animation::{Easing, SpringConfig, Style};

/// What an unknown preset id resolves to.
pub const FALLBACK_PRESET: &str = "fadeIn";

pub const PRESET_IDS: [&str; 13] = [
    "fadeIn",
    "fadeInUp",
    "fadeInDown",
    "slideInLeft",
    "slideInRight",
    "scaleIn",
    "hoverLift",
    "pressScale",
    "focusRing",
    "staggerItem",
    "parallaxSlow",
    "textReveal",
    "pageTransition",
];

const COMPONENT: &str = "preset";

/// The built-in catalog seeded into every registry.
pub fn builtin_presets() -> Vec<AnimationConfig> {
    let reveal = |id: &str, from: Style, duration: f32| {
        AnimationConfig::new(id, COMPONENT)
            .duration(duration)
            .easing(Easing::EaseOut)
            .styles(from, Style::VISIBLE)
    };

    vec![
        reveal("fadeIn", Style::HIDDEN, 600.0),
        reveal("fadeInUp", Style::HIDDEN.translate(0.0, 24.0), 600.0),
        reveal("fadeInDown", Style::HIDDEN.translate(0.0, -24.0), 600.0),
        reveal("slideInLeft", Style::HIDDEN.translate(-48.0, 0.0), 700.0),
        reveal("slideInRight", Style::HIDDEN.translate(48.0, 0.0), 700.0),
        reveal("scaleIn", Style::HIDDEN.scale(0.9), 500.0).easing(Easing::BackOut),
        AnimationConfig::new("hoverLift", COMPONENT)
            .trigger(Trigger::Hover)
            .duration(200.0)
            .styles(Style::VISIBLE, Style::VISIBLE.translate(0.0, -4.0).scale(1.02)),
        AnimationConfig::new("pressScale", COMPONENT)
            .trigger(Trigger::Click)
            .duration(100.0)
            .styles(Style::VISIBLE, Style::VISIBLE.scale(0.97))
            .spring(SpringConfig::SNAPPY),
        AnimationConfig::new("focusRing", COMPONENT)
            .trigger(Trigger::Focus)
            .duration(150.0)
            .easing(Easing::EaseInOut)
            .styles(Style::VISIBLE, Style::VISIBLE.scale(1.02)),
        reveal("staggerItem", Style::HIDDEN.translate(0.0, 16.0), 400.0).stagger(100.0),
        AnimationConfig::new("parallaxSlow", COMPONENT)
            .trigger(Trigger::Scroll)
            .duration(0.0)
            .easing(Easing::Linear)
            .styles(Style::VISIBLE, Style::VISIBLE.translate(0.0, -120.0))
            .spring(SpringConfig::GENTLE),
        reveal("textReveal", Style::HIDDEN.translate(0.0, 8.0).blur(4.0), 500.0).stagger(30.0),
        AnimationConfig::new("pageTransition", COMPONENT)
            .trigger(Trigger::Manual)
            .duration(300.0)
            .easing(Easing::EaseInOut)
            .styles(Style::HIDDEN.translate(0.0, 8.0), Style::VISIBLE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_ids_and_validates() {
        let presets = builtin_presets();
        let ids: Vec<_> = presets.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, PRESET_IDS);
        for preset in &presets {
            preset.validate().unwrap();
        }
        assert!(PRESET_IDS.contains(&FALLBACK_PRESET));
    }
}
