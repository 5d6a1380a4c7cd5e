use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Motion features a page can pull in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Motion,
    InView,
    ScrollProgress,
    Parallax,
    Stagger,
    TextReveal,
    Gesture,
    Spring,
}

impl Feature {
    /// Features that need the drag or scroll-linked runtime.
    pub fn needs_full_bundle(&self) -> bool {
        matches!(
            self,
            Feature::Gesture | Feature::ScrollProgress | Feature::Parallax
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureBundle {
    /// Tweens and viewport reveals only.
    #[default]
    Minimal,
    /// Adds drag gestures and scroll-linked values.
    Full,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub features: BTreeMap<Feature, u32>,
    pub presets: BTreeMap<String, u32>,
    pub unused_presets: Vec<String>,
    pub recommended_bundle: FeatureBundle,
}

#[derive(Default)]
struct UsageState {
    features: BTreeMap<Feature, u32>,
    presets: BTreeMap<String, u32>,
}

/// Counts which hooks and presets a page actually uses.
#[derive(Clone, Default)]
pub struct FeatureUsage {
    state: Rc<RefCell<UsageState>>,
}

impl FeatureUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_feature(&self, feature: Feature) {
        *self.state.borrow_mut().features.entry(feature).or_insert(0) += 1;
    }

    pub fn record_preset(&self, id: &str) {
        *self
            .state
            .borrow_mut()
            .presets
            .entry(id.to_string())
            .or_insert(0) += 1;
    }

    pub fn feature_count(&self, feature: Feature) -> u32 {
        self.state
            .borrow()
            .features
            .get(&feature)
            .copied()
            .unwrap_or(0)
    }

    pub fn recommended_bundle(&self) -> FeatureBundle {
        let state = self.state.borrow();
        if state.features.keys().any(Feature::needs_full_bundle) {
            FeatureBundle::Full
        } else {
            FeatureBundle::Minimal
        }
    }

    /// Usage so far, with `known_presets` that were never resolved listed
    /// as unused.
    pub fn report<'a>(&self, known_presets: impl IntoIterator<Item = &'a str>) -> UsageReport {
        let recommended_bundle = self.recommended_bundle();
        let state = self.state.borrow();
        let mut unused_presets: Vec<String> = known_presets
            .into_iter()
            .filter(|id| !state.presets.contains_key(*id))
            .map(str::to_string)
            .collect();
        unused_presets.sort();
        UsageReport {
            features: state.features.clone(),
            presets: state.presets.clone(),
            unused_presets,
            recommended_bundle,
        }
    }

    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.features.clear();
        state.presets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_until_scroll_or_drag() {
        let usage = FeatureUsage::new();
        usage.record_feature(Feature::Motion);
        usage.record_feature(Feature::Stagger);
        assert_eq!(usage.recommended_bundle(), FeatureBundle::Minimal);
        usage.record_feature(Feature::Parallax);
        assert_eq!(usage.recommended_bundle(), FeatureBundle::Full);
    }

    #[test]
    fn test_report_lists_unused_presets() {
        let usage = FeatureUsage::new();
        usage.record_preset("fadeIn");
        usage.record_preset("fadeIn");
        usage.record_feature(Feature::InView);
        let report = usage.report(["fadeIn", "scaleIn", "hoverLift"]);
        assert_eq!(report.presets.get("fadeIn"), Some(&2));
        assert_eq!(report.unused_presets, vec!["hoverLift", "scaleIn"]);
        assert_eq!(report.features.get(&Feature::InView), Some(&1));
        assert_eq!(usage.feature_count(Feature::Gesture), 0);
    }
}
