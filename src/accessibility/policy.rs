use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::value::{MotionValue, Subscription, on_cleanup};

/// Flashes per second above which content risks triggering seizures.
pub const MAX_FLASH_RATE: f32 = 3.0;
/// Rapid color changes tolerated in one animation.
pub const MAX_COLOR_CHANGES: u32 = 5;
/// WCAG AA minimum contrast for normal text.
pub const MIN_CONTRAST_RATIO: f32 = 4.5;

/// Whether motion should be reduced.
///
/// An explicit override wins. Otherwise motion is reduced when the system
/// asks for it or when a screen reader is running.
pub fn resolve_reduced_motion(
    forced: Option<bool>,
    system_preference: bool,
    screen_reader_active: bool,
) -> bool {
    forced.unwrap_or(system_preference || screen_reader_active)
}

/// Inputs to [`validate_animation_safety`]. Unset fields are not checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafetyParams {
    pub flash_rate: Option<f32>,
    pub color_changes: Option<u32>,
    pub contrast_ratio: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub safe: bool,
    pub warnings: Vec<String>,
}

pub fn validate_animation_safety(params: &SafetyParams) -> SafetyReport {
    let mut warnings = Vec::new();

    if let Some(rate) = params.flash_rate
        && rate > MAX_FLASH_RATE
    {
        warnings.push(format!(
            "Flash rate of {rate} per second exceeds the safe limit of {MAX_FLASH_RATE}"
        ));
    }
    if let Some(changes) = params.color_changes
        && changes > MAX_COLOR_CHANGES
    {
        warnings.push(format!(
            "Too many rapid color changes ({changes}, limit {MAX_COLOR_CHANGES})"
        ));
    }
    if let Some(ratio) = params.contrast_ratio
        && ratio < MIN_CONTRAST_RATIO
    {
        warnings.push(format!(
            "Contrast ratio {ratio} is below the WCAG AA minimum of {MIN_CONTRAST_RATIO}"
        ));
    }

    SafetyReport {
        safe: warnings.is_empty(),
        warnings,
    }
}

struct PolicyInner {
    forced: Cell<Option<bool>>,
    system: MotionValue<bool>,
    screen_reader: MotionValue<bool>,
    output: MotionValue<bool>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl PolicyInner {
    fn resolve(&self) {
        let reduce = resolve_reduced_motion(
            self.forced.get(),
            self.system.get(),
            self.screen_reader.get(),
        );
        if reduce != self.output.get() {
            log::debug!("reduced motion now {reduce}");
        }
        self.output.set(reduce);
    }
}

/// Live reduced-motion state that follows the platform preference.
///
/// Dependents subscribe to [`ReducedMotionPolicy::value`] and re-render
/// whenever the resolved answer flips.
#[derive(Clone)]
pub struct ReducedMotionPolicy {
    inner: Rc<PolicyInner>,
}

impl ReducedMotionPolicy {
    pub fn watch(platform: &Platform, forced: Option<bool>) -> Self {
        let system = platform.prefers_reduced_motion();
        let screen_reader = platform.screen_reader_active();
        let initial = resolve_reduced_motion(forced, system.get(), screen_reader.get());
        let inner = Rc::new(PolicyInner {
            forced: Cell::new(forced),
            system: system.clone(),
            screen_reader: screen_reader.clone(),
            output: MotionValue::new(initial),
            subscriptions: RefCell::new(Vec::new()),
        });

        let subscriptions = vec![
            system.subscribe(resolver(Rc::downgrade(&inner))),
            screen_reader.subscribe(resolver(Rc::downgrade(&inner))),
        ];
        *inner.subscriptions.borrow_mut() = subscriptions;

        let policy = Self { inner };
        let teardown = policy.clone();
        on_cleanup(move || teardown.dispose());
        policy
    }

    pub fn value(&self) -> MotionValue<bool> {
        self.inner.output.clone()
    }

    pub fn get(&self) -> bool {
        self.inner.output.get()
    }

    pub fn forced(&self) -> Option<bool> {
        self.inner.forced.get()
    }

    pub fn set_forced(&self, forced: Option<bool>) {
        self.inner.forced.set(forced);
        self.inner.resolve();
    }

    /// Stop following the platform.
    pub fn dispose(&self) {
        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        for sub in subscriptions {
            sub.unsubscribe();
        }
    }
}

fn resolver(weak: Weak<PolicyInner>) -> impl Fn(&bool) + 'static {
    move |_| {
        if let Some(inner) = weak.upgrade() {
            inner.resolve();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_wins() {
        assert!(resolve_reduced_motion(Some(true), false, false));
        assert!(!resolve_reduced_motion(Some(false), true, true));
    }

    #[test]
    fn test_system_or_screen_reader() {
        assert!(!resolve_reduced_motion(None, false, false));
        assert!(resolve_reduced_motion(None, true, false));
        assert!(resolve_reduced_motion(None, false, true));
    }

    #[test]
    fn test_flash_rate_is_unsafe() {
        let report = validate_animation_safety(&SafetyParams {
            flash_rate: Some(5.0),
            ..Default::default()
        });
        assert!(!report.safe);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Flash rate"));
    }

    #[test]
    fn test_safe_params() {
        let report = validate_animation_safety(&SafetyParams {
            flash_rate: Some(2.0),
            color_changes: Some(1),
            contrast_ratio: Some(5.0),
        });
        assert!(report.safe);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_every_violation_warns_once() {
        let report = validate_animation_safety(&SafetyParams {
            flash_rate: Some(4.0),
            color_changes: Some(9),
            contrast_ratio: Some(2.0),
        });
        assert_eq!(report.warnings.len(), 3);
    }

    #[test]
    fn test_policy_follows_platform() {
        let platform = Platform::default();
        let policy = ReducedMotionPolicy::watch(&platform, None);
        let reduced = policy.value();
        assert!(!reduced.get());

        platform.set_reduced_motion_preference(true);
        assert!(reduced.get());
        platform.set_reduced_motion_preference(false);
        platform.set_screen_reader_active(true);
        assert!(reduced.get());

        policy.set_forced(Some(false));
        assert!(!reduced.get());
    }

    #[test]
    fn test_dispose_detaches() {
        let platform = Platform::default();
        let policy = ReducedMotionPolicy::watch(&platform, None);
        policy.dispose();
        platform.set_reduced_motion_preference(true);
        assert!(!policy.get());
        assert_eq!(platform.prefers_reduced_motion().subscriber_count(), 0);
    }
}
