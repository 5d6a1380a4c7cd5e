use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::animation::{Easing, Transition};
use crate::platform::{BatteryStatus, DeviceCapabilities, Platform};
use crate::value::MotionValue;

/// Coarse device class used to scale animation cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    High,
    #[default]
    Balanced,
    Battery,
}

impl PerformanceMode {
    /// Multiplier applied to every duration.
    pub fn duration_factor(&self) -> f32 {
        match self {
            PerformanceMode::High => 1.0,
            PerformanceMode::Balanced => 0.8,
            PerformanceMode::Battery => 0.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceMode::High => "high",
            PerformanceMode::Balanced => "balanced",
            PerformanceMode::Battery => "battery",
        }
    }
}

impl fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Devices with less memory than this (GB) save power.
const LOW_MEMORY_GB: f32 = 4.0;
const LOW_CORE_COUNT: u32 = 4;
const LOW_BATTERY_LEVEL: f32 = 0.2;

/// Pick a mode from what the platform reports.
///
/// Checks run in priority order and the first hit wins: explicit override,
/// low memory, low core count, mobile user agent. Anything else is
/// balanced; unknown capabilities never count against the device.
pub fn classify_device(
    override_mode: Option<PerformanceMode>,
    capabilities: &DeviceCapabilities,
) -> PerformanceMode {
    if let Some(mode) = override_mode {
        return mode;
    }
    if capabilities
        .device_memory_gb
        .is_some_and(|gb| gb < LOW_MEMORY_GB)
    {
        return PerformanceMode::Battery;
    }
    if capabilities
        .hardware_concurrency
        .is_some_and(|cores| cores < LOW_CORE_COUNT)
    {
        return PerformanceMode::Battery;
    }
    if capabilities.is_mobile() {
        return PerformanceMode::Battery;
    }
    PerformanceMode::Balanced
}

pub fn battery_suggests_saving(status: &BatteryStatus) -> bool {
    status.level < LOW_BATTERY_LEVEL || !status.charging
}

struct ControllerInner {
    mode: MotionValue<PerformanceMode>,
    reduced_motion: MotionValue<bool>,
    pinned: Cell<bool>,
}

/// Owns the current [`PerformanceMode`] and turns it into concrete timing.
#[derive(Clone)]
pub struct PerformanceController {
    inner: Rc<ControllerInner>,
}

impl PerformanceController {
    pub fn new(mode: PerformanceMode, reduced_motion: MotionValue<bool>) -> Self {
        Self {
            inner: Rc::new(ControllerInner {
                mode: MotionValue::new(mode),
                reduced_motion,
                pinned: Cell::new(false),
            }),
        }
    }

    /// Classify the device and, when it lands on balanced, ask the battery
    /// whether to drop to battery mode once the query resolves.
    pub fn detect(
        platform: &Platform,
        override_mode: Option<PerformanceMode>,
        reduced_motion: MotionValue<bool>,
    ) -> Self {
        let mode = classify_device(override_mode, &platform.capabilities());
        log::info!("performance mode detected: {mode}");
        let controller = Self::new(mode, reduced_motion);
        controller.inner.pinned.set(override_mode.is_some());
        if override_mode.is_none() {
            controller.query_battery(platform);
        }
        controller
    }

    /// Drop any pin and classify the device again, battery included.
    pub fn redetect(&self, platform: &Platform) {
        self.unpin();
        let mode = classify_device(None, &platform.capabilities());
        log::info!("performance mode re-detected: {mode}");
        self.set_mode(mode);
        self.query_battery(platform);
    }

    fn query_battery(&self, platform: &Platform) {
        if self.mode() != PerformanceMode::Balanced {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        platform.query_battery(move |status| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let controller = PerformanceController { inner };
            if let Some(status) = status
                && battery_suggests_saving(&status)
                && controller.mode() == PerformanceMode::Balanced
                && !controller.is_pinned()
            {
                log::info!(
                    "battery at {:.0}% (charging: {}), saving power",
                    status.level * 100.0,
                    status.charging
                );
                controller.set_mode(PerformanceMode::Battery);
            }
        });
    }

    pub fn mode(&self) -> PerformanceMode {
        self.inner.mode.get()
    }

    pub fn mode_value(&self) -> MotionValue<PerformanceMode> {
        self.inner.mode.clone()
    }

    pub fn set_mode(&self, mode: PerformanceMode) {
        let previous = self.mode();
        if previous != mode {
            log::info!("performance mode {previous} -> {mode}");
        }
        self.inner.mode.set(mode);
    }

    /// An overridden mode is left alone by automatic adaptation.
    pub fn pin(&self, mode: PerformanceMode) {
        self.inner.pinned.set(true);
        self.set_mode(mode);
    }

    pub fn unpin(&self) {
        self.inner.pinned.set(false);
    }

    pub fn is_pinned(&self) -> bool {
        self.inner.pinned.get()
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.inner.reduced_motion.get()
    }

    pub fn reduced_motion(&self) -> MotionValue<bool> {
        self.inner.reduced_motion.clone()
    }

    /// Scale `base_ms` for the current mode; zero under reduced motion.
    pub fn get_duration(&self, base_ms: f32) -> f32 {
        if self.is_reduced_motion() {
            return 0.0;
        }
        (base_ms * self.mode().duration_factor()).max(0.0)
    }

    pub fn get_easing(&self, easing: Easing) -> Easing {
        if self.is_reduced_motion() {
            return Easing::Linear;
        }
        match self.mode() {
            PerformanceMode::Battery => easing.simplified(),
            PerformanceMode::High | PerformanceMode::Balanced => easing,
        }
    }

    /// Like [`get_easing`](Self::get_easing) for a curve given by name.
    /// Unknown names fall back to the default curve.
    pub fn get_easing_by_name(&self, name: &str) -> Easing {
        let easing = Easing::from_name(name).unwrap_or_else(|| {
            log::warn!("unknown easing {name:?}, using default");
            Easing::default()
        });
        self.get_easing(easing)
    }

    /// Apply duration and easing adjustment to a whole transition.
    /// Under reduced motion the result is instant.
    pub fn adjust(&self, transition: &Transition) -> Transition {
        if self.is_reduced_motion() {
            return Transition::instant();
        }
        Transition {
            duration_ms: self.get_duration(transition.duration_ms),
            delay_ms: transition.delay_ms,
            easing: self.get_easing(transition.easing),
        }
    }
}

impl Default for PerformanceController {
    fn default() -> Self {
        Self::new(PerformanceMode::default(), MotionValue::new(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler;

    fn controller(mode: PerformanceMode, reduced: bool) -> PerformanceController {
        PerformanceController::new(mode, MotionValue::new(reduced))
    }

    #[test]
    fn test_duration_scaling() {
        assert_eq!(controller(PerformanceMode::High, false).get_duration(300.0), 300.0);
        assert!((controller(PerformanceMode::Balanced, false).get_duration(300.0) - 240.0).abs() < 1e-3);
        assert_eq!(controller(PerformanceMode::Battery, false).get_duration(300.0), 150.0);
        for mode in [
            PerformanceMode::High,
            PerformanceMode::Balanced,
            PerformanceMode::Battery,
        ] {
            assert_eq!(controller(mode, true).get_duration(300.0), 0.0);
        }
    }

    #[test]
    fn test_easing_adjustment() {
        assert_eq!(
            controller(PerformanceMode::High, false).get_easing(Easing::BackOut),
            Easing::BackOut
        );
        assert_eq!(
            controller(PerformanceMode::Battery, false).get_easing(Easing::BackOut),
            Easing::Ease
        );
        assert_eq!(
            controller(PerformanceMode::Balanced, true).get_easing(Easing::BackOut),
            Easing::Linear
        );
        assert_eq!(
            controller(PerformanceMode::High, false).get_easing_by_name("nope"),
            Easing::default()
        );
    }

    #[test]
    fn test_classification_priority() {
        let low_memory = DeviceCapabilities {
            device_memory_gb: Some(2.0),
            hardware_concurrency: Some(16),
            ..Default::default()
        };
        assert_eq!(classify_device(None, &low_memory), PerformanceMode::Battery);
        assert_eq!(
            classify_device(Some(PerformanceMode::High), &low_memory),
            PerformanceMode::High
        );

        let few_cores = DeviceCapabilities {
            hardware_concurrency: Some(2),
            ..Default::default()
        };
        assert_eq!(classify_device(None, &few_cores), PerformanceMode::Battery);

        let phone = DeviceCapabilities {
            user_agent: Some("Mozilla/5.0 (Linux; Android 14)".into()),
            ..Default::default()
        };
        assert_eq!(classify_device(None, &phone), PerformanceMode::Battery);

        let desktop = DeviceCapabilities {
            device_memory_gb: Some(16.0),
            hardware_concurrency: Some(8),
            ..Default::default()
        };
        assert_eq!(classify_device(None, &desktop), PerformanceMode::Balanced);
        assert_eq!(
            classify_device(None, &DeviceCapabilities::default()),
            PerformanceMode::Balanced
        );
    }

    #[test]
    fn test_low_battery_downgrades_after_query() {
        scheduler::reset();
        let platform = Platform::new(DeviceCapabilities {
            battery: Some(BatteryStatus {
                level: 0.15,
                charging: true,
            }),
            ..Default::default()
        });
        let controller = PerformanceController::detect(&platform, None, MotionValue::new(false));
        assert_eq!(controller.mode(), PerformanceMode::Balanced);
        scheduler::advance_by(0.0);
        assert_eq!(controller.mode(), PerformanceMode::Battery);
    }

    #[test]
    fn test_missing_battery_api_stays_balanced() {
        scheduler::reset();
        let platform = Platform::default();
        let controller = PerformanceController::detect(&platform, None, MotionValue::new(false));
        scheduler::advance_by(10.0);
        assert_eq!(controller.mode(), PerformanceMode::Balanced);
    }

    #[test]
    fn test_reduced_motion_makes_transition_instant() {
        let transition = Transition::new(400.0, Easing::EaseOut).delay(100.0);
        let adjusted = controller(PerformanceMode::High, true).adjust(&transition);
        assert_eq!(adjusted, Transition::instant());
        let adjusted = controller(PerformanceMode::Battery, false).adjust(&transition);
        assert_eq!(adjusted.duration_ms, 200.0);
        assert_eq!(adjusted.delay_ms, 100.0);
        assert_eq!(adjusted.easing, Easing::Ease);
    }
}
