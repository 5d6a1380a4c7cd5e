//! The shared motion context.
//!
//! A [`MotionProvider`] is mounted once near the root of the component tree.
//! It builds the one [`MotionContext`] every hook reads: resolved reduced
//! motion, the performance controller, the animation registry, and the
//! process-wide announcer, dashboard and scroll registry.
//!
//! The context is read by many hooks and written through
//! [`MotionContext::update_config`] and
//! [`MotionContext::register_animation`] only.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::accessibility::{Announcer, AnnouncerOptions, ReducedMotionPolicy};
use crate::config::{AnimationConfig, AnimationRegistry, ConfigOverride, ResolvedAnimation};
use crate::error::Result;
use crate::performance::{
    DEFAULT_WINDOW_MS, DashboardOptions, Feature, FeatureUsage, FrameRateMonitor,
    MetricSample, PerformanceController, PerformanceDashboard, PerformanceMode,
    ScrollAnimationRegistry, ScrollRegistryOptions,
};
use crate::platform::Platform;
use crate::value::{MotionValue, on_cleanup, provide_context, use_context};

/// Dashboard component name for frame-rate samples.
const FRAME_MONITOR_COMPONENT: &str = "frame-monitor";

/// Application-level motion settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotionConfig {
    /// Force reduced motion on or off, ignoring the platform.
    pub reduced_motion: Option<bool>,
    /// Pin a performance mode instead of detecting one.
    pub performance_mode: Option<PerformanceMode>,
    pub monitor_frame_rate: bool,
    pub frame_window_ms: f64,
    pub announcer: AnnouncerOptions,
    pub scroll_registry: ScrollRegistryOptions,
    pub dashboard: DashboardOptions,
    /// Allow the metrics report to be exported.
    pub debug_metrics: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            reduced_motion: None,
            performance_mode: None,
            monitor_frame_rate: true,
            frame_window_ms: DEFAULT_WINDOW_MS,
            announcer: AnnouncerOptions::default(),
            scroll_registry: ScrollRegistryOptions::default(),
            dashboard: DashboardOptions::default(),
            debug_metrics: false,
        }
    }
}

impl MotionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn reduced_motion(mut self, forced: Option<bool>) -> Self {
        self.reduced_motion = forced;
        self
    }

    pub fn performance_mode(mut self, mode: Option<PerformanceMode>) -> Self {
        self.performance_mode = mode;
        self
    }

    pub fn monitor_frame_rate(mut self, enabled: bool) -> Self {
        self.monitor_frame_rate = enabled;
        self
    }

    pub fn frame_window(mut self, window_ms: f64) -> Self {
        self.frame_window_ms = window_ms;
        self
    }

    pub fn announcer(mut self, options: AnnouncerOptions) -> Self {
        self.announcer = options;
        self
    }

    pub fn scroll_registry(mut self, options: ScrollRegistryOptions) -> Self {
        self.scroll_registry = options;
        self
    }

    pub fn dashboard(mut self, options: DashboardOptions) -> Self {
        self.dashboard = options;
        self
    }

    pub fn debug_metrics(mut self, enabled: bool) -> Self {
        self.debug_metrics = enabled;
        self
    }
}

struct ContextInner {
    config: RefCell<MotionConfig>,
    platform: Platform,
    policy: ReducedMotionPolicy,
    controller: PerformanceController,
    registry: AnimationRegistry,
    announcer: Announcer,
    dashboard: PerformanceDashboard,
    scroll_registry: ScrollAnimationRegistry,
    usage: FeatureUsage,
    monitor: RefCell<Option<FrameRateMonitor>>,
}

/// Handle to the shared motion state. Cheap to clone.
#[derive(Clone)]
pub struct MotionContext {
    inner: Rc<ContextInner>,
}

impl MotionContext {
    pub fn new(platform: &Platform, config: MotionConfig) -> Self {
        let policy = ReducedMotionPolicy::watch(platform, config.reduced_motion);
        let controller =
            PerformanceController::detect(platform, config.performance_mode, policy.value());
        let context = Self {
            inner: Rc::new(ContextInner {
                platform: platform.clone(),
                policy,
                controller,
                registry: AnimationRegistry::new(),
                announcer: Announcer::new(config.announcer.clone()),
                dashboard: PerformanceDashboard::new(config.dashboard.clone()),
                scroll_registry: ScrollAnimationRegistry::new(
                    platform,
                    config.scroll_registry.clone(),
                ),
                usage: FeatureUsage::new(),
                monitor: RefCell::new(None),
                config: RefCell::new(config),
            }),
        };
        context.restart_monitor();
        context
    }

    pub fn reduced_motion(&self) -> bool {
        self.inner.policy.get()
    }

    pub fn reduced_motion_value(&self) -> MotionValue<bool> {
        self.inner.policy.value()
    }

    pub fn performance_mode(&self) -> PerformanceMode {
        self.inner.controller.mode()
    }

    /// Every registered animation config, keyed by id.
    pub fn animation_config(&self) -> BTreeMap<String, AnimationConfig> {
        self.inner.registry.snapshot()
    }

    pub fn config(&self) -> MotionConfig {
        self.inner.config.borrow().clone()
    }

    /// The single entry point for changing motion settings. Changes are
    /// pushed to every component that cares.
    pub fn update_config(&self, update: impl FnOnce(&mut MotionConfig)) {
        let (previous, next) = {
            let mut config = self.inner.config.borrow_mut();
            let previous = config.clone();
            update(&mut *config);
            (previous, config.clone())
        };
        if previous == next {
            return;
        }
        log::debug!("motion config updated");

        if previous.reduced_motion != next.reduced_motion {
            self.inner.policy.set_forced(next.reduced_motion);
        }
        if previous.performance_mode != next.performance_mode {
            let controller = &self.inner.controller;
            match next.performance_mode {
                Some(mode) => controller.pin(mode),
                None => controller.redetect(&self.inner.platform),
            }
        }
        if previous.announcer != next.announcer {
            self.inner.announcer.set_options(next.announcer.clone());
        }
        if previous.dashboard != next.dashboard {
            self.inner.dashboard.set_options(next.dashboard.clone());
        }
        if previous.scroll_registry != next.scroll_registry {
            self.inner
                .scroll_registry
                .set_options(next.scroll_registry.clone());
        }
        if previous.monitor_frame_rate != next.monitor_frame_rate
            || previous.frame_window_ms != next.frame_window_ms
        {
            self.restart_monitor();
        }
    }

    pub fn register_animation(&self, config: AnimationConfig) -> Result<()> {
        self.inner.registry.register(config)
    }

    /// Resolve a preset against the current mode and motion preference.
    pub fn resolve(&self, id: &str, overrides: Option<&ConfigOverride>) -> ResolvedAnimation {
        let resolved = self
            .inner
            .registry
            .resolve(id, overrides, &self.inner.controller);
        self.inner.usage.record_preset(&resolved.config.id);
        resolved
    }

    pub fn record_feature(&self, feature: Feature) {
        self.inner.usage.record_feature(feature);
    }

    /// The metrics report as JSON, when debug metrics are enabled.
    pub fn export_metrics(&self) -> Option<String> {
        if !self.inner.config.borrow().debug_metrics {
            return None;
        }
        match self.inner.dashboard.export_report() {
            Ok(report) => Some(report),
            Err(err) => {
                log::warn!("failed to export metrics: {err}");
                None
            }
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.inner.platform
    }

    pub fn controller(&self) -> &PerformanceController {
        &self.inner.controller
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.inner.registry
    }

    pub fn announcer(&self) -> &Announcer {
        &self.inner.announcer
    }

    pub fn dashboard(&self) -> &PerformanceDashboard {
        &self.inner.dashboard
    }

    pub fn scroll_registry(&self) -> &ScrollAnimationRegistry {
        &self.inner.scroll_registry
    }

    pub fn usage(&self) -> &FeatureUsage {
        &self.inner.usage
    }

    pub fn is_monitoring(&self) -> bool {
        self.inner
            .monitor
            .borrow()
            .as_ref()
            .is_some_and(FrameRateMonitor::is_running)
    }

    /// Stop every loop and release every shared resource.
    pub fn shutdown(&self) {
        if let Some(monitor) = self.inner.monitor.borrow_mut().take() {
            monitor.stop();
        }
        self.inner.scroll_registry.shutdown();
        self.inner.announcer.clear_all();
        self.inner.policy.dispose();
    }

    fn restart_monitor(&self) {
        if let Some(monitor) = self.inner.monitor.borrow_mut().take() {
            monitor.stop();
        }
        let (enabled, window) = {
            let config = self.inner.config.borrow();
            (config.monitor_frame_rate, config.frame_window_ms)
        };
        if !enabled {
            return;
        }

        let monitor = FrameRateMonitor::start(&self.inner.controller, window);
        let weak: Weak<ContextInner> = Rc::downgrade(&self.inner);
        monitor.on_sample(move |fps| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut sample = MetricSample::new().frame_rate(fps);
            if let Some(heap) = inner.platform.heap_used_mb() {
                sample = sample.memory_usage_mb(heap);
            }
            inner.dashboard.record(FRAME_MONITOR_COMPONENT, sample);
        });
        *self.inner.monitor.borrow_mut() = Some(monitor);
    }
}

/// Mounts a [`MotionContext`] for the current scope.
pub struct MotionProvider {
    platform: Platform,
    config: MotionConfig,
}

impl MotionProvider {
    pub fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.clone(),
            config: MotionConfig::default(),
        }
    }

    pub fn config(mut self, config: MotionConfig) -> Self {
        self.config = config;
        self
    }

    /// Create the context, make it visible to nested scopes, and shut it
    /// down with the current scope.
    pub fn mount(self) -> MotionContext {
        let context = MotionContext::new(&self.platform, self.config);
        provide_context(context.clone());
        let teardown = context.clone();
        on_cleanup(move || teardown.shutdown());
        log::debug!(
            "motion provider mounted (mode {}, reduced motion {})",
            context.performance_mode(),
            context.reduced_motion()
        );
        context
    }
}

thread_local! {
    static DETACHED: RefCell<Option<MotionContext>> = const { RefCell::new(None) };
}

/// The nearest provided context.
///
/// Without a provider, hooks still work against a detached default context
/// (no frame monitoring) and a warning is logged once.
pub fn use_motion_context() -> MotionContext {
    if let Some(context) = use_context::<MotionContext>() {
        return context;
    }
    DETACHED.with(|detached| {
        detached
            .borrow_mut()
            .get_or_insert_with(|| {
                log::warn!("no MotionProvider mounted, using a detached default context");
                MotionContext::new(
                    &Platform::default(),
                    MotionConfig::default().monitor_frame_rate(false),
                )
            })
            .clone()
    })
}
