//! Rolling per-component performance metrics and threshold alerts.
//!
//! Samples are kept per component up to a fixed count, oldest dropped
//! first. Every sample is checked against the frame-rate and memory
//! thresholds as it arrives; alerts are retained up to their own limit.
//!
//! The whole state can be exported as a JSON report for external tooling.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scheduler;

const FRAME_RATE_ERROR: f32 = 30.0;
const FRAME_RATE_WARNING: f32 = 50.0;
const MEMORY_ERROR_MB: f32 = 100.0;
const MEMORY_WARNING_MB: f32 = 50.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub frame_rate: Option<f32>,
    pub memory_usage_mb: Option<f32>,
    pub render_time_ms: Option<f32>,
    pub timestamp: f64,
}

impl MetricSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_rate(mut self, fps: f32) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    pub fn memory_usage_mb(mut self, mb: f32) -> Self {
        self.memory_usage_mb = Some(mb);
        self
    }

    pub fn render_time_ms(mut self, ms: f32) -> Self {
        self.render_time_ms = Some(ms);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    FrameRate,
    MemoryUsage,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::FrameRate => f.write_str("frame rate"),
            MetricKind::MemoryUsage => f.write_str("memory usage"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub component: String,
    pub level: AlertLevel,
    pub metric: MetricKind,
    pub value: f32,
    pub message: String,
    pub timestamp: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardOptions {
    pub max_samples_per_component: usize,
    pub max_alerts: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            max_samples_per_component: 100,
            max_alerts: 50,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub components: usize,
    pub total_samples: usize,
    pub average_frame_rate: Option<f32>,
    pub peak_memory_mb: Option<f32>,
    pub average_render_time_ms: Option<f32>,
    pub warnings: usize,
    pub errors: usize,
}

/// Serializable snapshot of the whole dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub generated_at: f64,
    pub summary: DashboardSummary,
    pub metrics: BTreeMap<String, Vec<MetricSample>>,
    pub alerts: Vec<Alert>,
}

#[derive(Default)]
struct DashboardState {
    options: DashboardOptions,
    metrics: BTreeMap<String, VecDeque<MetricSample>>,
    alerts: VecDeque<Alert>,
}

impl DashboardState {
    fn push_alert(&mut self, alert: Alert) {
        match alert.level {
            AlertLevel::Warning => log::warn!("{}", alert.message),
            AlertLevel::Error => log::error!("{}", alert.message),
        }
        self.alerts.push_back(alert);
        while self.alerts.len() > self.options.max_alerts {
            self.alerts.pop_front();
        }
    }
}

/// Shared metrics sink. Clone the handle to share it.
#[derive(Clone, Default)]
pub struct PerformanceDashboard {
    state: Rc<RefCell<DashboardState>>,
}

impl PerformanceDashboard {
    pub fn new(options: DashboardOptions) -> Self {
        Self {
            state: Rc::new(RefCell::new(DashboardState {
                options,
                ..Default::default()
            })),
        }
    }

    pub fn options(&self) -> DashboardOptions {
        self.state.borrow().options.clone()
    }

    /// New limits apply from the next recorded sample.
    pub fn set_options(&self, options: DashboardOptions) {
        self.state.borrow_mut().options = options;
    }

    /// Record a sample, stamping it with the current loop time.
    pub fn record(&self, component: &str, sample: MetricSample) {
        let sample = MetricSample {
            timestamp: scheduler::now(),
            ..sample
        };
        let mut state = self.state.borrow_mut();

        let limit = state.options.max_samples_per_component.max(1);
        let samples = state.metrics.entry(component.to_string()).or_default();
        samples.push_back(sample);
        while samples.len() > limit {
            samples.pop_front();
        }

        for alert in check_thresholds(component, &sample) {
            state.push_alert(alert);
        }
    }

    pub fn record_frame_rate(&self, component: &str, fps: f32) {
        self.record(component, MetricSample::new().frame_rate(fps));
    }

    pub fn record_memory(&self, component: &str, mb: f32) {
        self.record(component, MetricSample::new().memory_usage_mb(mb));
    }

    pub fn record_render_time(&self, component: &str, ms: f32) {
        self.record(component, MetricSample::new().render_time_ms(ms));
    }

    pub fn metrics_for(&self, component: &str) -> Vec<MetricSample> {
        self.state
            .borrow()
            .metrics
            .get(component)
            .map(|samples| samples.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Most recent alerts, oldest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.state.borrow().alerts.iter().cloned().collect()
    }

    pub fn summary(&self) -> DashboardSummary {
        let state = self.state.borrow();
        let samples: Vec<&MetricSample> = state.metrics.values().flatten().collect();

        let mean = |values: Vec<f32>| {
            (!values.is_empty()).then(|| values.iter().sum::<f32>() / values.len() as f32)
        };

        DashboardSummary {
            components: state.metrics.len(),
            total_samples: samples.len(),
            average_frame_rate: mean(samples.iter().filter_map(|s| s.frame_rate).collect()),
            peak_memory_mb: samples
                .iter()
                .filter_map(|s| s.memory_usage_mb)
                .reduce(f32::max),
            average_render_time_ms: mean(samples.iter().filter_map(|s| s.render_time_ms).collect()),
            warnings: state
                .alerts
                .iter()
                .filter(|a| a.level == AlertLevel::Warning)
                .count(),
            errors: state
                .alerts
                .iter()
                .filter(|a| a.level == AlertLevel::Error)
                .count(),
        }
    }

    pub fn report(&self) -> PerformanceReport {
        let summary = self.summary();
        let state = self.state.borrow();
        PerformanceReport {
            generated_at: scheduler::now(),
            summary,
            metrics: state
                .metrics
                .iter()
                .map(|(name, samples)| (name.clone(), samples.iter().copied().collect()))
                .collect(),
            alerts: state.alerts.iter().cloned().collect(),
        }
    }

    /// The report as pretty-printed JSON.
    pub fn export_report(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }

    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.metrics.clear();
        state.alerts.clear();
    }
}

fn check_thresholds(component: &str, sample: &MetricSample) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut raise = |level, metric, value: f32, message: String| {
        alerts.push(Alert {
            component: component.to_string(),
            level,
            metric,
            value,
            message,
            timestamp: sample.timestamp,
        });
    };

    if let Some(fps) = sample.frame_rate {
        if fps < FRAME_RATE_ERROR {
            raise(
                AlertLevel::Error,
                MetricKind::FrameRate,
                fps,
                format!("{component}: frame rate critically low ({fps:.1} fps)"),
            );
        } else if fps < FRAME_RATE_WARNING {
            raise(
                AlertLevel::Warning,
                MetricKind::FrameRate,
                fps,
                format!("{component}: frame rate below target ({fps:.1} fps)"),
            );
        }
    }

    if let Some(mb) = sample.memory_usage_mb {
        if mb > MEMORY_ERROR_MB {
            raise(
                AlertLevel::Error,
                MetricKind::MemoryUsage,
                mb,
                format!("{component}: memory usage critical ({mb:.1} MB)"),
            );
        } else if mb > MEMORY_WARNING_MB {
            raise(
                AlertLevel::Warning,
                MetricKind::MemoryUsage,
                mb,
                format!("{component}: memory usage high ({mb:.1} MB)"),
            );
        }
    }

    alerts
}
