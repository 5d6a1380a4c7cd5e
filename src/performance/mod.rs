//! Performance adaptation: the device mode and everything that feeds it or
//! watches it.

mod dashboard;
mod frame_rate;
mod memory;
mod mode;
mod usage;

pub use dashboard::{
    Alert, AlertLevel, DashboardOptions, DashboardSummary, MetricKind, MetricSample,
    PerformanceDashboard, PerformanceReport,
};
pub use frame_rate::{DEFAULT_WINDOW_MS, FrameRateMonitor, LOW_FPS, RECOVERED_FPS};
pub use memory::{ScrollAnimationRegistry, ScrollRegistryOptions};
pub use mode::{PerformanceController, PerformanceMode, battery_suggests_saving, classify_device};
pub use usage::{Feature, FeatureBundle, FeatureUsage, UsageReport};
