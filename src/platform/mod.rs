//! Inbound platform signals.
//!
//! The host (a browser binding, a native shell, or a test) owns a
//! [`Platform`] and pushes what it observes into it: the reduced-motion
//! media preference, screen-reader activity, scroll position and viewport
//! size. Hooks subscribe to these the way a page would attach passive
//! listeners.
//!
//! Capability probes (device memory, CPU count, battery, heap, intersection
//! observation) are best effort. Every one of them may be absent and every
//! consumer treats absence as "fall back quietly".

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::scheduler;
use crate::value::MotionValue;

/// Axis-aligned rectangle in document coordinates (px).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grow (or shrink, for negative values) on every side.
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > x && bottom > y).then(|| Rect::new(x, y, right - x, bottom - y))
    }
}

/// Handle to the element a hook animates.
///
/// The view layer attaches its layout box (document coordinates) and keeps
/// it current. A ref that was never attached is how "hook used without an
/// element" shows up; hooks then render without their animation.
#[derive(Clone, Default)]
pub struct ElementRef {
    bounds: MotionValue<Option<Rect>>,
}

impl ElementRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, bounds: Rect) {
        self.bounds.set(Some(bounds));
    }

    pub fn detach(&self) {
        self.bounds.set(None);
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds.get()
    }

    pub fn is_attached(&self) -> bool {
        self.bounds.with(Option::is_some)
    }

    /// Observable bounds, for hooks that react to layout changes.
    pub fn bounds_value(&self) -> MotionValue<Option<Rect>> {
        self.bounds.clone()
    }

    pub fn ptr_eq(&self, other: &ElementRef) -> bool {
        self.bounds.ptr_eq(&other.bounds)
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementRef").field(&self.bounds()).finish()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    /// Charge level in `[0, 1]`.
    pub level: f32,
    pub charging: bool,
}

/// What the runtime could tell us about the device. `None` means the probe
/// is unsupported, not that the answer is zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCapabilities {
    pub device_memory_gb: Option<f32>,
    pub hardware_concurrency: Option<u32>,
    pub user_agent: Option<String>,
    pub battery: Option<BatteryStatus>,
    pub heap_used_mb: Option<f32>,
    pub intersection_observer: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            device_memory_gb: None,
            hardware_concurrency: None,
            user_agent: None,
            battery: None,
            heap_used_mb: None,
            intersection_observer: true,
        }
    }
}

const MOBILE_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

impl DeviceCapabilities {
    pub fn is_mobile(&self) -> bool {
        self.user_agent.as_deref().is_some_and(|ua| {
            let ua = ua.to_ascii_lowercase();
            MOBILE_AGENTS.iter().any(|needle| ua.contains(needle))
        })
    }
}

struct PlatformInner {
    prefers_reduced_motion: MotionValue<bool>,
    screen_reader_active: MotionValue<bool>,
    scroll: MotionValue<ScrollPosition>,
    viewport: MotionValue<ViewportSize>,
    capabilities: RefCell<DeviceCapabilities>,
}

/// Shared handle to the host environment.
#[derive(Clone)]
pub struct Platform {
    inner: Rc<PlatformInner>,
}

impl Platform {
    pub fn new(capabilities: DeviceCapabilities) -> Self {
        Self {
            inner: Rc::new(PlatformInner {
                prefers_reduced_motion: MotionValue::new(false),
                screen_reader_active: MotionValue::new(false),
                scroll: MotionValue::new(ScrollPosition::default()),
                viewport: MotionValue::new(ViewportSize::default()),
                capabilities: RefCell::new(capabilities),
            }),
        }
    }

    /// The `prefers-reduced-motion` media preference.
    pub fn prefers_reduced_motion(&self) -> MotionValue<bool> {
        self.inner.prefers_reduced_motion.clone()
    }

    pub fn screen_reader_active(&self) -> MotionValue<bool> {
        self.inner.screen_reader_active.clone()
    }

    pub fn scroll(&self) -> MotionValue<ScrollPosition> {
        self.inner.scroll.clone()
    }

    pub fn viewport(&self) -> MotionValue<ViewportSize> {
        self.inner.viewport.clone()
    }

    pub fn set_reduced_motion_preference(&self, reduce: bool) {
        self.inner.prefers_reduced_motion.set(reduce);
    }

    pub fn set_screen_reader_active(&self, active: bool) {
        self.inner.screen_reader_active.set(active);
    }

    pub fn scroll_to(&self, x: f32, y: f32) {
        self.inner.scroll.set(ScrollPosition { x, y });
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.inner.viewport.set(ViewportSize { width, height });
    }

    /// The visible part of the document.
    pub fn viewport_rect(&self) -> Rect {
        let scroll = self.inner.scroll.get();
        let size = self.inner.viewport.get();
        Rect::new(scroll.x, scroll.y, size.width, size.height)
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        self.inner.capabilities.borrow().clone()
    }

    pub fn update_capabilities(&self, f: impl FnOnce(&mut DeviceCapabilities)) {
        f(&mut *self.inner.capabilities.borrow_mut());
    }

    pub fn supports_intersection_observer(&self) -> bool {
        self.inner.capabilities.borrow().intersection_observer
    }

    pub fn heap_used_mb(&self) -> Option<f32> {
        self.inner.capabilities.borrow().heap_used_mb
    }

    /// Ask for the battery status. Like the browser API this resolves
    /// asynchronously, on the next turn of the event loop.
    pub fn query_battery(&self, on_resolved: impl FnOnce(Option<BatteryStatus>) + 'static) {
        let platform = self.clone();
        scheduler::set_timeout(0.0, move || {
            let status = platform.inner.capabilities.borrow().battery;
            on_resolved(status);
        });
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new(DeviceCapabilities::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));
        let c = Rect::new(200.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_viewport_rect_follows_scroll() {
        let platform = Platform::default();
        platform.resize(800.0, 600.0);
        platform.scroll_to(0.0, 1200.0);
        assert_eq!(platform.viewport_rect(), Rect::new(0.0, 1200.0, 800.0, 600.0));
    }

    #[test]
    fn test_mobile_detection() {
        let caps = DeviceCapabilities {
            user_agent: Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)".into()),
            ..Default::default()
        };
        assert!(caps.is_mobile());
        assert!(!DeviceCapabilities::default().is_mobile());
    }

    #[test]
    fn test_battery_query_resolves_async() {
        scheduler::reset();
        let platform = Platform::new(DeviceCapabilities {
            battery: Some(BatteryStatus {
                level: 0.5,
                charging: true,
            }),
            ..Default::default()
        });
        let resolved = Rc::new(Cell::new(false));
        let r = resolved.clone();
        platform.query_battery(move |status| r.set(status.is_some()));
        assert!(!resolved.get());
        scheduler::advance_by(0.0);
        assert!(resolved.get());
    }
}
