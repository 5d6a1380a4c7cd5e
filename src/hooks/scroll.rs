//! Scroll-linked progress and parallax.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::animation::{SpringConfig, SpringDrive, Style, use_transform};
use crate::performance::Feature;
use crate::platform::{ElementRef, Platform};
use crate::provider::{MotionContext, use_motion_context};
use crate::scheduler::{self, FRAME_INTERVAL_MS, TimerId};
use crate::value::{MotionValue, Subscription, on_cleanup};

/// Quiet period after the last scroll event before scrolling counts as
/// stopped.
pub const DEFAULT_IDLE_MS: f64 = 150.0;

/// The scroll span that maps to progress 0..1.
#[derive(Clone, Debug)]
pub enum ScrollRange {
    /// Absolute scroll offsets in px.
    Pixels { start: f32, end: f32 },
    /// Offsets in multiples of the viewport height.
    Viewports { start: f32, end: f32 },
    /// From the element's top reaching the bottom of the viewport until its
    /// bottom leaves the top.
    Element(ElementRef),
}

impl ScrollRange {
    /// Pixel bounds for the current layout. `None` while an element range
    /// has no attached element.
    pub fn resolve(&self, platform: &Platform) -> Option<(f32, f32)> {
        let height = platform.viewport().get().height;
        match self {
            ScrollRange::Pixels { start, end } => Some((*start, *end)),
            ScrollRange::Viewports { start, end } => Some((start * height, end * height)),
            ScrollRange::Element(element) => element
                .bounds()
                .map(|bounds| (bounds.y - height, bounds.bottom())),
        }
    }
}

impl Default for ScrollRange {
    fn default() -> Self {
        ScrollRange::Viewports {
            start: 0.0,
            end: 1.0,
        }
    }
}

/// `position` mapped into `[start, end]`, clamped to `[0, 1]`.
pub fn scroll_progress(start: f32, end: f32, position: f32) -> f32 {
    if end <= start {
        return if position >= end { 1.0 } else { 0.0 };
    }
    ((position - start) / (end - start)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Still,
    Down,
    Up,
}

#[derive(Clone, Debug)]
pub struct ScrollOptions {
    pub range: ScrollRange,
    pub idle_ms: f64,
}

impl ScrollOptions {
    pub fn new(range: ScrollRange) -> Self {
        Self {
            range,
            idle_ms: DEFAULT_IDLE_MS,
        }
    }

    pub fn idle_after(mut self, idle_ms: f64) -> Self {
        self.idle_ms = idle_ms;
        self
    }
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self::new(ScrollRange::default())
    }
}

struct ScrollInner {
    platform: Platform,
    options: ScrollOptions,
    progress: MotionValue<f32>,
    direction: MotionValue<ScrollDirection>,
    /// px per second, positive when scrolling down.
    velocity: MotionValue<f32>,
    scrolling: MotionValue<bool>,
    last_sample: Cell<(f32, f64)>,
    idle_timer: Cell<Option<TimerId>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

/// Live scroll progress through a range, with direction and velocity.
#[derive(Clone)]
pub struct ScrollProgress {
    inner: Rc<ScrollInner>,
}

pub fn use_scroll_progress(options: ScrollOptions) -> ScrollProgress {
    let context = use_motion_context();
    context.record_feature(Feature::ScrollProgress);
    let progress = ScrollProgress::track(context.platform(), options);
    let teardown = progress.clone();
    on_cleanup(move || teardown.dispose());
    progress
}

impl ScrollProgress {
    /// Track scrolling on `platform` without going through a context.
    pub fn track(platform: &Platform, options: ScrollOptions) -> Self {
        let position = platform.scroll().get();
        let tracker = Self {
            inner: Rc::new(ScrollInner {
                platform: platform.clone(),
                options,
                progress: MotionValue::new(0.0),
                direction: MotionValue::new(ScrollDirection::Still),
                velocity: MotionValue::new(0.0),
                scrolling: MotionValue::new(false),
                last_sample: Cell::new((position.y, scheduler::now())),
                idle_timer: Cell::new(None),
                subscriptions: RefCell::new(Vec::new()),
            }),
        };

        let weak = Rc::downgrade(&tracker.inner);
        let mut subscriptions = vec![platform.scroll().subscribe(move |position| {
            if let Some(inner) = weak.upgrade() {
                ScrollProgress { inner }.on_scroll(position.y);
            }
        })];
        subscriptions.push(tracker.relayout_on(&platform.viewport()));
        if let ScrollRange::Element(element) = &tracker.inner.options.range {
            subscriptions.push(tracker.relayout_on(&element.bounds_value()));
        }
        *tracker.inner.subscriptions.borrow_mut() = subscriptions;
        tracker.update_progress();
        tracker
    }

    fn relayout_on<T: 'static>(&self, source: &MotionValue<T>) -> Subscription {
        let weak: Weak<ScrollInner> = Rc::downgrade(&self.inner);
        source.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                ScrollProgress { inner }.update_progress();
            }
        })
    }

    fn update_progress(&self) {
        let inner = &self.inner;
        let Some((start, end)) = inner.options.range.resolve(&inner.platform) else {
            return;
        };
        let position = inner.platform.scroll().get().y;
        inner.progress.set(scroll_progress(start, end, position));
    }

    fn on_scroll(&self, y: f32) {
        let inner = &self.inner;
        let now = scheduler::now();
        let (last_y, last_time) = inner.last_sample.replace((y, now));
        let delta = y - last_y;
        if delta != 0.0 {
            let elapsed = now - last_time;
            let elapsed = if elapsed > 0.0 { elapsed } else { FRAME_INTERVAL_MS };
            inner.velocity.set(delta / elapsed as f32 * 1000.0);
            inner.direction.set(if delta > 0.0 {
                ScrollDirection::Down
            } else {
                ScrollDirection::Up
            });
            inner.scrolling.set(true);
            self.restart_idle_timer();
        }
        self.update_progress();
    }

    fn restart_idle_timer(&self) {
        if let Some(timer) = self.inner.idle_timer.take() {
            scheduler::clear_timeout(timer);
        }
        let weak = Rc::downgrade(&self.inner);
        let timer = scheduler::set_timeout(self.inner.options.idle_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.idle_timer.set(None);
                inner.scrolling.set(false);
                inner.velocity.set(0.0);
                inner.direction.set(ScrollDirection::Still);
            }
        });
        self.inner.idle_timer.set(Some(timer));
    }

    pub fn progress(&self) -> MotionValue<f32> {
        self.inner.progress.clone()
    }

    pub fn direction(&self) -> MotionValue<ScrollDirection> {
        self.inner.direction.clone()
    }

    pub fn velocity(&self) -> MotionValue<f32> {
        self.inner.velocity.clone()
    }

    pub fn scrolling(&self) -> MotionValue<bool> {
        self.inner.scrolling.clone()
    }

    pub fn is_scrolling(&self) -> bool {
        self.inner.scrolling.get()
    }

    pub fn range(&self) -> &ScrollRange {
        &self.inner.options.range
    }

    /// Remove the scroll listener and cancel the idle timer.
    pub fn dispose(&self) {
        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
        if let Some(timer) = self.inner.idle_timer.take() {
            scheduler::clear_timeout(timer);
        }
    }
}

thread_local! {
    static NEXT_PARALLAX: Cell<u64> = const { Cell::new(0) };
}

#[derive(Clone, Debug)]
pub struct ParallaxOptions {
    /// Registry key; generated when absent.
    pub id: Option<String>,
    pub from: Style,
    pub to: Style,
    pub idle_ms: f64,
    /// Smooth the scroll progress through a spring before interpolating.
    pub spring: Option<SpringConfig>,
}

impl ParallaxOptions {
    /// Drift by `offset` px upwards across the element's pass through the
    /// viewport.
    pub fn offset(offset: f32) -> Self {
        Self {
            id: None,
            from: Style::VISIBLE,
            to: Style::VISIBLE.translate(0.0, -offset),
            idle_ms: DEFAULT_IDLE_MS,
            spring: None,
        }
    }

    /// Endpoints and spring taken from a registered config.
    pub fn preset(context: &MotionContext, id: &str) -> Self {
        let resolved = context.resolve(id, None);
        let props = resolved.config.properties;
        Self {
            id: None,
            from: props.from,
            to: props.to,
            idle_ms: DEFAULT_IDLE_MS,
            spring: props.spring,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn styles(mut self, from: Style, to: Style) -> Self {
        self.from = from.sanitized(Style::VISIBLE);
        self.to = to.sanitized(self.from);
        self
    }

    pub fn spring(mut self, spring: SpringConfig) -> Self {
        self.spring = Some(spring);
        self
    }
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self::offset(100.0)
    }
}

struct ParallaxInner {
    id: String,
    context: MotionContext,
    tracker: ScrollProgress,
    spring: Option<SpringDrive>,
    style: MotionValue<Style>,
    subscriptions: RefCell<Vec<Subscription>>,
}

/// An element style that follows scroll progress through the viewport.
#[derive(Clone)]
pub struct Parallax {
    inner: Rc<ParallaxInner>,
}

/// Interpolate `options.from` to `options.to` as `element` travels through
/// the viewport. The binding is tracked by the context's scroll registry,
/// which releases it even if teardown never runs.
pub fn use_parallax(element: &ElementRef, options: ParallaxOptions) -> Parallax {
    let context = use_motion_context();
    context.record_feature(Feature::Parallax);

    let tracker = ScrollProgress::track(
        context.platform(),
        ScrollOptions::new(ScrollRange::Element(element.clone())).idle_after(options.idle_ms),
    );
    let reduced = context.reduced_motion_value();
    let mut subscriptions = Vec::new();
    let spring = options
        .spring
        .map(|config| SpringDrive::new(tracker.progress().get(), config));
    let driver = match &spring {
        Some(spring) => {
            let (drive, reduced_now) = (spring.clone(), reduced.clone());
            subscriptions.push(tracker.progress().subscribe(move |progress| {
                if reduced_now.get() {
                    drive.jump(*progress);
                } else {
                    drive.set_target(*progress);
                }
            }));
            spring.output()
        }
        None => tracker.progress(),
    };
    let follow = use_transform(
        &driver,
        vec![0.0, 1.0],
        vec![options.from, options.to],
        options.from,
    );
    let from = options.from;
    let pick = move |follow: Style, reduced: bool| if reduced { from } else { follow };
    let style = MotionValue::new(pick(follow.get(), reduced.get()));

    {
        let (target, reduced_now) = (style.clone(), reduced.clone());
        subscriptions.push(follow.subscribe(move |value| target.set(pick(*value, reduced_now.get()))));
        let (target, follow_now) = (style.clone(), follow.clone());
        subscriptions.push(reduced.subscribe(move |reduced| target.set(pick(follow_now.get(), *reduced))));
    }

    let id = options.id.unwrap_or_else(|| {
        NEXT_PARALLAX.with(|next| {
            let n = next.get();
            next.set(n + 1);
            format!("parallax-{n}")
        })
    });
    let release = tracker.clone();
    context
        .scroll_registry()
        .register(&id, element, move || release.dispose());

    let parallax = Parallax {
        inner: Rc::new(ParallaxInner {
            id,
            context,
            tracker,
            spring,
            style,
            subscriptions: RefCell::new(subscriptions),
        }),
    };
    let teardown = parallax.clone();
    on_cleanup(move || teardown.dispose());
    parallax
}

impl Parallax {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn style(&self) -> MotionValue<Style> {
        self.inner.style.clone()
    }

    pub fn progress(&self) -> MotionValue<f32> {
        self.inner.tracker.progress()
    }

    pub fn tracker(&self) -> &ScrollProgress {
        &self.inner.tracker
    }

    /// Moving with the scroll right now. Never true under reduced motion.
    pub fn is_active(&self) -> bool {
        self.inner.tracker.is_scrolling() && !self.inner.context.reduced_motion()
    }

    pub fn dispose(&self) {
        // Runs the registry cleanup, which disposes the tracker.
        if !self.inner.context.scroll_registry().unregister(&self.inner.id) {
            self.inner.tracker.dispose();
        }
        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
        if let Some(spring) = &self.inner.spring {
            spring.stop();
        }
        self.inner.style.clear_subscribers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Rect;
    use crate::provider::{MotionConfig, MotionProvider};
    use crate::value::{dispose_scope, with_scope};

    fn page() -> Platform {
        scheduler::reset();
        let platform = Platform::default();
        platform.resize(1000.0, 800.0);
        platform
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(scroll_progress(100.0, 300.0, 0.0), 0.0);
        assert_eq!(scroll_progress(100.0, 300.0, 200.0), 0.5);
        assert_eq!(scroll_progress(100.0, 300.0, 900.0), 1.0);
        assert_eq!(scroll_progress(300.0, 300.0, 300.0), 1.0);
    }

    #[test]
    fn test_tracks_direction_velocity_and_idle() {
        let platform = page();
        let tracker = ScrollProgress::track(
            &platform,
            ScrollOptions::new(ScrollRange::Pixels {
                start: 0.0,
                end: 1000.0,
            }),
        );

        scheduler::advance_by(100.0);
        platform.scroll_to(0.0, 250.0);
        assert_eq!(tracker.progress().get(), 0.25);
        assert_eq!(tracker.direction().get(), ScrollDirection::Down);
        assert!((tracker.velocity().get() - 2500.0).abs() < 1.0);
        assert!(tracker.is_scrolling());

        scheduler::advance_by(50.0);
        platform.scroll_to(0.0, 200.0);
        assert_eq!(tracker.direction().get(), ScrollDirection::Up);
        assert!((tracker.velocity().get() + 1000.0).abs() < 1.0);

        scheduler::advance_by(DEFAULT_IDLE_MS + 1.0);
        assert!(!tracker.is_scrolling());
        assert_eq!(tracker.velocity().get(), 0.0);
        assert_eq!(tracker.direction().get(), ScrollDirection::Still);
    }

    #[test]
    fn test_element_range_follows_layout() {
        let platform = page();
        let element = ElementRef::new();
        let tracker =
            ScrollProgress::track(&platform, ScrollOptions::new(ScrollRange::Element(element.clone())));
        assert_eq!(tracker.progress().get(), 0.0);

        // Range is 200..1200 once attached.
        element.attach(Rect::new(0.0, 1000.0, 100.0, 200.0));
        platform.scroll_to(0.0, 700.0);
        assert_eq!(tracker.progress().get(), 0.5);
    }

    #[test]
    fn test_dispose_stops_tracking() {
        let platform = page();
        let tracker = ScrollProgress::track(&platform, ScrollOptions::default());
        platform.scroll_to(0.0, 100.0);
        tracker.dispose();
        assert_eq!(scheduler::pending_timers(), 0);
        platform.scroll_to(0.0, 400.0);
        assert_eq!(tracker.progress().get(), 0.125);
    }

    #[test]
    fn test_parallax_interpolates_and_registers() {
        let platform = page();
        let ((context, parallax, element), scope) = with_scope(|| {
            let context = MotionProvider::new(&platform)
                .config(MotionConfig::default().monitor_frame_rate(false))
                .mount();
            let element = ElementRef::new();
            element.attach(Rect::new(0.0, 1000.0, 100.0, 200.0));
            let parallax = use_parallax(&element, ParallaxOptions::offset(100.0).id("hero-bg"));
            (context, parallax, element)
        });
        assert!(context.scroll_registry().contains("hero-bg"));
        assert_eq!(parallax.style().get(), Style::VISIBLE);

        platform.scroll_to(0.0, 700.0);
        assert_eq!(parallax.style().get().y, -50.0);
        assert!(parallax.is_active());

        context.update_config(|config| config.reduced_motion = Some(true));
        assert_eq!(parallax.style().get(), Style::VISIBLE);
        assert!(!parallax.is_active());

        dispose_scope(scope);
        assert!(!context.scroll_registry().contains("hero-bg"));
        drop(element);
    }

    #[test]
    fn test_preset_parallax_springs_toward_scroll() {
        let platform = page();
        let ((context, parallax), _) = with_scope(|| {
            let context = MotionProvider::new(&platform)
                .config(MotionConfig::default().monitor_frame_rate(false))
                .mount();
            let element = ElementRef::new();
            element.attach(Rect::new(0.0, 1000.0, 100.0, 200.0));
            let options = ParallaxOptions::preset(&context, "parallaxSlow");
            assert_eq!(options.spring, Some(SpringConfig::GENTLE));
            (context, use_parallax(&element, options))
        });

        platform.scroll_to(0.0, 700.0);
        assert_eq!(parallax.progress().get(), 0.5);
        assert_eq!(parallax.style().get().y, 0.0);

        scheduler::advance_by(100.0);
        let y = parallax.style().get().y;
        assert!(y < 0.0 && y > -60.0, "mid-flight y {y}");

        scheduler::advance_by(10_000.0);
        assert_eq!(parallax.style().get().y, -60.0);

        context.update_config(|config| config.reduced_motion = Some(true));
        platform.scroll_to(0.0, 1200.0);
        assert_eq!(parallax.style().get(), Style::VISIBLE);
        context.update_config(|config| config.reduced_motion = None);
        assert_eq!(parallax.style().get().y, -120.0);
    }
}
