//! Drag and swipe.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::props::{EventHandlers, EventResponse, InteractionChannels, InteractionEvent};
use crate::animation::{SpringConfig, SpringHandle, animate_spring};
use crate::performance::Feature;
use crate::provider::{MotionContext, use_motion_context};
use crate::value::{MotionValue, on_cleanup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragAxis {
    #[default]
    Both,
    X,
    Y,
    /// Only swipes are reported; the element does not follow the pointer.
    Locked,
}

/// Limits on the drag offset, in px from the rest position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragConstraints {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub top: Option<f32>,
    pub bottom: Option<f32>,
}

impl DragConstraints {
    pub fn symmetric(x: f32, y: f32) -> Self {
        Self {
            left: Some(-x),
            right: Some(x),
            top: Some(-y),
            bottom: Some(y),
        }
    }
}

/// Clamp `value` to `[min, max]`, letting `elastic` of the overshoot through.
pub fn apply_constraint(value: f32, min: Option<f32>, max: Option<f32>, elastic: f32) -> f32 {
    let elastic = elastic.clamp(0.0, 1.0);
    if let Some(max) = max
        && value > max
    {
        return max + (value - max) * elastic;
    }
    if let Some(min) = min
        && value < min
    {
        return min + (value - min) * elastic;
    }
    value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

/// The swipe a drag of `(dx, dy)` amounts to, if its dominant axis moved at
/// least `threshold` px.
pub fn classify_swipe(dx: f32, dy: f32, threshold: f32) -> Option<SwipeDirection> {
    if dx.abs().max(dy.abs()) < threshold {
        return None;
    }
    Some(if dx.abs() >= dy.abs() {
        if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if dy > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOptions {
    pub axis: DragAxis,
    pub constraints: DragConstraints,
    /// Share of the overshoot past a constraint that still moves the element.
    pub elastic: f32,
    pub swipe_threshold: f32,
    /// Return to the rest position on release.
    pub snap_back: bool,
    pub spring: SpringConfig,
}

impl GestureOptions {
    /// Defaults with the release spring of a registered config, when it
    /// has one.
    pub fn preset(context: &MotionContext, id: &str) -> Self {
        let resolved = context.resolve(id, None);
        let defaults = Self::default();
        Self {
            spring: resolved.config.properties.spring.unwrap_or(defaults.spring),
            ..defaults
        }
    }

    pub fn axis(mut self, axis: DragAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn constraints(mut self, constraints: DragConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn elastic(mut self, elastic: f32) -> Self {
        self.elastic = elastic;
        self
    }

    pub fn swipe_threshold(mut self, px: f32) -> Self {
        self.swipe_threshold = px;
        self
    }

    pub fn snap_back(mut self, snap_back: bool) -> Self {
        self.snap_back = snap_back;
        self
    }

    pub fn spring(mut self, spring: SpringConfig) -> Self {
        self.spring = spring;
        self
    }
}

impl Default for GestureOptions {
    fn default() -> Self {
        Self {
            axis: DragAxis::Both,
            constraints: DragConstraints::default(),
            elastic: 0.35,
            swipe_threshold: 50.0,
            snap_back: true,
            spring: SpringConfig::DEFAULT,
        }
    }
}

#[derive(Default)]
struct DragState {
    active: bool,
    start: (f32, f32),
    last: (f32, f32),
    /// Offset when the drag began.
    base: (f32, f32),
    springs: Vec<SpringHandle>,
    last_swipe: Option<SwipeDirection>,
}

type SwipeCallback = Rc<dyn Fn(SwipeDirection)>;

struct GestureInner {
    context: MotionContext,
    options: GestureOptions,
    x: MotionValue<f32>,
    y: MotionValue<f32>,
    dragging: MotionValue<bool>,
    state: RefCell<DragState>,
    on_swipe: RefCell<Vec<SwipeCallback>>,
}

/// Pointer and touch dragging with swipe detection.
#[derive(Clone)]
pub struct Gesture {
    inner: Rc<GestureInner>,
}

pub fn use_gesture(options: GestureOptions) -> Gesture {
    let context = use_motion_context();
    context.record_feature(Feature::Gesture);
    let gesture = Gesture {
        inner: Rc::new(GestureInner {
            context,
            options,
            x: MotionValue::new(0.0),
            y: MotionValue::new(0.0),
            dragging: MotionValue::new(false),
            state: RefCell::new(DragState::default()),
            on_swipe: RefCell::new(Vec::new()),
        }),
    };
    let teardown = gesture.clone();
    on_cleanup(move || teardown.dispose());
    gesture
}

impl Gesture {
    /// Horizontal offset from rest, px.
    pub fn x(&self) -> MotionValue<f32> {
        self.inner.x.clone()
    }

    pub fn y(&self) -> MotionValue<f32> {
        self.inner.y.clone()
    }

    pub fn dragging(&self) -> MotionValue<bool> {
        self.inner.dragging.clone()
    }

    /// Being dragged, as far as visuals go. Never true under reduced motion.
    pub fn is_active(&self) -> bool {
        self.inner.dragging.get() && !self.inner.context.reduced_motion()
    }

    pub fn last_swipe(&self) -> Option<SwipeDirection> {
        self.inner.state.borrow().last_swipe
    }

    /// Swipes are reported with or without reduced motion.
    pub fn on_swipe(&self, f: impl Fn(SwipeDirection) + 'static) -> &Self {
        self.inner.on_swipe.borrow_mut().push(Rc::new(f));
        self
    }

    pub fn is_settling(&self) -> bool {
        self.inner
            .state
            .borrow()
            .springs
            .iter()
            .any(SpringHandle::is_animating)
    }

    pub fn event_handlers(&self) -> EventHandlers {
        let weak: Weak<GestureInner> = Rc::downgrade(&self.inner);
        EventHandlers::new(
            InteractionChannels::POINTER | InteractionChannels::TOUCH,
            move |event| match weak.upgrade() {
                Some(inner) => Gesture { inner }.handle(event),
                None => EventResponse::Ignored,
            },
        )
    }

    /// Feed one input event.
    pub fn handle(&self, event: &InteractionEvent) -> EventResponse {
        match *event {
            InteractionEvent::PointerDown { x, y } | InteractionEvent::TouchStart { x, y } => {
                self.begin(x, y);
                EventResponse::Handled
            }
            InteractionEvent::PointerMove { x, y } | InteractionEvent::TouchMove { x, y } => {
                if self.inner.state.borrow().active {
                    self.track(x, y);
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            InteractionEvent::PointerUp { x, y } => {
                if self.inner.state.borrow().active {
                    self.track(x, y);
                }
                self.end(true)
            }
            InteractionEvent::TouchEnd => self.end(true),
            InteractionEvent::PointerCancel => self.end(false),
            _ => EventResponse::Ignored,
        }
    }

    fn begin(&self, x: f32, y: f32) {
        let springs = {
            let mut state = self.inner.state.borrow_mut();
            state.active = true;
            state.start = (x, y);
            state.last = (x, y);
            std::mem::take(&mut state.springs)
        };
        for spring in springs {
            spring.stop();
        }
        let base = (self.inner.x.get(), self.inner.y.get());
        self.inner.state.borrow_mut().base = base;
        self.inner.dragging.set(true);
    }

    fn track(&self, x: f32, y: f32) {
        let (start, base) = {
            let mut state = self.inner.state.borrow_mut();
            state.last = (x, y);
            (state.start, state.base)
        };
        if self.inner.context.reduced_motion() {
            return;
        }
        let options = &self.inner.options;
        let c = options.constraints;
        let (follow_x, follow_y) = match options.axis {
            DragAxis::Both => (true, true),
            DragAxis::X => (true, false),
            DragAxis::Y => (false, true),
            DragAxis::Locked => (false, false),
        };
        if follow_x {
            let raw = base.0 + x - start.0;
            self.inner
                .x
                .set(apply_constraint(raw, c.left, c.right, options.elastic));
        }
        if follow_y {
            let raw = base.1 + y - start.1;
            self.inner
                .y
                .set(apply_constraint(raw, c.top, c.bottom, options.elastic));
        }
    }

    fn end(&self, completed: bool) -> EventResponse {
        let (start, last) = {
            let mut state = self.inner.state.borrow_mut();
            if !state.active {
                return EventResponse::Ignored;
            }
            state.active = false;
            (state.start, state.last)
        };
        self.inner.dragging.set(false);

        if completed {
            let swipe = classify_swipe(
                last.0 - start.0,
                last.1 - start.1,
                self.inner.options.swipe_threshold,
            );
            if let Some(direction) = swipe {
                log::debug!("swipe {direction:?}");
                self.inner.state.borrow_mut().last_swipe = Some(direction);
                let callbacks = self.inner.on_swipe.borrow().clone();
                for callback in callbacks {
                    callback(direction);
                }
            }
        }
        self.settle();
        EventResponse::Handled
    }

    /// Move back to rest, or inside the constraints, springing unless
    /// motion is reduced.
    fn settle(&self) {
        let options = &self.inner.options;
        let c = options.constraints;
        let (x, y) = (self.inner.x.get(), self.inner.y.get());
        let target = if options.snap_back {
            (0.0, 0.0)
        } else {
            (
                apply_constraint(x, c.left, c.right, 0.0),
                apply_constraint(y, c.top, c.bottom, 0.0),
            )
        };

        if self.inner.context.reduced_motion() {
            self.inner.x.set(target.0);
            self.inner.y.set(target.1);
            return;
        }

        let mut springs = Vec::new();
        if x != target.0 {
            springs.push(animate_spring(&self.inner.x, target.0, options.spring));
        }
        if y != target.1 {
            springs.push(animate_spring(&self.inner.y, target.1, options.spring));
        }
        self.inner.state.borrow_mut().springs = springs;
    }

    /// Stop springs and drop listeners.
    pub fn dispose(&self) {
        let springs = std::mem::take(&mut self.inner.state.borrow_mut().springs);
        for spring in springs {
            spring.stop();
        }
        self.inner.on_swipe.borrow_mut().clear();
        self.inner.dragging.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::REST_EPSILON;
    use crate::platform::Platform;
    use crate::provider::{MotionConfig, MotionProvider};
    use crate::scheduler;
    use crate::value::with_scope;
    use std::cell::Cell;

    fn gesture(config: MotionConfig, options: GestureOptions) -> Gesture {
        scheduler::reset();
        let platform = Platform::default();
        let (gesture, _) = with_scope(|| {
            MotionProvider::new(&platform)
                .config(config.monitor_frame_rate(false))
                .mount();
            use_gesture(options)
        });
        gesture
    }

    #[test]
    fn test_constraint_elastic() {
        assert_eq!(apply_constraint(50.0, Some(-100.0), Some(100.0), 0.5), 50.0);
        assert_eq!(apply_constraint(140.0, Some(-100.0), Some(100.0), 0.5), 120.0);
        assert_eq!(apply_constraint(-140.0, Some(-100.0), Some(100.0), 0.0), -100.0);
        assert_eq!(apply_constraint(1e6, None, None, 0.5), 1e6);
    }

    #[test]
    fn test_classify_swipe() {
        assert_eq!(classify_swipe(80.0, 10.0, 50.0), Some(SwipeDirection::Right));
        assert_eq!(classify_swipe(-10.0, -60.0, 50.0), Some(SwipeDirection::Up));
        assert_eq!(classify_swipe(20.0, 20.0, 50.0), None);
    }

    #[test]
    fn test_drag_follows_and_springs_back() {
        let gesture = gesture(
            MotionConfig::default(),
            GestureOptions::default().constraints(DragConstraints::symmetric(100.0, 100.0)),
        );
        let handlers = gesture.event_handlers();
        let swipes = Rc::new(Cell::new(0));
        let s = swipes.clone();
        gesture.on_swipe(move |direction| {
            assert_eq!(direction, SwipeDirection::Right);
            s.set(s.get() + 1);
        });

        handlers.dispatch(&InteractionEvent::PointerDown { x: 10.0, y: 10.0 });
        handlers.dispatch(&InteractionEvent::PointerMove { x: 70.0, y: 20.0 });
        assert!(gesture.is_active());
        assert_eq!(gesture.x().get(), 60.0);
        assert_eq!(gesture.y().get(), 10.0);

        handlers.dispatch(&InteractionEvent::PointerMove { x: 150.0, y: 20.0 });
        assert_eq!(gesture.x().get(), 100.0 + 40.0 * 0.35);

        handlers.dispatch(&InteractionEvent::PointerUp { x: 150.0, y: 20.0 });
        assert!(!gesture.is_active());
        assert_eq!(swipes.get(), 1);
        assert!(gesture.is_settling());

        scheduler::advance_by(10_000.0);
        assert!(!gesture.is_settling());
        assert!(gesture.x().get().abs() < REST_EPSILON);
        assert!(gesture.y().get().abs() < REST_EPSILON);
    }

    #[test]
    fn test_preset_spring_drives_release() {
        scheduler::reset();
        let platform = Platform::default();
        let ((snappy, plain), _) = with_scope(|| {
            let context = MotionProvider::new(&platform)
                .config(MotionConfig::default().monitor_frame_rate(false))
                .mount();
            let snappy = GestureOptions::preset(&context, "pressScale");
            let plain = GestureOptions::preset(&context, "fadeIn");
            assert_eq!(snappy.spring, SpringConfig::SNAPPY);
            assert_eq!(plain.spring, SpringConfig::DEFAULT);
            (use_gesture(snappy), use_gesture(plain))
        });

        for gesture in [&snappy, &plain] {
            gesture.handle(&InteractionEvent::PointerDown { x: 0.0, y: 0.0 });
            gesture.handle(&InteractionEvent::PointerMove { x: 40.0, y: 0.0 });
            gesture.handle(&InteractionEvent::PointerUp { x: 40.0, y: 0.0 });
        }
        scheduler::advance_by(1200.0);
        assert!(!snappy.is_settling());
        assert_eq!(snappy.x().get(), 0.0);
        assert!(plain.is_settling());

        scheduler::advance_by(10_000.0);
        assert!(!plain.is_settling());
    }

    #[test]
    fn test_cancel_does_not_swipe() {
        let gesture = gesture(MotionConfig::default(), GestureOptions::default());
        gesture.handle(&InteractionEvent::TouchStart { x: 0.0, y: 0.0 });
        gesture.handle(&InteractionEvent::TouchMove { x: 0.0, y: 200.0 });
        gesture.handle(&InteractionEvent::PointerCancel);
        assert_eq!(gesture.last_swipe(), None);

        gesture.handle(&InteractionEvent::TouchStart { x: 0.0, y: 0.0 });
        gesture.handle(&InteractionEvent::TouchMove { x: 0.0, y: 200.0 });
        gesture.handle(&InteractionEvent::TouchEnd);
        assert_eq!(gesture.last_swipe(), Some(SwipeDirection::Down));
    }

    #[test]
    fn test_reduced_motion_swipes_without_moving() {
        let gesture = gesture(
            MotionConfig::default().reduced_motion(Some(true)),
            GestureOptions::default().axis(DragAxis::X),
        );
        gesture.handle(&InteractionEvent::PointerDown { x: 0.0, y: 0.0 });
        gesture.handle(&InteractionEvent::PointerMove { x: -120.0, y: 0.0 });
        assert!(!gesture.is_active());
        assert_eq!(gesture.x().get(), 0.0);
        gesture.handle(&InteractionEvent::PointerUp { x: -120.0, y: 0.0 });
        assert_eq!(gesture.last_swipe(), Some(SwipeDirection::Left));
        assert!(!gesture.is_settling());
    }
}
