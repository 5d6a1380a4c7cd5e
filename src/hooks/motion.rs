//! `use_motion`: one element, one trigger.
//!
//! Each trigger type is a small state machine fed by input events (or by
//! viewport visibility and scroll). Whatever state it is in, the element
//! reports itself inactive while reduced motion is on; the interaction's
//! non-visual effects still happen.
//!
//! Presets with a spring drive a progress value frame by frame instead of
//! handing a timed transition to the view layer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::in_view::InView;
use super::props::{
    AnimationProps, EventHandlers, EventResponse, InteractionChannels, InteractionEvent, Variant,
};
use super::scroll::{ScrollOptions, ScrollProgress, ScrollRange};
use crate::accessibility::Politeness;
use crate::animation::{Animatable, SpringDrive, Style, Transition};
use crate::config::{ConfigOverride, FALLBACK_PRESET, ResolvedAnimation, Trigger};
use crate::performance::Feature;
use crate::platform::ElementRef;
use crate::provider::{MotionContext, use_motion_context};
use crate::value::{MotionValue, Subscription, on_cleanup};

/// Where a trigger's state machine stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    #[default]
    Idle,
    Hovered,
    Pressed,
    Focused,
    /// Entered the viewport.
    Seen,
    /// Activated through `trigger_animation`.
    Triggered,
}

impl MotionState {
    pub fn is_engaged(&self) -> bool {
        !matches!(self, MotionState::Idle)
    }
}

/// Hover, focus and press transitions. Returns the next state, or `None`
/// when the event is not one the trigger reacts to.
pub fn next_state(trigger: &Trigger, state: MotionState, event: &InteractionEvent) -> Option<MotionState> {
    use InteractionEvent as E;
    let next = match (trigger, event) {
        (Trigger::Hover, E::PointerEnter { .. } | E::TouchStart { .. }) => MotionState::Hovered,
        (Trigger::Hover, E::PointerLeave | E::TouchEnd | E::PointerCancel) => MotionState::Idle,

        (Trigger::Click, E::PointerDown { .. } | E::TouchStart { .. }) => MotionState::Pressed,
        (Trigger::Click, E::KeyDown { key }) if key.activates() => MotionState::Pressed,
        (
            Trigger::Click,
            E::PointerUp { .. } | E::PointerCancel | E::PointerLeave | E::TouchEnd | E::FocusOut,
        ) => MotionState::Idle,
        (Trigger::Click, E::KeyUp { key }) if key.activates() => MotionState::Idle,

        (Trigger::Focus, E::FocusIn) => MotionState::Focused,
        (Trigger::Focus, E::FocusOut) => MotionState::Idle,
        _ => return None,
    };
    // A manual trigger outranks input until it is reset.
    if state == MotionState::Triggered {
        return Some(state);
    }
    Some(next)
}

#[derive(Clone, Debug, Default)]
pub struct MotionOptions {
    pub preset: Option<String>,
    pub overrides: ConfigOverride,
}

impl MotionOptions {
    pub fn preset(id: impl Into<String>) -> Self {
        Self {
            preset: Some(id.into()),
            overrides: ConfigOverride::default(),
        }
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.overrides.trigger = Some(trigger);
        self
    }

    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.overrides.duration_ms = Some(duration_ms);
        self
    }

    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.overrides.delay_ms = Some(delay_ms);
        self
    }

    pub fn styles(mut self, from: Style, to: Style) -> Self {
        self.overrides.from = Some(from);
        self.overrides.to = Some(to);
        self
    }
}

type PressCallback = Rc<dyn Fn()>;

struct MotionInner {
    context: MotionContext,
    element: ElementRef,
    resolved: RefCell<ResolvedAnimation>,
    state: MotionValue<MotionState>,
    in_view: RefCell<Option<InView>>,
    scroll: RefCell<Option<ScrollProgress>>,
    spring: Option<SpringDrive>,
    scroll_follow: RefCell<Option<Subscription>>,
    on_press: RefCell<Vec<PressCallback>>,
}

/// Handle returned by [`use_motion`].
#[derive(Clone)]
pub struct Motion {
    inner: Rc<MotionInner>,
}

/// Animate one element from a preset (default `fadeIn`) under its trigger.
pub fn use_motion(options: MotionOptions) -> Motion {
    let context = use_motion_context();
    context.record_feature(Feature::Motion);
    let preset = options.preset.as_deref().unwrap_or(FALLBACK_PRESET);
    let resolved = context.resolve(preset, Some(&options.overrides));
    let trigger = resolved.config.trigger;
    let spring = resolved
        .config
        .properties
        .spring
        .map(|config| SpringDrive::new(0.0, config));

    let motion = Motion {
        inner: Rc::new(MotionInner {
            context,
            element: ElementRef::new(),
            resolved: RefCell::new(resolved),
            state: MotionValue::new(MotionState::Idle),
            in_view: RefCell::new(None),
            scroll: RefCell::new(None),
            spring,
            scroll_follow: RefCell::new(None),
            on_press: RefCell::new(Vec::new()),
        }),
    };

    match trigger {
        Trigger::Viewport(viewport) => {
            let in_view = InView::observe(motion.inner.context.platform(), &motion.inner.element, viewport);
            let weak = Rc::downgrade(&motion.inner);
            in_view.on_enter(move || {
                if let Some(inner) = weak.upgrade() {
                    Motion { inner }.enter_viewport();
                }
            });
            let weak = Rc::downgrade(&motion.inner);
            in_view.on_exit(move || {
                if let Some(inner) = weak.upgrade() {
                    Motion { inner }.set_state(MotionState::Idle);
                }
            });
            if in_view.is_in_view() {
                motion.enter_viewport();
            }
            *motion.inner.in_view.borrow_mut() = Some(in_view);
        }
        Trigger::Scroll => {
            let tracker = ScrollProgress::track(
                motion.inner.context.platform(),
                ScrollOptions::new(ScrollRange::Element(motion.inner.element.clone())),
            );
            if motion.inner.spring.is_some() {
                let weak = Rc::downgrade(&motion.inner);
                let follow = tracker.progress().subscribe(move |progress| {
                    if let Some(inner) = weak.upgrade() {
                        Motion { inner }.drive(*progress);
                    }
                });
                *motion.inner.scroll_follow.borrow_mut() = Some(follow);
            }
            *motion.inner.scroll.borrow_mut() = Some(tracker);
        }
        Trigger::Hover | Trigger::Click | Trigger::Focus | Trigger::Manual => {}
    }

    let teardown = motion.clone();
    on_cleanup(move || teardown.dispose());
    motion
}

impl Motion {
    /// Attach this to the animated element.
    pub fn element_ref(&self) -> ElementRef {
        self.inner.element.clone()
    }

    pub fn trigger(&self) -> Trigger {
        self.inner.resolved.borrow().config.trigger
    }

    pub fn state(&self) -> MotionState {
        self.inner.state.get()
    }

    pub fn state_value(&self) -> MotionValue<MotionState> {
        self.inner.state.clone()
    }

    /// Scroll progress for scroll-driven elements.
    pub fn scroll_progress(&self) -> Option<MotionValue<f32>> {
        self.inner.scroll.borrow().as_ref().map(ScrollProgress::progress)
    }

    /// Sprung progress from rest (0) to engaged (1), for presets that
    /// carry a spring.
    pub fn spring_progress(&self) -> Option<MotionValue<f32>> {
        self.inner.spring.as_ref().map(SpringDrive::output)
    }

    /// Animating (or animated in) right now. Never true under reduced
    /// motion, whatever the trigger says.
    pub fn is_active(&self) -> bool {
        if self.inner.context.reduced_motion() {
            return false;
        }
        match &*self.inner.scroll.borrow() {
            Some(tracker) => tracker.progress().get() > 0.0,
            None => self.state().is_engaged(),
        }
    }

    /// Called when a press completes (pointer or Enter/Space released on
    /// the element). Fires with or without reduced motion.
    pub fn on_press(&self, f: impl Fn() + 'static) -> &Self {
        self.inner.on_press.borrow_mut().push(Rc::new(f));
        self
    }

    /// Style props for the current state, with timing adjusted for the
    /// current performance mode.
    pub fn animation_props(&self) -> AnimationProps {
        let inner = &self.inner;
        let resolved = {
            let mut resolved = inner.resolved.borrow_mut();
            resolved.refresh(inner.context.controller());
            resolved.clone()
        };
        if resolved.reduced_motion || inner.context.reduced_motion() {
            return AnimationProps::fixed(resolved.resting());
        }

        let props = &resolved.config.properties;
        // The spring moves the style itself, so the renderer must not ease.
        let (sprung, transition) = match &inner.spring {
            Some(spring) => (Some(spring.output().get()), Transition::instant().to_spec()),
            None => (None, resolved.transition.to_spec()),
        };
        if let Some(tracker) = &*inner.scroll.borrow() {
            let progress = tracker.progress().get();
            return AnimationProps {
                initial: props.from,
                animate: Style::lerp(&props.from, &props.to, sprung.unwrap_or(progress)),
                variant: if progress > 0.0 { Variant::Visible } else { Variant::Hidden },
                transition,
            };
        }

        let engaged = self.state().is_engaged();
        let animate = match sprung {
            Some(progress) => Style::lerp(&props.from, &props.to, progress),
            None if engaged => props.to,
            None => props.from,
        };
        AnimationProps {
            initial: resolved.initial(),
            animate,
            variant: if engaged { Variant::Visible } else { Variant::Hidden },
            transition,
        }
    }

    /// Handlers for the trigger's input channels; none for viewport,
    /// scroll and manual triggers.
    pub fn event_handlers(&self) -> EventHandlers {
        let channels = match self.trigger() {
            Trigger::Hover => InteractionChannels::POINTER | InteractionChannels::TOUCH,
            Trigger::Click => {
                InteractionChannels::POINTER
                    | InteractionChannels::TOUCH
                    | InteractionChannels::KEYBOARD
                    | InteractionChannels::FOCUS
            }
            Trigger::Focus => InteractionChannels::FOCUS,
            Trigger::Viewport(_) | Trigger::Scroll | Trigger::Manual => {
                return EventHandlers::none();
            }
        };
        let weak: Weak<MotionInner> = Rc::downgrade(&self.inner);
        EventHandlers::new(channels, move |event| match weak.upgrade() {
            Some(inner) => Motion { inner }.handle(event),
            None => EventResponse::Ignored,
        })
    }

    /// Feed one input event through the trigger's state machine.
    pub fn handle(&self, event: &InteractionEvent) -> EventResponse {
        let trigger = self.trigger();
        let previous = self.state();
        let Some(next) = next_state(&trigger, previous, event) else {
            return EventResponse::Ignored;
        };
        self.set_state(next);

        let released = previous == MotionState::Pressed
            && matches!(
                event,
                InteractionEvent::PointerUp { .. }
                    | InteractionEvent::TouchEnd
                    | InteractionEvent::KeyUp { .. }
            );
        if released {
            let callbacks = self.inner.on_press.borrow().clone();
            for callback in callbacks {
                callback();
            }
        }
        EventResponse::Handled
    }

    fn enter_viewport(&self) {
        if self.state() != MotionState::Triggered {
            self.set_state(MotionState::Seen);
        }
    }

    fn set_state(&self, next: MotionState) {
        let previous = self.inner.state.get();
        if previous == next {
            return;
        }
        log::trace!("motion {:?} -> {:?}", previous, next);
        self.inner.state.set(next);
        if next.is_engaged() != previous.is_engaged() {
            self.drive(if next.is_engaged() { 1.0 } else { 0.0 });
        }
        if !previous.is_engaged() && next.is_engaged() {
            self.announce();
        }
    }

    fn drive(&self, target: f32) {
        let Some(spring) = &self.inner.spring else {
            return;
        };
        if self.inner.context.reduced_motion() {
            spring.jump(target);
        } else {
            spring.set_target(target);
        }
    }

    fn announce(&self) {
        let message = self.inner.resolved.borrow().config.accessibility.announcement.clone();
        if let Some(message) = message {
            self.inner
                .context
                .announcer()
                .announce(&message, Politeness::Polite);
        }
    }

    /// Activate regardless of the trigger.
    pub fn trigger_animation(&self) {
        self.set_state(MotionState::Triggered);
    }

    /// Back to rest. A viewport element that already entered with `once`
    /// stays at rest until triggered again.
    pub fn reset_animation(&self) {
        self.set_state(MotionState::Idle);
    }

    /// Stop observing and drop listeners.
    pub fn dispose(&self) {
        if let Some(in_view) = self.inner.in_view.borrow_mut().take() {
            in_view.dispose();
        }
        if let Some(follow) = self.inner.scroll_follow.borrow_mut().take() {
            follow.unsubscribe();
        }
        if let Some(tracker) = self.inner.scroll.borrow_mut().take() {
            tracker.dispose();
        }
        if let Some(spring) = &self.inner.spring {
            spring.stop();
        }
        self.inner.on_press.borrow_mut().clear();
        self.inner.state.clear_subscribers();
    }
}
