//! Staggered list entrances.
//!
//! Every item gets an absolute start time relative to the start of the
//! sequence, so callbacks fire in animation order without chaining.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rand::seq::SliceRandom;

use super::in_view::InView;
use super::props::{AnimationProps, Variant};
use crate::animation::{Easing, Style, Transition};
use crate::config::{ConfigOverride, Trigger, ViewportOptions};
use crate::performance::Feature;
use crate::platform::ElementRef;
use crate::provider::{MotionContext, use_motion_context};
use crate::scheduler::{self, TimerId};
use crate::value::on_cleanup;

/// Wait after the last item finishes before the sequence counts as done.
pub const SETTLE_MS: f32 = 50.0;

pub const DEFAULT_STAGGER_PRESET: &str = "staggerItem";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaggerDirection {
    #[default]
    Forward,
    Reverse,
    /// Outwards from the middle, alternating sides.
    CenterOut,
    Random,
}

/// The order in which `len` items animate, as item indices.
pub fn calculate_animation_order(len: usize, direction: StaggerDirection) -> Vec<usize> {
    match direction {
        StaggerDirection::Forward => (0..len).collect(),
        StaggerDirection::Reverse => (0..len).rev().collect(),
        StaggerDirection::CenterOut => {
            if len == 0 {
                return Vec::new();
            }
            // For even lengths this is the right one of the two middle slots.
            let center = len / 2;
            let mut order = Vec::with_capacity(len);
            order.push(center);
            for step in 1..=center.max(len - center) {
                if step <= center {
                    order.push(center - step);
                }
                if center + step < len {
                    order.push(center + step);
                }
            }
            order
        }
        StaggerDirection::Random => {
            let mut order: Vec<usize> = (0..len).collect();
            order.shuffle(&mut rand::rng());
            order
        }
    }
}

/// Gap between consecutive items.
#[derive(Clone)]
pub enum StaggerDelay {
    /// Fixed spacing; the item at order position `n` waits `n * ms`.
    Constant(f32),
    /// Absolute delay for each order position.
    PerItem(Rc<dyn Fn(usize) -> f32>),
}

impl StaggerDelay {
    pub fn per_item(f: impl Fn(usize) -> f32 + 'static) -> Self {
        StaggerDelay::PerItem(Rc::new(f))
    }

    /// Delay in ms for order position `position`.
    pub fn at(&self, position: usize) -> f32 {
        let delay = match self {
            StaggerDelay::Constant(ms) => ms * position as f32,
            StaggerDelay::PerItem(f) => f(position),
        };
        if delay.is_finite() { delay.max(0.0) } else { 0.0 }
    }
}

impl fmt::Debug for StaggerDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaggerDelay::Constant(ms) => f.debug_tuple("Constant").field(ms).finish(),
            StaggerDelay::PerItem(_) => f.write_str("PerItem(..)"),
        }
    }
}

type ItemCallback = Rc<dyn Fn(usize)>;
type DoneCallback = Rc<dyn Fn()>;

#[derive(Clone, Default)]
pub struct StaggerOptions {
    pub preset: Option<String>,
    /// Defaults to the preset's stagger spacing.
    pub delay: Option<StaggerDelay>,
    /// Per-item duration in ms; defaults to the preset's.
    pub duration_ms: Option<f32>,
    pub direction: StaggerDirection,
    /// `Viewport` starts on entry; anything else waits for
    /// `trigger_animation`.
    pub trigger: Option<Trigger>,
    pub repeat: bool,
    pub loop_delay_ms: f32,
    pub styles: Option<(Style, Style)>,
    on_item_start: Option<ItemCallback>,
    on_item_complete: Option<ItemCallback>,
    on_complete: Option<DoneCallback>,
}

impl StaggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(mut self, id: impl Into<String>) -> Self {
        self.preset = Some(id.into());
        self
    }

    pub fn delay(mut self, delay: StaggerDelay) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn stagger_ms(self, ms: f32) -> Self {
        self.delay(StaggerDelay::Constant(ms))
    }

    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn direction(mut self, direction: StaggerDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Replay forever, `loop_delay_ms` after each completion.
    pub fn repeat(mut self, loop_delay_ms: f32) -> Self {
        self.repeat = true;
        self.loop_delay_ms = loop_delay_ms;
        self
    }

    pub fn styles(mut self, from: Style, to: Style) -> Self {
        self.styles = Some((from, to));
        self
    }

    /// Called with the item index when its entrance begins.
    pub fn on_item_start(mut self, f: impl Fn(usize) + 'static) -> Self {
        self.on_item_start = Some(Rc::new(f));
        self
    }

    pub fn on_item_complete(mut self, f: impl Fn(usize) + 'static) -> Self {
        self.on_item_complete = Some(Rc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Rc::new(f));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ItemStart(usize),
    ItemComplete(usize),
    Complete,
    Restart,
}

struct Pending {
    key: u64,
    timer: TimerId,
    due: f64,
    step: Step,
}

#[derive(Default)]
struct SequenceState {
    order: Vec<usize>,
    direction: StaggerDirection,
    /// Order position of the latest item to start.
    current: Option<usize>,
    started: bool,
    complete: bool,
    paused: bool,
    pending: Vec<Pending>,
    /// Steps frozen by a pause, with the time they had left.
    parked: Vec<(Step, f64)>,
    next_key: u64,
}

struct StaggerInner {
    context: MotionContext,
    container: ElementRef,
    delay: StaggerDelay,
    duration_ms: f32,
    easing: Easing,
    from: Style,
    to: Style,
    once: bool,
    repeat: bool,
    loop_delay_ms: f32,
    on_item_start: Option<ItemCallback>,
    on_item_complete: Option<ItemCallback>,
    on_complete: Option<DoneCallback>,
    state: RefCell<SequenceState>,
    in_view: RefCell<Option<InView>>,
}

/// A running (or waiting) staggered entrance over a list of items.
#[derive(Clone)]
pub struct Stagger {
    inner: Rc<StaggerInner>,
}

pub fn use_stagger_animation(len: usize, options: StaggerOptions) -> Stagger {
    let context = use_motion_context();
    context.record_feature(Feature::Stagger);

    let preset = options.preset.as_deref().unwrap_or(DEFAULT_STAGGER_PRESET);
    let overrides = ConfigOverride {
        trigger: options.trigger,
        ..Default::default()
    };
    let resolved = context.resolve(preset, Some(&overrides));
    let props = resolved.config.properties;
    let (from, to) = options.styles.unwrap_or((props.from, props.to));
    let delay = options
        .delay
        .unwrap_or_else(|| StaggerDelay::Constant(props.stagger_ms.unwrap_or(0.0)));
    let duration_ms = match options.duration_ms {
        Some(ms) if ms.is_finite() && ms >= 0.0 => ms,
        Some(ms) => {
            log::warn!("invalid stagger duration {ms}, using {}", props.duration_ms);
            props.duration_ms
        }
        None => props.duration_ms,
    };
    let trigger = resolved.config.trigger;
    let once = match trigger {
        Trigger::Viewport(viewport) => viewport.once,
        _ => true,
    };

    let stagger = Stagger {
        inner: Rc::new(StaggerInner {
            context,
            container: ElementRef::new(),
            delay,
            duration_ms,
            easing: props.easing,
            from: from.sanitized(Style::HIDDEN),
            to: to.sanitized(Style::VISIBLE),
            once,
            repeat: options.repeat,
            loop_delay_ms: options.loop_delay_ms.max(0.0),
            on_item_start: options.on_item_start,
            on_item_complete: options.on_item_complete,
            on_complete: options.on_complete,
            state: RefCell::new(SequenceState {
                order: calculate_animation_order(len, options.direction),
                direction: options.direction,
                ..Default::default()
            }),
            in_view: RefCell::new(None),
        }),
    };

    match trigger {
        Trigger::Viewport(viewport) => stagger.observe_container(viewport),
        Trigger::Manual => {}
        other => log::debug!("stagger ignores {} triggers, waiting for a manual start", other.name()),
    }

    let teardown = stagger.clone();
    on_cleanup(move || teardown.dispose());
    stagger
}

impl Stagger {
    fn observe_container(&self, viewport: ViewportOptions) {
        let in_view = InView::observe(self.inner.context.platform(), &self.inner.container, viewport);
        let weak = Rc::downgrade(&self.inner);
        in_view.on_enter(move || {
            if let Some(inner) = weak.upgrade() {
                Stagger { inner }.trigger_animation();
            }
        });
        let weak = Rc::downgrade(&self.inner);
        in_view.on_exit(move || {
            if let Some(inner) = weak.upgrade()
                && !inner.once
            {
                Stagger { inner }.reset_animation();
            }
        });
        let visible = in_view.is_in_view();
        *self.inner.in_view.borrow_mut() = Some(in_view);
        if visible {
            self.trigger_animation();
        }
    }

    /// Attach this to the list container for viewport-triggered sequences.
    pub fn container_ref(&self) -> ElementRef {
        self.inner.container.clone()
    }

    pub fn order(&self) -> Vec<usize> {
        self.inner.state.borrow().order.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Order position of the latest item to start, `None` before the first.
    pub fn current_index(&self) -> Option<usize> {
        self.inner.state.borrow().current
    }

    pub fn is_complete(&self) -> bool {
        self.inner.state.borrow().complete
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.borrow().paused
    }

    /// Items are still entering. Never true under reduced motion.
    pub fn is_animating(&self) -> bool {
        let state = self.inner.state.borrow();
        state.started && !state.complete && !state.paused && !self.inner.context.reduced_motion()
    }

    /// Delay in ms before item `index` starts.
    pub fn item_delay_ms(&self, index: usize) -> f32 {
        self.inner.delay.at(self.position_of(index))
    }

    fn position_of(&self, index: usize) -> usize {
        self.inner
            .state
            .borrow()
            .order
            .iter()
            .position(|&i| i == index)
            .unwrap_or(index)
    }

    fn total_ms(&self) -> f32 {
        let len = self.len();
        let last = (0..len)
            .map(|position| self.inner.delay.at(position))
            .fold(0.0_f32, f32::max);
        last + self.inner.duration_ms + SETTLE_MS
    }

    /// Props for item `index`.
    pub fn get_item_props(&self, index: usize) -> AnimationProps {
        let inner = &self.inner;
        let controller = inner.context.controller();
        if inner.context.reduced_motion() {
            return AnimationProps::fixed(inner.to);
        }

        let position = self.position_of(index);
        let transition = controller
            .adjust(&Transition::new(inner.duration_ms, inner.easing))
            .delay(inner.delay.at(position))
            .to_spec();
        let state = inner.state.borrow();
        let visible = !state.paused && state.current.is_some_and(|current| position <= current);
        AnimationProps {
            initial: inner.from,
            animate: if visible { inner.to } else { inner.from },
            variant: if visible { Variant::Visible } else { Variant::Hidden },
            transition,
        }
    }

    /// Start from the beginning. Ignored while a run is in progress.
    pub fn trigger_animation(&self) {
        {
            let state = self.inner.state.borrow();
            if state.started && !state.complete {
                return;
            }
        }
        self.clear();
        self.inner.state.borrow_mut().started = true;

        if self.inner.context.reduced_motion() {
            self.run_instantly();
            return;
        }

        let len = self.len();
        log::debug!("stagger sequence of {len} item(s) started");
        for position in 0..len {
            let start = self.inner.delay.at(position);
            self.schedule(Step::ItemStart(position), start as f64);
            self.schedule(
                Step::ItemComplete(position),
                (start + self.inner.duration_ms) as f64,
            );
        }
        self.schedule(Step::Complete, self.total_ms() as f64);
    }

    /// Reduced motion: everything lands at once, callbacks still fire.
    fn run_instantly(&self) {
        let len = self.len();
        for position in 0..len {
            self.fire(Step::ItemStart(position));
            self.fire(Step::ItemComplete(position));
        }
        self.fire(Step::Complete);
    }

    /// Back to not-started, cancelling anything scheduled.
    pub fn reset_animation(&self) {
        self.clear();
    }

    fn clear(&self) {
        let pending = {
            let mut state = self.inner.state.borrow_mut();
            state.current = None;
            state.started = false;
            state.complete = false;
            state.paused = false;
            state.parked.clear();
            std::mem::take(&mut state.pending)
        };
        for entry in pending {
            scheduler::clear_timeout(entry.timer);
        }
    }

    /// Freeze the sequence. Scheduled steps are cancelled and resume where
    /// they left off.
    pub fn pause(&self) {
        let now = scheduler::now();
        let pending = {
            let mut state = self.inner.state.borrow_mut();
            if !state.started || state.paused {
                return;
            }
            state.paused = true;
            let pending = std::mem::take(&mut state.pending);
            state.parked = pending
                .iter()
                .map(|entry| (entry.step, (entry.due - now).max(0.0)))
                .collect();
            pending
        };
        for entry in pending {
            scheduler::clear_timeout(entry.timer);
        }
    }

    pub fn resume(&self) {
        let parked = {
            let mut state = self.inner.state.borrow_mut();
            if !state.paused {
                return;
            }
            state.paused = false;
            std::mem::take(&mut state.parked)
        };
        for (step, remaining) in parked {
            self.schedule(step, remaining);
        }
    }

    /// Swap in a new item count or direction. Anything else is a no-op;
    /// a change restarts the sequence from scratch.
    pub fn set_items(&self, len: usize, direction: StaggerDirection) {
        let (changed, was_started) = {
            let state = self.inner.state.borrow();
            (
                state.order.len() != len || state.direction != direction,
                state.started,
            )
        };
        if !changed {
            return;
        }
        self.clear();
        {
            let mut state = self.inner.state.borrow_mut();
            state.order = calculate_animation_order(len, direction);
            state.direction = direction;
        }
        if was_started {
            self.trigger_animation();
        }
    }

    fn schedule(&self, step: Step, delay_ms: f64) {
        let key = {
            let mut state = self.inner.state.borrow_mut();
            state.next_key += 1;
            state.next_key
        };
        let weak: Weak<StaggerInner> = Rc::downgrade(&self.inner);
        let timer = scheduler::set_timeout(delay_ms, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let stagger = Stagger { inner };
            let step = {
                let mut state = stagger.inner.state.borrow_mut();
                let Some(at) = state.pending.iter().position(|entry| entry.key == key) else {
                    return;
                };
                state.pending.remove(at).step
            };
            stagger.fire(step);
        });
        self.inner.state.borrow_mut().pending.push(Pending {
            key,
            timer,
            due: scheduler::now() + delay_ms.max(0.0),
            step,
        });
    }

    fn fire(&self, step: Step) {
        let inner = &self.inner;
        match step {
            Step::ItemStart(position) => {
                let index = {
                    let mut state = inner.state.borrow_mut();
                    state.current = Some(state.current.map_or(position, |c| c.max(position)));
                    state.order.get(position).copied()
                };
                if let (Some(index), Some(callback)) = (index, &inner.on_item_start) {
                    callback(index);
                }
            }
            Step::ItemComplete(position) => {
                let index = inner.state.borrow().order.get(position).copied();
                if let (Some(index), Some(callback)) = (index, &inner.on_item_complete) {
                    callback(index);
                }
            }
            Step::Complete => {
                {
                    let mut state = inner.state.borrow_mut();
                    if state.complete {
                        return;
                    }
                    state.complete = true;
                }
                log::debug!("stagger sequence complete");
                if let Some(callback) = &inner.on_complete {
                    callback();
                }
                if inner.repeat && !inner.context.reduced_motion() {
                    self.schedule(Step::Restart, inner.loop_delay_ms as f64);
                }
            }
            Step::Restart => self.trigger_animation(),
        }
    }

    /// Cancel every timer and stop observing the container.
    pub fn dispose(&self) {
        self.clear();
        if let Some(in_view) = self.inner.in_view.borrow_mut().take() {
            in_view.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Platform, Rect};
    use crate::provider::{MotionConfig, MotionProvider};
    use crate::value::with_scope;
    use std::cell::Cell;

    fn mount(platform: &Platform, config: MotionConfig) -> MotionContext {
        MotionProvider::new(platform)
            .config(config.monitor_frame_rate(false))
            .mount()
    }

    fn manual() -> StaggerOptions {
        StaggerOptions::new()
            .trigger(Trigger::Manual)
            .stagger_ms(100.0)
            .duration(400.0)
    }

    #[test]
    fn test_order_directions() {
        assert_eq!(calculate_animation_order(3, StaggerDirection::Forward), vec![0, 1, 2]);
        assert_eq!(calculate_animation_order(3, StaggerDirection::Reverse), vec![2, 1, 0]);
        assert_eq!(
            calculate_animation_order(5, StaggerDirection::CenterOut),
            vec![2, 1, 3, 0, 4]
        );
        assert_eq!(
            calculate_animation_order(4, StaggerDirection::CenterOut),
            vec![2, 1, 3, 0]
        );
        assert!(calculate_animation_order(0, StaggerDirection::CenterOut).is_empty());

        let mut random = calculate_animation_order(20, StaggerDirection::Random);
        random.sort_unstable();
        assert_eq!(random, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_delay_variants() {
        assert_eq!(StaggerDelay::Constant(100.0).at(3), 300.0);
        let eased = StaggerDelay::per_item(|n| (n * n) as f32 * 10.0);
        assert_eq!(eased.at(3), 90.0);
        assert_eq!(StaggerDelay::per_item(|_| f32::NAN).at(1), 0.0);
    }

    #[test]
    fn test_callbacks_fire_once_in_order() {
        scheduler::reset();
        let platform = Platform::default();
        let starts = Rc::new(RefCell::new(Vec::new()));
        let completes = Rc::new(RefCell::new(Vec::new()));
        let done = Rc::new(Cell::new(0));

        let (stagger, _) = with_scope(|| {
            mount(&platform, MotionConfig::default());
            let (s, c, d) = (starts.clone(), completes.clone(), done.clone());
            use_stagger_animation(
                3,
                manual()
                    .direction(StaggerDirection::Reverse)
                    .on_item_start(move |i| s.borrow_mut().push(i))
                    .on_item_complete(move |i| c.borrow_mut().push(i))
                    .on_complete(move || d.set(d.get() + 1)),
            )
        });

        stagger.trigger_animation();
        assert!(stagger.is_animating());
        scheduler::advance_by(1000.0);
        assert_eq!(*starts.borrow(), vec![2, 1, 0]);
        assert_eq!(*completes.borrow(), vec![2, 1, 0]);
        assert_eq!(done.get(), 1);
        assert!(stagger.is_complete());
        assert!(!stagger.is_animating());
        assert!(stagger.inner.state.borrow().pending.is_empty());
    }

    #[test]
    fn test_item_props_follow_progress() {
        scheduler::reset();
        let platform = Platform::default();
        let (stagger, _) = with_scope(|| {
            mount(&platform, MotionConfig::default());
            use_stagger_animation(3, manual())
        });
        assert_eq!(stagger.get_item_props(0).variant, Variant::Hidden);
        assert!((stagger.get_item_props(2).transition.delay - 0.2).abs() < 1e-6);

        stagger.trigger_animation();
        scheduler::advance_by(120.0);
        assert_eq!(stagger.current_index(), Some(1));
        assert_eq!(stagger.get_item_props(1).variant, Variant::Visible);
        assert_eq!(stagger.get_item_props(2).variant, Variant::Hidden);
    }

    #[test]
    fn test_pause_defers_remaining_steps() {
        scheduler::reset();
        let platform = Platform::default();
        let starts = Rc::new(RefCell::new(Vec::new()));
        let (stagger, _) = with_scope(|| {
            mount(&platform, MotionConfig::default());
            let s = starts.clone();
            use_stagger_animation(3, manual().on_item_start(move |i| s.borrow_mut().push(i)))
        });

        stagger.trigger_animation();
        scheduler::advance_by(50.0);
        stagger.pause();
        assert!(stagger.is_paused());
        assert_eq!(stagger.get_item_props(0).variant, Variant::Hidden);
        assert_eq!(stagger.current_index(), Some(0));

        scheduler::advance_by(1000.0);
        assert_eq!(*starts.borrow(), vec![0]);

        stagger.resume();
        scheduler::advance_by(40.0);
        assert_eq!(*starts.borrow(), vec![0]);
        scheduler::advance_by(20.0);
        assert_eq!(*starts.borrow(), vec![0, 1]);
        assert_eq!(stagger.get_item_props(0).variant, Variant::Visible);
    }

    #[test]
    fn test_repeat_restarts_after_loop_delay() {
        scheduler::reset();
        let platform = Platform::default();
        let done = Rc::new(Cell::new(0));
        let (stagger, _) = with_scope(|| {
            mount(&platform, MotionConfig::default());
            let d = done.clone();
            use_stagger_animation(
                2,
                manual().repeat(200.0).on_complete(move || d.set(d.get() + 1)),
            )
        });
        stagger.trigger_animation();
        // 100 + 400 + 50 per run, 200 between runs.
        scheduler::advance_by(560.0);
        assert_eq!(done.get(), 1);
        scheduler::advance_by(200.0);
        assert!(stagger.is_animating());
        scheduler::advance_by(560.0);
        assert_eq!(done.get(), 2);

        stagger.reset_animation();
        assert!(stagger.inner.state.borrow().pending.is_empty());
        assert_eq!(stagger.current_index(), None);
    }

    #[test]
    fn test_reduced_motion_completes_instantly() {
        scheduler::reset();
        let platform = Platform::default();
        let completes = Rc::new(RefCell::new(Vec::new()));
        let (stagger, _) = with_scope(|| {
            mount(&platform, MotionConfig::default().reduced_motion(Some(true)));
            let c = completes.clone();
            use_stagger_animation(3, manual().on_item_complete(move |i| c.borrow_mut().push(i)))
        });
        stagger.trigger_animation();
        assert!(stagger.is_complete());
        assert!(!stagger.is_animating());
        assert_eq!(*completes.borrow(), vec![0, 1, 2]);
        let props = stagger.get_item_props(2);
        assert_eq!(props.animate, Style::VISIBLE);
        assert!(props.transition.is_instant());
    }

    #[test]
    fn test_viewport_sequence_replays_unless_once() {
        scheduler::reset();
        let platform = Platform::default();
        platform.resize(1000.0, 800.0);
        let starts = Rc::new(Cell::new(0));
        let (stagger, _) = with_scope(|| {
            mount(&platform, MotionConfig::default());
            let s = starts.clone();
            use_stagger_animation(
                2,
                StaggerOptions::new()
                    .trigger(Trigger::Viewport(ViewportOptions {
                        once: false,
                        ..Default::default()
                    }))
                    .on_item_start(move |_| s.set(s.get() + 1)),
            )
        });
        stagger.container_ref().attach(Rect::new(0.0, 1200.0, 400.0, 300.0));
        assert_eq!(stagger.current_index(), None);

        platform.scroll_to(0.0, 800.0);
        scheduler::advance_by(1000.0);
        assert!(stagger.is_complete());
        assert_eq!(starts.get(), 2);

        platform.scroll_to(0.0, 0.0);
        assert_eq!(stagger.current_index(), None);
        assert!(!stagger.is_complete());

        platform.scroll_to(0.0, 800.0);
        scheduler::advance_by(1000.0);
        assert_eq!(starts.get(), 4);
    }

    #[test]
    fn test_set_items_recomputes_order() {
        scheduler::reset();
        let platform = Platform::default();
        let (stagger, _) = with_scope(|| {
            mount(&platform, MotionConfig::default());
            use_stagger_animation(3, manual())
        });
        stagger.set_items(4, StaggerDirection::CenterOut);
        assert_eq!(stagger.order(), vec![2, 1, 3, 0]);
        assert_eq!(stagger.item_delay_ms(2), 0.0);
        assert_eq!(stagger.item_delay_ms(0), 300.0);
    }
}
