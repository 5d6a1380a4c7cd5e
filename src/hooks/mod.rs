//! Hooks consumed by view components.
//!
//! Every hook reads the nearest [`MotionContext`](crate::provider::MotionContext),
//! registers its teardown with the current scope and also exposes
//! `dispose()` for callers that manage lifetimes themselves.

mod gesture;
mod in_view;
mod motion;
mod props;
mod scroll;
mod stagger;
mod text_reveal;

pub use gesture::{
    DragAxis, DragConstraints, Gesture, GestureOptions, SwipeDirection, apply_constraint,
    classify_swipe, use_gesture,
};
pub use in_view::{InView, intersection_ratio, use_in_view};
pub use motion::{Motion, MotionOptions, MotionState, next_state, use_motion};
pub use props::{
    AnimationProps, EventHandlers, EventResponse, InteractionChannels, InteractionEvent, Key,
    Variant,
};
pub use scroll::{
    DEFAULT_IDLE_MS, Parallax, ParallaxOptions, ScrollDirection, ScrollOptions, ScrollProgress,
    ScrollRange, scroll_progress, use_parallax, use_scroll_progress,
};
pub use stagger::{
    DEFAULT_STAGGER_PRESET, SETTLE_MS, Stagger, StaggerDelay, StaggerDirection, StaggerOptions,
    calculate_animation_order, use_stagger_animation,
};
pub use text_reveal::{
    DEFAULT_TEXT_PRESET, SplitBy, TextReveal, TextRevealOptions, split_text, use_text_reveal,
};
