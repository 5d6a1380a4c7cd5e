//! Motion orchestration for the Atelier site.
//!
//! The crate sits between view components and whatever actually renders
//! styles. It decides *whether* something animates (reduced motion,
//! performance mode), *when* (triggers, stagger timing, scroll progress)
//! and *how* (presets, easing, springs), and hands the view layer plain
//! style props and event handlers.
//!
//! Everything runs on one thread against a host-driven event loop
//! ([`scheduler`]). A typical page mounts a [`MotionProvider`] once and
//! calls hooks below it:
//!
//! ```ignore
//! use atelier_motion::prelude::*;
//!
//! let platform = Platform::default();
//! let (card, _scope) = with_scope(|| {
//!     MotionProvider::new(&platform).mount();
//!     use_motion(MotionOptions::preset("hoverLift"))
//! });
//! card.event_handlers()
//!     .dispatch(&InteractionEvent::PointerEnter { x: 0.0, y: 0.0 });
//! assert!(card.is_active());
//! ```

// Lets the derive macro's `::atelier_motion::...` paths resolve inside
// this crate too.
extern crate self as atelier_motion;

pub mod accessibility;
pub mod animation;
pub mod config;
pub mod error;
pub mod hooks;
pub mod performance;
pub mod platform;
pub mod provider;
pub mod scheduler;
pub mod value;

pub use atelier_motion_macros::MotionFields;
pub use error::{MotionError, Result};
pub use provider::{MotionConfig, MotionContext, MotionProvider, use_motion_context};

pub mod prelude {
    pub use crate::MotionFields;
    pub use crate::accessibility::{Announcer, Politeness, validate_animation_safety};
    pub use crate::animation::{
        Animatable, Easing, SpringConfig, Style, Transition, animate_spring, use_transform,
    };
    pub use crate::config::{AnimationConfig, ConfigOverride, Trigger, ViewportOptions};
    pub use crate::hooks::{
        AnimationProps, EventHandlers, EventResponse, GestureOptions, InteractionEvent, Key,
        MotionOptions, ParallaxOptions, ScrollOptions, ScrollRange, SplitBy, StaggerDirection,
        StaggerOptions, TextRevealOptions, Variant, use_gesture, use_in_view, use_motion,
        use_parallax, use_scroll_progress, use_stagger_animation, use_text_reveal,
    };
    pub use crate::performance::PerformanceMode;
    pub use crate::platform::{ElementRef, Platform, Rect};
    pub use crate::provider::{MotionConfig, MotionContext, MotionProvider, use_motion_context};
    pub use crate::value::{MotionValue, dispose_scope, on_cleanup, with_scope};
}
