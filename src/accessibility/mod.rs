//! Motion accessibility: when to animate at all, whether an animation is
//! safe to show, and what to tell screen-reader users.

mod announcer;
mod policy;

pub use announcer::{Announcement, AnnouncementId, Announcer, AnnouncerOptions, Politeness};
pub use policy::{
    MAX_COLOR_CHANGES, MAX_FLASH_RATE, MIN_CONTRAST_RATIO, ReducedMotionPolicy, SafetyParams,
    SafetyReport, resolve_reduced_motion, validate_animation_safety,
};
