use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::scheduler::{self, FrameId};
use crate::value::MotionValue;

/// Fixed integration step. Real frame intervals are ignored so a spring
/// traces the same path on every device.
pub const SPRING_TIMESTEP: f32 = 1.0 / 60.0;

/// Distance and speed below which a spring counts as settled.
pub const REST_EPSILON: f32 = 0.01;

/// Physical parameters of a spring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub const DEFAULT: Self = Self {
        stiffness: 100.0,
        damping: 10.0,
        mass: 1.0,
    };

    /// Quick, barely overshooting response for press feedback.
    pub const SNAPPY: Self = Self {
        stiffness: 400.0,
        damping: 30.0,
        mass: 1.0,
    };

    /// Slow drift used for parallax smoothing.
    pub const GENTLE: Self = Self {
        stiffness: 120.0,
        damping: 20.0,
        mass: 1.0,
    };

    pub const BOUNCY: Self = Self {
        stiffness: 300.0,
        damping: 10.0,
        mass: 1.0,
    };
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One spring's integration state.
#[derive(Clone, Debug, PartialEq)]
pub struct SpringState {
    pub value: f32,
    pub target: f32,
    pub velocity: f32,
    config: SpringConfig,
}

impl SpringState {
    pub fn new(value: f32, target: f32, config: SpringConfig) -> Self {
        Self {
            value,
            target,
            velocity: 0.0,
            config,
        }
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Advance one fixed step with semi-implicit Euler.
    ///
    /// Returns `true` once the spring has come to rest; at that point
    /// `value` has been snapped exactly onto `target`.
    pub fn step(&mut self) -> bool {
        if self.is_settled() {
            self.snap();
            return true;
        }

        let displacement = self.value - self.target;
        let spring_force = -self.config.stiffness * displacement;
        let damping_force = -self.config.damping * self.velocity;
        let acceleration = (spring_force + damping_force) / self.config.mass.max(f32::EPSILON);

        self.velocity += acceleration * SPRING_TIMESTEP;
        self.value += self.velocity * SPRING_TIMESTEP;

        if self.is_settled() {
            self.snap();
            return true;
        }
        false
    }

    pub fn is_settled(&self) -> bool {
        self.velocity.abs() < REST_EPSILON && (self.target - self.value).abs() < REST_EPSILON
    }

    fn snap(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
    }
}

struct SpringDriver {
    state: SpringState,
    output: MotionValue<f32>,
    frame: Option<FrameId>,
}

/// Handle to a spring driving a [`MotionValue`] frame by frame.
///
/// The driver schedules one animation frame at a time and stops scheduling
/// as soon as the spring settles.
#[derive(Clone)]
pub struct SpringHandle {
    driver: Rc<RefCell<SpringDriver>>,
}

/// Spring `value` from its current position to `target`.
pub fn animate_spring(value: &MotionValue<f32>, target: f32, config: SpringConfig) -> SpringHandle {
    let state = SpringState::new(value.get(), target, config);
    let handle = SpringHandle {
        driver: Rc::new(RefCell::new(SpringDriver {
            state,
            output: value.clone(),
            frame: None,
        })),
    };
    handle.schedule();
    handle
}

impl SpringHandle {
    pub fn is_animating(&self) -> bool {
        self.driver.borrow().frame.is_some()
    }

    pub fn state(&self) -> SpringState {
        self.driver.borrow().state.clone()
    }

    /// Retarget, keeping the current velocity.
    pub fn set_target(&self, target: f32) {
        self.driver.borrow_mut().state.target = target;
        if !self.is_animating() {
            self.schedule();
        }
    }

    /// Freeze the spring where it is.
    pub fn stop(&self) {
        if let Some(frame) = self.driver.borrow_mut().frame.take() {
            scheduler::cancel_animation_frame(frame);
        }
    }

    fn schedule(&self) {
        let weak = Rc::downgrade(&self.driver);
        let frame = scheduler::request_animation_frame(move |_| on_frame(weak));
        self.driver.borrow_mut().frame = Some(frame);
    }
}

fn on_frame(weak: Weak<RefCell<SpringDriver>>) {
    let Some(driver) = weak.upgrade() else {
        return;
    };
    let (value, output, done) = {
        let mut d = driver.borrow_mut();
        d.frame = None;
        let done = d.state.step();
        (d.state.value, d.output.clone(), done)
    };

    output.set(value);

    if !done {
        let handle = SpringHandle { driver };
        if !handle.is_animating() {
            handle.schedule();
        }
    } else {
        log::trace!("spring settled at {value}");
    }
}

/// Keeps a value chasing its latest target through one spring.
///
/// Retargeting a moving spring keeps its velocity, so rapid changes (hover
/// in and out, scroll jitter) blend instead of restarting.
#[derive(Clone)]
pub struct SpringDrive {
    output: MotionValue<f32>,
    config: SpringConfig,
    handle: Rc<RefCell<Option<SpringHandle>>>,
}

impl SpringDrive {
    pub fn new(value: f32, config: SpringConfig) -> Self {
        Self {
            output: MotionValue::new(value),
            config,
            handle: Rc::new(RefCell::new(None)),
        }
    }

    /// The sprung value.
    pub fn output(&self) -> MotionValue<f32> {
        self.output.clone()
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn is_animating(&self) -> bool {
        self.handle
            .borrow()
            .as_ref()
            .is_some_and(SpringHandle::is_animating)
    }

    pub fn set_target(&self, target: f32) {
        let existing = self.handle.borrow().clone();
        match existing {
            Some(handle) => handle.set_target(target),
            None if self.output.get() == target => {}
            None => {
                let handle = animate_spring(&self.output, target, self.config);
                *self.handle.borrow_mut() = Some(handle);
            }
        }
    }

    /// Skip the motion and sit at `value`.
    pub fn jump(&self, value: f32) {
        self.stop();
        self.output.set(value);
    }

    pub fn stop(&self) {
        if let Some(handle) = self.handle.borrow_mut().take() {
            handle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::motion_value;

    #[test]
    fn test_state_converges_and_snaps() {
        let mut spring = SpringState::new(0.0, 100.0, SpringConfig::DEFAULT);
        let mut steps = 0;
        while !spring.step() {
            steps += 1;
            assert!(steps < 10_000, "spring never settled");
        }
        assert_eq!(spring.value, 100.0);
        assert_eq!(spring.velocity, 0.0);
    }

    #[test]
    fn test_bouncy_spring_overshoots() {
        let mut spring = SpringState::new(0.0, 1.0, SpringConfig::BOUNCY);
        let mut peak = 0.0_f32;
        for _ in 0..120 {
            spring.step();
            peak = peak.max(spring.value);
        }
        assert!(peak > 1.0, "peak was {peak}");
    }

    #[test]
    fn test_driver_settles_and_stops_scheduling() {
        scheduler::reset();
        let x = motion_value(0.0_f32);
        let handle = animate_spring(&x, 100.0, SpringConfig::DEFAULT);
        assert!(handle.is_animating());

        scheduler::advance_by(100.0);
        let mid = x.get();
        assert!(mid > 0.0 && mid < 100.0, "mid-flight value {mid}");

        scheduler::advance_by(10_000.0);
        assert_eq!(x.get(), 100.0);
        assert!(!handle.is_animating());
        assert_eq!(scheduler::pending_frames(), 0);
    }

    #[test]
    fn test_stop_freezes_value() {
        scheduler::reset();
        let x = motion_value(0.0_f32);
        let handle = animate_spring(&x, 50.0, SpringConfig::SNAPPY);
        scheduler::advance_by(50.0);
        handle.stop();
        let frozen = x.get();
        scheduler::advance_by(1_000.0);
        assert_eq!(x.get(), frozen);
        assert_eq!(scheduler::pending_frames(), 0);
    }

    #[test]
    fn test_retarget_after_settle() {
        scheduler::reset();
        let x = motion_value(0.0_f32);
        let handle = animate_spring(&x, 10.0, SpringConfig::SNAPPY);
        scheduler::advance_by(5_000.0);
        assert_eq!(x.get(), 10.0);

        handle.set_target(-10.0);
        scheduler::advance_by(5_000.0);
        assert_eq!(x.get(), -10.0);
    }

    #[test]
    fn test_drive_retargets_mid_flight() {
        scheduler::reset();
        let drive = SpringDrive::new(0.0, SpringConfig::GENTLE);
        drive.set_target(1.0);
        scheduler::advance_by(100.0);
        let mid = drive.output().get();
        assert!(mid > 0.0 && mid < 1.0, "mid-flight value {mid}");

        drive.set_target(0.0);
        assert!(drive.is_animating());
        scheduler::advance_by(10_000.0);
        assert_eq!(drive.output().get(), 0.0);
        assert!(!drive.is_animating());

        drive.jump(0.5);
        assert_eq!(drive.output().get(), 0.5);
        assert_eq!(scheduler::pending_frames(), 0);
    }
}
