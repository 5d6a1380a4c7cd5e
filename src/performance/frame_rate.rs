use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::performance::{PerformanceController, PerformanceMode};
use crate::scheduler::{self, FrameId};

pub const DEFAULT_WINDOW_MS: f64 = 2000.0;
/// Below this, drop to battery mode.
pub const LOW_FPS: f32 = 30.0;
/// Above this, leave battery mode.
pub const RECOVERED_FPS: f32 = 55.0;

type SampleCallback = Rc<dyn Fn(f32)>;

struct MonitorState {
    controller: PerformanceController,
    window_ms: f64,
    window_start: Option<f64>,
    frames: u32,
    frame: Option<FrameId>,
    running: bool,
    last_fps: Option<f32>,
    on_sample: Option<SampleCallback>,
}

/// Samples the display frame rate and feeds it back into the performance
/// mode.
///
/// The mode changes at most once per window; the window length is the only
/// hysteresis.
#[derive(Clone)]
pub struct FrameRateMonitor {
    state: Rc<RefCell<MonitorState>>,
}

impl FrameRateMonitor {
    pub fn start(controller: &PerformanceController, window_ms: f64) -> Self {
        let monitor = Self {
            state: Rc::new(RefCell::new(MonitorState {
                controller: controller.clone(),
                window_ms: window_ms.max(scheduler::FRAME_INTERVAL_MS),
                window_start: None,
                frames: 0,
                frame: None,
                running: true,
                last_fps: None,
                on_sample: None,
            })),
        };
        monitor.schedule();
        monitor
    }

    /// Called with the fps of every completed window.
    pub fn on_sample(&self, f: impl Fn(f32) + 'static) {
        self.state.borrow_mut().on_sample = Some(Rc::new(f));
    }

    pub fn last_fps(&self) -> Option<f32> {
        self.state.borrow().last_fps
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Stop sampling for good. Safe to call from the sample callback.
    pub fn stop(&self) {
        let (frame, callback) = {
            let mut state = self.state.borrow_mut();
            state.running = false;
            state.window_start = None;
            state.frames = 0;
            (state.frame.take(), state.on_sample.take())
        };
        drop(callback);
        if let Some(frame) = frame {
            scheduler::cancel_animation_frame(frame);
        }
    }

    fn schedule(&self) {
        let weak = Rc::downgrade(&self.state);
        let frame = scheduler::request_animation_frame(move |timestamp| on_frame(weak, timestamp));
        self.state.borrow_mut().frame = Some(frame);
    }
}

fn on_frame(weak: Weak<RefCell<MonitorState>>, timestamp: f64) {
    let Some(state) = weak.upgrade() else {
        return;
    };

    let completed = {
        let mut s = state.borrow_mut();
        s.frame = None;
        if !s.running {
            return;
        }
        match s.window_start {
            None => {
                s.window_start = Some(timestamp);
                s.frames = 0;
                None
            }
            Some(start) => {
                s.frames += 1;
                let elapsed = timestamp - start;
                if elapsed >= s.window_ms {
                    let fps = (s.frames as f64 * 1000.0 / elapsed) as f32;
                    s.window_start = Some(timestamp);
                    s.frames = 0;
                    s.last_fps = Some(fps);
                    Some((fps, s.controller.clone(), s.on_sample.clone()))
                } else {
                    None
                }
            }
        }
    };

    if let Some((fps, controller, on_sample)) = completed {
        log::trace!("frame rate {fps:.1} fps");
        adapt(&controller, fps);
        if let Some(callback) = on_sample {
            callback(fps);
        }
    }

    let resume = {
        let s = state.borrow();
        s.running && s.frame.is_none()
    };
    if resume {
        FrameRateMonitor { state }.schedule();
    }
}

fn adapt(controller: &PerformanceController, fps: f32) {
    if controller.is_pinned() {
        return;
    }
    let mode = controller.mode();
    if fps < LOW_FPS && mode != PerformanceMode::Battery {
        log::info!("frame rate dropped to {fps:.1} fps");
        controller.set_mode(PerformanceMode::Battery);
    } else if fps > RECOVERED_FPS && mode == PerformanceMode::Battery {
        log::info!("frame rate recovered to {fps:.1} fps");
        controller.set_mode(PerformanceMode::Balanced);
    }
}
