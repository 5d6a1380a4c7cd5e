//! The motion event loop.
//!
//! Everything in this crate that "waits" does so by scheduling a callback
//! here: stagger delays, announcer clears, idle timeouts, spring frames and
//! the frame-rate sampler. Nothing ever blocks.
//!
//! The loop is thread-local and owns a virtual clock in milliseconds. A host
//! drives it in one of two ways:
//!
//! - [`tick`] with the real frame timestamp once per display frame, which
//!   runs every due timer and then flushes animation-frame callbacks;
//! - [`advance_by`] / [`advance_to`] to simulate time, where animation
//!   frames fire on a 60Hz grid. Tests use this exclusively.
//!
//! Timers that fall due at the same instant run in the order they were
//! scheduled, which is what keeps stagger callbacks strictly ordered.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Interval between simulated display frames.
pub const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Shortest period accepted by [`set_interval`].
const MIN_INTERVAL_MS: f64 = 1.0;

pub type TimerId = u64;
pub type FrameId = u64;

/// Ordering key for timers: due time in microseconds, then scheduling order.
type TimerKey = (u64, u64);

enum Task {
    Once(Box<dyn FnOnce()>),
    Repeat {
        period_ms: f64,
        callback: Box<dyn FnMut()>,
    },
}

#[derive(Default)]
struct EventLoop {
    now: f64,
    next_seq: u64,
    next_id: u64,
    timers: BTreeMap<TimerKey, (TimerId, Task)>,
    /// `None` while a repeating timer is running its callback.
    index: HashMap<TimerId, Option<TimerKey>>,
    frames: Vec<(FrameId, Box<dyn FnOnce(f64)>)>,
    cancelled_in_flight: HashSet<FrameId>,
}

impl EventLoop {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_timer(&mut self, id: TimerId, due_ms: f64, task: Task) {
        let key = (to_micros(due_ms), self.next_seq);
        self.next_seq += 1;
        self.timers.insert(key, (id, task));
        self.index.insert(id, Some(key));
    }

    fn next_timer_due(&self) -> Option<f64> {
        self.timers
            .keys()
            .next()
            .map(|(micros, _)| *micros as f64 / 1000.0)
    }
}

thread_local! {
    static EVENT_LOOP: RefCell<EventLoop> = RefCell::new(EventLoop::default());
}

fn with_loop<F, R>(f: F) -> R
where
    F: FnOnce(&mut EventLoop) -> R,
{
    EVENT_LOOP.with(|l| f(&mut l.borrow_mut()))
}

fn to_micros(ms: f64) -> u64 {
    (ms.max(0.0) * 1000.0).round() as u64
}

/// Current loop time in milliseconds.
pub fn now() -> f64 {
    with_loop(|l| l.now)
}

/// Run `f` once after `delay_ms` (negative delays are treated as zero).
pub fn set_timeout(delay_ms: f64, f: impl FnOnce() + 'static) -> TimerId {
    with_loop(|l| {
        let id = l.allocate_id();
        let due = l.now + delay_ms.max(0.0);
        l.insert_timer(id, due, Task::Once(Box::new(f)));
        id
    })
}

/// Run `f` every `period_ms` until cleared with [`clear_timeout`].
pub fn set_interval(period_ms: f64, f: impl FnMut() + 'static) -> TimerId {
    let period_ms = period_ms.max(MIN_INTERVAL_MS);
    with_loop(|l| {
        let id = l.allocate_id();
        let due = l.now + period_ms;
        l.insert_timer(
            id,
            due,
            Task::Repeat {
                period_ms,
                callback: Box::new(f),
            },
        );
        id
    })
}

/// Cancel a timeout or interval. Unknown or already-fired ids are ignored.
pub fn clear_timeout(id: TimerId) {
    let removed = with_loop(|l| match l.index.remove(&id) {
        Some(Some(key)) => l.timers.remove(&key),
        _ => None,
    });
    // Dropped outside the borrow: captured state may schedule on drop.
    drop(removed);
}

/// Schedule `f` for the next display frame. It receives the frame timestamp.
pub fn request_animation_frame(f: impl FnOnce(f64) + 'static) -> FrameId {
    with_loop(|l| {
        let id = l.allocate_id();
        l.frames.push((id, Box::new(f)));
        id
    })
}

pub fn cancel_animation_frame(id: FrameId) {
    let removed = with_loop(|l| {
        if let Some(pos) = l.frames.iter().position(|(fid, _)| *fid == id) {
            Some(l.frames.remove(pos))
        } else {
            l.cancelled_in_flight.insert(id);
            None
        }
    });
    drop(removed);
}

/// Number of timers and intervals still scheduled.
pub fn pending_timers() -> usize {
    with_loop(|l| l.index.len())
}

/// Number of animation-frame callbacks waiting for the next frame.
pub fn pending_frames() -> usize {
    with_loop(|l| l.frames.len())
}

/// Drop every scheduled callback and rewind the clock to zero.
pub fn reset() {
    let old = with_loop(std::mem::take);
    drop(old);
}

/// Host entry point: advance to the real frame time `now_ms`, run due timers,
/// then flush animation frames once.
pub fn tick(now_ms: f64) {
    while let Some(due) = with_loop(|l| l.next_timer_due()) {
        if due > now_ms {
            break;
        }
        fire_next_timer();
    }
    with_loop(|l| l.now = l.now.max(now_ms));
    flush_frames(now_ms);
}

/// Simulate `ms` milliseconds of wall-clock time.
pub fn advance_by(ms: f64) {
    advance_to(now() + ms.max(0.0));
}

/// Simulate time up to `target_ms`, interleaving timers and 60Hz frames.
pub fn advance_to(target_ms: f64) {
    enum Step {
        Timer,
        Frame(f64),
        Done,
    }

    loop {
        let step = with_loop(|l| {
            let next_timer = l.next_timer_due();
            let vsync = (!l.frames.is_empty()).then(|| next_vsync_after(l.now));
            match (next_timer, vsync) {
                (Some(t), Some(v)) if t <= v && t <= target_ms => Step::Timer,
                (Some(t), None) if t <= target_ms => Step::Timer,
                (_, Some(v)) if v <= target_ms => Step::Frame(v),
                _ => Step::Done,
            }
        });

        match step {
            Step::Timer => fire_next_timer(),
            Step::Frame(at) => {
                with_loop(|l| l.now = at);
                flush_frames(at);
            }
            Step::Done => break,
        }
    }

    with_loop(|l| l.now = l.now.max(target_ms));
}

fn next_vsync_after(now: f64) -> f64 {
    ((now / FRAME_INTERVAL_MS + 1e-9).floor() + 1.0) * FRAME_INTERVAL_MS
}

fn fire_next_timer() {
    let entry = with_loop(|l| {
        let (key, (id, task)) = l.timers.pop_first()?;
        l.now = l.now.max(key.0 as f64 / 1000.0);
        match &task {
            Task::Once(_) => {
                l.index.remove(&id);
            }
            Task::Repeat { .. } => {
                l.index.insert(id, None);
            }
        }
        Some((id, task))
    });

    let Some((id, task)) = entry else {
        return;
    };

    match task {
        Task::Once(callback) => callback(),
        Task::Repeat {
            period_ms,
            mut callback,
        } => {
            callback();
            with_loop(|l| {
                // Still `Some(None)` unless the callback cleared itself.
                if matches!(l.index.get(&id), Some(None)) {
                    let due = l.now + period_ms;
                    l.insert_timer(
                        id,
                        due,
                        Task::Repeat {
                            period_ms,
                            callback,
                        },
                    );
                }
            });
        }
    }
}

fn flush_frames(timestamp: f64) {
    let frames = with_loop(|l| {
        l.cancelled_in_flight.clear();
        std::mem::take(&mut l.frames)
    });
    if frames.is_empty() {
        return;
    }
    log::trace!("flushing {} animation frame(s) at {timestamp:.2}ms", frames.len());

    for (id, callback) in frames {
        let cancelled = with_loop(|l| l.cancelled_in_flight.contains(&id));
        if !cancelled {
            callback(timestamp);
        }
    }
    with_loop(|l| l.cancelled_in_flight.clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_timeouts_fire_in_due_order() {
        reset();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = log.clone();
        set_timeout(200.0, move || l1.borrow_mut().push("late"));
        let l2 = log.clone();
        set_timeout(100.0, move || l2.borrow_mut().push("early"));

        advance_by(150.0);
        assert_eq!(*log.borrow(), vec!["early"]);
        advance_by(100.0);
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(pending_timers(), 0);
    }

    #[test]
    fn test_same_instant_runs_in_scheduling_order() {
        reset();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..5 {
            let log = log.clone();
            set_timeout(50.0, move || log.borrow_mut().push(i));
        }
        advance_by(50.0);
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_timeout() {
        reset();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let id = set_timeout(10.0, move || f.set(true));
        clear_timeout(id);
        advance_by(100.0);
        assert!(!fired.get());
    }

    #[test]
    fn test_interval_repeats_until_cleared() {
        reset();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = set_interval(100.0, move || c.set(c.get() + 1));

        advance_by(350.0);
        assert_eq!(count.get(), 3);

        clear_timeout(id);
        advance_by(500.0);
        assert_eq!(count.get(), 3);
        assert_eq!(pending_timers(), 0);
    }

    #[test]
    fn test_interval_can_clear_itself() {
        reset();
        let count = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(0));
        let c = count.clone();
        let own = own_id.clone();
        let id = set_interval(10.0, move || {
            c.set(c.get() + 1);
            if c.get() == 2 {
                clear_timeout(own.get());
            }
        });
        own_id.set(id);
        advance_by(100.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_frames_fire_on_vsync_grid() {
        reset();
        let stamps = Rc::new(RefCell::new(Vec::new()));
        let s = stamps.clone();
        request_animation_frame(move |t| s.borrow_mut().push(t));

        advance_by(5.0);
        assert!(stamps.borrow().is_empty());
        advance_by(20.0);
        assert_eq!(stamps.borrow().len(), 1);
        assert!((stamps.borrow()[0] - FRAME_INTERVAL_MS).abs() < 1e-6);
        assert_eq!(pending_frames(), 0);
    }

    #[test]
    fn test_cancel_animation_frame() {
        reset();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let id = request_animation_frame(move |_| f.set(true));
        cancel_animation_frame(id);
        advance_by(50.0);
        assert!(!fired.get());
    }

    #[test]
    fn test_tick_runs_timers_then_frames() {
        reset();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = log.clone();
        request_animation_frame(move |_| l1.borrow_mut().push("frame"));
        let l2 = log.clone();
        set_timeout(5.0, move || l2.borrow_mut().push("timer"));

        tick(16.0);
        assert_eq!(*log.borrow(), vec!["timer", "frame"]);
        assert_eq!(now(), 16.0);
    }
}
