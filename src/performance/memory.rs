//! Bookkeeping for scroll-linked animations.
//!
//! Components register their scroll bindings here so that a binding whose
//! owner forgot to clean up is still released eventually: the registry is
//! capacity-bounded (least recently seen goes first) and periodically drops
//! bindings that are off-screen and have not been seen for a while.
//!
//! Every entry's cleanup runs exactly once, whichever path removes it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::platform::{ElementRef, Platform};
use crate::scheduler::{self, TimerId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollRegistryOptions {
    pub capacity: usize,
    pub purge_interval_ms: f64,
    pub stale_after_ms: f64,
}

impl Default for ScrollRegistryOptions {
    fn default() -> Self {
        Self {
            capacity: 50,
            purge_interval_ms: 10_000.0,
            stale_after_ms: 30_000.0,
        }
    }
}

struct Entry {
    element: ElementRef,
    cleanup: Option<Box<dyn FnOnce()>>,
    last_seen: f64,
}

impl Entry {
    fn release(mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

struct RegistryState {
    options: ScrollRegistryOptions,
    entries: HashMap<String, Entry>,
    purge_timer: Option<TimerId>,
}

#[derive(Clone)]
pub struct ScrollAnimationRegistry {
    state: Rc<RefCell<RegistryState>>,
    platform: Platform,
}

impl ScrollAnimationRegistry {
    /// Create the registry and start its periodic purge.
    pub fn new(platform: &Platform, options: ScrollRegistryOptions) -> Self {
        let registry = Self {
            state: Rc::new(RefCell::new(RegistryState {
                options,
                entries: HashMap::new(),
                purge_timer: None,
            })),
            platform: platform.clone(),
        };
        registry.start_purging();
        registry
    }

    pub fn options(&self) -> ScrollRegistryOptions {
        self.state.borrow().options.clone()
    }

    /// Swap limits. A lower capacity takes effect at the next registration;
    /// a new interval restarts the purge timer.
    pub fn set_options(&self, options: ScrollRegistryOptions) {
        let restart = {
            let mut state = self.state.borrow_mut();
            let restart = state.options.purge_interval_ms != options.purge_interval_ms;
            state.options = options;
            restart
        };
        if restart {
            self.stop_purging();
            self.start_purging();
        }
    }

    fn start_purging(&self) {
        let interval = self.state.borrow().options.purge_interval_ms;
        let weak: Weak<RefCell<RegistryState>> = Rc::downgrade(&self.state);
        let platform = self.platform.clone();
        let timer = scheduler::set_interval(interval, move || {
            if let Some(state) = weak.upgrade() {
                let registry = ScrollAnimationRegistry {
                    state,
                    platform: platform.clone(),
                };
                registry.purge();
            }
        });
        self.state.borrow_mut().purge_timer = Some(timer);
    }

    fn stop_purging(&self) {
        let timer = self.state.borrow_mut().purge_timer.take();
        if let Some(timer) = timer {
            scheduler::clear_timeout(timer);
        }
    }

    /// Track a binding. Re-registering an id releases the previous binding.
    pub fn register(&self, id: &str, element: &ElementRef, cleanup: impl FnOnce() + 'static) {
        let now = scheduler::now();
        let entry = Entry {
            element: element.clone(),
            cleanup: Some(Box::new(cleanup)),
            last_seen: now,
        };
        let replaced = self.state.borrow_mut().entries.insert(id.to_string(), entry);
        if let Some(previous) = replaced {
            previous.release();
        }

        let mut evicted = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            while state.entries.len() > state.options.capacity.max(1) {
                let Some(oldest) = state
                    .entries
                    .iter()
                    .filter(|(key, _)| key.as_str() != id)
                    .min_by(|a, b| a.1.last_seen.total_cmp(&b.1.last_seen))
                    .map(|(key, _)| key.clone())
                else {
                    break;
                };
                if let Some(entry) = state.entries.remove(&oldest) {
                    log::debug!("scroll registry full, evicting {oldest}");
                    evicted.push(entry);
                }
            }
        }
        for entry in evicted {
            entry.release();
        }
    }

    /// Mark a binding as seen now.
    pub fn touch(&self, id: &str) {
        let now = scheduler::now();
        if let Some(entry) = self.state.borrow_mut().entries.get_mut(id) {
            entry.last_seen = now;
        }
    }

    /// Remove and release a binding. Returns `false` for unknown ids.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.state.borrow_mut().entries.remove(id);
        match removed {
            Some(entry) => {
                entry.release();
                true
            }
            None => false,
        }
    }

    /// Release every off-screen binding not seen within the stale window.
    /// Bindings that are on screen count as seen. Returns how many went.
    pub fn purge(&self) -> usize {
        let now = scheduler::now();
        let viewport = self.platform.viewport_rect();

        let stale: Vec<Entry> = {
            let mut state = self.state.borrow_mut();
            let stale_after = state.options.stale_after_ms;
            let mut expired = Vec::new();
            for (id, entry) in state.entries.iter_mut() {
                let on_screen = entry
                    .element
                    .bounds()
                    .is_some_and(|bounds| bounds.intersection(&viewport).is_some());
                if on_screen {
                    entry.last_seen = now;
                } else if now - entry.last_seen > stale_after {
                    expired.push(id.clone());
                }
            }
            expired
                .iter()
                .filter_map(|id| state.entries.remove(id))
                .collect()
        };

        let count = stale.len();
        if count > 0 {
            log::debug!("purged {count} stale scroll animation(s)");
        }
        for entry in stale {
            entry.release();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.borrow().entries.contains_key(id)
    }

    /// Release every binding and stop the purge timer.
    pub fn shutdown(&self) {
        self.stop_purging();
        let entries = std::mem::take(&mut self.state.borrow_mut().entries);
        for entry in entries.into_values() {
            entry.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Rect;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    fn registry(capacity: usize) -> (Platform, ScrollAnimationRegistry) {
        scheduler::reset();
        let platform = Platform::default();
        platform.resize(1000.0, 800.0);
        let registry = ScrollAnimationRegistry::new(
            &platform,
            ScrollRegistryOptions {
                capacity,
                ..Default::default()
            },
        );
        (platform, registry)
    }

    #[test]
    fn test_capacity_evicts_least_recently_seen() {
        let (_platform, registry) = registry(2);
        let element = ElementRef::new();

        let (a_count, a_cleanup) = counter();
        registry.register("a", &element, a_cleanup);
        scheduler::advance_by(10.0);
        let (b_count, b_cleanup) = counter();
        registry.register("b", &element, b_cleanup);
        scheduler::advance_by(10.0);
        registry.touch("a");

        let (_c_count, c_cleanup) = counter();
        registry.register("c", &element, c_cleanup);

        assert_eq!(registry.len(), 2);
        assert!(!registry.contains("b"));
        assert_eq!(b_count.get(), 1);
        assert_eq!(a_count.get(), 0);

        registry.unregister("b");
        assert_eq!(b_count.get(), 1);
    }

    #[test]
    fn test_purge_drops_stale_off_screen_entries_once() {
        let (_platform, registry) = registry(10);
        let off_screen = ElementRef::new();
        off_screen.attach(Rect::new(0.0, 5000.0, 100.0, 100.0));
        let visible = ElementRef::new();
        visible.attach(Rect::new(0.0, 100.0, 100.0, 100.0));

        let (off_count, off_cleanup) = counter();
        registry.register("off", &off_screen, off_cleanup);
        let (on_count, on_cleanup) = counter();
        registry.register("on", &visible, on_cleanup);

        // The 10s purge runs at 10, 20 and 30s; the entry is stale only after 30s.
        scheduler::advance_by(30_000.0);
        assert!(registry.contains("off"));
        scheduler::advance_by(10_000.0);
        assert!(!registry.contains("off"));
        assert!(registry.contains("on"));
        assert_eq!(off_count.get(), 1);
        assert_eq!(on_count.get(), 0);

        registry.purge();
        assert!(!registry.unregister("off"));
        assert_eq!(off_count.get(), 1);
    }

    #[test]
    fn test_reregister_releases_previous() {
        let (_platform, registry) = registry(10);
        let element = ElementRef::new();
        let (first, first_cleanup) = counter();
        registry.register("hero", &element, first_cleanup);
        let (second, second_cleanup) = counter();
        registry.register("hero", &element, second_cleanup);
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_shutdown_releases_all_and_stops_purging() {
        let (_platform, registry) = registry(10);
        let element = ElementRef::new();
        let (count, cleanup) = counter();
        registry.register("x", &element, cleanup);
        registry.shutdown();
        assert_eq!(count.get(), 1);
        assert!(registry.is_empty());
        assert_eq!(scheduler::pending_timers(), 0);
    }
}
