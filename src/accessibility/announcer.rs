//! Screen-reader announcements through ARIA live regions.
//!
//! There is one surface per politeness level. A message is written to its
//! surface after a short delay (so the region is attached before it changes)
//! and blanked again a second later, unless something newer has replaced it
//! in the meantime.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::scheduler::{self, TimerId};
use crate::value::MotionValue;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Politeness {
    /// Read when the user is idle.
    #[default]
    Polite,
    /// Interrupts whatever is being read.
    Assertive,
}

impl Politeness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Politeness::Polite => "polite",
            Politeness::Assertive => "assertive",
        }
    }
}

impl fmt::Display for Politeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type AnnouncementId = u64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub message: String,
    pub priority: Politeness,
    /// Loop time (ms) when the announcement was made.
    pub timestamp: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnouncerOptions {
    pub max_announcements: usize,
    pub default_delay_ms: f64,
    pub clear_delay_ms: f64,
}

impl Default for AnnouncerOptions {
    fn default() -> Self {
        Self {
            max_announcements: 10,
            default_delay_ms: 100.0,
            clear_delay_ms: 1000.0,
        }
    }
}

type Filter = Rc<dyn Fn(&str) -> bool>;

struct Entry {
    announcement: Announcement,
    written: bool,
    timer: Option<TimerId>,
}

struct AnnouncerInner {
    options: RefCell<AnnouncerOptions>,
    store: RefCell<BTreeMap<AnnouncementId, Entry>>,
    polite: MotionValue<String>,
    assertive: MotionValue<String>,
    filter: RefCell<Option<Filter>>,
    next_id: Cell<AnnouncementId>,
}

impl AnnouncerInner {
    fn surface(&self, priority: Politeness) -> &MotionValue<String> {
        match priority {
            Politeness::Polite => &self.polite,
            Politeness::Assertive => &self.assertive,
        }
    }

    /// Cancel a removed entry's timer and take its text off the region if
    /// nothing newer replaced it.
    fn retract(&self, entry: Entry) {
        if let Some(timer) = entry.timer {
            scheduler::clear_timeout(timer);
        }
        let surface = self.surface(entry.announcement.priority);
        if entry.written && surface.with(|text| *text == entry.announcement.message) {
            surface.set(String::new());
        }
    }

    fn evict_overflow(&self) {
        let max = self.options.borrow().max_announcements.max(1);
        let mut evicted = Vec::new();
        let mut store = self.store.borrow_mut();
        while store.len() > max {
            let oldest = store
                .values()
                .min_by(|a, b| {
                    a.announcement
                        .timestamp
                        .total_cmp(&b.announcement.timestamp)
                        .then(a.announcement.id.cmp(&b.announcement.id))
                })
                .map(|entry| entry.announcement.id);
            let Some(id) = oldest else {
                break;
            };
            if let Some(entry) = store.remove(&id) {
                evicted.push(entry);
            }
            log::trace!("announcer evicted #{id}");
        }
        drop(store);
        for entry in evicted {
            self.retract(entry);
        }
    }
}

/// Process-wide announcement queue. Clone the handle to share it.
#[derive(Clone)]
pub struct Announcer {
    inner: Rc<AnnouncerInner>,
}

impl Announcer {
    pub fn new(options: AnnouncerOptions) -> Self {
        Self {
            inner: Rc::new(AnnouncerInner {
                options: RefCell::new(options),
                store: RefCell::new(BTreeMap::new()),
                polite: MotionValue::new(String::new()),
                assertive: MotionValue::new(String::new()),
                filter: RefCell::new(None),
                next_id: Cell::new(1),
            }),
        }
    }

    /// The live-region text for `priority`. Bind it to the region element.
    pub fn live_region(&self, priority: Politeness) -> MotionValue<String> {
        self.inner.surface(priority).clone()
    }

    pub fn options(&self) -> AnnouncerOptions {
        self.inner.options.borrow().clone()
    }

    pub fn set_options(&self, options: AnnouncerOptions) {
        *self.inner.options.borrow_mut() = options;
        self.inner.evict_overflow();
    }

    /// Veto messages before they are stored. Return `false` to drop one.
    pub fn set_filter(&self, filter: impl Fn(&str) -> bool + 'static) {
        *self.inner.filter.borrow_mut() = Some(Rc::new(filter));
    }

    pub fn clear_filter(&self) {
        self.inner.filter.borrow_mut().take();
    }

    pub fn announce(&self, message: &str, priority: Politeness) -> Option<AnnouncementId> {
        let delay = self.inner.options.borrow().default_delay_ms;
        self.announce_with_delay(message, priority, delay)
    }

    /// Queue `message`. Returns `None` when it was empty or filtered out.
    ///
    /// An identical message with the same priority that has not been
    /// written yet is reused instead of queued twice.
    pub fn announce_with_delay(
        &self,
        message: &str,
        priority: Politeness,
        delay_ms: f64,
    ) -> Option<AnnouncementId> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }
        let filter = self.inner.filter.borrow().clone();
        if let Some(filter) = filter
            && !filter(message)
        {
            log::debug!("announcement filtered: {message:?}");
            return None;
        }

        let duplicate = self.inner.store.borrow().values().find_map(|entry| {
            (!entry.written
                && entry.announcement.priority == priority
                && entry.announcement.message == message)
                .then_some(entry.announcement.id)
        });
        if duplicate.is_some() {
            return duplicate;
        }

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let announcement = Announcement {
            id,
            message: message.to_string(),
            priority,
            timestamp: scheduler::now(),
        };

        let weak = Rc::downgrade(&self.inner);
        let timer = scheduler::set_timeout(delay_ms, move || write_announcement(weak, id));

        self.inner.store.borrow_mut().insert(
            id,
            Entry {
                announcement,
                written: false,
                timer: Some(timer),
            },
        );
        self.inner.evict_overflow();
        log::debug!("announce #{id} ({priority}): {message}");
        Some(id)
    }

    /// Cancel or retract one announcement.
    pub fn clear_announcement(&self, id: AnnouncementId) {
        let removed = self.inner.store.borrow_mut().remove(&id);
        if let Some(entry) = removed {
            self.inner.retract(entry);
        }
    }

    pub fn clear_all(&self) {
        let store = std::mem::take(&mut *self.inner.store.borrow_mut());
        for entry in store.into_values() {
            if let Some(timer) = entry.timer {
                scheduler::clear_timeout(timer);
            }
        }
        self.inner.polite.set(String::new());
        self.inner.assertive.set(String::new());
    }

    /// Stored announcements, oldest first.
    pub fn announcements(&self) -> Vec<Announcement> {
        let mut list: Vec<_> = self
            .inner
            .store
            .borrow()
            .values()
            .map(|entry| entry.announcement.clone())
            .collect();
        list.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        list
    }

    pub fn len(&self) -> usize {
        self.inner.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn announce_page_change(&self, page_name: &str) -> Option<AnnouncementId> {
        self.announce(&format!("Navigated to {page_name}"), Politeness::Polite)
    }

    /// Failures interrupt; successes wait their turn.
    pub fn announce_form_result(&self, success: bool, message: &str) -> Option<AnnouncementId> {
        if success {
            self.announce(&format!("Success: {message}"), Politeness::Polite)
        } else {
            self.announce(&format!("Error: {message}"), Politeness::Assertive)
        }
    }

    pub fn announce_loading(&self, is_loading: bool, context: &str) -> Option<AnnouncementId> {
        let message = if is_loading {
            format!("Loading {context}")
        } else {
            format!("{context} loaded")
        };
        self.announce(&message, Politeness::Polite)
    }
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new(AnnouncerOptions::default())
    }
}

fn write_announcement(weak: Weak<AnnouncerInner>, id: AnnouncementId) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let (message, priority) = {
        let mut store = inner.store.borrow_mut();
        let Some(entry) = store.get_mut(&id) else {
            return;
        };
        entry.written = true;
        entry.timer = None;
        (
            entry.announcement.message.clone(),
            entry.announcement.priority,
        )
    };

    let surface = inner.surface(priority);
    // Re-announcing the same text needs a change for assistive tech to notice.
    if surface.with(|text| *text == message) {
        surface.set(String::new());
    }
    surface.set(message);

    let clear_delay = inner.options.borrow().clear_delay_ms;
    let weak = Rc::downgrade(&inner);
    let timer = scheduler::set_timeout(clear_delay, move || clear_written(weak, id));
    if let Some(entry) = inner.store.borrow_mut().get_mut(&id) {
        entry.timer = Some(timer);
    }
}

fn clear_written(weak: Weak<AnnouncerInner>, id: AnnouncementId) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let Some(entry) = inner.store.borrow_mut().remove(&id) else {
        return;
    };
    let surface = inner.surface(entry.announcement.priority);
    if surface.with(|text| *text == entry.announcement.message) {
        surface.set(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Announcer {
        scheduler::reset();
        Announcer::default()
    }

    #[test]
    fn test_message_written_after_delay_then_cleared() {
        let announcer = setup();
        let region = announcer.live_region(Politeness::Polite);
        announcer.announce("Form sent", Politeness::Polite);

        scheduler::advance_by(99.0);
        assert_eq!(region.get(), "");
        scheduler::advance_by(1.0);
        assert_eq!(region.get(), "Form sent");
        scheduler::advance_by(1000.0);
        assert_eq!(region.get(), "");
        assert!(announcer.is_empty());
    }

    #[test]
    fn test_newer_message_not_clobbered() {
        let announcer = setup();
        let region = announcer.live_region(Politeness::Polite);
        announcer.announce("first", Politeness::Polite);
        scheduler::advance_by(600.0);
        announcer.announce("second", Politeness::Polite);
        scheduler::advance_by(100.0);
        assert_eq!(region.get(), "second");

        // "first" clears at 1100ms but the region has moved on.
        scheduler::advance_by(450.0);
        assert_eq!(region.get(), "second");
        scheduler::advance_by(1000.0);
        assert_eq!(region.get(), "");
    }

    #[test]
    fn test_priorities_use_separate_regions() {
        let announcer = setup();
        announcer.announce_form_result(false, "email is required");
        scheduler::advance_by(100.0);
        assert_eq!(
            announcer.live_region(Politeness::Assertive).get(),
            "Error: email is required"
        );
        assert_eq!(announcer.live_region(Politeness::Polite).get(), "");
    }

    #[test]
    fn test_store_is_bounded() {
        let announcer = setup();
        announcer.set_options(AnnouncerOptions {
            max_announcements: 3,
            ..Default::default()
        });
        for i in 0..4 {
            announcer.announce(&format!("message {i}"), Politeness::Polite);
            scheduler::advance_by(1.0);
        }
        let kept: Vec<_> = announcer
            .announcements()
            .into_iter()
            .map(|a| a.message)
            .collect();
        assert_eq!(kept, vec!["message 1", "message 2", "message 3"]);
    }

    #[test]
    fn test_evicted_written_message_leaves_region() {
        let announcer = setup();
        announcer.set_options(AnnouncerOptions {
            max_announcements: 1,
            ..Default::default()
        });
        let polite = announcer.live_region(Politeness::Polite);
        announcer.announce("A", Politeness::Polite);
        scheduler::advance_by(100.0);
        assert_eq!(polite.get(), "A");

        announcer.announce("B", Politeness::Assertive);
        assert_eq!(polite.get(), "");
        scheduler::advance_by(5000.0);
        assert_eq!(polite.get(), "");
        assert!(announcer.is_empty());
        assert_eq!(scheduler::pending_timers(), 0);
    }

    #[test]
    fn test_filter_vetoes() {
        let announcer = setup();
        announcer.set_filter(|message| !message.contains("debug"));
        assert_eq!(announcer.announce("debug noise", Politeness::Polite), None);
        assert!(announcer.announce("hello", Politeness::Polite).is_some());
        assert_eq!(announcer.len(), 1);
    }

    #[test]
    fn test_pending_duplicate_reused() {
        let announcer = setup();
        let a = announcer.announce_loading(true, "projects");
        let b = announcer.announce_loading(true, "projects");
        assert_eq!(a, b);
        assert_eq!(announcer.len(), 1);
        let c = announcer.announce("Loading projects", Politeness::Assertive);
        assert_ne!(a, c);
    }

    #[test]
    fn test_clear_announcement_cancels_write() {
        let announcer = setup();
        let id = announcer.announce_page_change("Portfolio").unwrap();
        announcer.clear_announcement(id);
        scheduler::advance_by(2000.0);
        assert_eq!(announcer.live_region(Politeness::Polite).get(), "");
        assert_eq!(scheduler::pending_timers(), 0);
    }

    #[test]
    fn test_empty_message_ignored() {
        let announcer = setup();
        assert_eq!(announcer.announce("   ", Politeness::Polite), None);
    }
}
