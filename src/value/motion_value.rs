use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

pub type SubscriberId = u64;

type Subscriber<T> = Rc<dyn Fn(&T)>;

struct MotionValueInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(SubscriberId, Subscriber<T>)>>,
    next_subscriber: Cell<SubscriberId>,
    /// Listeners this cell installed on the values it derives from.
    upstream: RefCell<Vec<Subscription>>,
}

impl<T> MotionValueInner<T> {
    fn remove_subscriber(&self, id: SubscriberId) {
        // Release the borrow before dropping: a listener may own other cells.
        let removed = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers
                .iter()
                .position(|(sid, _)| *sid == id)
                .map(|index| subscribers.remove(index))
        };
        drop(removed);
    }
}

impl<T> Drop for MotionValueInner<T> {
    fn drop(&mut self) {
        for subscription in self.upstream.get_mut().drain(..) {
            subscription.unsubscribe();
        }
    }
}

/// An observable cell holding an animated quantity.
///
/// Every derived value in the crate (spring output, scroll progress,
/// parallax style, live-region text) is a `MotionValue`. Subscribers run
/// synchronously inside [`set`](MotionValue::set), in registration order,
/// and only when the new value differs from the current one.
///
/// Handles are cheap to clone and share the same cell. The value is owned
/// by the hook that created it; hooks call [`clear_subscribers`] on
/// teardown.
///
/// [`clear_subscribers`]: MotionValue::clear_subscribers
pub struct MotionValue<T> {
    inner: Rc<MotionValueInner<T>>,
}

impl<T> Clone for MotionValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> MotionValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(MotionValueInner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_subscriber: Cell::new(0),
                upstream: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Borrow the current value without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.value.borrow())
    }

    /// Register a change listener. Returns a handle that removes it again.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription
    where
        T: 'static,
    {
        let id = self.inner.next_subscriber.get();
        self.inner.next_subscriber.set(id + 1);
        self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));

        let weak: Weak<MotionValueInner<T>> = Rc::downgrade(&self.inner);
        Subscription {
            id,
            remove: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.remove_subscriber(id);
                }
            })),
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.inner.remove_subscriber(id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Drop every listener. Called when the owning hook is torn down.
    pub fn clear_subscribers(&self) {
        let removed = std::mem::take(&mut *self.inner.subscribers.borrow_mut());
        drop(removed);
    }

    /// True if both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> MotionValue<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    fn notify(&self) {
        // Snapshot both so listeners may set values or (un)subscribe freely.
        let subscribers: Vec<Subscriber<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        if subscribers.is_empty() {
            return;
        }
        let current = self.get();
        for subscriber in subscribers {
            subscriber(&current);
        }
    }
}

impl<T: Clone + PartialEq> MotionValue<T> {
    /// Store `value` and notify listeners, unless it equals the current value.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.inner.value.borrow_mut();
            if *guard == value {
                return;
            }
            *guard = value;
        }
        self.notify();
    }

    /// Mutate in place, notifying only if the result differs from before.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let changed = {
            let mut guard = self.inner.value.borrow_mut();
            let before = guard.clone();
            f(&mut *guard);
            *guard != before
        };
        if changed {
            self.notify();
        }
    }
}

impl<T: Clone + PartialEq + 'static> MotionValue<T> {
    /// Derive a value that follows this one through `f`.
    ///
    /// The derived value holds no strong reference back to the source. Its
    /// listener on the source is removed when the last handle to it drops.
    pub fn map<U, F>(&self, f: F) -> MotionValue<U>
    where
        U: Clone + PartialEq + 'static,
        F: Fn(&T) -> U + 'static,
    {
        let derived = MotionValue::new(self.with(&f));
        let target = Rc::downgrade(&derived.inner);
        let subscription = self.subscribe(move |value| {
            if let Some(inner) = target.upgrade() {
                MotionValue { inner }.set(f(value));
            }
        });
        derived.inner.upstream.borrow_mut().push(subscription);
        derived
    }
}

impl<T: fmt::Debug> fmt::Debug for MotionValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionValue")
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Default> Default for MotionValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Handle returned by [`MotionValue::subscribe`].
///
/// Dropping it leaves the listener installed; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[must_use = "keep the subscription to be able to remove the listener later"]
pub struct Subscription {
    id: SubscriberId,
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

pub fn motion_value<T>(value: T) -> MotionValue<T> {
    MotionValue::new(value)
}
