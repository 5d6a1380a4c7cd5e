use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::ViewportOptions;
use crate::performance::Feature;
use crate::platform::{ElementRef, Platform, Rect};
use crate::provider::use_motion_context;
use crate::value::{MotionValue, Subscription, on_cleanup};

type Callback = Rc<dyn Fn()>;

/// Fraction of `element` inside `viewport`, in `[0, 1]`.
pub fn intersection_ratio(element: &Rect, viewport: &Rect) -> f32 {
    let area = element.area();
    if area <= 0.0 {
        // Degenerate boxes count as fully visible while their origin is.
        let inside = element.x >= viewport.x
            && element.x <= viewport.right()
            && element.y >= viewport.y
            && element.y <= viewport.bottom();
        return if inside { 1.0 } else { 0.0 };
    }
    element
        .intersection(viewport)
        .map_or(0.0, |overlap| (overlap.area() / area).clamp(0.0, 1.0))
}

struct InViewInner {
    element: ElementRef,
    platform: Platform,
    options: ViewportOptions,
    in_view: MotionValue<bool>,
    has_entered: Cell<bool>,
    on_enter: RefCell<Vec<Callback>>,
    on_exit: RefCell<Vec<Callback>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

/// Viewport visibility of one element.
///
/// Visibility is re-evaluated whenever the page scrolls, the viewport
/// resizes or the element's box moves. With `once`, observation stops after
/// the first entry and the element stays in view.
#[derive(Clone)]
pub struct InView {
    inner: Rc<InViewInner>,
}

/// Watch `element` against the viewport of the nearest motion context.
pub fn use_in_view(element: &ElementRef, options: ViewportOptions) -> InView {
    let context = use_motion_context();
    context.record_feature(Feature::InView);
    let in_view = InView::observe(context.platform(), element, options);
    let teardown = in_view.clone();
    on_cleanup(move || teardown.dispose());
    in_view
}

impl InView {
    /// Observe without going through a context. Without intersection
    /// support the element is treated as permanently visible.
    pub fn observe(platform: &Platform, element: &ElementRef, options: ViewportOptions) -> Self {
        let in_view = Self {
            inner: Rc::new(InViewInner {
                element: element.clone(),
                platform: platform.clone(),
                options,
                in_view: MotionValue::new(false),
                has_entered: Cell::new(false),
                on_enter: RefCell::new(Vec::new()),
                on_exit: RefCell::new(Vec::new()),
                subscriptions: RefCell::new(Vec::new()),
            }),
        };

        if !platform.supports_intersection_observer() {
            log::debug!("no intersection observer, treating element as visible");
            in_view.inner.has_entered.set(true);
            in_view.inner.in_view.set(true);
            return in_view;
        }

        let subscriptions = vec![
            in_view.watch(&platform.scroll()),
            in_view.watch(&platform.viewport()),
            in_view.watch(&element.bounds_value()),
        ];
        *in_view.inner.subscriptions.borrow_mut() = subscriptions;
        in_view.check();
        in_view
    }

    fn watch<T: 'static>(&self, source: &MotionValue<T>) -> Subscription {
        let weak: Weak<InViewInner> = Rc::downgrade(&self.inner);
        source.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                InView { inner }.check();
            }
        })
    }

    /// Re-evaluate visibility now.
    pub fn check(&self) {
        let inner = &self.inner;
        let visible = inner.element.bounds().is_some_and(|bounds| {
            let root = inner.platform.viewport_rect().inflate(inner.options.root_margin);
            let ratio = intersection_ratio(&bounds, &root);
            ratio > 0.0 && ratio >= inner.options.threshold
        });

        let was_visible = inner.in_view.get();
        if visible == was_visible {
            return;
        }
        if !visible && inner.options.once && inner.has_entered.get() {
            return;
        }

        inner.in_view.set(visible);
        if visible {
            inner.has_entered.set(true);
            let callbacks = inner.on_enter.borrow().clone();
            for callback in callbacks {
                callback();
            }
            if inner.options.once {
                self.disconnect();
            }
        } else {
            let callbacks = inner.on_exit.borrow().clone();
            for callback in callbacks {
                callback();
            }
        }
    }

    pub fn on_enter(&self, f: impl Fn() + 'static) -> &Self {
        self.inner.on_enter.borrow_mut().push(Rc::new(f));
        self
    }

    pub fn on_exit(&self, f: impl Fn() + 'static) -> &Self {
        self.inner.on_exit.borrow_mut().push(Rc::new(f));
        self
    }

    pub fn is_in_view(&self) -> bool {
        self.inner.in_view.get()
    }

    pub fn in_view(&self) -> MotionValue<bool> {
        self.inner.in_view.clone()
    }

    pub fn has_entered(&self) -> bool {
        self.inner.has_entered.get()
    }

    pub fn options(&self) -> ViewportOptions {
        self.inner.options
    }

    pub fn is_observing(&self) -> bool {
        !self.inner.subscriptions.borrow().is_empty()
    }

    fn disconnect(&self) {
        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
    }

    /// Stop observing and drop every callback.
    pub fn dispose(&self) {
        self.disconnect();
        self.inner.on_enter.borrow_mut().clear();
        self.inner.on_exit.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DeviceCapabilities;
    use crate::scheduler;

    fn page() -> Platform {
        scheduler::reset();
        let platform = Platform::default();
        platform.resize(1000.0, 800.0);
        platform
    }

    #[test]
    fn test_intersection_ratio() {
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 50.0, 100.0, 100.0), &viewport), 0.5);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 200.0, 10.0, 10.0), &viewport), 0.0);
        assert_eq!(intersection_ratio(&Rect::new(10.0, 10.0, 0.0, 0.0), &viewport), 1.0);
    }

    #[test]
    fn test_enters_on_scroll_and_stays_with_once() {
        let platform = page();
        let element = ElementRef::new();
        element.attach(Rect::new(0.0, 1500.0, 200.0, 200.0));

        let in_view = InView::observe(&platform, &element, ViewportOptions::default());
        let entered = Rc::new(Cell::new(0));
        let e = entered.clone();
        in_view.on_enter(move || e.set(e.get() + 1));
        assert!(!in_view.is_in_view());

        platform.scroll_to(0.0, 900.0);
        assert!(in_view.is_in_view());
        assert!(in_view.has_entered());
        assert!(!in_view.is_observing());

        platform.scroll_to(0.0, 0.0);
        assert!(in_view.is_in_view());
        assert_eq!(entered.get(), 1);
    }

    #[test]
    fn test_threshold_and_exit_without_once() {
        let platform = page();
        let element = ElementRef::new();
        element.attach(Rect::new(0.0, 700.0, 100.0, 200.0));
        let options = ViewportOptions {
            threshold: 0.75,
            once: false,
            ..Default::default()
        };
        let in_view = InView::observe(&platform, &element, options);
        let exits = Rc::new(Cell::new(0));
        let x = exits.clone();
        in_view.on_exit(move || x.set(x.get() + 1));

        // Half of the element is visible.
        assert!(!in_view.is_in_view());
        platform.scroll_to(0.0, 100.0);
        assert!(in_view.is_in_view());
        platform.scroll_to(0.0, 0.0);
        assert!(!in_view.is_in_view());
        assert_eq!(exits.get(), 1);
    }

    #[test]
    fn test_root_margin_expands_viewport() {
        let platform = page();
        let element = ElementRef::new();
        element.attach(Rect::new(0.0, 850.0, 100.0, 100.0));
        let options = ViewportOptions {
            threshold: 0.0,
            root_margin: 100.0,
            once: true,
        };
        let in_view = InView::observe(&platform, &element, options);
        assert!(in_view.is_in_view());
    }

    #[test]
    fn test_unattached_element_is_not_visible() {
        let platform = page();
        let element = ElementRef::new();
        let in_view = InView::observe(&platform, &element, ViewportOptions::default());
        assert!(!in_view.is_in_view());
        element.attach(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(in_view.is_in_view());
    }

    #[test]
    fn test_without_intersection_observer_always_visible() {
        scheduler::reset();
        let platform = Platform::new(DeviceCapabilities {
            intersection_observer: false,
            ..Default::default()
        });
        let in_view = InView::observe(&platform, &ElementRef::new(), ViewportOptions::default());
        assert!(in_view.is_in_view());
        assert!(in_view.has_entered());
    }
}
