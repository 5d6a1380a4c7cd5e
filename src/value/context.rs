//! Type-keyed context, scoped like a component tree.
//!
//! `provide_context` inside a scope makes the value visible to that scope and
//! every scope nested under it; outside any scope it lands in the root store
//! that everyone can see. This is how the [`MotionContext`] reaches every
//! hook without being threaded through each call.
//!
//! [`MotionContext`]: crate::provider::MotionContext

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use super::scope::{ContextEntry, current_scope, insert_context, lookup_context};

thread_local! {
    static ROOT_CONTEXTS: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// Store `value` for the current scope (or the root), replacing any value of
/// the same type at that level.
pub fn provide_context<T: 'static>(value: T) {
    let entry: ContextEntry = (TypeId::of::<T>(), Rc::new(value));
    if let Some(scope) = current_scope()
        && insert_context(scope, entry.clone())
    {
        return;
    }
    let previous = ROOT_CONTEXTS.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        match ctx.iter_mut().find(|(ty, _)| *ty == entry.0) {
            Some(existing) => Some(std::mem::replace(&mut existing.1, entry.1)),
            None => {
                ctx.push(entry);
                None
            }
        }
    });
    drop(previous);
}

fn find<T: 'static>() -> Option<Rc<dyn Any>> {
    let type_id = TypeId::of::<T>();
    if let Some(scope) = current_scope()
        && let Some(found) = lookup_context(scope, type_id)
    {
        return Some(found);
    }
    ROOT_CONTEXTS.with(|ctx| {
        ctx.borrow()
            .iter()
            .find(|(ty, _)| *ty == type_id)
            .map(|(_, value)| value.clone())
    })
}

/// Nearest value of type `T`, cloned.
pub fn use_context<T: Clone + 'static>() -> Option<T> {
    find::<T>().and_then(|value| value.downcast_ref::<T>().cloned())
}

/// Nearest value of type `T`, panicking when absent.
///
/// Hooks never call this; it is for application code where a missing
/// context is a wiring bug.
pub fn expect_context<T: Clone + 'static>() -> T {
    use_context::<T>().unwrap_or_else(|| {
        panic!(
            "no context of type `{}` found; was it provided above this scope?",
            std::any::type_name::<T>()
        )
    })
}

/// Borrow the nearest value of type `T` without cloning it.
pub fn with_context<T: 'static, R>(f: impl FnOnce(&T) -> R) -> Option<R> {
    let value = find::<T>()?;
    value.downcast_ref::<T>().map(f)
}

pub fn has_context<T: 'static>() -> bool {
    find::<T>().is_some()
}

/// Clear the root store. Scoped values go away with their scopes.
pub fn reset_contexts() {
    let old = ROOT_CONTEXTS.with(|ctx| std::mem::take(&mut *ctx.borrow_mut()));
    drop(old);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::scope::{dispose_scope, reset_scopes, with_scope};

    fn setup() {
        reset_scopes();
        reset_contexts();
    }

    #[test]
    fn test_root_provide_and_use() {
        setup();
        provide_context(42u32);
        assert_eq!(use_context::<u32>(), Some(42));
        assert!(has_context::<u32>());
    }

    #[test]
    fn test_missing_context_is_none() {
        setup();
        assert_eq!(use_context::<String>(), None);
        assert!(!has_context::<String>());
    }

    #[test]
    #[should_panic(expected = "no context of type")]
    fn test_expect_context_panics_when_missing() {
        setup();
        expect_context::<f64>();
    }

    #[test]
    fn test_nested_scope_sees_parent_value() {
        setup();
        let (seen, _) = with_scope(|| {
            provide_context("page".to_string());
            with_scope(use_context::<String>).0
        });
        assert_eq!(seen, Some("page".to_string()));
    }

    #[test]
    fn test_inner_value_shadows_outer() {
        setup();
        provide_context(1u8);
        let (inner, _) = with_scope(|| {
            provide_context(2u8);
            use_context::<u8>()
        });
        assert_eq!(inner, Some(2));
        assert_eq!(use_context::<u8>(), Some(1));
    }

    #[test]
    fn test_scoped_value_dropped_with_scope() {
        setup();
        let (_, id) = with_scope(|| provide_context(vec![1, 2, 3]));
        dispose_scope(id);
        assert_eq!(use_context::<Vec<i32>>(), None);
    }

    #[test]
    fn test_with_context_borrows() {
        setup();
        provide_context(vec![1, 2, 3]);
        let sum = with_context::<Vec<i32>, _>(|v| v.iter().sum::<i32>());
        assert_eq!(sum, Some(6));
    }
}
