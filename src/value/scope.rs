//! Teardown scopes for motion hooks.
//!
//! A scope stands in for one mounted component. Hooks created while a scope
//! is current register their teardown with [`on_cleanup`]: cancelling
//! timers, disconnecting scroll listeners, clearing value subscribers. When
//! the component unmounts the host calls [`dispose_scope`] and everything
//! the component scheduled is gone.
//!
//! Scopes nest. Child scopes are disposed before their parent, cleanups run
//! last-registered-first, and context values provided inside a scope are
//! dropped with it.
//!
//! ```ignore
//! let (card, scope) = with_scope(|| use_motion(MotionOptions::hover("hoverLift")));
//! // ... later, on unmount:
//! dispose_scope(scope);
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

pub type ScopeId = usize;

pub(crate) type ContextEntry = (TypeId, Rc<dyn Any>);

struct Scope {
    parent: Option<ScopeId>,
    cleanups: Vec<Box<dyn FnOnce()>>,
    children: Vec<ScopeId>,
    contexts: Vec<ContextEntry>,
}

#[derive(Default)]
struct ScopeArena {
    scopes: Vec<Option<Scope>>,
}

impl ScopeArena {
    fn allocate(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Some(Scope {
            parent,
            cleanups: Vec::new(),
            children: Vec::new(),
            contexts: Vec::new(),
        }));
        if let Some(parent) = parent
            && let Some(Some(parent_scope)) = self.scopes.get_mut(parent)
        {
            parent_scope.children.push(id);
        }
        id
    }

    fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id).and_then(|s| s.as_mut())
    }

    fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id).and_then(|s| s.as_ref())
    }
}

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<ScopeId>> = const { RefCell::new(None) };
    static SCOPES: RefCell<ScopeArena> = RefCell::new(ScopeArena::default());
}

/// Run `f` inside a fresh scope nested under the current one.
///
/// Returns `f`'s result and the new scope's id.
pub fn with_scope<T>(f: impl FnOnce() -> T) -> (T, ScopeId) {
    let parent = current_scope();
    let id = SCOPES.with(|arena| arena.borrow_mut().allocate(parent));

    let previous = CURRENT_SCOPE.with(|current| current.replace(Some(id)));
    let result = f();
    CURRENT_SCOPE.with(|current| *current.borrow_mut() = previous);

    (result, id)
}

/// Re-enter an existing scope, e.g. to create hooks lazily after mount.
pub fn run_in_scope<T>(id: ScopeId, f: impl FnOnce() -> T) -> T {
    let previous = CURRENT_SCOPE.with(|current| current.replace(Some(id)));
    let result = f();
    CURRENT_SCOPE.with(|current| *current.borrow_mut() = previous);
    result
}

pub fn current_scope() -> Option<ScopeId> {
    CURRENT_SCOPE.with(|current| *current.borrow())
}

/// Tear down a scope: children first, then cleanups in reverse order.
/// Disposing an already-disposed scope does nothing.
pub fn dispose_scope(id: ScopeId) {
    let Some(scope) = SCOPES.with(|arena| arena.borrow_mut().scopes.get_mut(id)?.take()) else {
        return;
    };

    for child in scope.children {
        dispose_scope(child);
    }

    for cleanup in scope.cleanups.into_iter().rev() {
        cleanup();
    }

    // Context values may hold hooks of their own; drop them outside the borrow.
    drop(scope.contexts);
}

/// Register `f` to run when the current scope is disposed.
///
/// Returns `false` (and drops `f`) when no scope is active; callers that
/// need guaranteed teardown keep their own `dispose()` path as well.
pub fn on_cleanup(f: impl FnOnce() + 'static) -> bool {
    let Some(id) = current_scope() else {
        return false;
    };
    SCOPES.with(|arena| match arena.borrow_mut().get_mut(id) {
        Some(scope) => {
            scope.cleanups.push(Box::new(f));
            true
        }
        None => false,
    })
}

pub fn is_disposed(id: ScopeId) -> bool {
    SCOPES.with(|arena| arena.borrow().get(id).is_none())
}

/// Attach a context entry to `id`, replacing one of the same type.
pub(crate) fn insert_context(id: ScopeId, entry: ContextEntry) -> bool {
    SCOPES.with(|arena| {
        let mut arena = arena.borrow_mut();
        let Some(scope) = arena.get_mut(id) else {
            return false;
        };
        match scope.contexts.iter_mut().find(|(ty, _)| *ty == entry.0) {
            Some(existing) => existing.1 = entry.1,
            None => scope.contexts.push(entry),
        }
        true
    })
}

/// Find the nearest context of `type_id`, walking from `start` to the root.
pub(crate) fn lookup_context(start: ScopeId, type_id: TypeId) -> Option<Rc<dyn Any>> {
    SCOPES.with(|arena| {
        let arena = arena.borrow();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let scope = arena.get(id)?;
            if let Some((_, value)) = scope.contexts.iter().find(|(ty, _)| *ty == type_id) {
                return Some(value.clone());
            }
            cursor = scope.parent;
        }
        None
    })
}

/// Wipe every scope without running cleanups. Test isolation only.
pub fn reset_scopes() {
    let old = SCOPES.with(|arena| std::mem::take(&mut *arena.borrow_mut()));
    CURRENT_SCOPE.with(|current| *current.borrow_mut() = None);
    drop(old);
}
