//! Ordered cleanup actions tied to the lifetime of an owner.

use std::cell::{Cell, RefCell};

/// A single cleanup action. Dropping it without calling `dispose` leaks
/// nothing but also detaches nothing, so owners always route it through a
/// [`DisposableChain`].
pub struct Disposable {
    action: Option<Box<dyn FnOnce()>>,
}

impl Disposable {
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// A disposable with nothing to clean up
    #[cfg(test)]
    pub fn noop() -> Self {
        Self { action: None }
    }

    pub fn dispose(mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}

impl std::fmt::Debug for Disposable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposable")
            .field("pending", &self.action.is_some())
            .finish()
    }
}

/// Accumulates disposables and runs them exactly once, in registration order.
#[derive(Default)]
pub struct DisposableChain {
    actions: RefCell<Vec<Disposable>>,
    disposed: Cell<bool>,
}

impl DisposableChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action. Registering on a chain that was already disposed
    /// runs the action right away.
    pub fn register(&self, disposable: Disposable) {
        if self.disposed.get() {
            disposable.dispose();
            return;
        }
        self.actions.borrow_mut().push(disposable);
    }

    pub fn push(&self, action: impl FnOnce() + 'static) {
        self.register(Disposable::new(action));
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Run every registered action. A second call is a no-op.
    pub fn dispose_all(&self) {
        if self.disposed.replace(true) {
            return;
        }
        // Taken out first: actions may re-enter the owner.
        let actions = std::mem::take(&mut *self.actions.borrow_mut());
        for action in actions {
            action.dispose();
        }
    }
}
