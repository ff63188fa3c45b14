use super::listeners::Listeners;
use crate::disposable::Disposable;
use std::rc::Rc;

/// "A document was saved" notifications, delivered synchronously to every
/// subscriber in subscription order.
#[derive(Clone, Default)]
pub struct SaveFeed {
    listeners: Rc<Listeners<dyn Fn(&str)>>,
}

impl SaveFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Disposing the returned handle unsubscribes it.
    pub fn subscribe(&self, listener: impl Fn(&str) + 'static) -> Disposable {
        let listener: Rc<dyn Fn(&str)> = Rc::new(listener);
        self.listeners.add(listener)
    }

    /// Deliver `saved_path` to every subscriber.
    ///
    /// Panels answer a matching save by spawning their refresh with
    /// `tokio::task::spawn_local`, so once a panel is subscribed this must be
    /// called from inside a `tokio::task::LocalSet` (the binary drives it
    /// from `LocalSet::block_on`). Outside one, a matching save panics.
    pub fn publish(&self, saved_path: &str) {
        for listener in self.listeners.snapshot() {
            listener(saved_path);
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
