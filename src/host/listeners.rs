use crate::disposable::Disposable;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Entries<F> = RefCell<Vec<(u64, Rc<F>)>>;

/// Subscriber list whose entries are removed by disposing the handle
/// returned from [`add`](Listeners::add).
pub(crate) struct Listeners<F: ?Sized> {
    next_id: Cell<u64>,
    entries: Rc<Entries<F>>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<F: ?Sized + 'static> Listeners<F> {
    pub(crate) fn add(&self, listener: Rc<F>) -> Disposable {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));

        let weak: Weak<Entries<F>> = Rc::downgrade(&self.entries);
        Disposable::new(move || {
            if let Some(entries) = weak.upgrade() {
                entries.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    /// Current listeners, cloned out so callers can invoke them while the
    /// list is being modified.
    pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
        self.entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
