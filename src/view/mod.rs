//! The single "current transform" cell shared by every controller.
//!
//! Controllers read the cell at the moment they run and replace its value;
//! observers (the renderer) are told about every change synchronously.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::geometry::Size;
use crate::transform::TransformState;

type Observer = Rc<dyn Fn(&TransformState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct ViewCell {
    transform: Cell<TransformState>,
    viewport: Cell<Size>,
    observers: RefCell<Vec<(SubscriptionId, Observer)>>,
    next_subscription: Cell<u64>,
}

impl ViewCell {
    pub fn new(transform: TransformState, viewport: Size) -> Self {
        Self {
            transform: Cell::new(transform),
            viewport: Cell::new(viewport),
            observers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    pub fn transform(&self) -> TransformState {
        self.transform.get()
    }

    pub fn viewport(&self) -> Size {
        self.viewport.get()
    }

    pub fn set_viewport(&self, viewport: Size) {
        self.viewport.set(viewport);
    }

    /// Replaces the transform, notifying observers when it changed.
    /// Returns whether it changed.
    pub fn set(&self, transform: TransformState) -> bool {
        if self.transform.get() == transform {
            return false;
        }
        self.transform.set(transform);
        self.notify(&transform);
        true
    }

    /// Applies `update` to the value current right now.
    pub fn update(&self, update: impl FnOnce(TransformState) -> TransformState) -> bool {
        self.set(update(self.transform.get()))
    }

    pub fn subscribe(&self, observer: impl Fn(&TransformState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    fn notify(&self, transform: &TransformState) {
        // Observers may subscribe or unsubscribe while being notified.
        let observers: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in observers {
            observer(transform);
        }
    }
}

impl fmt::Debug for ViewCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCell")
            .field("transform", &self.transform.get())
            .field("viewport", &self.viewport.get())
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}
