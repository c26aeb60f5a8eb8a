//! Frame streams backed by a GTK widget's frame clock.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use super::{FrameCallback, FrameClock, FrameScheduler};

#[derive(Debug, Clone)]
pub struct WidgetFrameClock {
    widget: gtk4::Widget,
}

impl WidgetFrameClock {
    pub fn new(widget: &impl IsA<gtk4::Widget>) -> Self {
        Self {
            widget: widget.clone().upcast(),
        }
    }
}

impl FrameClock for WidgetFrameClock {
    fn stream(&self) -> Box<dyn FrameScheduler> {
        Box::new(WidgetFrameStream {
            widget: self.widget.clone(),
            pending: Rc::new(RefCell::new(None)),
        })
    }
}

struct WidgetFrameStream {
    widget: gtk4::Widget,
    pending: Rc<RefCell<Option<gtk4::TickCallbackId>>>,
}

impl FrameScheduler for WidgetFrameStream {
    fn request(&self, callback: FrameCallback) -> bool {
        if self.is_pending() {
            return false;
        }
        let pending = Rc::clone(&self.pending);
        let callback = RefCell::new(Some(callback));
        let id = self.widget.add_tick_callback(move |_, _| {
            // Clear first so the callback may schedule the next frame.
            pending.borrow_mut().take();
            let callback = callback.borrow_mut().take();
            if let Some(callback) = callback {
                callback();
            }
            gtk4::glib::ControlFlow::Break
        });
        *self.pending.borrow_mut() = Some(id);
        true
    }

    fn cancel(&self) {
        let pending = self.pending.borrow_mut().take();
        if let Some(id) = pending {
            id.remove();
        }
    }

    fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl Drop for WidgetFrameStream {
    fn drop(&mut self) {
        self.cancel();
    }
}
