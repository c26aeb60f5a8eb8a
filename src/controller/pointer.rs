use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::geometry::{Point, Vector};
use crate::input::PointerButton;
use crate::scheduler::FrameScheduler;
use crate::view::ViewCell;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        /// Pointer position minus content origin at press time.
        anchor_offset: Vector,
        latest: Point,
    },
}

struct DragShared {
    view: Rc<ViewCell>,
    state: Cell<DragState>,
}

impl DragShared {
    fn apply_latest(&self) {
        if let DragState::Dragging {
            anchor_offset,
            latest,
        } = self.state.get()
        {
            self.view
                .update(|transform| transform.with_position(latest - anchor_offset));
        }
    }
}

/// Turns a press/move/release sequence into panning, applying at most one
/// position update per frame.
pub struct PointerDragController {
    shared: Rc<DragShared>,
    frames: Box<dyn FrameScheduler>,
}

impl PointerDragController {
    pub fn new(view: Rc<ViewCell>, frames: Box<dyn FrameScheduler>) -> Self {
        Self {
            shared: Rc::new(DragShared {
                view,
                state: Cell::new(DragState::Idle),
            }),
            frames,
        }
    }

    pub fn state(&self) -> DragState {
        self.shared.state.get()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state(), DragState::Dragging { .. })
    }

    pub fn press(&self, position: Point, button: PointerButton) -> bool {
        if button != PointerButton::Primary || !position.is_finite() {
            return false;
        }
        self.frames.cancel();
        let anchor_offset = position - self.shared.view.transform().position();
        self.shared.state.set(DragState::Dragging {
            anchor_offset,
            latest: position,
        });
        tracing::trace!(x = position.x, y = position.y, "pointer drag started");
        true
    }

    pub fn move_to(&self, position: Point) -> bool {
        let DragState::Dragging { anchor_offset, .. } = self.state() else {
            return false;
        };
        if !position.is_finite() {
            return false;
        }
        self.shared.state.set(DragState::Dragging {
            anchor_offset,
            latest: position,
        });
        let shared: Weak<DragShared> = Rc::downgrade(&self.shared);
        self.frames.request(Box::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.apply_latest();
            }
        }));
        true
    }

    /// Ends the drag, applying the final position immediately even if no
    /// frame has fired since the last move.
    pub fn release(&self, position: Option<Point>) -> bool {
        let DragState::Dragging {
            anchor_offset,
            latest,
        } = self.state()
        else {
            return false;
        };
        let final_position = position
            .filter(|position| position.is_finite())
            .unwrap_or(latest);
        let moved = final_position != latest;
        self.shared.state.set(DragState::Dragging {
            anchor_offset,
            latest: final_position,
        });
        if self.frames.is_pending() || moved {
            self.frames.cancel();
            self.shared.apply_latest();
        }
        self.shared.state.set(DragState::Idle);
        tracing::trace!(
            x = final_position.x,
            y = final_position.y,
            "pointer drag released"
        );
        true
    }

    /// Pointer left the viewport mid-drag.
    pub fn leave(&self) -> bool {
        self.release(None)
    }

    /// Teardown: drops any scheduled update without applying it.
    pub fn cancel(&self) {
        self.frames.cancel();
        self.shared.state.set(DragState::Idle);
    }
}

impl Drop for PointerDragController {
    fn drop(&mut self) {
        self.cancel();
    }
}
