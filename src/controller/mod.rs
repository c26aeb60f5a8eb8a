//! Input controllers that turn raw events into transform updates.
//!
//! All three write to the same [`ViewCell`](crate::view::ViewCell). When two
//! of them touch the cell within one frame the later write wins; each reads
//! the cell when it runs rather than a copy captured earlier.

mod keyboard;
mod pointer;
mod wheel;

pub use keyboard::{
    KeyboardMotionController, MotionSettings, DEFAULT_PAN_SPEED, DEFAULT_ROTATION_SPEED,
};
pub use pointer::{DragState, PointerDragController};
pub use wheel::{WheelZoomController, DEFAULT_WHEEL_ZOOM_BASE};
