mod bindings;
mod motion;

pub use bindings::{KeyModifiers, MotionBindings};
pub use motion::{InputMotionState, MotionKey, PointerButton};
