use std::rc::Rc;

use crate::geometry::Point;
use crate::view::ViewCell;

pub const DEFAULT_WHEEL_ZOOM_BASE: f64 = 1.1;

/// Applies one anchored zoom step per wheel event, synchronously.
#[derive(Debug)]
pub struct WheelZoomController {
    view: Rc<ViewCell>,
    base: f64,
}

impl WheelZoomController {
    /// `base` must be finite and above 1; anything else falls back to
    /// [`DEFAULT_WHEEL_ZOOM_BASE`].
    pub fn new(view: Rc<ViewCell>, base: f64) -> Self {
        let base = if base.is_finite() && base > 1.0 {
            base
        } else {
            tracing::warn!(base, "invalid wheel zoom base; using default");
            DEFAULT_WHEEL_ZOOM_BASE
        };
        Self { view, base }
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    /// Scrolling up (negative `delta_y`) zooms in about `cursor`.
    pub fn wheel(&self, cursor: Point, delta_y: f64) -> bool {
        if !cursor.is_finite() || !delta_y.is_finite() || delta_y == 0.0 {
            return false;
        }
        let factor = if delta_y < 0.0 {
            self.base
        } else {
            1.0 / self.base
        };
        let changed = self
            .view
            .update(|transform| transform.zoom_at(cursor, factor));
        tracing::trace!(factor, changed, "wheel zoom");
        changed
    }
}
