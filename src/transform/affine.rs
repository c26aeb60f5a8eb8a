use std::fmt;

use super::TransformState;
use crate::geometry::{Point, Vector};

/// Rendering description of a [`TransformState`].
///
/// Renderers apply `translate`, then `rotate`, then `scale`, each about the
/// origin of the already transformed coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub translate: Vector,
    pub rotate_degrees: f64,
    pub scale: f64,
}

impl Affine {
    pub(super) fn from_transform(transform: &TransformState) -> Self {
        Self {
            translate: transform.position().to_vector(),
            rotate_degrees: transform.rotation(),
            scale: transform.scale(),
        }
    }

    /// Coefficients `[a, b, c, d, e, f]` of `x' = a*x + c*y + e`,
    /// `y' = b*x + d*y + f`, the layout canvas and cairo APIs expect.
    pub fn matrix(&self) -> [f64; 6] {
        let (sin, cos) = self.rotate_degrees.to_radians().sin_cos();
        [
            self.scale * cos,
            self.scale * sin,
            -self.scale * sin,
            self.scale * cos,
            self.translate.x,
            self.translate.y,
        ]
    }

    pub fn apply(&self, point: Point) -> Point {
        let [a, b, c, d, e, f] = self.matrix();
        Point::new(a * point.x + c * point.y + e, b * point.x + d * point.y + f)
    }
}

/// CSS `transform` syntax.
impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) rotate({}deg) scale({})",
            self.translate.x, self.translate.y, self.rotate_degrees, self.scale
        )
    }
}
