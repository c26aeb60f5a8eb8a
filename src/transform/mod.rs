//! Viewport transform value type and its pure geometric operations.
//!
//! A content point `c` lands on the viewport at
//! `position + rotate(rotation) * (scale * c)`. Every operation returns a new
//! value and leaves the receiver untouched when its inputs are ill-formed, so
//! no sequence of calls can produce a non-positive scale or a non-finite
//! position.

mod affine;

pub use affine::Affine;

use crate::geometry::{Point, Size, Vector};

/// Fraction of the viewport kept free around fitted content.
pub const FIT_MARGIN: f64 = 0.1;

const FULL_TURN_DEGREES: f64 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    position: Point,
    scale: f64,
    rotation: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformState {
    pub const IDENTITY: Self = Self {
        position: Point::ORIGIN,
        scale: 1.0,
        rotation: 0.0,
    };

    /// Builds a transform, rejecting values that would break the invariants.
    ///
    /// The rotation is normalized into `[0, 360)`.
    pub fn new(position: Point, scale: f64, rotation: f64) -> Option<Self> {
        if !position.is_finite() || !scale.is_finite() || scale <= 0.0 || !rotation.is_finite() {
            return None;
        }
        Some(Self {
            position,
            scale,
            rotation: normalize_degrees(rotation),
        })
    }

    pub const fn position(&self) -> Point {
        self.position
    }

    pub const fn scale(&self) -> f64 {
        self.scale
    }

    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_well_formed(&self) -> bool {
        self.position.is_finite()
            && self.scale.is_finite()
            && self.scale > 0.0
            && (0.0..FULL_TURN_DEGREES).contains(&self.rotation)
    }

    /// Scales by `factor` while the content under `anchor` stays put.
    pub fn zoom_at(self, anchor: Point, factor: f64) -> Self {
        if !anchor.is_finite() || !factor.is_finite() || factor <= 0.0 {
            return self;
        }
        let scale = self.scale * factor;
        if !scale.is_finite() || scale <= 0.0 {
            return self;
        }
        let content_offset = (anchor - self.position) * (1.0 / self.scale);
        let position = anchor - content_offset * scale;
        if !position.is_finite() {
            return self;
        }
        Self {
            position,
            scale,
            rotation: self.rotation,
        }
    }

    /// Rotates by `delta_degrees` while the content under `center` stays put.
    pub fn rotate_about(self, center: Point, delta_degrees: f64) -> Self {
        if !center.is_finite() || !delta_degrees.is_finite() {
            return self;
        }
        let arm = (self.position - center).rotated(delta_degrees);
        let position = center + arm;
        if !position.is_finite() {
            return self;
        }
        Self {
            position,
            scale: self.scale,
            rotation: normalize_degrees(self.rotation + delta_degrees),
        }
    }

    pub fn translate(self, delta: Vector) -> Self {
        let position = self.position + delta;
        if !position.is_finite() {
            return self;
        }
        Self { position, ..self }
    }

    /// Moves the content origin to `position`, keeping scale and rotation.
    pub fn with_position(self, position: Point) -> Self {
        if !position.is_finite() {
            return self;
        }
        Self { position, ..self }
    }

    /// Largest uniform scale that fits `content` into `viewport` with a
    /// [`FIT_MARGIN`] border, unrotated.
    ///
    /// Returns `None` when either size is unusable so the caller can skip the
    /// reset instead of dividing by zero.
    pub fn fit_to_bounds(content: Size, viewport: Size) -> Option<Self> {
        if !content.is_usable() || !viewport.is_usable() {
            return None;
        }
        let scale = (viewport.width / content.width).min(viewport.height / content.height)
            * (1.0 - FIT_MARGIN);
        let scaled = Vector::new(content.width * scale, content.height * scale);
        let residual = Vector::new(viewport.width - scaled.x, viewport.height - scaled.y);
        let position = Point::ORIGIN + residual * 0.5 + scaled * FIT_MARGIN;
        Self::new(position, scale, 0.0)
    }

    /// Content coordinate currently shown at `viewport_point`.
    pub fn content_point_at(&self, viewport_point: Point) -> Point {
        ((viewport_point - self.position).rotated(-self.rotation) * (1.0 / self.scale)).to_point()
    }

    /// Viewport coordinate where `content_point` is shown.
    pub fn viewport_point_of(&self, content_point: Point) -> Point {
        self.position + (content_point.to_vector() * self.scale).rotated(self.rotation)
    }

    pub fn affine(&self) -> Affine {
        Affine::from_transform(self)
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(FULL_TURN_DEGREES);
    // Tiny negative inputs round up to exactly 360.
    if wrapped >= FULL_TURN_DEGREES {
        0.0
    } else {
        wrapped + 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= TOLERANCE * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    fn assert_points_close(actual: Point, expected: Point) {
        assert_close(actual.x, expected.x);
        assert_close(actual.y, expected.y);
    }

    fn sample_transforms() -> Vec<TransformState> {
        let mut samples = Vec::new();
        for &(x, y) in &[(0.0, 0.0), (184.0, 84.0), (-1250.5, 310.25)] {
            for &scale in &[0.01, 0.54, 1.0, 7.5] {
                for &rotation in &[0.0, 33.0, 270.0] {
                    samples.push(
                        TransformState::new(Point::new(x, y), scale, rotation)
                            .expect("sample transform should be valid"),
                    );
                }
            }
        }
        samples
    }

    fn sample_points() -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(799.0, 3.5),
            Point::new(-40.0, 620.0),
        ]
    }

    #[test]
    fn new_rejects_non_positive_scale_and_non_finite_values() {
        assert!(TransformState::new(Point::ORIGIN, 0.0, 0.0).is_none());
        assert!(TransformState::new(Point::ORIGIN, -1.0, 0.0).is_none());
        assert!(TransformState::new(Point::new(f64::NAN, 0.0), 1.0, 0.0).is_none());
        assert!(TransformState::new(Point::ORIGIN, 1.0, f64::INFINITY).is_none());
        let wrapped = TransformState::new(Point::ORIGIN, 1.0, -90.0).expect("valid transform");
        assert_close(wrapped.rotation(), 270.0);
    }

    #[test]
    fn normalize_degrees_wraps_into_half_open_turn() {
        assert_close(normalize_degrees(0.0), 0.0);
        assert_close(normalize_degrees(360.0), 0.0);
        assert_close(normalize_degrees(725.0), 5.0);
        assert_close(normalize_degrees(-2.0), 358.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
        assert!(normalize_degrees(-0.0).is_sign_positive());
    }

    #[test]
    fn wheel_scenario_zooms_in_about_cursor() {
        let zoomed = TransformState::IDENTITY.zoom_at(Point::new(100.0, 100.0), 1.1);
        assert_close(zoomed.scale(), 1.1);
        assert_points_close(zoomed.position(), Point::new(-10.0, -10.0));
        assert_eq!(zoomed.rotation(), 0.0);
    }

    #[test]
    fn zoom_keeps_content_under_anchor() {
        for transform in sample_transforms() {
            for anchor in sample_points() {
                for &factor in &[0.5, 1.1, 1.0 / 1.1, 3.0] {
                    let before = transform.content_point_at(anchor);
                    let after = transform.zoom_at(anchor, factor).content_point_at(anchor);
                    assert_points_close(after, before);
                }
            }
        }
    }

    #[test]
    fn rotation_keeps_content_under_center() {
        for transform in sample_transforms() {
            for center in sample_points() {
                for &delta in &[2.0, -2.0, 90.0, 181.5, -725.0] {
                    let before = transform.content_point_at(center);
                    let rotated = transform.rotate_about(center, delta);
                    assert_points_close(rotated.content_point_at(center), before);
                    assert!(rotated.is_well_formed());
                }
            }
        }
    }

    #[test]
    fn repeated_zoom_out_never_reaches_zero_scale() {
        let mut transform = TransformState::IDENTITY;
        for _ in 0..20_000 {
            transform = transform.zoom_at(Point::new(400.0, 300.0), 1.0 / 1.1);
            assert!(transform.scale() > 0.0);
            assert!(transform.position().is_finite());
        }
        let mut transform = TransformState::IDENTITY;
        for _ in 0..20_000 {
            transform = transform.zoom_at(Point::new(400.0, 300.0), 1.1);
            assert!(transform.scale().is_finite());
            assert!(transform.position().is_finite());
        }
    }

    #[test]
    fn ill_formed_operation_inputs_leave_transform_unchanged() {
        let transform = TransformState::new(Point::new(5.0, 6.0), 2.0, 10.0).expect("valid");
        assert_eq!(transform.zoom_at(Point::new(1.0, 1.0), 0.0), transform);
        assert_eq!(transform.zoom_at(Point::new(1.0, 1.0), -2.0), transform);
        assert_eq!(transform.zoom_at(Point::new(f64::NAN, 1.0), 2.0), transform);
        assert_eq!(transform.rotate_about(Point::ORIGIN, f64::NAN), transform);
        assert_eq!(transform.translate(Vector::new(f64::INFINITY, 0.0)), transform);
        assert_eq!(transform.with_position(Point::new(0.0, f64::NAN)), transform);
    }

    #[test]
    fn translate_moves_position_only() {
        let transform = TransformState::new(Point::new(5.0, 6.0), 2.0, 10.0).expect("valid");
        let moved = transform.translate(Vector::new(-5.0, 4.0));
        assert_eq!(moved.position(), Point::new(0.0, 10.0));
        assert_eq!(moved.scale(), 2.0);
        assert_eq!(moved.rotation(), 10.0);
    }

    #[test]
    fn fit_scenario_matches_default_document_in_800_by_600_viewport() {
        let fitted =
            TransformState::fit_to_bounds(Size::new(1000.0, 1000.0), Size::new(800.0, 600.0))
                .expect("usable sizes should fit");
        assert_close(fitted.scale(), 0.54);
        assert_points_close(fitted.position(), Point::new(184.0, 84.0));
        assert_eq!(fitted.rotation(), 0.0);
    }

    #[test]
    fn fit_skips_unusable_sizes() {
        assert!(TransformState::fit_to_bounds(Size::new(1000.0, 1000.0), Size::new(0.0, 600.0))
            .is_none());
        assert!(TransformState::fit_to_bounds(Size::new(0.0, 10.0), Size::new(800.0, 600.0))
            .is_none());
    }

    #[test]
    fn forward_and_inverse_mapping_agree() {
        for transform in sample_transforms() {
            for point in sample_points() {
                let content = transform.content_point_at(point);
                assert_points_close(transform.viewport_point_of(content), point);
            }
        }
    }
}
