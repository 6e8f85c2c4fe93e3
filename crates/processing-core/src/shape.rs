//! Drag-rotatable square for the side viewer.
//!
//! Pure geometry in canvas pixels; rendering is up to the caller.

use enhancer_landmark_model::viewport::Point2D;

/// Canvas edge length in pixels.
pub const CANVAS_SIZE: f64 = 300.0;

/// Degrees of rotation per pixel of horizontal drag.
pub const DEGREES_PER_PIXEL: f64 = 0.5;

/// A square spun by horizontal drags.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatableShape {
    center: Point2D,
    /// Distance from the centre to each corner.
    radius: f64,
    angle_degrees: f64,
    last_x: Option<f64>,
}

impl Default for RotatableShape {
    fn default() -> Self {
        Self::new(Point2D::new(CANVAS_SIZE / 2.0, CANVAS_SIZE / 2.0), 100.0)
    }
}

impl RotatableShape {
    pub fn new(center: Point2D, radius: f64) -> Self {
        Self {
            center,
            radius,
            angle_degrees: 0.0,
            last_x: None,
        }
    }

    pub fn center(&self) -> Point2D {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle_degrees
    }

    /// Pointer pressed at horizontal position `x`.
    pub fn press(&mut self, x: f64) {
        self.last_x = Some(x);
    }

    /// Pointer dragged to `x`. Drags without a prior press only record the position.
    pub fn drag(&mut self, x: f64) {
        if let Some(last) = self.last_x {
            self.angle_degrees += (x - last) * DEGREES_PER_PIXEL;
        }
        self.last_x = Some(x);
    }

    /// Rotate by a horizontal drag distance directly.
    pub fn drag_by(&mut self, dx: f64) {
        self.angle_degrees += dx * DEGREES_PER_PIXEL;
    }

    pub fn release(&mut self) {
        self.last_x = None;
    }

    /// Corner positions, starting at the current angle and stepping 90°.
    pub fn corners(&self) -> [Point2D; 4] {
        let base = self.angle_degrees.to_radians();
        std::array::from_fn(|i| {
            let a = base + std::f64::consts::FRAC_PI_2 * i as f64;
            Point2D::new(
                self.center.x + self.radius * a.cos(),
                self.center.y + self.radius * a.sin(),
            )
        })
    }

    /// End of the indicator line drawn from the centre along the current angle.
    pub fn indicator_end(&self) -> Point2D {
        self.corners()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_rotates_half_degree_per_pixel() {
        let mut shape = RotatableShape::default();
        shape.press(100.0);
        shape.drag(140.0);
        shape.drag(120.0);
        assert!((shape.angle_degrees() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_drag_without_press_only_records() {
        let mut shape = RotatableShape::default();
        shape.drag(50.0);
        assert_eq!(shape.angle_degrees(), 0.0);
        shape.drag(70.0);
        assert!((shape.angle_degrees() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_corners_at_zero_angle() {
        let shape = RotatableShape::default();
        let corners = shape.corners();
        assert!((corners[0].x - 250.0).abs() < 1e-9);
        assert!((corners[0].y - 150.0).abs() < 1e-9);
        assert!((corners[1].x - 150.0).abs() < 1e-9);
        assert!((corners[1].y - 250.0).abs() < 1e-9);
        for corner in corners {
            assert!((corner.distance_to(&shape.center()) - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_indicator_follows_angle() {
        let mut shape = RotatableShape::default();
        shape.drag_by(180.0);
        let end = shape.indicator_end();
        assert!((end.x - 150.0).abs() < 1e-9);
        assert!((end.y - 250.0).abs() < 1e-9);
    }
}
