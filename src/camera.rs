use druid::kurbo::Point;

use crate::math::{multiply_matrices, multiply_matrix_vector, pitch_rotation, yaw_rotation};

/// Perspective focal distance; acts as the camera-to-plane distance.
pub const FOCAL_DISTANCE: f64 = 2000.0;
/// World-to-pixel scale: one meter maps to this many pixels at depth zero.
pub const METERS_TO_PIXELS: f64 = 220.0;
/// Radians of rotation per pixel of pointer drag.
pub const DRAG_SENSITIVITY: f64 = 0.01;
/// Pitch clamp range, keeping the view from flipping over the top or
/// diving under the floor.
pub const PITCH_MIN: f64 = -0.5;
pub const PITCH_MAX: f64 = 1.5;
/// Initial downward tilt.
pub const INITIAL_PITCH: f64 = 0.2;

/// Orbit camera state. Mutated only by drag gestures; the render path
/// just reads it.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// Rotation around the vertical axis, unbounded (trig wraps it)
    pub yaw: f64,
    /// Rotation around the horizontal axis, always within the clamp range
    pub pitch: f64,
    /// Reserved; currently fixed at 1.0
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            yaw: 0.0,
            pitch: INITIAL_PITCH,
            zoom: 1.0,
        }
    }
}

/// A world point after projection: screen position, the perspective scale
/// factor for sizing everything drawn there, and the depth key used for
/// painter's-algorithm ordering.
#[derive(Clone, Copy, Debug)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub depth: f64,
}

impl Projected {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl Camera {
    /// Apply a pointer drag delta in pixels. The pitch clamp happens here,
    /// before the value is stored, so the state is never out of range.
    pub fn drag(&mut self, delta_x: f64, delta_y: f64) {
        self.yaw += delta_x * DRAG_SENSITIVITY;
        self.pitch = (self.pitch + delta_y * DRAG_SENSITIVITY).clamp(PITCH_MIN, PITCH_MAX);
    }

    /// Combined yaw-then-pitch view rotation.
    pub fn view_matrix(&self) -> [[f64; 3]; 3] {
        multiply_matrices(&pitch_rotation(self.pitch), &yaw_rotation(self.yaw))
    }

    /// Project a world point onto the drawing surface centered at `center`.
    pub fn project(&self, center: Point, point: [f64; 3]) -> Projected {
        self.project_with(&self.view_matrix(), center, point)
    }

    /// Projection with a precomputed view matrix, for callers projecting
    /// many points per frame.
    pub fn project_with(
        &self,
        view: &[[f64; 3]; 3],
        center: Point,
        point: [f64; 3],
    ) -> Projected {
        let [x, y, z] = multiply_matrix_vector(view, &point);
        let pixels_per_meter = METERS_TO_PIXELS * self.zoom;
        let scale = FOCAL_DISTANCE / (FOCAL_DISTANCE + z * pixels_per_meter);
        Projected {
            x: center.x + x * pixels_per_meter * scale,
            y: center.y + y * pixels_per_meter * scale,
            scale,
            depth: z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn center() -> Point {
        Point::new(400.0, 100.0)
    }

    #[test]
    fn origin_projects_to_center() {
        let camera = Camera::default();
        let p = camera.project(center(), [0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(p.x, 400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.scale, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.depth, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn identity_camera_maps_meters_to_pixels() {
        let camera = Camera {
            yaw: 0.0,
            pitch: 0.0,
            zoom: 1.0,
        };
        let p = camera.project(center(), [1.0, 0.5, 0.0]);
        assert_abs_diff_eq!(p.x, 400.0 + METERS_TO_PIXELS, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 100.0 + METERS_TO_PIXELS * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn nearer_points_project_larger() {
        let camera = Camera {
            yaw: 0.0,
            pitch: 0.0,
            zoom: 1.0,
        };
        let near = camera.project(center(), [0.0, 0.0, -1.0]);
        let far = camera.project(center(), [0.0, 0.0, 1.0]);
        assert!(near.scale > 1.0);
        assert!(far.scale < 1.0);
        assert!(near.depth < far.depth);
    }

    #[test]
    fn yaw_rotates_x_into_depth() {
        let camera = Camera {
            yaw: std::f64::consts::FRAC_PI_2,
            pitch: 0.0,
            zoom: 1.0,
        };
        let p = camera.project(center(), [1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(p.x, 400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.depth, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pitch_clamp_holds_under_extreme_drags() {
        let mut camera = Camera::default();
        for _ in 0..1000 {
            camera.drag(13.0, 5000.0);
            assert!(camera.pitch <= PITCH_MAX);
        }
        assert_abs_diff_eq!(camera.pitch, PITCH_MAX, epsilon = 1e-12);
        for _ in 0..1000 {
            camera.drag(-13.0, -5000.0);
            assert!(camera.pitch >= PITCH_MIN);
        }
        assert_abs_diff_eq!(camera.pitch, PITCH_MIN, epsilon = 1e-12);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.drag(1000.0, 0.0);
        }
        assert!(camera.yaw > 2.0 * std::f64::consts::TAU);
    }
}
