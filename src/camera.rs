use bvh::ray::Ray;
use glam::{Vec2, Vec3};

use crate::transform::Transform;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub trf: Transform,
    pub resolution: Vec2,
    tan_half_fov: f32,
    aspect: f32,
}

impl Camera {
    /**
     * Places a pinhole camera at `pos` looking along `forward`. `fov` is the vertical
     * field of view in degrees; the horizontal extent follows from the resolution.
     */
    pub fn setup(pos: Vec3, forward: Vec3, up: Vec3, resolution: Vec2, fov: f32) -> Camera {
        Camera {
            trf: Transform::from_frame(pos, forward, up),
            resolution,
            tan_half_fov: (fov.to_radians() * 0.5).tan(),
            aspect: resolution.x / resolution.y,
        }
    }

    /// Ray through raster position (x, y); (0, 0) is the top-left corner of the image.
    pub fn calc_ray(&self, x: f32, y: f32) -> Ray {
        let x_ndc = (x / self.resolution.x) * 2.0 - 1.0;
        let y_ndc = 1.0 - (y / self.resolution.y) * 2.0;

        let local = Vec3::new(
            x_ndc * self.tan_half_fov * self.aspect,
            y_ndc * self.tan_half_fov,
            -1.0,
        );

        return Ray::new(self.trf.pos, self.trf.transform_vector(local).normalize());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn center_pixel_looks_forward() {
        let camera = Camera::setup(Vec3::ZERO, Vec3::Y, Vec3::Z, Vec2::new(64.0, 32.0), 45.0);
        let ray = camera.calc_ray(32.0, 16.0);

        assert_relative_eq!(ray.direction.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ray.direction.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(ray.direction.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn top_edge_matches_field_of_view() {
        let camera = Camera::setup(Vec3::ZERO, Vec3::Y, Vec3::Z, Vec2::new(32.0, 32.0), 90.0);
        let ray = camera.calc_ray(16.0, 0.0);

        // half of a 90 degree vertical fov
        assert_relative_eq!(ray.direction.z, ray.direction.y, epsilon = 1e-5);
        assert!(ray.direction.z > 0.0);
    }

    #[test]
    fn left_of_image_is_negative_x() {
        let camera = Camera::setup(Vec3::ZERO, Vec3::Y, Vec3::Z, Vec2::new(32.0, 32.0), 45.0);
        assert!(camera.calc_ray(0.0, 16.0).direction.x < 0.0);
    }
}
