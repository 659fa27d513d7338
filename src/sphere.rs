use crate::geometry::Geometry;
use crate::intersection::Intersection;
use bvh::aabb::{AABB, Bounded};
use bvh::bounding_hierarchy::BHShape;
use bvh::ray::Ray;
use glam::Vec3;

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub mat_id: usize,
    pub node_idx: usize, // for BVH
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, mat_id: usize) -> Sphere {
        Sphere {
            center,
            radius,
            mat_id,
            node_idx: 0,
        }
    }

    /// Nearest root of the ray/sphere quadratic within (0, t_max).
    pub fn hit_distance(&self, ray: &Ray, t_max: f32) -> Option<f32> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let near = (h - sqrtd) / a;
        if near > 0.0 && near < t_max {
            return Some(near);
        }

        let far = (h + sqrtd) / a;
        if far > 0.0 && far < t_max {
            return Some(far);
        }

        None
    }
}

impl Geometry for Sphere {
    fn intersect(&self, ray: &Ray, t_max: f32) -> Option<Intersection> {
        let t = self.hit_distance(ray, t_max)?;

        let pos = ray.origin + ray.direction * t;
        let outward = (pos - self.center) / self.radius;
        let inside = outward.dot(ray.direction) > 0.0;
        let nrm = if inside { -outward } else { outward };

        Some(Intersection::new(t, nrm, self.mat_id, inside))
    }

    fn intersect_p(&self, ray: &Ray, t_max: f32) -> bool {
        self.hit_distance(ray, t_max).is_some()
    }

    fn grow_bbox(&self, bbox: &mut AABB) {
        bbox.join_mut(&self.aabb());
    }

    fn primitive_count(&self) -> usize {
        1
    }
}

impl Bounded for Sphere {
    fn aabb(&self) -> AABB {
        let r = Vec3::splat(self.radius);
        AABB::with_bounds(self.center - r, self.center + r)
    }
}

impl BHShape for Sphere {
    fn set_bh_node_index(&mut self, index: usize) {
        self.node_idx = index;
    }

    fn bh_node_index(&self) -> usize {
        self.node_idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hits_front_surface_from_outside() {
        let sphere = Sphere::new(Vec3::new(0.0, 5.0, 0.0), 1.0, 6);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);

        let isect = sphere.intersect(&ray, f32::INFINITY).unwrap();
        assert_relative_eq!(isect.dist, 4.0, epsilon = 1e-5);
        assert_relative_eq!(isect.nrm.y, -1.0, epsilon = 1e-5);
        assert_eq!(isect.mat_id, 6);
        assert!(!isect.inside);
    }

    #[test]
    fn hits_back_surface_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, 7);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let isect = sphere.intersect(&ray, f32::INFINITY).unwrap();
        assert_relative_eq!(isect.dist, 2.0, epsilon = 1e-5);
        assert!(isect.inside);
        assert_relative_eq!(isect.nrm.x, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn misses_behind_and_beyond() {
        let sphere = Sphere::new(Vec3::new(0.0, 5.0, 0.0), 1.0, 0);

        assert!(!sphere.intersect_p(&Ray::new(Vec3::ZERO, -Vec3::Y), f32::INFINITY));
        assert!(!sphere.intersect_p(&Ray::new(Vec3::ZERO, Vec3::Y), 3.5));
        assert!(!sphere.intersect_p(&Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::Y), f32::INFINITY));
    }
}
