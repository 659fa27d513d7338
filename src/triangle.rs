use crate::geometry::Geometry;
use crate::intersection::Intersection;
use bvh::aabb::{AABB, Bounded};
use bvh::bounding_hierarchy::BHShape;
use bvh::ray::Ray;
use glam::Vec3;

const DET_EPSILON: f32 = 1e-9;

#[derive(Debug, Clone)]
pub struct Triangle {
    pub pos: [Vec3; 3],
    pub mat_id: usize,
    pub nrm: Vec3,
    pub node_idx: usize, // for BVH
}

impl Triangle {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, mat_id: usize) -> Triangle {
        Triangle {
            pos: [p0, p1, p2],
            mat_id,
            nrm: (p1 - p0).cross(p2 - p0).normalize(),
            node_idx: 0,
        }
    }

    /**
     * Two-sided Möller-Trumbore intersection, accepting hits with 0 < t < t_max.
     * Reference: http://www.graphics.cornell.edu/pubs/1997/MT97.html
     */
    pub fn hit_distance(&self, ray: &Ray, t_max: f32) -> Option<f32> {
        // calculate triangle edge vectors
        let edge_a = self.pos[1] - self.pos[0];
        let edge_b = self.pos[2] - self.pos[0];

        // solve the equation for t (distance)
        let p = ray.direction.cross(edge_b);
        let d = edge_a.dot(p);

        if d.abs() < DET_EPSILON {
            return None;
        }

        let inv_d = 1.0 / d;
        let t = ray.origin - self.pos[0];
        let u = t.dot(p) * inv_d;

        if u < 0.0 || u > 1.0 {
            return None;
        }

        let q = t.cross(edge_a);
        let v = ray.direction.dot(q) * inv_d;

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge_b.dot(q) * inv_d;

        if t <= 0.0 || t >= t_max {
            return None;
        }

        return Some(t);
    }
}

impl Geometry for Triangle {
    fn intersect(&self, ray: &Ray, t_max: f32) -> Option<Intersection> {
        let t = self.hit_distance(ray, t_max)?;

        let nrm = if self.nrm.dot(ray.direction) > 0.0 { -self.nrm } else { self.nrm };
        return Some(Intersection::new(t, nrm, self.mat_id, false));
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

impl Bounded for Triangle {
    fn aabb(&self) -> AABB {
        let min = self.pos[0].min(self.pos[1].min(self.pos[2]));
        let max = self.pos[0].max(self.pos[1].max(self.pos[2]));
        return AABB::with_bounds(min, max);
    }
}

impl BHShape for Triangle {
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

    fn floor() -> Triangle {
        Triangle::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 3)
    }

    #[test]
    fn hits_from_both_sides() {
        let tri = floor();

        let down = Ray::new(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z);
        let isect = tri.intersect(&down, f32::INFINITY).unwrap();
        assert_relative_eq!(isect.dist, 2.0, epsilon = 1e-6);
        assert_eq!(isect.nrm, Vec3::Z);
        assert_eq!(isect.mat_id, 3);
        assert_eq!(isect.light_id, None);

        let up = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        let isect = tri.intersect(&up, f32::INFINITY).unwrap();
        assert_eq!(isect.nrm, -Vec3::Z);
    }

    #[test]
    fn respects_t_max() {
        let tri = floor();
        let down = Ray::new(Vec3::new(0.0, 0.0, 2.0), -Vec3::Z);

        assert!(!tri.intersect_p(&down, 2.0));
        assert!(!tri.intersect_p(&down, 1.5));
        assert!(tri.intersect_p(&down, 2.1));
    }

    #[test]
    fn misses_outside_edges() {
        let tri = floor();
        let ray = Ray::new(Vec3::new(5.0, 0.0, 2.0), -Vec3::Z);
        assert!(tri.intersect(&ray, f32::INFINITY).is_none());

        // parallel to the plane
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(tri.intersect(&ray, f32::INFINITY).is_none());
    }

    #[test]
    fn grows_bbox_over_vertices() {
        let mut bbox = AABB::empty();
        floor().grow_bbox(&mut bbox);
        assert_eq!(bbox.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(bbox.max, Vec3::new(1.0, 1.0, 0.0));
    }
}
