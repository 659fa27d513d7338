use bvh::aabb::{AABB, Bounded};
use bvh::bounding_hierarchy::BHShape;
use bvh::bvh::BVH;
use bvh::ray::Ray;
use serde::{Deserialize, Serialize};

use crate::intersection::Intersection;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/**
 * Query contract of a geometry aggregate. Implementations must be reentrant: the scene
 * calls them concurrently from any number of render workers without locking.
 */
pub trait Geometry {
    /// Nearest hit with 0 < t < t_max.
    fn intersect(&self, ray: &Ray, t_max: f32) -> Option<Intersection>;

    /// Any hit with 0 < t < t_max; free to stop at the first one found.
    fn intersect_p(&self, ray: &Ray, t_max: f32) -> bool;

    /// Extends `bbox` to cover this geometry.
    fn grow_bbox(&self, bbox: &mut AABB);

    fn primitive_count(&self) -> usize;
}

#[derive(Debug, Clone)]
pub enum Primitive {
    Triangle(Triangle),
    Sphere(Sphere),
}

impl Primitive {
    pub fn mat_id(&self) -> usize {
        match self {
            Primitive::Triangle(tri) => tri.mat_id,
            Primitive::Sphere(sphere) => sphere.mat_id,
        }
    }
}

impl From<Triangle> for Primitive {
    fn from(tri: Triangle) -> Primitive {
        Primitive::Triangle(tri)
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Primitive {
        Primitive::Sphere(sphere)
    }
}

impl Geometry for Primitive {
    fn intersect(&self, ray: &Ray, t_max: f32) -> Option<Intersection> {
        match self {
            Primitive::Triangle(tri) => tri.intersect(ray, t_max),
            Primitive::Sphere(sphere) => sphere.intersect(ray, t_max),
        }
    }

    fn intersect_p(&self, ray: &Ray, t_max: f32) -> bool {
        match self {
            Primitive::Triangle(tri) => tri.intersect_p(ray, t_max),
            Primitive::Sphere(sphere) => sphere.intersect_p(ray, t_max),
        }
    }

    fn grow_bbox(&self, bbox: &mut AABB) {
        match self {
            Primitive::Triangle(tri) => tri.grow_bbox(bbox),
            Primitive::Sphere(sphere) => sphere.grow_bbox(bbox),
        }
    }

    fn primitive_count(&self) -> usize {
        1
    }
}

impl Bounded for Primitive {
    fn aabb(&self) -> AABB {
        match self {
            Primitive::Triangle(tri) => tri.aabb(),
            Primitive::Sphere(sphere) => sphere.aabb(),
        }
    }
}

impl BHShape for Primitive {
    fn set_bh_node_index(&mut self, index: usize) {
        match self {
            Primitive::Triangle(tri) => tri.set_bh_node_index(index),
            Primitive::Sphere(sphere) => sphere.set_bh_node_index(index),
        }
    }

    fn bh_node_index(&self) -> usize {
        match self {
            Primitive::Triangle(tri) => tri.bh_node_index(),
            Primitive::Sphere(sphere) => sphere.bh_node_index(),
        }
    }
}

/// Nearest hit over a set of candidates, shrinking the search interval as hits are found.
fn nearest<'a, I>(candidates: I, ray: &Ray, t_max: f32) -> Option<Intersection>
where
    I: IntoIterator<Item = &'a Primitive>,
{
    let mut hit_dist = t_max;
    let mut hit_isect: Option<Intersection> = None;

    for prim in candidates {
        if let Some(isect) = prim.intersect(ray, hit_dist) {
            hit_dist = isect.dist;
            hit_isect = Some(isect);
        }
    }

    hit_isect
}

/// Brute force aggregate: every query tests every primitive.
#[derive(Debug, Default)]
pub struct PrimitiveList {
    pub primitives: Vec<Primitive>,
}

impl PrimitiveList {
    pub fn new(primitives: Vec<Primitive>) -> PrimitiveList {
        PrimitiveList { primitives }
    }
}

impl Geometry for PrimitiveList {
    fn intersect(&self, ray: &Ray, t_max: f32) -> Option<Intersection> {
        nearest(&self.primitives, ray, t_max)
    }

    fn intersect_p(&self, ray: &Ray, t_max: f32) -> bool {
        self.primitives.iter().any(|prim| prim.intersect_p(ray, t_max))
    }

    fn grow_bbox(&self, bbox: &mut AABB) {
        for prim in &self.primitives {
            prim.grow_bbox(bbox);
        }
    }

    fn primitive_count(&self) -> usize {
        self.primitives.len()
    }
}

/// Aggregate backed by a bounding volume hierarchy over the primitives.
pub struct BvhAggregate {
    bvh: BVH,
    primitives: Vec<Primitive>,
}

impl BvhAggregate {
    pub fn build(mut primitives: Vec<Primitive>) -> BvhAggregate {
        let bvh = BVH::build(&mut primitives);
        BvhAggregate { bvh, primitives }
    }
}

impl Geometry for BvhAggregate {
    fn intersect(&self, ray: &Ray, t_max: f32) -> Option<Intersection> {
        let hits = self.bvh.traverse(ray, &self.primitives);
        nearest(hits, ray, t_max)
    }

    fn intersect_p(&self, ray: &Ray, t_max: f32) -> bool {
        self.bvh
            .traverse(ray, &self.primitives)
            .into_iter()
            .any(|prim| prim.intersect_p(ray, t_max))
    }

    fn grow_bbox(&self, bbox: &mut AABB) {
        for prim in &self.primitives {
            prim.grow_bbox(bbox);
        }
    }

    fn primitive_count(&self) -> usize {
        self.primitives.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Accelerator {
    List,
    #[default]
    Bvh,
}

impl Accelerator {
    pub fn build(self, primitives: Vec<Primitive>) -> Box<dyn Geometry + Send + Sync> {
        match self {
            Accelerator::List => Box::new(PrimitiveList::new(primitives)),
            Accelerator::Bvh => Box::new(BvhAggregate::build(primitives)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn primitives() -> Vec<Primitive> {
        vec![
            Sphere::new(Vec3::new(0.0, 4.0, 0.0), 1.0, 1).into(),
            Sphere::new(Vec3::new(0.0, 8.0, 0.0), 1.0, 2).into(),
            Triangle::new(Vec3::new(-5.0, 10.0, -5.0), Vec3::new(5.0, 11.0, -5.0), Vec3::new(0.0, 10.5, 5.0), 3).into(),
        ]
    }

    #[test]
    fn list_returns_nearest_hit() {
        let list = PrimitiveList::new(primitives());
        let isect = list.intersect(&Ray::new(Vec3::ZERO, Vec3::Y), f32::INFINITY).unwrap();

        assert_eq!(isect.mat_id, 1);
        assert_relative_eq!(isect.dist, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn nearest_hit_is_bounded_by_t_max() {
        let list = PrimitiveList::new(primitives());
        assert!(list.intersect(&Ray::new(Vec3::ZERO, Vec3::Y), 2.5).is_none());
        assert!(!list.intersect_p(&Ray::new(Vec3::ZERO, Vec3::Y), 2.5));
        assert!(list.intersect_p(&Ray::new(Vec3::ZERO, Vec3::Y), 3.5));
    }

    #[test]
    fn bvh_agrees_with_list() {
        let list = PrimitiveList::new(primitives());
        let bvh = BvhAggregate::build(primitives());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let dir = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(0.1..1.0), rng.gen_range(-1.0..1.0));
            let ray = Ray::new(Vec3::new(rng.gen_range(-0.5..0.5), 0.0, rng.gen_range(-0.5..0.5)), dir);

            let a = list.intersect(&ray, f32::INFINITY);
            let b = bvh.intersect(&ray, f32::INFINITY);
            assert_eq!(a.map(|i| i.mat_id), b.map(|i| i.mat_id));
            assert_eq!(list.intersect_p(&ray, 6.0), bvh.intersect_p(&ray, 6.0));
        }
    }

    #[test]
    fn grow_bbox_covers_all_primitives() {
        let mut bbox = AABB::empty();
        BvhAggregate::build(primitives()).grow_bbox(&mut bbox);

        assert_eq!(bbox.min, Vec3::new(-5.0, 3.0, -5.0));
        assert_eq!(bbox.max, Vec3::new(5.0, 11.0, 5.0));
    }

    #[test]
    fn accelerator_builds_requested_aggregate() {
        for accel in [Accelerator::List, Accelerator::Bvh] {
            assert_eq!(accel.build(primitives()).primitive_count(), 3);
        }
    }
}
