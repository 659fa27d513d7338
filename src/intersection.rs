use glam::Vec3;

/// Result of a nearest-hit query. Built fresh per query, never stored by the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub dist: f32,
    /// Geometric normal, unit length, facing against the incoming ray.
    pub nrm: Vec3,
    pub mat_id: usize,
    /// Light emitted by the hit surface, filled in by the scene from its material map.
    pub light_id: Option<usize>,
    /// The ray started inside a closed primitive.
    pub inside: bool,
}

impl Intersection {
    pub fn new(dist: f32, nrm: Vec3, mat_id: usize, inside: bool) -> Intersection {
        Intersection {
            dist,
            nrm,
            mat_id,
            light_id: None,
            inside,
        }
    }
}
