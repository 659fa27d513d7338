use glam::{Mat3, Quat, Vec3};

/// Rigid placement of a camera or object: position plus orientation.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub pos: Vec3,
    pub ori: Quat,
}

impl Transform {
    /**
     * Builds a right-handed frame looking along `forward` with `up` as the approximate
     * vertical. Locally the frame looks down -Z with +Y up and +X right.
     */
    pub fn from_frame(pos: Vec3, forward: Vec3, up: Vec3) -> Transform {
        let forward = forward.normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        Transform {
            pos,
            ori: Quat::from_mat3(&Mat3::from_cols(right, up, -forward)),
        }
    }

    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.ori * v
    }

    pub fn forward(&self) -> Vec3 {
        self.ori * Vec3::NEG_Z
    }
}
