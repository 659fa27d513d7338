use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Surface reflectance record, addressed by its index in the scene's material table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub diffuse_reflectance: Vec3,
    pub phong_reflectance: Vec3,
    pub phong_exponent: f32,
    pub mirror_reflectance: Vec3,
    /// Index of refraction; `None` for opaque surfaces.
    pub ior: Option<f32>,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse_reflectance: Vec3::ZERO,
            phong_reflectance: Vec3::ZERO,
            phong_exponent: 1.0,
            mirror_reflectance: Vec3::ZERO,
            ior: None,
        }
    }
}

impl Material {
    pub fn diffuse(reflectance: Vec3) -> Material {
        Material {
            diffuse_reflectance: reflectance,
            ..Material::default()
        }
    }

    pub fn glossy(diffuse: Vec3, phong: Vec3, exponent: f32) -> Material {
        Material {
            diffuse_reflectance: diffuse,
            phong_reflectance: phong,
            phong_exponent: exponent,
            ..Material::default()
        }
    }

    pub fn mirror() -> Material {
        Material {
            mirror_reflectance: Vec3::ONE,
            ..Material::default()
        }
    }

    pub fn glass(ior: f32) -> Material {
        Material {
            mirror_reflectance: Vec3::ONE,
            ior: Some(ior),
            ..Material::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Material::default();
    }

    /// True when the surface reflects nothing, i.e. it can only act as an emitter.
    pub fn is_black(&self) -> bool {
        self.diffuse_reflectance == Vec3::ZERO
            && self.phong_reflectance == Vec3::ZERO
            && self.mirror_reflectance == Vec3::ZERO
            && self.ior.is_none()
    }

    pub fn is_delta(&self) -> bool {
        self.mirror_reflectance != Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_is_black() {
        assert!(Material::default().is_black());
        assert!(!Material::diffuse(Vec3::splat(0.5)).is_black());
        assert!(!Material::glass(1.6).is_black());
    }

    #[test]
    fn reset_restores_baseline() {
        let mut mat = Material::glossy(Vec3::splat(0.3), Vec3::splat(0.4), 10.0);
        mat.reset();
        assert_eq!(mat, Material::default());
    }

    #[test]
    fn glass_is_a_refractive_mirror() {
        let glass = Material::glass(1.6);
        assert!(glass.is_delta());
        assert_eq!(glass.ior, Some(1.6));
        assert_eq!(glass.mirror_reflectance, Material::mirror().mirror_reflectance);
    }
}
