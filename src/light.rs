use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::scene::SceneSphere;
use crate::utils::luminance;

/// Light arriving at a point from one light sample.
#[derive(Debug, Clone, Copy)]
pub struct Illumination {
    /// Unit direction from the illuminated point towards the light.
    pub direction: Vec3,
    /// Distance to the sampled light point; infinite for lights at infinity.
    pub distance: f32,
    /// Incident radiance already divided by the sampling density.
    pub radiance: Vec3,
}

/// Emissive triangle.
#[derive(Debug, Clone)]
pub struct AreaLight {
    pub p0: Vec3,
    pub e1: Vec3,
    pub e2: Vec3,
    pub nrm: Vec3,
    pub inv_area: f32,
    pub intensity: Vec3,
}

impl AreaLight {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, intensity: Vec3) -> AreaLight {
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let cross = e1.cross(e2);

        AreaLight {
            p0,
            e1,
            e2,
            nrm: cross.normalize(),
            inv_area: 2.0 / cross.length(),
            intensity,
        }
    }

    /// Uniformly distributed point on the triangle.
    pub fn sample_point(&self, u: Vec2) -> Vec3 {
        let su = u.x.sqrt();
        self.p0 + self.e1 * (su * (1.0 - u.y)) + self.e2 * (su * u.y)
    }

    /// Radiance leaving the surface along `dir`; the triangle only emits on its normal side.
    pub fn radiance(&self, dir: Vec3) -> Vec3 {
        if self.nrm.dot(dir) > 0.0 {
            self.intensity
        } else {
            Vec3::ZERO
        }
    }

    fn illuminate(&self, point: Vec3, u: Vec2) -> Option<Illumination> {
        let to_light = self.sample_point(u) - point;
        let dist_sqr = to_light.length_squared();
        let distance = dist_sqr.sqrt();
        let direction = to_light / distance;

        let cos_light = self.nrm.dot(-direction);
        if cos_light <= 0.0 {
            return None;
        }

        // area density converted to solid angle
        let pdf = self.inv_area * dist_sqr / cos_light;

        Some(Illumination {
            direction,
            distance,
            radiance: self.intensity / pdf,
        })
    }
}

/// Light arriving from a single direction, e.g. the sun.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Unit direction the light travels in.
    pub direction: Vec3,
    pub intensity: Vec3,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, intensity: Vec3) -> DirectionalLight {
        DirectionalLight {
            direction: direction.normalize(),
            intensity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Vec3,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Vec3) -> PointLight {
        PointLight {
            position,
            intensity,
        }
    }
}

/// Constant environment surrounding the scene.
#[derive(Debug, Clone)]
pub struct BackgroundLight {
    pub color: Vec3,
    pub scale: f32,
}

impl Default for BackgroundLight {
    fn default() -> BackgroundLight {
        BackgroundLight {
            color: Vec3::new(135.0, 206.0, 250.0) / 255.0,
            scale: 1.0,
        }
    }
}

impl BackgroundLight {
    pub fn new(scale: f32) -> BackgroundLight {
        BackgroundLight {
            scale,
            ..BackgroundLight::default()
        }
    }

    pub fn radiance(&self) -> Vec3 {
        self.color * self.scale
    }

    fn illuminate(&self, u: Vec2) -> Illumination {
        // uniform direction on the unit sphere
        let z = 1.0 - 2.0 * u.x;
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;
        let direction = Vec3::new(r * phi.cos(), r * phi.sin(), z);

        Illumination {
            direction,
            distance: f32::INFINITY,
            radiance: self.radiance() * (4.0 * PI),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Light {
    Area(AreaLight),
    Directional(DirectionalLight),
    Point(PointLight),
    Background(BackgroundLight),
}

impl Light {
    pub fn kind(&self) -> &'static str {
        match self {
            Light::Area(_) => "area",
            Light::Directional(_) => "directional",
            Light::Point(_) => "point",
            Light::Background(_) => "background",
        }
    }

    pub fn intensity(&self) -> Vec3 {
        match self {
            Light::Area(l) => l.intensity,
            Light::Directional(l) => l.intensity,
            Light::Point(l) => l.intensity,
            Light::Background(l) => l.radiance(),
        }
    }

    /// Delta lights cannot be hit by rays, only sampled.
    pub fn is_delta(&self) -> bool {
        matches!(self, Light::Directional(_) | Light::Point(_))
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Light::Area(_) | Light::Point(_))
    }

    /**
     * Samples the light as seen from `point`. `u` is a pair of uniform numbers in [0, 1)
     * and is ignored by delta lights. Returns None when the sample carries no light.
     */
    pub fn illuminate(&self, point: Vec3, u: Vec2) -> Option<Illumination> {
        match self {
            Light::Area(l) => l.illuminate(point, u),
            Light::Directional(l) => Some(Illumination {
                direction: -l.direction,
                distance: f32::INFINITY,
                radiance: l.intensity,
            }),
            Light::Point(l) => {
                let to_light = l.position - point;
                let dist_sqr = to_light.length_squared();
                let distance = dist_sqr.sqrt();

                Some(Illumination {
                    direction: to_light / distance,
                    distance,
                    radiance: l.intensity / dist_sqr,
                })
            }
            Light::Background(l) => Some(l.illuminate(u)),
        }
    }

    /// Scalar flux estimate; lights at infinity are measured through the scene sphere.
    pub fn power(&self, sphere: &SceneSphere) -> f32 {
        match self {
            Light::Area(l) => luminance(l.intensity) * PI / l.inv_area,
            Light::Point(l) => luminance(l.intensity) * 4.0 * PI,
            Light::Directional(l) => luminance(l.intensity) * PI * sphere.radius * sphere.radius,
            Light::Background(l) => {
                luminance(l.radiance()) * 4.0 * PI * PI * sphere.radius * sphere.radius
            }
        }
    }

    pub fn as_background(&self) -> Option<&BackgroundLight> {
        match self {
            Light::Background(l) => Some(l),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ceiling_light() -> AreaLight {
        // faces down, towards -Z
        AreaLight::new(
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::ONE,
        )
    }

    #[test]
    fn area_light_geometry() {
        let light = ceiling_light();
        assert_eq!(light.nrm, -Vec3::Z);
        assert_relative_eq!(light.inv_area, 2.0);
        assert_eq!(light.radiance(-Vec3::Z), Vec3::ONE);
        assert_eq!(light.radiance(Vec3::Z), Vec3::ZERO);
    }

    #[test]
    fn area_samples_stay_on_triangle() {
        let light = ceiling_light();
        for &(a, b) in &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.25, 0.5), (0.9, 0.1)] {
            let p = light.sample_point(Vec2::new(a, b));
            assert_relative_eq!(p.z, 2.0);
            assert!(p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn area_light_is_invisible_from_behind() {
        let light = Light::Area(ceiling_light());
        assert!(light.illuminate(Vec3::new(0.2, 0.2, 0.0), Vec2::splat(0.5)).is_some());
        assert!(light.illuminate(Vec3::new(0.2, 0.2, 4.0), Vec2::splat(0.5)).is_none());
    }

    #[test]
    fn point_light_falls_off_with_distance_squared() {
        let light = Light::Point(PointLight::new(Vec3::new(0.0, 0.0, 2.0), Vec3::splat(8.0)));
        let illum = light.illuminate(Vec3::ZERO, Vec2::ZERO).unwrap();

        assert_eq!(illum.direction, Vec3::Z);
        assert_relative_eq!(illum.distance, 2.0);
        assert_relative_eq!(illum.radiance.x, 2.0);
        assert!(light.is_delta() && light.is_finite());
    }

    #[test]
    fn directional_light_points_against_travel() {
        let light = Light::Directional(DirectionalLight::new(Vec3::new(-1.0, 1.0, -1.0), Vec3::ONE));
        let illum = light.illuminate(Vec3::ZERO, Vec2::ZERO).unwrap();

        assert!(illum.distance.is_infinite());
        assert_relative_eq!(illum.direction.length(), 1.0, epsilon = 1e-6);
        assert!(illum.direction.z > 0.0);
        assert!(light.is_delta() && !light.is_finite());
    }

    #[test]
    fn background_power_scales_with_scene_sphere() {
        let light = Light::Background(BackgroundLight::new(1.0));
        let small = SceneSphere::new(Vec3::ZERO, 1.0);
        let large = SceneSphere::new(Vec3::ZERO, 2.0);

        assert_relative_eq!(light.power(&large), 4.0 * light.power(&small), epsilon = 1e-3);
        assert!(light.as_background().is_some());
        assert!(!light.is_delta() && !light.is_finite());
    }
}
