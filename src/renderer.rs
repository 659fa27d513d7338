use bvh::ray::Ray;
use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::intersection::Intersection;
use crate::light::Light;
use crate::scene::Scene;
use crate::utils::{reflect, refract, EPS_RAY, INV_PI};

const RESULT_NULL: Vec3 = Vec3::ZERO;
const MAX_DEPTH: u8 = 4;

/**
 * Direct lighting preview. Talks to the scene only through its query interface, so it
 * doubles as a smoke test of what an integrator needs from a scene.
 */
pub struct Raytracer<'a> {
    scene: &'a Scene,
    rng: StdRng,
}

impl<'a> Raytracer<'a> {
    pub fn new(scene: &'a Scene, seed: u64) -> Raytracer<'a> {
        Raytracer {
            scene,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn render(&mut self, spp: u32) -> RgbImage {
        let res = self.scene.camera().resolution;
        let (width, height) = (res.x as u32, res.y as u32);
        let mut img = RgbImage::new(width, height);
        let spp = spp.max(1);

        for y in 0..height {
            for x in 0..width {
                let mut color = RESULT_NULL;
                for _ in 0..spp {
                    let jitter: Vec2 = Vec2::new(self.rng.gen(), self.rng.gen());
                    let ray = self.scene.camera().calc_ray(x as f32 + jitter.x, y as f32 + jitter.y);
                    color += self.trace(&ray, 0);
                }
                img.put_pixel(x, y, to_rgb(color / spp as f32));
            }
        }

        return img;
    }

    pub fn trace(&mut self, ray: &Ray, n: u8) -> Vec3 {
        // limit recursion
        if n > MAX_DEPTH {
            return RESULT_NULL;
        }

        let isect = match self.scene.intersect(ray) {
            Some(isect) => isect,
            None => {
                return match self.scene.background() {
                    Some(background) => background.radiance(),
                    None => RESULT_NULL,
                };
            }
        };

        let pos = ray.origin + ray.direction * isect.dist;

        // emitters are only visible to camera and specular rays, light sampling covers the rest
        if let Some(light_id) = isect.light_id {
            return match self.scene.light(light_id) {
                Some(Light::Area(area)) => area.radiance(-ray.direction),
                _ => RESULT_NULL,
            };
        }

        let mat = *self.scene.material(isect.mat_id);

        if mat.is_delta() {
            return self.trace_specular(ray, &isect, pos, n) * mat.mirror_reflectance;
        }

        let mut result = RESULT_NULL;
        let light_count = self.scene.light_count();
        if light_count > 0 {
            // uniform light choice, the accessor clamps the rare id == count
            let pick = (self.rng.gen::<f32>() * light_count as f32) as usize;
            let u = Vec2::new(self.rng.gen(), self.rng.gen());

            let sample = self
                .scene
                .light(pick)
                .and_then(|light| light.illuminate(pos, u));

            if let Some(illum) = sample {
                let cos_theta = isect.nrm.dot(illum.direction);
                if cos_theta > 0.0 && !self.scene.occluded(pos, illum.direction, illum.distance) {
                    let half = (illum.direction - ray.direction).normalize();
                    let glossy = mat.phong_reflectance
                        * (mat.phong_exponent + 2.0)
                        * 0.5
                        * INV_PI
                        * isect.nrm.dot(half).max(0.0).powf(mat.phong_exponent);
                    let brdf = mat.diffuse_reflectance * INV_PI + glossy;
                    result += brdf * illum.radiance * cos_theta * light_count as f32;
                }
            }
        }

        return result;
    }

    fn trace_specular(&mut self, ray: &Ray, isect: &Intersection, pos: Vec3, n: u8) -> Vec3 {
        let mat = self.scene.material(isect.mat_id);

        let dir = match mat.ior {
            Some(ior) => {
                let eta = if isect.inside { ior } else { 1.0 / ior };
                refract(&ray.direction, &isect.nrm, eta)
                    .unwrap_or_else(|| reflect(&ray.direction, &isect.nrm))
            }
            None => reflect(&ray.direction, &isect.nrm),
        };

        let next = Ray::new(pos + dir * EPS_RAY, dir);
        return self.trace(&next, n + 1);
    }
}

fn to_rgb(color: Vec3) -> Rgb<u8> {
    let gamma = |c: f32| (c.max(0.0).powf(1.0 / 2.2).min(1.0) * 255.0 + 0.5) as u8;
    Rgb([gamma(color.x), gamma(color.y), gamma(color.z)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_rgb_clamps_and_applies_gamma() {
        assert_eq!(to_rgb(Vec3::ZERO), Rgb([0, 0, 0]));
        assert_eq!(to_rgb(Vec3::splat(4.0)), Rgb([255, 255, 255]));
        assert_eq!(to_rgb(Vec3::new(-1.0, 1.0, 0.0)), Rgb([0, 255, 0]));

        let mid = to_rgb(Vec3::splat(0.218));
        assert!(mid.0[0] > 120 && mid.0[0] < 135);
    }
}
