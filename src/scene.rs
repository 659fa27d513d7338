use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, ensure};
use bvh::aabb::AABB;
use bvh::ray::Ray;
use glam::Vec3;
use log::info;
use serde::Serialize;

use crate::camera::Camera;
use crate::geometry::{Accelerator, Geometry, Primitive};
use crate::intersection::Intersection;
use crate::light::{BackgroundLight, Light};
use crate::material::Material;
use crate::utils::EPS_RAY;

/// Sphere bounding the whole scene, used to normalize lights placed at infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneSphere {
    pub center: Vec3,
    pub radius: f32,
    pub inv_radius_sqr: f32,
}

impl SceneSphere {
    pub fn new(center: Vec3, radius: f32) -> SceneSphere {
        SceneSphere {
            center,
            radius,
            inv_radius_sqr: 1.0 / (radius * radius),
        }
    }

    /**
     * Center is the midpoint of the geometry's bounding box, radius is half of the box's
     * full 3D diagonal. Fails when the geometry covers no space at all.
     */
    pub fn from_geometry(geometry: &dyn Geometry) -> anyhow::Result<SceneSphere> {
        let mut bbox = AABB::empty();
        geometry.grow_bbox(&mut bbox);

        ensure!(
            bbox.min.cmple(bbox.max).all(),
            "cannot bound a scene without geometry"
        );

        let diagonal_sqr = (bbox.max - bbox.min).length_squared();
        Ok(SceneSphere::new((bbox.max + bbox.min) * 0.5, diagonal_sqr.sqrt() * 0.5))
    }
}

/**
 * Renderable scene: geometry, material table, light table and the material to light
 * links that mark emissive surfaces. Immutable once built, so queries can run from any
 * number of threads at once.
 */
pub struct Scene {
    geometry: Box<dyn Geometry + Send + Sync>,
    camera: Camera,
    materials: Vec<Material>,
    lights: Vec<Light>,
    material_to_light: HashMap<usize, usize>,
    scene_sphere: SceneSphere,
    background: Option<usize>,
}

impl Scene {
    /// Nearest hit along the ray, with `light_id` set when the surface hit is emissive.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let mut isect = self.geometry.intersect(ray, f32::INFINITY)?;
        isect.light_id = self.material_light(isect.mat_id);
        Some(isect)
    }

    /**
     * True if any geometry lies strictly between `point` and `point + dir * t_max`.
     * `dir` need not be unit length. The origin is pushed off its surface by `EPS_RAY` and
     * the far end pulled in by the same amount, so a surface sitting exactly at the end of
     * the segment (the light being tested) never occludes itself.
     */
    pub fn occluded(&self, point: Vec3, dir: Vec3, t_max: f32) -> bool {
        let len = dir.length();
        debug_assert!(len > 0.0, "occlusion test along a zero direction");

        // distances are measured along the unit direction
        let unit = dir / len;
        let ray = Ray::new(point + unit * EPS_RAY, unit);
        self.geometry.intersect_p(&ray, t_max * len - 2.0 * EPS_RAY)
    }

    pub fn material(&self, mat_id: usize) -> &Material {
        &self.materials[mat_id]
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Light by id. Ids past the end resolve to the last light; None only for a scene without lights.
    pub fn light(&self, light_id: usize) -> Option<&Light> {
        let last = self.lights.len().checked_sub(1)?;
        self.lights.get(light_id.min(last))
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Emitting light of a material, if the material is bound to one.
    pub fn material_light(&self, mat_id: usize) -> Option<usize> {
        self.material_to_light.get(&mat_id).copied()
    }

    pub fn material_to_light(&self) -> &HashMap<usize, usize> {
        &self.material_to_light
    }

    pub fn geometry(&self) -> &(dyn Geometry + Send + Sync) {
        self.geometry.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene_sphere(&self) -> &SceneSphere {
        &self.scene_sphere
    }

    pub fn background(&self) -> Option<&BackgroundLight> {
        self.background
            .and_then(|id| self.lights.get(id))
            .and_then(Light::as_background)
    }

    pub fn background_id(&self) -> Option<usize> {
        self.background
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            primitive_count: self.geometry.primitive_count(),
            material_count: self.material_count(),
            light_count: self.light_count(),
            lights: self
                .lights
                .iter()
                .map(|light| LightSummary {
                    kind: light.kind(),
                    intensity: light.intensity(),
                    power: light.power(&self.scene_sphere),
                })
                .collect(),
            material_to_light: self.material_to_light.iter().map(|(&m, &l)| (m, l)).collect(),
            background: self.background,
            scene_sphere: self.scene_sphere,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LightSummary {
    pub kind: &'static str,
    pub intensity: Vec3,
    pub power: f32,
}

#[derive(Debug, Serialize)]
pub struct SceneSummary {
    pub primitive_count: usize,
    pub material_count: usize,
    pub light_count: usize,
    pub lights: Vec<LightSummary>,
    pub material_to_light: BTreeMap<usize, usize>,
    pub background: Option<usize>,
    pub scene_sphere: SceneSphere,
}

/// Collects scene contents; ids are handed out densely in insertion order.
pub struct SceneBuilder {
    camera: Camera,
    materials: Vec<Material>,
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    material_to_light: HashMap<usize, usize>,
    backgrounds: Vec<usize>,
}

impl SceneBuilder {
    pub fn new(camera: Camera) -> SceneBuilder {
        SceneBuilder {
            camera,
            materials: Vec::new(),
            primitives: Vec::new(),
            lights: Vec::new(),
            material_to_light: HashMap::new(),
            backgrounds: Vec::new(),
        }
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_primitive(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    /// Appends the background to the light table and marks it as the scene's environment.
    pub fn set_background(&mut self, background: BackgroundLight) -> usize {
        let id = self.add_light(Light::Background(background));
        self.backgrounds.push(id);
        id
    }

    /// Marks every surface using `mat_id` as the emitter of light `light_id`.
    pub fn bind_material_to_light(&mut self, mat_id: usize, light_id: usize) {
        self.material_to_light.insert(mat_id, light_id);
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.primitives.is_empty(), "scene has no geometry");

        for prim in &self.primitives {
            ensure!(
                prim.mat_id() < self.materials.len(),
                "primitive references material {} but only {} exist",
                prim.mat_id(),
                self.materials.len()
            );
        }

        for (&mat_id, &light_id) in &self.material_to_light {
            let Some(material) = self.materials.get(mat_id) else {
                bail!("light {} is bound to missing material {}", light_id, mat_id);
            };
            ensure!(
                material.is_black(),
                "material {} is bound to light {} but also reflects light",
                mat_id,
                light_id
            );
            ensure!(
                light_id < self.lights.len(),
                "material {} is bound to missing light {}",
                mat_id,
                light_id
            );
        }

        ensure!(
            self.backgrounds.len() <= 1,
            "scene has {} background lights, at most one is allowed",
            self.backgrounds.len()
        );

        Ok(())
    }

    pub fn build(self, accel: Accelerator) -> anyhow::Result<Scene> {
        self.validate()?;

        let geometry = accel.build(self.primitives);
        // bounds are taken last, over the finished aggregate
        let scene_sphere = SceneSphere::from_geometry(geometry.as_ref())?;

        info!(
            "scene built: {} primitives, {} materials, {} lights, radius {:.4}",
            geometry.primitive_count(),
            self.materials.len(),
            self.lights.len(),
            scene_sphere.radius
        );

        Ok(Scene {
            geometry,
            camera: self.camera,
            materials: self.materials,
            lights: self.lights,
            material_to_light: self.material_to_light,
            scene_sphere,
            background: self.backgrounds.first().copied(),
        })
    }
}
