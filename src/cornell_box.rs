use std::fmt;

use glam::{UVec2, Vec2, Vec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::geometry::Accelerator;
use crate::light::{AreaLight, BackgroundLight, DirectionalLight, Light, PointLight};
use crate::material::Material;
use crate::scene::{Scene, SceneBuilder};
use crate::sphere::Sphere;
use crate::triangle::Triangle;
use crate::utils::INV_PI;

// material table layout of the box
pub const MAT_LIGHT_A: usize = 0;
pub const MAT_LIGHT_B: usize = 1;
pub const MAT_GLOSSY_FLOOR: usize = 2;
pub const MAT_GREEN_WALL: usize = 3;
pub const MAT_RED_WALL: usize = 4;
pub const MAT_WHITE_WALL: usize = 5;
pub const MAT_MIRROR: usize = 6;
pub const MAT_GLASS: usize = 7;

pub const LARGE_BALL_RADIUS: f32 = 0.8;
pub const SMALL_BALL_RADIUS: f32 = 0.5;
pub const CEILING_INTENSITY: f32 = 0.95492965;

/// Corners of the box: 0..4 at the back (y max), 4..8 at the open front; z is up.
pub const BOX_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.27029, 1.30455, -1.28002),
    Vec3::new(1.28975, 1.30455, -1.28002),
    Vec3::new(1.28975, 1.30455, 1.28002),
    Vec3::new(-1.27029, 1.30455, 1.28002),
    Vec3::new(-1.27029, -1.25549, -1.28002),
    Vec3::new(1.28975, -1.25549, -1.28002),
    Vec3::new(1.28975, -1.25549, 1.28002),
    Vec3::new(-1.27029, -1.25549, 1.28002),
];

/// Optional features of the Cornell box test scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornellBoxOptions {
    pub ceiling_light: bool,
    pub sun_light: bool,
    pub point_light: bool,
    pub background_light: bool,
    pub large_mirror_ball: bool,
    pub large_glass_ball: bool,
    pub mirror_ball: bool,
    pub glass_ball: bool,
}

impl Default for CornellBoxOptions {
    fn default() -> CornellBoxOptions {
        CornellBoxOptions::from_mask(CornellBoxOptions::DEFAULT_MASK)
    }
}

/// Two requested options that cannot both be honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionConflict {
    BothLargeBalls,
}

impl fmt::Display for OptionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionConflict::BothLargeBalls => write!(f, "cannot have both large balls, using mirror"),
        }
    }
}

impl CornellBoxOptions {
    pub const LIGHT_CEILING: u32 = 1;
    pub const LIGHT_SUN: u32 = 2;
    pub const LIGHT_POINT: u32 = 4;
    pub const LIGHT_BACKGROUND: u32 = 8;
    pub const BALL_LARGE_MIRROR: u32 = 16;
    pub const BALL_LARGE_GLASS: u32 = 32;
    pub const BALL_MIRROR: u32 = 64;
    pub const BALL_GLASS: u32 = 128;
    pub const DEFAULT_MASK: u32 = Self::LIGHT_CEILING | Self::BALL_MIRROR | Self::BALL_GLASS;

    pub fn from_mask(mask: u32) -> CornellBoxOptions {
        let has = |bit: u32| mask & bit != 0;
        CornellBoxOptions {
            ceiling_light: has(Self::LIGHT_CEILING),
            sun_light: has(Self::LIGHT_SUN),
            point_light: has(Self::LIGHT_POINT),
            background_light: has(Self::LIGHT_BACKGROUND),
            large_mirror_ball: has(Self::BALL_LARGE_MIRROR),
            large_glass_ball: has(Self::BALL_LARGE_GLASS),
            mirror_ball: has(Self::BALL_MIRROR),
            glass_ball: has(Self::BALL_GLASS),
        }
    }

    pub fn mask(&self) -> u32 {
        [
            (self.ceiling_light, Self::LIGHT_CEILING),
            (self.sun_light, Self::LIGHT_SUN),
            (self.point_light, Self::LIGHT_POINT),
            (self.background_light, Self::LIGHT_BACKGROUND),
            (self.large_mirror_ball, Self::BALL_LARGE_MIRROR),
            (self.large_glass_ball, Self::BALL_LARGE_GLASS),
            (self.mirror_ball, Self::BALL_MIRROR),
            (self.glass_ball, Self::BALL_GLASS),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .fold(0, |mask, (_, bit)| mask | bit)
    }

    /// Drops options that clash. The large mirror ball wins over the large glass ball.
    pub fn resolve(self) -> (CornellBoxOptions, Option<OptionConflict>) {
        if self.large_mirror_ball && self.large_glass_ball {
            let resolved = CornellBoxOptions {
                large_glass_ball: false,
                ..self
            };
            return (resolved, Some(OptionConflict::BothLargeBalls));
        }

        (self, None)
    }
}

fn box_camera(resolution: UVec2) -> Camera {
    Camera::setup(
        Vec3::new(-0.0439815, -4.12529, 0.222539),
        Vec3::new(0.00688625, 0.998505, -0.0542161),
        Vec3::new(3.73896e-4, 0.0542148, 0.998529),
        resolution.as_vec2(),
        45.0,
    )
}

/**
 * Assembles the Cornell box: five walls of two triangles each (the front is open),
 * optional balls and optional lights. Conflicting options are resolved first; the
 * resolved scene is built regardless and the conflict, if any, is logged and handed back
 * to the caller next to the scene.
 */
pub fn load_cornell_box(
    resolution: UVec2,
    options: CornellBoxOptions,
    accel: Accelerator,
) -> anyhow::Result<(Scene, Option<OptionConflict>)> {
    let (options, conflict) = options.resolve();
    if let Some(conflict) = &conflict {
        warn!("{}", conflict);
    }

    let mut builder = SceneBuilder::new(box_camera(resolution));

    // materials, in table order
    // 0) and 1) only ever emit, their reflectance stays black
    builder.add_material(Material::default());
    builder.add_material(Material::default());
    builder.add_material(Material::glossy(Vec3::splat(0.3), Vec3::splat(0.4), 10.0));
    builder.add_material(Material::diffuse(Vec3::new(0.156863, 0.803922, 0.172549)));
    builder.add_material(Material::diffuse(Vec3::new(0.803922, 0.152941, 0.152941)));
    builder.add_material(Material::diffuse(Vec3::splat(0.803922)));
    builder.add_material(Material::mirror());
    builder.add_material(Material::glass(1.6));

    let p = BOX_CORNERS;

    // floor
    builder.add_primitive(Triangle::new(p[0], p[4], p[5], MAT_WHITE_WALL));
    builder.add_primitive(Triangle::new(p[5], p[1], p[0], MAT_WHITE_WALL));

    // back wall
    builder.add_primitive(Triangle::new(p[0], p[1], p[2], MAT_WHITE_WALL));
    builder.add_primitive(Triangle::new(p[2], p[3], p[0], MAT_WHITE_WALL));

    // ceiling, plain white when it does not emit
    let (ceiling_a, ceiling_b) = if options.ceiling_light {
        (MAT_LIGHT_A, MAT_LIGHT_B)
    } else {
        (MAT_WHITE_WALL, MAT_WHITE_WALL)
    };
    builder.add_primitive(Triangle::new(p[2], p[6], p[7], ceiling_a));
    builder.add_primitive(Triangle::new(p[7], p[3], p[2], ceiling_b));

    // left wall
    builder.add_primitive(Triangle::new(p[3], p[7], p[4], MAT_GREEN_WALL));
    builder.add_primitive(Triangle::new(p[4], p[0], p[3], MAT_GREEN_WALL));

    // right wall
    builder.add_primitive(Triangle::new(p[1], p[5], p[6], MAT_RED_WALL));
    builder.add_primitive(Triangle::new(p[6], p[2], p[1], MAT_RED_WALL));

    // large ball resting on the middle of the floor
    let center = (p[0] + p[1] + p[4] + p[5]) * 0.25 + Vec3::new(0.0, 0.0, LARGE_BALL_RADIUS);
    if options.large_mirror_ball {
        debug!("adding large mirror ball at {}", center);
        builder.add_primitive(Sphere::new(center, LARGE_BALL_RADIUS, MAT_MIRROR));
    }
    if options.large_glass_ball {
        debug!("adding large glass ball at {}", center);
        builder.add_primitive(Sphere::new(center, LARGE_BALL_RADIUS, MAT_GLASS));
    }

    // small balls, pulled in from the side walls by 2/7 of the box width
    let left_wall_center = (p[0] + p[4]) * 0.5 + Vec3::new(0.0, 0.0, SMALL_BALL_RADIUS);
    let right_wall_center = (p[1] + p[5]) * 0.5 + Vec3::new(0.0, 0.0, SMALL_BALL_RADIUS);
    let xlen = right_wall_center.x - left_wall_center.x;
    let left_ball_center = left_wall_center + Vec3::new(2.0 * xlen / 7.0, 0.0, 0.0);
    let right_ball_center = right_wall_center - Vec3::new(2.0 * xlen / 7.0, 0.0, 0.0);
    if options.mirror_ball {
        debug!("adding mirror ball at {}", left_ball_center);
        builder.add_primitive(Sphere::new(left_ball_center, SMALL_BALL_RADIUS, MAT_MIRROR));
    }
    if options.glass_ball {
        debug!("adding glass ball at {}", right_ball_center);
        builder.add_primitive(Sphere::new(right_ball_center, SMALL_BALL_RADIUS, MAT_GLASS));
    }

    // lights
    if options.ceiling_light {
        let intensity = Vec3::splat(CEILING_INTENSITY);
        let a = builder.add_light(Light::Area(AreaLight::new(p[2], p[6], p[7], intensity)));
        builder.bind_material_to_light(MAT_LIGHT_A, a);
        let b = builder.add_light(Light::Area(AreaLight::new(p[7], p[3], p[2], intensity)));
        builder.bind_material_to_light(MAT_LIGHT_B, b);
    }

    if options.sun_light {
        builder.add_light(Light::Directional(DirectionalLight::new(
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(0.5, 0.2, 0.0) * 1.5,
        )));
    }

    if options.point_light {
        builder.add_light(Light::Point(PointLight::new(
            Vec3::new(0.0, -0.5, 1.0),
            Vec3::splat(70.0 * (INV_PI * 0.25)),
        )));
    }

    if options.background_light {
        builder.set_background(BackgroundLight::new(1.0));
    }

    let scene = builder.build(accel)?;
    Ok((scene, conflict))
}
