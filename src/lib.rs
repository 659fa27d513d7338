pub mod camera;
pub mod cornell_box;
pub mod geometry;
pub mod intersection;
pub mod light;
pub mod material;
pub mod renderer;
pub mod scene;
pub mod sphere;
pub mod transform;
pub mod triangle;
pub mod utils;

pub use cornell_box::{load_cornell_box, CornellBoxOptions, OptionConflict};
pub use geometry::{Accelerator, Geometry, Primitive};
pub use intersection::Intersection;
pub use light::Light;
pub use material::Material;
pub use scene::{Scene, SceneBuilder, SceneSphere};
