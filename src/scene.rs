pub mod camera;
pub mod light;
pub mod model;
pub mod texture;
