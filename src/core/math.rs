pub mod interpolation;
pub mod linalg;
pub mod transform;
