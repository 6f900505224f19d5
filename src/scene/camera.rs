use crate::core::math::transform::perspective_coeff;
use crate::error::Result;
use nalgebra::Vector3;

/// A look-at camera: where it sits, what it looks at, and which way is up.
///
/// The same type describes the light's point of view during the shadow pass,
/// with the light direction used as the eye position.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vector3<f32>,
    pub center: Vector3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new(eye: Vector3<f32>, center: Vector3<f32>, up: Vector3<f32>) -> Self {
        Self { eye, center, up }
    }

    /// Projection coefficient `-1 / distance` for a perspective view.
    pub fn perspective_coeff(&self) -> Result<f32> {
        perspective_coeff(&self.eye, &self.center)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vector3::new(0.0, 0.0, 3.0),
            Vector3::zeros(),
            Vector3::new(0.0, 1.0, 0.0),
        )
    }
}
