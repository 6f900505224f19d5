use crate::core::math::linalg::checked_normalize;
use crate::error::Result;
use crate::scene::camera::Camera;
use nalgebra::Vector3;

/// Below this `|direction x up|` the camera's up vector cannot orient the
/// light's view.
const PARALLEL_EPSILON: f32 = 1e-4;

/// A light source that is infinitely far away (e.g., Sun).
/// Rays are parallel; `direction` points from the scene towards the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    direction: Vector3<f32>,
}

impl DirectionalLight {
    /// Creates a directional light, normalizing `direction`.
    pub fn new(direction: Vector3<f32>) -> Result<Self> {
        Ok(Self {
            direction: checked_normalize(&direction)?,
        })
    }

    /// Unit vector towards the light.
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    /// The light's point of view for the shadow pass: it sits one unit from
    /// the scene camera's center along its direction and looks back at it.
    ///
    /// The scene camera's up vector is kept unless the light shines along
    /// it, in which case the world axis least aligned with the light is used.
    pub fn camera(&self, scene_camera: &Camera) -> Camera {
        let center = scene_camera.center;
        let up = if self.direction.cross(&scene_camera.up).norm() > PARALLEL_EPSILON {
            scene_camera.up
        } else {
            self.fallback_up()
        };
        Camera::new(center + self.direction, center, up)
    }

    fn fallback_up(&self) -> Vector3<f32> {
        let d = self.direction.abs();
        if d.x <= d.y && d.x <= d.z {
            Vector3::x()
        } else if d.y <= d.z {
            Vector3::y()
        } else {
            Vector3::z()
        }
    }
}
