use crate::core::color::Color;
use crate::core::math::linalg::{embed, project_divided};
use crate::core::math::transform::TransformStack;
use crate::core::pipeline::Shader;
use crate::error::Result;
use crate::scene::model::Model;
use nalgebra::{Matrix3, Vector3, Vector4};

/// Shadow pass shader: renders depth as seen from the light.
///
/// The rasterizer fills the shadow buffer as its depth target; the color
/// target receives a gray ramp of the same depth for inspection.
pub struct DepthShader<'a> {
    model: &'a Model,
    depth_range: f32,
    /// Screen-space vertices, one column per vertex.
    varying_tri: Matrix3<f32>,
}

impl<'a> DepthShader<'a> {
    /// `depth_range` is the viewport depth the gray ramp is normalized by.
    pub fn new(model: &'a Model, depth_range: f32) -> Self {
        Self {
            model,
            depth_range,
            varying_tri: Matrix3::zeros(),
        }
    }
}

impl Shader for DepthShader<'_> {
    fn vertex(&mut self, stack: &TransformStack, face: usize, nth: usize) -> Result<Vector4<f32>> {
        let clip = stack.combined() * embed(&self.model.vertex(face, nth)?);
        self.varying_tri.set_column(nth, &project_divided(&clip)?);
        Ok(clip)
    }

    fn fragment(&self, bar: Vector3<f32>) -> Result<Option<Color>> {
        let p = self.varying_tri * bar;
        Ok(Some(Color::WHITE.scaled(p.z / self.depth_range)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform::Viewport;
    use crate::scene::camera::Camera;
    use crate::scene::model::Face;
    use nalgebra::Vector2;

    #[test]
    fn gray_ramp_follows_screen_depth() {
        let model = Model::new(
            "tri",
            vec![
                Vector3::new(-0.5, -0.5, 1.0),
                Vector3::new(0.5, -0.5, 0.0),
                Vector3::new(0.0, 0.5, -1.0),
            ],
            vec![Vector2::zeros()],
            vec![Vector3::z()],
            vec![Face::new([0, 1, 2], [0, 0, 0], [0, 0, 0])],
        )
        .unwrap();
        let stack = TransformStack::configure(
            &Camera::default(),
            0.0,
            &Viewport::new(0.0, 0.0, 16.0, 16.0, 200.0),
        )
        .unwrap();

        let mut shader = DepthShader::new(&model, 200.0);
        for nth in 0..3 {
            shader.vertex(&stack, 0, nth).unwrap();
        }
        // z = 1 maps to the far end of the depth range, z = -1 to zero.
        assert_eq!(shader.fragment(Vector3::x()).unwrap(), Some(Color::WHITE));
        assert_eq!(shader.fragment(Vector3::z()).unwrap(), Some(Color::BLACK));
        assert_eq!(shader.fragment(Vector3::y()).unwrap(), Some(Color::gray(127)));
    }
}
