use crate::core::color::Color;
use crate::core::math::linalg::embed;
use crate::core::math::transform::TransformStack;
use crate::core::pipeline::Shader;
use crate::error::Result;
use crate::scene::model::Model;
use nalgebra::{Matrix2x3, Vector3, Vector4};

/// Per-vertex diffuse lighting, interpolated across the face.
pub struct GouraudShader<'a> {
    model: &'a Model,
    light_dir: Vector3<f32>,
    varying_intensity: Vector3<f32>,
    varying_texcoords: Matrix2x3<f32>,
}

impl<'a> GouraudShader<'a> {
    /// `light_dir` is expected to be normalized.
    pub fn new(model: &'a Model, light_dir: Vector3<f32>) -> Self {
        Self {
            model,
            light_dir,
            varying_intensity: Vector3::zeros(),
            varying_texcoords: Matrix2x3::zeros(),
        }
    }
}

impl Shader for GouraudShader<'_> {
    fn vertex(&mut self, stack: &TransformStack, face: usize, nth: usize) -> Result<Vector4<f32>> {
        self.varying_texcoords
            .set_column(nth, &self.model.texcoord(face, nth)?);
        self.varying_intensity[nth] = self.model.normal(face, nth)?.dot(&self.light_dir).max(0.0);
        Ok(stack.combined() * embed(&self.model.vertex(face, nth)?))
    }

    fn fragment(&self, bar: Vector3<f32>) -> Result<Option<Color>> {
        let intensity = self.varying_intensity.dot(&bar);
        let uv = self.varying_texcoords * bar;
        Ok(Some(self.model.diffuse(&uv)?.scaled(intensity)))
    }
}
