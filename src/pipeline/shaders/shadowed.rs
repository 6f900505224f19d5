use crate::core::color::Color;
use crate::core::framebuffer::PixelBuffer;
use crate::core::math::linalg::{embed, project_divided};
use crate::core::math::transform::TransformStack;
use crate::core::pipeline::Shader;
use crate::error::Result;
use crate::pipeline::shaders::phong::{LightingUniforms, SurfaceVaryings, shade};
use crate::scene::model::Model;
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// Default depth bias added to the reprojected depth before comparing it
/// with the shadow buffer. Suppresses self-shadowing acne.
pub const DEFAULT_SHADOW_BIAS: f32 = 43.34;

/// Attenuation applied to fragments the light cannot see.
pub const SHADOW_ATTENUATION: f32 = 0.3;

/// Blinn-Phong reflection attenuated by a shadow map.
pub struct ShadowedPhongShader<'a> {
    model: &'a Model,
    uniforms: LightingUniforms,
    /// Eye-pass screen space to shadow-pass screen space.
    m_shadow: Matrix4<f32>,
    shadow_buffer: &'a PixelBuffer,
    varyings: SurfaceVaryings,
    /// Eye-pass screen-space vertices, one column per vertex.
    varying_tri: Matrix3<f32>,
    pub bias: f32,
    pub ambient: f32,
}

impl<'a> ShadowedPhongShader<'a> {
    /// Default ambient term added to every channel.
    pub const AMBIENT: f32 = 1.0;

    pub fn new(
        model: &'a Model,
        uniforms: LightingUniforms,
        m_shadow: Matrix4<f32>,
        shadow_buffer: &'a PixelBuffer,
    ) -> Self {
        Self {
            model,
            uniforms,
            m_shadow,
            shadow_buffer,
            varyings: SurfaceVaryings::new(),
            varying_tri: Matrix3::zeros(),
            bias: DEFAULT_SHADOW_BIAS,
            ambient: Self::AMBIENT,
        }
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    /// `1.0` when the light sees `screen_point`, [`SHADOW_ATTENUATION`]
    /// otherwise. Points that reproject outside the shadow buffer are lit.
    pub fn shadow_factor(&self, screen_point: &Vector3<f32>) -> Result<f32> {
        let sb = project_divided(&(self.m_shadow * embed(screen_point)))?;
        let (x, y) = (sb.x as i64, sb.y as i64);
        if !self.shadow_buffer.contains(x, y) {
            return Ok(1.0);
        }
        let stored = self.shadow_buffer.value(x, y)? as f32;
        let lit = stored < sb.z + self.bias;
        Ok(if lit {
            1.0
        } else {
            SHADOW_ATTENUATION
        })
    }
}

impl Shader for ShadowedPhongShader<'_> {
    fn vertex(&mut self, stack: &TransformStack, face: usize, nth: usize) -> Result<Vector4<f32>> {
        self.varyings.record(self.model, face, nth)?;
        let clip = stack.combined() * embed(&self.model.vertex(face, nth)?);
        self.varying_tri.set_column(nth, &project_divided(&clip)?);
        Ok(clip)
    }

    fn fragment(&self, bar: Vector3<f32>) -> Result<Option<Color>> {
        let shadow = self.shadow_factor(&(self.varying_tri * bar))?;

        let uv = self.varyings.uv(&bar);
        let normal = self.varyings.surface_normal(self.model, &uv, &bar)?;
        let factor = self
            .uniforms
            .reflectance(&normal, self.model.specular(&uv)?)?;
        let base = self.model.diffuse(&uv)?;
        Ok(Some(shade(base, self.ambient, shadow * factor)))
    }
}
