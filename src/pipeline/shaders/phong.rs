use crate::core::color::Color;
use crate::core::math::linalg::{checked_normalize, embed, embed_direction, invert_transpose, project};
use crate::core::math::transform::TransformStack;
use crate::core::pipeline::Shader;
use crate::error::Result;
use crate::scene::camera::Camera;
use crate::scene::model::Model;
use nalgebra::{Matrix2x3, Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// Default weight of the specular term relative to the diffuse term.
pub const DEFAULT_SPECULAR_WEIGHT: f32 = 0.6;

/// Per-pass lighting uniforms shared by the Blinn-Phong style shaders.
///
/// `M` is the rotation part of the view matrix and `MIT` the
/// inverse-transpose of `projection * M`. Lighting is evaluated about the
/// look-at center, so moving the camera and the scene together leaves the
/// shading unchanged. The light and view directions do not depend on the
/// fragment, so they (and the halfway vector) are resolved once here.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingUniforms {
    pub m: Matrix4<f32>,
    pub mit: Matrix4<f32>,
    /// Light direction carried through `M`.
    pub light: Vector3<f32>,
    /// View direction carried through `M`.
    pub view: Vector3<f32>,
    /// Normalized `light + view`.
    pub halfway: Vector3<f32>,
    pub specular_weight: f32,
}

impl LightingUniforms {
    /// Derives the uniforms from a configured eye-pass stack and the camera
    /// it was configured with.
    pub fn new(
        stack: &TransformStack,
        light_dir: &Vector3<f32>,
        camera: &Camera,
        specular_weight: f32,
    ) -> Result<Self> {
        let m = stack.view_rotation();
        let mit = invert_transpose(&(stack.projection() * m))?;
        let light = checked_normalize(&project(&(m * embed_direction(light_dir))))?;
        let view = checked_normalize(&project(&(m * embed_direction(&(camera.eye - camera.center)))))?;
        let halfway = checked_normalize(&(light + view))?;

        Ok(Self {
            m,
            mit,
            light,
            view,
            halfway,
            specular_weight,
        })
    }

    /// Diffuse plus weighted specular factor for a surface normal.
    ///
    /// `normal` is transformed by `MIT` and normalized. Without a specular
    /// exponent the specular term is 0.
    pub fn reflectance(&self, normal: &Vector3<f32>, specular: Option<f32>) -> Result<f32> {
        let n = checked_normalize(&project(&(self.mit * embed(normal))))?;
        let diff = n.dot(&self.light).max(0.0);
        let spec = match specular {
            Some(s) => n.dot(&self.halfway).max(0.0).powf(4.0 * s),
            None => 0.0,
        };
        Ok(diff + self.specular_weight * spec)
    }
}

/// `min(ambient + c * factor, 255)` for every channel.
pub(crate) fn shade(base: Color, ambient: f32, factor: f32) -> Color {
    base.map(|c| (ambient + c as f32 * factor).min(255.0) as u8)
}

/// Per-face varyings common to the texture-mapped shaders.
#[derive(Debug, Clone)]
pub(crate) struct SurfaceVaryings {
    /// Texture coordinates, one column per vertex.
    pub texcoords: Matrix2x3<f32>,
    /// Object-space vertex normals, one column per vertex.
    pub normals: Matrix3<f32>,
}

impl SurfaceVaryings {
    pub fn new() -> Self {
        Self {
            texcoords: Matrix2x3::zeros(),
            normals: Matrix3::zeros(),
        }
    }

    pub fn record(&mut self, model: &Model, face: usize, nth: usize) -> Result<()> {
        self.texcoords.set_column(nth, &model.texcoord(face, nth)?);
        self.normals.set_column(nth, &model.normal(face, nth)?);
        Ok(())
    }

    pub fn uv(&self, bar: &Vector3<f32>) -> Vector2<f32> {
        self.texcoords * bar
    }

    /// Normal-map normal at `uv`, falling back to the interpolated vertex
    /// normal.
    pub fn surface_normal(&self, model: &Model, uv: &Vector2<f32>, bar: &Vector3<f32>) -> Result<Vector3<f32>> {
        Ok(match model.normal_at(uv)? {
            Some(n) => n,
            None => self.normals * bar,
        })
    }
}

/// Blinn-Phong reflection without shadows.
pub struct BlinnPhongShader<'a> {
    model: &'a Model,
    uniforms: LightingUniforms,
    varyings: SurfaceVaryings,
    pub ambient: f32,
}

impl<'a> BlinnPhongShader<'a> {
    /// Default ambient term added to every channel.
    pub const AMBIENT: f32 = 5.0;

    pub fn new(model: &'a Model, uniforms: LightingUniforms) -> Self {
        Self {
            model,
            uniforms,
            varyings: SurfaceVaryings::new(),
            ambient: Self::AMBIENT,
        }
    }
}

impl Shader for BlinnPhongShader<'_> {
    fn vertex(&mut self, stack: &TransformStack, face: usize, nth: usize) -> Result<Vector4<f32>> {
        self.varyings.record(self.model, face, nth)?;
        Ok(stack.combined() * embed(&self.model.vertex(face, nth)?))
    }

    fn fragment(&self, bar: Vector3<f32>) -> Result<Option<Color>> {
        let uv = self.varyings.uv(&bar);
        let normal = self.varyings.surface_normal(self.model, &uv, &bar)?;
        let factor = self
            .uniforms
            .reflectance(&normal, self.model.specular(&uv)?)?;
        let base = self.model.diffuse(&uv)?;
        Ok(Some(shade(base, self.ambient, factor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform::Viewport;
    use crate::scene::camera::Camera;
    use crate::scene::model::Face;

    fn facing_triangle() -> Model {
        Model::new(
            "tri",
            vec![
                Vector3::new(-0.5, -0.5, 0.0),
                Vector3::new(0.5, -0.5, 0.0),
                Vector3::new(0.0, 0.5, 0.0),
            ],
            vec![Vector2::new(0.0, 0.0)],
            vec![Vector3::new(0.0, 0.0, 1.0)],
            vec![Face::new([0, 1, 2], [0, 0, 0], [0, 0, 0])],
        )
        .unwrap()
    }

    fn ortho_stack() -> TransformStack {
        TransformStack::configure(
            &Camera::default(),
            0.0,
            &Viewport::new(0.0, 0.0, 64.0, 64.0, 255.0),
        )
        .unwrap()
    }

    #[test]
    fn head_on_light_gives_full_diffuse() {
        let stack = ortho_stack();
        let uniforms = LightingUniforms::new(
            &stack,
            &Vector3::new(0.0, 0.0, 1.0),
            &Camera::default(),
            DEFAULT_SPECULAR_WEIGHT,
        )
        .unwrap();
        let factor = uniforms.reflectance(&Vector3::new(0.0, 0.0, 1.0), None).unwrap();
        assert!((factor - 1.0).abs() < 1e-5);
    }

    #[test]
    fn specular_adds_weighted_highlight() {
        let stack = ortho_stack();
        let uniforms = LightingUniforms::new(
            &stack,
            &Vector3::new(0.0, 0.0, 1.0),
            &Camera::default(),
            0.5,
        )
        .unwrap();
        let factor = uniforms.reflectance(&Vector3::new(0.0, 0.0, 1.0), Some(10.0)).unwrap();
        assert!((factor - 1.5).abs() < 1e-4);
    }

    #[test]
    fn light_opposite_view_is_rejected() {
        let stack = ortho_stack();
        let result = LightingUniforms::new(
            &stack,
            &Vector3::new(0.0, 0.0, -1.0),
            &Camera::default(),
            DEFAULT_SPECULAR_WEIGHT,
        );
        assert!(result.is_err());
    }

    #[test]
    fn shading_adds_ambient_and_saturates() {
        assert_eq!(shade(Color::new(100, 200, 0), 5.0, 1.0), Color::new(105, 205, 5));
        assert_eq!(shade(Color::WHITE, 5.0, 1.0), Color::WHITE);
    }

    #[test]
    fn white_triangle_lit_head_on() {
        let model = facing_triangle();
        let stack = ortho_stack();
        let uniforms = LightingUniforms::new(
            &stack,
            &Vector3::new(0.0, 0.0, 1.0),
            &Camera::default(),
            DEFAULT_SPECULAR_WEIGHT,
        )
        .unwrap();
        let mut shader = BlinnPhongShader::new(&model, uniforms);
        for nth in 0..3 {
            shader.vertex(&stack, 0, nth).unwrap();
        }
        let color = shader
            .fragment(Vector3::new(0.3, 0.3, 0.4))
            .unwrap()
            .unwrap();
        assert_eq!(color, Color::WHITE);
    }
}
