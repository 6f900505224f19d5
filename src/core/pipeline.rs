use crate::core::color::Color;
use crate::core::math::transform::TransformStack;
use crate::error::Result;
use nalgebra::{Vector3, Vector4};

/// Shader represents the programmable stages of the pipeline.
///
/// An instance carries its own varyings (written column by column by the
/// vertex stage for the three vertices of the current face) and its
/// per-pass uniforms. One instance is built per pass.
pub trait Shader {
    /// Vertex shader stage.
    ///
    /// Transforms vertex `nth` (0..3) of face `face` with the stack's
    /// combined matrix and records whatever the fragment stage will need in
    /// varying column `nth`.
    ///
    /// # Returns
    /// - `Vector4<f32>`: clip-space position (screen space before the divide).
    fn vertex(&mut self, stack: &TransformStack, face: usize, nth: usize) -> Result<Vector4<f32>>;

    /// Fragment shader stage.
    ///
    /// `bar` holds the screen-space barycentric weights of the fragment with
    /// respect to the three vertices last passed through [`Shader::vertex`].
    ///
    /// # Returns
    /// - `Some(color)`: the fragment is written.
    /// - `None`: the fragment is discarded; neither color nor depth change.
    fn fragment(&self, bar: Vector3<f32>) -> Result<Option<Color>>;
}
