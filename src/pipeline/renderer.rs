use crate::core::framebuffer::PixelBuffer;
use crate::core::math::transform::TransformStack;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::Rasterizer;
use crate::error::Result;
use crate::scene::model::Model;
use log::debug;
use nalgebra::Vector4;

/// Owns a color target and its depth target and draws models into them.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub color: PixelBuffer,
    pub depth: PixelBuffer,
}

impl Renderer {
    /// Creates a renderer with a zeroed color target of `channels` channels
    /// and a zeroed (farthest) depth target.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        Ok(Self {
            rasterizer: Rasterizer::new(),
            color: PixelBuffer::new(width, height, channels)?,
            depth: PixelBuffer::new(width, height, 1)?,
        })
    }

    /// Draws every face of `model`: the vertex stage runs for the three
    /// corners in order, then the triangle is rasterized with the same
    /// shader instance.
    ///
    /// # Returns
    /// * `usize` - fragments written across all faces.
    pub fn draw_model<S: Shader>(
        &mut self,
        model: &Model,
        stack: &TransformStack,
        shader: &mut S,
    ) -> Result<usize> {
        let mut written = 0;
        for face in 0..model.nfaces() {
            let mut clip_coords = [Vector4::zeros(); 3];
            for (nth, clip) in clip_coords.iter_mut().enumerate() {
                *clip = shader.vertex(stack, face, nth)?;
            }

            written += self.rasterizer.rasterize_triangle(
                &clip_coords,
                &*shader,
                &mut self.color,
                &mut self.depth,
            )?;
        }

        debug!(
            "Drew {} faces of '{}', {} fragments written",
            model.nfaces(),
            model.name(),
            written
        );
        Ok(written)
    }

    /// Hands back the color and depth targets.
    pub fn into_buffers(self) -> (PixelBuffer, PixelBuffer) {
        (self.color, self.depth)
    }
}
