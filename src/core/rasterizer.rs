use crate::core::framebuffer::PixelBuffer;
use crate::core::math::interpolation::{barycentric, fragment_depth, is_inside_triangle};
use crate::core::pipeline::Shader;
use crate::error::{RenderError, Result};
use nalgebra::{Point2, Vector4};

/// The Rasterizer scan-converts triangles into a color target and a
/// quantized depth target.
///
/// Candidate pixels are the integer points of the triangle's screen-space
/// bounding box, clipped to the target (scissor test). Each pixel is
/// sampled at its integer coordinate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rasterizer;

/// Integer pixel rectangle, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl BoundingBox {
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Rasterize a single triangle given its clip-space vertices.
    ///
    /// For every candidate pixel inside the triangle the fragment depth is
    /// interpolated and quantized, then tested against `depth`: a fragment is
    /// skipped when the stored value is strictly greater, so an equal depth
    /// passes and the later triangle wins. Surviving fragments run the
    /// shader's fragment stage; a returned color is written to `color` and
    /// the depth to `depth`, a discard leaves both untouched.
    ///
    /// # Returns
    /// - `usize`: the number of fragments written.
    pub fn rasterize_triangle<S: Shader + ?Sized>(
        &self,
        clip_coords: &[Vector4<f32>; 3],
        shader: &S,
        color: &mut PixelBuffer,
        depth: &mut PixelBuffer,
    ) -> Result<usize> {
        if !color.same_size(depth) {
            return Err(RenderError::DimensionMismatch(
                color.width(),
                color.height(),
                depth.width(),
                depth.height(),
            ));
        }
        if depth.channels() != 1 {
            return Err(RenderError::ChannelMismatch {
                expected: 1,
                actual: depth.channels(),
            });
        }

        // 1. Perspective division of x and y
        let mut screen = [Point2::origin(); 3];
        for (i, clip) in clip_coords.iter().enumerate() {
            if clip.w == 0.0 {
                return Err(RenderError::ZeroW);
            }
            screen[i] = Point2::new(clip.x / clip.w, clip.y / clip.w);
        }

        // 2. Bounding box with scissor test
        let bbox = Self::compute_bounding_box(&screen, color.width(), color.height());
        if bbox.is_empty() {
            return Ok(0);
        }

        // 3. Pixel loop
        let mut written = 0;
        for y in bbox.min_y..=bbox.max_y {
            for x in bbox.min_x..=bbox.max_x {
                let p = Point2::new(x as f32, y as f32);
                let bary = barycentric(screen[0], screen[1], screen[2], p);
                if !is_inside_triangle(&bary) {
                    continue;
                }

                let frag_depth = fragment_depth(clip_coords, &bary);
                if depth.value(x, y)? > frag_depth {
                    continue;
                }

                if let Some(frag_color) = shader.fragment(bary)? {
                    depth.set(x, y, &[frag_depth])?;
                    color.set_color(x, y, frag_color)?;
                    written += 1;
                }
            }
        }

        Ok(written)
    }

    /// Integer bounding box of three screen points, clipped to a
    /// `width` x `height` target.
    pub fn compute_bounding_box(points: &[Point2<f32>; 3], width: usize, height: usize) -> BoundingBox {
        let min_x = points[0].x.min(points[1].x).min(points[2].x).floor();
        let min_y = points[0].y.min(points[1].y).min(points[2].y).floor();
        let max_x = points[0].x.max(points[1].x).max(points[2].x).floor();
        let max_y = points[0].y.max(points[1].y).max(points[2].y).floor();

        let clamp = |v: f32, limit: usize| -> i64 {
            if v.is_nan() {
                return -1;
            }
            (v.max(-1.0).min(limit as f32)) as i64
        };

        BoundingBox {
            min_x: clamp(min_x, width).max(0),
            min_y: clamp(min_y, height).max(0),
            max_x: clamp(max_x, width).min(width as i64 - 1),
            max_y: clamp(max_y, height).min(height as i64 - 1),
        }
    }
}
