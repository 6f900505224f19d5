use crate::core::color::Color;
use crate::core::framebuffer::PixelBuffer;
use crate::error::Result;
use crate::io::image::load_pixel_buffer;
use log::info;
use nalgebra::{Vector2, Vector3};
use std::path::Path;

/// Represents a 2D texture map stored with its origin at the bottom-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pixels: PixelBuffer,
}

impl Texture {
    /// Wraps a buffer whose rows already run bottom to top.
    pub fn new(pixels: PixelBuffer) -> Self {
        Self { pixels }
    }

    /// Loads an image file and flips it so that row 0 is the bottom row.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let mut pixels = load_pixel_buffer(path_ref)?;
        pixels.flip_vertically();

        info!(
            "Loaded texture: {:?} ({}x{}, {} channel(s))",
            path_ref,
            pixels.width(),
            pixels.height(),
            pixels.channels()
        );
        Ok(Self::new(pixels))
    }

    /// Nearest texel for a `[0, 1]` texture coordinate. Coordinates are
    /// scaled by the texture size and truncated; anything outside the map
    /// is clamped to the edge.
    pub fn texel(&self, uv: &Vector2<f32>) -> Result<Color> {
        let (x, y) = self.texel_coords(uv);
        self.pixels.get_color(x, y)
    }

    /// First channel of the nearest texel (for single-valued maps).
    pub fn value(&self, uv: &Vector2<f32>) -> Result<u8> {
        let (x, y) = self.texel_coords(uv);
        self.pixels.value(x, y)
    }

    /// Decodes a tangent-free normal map texel: each channel maps from
    /// `[0, 255]` to `[-1, 1]`.
    pub fn normal(&self, uv: &Vector2<f32>) -> Result<Vector3<f32>> {
        let c = self.texel(uv)?;
        let decode = |v: u8| v as f32 / 255.0 * 2.0 - 1.0;
        Ok(Vector3::new(decode(c.r), decode(c.g), decode(c.b)))
    }

    fn texel_coords(&self, uv: &Vector2<f32>) -> (i64, i64) {
        let clamp_axis = |t: f32, size: usize| -> i64 {
            let max = size.saturating_sub(1) as i64;
            if t.is_nan() {
                return 0;
            }
            ((t * size as f32).floor() as i64).clamp(0, max)
        };
        (
            clamp_axis(uv.x, self.pixels.width()),
            clamp_axis(uv.y, self.pixels.height()),
        )
    }
}
