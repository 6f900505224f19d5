use crate::core::framebuffer::PixelBuffer;
use crate::error::{RenderError, Result};
use image::ExtendedColorType;
use log::{debug, info};
use std::path::Path;

/// Writes a buffer to disk, row 0 first, in the format implied by the
/// file extension. One-channel buffers become 8-bit grayscale images.
///
/// Buffers kept with a bottom-left origin should be flipped first.
pub fn save_pixel_buffer<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let color_type = match buffer.channels() {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        n => return Err(RenderError::UnsupportedChannels(n)),
    };

    image::save_buffer(
        path,
        buffer.as_raw(),
        buffer.width() as u32,
        buffer.height() as u32,
        color_type,
    )
    .map_err(|source| RenderError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Saved {}x{} image to {:?}",
        buffer.width(),
        buffer.height(),
        path
    );
    Ok(())
}

/// Reads any image the `image` crate can decode. Grayscale images load as
/// one channel, everything else as RGB (alpha dropped). Rows keep the file
/// order, top row first.
pub fn load_pixel_buffer<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| RenderError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    let (width, height) = (img.width() as usize, img.height() as usize);
    debug!("Decoding {:?} ({:?})", path, img.color());

    if img.color().has_color() {
        PixelBuffer::from_raw(width, height, 3, img.to_rgb8().into_raw())
    } else {
        PixelBuffer::from_raw(width, height, 1, img.to_luma8().into_raw())
    }
}
