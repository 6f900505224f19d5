use crate::core::color::Color;
use crate::error::{RenderError, Result};

/// A width x height grid of 8-bit pixels with 1 (gray/depth) or 3 (RGB)
/// channels per pixel.
///
/// The origin is the bottom-left corner; rows are stored bottom to top.
/// Flip the buffer vertically before handing it to a top-left image format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a zero-filled buffer.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        Self::check_channels(channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0; width * height * channels],
        })
    }

    /// Wraps raw bytes laid out row by row, bottom row first.
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        Self::check_channels(channels)?;
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(RenderError::IndexOutOfBounds {
                what: "pixel data",
                index: data.len(),
                len: expected,
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    fn check_channels(channels: usize) -> Result<()> {
        match channels {
            1 | 3 => Ok(()),
            n => Err(RenderError::UnsupportedChannels(n)),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn offset(&self, x: i64, y: i64) -> Result<usize> {
        if !self.contains(x, y) {
            return Err(RenderError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y as usize * self.width + x as usize) * self.channels)
    }

    /// Channels of the pixel at (x, y).
    pub fn get(&self, x: i64, y: i64) -> Result<&[u8]> {
        let start = self.offset(x, y)?;
        Ok(&self.data[start..start + self.channels])
    }

    /// Overwrites the pixel at (x, y); `value` must carry exactly
    /// `channels()` bytes.
    pub fn set(&mut self, x: i64, y: i64, value: &[u8]) -> Result<()> {
        if value.len() != self.channels {
            return Err(RenderError::ChannelMismatch {
                expected: self.channels,
                actual: value.len(),
            });
        }
        let start = self.offset(x, y)?;
        self.data[start..start + self.channels].copy_from_slice(value);
        Ok(())
    }

    /// First channel of the pixel at (x, y). For depth and shadow buffers
    /// this is the stored depth.
    pub fn value(&self, x: i64, y: i64) -> Result<u8> {
        let start = self.offset(x, y)?;
        Ok(self.data[start])
    }

    pub fn get_color(&self, x: i64, y: i64) -> Result<Color> {
        let pixel = self.get(x, y)?;
        Color::from_channels(pixel).ok_or(RenderError::UnsupportedChannels(pixel.len()))
    }

    /// Writes a color, reduced to its luminance on single-channel buffers.
    pub fn set_color(&mut self, x: i64, y: i64, color: Color) -> Result<()> {
        match self.channels {
            1 => self.set(x, y, &[color.luminance()]),
            _ => self.set(x, y, &color.to_array()),
        }
    }

    /// Reverses the row order in place.
    pub fn flip_vertically(&mut self) {
        let row = self.width * self.channels;
        if row == 0 {
            return;
        }
        let half = self.height / 2;
        for y in 0..half {
            let (top, bottom) = self.data.split_at_mut((self.height - 1 - y) * row);
            top[y * row..(y + 1) * row].swap_with_slice(&mut bottom[..row]);
        }
    }

    /// True when `other` has the same width and height.
    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }
}
