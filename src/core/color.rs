/// An 8-bit RGB color as stored in images and pixel buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A gray with all three channels set to `value`.
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    /// Scales every channel by `intensity`, which is clamped to `[0, 1]`
    /// first. Results are truncated, like a plain float-to-byte cast.
    pub fn scaled(&self, intensity: f32) -> Self {
        let k = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
        self.map(|c| (c as f32 * k) as u8)
    }

    /// Applies `f` to every channel.
    pub fn map<F: Fn(u8) -> u8>(&self, f: F) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Builds a color from a pixel slice: one channel is read as gray,
    /// three as RGB. Other lengths yield `None`.
    pub fn from_channels(channels: &[u8]) -> Option<Self> {
        match *channels {
            [v] => Some(Self::gray(v)),
            [r, g, b] => Some(Self::new(r, g, b)),
            _ => None,
        }
    }

    /// Average of the three channels, used when a color is written to a
    /// single-channel target.
    pub fn luminance(&self) -> u8 {
        ((self.r as u16 + self.g as u16 + self.b as u16) / 3) as u8
    }
}
