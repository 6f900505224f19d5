use std::path::PathBuf;
use thiserror::Error;

/// Every failure the pipeline can report.
///
/// Rendering is a single offline shot with no recovery path, so all of these
/// are fatal to the frame being produced.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{what} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    PixelOutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    #[error("expected {expected} channel(s), got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("unsupported channel count {0} (only 1 and 3 are supported)")]
    UnsupportedChannels(usize),

    #[error("buffer dimensions differ: {0}x{1} vs {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    #[error("cannot normalize a zero-length vector")]
    ZeroVector,

    #[error("matrix is singular and cannot be inverted")]
    SingularMatrix,

    #[error("homogeneous w is zero (vertex lies on the eye plane)")]
    ZeroW,

    #[error("model '{0}' contains no faces")]
    EmptyModel(String),

    #[error("failed to load OBJ '{path}': {source}")]
    ObjLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("image I/O failed for '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
