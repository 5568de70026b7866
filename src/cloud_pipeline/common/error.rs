use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode input: {0}")]
    DecodeError(String),

    #[error("Failed to encode point cloud: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Grid shape mismatch: expected {expected:?} (height, width), got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Unknown shape kind: {0}")]
    UnknownShapeKind(String),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid camera intrinsics: {0}")]
    InvalidIntrinsics(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Point cloud is empty: {0}")]
    EmptyCloud(String),

    #[error("Unknown geometry: {0}")]
    UnknownGeometry(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
