//! Frame input types

use std::path::PathBuf;

use crate::cloud_pipeline::annotation::AnnotationDocument;
use crate::cloud_pipeline::assembly::ColorImage;
use crate::cloud_pipeline::unproject::DepthImage;

/// Locations of the three inputs of one frame
#[derive(Debug, Clone)]
pub struct FrameSource {
    /// Color image (PNG or JPEG)
    pub color: PathBuf,
    /// Single-channel depth TIFF
    pub depth: PathBuf,
    /// Segmentation annotation JSON
    pub annotation: PathBuf,
}

impl FrameSource {
    pub fn new(color: impl Into<PathBuf>, depth: impl Into<PathBuf>, annotation: impl Into<PathBuf>) -> Self {
        Self {
            color: color.into(),
            depth: depth.into(),
            annotation: annotation.into(),
        }
    }
}

/// Decoded inputs of one frame
#[derive(Debug, Clone)]
pub struct FrameData {
    pub color: ColorImage,
    pub depth: DepthImage,
    pub annotation: AnnotationDocument,
}
