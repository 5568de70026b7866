//! Point cloud and color types

use crate::cloud_pipeline::common::error::{PipelineError, Result};

/// RGB8 color image, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorImage {
    /// Height of the image in pixels
    pub height: usize,
    /// Width of the image in pixels
    pub width: usize,
    /// `[R, G, B]` per pixel
    pub data: Vec<[u8; 3]>,
}

impl ColorImage {
    pub fn new(height: usize, width: usize, data: Vec<[u8; 3]>) -> Result<Self> {
        if data.len() != height * width {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        Ok(Self { height, width, data })
    }

    /// Builds an image from interleaved `[R, G, B, R, G, B, ...]` bytes.
    pub fn from_interleaved(height: usize, width: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != height * width * 3 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        let data = bytes.chunks_exact(3).map(|px| [px[0], px[1], px[2]]).collect();
        Ok(Self { height, width, data })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// How 8-bit color channels are mapped to floating point point colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorNormalization {
    /// `rgb / 255`, giving colors in `[0, 1]`
    #[default]
    Unit,
    /// `(rgb - 255) / 255`, giving colors in `[-1, 0]`. Matches the output of
    /// the reference demo for side-by-side comparison; renderers expecting
    /// `[0, 1]` will show these colors inverted.
    ReferenceInverted,
}

impl ColorNormalization {
    #[inline]
    pub fn normalize(self, rgb: [u8; 3]) -> [f64; 3] {
        rgb.map(|c| match self {
            ColorNormalization::Unit => c as f64 / 255.0,
            ColorNormalization::ReferenceInverted => (c as f64 - 255.0) / 255.0,
        })
    }

    /// Maps a normalized color back into `[0, 1]`.
    #[inline]
    pub fn to_unit(self, color: [f64; 3]) -> [f64; 3] {
        color.map(|c| match self {
            ColorNormalization::Unit => c,
            ColorNormalization::ReferenceInverted => c + 1.0,
        })
    }
}

/// Colored points of one detected instance
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    /// Class label of the instance
    pub label: String,
    /// Index of the instance in the annotation
    pub instance: usize,
    /// Confidence score, if the annotation carried one
    pub score: Option<f64>,
    /// Normalization used for `colors`
    pub normalization: ColorNormalization,
    pub positions: Vec<[f64; 3]>,
    /// One color per position
    pub colors: Vec<[f64; 3]>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Point with the median y coordinate, where a viewer places the text label.
    pub fn label_anchor(&self) -> Option<[f64; 3]> {
        if self.positions.is_empty() {
            return None;
        }
        let mut order: Vec<usize> = (0..self.positions.len()).collect();
        order.sort_by(|&a, &b| self.positions[a][1].total_cmp(&self.positions[b][1]));
        Some(self.positions[order[order.len() / 2]])
    }

    /// Axis-aligned `(min, max)` corners.
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(mut min, mut max), p| {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
            (min, max)
        }))
    }

    /// Colors mapped into `[0, 1]` regardless of the stored normalization.
    pub fn unit_colors(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.colors.iter().map(|&c| self.normalization.to_unit(c))
    }
}
