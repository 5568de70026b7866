//! Depth and coordinate grid types

use crate::cloud_pipeline::common::error::{PipelineError, Result};

/// Single-channel depth image, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    /// Height of the image in pixels
    pub height: usize,
    /// Width of the image in pixels
    pub width: usize,
    /// Depth per pixel, in the units the intrinsics are expressed in
    pub data: Vec<f64>,
}

impl DepthImage {
    pub fn new(height: usize, width: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != height * width {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        Ok(Self { height, width, data })
    }

    /// Builds a depth image from raw little-endian `f64` samples.
    pub fn from_le_bytes(height: usize, width: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != height * width * size_of::<f64>() {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        let data = bytes
            .chunks_exact(size_of::<f64>())
            .map(|chunk| {
                let mut sample = [0u8; 8];
                sample.copy_from_slice(chunk);
                f64::from_le_bytes(sample)
            })
            .collect();
        Ok(Self { height, width, data })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// One `[x, y, z]` point per depth pixel, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateField {
    /// Height of the grid in pixels
    pub height: usize,
    /// Width of the grid in pixels
    pub width: usize,
    pub points: Vec<[f64; 3]>,
}

impl CoordinateField {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> [f64; 3] {
        self.points[row * self.width + col]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_le_bytes() {
        let bytes: Vec<u8> = [0.5f64, 812.0, -1.25, 3.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();

        let depth = DepthImage::from_le_bytes(2, 2, &bytes).unwrap();

        assert_eq!(depth.get(0, 1), 812.0);
        assert_eq!(depth.get(1, 0), -1.25);
    }

    #[test]
    fn test_from_le_bytes_length_checked() {
        let result = DepthImage::from_le_bytes(2, 2, &[0u8; 31]);

        assert!(matches!(result, Err(PipelineError::InvalidDimensions(2, 2))));
    }
}
