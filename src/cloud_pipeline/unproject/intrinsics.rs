//! Camera intrinsics

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cloud_pipeline::common::error::{PipelineError, Result};

/// Pinhole intrinsics with Brown-Conrady distortion coefficients.
///
/// `coeffs` holds `[k1, k2, p1, p2, k3]`: radial terms at indices 0, 1 and 4,
/// tangential terms at indices 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length along x, in pixels
    pub fx: f64,
    /// Focal length along y, in pixels
    pub fy: f64,
    /// Principal point column
    pub ppx: f64,
    /// Principal point row
    pub ppy: f64,
    /// Distortion coefficients `[k1, k2, p1, p2, k3]`
    pub coeffs: [f64; 5],
    /// Nominal image width
    pub width: usize,
    /// Nominal image height
    pub height: usize,
}

impl CameraIntrinsics {
    /// Depth stream intrinsics of the 1280x720 sensor the demo data was captured with.
    pub fn depth_1280x720() -> Self {
        Self {
            fx: 922.386962890625,
            fy: 921.6760864257812,
            ppx: 634.551513671875,
            ppy: 350.37774658203125,
            coeffs: [0.0; 5],
            width: 1280,
            height: 720,
        }
    }

    /// Pinhole intrinsics without distortion.
    pub fn pinhole(fx: f64, fy: f64, ppx: f64, ppy: f64, width: usize, height: usize) -> Self {
        Self {
            fx,
            fy,
            ppx,
            ppy,
            coeffs: [0.0; 5],
            width,
            height,
        }
    }

    pub fn with_coeffs(mut self, coeffs: [f64; 5]) -> Self {
        self.coeffs = coeffs;
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            PipelineError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        let intrinsics: Self = serde_json::from_slice(&data)?;
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Rejects focal lengths that would make back-projection divide by zero.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("fx", self.fx), ("fy", self.fy)] {
            if value == 0.0 || !value.is_finite() {
                return Err(PipelineError::InvalidIntrinsics(format!(
                    "{name} must be finite and non-zero, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn k1(&self) -> f64 {
        self.coeffs[0]
    }

    pub fn k2(&self) -> f64 {
        self.coeffs[1]
    }

    pub fn p1(&self) -> f64 {
        self.coeffs[2]
    }

    pub fn p2(&self) -> f64 {
        self.coeffs[3]
    }

    pub fn k3(&self) -> f64 {
        self.coeffs[4]
    }
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self::depth_1280x720()
    }
}
