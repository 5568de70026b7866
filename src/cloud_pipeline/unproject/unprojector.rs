use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::cloud_pipeline::common::error::{PipelineError, Result};
use crate::cloud_pipeline::unproject::intrinsics::CameraIntrinsics;
use crate::cloud_pipeline::unproject::types::{CoordinateField, DepthImage};

/// Back-projects a single pixel at `(row, col)` with the given depth.
///
/// Normalized coordinates are corrected with the Brown-Conrady model
/// before scaling by depth:
///
/// ```text
/// x = (col - ppx) / fx            y = (row - ppy) / fy
/// r2 = x^2 + y^2
/// f = 1 + k1 r2 + k2 r2^2 + k3 r2^3
/// x' = x f + 2 p1 x y + p2 (r2 + 2 x^2)
/// y' = y f + 2 p2 x y + p1 (r2 + 2 y^2)
/// point = (depth x', depth y', depth)
/// ```
///
/// The intrinsics are assumed to be validated.
#[inline]
pub fn unproject_pixel(row: usize, col: usize, depth: f64, intrinsics: &CameraIntrinsics) -> [f64; 3] {
    let x = (col as f64 - intrinsics.ppx) / intrinsics.fx;
    let y = (row as f64 - intrinsics.ppy) / intrinsics.fy;

    let r2 = x * x + y * y;
    let f = 1.0 + intrinsics.k1() * r2 + intrinsics.k2() * r2 * r2 + intrinsics.k3() * r2 * r2 * r2;
    let ux = x * f + 2.0 * intrinsics.p1() * x * y + intrinsics.p2() * (r2 + 2.0 * x * x);
    let uy = y * f + 2.0 * intrinsics.p2() * x * y + intrinsics.p1() * (r2 + 2.0 * y * y);

    [depth * ux, depth * uy, depth]
}

/// Converts a depth image into a coordinate field of the same shape.
///
/// Rows are processed in parallel; every pixel only reads its own depth, so
/// the output is bit-identical across runs.
///
/// # Errors
///
/// * `PipelineError::InvalidIntrinsics` - `fx` or `fy` is zero or not finite
/// * `PipelineError::InvalidDimensions` - the depth buffer does not hold
///   `width * height` samples
#[instrument(skip_all, fields(width = depth.width, height = depth.height))]
pub fn unproject(depth: &DepthImage, intrinsics: &CameraIntrinsics) -> Result<CoordinateField> {
    intrinsics.validate()?;

    if depth.data.len() != depth.width * depth.height {
        return Err(PipelineError::InvalidDimensions(depth.width, depth.height));
    }

    if (depth.width, depth.height) != (intrinsics.width, intrinsics.height) {
        warn!(
            "Depth image {}x{} differs from nominal intrinsics resolution {}x{}",
            depth.width, depth.height, intrinsics.width, intrinsics.height
        );
    }

    let mut points = vec![[0.0f64; 3]; depth.width * depth.height];
    if depth.width > 0 {
        points
            .par_chunks_mut(depth.width)
            .zip(depth.data.par_chunks(depth.width))
            .enumerate()
            .for_each(|(row, (out_row, depth_row))| {
                for (col, (point, &z)) in out_row.iter_mut().zip(depth_row).enumerate() {
                    *point = unproject_pixel(row, col, z, intrinsics);
                }
            });
    }

    debug!("Unprojected {} pixels", points.len());

    Ok(CoordinateField {
        height: depth.height,
        width: depth.width,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-12 * expected.abs().max(1.0),
            "{actual} != {expected}"
        );
    }

    fn ramp_depth(height: usize, width: usize) -> DepthImage {
        let data = (0..height * width).map(|i| 400.0 + i as f64 * 1.5).collect();
        DepthImage::new(height, width, data).unwrap()
    }

    #[test]
    fn test_zero_distortion_reduces_to_pinhole() {
        let intrinsics = CameraIntrinsics::pinhole(500.0, 480.0, 3.0, 2.0, 8, 6);
        let depth = ramp_depth(6, 8);

        let field = unproject(&depth, &intrinsics).unwrap();

        for (row, col) in [(0, 0), (2, 3), (5, 7), (1, 6)] {
            let z = depth.get(row, col);
            let [x, y, pz] = field.get(row, col);
            assert_close(x, z * (col as f64 - 3.0) / 500.0);
            assert_close(y, z * (row as f64 - 2.0) / 480.0);
            assert_eq!(pz, z);
        }
    }

    #[test]
    fn test_principal_point_maps_to_optical_axis() {
        let intrinsics = CameraIntrinsics::pinhole(500.0, 500.0, 3.0, 2.0, 8, 6)
            .with_coeffs([0.1, -0.05, 0.01, 0.02, 0.003]);
        let depth = ramp_depth(6, 8);

        let field = unproject(&depth, &intrinsics).unwrap();

        let [x, y, z] = field.get(2, 3);
        assert_eq!(x, 0.0);
        assert_eq!(y, 0.0);
        assert_eq!(z, depth.get(2, 3));
    }

    #[test]
    fn test_brown_conrady_terms() {
        let (k1, k2, p1, p2, k3) = (0.12, -0.03, 0.004, -0.002, 0.0007);
        let intrinsics = CameraIntrinsics::pinhole(100.0, 200.0, 10.0, 20.0, 40, 40)
            .with_coeffs([k1, k2, p1, p2, k3]);

        let [px, py, pz] = unproject_pixel(30, 35, 2.0, &intrinsics);

        let x: f64 = 0.25;
        let y: f64 = 0.05;
        let r2 = x * x + y * y;
        let f = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;
        let ux = x * f + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
        let uy = y * f + 2.0 * p2 * x * y + p1 * (r2 + 2.0 * y * y);

        assert_close(px, 2.0 * ux);
        assert_close(py, 2.0 * uy);
        assert_eq!(pz, 2.0);
        // Distortion must actually move the point away from the pinhole result
        assert!((px - 2.0 * x).abs() > 1e-4);
    }

    #[test]
    fn test_deterministic_output() {
        let intrinsics = CameraIntrinsics::pinhole(612.3, 611.7, 321.4, 238.9, 64, 48)
            .with_coeffs([0.11, -0.21, 0.0012, -0.0008, 0.07]);
        let depth = ramp_depth(48, 64);

        let first = unproject(&depth, &intrinsics).unwrap();
        let second = unproject(&depth, &intrinsics).unwrap();

        let bits = |field: &CoordinateField| -> Vec<u64> {
            field.points.iter().flatten().map(|v| v.to_bits()).collect()
        };
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_zero_focal_length_rejected() {
        let depth = ramp_depth(2, 2);

        for intrinsics in [
            CameraIntrinsics::pinhole(0.0, 500.0, 1.0, 1.0, 2, 2),
            CameraIntrinsics::pinhole(500.0, 0.0, 1.0, 1.0, 2, 2),
        ] {
            let result = unproject(&depth, &intrinsics);
            assert!(matches!(result, Err(PipelineError::InvalidIntrinsics(_))));
        }
    }

    #[test]
    fn test_output_shape_matches_depth() {
        let intrinsics = CameraIntrinsics::pinhole(50.0, 50.0, 2.0, 1.0, 5, 3);
        let depth = ramp_depth(3, 5);

        let field = unproject(&depth, &intrinsics).unwrap();

        assert_eq!(field.shape(), (3, 5));
        assert_eq!(field.points.len(), 15);
    }

    #[test]
    fn test_depth_buffer_length_checked() {
        let result = DepthImage::new(3, 3, vec![1.0; 8]);

        assert!(matches!(result, Err(PipelineError::InvalidDimensions(3, 3))));
    }

    #[test]
    fn test_short_depth_buffer_rejected() {
        let intrinsics = CameraIntrinsics::pinhole(10.0, 10.0, 0.0, 0.0, 2, 2);
        // Built without `DepthImage::new`, so the length was never checked
        let depth = DepthImage {
            height: 2,
            width: 2,
            data: vec![7.0; 3],
        };

        let result = unproject(&depth, &intrinsics);

        assert!(matches!(result, Err(PipelineError::InvalidDimensions(2, 2))));
    }
}
