//! Depth unprojection module
//!
//! This module back-projects a depth image into a per-pixel field of 3D
//! points using pinhole intrinsics with Brown-Conrady distortion correction.

pub mod intrinsics;
pub mod types;
mod unprojector;

pub use intrinsics::CameraIntrinsics;
pub use types::{CoordinateField, DepthImage};
pub use unprojector::{unproject, unproject_pixel};
