//! Point cloud assembly module
//!
//! This module samples the coordinate field and the color image with each
//! present instance's label to build one colored point cloud per object.

mod assembler;
pub mod types;

pub use assembler::assemble_clouds;
pub use types::{ColorImage, ColorNormalization, PointCloud};
