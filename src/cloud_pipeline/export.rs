//! Point cloud export module
//!
//! This module writes assembled point clouds to disk for external viewers.

mod las_writer;
mod writer;

pub use las_writer::LasCloudWriter;
pub use writer::{cloud_file_name, CloudWriter};
