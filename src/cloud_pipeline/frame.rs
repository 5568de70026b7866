//! Frame reading module
//!
//! This module loads the color image, depth image and annotation document
//! that make up one captured frame.

mod file_reader;
mod reader;
pub mod types;

pub use file_reader::{decode_color, decode_depth_tiff, FileFrameReader};
pub use reader::FrameReader;
pub use types::{FrameData, FrameSource};
