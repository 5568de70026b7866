use crate::cloud_pipeline::common::error::Result;
use crate::cloud_pipeline::frame::types::{FrameData, FrameSource};

pub trait FrameReader {
    fn read_frame(&self, source: &FrameSource) -> Result<FrameData>;
}
