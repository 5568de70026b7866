//! Pipeline conversions module
//!
//! This module contains the orchestration that turns one frame into
//! per-instance point clouds.

mod depth_to_clouds;
mod timing;
pub mod types;


pub use depth_to_clouds::FoodCloudPipeline;
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use types::{PipelineConfig, PipelineConfigBuilder};
