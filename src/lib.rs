pub mod cloud_pipeline;
pub mod logger;
