//! Food point cloud pipeline module
//!
//! This module turns a color image, a depth map and a segmentation
//! annotation into one colored 3D point cloud per detected food item, with
//! separate modules for mask decoding, instance ranking, depth unprojection,
//! cloud assembly and export.

pub mod annotation;
pub mod assembly;
pub mod common;
pub mod conversions;
pub mod export;
pub mod frame;
pub mod ranking;
pub mod scene;
pub mod unproject;

pub use common::{
    PipelineError,
    Result,
};

pub use annotation::{
    AnnotationDocument,
    InstanceMask,
    InstanceMaskSet,
    ShapeAnnotation,
    decode_annotations,
};

pub use ranking::{
    AreaPriority,
    InputOrderOverwrite,
    LabelImage,
    RankingPolicy,
    rank_instances,
};

pub use unproject::{
    CameraIntrinsics,
    CoordinateField,
    DepthImage,
    unproject,
};

pub use assembly::{
    ColorImage,
    ColorNormalization,
    PointCloud,
    assemble_clouds,
};

pub use frame::{
    FileFrameReader,
    FrameData,
    FrameReader,
    FrameSource,
};

pub use export::{
    CloudWriter,
    LasCloudWriter,
};

pub use scene::{
    CameraPose,
    SceneContext,
};

pub use conversions::{
    FoodCloudPipeline,
    PipelineConfig,
    PipelineConfigBuilder,
    PipelineTimings,
};
