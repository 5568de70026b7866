use tracing::{info, instrument, warn};

use crate::cloud_pipeline::{
    annotation::decode_annotations,
    assembly::{assemble_clouds, PointCloud},
    common::error::{PipelineError, Result},
    conversions::{PipelineConfig, PipelineTimings},
    frame::{FileFrameReader, FrameData, FrameReader, FrameSource},
    ranking::{rank_instances, InputOrderOverwrite, RankingPolicy},
    unproject::{unproject, CameraIntrinsics},
};

/// Turns a frame into one colored point cloud per visible annotated instance:
/// annotation → masks → label image → (+ coordinates + color) → clouds.
pub struct FoodCloudPipeline<R: FrameReader, P: RankingPolicy> {
    reader: R,
    policy: P,
    intrinsics: CameraIntrinsics,
    config: PipelineConfig,
}

impl FoodCloudPipeline<FileFrameReader, InputOrderOverwrite> {
    pub fn new(intrinsics: CameraIntrinsics, config: PipelineConfig) -> Result<Self> {
        Self::with_custom(FileFrameReader, InputOrderOverwrite, intrinsics, config)
    }
}

impl<R: FrameReader, P: RankingPolicy> FoodCloudPipeline<R, P> {
    /// Builds a pipeline with a custom reader and ranking policy.
    ///
    /// Intrinsics are validated here so a bad focal length fails before any
    /// frame is read.
    pub fn with_custom(reader: R, policy: P, intrinsics: CameraIntrinsics, config: PipelineConfig) -> Result<Self> {
        intrinsics.validate()?;
        Ok(Self {
            reader,
            policy,
            intrinsics,
            config,
        })
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Frame dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(PipelineError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Runs the core stages on an already loaded frame.
    pub fn process(&self, frame: &FrameData) -> Result<Vec<PointCloud>> {
        self.process_with_timings(frame).map(|(clouds, _)| clouds)
    }

    #[instrument(skip_all, fields(width = frame.depth.width, height = frame.depth.height))]
    pub fn process_with_timings(&self, frame: &FrameData) -> Result<(Vec<PointCloud>, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let shape = frame.depth.shape();

        self.validate_dimensions(frame.depth.width, frame.depth.height)?;
        if frame.color.shape() != shape {
            return Err(PipelineError::ShapeMismatch {
                expected: shape,
                actual: frame.color.shape(),
            });
        }

        let masks = timings.measure("decode_annotation", || {
            let _span = tracing::info_span!("decode_annotation").entered();
            decode_annotations(&frame.annotation, shape)
        })?;

        let ranked = timings.measure("rank_instances", || {
            let _span = tracing::info_span!("rank_instances").entered();
            rank_instances(&masks, &self.policy)
        })?;

        let field = timings.measure("unproject_depth", || {
            let _span = tracing::info_span!("unproject_depth").entered();
            unproject(&frame.depth, &self.intrinsics)
        })?;

        let mut clouds = timings.measure("assemble_clouds", || {
            let _span = tracing::info_span!("assemble_clouds").entered();
            assemble_clouds(&ranked, &masks, &field, &frame.color, self.config.color_normalization)
        })?;

        let min_points = self.config.min_points;
        clouds.retain(|cloud| {
            let keep = cloud.len() >= min_points;
            if !keep {
                warn!(
                    label = %cloud.label,
                    points = cloud.len(),
                    min_points,
                    "Dropping sparse point cloud"
                );
            }
            keep
        });

        info!(
            annotated = masks.len(),
            clouds = clouds.len(),
            "Frame converted to point clouds"
        );
        Ok((clouds, timings))
    }

    /// Reads a frame with the configured reader and processes it.
    pub fn run(&self, source: &FrameSource) -> Result<Vec<PointCloud>> {
        self.run_with_timings(source).map(|(clouds, _)| clouds)
    }

    #[instrument(skip(self, source))]
    pub fn run_with_timings(&self, source: &FrameSource) -> Result<(Vec<PointCloud>, PipelineTimings)> {
        info!(
            color = %source.color.display(),
            depth = %source.depth.display(),
            annotation = %source.annotation.display(),
            "Loading frame"
        );

        let mut timings = PipelineTimings::new();
        let frame = timings.measure("read_frame", || {
            let _span = tracing::info_span!("read_frame").entered();
            self.reader.read_frame(source)
        })?;

        let (clouds, stage_timings) = self.process_with_timings(&frame)?;
        for step in stage_timings.steps() {
            timings.add_step(step.name.clone(), step.duration);
        }

        Ok((clouds, timings))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }
}
