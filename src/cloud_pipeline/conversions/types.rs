//! Pipeline configuration types

use crate::cloud_pipeline::assembly::ColorNormalization;

/// Configuration for frame to point cloud conversion
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Mapping of 8-bit colors to point colors
    pub color_normalization: ColorNormalization,
    /// Whether to validate frame dimensions before processing
    pub validate_dimensions: bool,
    /// Largest accepted width or height when validating
    pub max_dimension: Option<usize>,
    /// Clouds with fewer points are dropped
    pub min_points: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            color_normalization: ColorNormalization::Unit,
            validate_dimensions: true,
            max_dimension: Some(16384),
            min_points: 1,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    color_normalization: Option<ColorNormalization>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
    min_points: Option<usize>,
}

impl PipelineConfigBuilder {
    pub fn color_normalization(mut self, normalization: ColorNormalization) -> Self {
        self.color_normalization = Some(normalization);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn min_points(mut self, min_points: usize) -> Self {
        self.min_points = Some(min_points);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            color_normalization: self.color_normalization.unwrap_or(default.color_normalization),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            min_points: self.min_points.unwrap_or(default.min_points),
        }
    }
}
