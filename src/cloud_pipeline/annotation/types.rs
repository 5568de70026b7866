//! Annotation and mask types

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cloud_pipeline::common::error::{PipelineError, Result};

/// Segmentation annotation document with one shape per detected instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationDocument {
    /// Shapes in ranking order
    pub shapes: Vec<ShapeAnnotation>,
    /// Height of the annotated image, when the document records it
    #[serde(rename = "imageHeight", default, skip_serializing_if = "Option::is_none")]
    pub image_height: Option<usize>,
    /// Width of the annotated image, when the document records it
    #[serde(rename = "imageWidth", default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<usize>,
}

impl AnnotationDocument {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            PipelineError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&data)
    }

    /// Image grid `(height, width)` declared by the document, if both fields are present.
    pub fn declared_shape(&self) -> Option<(usize, usize)> {
        Some((self.image_height?, self.image_width?))
    }
}

/// One annotated object instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeAnnotation {
    /// Class label
    pub label: String,
    /// Ordered `(x, y)` vertices in pixel coordinates
    pub points: Vec<[f64; 2]>,
    /// Shape kind as written in the document (`"rectangle"` or `"polygon"`)
    pub shape_type: String,
    /// Detector scores, absent for hand-made annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<ShapeScores>,
}

impl ShapeAnnotation {
    pub fn score(&self) -> Option<f64> {
        self.scores.as_ref().and_then(|s| s.cls)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ShapeScores {
    /// Classification confidence
    #[serde(default)]
    pub cls: Option<f64>,
}

/// Supported annotation shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Axis-aligned box given by two corners
    Rectangle,
    /// Closed polygon given by its ordered vertices
    Polygon,
}

impl ShapeKind {
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "rectangle" => Ok(ShapeKind::Rectangle),
            "polygon" => Ok(ShapeKind::Polygon),
            other => Err(PipelineError::UnknownShapeKind(other.to_string())),
        }
    }
}

/// Boolean mask over a `height x width` grid, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceMask {
    /// Grid height in pixels
    pub height: usize,
    /// Grid width in pixels
    pub width: usize,
    /// One flag per pixel
    pub data: Vec<bool>,
}

impl InstanceMask {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![false; height * width],
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize) {
        self.data[row * self.width + col] = true;
    }

    /// Marks columns `[col_start, col_end)` of `row`.
    pub fn fill_span(&mut self, row: usize, col_start: usize, col_end: usize) {
        let offset = row * self.width;
        self.data[offset + col_start..offset + col_end].fill(true);
    }

    /// Number of pixels set.
    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Decoded masks with their parallel label and score arrays, in annotation order.
#[derive(Debug, Clone)]
pub struct InstanceMaskSet {
    /// Grid height in pixels
    pub height: usize,
    /// Grid width in pixels
    pub width: usize,
    pub masks: Vec<InstanceMask>,
    pub labels: Vec<String>,
    /// `None` where the annotation carried no confidence
    pub scores: Vec<Option<f64>>,
}

impl InstanceMaskSet {
    pub fn empty(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            masks: Vec::new(),
            labels: Vec::new(),
            scores: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}
