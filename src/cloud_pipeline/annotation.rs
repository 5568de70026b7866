//! Annotation decoding module
//!
//! This module turns polygon/rectangle shape annotations into per-instance
//! binary masks aligned to the depth image's pixel grid.

mod decoder;
mod raster;
pub mod types;

pub use decoder::{decode_annotations, decode_shapes};
pub use types::{AnnotationDocument, InstanceMask, InstanceMaskSet, ShapeAnnotation, ShapeKind, ShapeScores};
