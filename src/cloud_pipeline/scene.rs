//! Viewer scene module
//!
//! This module holds the state a 3D viewer needs to show the assembled
//! clouds: named geometries, their visibility toggles and the camera framing.

mod camera;
mod context;

pub use camera::{CameraPose, CAMERA_DISTANCE, FIELD_OF_VIEW_DEG};
pub use context::{SceneContext, SceneGeometry};
