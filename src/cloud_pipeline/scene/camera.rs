/// Vertical field of view used when framing the scene
pub const FIELD_OF_VIEW_DEG: f64 = 60.0;

/// Distance of the eye from the scene center along -z
pub const CAMERA_DISTANCE: f64 = 500.0;

/// Look-at camera framing a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Point the camera looks at
    pub center: [f64; 3],
    /// Camera position
    pub eye: [f64; 3],
    /// Up direction; image rows grow downward, so up is -y
    pub up: [f64; 3],
    pub field_of_view_deg: f64,
}

impl CameraPose {
    /// Frames the box `(min, max)` from behind its center, looking toward +z
    /// the way the depth camera did.
    pub fn framing(min: [f64; 3], max: [f64; 3]) -> Self {
        let center = [
            (min[0] + max[0]) / 2.0,
            (min[1] + max[1]) / 2.0,
            (min[2] + max[2]) / 2.0,
        ];
        Self {
            center,
            eye: [center[0], center[1], center[2] - CAMERA_DISTANCE],
            up: [0.0, -1.0, 0.0],
            field_of_view_deg: FIELD_OF_VIEW_DEG,
        }
    }
}
