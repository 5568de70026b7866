use std::collections::HashSet;

use tracing::{debug, info};

use crate::cloud_pipeline::assembly::PointCloud;
use crate::cloud_pipeline::common::error::{PipelineError, Result};
use crate::cloud_pipeline::scene::camera::CameraPose;

/// A named cloud in the scene
#[derive(Debug, Clone)]
pub struct SceneGeometry {
    /// Unique name, the label unless two instances share it
    pub name: String,
    pub cloud: PointCloud,
    pub visible: bool,
    /// Where the viewer draws the text label
    pub anchor: Option<[f64; 3]>,
}

/// Owned viewer state: created once at startup, reloaded per run.
#[derive(Debug, Default)]
pub struct SceneContext {
    geometries: Vec<SceneGeometry>,
}

impl SceneContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the scene content with `clouds`, all visible.
    pub fn load(&mut self, clouds: Vec<PointCloud>) {
        self.clear();

        let duplicated: HashSet<String> = {
            let mut seen = HashSet::new();
            clouds
                .iter()
                .filter(|c| !seen.insert(c.label.as_str()))
                .map(|c| c.label.clone())
                .collect()
        };

        for cloud in clouds {
            let name = if duplicated.contains(&cloud.label) {
                format!("{}#{}", cloud.label, cloud.instance)
            } else {
                cloud.label.clone()
            };
            debug!(name = %name, points = cloud.len(), "Adding geometry");
            self.geometries.push(SceneGeometry {
                name,
                anchor: cloud.label_anchor(),
                cloud,
                visible: true,
            });
        }

        info!("Scene loaded with {} geometries", self.geometries.len());
    }

    pub fn clear(&mut self) {
        self.geometries.clear();
    }

    pub fn set_visible(&mut self, name: &str, visible: bool) -> Result<()> {
        self.geometry_mut(name)?.visible = visible;
        Ok(())
    }

    /// Flips visibility and returns the new state.
    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let geometry = self.geometry_mut(name)?;
        geometry.visible = !geometry.visible;
        Ok(geometry.visible)
    }

    pub fn is_visible(&self, name: &str) -> Result<bool> {
        self.geometries
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.visible)
            .ok_or_else(|| PipelineError::UnknownGeometry(name.to_string()))
    }

    pub fn geometries(&self) -> &[SceneGeometry] {
        &self.geometries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.geometries.iter().map(|g| g.name.as_str())
    }

    pub fn visible_clouds(&self) -> impl Iterator<Item = &PointCloud> {
        self.geometries.iter().filter(|g| g.visible).map(|g| &g.cloud)
    }

    /// Camera framing the bounding box of every geometry, hidden ones
    /// included, so toggling does not move the view. `None` for an empty scene.
    pub fn camera_pose(&self) -> Option<CameraPose> {
        let (min, max) = self
            .geometries
            .iter()
            .filter_map(|g| g.cloud.bounds())
            .reduce(|(amin, amax), (bmin, bmax)| {
                (
                    [amin[0].min(bmin[0]), amin[1].min(bmin[1]), amin[2].min(bmin[2])],
                    [amax[0].max(bmax[0]), amax[1].max(bmax[1]), amax[2].max(bmax[2])],
                )
            })?;
        Some(CameraPose::framing(min, max))
    }

    fn geometry_mut(&mut self, name: &str) -> Result<&mut SceneGeometry> {
        self.geometries
            .iter_mut()
            .find(|g| g.name == name)
            .ok_or_else(|| PipelineError::UnknownGeometry(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud_pipeline::assembly::ColorNormalization;

    fn cloud(label: &str, instance: usize, positions: Vec<[f64; 3]>) -> PointCloud {
        PointCloud {
            label: label.to_string(),
            instance,
            score: None,
            normalization: ColorNormalization::Unit,
            colors: vec![[1.0; 3]; positions.len()],
            positions,
        }
    }

    fn scene() -> SceneContext {
        let mut scene = SceneContext::new();
        scene.load(vec![
            cloud("rice", 0, vec![[0.0, 0.0, 400.0], [10.0, 4.0, 420.0]]),
            cloud("soup", 1, vec![[-20.0, 2.0, 380.0]]),
        ]);
        scene
    }

    #[test]
    fn test_load_makes_everything_visible() {
        let scene = scene();

        assert_eq!(scene.names().collect::<Vec<_>>(), vec!["rice", "soup"]);
        assert_eq!(scene.visible_clouds().count(), 2);
        assert_eq!(scene.geometries()[1].anchor, Some([-20.0, 2.0, 380.0]));
    }

    #[test]
    fn test_toggle_visibility() {
        let mut scene = scene();

        assert!(!scene.toggle("rice").unwrap());
        assert_eq!(scene.visible_clouds().map(|c| c.label.as_str()).collect::<Vec<_>>(), vec!["soup"]);
        scene.set_visible("rice", true).unwrap();
        assert!(scene.is_visible("rice").unwrap());
    }

    #[test]
    fn test_unknown_geometry() {
        let mut scene = scene();

        assert!(matches!(scene.toggle("plate"), Err(PipelineError::UnknownGeometry(_))));
        assert!(scene.is_visible("plate").is_err());
    }

    #[test]
    fn test_duplicate_labels_disambiguated() {
        let mut scene = SceneContext::new();
        scene.load(vec![
            cloud("kimchi", 2, vec![[0.0; 3]]),
            cloud("rice", 3, vec![[0.0; 3]]),
            cloud("kimchi", 5, vec![[0.0; 3]]),
        ]);

        assert_eq!(scene.names().collect::<Vec<_>>(), vec!["kimchi#2", "rice", "kimchi#5"]);
    }

    #[test]
    fn test_camera_pose_frames_all_geometries() {
        let mut scene = scene();
        scene.set_visible("soup", false).unwrap();

        let pose = scene.camera_pose().unwrap();

        assert_eq!(pose.center, [-5.0, 2.0, 400.0]);
        assert_eq!(pose.eye, [-5.0, 2.0, -100.0]);
        assert_eq!(pose.up, [0.0, -1.0, 0.0]);
        assert_eq!(pose.field_of_view_deg, 60.0);
    }

    #[test]
    fn test_clear() {
        let mut scene = scene();

        scene.clear();

        assert_eq!(scene.geometries().len(), 0);
        assert!(scene.camera_pose().is_none());
    }
}
