use std::path::Path;

use crate::cloud_pipeline::assembly::PointCloud;
use crate::cloud_pipeline::common::error::Result;

pub trait CloudWriter {
    fn write_cloud(&self, cloud: &PointCloud, path: &Path) -> Result<()>;
}

/// File name for a cloud: `<instance>_<label>.<extension>`, with characters
/// outside `[A-Za-z0-9_-]` replaced by `_`.
pub fn cloud_file_name(cloud: &PointCloud, extension: &str) -> String {
    let label: String = cloud
        .label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{:03}_{}.{}", cloud.instance, label, extension)
}
