//! LAS point cloud export
//!
//! Writes one uncompressed LAS 1.4 file per cloud with 16-bit RGB color.

use std::path::Path;

use las::{Builder, Color, Point, Writer};
use tracing::{debug, info};

use crate::cloud_pipeline::assembly::PointCloud;
use crate::cloud_pipeline::common::error::{PipelineError, Result};
use crate::cloud_pipeline::export::writer::CloudWriter;

/// Default coordinate quantization, in depth units
const DEFAULT_SCALE: f64 = 0.001;

pub struct LasCloudWriter {
    /// Coordinate quantization step stored in the LAS header
    pub scale: f64,
}

impl Default for LasCloudWriter {
    fn default() -> Self {
        Self { scale: DEFAULT_SCALE }
    }
}

#[inline]
fn to_u16(channel: f64) -> u16 {
    (channel.clamp(0.0, 1.0) * u16::MAX as f64).round() as u16
}

impl CloudWriter for LasCloudWriter {
    fn write_cloud(&self, cloud: &PointCloud, path: &Path) -> Result<()> {
        let Some((min, max)) = cloud.bounds() else {
            return Err(PipelineError::EmptyCloud(cloud.label.clone()));
        };

        info!(
            label = %cloud.label,
            point_count = cloud.len(),
            path = %path.display(),
            "Exporting point cloud"
        );

        let mut builder = Builder::from((1, 4));
        builder.point_format.has_color = true;
        builder.point_format.is_compressed = false;

        // Offsets at the box center keep quantized coordinates small
        let transform = |axis: usize| las::Transform {
            scale: self.scale,
            offset: (min[axis] + max[axis]) / 2.0,
        };
        builder.transforms = las::Vector {
            x: transform(0),
            y: transform(1),
            z: transform(2),
        };

        let header = builder
            .into_header()
            .map_err(|e| PipelineError::EncodeError(format!("LAS header: {}", e)))?;

        let mut writer = Writer::from_path(path, header).map_err(|e| {
            PipelineError::OutputWriteError(format!("{}: {}", path.display(), e))
        })?;

        for (position, color) in cloud.positions.iter().zip(cloud.unit_colors()) {
            let mut point = Point::default();
            point.x = position[0];
            point.y = position[1];
            point.z = position[2];
            point.color = Some(Color::new(to_u16(color[0]), to_u16(color[1]), to_u16(color[2])));

            writer
                .write_point(point)
                .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
        }

        writer
            .close()
            .map_err(|e| PipelineError::OutputWriteError(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "LAS export complete");
        Ok(())
    }
}
