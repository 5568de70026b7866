use tracing::{debug, instrument};

use crate::cloud_pipeline::annotation::InstanceMaskSet;
use crate::cloud_pipeline::assembly::types::{ColorImage, ColorNormalization, PointCloud};
use crate::cloud_pipeline::common::error::{PipelineError, Result};
use crate::cloud_pipeline::ranking::RankedInstances;
use crate::cloud_pipeline::unproject::CoordinateField;

fn ensure_shape(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(PipelineError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Builds one point cloud per present instance.
///
/// Pixels are visited in row-major order, so point order is deterministic.
/// Each cloud takes the label and score of its own instance index.
///
/// # Errors
///
/// * `PipelineError::ShapeMismatch` - the label image, coordinate field and
///   color image are not on the same grid
/// * `PipelineError::InvalidDimensions` - a buffer does not cover its grid
/// * `PipelineError::InvalidShape` - `ranked` names an instance missing from
///   `masks`
#[instrument(skip_all, fields(instances = ranked.present.len()))]
pub fn assemble_clouds(
    ranked: &RankedInstances,
    masks: &InstanceMaskSet,
    field: &CoordinateField,
    color: &ColorImage,
    normalization: ColorNormalization,
) -> Result<Vec<PointCloud>> {
    let shape = ranked.label_image.shape();
    ensure_shape(shape, field.shape())?;
    ensure_shape(shape, color.shape())?;
    let pixels = shape.0 * shape.1;
    if ranked.label_image.data.len() != pixels || field.points.len() != pixels || color.data.len() != pixels {
        return Err(PipelineError::InvalidDimensions(shape.1, shape.0));
    }

    // slot[i] is the position of instance i in `clouds`
    let mut slot = vec![None; masks.len()];
    let mut clouds: Vec<PointCloud> = Vec::with_capacity(ranked.present.len());
    for &instance in &ranked.present {
        let (Some(entry), Some(label), Some(&score)) = (
            slot.get_mut(instance),
            masks.labels.get(instance),
            masks.scores.get(instance),
        ) else {
            return Err(PipelineError::InvalidShape(format!(
                "ranked instance {} not in a set of {} masks",
                instance,
                masks.len()
            )));
        };
        *entry = Some(clouds.len());
        clouds.push(PointCloud {
            label: label.clone(),
            instance,
            score,
            normalization,
            positions: Vec::new(),
            colors: Vec::new(),
        });
    }

    for (idx, &label) in ranked.label_image.data.iter().enumerate() {
        let Some(cloud_idx) = usize::try_from(label).ok().and_then(|i| slot.get(i).copied().flatten()) else {
            continue;
        };
        let cloud = &mut clouds[cloud_idx];
        cloud.positions.push(field.points[idx]);
        cloud.colors.push(normalization.normalize(color.data[idx]));
    }

    for cloud in &clouds {
        debug!(
            instance = cloud.instance,
            label = %cloud.label,
            points = cloud.len(),
            "Assembled point cloud"
        );
    }

    Ok(clouds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud_pipeline::annotation::InstanceMask;
    use crate::cloud_pipeline::ranking::{rank_instances, InputOrderOverwrite};

    fn fixture() -> (InstanceMaskSet, CoordinateField, ColorImage) {
        let (height, width) = (2, 3);
        let mut plate = InstanceMask::new(height, width);
        plate.fill_span(0, 0, 3);
        plate.fill_span(1, 0, 3);
        let mut rice = InstanceMask::new(height, width);
        rice.fill_span(1, 1, 3);
        let mut hidden = InstanceMask::new(height, width);
        hidden.set(1, 2);

        let masks = InstanceMaskSet {
            height,
            width,
            masks: vec![plate, hidden, rice],
            labels: vec!["plate".into(), "hidden".into(), "rice".into()],
            scores: vec![Some(0.5), None, None],
        };
        let field = CoordinateField {
            height,
            width,
            points: (0..6).map(|i| [i as f64, 0.0, 1.0]).collect(),
        };
        let color = ColorImage::new(height, width, (0..6).map(|i| [i as u8 * 51, 0, 255]).collect()).unwrap();
        (masks, field, color)
    }

    #[test]
    fn test_clouds_follow_label_image() {
        let (masks, field, color) = fixture();
        let ranked = rank_instances(&masks, &InputOrderOverwrite).unwrap();

        let clouds = assemble_clouds(&ranked, &masks, &field, &color, ColorNormalization::Unit).unwrap();

        assert_eq!(clouds.len(), 2);
        assert_eq!(clouds[0].label, "plate");
        assert_eq!(clouds[0].score, Some(0.5));
        assert_eq!(clouds[0].positions, vec![[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [2.0, 0.0, 1.0], [3.0, 0.0, 1.0]]);
        // Labels stay with their own instance even though instance 1 vanished
        assert_eq!(clouds[1].label, "rice");
        assert_eq!(clouds[1].instance, 2);
        assert_eq!(clouds[1].positions, vec![[4.0, 0.0, 1.0], [5.0, 0.0, 1.0]]);
        assert_eq!(clouds[1].colors, vec![[0.8, 0.0, 1.0], [1.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_reference_inverted_colors() {
        let (masks, field, color) = fixture();
        let ranked = rank_instances(&masks, &InputOrderOverwrite).unwrap();

        let clouds =
            assemble_clouds(&ranked, &masks, &field, &color, ColorNormalization::ReferenceInverted).unwrap();

        for c in clouds.iter().flat_map(|c| c.colors.iter()).flatten() {
            assert!((-1.0..=0.0).contains(c));
        }
        assert_eq!(clouds[1].colors[1], [0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_color_shape_mismatch() {
        let (masks, field, _) = fixture();
        let ranked = rank_instances(&masks, &InputOrderOverwrite).unwrap();
        let color = ColorImage::new(3, 2, vec![[0; 3]; 6]).unwrap();

        let result = assemble_clouds(&ranked, &masks, &field, &color, ColorNormalization::Unit);

        assert!(matches!(result, Err(PipelineError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_no_present_instances() {
        let (_, field, color) = fixture();
        let masks = InstanceMaskSet::empty(2, 3);
        let ranked = rank_instances(&masks, &InputOrderOverwrite).unwrap();

        let clouds = assemble_clouds(&ranked, &masks, &field, &color, ColorNormalization::Unit).unwrap();

        assert!(clouds.is_empty());
    }

    #[test]
    fn test_ranking_from_other_mask_set_rejected() {
        let (masks, field, color) = fixture();
        let ranked = rank_instances(&masks, &InputOrderOverwrite).unwrap();
        let fewer = InstanceMaskSet {
            masks: masks.masks[..1].to_vec(),
            labels: masks.labels[..1].to_vec(),
            scores: masks.scores[..1].to_vec(),
            ..masks
        };

        let result = assemble_clouds(&ranked, &fewer, &field, &color, ColorNormalization::Unit);

        assert!(matches!(result, Err(PipelineError::InvalidShape(_))));
    }

    #[test]
    fn test_short_coordinate_buffer_rejected() {
        let (masks, mut field, color) = fixture();
        let ranked = rank_instances(&masks, &InputOrderOverwrite).unwrap();
        field.points.pop();

        let result = assemble_clouds(&ranked, &masks, &field, &color, ColorNormalization::Unit);

        assert!(matches!(result, Err(PipelineError::InvalidDimensions(3, 2))));
    }
}
