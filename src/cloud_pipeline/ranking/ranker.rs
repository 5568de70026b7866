use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::cloud_pipeline::annotation::InstanceMaskSet;
use crate::cloud_pipeline::common::error::{PipelineError, Result};
use crate::cloud_pipeline::ranking::policy::RankingPolicy;
use crate::cloud_pipeline::ranking::types::{LabelImage, RankedInstances, BACKGROUND};

/// Merges instance masks into one label image.
///
/// Every pixel starts as [`BACKGROUND`]; masks are then painted in the order
/// returned by `policy`, each writing its own instance index. An instance
/// whose pixels are all overwritten is absent from `present`.
///
/// # Errors
///
/// * `PipelineError::ShapeMismatch` - a mask is not on the set's grid
/// * `PipelineError::InvalidShape` - the label or score arrays do not match
///   the masks, or the policy names an instance that does not exist
#[instrument(skip_all, fields(instances = masks.len()))]
pub fn rank_instances<P: RankingPolicy>(masks: &InstanceMaskSet, policy: &P) -> Result<RankedInstances> {
    validate_mask_set(masks)?;

    let mut label_image = LabelImage::background(masks.height, masks.width);

    for index in policy.paint_order(masks) {
        let Some(mask) = masks.masks.get(index) else {
            return Err(PipelineError::InvalidShape(format!(
                "paint order names instance {} of {}",
                index,
                masks.len()
            )));
        };
        for (label, &inside) in label_image.data.iter_mut().zip(&mask.data) {
            if inside {
                *label = index as i32;
            }
        }
    }

    let present: Vec<usize> = label_image
        .data
        .iter()
        .filter(|&&label| label != BACKGROUND)
        .map(|&label| label as usize)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    debug!(
        present = present.len(),
        occluded = masks.len() - present.len(),
        "Ranked instances"
    );

    Ok(RankedInstances { label_image, present })
}

fn validate_mask_set(masks: &InstanceMaskSet) -> Result<()> {
    if masks.labels.len() != masks.len() || masks.scores.len() != masks.len() {
        return Err(PipelineError::InvalidShape(format!(
            "{} masks with {} labels and {} scores",
            masks.len(),
            masks.labels.len(),
            masks.scores.len()
        )));
    }

    let expected = masks.shape();
    for mask in &masks.masks {
        if mask.shape() != expected || mask.data.len() != mask.height * mask.width {
            return Err(PipelineError::ShapeMismatch {
                expected,
                actual: mask.shape(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud_pipeline::annotation::InstanceMask;
    use crate::cloud_pipeline::ranking::policy::{AreaPriority, InputOrderOverwrite};

    fn rect_mask(height: usize, width: usize, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> InstanceMask {
        let mut mask = InstanceMask::new(height, width);
        for row in rows {
            mask.fill_span(row, cols.start, cols.end);
        }
        mask
    }

    fn mask_set(masks: Vec<InstanceMask>) -> InstanceMaskSet {
        let (height, width) = masks[0].shape();
        InstanceMaskSet {
            height,
            width,
            labels: (0..masks.len()).map(|i| format!("item{i}")).collect(),
            scores: vec![None; masks.len()],
            masks,
        }
    }

    #[test]
    fn test_last_writer_wins() {
        let set = mask_set(vec![
            rect_mask(4, 6, 0..4, 0..4),
            rect_mask(4, 6, 1..3, 2..6),
        ]);

        let ranked = rank_instances(&set, &InputOrderOverwrite).unwrap();

        // Overlap region belongs to the later instance
        for row in 1..3 {
            for col in 2..4 {
                assert_eq!(ranked.label_image.get(row, col), 1);
            }
        }
        assert_eq!(ranked.label_image.get(0, 0), 0);
        assert_eq!(ranked.label_image.get(0, 5), BACKGROUND);
        assert_eq!(ranked.present, vec![0, 1]);
    }

    #[test]
    fn test_fully_occluded_instance_absent() {
        let set = mask_set(vec![
            rect_mask(5, 5, 1..3, 1..3),
            rect_mask(5, 5, 0..5, 0..5),
        ]);

        let ranked = rank_instances(&set, &InputOrderOverwrite).unwrap();

        assert_eq!(ranked.present, vec![1]);
        assert!(ranked.label_image.data.iter().all(|&l| l == 1));
    }

    #[test]
    fn test_empty_mask_set() {
        let set = InstanceMaskSet::empty(3, 4);

        let ranked = rank_instances(&set, &InputOrderOverwrite).unwrap();

        assert_eq!(ranked.label_image.shape(), (3, 4));
        assert!(ranked.label_image.data.iter().all(|&l| l == BACKGROUND));
        assert!(ranked.present.is_empty());
    }

    #[test]
    fn test_present_indices_sorted_and_skip_empty_masks() {
        let set = mask_set(vec![
            rect_mask(4, 4, 2..4, 2..4),
            InstanceMask::new(4, 4),
            rect_mask(4, 4, 0..1, 0..1),
        ]);

        let ranked = rank_instances(&set, &InputOrderOverwrite).unwrap();

        assert_eq!(ranked.present, vec![0, 2]);
        assert_eq!(ranked.label_image.owner(3, 3), Some(0));
        assert_eq!(ranked.label_image.owner(1, 1), None);
    }

    #[test]
    fn test_area_priority_keeps_small_instance_on_top() {
        // Food annotated before its plate would vanish under input order
        let set = mask_set(vec![
            rect_mask(5, 5, 1..3, 1..3),
            rect_mask(5, 5, 0..5, 0..5),
        ]);

        let ranked = rank_instances(&set, &AreaPriority).unwrap();

        assert_eq!(ranked.present, vec![0, 1]);
        assert_eq!(ranked.label_image.get(1, 1), 0);
        assert_eq!(ranked.label_image.get(4, 4), 1);
    }

    #[test]
    fn test_area_priority_ties_keep_input_order() {
        let set = mask_set(vec![
            rect_mask(2, 2, 0..2, 0..1),
            rect_mask(2, 2, 0..1, 0..2),
        ]);

        assert_eq!(AreaPriority.paint_order(&set), vec![0, 1]);
        let ranked = rank_instances(&set, &AreaPriority).unwrap();
        assert_eq!(ranked.label_image.get(0, 0), 1);
    }

    #[test]
    fn test_mask_off_grid_rejected() {
        let mut set = mask_set(vec![rect_mask(3, 3, 0..1, 0..1), rect_mask(3, 3, 1..2, 1..2)]);
        set.masks[1] = InstanceMask::new(3, 4);

        let result = rank_instances(&set, &InputOrderOverwrite);

        assert!(matches!(
            result,
            Err(PipelineError::ShapeMismatch { expected: (3, 3), actual: (3, 4) })
        ));
    }

    #[test]
    fn test_short_mask_buffer_rejected() {
        let mut set = mask_set(vec![rect_mask(2, 2, 0..2, 0..2)]);
        set.masks[0].data.truncate(3);

        let result = rank_instances(&set, &InputOrderOverwrite);

        assert!(matches!(result, Err(PipelineError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_missing_labels_rejected() {
        let mut set = mask_set(vec![rect_mask(2, 2, 0..1, 0..1), rect_mask(2, 2, 1..2, 1..2)]);
        set.labels.pop();

        let result = rank_instances(&set, &InputOrderOverwrite);

        assert!(matches!(result, Err(PipelineError::InvalidShape(_))));
    }

    struct PaintsUnknownInstance;

    impl RankingPolicy for PaintsUnknownInstance {
        fn paint_order(&self, masks: &InstanceMaskSet) -> Vec<usize> {
            vec![masks.len()]
        }
    }

    #[test]
    fn test_out_of_range_paint_order_rejected() {
        let set = mask_set(vec![rect_mask(2, 2, 0..1, 0..1)]);

        let result = rank_instances(&set, &PaintsUnknownInstance);

        assert!(matches!(result, Err(PipelineError::InvalidShape(_))));
    }
}
