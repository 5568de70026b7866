use crate::cloud_pipeline::annotation::InstanceMaskSet;

/// Decides the order in which instance masks are painted into the label
/// image. Later entries overwrite earlier ones on shared pixels.
pub trait RankingPolicy {
    fn paint_order(&self, masks: &InstanceMaskSet) -> Vec<usize>;
}

/// Paints instances in annotation order, so the last annotated instance
/// wins every overlapping pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputOrderOverwrite;

impl RankingPolicy for InputOrderOverwrite {
    fn paint_order(&self, masks: &InstanceMaskSet) -> Vec<usize> {
        (0..masks.len()).collect()
    }
}

/// Paints the largest masks first so small instances lying on top of large
/// ones (food on a plate) keep their pixels. Equal areas keep annotation order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaPriority;

impl RankingPolicy for AreaPriority {
    fn paint_order(&self, masks: &InstanceMaskSet) -> Vec<usize> {
        let areas: Vec<usize> = masks.masks.iter().map(|m| m.area()).collect();
        let mut order: Vec<usize> = (0..masks.len()).collect();
        // Stable sort keeps annotation order between equal areas
        order.sort_by(|&a, &b| areas[b].cmp(&areas[a]));
        order
    }
}
