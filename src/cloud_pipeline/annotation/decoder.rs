use tracing::{debug, instrument};

use crate::cloud_pipeline::annotation::raster::{fill_polygon, fill_rectangle, to_pixel};
use crate::cloud_pipeline::annotation::types::{
    AnnotationDocument, InstanceMask, InstanceMaskSet, ShapeAnnotation, ShapeKind,
};
use crate::cloud_pipeline::common::error::{PipelineError, Result};

/// Decodes an annotation document into masks on a `(height, width)` grid.
///
/// Fails with [`PipelineError::ShapeMismatch`] when the document declares an
/// image size different from `shape`.
#[instrument(skip(document), fields(shapes = document.shapes.len()))]
pub fn decode_annotations(document: &AnnotationDocument, shape: (usize, usize)) -> Result<InstanceMaskSet> {
    if let Some(declared) = document.declared_shape() {
        if declared != shape {
            return Err(PipelineError::ShapeMismatch {
                expected: shape,
                actual: declared,
            });
        }
    }

    decode_shapes(&document.shapes, shape)
}

/// Decodes shapes into masks, labels and scores in input order.
pub fn decode_shapes(shapes: &[ShapeAnnotation], shape: (usize, usize)) -> Result<InstanceMaskSet> {
    let (height, width) = shape;
    let mut set = InstanceMaskSet::empty(height, width);

    for (index, annotation) in shapes.iter().enumerate() {
        let mask = rasterize(annotation, shape)?;
        debug!(
            index,
            label = %annotation.label,
            area = mask.area(),
            "Decoded instance mask"
        );

        set.masks.push(mask);
        set.labels.push(annotation.label.clone());
        set.scores.push(annotation.score());
    }

    Ok(set)
}

fn rasterize(annotation: &ShapeAnnotation, (height, width): (usize, usize)) -> Result<InstanceMask> {
    let kind = ShapeKind::parse(&annotation.shape_type)?;
    let vertices: Vec<(i64, i64)> = annotation.points.iter().copied().map(to_pixel).collect();
    let mut mask = InstanceMask::new(height, width);

    match kind {
        ShapeKind::Rectangle => {
            let [first, second] = vertices.as_slice() else {
                return Err(PipelineError::InvalidShape(format!(
                    "rectangle '{}' needs 2 corners, got {}",
                    annotation.label,
                    vertices.len()
                )));
            };
            fill_rectangle(&mut mask, *first, *second);
        }
        ShapeKind::Polygon => fill_polygon(&mut mask, &vertices),
    }

    Ok(mask)
}
