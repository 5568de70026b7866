//! Shape rasterization onto a pixel grid.
//!
//! Both paths use half-open pixel intervals: a rectangle with corners
//! `(c0, r0)` and `(c1, r1)` covers rows `[r0, r1)` and columns `[c0, c1)`,
//! and an axis-aligned polygon through the same four corners fills the same
//! pixels.

use crate::cloud_pipeline::annotation::types::InstanceMask;

/// Truncates a vertex toward zero, matching integer casting of annotation points.
#[inline]
pub(crate) fn to_pixel(point: [f64; 2]) -> (i64, i64) {
    (point[0] as i64, point[1] as i64)
}

#[inline]
fn clip(value: i64, upper: usize) -> usize {
    value.clamp(0, upper as i64) as usize
}

/// Fills the box spanned by two `(x, y)` corners.
pub(crate) fn fill_rectangle(mask: &mut InstanceMask, first: (i64, i64), second: (i64, i64)) {
    let col_start = clip(first.0.min(second.0), mask.width);
    let col_end = clip(first.0.max(second.0), mask.width);
    let row_start = clip(first.1.min(second.1), mask.height);
    let row_end = clip(first.1.max(second.1), mask.height);

    if col_start >= col_end {
        return;
    }
    for row in row_start..row_end {
        mask.fill_span(row, col_start, col_end);
    }
}

/// Scan-line even-odd fill of a closed polygon given as `(x, y)` vertices.
pub(crate) fn fill_polygon(mask: &mut InstanceMask, vertices: &[(i64, i64)]) {
    if vertices.len() < 3 || mask.width == 0 || mask.height == 0 {
        return;
    }

    let min_row = vertices.iter().map(|v| v.1).min().unwrap_or(0).max(0);
    let max_row = vertices
        .iter()
        .map(|v| v.1)
        .max()
        .unwrap_or(0)
        .min(mask.height as i64 - 1);

    let mut crossings: Vec<f64> = Vec::with_capacity(vertices.len());
    for row in min_row..=max_row {
        let y = row as f64;
        crossings.clear();

        let mut prev = vertices[vertices.len() - 1];
        for &curr in vertices {
            let (x0, y0) = (curr.0 as f64, curr.1 as f64);
            let (x1, y1) = (prev.0 as f64, prev.1 as f64);
            // Half-open in y so a vertex shared by two edges is counted once.
            if (y0 <= y && y < y1) || (y1 <= y && y < y0) {
                crossings.push(x0 + (x1 - x0) * (y - y0) / (y1 - y0));
            }
            prev = curr;
        }

        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let col_start = clip(span[0].ceil() as i64, mask.width);
            let col_end = clip(span[1].ceil() as i64, mask.width);
            if col_start < col_end {
                mask.fill_span(row as usize, col_start, col_end);
            }
        }
    }
}
