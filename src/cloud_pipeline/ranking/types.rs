//! Label image types

/// Label value for pixels owned by no instance
pub const BACKGROUND: i32 = -1;

/// Per-pixel instance ownership after merging masks, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelImage {
    /// Grid height in pixels
    pub height: usize,
    /// Grid width in pixels
    pub width: usize,
    /// Instance index per pixel, or [`BACKGROUND`]
    pub data: Vec<i32>,
}

impl LabelImage {
    pub fn background(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![BACKGROUND; height * width],
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[row * self.width + col]
    }

    /// Instance owning the pixel, `None` for background.
    #[inline]
    pub fn owner(&self, row: usize, col: usize) -> Option<usize> {
        usize::try_from(self.get(row, col)).ok()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Output of the ranking stage
#[derive(Debug, Clone)]
pub struct RankedInstances {
    pub label_image: LabelImage,
    /// Distinct instance indices still visible after merging, ascending
    pub present: Vec<usize>,
}
