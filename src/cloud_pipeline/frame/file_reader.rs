//! Frame reader backed by files on disk.
//!
//! Color images are decoded with the `image` crate, depth maps with `npyz`
//! (`.npy`) or the `tiff` crate and annotations with `serde_json`.

use std::io::Cursor;
use std::path::Path;

use npyz::{DType, NpyFile, Order, TypeChar};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::ColorType;
use tracing::debug;

use crate::cloud_pipeline::annotation::AnnotationDocument;
use crate::cloud_pipeline::assembly::ColorImage;
use crate::cloud_pipeline::common::error::{PipelineError, Result};
use crate::cloud_pipeline::frame::reader::FrameReader;
use crate::cloud_pipeline::frame::types::{FrameData, FrameSource};
use crate::cloud_pipeline::unproject::DepthImage;

pub struct FileFrameReader;

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| PipelineError::InputReadError(format!("{}: {}", path.display(), e)))
}

/// Decodes a PNG or JPEG color image into RGB8.
pub fn decode_color(data: &[u8]) -> Result<ColorImage> {
    let rgb = image::load_from_memory(data)
        .map_err(|e| PipelineError::DecodeError(e.to_string()))?
        .to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    debug!("Decoded color image: {}x{}", width, height);
    ColorImage::from_interleaved(height, width, rgb.as_raw())
}

/// Decodes a single-channel depth TIFF.
///
/// Integer and floating point samples are widened to `f64` without rescaling,
/// so depth units are whatever the capture stored (typically millimeters for
/// 16-bit images).
pub fn decode_depth_tiff(data: &[u8]) -> Result<DepthImage> {
    let mut decoder =
        Decoder::new(Cursor::new(data)).map_err(|e| PipelineError::DecodeError(e.to_string()))?;

    let color_type = decoder
        .colortype()
        .map_err(|e| PipelineError::DecodeError(e.to_string()))?;
    if !matches!(color_type, ColorType::Gray(_)) {
        return Err(PipelineError::UnsupportedFormat(format!(
            "depth image must be single-channel, got {:?}",
            color_type
        )));
    }

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| PipelineError::DecodeError(e.to_string()))?;
    let (width, height) = (width as usize, height as usize);

    let samples: Vec<f64> = match decoder
        .read_image()
        .map_err(|e| PipelineError::DecodeError(e.to_string()))?
    {
        DecodingResult::U8(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U16(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::F32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::F64(values) => values,
        DecodingResult::I16(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I32(values) => values.into_iter().map(f64::from).collect(),
        _ => {
            return Err(PipelineError::UnsupportedFormat(
                "unsupported depth sample type".to_string(),
            ));
        }
    };

    debug!("Decoded depth image: {}x{}", width, height);
    DepthImage::new(height, width, samples)
}

fn read_npy_samples<T: npyz::Deserialize + Into<f64>>(npy: NpyFile<&[u8]>) -> Result<Vec<f64>> {
    let values = npy
        .into_vec::<T>()
        .map_err(|e| PipelineError::DecodeError(e.to_string()))?;
    Ok(values.into_iter().map(Into::into).collect())
}

/// Decodes a NumPy `.npy` depth array of shape `(height, width)` or
/// `(height, width, 1)`.
///
/// Float, unsigned and signed integer arrays of either byte order are widened
/// to `f64`; Fortran-ordered arrays are transposed to row-major.
pub fn decode_depth_npy(data: &[u8]) -> Result<DepthImage> {
    let npy = NpyFile::new(data).map_err(|e| PipelineError::DecodeError(e.to_string()))?;

    let (height, width) = match npy.shape() {
        &[height, width] | &[height, width, 1] => (height as usize, width as usize),
        shape => {
            return Err(PipelineError::UnsupportedFormat(format!(
                "depth array must be 2-D, got shape {:?}",
                shape
            )));
        }
    };
    let fortran = matches!(npy.order(), Order::Fortran);

    let (type_char, size) = match npy.dtype() {
        DType::Plain(type_str) => (type_str.type_char(), type_str.size_field()),
        dtype => {
            return Err(PipelineError::UnsupportedFormat(format!(
                "unsupported depth dtype {:?}",
                dtype
            )));
        }
    };

    let samples = match (type_char, size) {
        (TypeChar::Float, 8) => read_npy_samples::<f64>(npy)?,
        (TypeChar::Float, 4) => read_npy_samples::<f32>(npy)?,
        (TypeChar::Uint, 1) => read_npy_samples::<u8>(npy)?,
        (TypeChar::Uint, 2) => read_npy_samples::<u16>(npy)?,
        (TypeChar::Uint, 4) => read_npy_samples::<u32>(npy)?,
        (TypeChar::Int, 2) => read_npy_samples::<i16>(npy)?,
        (TypeChar::Int, 4) => read_npy_samples::<i32>(npy)?,
        _ => {
            return Err(PipelineError::UnsupportedFormat(format!(
                "unsupported depth dtype {:?} of {} bytes",
                type_char, size
            )));
        }
    };

    if samples.len() != height * width {
        return Err(PipelineError::InvalidDimensions(width, height));
    }
    let samples = if fortran {
        (0..height * width)
            .map(|idx| samples[(idx % width) * height + idx / width])
            .collect()
    } else {
        samples
    };

    debug!("Decoded depth array: {}x{}", width, height);
    DepthImage::new(height, width, samples)
}

/// Decodes a depth map, choosing the format from the file extension.
pub fn decode_depth(path: &Path, data: &[u8]) -> Result<DepthImage> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("npy") => decode_depth_npy(data),
        Some("tif" | "tiff") => decode_depth_tiff(data),
        _ => Err(PipelineError::UnsupportedFormat(format!(
            "depth map must be .npy or .tiff: {}",
            path.display()
        ))),
    }
}

impl FrameReader for FileFrameReader {
    fn read_frame(&self, source: &FrameSource) -> Result<FrameData> {
        let color = decode_color(&read_bytes(&source.color)?)?;
        let depth = decode_depth(&source.depth, &read_bytes(&source.depth)?)?;
        let annotation = AnnotationDocument::from_json(&read_bytes(&source.annotation)?)?;

        if color.shape() != depth.shape() {
            return Err(PipelineError::ShapeMismatch {
                expected: depth.shape(),
                actual: color.shape(),
            });
        }

        Ok(FrameData {
            color,
            depth,
            annotation,
        })
    }
}
