//! Image normalization for OCR.
//!
//! Steps:
//! 1. Decode and downscale anything larger than `max_image_dimension`
//! 2. Convert to single-channel grayscale
//! 3. Binarize with a Gaussian adaptive threshold, so uneven lighting across a scan
//!    does not wipe out glyphs in its darker or brighter regions
//!
//! [`prepare_for_ocr`] never fails: when any step fails it hands back the original
//! file so recognition can still run on the unmodified image.

use crate::core::config::ImageConfig;
use crate::ocr::OcrInput;
use crate::{DocintakeError, Result};
use image::{DynamicImage, GenericImageView, GrayImage, ImageReader, Luma};
use std::path::{Path, PathBuf};

/// An image ready for the OCR engine.
#[derive(Debug)]
pub enum PreparedImage {
    Binarized(GrayImage),
    Original(PathBuf),
}

impl PreparedImage {
    pub fn as_ocr_input(&self) -> OcrInput<'_> {
        match self {
            Self::Binarized(image) => OcrInput::Image(image),
            Self::Original(path) => OcrInput::File(path),
        }
    }

    pub fn is_binarized(&self) -> bool {
        matches!(self, Self::Binarized(_))
    }
}

/// Preprocess `path`, falling back to the unmodified file on any failure.
pub fn prepare_for_ocr(path: &Path, config: &ImageConfig) -> PreparedImage {
    if !config.preprocess {
        return PreparedImage::Original(path.to_path_buf());
    }

    match preprocess_file(path, config) {
        Ok(binarized) => PreparedImage::Binarized(binarized),
        Err(e) => {
            tracing::warn!(
                "Preprocessing {} failed, using the original image: {}",
                path.display(),
                e
            );
            PreparedImage::Original(path.to_path_buf())
        }
    }
}

/// Decode, grayscale and binarize the image at `path`.
pub fn preprocess_file(path: &Path, config: &ImageConfig) -> Result<GrayImage> {
    let img = ImageReader::open(path)
        .map_err(|e| DocintakeError::image_processing_with_source(format!("Failed to open {}", path.display()), e))?
        .with_guessed_format()
        .map_err(|e| DocintakeError::image_processing_with_source("Failed to detect image format", e))?
        .decode()
        .map_err(|e| DocintakeError::image_processing_with_source("Failed to decode image", e))?;

    preprocess_image(img, config)
}

pub fn preprocess_image(img: DynamicImage, config: &ImageConfig) -> Result<GrayImage> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(DocintakeError::image_processing(format!(
            "Image has no pixels: {}x{}",
            width, height
        )));
    }

    let img = resize_if_needed(img, config.max_image_dimension);
    let gray = img.to_luma8();

    adaptive_threshold(&gray, config.threshold_block_size, config.threshold_offset)
}

fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_dim && height <= max_dim {
        return img;
    }

    tracing::debug!("Downscaling {}x{} image to fit {}", width, height, max_dim);
    img.resize(max_dim, max_dim, image::imageops::FilterType::Lanczos3)
}

/// Gaussian adaptive threshold.
///
/// A pixel turns white when it is brighter than its Gaussian-weighted neighbourhood
/// mean minus `offset`, black otherwise. The kernel sigma is derived from the block
/// size the same way OpenCV derives it for `ADAPTIVE_THRESH_GAUSSIAN_C`.
pub fn adaptive_threshold(gray: &GrayImage, block_size: u32, offset: f32) -> Result<GrayImage> {
    if block_size < 3 || block_size % 2 == 0 {
        return Err(DocintakeError::image_processing(format!(
            "Threshold block size must be odd and >= 3, got {}",
            block_size
        )));
    }

    let sigma = 0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let local_mean = imageproc::filter::gaussian_blur_f32(gray, sigma);

    Ok(GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0] as f32;
        let threshold = local_mean.get_pixel(x, y)[0] as f32 - offset;
        if value > threshold { Luma([255u8]) } else { Luma([0u8]) }
    }))
}
