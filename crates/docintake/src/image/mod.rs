//! Raster image handling ahead of OCR.

pub mod preprocessing;

pub use preprocessing::{PreparedImage, adaptive_threshold, prepare_for_ocr, preprocess_file};
