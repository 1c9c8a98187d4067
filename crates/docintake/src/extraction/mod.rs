//! Format-specific extraction functions.
//!
//! These are plain functions over a path; the [`extractors`](crate::extractors)
//! module wraps them behind the `DocumentExtractor` trait used by the dispatcher.

pub mod docx;
pub mod excel;
pub mod image;

pub use docx::{extract_docx_file, extract_docx_text};
pub use excel::{cell_value, profile_data, read_workbook, sheet_to_records};
pub use self::image::extract_image_text;
