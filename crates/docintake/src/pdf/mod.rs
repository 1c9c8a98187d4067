//! PDF text extraction.
//!
//! - [`text`]: the native text layer, via `lopdf`
//! - [`rendering`]: page images for OCR, via poppler's `pdftoppm`
//! - [`strategy`]: the ordered fallback chain tying both to an OCR backend
pub mod error;
pub mod rendering;
pub mod strategy;
pub mod text;

pub use error::PdfError;
pub use rendering::{PageRenderer, RenderedPages};
pub use strategy::{PdfText, extract_pdf_text};
pub use text::{TextLayer, extract_text_layer, extract_text_layer_from_bytes};
