//! Native text layer extraction with `lopdf`.

use super::error::Result;
use crate::DocintakeError;
use lopdf::Document;
use std::path::Path;

/// Text layer of a whole document.
#[derive(Debug, Clone, Default)]
pub struct TextLayer {
    /// Page texts joined in page order.
    pub text: String,
    pub page_count: usize,
    /// 1-based numbers of pages whose text could not be extracted.
    pub failed_pages: Vec<u32>,
}

impl TextLayer {
    /// True when the layer holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract the text layer of the PDF at `path`, page by page.
///
/// A page that fails is logged and skipped; the remaining pages are still read.
/// Only a document that cannot be opened at all is an error.
pub fn extract_text_layer(path: &Path) -> Result<TextLayer> {
    let document = Document::load(path)?;
    Ok(text_layer_from_document(&document))
}

/// Same as [`extract_text_layer`] for an in-memory PDF.
pub fn extract_text_layer_from_bytes(bytes: &[u8]) -> Result<TextLayer> {
    let document = Document::load_mem(bytes)?;
    Ok(text_layer_from_document(&document))
}

fn text_layer_from_document(document: &Document) -> TextLayer {
    let pages = document.get_pages();
    let mut layer = TextLayer {
        page_count: pages.len(),
        ..Default::default()
    };
    let mut page_texts = Vec::with_capacity(pages.len());

    for page_number in pages.keys().copied() {
        match document.extract_text(&[page_number]) {
            Ok(text) => page_texts.push(text),
            Err(e) => {
                let failure = DocintakeError::TextLayerExtractionFailed {
                    page: page_number,
                    message: e.to_string(),
                };
                tracing::warn!("{}", failure);
                layer.failed_pages.push(page_number);
            }
        }
    }

    layer.text = page_texts.join("\n");
    layer
}
