//! Word document (.docx) extraction using docx-rs.
//!
//! Only top-level body paragraphs are read, in document order. Tables, headers,
//! footers and text boxes are not part of the output.

use crate::{DocintakeError, Result};
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use std::path::Path;

/// Read the document at `path` and join its paragraphs with `\n`.
pub fn extract_docx_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| {
        DocintakeError::word_document_with_source(format!("Failed to read {}", path.display()), e)
    })?;
    extract_docx_text(&bytes)
}

/// Extract paragraph text from in-memory `.docx` bytes.
///
/// Empty paragraphs are kept, so blank lines in the document survive as blank lines.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| DocintakeError::word_document(format!("DOCX parse error: {}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&mut text, &paragraph.children);
    text
}

fn push_children(buffer: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(text) => buffer.push_str(&text.text),
                        RunChild::Tab(_) => buffer.push('\t'),
                        RunChild::Break(_) => buffer.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(buffer, &link.children),
            _ => {}
        }
    }
}
