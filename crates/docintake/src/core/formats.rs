//! File class detection by extension.
//!
//! Classification looks at the lowercased extension only; file contents are never
//! sniffed.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// The extractor a file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Pdf,
    Spreadsheet,
    WordDocument,
    Image,
}

impl FileKind {
    pub const ALL: [FileKind; 4] = [
        FileKind::Pdf,
        FileKind::Spreadsheet,
        FileKind::WordDocument,
        FileKind::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Spreadsheet => "spreadsheet",
            FileKind::WordDocument => "word_document",
            FileKind::Image => "image",
        }
    }

    /// Extensions routed to this kind, without the dot.
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = EXT_TO_KIND
            .iter()
            .filter(|(_, kind)| *kind == self)
            .map(|(ext, _)| *ext)
            .collect();
        extensions.sort_unstable();
        extensions
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static EXT_TO_KIND: Lazy<HashMap<&'static str, FileKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("pdf", FileKind::Pdf);
    m.insert("xls", FileKind::Spreadsheet);
    m.insert("xlsx", FileKind::Spreadsheet);
    m.insert("docx", FileKind::WordDocument);
    m.insert("png", FileKind::Image);
    m.insert("jpg", FileKind::Image);
    m.insert("jpeg", FileKind::Image);
    m.insert("tiff", FileKind::Image);
    m.insert("bmp", FileKind::Image);
    m
});

/// Lowercased extension with its leading dot (`.pdf`), or `""` when there is none.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Classify a normalized extension (`.pdf`). `None` means unsupported.
pub fn classify_extension(extension: &str) -> Option<FileKind> {
    EXT_TO_KIND
        .get(extension.strip_prefix('.').unwrap_or(extension))
        .copied()
}

/// Classify `path` by its extension.
pub fn classify(path: &Path) -> Option<FileKind> {
    classify_extension(&normalized_extension(path))
}

/// Every supported extension with its dot, sorted.
pub fn supported_extensions() -> Vec<String> {
    let mut extensions: Vec<String> = FileKind::ALL
        .iter()
        .flat_map(FileKind::extensions)
        .map(|ext| format!(".{}", ext))
        .collect();
    extensions.sort_unstable();
    extensions
}
