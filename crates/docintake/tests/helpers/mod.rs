//! Fixture builders shared by the integration tests.
//!
//! Every document is generated at runtime into a temporary directory, so the tests
//! carry no binary fixtures.
#![allow(dead_code)]

use docintake::{OcrBackend, OcrError, OcrInput, OcrRequest};
use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A PDF with one page per entry; an empty entry produces a page with no text.
///
/// Text goes through a WinAnsi Helvetica font, so keep it ASCII.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let mut operations = Vec::new();
        if !text.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![72.into(), 720.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn write_pdf(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
    write_file(dir, name, &pdf_bytes(pages))
}

/// A Word document with one paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).unwrap();
    buffer.into_inner()
}

pub fn write_docx(dir: &Path, name: &str, paragraphs: &[&str]) -> PathBuf {
    write_file(dir, name, &docx_bytes(paragraphs))
}

/// A spreadsheet cell for [`xlsx_bytes`].
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

pub type SheetRows<'a> = Vec<Vec<Cell<'a>>>;

/// A minimal `.xlsx` package with the given sheets, in order.
pub fn xlsx_bytes(sheets: &[(&str, SheetRows<'_>)]) -> Vec<u8> {
    let mut shared: Vec<String> = Vec::new();
    let mut worksheets = Vec::new();

    for (_, rows) in sheets {
        let mut sheet_data = String::new();
        for (r, row) in rows.iter().enumerate() {
            let row_number = r + 1;
            sheet_data.push_str(&format!("<row r=\"{}\">", row_number));
            for (c, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", column_letter(c), row_number);
                match cell {
                    Cell::Text(text) => {
                        let index = shared.iter().position(|s| s == text).unwrap_or_else(|| {
                            shared.push(text.to_string());
                            shared.len() - 1
                        });
                        sheet_data.push_str(&format!("<c r=\"{}\" t=\"s\"><v>{}</v></c>", reference, index));
                    }
                    Cell::Number(value) => {
                        sheet_data.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", reference, value));
                    }
                    Cell::Blank => {}
                }
            }
            sheet_data.push_str("</row>");
        }
        worksheets.push(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            sheet_data
        ));
    }

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    );
    let mut workbook_sheets = String::new();
    let mut workbook_rels = String::new();
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));
        workbook_sheets.push_str(&format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, name, n, n));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
    }
    content_types.push_str("</Types>");
    workbook_rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
        sheets.len() + 1
    ));

    let shared_strings: String = shared.iter().map(|s| format!("<si><t>{}</t></si>", s)).collect();

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let mut add = |name: &str, body: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        };

        add("[Content_Types].xml", &content_types);
        add(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        );
        add(
            "xl/workbook.xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
                workbook_sheets
            ),
        );
        add(
            "xl/_rels/workbook.xml.rels",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                workbook_rels
            ),
        );
        for (i, sheet) in worksheets.iter().enumerate() {
            add(&format!("xl/worksheets/sheet{}.xml", i + 1), sheet);
        }
        add(
            "xl/sharedStrings.xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">{}</sst>"#,
                shared.len(),
                shared.len(),
                shared_strings
            ),
        );

        zip.finish().unwrap();
    }

    buffer.into_inner()
}

/// The questionnaire workbook: a profile sheet with one client row, plus a
/// second sheet of contracts.
pub fn profile_workbook() -> Vec<u8> {
    xlsx_bytes(&[
        (
            "Анкета Клиента",
            vec![
                vec![Cell::Text("ФИО"), Cell::Text("Телефон")],
                vec![Cell::Text("Иванов Иван Иванович"), Cell::Blank],
            ],
        ),
        (
            "Договоры",
            vec![
                vec![Cell::Text("Номер"), Cell::Text("Сумма")],
                vec![Cell::Text("Д-1"), Cell::Number(150000.0)],
                vec![Cell::Text("Д-2"), Cell::Number(2500.5)],
            ],
        ),
    ])
}

pub fn write_xlsx(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    write_file(dir, name, bytes)
}

/// A small grayscale scan: white page with a dark bar.
pub fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut page = image::GrayImage::from_pixel(64, 32, image::Luma([240u8]));
    for x in 8..56 {
        for y in 12..20 {
            page.put_pixel(x, y, image::Luma([20u8]));
        }
    }
    page.save(&path).unwrap();
    path
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn column_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// A `pdftoppm` stand-in that copies `page` into place once per page number.
#[cfg(unix)]
pub fn fake_pdftoppm(dir: &Path, page: &Path, pages: usize) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    // args: -r DPI -png INPUT PREFIX
    let mut script = String::from("#!/bin/sh\n");
    for number in (1..=pages).rev() {
        script.push_str(&format!("cp '{}' \"$5-{}.png\"\n", page.display(), number));
    }
    let path = write_file(dir, "pdftoppm", script.as_bytes());
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// OCR stub counting calls. Scripted responses are used first, then the fixed one.
pub struct CountingOcr {
    script: Mutex<VecDeque<Result<String, OcrError>>>,
    response: Result<String, OcrError>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl CountingOcr {
    pub fn returning(text: &str) -> Self {
        Self::with_response(Ok(text.to_string()))
    }

    pub fn unavailable() -> Self {
        Self::with_response(Err(OcrError::EngineUnavailable("tesseract not found on PATH".to_string())))
    }

    pub fn failing() -> Self {
        Self::with_response(Err(OcrError::RecognitionFailed("no text recognized".to_string())))
    }

    /// Fails the first call, as an engine that cannot read a PDF directly does.
    pub fn failing_first_then(text: &str) -> Self {
        let ocr = Self::returning(text);
        ocr.script
            .lock()
            .unwrap()
            .push_back(Err(OcrError::RecognitionFailed("cannot read PDF input".to_string())));
        ocr
    }

    fn with_response(response: Result<String, OcrError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            response,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `image` for in-memory pages, otherwise the file name handed over.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl OcrBackend for CountingOcr {
    fn name(&self) -> &str {
        "counting"
    }

    fn recognize(&self, input: OcrInput<'_>, request: &OcrRequest) -> Result<String, OcrError> {
        assert!(request.deadline.is_some(), "OCR must run under a deadline");
        self.calls.fetch_add(1, Ordering::SeqCst);
        let label = match input {
            OcrInput::Image(_) => "image".to_string(),
            OcrInput::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        self.inputs.lock().unwrap().push(label);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.response.clone())
    }
}
