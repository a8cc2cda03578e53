//! DOCX text extraction
//!
//! Reads `word/document.xml` out of the package and keeps the run text of each
//! paragraph. Empty paragraphs are dropped; the rest are joined by a blank line.

use crate::errors::IngestionError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract paragraph text from a DOCX file
pub fn extract_text_from_docx(path: &Path) -> Result<String, IngestionError> {
    let parse_error = |message: String| IngestionError::DocxParseError {
        path: path.display().to_string(),
        message,
    };

    let file = File::open(path).map_err(|e| IngestionError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| parse_error(format!("Failed to open package: {}", e)))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| parse_error(format!("Missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| parse_error(format!("Failed to read {}: {}", DOCUMENT_PART, e)))?;

    let paragraphs = paragraphs_from_xml(&xml).map_err(parse_error)?;
    debug!(path = %path.display(), paragraphs = paragraphs.len(), "Extracted text from DOCX");

    if paragraphs.is_empty() {
        warn!(path = %path.display(), "No text content extracted from DOCX");
    }
    Ok(paragraphs.join("\n\n"))
}

/// Non-empty paragraph texts of a WordprocessingML body
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(current.clone());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("Bad text at byte {}: {}", reader.buffer_position(), e))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "Malformed XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Minimal DOCX package holding the given document body
#[cfg(test)]
pub(crate) fn write_docx(path: &Path, body: &str) {
    use std::io::Write;

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(DOCUMENT_PART, zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_joined_and_blanks_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        write_docx(
            &path,
            "<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>\
             <w:p></w:p>\
             <w:p><w:r><w:t xml:space=\"preserve\">Rust </w:t></w:r><w:r><w:t>&amp; Go</w:t></w:r></w:p>\
             <w:p><w:r><w:t>   </w:t></w:r></w:p>\
             <w:p><w:r><w:t>Led</w:t><w:tab/><w:t>migrations</w:t></w:r></w:p>",
        );

        let text = tokio_test::assert_ok!(extract_text_from_docx(&path));
        assert_eq!(text, "Jane Doe\n\nRust & Go\n\nLed\tmigrations");
    }

    #[test]
    fn test_text_outside_runs_ignored() {
        let paragraphs =
            paragraphs_from_xml("<w:p><w:pPr><w:pStyle w:val=\"Heading1\"/></w:pPr>stray<w:r><w:t>Title</w:t></w:r></w:p>")
                .unwrap();
        assert_eq!(paragraphs, vec!["Title".to_string()]);
    }

    #[test]
    fn test_docx_without_text_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.docx");
        write_docx(&path, "<w:p></w:p>");
        assert_eq!(extract_text_from_docx(&path).unwrap(), "");
    }

    #[test]
    fn test_non_zip_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(&path, "plain text pretending").unwrap();
        let err = extract_text_from_docx(&path).unwrap_err();
        assert!(matches!(err, IngestionError::DocxParseError { .. }));
    }

    #[test]
    fn test_package_without_document_part_rejected() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("word/styles.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        zip.finish().unwrap();

        let err = extract_text_from_docx(&path).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}
