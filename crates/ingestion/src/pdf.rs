//! PDF text extraction module
//!
//! Extracts text page by page with lopdf. Pages are separated by a blank line
//! so the chunker can still break on them.

use crate::errors::IngestionError;
use std::path::Path;
use tracing::{debug, warn};

/// Extract text content from a PDF file
pub fn extract_text_from_pdf(path: &Path) -> Result<String, IngestionError> {
    let doc = lopdf::Document::load(path).map_err(|e| IngestionError::PdfParseError {
        path: path.display().to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!(path = %path.display(), page_count = pages.len(), "Extracting text from PDF");

    let mut text = String::new();
    for page in pages {
        match doc.extract_text(&[page]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push_str("\n\n");
            }
            Err(e) => {
                warn!(page = page, error = %e, "Failed to extract text from page, skipping");
            }
        }
    }

    if text.trim().is_empty() {
        // Scanned or image-only PDFs parse fine but carry no text layer
        warn!(path = %path.display(), "No text content extracted from PDF");
        return Ok(String::new());
    }

    let cleaned = clean_text(&text);
    debug!(
        original_len = text.len(),
        cleaned_len = cleaned.len(),
        "Text extraction complete"
    );

    Ok(cleaned)
}

/// Collapse whitespace inside each line while keeping line structure
fn clean_text(text: &str) -> String {
    text.replace('\u{FEFF}', "")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clean_text_keeps_paragraphs() {
        let input = "\u{FEFF}Hello   World\t!\n\n  Second   paragraph  \n";
        assert_eq!(clean_text(input), "Hello World !\n\nSecond paragraph");
    }

    #[test]
    fn test_clean_text_normalizes_quotes() {
        assert_eq!(clean_text("\u{201C}lead\u{201D} \u{2018}s\u{2019}"), "\"lead\" 's'");
    }

    #[test]
    fn test_invalid_pdf_rejected() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"this is not a pdf").unwrap();
        let err = extract_text_from_pdf(file.path()).unwrap_err();
        assert!(matches!(err, IngestionError::PdfParseError { .. }));
    }

    #[test]
    fn test_pdf_without_text_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        write_blank_pdf(&path);

        let text = tokio_test::assert_ok!(extract_text_from_pdf(&path));
        assert!(text.is_empty());
    }
}

/// One-page PDF whose content stream draws nothing
#[cfg(test)]
pub(crate) fn write_blank_pdf(path: &Path) {
    use lopdf::{dictionary, Object, Stream};

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
