//! Document discovery and loading
//!
//! Turns user-supplied paths (files or directories) into `Document`s:
//! - Directories are walked recursively
//! - Only `.md`, `.txt`, `.pdf` and `.docx` files are kept
//! - Duplicates are dropped and the result is sorted for reproducible chunk ids

use crate::errors::IngestionError;
use crate::docx::extract_text_from_docx;
use crate::pdf::extract_text_from_pdf;
use resumeforge_common::types::Document;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File extensions the loader can extract text from
pub const SUPPORTED_EXTENSIONS: &[&str] = &["md", "txt", "pdf", "docx"];

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Check whether a path has a supported extension
pub fn is_supported(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Expand inputs into a sorted, de-duplicated list of supported files
pub fn discover_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, IngestionError> {
    let mut files = BTreeSet::new();

    for input in inputs {
        if !input.exists() {
            return Err(IngestionError::FileNotFound(input.display().to_string()));
        }

        if input.is_file() {
            if is_supported(input) {
                files.insert(canonical(input));
            } else {
                debug!(path = %input.display(), "Skipping unsupported file");
            }
            continue;
        }

        for entry in WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_supported(entry.path()) {
                files.insert(canonical(entry.path()));
            }
        }
    }

    if files.is_empty() {
        return Err(IngestionError::NoDocuments);
    }

    Ok(files.into_iter().collect())
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Read the plain text of a single supported file
pub fn read_file_text(path: &Path) -> Result<String, IngestionError> {
    match extension_of(path).as_deref() {
        Some("md") | Some("txt") => {
            let bytes = std::fs::read(path).map_err(|source| IngestionError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some("pdf") => extract_text_from_pdf(path),
        Some("docx") => extract_text_from_docx(path),
        _ => Err(IngestionError::UnsupportedFileType(path.display().to_string())),
    }
}

/// Discover and read every document under the inputs, skipping blank ones
pub fn load_documents(inputs: &[PathBuf]) -> Result<Vec<Document>, IngestionError> {
    let files = discover_files(inputs)?;
    let mut documents = Vec::with_capacity(files.len());

    for path in &files {
        let text = read_file_text(path)?;
        if text.trim().is_empty() {
            warn!(path = %path.display(), "Skipping empty document");
            continue;
        }
        documents.push(Document::new(path.display().to_string(), text));
    }

    if documents.is_empty() {
        return Err(IngestionError::NoDocuments);
    }

    info!(files = files.len(), documents = documents.len(), "Documents loaded");
    Ok(documents)
}

/// Read the job description, which must contain text
pub fn read_job_description(path: &Path) -> Result<String, IngestionError> {
    if !path.exists() {
        return Err(IngestionError::FileNotFound(path.display().to_string()));
    }
    let text = read_file_text(path)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(IngestionError::EmptyDocument(path.display().to_string()));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("cv.MD")));
        assert!(is_supported(Path::new("notes.txt")));
        assert!(is_supported(Path::new("paper.pdf")));
        assert!(is_supported(Path::new("cv.DOCX")));
        assert!(!is_supported(Path::new("cv.doc")));
        assert!(!is_supported(Path::new("Makefile")));
    }

    #[test]
    fn test_discover_walks_directories_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("projects");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("cv.md"), "# CV").unwrap();
        fs::write(nested.join("rust.txt"), "Rust work").unwrap();
        fs::write(nested.join("image.png"), [0u8, 1, 2]).unwrap();

        let inputs = vec![dir.path().to_path_buf(), dir.path().join("cv.md")];
        let files = discover_files(&inputs).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
        assert!(files.iter().any(|p| p.ends_with("cv.md")));
        assert!(files.iter().any(|p| p.ends_with("projects/rust.txt")));
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let err = discover_files(&[PathBuf::from("/definitely/not/here")]).unwrap_err();
        assert!(matches!(err, IngestionError::FileNotFound(_)));
    }

    #[test]
    fn test_no_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cv.rtf"), "{\\rtf1}").unwrap();
        let err = discover_files(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, IngestionError::NoDocuments));
    }

    #[test]
    fn test_load_documents_skips_blank_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "Shipped a Rust CLI").unwrap();
        fs::write(dir.path().join("b.txt"), "  \n ").unwrap();

        let docs = load_documents(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].source.ends_with("a.md"));
        assert_eq!(docs[0].text, "Shipped a Rust CLI");
    }

    #[test]
    fn test_load_documents_skips_textless_pdf() {
        let dir = tempfile::tempdir().unwrap();
        crate::pdf::write_blank_pdf(&dir.path().join("scan.pdf"));
        fs::write(dir.path().join("cv.md"), "Built ingestion pipelines").unwrap();

        let docs = tokio_test::assert_ok!(load_documents(&[dir.path().to_path_buf()]));
        assert_eq!(docs.len(), 1);
        assert!(docs[0].source.ends_with("cv.md"));
    }

    #[test]
    fn test_load_documents_reads_docx() {
        let dir = tempfile::tempdir().unwrap();
        crate::docx::write_docx(
            &dir.path().join("cv.docx"),
            "<w:p><w:r><w:t>Staff Engineer</w:t></w:r></w:p><w:p><w:r><w:t>Rust, Kafka</w:t></w:r></w:p>",
        );
        fs::write(dir.path().join("notes.txt"), "On-call lead").unwrap();

        let docs = load_documents(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].source.ends_with("cv.docx"));
        assert_eq!(docs[0].text, "Staff Engineer\n\nRust, Kafka");
    }

    #[test]
    fn test_job_description_must_not_be_empty() {
        let dir = tempfile::tempdir().unwrap();
        let jd = dir.path().join("jd.txt");
        fs::write(&jd, "\n\n").unwrap();
        let err = tokio_test::assert_err!(read_job_description(&jd));
        assert!(matches!(err, IngestionError::EmptyDocument(_)));

        fs::write(&jd, "  Staff Rust Engineer  \n").unwrap();
        assert_eq!(read_job_description(&jd).unwrap(), "Staff Rust Engineer");
    }

    #[test]
    fn test_unsupported_read() {
        let err = read_file_text(Path::new("resume.rtf")).unwrap_err();
        assert!(matches!(err, IngestionError::UnsupportedFileType(_)));
    }
}
