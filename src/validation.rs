//! Client-side field checks.
//!
//! Issue keys, project keys and upload documents are checked here before any
//! request is issued. Failures are surfaced as transient banners.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// The only document type the task generator accepts.
pub const PDF_MIME: &str = "application/pdf";

/// Largest document the task generator accepts (15 MiB).
pub const MAX_DOCUMENT_BYTES: u64 = 15 * 1024 * 1024;

/// Leading bytes of every PDF file.
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Errors for issue and project keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueKeyError {
    #[error("Enter an issue key, e.g. PIA-30")]
    Empty,
    #[error("'{0}' is not a valid issue key, e.g. PIA-30")]
    Malformed(String),
    #[error("'{0}' is not a valid project key, e.g. PIA")]
    MalformedProject(String),
}

/// Errors for upload documents.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only PDF files are allowed")]
    WrongType {
        /// The detected MIME type.
        mime: String,
    },
    #[error("The file cannot exceed 15MB")]
    TooLarge {
        /// The file size in bytes.
        size: u64,
    },
    #[error("'{0}' is not a file")]
    NotAFile(PathBuf),
    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),
}

fn issue_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{2,4}-\d+$").expect("valid issue key regex"))
}

fn project_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{2,4}$").expect("valid project key regex"))
}

/// Validate an issue key: two to four uppercase letters, a hyphen, digits.
pub fn validate_issue_key(input: &str) -> Result<&str, IssueKeyError> {
    if input.is_empty() {
        return Err(IssueKeyError::Empty);
    }
    if !issue_key_pattern().is_match(input) {
        return Err(IssueKeyError::Malformed(input.to_string()));
    }
    Ok(input)
}

/// Validate a project key: two to four uppercase letters.
pub fn validate_project_key(input: &str) -> Result<&str, IssueKeyError> {
    if input.is_empty() {
        return Err(IssueKeyError::Empty);
    }
    if !project_key_pattern().is_match(input) {
        return Err(IssueKeyError::MalformedProject(input.to_string()));
    }
    Ok(input)
}

/// Check a document's type and size.
pub fn validate_document(mime: &str, size: u64) -> Result<(), UploadError> {
    if mime != PDF_MIME {
        return Err(UploadError::WrongType {
            mime: mime.to_string(),
        });
    }
    if size > MAX_DOCUMENT_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    Ok(())
}

/// A local document staged for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    /// Where the file lives.
    pub path: PathBuf,
    /// File name sent in the multipart part.
    pub name: String,
    /// Detected MIME type.
    pub mime: String,
    /// Size in bytes.
    pub size: u64,
}

impl DocumentFile {
    /// Inspect a path without validating it.
    pub fn inspect(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(UploadError::NotAFile(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = detect_mime(path);
        debug!(file = %name, %mime, size = metadata.len(), "Inspected document");

        Ok(Self {
            path: path.to_path_buf(),
            name,
            mime,
            size: metadata.len(),
        })
    }

    /// Inspect and validate a path in one step.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let document = Self::inspect(path)?;
        validate_document(&document.mime, document.size)?;
        Ok(document)
    }

    /// Size in MiB for display, two decimals.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}

/// Guess the MIME type of a file from its extension, falling back to its
/// leading bytes.
fn detect_mime(path: &Path) -> String {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    let by_extension = match extension.as_deref() {
        Some("pdf") => Some(PDF_MIME),
        Some("txt") | Some("md") => Some("text/plain"),
        Some("doc") => Some("application/msword"),
        Some("docx") => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        Some("png") => Some("image/png"),
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        _ => None,
    };

    if let Some(mime) = by_extension {
        return mime.to_string();
    }

    if has_pdf_signature(path) {
        PDF_MIME.to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

fn has_pdf_signature(path: &Path) -> bool {
    let mut head = [0u8; 5];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut head))
        .map(|_| head == PDF_SIGNATURE)
        .unwrap_or(false)
}
