use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the ingestion pipeline and the record store.
///
/// A single bad EPUB chapter is not an error: it is logged and skipped.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to parse PDF: {message}")]
    PdfExtraction { message: String },

    #[error("Failed to open EPUB {path:?}: {message}")]
    EpubOpen { path: PathBuf, message: String },

    #[error("{format} parsing needs the uploaded file on disk, but no path was given")]
    MissingPath { format: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid book id: {0:?}")]
    InvalidId(String),

    #[error("Book not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
