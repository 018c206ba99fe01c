// Library exports for the CLI and for embedding in the reader service

pub mod config;
pub mod data;
pub mod error;
pub mod language;
pub mod library;
pub mod reader;
pub mod utils;

// Re-export commonly used types
pub use config::ReaderConfig;
pub use data::{BookContent, BookMetadata, Chapter, DocumentProcessor, ProcessedBook, RawChapter};
pub use error::{IngestError, Result};
pub use language::{detect_language, LanguageCode, LanguageHint};
pub use library::{BookRecord, LibraryStore};
pub use reader::{BodySelector, Position, ProgressRecord};
