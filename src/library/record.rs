use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::ReaderConfig;
use crate::data::{
    BookContent, BookMetadata, ProcessedBook, RawChapter, ReadingLevel, CONTENT_SCHEMA_VERSION,
};
use crate::error::{IngestError, Result};
use crate::language::{detect_from_sentences, LanguageCode};

const METADATA_SUFFIX: &str = ".meta.json";
const CONTENT_SUFFIX: &str = ".content.json";

/// A processed book split into its listing record and content blob.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub metadata: BookMetadata,
    pub content: BookContent,
}

impl BookRecord {
    /// Split a processed book for storage.
    ///
    /// `language` is the caller's choice; `Auto` detects it from a sample of
    /// the book's leading sentences.
    pub fn from_processed(
        book: ProcessedBook,
        id: impl Into<String>,
        language: LanguageCode,
        config: &ReaderConfig,
    ) -> Self {
        let id = id.into();

        let language = if language.is_auto() {
            let sample: Vec<&String> = book
                .sentences()
                .take(config.language.sample_sentences)
                .collect();
            let hint = detect_from_sentences(
                &sample,
                config.language.sample_sentences,
                config.language.sample_chars,
            );
            info!("Detected language {} ({})", hint.code, hint.reason);
            hint.code
        } else {
            language
        };

        let preview = book
            .sentences()
            .take(config.library.preview_sentences)
            .cloned()
            .collect();

        let metadata = BookMetadata {
            id: id.clone(),
            title: book.title,
            level: ReadingLevel::from_difficulty(book.metadata.difficulty_score),
            language,
            metadata: book.metadata,
            preview,
        };

        let content = BookContent {
            schema_version: CONTENT_SCHEMA_VERSION,
            id,
            chapters: book.chapters.into_iter().map(RawChapter::from).collect(),
        };

        Self { metadata, content }
    }
}

/// Directory of JSON records, two files per book.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    root: PathBuf,
}

impl LibraryStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// A fresh id based on the current time in milliseconds.
    pub fn next_id(&self) -> String {
        let mut millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        while self.metadata_path(&millis.to_string()).exists() {
            millis += 1;
        }
        millis.to_string()
    }

    pub fn save(&self, record: &BookRecord) -> Result<PathBuf> {
        let id = &record.metadata.id;
        check_id(id)?;

        write_json(&self.content_path(id), &record.content)?;
        let metadata_path = self.metadata_path(id);
        write_json(&metadata_path, &record.metadata)?;

        info!("Saved book '{}' as {:?}", record.metadata.title, metadata_path);
        Ok(metadata_path)
    }

    pub fn load_metadata(&self, id: &str) -> Result<BookMetadata> {
        check_id(id)?;
        read_json(&self.metadata_path(id), id)
    }

    pub fn load_content(&self, id: &str) -> Result<BookContent> {
        check_id(id)?;
        read_json(&self.content_path(id), id)
    }

    /// All readable metadata records, sorted by id.
    pub fn list(&self) -> Result<Vec<BookMetadata>> {
        let mut books = Vec::new();

        for entry in WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            let is_metadata = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(METADATA_SUFFIX))
                .unwrap_or(false);
            if !is_metadata {
                continue;
            }

            let metadata = fs::read_to_string(path)
                .map_err(IngestError::from)
                .and_then(|json| {
                    serde_json::from_str::<BookMetadata>(&json).map_err(IngestError::from)
                });
            match metadata {
                Ok(metadata) => books.push(metadata),
                Err(e) => warn!("Skipping unreadable record {:?}: {}", path, e),
            }
        }

        books.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(books)
    }

    /// Remove a book. Returns whether anything was deleted.
    pub fn delete(&self, id: &str) -> Result<bool> {
        check_id(id)?;
        let mut deleted = false;
        for path in [self.metadata_path(id), self.content_path(id)] {
            if path.exists() {
                fs::remove_file(&path)?;
                deleted = true;
            }
        }
        Ok(deleted)
    }

    fn metadata_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}{}", id, METADATA_SUFFIX))
    }

    fn content_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}{}", id, CONTENT_SUFFIX))
    }
}

fn check_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(IngestError::InvalidId(id.to_string()))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, id: &str) -> Result<T> {
    if !path.exists() {
        return Err(IngestError::NotFound(id.to_string()));
    }
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BookStats, Chapter, DocumentFormat};
    use tempfile::TempDir;

    fn processed(sentences: &[&str]) -> ProcessedBook {
        ProcessedBook {
            title: "Sample".to_string(),
            chapters: vec![Chapter::new(
                "Content",
                vec![sentences.iter().map(|s| s.to_string()).collect()],
            )],
            metadata: BookStats {
                word_count: 0,
                sentence_count: sentences.len(),
                difficulty_score: 50.0,
                format: DocumentFormat::Text,
            },
        }
    }

    #[test]
    fn test_record_split() {
        let config = ReaderConfig::default();
        let record = BookRecord::from_processed(
            processed(&["Один.", "Два.", "Три.", "Четыре."]),
            "42",
            LanguageCode::Auto,
            &config,
        );

        assert_eq!(record.metadata.language, LanguageCode::Ru);
        assert_eq!(record.metadata.level, ReadingLevel::Intermediate);
        assert_eq!(record.metadata.preview, vec!["Один.", "Два.", "Три."]);
        assert_eq!(record.content.schema_version, CONTENT_SCHEMA_VERSION);
        assert_eq!(record.content.chapters.len(), 1);
    }

    #[test]
    fn test_language_override_wins() {
        let record = BookRecord::from_processed(
            processed(&["Hello."]),
            "1",
            LanguageCode::Fr,
            &ReaderConfig::default(),
        );
        assert_eq!(record.metadata.language, LanguageCode::Fr);
    }

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = LibraryStore::open(dir.path()).unwrap();
        let id = store.next_id();
        let record = BookRecord::from_processed(
            processed(&["Hello."]),
            id.clone(),
            LanguageCode::Auto,
            &ReaderConfig::default(),
        );

        store.save(&record).unwrap();
        assert_eq!(store.load_metadata(&id).unwrap(), record.metadata);
        assert_eq!(store.load_content(&id).unwrap(), record.content);
        assert_eq!(store.list().unwrap().len(), 1);
        assert_ne!(store.next_id(), id);

        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(matches!(store.load_content(&id), Err(IngestError::NotFound(_))));
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let dir = TempDir::new().unwrap();
        let store = LibraryStore::open(dir.path()).unwrap();
        assert!(matches!(store.load_metadata("../etc"), Err(IngestError::InvalidId(_))));
    }
}
