use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::language::LanguageCode;

/// A sentence of text, or an inline illustration marker (`<<<IMAGE:key>>>`).
pub type Sentence = String;

/// Ordered sentences; never empty once normalized.
pub type Paragraph = Vec<Sentence>;

pub const UNTITLED: &str = "Untitled";

/// Version written into every persisted [`BookContent`].
pub const CONTENT_SCHEMA_VERSION: u32 = 2;

static RE_IMAGE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<<<IMAGE:([^>]+)>>>").unwrap());

/// Key of the illustration a sentence refers to, if it is an image marker.
pub fn image_key(sentence: &str) -> Option<&str> {
    RE_IMAGE_MARKER
        .captures(sentence)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Canonical chapter shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

impl Chapter {
    pub fn new(title: impl Into<String>, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            title: title.into(),
            paragraphs,
        }
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.paragraphs.iter().flatten()
    }

    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(Vec::len).sum()
    }
}

/// A chapter as persisted, in whatever schema it was written with.
///
/// Older records carry a flat `content` list without paragraph boundaries;
/// missing or null sentences are tolerated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawChapter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<Vec<Option<Vec<Option<String>>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Option<String>>>,
}

/// Which schema a [`RawChapter`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterShape {
    /// Current schema: paragraphs of sentences.
    Paragraphs(Vec<Vec<String>>),
    /// Legacy schema: one flat sentence list.
    Flat(Vec<String>),
    Empty,
}

impl RawChapter {
    /// Resolve the stored shape. `paragraphs` wins unless it holds no text at all.
    pub fn shape(&self) -> ChapterShape {
        if let Some(paragraphs) = &self.paragraphs {
            let paragraphs: Vec<Vec<String>> = paragraphs
                .iter()
                .map(|p| p.iter().flatten().flatten().cloned().collect())
                .collect();
            let has_text = paragraphs.iter().flatten().any(|s| !s.trim().is_empty());
            if has_text {
                return ChapterShape::Paragraphs(paragraphs);
            }
        }

        match &self.content {
            Some(content) => ChapterShape::Flat(content.iter().flatten().cloned().collect()),
            None => ChapterShape::Empty,
        }
    }
}

impl From<Chapter> for RawChapter {
    fn from(chapter: Chapter) -> Self {
        Self {
            title: Some(chapter.title),
            paragraphs: Some(
                chapter
                    .paragraphs
                    .into_iter()
                    .map(|p| Some(p.into_iter().map(Some).collect()))
                    .collect(),
            ),
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Text,
    Pdf,
    Epub,
    Subtitle,
}

impl DocumentFormat {
    /// Pick the format from a file name's extension; anything unknown is text.
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Self::Pdf,
            "epub" => Self::Epub,
            "srt" | "vtt" => Self::Subtitle,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Epub => "epub",
            Self::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a format parser hands back to the document processor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    /// Title reported by the format itself (EPUB metadata).
    pub title: Option<String>,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub difficulty_score: f64,
    pub format: DocumentFormat,
}

/// Result of ingesting one upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBook {
    pub title: String,
    pub chapters: Vec<Chapter>,
    pub metadata: BookStats,
}

impl ProcessedBook {
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.chapters.iter().flat_map(Chapter::sentences)
    }
}

/// Coarse leveling derived from the difficulty score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ReadingLevel {
    pub fn from_difficulty(score: f64) -> Self {
        if score < 34.0 {
            Self::Beginner
        } else if score < 67.0 {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }
}

impl fmt::Display for ReadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Lightweight listing record stored apart from the content blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub id: String,
    pub title: String,
    pub level: ReadingLevel,
    #[serde(default)]
    pub language: LanguageCode,
    pub metadata: BookStats,
    #[serde(default)]
    pub preview: Vec<Sentence>,
}

/// Persisted chapter content. Chapters stay raw so older schemas still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookContent {
    #[serde(default)]
    pub schema_version: u32,
    pub id: String,
    #[serde(default)]
    pub chapters: Vec<RawChapter>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_key() {
        assert_eq!(image_key("<<<IMAGE:1767.jpg>>>"), Some("1767.jpg"));
        assert_eq!(image_key("A plain sentence."), None);
    }

    #[test]
    fn test_format_from_filename() {
        assert_eq!(DocumentFormat::from_filename("Book.EPUB"), DocumentFormat::Epub);
        assert_eq!(DocumentFormat::from_filename("talk.vtt"), DocumentFormat::Subtitle);
        assert_eq!(DocumentFormat::from_filename("paper.pdf"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("notes.md"), DocumentFormat::Text);
        assert_eq!(DocumentFormat::from_filename("README"), DocumentFormat::Text);
    }

    #[test]
    fn test_shape_prefers_paragraphs() {
        let raw: RawChapter = serde_json::from_str(
            r#"{"title": "One", "paragraphs": [["A.", "B."]], "content": ["ignored"]}"#,
        )
        .unwrap();
        assert_eq!(
            raw.shape(),
            ChapterShape::Paragraphs(vec![vec!["A.".into(), "B.".into()]])
        );
    }

    #[test]
    fn test_shape_falls_back_to_content() {
        let raw: RawChapter = serde_json::from_str(
            r#"{"title": "One", "paragraphs": [[], [" "]], "content": ["A.", null]}"#,
        )
        .unwrap();
        assert_eq!(raw.shape(), ChapterShape::Flat(vec!["A.".into()]));

        let legacy: RawChapter = serde_json::from_str(r#"{"content": ["x"]}"#).unwrap();
        assert_eq!(legacy.shape(), ChapterShape::Flat(vec!["x".into()]));

        assert_eq!(RawChapter::default().shape(), ChapterShape::Empty);
    }

    #[test]
    fn test_reading_level() {
        assert_eq!(ReadingLevel::from_difficulty(0.0), ReadingLevel::Beginner);
        assert_eq!(ReadingLevel::from_difficulty(50.0), ReadingLevel::Intermediate);
        assert_eq!(ReadingLevel::from_difficulty(100.0), ReadingLevel::Advanced);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = BookStats {
            word_count: 3,
            sentence_count: 1,
            difficulty_score: 0.0,
            format: DocumentFormat::Subtitle,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["wordCount"], 3);
        assert_eq!(json["format"], "subtitle");
    }
}
