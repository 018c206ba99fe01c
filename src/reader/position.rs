//! Translation between flat sentence offsets and structured reader positions,
//! and decoding of every saved-progress format the reader has written.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::{Chapter, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub chapter_index: usize,
    pub paragraph_index: usize,
    pub sentence_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphPosition {
    pub paragraph_index: usize,
    pub sentence_index: usize,
}

/// Flat offset of a sentence within one chapter's paragraphs.
///
/// A paragraph index past the end resolves to the chapter's last sentence.
pub fn to_flat_index(
    paragraphs: &[Paragraph],
    paragraph_index: usize,
    sentence_index: usize,
) -> usize {
    let mut flat = 0;
    for (p, paragraph) in paragraphs.iter().enumerate() {
        if p == paragraph_index {
            return flat + sentence_index;
        }
        flat += paragraph.len();
    }
    flat.saturating_sub(1)
}

/// Flat offset of a position across the whole book.
pub fn position_to_flat_index(chapters: &[Chapter], position: Position) -> usize {
    let before: usize = chapters
        .iter()
        .take(position.chapter_index)
        .map(Chapter::sentence_count)
        .sum();
    let within = chapters
        .get(position.chapter_index)
        .map(|c| to_flat_index(&c.paragraphs, position.paragraph_index, position.sentence_index))
        .unwrap_or(0);
    before + within
}

/// Resolve a book-wide flat offset. Offsets past the end clamp to the last
/// sentence of the last chapter that has one.
///
/// A book without any sentence resolves to `(0, 0, 0)`.
pub fn flat_to_position(flat_index: usize, chapters: &[Chapter]) -> Position {
    let mut idx = flat_index;
    for (c, chapter) in chapters.iter().enumerate() {
        for (p, paragraph) in chapter.paragraphs.iter().enumerate() {
            if idx < paragraph.len() {
                return Position {
                    chapter_index: c,
                    paragraph_index: p,
                    sentence_index: idx,
                };
            }
            idx -= paragraph.len();
        }
    }

    let Some(chapter_index) = chapters.iter().rposition(|c| c.sentence_count() > 0) else {
        return Position {
            chapter_index: 0,
            paragraph_index: 0,
            sentence_index: 0,
        };
    };
    let last = last_sentence(&chapters[chapter_index].paragraphs);
    Position {
        chapter_index,
        paragraph_index: last.paragraph_index,
        sentence_index: last.sentence_index,
    }
}

/// Resolve a chapter-scoped flat offset, clamping past the end.
pub fn flat_to_paragraph_sentence(
    flat_index: usize,
    paragraphs: &[Paragraph],
) -> ParagraphPosition {
    let mut idx = flat_index;
    for (p, paragraph) in paragraphs.iter().enumerate() {
        if idx < paragraph.len() {
            return ParagraphPosition {
                paragraph_index: p,
                sentence_index: idx,
            };
        }
        idx -= paragraph.len();
    }
    last_sentence(paragraphs)
}

// Last non-empty paragraph; (0, 0) when there is none.
fn last_sentence(paragraphs: &[Paragraph]) -> ParagraphPosition {
    match paragraphs.iter().rposition(|p| !p.is_empty()) {
        Some(paragraph_index) => ParagraphPosition {
            paragraph_index,
            sentence_index: paragraphs[paragraph_index].len() - 1,
        },
        None => ParagraphPosition {
            paragraph_index: 0,
            sentence_index: 0,
        },
    }
}

/// A saved reading position in any of its historical formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressRecord {
    /// Bare integer: flat offset across all body chapters.
    Flat(usize),
    /// `{chapterIndex, paragraphIndex, sentenceIndex}`.
    Structured(Position),
    /// `{chapterIndex, sentenceIndex}` with a chapter-scoped flat offset.
    ChapterFlat {
        chapter_index: usize,
        sentence_index: usize,
    },
    /// Only a chapter could be recovered.
    ChapterOnly { chapter_index: usize },
}

impl ProgressRecord {
    /// Decode a stored progress value. Returns `None` for unreadable input.
    pub fn parse(saved: &str) -> Option<Self> {
        let saved = saved.trim();
        if !saved.is_empty() && saved.bytes().all(|b| b.is_ascii_digit()) {
            return Some(Self::Flat(saved.parse().unwrap_or(usize::MAX)));
        }

        let value: Value = serde_json::from_str(saved).ok()?;
        if let Some(flat) = index_value(&value) {
            return Some(Self::Flat(flat));
        }
        let object = value.as_object()?;
        let field = |name: &str| object.get(name).and_then(index_value);

        let chapter_index = field("chapterIndex").unwrap_or(0);
        Some(match (field("paragraphIndex"), field("sentenceIndex")) {
            (Some(paragraph_index), Some(sentence_index)) => Self::Structured(Position {
                chapter_index,
                paragraph_index,
                sentence_index,
            }),
            (None, Some(sentence_index)) => Self::ChapterFlat {
                chapter_index,
                sentence_index,
            },
            _ => Self::ChapterOnly { chapter_index },
        })
    }

    /// Chapter this record points into, clamped to `chapters`.
    pub fn chapter_index(&self, chapters: &[Chapter]) -> usize {
        match self {
            Self::Flat(flat) => flat_to_position(*flat, chapters).chapter_index,
            Self::Structured(position) => clamp_chapter(position.chapter_index, chapters),
            Self::ChapterFlat { chapter_index, .. } | Self::ChapterOnly { chapter_index } => {
                clamp_chapter(*chapter_index, chapters)
            }
        }
    }

    /// Resolve to an in-bounds position over the body chapters.
    ///
    /// `ChapterOnly` records select a chapter but no sentence.
    pub fn resolve(&self, chapters: &[Chapter]) -> Option<Position> {
        match *self {
            Self::Flat(flat) => Some(flat_to_position(flat, chapters)),
            Self::Structured(position) => {
                let chapter_index = clamp_chapter(position.chapter_index, chapters);
                let paragraphs = paragraphs_of(chapters, chapter_index);
                let paragraph_index = position
                    .paragraph_index
                    .min(paragraphs.len().saturating_sub(1));
                let sentence_index = position.sentence_index.min(
                    paragraphs
                        .get(paragraph_index)
                        .map(|p| p.len().saturating_sub(1))
                        .unwrap_or(0),
                );
                Some(Position {
                    chapter_index,
                    paragraph_index,
                    sentence_index,
                })
            }
            Self::ChapterFlat {
                chapter_index,
                sentence_index,
            } => {
                let chapter_index = clamp_chapter(chapter_index, chapters);
                let paragraphs = paragraphs_of(chapters, chapter_index);
                let pos = flat_to_paragraph_sentence(sentence_index, paragraphs);
                Some(Position {
                    chapter_index,
                    paragraph_index: pos.paragraph_index,
                    sentence_index: pos.sentence_index,
                })
            }
            Self::ChapterOnly { .. } => None,
        }
    }
}

fn index_value(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return Some(usize::try_from(n).unwrap_or(usize::MAX));
    }
    if value.as_i64().is_some() {
        return Some(0);
    }
    value.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as usize)
}

fn clamp_chapter(chapter_index: usize, chapters: &[Chapter]) -> usize {
    chapter_index.min(chapters.len().saturating_sub(1))
}

fn paragraphs_of(chapters: &[Chapter], chapter_index: usize) -> &[Paragraph] {
    chapters
        .get(chapter_index)
        .map(|c| c.paragraphs.as_slice())
        .unwrap_or(&[])
}
