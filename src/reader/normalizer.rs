//! Read-time migration of persisted chapters into the canonical shape.

use serde_json::Value;
use tracing::warn;

use crate::data::{Chapter, ChapterShape, Paragraph, RawChapter, UNTITLED};

/// Separator lines some EPUBs carry between sections.
const BOILERPLATE_MARKERS: [&str; 4] = ["***", "* END *", "END", "*** * END * ***"];

fn is_boilerplate(sentence: &str) -> bool {
    BOILERPLATE_MARKERS.contains(&sentence)
}

/// Normalize one persisted chapter. Running it on its own output is a no-op.
pub fn normalize_chapter(raw: &RawChapter) -> Chapter {
    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    let paragraphs = match raw.shape() {
        ChapterShape::Paragraphs(paragraphs) => paragraphs,
        ChapterShape::Flat(content) => vec![content],
        ChapterShape::Empty => Vec::new(),
    };

    Chapter {
        paragraphs: sanitize_paragraphs(paragraphs, &title),
        title,
    }
}

pub fn normalize_chapters(raw: &[RawChapter]) -> Vec<Chapter> {
    raw.iter().map(normalize_chapter).collect()
}

/// Normalize chapters from an untyped JSON value.
///
/// Entries that are not chapter-shaped are skipped; a value that is not an
/// array yields no chapters.
pub fn normalize_json_chapters(value: &Value) -> Vec<Chapter> {
    let Some(entries) = value.as_array() else {
        warn!("Persisted chapters are not a list; nothing to read");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<RawChapter>(entry.clone()) {
            Ok(raw) => Some(normalize_chapter(&raw)),
            Err(e) => {
                warn!("Skipping unreadable chapter {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Trim sentences, drop blanks and boilerplate markers, drop empty
/// paragraphs, and strip leading sentences that just repeat the title.
pub fn sanitize_paragraphs(paragraphs: Vec<Paragraph>, title: &str) -> Vec<Paragraph> {
    let mut cleaned: Vec<Paragraph> = paragraphs
        .into_iter()
        .map(|paragraph| {
            paragraph
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && !is_boilerplate(s))
                .collect::<Paragraph>()
        })
        .filter(|paragraph| !paragraph.is_empty())
        .collect();

    let title_lower = title.trim().to_lowercase();
    if title_lower.is_empty() {
        return cleaned;
    }

    while let Some(first) = cleaned.first_mut() {
        if first[0].to_lowercase() != title_lower {
            break;
        }
        first.remove(0);
        if first.is_empty() {
            cleaned.remove(0);
        }
    }

    cleaned
}
