use epub::doc::{EpubDoc, NavPoint};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::data::{Chapter, Paragraph, ParsedDocument};
use crate::error::{IngestError, Result};
use crate::utils::text_processor::SentenceSegmenter;

const PARAGRAPH_TAGS: [&str; 9] = ["p", "li", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6"];

static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(&PARAGRAPH_TAGS.join(", ")).unwrap());
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2").unwrap());

/// Parse an EPUB on disk into chapters of paragraphs.
///
/// A spine item that cannot be decoded is skipped with a warning; only a
/// container that cannot be opened fails the whole book.
pub fn parse_epub(path: &Path, segmenter: &SentenceSegmenter) -> Result<ParsedDocument> {
    info!("Extracting text from EPUB: {:?}", path);

    let mut doc = EpubDoc::new(path).map_err(|e| IngestError::EpubOpen {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let title = doc
        .mdata("title")
        .map(|m| m.value.trim().to_string())
        .filter(|t| !t.is_empty());

    let mut toc = Vec::new();
    flatten_toc(&doc.toc, &mut toc);

    let mut chapters = Vec::new();

    for index in 0..doc.get_num_chapters() {
        doc.set_current_chapter(index);
        let id = doc
            .get_current_id()
            .unwrap_or_else(|| format!("spine_{}", index));

        let Some(html) = read_chapter_html(&mut doc, &id) else {
            continue;
        };

        let paragraphs = paragraphs_from_html(&html, segmenter);
        if paragraphs.is_empty() {
            debug!("EPUB item {} has no text, dropping", id);
            continue;
        }

        let chapter_title = doc
            .get_current_path()
            .and_then(|p| toc_label(&toc, &p))
            .or_else(|| first_heading(&html))
            .unwrap_or(id);

        chapters.push(Chapter::new(chapter_title, paragraphs));
    }

    info!("Extracted {} chapters from EPUB", chapters.len());

    Ok(ParsedDocument { title, chapters })
}

/// Read the current spine item as markup.
///
/// Items that are not valid UTF-8 or are declared with an unexpected media
/// type fail the strict read; those are retried as raw bytes when the
/// declared type still looks like HTML.
fn read_chapter_html<R: Read + Seek>(doc: &mut EpubDoc<R>, id: &str) -> Option<String> {
    if let Some((html, _mime)) = doc.get_current_str() {
        return Some(html);
    }

    let mime = doc.get_resource_mime(id).unwrap_or_default();
    if !is_html_like(&mime) {
        warn!("Skipping non-HTML EPUB item in spine: {} ({})", id, mime);
        return None;
    }

    match doc.get_resource(id) {
        Some((bytes, _)) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        None => {
            warn!("EPUB chapter fallback read failed: {}", id);
            None
        }
    }
}

fn is_html_like(mime: &str) -> bool {
    let mime = mime.trim().to_lowercase();
    mime.contains("html") || mime.ends_with("+xml")
}

/// Split chapter markup into paragraphs of sentences.
///
/// Each `p`/`li`/`blockquote`/heading element is one paragraph holding its
/// own text; text inside a nested block of those kinds belongs to the nested
/// paragraph only. Markup without any of them contributes its whole body as
/// one paragraph.
pub fn paragraphs_from_html(html: &str, segmenter: &SentenceSegmenter) -> Vec<Paragraph> {
    let document = Html::parse_document(html);

    let mut blocks: Vec<String> = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|el| collect_text(el, true))
        .filter(|text| !text.is_empty())
        .collect();

    if blocks.is_empty() {
        blocks = document
            .select(&BODY_SELECTOR)
            .map(|el| collect_text(el, false))
            .filter(|text| !text.is_empty())
            .collect();
    }

    blocks
        .iter()
        .map(|block| segmenter.segment(block))
        .filter(|sentences| !sentences.is_empty())
        .collect()
}

/// Text content with whitespace collapsed; script and style bodies are left out.
///
/// With `own_only`, text under a nested paragraph-level element is skipped.
fn collect_text(element: ElementRef<'_>, own_only: bool) -> String {
    let mut out = String::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != element.id())
            .filter_map(|a| a.value().as_element())
            .any(|e| {
                matches!(e.name(), "script" | "style")
                    || (own_only && PARAGRAPH_TAGS.contains(&e.name()))
            });
        if !hidden {
            out.push_str(text);
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_heading(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&HEADING_SELECTOR)
        .map(|el| collect_text(el, false))
        .find(|text| !text.is_empty())
}

fn flatten_toc(points: &[NavPoint], out: &mut Vec<(PathBuf, String)>) {
    for point in points {
        let content = point.content.to_string_lossy();
        let file = content.split('#').next().unwrap_or_default();
        out.push((PathBuf::from(file), point.label.trim().to_string()));
        flatten_toc(&point.children, out);
    }
}

fn toc_label(toc: &[(PathBuf, String)], path: &Path) -> Option<String> {
    toc.iter()
        .find(|(content, label)| {
            !label.is_empty() && (path.ends_with(content) || content.ends_with(path))
        })
        .map(|(_, label)| label.clone())
}
