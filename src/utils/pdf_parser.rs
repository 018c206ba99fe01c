use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

use crate::data::{Chapter, ParsedDocument};
use crate::error::{IngestError, Result};
use crate::utils::text_processor::SentenceSegmenter;

pub const PDF_CHAPTER_TITLE: &str = "Full Text";

/// Extract the raw text layer of an in-memory PDF.
pub fn extract_text_from_pdf(bytes: &[u8]) -> Result<String> {
    info!("Extracting text from PDF ({} bytes)", bytes.len());

    // pdf-extract can panic on malformed files; report that as a parse failure.
    let extracted =
        panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

    match extracted {
        Ok(Ok(text)) => {
            if text.trim().is_empty() {
                warn!("PDF appears to be scanned or has no extractable text");
            }
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!("PDF parse error: {}", e);
            Err(IngestError::PdfExtraction {
                message: e.to_string(),
            })
        }
        Err(_) => Err(IngestError::PdfExtraction {
            message: "PDF decoder aborted on malformed input".to_string(),
        }),
    }
}

/// Structure extracted PDF text as a single chapter.
///
/// Form feeds mark page breaks and are treated as paragraph boundaries.
pub fn chapters_from_text(text: &str, segmenter: &SentenceSegmenter) -> Vec<Chapter> {
    let text = text.replace('\x0C', "\n\n");
    let paragraphs = segmenter.segment_paragraphs(&text);

    info!("Structured PDF text into {} paragraphs", paragraphs.len());

    vec![Chapter::new(PDF_CHAPTER_TITLE, paragraphs)]
}

pub fn parse_pdf(bytes: &[u8], segmenter: &SentenceSegmenter) -> Result<ParsedDocument> {
    let text = extract_text_from_pdf(bytes)?;
    Ok(ParsedDocument {
        title: None,
        chapters: chapters_from_text(&text, segmenter),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_breaks_split_paragraphs() {
        let segmenter = SentenceSegmenter::default();
        let chapters = chapters_from_text("Page one ends here.\x0CPage two. More.", &segmenter);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Full Text");
        assert_eq!(
            chapters[0].paragraphs,
            vec![
                vec!["Page one ends here.".to_string()],
                vec!["Page two.".to_string(), "More.".to_string()],
            ]
        );
    }

    #[test]
    fn test_garbage_is_parse_failure() {
        let segmenter = SentenceSegmenter::default();
        let result = parse_pdf(b"this is not a pdf", &segmenter);
        assert!(matches!(result, Err(IngestError::PdfExtraction { .. })));
    }
}
