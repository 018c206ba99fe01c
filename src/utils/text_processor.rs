use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::SegmentationStrategy;
use crate::data::{Chapter, Paragraph, ParsedDocument};

pub const TEXT_CHAPTER_TITLE: &str = "Content";

static RE_TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());
static RE_LEADING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]+").unwrap());
static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static RE_SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").unwrap());

/// Splits a run of text into trimmed, non-empty sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSegmenter {
    strategy: SegmentationStrategy,
}

impl SentenceSegmenter {
    pub fn new(strategy: SegmentationStrategy) -> Self {
        Self { strategy }
    }

    /// Segment `text` into sentences. Empty or whitespace-only input yields nothing.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let clean = text.replace("\r\n", "\n");
        let clean = clean.trim();
        if clean.is_empty() {
            return Vec::new();
        }

        match self.strategy {
            SegmentationStrategy::Unicode => clean
                .split_sentence_bounds()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            SegmentationStrategy::Punctuation => split_on_terminators(clean),
        }
    }

    /// Split `text` into paragraphs, then each paragraph into sentences.
    pub fn segment_paragraphs(&self, text: &str) -> Vec<Paragraph> {
        split_paragraphs(text)
            .iter()
            .map(|p| self.segment(p))
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Sentence split with the default (UAX#29) strategy.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    SentenceSegmenter::default().segment(text)
}

// Trailing text without a terminator is kept as its own sentence.
fn split_on_terminators(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in RE_SENTENCE_END.find_iter(text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}

/// Split raw text into paragraphs on blank lines.
///
/// Line breaks inside a paragraph are folded into single spaces, so each
/// returned paragraph is one run of text ready for sentence segmentation.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\u{00A0}', " ");
    let text = RE_TRAILING_WS.replace_all(&text, "\n");
    let text = RE_LEADING_WS.replace_all(&text, "\n");

    RE_BLANK_LINES
        .split(text.trim())
        .map(|p| p.replace('\n', " ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Decode plain text (lossy UTF-8) into a single chapter.
pub fn parse_plain_text(bytes: &[u8], segmenter: &SentenceSegmenter) -> ParsedDocument {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{FEFF}');
    ParsedDocument {
        title: None,
        chapters: vec![Chapter::new(TEXT_CHAPTER_TITLE, segmenter.segment_paragraphs(text))],
    }
}

/// Whitespace-delimited token count.
pub fn count_words(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paragraphs_blank_lines() {
        let text = "Hello there. It is sunny.\n\nSecond paragraph here.";
        let paragraphs = split_paragraphs(text);
        assert_eq!(paragraphs, vec!["Hello there. It is sunny.", "Second paragraph here."]);
    }

    #[test]
    fn test_split_paragraphs_folds_lines() {
        let text = "  first line  \r\n   second line\r\n \r\n\n\nnext\u{00A0}block ";
        let paragraphs = split_paragraphs(text);
        assert_eq!(paragraphs, vec!["first line second line", "next block"]);
    }

    #[test]
    fn test_split_paragraphs_single_block() {
        assert_eq!(split_paragraphs("one\ntwo"), vec!["one two"]);
        assert!(split_paragraphs(" \n\n \t").is_empty());
    }

    #[test]
    fn test_unicode_segmentation() {
        let sentences = split_into_sentences("Hello there. It is sunny.");
        assert_eq!(sentences, vec!["Hello there.", "It is sunny."]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_into_sentences("").is_empty());
        assert!(split_into_sentences(" \r\n ").is_empty());
        let punct = SentenceSegmenter::new(SegmentationStrategy::Punctuation);
        assert!(punct.segment("\n\n").is_empty());
    }

    #[test]
    fn test_punctuation_fallback() {
        let punct = SentenceSegmenter::new(SegmentationStrategy::Punctuation);
        assert_eq!(
            punct.segment("Wait!! Really? Pi is 3.14 today."),
            vec!["Wait!!", "Really?", "Pi is 3.14 today."]
        );
    }

    #[test]
    fn test_punctuation_keeps_unterminated_text() {
        let punct = SentenceSegmenter::new(SegmentationStrategy::Punctuation);
        assert_eq!(punct.segment("no terminator here"), vec!["no terminator here"]);
        assert_eq!(punct.segment("Done. trailing bit"), vec!["Done.", "trailing bit"]);
    }

    #[test]
    fn test_segment_paragraphs() {
        let segmenter = SentenceSegmenter::default();
        let paragraphs =
            segmenter.segment_paragraphs("Hello there. It is sunny.\n\nSecond paragraph here.");
        assert_eq!(
            paragraphs,
            vec![
                vec!["Hello there.".to_string(), "It is sunny.".to_string()],
                vec!["Second paragraph here.".to_string()],
            ]
        );
    }

    #[test]
    fn test_parse_plain_text() {
        let segmenter = SentenceSegmenter::default();
        let doc = parse_plain_text("\u{FEFF}One. Two.\r\n\r\nThree.".as_bytes(), &segmenter);
        assert_eq!(doc.title, None);
        assert_eq!(doc.chapters.len(), 1);
        assert_eq!(doc.chapters[0].title, "Content");
        assert_eq!(doc.chapters[0].paragraphs.len(), 2);
        assert_eq!(doc.chapters[0].paragraphs[0], vec!["One.", "Two."]);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("  It is   sunny. "), 3);
        assert_eq!(count_words(""), 0);
    }
}
