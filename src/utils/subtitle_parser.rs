use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::data::{Chapter, ParsedDocument};
use crate::utils::text_processor::SentenceSegmenter;

pub const SUBTITLE_CHAPTER_TITLE: &str = "Subtitles";

static RE_CUE_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static RE_CUE_TIMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\d+:)?\d{1,2}:\d{2}(?:[.,]\d+)?\s*-->\s*(?:\d+:)?\d{1,2}:\d{2}(?:[.,]\d+)?")
        .unwrap()
});

/// Subtitle text lines with cue numbers, timings and the WebVTT header removed.
pub fn subtitle_text_lines(content: &str) -> Vec<&str> {
    content
        .trim_start_matches('\u{FEFF}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !RE_CUE_INDEX.is_match(line))
        .filter(|line| !RE_CUE_TIMING.is_match(line))
        .filter(|line| *line != "WEBVTT" && !line.starts_with("WEBVTT "))
        .collect()
}

/// Parse SRT/VTT text into one chapter holding one paragraph of sentences.
pub fn parse_subtitles(content: &str, segmenter: &SentenceSegmenter) -> ParsedDocument {
    let lines = subtitle_text_lines(content);
    let sentences = segmenter.segment(&lines.join(" "));

    info!("Parsed {} subtitle lines into {} sentences", lines.len(), sentences.len());

    let paragraphs = if sentences.is_empty() {
        Vec::new()
    } else {
        vec![sentences]
    };

    ParsedDocument {
        title: None,
        chapters: vec![Chapter::new(SUBTITLE_CHAPTER_TITLE, paragraphs)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRT: &str = "1\r\n00:00:01,000 --> 00:00:03,500\r\nHello there.\r\n\r\n\
                       2\r\n00:00:04,000 --> 00:00:06,000\r\nHow are\r\nyou today?\r\n";

    #[test]
    fn test_strips_indices_and_timings() {
        assert_eq!(subtitle_text_lines(SRT), vec!["Hello there.", "How are", "you today?"]);
    }

    #[test]
    fn test_srt_single_paragraph() {
        let doc = parse_subtitles(SRT, &SentenceSegmenter::default());
        assert_eq!(doc.chapters.len(), 1);
        assert_eq!(doc.chapters[0].title, "Subtitles");
        assert_eq!(
            doc.chapters[0].paragraphs,
            vec![vec!["Hello there.".to_string(), "How are you today?".to_string()]]
        );
    }

    #[test]
    fn test_vtt_header_and_short_timings() {
        let vtt = "WEBVTT\n\n00:01.000 --> 00:04.000\nNever drink liquid nitrogen.\n\n\
                   00:05.000 --> 00:09.000 align:start\nIt will perforate your stomach.\n";
        let doc = parse_subtitles(vtt, &SentenceSegmenter::default());
        assert_eq!(
            doc.chapters[0].paragraphs,
            vec![vec![
                "Never drink liquid nitrogen.".to_string(),
                "It will perforate your stomach.".to_string(),
            ]]
        );
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let segmenter = SentenceSegmenter::default();
        let srt = "\u{FEFF}1\r\n00:00:01,000 --> 00:00:03,500\r\nHello there.\r\n";
        let vtt = "\u{FEFF}WEBVTT\n\n00:01.000 --> 00:04.000\nHello there.\n";
        for content in [srt, vtt] {
            let doc = parse_subtitles(content, &segmenter);
            assert_eq!(doc.chapters[0].paragraphs, vec![vec!["Hello there.".to_string()]]);
        }
    }

    #[test]
    fn test_empty_subtitles() {
        let doc =
            parse_subtitles("1\n00:00:01,000 --> 00:00:02,000\n", &SentenceSegmenter::default());
        assert!(doc.chapters[0].paragraphs.is_empty());
    }
}
