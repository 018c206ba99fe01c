use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::book::{BookStats, Chapter, DocumentFormat, ProcessedBook};
use crate::config::ReaderConfig;
use crate::error::{IngestError, Result};
use crate::utils::text_processor::{count_words, parse_plain_text, SentenceSegmenter};
use crate::utils::{parse_epub, parse_pdf, parse_subtitles};

/// Turns one uploaded file into a [`ProcessedBook`].
#[derive(Debug, Clone, Default)]
pub struct DocumentProcessor {
    segmenter: SentenceSegmenter,
}

impl DocumentProcessor {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            segmenter: SentenceSegmenter::new(config.segmentation.strategy),
        }
    }

    /// Process an upload. The extension of `filename` picks the parser;
    /// `mime_type` is advisory only. EPUB input needs `path` on disk.
    pub fn process(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
        path: Option<&Path>,
    ) -> Result<ProcessedBook> {
        let format = DocumentFormat::from_filename(filename);
        info!("Processing {} as {} ({} bytes)", filename, format, bytes.len());
        debug!("Declared MIME type: {}", mime_type);

        let parsed = match format {
            DocumentFormat::Pdf => parse_pdf(bytes, &self.segmenter)?,
            DocumentFormat::Epub => {
                let path = path.ok_or_else(|| IngestError::MissingPath {
                    format: "EPUB".to_string(),
                })?;
                parse_epub(path, &self.segmenter)?
            }
            DocumentFormat::Subtitle => {
                parse_subtitles(&String::from_utf8_lossy(bytes), &self.segmenter)
            }
            DocumentFormat::Text => parse_plain_text(bytes, &self.segmenter),
        };

        let chapters: Vec<Chapter> = parsed
            .chapters
            .into_iter()
            .filter(|c| !c.paragraphs.is_empty())
            .collect();

        let title = parsed
            .title
            .unwrap_or_else(|| title_from_filename(filename));

        let sentences: Vec<&String> = chapters.iter().flat_map(Chapter::sentences).collect();
        let word_count = sentences.iter().map(|s| count_words(s)).sum();
        let difficulty_score = difficulty_score(&sentences);

        info!(
            "Processed '{}': {} chapters, {} sentences, {} words, difficulty {:.1}",
            title,
            chapters.len(),
            sentences.len(),
            word_count,
            difficulty_score
        );

        Ok(ProcessedBook {
            title,
            metadata: BookStats {
                word_count,
                sentence_count: sentences.len(),
                difficulty_score,
                format,
            },
            chapters,
        })
    }

    /// Read a file from disk and process it under its own file name.
    pub fn process_file(&self, path: &Path) -> Result<ProcessedBook> {
        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.process(&bytes, &filename, "", Some(path))
    }
}

/// Average sentence length in words, mapped linearly onto 0..=100.
///
/// An average of 5 words or fewer scores 0; 30 words or more scores 100.
pub fn difficulty_score<S: AsRef<str>>(sentences: &[S]) -> f64 {
    if sentences.is_empty() {
        return 0.0;
    }

    let total_words: usize = sentences.iter().map(|s| count_words(s.as_ref())).sum();
    let avg_sentence_length = total_words as f64 / sentences.len() as f64;

    ((avg_sentence_length - 5.0) * 4.0).clamp(0.0, 100.0)
}

/// File name with its final extension removed.
pub fn title_from_filename(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) if idx + 1 < filename.len() && !filename[idx + 1..].contains('/') => {
            filename[..idx].to_string()
        }
        _ => filename.to_string(),
    }
}
