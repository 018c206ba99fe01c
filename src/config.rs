use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{IngestError, Result};

/// How raw text is cut into sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationStrategy {
    /// UAX#29 sentence boundaries.
    #[default]
    Unicode,
    /// Runs ending in `.`, `!` or `?` followed by whitespace or end of text.
    Punctuation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub strategy: SegmentationStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Number of leading sentences fed to the detector.
    pub sample_sentences: usize,
    /// Character cap on the joined sample.
    pub sample_chars: usize,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            sample_sentences: 120,
            sample_chars: 5000,
        }
    }
}

impl LanguageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_sentences == 0 {
            return Err(IngestError::Config("language.sample_sentences must be > 0".into()));
        }
        if self.sample_chars == 0 {
            return Err(IngestError::Config("language.sample_chars must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// "Chapter N" titles needed before only those chapters count as body.
    pub numbered_chapter_min: usize,
    /// Sections shorter than this are treated as front matter.
    pub min_sentences: usize,
    /// Case-insensitive substrings marking front-matter titles.
    pub noise_titles: Vec<String>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            numbered_chapter_min: 3,
            min_sentences: 10,
            noise_titles: [
                "contents",
                "table of contents",
                "copyright",
                "isbn",
                "publisher",
                "preface",
                "foreword",
                "about",
                "introduction",
                "title page",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl BodyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.numbered_chapter_min == 0 {
            return Err(IngestError::Config("body.numbered_chapter_min must be > 0".into()));
        }
        if self.noise_titles.iter().any(|t| t.trim().is_empty()) {
            return Err(IngestError::Config(
                "body.noise_titles must not contain blank entries".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Sentences copied into the lightweight metadata record.
    pub preview_sentences: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self { preview_sentences: 3 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub segmentation: SegmentationConfig,
    pub language: LanguageConfig,
    pub body: BodyConfig,
    pub library: LibraryConfig,
}

impl ReaderConfig {
    /// Load a JSON config file; missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.language.validate()?;
        self.body.validate()?;
        Ok(())
    }
}

impl fmt::Display for ReaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "segmentation={:?}, language sample={} sentences/{} chars, \
             body: numbered>={} min_sentences={} noise_titles={}, preview={}",
            self.segmentation.strategy,
            self.language.sample_sentences,
            self.language.sample_chars,
            self.body.numbered_chapter_min,
            self.body.min_sentences,
            self.body.noise_titles.len(),
            self.library.preview_sentences,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReaderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.language.sample_sentences, 120);
        assert_eq!(config.body.numbered_chapter_min, 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReaderConfig =
            serde_json::from_str(r#"{"segmentation": {"strategy": "punctuation"}}"#).unwrap();
        assert_eq!(config.segmentation.strategy, SegmentationStrategy::Punctuation);
        assert_eq!(config.body.min_sentences, 10);
        assert_eq!(config.library.preview_sentences, 3);
    }

    #[test]
    fn test_zero_sample_rejected() {
        let mut config = ReaderConfig::default();
        config.language.sample_chars = 0;
        assert!(matches!(config.validate(), Err(IngestError::Config(_))));
    }
}
