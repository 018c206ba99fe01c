//! Picks the chapters worth showing in the reader.
//!
//! Two tiers: when enough chapters are titled "Chapter N", exactly those are
//! the body. Otherwise every chapter must pass each [`ChapterFilter`].

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::normalizer::normalize_chapters;
use crate::config::BodyConfig;
use crate::data::{Chapter, RawChapter};

static RE_NUMBERED_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*chapter\s+\d+\s*$").unwrap());

pub fn is_numbered_chapter(title: &str) -> bool {
    RE_NUMBERED_CHAPTER.is_match(title)
}

/// One fallback-tier rule. A chapter is body only if no rule rejects it.
#[derive(Debug, Clone)]
pub enum ChapterFilter {
    /// Reject chapters without a single sentence.
    HasSentences,
    /// Reject chapters whose title contains a front-matter term.
    NoiseTitle(Regex),
    /// Reject chapters with fewer sentences than this.
    MinSentences(usize),
}

impl ChapterFilter {
    /// Case-insensitive substring match against any of `terms`.
    pub fn noise_title<S: AsRef<str>>(terms: &[S]) -> Option<Self> {
        if terms.is_empty() {
            return None;
        }
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t.as_ref().trim()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i)({})", alternation))
            .ok()
            .map(Self::NoiseTitle)
    }

    pub fn rejects(&self, chapter: &Chapter) -> bool {
        match self {
            Self::HasSentences => chapter.sentence_count() == 0,
            Self::NoiseTitle(re) => re.is_match(&chapter.title),
            Self::MinSentences(min) => chapter.sentence_count() < *min,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BodySelector {
    numbered_chapter_min: usize,
    filters: Vec<ChapterFilter>,
}

impl Default for BodySelector {
    fn default() -> Self {
        Self::new(&BodyConfig::default())
    }
}

impl BodySelector {
    pub fn new(config: &BodyConfig) -> Self {
        let mut filters = vec![ChapterFilter::HasSentences];
        filters.extend(ChapterFilter::noise_title(&config.noise_titles));
        filters.push(ChapterFilter::MinSentences(config.min_sentences));

        Self {
            numbered_chapter_min: config.numbered_chapter_min,
            filters,
        }
    }

    /// Select body chapters from already-normalized chapters.
    ///
    /// Display-only: the input is left untouched.
    pub fn select(&self, chapters: &[Chapter]) -> Vec<Chapter> {
        let numbered: Vec<Chapter> = chapters
            .iter()
            .filter(|c| is_numbered_chapter(&c.title))
            .cloned()
            .collect();

        if numbered.len() >= self.numbered_chapter_min {
            debug!("Using {} numbered chapters as body", numbered.len());
            return numbered;
        }

        let body: Vec<Chapter> = chapters
            .iter()
            .filter(|c| !self.filters.iter().any(|f| f.rejects(c)))
            .cloned()
            .collect();

        debug!("Kept {} of {} chapters after front-matter filtering", body.len(), chapters.len());
        body
    }

    /// Normalize persisted chapters, then select the body.
    pub fn body_chapters(&self, raw: &[RawChapter]) -> Vec<Chapter> {
        self.select(&normalize_chapters(raw))
    }
}
