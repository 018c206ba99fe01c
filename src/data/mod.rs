mod book;
mod processor;

pub use book::{
    image_key, BookContent, BookMetadata, BookStats, Chapter, ChapterShape, DocumentFormat,
    Paragraph, ParsedDocument, ProcessedBook, RawChapter, ReadingLevel, Sentence,
    CONTENT_SCHEMA_VERSION, UNTITLED,
};
pub use processor::{difficulty_score, title_from_filename, DocumentProcessor};
