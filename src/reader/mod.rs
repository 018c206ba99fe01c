pub mod body;
pub mod normalizer;
pub mod position;

pub use body::{is_numbered_chapter, BodySelector, ChapterFilter};
pub use normalizer::{
    normalize_chapter, normalize_chapters, normalize_json_chapters, sanitize_paragraphs,
};
pub use position::{
    flat_to_paragraph_sentence, flat_to_position, position_to_flat_index, to_flat_index,
    ParagraphPosition, Position, ProgressRecord,
};
