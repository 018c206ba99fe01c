pub mod epub_parser;
pub mod pdf_parser;
pub mod subtitle_parser;
pub mod text_processor;

pub use epub_parser::parse_epub;
pub use pdf_parser::{extract_text_from_pdf, parse_pdf};
pub use subtitle_parser::parse_subtitles;
pub use text_processor::{
    count_words, parse_plain_text, split_into_sentences, split_paragraphs, SentenceSegmenter,
};
