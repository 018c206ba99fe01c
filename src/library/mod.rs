mod record;

pub use record::{BookRecord, LibraryStore};
