mod indexer;
mod provider;
mod scanner;

pub use indexer::Indexer;
pub use provider::{IndexProvider, InMemoryProvider, JsonlProvider, OccurrenceRecord, Role};
pub use scanner::CommentScanner;
