pub mod builder;
pub mod doc_info;
pub mod hashed;
pub mod pl;

use std::sync::Arc;
use crate::ircore::Result;
use doc_info::DocInfo;
use pl::PostingsList;

pub use builder::IndexBuilder;
pub use hashed::PersistentHashedIndex;

pub const DICTIONARY_FNAME: &str = "dictionary";
pub const DATA_FNAME: &str = "data";

/// Term lookup shared by the in-memory builder and the frozen on-disk index.
pub trait Index: Send + Sync {
    /// Postings of `term`; an unknown term yields an empty list, not an error.
    fn get_postings(&self, term: &str) -> Result<PostingsList>;
    fn doc_info(&self) -> &Arc<DocInfo>;

    fn document_frequency(&self, term: &str) -> Result<usize> {
        Ok(self.get_postings(term)?.len())
    }
}
