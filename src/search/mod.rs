//! Ranking and extraction over a parsed corpus.
//!
//! Keyword and semantic rankers score items independently; the hybrid merger combines their
//! result lists. Title/excerpt extraction turns a ranked item into presentable text.

pub mod extract;
pub mod hybrid;
pub mod keyword;
pub mod practices;
pub mod semantic;
pub mod tokenize;

pub use extract::{extract_excerpt, extract_title, item_url};
pub use hybrid::merge;
pub use semantic::{EmbeddingIndex, IndexStatus, cosine_similarity};
pub use tokenize::query_terms;

/// An item presented to a ranker: a stable id plus the text it is scored on.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub id: usize,
    pub title: &'a str,
    pub content: &'a str,
}
