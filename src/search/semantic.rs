//! Vector-similarity ranking over an append-only embedding index.
//!
//! The index is populated in the background after a corpus load. Readers take a snapshot of
//! whatever has been appended so far; entries are never mutated once pushed, so a partially
//! populated index simply yields fewer results.

use crate::corpus::Category;
use crate::error::DocsError;
use crate::search::extract::truncate_chars;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;

/// Characters of item content included in the embedded text.
pub const CONTENT_PREFIX_CHARS: usize = 500;

/// Raw similarity at or below this is dropped.
pub const MIN_SIMILARITY: f32 = 0.1;

/// How long a semantic query waits for population to begin (5 polls of 100 ms).
pub const SEMANTIC_READY_WAIT: Duration = Duration::from_millis(500);

/// Population state of an [`EmbeddingIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// Built but population has not started.
    Pending,
    /// Entries are being appended.
    Building,
    /// Population finished (or was cancelled); no more entries will arrive.
    Ready,
    /// No embedding capability; the index stays empty.
    Disabled,
}

#[derive(Debug)]
pub struct EmbeddingEntry {
    /// Document id within the owning index.
    pub id: usize,
    pub category: Category,
    pub vector: Arc<[f32]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticHit {
    pub id: usize,
    /// Similarity × 100.
    pub score: f64,
}

/// Text an item is embedded under: its title plus a bounded content prefix.
pub fn searchable_text(title: &str, content: &str) -> String {
    format!("{}\n{}", title, truncate_chars(content, CONTENT_PREFIX_CHARS))
}

/// Cosine similarity of two vectors.
///
/// Vectors of different lengths are a contract violation and produce
/// [`DocsError::DimensionMismatch`]. A zero vector has similarity 0 with everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DocsError> {
    if a.len() != b.len() {
        return Err(DocsError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a * norm_b))
}

pub struct EmbeddingIndex {
    entries: RwLock<Vec<Arc<EmbeddingEntry>>>,
    status: watch::Sender<IndexStatus>,
}

impl std::fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("len", &self.len())
            .field("status", &self.status())
            .finish()
    }
}

impl EmbeddingIndex {
    pub fn new(status: IndexStatus) -> Self {
        let (status, _) = watch::channel(status);
        Self {
            entries: RwLock::new(Vec::new()),
            status,
        }
    }

    pub fn disabled() -> Self {
        Self::new(IndexStatus::Disabled)
    }

    pub fn status(&self) -> IndexStatus {
        *self.status.borrow()
    }

    pub fn set_status(&self, status: IndexStatus) {
        self.status.send_replace(status);
    }

    pub fn subscribe(&self) -> watch::Receiver<IndexStatus> {
        self.status.subscribe()
    }

    pub fn push(&self, entry: EmbeddingEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(entry));
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entries appended so far.
    pub fn snapshot(&self) -> Vec<Arc<EmbeddingEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait (bounded by [`SEMANTIC_READY_WAIT`]) until population has at least begun.
    ///
    /// Returns the status observed when the wait ended; `Pending` means the wait timed out.
    pub async fn wait_until_started(&self) -> IndexStatus {
        let mut rx = self.subscribe();
        let started = tokio::time::timeout(
            SEMANTIC_READY_WAIT,
            rx.wait_for(|status| *status != IndexStatus::Pending),
        )
        .await;

        match started {
            Ok(Ok(status)) => *status,
            _ => self.status(),
        }
    }

    /// Rank indexed entries by similarity to `query`, best first.
    ///
    /// Entries with raw similarity at or below [`MIN_SIMILARITY`] are dropped. Equal scores
    /// keep index order.
    pub fn rank(
        &self,
        query: &[f32],
        filter: Option<Category>,
        limit: usize,
    ) -> Result<Vec<SemanticHit>, DocsError> {
        let mut hits = Vec::new();
        for entry in self.snapshot() {
            if filter.is_some_and(|category| category != entry.category) {
                continue;
            }
            let similarity = cosine_similarity(query, &entry.vector)?;
            if similarity > MIN_SIMILARITY {
                hits.push(SemanticHit {
                    id: entry.id,
                    score: f64::from(similarity) * 100.0,
                });
            }
        }

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }
}
