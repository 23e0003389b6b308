//! Corpus load lifecycle.
//!
//! [`DocState`] owns the current [`DocsIndex`]. Tool handlers call [`DocState::index`], which
//! returns the loaded index or awaits the in-flight load shared by every concurrent caller.
//! A reload builds a fresh index and swaps it in; readers holding the old `Arc` keep a
//! consistent view until they drop it.

use crate::embedding::EmbeddingCapability;
use crate::error::DocsError;
use crate::index::DocsIndex;
use crate::source::CorpusSource;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Shared corpus load future.
type SharedLoad = Shared<BoxFuture<'static, Result<Arc<DocsIndex>, DocsError>>>;

/// Shared state for the loaded documentation index.
///
/// This is the central coordination point for:
/// - the current index (swapped atomically on reload)
/// - the in-flight load (awaited by every caller that arrives while it runs)
/// - the background embedding task of the current index
pub struct DocState {
    source: Arc<dyn CorpusSource>,
    embedder: EmbeddingCapability,

    current: RwLock<Option<Arc<DocsIndex>>>,
    in_flight: Mutex<Option<SharedLoad>>,
    /// Cancels the embedding task of the current index.
    indexing: Mutex<Option<CancellationToken>>,
}

impl std::fmt::Debug for DocState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocState")
            .field("source", &self.source.location())
            .field("embeddings", &self.embedder.is_enabled())
            .finish_non_exhaustive()
    }
}

impl DocState {
    pub fn new(source: Arc<dyn CorpusSource>, embedder: EmbeddingCapability) -> Self {
        Self {
            source,
            embedder,
            current: RwLock::new(None),
            in_flight: Mutex::new(None),
            indexing: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &dyn CorpusSource {
        self.source.as_ref()
    }

    /// The loaded index, without triggering a load.
    pub async fn current(&self) -> Option<Arc<DocsIndex>> {
        self.current.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn is_loading(&self) -> bool {
        self.in_flight.lock().await.is_some()
    }

    /// Get the index, loading it on first use.
    ///
    /// 1. Return the current index if loaded
    /// 2. Await an in-flight load if one is running
    /// 3. Otherwise start a load
    ///
    /// A failed load leaves nothing marked loaded; the next call tries again.
    pub async fn index(&self) -> Result<Arc<DocsIndex>, DocsError> {
        if let Some(index) = self.current().await {
            return Ok(index);
        }
        self.load(false).await
    }

    /// Fetch and rebuild the index, then swap it in.
    pub async fn reload(&self) -> Result<Arc<DocsIndex>, DocsError> {
        self.load(true).await
    }

    async fn load(&self, force: bool) -> Result<Arc<DocsIndex>, DocsError> {
        let shared = {
            let mut in_flight = self.in_flight.lock().await;
            // A load may have been installed since the caller last looked
            if !force && let Some(index) = self.current().await {
                return Ok(index);
            }
            match in_flight.as_ref() {
                Some(existing) if !force => {
                    tracing::debug!("Awaiting in-flight documentation load");
                    existing.clone()
                }
                _ => {
                    let shared = self.load_future().shared();
                    *in_flight = Some(shared.clone());
                    shared
                }
            }
        };

        let result = shared.clone().await;
        self.finish(&shared, &result).await;
        result
    }

    /// Retire a completed load. Whichever waiter gets here first installs the result, so a
    /// caller that gave up mid-load doesn't leave it stranded.
    ///
    /// The result is installed before `in_flight` is cleared, under its lock, so no caller
    /// can observe neither a current index nor a running load.
    async fn finish(&self, shared: &SharedLoad, result: &Result<Arc<DocsIndex>, DocsError>) {
        let mut in_flight = self.in_flight.lock().await;
        // Already retired, or superseded by a forced reload
        if !in_flight.as_ref().is_some_and(|current| current.ptr_eq(shared)) {
            return;
        }

        match result {
            Ok(index) => self.install(Arc::clone(index)).await,
            Err(e) => tracing::warn!("{}", e),
        }
        *in_flight = None;
    }

    fn load_future(&self) -> BoxFuture<'static, Result<Arc<DocsIndex>, DocsError>> {
        let source = Arc::clone(&self.source);
        let embedder = self.embedder.clone();

        Box::pin(async move {
            let started = Instant::now();
            let text = source.fetch().await?;
            tracing::info!(
                "Fetched {} bytes from {} in {:?}",
                text.len(),
                source.location(),
                started.elapsed()
            );

            let location = source.location().to_string();
            tokio::task::spawn_blocking(move || DocsIndex::build(&text, embedder))
                .await
                .map(Arc::new)
                .map_err(|e| DocsError::Load {
                    source_url: location,
                    message: format!("index build failed: {}", e),
                })
        })
    }

    /// Swap in a freshly built index and start populating its embeddings.
    async fn install(&self, index: Arc<DocsIndex>) {
        *self.current.write().await = Some(Arc::clone(&index));

        let token = CancellationToken::new();
        if let Some(previous) = self.indexing.lock().await.replace(token.clone()) {
            previous.cancel();
        }

        if self.embedder.is_enabled() {
            tokio::task::spawn_blocking(move || index.populate_embeddings(&token));
        }
    }
}

/// Start loading the corpus in the background so the first query usually finds it ready.
pub fn spawn_initial_load(state: Arc<DocState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = state.index().await {
            tracing::warn!("Initial documentation load failed, will retry on first query: {}", e);
        }
    })
}
