//! Embedding capability feeding the semantic ranker.
//!
//! The capability is a sum type: either an enabled, memoizing [`CachedEmbedder`] or
//! [`EmbeddingCapability::Disabled`]. Initialization never fails; a backend that cannot start
//! leaves the process on keyword-only ranking.

pub mod hashing;
#[cfg(feature = "local-embeddings")]
pub mod local;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::search::extract::floor_char_boundary;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use xxhash_rust::xxh3::xxh3_64;

pub use hashing::HashingEmbedder;

/// Bytes of text that feed the memoization key.
const CACHE_KEY_PREFIX_BYTES: usize = 512;

/// A text-to-vector backend.
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;
    fn dims(&self) -> usize;
    /// Embed one text. `None` means the text could not be embedded and should be skipped.
    fn embed(&self, text: &str) -> Option<Vec<f32>>;
    /// Cheap enough to run on an async worker thread.
    fn is_lightweight(&self) -> bool {
        false
    }
}

/// Memoization key: xxh3 of a bounded prefix of the text.
pub fn cache_key(text: &str) -> u64 {
    let end = floor_char_boundary(text, CACHE_KEY_PREFIX_BYTES.min(text.len()));
    xxh3_64(&text.as_bytes()[..end])
}

/// An [`Embedder`] behind an LRU of previously computed vectors.
pub struct CachedEmbedder {
    inner: Box<dyn Embedder>,
    cache: Mutex<LruCache<u64, Arc<[f32]>>>,
}

impl std::fmt::Debug for CachedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder")
            .field("model", &self.inner.model_name())
            .field("dims", &self.inner.dims())
            .finish_non_exhaustive()
    }
}

impl CachedEmbedder {
    pub fn new(inner: Box<dyn Embedder>, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    pub fn dims(&self) -> usize {
        self.inner.dims()
    }

    pub fn embed(&self, text: &str) -> Option<Arc<[f32]>> {
        let key = cache_key(text);
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Some(Arc::clone(hit));
        }

        let vector: Arc<[f32]> = self.inner.embed(text)?.into();
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, Arc::clone(&vector));
        Some(vector)
    }

    pub fn is_lightweight(&self) -> bool {
        self.inner.is_lightweight()
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Whether semantic ranking is available for this process.
#[derive(Debug, Clone)]
pub enum EmbeddingCapability {
    Enabled(Arc<CachedEmbedder>),
    Disabled,
}

impl EmbeddingCapability {
    /// Build the configured backend. Failures are logged and yield `Disabled`.
    ///
    /// Loading a local model may download weights; call this from a blocking context.
    pub fn initialize(config: &EmbeddingConfig) -> Self {
        match config.provider {
            EmbeddingProvider::Disabled => {
                tracing::info!("Semantic search disabled by configuration");
                Self::Disabled
            }
            EmbeddingProvider::Hashing => {
                if config.dims == 0 {
                    tracing::warn!("Hashing embedder needs dims > 0, semantic search disabled");
                    return Self::Disabled;
                }
                Self::from_embedder(HashingEmbedder::new(config.dims), config.cache_size)
            }
            EmbeddingProvider::Local => Self::initialize_local(config),
        }
    }

    #[cfg(feature = "local-embeddings")]
    fn initialize_local(config: &EmbeddingConfig) -> Self {
        match local::LocalEmbedder::try_new(&config.model) {
            Ok(embedder) => Self::from_embedder(embedder, config.cache_size),
            Err(e) => {
                tracing::warn!("Local embedding model unavailable, semantic search disabled: {:#}", e);
                Self::Disabled
            }
        }
    }

    #[cfg(not(feature = "local-embeddings"))]
    fn initialize_local(_config: &EmbeddingConfig) -> Self {
        tracing::warn!(
            "Local embeddings require the `local-embeddings` feature, semantic search disabled"
        );
        Self::Disabled
    }

    pub fn from_embedder(embedder: impl Embedder + 'static, cache_size: usize) -> Self {
        tracing::info!(
            "Semantic search enabled ({}, {} dims)",
            embedder.model_name(),
            embedder.dims()
        );
        Self::Enabled(Arc::new(CachedEmbedder::new(Box::new(embedder), cache_size)))
    }

    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    /// Embed `text`; always `None` when disabled.
    pub fn embed(&self, text: &str) -> Option<Arc<[f32]>> {
        match self {
            Self::Enabled(embedder) => embedder.embed(text),
            Self::Disabled => None,
        }
    }

    /// Embed `text` from async code. Model-backed embedders run on the blocking pool so
    /// inference (and the model lock held by background population) never stalls a runtime
    /// worker.
    pub async fn embed_async(&self, text: &str) -> Option<Arc<[f32]>> {
        match self {
            Self::Enabled(embedder) if embedder.is_lightweight() => embedder.embed(text),
            Self::Enabled(embedder) => {
                let embedder = Arc::clone(embedder);
                let text = text.to_string();
                match tokio::task::spawn_blocking(move || embedder.embed(&text)).await {
                    Ok(vector) => vector,
                    Err(e) => {
                        tracing::warn!("Query embedding task failed: {}", e);
                        None
                    }
                }
            }
            Self::Disabled => None,
        }
    }
}

/// Scale `vector` to unit length. Returns `None` for the zero vector.
pub fn normalize(mut vector: Vec<f32>) -> Option<Vec<f32>> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    for x in &mut vector {
        *x /= norm;
    }
    Some(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: Arc<AtomicUsize>,
    }

    impl Embedder for CountingEmbedder {
        fn model_name(&self) -> &str {
            "counting"
        }
        fn dims(&self) -> usize {
            2
        }
        fn embed(&self, text: &str) -> Option<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (!text.is_empty()).then(|| vec![1.0, 0.0])
        }
    }

    #[test]
    fn test_memoizes_by_prefix() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedEmbedder::new(
            Box::new(CountingEmbedder {
                calls: Arc::clone(&calls),
            }),
            8,
        );

        check!(cached.embed("hello").is_some());
        check!(cached.embed("hello").is_some());
        check!(calls.load(Ordering::SeqCst) == 1);
        check!(cached.cached_len() == 1);

        let long_a = format!("{}a", "x".repeat(600));
        let long_b = format!("{}b", "x".repeat(600));
        check!(cache_key(&long_a) == cache_key(&long_b));
    }

    #[test]
    fn test_none_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedEmbedder::new(
            Box::new(CountingEmbedder {
                calls: Arc::clone(&calls),
            }),
            8,
        );
        check!(cached.embed("").is_none());
        check!(cached.embed("").is_none());
        check!(calls.load(Ordering::SeqCst) == 2);
    }

    #[test]
    fn test_cache_key_respects_char_boundaries() {
        let text = "é".repeat(400);
        let _ = cache_key(&text);
    }

    /// Records the thread each embedding runs on.
    struct ThreadRecordingEmbedder {
        lightweight: bool,
        threads: Arc<Mutex<Vec<std::thread::ThreadId>>>,
    }

    impl Embedder for ThreadRecordingEmbedder {
        fn model_name(&self) -> &str {
            "thread-recording"
        }
        fn dims(&self) -> usize {
            2
        }
        fn embed(&self, _text: &str) -> Option<Vec<f32>> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            Some(vec![0.0, 1.0])
        }
        fn is_lightweight(&self) -> bool {
            self.lightweight
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_model_embedding_runs_off_the_runtime_thread() {
        for lightweight in [false, true] {
            let threads = Arc::new(Mutex::new(Vec::new()));
            let capability = EmbeddingCapability::from_embedder(
                ThreadRecordingEmbedder {
                    lightweight,
                    threads: Arc::clone(&threads),
                },
                8,
            );

            check!(capability.embed_async("router service").await.is_some());
            let ran_on = threads.lock().unwrap()[0];
            check!((ran_on == std::thread::current().id()) == lightweight);
        }
    }

    #[test]
    fn test_disabled_capability() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::Disabled,
            ..EmbeddingConfig::default()
        };
        let capability = EmbeddingCapability::initialize(&config);
        check!(!capability.is_enabled());
        check!(capability.embed("anything").is_none());
    }

    #[test]
    fn test_hashing_capability() {
        let capability = EmbeddingCapability::initialize(&EmbeddingConfig::default());
        check!(capability.is_enabled());
        let vector = capability.embed("tracked properties").unwrap();
        check!(vector.len() == 384);
    }

    #[cfg(not(feature = "local-embeddings"))]
    #[test]
    fn test_local_without_feature_is_disabled() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::Local,
            ..EmbeddingConfig::default()
        };
        check!(!EmbeddingCapability::initialize(&config).is_enabled());
    }

    #[test]
    fn test_normalize() {
        let unit = normalize(vec![3.0, 4.0]).unwrap();
        check!((unit[0] - 0.6).abs() < 1e-6);
        check!((unit[1] - 0.8).abs() < 1e-6);
        check!(normalize(vec![0.0, 0.0]).is_none());
    }
}
