//! Local model embeddings through fastembed (feature `local-embeddings`).

use super::{Embedder, normalize};
use crate::error::Result;
use anyhow::{anyhow, bail};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Mutex, PoisonError};

fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize)> {
    match name {
        "all-minilm-l6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        "nomic-embed-text-v1.5" => Ok((EmbeddingModel::NomicEmbedTextV15, 768)),
        other => bail!(
            "Unknown local embedding model '{}'. Supported models: all-minilm-l6-v2, \
             bge-small-en-v1.5, bge-base-en-v1.5, nomic-embed-text-v1.5",
            other
        ),
    }
}

pub struct LocalEmbedder {
    model: Mutex<TextEmbedding>,
    name: String,
    dims: usize,
}

impl LocalEmbedder {
    /// Load (downloading on first use) the named model. Blocking.
    pub fn try_new(name: &str) -> Result<Self> {
        let (model, dims) = resolve_model(name)?;
        let model = TextEmbedding::try_new(
            InitOptions::new(model).with_show_download_progress(false),
        )
        .map_err(|e| anyhow!("Failed to initialize local embedding model: {}", e))?;

        Ok(Self {
            model: Mutex::new(model),
            name: name.to_string(),
            dims,
        })
    }
}

impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let mut model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        match model.embed(vec![text], None) {
            Ok(mut vectors) if !vectors.is_empty() => normalize(vectors.swap_remove(0)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Local embedding failed: {}", e);
                None
            }
        }
    }
}
