//! Feature-hashing embedder.
//!
//! Stemmed tokens are hashed into a fixed number of signed buckets and the result is
//! L2-normalized. No model or network is needed, so this backend is always available; texts
//! that share vocabulary (after stemming) end up close together.

use super::{Embedder, normalize};
use crate::search::tokenize::{hash_term, tokenize_and_stem};
use rust_stemmers::{Algorithm, Stemmer};

pub const MODEL_NAME: &str = "feature-hashing";

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dims: usize,
}

impl HashingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }
}

impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let stemmer = Stemmer::create(Algorithm::English);
        let tokens = tokenize_and_stem(text, &stemmer);
        if tokens.is_empty() {
            return None;
        }

        let mut vector = vec![0.0f32; self.dims];
        for token in &tokens {
            let hash = hash_term(token);
            let bucket = (hash % self.dims as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }

        normalize(vector)
    }

    fn is_lightweight(&self) -> bool {
        true
    }
}
