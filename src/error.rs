//! Error handling types and utilities.

/// A specialized Result type for ember-docs-mcp plumbing.
///
/// Defaults to `anyhow::Error`, with context added via `.context()` and
/// `.with_context()` methods in the I/O-facing modules (config, source, registry).
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// Typed failures raised by the documentation core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocsError {
    /// The corpus could not be fetched. Nothing is marked loaded; callers retry by reloading.
    #[error("Failed to load documentation from {source_url}: {message}")]
    Load { source_url: String, message: String },

    /// Two vectors of different dimensionality were compared. Signals an indexing bug.
    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// A package registry lookup failed.
    #[error("Registry lookup for '{package}' failed: {message}")]
    Registry { package: String, message: String },
}
