//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `keyword_state`: a `DocState` over [`FIXTURE_CORPUS`] with embeddings disabled
//! - `hybrid_state`: the same corpus with the feature-hashing embedder
//!
//! [`TempWorkspace`] provides a temp directory abstraction for tests that need filesystem
//! isolation (lockfile detection, file-backed corpus sources).

use ember_docs_mcp::DocState;
use ember_docs_mcp::embedding::{EmbeddingCapability, HashingEmbedder};
use ember_docs_mcp::source::StaticSource;
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A small corpus exercising every section kind: API records (one of them malformed), guides
/// and community articles.
#[allow(dead_code)]
pub const FIXTURE_CORPUS: &str = r#"Generated documentation bundle
# api-docs
{"data": {"id": "Ember.Component", "type": "class", "attributes": {"name": "Ember.Component", "module": "@ember/component", "description": "A classic component. Deprecated since 5.0, use `@glimmer/component` instead.", "extends": "Ember.CoreView", "file": "packages/@ember/component/index.ts", "line": 12, "methods": [{"name": "didInsertElement", "description": "Called when the element is inserted."}]}}}
---
{"data": {"id": "RouterService", "type": "class", "attributes": {"name": "RouterService", "module": "@ember/routing/router-service", "description": "The router service exposes transitionTo, currentRouteName and urlFor.", "methods": [{"name": "transitionTo", "params": [{"name": "routeName", "type": "String"}], "return": {"type": "Transition"}}]}}}
---
{"data": {"attributes": {"name": "Broken.Record",
---
# guides
## For all components
## Understanding Tracked Properties
Tracked properties are the modern replacement for proxy objects. Avoid ObjectProxy;
its deprecation means you should prefer a tracked field on a plain class instead.

```js
import { tracked } from '@glimmer/tracking';

class Counter {
  @tracked count = 0;
}
```
---
## Routing
The router maps URLs to route handlers. Each route loads its model in the model hook.
---
## Component Arguments
You should always treat component arguments as read-only. It is a best practice to derive
state with getters instead of copying arguments into tracked fields.

Don't mutate this.args directly inside a component.

```js
get fullName() {
  return `${this.args.first} ${this.args.last}`;
}
```
# community-bloggers
## Testing Services
A post from https://blog.example.com/testing-services about stubbing services in tests.
Recommended: register a stub service in the test container before rendering.
"#;

/// A temporary workspace directory for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a directory (and all parent directories) within this workspace.
    pub fn create_dir(&self, path: &str) {
        let full_path = self.root.join(path);
        std::fs::create_dir_all(&full_path)
            .unwrap_or_else(|e| panic!("Failed to create directory '{}': {}", path, e));
    }

    /// Creates a file with the given content, creating parent directories as needed.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Creates an empty lockfile.
    pub fn create_lockfile(&self, path: &str) {
        self.create_file(path, "");
    }

    /// Creates a minimal .git directory structure for testing git detection.
    pub fn create_git_repo(&self, path: &str) {
        let git_path = self.root.join(path).join(".git");
        std::fs::create_dir_all(git_path.join("refs")).expect("Failed to create refs");
        std::fs::write(git_path.join("HEAD"), "ref: refs/heads/main")
            .expect("Failed to write HEAD");
    }

    /// Creates a git submodule marker (a .git file pointing to parent).
    pub fn create_git_submodule(&self, path: &str) {
        let git_file = self.root.join(path).join(".git");
        if let Some(parent) = git_file.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create submodule directory");
        }
        std::fs::write(&git_file, "gitdir: ../.git/modules/submodule")
            .expect("Failed to write .git file");
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a `DocState` over an in-memory corpus.
#[allow(dead_code)]
pub fn doc_state(corpus: &str, embedder: EmbeddingCapability) -> Arc<DocState> {
    ember_docs_mcp::tracing::init();
    Arc::new(DocState::new(Arc::new(StaticSource::new(corpus)), embedder))
}

/// Fixture corpus, keyword ranking only.
#[allow(dead_code)]
#[fixture]
pub fn keyword_state() -> Arc<DocState> {
    doc_state(FIXTURE_CORPUS, EmbeddingCapability::Disabled)
}

/// Fixture corpus with the feature-hashing embedder.
#[allow(dead_code)]
#[fixture]
pub fn hybrid_state() -> Arc<DocState> {
    doc_state(
        FIXTURE_CORPUS,
        EmbeddingCapability::from_embedder(HashingEmbedder::new(256), 128),
    )
}
