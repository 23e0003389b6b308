//! The documentation index: an owned, immutable-after-build view of one corpus load.
//!
//! Built once from raw corpus text, then shared behind an `Arc`. The only part that changes
//! after construction is the embedding index, which is append-only and populated in the
//! background by [`DocsIndex::populate_embeddings`].

use crate::corpus::{API_SECTION, ApiEntry, ApiIndex, Category, Corpus};
use crate::deprecation::{DeprecationInfo, DeprecationRegistry};
use crate::embedding::EmbeddingCapability;
use crate::error::DocsError;
use crate::search::hybrid::HEADROOM_FACTOR;
use crate::search::practices::{PracticeCandidate, extract_practices};
use crate::search::semantic::{EmbeddingEntry, searchable_text};
use crate::search::{
    Candidate, EmbeddingIndex, IndexStatus, extract_excerpt, extract_title, item_url, keyword,
    merge, query_terms,
};
use crate::types::{MatchSource, PracticeResult, SearchResult};
use rapidfuzz::distance::jaro_winkler;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Suggestions must be at least this similar (Jaro-Winkler) to the query.
const SUGGESTION_THRESHOLD: f64 = 0.8;
const MAX_SUGGESTIONS: usize = 5;

/// Derived, per-item metadata. `id` is the position in [`DocsIndex::documents`].
#[derive(Debug, Clone)]
pub struct Document {
    pub section: usize,
    pub item: usize,
    pub category: Category,
    pub title: String,
    pub url: String,
    pub api_entry: Option<Arc<ApiEntry>>,
}

/// Outcome of an API reference lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiLookup {
    Found {
        entry: Arc<ApiEntry>,
        deprecation: Option<DeprecationInfo>,
    },
    NotFound {
        query: String,
        suggestions: Vec<String>,
    },
}

#[derive(Debug)]
pub struct DocsIndex {
    corpus: Corpus,
    documents: Vec<Document>,
    api: ApiIndex,
    deprecations: DeprecationRegistry,
    embedder: EmbeddingCapability,
    embeddings: EmbeddingIndex,
}

impl DocsIndex {
    /// Parse `text` and derive every index except the embeddings.
    pub fn build(text: &str, embedder: EmbeddingCapability) -> Self {
        let started = Instant::now();
        let corpus = Corpus::parse(text);

        let mut deprecations = DeprecationRegistry::default();
        let api = corpus
            .section(API_SECTION)
            .map(|section| ApiIndex::build(&section.items, &mut deprecations))
            .unwrap_or_default();

        let mut documents = Vec::with_capacity(corpus.item_count());
        for (section_idx, section) in corpus.sections().enumerate() {
            let category = section.category();
            let is_api = section.name == API_SECTION;
            for (item_idx, item) in section.items.iter().enumerate() {
                let api_entry = if is_api {
                    api.entry_for_item(item_idx).cloned()
                } else {
                    None
                };
                let url = api_entry
                    .as_ref()
                    .map_or_else(|| item_url(category, &item.content), |entry| entry.url());

                documents.push(Document {
                    section: section_idx,
                    item: item_idx,
                    category,
                    title: extract_title(&item.content),
                    url,
                    api_entry,
                });
            }
        }

        let status = if embedder.is_enabled() {
            IndexStatus::Pending
        } else {
            IndexStatus::Disabled
        };

        tracing::info!(
            "Indexed {} sections, {} items, {} API entries ({} deprecated) in {:?}",
            corpus.section_count(),
            documents.len(),
            api.len(),
            deprecations.len(),
            started.elapsed()
        );

        Self {
            corpus,
            documents,
            api,
            deprecations,
            embedder,
            embeddings: EmbeddingIndex::new(status),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn api(&self) -> &ApiIndex {
        &self.api
    }

    pub fn deprecations(&self) -> &DeprecationRegistry {
        &self.deprecations
    }

    pub fn embeddings(&self) -> &EmbeddingIndex {
        &self.embeddings
    }

    pub fn embedder(&self) -> &EmbeddingCapability {
        &self.embedder
    }

    /// Raw text of a document.
    pub fn content(&self, doc: &Document) -> &str {
        self.corpus
            .section_at(doc.section)
            .and_then(|section| section.items.get(doc.item))
            .map_or("", |item| item.content.as_str())
    }

    fn section_name(&self, doc: &Document) -> &str {
        self.corpus
            .section_at(doc.section)
            .map_or("", |section| section.name.as_str())
    }

    /// Embed every document, appending to the embedding index as vectors are produced.
    ///
    /// Blocking; meant for `spawn_blocking`. Stops early when `cancel` fires. Returns the
    /// number of entries appended.
    pub fn populate_embeddings(&self, cancel: &CancellationToken) -> usize {
        let EmbeddingCapability::Enabled(embedder) = &self.embedder else {
            self.embeddings.set_status(IndexStatus::Disabled);
            return 0;
        };

        self.embeddings.set_status(IndexStatus::Building);
        let started = Instant::now();
        let mut added = 0usize;

        for (id, doc) in self.documents.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::debug!("Embedding population cancelled after {} entries", added);
                break;
            }

            let text = searchable_text(&doc.title, self.content(doc));
            let Some(vector) = embedder.embed(&text) else {
                continue;
            };
            self.embeddings.push(EmbeddingEntry {
                id,
                category: doc.category,
                vector,
            });
            added += 1;
        }

        self.embeddings.set_status(IndexStatus::Ready);
        tracing::info!(
            "Embedded {} of {} documents with {} in {:?}",
            added,
            self.documents.len(),
            embedder.model_name(),
            started.elapsed()
        );
        added
    }

    fn candidates(&self, filter: Option<Category>) -> impl Iterator<Item = Candidate<'_>> {
        self.documents
            .iter()
            .enumerate()
            .filter(move |(_, doc)| filter.is_none_or(|category| doc.category == category))
            .map(move |(id, doc)| Candidate {
                id,
                title: &doc.title,
                content: self.content(doc),
            })
    }

    fn result(&self, id: usize, score: f64, excerpt: String, source: MatchSource) -> SearchResult {
        let doc = &self.documents[id];
        SearchResult {
            title: doc.title.clone(),
            category: doc.category,
            excerpt,
            score,
            url: doc.url.clone(),
            api_link: doc.api_entry.as_ref().map(|entry| entry.url()),
            source,
            deprecation: doc
                .api_entry
                .as_ref()
                .and_then(|entry| self.deprecations.lookup(&entry.name))
                .map(DeprecationInfo::summary),
        }
    }

    /// Lexical ranking only.
    pub fn keyword_search(
        &self,
        query: &str,
        filter: Option<Category>,
        limit: usize,
    ) -> Vec<SearchResult> {
        let terms = query_terms(query);
        self.keyword_results(query, &terms, filter, limit)
    }

    fn keyword_results(
        &self,
        query: &str,
        terms: &[String],
        filter: Option<Category>,
        limit: usize,
    ) -> Vec<SearchResult> {
        keyword::rank(self.candidates(filter), query, terms, limit)
            .into_iter()
            .map(|hit| {
                let content = self.content(&self.documents[hit.id]);
                let excerpt = extract_excerpt(content, terms, Some(hit.score.positions.as_slice()));
                self.result(
                    hit.id,
                    f64::from(hit.score.score),
                    excerpt,
                    MatchSource::Keyword,
                )
            })
            .collect()
    }

    /// Vector-similarity ranking over whatever has been embedded so far.
    ///
    /// Empty when embeddings are disabled or the query cannot be embedded.
    pub fn semantic_search(
        &self,
        query: &str,
        filter: Option<Category>,
        limit: usize,
    ) -> Result<Vec<SearchResult>, DocsError> {
        let terms = query_terms(query);
        self.semantic_results(self.embedder.embed(query), &terms, filter, limit)
    }

    fn semantic_results(
        &self,
        query_vector: Option<Arc<[f32]>>,
        terms: &[String],
        filter: Option<Category>,
        limit: usize,
    ) -> Result<Vec<SearchResult>, DocsError> {
        let Some(vector) = query_vector else {
            return Ok(Vec::new());
        };

        let hits = self.embeddings.rank(&vector, filter, limit)?;
        Ok(hits
            .into_iter()
            .map(|hit| {
                let content = self.content(&self.documents[hit.id]);
                let excerpt = extract_excerpt(content, terms, None);
                self.result(hit.id, hit.score, excerpt, MatchSource::Semantic)
            })
            .collect())
    }

    /// Ranked search across the corpus.
    ///
    /// With embeddings enabled, keyword and semantic results (each fetched with headroom) are
    /// merged; a query issued before embedding has started waits briefly for it. Without
    /// embeddings the keyword ranking is returned as is.
    pub async fn search(
        &self,
        query: &str,
        filter: Option<Category>,
        limit: usize,
    ) -> Result<Vec<SearchResult>, DocsError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let terms = query_terms(query);
        if !self.embedder.is_enabled() {
            return Ok(self.keyword_results(query, &terms, filter, limit));
        }

        let fetch = limit.saturating_mul(HEADROOM_FACTOR);
        let keyword = self.keyword_results(query, &terms, filter, fetch);

        if self.embeddings.status() == IndexStatus::Pending {
            let status = self.embeddings.wait_until_started().await;
            tracing::debug!("Semantic index status after wait: {:?}", status);
        }
        let query_vector = self.embedder.embed_async(query).await;
        let semantic = self.semantic_results(query_vector, &terms, filter, fetch)?;

        tracing::debug!(
            "Query {:?}: {} keyword, {} semantic candidates",
            query,
            keyword.len(),
            semantic.len()
        );
        Ok(merge(keyword, semantic, limit))
    }

    /// Look up an API entry by name, optionally constrained to a kind (`class`, `module`...).
    pub fn api_reference(&self, name: &str, type_hint: Option<&str>) -> ApiLookup {
        let query = name.trim();
        let hint = type_hint.map(str::trim).filter(|hint| !hint.is_empty());
        let matches_hint = |entry: &ApiEntry| hint.is_none_or(|hint| entry.kind_matches(hint));

        let exact = self.api.get(query);
        let entry = exact
            .filter(|entry| matches_hint(entry))
            .or_else(|| {
                self.api.entries().iter().find(|entry| {
                    (entry.name.eq_ignore_ascii_case(query)
                        || entry.short_name().eq_ignore_ascii_case(query))
                        && matches_hint(entry)
                })
            })
            .or(exact);

        match entry {
            Some(entry) => ApiLookup::Found {
                entry: Arc::clone(entry),
                deprecation: self.deprecations.lookup(&entry.name).cloned(),
            },
            None => ApiLookup::NotFound {
                query: query.to_string(),
                suggestions: self.suggestions(query),
            },
        }
    }

    /// Index keys resembling `query`, best first.
    fn suggestions(&self, query: &str) -> Vec<String> {
        let lowered = query.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .api
            .keys()
            .map(|key| (jaro_winkler::similarity(lowered.chars(), key.chars()), key))
            .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, key)| key.to_string())
            .collect()
    }

    /// Best-practice guidance for `topic` from the non-API sections.
    pub fn best_practices(&self, topic: &str) -> Vec<PracticeResult> {
        let candidates = self
            .documents
            .iter()
            .filter(|doc| doc.category != Category::Api)
            .map(|doc| PracticeCandidate {
                title: &doc.title,
                section: self.section_name(doc),
                category: doc.category,
                url: &doc.url,
                content: self.content(doc),
            });
        extract_practices(candidates, topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use assert2::{check, let_assert};

    const CORPUS: &str = r#"preamble that is discarded
# api-docs
{"data": {"id": "Ember.Component", "type": "class", "attributes": {"name": "Ember.Component", "module": "@ember/component", "description": "A classic component. Deprecated since 5.0, use `@glimmer/component` instead.", "extends": "Ember.CoreView"}}}
---
{"data": {"type": "class", "attributes": {"name": "RouterService", "module": "@ember/routing/router-service", "description": "The router service exposes transitionTo and currentRouteName."}}}
---
{"data": {"attributes": {"name": "broken",
---
# guides
## Tracked Properties
Tracked properties are the modern replacement for proxy objects. Avoid ObjectProxy; its
deprecation means you should prefer a tracked field on a plain class.
---
## Routing
The router service maps URLs to route handlers and templates.
# community-bloggers
## Testing Services
A blog post: https://blog.example.com/services. Services are singletons; avoid storing
per-component state in a service as a best practice.
"#;

    fn disabled() -> DocsIndex {
        DocsIndex::build(CORPUS, EmbeddingCapability::Disabled)
    }

    fn hashing() -> DocsIndex {
        DocsIndex::build(
            CORPUS,
            EmbeddingCapability::from_embedder(HashingEmbedder::new(256), 64),
        )
    }

    #[test]
    fn test_build_derives_documents() {
        let index = disabled();
        check!(index.corpus().section_count() == 3);
        check!(index.documents().len() == 6);
        check!(index.api().len() == 2);

        let titles: Vec<_> = index.documents().iter().map(|d| d.title.as_str()).collect();
        check!(titles[0] == "Ember.Component");
        check!(titles[3] == "Tracked Properties");

        let community = &index.documents()[5];
        check!(community.category == Category::Community);
        check!(community.url == "https://blog.example.com/services");
        check!(index.documents()[4].url == "https://guides.emberjs.com/release/");
        check!(
            index.documents()[0].url == "https://api.emberjs.com/ember/release/classes/Ember.Component"
        );
        check!(index.embeddings().status() == IndexStatus::Disabled);
    }

    #[tokio::test]
    async fn test_keyword_only_search() {
        let index = disabled();
        let results = index
            .search("proxy deprecation modern replacement tracked", None, 5)
            .await
            .unwrap();
        check!(!results.is_empty());
        check!(results[0].title == "Tracked Properties");
        check!(results[0].source == MatchSource::Keyword);
        check!(results[0].score > 20.0);
    }

    #[tokio::test]
    async fn test_category_filter() {
        let index = disabled();
        let results = index.search("router service", Some(Category::Api), 10).await.unwrap();
        check!(!results.is_empty());
        check!(results.iter().all(|r| r.category == Category::Api));
        check!(results[0].api_link.is_some());
    }

    #[tokio::test]
    async fn test_zero_limit_is_empty() {
        check!(disabled().search("router", None, 0).await.unwrap().is_empty());
    }

    #[test]
    fn test_deprecation_surfaces_on_results() {
        let index = disabled();
        let results = index.keyword_search("classic component deprecated", None, 5);
        let_assert!(Some(component) = results.iter().find(|r| r.title == "Ember.Component"));
        check!(
            component.deprecation.as_deref()
                == Some("Deprecated since 5.0, use @glimmer/component instead")
        );
    }

    #[test]
    fn test_populate_then_semantic_search() {
        let index = hashing();
        check!(index.embeddings().status() == IndexStatus::Pending);

        let added = index.populate_embeddings(&CancellationToken::new());
        check!(added == index.documents().len());
        check!(index.embeddings().status() == IndexStatus::Ready);

        let results = index
            .semantic_search("tracked properties replacement", None, 3)
            .unwrap();
        check!(!results.is_empty());
        check!(results[0].title == "Tracked Properties");
        check!(results[0].source == MatchSource::Semantic);
    }

    #[test]
    fn test_cancelled_population_stops() {
        let index = hashing();
        let cancel = CancellationToken::new();
        cancel.cancel();
        check!(index.populate_embeddings(&cancel) == 0);
        check!(index.embeddings().status() == IndexStatus::Ready);
        check!(index.semantic_search("routing", None, 3).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hybrid_search_tags_both() {
        let index = hashing();
        index.populate_embeddings(&CancellationToken::new());
        let results = index.search("tracked properties proxy", None, 5).await.unwrap();
        check!(results[0].title == "Tracked Properties");
        check!(results[0].source == MatchSource::Hybrid);
    }

    #[tokio::test]
    async fn test_search_before_population_degrades() {
        let index = hashing();
        let results = index.search("router service", None, 5).await.unwrap();
        check!(!results.is_empty());
        check!(results.iter().all(|r| r.source == MatchSource::Keyword));
    }

    #[test]
    fn test_api_reference_by_name_and_segment() {
        let index = disabled();
        for name in ["Ember.Component", "ember.component", "Component", "@ember/component"] {
            let_assert!(ApiLookup::Found { entry, .. } = index.api_reference(name, None));
            check!(entry.name == "Ember.Component");
        }

        let_assert!(
            ApiLookup::Found { entry, deprecation } = index.api_reference("RouterService", Some("class"))
        );
        check!(entry.name == "RouterService");
        check!(deprecation.is_none());
    }

    #[test]
    fn test_api_reference_hint_falls_back_to_exact() {
        let index = disabled();
        let_assert!(ApiLookup::Found { entry, .. } = index.api_reference("RouterService", Some("module")));
        check!(entry.name == "RouterService");
    }

    #[test]
    fn test_api_reference_not_found_suggests() {
        let index = disabled();
        let_assert!(
            ApiLookup::NotFound { query, suggestions } = index.api_reference("RouterServise", None)
        );
        check!(query == "RouterServise");
        check!(suggestions.first().map(String::as_str) == Some("routerservice"));
        check!(suggestions.len() <= MAX_SUGGESTIONS);
    }

    #[test]
    fn test_best_practices_skip_api() {
        let index = disabled();
        let practices = index.best_practices("services");
        check!(!practices.is_empty());
        check!(practices.iter().all(|p| p.category != Category::Api));
        check!(practices[0].title == "Testing Services");
        check!(practices[0].section == "community-bloggers");
    }
}
