//! Weighted fusion of keyword and semantic result lists.

use crate::types::{MatchSource, SearchResult};
use ahash::AHashMap;

pub const KEYWORD_WEIGHT: f64 = 0.6;
pub const SEMANTIC_WEIGHT: f64 = 0.4;

/// How many results each sub-ranker is asked for, relative to the final limit.
pub const HEADROOM_FACTOR: usize = 3;

/// Combine two ranked lists into one.
///
/// Results are identified by `(title, url)`. Each contributes its weighted score; an item
/// present in both lists gets both contributions and is tagged [`MatchSource::Hybrid`].
/// Single-list items are not renormalized, so a semantic-only match stays below a strong
/// keyword match. Within one list a repeated identity keeps its first occurrence.
///
/// Output is sorted by combined score (stable, keyword discovery order first) and then capped.
pub fn merge(
    keyword: Vec<SearchResult>,
    semantic: Vec<SearchResult>,
    limit: usize,
) -> Vec<SearchResult> {
    let mut merged: Vec<SearchResult> = Vec::with_capacity(keyword.len() + semantic.len());
    let mut slots: AHashMap<(String, String), (usize, MatchSource)> = AHashMap::new();

    for mut result in keyword {
        let key = result.key();
        if slots.contains_key(&key) {
            continue;
        }
        result.score *= KEYWORD_WEIGHT;
        result.source = MatchSource::Keyword;
        slots.insert(key, (merged.len(), MatchSource::Keyword));
        merged.push(result);
    }

    for mut result in semantic {
        let key = result.key();
        match slots.get_mut(&key) {
            Some((slot, origin @ MatchSource::Keyword)) => {
                let existing = &mut merged[*slot];
                existing.score += result.score * SEMANTIC_WEIGHT;
                existing.source = MatchSource::Hybrid;
                *origin = MatchSource::Hybrid;
            }
            Some(_) => {}
            None => {
                result.score *= SEMANTIC_WEIGHT;
                result.source = MatchSource::Semantic;
                slots.insert(key, (merged.len(), MatchSource::Semantic));
                merged.push(result);
            }
        }
    }

    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged.truncate(limit);
    merged
}
