//! Lexical relevance ranking.
//!
//! Scoring is additive:
//! - +50 when the whole query appears verbatim
//! - per matched term: +15 if it appears in the title, +2 per occurrence
//! - when every term matched: +20, plus `(500 - span) / 50` if the terms' first occurrences
//!   lie within 500 bytes of each other
//!
//! A hit is kept only if it reaches [`MIN_SCORE`] and either matched two or more terms or
//! reaches [`SINGLE_TERM_MIN_SCORE`], which filters out single coincidental matches.

use super::Candidate;

pub const EXACT_PHRASE_BONUS: u32 = 50;
pub const TITLE_MATCH_BONUS: u32 = 15;
pub const OCCURRENCE_WEIGHT: u32 = 2;
pub const ALL_TERMS_BONUS: u32 = 20;
pub const PROXIMITY_WINDOW: usize = 500;
pub const PROXIMITY_STEP: usize = 50;

pub const MIN_SCORE: u32 = 10;
pub const SINGLE_TERM_MIN_SCORE: u32 = 30;

/// Occurrence positions retained per term for excerpt anchoring.
const MAX_POSITIONS_PER_TERM: usize = 64;

/// Lexical score of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemScore {
    pub score: u32,
    pub matched_terms: usize,
    /// Byte offsets of term occurrences in the item's content.
    pub positions: Vec<usize>,
}

impl ItemScore {
    /// The two-part inclusion gate.
    pub const fn passes_gate(&self) -> bool {
        self.score >= MIN_SCORE
            && (self.matched_terms >= 2 || self.score >= SINGLE_TERM_MIN_SCORE)
    }
}

/// A ranked keyword hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    pub id: usize,
    pub score: ItemScore,
}

/// Score `content` against `query` (already split into `terms`). Returns `None` when no term
/// occurs at all.
pub fn score_item(content: &str, title: &str, query: &str, terms: &[String]) -> Option<ItemScore> {
    if terms.is_empty() {
        return None;
    }

    let lowered = content.to_ascii_lowercase();
    let lowered_title = title.to_ascii_lowercase();
    let phrase = query.trim().to_ascii_lowercase();

    let mut score = 0u32;
    if !phrase.is_empty() && lowered.contains(&phrase) {
        score += EXACT_PHRASE_BONUS;
    }

    let mut matched_terms = 0usize;
    let mut positions = Vec::new();
    let mut first_positions = Vec::with_capacity(terms.len());

    for term in terms {
        let mut occurrences = lowered.match_indices(term.as_str()).map(|(pos, _)| pos);
        let Some(first) = occurrences.next() else {
            continue;
        };

        matched_terms += 1;
        first_positions.push(first);
        positions.push(first);

        let mut count = 1u32;
        for pos in occurrences {
            count += 1;
            if positions.len() < matched_terms * MAX_POSITIONS_PER_TERM {
                positions.push(pos);
            }
        }

        if lowered_title.contains(term.as_str()) {
            score += TITLE_MATCH_BONUS;
        }
        score += count * OCCURRENCE_WEIGHT;
    }

    if matched_terms == 0 {
        return None;
    }

    if matched_terms == terms.len() {
        score += ALL_TERMS_BONUS;
        score += proximity_bonus(&first_positions);
    }

    Some(ItemScore {
        score,
        matched_terms,
        positions,
    })
}

/// `floor((500 - span) / 50)` when the span between the earliest and latest first-occurrence
/// is under 500 bytes, else 0.
pub fn proximity_bonus(first_positions: &[usize]) -> u32 {
    let (Some(min), Some(max)) = (first_positions.iter().min(), first_positions.iter().max())
    else {
        return 0;
    };
    let span = max - min;
    if span < PROXIMITY_WINDOW {
        ((PROXIMITY_WINDOW - span) / PROXIMITY_STEP) as u32
    } else {
        0
    }
}

/// Score every candidate, apply the inclusion gate, and return the top `limit` by score.
///
/// Equal scores keep discovery order (the sort is stable).
pub fn rank<'a>(
    candidates: impl IntoIterator<Item = Candidate<'a>>,
    query: &str,
    terms: &[String],
    limit: usize,
) -> Vec<KeywordHit> {
    let mut hits: Vec<KeywordHit> = candidates
        .into_iter()
        .filter_map(|candidate| {
            score_item(candidate.content, candidate.title, query, terms)
                .filter(ItemScore::passes_gate)
                .map(|score| KeywordHit {
                    id: candidate.id,
                    score,
                })
        })
        .collect();

    hits.sort_by(|a, b| b.score.score.cmp(&a.score.score));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tokenize::query_terms;
    use assert2::{check, let_assert};

    fn candidate<'a>(id: usize, title: &'a str, content: &'a str) -> Candidate<'a> {
        Candidate { id, title, content }
    }

    #[test]
    fn test_relevant_item_ranks_first() {
        let query = "proxy deprecation modern replacement tracked";
        let terms = query_terms(query);
        let relevant = "ObjectProxy is slated for deprecation. The modern replacement is a \
                        tracked property on a plain class.";
        let unrelated = "Routing maps URLs to templates and loads models.";

        let hits = rank(
            [
                candidate(0, "Routing", unrelated),
                candidate(1, "Proxies", relevant),
            ],
            query,
            &terms,
            10,
        );

        check!(hits.len() == 1);
        check!(hits[0].id == 1);
        check!(hits[0].score.score > 20);
        check!(hits[0].score.matched_terms >= 3);
    }

    #[test]
    fn test_score_components() {
        let terms = query_terms("tracked state");
        let content = "tracked state lives here; tracked again";
        let score = score_item(content, "Tracked", "tracked state", &terms).unwrap();

        // phrase 50 + tracked(title 15 + 2×2) + state(1×2) + all terms 20 + proximity
        let proximity = proximity_bonus(&[0, 8]);
        check!(proximity == 9);
        check!(score.score == 50 + 15 + 4 + 2 + 20 + proximity);
        check!(score.matched_terms == 2);
        check!(score.positions == vec![0, 26, 8]);
    }

    #[test]
    fn test_single_weak_term_is_gated_out() {
        let terms = query_terms("helper lifecycle");
        let content = "A helper is a function you can call from templates.";
        let score = score_item(content, "Helpers", "helper lifecycle", &terms).unwrap();

        check!(score.matched_terms == 1);
        check!(score.score < SINGLE_TERM_MIN_SCORE);
        check!(!score.passes_gate());
        check!(rank([candidate(0, "Helpers", content)], "helper lifecycle", &terms, 5).is_empty());
    }

    #[test]
    fn test_single_term_exact_phrase_passes() {
        let terms = query_terms("modifiers");
        let content = "Modifiers attach behaviour to elements.";
        let score = score_item(content, "Element modifiers", "modifiers", &terms).unwrap();
        check!(score.passes_gate());
    }

    #[test]
    fn test_no_match_is_none() {
        let terms = query_terms("service");
        check!(score_item("nothing relevant", "", "service", &terms).is_none());
    }

    #[test]
    fn test_non_ascii_terms_match_their_own_text() {
        let query = "Émber Übersicht";
        let terms = query_terms(query);
        let content = "Émber Übersicht guide: Émber Übersicht explains the ÉMBER layout.";

        let_assert!(Some(score) = score_item(content, query, query, &terms));
        check!(score.matched_terms == 2);
        check!(score.score >= EXACT_PHRASE_BONUS + ALL_TERMS_BONUS);
        check!(score.positions.contains(&0));
        check!(score.passes_gate());
    }

    #[test]
    fn test_proximity_bonus_bounds() {
        check!(proximity_bonus(&[]) == 0);
        check!(proximity_bonus(&[100]) == 10);
        check!(proximity_bonus(&[0, 499]) == 0);
        check!(proximity_bonus(&[0, 500]) == 0);
        check!(proximity_bonus(&[0, 449]) == 1);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let terms = query_terms("route model");
        let content = "route model";
        let hits = rank(
            [
                candidate(7, "a", content),
                candidate(3, "b", content),
                candidate(5, "c", content),
            ],
            "route model",
            &terms,
            10,
        );
        let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
        check!(ids == vec![7, 3, 5]);
    }

    #[test]
    fn test_limit_applies_after_sorting() {
        let terms = query_terms("router service");
        let weak = "router service";
        let strong = "router service router service router service";
        let hits = rank(
            [candidate(0, "", weak), candidate(1, "", strong)],
            "router service",
            &terms,
            1,
        );
        check!(hits.len() == 1);
        check!(hits[0].id == 1);
    }
}
