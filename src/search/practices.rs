//! Topic-scoped extraction of best-practice guidance.
//!
//! Items are matched on the topic's terms in exact, singular or plural form and scored on term
//! coverage plus the presence of best-practice vocabulary. Surviving items carry a content
//! window, fenced code examples, and "avoid this" statements lifted from the text.

use crate::corpus::Category;
use crate::corpus::parser::is_separator;
use crate::search::tokenize::{query_terms, term_forms};
use crate::types::PracticeResult;
use ahash::AHashSet;

pub const TERM_MATCH_WEIGHT: u32 = 15;
pub const ALL_TERMS_BONUS: u32 = 20;
pub const STRONG_PHRASE_WEIGHT: u32 = 5;
pub const WEAK_PHRASE_WEIGHT: u32 = 2;

pub const MIN_PRACTICE_SCORE: u32 = 20;
pub const MAX_PRACTICES: usize = 5;

const CONTENT_WINDOW_LINES: usize = 50;
const MAX_CODE_EXAMPLES: usize = 3;
const MAX_ANTI_PATTERNS: usize = 3;
const ANTI_PATTERN_CONTEXT_LINES: usize = 2;
const ANTI_PATTERN_MIN_CHARS: usize = 10;
const ANTI_PATTERN_MAX_CHARS: usize = 200;

pub const STRONG_PHRASES: &[&str] = &[
    "best practice",
    "anti-pattern",
    "antipattern",
    "avoid",
    "recommended",
    "prefer",
];

pub const WEAK_PHRASES: &[&str] = &["tip", "performance", "convention", "pattern", "guideline"];

const NEGATIVE_GUIDANCE: &[&str] = &["avoid", "don't", "anti-pattern", "bad practice"];

/// An item offered to the extractor.
#[derive(Debug, Clone, Copy)]
pub struct PracticeCandidate<'a> {
    pub title: &'a str,
    pub section: &'a str,
    pub category: Category,
    pub url: &'a str,
    pub content: &'a str,
}

/// Term forms for each topic term, matched against ASCII-lowered content.
struct Topic {
    forms: Vec<Vec<String>>,
}

impl Topic {
    fn new(topic: &str) -> Self {
        Self {
            forms: query_terms(topic)
                .iter()
                .map(String::as_str)
                .map(term_forms)
                .collect(),
        }
    }

    fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    fn matched_terms(&self, lowered: &str) -> usize {
        self.forms
            .iter()
            .filter(|forms| forms.iter().any(|form| lowered.contains(form.as_str())))
            .count()
    }

    fn mentions(&self, lowered_line: &str) -> bool {
        self.forms
            .iter()
            .flatten()
            .any(|form| lowered_line.contains(form.as_str()))
    }
}

fn phrase_hits(lowered: &str, phrases: &[&str]) -> u32 {
    phrases.iter().filter(|p| lowered.contains(*p)).count() as u32
}

/// Score an item for a topic. `None` when no topic term occurs.
fn practice_score(topic: &Topic, lowered: &str) -> Option<u32> {
    let matched = topic.matched_terms(lowered);
    if matched == 0 {
        return None;
    }

    let mut score = matched as u32 * TERM_MATCH_WEIGHT;
    if matched == topic.forms.len() {
        score += ALL_TERMS_BONUS;
    }

    let strong = phrase_hits(lowered, STRONG_PHRASES);
    score += strong * STRONG_PHRASE_WEIGHT;
    if strong > 0 {
        score += phrase_hits(lowered, WEAK_PHRASES) * WEAK_PHRASE_WEIGHT;
    }
    Some(score)
}

fn is_structural(line: &str) -> bool {
    let trimmed = line.trim();
    is_separator(trimmed) || matches!(trimmed, "{" | "}" | "[" | "]" | "}," | "],")
}

/// Up to 50 lines from `start`, without separator or bare-brace lines.
fn content_window(lines: &[&str], start: usize) -> String {
    lines[start..]
        .iter()
        .take(CONTENT_WINDOW_LINES)
        .filter(|line| !is_structural(line))
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Complete fenced code blocks that open at or after `start`.
fn code_examples(lines: &[&str], start: usize) -> Vec<String> {
    let mut examples = Vec::new();
    let mut open: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate().skip(start) {
        if !line.trim_start().starts_with("```") {
            continue;
        }
        match open.take() {
            None => open = Some(idx),
            Some(from) => {
                examples.push(lines[from..=idx].join("\n"));
                if examples.len() == MAX_CODE_EXAMPLES {
                    break;
                }
            }
        }
    }
    examples
}

/// Short lines carrying negative guidance, each with the two lines that follow.
fn anti_patterns(lines: &[&str]) -> Vec<String> {
    let mut seen = AHashSet::new();
    let mut found = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        let len = trimmed.chars().count();
        if !(ANTI_PATTERN_MIN_CHARS..=ANTI_PATTERN_MAX_CHARS).contains(&len) {
            continue;
        }
        let lowered = trimmed.to_lowercase();
        if !NEGATIVE_GUIDANCE.iter().any(|k| lowered.contains(k)) {
            continue;
        }
        if !seen.insert(trimmed) {
            continue;
        }

        let context = lines[idx + 1..]
            .iter()
            .take(ANTI_PATTERN_CONTEXT_LINES)
            .map(|l| l.trim())
            .filter(|l| !l.is_empty());
        let block: Vec<&str> = std::iter::once(trimmed).chain(context).collect();
        found.push(block.join("\n"));

        if found.len() == MAX_ANTI_PATTERNS {
            break;
        }
    }
    found
}

/// Extract best practices for `topic` from the given (non-API) items.
///
/// Results are deduplicated by title (case-insensitive, first wins), sorted by score and
/// capped at [`MAX_PRACTICES`].
pub fn extract_practices<'a>(
    candidates: impl IntoIterator<Item = PracticeCandidate<'a>>,
    topic: &str,
) -> Vec<PracticeResult> {
    let topic = Topic::new(topic);
    if topic.is_empty() {
        return Vec::new();
    }

    let mut titles = AHashSet::new();
    let mut results = Vec::new();

    for candidate in candidates {
        let lowered = candidate.content.to_ascii_lowercase();
        let Some(score) = practice_score(&topic, &lowered) else {
            continue;
        };
        if score < MIN_PRACTICE_SCORE {
            continue;
        }
        if !titles.insert(candidate.title.to_lowercase()) {
            tracing::trace!("Skipping duplicate practice title {:?}", candidate.title);
            continue;
        }

        let lines: Vec<&str> = candidate.content.lines().collect();
        let first_match = lines
            .iter()
            .position(|line| topic.mentions(&line.to_ascii_lowercase()))
            .unwrap_or(0);

        results.push(PracticeResult {
            title: candidate.title.to_string(),
            section: candidate.section.to_string(),
            category: candidate.category,
            url: candidate.url.to_string(),
            score,
            content: content_window(&lines, first_match),
            code_examples: code_examples(&lines, first_match),
            anti_patterns: anti_patterns(&lines),
        });
    }

    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(MAX_PRACTICES);
    results
}
