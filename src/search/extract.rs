//! Title, excerpt and URL extraction from raw item text.

use crate::corpus::{Category, api};
use crate::corpus::parser::is_separator;
use regex::Regex;
use std::sync::LazyLock;

pub const UNTITLED: &str = "Untitled";
pub const NO_PREVIEW: &str = "No preview available";

const MAX_TITLE_CHARS: usize = 100;
/// Lines up to this length are used verbatim as a title; longer ones are cut to a sentence.
const SHORT_LINE_CHARS: usize = 10;

const CONTEXT_BEFORE: usize = 150;
const CONTEXT_AFTER: usize = 400;
/// Neighbouring term positions closer than this belong to the same cluster.
const CLUSTER_GAP: usize = 500;
/// Fallback previews use the first line longer than this.
const FALLBACK_MIN_LINE: usize = 30;
const FALLBACK_MAX_CHARS: usize = 350;

static FRONT_MATTER_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^title:\s*(.+?)\s*$").expect("valid regex"));

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+?)\s*#*\s*$").expect("valid regex"));

/// Filler that makes a poor title: sentence fragments, admonitions, URLs, versions, list items.
static GENERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            for\s+(?:all|any|most|some)\b
          | in\s+(?:this|these)\b
          | (?:note|warning|tip|important|info)\s*:
          | https?://\S+$
          | v?\d+(?:\.\d+)*\s*$
          | (?:[-*+]|\d+[.)])\s
        )",
    )
    .expect("valid regex")
});

static NAME_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""name"\s*:\s*"([^"]+)""#).expect("valid regex"));

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("valid regex"));

static FIRST_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?[.!?])(?:\s|$)").expect("valid regex"));

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));

/// A line opening with `{` through the next line opening with `}`.
static RECORD_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^\{.*?^\}[^\n]*").expect("valid regex"));

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n(?:\s*\n)+").expect("valid regex"));

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s)\]>"'`]+"#).expect("valid regex"));

pub fn is_generic(text: &str) -> bool {
    GENERIC.is_match(text.trim())
}

/// Derive a single-line title (non-empty, at most 100 characters) from an item's text.
///
/// Resolution order: front-matter `title:`, first non-generic markdown header, the `name` of
/// an embedded record, the first plain content line, then [`UNTITLED`].
pub fn extract_title(content: &str) -> String {
    title_candidate(content)
        .map(|title| truncate_chars(&collapse_whitespace(&title), MAX_TITLE_CHARS).to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn title_candidate(content: &str) -> Option<String> {
    if let Some(first) = content.lines().find(|line| !line.trim().is_empty())
        && let Some(caps) = FRONT_MATTER_TITLE.captures(first.trim())
    {
        let title = caps[1].trim_matches(|c| c == '"' || c == '\'').trim();
        if !title.is_empty() {
            return Some(title.to_string());
        }
    }

    let mut in_fence = false;
    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = HEADER.captures(line) {
            let text = caps[1].trim();
            if text.chars().count() > 3 && !is_generic(text) {
                return Some(text.to_string());
            }
        }
    }

    if let Ok(entry) = api::decode_entry(content) {
        return Some(entry.name);
    }
    if let Some(caps) = NAME_FIELD.captures(content) {
        return Some(caps[1].to_string());
    }

    content
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| is_plain_line(line))
        .map(|line| {
            if line.chars().count() > SHORT_LINE_CHARS {
                let sentence = FIRST_SENTENCE
                    .captures(line)
                    .map_or(line, |caps| caps.get(1).map_or(line, |m| m.as_str()));
                truncate_chars(sentence, MAX_TITLE_CHARS).to_string()
            } else {
                line.to_string()
            }
        })
}

/// A content line that can stand in as a title.
fn is_plain_line(line: &str) -> bool {
    !line.is_empty()
        && !is_generic(line)
        && !is_separator(line)
        && !line.starts_with('{')
        && !line.starts_with('[')
        && !line.starts_with("```")
        && !BARE_URL.is_match(line)
}

/// Build a bounded preview of `content` around the query terms.
///
/// With `positions` (byte offsets of term occurrences found while ranking) the window is
/// anchored on the densest cluster of occurrences; without them, on the first occurrence of
/// any term. If no term occurs, the first substantial line is used.
pub fn extract_excerpt(content: &str, terms: &[String], positions: Option<&[usize]>) -> String {
    let anchor = match positions {
        Some(positions) if !positions.is_empty() => densest_cluster_start(positions),
        _ => first_occurrence(content, terms),
    };

    if let Some(anchor) = anchor {
        let excerpt = window_around(content, anchor);
        if !excerpt.is_empty() {
            return excerpt;
        }
    }

    content
        .lines()
        .map(str::trim)
        .find(|line| line.chars().count() > FALLBACK_MIN_LINE)
        .map_or_else(
            || NO_PREVIEW.to_string(),
            |line| truncate_chars(line, FALLBACK_MAX_CHARS).to_string(),
        )
}

/// Start of the run of positions (each within [`CLUSTER_GAP`] of the next) with the most
/// members. Ties go to the earliest run.
pub(crate) fn densest_cluster_start(positions: &[usize]) -> Option<usize> {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let first = *sorted.first()?;
    let (mut best_start, mut best_len) = (first, 1);
    let (mut run_start, mut run_len) = (first, 1);

    for pair in sorted.windows(2) {
        if pair[1] - pair[0] <= CLUSTER_GAP {
            run_len += 1;
        } else {
            run_start = pair[1];
            run_len = 1;
        }
        if run_len > best_len {
            best_start = run_start;
            best_len = run_len;
        }
    }

    Some(best_start)
}

fn first_occurrence(content: &str, terms: &[String]) -> Option<usize> {
    let lowered = content.to_ascii_lowercase();
    terms
        .iter()
        .filter(|term| !term.is_empty())
        .filter_map(|term| lowered.find(term.as_str()))
        .min()
}

fn window_around(content: &str, anchor: usize) -> String {
    let anchor = floor_char_boundary(content, anchor.min(content.len()));

    let mut start = content[..anchor]
        .char_indices()
        .rev()
        .nth(CONTEXT_BEFORE - 1)
        .map_or(0, |(idx, _)| idx);
    let mut end = content[anchor..]
        .char_indices()
        .nth(CONTEXT_AFTER)
        .map_or(content.len(), |(idx, _)| anchor + idx);

    // Snap to word boundaries so the window doesn't open or close mid-word
    if start > 0
        && let Some(ws) = content[start..anchor].find(char::is_whitespace)
    {
        start += ws + 1;
        start = ceil_char_boundary(content, start);
    }
    if end < content.len()
        && let Some(ws) = content[anchor..end].rfind(char::is_whitespace)
        && ws > 0
    {
        end = anchor + ws;
    }

    let body = clean_excerpt(&content[start..end]);
    if body.is_empty() {
        return body;
    }

    let mut excerpt = String::with_capacity(body.len() + 6);
    if start > 0 {
        excerpt.push_str("...");
    }
    excerpt.push_str(&body);
    if end < content.len() {
        excerpt.push_str("...");
    }
    excerpt
}

/// Replace code and record blocks with placeholders and collapse blank-line runs.
pub fn clean_excerpt(text: &str) -> String {
    let text = CODE_BLOCK.replace_all(text, "[code example]");
    let text = RECORD_BLOCK.replace_all(&text, "[API data]");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Canonical URL for a non-API item: its first link, else the category's landing page.
pub fn item_url(category: Category, content: &str) -> String {
    if let Some(found) = URL.find(content) {
        return found
            .as_str()
            .trim_end_matches(['.', ',', ';', ':'])
            .to_string();
    }
    match category {
        Category::Api => "https://api.emberjs.com/ember/release".to_string(),
        Category::Guides => "https://guides.emberjs.com/release/".to_string(),
        Category::Community => "https://emberjs.com/community/".to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first `max` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices()
        .nth(max)
        .map_or(text, |(idx, _)| &text[..idx])
}

pub(crate) fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
