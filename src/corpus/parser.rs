//! Splits the aggregated documentation text into sections and separator-delimited items.

use super::{Corpus, Item};
use regex::Regex;
use std::sync::LazyLock;

/// `# api-docs`, `# community-bloggers`, `# components`: one `#`, then a lowercase-hyphen token.
static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# ([a-z0-9]+(?:-[a-z0-9]+)*)\s*$").expect("valid regex"));

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-{3,}\s*$").expect("valid regex"));

/// Returns true for separator lines (three or more hyphens).
pub fn is_separator(line: &str) -> bool {
    SEPARATOR.is_match(line)
}

/// Accumulates lines for the item currently being read.
#[derive(Default)]
struct PendingItem {
    lines: Vec<String>,
    start_line: usize,
}

impl PendingItem {
    fn push(&mut self, line: &str, line_number: usize) {
        if self.lines.is_empty() {
            self.start_line = line_number;
        }
        self.lines.push(line.to_string());
    }

    fn has_content(&self) -> bool {
        self.lines.iter().any(|line| !line.trim().is_empty())
    }

    /// Emit the accumulated item (if it has any content) and reset the buffer.
    fn flush_into(&mut self, corpus: &mut Corpus, section: Option<usize>) {
        if let Some(section) = section
            && self.has_content()
        {
            let content = std::mem::take(&mut self.lines).join("\n");
            corpus.push_item(
                section,
                Item {
                    content,
                    start_line: self.start_line,
                },
            );
        }
        self.lines.clear();
    }
}

/// Parse raw corpus text into sections of items.
///
/// Text before the first section header is discarded. Separator lines are dropped.
/// A section header that recurs appends to the existing section.
pub fn parse_corpus(text: &str) -> Corpus {
    let mut corpus = Corpus::default();
    let mut current: Option<usize> = None;
    let mut pending = PendingItem::default();

    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;

        if let Some(caps) = SECTION_HEADER.captures(line) {
            pending.flush_into(&mut corpus, current);
            current = Some(corpus.section_slot(&caps[1]));
            continue;
        }

        if current.is_none() {
            continue;
        }

        if is_separator(line) {
            // A separator only splits once something has accumulated
            if !pending.lines.is_empty() {
                pending.flush_into(&mut corpus, current);
            }
            continue;
        }

        pending.push(line, line_number);
    }

    pending.flush_into(&mut corpus, current);

    tracing::debug!(
        "Parsed corpus: {} sections, {} items",
        corpus.section_count(),
        corpus.item_count()
    );

    corpus
}
