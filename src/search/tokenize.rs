//! Query-term splitting, singular/plural term forms, and stemmed tokenization.

use rust_stemmers::Stemmer;
use xxhash_rust::xxh3::xxh3_64;

/// Query terms shorter than this are dropped (unless nothing else is left).
const MIN_TERM_LENGTH: usize = 3;

/// Common English stop words filtered out of stemmed token streams.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with",
];

/// Split a query into lower-cased, de-duplicated search terms.
///
/// Terms are whitespace-separated with surrounding punctuation trimmed. Terms shorter than
/// three characters are dropped unless that would leave nothing. Only ASCII letters are
/// folded, matching the ASCII-lowered content they are searched in.
pub fn query_terms(query: &str) -> Vec<String> {
    let all: Vec<String> = query
        .split_whitespace()
        .map(|raw| {
            raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '@' && c != '_')
                .to_ascii_lowercase()
        })
        .filter(|term| !term.is_empty())
        .collect();

    let long: Vec<&String> = all
        .iter()
        .filter(|term| term.chars().count() >= MIN_TERM_LENGTH)
        .collect();
    let chosen: Vec<&String> = if long.is_empty() {
        all.iter().collect()
    } else {
        long
    };

    let mut terms: Vec<String> = Vec::with_capacity(chosen.len());
    for term in chosen {
        if !terms.contains(term) {
            terms.push(term.clone());
        }
    }
    terms
}

fn ends_with_sibilant(word: &str) -> bool {
    ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !"aeiou".contains(c)
}

/// Singular form of an English word (best effort).
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies")
        && stem.len() >= 2
    {
        return format!("{}y", stem);
    }
    if let Some(stem) = word.strip_suffix("es")
        && ends_with_sibilant(stem)
        && stem.len() >= 3
    {
        return stem.to_string();
    }
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Plural form of an English word (best effort).
pub fn pluralize(word: &str) -> String {
    if word.ends_with('y') && word.chars().rev().nth(1).is_some_and(is_consonant) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if ends_with_sibilant(word) {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

/// Exact, singular and plural forms of a term, without duplicates.
///
/// A term that is already plural only gains its singular form.
pub fn term_forms(term: &str) -> Vec<String> {
    let mut forms = vec![term.to_string()];
    let singular = singularize(term);
    let plural = if singular == term {
        pluralize(term)
    } else {
        term.to_string()
    };
    for form in [singular, plural] {
        if !form.is_empty() && !forms.contains(&form) {
            forms.push(form);
        }
    }
    forms
}

/// Tokenizes text into stemmed terms with case-aware splitting.
///
/// Splits on non-alphabetic characters, `_`/`-`, and lowercase→uppercase transitions:
/// - **camelCase**: "didInsertElement" → ["did", "insert", "element", "didinsertel..."]
/// - **kebab-case**: "ember-data" → ["ember", "data"]
///
/// `word_start` tracks the whole word and `subword_start` the current component, so both the
/// components and the compound are emitted.
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<String> {
    let mut tokens = vec![];

    let mut last_case = None;
    let mut word_start = 0;
    let mut subword_start = 0;
    let mut word_start_next_char = true;
    let mut subword_start_next_char = true;

    for (i, c) in text.char_indices() {
        if word_start_next_char {
            word_start = i;
            subword_start = i;
            word_start_next_char = false;
            subword_start_next_char = false;
        }

        if subword_start_next_char {
            subword_start = i;
            subword_start_next_char = false;
        }

        let current_case = c.is_alphabetic().then(|| c.is_uppercase());
        let case_change = last_case == Some(false) && current_case == Some(true);
        last_case = current_case;

        if c == '-' || c == '_' {
            if i > subword_start {
                index_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            subword_start_next_char = true;
        } else if !c.is_alphabetic() {
            if i > subword_start && subword_start != word_start {
                index_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            if i > word_start {
                index_token(&text[word_start..i], &mut tokens, stemmer);
            }
            word_start_next_char = true;
        } else if case_change {
            if i > subword_start {
                index_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            subword_start = i;
        }
    }

    if !word_start_next_char {
        let last_subword = &text[subword_start..];
        if word_start != subword_start && !last_subword.is_empty() {
            index_token(last_subword, &mut tokens, stemmer);
        }
        let last_word = &text[word_start..];
        if !last_word.is_empty() {
            index_token(last_word, &mut tokens, stemmer);
        }
    }

    tokens
}

/// Lower-case, drop stop words and hyphen/underscore fragments, then stem.
fn index_token(token: &str, tokens: &mut Vec<String>, stemmer: &Stemmer) {
    let lowercase = token
        .trim_matches(|c: char| c == '-' || c == '_')
        .to_lowercase();

    if lowercase.is_empty() || STOP_WORDS.contains(&lowercase.as_str()) {
        return;
    }

    tokens.push(stemmer.stem(&lowercase).into_owned());
}

/// Stable, case-insensitive term hash.
pub(crate) fn hash_term(term: &str) -> u64 {
    xxh3_64(term.to_lowercase().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;
    use rust_stemmers::Algorithm;

    #[rstest]
    #[case("tracked properties", vec!["tracked", "properties"])]
    #[case("How do I use @tracked?", vec!["how", "use", "@tracked"])]
    #[case("Proxy proxy PROXY", vec!["proxy"])]
    #[case("a b", vec!["a", "b"])]
    #[case("Émber Übersicht", vec!["Émber", "Übersicht"])]
    #[case("   ", vec![])]
    fn test_query_terms(#[case] input: &str, #[case] expected: Vec<&str>) {
        check!(query_terms(input) == expected);
    }

    #[rstest]
    #[case("components", "component")]
    #[case("properties", "property")]
    #[case("classes", "class")]
    #[case("class", "class")]
    #[case("route", "route")]
    #[case("bus", "bus")]
    fn test_singularize(#[case] input: &str, #[case] expected: &str) {
        check!(singularize(input) == expected);
    }

    #[rstest]
    #[case("component", "components")]
    #[case("property", "properties")]
    #[case("key", "keys")]
    #[case("class", "classes")]
    fn test_pluralize(#[case] input: &str, #[case] expected: &str) {
        check!(pluralize(input) == expected);
    }

    #[test]
    fn test_term_forms_deduplicated() {
        check!(term_forms("component") == vec!["component", "components"]);
        check!(term_forms("services") == vec!["services", "service"]);
    }

    #[rstest]
    #[case("didInsertElement", &["did", "insert", "element"])]
    #[case("ember-data", &["ember", "data"])]
    #[case("tracked_properties", &["track", "properti"])]
    fn test_tokenize_contains(#[case] input: &str, #[case] expected: &[&str]) {
        let stemmer = Stemmer::create(Algorithm::English);
        let tokens = tokenize_and_stem(input, &stemmer);
        for token in expected {
            check!(tokens.contains(&token.to_string()), "missing {} in {:?}", token, tokens);
        }
    }

    #[test]
    fn test_tokenize_filters_stop_words() {
        let stemmer = Stemmer::create(Algorithm::English);
        let tokens = tokenize_and_stem("the router is in the application", &stemmer);
        check!(tokens == vec!["router", "applic"]);
    }

    #[rstest]
    #[case("")]
    #[case("\n\t ")]
    #[case("日本 🦀")]
    fn test_tokenize_degenerate_input(#[case] input: &str) {
        let stemmer = Stemmer::create(Algorithm::English);
        let _tokens = tokenize_and_stem(input, &stemmer);
    }

    #[test]
    fn test_hash_is_case_insensitive() {
        check!(hash_term("Tracked") == hash_term("tracked"));
    }
}
