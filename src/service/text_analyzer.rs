//! Keyword and phrase frequency ranking over page text.

use std::collections::HashMap;

const MIN_TOKEN_CHARS: usize = 3;
const MIN_PHRASE_CHARS: usize = 5;

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "do", "does", "for", "from", "had", "has", "have", "he", "her",
    "his", "how", "if", "in", "into", "is", "it", "its", "just", "more", "most", "my", "no",
    "not", "of", "on", "or", "our", "out", "over", "she", "so", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "to", "up", "was", "we", "were", "what",
    "when", "which", "who", "will", "with", "would", "you", "your",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

fn is_keyword_token(token: &str) -> bool {
    token.chars().count() >= MIN_TOKEN_CHARS
        && !token.chars().all(|c| c.is_numeric())
}

/// Count occurrences and rank by descending frequency; ties keep the order
/// in which terms were first seen.
fn rank(terms: impl IntoIterator<Item = String>, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for term in terms {
        let count = counts.entry(term.clone()).or_insert(0);
        if *count == 0 {
            order.push(term);
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|term| {
            let count = counts[&term];
            (term, count)
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

pub fn top_keywords(text: &str, limit: usize) -> Vec<(String, usize)> {
    let tokens = tokenize(text)
        .into_iter()
        .filter(|t| is_keyword_token(t) && !is_stopword(t));
    rank(tokens, limit)
}

/// Rank `size`-token phrases. Windows containing a stopword, or shorter
/// than five characters once joined, are skipped. Short and numeric tokens
/// may appear in a phrase.
pub fn top_phrases(text: &str, limit: usize, size: usize) -> Vec<(String, usize)> {
    if size == 0 {
        return Vec::new();
    }
    let tokens = tokenize(text);
    let phrases = tokens
        .windows(size)
        .filter(|window| window.iter().all(|t| !is_stopword(t)))
        .map(|window| window.join(" "))
        .filter(|phrase| phrase.chars().count() >= MIN_PHRASE_CHARS)
        .collect::<Vec<_>>();
    rank(phrases, limit)
}
