use super::Stopwords;

/// Normalizes raw content into tokens using the English stopword set.
///
/// See [`normalize_with`].
pub fn normalize(raw: &str) -> Vec<String> {
    normalize_with(raw, Stopwords::english())
}

/// Lowercases `raw`, deletes every character outside `[a-z ]`, splits on
/// runs of spaces and drops stopwords and tokens of length one or less.
///
/// Deleted characters are not replaced by a space, so `"cat,dog"` and
/// `"cat\tdog"` both become the single token `"catdog"`.
pub fn normalize_with(raw: &str, stopwords: &Stopwords) -> Vec<String> {
    let stripped: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == ' ')
        .collect();

    stripped
        .split(' ')
        .filter(|token| token.len() > 1 && !stopwords.contains(token))
        .map(str::to_string)
        .collect()
}
