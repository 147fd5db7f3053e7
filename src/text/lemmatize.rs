use crate::tables::LemmatizationTable;

/// Suffix rules in priority order: `(suffix, minimum length exclusive,
/// characters to drop, replacement)`. Only the first match applies, so
/// `ies` must stay ahead of `es` and `s`.
const SUFFIX_RULES: [(&str, usize, usize, &str); 5] = [
    ("ing", 4, 3, ""),
    ("ed", 3, 2, ""),
    ("ies", 3, 3, "y"),
    ("es", 3, 2, ""),
    ("s", 3, 1, ""),
];

/// Maps a token to its lemma: dictionary lookup first, then the first
/// matching suffix rule, otherwise the lowercased token itself.
///
/// The suffix rules are literal string surgery, e.g. `running` becomes
/// `runn`.
pub fn lemmatize(token: &str, table: &LemmatizationTable) -> String {
    let word = token.to_lowercase();
    if let Some(lemma) = table.get(&word) {
        return lemma.to_string();
    }
    strip_suffix(&word)
}

fn strip_suffix(word: &str) -> String {
    let len = word.chars().count();
    for (suffix, min_len, drop, replacement) in SUFFIX_RULES {
        if len > min_len && word.ends_with(suffix) {
            let stem: String = word.chars().take(len - drop).collect();
            return stem + replacement;
        }
    }
    word.to_string()
}
