//! Frequency counter: `bookID,year<TAB>tokens` to one
//! `bookID,lemma,year -> 1` record per token occurrence.

use crate::record::{split_line, BookLemmaYear, BookYear};
use crate::tables::LemmatizationTable;
use crate::text::lemmatize;
use crate::*;

/// Lemmatizes every token of one cleaned line. Lines without a tab or whose
/// key is not `bookID,year` yield nothing.
pub fn lemma_keys(line: &str, lemmas: &LemmatizationTable) -> Vec<BookLemmaYear> {
    let Some((key, sentence)) = split_line(line) else {
        return Vec::new();
    };
    let Some(BookYear { book_id, year }) = BookYear::parse(key) else {
        return Vec::new();
    };

    let sentence: String = sentence
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect::<String>()
        .to_lowercase();

    sentence
        .split_whitespace()
        .map(|token| BookLemmaYear::new(book_id.as_str(), lemmatize(token, lemmas), year))
        .collect()
}

pub fn map(kv: KeyValue, ctx: &TaskContext) -> MapOutput {
    let content = String::from_utf8_lossy(&kv.value);
    let lemmas = &ctx.tables.lemmas;

    let records = content
        .lines()
        .flat_map(|line| lemma_keys(line, lemmas))
        .map(|key| KeyValue::new(key.to_string(), "1"))
        .collect::<Vec<_>>();

    Ok(Box::new(records.into_iter().map(Ok)))
}
