//! Sentiment scorer: lexicon polarity weighted by frequency, summed per
//! `(bookID, year)`. The total is a raw sum, never divided by length.

use crate::record::{CleanedRecord, LemmaCount, SentimentScore};
use crate::tables::Tables;
use crate::text::lemmatize;
use crate::*;

/// Scores `bookID,lemma,year<TAB>count` lines. Every parseable line emits a
/// record, so books whose words are all neutral still report `0`. A line
/// whose weighted score does not fit in an `i64` is dropped.
pub fn map(kv: KeyValue, ctx: &TaskContext) -> MapOutput {
    let content = String::from_utf8_lossy(&kv.value);
    let lexicon = &ctx.tables.lexicon;

    let records = content
        .lines()
        .filter_map(LemmaCount::parse)
        .filter_map(|LemmaCount { key, count }| {
            let score = lexicon
                .score(&key.lemma)
                .checked_mul(i64::try_from(count).ok()?)?;
            Some(KeyValue::from(&SentimentScore {
                key: key.book_year(),
                score,
            }))
        })
        .collect::<Vec<_>>();

    Ok(Box::new(records.into_iter().map(Ok)))
}

/// Scores a surface token: its own lexicon entry if it has one, otherwise
/// the entry for its lemma.
pub fn token_score(token: &str, tables: &Tables) -> i64 {
    match tables.lexicon.get(token) {
        Some(score) => score,
        None => tables.lexicon.score(&lemmatize(token, &tables.lemmas)),
    }
}

/// Single-pass variant reading cleaner output directly.
pub fn map_text(kv: KeyValue, ctx: &TaskContext) -> MapOutput {
    let content = String::from_utf8_lossy(&kv.value);
    let tables = ctx.tables.as_ref();

    let records = content
        .lines()
        .filter_map(CleanedRecord::parse)
        .filter_map(|record| {
            let score = record
                .tokens()
                .try_fold(0i64, |total, token| total.checked_add(token_score(token, tables)))?;
            Some(KeyValue::from(&SentimentScore {
                key: record.key,
                score,
            }))
        })
        .collect::<Vec<_>>();

    Ok(Box::new(records.into_iter().map(Ok)))
}
