//! Cleaner: raw `bookID,title,year,content` lines to
//! `bookID,year<TAB>tokens`.
//!
//! The first line of every input file is its header and is skipped. Only
//! the split that starts at line zero of a file carries it, so later splits
//! of the same file never lose a data record. Malformed lines are dropped.

use crate::record::{BookYear, CleanedRecord};
use crate::text::normalize;
use crate::*;
use anyhow::Result;
use bytes::Bytes;
use itertools::Itertools;

/// Cleans one raw line. Returns [`None`] for lines with fewer than four
/// fields, a non-numeric year, or no tokens left after normalization.
pub fn clean_line(line: &str) -> Option<CleanedRecord> {
    // Only the first 3 commas separate fields; content keeps its own.
    let fields: Vec<&str> = line.trim().splitn(4, ',').collect();
    let [book_id, _title, year, content] = fields.as_slice() else {
        return None;
    };
    let key = BookYear::new(book_id.trim(), year.trim().parse().ok()?);
    let tokens = normalize(content);
    if tokens.is_empty() {
        return None;
    }
    Some(CleanedRecord {
        key,
        text: tokens.join(" "),
    })
}

pub fn map(kv: KeyValue, _ctx: &TaskContext) -> MapOutput {
    let skip_header = SplitId::parse(&kv.key).is_none_or(|split| split.is_file_start());
    let content = String::from_utf8_lossy(&kv.value);

    let records = content
        .lines()
        .skip(usize::from(skip_header))
        .filter_map(clean_line)
        .map(|record| KeyValue::from(&record))
        .collect::<Vec<_>>();

    Ok(Box::new(records.into_iter().map(Ok)))
}

/// Concatenates the token runs for one `(bookID, year)` with single spaces,
/// in arrival order.
pub fn reduce(
    _key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _ctx: &TaskContext,
) -> Result<Bytes> {
    let text = values
        .map(|value| String::from_utf8_lossy(&value).trim().to_string())
        .filter(|value| !value.is_empty())
        .join(" ");
    Ok(Bytes::from(text))
}
