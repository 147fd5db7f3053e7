//! Decade aggregator: `bookID,lemma,year<TAB>count` to
//! `bookID,decade -> count`, dropping the lemma.

use crate::record::{bucket_of, BookDecade, DecadeCount, LemmaCount};
use crate::*;
use anyhow::{ensure, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug, Serialize, Deserialize)]
#[clap(no_binary_name = true)]
struct Args {
    /// Width of a bucket in years.
    #[clap(long, value_parser, default_value_t = 10)]
    span: i32,
}

fn span(ctx: &TaskContext) -> Result<i32> {
    let args = Args::try_parse_from(ctx.args()?)?;
    ensure!(args.span > 0, "bucket span must be positive, got {}", args.span);
    Ok(args.span)
}

pub fn map(kv: KeyValue, ctx: &TaskContext) -> MapOutput {
    let span = span(ctx)?;
    let content = String::from_utf8_lossy(&kv.value);

    let records = content
        .lines()
        .filter_map(LemmaCount::parse)
        .filter_map(|LemmaCount { key, count }| {
            let bucket = BookDecade::new(key.book_id, bucket_of(key.year, span)?);
            Some(KeyValue::from(&DecadeCount { key: bucket, count }))
        })
        .collect::<Vec<_>>();

    Ok(Box::new(records.into_iter().map(Ok)))
}
