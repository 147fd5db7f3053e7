//! Converts stage names to actual application code.
//!
//! # Example
//!
//! To get the frequency counting stage:
//! ```
//! # use anyhow::Result;
//! use booktrends::workload;
//! # fn main() -> Result<()> {
//! let frequency = workload::named("frequency")?;
//! assert!(frequency.combine_fn.is_some());
//! # Ok(())
//! # }
//! ```

use crate::error::PipelineError;
use crate::{TaskContext, Workload};
use anyhow::{Context, Result};
use std::fmt::Display;
use bytes::Bytes;

pub mod clean;
pub mod decade;
pub mod frequency;
pub mod sentiment;

/// Names accepted by [`named`], in pipeline order.
pub const NAMES: [&str; 5] = ["clean", "frequency", "decade", "sentiment", "sentiment-text"];

/// Gets the [`Workload`] named `name`.
///
/// Returns [`None`] if no stage with the given name was found.
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "clean" => Some(Workload {
            name: "clean",
            map_fn: clean::map,
            reduce_fn: clean::reduce,
            combine_fn: Some(clean::reduce),
        }),
        "frequency" => Some(Workload {
            name: "frequency",
            map_fn: frequency::map,
            reduce_fn: sum_counts,
            combine_fn: Some(sum_counts),
        }),
        "decade" => Some(Workload {
            name: "decade",
            map_fn: decade::map,
            reduce_fn: sum_counts,
            combine_fn: Some(sum_counts),
        }),
        "sentiment" => Some(Workload {
            name: "sentiment",
            map_fn: sentiment::map,
            reduce_fn: sum_scores,
            combine_fn: Some(sum_scores),
        }),
        "sentiment-text" => Some(Workload {
            name: "sentiment-text",
            map_fn: sentiment::map_text,
            reduce_fn: sum_scores,
            combine_fn: Some(sum_scores),
        }),
        _ => None,
    }
}

/// Gets the [`Workload`] named `name`.
///
/// Returns an [`anyhow::Error`] if no stage with the given name was found.
pub fn named(name: &str) -> Result<Workload> {
    match try_named(name) {
        Some(app) => Ok(app),
        None => Err(PipelineError::UnknownWorkload(name.to_string()).into()),
    }
}

fn overflow(key: &[u8], total: impl Display) -> anyhow::Error {
    anyhow::anyhow!(
        "sum for key {} overflows past {total}",
        String::from_utf8_lossy(key)
    )
}

/// Additive combinator over non-negative counts.
pub fn sum_counts(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _ctx: &TaskContext,
) -> Result<Bytes> {
    let mut total: u64 = 0;
    for value in values {
        let count: u64 = std::str::from_utf8(&value)?
            .parse()
            .with_context(|| format!("bad count for key {}", String::from_utf8_lossy(&key)))?;
        total = total.checked_add(count).ok_or_else(|| overflow(&key, total))?;
    }
    Ok(Bytes::from(total.to_string()))
}

/// Additive combinator over signed scores.
pub fn sum_scores(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _ctx: &TaskContext,
) -> Result<Bytes> {
    let mut total: i64 = 0;
    for value in values {
        let score: i64 = std::str::from_utf8(&value)?
            .parse()
            .with_context(|| format!("bad score for key {}", String::from_utf8_lossy(&key)))?;
        total = total.checked_add(score).ok_or_else(|| overflow(&key, total))?;
    }
    Ok(Bytes::from(total.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&'static str]) -> Box<dyn Iterator<Item = Bytes>> {
        Box::new(items.to_vec().into_iter().map(|s| Bytes::from_static(s.as_bytes())))
    }

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            assert_eq!(named(name).unwrap().name, name);
        }
        assert!(try_named("wc").is_none());
        assert!(named("wc").is_err());
    }

    #[test]
    fn sums() {
        let ctx = TaskContext::default();
        let key = Bytes::from_static(b"k");
        assert_eq!(sum_counts(key.clone(), values(&["1", "2", "40"]), &ctx).unwrap(), "43");
        assert_eq!(sum_scores(key.clone(), values(&["3", "-5"]), &ctx).unwrap(), "-2");
        assert_eq!(sum_counts(key.clone(), values(&[]), &ctx).unwrap(), "0");
        assert!(sum_counts(key, values(&["x"]), &ctx).is_err());
    }

    #[test]
    fn overflowing_sums_are_errors() {
        let ctx = TaskContext::default();
        let key = Bytes::from_static(b"1,1851");
        assert!(sum_counts(key.clone(), values(&["18446744073709551615", "1"]), &ctx).is_err());
        assert!(sum_scores(key.clone(), values(&["9223372036854775807", "1"]), &ctx).is_err());
        assert!(sum_scores(key.clone(), values(&["-9223372036854775808", "-1"]), &ctx).is_err());
        assert_eq!(
            sum_scores(key, values(&["9223372036854775807", "-1", "1"]), &ctx).unwrap(),
            "9223372036854775807"
        );
    }

    #[test]
    fn partial_sums_compose() {
        let ctx = TaskContext::default();
        let key = Bytes::from_static(b"k");
        let left = sum_counts(key.clone(), values(&["1", "2"]), &ctx).unwrap();
        let right = sum_counts(key.clone(), values(&["3"]), &ctx).unwrap();
        let staged = sum_counts(key.clone(), Box::new(vec![left, right].into_iter()), &ctx).unwrap();
        let flat = sum_counts(key, values(&["1", "2", "3"]), &ctx).unwrap();
        assert_eq!(staged, flat);
    }
}
