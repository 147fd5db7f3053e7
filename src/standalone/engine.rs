use anyhow::{Context, Result};
use dashmap::DashMap;
use glob::glob;
use itertools::Itertools;
use rayon::prelude::*;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::standalone::Job;
use crate::*;

// types related to this engine
type BucketIndex = u32;
pub type Buckets = DashMap<BucketIndex, Vec<Emitted>>;

/// A map output record tagged with the split that produced it and its
/// position in that split's output. Reducers see values in this order no
/// matter which thread delivered them first.
#[derive(Debug, Clone)]
pub struct Emitted {
    pub split: usize,
    pub seq: usize,
    pub kv: KeyValue,
}

/// Record counts for one stage run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub workload: String,
    pub splits: usize,
    /// Records emitted by the map functions.
    pub map_records: usize,
    /// Records left after combining, i.e. what went through the shuffle.
    pub shuffled_records: usize,
    /// Distinct keys, one output record each.
    pub output_records: usize,
    pub output_files: usize,
}

/// Lists the files named by `spec`: every regular file inside it when it is
/// a directory, otherwise the files matching it as a glob. Names starting
/// with `.` or `_` are skipped. Sorted by path.
pub fn input_files(spec: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(spec);
    let mut files: Vec<PathBuf> = if path.is_dir() {
        fs::read_dir(path)
            .with_context(|| format!("listing {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect()
    } else {
        glob(spec)?.flatten().collect()
    };
    files.retain(|file| {
        let visible = file
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| !name.starts_with('.') && !name.starts_with('_'));
        visible && file.is_file()
    });
    files.sort();
    Ok(files)
}

/// Cuts `text` into splits of at most `split_lines` whole lines, keyed by
/// their [`SplitId`].
pub fn split_text(source: &str, text: &str, split_lines: usize) -> Vec<KeyValue> {
    let split_lines = split_lines.max(1);
    let chunks = text.lines().chunks(split_lines);
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, mut lines)| {
            let mut value = lines.join("\n");
            value.push('\n');
            KeyValue::new(SplitId::new(source, i * split_lines).to_bytes(), value)
        })
        .collect()
}

/// Reads every input file and cuts it into map splits.
pub fn read_splits(files: &[PathBuf], split_lines: usize) -> Result<Vec<KeyValue>> {
    let mut splits = Vec::new();
    for pathspec in files {
        let buf = fs::read(pathspec).with_context(|| format!("reading {}", pathspec.display()))?;
        let text = String::from_utf8_lossy(&buf);
        let source = pathspec.to_str().unwrap_or("unknown");
        splits.extend(split_text(source, &text, split_lines));
    }
    Ok(splits)
}

/// Applies `reduce` to each run of equal keys in `records`, which must
/// already be ordered so that equal keys are adjacent.
fn reduce_sorted<I>(records: I, reduce: ReduceFn, ctx: &TaskContext) -> Result<Vec<KeyValue>>
where
    I: Iterator<Item = KeyValue>,
{
    let mut out = Vec::new();
    for (key, value_group) in &records.chunk_by(KeyValue::key) {
        let iter = value_group.map(KeyValue::into_value);
        let value = reduce(key.clone(), Box::new(iter), ctx)?;
        out.push(KeyValue { key, value });
    }
    Ok(out)
}

/// Runs the map function over one split and, if the workload has one, its
/// combiner over that split's output. Also returns how many records the map
/// function emitted before combining.
pub fn map_split(
    split: KeyValue,
    engine: &Workload,
    ctx: &TaskContext,
) -> Result<(usize, Vec<KeyValue>)> {
    let map_func = engine.map_fn;
    let mut emitted = map_func(split, ctx)?.collect::<Result<Vec<_>>>()?;
    let n_emitted = emitted.len();

    match engine.combine_fn {
        Some(combine) => {
            // stable, so a key's values keep their emission order
            emitted.sort_by_key(KeyValue::key);
            Ok((n_emitted, reduce_sorted(emitted.into_iter(), combine, ctx)?))
        }
        None => Ok((n_emitted, emitted)),
    }
}

/// Maps every split in parallel and routes each record to bucket
/// `ihash(key) % num_reduce_worker`.
///
/// Returns only once every split is mapped; no reduce may start earlier.
pub fn perform_map(
    splits: Vec<KeyValue>,
    engine: &Workload,
    ctx: &TaskContext,
    num_reduce_worker: u32,
) -> Result<(Buckets, usize)> {
    let buckets: Buckets = Buckets::new();
    let map_records = AtomicUsize::new(0);

    splits
        .into_par_iter()
        .enumerate()
        .try_for_each(|(split, input_kv)| -> Result<()> {
            let id = String::from_utf8_lossy(&input_kv.key).into_owned();
            let (n_emitted, out) = map_split(input_kv, engine, ctx)
                .with_context(|| format!("map task for split {id}"))?;
            debug!(split = %id, emitted = n_emitted, shuffled = out.len(), "map task done");
            map_records.fetch_add(n_emitted, Ordering::Relaxed);

            for (seq, kv) in out.into_iter().enumerate() {
                let bucket_no = ihash(&kv.key) % num_reduce_worker;
                buckets
                    .entry(bucket_no)
                    .or_default()
                    .push(Emitted { split, seq, kv });
            }
            Ok(())
        })?;

    Ok((buckets, map_records.into_inner()))
}

/// Reduces every bucket in parallel. Within a bucket, records are ordered by
/// key and then by where they were emitted, and each key's values are
/// handed to the reduce function in one lazy iterator.
pub fn perform_reduce(
    engine: &Workload,
    ctx: &TaskContext,
    buckets: Buckets,
) -> Result<Vec<(BucketIndex, Vec<KeyValue>)>> {
    let reduce_func = engine.reduce_fn;
    let mut reduced = buckets
        .into_par_iter()
        .map(|(reduce_id, mut bkt)| -> Result<(BucketIndex, Vec<KeyValue>)> {
            bkt.sort_unstable_by(|a, b| {
                a.kv.key
                    .cmp(&b.kv.key)
                    .then(a.split.cmp(&b.split))
                    .then(a.seq.cmp(&b.seq))
            });
            let out = reduce_sorted(bkt.into_iter().map(|e| e.kv), reduce_func, ctx)
                .with_context(|| format!("reduce task for bucket {reduce_id}"))?;
            debug!(bucket = reduce_id, keys = out.len(), "reduce task done");
            Ok((reduce_id, out))
        })
        .collect::<Result<Vec<_>>>()?;
    reduced.sort_unstable_by_key(|(id, _)| *id);
    Ok(reduced)
}

/// Map, shuffle and reduce `splits` entirely in memory. Returns every
/// reduced record, sorted by key.
pub fn execute(
    splits: Vec<KeyValue>,
    engine: &Workload,
    ctx: &TaskContext,
    num_reduce_worker: u32,
) -> Result<Vec<KeyValue>> {
    let (buckets, _) = perform_map(splits, engine, ctx, num_reduce_worker.max(1))?;
    let mut out: Vec<KeyValue> = perform_reduce(engine, ctx, buckets)?
        .into_iter()
        .flat_map(|(_, kvs)| kvs)
        .collect();
    out.sort_unstable_by_key(KeyValue::key);
    Ok(out)
}

/// Writes one `mr-out-<bucket>` file per bucket, one `key<TAB>value` line
/// per record.
pub fn write_output(output_dir: &Path, reduced: &[(BucketIndex, Vec<KeyValue>)]) -> Result<usize> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    for (reduce_id, kvs) in reduced {
        let out_pathspec = output_dir.join(format!("mr-out-{}", reduce_id));
        let mut out_file = BufWriter::new(
            File::create(&out_pathspec)
                .with_context(|| format!("creating {}", out_pathspec.display()))?,
        );
        for kv in kvs {
            out_file.write_all(&kv.key)?;
            out_file.write_all(b"\t")?;
            out_file.write_all(&kv.value)?;
            out_file.write_all(b"\n")?;
        }
        out_file.flush()?;
    }
    Ok(reduced.len())
}

/// Runs one stage from its input files to its output directory.
///
/// Either every bucket is written or, on any error, the output directory is
/// removed again.
pub fn run_job(job: &Job, engine: &Workload, ctx: &TaskContext) -> Result<StageReport> {
    if job.output.exists() {
        return Err(PipelineError::OutputExists(job.output.clone()).into());
    }
    let files = input_files(&job.input)?;
    // an empty directory is an empty stage, a spec matching nothing is not
    if files.is_empty() && !Path::new(&job.input).is_dir() {
        return Err(PipelineError::NoInput(job.input.clone()).into());
    }
    info!(stage = engine.name, input = %job.input, files = files.len(), "stage started");

    let splits = read_splits(&files, job.split_lines)?;
    let n_splits = splits.len();
    let (buckets, map_records) = perform_map(splits, engine, ctx, job.n_reduce.max(1))?;
    let shuffled_records: usize = buckets.iter().map(|bkt| bkt.value().len()).sum();
    let reduced = perform_reduce(engine, ctx, buckets)?;

    let output_files = match write_output(&job.output, &reduced) {
        Ok(n) => n,
        Err(err) => {
            if let Err(cleanup) = fs::remove_dir_all(&job.output) {
                warn!("could not remove {}: {cleanup}", job.output.display());
            }
            return Err(err);
        }
    };

    let report = StageReport {
        workload: engine.name.to_string(),
        splits: n_splits,
        map_records,
        shuffled_records,
        output_records: reduced.iter().map(|(_, kvs)| kvs.len()).sum(),
        output_files,
    };
    info!(
        stage = engine.name,
        splits = report.splits,
        map_records = report.map_records,
        shuffled = report.shuffled_records,
        keys = report.output_records,
        "stage finished"
    );
    Ok(report)
}

/// Reads back every record of a finished stage, sorted by key.
pub fn read_output(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut records = Vec::new();
    for file in input_files(&dir.to_string_lossy())? {
        let text = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
        records.extend(text.lines().filter_map(|line| {
            let (key, value) = line.split_once('\t')?;
            Some((key.to_string(), value.to_string()))
        }));
    }
    records.sort();
    Ok(records)
}
