//! Book corpus trend analysis as a chain of MapReduce stages.
//!
//! Raw `bookID,title,year,content` records are cleaned, lemmatized and
//! counted per book and year, rolled up into decade buckets and scored for
//! sentiment. Every stage is a pure map function followed by a grouped
//! reduce, executed by the in-process engine in [`standalone::engine`].

use bytes::Bytes;
use std::hash::Hasher;
use std::sync::Arc;

pub mod cmd;
pub mod error;
pub mod record;
pub mod standalone;
pub mod tables;
pub mod text;
pub mod workload;

use tables::Tables;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// The output of an application map function.
///
/// There are 2 layers of [`anyhow::Result`]s here. The outer layer
/// accounts for errors that arise while creating the iterator.
/// The inner layer accounts for errors that occur during iteration.
///
/// This accomodates both batch (all keys emitted at once) and lazy
/// (keys only emitted when the iterator is consumed) map operations.
pub type MapOutput = anyhow::Result<Box<dyn Iterator<Item = anyhow::Result<KeyValue>>>>;

/// A map function takes an input split and the task context.
///
/// It returns an iterator that yields new key-value pairs.
pub type MapFn = fn(kv: KeyValue, ctx: &TaskContext) -> MapOutput;

/// A reduce function takes in a key, an iterator over values for that key,
/// and the task context. It returns an [`anyhow::Result`]
/// containing the single reduced value for that key.
///
/// The iterator has no upper bound on its length; reducers must consume it
/// lazily rather than assume a fixed number of values.
pub type ReduceFn = fn(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    ctx: &TaskContext,
) -> anyhow::Result<Bytes>;

/// A map reduce application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub name: &'static str,
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
    /// Partial reducer applied to each split's output before the shuffle.
    /// Must produce values of the same shape the map function emits.
    pub combine_fn: Option<ReduceFn>,
}

impl std::fmt::Debug for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workload")
            .field("name", &self.name)
            .field("combines", &self.combine_fn.is_some())
            .finish()
    }
}

/// Everything a map or reduce invocation may read besides its input.
///
/// Cloning is cheap: the lookup tables are shared behind an [`Arc`] and
/// never mutated once loaded.
#[derive(Clone, Debug, Default)]
pub struct TaskContext {
    /// JSON-serialized `Vec<String>` of auxiliary workload arguments.
    pub aux: Bytes,
    pub tables: Arc<Tables>,
}

impl TaskContext {
    pub fn new(args: &[String], tables: Arc<Tables>) -> anyhow::Result<Self> {
        let aux = Bytes::from(serde_json::to_string(args)?);
        Ok(Self { aux, tables })
    }

    /// Decodes the auxiliary arguments. An empty payload means no arguments.
    pub fn args(&self) -> anyhow::Result<Vec<String>> {
        if self.aux.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&self.aux)?)
    }
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeyValue {
    /// The key.
    pub key: Bytes,
    /// The value.
    pub value: Bytes,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key of this key-value pair.
    ///
    /// This method is cheap, since [`Bytes`] are cheaply cloneable.
    #[inline]
    pub fn key(&self) -> Bytes {
        self.key.clone()
    }

    /// Get the value of this key-value pair.
    ///
    /// This method is cheap, since [`Bytes`] are cheaply cloneable.
    #[inline]
    pub fn value(&self) -> Bytes {
        self.value.clone()
    }

    /// Consumes the key-value pair and returns the key.
    #[inline]
    pub fn into_key(self) -> Bytes {
        self.key
    }

    /// Consumes the key-value pair and returns the value.
    #[inline]
    pub fn into_value(self) -> Bytes {
        self.value
    }
}

/// Identifies the input split handed to a map task: the file it was cut
/// from and the zero-based index of its first line within that file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitId {
    pub source: String,
    pub first_line: usize,
}

impl SplitId {
    pub fn new(source: impl Into<String>, first_line: usize) -> Self {
        Self {
            source: source.into(),
            first_line,
        }
    }

    /// Whether this split begins at the top of its source file.
    pub fn is_file_start(&self) -> bool {
        self.first_line == 0
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_string())
    }

    /// Decodes a key produced by [`SplitId::to_bytes`].
    pub fn parse(key: &[u8]) -> Option<Self> {
        let s = std::str::from_utf8(key).ok()?;
        let (source, line) = s.rsplit_once('@')?;
        Some(Self::new(source, line.parse().ok()?))
    }
}

impl std::fmt::Display for SplitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.source, self.first_line)
    }
}

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    hasher.write(key);
    (hasher.finish() & 0x7fffffff) as u32
}
