//! Read-only lookup tables consulted by the map functions.
//!
//! Tables are loaded once per process, before any stage runs, and then only
//! ever read. A missing or unreadable table file is not fatal: it is logged
//! and replaced by an empty table, which degrades lemmatization to the
//! suffix rules and sentiment to zero scores.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, trace, warn};

/// Surface word to canonical lemma.
#[derive(Debug, Clone, Default)]
pub struct LemmatizationTable(HashMap<String, String>);

impl LemmatizationTable {
    pub fn from_pairs<I, W, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, L)>,
        W: Into<String>,
        L: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(w, l)| (w.into(), l.into()))
                .collect(),
        )
    }

    /// Parses `surfaceWord lemma` lines. Lines that do not have exactly two
    /// whitespace-separated fields are skipped.
    pub fn parse(text: &str) -> Self {
        let mut table = HashMap::new();
        for (n, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [word, lemma] => {
                    table.insert(word.to_string(), lemma.to_string());
                }
                [] => {}
                _ => trace!(line = n + 1, "skipping malformed lemmatization entry"),
            }
        }
        Self(table)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading lemmatization table {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, word: &str) -> Option<&str> {
        self.0.get(word).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Word to integer polarity. Absent words score zero.
#[derive(Debug, Clone, Default)]
pub struct SentimentLexicon(HashMap<String, i64>);

impl SentimentLexicon {
    pub fn from_pairs<I, W>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, i64)>,
        W: Into<String>,
    {
        Self(pairs.into_iter().map(|(w, s)| (w.into(), s)).collect())
    }

    /// Parses `word score` lines. The last field is the score and everything
    /// before it is the word, so AFINN phrases such as `cool stuff\t3` load
    /// as `"cool stuff"`. Lines without a numeric score are skipped.
    pub fn parse(text: &str) -> Self {
        let mut table = HashMap::new();
        for (n, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let Some((score, word)) = fields.split_last() else {
                continue;
            };
            match score.parse::<i64>() {
                Ok(score) if !word.is_empty() => {
                    table.insert(word.join(" "), score);
                }
                _ => trace!(line = n + 1, "skipping malformed lexicon entry"),
            }
        }
        Self(table)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading sentiment lexicon {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, word: &str) -> Option<i64> {
        self.0.get(word).copied()
    }

    /// The polarity of `word`, zero when unknown.
    #[inline]
    pub fn score(&self, word: &str) -> i64 {
        self.get(word).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The lookup tables available to every map and reduce invocation.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub lemmas: LemmatizationTable,
    pub lexicon: SentimentLexicon,
}

impl Tables {
    pub fn new(lemmas: LemmatizationTable, lexicon: SentimentLexicon) -> Self {
        Self { lemmas, lexicon }
    }

    /// Loads whichever tables are given. Load failures are logged and the
    /// affected table is left empty.
    pub fn load(lemmas: Option<&Path>, lexicon: Option<&Path>) -> Self {
        let lemmas = lemmas
            .map(|path| {
                LemmatizationTable::read(path).unwrap_or_else(|err| {
                    warn!("{err:#}; falling back to suffix rules only");
                    LemmatizationTable::default()
                })
            })
            .unwrap_or_default();
        let lexicon = lexicon
            .map(|path| {
                SentimentLexicon::read(path).unwrap_or_else(|err| {
                    warn!("{err:#}; every word will score 0");
                    SentimentLexicon::default()
                })
            })
            .unwrap_or_default();
        info!(
            lemmas = lemmas.len(),
            lexicon = lexicon.len(),
            "lookup tables loaded"
        );
        Self { lemmas, lexicon }
    }
}
