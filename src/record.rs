//! Typed views of the records exchanged between stages.
//!
//! On disk every record is one `key<TAB>value` line whose key fields are
//! comma separated. Parsing is lenient in the same way everywhere: a line
//! that does not fit yields `None` and the caller drops it.

use std::fmt;

use crate::KeyValue;

/// Splits a stage output line into its key and value text.
pub fn split_line(line: &str) -> Option<(&str, &str)> {
    line.split_once('\t')
}

/// Rounds `year` down to the nearest multiple of `span`.
///
/// Uses floor division, so `-5` falls in the `-10` bucket. `None` when the
/// bucket start is not representable, e.g. `i32::MIN` with a span of 10.
pub fn bucket_of(year: i32, span: i32) -> Option<i32> {
    year.checked_div_euclid(span)?.checked_mul(span)
}

/// Rounds `year` down to its decade.
pub fn decade_of(year: i32) -> Option<i32> {
    bucket_of(year, 10)
}

fn parse_year(field: &str) -> Option<i32> {
    field.trim().parse().ok()
}

/// `(bookID, year)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookYear {
    pub book_id: String,
    pub year: i32,
}

impl BookYear {
    pub fn new(book_id: impl Into<String>, year: i32) -> Self {
        Self {
            book_id: book_id.into(),
            year,
        }
    }

    /// Parses `bookID,year`. Extra fields are ignored; fewer than two, or a
    /// non-numeric year, is rejected.
    pub fn parse(key: &str) -> Option<Self> {
        let mut fields = key.split(',');
        let book_id = fields.next()?.trim();
        let year = parse_year(fields.next()?)?;
        Some(Self::new(book_id, year))
    }
}

impl fmt::Display for BookYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.book_id, self.year)
    }
}

/// `(bookID, lemma, year)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookLemmaYear {
    pub book_id: String,
    pub lemma: String,
    pub year: i32,
}

impl BookLemmaYear {
    pub fn new(book_id: impl Into<String>, lemma: impl Into<String>, year: i32) -> Self {
        Self {
            book_id: book_id.into(),
            lemma: lemma.into(),
            year,
        }
    }

    /// Parses `bookID,lemma,year`; exactly three fields.
    pub fn parse(key: &str) -> Option<Self> {
        let fields: Vec<&str> = key.split(',').collect();
        let [book_id, lemma, year] = fields.as_slice() else {
            return None;
        };
        Some(Self::new(book_id.trim(), lemma.trim(), parse_year(year)?))
    }

    pub fn book_year(&self) -> BookYear {
        BookYear::new(self.book_id.clone(), self.year)
    }
}

impl fmt::Display for BookLemmaYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.book_id, self.lemma, self.year)
    }
}

/// `(bookID, decade)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookDecade {
    pub book_id: String,
    pub decade: i32,
}

impl BookDecade {
    pub fn new(book_id: impl Into<String>, decade: i32) -> Self {
        Self {
            book_id: book_id.into(),
            decade,
        }
    }
}

impl fmt::Display for BookDecade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.book_id, self.decade)
    }
}

/// Cleaner output: space separated tokens for one book and year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedRecord {
    pub key: BookYear,
    pub text: String,
}

impl CleanedRecord {
    pub fn parse(line: &str) -> Option<Self> {
        let (key, text) = split_line(line)?;
        Some(Self {
            key: BookYear::parse(key)?,
            text: text.trim().to_string(),
        })
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}

/// Frequency counter output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LemmaCount {
    pub key: BookLemmaYear,
    pub count: u64,
}

impl LemmaCount {
    pub fn parse(line: &str) -> Option<Self> {
        let (key, count) = split_line(line)?;
        Some(Self {
            key: BookLemmaYear::parse(key)?,
            count: count.trim().parse().ok()?,
        })
    }
}

/// Decade aggregator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecadeCount {
    pub key: BookDecade,
    pub count: u64,
}

/// Sentiment scorer output: the raw, unnormalized polarity sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentScore {
    pub key: BookYear,
    pub score: i64,
}

macro_rules! impl_record {
    ($ty:ty, $field:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}\t{}", self.key, self.$field)
            }
        }

        impl From<&$ty> for KeyValue {
            fn from(record: &$ty) -> Self {
                KeyValue::new(record.key.to_string(), record.$field.to_string())
            }
        }
    };
}

impl_record!(CleanedRecord, text);
impl_record!(LemmaCount, count);
impl_record!(DecadeCount, count);
impl_record!(SentimentScore, score);
