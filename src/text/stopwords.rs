use std::collections::HashSet;
use std::sync::OnceLock;

/// Function words dropped by the cleaner.
const ENGLISH: [&str; 23] = [
    "the", "and", "is", "in", "to", "of", "for", "on", "that", "this", "with", "as", "was", "by",
    "his", "he", "she", "it", "at", "or", "an", "be", "from",
];

#[derive(Debug, Clone)]
pub struct Stopwords(HashSet<&'static str>);

impl Stopwords {
    pub fn new<const N: usize>(words: [&'static str; N]) -> Self {
        Self(words.iter().copied().collect())
    }

    /// The fixed English set, built on first use.
    pub fn english() -> &'static Stopwords {
        static SET: OnceLock<Stopwords> = OnceLock::new();
        SET.get_or_init(|| Stopwords::new(ENGLISH))
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
