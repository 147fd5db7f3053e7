//! Text normalization rules shared by the stages.

pub mod lemmatize;
pub mod normalize;
pub mod stopwords;

pub use lemmatize::lemmatize;
pub use normalize::{normalize, normalize_with};
pub use stopwords::Stopwords;
