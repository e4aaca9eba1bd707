pub mod hits;
pub mod pagerank;
pub mod tfidf;

pub use hits::{HitsRanker, HitsScores};
pub use pagerank::PageRankScores;
pub use tfidf::TermWeight;
