use std::collections::HashMap;
use std::fs;
use std::path::Path;
use crate::ircore::doc::file_name;
use crate::ircore::index::doc_info::DocInfo;
use crate::ircore::index::pl::PostingsList;
use crate::ircore::{IrError, Result};

/// Precomputed link-authority scores keyed by document file name.
#[derive(Debug, Default, Clone)]
pub struct PageRankScores {
    scores: HashMap<String, f64>,
}

impl PageRankScores {
    pub fn new() -> Self {
        PageRankScores { scores: HashMap::new() }
    }

    /// Reads `<fileName>;<score>` lines. Blank lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let scores = Self::parse(&content, &path.display().to_string())?;
        log::info!("read {} pagerank scores from {}", scores.len(), path.display());
        Ok(scores)
    }

    pub fn parse(content: &str, source: &str) -> Result<Self> {
        let mut scores = PageRankScores::new();
        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (name, score) = line.rsplit_once(';')
                .ok_or_else(|| IrError::malformed(source, i + 1, "expected <fileName>;<score>"))?;
            let score: f64 = score.trim().parse()
                .map_err(|_| IrError::malformed(source, i + 1, format!("bad score '{}'", score)))?;
            scores.insert(name, score);
        }
        Ok(scores)
    }

    pub fn insert(&mut self, name: &str, score: f64) {
        self.scores.insert(name.to_string(), score);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Score of a document name; only the file-name component is compared.
    pub fn score(&self, name: &str) -> f64 {
        self.scores.get(file_name(name)).copied().unwrap_or_default()
    }

    /// Adds `scale * pagerank(d)` to every candidate.
    pub fn add_scores(&self, candidates: &mut PostingsList, doc_info: &DocInfo, scale: f64) {
        for posting in candidates.iter_mut() {
            if let Some(name) = doc_info.name(posting.get_doc_id()) {
                let score = self.score(name) * scale;
                if score.is_finite() {
                    posting.add_score(score);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_lookup() {
        let scores = PageRankScores::parse("Davis.f;0.0125\n\nUC_Davis.f;0.5\n", "pr").unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.score("davisWiki/UC_Davis.f"), 0.5);
        assert_eq!(scores.score("Davis.f"), 0.0125);
        assert_eq!(scores.score("Nowhere.f"), 0.0);
    }

    #[test]
    fn test_malformed_line() {
        let err = PageRankScores::parse("Davis.f;0.1\nbroken\n", "pr.txt").unwrap_err();
        assert!(matches!(err, IrError::Malformed { line: 2, .. }));
        assert!(PageRankScores::parse("Davis.f;high", "pr.txt").is_err());
    }

    #[test]
    fn test_add_scores() {
        let mut doc_info = DocInfo::new();
        doc_info.insert(0, "wiki/A.f", 3);
        doc_info.insert(1, "wiki/B.f", 3);
        let mut scores = PageRankScores::new();
        scores.insert("B.f", 0.002);
        let mut candidates = PostingsList::new();
        candidates.insert_scored(0, 1.0);
        candidates.insert_scored(1, 1.0);
        scores.add_scores(&mut candidates, &doc_info, 1000.0);
        assert_eq!(candidates.get(0).unwrap().score(), 1.0);
        assert!((candidates.get(1).unwrap().score() - 3.0).abs() < 1e-12);
    }
}
