use crate::ircore::index::pl::PostingsList;
use crate::ircore::index::Index;
use crate::ircore::kgram::KGramLookup;
use crate::ircore::query::Query;
use crate::ircore::utils::similarity::{edit_distance, jaccard};
use crate::ircore::Result;

pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.4;
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;

/// A correction candidate and its ranking value.
#[derive(Debug, Clone, PartialEq)]
pub struct KGramStat {
    pub token: String,
    pub score: f64,
}

impl KGramStat {
    pub fn new(token: &str, score: f64) -> Self {
        KGramStat { token: token.to_string(), score }
    }
}

// score descending, then token
fn rank(stats: &mut [KGramStat]) {
    stats.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.token.cmp(&b.token)));
}

pub struct SpellChecker<'a> {
    index: &'a dyn Index,
    kgram: &'a dyn KGramLookup,
    jaccard_threshold: f64,
    max_edit_distance: usize,
}

impl<'a> SpellChecker<'a> {
    pub fn new(index: &'a dyn Index, kgram: &'a dyn KGramLookup) -> Self {
        SpellChecker {
            index,
            kgram,
            jaccard_threshold: DEFAULT_JACCARD_THRESHOLD,
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
        }
    }

    pub fn with_thresholds(mut self, jaccard_threshold: f64, max_edit_distance: usize) -> Self {
        self.jaccard_threshold = jaccard_threshold;
        self.max_edit_distance = max_edit_distance;
        self
    }

    /// Vocabulary terms close to `term`, each with its edit distance.
    fn candidates(&self, term: &str) -> Vec<(String, usize)> {
        let grams = self.kgram.kgrams(term);
        let mut found: Vec<(String, usize)> = self.kgram.words_sharing_kgram(term)
            .into_iter()
            .filter(|word| jaccard(&grams, &self.kgram.kgrams(word)) >= self.jaccard_threshold)
            .filter_map(|word| {
                let distance = edit_distance(term, &word);
                (distance <= self.max_edit_distance).then(|| (word, distance))
            })
            .collect();
        found.sort();
        found
    }

    /// Up to `limit` corrections for the query. A one-term query yields
    /// single terms ranked by document frequency; longer queries yield whole
    /// corrected phrases, space-joined.
    pub fn check(&self, query: &Query, limit: usize) -> Result<Vec<String>> {
        if query.is_empty() || limit == 0 {
            return Ok(vec![]);
        }
        if query.size() == 1 {
            let term = &query.terms()[0].term;
            let mut stats = Vec::new();
            for (word, _) in self.candidates(term) {
                let df = self.index.document_frequency(&word)?;
                stats.push(KGramStat::new(&word, df as f64));
            }
            rank(&mut stats);
            return Ok(stats.into_iter().take(limit).map(|s| s.token).collect());
        }

        let mut corrections = Vec::with_capacity(query.size());
        for qt in query.iter() {
            let mut stats = Vec::new();
            for (word, distance) in self.candidates(&qt.term) {
                let df = self.index.document_frequency(&word)?;
                if df > 0 {
                    stats.push(KGramStat::new(&word, (df as f64).ln() - distance as f64));
                }
            }
            if stats.is_empty() {
                // nothing close enough, keep the term as typed
                stats.push(KGramStat::new(&qt.term, 0.0));
            }
            rank(&mut stats);
            stats.truncate(limit);
            corrections.push(stats);
        }
        let merged = self.merge_corrections(&corrections, limit)?;
        Ok(merged.into_iter().map(|s| s.token).collect())
    }

    /// Combines per-term candidates left to right into phrases, scored by the
    /// number of documents containing every term of the phrase. After term
    /// `i` only the best `(n - i) * limit` phrases are kept.
    pub fn merge_corrections(&self, corrections: &[Vec<KGramStat>], limit: usize) -> Result<Vec<KGramStat>> {
        let n = corrections.len();
        let first = match corrections.first() {
            Some(first) => first,
            None => return Ok(vec![]),
        };
        let mut phrases: Vec<(String, PostingsList)> = Vec::with_capacity(first.len());
        for stat in first {
            phrases.push((stat.token.clone(), self.index.get_postings(&stat.token)?));
        }
        for (i, stats) in corrections.iter().enumerate().skip(1) {
            let mut postings = Vec::with_capacity(stats.len());
            for stat in stats {
                postings.push(self.index.get_postings(&stat.token)?);
            }
            let mut next = Vec::with_capacity(phrases.len() * stats.len());
            for (phrase, phrase_postings) in &phrases {
                for (stat, term_postings) in stats.iter().zip(&postings) {
                    next.push((
                        format!("{} {}", phrase, stat.token),
                        phrase_postings.intersect_with(term_postings),
                    ));
                }
            }
            next.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));
            next.truncate((n - i) * limit);
            phrases = next;
        }
        let mut merged: Vec<KGramStat> = phrases.into_iter()
            .map(|(phrase, postings)| KGramStat { token: phrase, score: postings.len() as f64 })
            .collect();
        rank(&mut merged);
        merged.truncate(limit);
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ircore::index::IndexBuilder;
    use crate::ircore::kgram::KGramIndex;
    use crate::ircore::{DocId, TermOffset};

    fn build(docs: &[&str]) -> (IndexBuilder, KGramIndex) {
        let mut builder = IndexBuilder::new();
        for (doc_id, text) in docs.iter().enumerate() {
            for (offset, token) in text.split_whitespace().enumerate() {
                builder.insert(token, doc_id as DocId, offset as TermOffset);
            }
        }
        let kgram = KGramIndex::from_terms(2, builder.terms());
        (builder, kgram)
    }

    #[test]
    fn test_single_term() {
        let (index, kgram) = build(&["color collar", "color colour", "color"]);
        let checker = SpellChecker::new(&index, &kgram);
        let suggestions = checker.check(&Query::parse("colur"), 10).unwrap();
        // collar is three edits away
        assert_eq!(suggestions, vec!["color", "colour"]);
        assert_eq!(checker.check(&Query::parse("colur"), 1).unwrap(), vec!["color"]);
        assert!(checker.check(&Query::parse("zebra"), 10).unwrap().is_empty());
        assert!(checker.check(&Query::new(), 10).unwrap().is_empty());
    }

    #[test]
    fn test_thresholds() {
        let (index, kgram) = build(&["color collar", "color colour", "color"]);
        let checker = SpellChecker::new(&index, &kgram).with_thresholds(0.4, 3);
        let suggestions = checker.check(&Query::parse("colur"), 10).unwrap();
        assert_eq!(suggestions, vec!["color", "collar", "colour"]);
        let checker = SpellChecker::new(&index, &kgram).with_thresholds(0.6, 2);
        assert_eq!(checker.check(&Query::parse("colur"), 10).unwrap(), vec!["colour"]);
    }

    #[test]
    fn test_multi_term() {
        let (index, kgram) = build(&["red color", "red colour", "red color", "blue colour"]);
        let checker = SpellChecker::new(&index, &kgram);
        let query = Query::parse("redd colur");
        assert_eq!(checker.check(&query, 2).unwrap(), vec!["red color", "red colour"]);
        // with one candidate per term only the closest spelling survives
        assert_eq!(checker.check(&query, 1).unwrap(), vec!["red colour"]);
    }

    #[test]
    fn test_merge_corrections() {
        let (index, kgram) = build(&["a x", "a y", "b y", "a y"]);
        let checker = SpellChecker::new(&index, &kgram);
        let corrections = vec![
            vec![KGramStat::new("a", 1.0), KGramStat::new("b", 0.5)],
            vec![KGramStat::new("x", 1.0), KGramStat::new("y", 0.5)],
        ];
        let merged = checker.merge_corrections(&corrections, 3).unwrap();
        let phrases: Vec<(&str, f64)> = merged.iter().map(|s| (s.token.as_str(), s.score)).collect();
        assert_eq!(phrases, vec![("a y", 2.0), ("a x", 1.0), ("b y", 1.0)]);
        assert!(checker.merge_corrections(&[], 3).unwrap().is_empty());
    }
}
