use crate::ircore::index::doc_info::DocInfo;
use crate::ircore::index::pl::PostingsList;
use crate::ircore::{DocId, NormalizationType};

/// `ln(N / df)`, zero when either count is zero.
pub fn idf(doc_count: usize, df: usize) -> f64 {
    if doc_count == 0 || df == 0 {
        return 0.0;
    }
    finite_or_zero((doc_count as f64 / df as f64).ln())
}

pub fn doc_norm(doc_info: &DocInfo, doc_id: DocId, normalization: NormalizationType) -> f64 {
    match normalization {
        NormalizationType::ByTokenCount => doc_info.token_count(doc_id) as f64,
        NormalizationType::ByEuclideanLength => doc_info.euclidean_length(doc_id),
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

pub trait TermWeight {
    /// Adds `tf * idf / norm(d) * query_weight` of one term to every
    /// candidate that contains it.
    fn add_term_weight(
        &mut self,
        term_postings: &PostingsList,
        query_weight: f64,
        doc_info: &DocInfo,
        normalization: NormalizationType,
    );
}

impl TermWeight for PostingsList {
    fn add_term_weight(
        &mut self,
        term_postings: &PostingsList,
        query_weight: f64,
        doc_info: &DocInfo,
        normalization: NormalizationType,
    ) {
        let idf = idf(doc_info.len(), term_postings.len());
        if idf == 0.0 {
            return;
        }
        // both lists are in doc id order
        let mut term_iter = term_postings.iter().peekable();
        for candidate in self.iter_mut() {
            let doc_id = candidate.get_doc_id();
            while term_iter.peek().map_or(false, |p| p.get_doc_id() < doc_id) {
                term_iter.next();
            }
            let posting = match term_iter.peek() {
                Some(p) if p.get_doc_id() == doc_id => p,
                _ => continue,
            };
            let norm = doc_norm(doc_info, doc_id, normalization);
            if norm == 0.0 || !norm.is_finite() {
                continue;
            }
            let weight = posting.term_frequency() as f64 * idf / norm;
            candidate.add_score(finite_or_zero(weight * query_weight));
        }
    }
}
