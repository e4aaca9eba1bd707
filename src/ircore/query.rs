use std::collections::HashMap;
use crate::ircore::index::pl::PostingsList;
use crate::ircore::kgram::{is_wildcard, WILDCARD};
use crate::ircore::tokenizer::Segmentator;
use crate::ircore::{DocId, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTerm {
    pub term: String,
    pub weight: f64,
}

/// A query as an ordered list of weighted terms. Weights are 1.0 until
/// relevance feedback changes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    terms: Vec<QueryTerm>,
}

impl Query {
    pub fn new() -> Self {
        Query { terms: vec![] }
    }

    /// Tokenizes `text` the way documents are tokenized. A chunk holding a
    /// `*` is kept whole as a wildcard pattern, minus surrounding punctuation.
    pub fn parse(text: &str) -> Self {
        let segmentator = Segmentator::new();
        let mut terms = Vec::new();
        for chunk in text.split_whitespace() {
            if is_wildcard(chunk) {
                let pattern = chunk
                    .trim_matches(|c: char| !c.is_alphanumeric() && c != WILDCARD)
                    .to_lowercase();
                if !pattern.is_empty() {
                    terms.push(QueryTerm { term: pattern, weight: 1.0 });
                }
            } else {
                terms.extend(segmentator.tokenize(chunk)
                    .into_iter()
                    .map(|term| QueryTerm { term, weight: 1.0 }));
            }
        }
        Query { terms }
    }

    pub fn push(&mut self, term: &str, weight: f64) {
        self.terms.push(QueryTerm { term: term.to_string(), weight });
    }

    pub fn size(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[QueryTerm] {
        &self.terms
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryTerm> {
        self.terms.iter()
    }

    /// Manhattan length of the query vector.
    pub fn length(&self) -> f64 {
        self.terms.iter().map(|t| t.weight).sum()
    }

    /// Rocchio-style expansion. Every term weight is scaled by `alpha`, then
    /// each occurrence of a term in a document marked relevant adds
    /// `(1 - alpha) / |relevant|`. `relevant[i]` refers to `results.get(i)`;
    /// `doc_tokens` supplies the tokens of a document.
    pub fn relevance_feedback<F>(
        &mut self,
        results: &PostingsList,
        relevant: &[bool],
        alpha: f64,
        mut doc_tokens: F,
    ) -> Result<()>
    where
        F: FnMut(DocId) -> Result<Vec<String>>,
    {
        let relevant_docs: Vec<DocId> = relevant
            .iter()
            .enumerate()
            .filter(|(_, is_relevant)| **is_relevant)
            .filter_map(|(i, _)| results.get(i).map(|p| p.get_doc_id()))
            .collect();
        if relevant_docs.is_empty() {
            return Ok(());
        }
        let beta = 1.0 - alpha;
        let increment = beta / relevant_docs.len() as f64;

        let mut weights: Vec<QueryTerm> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut add = |term: &str, delta: f64| {
            match positions.get(term) {
                Some(&i) => weights[i].weight += delta,
                None => {
                    positions.insert(term.to_string(), weights.len());
                    weights.push(QueryTerm { term: term.to_string(), weight: delta });
                }
            }
        };
        for qt in &self.terms {
            add(&qt.term, qt.weight * alpha);
        }
        for doc_id in relevant_docs {
            for token in doc_tokens(doc_id)? {
                add(&token, increment);
            }
        }
        log::debug!("relevance feedback expanded query to {} terms", weights.len());
        self.terms = weights;
        Ok(())
    }
}
