use crate::ircore::index::pl::PostingsList;
use crate::ircore::index::Index;
use crate::ircore::kgram::{is_wildcard, KGramLookup};
use crate::ircore::query::Query;
use crate::ircore::ranking::{HitsRanker, PageRankScores, TermWeight};
use crate::ircore::{IrError, NormalizationType, QueryType, RankingType, Result, TermOffset};

pub const DEFAULT_COMBINATION_SCALE: f64 = 1000.0;

/// Evaluates queries against an index. The optional collaborators are only
/// needed by wildcard terms and by the link-based ranking modes.
pub struct Searcher<'a> {
    index: &'a dyn Index,
    kgram: Option<&'a dyn KGramLookup>,
    pagerank: Option<&'a PageRankScores>,
    hits: Option<&'a HitsRanker>,
    combination_scale: f64,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a dyn Index) -> Self {
        Searcher {
            index,
            kgram: None,
            pagerank: None,
            hits: None,
            combination_scale: DEFAULT_COMBINATION_SCALE,
        }
    }

    pub fn with_kgram(mut self, kgram: &'a dyn KGramLookup) -> Self {
        self.kgram = Some(kgram);
        self
    }

    pub fn with_pagerank(mut self, pagerank: &'a PageRankScores) -> Self {
        self.pagerank = Some(pagerank);
        self
    }

    pub fn with_hits(mut self, hits: &'a HitsRanker) -> Self {
        self.hits = Some(hits);
        self
    }

    pub fn with_combination_scale(mut self, scale: f64) -> Self {
        self.combination_scale = scale;
        self
    }

    /// Postings of every vocabulary term `term` stands for: itself, or each
    /// match of a wildcard pattern.
    fn expand(&self, term: &str) -> Result<Vec<PostingsList>> {
        if !is_wildcard(term) {
            return Ok(vec![self.index.get_postings(term)?]);
        }
        let kgram = self.kgram.ok_or(IrError::Unavailable("k-gram index"))?;
        let matches = kgram.expand_wildcard(term)?;
        log::debug!("'{}' expands to {} terms", term, matches.len());
        matches.iter().map(|t| self.index.get_postings(t)).collect()
    }

    fn union_of(lists: &[PostingsList]) -> PostingsList {
        lists.iter().fold(PostingsList::new(), |acc, pl| acc.union_with(pl))
    }

    pub fn search(
        &self,
        query: &Query,
        query_type: QueryType,
        ranking: RankingType,
        normalization: NormalizationType,
    ) -> Result<PostingsList> {
        if query.is_empty() {
            return Ok(PostingsList::new());
        }
        let mut term_lists = Vec::with_capacity(query.size());
        for qt in query.iter() {
            term_lists.push(self.expand(&qt.term)?);
        }
        let result = match query_type {
            QueryType::Intersection => {
                let mut lists = term_lists.iter().map(|l| Self::union_of(l));
                let first = lists.next().unwrap_or_default();
                lists.fold(first, |acc, pl| acc.intersect_with(&pl))
            }
            QueryType::Phrase => {
                let mut lists = term_lists.iter().map(|l| Self::union_of(l));
                let first = lists.next().unwrap_or_default();
                lists.enumerate()
                    .fold(first, |acc, (i, pl)| acc.phrase_with(&pl, (i + 1) as TermOffset))
            }
            QueryType::Ranked => self.rank(query, &term_lists, ranking, normalization)?,
        };
        log::debug!("{:?} query of {} terms matched {} documents",
            query_type, query.size(), result.len());
        Ok(result)
    }

    fn rank(
        &self,
        query: &Query,
        term_lists: &[Vec<PostingsList>],
        ranking: RankingType,
        normalization: NormalizationType,
    ) -> Result<PostingsList> {
        let doc_info = self.index.doc_info();
        let mut candidates = term_lists.iter()
            .flatten()
            .fold(PostingsList::new(), |acc, pl| acc.union_with(pl));
        candidates.reset_scores();

        let add_term_weights = |candidates: &mut PostingsList| {
            for (qt, lists) in query.iter().zip(term_lists) {
                for pl in lists {
                    candidates.add_term_weight(pl, qt.weight, doc_info, normalization);
                }
            }
        };
        match ranking {
            RankingType::TermWeight => add_term_weights(&mut candidates),
            RankingType::LinkAuthority => {
                let pagerank = self.pagerank.ok_or(IrError::Unavailable("pagerank scores"))?;
                pagerank.add_scores(&mut candidates, doc_info, 1.0);
            }
            RankingType::Combination => {
                let pagerank = self.pagerank.ok_or(IrError::Unavailable("pagerank scores"))?;
                add_term_weights(&mut candidates);
                pagerank.add_scores(&mut candidates, doc_info, self.combination_scale);
            }
            RankingType::Hits => {
                let hits = self.hits.ok_or(IrError::Unavailable("link graph"))?;
                candidates = hits.rank(&candidates, doc_info);
            }
        }
        candidates.sort_by_score();
        Ok(candidates)
    }
}
