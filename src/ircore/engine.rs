use std::fs;
use std::path::Path;
use crate::ircore::config::EngineConfig;
use crate::ircore::doc::dir::DirIter;
use crate::ircore::doc::text::TextFileLoader;
use crate::ircore::doc::Document;
use crate::ircore::index::pl::PostingsList;
use crate::ircore::index::{Index, IndexBuilder, PersistentHashedIndex};
use crate::ircore::kgram::KGramIndex;
use crate::ircore::query::Query;
use crate::ircore::ranking::{HitsRanker, PageRankScores};
use crate::ircore::search::Searcher;
use crate::ircore::spelling::SpellChecker;
use crate::ircore::tokenizer::Segmentator;
use crate::ircore::{DocId, IrError, NodeId, NormalizationType, QueryType, RankingType, Result, TermOffset};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub name: String,
    pub score: f64,
}

/// A frozen index with its k-gram index and the optional link collaborators.
pub struct Engine {
    config: EngineConfig,
    index: PersistentHashedIndex,
    kgram: KGramIndex,
    pagerank: Option<PageRankScores>,
    hits: Option<HitsRanker>,
    segmentator: Segmentator,
}

impl Engine {
    /// Indexes every file under `corpus_dir` into `config.index_dir`.
    pub fn build(corpus_dir: &Path, config: EngineConfig) -> Result<Self> {
        let segmentator = Segmentator::new();
        let mut builder = IndexBuilder::new();
        let mut doc_id: DocId = 0;
        for doc in DirIter::new(corpus_dir) {
            let tokens = segmentator.tokenize(doc.get_content());
            for (offset, token) in tokens.iter().enumerate() {
                builder.insert(token, doc_id, offset as TermOffset);
            }
            builder.add_document(doc_id, doc.get_path(), tokens.len() as u32);
            doc_id += 1;
            if doc_id % 1000 == 0 {
                log::info!("{} documents indexed", doc_id);
            }
        }
        log::info!("indexed {} documents from {}", doc_id, corpus_dir.display());

        let kgram = KGramIndex::from_terms(config.kgram_k, builder.terms());
        let index = builder.freeze(&config.index_dir, config.table_size)?;
        kgram.save_to(&config.index_dir)?;
        let engine = Self::assemble(config, index, kgram)?;
        engine.save_config()?;
        Ok(engine)
    }

    /// Opens the index stored in `config.index_dir`.
    pub fn load(config: EngineConfig) -> Result<Self> {
        let index = PersistentHashedIndex::open(&config.index_dir)?;
        let kgram = KGramIndex::load_from(&config.index_dir)?;
        if kgram.k() != config.kgram_k {
            log::warn!("k-gram index was built with k = {}, config asks for {}", kgram.k(), config.kgram_k);
        }
        Self::assemble(config, index, kgram)
    }

    fn assemble(config: EngineConfig, index: PersistentHashedIndex, kgram: KGramIndex) -> Result<Self> {
        let pagerank = match &config.pagerank_file {
            Some(path) => Some(PageRankScores::load(path)?),
            None => None,
        };
        let hits = match (&config.links_file, &config.titles_file) {
            (Some(links), Some(titles)) => Some(
                HitsRanker::from_files(links, titles)?
                    .with_max_iterations(config.hits_max_iterations)
                    .with_epsilon(config.hits_epsilon)
                    .with_time_budget(config.hits_time_budget()),
            ),
            (None, None) => None,
            _ => {
                log::warn!("hits needs both links_file and titles_file, link graph disabled");
                None
            }
        };
        Ok(Engine {
            config,
            index,
            kgram,
            pagerank,
            hits,
            segmentator: Segmentator::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn index(&self) -> &PersistentHashedIndex {
        &self.index
    }

    pub fn doc_count(&self) -> usize {
        self.index.doc_info().len()
    }

    pub fn searcher(&self) -> Searcher<'_> {
        let mut searcher = Searcher::new(&self.index)
            .with_kgram(&self.kgram)
            .with_combination_scale(self.config.combination_scale);
        if let Some(pagerank) = &self.pagerank {
            searcher = searcher.with_pagerank(pagerank);
        }
        if let Some(hits) = &self.hits {
            searcher = searcher.with_hits(hits);
        }
        searcher
    }

    pub fn search_postings(
        &self,
        query: &Query,
        query_type: QueryType,
        ranking: RankingType,
        normalization: NormalizationType,
    ) -> Result<PostingsList> {
        self.searcher().search(query, query_type, ranking, normalization)
    }

    pub fn search(
        &self,
        query: &Query,
        query_type: QueryType,
        ranking: RankingType,
        normalization: NormalizationType,
    ) -> Result<Vec<SearchHit>> {
        let results = self.search_postings(query, query_type, ranking, normalization)?;
        let doc_info = self.index.doc_info();
        Ok(results.iter()
            .map(|p| SearchHit {
                doc_id: p.get_doc_id(),
                name: doc_info.name(p.get_doc_id()).unwrap_or_default().to_string(),
                score: p.score(),
            })
            .collect())
    }

    pub fn spell_check(&self, query: &Query, limit: usize) -> Result<Vec<String>> {
        SpellChecker::new(&self.index, &self.kgram)
            .with_thresholds(self.config.jaccard_threshold, self.config.max_edit_distance)
            .check(query, limit)
    }

    fn doc_tokens(&self, doc_id: DocId) -> Result<Vec<String>> {
        match self.index.doc_info().name(doc_id) {
            Some(name) => {
                let doc = Document::parse_file(Path::new(name))?;
                Ok(self.segmentator.tokenize(doc.get_content()))
            }
            None => {
                log::warn!("no document with id {}", doc_id);
                Ok(vec![])
            }
        }
    }

    /// Reweights `query` from the documents of `hits` marked relevant,
    /// re-reading those documents from the corpus.
    pub fn relevance_feedback(&self, query: &mut Query, hits: &[SearchHit], relevant: &[bool]) -> Result<()> {
        let mut results = PostingsList::new();
        for hit in hits {
            results.insert_scored(hit.doc_id, hit.score);
        }
        query.relevance_feedback(&results, relevant, self.config.feedback_alpha, |doc_id| self.doc_tokens(doc_id))
    }

    /// Best hubs and authorities of the whole link graph, by title.
    pub fn hits_top(&self, k: usize) -> Result<(Vec<(String, f64)>, Vec<(String, f64)>)> {
        let hits = self.hits.as_ref().ok_or(IrError::Unavailable("link graph"))?;
        let scores = hits.rank_all();
        let titled = |top: Vec<(NodeId, f64)>| -> Vec<(String, f64)> {
            top.into_iter()
                .map(|(node, score)| {
                    let title = hits.title_of(node).map_or_else(|| node.to_string(), String::from);
                    (title, score)
                })
                .collect()
        };
        Ok((titled(scores.top_hubs(k)), titled(scores.top_authorities(k))))
    }

    /// Writes the current configuration next to the index.
    pub fn save_config(&self) -> Result<()> {
        let cfg = serde_yaml::to_string(&self.config)?;
        fs::write(self.config.index_dir.join(crate::ircore::CFG_NAME), cfg)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn corpus(root: &Path) -> PathBuf {
        let dir = root.join("corpus");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.txt"), "The cat sat.").unwrap();
        fs::write(dir.join("b.txt"), "The cat ran!").unwrap();
        fs::write(dir.join(".hidden"), "cat cat cat").unwrap();
        dir
    }

    fn config(root: &Path) -> EngineConfig {
        EngineConfig {
            index_dir: root.join("index"),
            table_size: 101,
            ..Default::default()
        }
    }

    fn names(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| crate::ircore::doc::file_name(&h.name)).collect()
    }

    #[test]
    fn test_build_search_and_reload() {
        let root = tempfile::tempdir().unwrap();
        let corpus_dir = corpus(root.path());
        let engine = Engine::build(&corpus_dir, config(root.path())).unwrap();
        assert_eq!(engine.doc_count(), 2);
        let (tw, norm) = (RankingType::TermWeight, NormalizationType::ByTokenCount);
        let hits = engine.search(&Query::parse("cat the"), QueryType::Intersection, tw, norm).unwrap();
        assert_eq!(names(&hits), vec!["a.txt", "b.txt"]);
        let hits = engine.search(&Query::parse("cat the"), QueryType::Phrase, tw, norm).unwrap();
        assert!(hits.is_empty());
        drop(engine);

        let engine = Engine::load(config(root.path())).unwrap();
        assert_eq!(engine.doc_count(), 2);
        let hits = engine.search(&Query::parse("the cat"), QueryType::Phrase, tw, norm).unwrap();
        assert_eq!(hits.len(), 2);
        let hits = engine.search(&Query::parse("r*"), QueryType::Ranked, tw, norm).unwrap();
        assert_eq!(names(&hits), vec!["b.txt"]);
        assert!(hits[0].score > 0.0);
        assert_eq!(engine.spell_check(&Query::parse("catt"), 5).unwrap(), vec!["cat"]);
        assert!(engine.hits_top(5).is_err());
    }

    #[test]
    fn test_load_missing_index() {
        let root = tempfile::tempdir().unwrap();
        assert!(Engine::load(config(root.path())).is_err());
    }

    #[test]
    fn test_relevance_feedback() {
        let root = tempfile::tempdir().unwrap();
        let engine = Engine::build(&corpus(root.path()), config(root.path())).unwrap();
        let (tw, norm) = (RankingType::TermWeight, NormalizationType::ByTokenCount);
        let mut query = Query::parse("sat");
        let hits = engine.search(&query, QueryType::Ranked, tw, norm).unwrap();
        assert_eq!(names(&hits), vec!["a.txt"]);
        engine.relevance_feedback(&mut query, &hits, &[true]).unwrap();
        let terms: Vec<&str> = query.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["sat", "the", "cat"]);
        assert!((query.terms()[0].weight - 1.0).abs() < 1e-12);
        assert!((query.terms()[1].weight - 0.8).abs() < 1e-12);
        assert!((query.length() - 2.6).abs() < 1e-12);
        // "the" and "cat" occur everywhere, "ran" was never asked for
        let hits = engine.search(&query, QueryType::Ranked, tw, norm).unwrap();
        assert_eq!(names(&hits), vec!["a.txt", "b.txt"]);
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn test_link_collaborators() {
        let root = tempfile::tempdir().unwrap();
        let corpus_dir = corpus(root.path());
        let links = root.path().join("links.txt");
        let titles = root.path().join("titles.txt");
        let pagerank = root.path().join("pagerank.txt");
        fs::write(&links, "1;2\n2;1,3\n3;\n").unwrap();
        fs::write(&titles, "1;a.txt\n2;b.txt\n3;c.txt\n").unwrap();
        fs::write(&pagerank, "a.txt;0.25\nb.txt;0.5\n").unwrap();
        let cfg = EngineConfig {
            links_file: Some(links),
            titles_file: Some(titles),
            pagerank_file: Some(pagerank),
            ..config(root.path())
        };
        drop(Engine::build(&corpus_dir, cfg.clone()).unwrap());
        let engine = Engine::load(cfg).unwrap();
        let norm = NormalizationType::ByTokenCount;
        let cat = Query::parse("cat");

        let hits = engine.search(&cat, QueryType::Ranked, RankingType::LinkAuthority, norm).unwrap();
        assert_eq!(names(&hits), vec!["b.txt", "a.txt"]);
        assert_eq!(hits[0].score, 0.5);

        let hits = engine.search(&cat, QueryType::Ranked, RankingType::Hits, norm).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.score > 0.0));

        let (hubs, authorities) = engine.hits_top(1).unwrap();
        assert_eq!(hubs[0].0, "b.txt");
        assert_eq!(authorities.len(), 1);
    }

    #[test]
    fn test_build_saves_config() {
        let root = tempfile::tempdir().unwrap();
        let pagerank = root.path().join("pagerank.txt");
        fs::write(&pagerank, "a.txt;0.25\nb.txt;0.5\n").unwrap();
        let cfg = EngineConfig {
            pagerank_file: Some(pagerank),
            jaccard_threshold: 0.9,
            ..config(root.path())
        };
        let engine = Engine::build(&corpus(root.path()), cfg).unwrap();
        let reloaded = EngineConfig::load_or_default(&root.path().join("index")).unwrap();
        assert_eq!(&reloaded, engine.config());
        assert_eq!(reloaded.jaccard_threshold, 0.9);
        drop(engine);

        // a later run without an explicit config still finds the collaborators
        let engine = Engine::load(reloaded).unwrap();
        let hits = engine.search(
            &Query::parse("cat"),
            QueryType::Ranked,
            RankingType::LinkAuthority,
            NormalizationType::ByTokenCount,
        ).unwrap();
        assert_eq!(names(&hits), vec!["b.txt", "a.txt"]);
    }
}
