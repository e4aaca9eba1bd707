use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use crate::ircore::doc::file_name;
use crate::ircore::index::doc_info::DocInfo;
use crate::ircore::index::pl::PostingsList;
use crate::ircore::utils::sparse_vector::{SparseVector, SparseVectorOp};
use crate::ircore::{IrError, NodeId, Result};

pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
pub const DEFAULT_EPSILON: f64 = 0.001;

/// Hub and authority vectors over one base set.
#[derive(Debug, Clone, Default)]
pub struct HitsScores {
    pub hubs: SparseVector,
    pub authorities: SparseVector,
    pub iterations: usize,
    pub converged: bool,
}

impl HitsScores {
    pub fn score(&self, node: NodeId) -> f64 {
        self.hubs.vec_get(node) + self.authorities.vec_get(node)
    }

    pub fn top_hubs(&self, k: usize) -> Vec<(NodeId, f64)> {
        self.hubs.vec_top(k)
    }

    pub fn top_authorities(&self, k: usize) -> Vec<(NodeId, f64)> {
        self.authorities.vec_top(k)
    }
}

/// HITS over a static link graph whose node ids are private to the graph.
/// Documents are tied to nodes through their titles.
#[derive(Debug)]
pub struct HitsRanker {
    title_to_id: HashMap<String, NodeId>,
    id_to_title: HashMap<NodeId, String>,
    links_to: HashMap<NodeId, Vec<NodeId>>,
    links_from: HashMap<NodeId, Vec<NodeId>>,
    max_iterations: usize,
    epsilon: f64,
    time_budget: Option<Duration>,
}

fn parse_node(s: &str, source: &str, line: usize) -> Result<NodeId> {
    s.trim().parse()
        .map_err(|_| IrError::malformed(source, line, format!("bad node id '{}'", s)))
}

impl HitsRanker {
    pub fn new<T, E>(titles: T, edges: E) -> Self
    where
        T: IntoIterator<Item = (NodeId, String)>,
        E: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut ranker = HitsRanker {
            title_to_id: HashMap::new(),
            id_to_title: HashMap::new(),
            links_to: HashMap::new(),
            links_from: HashMap::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
            time_budget: None,
        };
        for (id, title) in titles {
            ranker.add_title(id, title);
        }
        for (from, to) in edges {
            ranker.add_link(from, to);
        }
        ranker
    }

    /// Loads `<nodeID>;<out1>,<out2>,...` links and `<nodeID>;<title>` titles.
    pub fn from_files(links: &Path, titles: &Path) -> Result<Self> {
        let mut ranker = HitsRanker::new(Vec::<(NodeId, String)>::new(), Vec::<(NodeId, NodeId)>::new());
        let titles_src = titles.display().to_string();
        for (i, line) in fs::read_to_string(titles)?.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (id, title) = line.split_once(';')
                .ok_or_else(|| IrError::malformed(&titles_src, i + 1, "expected <nodeID>;<title>"))?;
            ranker.add_title(parse_node(id, &titles_src, i + 1)?, title.to_string());
        }
        let links_src = links.display().to_string();
        for (i, line) in fs::read_to_string(links)?.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (from, tos) = line.split_once(';')
                .ok_or_else(|| IrError::malformed(&links_src, i + 1, "expected <nodeID>;<out>,..."))?;
            let from = parse_node(from, &links_src, i + 1)?;
            for to in tos.split(',').filter(|s| !s.trim().is_empty()) {
                ranker.add_link(from, parse_node(to, &links_src, i + 1)?);
            }
        }
        log::info!("read {} titles and {} linking nodes", ranker.title_to_id.len(), ranker.links_to.len());
        Ok(ranker)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }

    fn add_title(&mut self, id: NodeId, title: String) {
        self.title_to_id.insert(title.clone(), id);
        self.id_to_title.insert(id, title);
    }

    fn add_link(&mut self, from: NodeId, to: NodeId) {
        self.links_to.entry(from).or_default().push(to);
        self.links_from.entry(to).or_default().push(from);
    }

    pub fn node_of(&self, title: &str) -> Option<NodeId> {
        self.title_to_id.get(title).copied()
    }

    pub fn title_of(&self, node: NodeId) -> Option<&str> {
        self.id_to_title.get(&node).map(|t| t.as_str())
    }

    /// Roots plus every node one link away in either direction.
    pub fn base_set(&self, roots: &[NodeId]) -> BTreeSet<NodeId> {
        let mut base = BTreeSet::new();
        for root in roots {
            base.insert(*root);
            if let Some(tos) = self.links_to.get(root) {
                base.extend(tos.iter().copied());
            }
            if let Some(froms) = self.links_from.get(root) {
                base.extend(froms.iter().copied());
            }
        }
        base
    }

    /// Power iteration over the base set of `roots`. Stops at convergence,
    /// at the iteration cap or when the time budget runs out, and returns the
    /// scores reached so far in every case.
    pub fn iterate(&self, roots: &[NodeId]) -> HitsScores {
        let base = self.base_set(roots);
        let mut scores = HitsScores {
            hubs: base.iter().map(|id| (*id, 1.0)).collect(),
            authorities: base.iter().map(|id| (*id, 1.0)).collect(),
            ..Default::default()
        };
        let started = Instant::now();
        let neighbours = |links: &HashMap<NodeId, Vec<NodeId>>, id: NodeId| -> Vec<NodeId> {
            links.get(&id)
                .map(|ids| ids.iter().copied().filter(|n| base.contains(n)).collect())
                .unwrap_or_default()
        };
        while scores.iterations < self.max_iterations {
            if let Some(budget) = self.time_budget {
                if started.elapsed() >= budget {
                    log::warn!("hits stopped after {} iterations, time budget spent", scores.iterations);
                    break;
                }
            }
            let mut hubs = SparseVector::with_capacity(base.len());
            let mut authorities = SparseVector::with_capacity(base.len());
            for id in base.iter().copied() {
                let hub: f64 = neighbours(&self.links_to, id).iter()
                    .map(|to| scores.authorities.vec_get(*to))
                    .sum();
                let authority: f64 = neighbours(&self.links_from, id).iter()
                    .map(|from| scores.hubs.vec_get(*from))
                    .sum();
                hubs.insert(id, hub);
                authorities.insert(id, authority);
            }
            hubs.vec_normalize();
            authorities.vec_normalize();
            let hubs_diff = hubs.vec_l1_distance(&scores.hubs);
            let authorities_diff = authorities.vec_l1_distance(&scores.authorities);
            scores.hubs = hubs;
            scores.authorities = authorities;
            scores.iterations += 1;
            if hubs_diff < self.epsilon && authorities_diff < self.epsilon {
                scores.converged = true;
                break;
            }
        }
        log::debug!("hits: {} nodes, {} iterations, converged: {}",
            base.len(), scores.iterations, scores.converged);
        scores
    }

    /// Re-scores `candidates` with `hub + authority` of their node. A document
    /// whose name has no node scores 0 and stays in the result.
    pub fn rank(&self, candidates: &PostingsList, doc_info: &DocInfo) -> PostingsList {
        let nodes: Vec<Option<NodeId>> = candidates.iter()
            .map(|p| doc_info.name(p.get_doc_id()).and_then(|name| self.node_of(file_name(name))))
            .collect();
        let roots: Vec<NodeId> = nodes.iter().flatten().copied().collect();
        let scores = self.iterate(&roots);
        let mut ranked = candidates.clone();
        for (posting, node) in ranked.iter_mut().zip(nodes) {
            posting.set_score(node.map_or(0.0, |n| scores.score(n)));
        }
        ranked
    }

    /// HITS with every titled node as root.
    pub fn rank_all(&self) -> HitsScores {
        let mut roots: Vec<NodeId> = self.id_to_title.keys().copied().collect();
        roots.sort_unstable();
        self.iterate(&roots)
    }
}
