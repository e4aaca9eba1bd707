use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use regex::Regex;
use serde::{Serialize, Deserialize};
use crate::ircore::utils::serialize::{read_file, write_file};
use crate::ircore::Result;

pub const KGRAM_FNAME: &str = "kgram.bin";
pub const WILDCARD: char = '*';
const BOUNDARY: char = '$';

/// What the search and spelling layers need from a k-gram index.
pub trait KGramLookup: Send + Sync {
    /// The `$`-padded k-grams of `term`.
    fn kgrams(&self, term: &str) -> HashSet<String>;
    /// Vocabulary terms sharing at least one k-gram with `term`.
    fn words_sharing_kgram(&self, term: &str) -> HashSet<String>;
    /// Vocabulary terms matching a `*` wildcard pattern, sorted.
    fn expand_wildcard(&self, pattern: &str) -> Result<Vec<String>>;
}

pub fn is_wildcard(term: &str) -> bool {
    term.contains(WILDCARD)
}

/// K-gram index over a fixed vocabulary.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KGramIndex {
    k: usize,
    grams: HashMap<String, BTreeSet<String>>,
    vocabulary: BTreeSet<String>,
}

impl KGramIndex {
    pub fn new(k: usize) -> Self {
        KGramIndex {
            k: k.max(1),
            grams: HashMap::new(),
            vocabulary: BTreeSet::new(),
        }
    }

    pub fn from_terms<'a>(k: usize, terms: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = KGramIndex::new(k);
        for term in terms {
            index.insert(term);
        }
        index
    }

    pub fn insert(&mut self, term: &str) {
        if !self.vocabulary.insert(term.to_string()) {
            return;
        }
        for gram in self.kgrams(term) {
            self.grams.entry(gram).or_default().insert(term.to_string());
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn term_count(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        write_file(&dir.join(KGRAM_FNAME), self)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        read_file(&dir.join(KGRAM_FNAME))
    }

    fn grams_of_padded(&self, padded: &[char]) -> impl Iterator<Item = String> + '_ {
        let k = self.k;
        let windows: Vec<String> = if padded.len() < k {
            vec![padded.iter().collect()]
        } else {
            padded.windows(k).map(|w| w.iter().collect()).collect()
        };
        windows.into_iter()
    }

    fn wildcard_regex(pattern: &str) -> Result<Regex> {
        let parts: Vec<String> = pattern.split(WILDCARD).map(regex::escape).collect();
        Ok(Regex::new(&format!("^{}$", parts.join(".*")))?)
    }
}

impl KGramLookup for KGramIndex {
    fn kgrams(&self, term: &str) -> HashSet<String> {
        let padded: Vec<char> = std::iter::once(BOUNDARY)
            .chain(term.chars())
            .chain(std::iter::once(BOUNDARY))
            .collect();
        self.grams_of_padded(&padded).collect()
    }

    fn words_sharing_kgram(&self, term: &str) -> HashSet<String> {
        let mut words = HashSet::new();
        for gram in self.kgrams(term) {
            if let Some(terms) = self.grams.get(&gram) {
                words.extend(terms.iter().cloned());
            }
        }
        words
    }

    fn expand_wildcard(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = Self::wildcard_regex(pattern)?;
        // only grams lying fully inside a literal segment narrow the search
        let padded = format!("{}{}{}", BOUNDARY, pattern, BOUNDARY);
        let mut candidates: Option<BTreeSet<String>> = None;
        for segment in padded.split(WILDCARD) {
            let chars: Vec<char> = segment.chars().collect();
            if chars.len() < self.k {
                continue;
            }
            for window in chars.windows(self.k) {
                let gram: String = window.iter().collect();
                let terms = self.grams.get(&gram).cloned().unwrap_or_default();
                candidates = Some(match candidates {
                    Some(current) => current.intersection(&terms).cloned().collect(),
                    None => terms,
                });
            }
        }
        let pool = candidates.unwrap_or_else(|| self.vocabulary.clone());
        Ok(pool.into_iter().filter(|t| matcher.is_match(t)).collect())
    }
}
