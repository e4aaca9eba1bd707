use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use crate::ircore::dictionary::{home_slot, DictEntry, DictionaryWriter};
use crate::ircore::{DocId, TermOffset, IrError, Result};
use super::doc_info::DocInfo;
use super::pl::PostingsList;
use super::{Index, PersistentHashedIndex, DATA_FNAME, DICTIONARY_FNAME};

/// Accumulates postings in memory during the single build pass.
/// `freeze` turns it into a [`PersistentHashedIndex`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: HashMap<String, PostingsList>,
    doc_info: Arc<DocInfo>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        IndexBuilder {
            index: HashMap::new(),
            doc_info: Arc::new(DocInfo::new()),
        }
    }

    pub fn insert(&mut self, term: &str, doc_id: DocId, offset: TermOffset) {
        match self.index.get_mut(term) {
            Some(postings) => postings.insert(doc_id, offset),
            None => {
                let mut postings = PostingsList::new();
                postings.insert(doc_id, offset);
                self.index.insert(term.to_string(), postings);
            }
        }
    }

    pub fn add_document(&mut self, doc_id: DocId, name: &str, token_count: u32) {
        Arc::make_mut(&mut self.doc_info).insert(doc_id, name, token_count);
    }

    pub fn term_count(&self) -> usize {
        self.index.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|t| t.as_str())
    }

    fn compute_euclidean_lengths(&mut self) {
        let mut lengths: HashMap<DocId, f64> = HashMap::new();
        for postings in self.index.values() {
            for posting in postings {
                let tf = posting.term_frequency() as f64;
                *lengths.entry(posting.get_doc_id()).or_insert(0.0) += tf * tf;
            }
        }
        let doc_info = Arc::make_mut(&mut self.doc_info);
        for (doc_id, length_sq) in lengths {
            doc_info.set_euclidean_length_sq(doc_id, length_sq);
        }
    }

    /// Writes dictionary, data and document metadata under `dir` and reopens
    /// them as a read-only index. The builder is consumed.
    pub fn freeze(mut self, dir: &Path, table_size: u64) -> Result<PersistentHashedIndex> {
        if self.index.len() as u64 >= table_size {
            return Err(IrError::TableFull(table_size));
        }
        // a record is "<term> <postings>", the term ends at the first space
        if let Some(term) = self.index.keys().find(|t| t.contains(char::is_whitespace)) {
            return Err(IrError::InvalidTerm(term.clone()));
        }
        log::info!("{} unique words", self.index.len());
        fs::create_dir_all(dir)?;
        self.compute_euclidean_lengths();
        self.doc_info.write_to(dir)?;

        // write in sorted term order so that equal inputs give identical files
        let mut terms: Vec<&String> = self.index.keys().collect();
        terms.sort();

        let mut slots: Vec<Option<&str>> = vec![None; table_size as usize];
        let mut dictionary = DictionaryWriter::create(&dir.join(DICTIONARY_FNAME), table_size)?;
        let mut data = BufWriter::new(File::create(dir.join(DATA_FNAME))?);
        let mut free: u64 = 0;
        let mut collisions: u64 = 0;
        for term in terms {
            let mut slot = home_slot(term, table_size);
            while slots[slot as usize].is_some() {
                collisions += 1;
                slot = (slot + 1) % table_size;
            }
            slots[slot as usize] = Some(term.as_str());

            let record = format!("{} {}", term, self.index[term]);
            let size = i32::try_from(record.len())
                .map_err(|_| IrError::CorruptIndex(format!("record for '{}' exceeds 2 GiB", term)))?;
            data.write_all(record.as_bytes())?;
            dictionary.write_entry(slot, &DictEntry::new(free as i64, size))?;
            free += record.len() as u64;
        }
        data.flush()?;
        dictionary.finish()?;
        log::info!("{} collisions, {} bytes of postings", collisions, free);

        PersistentHashedIndex::open(dir)
    }
}

impl Index for IndexBuilder {
    fn get_postings(&self, term: &str) -> Result<PostingsList> {
        Ok(self.index.get(term).cloned().unwrap_or_default())
    }

    fn doc_info(&self) -> &Arc<DocInfo> {
        &self.doc_info
    }
}
