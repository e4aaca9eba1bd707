use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::ircore::dictionary::{home_slot, DictEntry, Dictionary};
use crate::ircore::utils::file_io::{read_at, read_exact_at};
use crate::ircore::{IrError, Result};
use super::doc_info::DocInfo;
use super::pl::PostingsList;
use super::{Index, DATA_FNAME, DICTIONARY_FNAME};

// bytes fetched per read while scanning for the term separator
const TOKEN_CHUNK: usize = 64;

/// Frozen inverted index: an open-addressed hash table on disk pointing into
/// a data file of `"<term> <postings>"` records. Lookups use positioned reads,
/// so one instance can be shared between threads.
#[derive(Debug)]
pub struct PersistentHashedIndex {
    dir: PathBuf,
    dictionary: Dictionary,
    data: File,
    doc_info: Arc<DocInfo>,
}

impl PersistentHashedIndex {
    pub fn open(dir: &Path) -> Result<Self> {
        let dictionary = Dictionary::open(&dir.join(DICTIONARY_FNAME))?;
        let data = File::open(dir.join(DATA_FNAME))?;
        let doc_info = DocInfo::load_from(dir)?;
        log::debug!("opened index {} ({} slots, {} documents)",
            dir.display(), dictionary.table_size(), doc_info.len());
        Ok(PersistentHashedIndex {
            dir: dir.to_path_buf(),
            dictionary,
            data,
            doc_info: Arc::new(doc_info),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_size(&self) -> u64 {
        self.dictionary.table_size()
    }

    /// Reads the term at the start of a record, up to its separating space.
    fn read_token(&self, entry: &DictEntry) -> Result<Vec<u8>> {
        let record_len = entry.size as usize;
        let mut token = Vec::new();
        let mut chunk = [0u8; TOKEN_CHUNK];
        while token.len() < record_len {
            let want = TOKEN_CHUNK.min(record_len - token.len());
            let offset = entry.pos as u64 + token.len() as u64;
            let got = read_at(&self.data, &mut chunk[..want], offset)?;
            if got == 0 {
                break;
            }
            if let Some(space) = chunk[..got].iter().position(|b| *b == b' ') {
                token.extend_from_slice(&chunk[..space]);
                return Ok(token);
            }
            token.extend_from_slice(&chunk[..got]);
        }
        Err(IrError::CorruptIndex(format!(
            "record at {} (length {}) has no term separator", entry.pos, entry.size)))
    }

    fn read_body(&self, entry: &DictEntry, token_len: usize) -> Result<String> {
        let body_len = (entry.size as usize).checked_sub(token_len + 1)
            .ok_or_else(|| IrError::CorruptIndex(format!("record at {} is too short", entry.pos)))?;
        let mut body = vec![0u8; body_len];
        read_exact_at(&self.data, &mut body, entry.pos as u64 + token_len as u64 + 1)
            .map_err(|e| IrError::CorruptIndex(format!("record at {}: {}", entry.pos, e)))?;
        String::from_utf8(body)
            .map_err(|_| IrError::CorruptIndex(format!("record at {} is not UTF-8", entry.pos)))
    }

    /// Walks from the term's home slot to its entry; `None` on a miss.
    fn find_entry(&self, term: &str) -> Result<Option<DictEntry>> {
        let table_size = self.dictionary.table_size();
        let mut slot = home_slot(term, table_size);
        for _ in 0..table_size {
            let entry = self.dictionary.read_entry(slot)?;
            if entry.is_empty() {
                return Ok(None);
            }
            if entry.pos < 0 || entry.size < 0 {
                return Err(IrError::CorruptIndex(format!("negative entry in slot {}", slot)));
            }
            if self.read_token(&entry)? == term.as_bytes() {
                return Ok(Some(entry));
            }
            slot = (slot + 1) % table_size;
        }
        Ok(None)
    }
}

impl Index for PersistentHashedIndex {
    fn get_postings(&self, term: &str) -> Result<PostingsList> {
        match self.find_entry(term)? {
            Some(entry) => {
                let body = self.read_body(&entry, term.len())?;
                PostingsList::decode(&body)
            }
            None => Ok(PostingsList::new()),
        }
    }

    fn doc_info(&self) -> &Arc<DocInfo> {
        &self.doc_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ircore::dictionary::DICT_ENTRY_SIZE;
    use crate::ircore::index::IndexBuilder;
    use crate::ircore::TermOffset;

    fn build(docs: &[&str], dir: &Path, table_size: u64) -> PersistentHashedIndex {
        let mut builder = IndexBuilder::new();
        for (doc_id, text) in docs.iter().enumerate() {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            for (offset, token) in tokens.iter().enumerate() {
                builder.insert(token, doc_id as u32, offset as TermOffset);
            }
            builder.add_document(doc_id as u32, &format!("doc{}.txt", doc_id), tokens.len() as u32);
        }
        builder.freeze(dir, table_size).unwrap()
    }

    #[test]
    fn test_round_trip_after_freeze() {
        let dir = tempfile::tempdir().unwrap();
        let docs = ["the cat sat on the mat", "the dog sat", "über cat cat"];
        let mut builder = IndexBuilder::new();
        for (doc_id, text) in docs.iter().enumerate() {
            for (offset, token) in text.split_whitespace().enumerate() {
                builder.insert(token, doc_id as u32, offset as TermOffset);
            }
        }
        let expected: Vec<(String, PostingsList)> = builder.terms()
            .map(|t| (t.to_string(), builder.get_postings(t).unwrap()))
            .collect();
        let index = builder.freeze(dir.path(), 101).unwrap();
        for (term, postings) in expected {
            assert_eq!(index.get_postings(&term).unwrap(), postings, "term {}", term);
        }
        assert_eq!(index.get_postings("the").unwrap().doc_ids(), vec![0, 1]);
        assert!(index.get_postings("bird").unwrap().is_empty());
        assert!(index.get_postings("").unwrap().is_empty());
    }

    #[test]
    fn test_collisions_in_tiny_table() {
        let dir = tempfile::tempdir().unwrap();
        let words: Vec<String> = (0..12).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");
        // 12 terms in 13 slots forces long collision chains
        let index = build(&[&text], dir.path(), 13);
        assert_eq!(index.table_size(), 13);
        for (offset, word) in words.iter().enumerate() {
            let postings = index.get_postings(word).unwrap();
            assert_eq!(postings.len(), 1, "word {}", word);
            assert_eq!(postings.get(0).unwrap().get_positions(), &vec![offset as u32]);
        }
        assert!(index.get_postings("w99").unwrap().is_empty());
    }

    #[test]
    fn test_reopen_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        drop(build(&["the cat sat", "the cat ran"], dir.path(), 31));
        let index = PersistentHashedIndex::open(dir.path()).unwrap();
        assert_eq!(index.doc_info().len(), 2);
        assert_eq!(index.doc_info().name(1), Some("doc1.txt"));
        assert_eq!(index.doc_info().token_count(0), 3);
        assert_eq!(index.doc_info().euclidean_length(0), 3f64.sqrt());
        assert_eq!(index.document_frequency("cat").unwrap(), 2);
        let size = std::fs::metadata(dir.path().join(DICTIONARY_FNAME)).unwrap().len();
        assert_eq!(size, 31 * DICT_ENTRY_SIZE);
    }

    #[test]
    fn test_open_missing_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PersistentHashedIndex::open(dir.path()).is_err());
    }

    #[test]
    fn test_truncated_data_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        drop(build(&["alpha beta gamma"], dir.path(), 17));
        std::fs::write(dir.path().join(DATA_FNAME), b"alpha 0:0;").unwrap();
        let index = PersistentHashedIndex::open(dir.path()).unwrap();
        let results: Vec<Result<PostingsList>> = ["alpha", "beta", "gamma"].iter()
            .map(|t| index.get_postings(t))
            .collect();
        assert!(results.iter().any(|r| matches!(r, Err(IrError::CorruptIndex(_)))));
    }

    #[test]
    fn test_concurrent_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let index = build(&["a b c d", "b c d e", "c d e f"], dir.path(), 53);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..50 {
                        assert_eq!(index.get_postings("c").unwrap().doc_ids(), vec![0, 1, 2]);
                        assert_eq!(index.get_postings("f").unwrap().doc_ids(), vec![2]);
                    }
                });
            }
        });
    }
}
