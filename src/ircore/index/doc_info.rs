use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use crate::ircore::{DocId, IrError, Result};

pub const DOCINFO_FNAME: &str = "docInfo";
pub const EUCLIDEAN_FNAME: &str = "euclideanLengths";

#[derive(Debug, Clone, PartialEq)]
pub struct DocMeta {
    pub name: String,
    pub token_count: u32,
    // squared length of the term-frequency vector
    pub euclidean_length_sq: f64,
}

/// Per-document metadata, read-only once the index is frozen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocInfo {
    docs: BTreeMap<DocId, DocMeta>,
}

impl DocInfo {
    pub fn new() -> Self {
        DocInfo { docs: BTreeMap::new() }
    }

    pub fn insert(&mut self, doc_id: DocId, name: &str, token_count: u32) {
        self.docs.insert(doc_id, DocMeta {
            name: name.to_string(),
            token_count,
            euclidean_length_sq: 0.0,
        });
    }

    pub fn set_euclidean_length_sq(&mut self, doc_id: DocId, length_sq: f64) {
        if let Some(meta) = self.docs.get_mut(&doc_id) {
            meta.euclidean_length_sq = length_sq;
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(&doc_id)
    }

    pub fn name(&self, doc_id: DocId) -> Option<&str> {
        self.docs.get(&doc_id).map(|m| m.name.as_str())
    }

    pub fn token_count(&self, doc_id: DocId) -> u32 {
        self.docs.get(&doc_id).map_or(0, |m| m.token_count)
    }

    pub fn euclidean_length(&self, doc_id: DocId) -> f64 {
        self.docs.get(&doc_id).map_or(0.0, |m| m.euclidean_length_sq.sqrt())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocId, &DocMeta)> {
        self.docs.iter()
    }

    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let mut info = BufWriter::new(File::create(dir.join(DOCINFO_FNAME))?);
        let mut lengths = BufWriter::new(File::create(dir.join(EUCLIDEAN_FNAME))?);
        for (doc_id, meta) in &self.docs {
            writeln!(info, "{};{};{}", doc_id, meta.name, meta.token_count)?;
            writeln!(lengths, "{};{}", doc_id, meta.euclidean_length_sq)?;
        }
        info.flush()?;
        lengths.flush()?;
        Ok(())
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut doc_info = DocInfo::new();
        let reader = BufReader::new(File::open(dir.join(DOCINFO_FNAME))?);
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            // the name sits between the first and the last ';'
            let malformed = || IrError::malformed(DOCINFO_FNAME, n + 1, format!("'{}'", line));
            let (id_str, rest) = line.split_once(';').ok_or_else(malformed)?;
            let (name, count_str) = rest.rsplit_once(';').ok_or_else(malformed)?;
            let doc_id: DocId = id_str.parse().map_err(|_| malformed())?;
            let token_count: u32 = count_str.parse().map_err(|_| malformed())?;
            doc_info.insert(doc_id, name, token_count);
        }

        let lengths_path = dir.join(EUCLIDEAN_FNAME);
        if !lengths_path.is_file() {
            log::warn!("{} missing, euclidean normalization disabled", lengths_path.display());
            return Ok(doc_info);
        }
        let reader = BufReader::new(File::open(lengths_path)?);
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let malformed = || IrError::malformed(EUCLIDEAN_FNAME, n + 1, format!("'{}'", line));
            let (id_str, len_str) = line.split_once(';').ok_or_else(malformed)?;
            let doc_id: DocId = id_str.parse().map_err(|_| malformed())?;
            let length_sq: f64 = len_str.parse().map_err(|_| malformed())?;
            doc_info.set_euclidean_length_sq(doc_id, length_sq);
        }
        Ok(doc_info)
    }
}
