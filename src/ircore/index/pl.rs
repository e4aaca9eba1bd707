use std::cmp::Ordering;
use std::fmt;
use crate::ircore::{DocId, TermOffset, IrError, Result};

type Positions = Vec<TermOffset>;

#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    doc_id: DocId,
    positions: Positions,
    // only meaningful for ranked queries
    score: f64,
}

impl Posting {
    pub fn new(doc_id: DocId) -> Self {
        Posting {
            doc_id,
            positions: vec![],
            score: 0.0,
        }
    }
    pub fn get_doc_id(&self) -> DocId {
        self.doc_id
    }
    pub fn get_positions(&self) -> &Positions {
        &self.positions
    }
    pub fn term_frequency(&self) -> usize {
        self.positions.len()
    }
    pub fn score(&self) -> f64 {
        self.score
    }
    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }
    pub fn add_score(&mut self, delta: f64) {
        self.score += delta;
    }
    fn add_position(&mut self, pos: TermOffset) {
        // duplicate offsets collapse
        if self.positions.last() != Some(&pos) {
            self.positions.push(pos);
        }
    }
}

/// Postings of one term (or of a query result), sorted by ascending doc id.
///
/// Every set operation takes `&self` and builds a fresh list, so a caller may
/// keep using its inputs after merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingsList {
    postings: Vec<Posting>,
}

impl PostingsList {
    pub fn new() -> Self {
        PostingsList { postings: vec![] }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Posting> {
        self.postings.get(i)
    }

    pub fn get_mut(&mut self, i: usize) -> Option<&mut Posting> {
        self.postings.get_mut(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Posting> {
        self.postings.iter_mut()
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.postings.iter().map(|p| p.doc_id).collect()
    }

    /// Appends an occurrence. Documents must arrive in ascending order;
    /// a repeated doc id extends the last posting.
    pub fn insert(&mut self, doc_id: DocId, pos: TermOffset) {
        if let Some(last) = self.postings.last_mut() {
            if last.doc_id == doc_id {
                last.add_position(pos);
                return;
            }
            debug_assert!(last.doc_id < doc_id);
        }
        let mut posting = Posting::new(doc_id);
        posting.add_position(pos);
        self.postings.push(posting);
    }

    /// Appends a position-less posting carrying only a score.
    pub fn insert_scored(&mut self, doc_id: DocId, score: f64) {
        let mut posting = Posting::new(doc_id);
        posting.score = score;
        self.postings.push(posting);
    }

    pub fn reset_scores(&mut self) {
        for posting in self.postings.iter_mut() {
            posting.score = 0.0;
        }
    }

    // Advances `j` over `other` until its doc id is no longer below `doc_id`.
    // The cursor never moves past the last element.
    fn seek(other: &[Posting], mut j: usize, doc_id: DocId) -> usize {
        while j + 1 < other.len() && other[j].doc_id < doc_id {
            j += 1;
        }
        j
    }

    pub fn intersect_with(&self, other: &PostingsList) -> PostingsList {
        let mut result = PostingsList::new();
        if other.is_empty() {
            return result;
        }
        let mut j = 0;
        for posting in &self.postings {
            j = Self::seek(&other.postings, j, posting.doc_id);
            if other.postings[j].doc_id == posting.doc_id {
                result.postings.push(posting.clone());
            }
        }
        result
    }

    /// Keeps the documents where some position `p` of `self` is followed by
    /// `p + offset` in `other`. Result postings hold the matching positions of `self`.
    pub fn phrase_with(&self, other: &PostingsList, offset: TermOffset) -> PostingsList {
        let mut result = PostingsList::new();
        if other.is_empty() {
            return result;
        }
        let mut j = 0;
        for posting in &self.postings {
            j = Self::seek(&other.postings, j, posting.doc_id);
            let candidate = &other.postings[j];
            if candidate.doc_id != posting.doc_id || candidate.positions.is_empty() {
                continue;
            }
            let mut matched = Posting::new(posting.doc_id);
            let other_pos = &candidate.positions;
            let mut k = 0;
            for &pos in &posting.positions {
                let wanted = pos + offset;
                while k + 1 < other_pos.len() && other_pos[k] < wanted {
                    k += 1;
                }
                if other_pos[k] == wanted {
                    matched.add_position(pos);
                }
            }
            if !matched.positions.is_empty() {
                result.postings.push(matched);
            }
        }
        result
    }

    pub fn union_with(&self, other: &PostingsList) -> PostingsList {
        let mut result = PostingsList {
            postings: Vec::with_capacity(self.len().max(other.len())),
        };
        let (mut i, mut j) = (0, 0);
        while i < self.postings.len() && j < other.postings.len() {
            let a = &self.postings[i];
            let b = &other.postings[j];
            match a.doc_id.cmp(&b.doc_id) {
                Ordering::Less => {
                    result.postings.push(a.clone());
                    i += 1;
                }
                Ordering::Greater => {
                    result.postings.push(b.clone());
                    j += 1;
                }
                Ordering::Equal => {
                    result.postings.push(Self::merge_postings(a, b));
                    i += 1;
                    j += 1;
                }
            }
        }
        result.postings.extend_from_slice(&self.postings[i..]);
        result.postings.extend_from_slice(&other.postings[j..]);
        result
    }

    fn merge_postings(a: &Posting, b: &Posting) -> Posting {
        let mut merged = Posting::new(a.doc_id);
        let (mut i, mut j) = (0, 0);
        while i < a.positions.len() || j < b.positions.len() {
            let next = match (a.positions.get(i), b.positions.get(j)) {
                (Some(&x), Some(&y)) if x <= y => {
                    i += 1;
                    if x == y {
                        j += 1;
                    }
                    x
                }
                (Some(_), Some(&y)) => {
                    j += 1;
                    y
                }
                (Some(&x), None) => {
                    i += 1;
                    x
                }
                (None, Some(&y)) => {
                    j += 1;
                    y
                }
                (None, None) => break,
            };
            merged.add_position(next);
        }
        merged.score = a.score + b.score;
        merged
    }

    /// Reorders by descending score (ties by doc id). The doc id order the
    /// merge operations rely on is lost; only use this on final results.
    pub fn sort_by_score(&mut self) {
        self.postings.sort_by(|a, b| {
            b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id))
        });
    }

    /// Parses a postings body: `<docID>:<pos1>,<pos2>,...;` repeated.
    pub fn decode(body: &str) -> Result<PostingsList> {
        let mut list = PostingsList::new();
        for entry in body.split(';').filter(|s| !s.is_empty()) {
            let (doc_str, pos_str) = entry.split_once(':')
                .ok_or_else(|| IrError::CorruptIndex(format!("posting without ':' in '{}'", entry)))?;
            let doc_id: DocId = doc_str.parse()
                .map_err(|_| IrError::CorruptIndex(format!("bad doc id '{}'", doc_str)))?;
            if list.postings.last().map_or(false, |p| p.doc_id >= doc_id) {
                return Err(IrError::CorruptIndex(format!("doc id {} out of order", doc_id)));
            }
            let mut posting = Posting::new(doc_id);
            for pos in pos_str.split(',').filter(|s| !s.is_empty()) {
                let pos: TermOffset = pos.parse()
                    .map_err(|_| IrError::CorruptIndex(format!("bad position '{}'", pos)))?;
                posting.add_position(pos);
            }
            list.postings.push(posting);
        }
        Ok(list)
    }
}

impl fmt::Display for PostingsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for posting in &self.postings {
            write!(f, "{}:", posting.doc_id)?;
            for (i, pos) in posting.positions.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", pos)?;
            }
            write!(f, ";")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a PostingsList {
    type Item = &'a Posting;
    type IntoIter = std::slice::Iter<'a, Posting>;
    fn into_iter(self) -> Self::IntoIter {
        self.postings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn list(entries: &[(DocId, &[TermOffset])]) -> PostingsList {
        let mut pl = PostingsList::new();
        for (doc, positions) in entries {
            for pos in positions.iter() {
                pl.insert(*doc, *pos);
            }
        }
        pl
    }

    fn doc_set(pl: &PostingsList) -> HashSet<DocId> {
        pl.doc_ids().into_iter().collect()
    }

    #[test]
    fn test_insert_collapses_same_doc() {
        let mut pl = PostingsList::new();
        pl.insert(1, 0);
        pl.insert(1, 4);
        pl.insert(1, 4);
        pl.insert(3, 2);
        assert_eq!(pl.len(), 2);
        assert_eq!(pl.get(0).unwrap().get_positions(), &vec![0, 4]);
        assert_eq!(pl.get(0).unwrap().term_frequency(), 2);
        assert_eq!(pl.get(1).unwrap().get_doc_id(), 3);
    }

    #[test]
    fn test_intersect() {
        let a = list(&[(1, &[0]), (2, &[1]), (5, &[3]), (9, &[0])]);
        let b = list(&[(2, &[4]), (3, &[1]), (9, &[2])]);
        let c = list(&[(0, &[0]), (9, &[7]), (10, &[1])]);
        assert_eq!(a.intersect_with(&b).doc_ids(), vec![2, 9]);
        // commutative on membership
        assert_eq!(doc_set(&a.intersect_with(&b)), doc_set(&b.intersect_with(&a)));
        // associative when chained
        let left = a.intersect_with(&b).intersect_with(&c);
        let right = a.intersect_with(&b.intersect_with(&c));
        assert_eq!(doc_set(&left), doc_set(&right));
        assert_eq!(left.doc_ids(), vec![9]);
        // inputs untouched
        assert_eq!(a.len(), 4);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_intersect_clamps_short_lists() {
        let a = list(&[(1, &[0]), (4, &[0]), (8, &[0])]);
        let b = list(&[(4, &[1])]);
        assert_eq!(a.intersect_with(&b).doc_ids(), vec![4]);
        assert_eq!(a.intersect_with(&PostingsList::new()).len(), 0);
        assert_eq!(PostingsList::new().intersect_with(&a).len(), 0);
    }

    #[test]
    fn test_phrase() {
        // doc 1: "a b a b", doc 2: "b a", doc 3: "a x b"
        let a = list(&[(1, &[0, 2]), (2, &[1]), (3, &[0])]);
        let b = list(&[(1, &[1, 3]), (2, &[0]), (3, &[2])]);
        let ab = a.phrase_with(&b, 1);
        assert_eq!(ab.doc_ids(), vec![1]);
        assert_eq!(ab.get(0).unwrap().get_positions(), &vec![0, 2]);
        let a_x_b = a.phrase_with(&b, 2);
        assert_eq!(a_x_b.doc_ids(), vec![3]);
        let ba = b.phrase_with(&a, 1);
        assert_eq!(ba.doc_ids(), vec![1, 2]);
    }

    #[test]
    fn test_phrase_matches_definition() {
        let a = list(&[(0, &[1, 5, 9]), (2, &[3]), (4, &[0, 2])]);
        let b = list(&[(0, &[2, 7]), (2, &[4, 8]), (3, &[1]), (4, &[5])]);
        for k in 0..6 {
            let res = a.phrase_with(&b, k);
            for pa in &a {
                let expected = b.iter()
                    .find(|pb| pb.get_doc_id() == pa.get_doc_id())
                    .map_or(false, |pb| pa.get_positions().iter()
                        .any(|p| pb.get_positions().contains(&(p + k))));
                assert_eq!(res.doc_ids().contains(&pa.get_doc_id()), expected, "offset {}", k);
            }
        }
    }

    #[test]
    fn test_union() {
        let a = list(&[(1, &[0, 6]), (4, &[2])]);
        let b = list(&[(1, &[3]), (2, &[0]), (7, &[1])]);
        let u = a.union_with(&b);
        assert_eq!(u.doc_ids(), vec![1, 2, 4, 7]);
        assert_eq!(u.get(0).unwrap().get_positions(), &vec![0, 3, 6]);
        assert!(u.len() >= a.len().max(b.len()));
        assert!(u.len() <= a.len() + b.len());
        let with_empty = a.union_with(&PostingsList::new());
        assert_eq!(with_empty, a);
    }

    #[test]
    fn test_sort_by_score() {
        let mut pl = PostingsList::new();
        pl.insert_scored(1, 0.5);
        pl.insert_scored(2, 2.0);
        pl.insert_scored(3, 0.5);
        pl.insert_scored(4, 1.0);
        pl.sort_by_score();
        assert_eq!(pl.doc_ids(), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_encode_decode() {
        let pl = list(&[(0, &[1, 5]), (12, &[0]), (13, &[2, 3, 40])]);
        let body = pl.to_string();
        assert_eq!(body, "0:1,5;12:0;13:2,3,40;");
        assert_eq!(PostingsList::decode(&body).unwrap(), pl);
        assert_eq!(PostingsList::decode("").unwrap().len(), 0);
        assert!(PostingsList::decode("3;").is_err());
        assert!(PostingsList::decode("x:1;").is_err());
        assert!(PostingsList::decode("5:1;2:1;").is_err());
    }
}
