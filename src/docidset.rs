//! A compact sorted-unique set of [`DocId`]s.
//!
//! Lives purely in memory and needs efficient insert/delete against a live
//! index, so it's a plain sorted `Vec<DocId>` with merge-walk set
//! operations rather than a compressed on-disk encoding.

use crate::DocId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocIdSet {
    ids: Vec<DocId>,
}

impl DocIdSet {
    pub fn empty() -> Self {
        Self { ids: Vec::new() }
    }

    pub fn singleton(d: DocId) -> Self {
        Self { ids: vec![d] }
    }

    pub fn from_sorted_unique(ids: Vec<DocId>) -> Self {
        let out = Self { ids };
        debug_assert!(out.invariant());
        out
    }

    pub fn null(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn member(&self, d: DocId) -> bool {
        self.ids.binary_search(&d).is_ok()
    }

    pub fn to_list(&self) -> &[DocId] {
        &self.ids
    }

    pub fn insert(&mut self, d: DocId) {
        match self.ids.binary_search(&d) {
            Ok(_) => {}
            Err(pos) => self.ids.insert(pos, d),
        }
        debug_assert!(self.invariant());
    }

    pub fn delete(&mut self, d: DocId) {
        if let Ok(pos) = self.ids.binary_search(&d) {
            self.ids.remove(pos);
        }
        debug_assert!(self.invariant());
    }

    /// Sorted-unique, within `[0, limit)` if a limit is given. Used by the
    /// debug-mode `SearchIndex` consistency checker.
    pub fn invariant(&self) -> bool {
        self.ids.windows(2).all(|w| w[0] < w[1])
    }

    pub fn union(&self, other: &DocIdSet) -> DocIdSet {
        let mut out = Vec::with_capacity(self.ids.len() + other.ids.len());
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                std::cmp::Ordering::Less => {
                    out.push(self.ids[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    out.push(other.ids[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    out.push(self.ids[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&self.ids[i..]);
        out.extend_from_slice(&other.ids[j..]);
        DocIdSet { ids: out }
    }

    pub fn intersection(&self, other: &DocIdSet) -> DocIdSet {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push(self.ids[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        DocIdSet { ids: out }
    }

    /// Elements of `self` not present in `other`.
    pub fn difference(&self, other: &DocIdSet) -> DocIdSet {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                std::cmp::Ordering::Less => {
                    out.push(self.ids[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&self.ids[i..]);
        DocIdSet { ids: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u32]) -> DocIdSet {
        DocIdSet::from_sorted_unique(ids.iter().map(|&x| DocId(x)).collect())
    }

    #[test]
    fn insert_keeps_sorted_unique() {
        let mut s = DocIdSet::empty();
        s.insert(DocId(3));
        s.insert(DocId(1));
        s.insert(DocId(2));
        s.insert(DocId(1));
        assert_eq!(s.to_list(), &[DocId(1), DocId(2), DocId(3)]);
        assert!(s.invariant());
    }

    #[test]
    fn delete_no_op_when_absent() {
        let mut s = set(&[1, 2, 3]);
        s.delete(DocId(5));
        assert_eq!(s.size(), 3);
        s.delete(DocId(2));
        assert_eq!(s.to_list(), &[DocId(1), DocId(3)]);
    }

    #[test]
    fn union_merges() {
        let a = set(&[1, 3, 5]);
        let b = set(&[2, 3, 6]);
        assert_eq!(a.union(&b).to_list(), &[1, 2, 3, 5, 6].map(DocId));
    }

    #[test]
    fn intersection_keeps_shared() {
        let a = set(&[1, 3, 5]);
        let b = set(&[2, 3, 6, 5]);
        assert_eq!(a.intersection(&b).to_list(), &[3, 5].map(DocId));
    }

    #[test]
    fn difference_removes_shared() {
        let a = set(&[1, 2, 3, 4]);
        let b = set(&[2, 4]);
        assert_eq!(a.difference(&b).to_list(), &[1, 3].map(DocId));
    }

    #[test]
    fn member_and_null() {
        let s = set(&[2, 4, 6]);
        assert!(s.member(DocId(4)));
        assert!(!s.member(DocId(5)));
        assert!(!s.null());
        assert!(DocIdSet::empty().null());
    }
}
