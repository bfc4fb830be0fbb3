//! The inverted index: a bidirectional mapping between documents and terms,
//! with insert/update/delete and prefix lookup.
//!
//! Needs live update/delete against a fixed schema, so the vocabulary is one
//! `BTreeMap<Term, TermId>` for ordered/prefix lookup, plus a dense
//! `Vec` indexed by `TermId` owning the single copy of each term's
//! `DocIdSet` and its string (for mapping a `TermId` back to its `Term`
//! during an update's old/new term diff) — a single source of truth rather
//! than two separately-mirrored maps.

use crate::doc::{DocFeatVals, DocTermIds};
use crate::docidset::DocIdSet;
use crate::schema::EnumerableKey;
use crate::{DocId, Error, TermId};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

struct TermEntry {
    term: String,
    docs: DocIdSet,
}

struct DocInfo<K, F: EnumerableKey, P: EnumerableKey> {
    key: K,
    terms: DocTermIds<F>,
    feats: DocFeatVals<P>,
}

/// `K` is the caller's `DocKey` type: totally ordered and unique within
/// the index.
pub struct SearchIndex<K: Ord + Clone, F: EnumerableKey, P: EnumerableKey> {
    term_map: BTreeMap<String, TermId>,
    term_postings: Vec<Option<TermEntry>>,
    doc_info: Vec<Option<DocInfo<K, F, P>>>,
    doc_key_map: BTreeMap<K, DocId>,
    next_term_id: u32,
    next_doc_id: u32,
    num_docs: usize,
    num_terms: usize,
}

impl<K: Ord + Clone, F: EnumerableKey, P: EnumerableKey> Default for SearchIndex<K, F, P> {
    fn default() -> Self {
        Self::empty_index()
    }
}

impl<K: Ord + Clone, F: EnumerableKey, P: EnumerableKey> SearchIndex<K, F, P> {
    pub fn empty_index() -> Self {
        Self {
            term_map: BTreeMap::new(),
            term_postings: Vec::new(),
            doc_info: Vec::new(),
            doc_key_map: BTreeMap::new(),
            next_term_id: 0,
            next_doc_id: 0,
            num_docs: 0,
            num_terms: 0,
        }
    }

    pub fn doc_count(&self) -> usize {
        self.num_docs
    }

    pub fn term_count(&self) -> usize {
        self.num_terms
    }

    pub fn lookup_term(&self, term: &str) -> Option<(TermId, &DocIdSet)> {
        let &id = self.term_map.get(term)?;
        let entry = self.term_postings[id.index()].as_ref()?;
        Some((id, &entry.docs))
    }

    /// Every `(TermId, DocIdSet)` whose term starts with `prefix`, in
    /// lexicographic term order. Empty when `prefix` is empty.
    pub fn lookup_terms_by_prefix(&self, prefix: &str) -> Vec<(TermId, &DocIdSet)> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let start = Bound::Included(prefix.to_string());
        let end = match exclusive_upper_bound(prefix) {
            Some(upper) => Bound::Excluded(upper),
            None => Bound::Unbounded,
        };
        self.term_map
            .range::<String, _>((start, end))
            .map(|(_, &id)| {
                let entry = self.term_postings[id.index()]
                    .as_ref()
                    .expect("term_map entry without a live posting list");
                (id, &entry.docs)
            })
            .collect()
    }

    /// Contract-total: `i` must be a `TermId` currently present in the
    /// index (e.g. one just read from [`Self::lookup_term`]). A missing
    /// entry indicates a broken invariant.
    pub fn lookup_term_id(&self, i: TermId) -> &DocIdSet {
        &self.term_postings[i.index()]
            .as_ref()
            .expect("lookup_term_id: dangling TermId")
            .docs
    }

    /// Contract-total: `d` must be a `DocId` currently present in the index.
    pub fn lookup_doc_id(&self, d: DocId) -> (&K, &DocTermIds<F>, &DocFeatVals<P>) {
        let info = self.doc_info[d.index()]
            .as_ref()
            .expect("lookup_doc_id: dangling DocId");
        (&info.key, &info.terms, &info.feats)
    }

    pub fn lookup_doc_key(&self, k: &K) -> Option<&DocTermIds<F>> {
        let &d = self.doc_key_map.get(k)?;
        self.doc_info[d.index()].as_ref().map(|info| &info.terms)
    }

    pub fn get_doc_id(&self, k: &K) -> Option<DocId> {
        self.doc_key_map.get(k).copied()
    }

    pub fn get_term(&self, i: TermId) -> Option<&str> {
        self.term_postings
            .get(i.index())
            .and_then(|e| e.as_ref())
            .map(|e| e.term.as_str())
    }

    pub fn get_term_id(&self, t: &str) -> Option<TermId> {
        self.term_map.get(t).copied()
    }

    pub fn get_doc_key(&self, d: DocId) -> Option<&K> {
        self.doc_info.get(d.index()).and_then(|e| e.as_ref()).map(|info| &info.key)
    }

    /// All live documents, for corpus-statistics recomputation (the engine
    /// facade's `Context` rebuild).
    pub fn iter_docs(&self) -> impl Iterator<Item = (DocId, &K, &DocTermIds<F>, &DocFeatVals<P>)> {
        self.doc_info.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|info| (DocId(idx as u32), &info.key, &info.terms, &info.feats))
        })
    }

    fn term_for_id(&self, i: TermId) -> &str {
        self.term_postings[i.index()]
            .as_ref()
            .expect("term_for_id: dangling TermId")
            .term
            .as_str()
    }

    fn alloc_doc_id(&mut self) -> DocId {
        let d = DocId(self.next_doc_id);
        self.next_doc_id += 1;
        if self.doc_info.len() <= d.index() {
            self.doc_info.resize_with(d.index() + 1, || None);
        }
        d
    }

    fn insert_term_to_doc_id_entry(&mut self, t: &str, d: DocId) {
        if let Some(&id) = self.term_map.get(t) {
            self.term_postings[id.index()]
                .as_mut()
                .expect("insert_term_to_doc_id_entry: dangling TermId")
                .docs
                .insert(d);
        } else {
            let id = TermId(self.next_term_id);
            self.next_term_id += 1;
            self.term_map.insert(t.to_string(), id);
            if self.term_postings.len() <= id.index() {
                self.term_postings.resize_with(id.index() + 1, || None);
            }
            self.term_postings[id.index()] = Some(TermEntry {
                term: t.to_string(),
                docs: DocIdSet::singleton(d),
            });
            self.num_terms += 1;
        }
    }

    fn delete_term_to_doc_id_entry(&mut self, t: &str, d: DocId) {
        let id = match self.term_map.get(t) {
            Some(&id) => id,
            None => return,
        };
        let became_empty = {
            let entry = self.term_postings[id.index()]
                .as_mut()
                .expect("delete_term_to_doc_id_entry: dangling TermId");
            entry.docs.delete(d);
            entry.docs.null()
        };
        if became_empty {
            self.term_map.remove(t);
            self.term_postings[id.index()] = None;
            self.num_terms -= 1;
        }
    }

    fn insert_term_to_doc_id_entries(&mut self, terms: &BTreeSet<String>, d: DocId) {
        for t in terms {
            self.insert_term_to_doc_id_entry(t, d);
        }
    }

    fn delete_term_to_doc_id_entries(&mut self, terms: &BTreeSet<String>, d: DocId) {
        for t in terms {
            self.delete_term_to_doc_id_entry(t, d);
        }
    }

    /// Inserts a new document or re-indexes an existing one under `key`.
    /// `doc_terms`/`doc_feats` are the total functions `Field → [Term]` /
    /// `Feature → Float`, represented here as closures invoked once per
    /// field/feature.
    pub fn insert_doc(
        &mut self,
        key: K,
        mut doc_terms: impl FnMut(F) -> Vec<String>,
        mut doc_feats: impl FnMut(P) -> f32,
    ) -> DocId {
        let existing = self.doc_key_map.get(&key).copied();
        let d = match existing {
            Some(d) => d,
            None => {
                let d = self.alloc_doc_id();
                self.doc_key_map.insert(key.clone(), d);
                d
            }
        };

        // Memoise docTerms over the field enumeration once (step 2).
        let per_field_terms: Vec<Vec<String>> = F::ALL.iter().map(|&f| doc_terms(f)).collect();
        let new_terms: BTreeSet<String> = per_field_terms
            .iter()
            .flat_map(|terms| terms.iter().cloned())
            .collect();

        if existing.is_some() {
            let old_terms: BTreeSet<String> = self.doc_info[d.index()]
                .as_ref()
                .expect("insert_doc: existing doc missing its DocInfo")
                .terms
                .distinct_term_ids()
                .into_iter()
                .map(|id| self.term_for_id(id).to_string())
                .collect();
            let add_terms: BTreeSet<String> = new_terms.difference(&old_terms).cloned().collect();
            let del_terms: BTreeSet<String> = old_terms.difference(&new_terms).cloned().collect();
            self.delete_term_to_doc_id_entries(&del_terms, d);
            self.insert_term_to_doc_id_entries(&add_terms, d);
        } else {
            self.insert_term_to_doc_id_entries(&new_terms, d);
            self.num_docs += 1;
        }

        // Step 6: terms are now guaranteed present in term_map.
        let mut field_iter = per_field_terms.into_iter();
        let terms = DocTermIds::<F>::create(|_f| {
            let raw = field_iter.next().expect("one Vec<String> per field");
            raw.into_iter()
                .map(|t| *self.term_map.get(&t).expect("term missing after insertion"))
                .collect()
        });
        let feats = DocFeatVals::<P>::create(|p| doc_feats(p));

        self.doc_info[d.index()] = Some(DocInfo { key, terms, feats });

        debug_assert!(self.check_invariants().is_ok(), "{:?}", self.check_invariants());
        d
    }

    /// The symmetric inverse of a new-doc `insert_doc`.
    pub fn delete_doc(&mut self, key: &K) -> bool {
        let d = match self.doc_key_map.remove(key) {
            Some(d) => d,
            None => return false,
        };
        let info = self.doc_info[d.index()]
            .take()
            .expect("delete_doc: docKeyMap pointed at a missing DocInfo");
        let old_terms: BTreeSet<String> = info
            .terms
            .distinct_term_ids()
            .into_iter()
            .map(|id| self.term_for_id(id).to_string())
            .collect();
        self.delete_term_to_doc_id_entries(&old_terms, d);
        self.num_docs -= 1;

        debug_assert!(self.check_invariants().is_ok(), "{:?}", self.check_invariants());
        true
    }

    /// Checks the index's internal consistency invariants in full. Intended
    /// for debug builds and tests, not called on every lookup.
    pub fn check_invariants(&self) -> Result<(), Error> {
        // 1. termMap[t] = (i, S) iff termIdMap[i] = (t, S).
        for (t, &id) in self.term_map.iter() {
            match self.term_postings.get(id.index()).and_then(|e| e.as_ref()) {
                Some(entry) if &entry.term == t => {}
                _ => {
                    return Err(Error::InvariantViolation(format!(
                        "term_map[{:?}] = {:?} has no matching term_postings entry",
                        t, id
                    )))
                }
            }
        }
        for (idx, slot) in self.term_postings.iter().enumerate() {
            if let Some(entry) = slot {
                if self.term_map.get(&entry.term) != Some(&TermId(idx as u32)) {
                    return Err(Error::InvariantViolation(format!(
                        "term_postings[{}] = {:?} not mirrored in term_map",
                        idx, entry.term
                    )));
                }
            }
        }

        // 2. docKeyMap[k] = d iff docIdMap[d] = (k, _, _).
        for (k, &d) in self.doc_key_map.iter() {
            match self.doc_info.get(d.index()).and_then(|e| e.as_ref()) {
                Some(info) if &info.key == k => {}
                _ => {
                    return Err(Error::InvariantViolation(
                        "doc_key_map entry without a matching doc_info entry".into(),
                    ))
                }
            }
        }
        for (idx, slot) in self.doc_info.iter().enumerate() {
            if let Some(info) = slot {
                if self.doc_key_map.get(&info.key) != Some(&DocId(idx as u32)) {
                    return Err(Error::InvariantViolation(
                        "doc_info entry not mirrored in doc_key_map".into(),
                    ));
                }
            }
        }

        // 3. Every DocIdSet is sorted, unique, within [0, nextDocId).
        for slot in self.term_postings.iter().flatten() {
            if !slot.docs.invariant() {
                return Err(Error::InvariantViolation("DocIdSet not sorted/unique".into()));
            }
            if let Some(&max) = slot.docs.to_list().last() {
                if max.0 >= self.next_doc_id {
                    return Err(Error::InvariantViolation("DocIdSet references an unallocated DocId".into()));
                }
            }
        }

        // 4 & 5: cross-check DocTermIds against the posting lists.
        for slot in self.doc_info.iter().flatten() {
            for &id in slot.terms.distinct_term_ids().iter() {
                let entry = self.term_postings[id.index()]
                    .as_ref()
                    .ok_or(Error::DanglingTermId(id))?;
                let appears_somewhere = F::ALL
                    .iter()
                    .any(|&f| slot.terms.field_term_count(f, id) > 0);
                if !appears_somewhere {
                    return Err(Error::InvariantViolation(
                        "distinct_term_ids produced a TermId absent from every field".into(),
                    ));
                }
                let _ = entry;
            }
        }
        for (idx, slot) in self.term_postings.iter().enumerate() {
            if let Some(entry) = slot {
                for d in entry.docs.to_list() {
                    let info = self.doc_info[d.index()]
                        .as_ref()
                        .ok_or_else(|| Error::InvariantViolation("posting list references a deleted doc".into()))?;
                    let appears = F::ALL
                        .iter()
                        .any(|&f| info.terms.field_term_count(f, TermId(idx as u32)) > 0);
                    if !appears {
                        return Err(Error::InvariantViolation(
                            "posting list contains a doc that doesn't actually contain the term".into(),
                        ));
                    }
                }
            }
        }

        // 6. next_term_id / next_doc_id strictly exceed every stored id.
        if (self.term_postings.len() as u32) > self.next_term_id {
            return Err(Error::InvariantViolation("next_term_id does not exceed stored term ids".into()));
        }
        if (self.doc_info.len() as u32) > self.next_doc_id {
            return Err(Error::InvariantViolation("next_doc_id does not exceed stored doc ids".into()));
        }

        Ok(())
    }
}

/// The exclusive upper bound of a prefix range: strip trailing characters
/// equal to the maximum codepoint, then increment the last remaining
/// character by one. `None` if every character was the maximum codepoint
/// (there is no finite upper bound).
fn exclusive_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while matches!(chars.last(), Some(&c) if c == char::MAX) {
        chars.pop();
    }
    let last_idx = chars.len().checked_sub(1)?;
    chars[last_idx] = next_char(chars[last_idx])?;
    Some(chars.into_iter().collect())
}

fn next_char(c: char) -> Option<char> {
    let mut code = c as u32 + 1;
    if code == 0xD800 {
        // Skip the UTF-16 surrogate range, which is not valid in a `char`.
        code = 0xE000;
    }
    char::from_u32(code)
}
