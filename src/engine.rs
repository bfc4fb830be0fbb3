//! The search engine facade: assembles a [`SearchIndex`], a ranker
//! [`Context`] built from current corpus stats, and an [`Extractor`]
//! configured for a schema; offers `insert_doc`, `delete_doc`, `query`, and
//! `query_explain`.

use crate::doc::IndexDoc;
use crate::docidset::DocIdSet;
use crate::extractor::Extractor;
use crate::heap::TopK;
use crate::index::SearchIndex;
use crate::markup::Markup;
use crate::schema::{EnumerableKey, Schema};
use crate::scoring::{self, Context, Explanation, QueryTerm};
use crate::{DocId, HashSet};

/// One field's raw input for `insert_doc`: either prose to run through
/// `extractSynopsisTerms`, or an already-parsed markup tree to run through
/// `extractDescriptionTerms`.
pub enum FieldInput {
    Synopsis(String),
    Description(Markup),
}

/// Top-level handle on a live search index.
pub struct SearchEngine<K: Ord + Clone, F: EnumerableKey, P: EnumerableKey> {
    index: SearchIndex<K, F, P>,
    schema: Schema<F, P>,
    extractor: Extractor,
}

impl<K: Ord + Clone, F: EnumerableKey, P: EnumerableKey> SearchEngine<K, F, P> {
    /// Builds an empty engine from a schema. `stopwords` must already be
    /// case-folded.
    pub fn new(schema: Schema<F, P>, stopwords: HashSet<String>) -> Self {
        Self {
            index: SearchIndex::empty_index(),
            schema,
            extractor: Extractor::new(stopwords),
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn doc_count(&self) -> usize {
        self.index.doc_count()
    }

    pub fn term_count(&self) -> usize {
        self.index.term_count()
    }

    pub fn lookup_doc(&self, key: &K) -> Option<(&crate::doc::DocTermIds<F>, &crate::doc::DocFeatVals<P>)> {
        let d = self.index.get_doc_id(key)?;
        let (_, terms, feats) = self.index.lookup_doc_id(d);
        Some((terms, feats))
    }

    /// Indexes or re-indexes `key`. `per_field` is presented to the
    /// extractor; `per_feature` is stored verbatim.
    pub fn insert_doc(
        &mut self,
        key: K,
        mut per_field: impl FnMut(F) -> FieldInput,
        per_feature: impl FnMut(P) -> f32,
    ) -> DocId {
        let extractor = &self.extractor;
        self.index.insert_doc(
            key,
            |f| match per_field(f) {
                FieldInput::Synopsis(text) => extractor.extract_synopsis_terms(&text),
                FieldInput::Description(markup) => extractor.extract_description_terms(&markup),
            },
            per_feature,
        )
    }

    /// Removes `key` from the index, if present.
    pub fn delete_doc(&mut self, key: &K) -> bool {
        self.index.delete_doc(key)
    }

    /// Recomputes live corpus statistics (`numDocsTotal`, `avgFieldLength`)
    /// into a fresh ranker [`Context`].
    fn build_context(&self) -> Context<F, P> {
        let num_docs_total = self.index.doc_count() as u32;
        let mut field_total_len = vec![0u64; F::ALL.len()];
        for (_, _, terms, _) in self.index.iter_docs() {
            for &f in F::ALL {
                field_total_len[f.ordinal()] += terms.field_length(f) as u64;
            }
        }
        let avg_field_length: Vec<f32> = field_total_len
            .into_iter()
            .map(|total| {
                if num_docs_total == 0 {
                    0.0
                } else {
                    total as f32 / num_docs_total as f32
                }
            })
            .collect();
        Context::from_schema(&self.schema, num_docs_total, avg_field_length)
    }

    fn query_terms(&self, query: &str) -> Vec<QueryTerm> {
        self.extractor
            .extract_synopsis_terms(query)
            .into_iter()
            .filter_map(|term| {
                let (id, docs) = self.index.lookup_term(&term)?;
                Some(QueryTerm {
                    term: id,
                    num_docs_with_term: docs.size() as u32,
                })
            })
            .collect()
    }

    fn candidates(&self, terms: &[QueryTerm]) -> Vec<DocId> {
        let mut union = DocIdSet::empty();
        for q in terms {
            union = union.union(self.index.lookup_term_id(q.term));
        }
        union.to_list().to_vec()
    }

    /// `query(queryString, topK) → [(DocKey, Float)]`, ordered by
    /// descending score with a deterministic ascending-`DocKey` tiebreak.
    pub fn query(&self, query: &str, top_k: usize) -> Vec<(K, f32)> {
        let terms = self.query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let ctx = self.build_context();
        let mut heap = TopK::new(top_k);
        for d in self.candidates(&terms) {
            let (key, doc_terms, doc_feats) = self.index.lookup_doc_id(d);
            let view = IndexDoc {
                terms: doc_terms,
                feats: doc_feats,
            };
            let score = scoring::score(&ctx, &view, &terms);
            heap.offer(score, key.clone());
        }
        heap.into_sorted_vec()
    }

    /// Every candidate document's full score breakdown, unranked by top-k
    /// (callers that want only the top results should intersect with
    /// [`Self::query`]'s output).
    pub fn query_explain(&self, query: &str) -> Vec<(K, Explanation<F, P>)> {
        let terms = self.query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let ctx = self.build_context();
        self.candidates(&terms)
            .into_iter()
            .map(|d| {
                let (key, doc_terms, doc_feats) = self.index.lookup_doc_id(d);
                let view = IndexDoc {
                    terms: doc_terms,
                    feats: doc_feats,
                };
                (key.clone(), scoring::explain(&ctx, &view, &terms))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EnumerableKey;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum F {
        Body,
    }
    impl EnumerableKey for F {
        const ALL: &'static [Self] = &[F::Body];
        fn ordinal(&self) -> usize {
            0
        }
    }
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum P {}
    impl EnumerableKey for P {
        const ALL: &'static [Self] = &[];
        fn ordinal(&self) -> usize {
            unreachable!()
        }
    }

    fn stopwords(words: &[&str]) -> HashSet<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    fn engine() -> SearchEngine<String, F, P> {
        SearchEngine::new(Schema::new(1.2), stopwords(&["the"]))
    }

    #[test]
    fn empty_index_then_query() {
        let mut engine = engine();
        assert_eq!(engine.doc_count(), 0);
        assert!(engine.query("hello", 10).is_empty());

        engine.insert_doc(
            "k1".to_string(),
            |f| match f {
                F::Body => FieldInput::Synopsis("hello world".to_string()),
            },
            |p| match p {},
        );
        assert_eq!(engine.doc_count(), 1);
        let results = engine.query("hello", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "k1");
        assert!(results[0].1 > 0.0);
    }

    #[test]
    fn stemming_matches_both_docs() {
        let mut engine = engine();
        engine.insert_doc(
            "k1".to_string(),
            |_| FieldInput::Synopsis("running dogs".to_string()),
            |p| match p {},
        );
        engine.insert_doc(
            "k2".to_string(),
            |_| FieldInput::Synopsis("runs dog".to_string()),
            |p| match p {},
        );
        let mut keys: Vec<String> = engine
            .query("run dog", 10)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["k1", "k2"]);
    }

    #[test]
    fn query_explain_overall_equals_query_score() {
        let mut engine = engine();
        engine.insert_doc(
            "k1".to_string(),
            |_| FieldInput::Synopsis("alpha beta".to_string()),
            |p| match p {},
        );
        let scored = engine.query("alpha", 10);
        let explained = engine.query_explain("alpha");
        assert_eq!(scored.len(), explained.len());
        for ((k1, score), (k2, explanation)) in scored.iter().zip(explained.iter()) {
            assert_eq!(k1, k2);
            assert_eq!(*score, explanation.overall_score);
        }
    }
}
