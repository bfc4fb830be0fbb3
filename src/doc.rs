//! Per-document payloads: [`DocTermIds`] and [`DocFeatVals`].
//!
//! A document's per-field term list is a materialized map keyed by field
//! ordinal, built once per insert from a total function `Field → [Term]`.
//! Each per-field `Vec<TermId>` is order-preserving and keeps duplicates, so
//! a per-(field, term) occurrence count is a linear scan rather than a
//! stored frequency table.

use crate::schema::EnumerableKey;
use crate::scoring::Doc;
use crate::TermId;

/// Per-document, per-field ordered sequence of [`TermId`]s.
/// Immutable once created; a document update discards the old value and
/// builds a fresh one.
#[derive(Debug, Clone)]
pub struct DocTermIds<F: EnumerableKey> {
    by_field: Vec<Vec<TermId>>,
    _marker: std::marker::PhantomData<F>,
}

impl<F: EnumerableKey> DocTermIds<F> {
    /// Materializes every field's term-id list by invoking `terms_for_field`
    /// once per field in `F::ALL`.
    pub fn create(mut terms_for_field: impl FnMut(F) -> Vec<TermId>) -> Self {
        let by_field = F::ALL.iter().map(|&f| terms_for_field(f)).collect();
        Self {
            by_field,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn field_length(&self, f: F) -> usize {
        self.by_field[f.ordinal()].len()
    }

    pub fn field_elems(&self, f: F) -> &[TermId] {
        &self.by_field[f.ordinal()]
    }

    pub fn field_term_count(&self, f: F, term: TermId) -> u32 {
        self.by_field[f.ordinal()]
            .iter()
            .filter(|&&t| t == term)
            .count() as u32
    }

    /// Every distinct [`TermId`] appearing in any field of this document.
    pub fn distinct_term_ids(&self) -> std::collections::BTreeSet<TermId> {
        self.by_field
            .iter()
            .flat_map(|ids| ids.iter().copied())
            .collect()
    }
}

/// Per-document, per-feature floating-point vector.
#[derive(Debug, Clone)]
pub struct DocFeatVals<P: EnumerableKey> {
    values: Vec<f32>,
    _marker: std::marker::PhantomData<P>,
}

impl<P: EnumerableKey> DocFeatVals<P> {
    pub fn create(mut value_for_feature: impl FnMut(P) -> f32) -> Self {
        let values = P::ALL.iter().map(|&p| value_for_feature(p)).collect();
        Self {
            values,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn lookup(&self, p: P) -> f32 {
        self.values[p.ordinal()]
    }
}

/// The ranker's [`Doc`] view over one indexed document's stored terms and
/// features, used by the engine facade.
pub struct IndexDoc<'a, F: EnumerableKey, P: EnumerableKey> {
    pub terms: &'a DocTermIds<F>,
    pub feats: &'a DocFeatVals<P>,
}

impl<'a, F: EnumerableKey, P: EnumerableKey> Doc<F, P> for IndexDoc<'a, F, P> {
    fn field_length(&self, f: F) -> u32 {
        self.terms.field_length(f) as u32
    }
    fn field_term_frequency(&self, f: F, term: TermId) -> u32 {
        self.terms.field_term_count(f, term)
    }
    fn feature_value(&self, p: P) -> f32 {
        self.feats.lookup(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum F {
        Title,
        Body,
    }
    impl EnumerableKey for F {
        const ALL: &'static [Self] = &[F::Title, F::Body];
        fn ordinal(&self) -> usize {
            *self as usize
        }
    }
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum P {
        Popularity,
    }
    impl EnumerableKey for P {
        const ALL: &'static [Self] = &[P::Popularity];
        fn ordinal(&self) -> usize {
            *self as usize
        }
    }

    #[test]
    fn field_term_count_counts_duplicates() {
        let terms = DocTermIds::<F>::create(|f| match f {
            F::Title => vec![TermId(1)],
            F::Body => vec![TermId(1), TermId(2), TermId(1)],
        });
        assert_eq!(terms.field_length(F::Body), 3);
        assert_eq!(terms.field_term_count(F::Body, TermId(1)), 2);
        assert_eq!(terms.field_term_count(F::Body, TermId(2)), 1);
        assert_eq!(terms.field_term_count(F::Title, TermId(2)), 0);
    }

    #[test]
    fn distinct_term_ids_dedupes_across_fields() {
        let terms = DocTermIds::<F>::create(|f| match f {
            F::Title => vec![TermId(1)],
            F::Body => vec![TermId(1), TermId(2)],
        });
        let distinct: Vec<_> = terms.distinct_term_ids().into_iter().collect();
        assert_eq!(distinct, vec![TermId(1), TermId(2)]);
    }

    #[test]
    fn feat_vals_lookup() {
        let feats = DocFeatVals::<P>::create(|p| match p {
            P::Popularity => 42.0,
        });
        assert_eq!(feats.lookup(P::Popularity), 42.0);
    }

    #[test]
    fn index_doc_delegates_to_terms_and_feats() {
        let terms = DocTermIds::<F>::create(|f| match f {
            F::Title => vec![TermId(1)],
            F::Body => vec![TermId(1), TermId(1)],
        });
        let feats = DocFeatVals::<P>::create(|p| match p {
            P::Popularity => 7.0,
        });
        let view = IndexDoc {
            terms: &terms,
            feats: &feats,
        };
        assert_eq!(view.field_length(F::Body), 2);
        assert_eq!(view.field_term_frequency(F::Body, TermId(1)), 2);
        assert_eq!(view.feature_value(P::Popularity), 7.0);
    }
}
