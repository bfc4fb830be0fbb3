//! The BM25F ranker: a stateless scorer over a [`Context`] (corpus
//! statistics + weights) and a [`Doc`] view over one document.
//!
//! Postings are already fully materialized in memory (`DocTermIds`,
//! `DocFeatVals`), so there's no iterator-movement machinery to build: the
//! ranker is a handful of free functions over `Context` + `Doc`.

use crate::schema::{EnumerableKey, FeatureFunction, Schema};
use crate::TermId;

/// Assembled BM25F parameters plus live corpus statistics, built fresh per
/// query from a [`Schema`] and the index's current average field lengths
/// and total document count. Unlike `Schema`, this is not long-lived: it's
/// cheap to rebuild and callers should not cache it across writes.
#[derive(Debug, Clone)]
pub struct Context<F: EnumerableKey, P: EnumerableKey> {
    pub num_docs_total: u32,
    param_k1: f32,
    field_b: Vec<f32>,
    field_weight: Vec<f32>,
    avg_field_length: Vec<f32>,
    feature_weight: Vec<f32>,
    feature_function: Vec<FeatureFunction>,
    _fields: std::marker::PhantomData<F>,
    _features: std::marker::PhantomData<P>,
}

impl<F: EnumerableKey, P: EnumerableKey> Context<F, P> {
    /// Builds a `Context` from a fixed `Schema` plus the corpus's current
    /// total document count and average field lengths.
    pub fn from_schema(schema: &Schema<F, P>, num_docs_total: u32, avg_field_length: Vec<f32>) -> Self {
        debug_assert_eq!(avg_field_length.len(), F::ALL.len());
        Self {
            num_docs_total,
            param_k1: schema.param_k1,
            field_b: F::ALL.iter().map(|&f| schema.param_b(f)).collect(),
            field_weight: F::ALL.iter().map(|&f| schema.field_weight(f)).collect(),
            avg_field_length,
            feature_weight: P::ALL.iter().map(|&p| schema.feature_weight(p)).collect(),
            feature_function: P::ALL.iter().map(|&p| schema.feature_function(p)).collect(),
            _fields: std::marker::PhantomData,
            _features: std::marker::PhantomData,
        }
    }

    pub fn param_k1(&self) -> f32 {
        self.param_k1
    }
    pub fn param_b(&self, f: F) -> f32 {
        self.field_b[f.ordinal()]
    }
    pub fn field_weight(&self, f: F) -> f32 {
        self.field_weight[f.ordinal()]
    }
    pub fn avg_field_length(&self, f: F) -> f32 {
        self.avg_field_length[f.ordinal()]
    }
    pub fn feature_weight(&self, p: P) -> f32 {
        self.feature_weight[p.ordinal()]
    }
    pub fn feature_function(&self, p: P) -> FeatureFunction {
        self.feature_function[p.ordinal()]
    }

    /// A copy of this context whose `field_weight` is zeroed for every field
    /// except `only`. Used by [`explain`] to compute per-(term, field)
    /// diagnostic scores.
    fn masked_to_field(&self, only: F) -> Self {
        let mut out = self.clone();
        for (i, w) in out.field_weight.iter_mut().enumerate() {
            if i != only.ordinal() {
                *w = 0.0;
            }
        }
        out
    }
}

/// A document's view as seen by the ranker.
pub trait Doc<F: EnumerableKey, P: EnumerableKey> {
    fn field_length(&self, f: F) -> u32;
    fn field_term_frequency(&self, f: F, term: TermId) -> u32;
    fn feature_value(&self, p: P) -> f32;
}

/// One query term plus the corpus document frequency needed for IDF.
#[derive(Debug, Clone, Copy)]
pub struct QueryTerm {
    pub term: TermId,
    pub num_docs_with_term: u32,
}

/// `W_idf(t) = log((N − n_t + 0.5) / (n_t + 0.5))`.
pub fn idf(num_docs_total: u32, num_docs_with_term: u32) -> f32 {
    let n = num_docs_total as f32;
    let n_t = num_docs_with_term as f32;
    ((n - n_t + 0.5) / (n_t + 0.5)).ln()
}

/// `B_f(D) = (1 − paramB(f)) + paramB(f) · docFieldLength(D, f) / avgFieldLength(f)`.
/// NaN (when both the field length and the average field length are zero)
/// is the designed sentinel for "skip this field".
fn b_field<F: EnumerableKey, P: EnumerableKey, D: Doc<F, P>>(
    ctx: &Context<F, P>,
    doc: &D,
    f: F,
) -> f32 {
    let b = ctx.param_b(f);
    let length = doc.field_length(f) as f32;
    let avg = ctx.avg_field_length(f);
    (1.0 - b) + b * (length / avg)
}

/// `tf'(D, t) = Σ_f fieldWeight(f) · docFieldTermFrequency(D, f, t) / B_f(D)`,
/// skipping any field whose `B_f(D)` is NaN.
fn tf_prime<F: EnumerableKey, P: EnumerableKey, D: Doc<F, P>>(
    ctx: &Context<F, P>,
    doc: &D,
    term: TermId,
) -> f32 {
    F::ALL
        .iter()
        .filter_map(|&f| {
            let b = b_field(ctx, doc, f);
            if b.is_nan() {
                None
            } else {
                Some(ctx.field_weight(f) * doc.field_term_frequency(f, term) as f32 / b)
            }
        })
        .sum()
}

fn term_score<F: EnumerableKey, P: EnumerableKey, D: Doc<F, P>>(
    ctx: &Context<F, P>,
    doc: &D,
    q: QueryTerm,
) -> f32 {
    let k1 = ctx.param_k1();
    let tf = tf_prime(ctx, doc, q.term);
    idf(ctx.num_docs_total, q.num_docs_with_term) * (tf / (k1 + tf))
}

fn feature_score<F: EnumerableKey, P: EnumerableKey, D: Doc<F, P>>(
    ctx: &Context<F, P>,
    doc: &D,
    p: P,
) -> f32 {
    ctx.feature_weight(p) * ctx.feature_function(p).eval(doc.feature_value(p))
}

/// The sum of per-query-term BM25 contributions plus the sum of weighted
/// non-term feature contributions.
pub fn score<F: EnumerableKey, P: EnumerableKey, D: Doc<F, P>>(
    ctx: &Context<F, P>,
    doc: &D,
    terms: &[QueryTerm],
) -> f32 {
    let term_part: f32 = terms.iter().map(|&q| term_score(ctx, doc, q)).sum();
    let feature_part: f32 = P::ALL.iter().map(|&p| feature_score(ctx, doc, p)).sum();
    term_part + feature_part
}

/// Per-document, per-query bulk scorer: hoists `k1`, the per-field weight
/// vector, and the per-field `B_f(D)` vector out of the per-term loop.
/// Build one per document, then call [`BulkScorer::score_term`] once per
/// query term.
pub struct BulkScorer<F: EnumerableKey> {
    num_docs_total: u32,
    k1: f32,
    field_weight: Vec<f32>,
    b_field: Vec<f32>,
    _marker: std::marker::PhantomData<F>,
}

impl<F: EnumerableKey> BulkScorer<F> {
    pub fn prepare<P: EnumerableKey, D: Doc<F, P>>(ctx: &Context<F, P>, doc: &D) -> Self {
        let field_weight = F::ALL.iter().map(|&f| ctx.field_weight(f)).collect();
        let b_field = F::ALL.iter().map(|&f| b_field(ctx, doc, f)).collect();
        Self {
            num_docs_total: ctx.num_docs_total,
            k1: ctx.param_k1(),
            field_weight,
            b_field,
            _marker: std::marker::PhantomData,
        }
    }

    /// Equivalent to [`term_score`] up to floating-point rearrangement.
    pub fn score_term(&self, num_docs_with_term: u32, field_term_freq: impl Fn(F) -> u32) -> f32 {
        let tf: f32 = F::ALL
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| {
                let b = self.b_field[i];
                if b.is_nan() {
                    None
                } else {
                    Some(self.field_weight[i] * field_term_freq(f) as f32 / b)
                }
            })
            .sum();
        idf(self.num_docs_total, num_docs_with_term) * (tf / (self.k1 + tf))
    }
}

/// A per-(term, field) diagnostic score, computed by re-scoring the term
/// with every other field's weight masked to zero. These are diagnostic and
/// do not sum to the multi-field term score, because BM25F's combination
/// across fields is non-linear.
#[derive(Debug, Clone, Copy)]
pub struct TermFieldScore<F> {
    pub term: TermId,
    pub field: F,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct Explanation<F: EnumerableKey, P: EnumerableKey> {
    pub overall_score: f32,
    pub term_scores: Vec<(TermId, f32)>,
    pub non_term_scores: Vec<(P, f32)>,
    pub term_field_scores: Vec<TermFieldScore<F>>,
}

/// Scores `doc` against `terms`, broken down per term and per feature.
pub fn explain<F: EnumerableKey, P: EnumerableKey, D: Doc<F, P>>(
    ctx: &Context<F, P>,
    doc: &D,
    terms: &[QueryTerm],
) -> Explanation<F, P> {
    let term_scores: Vec<(TermId, f32)> = terms
        .iter()
        .map(|&q| (q.term, term_score(ctx, doc, q)))
        .collect();
    let non_term_scores: Vec<(P, f32)> = P::ALL
        .iter()
        .map(|&p| (p, feature_score(ctx, doc, p)))
        .collect();
    let overall_score = term_scores.iter().map(|(_, s)| s).sum::<f32>()
        + non_term_scores.iter().map(|(_, s)| s).sum::<f32>();

    let mut term_field_scores = Vec::with_capacity(F::ALL.len() * terms.len());
    for &f in F::ALL {
        let masked = ctx.masked_to_field(f);
        for &q in terms {
            term_field_scores.push(TermFieldScore {
                term: q.term,
                field: f,
                score: term_score(&masked, doc, q),
            });
        }
    }

    Explanation {
        overall_score,
        term_scores,
        non_term_scores,
        term_field_scores,
    }
}
