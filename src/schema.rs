//! Field/Feature enumeration contract and the per-schema BM25F parameters
//! fixed at engine construction.
//!
//! The field and feature set is fixed at construction, so fields and
//! features are compile-time enums backed by dense arrays instead of a
//! runtime-registered map — no hash lookup per field access.

/// A finite, totally enumerable key type: a `Field` or `Feature` enum fixed
/// at engine construction. Implementors back dense, `Vec`-indexed storage
/// via `ordinal()`.
pub trait EnumerableKey: Copy + Eq + std::hash::Hash + std::fmt::Debug + 'static {
    /// Every value of this type, in the order their ordinals should run.
    const ALL: &'static [Self];

    /// Dense index into `[0, Self::ALL.len())`.
    fn ordinal(&self) -> usize;
}

/// One of the three non-term feature shaping functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureFunction {
    /// `x ↦ log(λ + x)`
    Logarithmic(f32),
    /// `x ↦ x / (λ + x)`
    Rational(f32),
    /// `x ↦ 1 / (λ + exp(−x · λ'))`
    Sigmoid(f32, f32),
}

impl FeatureFunction {
    pub fn eval(&self, x: f32) -> f32 {
        match *self {
            FeatureFunction::Logarithmic(lambda) => (lambda + x).ln(),
            FeatureFunction::Rational(lambda) => x / (lambda + x),
            FeatureFunction::Sigmoid(lambda, lambda_prime) => {
                1.0 / (lambda + (-x * lambda_prime).exp())
            }
        }
    }
}

/// Fixed BM25F parameters for a schema of fields `F` and features `P`.
/// `avg_field_length` starts at zero and is not maintained incrementally
/// here — the engine facade recomputes live corpus statistics into a
/// [`crate::scoring::Context`] at query time instead.
#[derive(Debug, Clone)]
pub struct Schema<F: EnumerableKey, P: EnumerableKey> {
    pub param_k1: f32,
    field_b: Vec<f32>,
    field_weight: Vec<f32>,
    avg_field_length: Vec<f32>,
    feature_weight: Vec<f32>,
    feature_function: Vec<FeatureFunction>,
    _fields: std::marker::PhantomData<F>,
    _features: std::marker::PhantomData<P>,
}

impl<F: EnumerableKey, P: EnumerableKey> Schema<F, P> {
    /// A schema with the usual Okapi defaults: `k1 = 1.2`, `b = 0.75` for
    /// every field, field and feature weights of `1.0`, and a
    /// `Logarithmic(1.0)` feature function. Callers adjust via the setters
    /// below.
    pub fn new(param_k1: f32) -> Self {
        Self {
            param_k1,
            field_b: vec![0.75; F::ALL.len()],
            field_weight: vec![1.0; F::ALL.len()],
            avg_field_length: vec![0.0; F::ALL.len()],
            feature_weight: vec![1.0; P::ALL.len()],
            feature_function: vec![FeatureFunction::Logarithmic(1.0); P::ALL.len()],
            _fields: std::marker::PhantomData,
            _features: std::marker::PhantomData,
        }
    }

    pub fn param_b(&self, f: F) -> f32 {
        self.field_b[f.ordinal()]
    }
    pub fn set_param_b(&mut self, f: F, b: f32) -> &mut Self {
        self.field_b[f.ordinal()] = b;
        self
    }

    pub fn field_weight(&self, f: F) -> f32 {
        self.field_weight[f.ordinal()]
    }
    pub fn set_field_weight(&mut self, f: F, w: f32) -> &mut Self {
        self.field_weight[f.ordinal()] = w;
        self
    }

    pub fn avg_field_length(&self, f: F) -> f32 {
        self.avg_field_length[f.ordinal()]
    }
    pub fn set_avg_field_length(&mut self, f: F, len: f32) -> &mut Self {
        self.avg_field_length[f.ordinal()] = len;
        self
    }

    pub fn feature_weight(&self, p: P) -> f32 {
        self.feature_weight[p.ordinal()]
    }
    pub fn set_feature_weight(&mut self, p: P, w: f32) -> &mut Self {
        self.feature_weight[p.ordinal()] = w;
        self
    }

    pub fn feature_function(&self, p: P) -> FeatureFunction {
        self.feature_function[p.ordinal()]
    }
    pub fn set_feature_function(&mut self, p: P, func: FeatureFunction) -> &mut Self {
        self.feature_function[p.ordinal()] = func;
        self
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
    fn defaults_are_dense_per_field() {
        let schema = Schema::<F, P>::new(1.2);
        assert_eq!(schema.param_b(F::Title), 0.75);
        assert_eq!(schema.avg_field_length(F::Body), 0.0);
        assert_eq!(schema.feature_weight(P::Popularity), 1.0);
    }

    #[test]
    fn setters_are_per_field() {
        let mut schema = Schema::<F, P>::new(1.2);
        schema.set_param_b(F::Title, 0.2);
        assert_eq!(schema.param_b(F::Title), 0.2);
        assert_eq!(schema.param_b(F::Body), 0.75);
    }
}
