use std::collections::HashSet;

use crate::domain::ingredient::IngredientToken;
use crate::domain::product::Product;

/// Default value reported by [`FixedSimilarity`].
pub const DEFAULT_FIXED_SIMILARITY: f64 = 0.85;

/// How close a candidate product is to the product being replaced.
///
/// Reported as a diagnostic on each recommendation; ranking does not use it.
pub trait SimilarityMetric: Send + Sync {
    fn name(&self) -> &'static str;

    fn similarity(&self, candidate: &Product, reference: &[IngredientToken]) -> f64;
}

/// Reports the same value for every candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedSimilarity {
    value: f64,
}

impl FixedSimilarity {
    pub fn new(value: f64) -> Self {
        Self { value: value.clamp(0.0, 1.0) }
    }
}

impl Default for FixedSimilarity {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_SIMILARITY)
    }
}

impl SimilarityMetric for FixedSimilarity {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn similarity(&self, _candidate: &Product, _reference: &[IngredientToken]) -> f64 {
        self.value
    }
}

/// Jaccard overlap between the candidate's ingredients and the reference list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngredientOverlapSimilarity;

impl SimilarityMetric for IngredientOverlapSimilarity {
    fn name(&self) -> &'static str {
        "ingredient_overlap"
    }

    fn similarity(&self, candidate: &Product, reference: &[IngredientToken]) -> f64 {
        let left: HashSet<&IngredientToken> = candidate.ingredients.iter().collect();
        let right: HashSet<&IngredientToken> = reference.iter().collect();

        let union = left.union(&right).count();
        if union == 0 {
            return 0.0;
        }
        left.intersection(&right).count() as f64 / union as f64
    }
}
