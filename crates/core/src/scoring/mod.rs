//! Ingredient and product health scoring
//!
//! Scores come straight from the health knowledge base; ingredients it does
//! not know get a neutral default. The product aggregate is a position-weighted
//! mean because declaration order follows concentration.

mod weights;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use weights::{
    position_weight, round_one_decimal, truncated_mean, weighted_mean, EMPTY_LIST_SCORE,
    POSITION_EXPONENT,
};

use crate::domain::ingredient::{
    IngredientToken, Interpretation, ProductAnalysis, QuickAnalysis, ScoredIngredient,
};
use crate::knowledge::HealthKnowledgeBase;

/// Raw score cutoff used by the quick analysis path.
pub const DEFAULT_QUICK_FLAG_THRESHOLD: f64 = 50.0;

/// How an ingredient is judged problematic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "threshold", rename_all = "snake_case")]
pub enum FlaggingMode {
    /// Category is `concerning` or `avoid`. Authoritative for `flagged_count`.
    CategoryBand,
    /// Raw score strictly below the threshold.
    ScoreBelow(f64),
}

impl FlaggingMode {
    pub fn is_flagged(self, ingredient: &ScoredIngredient) -> bool {
        match self {
            Self::CategoryBand => ingredient.category.is_flagged(),
            Self::ScoreBelow(threshold) => ingredient.score < threshold,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IngredientScorer {
    knowledge: Arc<HealthKnowledgeBase>,
    quick_flag_threshold: f64,
}

impl IngredientScorer {
    pub fn new(knowledge: Arc<HealthKnowledgeBase>) -> Self {
        Self { knowledge, quick_flag_threshold: DEFAULT_QUICK_FLAG_THRESHOLD }
    }

    pub fn with_quick_flag_threshold(mut self, threshold: f64) -> Self {
        self.quick_flag_threshold = threshold;
        self
    }

    pub fn knowledge(&self) -> &HealthKnowledgeBase {
        &self.knowledge
    }

    pub fn score_ingredient(&self, ingredient: &IngredientToken) -> ScoredIngredient {
        match self.knowledge.get(ingredient) {
            Some(record) => ScoredIngredient::from(record),
            None => self.knowledge.record_or_default(ingredient).into(),
        }
    }

    /// Scores raw ingredient names, lower-casing and trimming each one first.
    ///
    /// Duplicates are scored at every position they occur.
    pub fn score_product<S: AsRef<str>>(&self, ingredients: &[S]) -> ProductAnalysis {
        let tokens: Vec<IngredientToken> =
            ingredients.iter().map(|name| IngredientToken::new(name.as_ref())).collect();
        self.score_tokens(&tokens)
    }

    pub fn score_tokens(&self, ingredients: &[IngredientToken]) -> ProductAnalysis {
        let scored: Vec<ScoredIngredient> =
            ingredients.iter().map(|ingredient| self.score_ingredient(ingredient)).collect();
        let scores: Vec<f64> = scored.iter().map(|ingredient| ingredient.score).collect();

        let product_score = weighted_mean(&scores);
        let flagged_count =
            scored.iter().filter(|ingredient| FlaggingMode::CategoryBand.is_flagged(ingredient)).count();

        ProductAnalysis {
            ingredients: scored,
            product_score,
            flagged_count,
            interpretation: Interpretation::from_score(product_score),
        }
    }

    /// Unweighted, integer-valued analysis flagging by raw score cutoff.
    pub fn quick_analysis<S: AsRef<str>>(&self, ingredients: &[S]) -> QuickAnalysis {
        let scored: Vec<ScoredIngredient> = ingredients
            .iter()
            .map(|name| self.score_ingredient(&IngredientToken::new(name.as_ref())))
            .collect();
        let scores: Vec<f64> = scored.iter().map(|ingredient| ingredient.score).collect();

        let flagged_ingredients =
            flagged_ingredients(&scored, FlaggingMode::ScoreBelow(self.quick_flag_threshold));

        QuickAnalysis { product_score: truncated_mean(&scores), ingredients: scored, flagged_ingredients }
    }

    pub fn quick_flag_threshold(&self) -> f64 {
        self.quick_flag_threshold
    }
}

/// The subset of `ingredients` flagged under `mode`, in input order.
pub fn flagged_ingredients(
    ingredients: &[ScoredIngredient],
    mode: FlaggingMode,
) -> Vec<ScoredIngredient> {
    ingredients.iter().filter(|ingredient| mode.is_flagged(ingredient)).cloned().collect()
}
