//! Substitute product recommendation
//!
//! A product qualifies only when none of its ingredients is flagged. Survivors
//! are ranked by a fixed blend of base avoidance credit, user rating and the
//! product's own health score.

pub mod catalog;
pub mod pricing;
pub mod similarity;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use self::{
    catalog::ProductCatalog,
    pricing::{ListPriceSource, PriceComparison, PriceSource},
    similarity::{FixedSimilarity, SimilarityMetric},
};
use crate::domain::ingredient::IngredientToken;
use crate::domain::product::{Product, ProductId, RecommendedProduct};
use crate::errors::DomainError;

pub const SUBSTITUTE_BASE_SCORE: f64 = 0.7;
pub const RATING_WEIGHT: f64 = 0.2;
pub const HEALTH_WEIGHT: f64 = 0.1;
pub const MAX_RATING: f64 = 5.0;
/// `health_boost` is measured against this neutral score.
pub const HEALTH_BASELINE: f64 = 60.0;

/// Ranking score of a product that survived flagged-ingredient exclusion.
pub fn substitute_score(product: &Product) -> f64 {
    let score = SUBSTITUTE_BASE_SCORE
        + (product.rating / MAX_RATING) * RATING_WEIGHT
        + (product.health_score / 100.0) * HEALTH_WEIGHT;
    score.min(1.0)
}

/// Optional narrowing applied on top of flagged-ingredient exclusion.
/// Empty fields are unconstrained; present ones are AND-combined.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationFilters {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub skin_type: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
}

impl RecommendationFilters {
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map(|category| product.category.trim().eq_ignore_ascii_case(category.trim()))
            .unwrap_or(true);

        category_ok
            && overlaps(&self.skin_type, product.skin_type.iter())
            && overlaps(&self.concerns, product.concerns.iter())
    }
}

fn overlaps<'a>(wanted: &[String], offered: impl Iterator<Item = &'a String>) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let offered: HashSet<String> = offered.map(|value| value.trim().to_lowercase()).collect();
    wanted.iter().any(|value| offered.contains(&value.trim().to_lowercase()))
}

/// One recommendation call.
#[derive(Clone, Debug, Default)]
pub struct RecommendationRequest {
    pub flagged: Vec<IngredientToken>,
    pub filters: RecommendationFilters,
    pub max_results: usize,
    /// Ingredients of the product being replaced, for the similarity slot.
    pub reference: Vec<IngredientToken>,
}

pub struct ProductRecommender {
    catalog: Arc<ProductCatalog>,
    similarity: Box<dyn SimilarityMetric>,
    prices: Box<dyn PriceSource>,
}

impl ProductRecommender {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self {
            catalog,
            similarity: Box::new(FixedSimilarity::default()),
            prices: Box::new(ListPriceSource::default()),
        }
    }

    pub fn with_similarity(mut self, similarity: Box<dyn SimilarityMetric>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_price_source(mut self, prices: Box<dyn PriceSource>) -> Self {
        self.prices = prices;
        self
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn similarity_metric(&self) -> &str {
        self.similarity.name()
    }

    /// Products avoiding every name in `flagged`, best first.
    pub fn recommend_products<S: AsRef<str>>(
        &self,
        flagged: &[S],
        filters: &RecommendationFilters,
        max_results: usize,
    ) -> Vec<RecommendedProduct> {
        self.recommend(&RecommendationRequest {
            flagged: flagged.iter().map(|name| IngredientToken::new(name.as_ref())).collect(),
            filters: filters.clone(),
            max_results,
            reference: Vec::new(),
        })
    }

    pub fn recommend(&self, request: &RecommendationRequest) -> Vec<RecommendedProduct> {
        let flagged: HashSet<IngredientToken> = request.flagged.iter().cloned().collect();

        let mut ranked: Vec<RecommendedProduct> = self
            .catalog
            .products()
            .iter()
            .filter(|product| !product.contains_any(&flagged))
            .filter(|product| request.filters.matches(product))
            .map(|product| RecommendedProduct {
                substitute_score: substitute_score(product),
                similarity_score: self.similarity.similarity(product, &request.reference),
                health_boost: product.health_score - HEALTH_BASELINE,
                product: product.clone(),
            })
            .collect();
        let candidate_count = ranked.len();

        ranked.sort_by(|left, right| right.substitute_score.total_cmp(&left.substitute_score));
        ranked.truncate(request.max_results);

        debug!(
            event_name = "recommender.computed",
            flagged_count = flagged.len(),
            candidate_count,
            result_count = ranked.len(),
            similarity = self.similarity.name(),
            "substitute products ranked"
        );
        ranked
    }

    pub fn price_comparison(&self, product_id: &ProductId) -> Result<PriceComparison, DomainError> {
        let product = self.catalog.find(product_id)?;
        Ok(self.prices.compare(product))
    }
}
