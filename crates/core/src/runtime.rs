use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{AppConfig, SimilarityKind};
use crate::domain::ingredient::{IngredientToken, ProductAnalysis, QuickAnalysis};
use crate::domain::product::{Product, ProductId, RecommendedProduct};
use crate::domain::substitute::{IngredientAlternative, SubstituteCandidate};
use crate::errors::{ApplicationError, DomainError};
use crate::knowledge::{HealthKnowledgeBase, SubstituteKnowledgeBase, TableSource};
use crate::matcher::SubstituteMatcher;
use crate::normalizer::{NormalizedIngredients, NormalizerSettings, TextNormalizer};
use crate::recommender::{
    catalog::ProductCatalog,
    pricing::PriceComparison,
    similarity::{FixedSimilarity, IngredientOverlapSimilarity, SimilarityMetric},
    ProductRecommender, RecommendationFilters, RecommendationRequest,
};
use crate::scoring::{flagged_ingredients, FlaggingMode, IngredientScorer};

/// Caller choices for a full scan. Unset limits fall back to configured defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub max_suggestions: Option<usize>,
    pub max_results: Option<usize>,
    #[serde(default)]
    pub filters: RecommendationFilters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub normalized: NormalizedIngredients,
    pub analysis: ProductAnalysis,
    pub substitutes: Vec<SubstituteCandidate>,
    pub recommendations: Vec<RecommendedProduct>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableStatus {
    pub source: TableSource,
    pub entries: usize,
}

/// Where each loaded table came from, for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuntimeStatus {
    pub health: TableStatus,
    pub substitutes: TableStatus,
    pub catalog: TableStatus,
    pub similarity: String,
}

/// Every pipeline component built from one configuration. Read-only after
/// construction and safe to share across threads.
pub struct BottleScanRuntime {
    normalizer: TextNormalizer,
    scorer: IngredientScorer,
    matcher: SubstituteMatcher,
    recommender: ProductRecommender,
    substitutes: Arc<SubstituteKnowledgeBase>,
    default_max_suggestions: usize,
    default_max_results: usize,
}

impl BottleScanRuntime {
    pub fn from_config(config: &AppConfig) -> Result<Self, ApplicationError> {
        let health = Arc::new(HealthKnowledgeBase::load(&config.knowledge.health_db_path)?);
        let substitutes =
            Arc::new(SubstituteKnowledgeBase::load(&config.knowledge.substitute_db_path)?);
        let catalog = Arc::new(ProductCatalog::load(&config.knowledge.catalog_path)?);

        let runtime = Self::assemble(config, health, substitutes, catalog)?;
        info!(
            event_name = "runtime.ready",
            similarity = runtime.recommender.similarity_metric(),
            "bottlescan runtime assembled"
        );
        Ok(runtime)
    }

    /// Runtime over the built-in tables with default settings.
    pub fn builtin() -> Result<Self, ApplicationError> {
        Self::assemble(
            &AppConfig::default(),
            Arc::new(HealthKnowledgeBase::builtin()?),
            Arc::new(SubstituteKnowledgeBase::builtin()?),
            Arc::new(ProductCatalog::builtin()?),
        )
    }

    pub fn assemble(
        config: &AppConfig,
        health: Arc<HealthKnowledgeBase>,
        substitutes: Arc<SubstituteKnowledgeBase>,
        catalog: Arc<ProductCatalog>,
    ) -> Result<Self, ApplicationError> {
        let normalizer = TextNormalizer::new(NormalizerSettings::from(&config.normalizer))?;
        let scorer = IngredientScorer::new(health)
            .with_quick_flag_threshold(config.scoring.quick_flag_threshold);
        let matcher = SubstituteMatcher::new(scorer.clone(), Arc::clone(&substitutes));

        let similarity: Box<dyn SimilarityMetric> = match config.recommender.similarity {
            SimilarityKind::Fixed => {
                Box::new(FixedSimilarity::new(config.recommender.fixed_similarity))
            }
            SimilarityKind::IngredientOverlap => Box::new(IngredientOverlapSimilarity),
        };
        let recommender = ProductRecommender::new(catalog).with_similarity(similarity);

        Ok(Self {
            normalizer,
            scorer,
            matcher,
            recommender,
            substitutes,
            default_max_suggestions: config.substitutes.default_max_suggestions,
            default_max_results: config.recommender.default_max_results,
        })
    }

    pub fn normalize(&self, raw_text: &str) -> NormalizedIngredients {
        self.normalizer.normalize(raw_text)
    }

    pub fn normalize_bytes(&self, raw: &[u8]) -> Result<NormalizedIngredients, ApplicationError> {
        Ok(self.normalizer.normalize_bytes(raw)?)
    }

    pub fn score_product<S: AsRef<str>>(&self, ingredients: &[S]) -> ProductAnalysis {
        self.scorer.score_product(ingredients)
    }

    pub fn quick_analysis<S: AsRef<str>>(&self, ingredients: &[S]) -> QuickAnalysis {
        self.scorer.quick_analysis(ingredients)
    }

    pub fn find_substitutes<S: AsRef<str>>(
        &self,
        ingredients: &[S],
        max_suggestions: Option<usize>,
    ) -> Vec<SubstituteCandidate> {
        self.matcher
            .find_substitutes(ingredients, max_suggestions.unwrap_or(self.default_max_suggestions))
    }

    pub fn recommend_products<S: AsRef<str>>(
        &self,
        flagged: &[S],
        filters: &RecommendationFilters,
        max_results: Option<usize>,
    ) -> Vec<RecommendedProduct> {
        self.recommender.recommend_products(
            flagged,
            filters,
            max_results.unwrap_or(self.default_max_results),
        )
    }

    pub fn products(&self) -> &[Product] {
        self.recommender.catalog().products()
    }

    pub fn price_comparison(&self, product_id: &str) -> Result<PriceComparison, ApplicationError> {
        let product_id = product_id.trim();
        if product_id.is_empty() {
            return Err(DomainError::Input("product id must not be empty".to_owned()).into());
        }
        Ok(self.recommender.price_comparison(&ProductId(product_id.to_owned()))?)
    }

    /// Stored alternatives for `ingredient`, each with the catalog products
    /// that already use it.
    pub fn ingredient_alternatives(&self, ingredient: &str) -> Vec<IngredientAlternative> {
        let token = IngredientToken::new(ingredient);
        let catalog = self.recommender.catalog();

        self.substitutes
            .candidates_for(&token)
            .iter()
            .map(|entry| {
                let alternative = IngredientToken::new(entry.name());
                let reason = self
                    .scorer
                    .knowledge()
                    .get(&alternative)
                    .map(|record| record.reason().to_owned())
                    .unwrap_or_else(|| format!("Replaces {token} as {}", entry.role()));

                IngredientAlternative {
                    products_using: catalog.products_using(&alternative),
                    alternative: alternative.into_inner(),
                    score: entry.score(),
                    reason,
                }
            })
            .collect()
    }

    /// Normalize, score, then match substitutes and products for the flagged subset.
    pub fn analyze_text(&self, raw_text: &str, options: &ScanOptions) -> ScanReport {
        let normalized = self.normalizer.normalize(raw_text);
        let analysis = self.scorer.score_tokens(&normalized.ingredients);
        let flagged = flagged_ingredients(&analysis.ingredients, FlaggingMode::CategoryBand);

        let substitutes = self.matcher.substitutes_for(
            &flagged,
            options.max_suggestions.unwrap_or(self.default_max_suggestions),
        );
        let recommendations = self.recommender.recommend(&RecommendationRequest {
            flagged: flagged.iter().map(|ingredient| ingredient.ingredient.clone()).collect(),
            filters: options.filters.clone(),
            max_results: options.max_results.unwrap_or(self.default_max_results),
            reference: normalized.ingredients.clone(),
        });

        info!(
            event_name = "scan.completed",
            used_fallback = normalized.used_fallback,
            ingredient_count = normalized.ingredients.len(),
            flagged_count = analysis.flagged_count,
            product_score = analysis.product_score,
            substitute_count = substitutes.len(),
            recommendation_count = recommendations.len(),
            "label scan analyzed"
        );

        ScanReport { normalized, analysis, substitutes, recommendations }
    }

    pub fn status(&self) -> RuntimeStatus {
        let health = self.scorer.knowledge();
        let catalog = self.recommender.catalog();
        RuntimeStatus {
            health: TableStatus { source: health.source(), entries: health.len() },
            substitutes: TableStatus {
                source: self.substitutes.source(),
                entries: self.substitutes.len(),
            },
            catalog: TableStatus { source: catalog.source(), entries: catalog.len() },
            similarity: self.recommender.similarity_metric().to_owned(),
        }
    }
}
