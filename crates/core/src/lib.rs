pub mod config;
pub mod domain;
pub mod errors;
pub mod knowledge;
pub mod matcher;
pub mod normalizer;
pub mod recommender;
pub mod runtime;
pub mod scoring;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, SimilarityKind};
pub use domain::ingredient::{
    HealthCategory, HealthRecord, IngredientToken, Interpretation, ProductAnalysis, QuickAnalysis,
    ScoredIngredient,
};
pub use domain::product::{Availability, Product, ProductId, RecommendedProduct};
pub use domain::substitute::{IngredientAlternative, SubstituteCandidate, SubstituteEntry};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use knowledge::{HealthDatabaseBuilder, HealthKnowledgeBase, SubstituteKnowledgeBase};
pub use matcher::SubstituteMatcher;
pub use normalizer::{FallbackReason, NormalizedIngredients, TextNormalizer};
pub use recommender::{ProductRecommender, RecommendationFilters};
pub use runtime::{BottleScanRuntime, ScanOptions, ScanReport};
pub use scoring::{FlaggingMode, IngredientScorer};
