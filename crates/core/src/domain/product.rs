use std::collections::{BTreeSet, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ingredient::IngredientToken;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    LowStock,
    OutOfStock,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub brand: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub skin_type: BTreeSet<String>,
    #[serde(default)]
    pub concerns: BTreeSet<String>,
    pub ingredients: Vec<IngredientToken>,
    pub health_score: f64,
    #[serde(default)]
    pub price_range: String,
    pub average_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image_url: String,
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    pub availability: Availability,
}

fn default_currency() -> String {
    "USD".to_owned()
}

impl Product {
    /// True when any listed ingredient is in `flagged` (tokens compare case-insensitively).
    pub fn contains_any(&self, flagged: &HashSet<IngredientToken>) -> bool {
        self.ingredients.iter().any(|ingredient| flagged.contains(ingredient))
    }

    pub fn contains(&self, ingredient: &IngredientToken) -> bool {
        self.ingredients.iter().any(|candidate| candidate == ingredient)
    }
}

/// A catalog product with the diagnostics computed for one recommendation call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub substitute_score: f64,
    pub similarity_score: f64,
    pub health_boost: f64,
}
