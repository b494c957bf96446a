use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Score given to ingredients the health table does not know.
pub const UNKNOWN_INGREDIENT_SCORE: f64 = 60.0;
pub const UNKNOWN_INGREDIENT_REASON: &str = "Limited data available";

/// Canonical ingredient name: trimmed and lower-cased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct IngredientToken(String);

impl IngredientToken {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for IngredientToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IngredientToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IngredientToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for IngredientToken {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<IngredientToken> for String {
    fn from(value: IngredientToken) -> Self {
        value.0
    }
}

/// Health band of a single ingredient score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCategory {
    Beneficial,
    Neutral,
    Concerning,
    Avoid,
}

impl HealthCategory {
    /// `>= 76` beneficial, `[51, 76)` neutral, `[26, 51)` concerning, below 26 avoid.
    pub fn from_score(score: f64) -> Self {
        if score >= 76.0 {
            Self::Beneficial
        } else if score >= 51.0 {
            Self::Neutral
        } else if score >= 26.0 {
            Self::Concerning
        } else {
            Self::Avoid
        }
    }

    pub fn is_flagged(self) -> bool {
        matches!(self, Self::Concerning | Self::Avoid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beneficial => "beneficial",
            Self::Neutral => "neutral",
            Self::Concerning => "concerning",
            Self::Avoid => "avoid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beneficial" => Some(Self::Beneficial),
            "neutral" => Some(Self::Neutral),
            "concerning" => Some(Self::Concerning),
            "avoid" => Some(Self::Avoid),
            _ => None,
        }
    }
}

/// Human-readable verdict for an aggregate product score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpretation {
    #[serde(rename = "Healthy / Preferred")]
    HealthyPreferred,
    #[serde(rename = "Generally Okay")]
    GenerallyOkay,
    #[serde(rename = "Use with Caution")]
    UseWithCaution,
    #[serde(rename = "Avoid")]
    Avoid,
}

impl Interpretation {
    pub fn from_score(score: f64) -> Self {
        match HealthCategory::from_score(score) {
            HealthCategory::Beneficial => Self::HealthyPreferred,
            HealthCategory::Neutral => Self::GenerallyOkay,
            HealthCategory::Concerning => Self::UseWithCaution,
            HealthCategory::Avoid => Self::Avoid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::HealthyPreferred => "Healthy / Preferred",
            Self::GenerallyOkay => "Generally Okay",
            Self::UseWithCaution => "Use with Caution",
            Self::Avoid => "Avoid",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Knowledge-base entry for one canonical ingredient.
///
/// The category is always derived from the score, so a record can never
/// disagree with its own score band.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthRecord {
    ingredient: IngredientToken,
    score: f64,
    reason: String,
    category: HealthCategory,
}

impl HealthRecord {
    pub fn new(
        ingredient: IngredientToken,
        score: f64,
        reason: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(DomainError::InvariantViolation(format!(
                "health score for `{ingredient}` must be within 0..=100, got {score}"
            )));
        }

        Ok(Self { category: HealthCategory::from_score(score), ingredient, score, reason: reason.into() })
    }

    /// Default record synthesized for an ingredient with no data.
    pub fn unknown(ingredient: IngredientToken) -> Self {
        Self {
            ingredient,
            score: UNKNOWN_INGREDIENT_SCORE,
            reason: UNKNOWN_INGREDIENT_REASON.to_owned(),
            category: HealthCategory::from_score(UNKNOWN_INGREDIENT_SCORE),
        }
    }

    pub fn ingredient(&self) -> &IngredientToken {
        &self.ingredient
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn category(&self) -> HealthCategory {
        self.category
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredIngredient {
    pub ingredient: IngredientToken,
    pub score: f64,
    pub reason: String,
    pub category: HealthCategory,
}

impl From<&HealthRecord> for ScoredIngredient {
    fn from(record: &HealthRecord) -> Self {
        Self {
            ingredient: record.ingredient.clone(),
            score: record.score,
            reason: record.reason.clone(),
            category: record.category,
        }
    }
}

impl From<HealthRecord> for ScoredIngredient {
    fn from(record: HealthRecord) -> Self {
        Self {
            ingredient: record.ingredient,
            score: record.score,
            reason: record.reason,
            category: record.category,
        }
    }
}

/// Position-weighted analysis of a whole ingredient list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductAnalysis {
    pub ingredients: Vec<ScoredIngredient>,
    pub product_score: f64,
    pub flagged_count: usize,
    pub interpretation: Interpretation,
}

/// Lower-fidelity analysis: unweighted integer mean and a raw score cutoff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuickAnalysis {
    pub ingredients: Vec<ScoredIngredient>,
    pub product_score: u32,
    pub flagged_ingredients: Vec<ScoredIngredient>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_trimmed_and_lowercased() {
        let token = IngredientToken::new("  Sodium Lauryl SULFATE \n");
        assert_eq!(token.as_str(), "sodium lauryl sulfate");
    }

    #[test]
    fn token_deserializes_through_normalization() {
        let token: IngredientToken = serde_json::from_str("\" Aqua \"").expect("token");
        assert_eq!(token.as_str(), "aqua");
    }

    #[test]
    fn category_bands_match_thresholds() {
        assert_eq!(HealthCategory::from_score(100.0), HealthCategory::Beneficial);
        assert_eq!(HealthCategory::from_score(76.0), HealthCategory::Beneficial);
        assert_eq!(HealthCategory::from_score(75.9), HealthCategory::Neutral);
        assert_eq!(HealthCategory::from_score(51.0), HealthCategory::Neutral);
        assert_eq!(HealthCategory::from_score(50.9), HealthCategory::Concerning);
        assert_eq!(HealthCategory::from_score(26.0), HealthCategory::Concerning);
        assert_eq!(HealthCategory::from_score(25.9), HealthCategory::Avoid);
        assert_eq!(HealthCategory::from_score(0.0), HealthCategory::Avoid);
    }

    #[test]
    fn classification_is_monotonic_over_the_score_range() {
        let mut previous = HealthCategory::from_score(0.0);
        for step in 0..=1000 {
            let score = f64::from(step) / 10.0;
            let current = HealthCategory::from_score(score);
            // Enum order runs Beneficial < ... < Avoid, so a rising score never moves down it.
            assert!(current <= previous, "category regressed at {score}");
            previous = current;
        }
        assert_eq!(previous, HealthCategory::Beneficial);
    }

    #[test]
    fn interpretation_mirrors_category_bands() {
        assert_eq!(Interpretation::from_score(80.0).label(), "Healthy / Preferred");
        assert_eq!(Interpretation::from_score(60.0).label(), "Generally Okay");
        assert_eq!(Interpretation::from_score(30.0).label(), "Use with Caution");
        assert_eq!(Interpretation::from_score(10.0).label(), "Avoid");
        assert_eq!(
            serde_json::to_string(&Interpretation::UseWithCaution).expect("serialize"),
            "\"Use with Caution\""
        );
    }

    #[test]
    fn record_category_follows_score() {
        let record = HealthRecord::new("xanthan gum".into(), 80.0, "Natural thickener").expect("valid");
        assert_eq!(record.category(), HealthCategory::Beneficial);
    }

    #[test]
    fn record_rejects_out_of_range_scores() {
        assert!(HealthRecord::new("aqua".into(), 101.0, "").is_err());
        assert!(HealthRecord::new("aqua".into(), -1.0, "").is_err());
        assert!(HealthRecord::new("aqua".into(), f64::NAN, "").is_err());
    }

    #[test]
    fn unknown_record_is_neutral_sixty() {
        let record = HealthRecord::unknown("mystery extract".into());
        assert_eq!(record.score(), 60.0);
        assert_eq!(record.category(), HealthCategory::Neutral);
        assert_eq!(record.reason(), "Limited data available");
    }
}
