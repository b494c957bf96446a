use serde::{Deserialize, Serialize};

use crate::domain::{ingredient::IngredientToken, product::ProductId};
use crate::errors::DomainError;

/// One stored replacement option for a flagged ingredient.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubstituteEntry {
    name: String,
    score: f64,
    role: String,
    confidence: f64,
}

impl SubstituteEntry {
    pub fn new(
        name: impl Into<String>,
        score: f64,
        role: impl Into<String>,
        confidence: f64,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvariantViolation(
                "substitute name must not be empty".to_owned(),
            ));
        }
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(DomainError::InvariantViolation(format!(
                "substitute `{name}` score must be within 0..=100, got {score}"
            )));
        }
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(DomainError::InvariantViolation(format!(
                "substitute `{name}` confidence must be within 0..=1, got {confidence}"
            )));
        }

        Ok(Self { name: name.trim().to_lowercase(), score, role: role.into(), confidence })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubstituteCandidate {
    pub original_ingredient: IngredientToken,
    pub substitute_name: String,
    pub substitute_score: f64,
    pub functional_role: String,
    pub confidence: f64,
}

impl SubstituteCandidate {
    pub fn from_entry(original_ingredient: IngredientToken, entry: &SubstituteEntry) -> Self {
        Self {
            original_ingredient,
            substitute_name: entry.name.clone(),
            substitute_score: entry.score,
            functional_role: entry.role.clone(),
            confidence: entry.confidence,
        }
    }
}

/// An alternative ingredient together with the catalog products that already use it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientAlternative {
    pub alternative: String,
    pub score: f64,
    pub reason: String,
    pub products_using: Vec<ProductId>,
}

#[cfg(test)]
mod tests {
    use super::SubstituteEntry;

    #[test]
    fn entry_normalizes_name() {
        let entry = SubstituteEntry::new(" Decyl Glucoside ", 82.0, "surfactant", 0.85).expect("valid");
        assert_eq!(entry.name(), "decyl glucoside");
    }

    #[test]
    fn entry_rejects_confidence_outside_unit_interval() {
        assert!(SubstituteEntry::new("sodium benzoate", 65.0, "preservative", 1.2).is_err());
        assert!(SubstituteEntry::new("sodium benzoate", 165.0, "preservative", 0.8).is_err());
        assert!(SubstituteEntry::new("  ", 65.0, "preservative", 0.8).is_err());
    }
}
