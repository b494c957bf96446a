//! Substitute ingredient matching

use std::sync::Arc;

use tracing::debug;

use crate::domain::ingredient::{IngredientToken, ScoredIngredient};
use crate::domain::substitute::SubstituteCandidate;
use crate::knowledge::SubstituteKnowledgeBase;
use crate::scoring::{FlaggingMode, IngredientScorer};

/// Looks up stored replacements for flagged ingredients.
#[derive(Clone, Debug)]
pub struct SubstituteMatcher {
    scorer: IngredientScorer,
    substitutes: Arc<SubstituteKnowledgeBase>,
}

impl SubstituteMatcher {
    pub fn new(scorer: IngredientScorer, substitutes: Arc<SubstituteKnowledgeBase>) -> Self {
        Self { scorer, substitutes }
    }

    /// Scores `ingredients` and returns candidates for the flagged ones.
    ///
    /// At most `max_suggestions` candidates are taken per flagged ingredient,
    /// in stored order. Output is grouped by ingredient in input order.
    pub fn find_substitutes<S: AsRef<str>>(
        &self,
        ingredients: &[S],
        max_suggestions: usize,
    ) -> Vec<SubstituteCandidate> {
        let scored: Vec<ScoredIngredient> = ingredients
            .iter()
            .map(|name| self.scorer.score_ingredient(&IngredientToken::new(name.as_ref())))
            .collect();
        self.substitutes_for(&scored, max_suggestions)
    }

    /// Candidates for already-scored ingredients. Beneficial and neutral
    /// ingredients never receive any.
    pub fn substitutes_for(
        &self,
        scored: &[ScoredIngredient],
        max_suggestions: usize,
    ) -> Vec<SubstituteCandidate> {
        let mut candidates = Vec::new();
        for ingredient in scored {
            if !FlaggingMode::CategoryBand.is_flagged(ingredient) {
                continue;
            }

            let stored = self.substitutes.candidates_for(&ingredient.ingredient);
            if stored.is_empty() {
                debug!(
                    event_name = "substitutes.no_entry",
                    ingredient = %ingredient.ingredient,
                    "flagged ingredient has no stored substitutes"
                );
                continue;
            }

            candidates.extend(
                stored
                    .iter()
                    .take(max_suggestions)
                    .map(|entry| SubstituteCandidate::from_entry(ingredient.ingredient.clone(), entry)),
            );
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::HealthKnowledgeBase;

    fn matcher() -> SubstituteMatcher {
        let health = Arc::new(HealthKnowledgeBase::builtin().expect("health table"));
        let substitutes = Arc::new(SubstituteKnowledgeBase::builtin().expect("substitute table"));
        SubstituteMatcher::new(IngredientScorer::new(health), substitutes)
    }

    #[test]
    fn methylparaben_candidates_are_ranked() {
        let candidates = matcher().find_substitutes(&["methylparaben"], 5);

        assert!(!candidates.is_empty());
        assert!(candidates
            .windows(2)
            .all(|pair| pair[0].substitute_score >= pair[1].substitute_score));
        assert_eq!(candidates[0].substitute_name, "leucidal liquid");
        assert_eq!(candidates[0].original_ingredient.as_str(), "methylparaben");
        assert_eq!(candidates[0].functional_role, "preservative");
    }

    #[test]
    fn safe_ingredients_get_no_candidates() {
        assert!(matcher().find_substitutes(&["aqua", "glycerin", "snail mucin"], 5).is_empty());
    }

    #[test]
    fn flagged_ingredient_without_entry_contributes_nothing() {
        let candidates = matcher().find_substitutes(&["phenoxyethanol", "parfum"], 5);
        assert!(candidates.iter().all(|candidate| candidate.original_ingredient.as_str() == "parfum"));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn groups_follow_input_order_and_cap_applies_per_ingredient() {
        let candidates =
            matcher().find_substitutes(&["Sodium Lauryl Sulfate", "aqua", "parfum", "methylparaben"], 1);

        let pairs: Vec<(&str, &str)> = candidates
            .iter()
            .map(|candidate| {
                (candidate.original_ingredient.as_str(), candidate.substitute_name.as_str())
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("sodium lauryl sulfate", "decyl glucoside"),
                ("parfum", "fragrance-free"),
                ("methylparaben", "leucidal liquid"),
            ]
        );
    }

    #[test]
    fn zero_cap_returns_nothing() {
        assert!(matcher().find_substitutes(&["parfum"], 0).is_empty());
    }
}
