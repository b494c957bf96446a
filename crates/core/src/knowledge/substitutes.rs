use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::fallback::SUBSTITUTE_SEEDS;
use super::{parse_error, read_table, TableSource};
use crate::domain::ingredient::IngredientToken;
use crate::domain::substitute::SubstituteEntry;
use crate::errors::{ApplicationError, DomainError};

#[derive(Debug, Deserialize)]
struct StoredSubstitute {
    #[serde(alias = "substitute_name")]
    name: String,
    #[serde(alias = "substitute_score")]
    score: f64,
    #[serde(default, alias = "functional_role")]
    role: String,
    confidence: f64,
}

/// Canonical ingredient name to its replacement options, best first.
#[derive(Clone, Debug)]
pub struct SubstituteKnowledgeBase {
    entries: HashMap<IngredientToken, Vec<SubstituteEntry>>,
    source: TableSource,
}

impl SubstituteKnowledgeBase {
    /// Builds the table, ordering every list by descending score.
    ///
    /// The sort is stable, so equal scores keep their stored order.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (IngredientToken, Vec<SubstituteEntry>)>,
        source: TableSource,
    ) -> Self {
        let entries = entries
            .into_iter()
            .map(|(ingredient, mut candidates)| {
                candidates.sort_by(|left, right| right.score().total_cmp(&left.score()));
                (ingredient, candidates)
            })
            .collect();
        Self { entries, source }
    }

    pub fn builtin() -> Result<Self, ApplicationError> {
        let mut entries = Vec::with_capacity(SUBSTITUTE_SEEDS.len());
        for (ingredient, seeds) in SUBSTITUTE_SEEDS {
            let candidates = seeds
                .iter()
                .map(|seed| SubstituteEntry::new(seed.name, seed.score, seed.role, seed.confidence))
                .collect::<Result<Vec<_>, DomainError>>()?;
            entries.push((IngredientToken::new(ingredient), candidates));
        }
        Ok(Self::from_entries(entries, TableSource::Fallback))
    }

    /// Loads `path`, or the built-in table when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        let knowledge = match read_table(path)? {
            Some(contents) => {
                let stored: BTreeMap<String, Vec<StoredSubstitute>> =
                    serde_json::from_str(&contents).map_err(|error| parse_error(path, error))?;
                Self::from_stored(stored).map_err(|error| {
                    ApplicationError::Configuration(format!(
                        "knowledge table `{}`: {error}",
                        path.display()
                    ))
                })?
            }
            None => Self::builtin()?,
        };

        info!(
            event_name = "knowledge.substitutes.loaded",
            source = knowledge.source.as_str(),
            path = %path.display(),
            ingredient_count = knowledge.len(),
            "substitute knowledge base loaded"
        );
        Ok(knowledge)
    }

    fn from_stored(stored: BTreeMap<String, Vec<StoredSubstitute>>) -> Result<Self, DomainError> {
        let mut entries = Vec::with_capacity(stored.len());
        for (ingredient, candidates) in stored {
            let candidates = candidates
                .into_iter()
                .map(|stored| {
                    SubstituteEntry::new(stored.name, stored.score, stored.role, stored.confidence)
                })
                .collect::<Result<Vec<_>, _>>()?;
            entries.push((IngredientToken::new(&ingredient), candidates));
        }
        Ok(Self::from_entries(entries, TableSource::File))
    }

    /// Stored candidates for `ingredient`; empty when it has no entry.
    pub fn candidates_for(&self, ingredient: &IngredientToken) -> &[SubstituteEntry] {
        self.entries.get(ingredient).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn source(&self) -> TableSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
