use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::fallback::HEALTH_SEEDS;
use super::{parse_error, read_table, TableSource};
use crate::domain::ingredient::{HealthCategory, HealthRecord, IngredientToken};
use crate::errors::ApplicationError;

/// Stored shape of one health record. Extra keys written by the builder
/// (frequency, penalties) are ignored.
#[derive(Debug, Deserialize)]
struct StoredHealthRecord {
    #[serde(alias = "health_score")]
    score: f64,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    category: Option<String>,
}

/// Canonical ingredient name to health record.
#[derive(Clone, Debug)]
pub struct HealthKnowledgeBase {
    records: HashMap<IngredientToken, HealthRecord>,
    source: TableSource,
}

impl HealthKnowledgeBase {
    pub fn from_records(
        records: impl IntoIterator<Item = HealthRecord>,
        source: TableSource,
    ) -> Self {
        let records =
            records.into_iter().map(|record| (record.ingredient().clone(), record)).collect();
        Self { records, source }
    }

    /// The built-in table.
    pub fn builtin() -> Result<Self, ApplicationError> {
        let records = HEALTH_SEEDS
            .iter()
            .map(|seed| HealthRecord::new(IngredientToken::new(seed.ingredient), seed.score, seed.reason))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_records(records, TableSource::Fallback))
    }

    /// Loads `path`, or the built-in table when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        let knowledge = match read_table(path)? {
            Some(contents) => Self::from_json(&contents).map_err(|error| match error {
                ParseFailure::Json(error) => parse_error(path, error),
                ParseFailure::Invalid(message) => ApplicationError::Configuration(format!(
                    "knowledge table `{}`: {message}",
                    path.display()
                )),
            })?,
            None => Self::builtin()?,
        };

        info!(
            event_name = "knowledge.health.loaded",
            source = knowledge.source.as_str(),
            path = %path.display(),
            record_count = knowledge.len(),
            "health knowledge base loaded"
        );
        Ok(knowledge)
    }

    fn from_json(contents: &str) -> Result<Self, ParseFailure> {
        let stored: BTreeMap<String, StoredHealthRecord> =
            serde_json::from_str(contents).map_err(ParseFailure::Json)?;

        let mut records = Vec::with_capacity(stored.len());
        for (name, entry) in stored {
            let token = IngredientToken::new(&name);
            let record = HealthRecord::new(token, entry.score, entry.reason)
                .map_err(|error| ParseFailure::Invalid(error.to_string()))?;

            if let Some(stored_category) = entry.category.as_deref() {
                if HealthCategory::parse(stored_category) != Some(record.category()) {
                    warn!(
                        event_name = "knowledge.health.category_mismatch",
                        ingredient = %record.ingredient(),
                        stored_category,
                        derived_category = record.category().as_str(),
                        "stored category disagrees with score band; using the derived category"
                    );
                }
            }
            records.push(record);
        }

        Ok(Self::from_records(records, TableSource::File))
    }

    pub fn get(&self, ingredient: &IngredientToken) -> Option<&HealthRecord> {
        self.records.get(ingredient)
    }

    /// Record for `ingredient`, or the default neutral record when unknown.
    pub fn record_or_default(&self, ingredient: &IngredientToken) -> HealthRecord {
        self.get(ingredient).cloned().unwrap_or_else(|| HealthRecord::unknown(ingredient.clone()))
    }

    pub fn source(&self) -> TableSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

enum ParseFailure {
    Json(serde_json::Error),
    Invalid(String),
}
