//! Derives a health table from a corpus of product ingredient lists.
//!
//! Every ingredient starts from a neutral base, gains points for how many
//! products use it, loses points for a known-harmful term and gains points for
//! a known-beneficial one.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{HealthKnowledgeBase, TableSource};
use crate::domain::ingredient::{HealthCategory, HealthRecord, IngredientToken};
use crate::errors::ApplicationError;

const BASE_SCORE: f64 = 60.0;
const MAX_FREQUENCY_POINTS: f64 = 35.0;
const HARM_PENALTY: f64 = 40.0;
const BENEFIT_BOOST: f64 = 15.0;

/// Terms that mark an ingredient as harmful when contained in its name.
pub const HARM_TERMS: &[&str] = &[
    "methylparaben",
    "propylparaben",
    "butylparaben",
    "ethylparaben",
    "sodium lauryl sulfate",
    "sodium laureth sulfate",
    "sls",
    "sles",
    "parfum",
    "fragrance",
    "synthetic fragrance",
    "alcohol denat",
    "isopropyl alcohol",
    "sd alcohol",
    "dmdm hydantoin",
    "imidazolidinyl urea",
    "quaternium-15",
    "triclosan",
    "triclocarban",
    "toluene",
    "coal tar",
];

pub const BENEFIT_TERMS: &[&str] = &[
    "niacinamide",
    "hyaluronic acid",
    "sodium hyaluronate",
    "glycerin",
    "tocopherol",
    "tocopheryl acetate",
    "ascorbic acid",
    "retinol",
    "retinyl palmitate",
    "ceramide",
    "peptide",
    "allantoin",
    "panthenol",
    "beta glucan",
    "centella asiatica",
    "aloe vera",
    "squalane",
    "alpha arbutin",
    "kojic acid",
    "azelaic acid",
    "salicylic acid",
    "lactic acid",
    "mandelic acid",
    "ferulic acid",
    "resveratrol",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuiltHealthEntry {
    pub ingredient: String,
    pub health_score: f64,
    pub frequency_score: f64,
    pub harm_penalty: f64,
    pub benefit_boost: f64,
    pub category: HealthCategory,
    pub reason: String,
}

/// Output of [`HealthDatabaseBuilder::build`], serialized as the flat
/// ingredient-keyed mapping the knowledge base loads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuiltHealthTable {
    pub entries: BTreeMap<String, BuiltHealthEntry>,
}

impl BuiltHealthTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, ApplicationError> {
        serde_json::to_string_pretty(self).map_err(|error| {
            ApplicationError::Configuration(format!("failed to serialize health table: {error}"))
        })
    }

    pub fn to_knowledge_base(&self) -> Result<HealthKnowledgeBase, ApplicationError> {
        let records = self
            .entries
            .values()
            .map(|entry| {
                HealthRecord::new(
                    IngredientToken::new(&entry.ingredient),
                    entry.health_score,
                    entry.reason.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HealthKnowledgeBase::from_records(records, TableSource::File))
    }
}

pub struct HealthDatabaseBuilder {
    harm_terms: Vec<String>,
    benefit_terms: Vec<String>,
    quoted_item: Regex,
    delimiter: Regex,
    parenthetical: Regex,
    product_count: usize,
    occurrences: HashMap<String, usize>,
}

impl HealthDatabaseBuilder {
    pub fn new() -> Result<Self, ApplicationError> {
        Self::with_terms(HARM_TERMS, BENEFIT_TERMS)
    }

    pub fn with_terms(harm_terms: &[&str], benefit_terms: &[&str]) -> Result<Self, ApplicationError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|error| {
                ApplicationError::Configuration(format!("builder pattern failed to compile: {error}"))
            })
        };

        Ok(Self {
            harm_terms: harm_terms.iter().map(|term| term.to_lowercase()).collect(),
            benefit_terms: benefit_terms.iter().map(|term| term.to_lowercase()).collect(),
            quoted_item: compile(r#"'([^']*)'|"([^"]*)""#)?,
            delimiter: compile(r"[,;]")?,
            parenthetical: compile(r"\([^)]*\)|\[[^\]]*\]")?,
            product_count: 0,
            occurrences: HashMap::new(),
        })
    }

    /// Splits one corpus line into ingredient names.
    ///
    /// Accepts a list literal such as `['aqua', 'glycerin']` or a plain
    /// comma/semicolon separated list. Names of two characters or fewer are
    /// dropped.
    pub fn parse_line(&self, line: &str) -> Vec<String> {
        let line = line.trim();
        if line.starts_with("['") && line.ends_with("']") {
            return self
                .quoted_item
                .captures_iter(line)
                .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
                .map(|item| item.as_str().trim().to_lowercase())
                .filter(|item| item.chars().count() > 2)
                .collect();
        }

        self.delimiter
            .split(line)
            .map(|item| self.parenthetical.replace_all(item, "").trim().to_lowercase())
            .filter(|item| item.chars().count() > 2)
            .collect()
    }

    /// Counts one product. Repeated names within a product count once.
    pub fn add_product<I, S>(&mut self, ingredients: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.product_count += 1;
        let unique: HashSet<String> =
            ingredients.into_iter().map(|name| name.as_ref().trim().to_lowercase()).collect();
        for name in unique.into_iter().filter(|name| !name.is_empty()) {
            *self.occurrences.entry(name).or_default() += 1;
        }
    }

    /// Adds every non-blank line of `corpus` as one product.
    pub fn ingest_corpus(&mut self, corpus: &str) -> usize {
        let mut added = 0;
        for line in corpus.lines().filter(|line| !line.trim().is_empty()) {
            let ingredients = self.parse_line(line);
            self.add_product(ingredients);
            added += 1;
        }
        added
    }

    pub fn product_count(&self) -> usize {
        self.product_count
    }

    pub fn build(&self) -> BuiltHealthTable {
        let mut entries = BTreeMap::new();
        for (ingredient, count) in &self.occurrences {
            let frequency = if self.product_count == 0 {
                0.0
            } else {
                *count as f64 / self.product_count as f64
            };
            entries.insert(ingredient.clone(), self.score_ingredient(ingredient, frequency));
        }

        info!(
            event_name = "knowledge.builder.completed",
            product_count = self.product_count,
            ingredient_count = entries.len(),
            "health table built from corpus"
        );
        BuiltHealthTable { entries }
    }

    pub fn score_ingredient(&self, ingredient: &str, frequency: f64) -> BuiltHealthEntry {
        let lowered = ingredient.to_lowercase();
        let harm = self.harm_terms.iter().find(|term| lowered.contains(term.as_str()));
        let benefit = self.benefit_terms.iter().find(|term| lowered.contains(term.as_str()));

        let harm_penalty = if harm.is_some() { HARM_PENALTY } else { 0.0 };
        let benefit_boost = if benefit.is_some() { BENEFIT_BOOST } else { 0.0 };
        let frequency_points = (frequency * MAX_FREQUENCY_POINTS).min(MAX_FREQUENCY_POINTS);
        let raw = BASE_SCORE + frequency_points - harm_penalty + benefit_boost;
        let health_score = round_to(raw.clamp(0.0, 100.0), 1);

        let mut reasons: Vec<String> = harm
            .into_iter()
            .chain(benefit)
            .map(|term| format!("Contains {term}"))
            .collect();
        if frequency > 0.5 {
            reasons.push("Very common in clean products".to_owned());
        } else if frequency > 0.2 {
            reasons.push("Common in skincare".to_owned());
        }
        let reason =
            if reasons.is_empty() { "Standard ingredient".to_owned() } else { reasons.join("; ") };

        BuiltHealthEntry {
            ingredient: ingredient.to_owned(),
            health_score,
            frequency_score: round_to(frequency, 4),
            harm_penalty,
            benefit_boost,
            category: HealthCategory::from_score(health_score),
            reason,
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> HealthDatabaseBuilder {
        HealthDatabaseBuilder::new().expect("builder")
    }

    #[test]
    fn parses_list_literal_lines() {
        let parsed = builder().parse_line("['Aqua', 'Glycerin', 'Mica', 'CI 77891']");
        assert_eq!(parsed, vec!["aqua", "glycerin", "mica", "ci 77891"]);
    }

    #[test]
    fn parses_delimited_lines_and_strips_parentheticals() {
        let parsed = builder().parse_line("Aqua (Water); Glycerin, Tocopherol [Vitamin E], Zn");
        assert_eq!(parsed, vec!["aqua", "glycerin", "tocopherol"]);
    }

    #[test]
    fn harmful_term_costs_forty_points() {
        let entry = builder().score_ingredient("methylparaben", 0.0);
        assert_eq!(entry.health_score, 20.0);
        assert_eq!(entry.harm_penalty, 40.0);
        assert_eq!(entry.category, HealthCategory::Avoid);
        assert_eq!(entry.reason, "Contains methylparaben");
    }

    #[test]
    fn frequency_and_benefit_stack_up_to_the_cap() {
        let entry = builder().score_ingredient("glycerin", 0.8);
        // 60 + 28 + 15 = 103, clamped.
        assert_eq!(entry.health_score, 100.0);
        assert_eq!(entry.reason, "Contains glycerin; Very common in clean products");
        assert_eq!(entry.category, HealthCategory::Beneficial);
    }

    #[test]
    fn plain_ingredient_gets_standard_reason() {
        let entry = builder().score_ingredient("mica", 0.1);
        assert_eq!(entry.health_score, 63.5);
        assert_eq!(entry.reason, "Standard ingredient");
        assert_eq!(entry.frequency_score, 0.1);
    }

    #[test]
    fn corpus_frequency_counts_products_not_repeats() {
        let mut builder = builder();
        let added = builder.ingest_corpus(
            "aqua, glycerin, aqua\n\n['aqua', 'parfum']\naqua; mica; cetyl alcohol\nglycerin, mica\n",
        );
        assert_eq!(added, 4);

        let table = builder.build();
        assert_eq!(table.entries["aqua"].frequency_score, 0.75);
        assert_eq!(table.entries["aqua"].reason, "Very common in clean products");
        assert_eq!(table.entries["parfum"].frequency_score, 0.25);
        assert_eq!(table.entries["parfum"].health_score, 28.8);
        assert_eq!(table.entries["parfum"].reason, "Contains parfum; Common in skincare");
    }

    #[test]
    fn built_table_loads_as_knowledge_base() {
        let mut builder = builder();
        builder.ingest_corpus("aqua, glycerin\naqua, parfum");
        let table = builder.build();

        let json = table.to_json_pretty().expect("serialize");
        assert!(json.contains("\"health_score\""));

        let knowledge = table.to_knowledge_base().expect("knowledge base");
        assert_eq!(knowledge.len(), 3);
        let parfum = knowledge.get(&IngredientToken::new("parfum")).expect("parfum");
        assert!(parfum.category().is_flagged());
    }
}
