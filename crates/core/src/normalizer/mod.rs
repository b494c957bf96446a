//! Label text normalization
//!
//! Turns raw recognized label text into an ordered, deduplicated list of
//! canonical ingredient tokens. Extraction that looks too noisy to trust is
//! replaced by a fixed placeholder list and reported through
//! [`NormalizedIngredients::used_fallback`].

pub mod rules;

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::NormalizerConfig;
use crate::domain::ingredient::IngredientToken;
use crate::errors::{ApplicationError, DomainError};

pub use rules::{RepairRule, RepairRuleSet, SynonymTable};

/// Numeric knobs of the normalizer.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizerSettings {
    pub min_token_len: usize,
    pub max_token_len: usize,
    pub min_alpha_ratio: f64,
    pub max_ingredients: usize,
    pub min_confident_tokens: usize,
    pub max_confident_token_len: usize,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            max_token_len: 80,
            min_alpha_ratio: 0.3,
            max_ingredients: 30,
            min_confident_tokens: 3,
            max_confident_token_len: 50,
        }
    }
}

impl From<&NormalizerConfig> for NormalizerSettings {
    fn from(config: &NormalizerConfig) -> Self {
        Self {
            min_token_len: config.min_token_len,
            max_token_len: config.max_token_len,
            min_alpha_ratio: config.min_alpha_ratio,
            max_ingredients: config.max_ingredients,
            min_confident_tokens: config.min_confident_tokens,
            max_confident_token_len: config.max_confident_token_len,
        }
    }
}

/// The data tables a normalizer runs on.
#[derive(Clone, Debug)]
pub struct NormalizerTables {
    pub markers: Vec<String>,
    pub synonyms: SynonymTable,
    pub repairs: RepairRuleSet,
    pub fallback: Vec<IngredientToken>,
}

impl NormalizerTables {
    pub fn standard() -> Result<Self, ApplicationError> {
        let repairs = RepairRuleSet::standard().map_err(|error| {
            ApplicationError::Configuration(format!("misread repair rules failed to compile: {error}"))
        })?;

        Ok(Self {
            markers: rules::SECTION_MARKERS.iter().map(|marker| (*marker).to_owned()).collect(),
            synonyms: SynonymTable::standard(),
            repairs,
            fallback: rules::FALLBACK_INGREDIENTS.iter().map(|name| IngredientToken::new(name)).collect(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    EmptyInput,
    NoIngredients,
    TooFewIngredients,
    OverlongIngredient,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIngredients {
    pub ingredients: Vec<IngredientToken>,
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_marker: Option<String>,
}

impl NormalizedIngredients {
    pub fn names(&self) -> Vec<String> {
        self.ingredients.iter().map(|token| token.as_str().to_owned()).collect()
    }
}

#[derive(Clone, Debug)]
pub struct TextNormalizer {
    settings: NormalizerSettings,
    tables: NormalizerTables,
    parenthetical: Regex,
}

impl TextNormalizer {
    /// Normalizer with the built-in marker, synonym and repair tables.
    pub fn new(settings: NormalizerSettings) -> Result<Self, ApplicationError> {
        Self::with_tables(settings, NormalizerTables::standard()?)
    }

    pub fn with_tables(
        settings: NormalizerSettings,
        tables: NormalizerTables,
    ) -> Result<Self, ApplicationError> {
        if tables.fallback.is_empty() {
            return Err(ApplicationError::Configuration(
                "normalizer fallback list must not be empty".to_owned(),
            ));
        }

        let parenthetical = Regex::new(r"\([^)]*\)|\[[^\]]*\]").map_err(|error| {
            ApplicationError::Configuration(format!("parenthetical pattern failed to compile: {error}"))
        })?;

        Ok(Self { settings, tables, parenthetical })
    }

    pub fn settings(&self) -> &NormalizerSettings {
        &self.settings
    }

    pub fn fallback_list(&self) -> &[IngredientToken] {
        &self.tables.fallback
    }

    /// Normalizes raw bytes handed over by a boundary layer.
    ///
    /// Bytes that are not UTF-8 text are rejected rather than guessed at.
    pub fn normalize_bytes(&self, raw: &[u8]) -> Result<NormalizedIngredients, DomainError> {
        let text = std::str::from_utf8(raw).map_err(|error| {
            DomainError::Input(format!("label text is not valid UTF-8: {error}"))
        })?;
        Ok(self.normalize(text))
    }

    pub fn normalize(&self, raw_text: &str) -> NormalizedIngredients {
        if raw_text.trim().is_empty() {
            return self.fallback(FallbackReason::EmptyInput, None);
        }

        let lowered = raw_text.to_lowercase();
        let (section, marker) = self.locate_section(&lowered);

        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        for candidate in self.split_candidates(section) {
            if !self.keep_candidate(&candidate) {
                trace!(candidate = %candidate, "dropping ingredient candidate");
                continue;
            }

            let canonical = self.canonicalize(&candidate);
            if canonical.is_empty() {
                continue;
            }
            if seen.insert(canonical.clone()) {
                tokens.push(canonical);
            }
        }
        tokens.truncate(self.settings.max_ingredients);

        let marker = marker.map(str::to_owned);
        if tokens.is_empty() {
            return self.fallback(FallbackReason::NoIngredients, marker);
        }
        if tokens.iter().any(|token| token.as_str().chars().count() > self.settings.max_confident_token_len)
        {
            return self.fallback(FallbackReason::OverlongIngredient, marker);
        }
        if marker.is_none() && tokens.len() < self.settings.min_confident_tokens {
            return self.fallback(FallbackReason::TooFewIngredients, marker);
        }

        debug!(
            event_name = "normalizer.extracted",
            ingredient_count = tokens.len(),
            section_marker = marker.as_deref().unwrap_or("none"),
            "label text normalized"
        );

        NormalizedIngredients {
            ingredients: tokens,
            used_fallback: false,
            fallback_reason: None,
            section_marker: marker,
        }
    }

    /// Text after the highest-priority marker present, or the whole text.
    fn locate_section<'a>(&self, lowered: &'a str) -> (&'a str, Option<&str>) {
        for marker in &self.tables.markers {
            if let Some(index) = lowered.find(marker.as_str()) {
                return (&lowered[index + marker.len()..], Some(marker.as_str()));
            }
        }
        (lowered, None)
    }

    fn split_candidates(&self, section: &str) -> Vec<String> {
        let delimited = section.replace([';', '\n', '\r'], ",");
        let stripped = self.parenthetical.replace_all(&delimited, " ");
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

        collapsed
            .split(',')
            .map(|candidate| candidate.trim().trim_end_matches('.').trim().to_owned())
            .collect()
    }

    fn keep_candidate(&self, candidate: &str) -> bool {
        let length = candidate.chars().count();
        if length < self.settings.min_token_len || length > self.settings.max_token_len {
            return false;
        }

        let alphabetic = candidate.chars().filter(|ch| ch.is_alphabetic()).count();
        (alphabetic as f64 / length as f64) >= self.settings.min_alpha_ratio
    }

    fn canonicalize(&self, candidate: &str) -> IngredientToken {
        let synonym = self.tables.synonyms.resolve(candidate);
        let repaired = self.tables.repairs.apply(synonym);
        if repaired != candidate {
            trace!(from = %candidate, to = %repaired, "ingredient canonicalized");
        }
        IngredientToken::new(&repaired)
    }

    fn fallback(&self, reason: FallbackReason, marker: Option<String>) -> NormalizedIngredients {
        debug!(
            event_name = "normalizer.fallback_used",
            reason = ?reason,
            "label text judged low confidence; returning placeholder ingredients"
        );

        NormalizedIngredients {
            ingredients: self.tables.fallback.clone(),
            used_fallback: true,
            fallback_reason: Some(reason),
            section_marker: marker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(NormalizerSettings::default()).expect("standard normalizer")
    }

    fn names(result: &NormalizedIngredients) -> Vec<&str> {
        result.ingredients.iter().map(IngredientToken::as_str).collect()
    }

    #[test]
    fn extracts_marked_ingredient_section() {
        let result = normalizer().normalize("Ingredients: Aqua, Glycerin, Niacinamide");

        assert_eq!(names(&result), vec!["aqua", "glycerin", "niacinamide"]);
        assert!(!result.used_fallback);
        assert_eq!(result.section_marker.as_deref(), Some("ingredients:"));
    }

    #[test]
    fn empty_input_returns_flagged_fallback() {
        let normalizer = normalizer();
        for input in ["", "   \n\t "] {
            let result = normalizer.normalize(input);
            assert!(result.used_fallback);
            assert_eq!(result.fallback_reason, Some(FallbackReason::EmptyInput));
            assert_eq!(result.ingredients, normalizer.fallback_list());
        }
    }

    #[test]
    fn repairs_common_misreads() {
        let result = normalizer().normalize("ingredients: g1ycerin, n1acinamide");

        assert_eq!(names(&result), vec!["glycerin", "niacinamide"]);
        assert!(!result.used_fallback);
    }

    #[test]
    fn discards_marketing_copy_before_marker() {
        let text = "NEW! Hydrating gel cream, dermatologist tested.\nINGREDIENTS: Water; Glycerin; Sodium Hyaluronate.";
        let result = normalizer().normalize(text);

        assert_eq!(names(&result), vec!["aqua", "glycerin", "sodium hyaluronate"]);
    }

    #[test]
    fn marker_priority_follows_table_order() {
        let text = "contains: shea butter, aloe vera, squalane. inci: aqua, glycerin, panthenol";
        let result = normalizer().normalize(text);

        assert_eq!(result.section_marker.as_deref(), Some("inci:"));
        assert_eq!(names(&result), vec!["aqua", "glycerin", "panthenol"]);
    }

    #[test]
    fn markerless_text_is_parsed_best_effort() {
        let result = normalizer().normalize("Aqua, Butylene Glycol, Phenoxyethanol, Parfum");

        assert!(!result.used_fallback);
        assert!(result.section_marker.is_none());
        assert_eq!(names(&result), vec!["aqua", "butylene glycol", "phenoxyethanol", "parfum"]);
    }

    #[test]
    fn markerless_text_with_too_few_tokens_falls_back() {
        let result = normalizer().normalize("Shake well before use");

        assert!(result.used_fallback);
        assert_eq!(result.fallback_reason, Some(FallbackReason::TooFewIngredients));
    }

    #[test]
    fn drops_short_and_noisy_candidates() {
        let result =
            normalizer().normalize("ingredients: aqua, x, 12345/678, %%!!, glycerin, ##7e, tocopherol");

        assert_eq!(names(&result), vec!["aqua", "glycerin", "tocopherol"]);
    }

    #[test]
    fn strips_parenthetical_and_bracketed_content() {
        let result = normalizer()
            .normalize("Ingredients: Aqua (Water, Eau), Retinol [Vitamin A], Tocopherol (Vit E)");

        assert_eq!(names(&result), vec!["aqua", "retinol", "tocopherol"]);
    }

    #[test]
    fn applies_synonyms_then_dedupes_in_first_seen_order() {
        let result = normalizer().normalize("ingredients: water, glycerin, aqua, vitamin e, tocopherol");

        assert_eq!(names(&result), vec!["aqua", "glycerin", "tocopherol"]);
    }

    #[test]
    fn collapses_whitespace_runs() {
        let result = normalizer().normalize("ingredients: sodium    lauryl\t sulfate, aqua, glycerin");

        assert_eq!(names(&result)[0], "sodium lauryl sulfate");
    }

    #[test]
    fn caps_output_length() {
        let settings = NormalizerSettings { max_ingredients: 4, ..NormalizerSettings::default() };
        let normalizer = TextNormalizer::new(settings).expect("normalizer");
        let text = "ingredients: aqua, glycerin, niacinamide, panthenol, allantoin, squalane";

        let result = normalizer.normalize(text);
        assert_eq!(result.ingredients.len(), 4);
        assert_eq!(names(&result), vec!["aqua", "glycerin", "niacinamide", "panthenol"]);
    }

    #[test]
    fn overlong_token_triggers_fallback() {
        let garbled = "a".repeat(60);
        let text = format!("ingredients: aqua, glycerin, {garbled}");

        let result = normalizer().normalize(&text);
        assert!(result.used_fallback);
        assert_eq!(result.fallback_reason, Some(FallbackReason::OverlongIngredient));
    }

    #[test]
    fn marker_without_ingredients_falls_back() {
        let result = normalizer().normalize("Ingredients: ---, 12, ..");

        assert!(result.used_fallback);
        assert_eq!(result.fallback_reason, Some(FallbackReason::NoIngredients));
    }

    #[test]
    fn invalid_utf8_bytes_are_an_input_error() {
        let error = normalizer().normalize_bytes(&[0x66, 0x6f, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(error, DomainError::Input(_)));
    }

    #[test]
    fn utf8_bytes_are_normalized() {
        let result = normalizer().normalize_bytes(b"INCI: Aqua, Glycerin, Parfum").expect("valid utf-8");
        assert_eq!(names(&result), vec!["aqua", "glycerin", "parfum"]);
    }

    #[test]
    fn custom_tables_replace_the_standard_ones() {
        let tables = NormalizerTables {
            markers: vec!["zutaten:".to_owned()],
            synonyms: SynonymTable::from_pairs(&[("wasser", "aqua")]),
            repairs: RepairRuleSet::compile(&[("g[l1]ycer[i1]n", "glycerin")]).expect("rules"),
            fallback: vec![IngredientToken::new("aqua")],
        };
        let normalizer =
            TextNormalizer::with_tables(NormalizerSettings::default(), tables).expect("normalizer");

        let result = normalizer.normalize("Zutaten: Wasser, G1ycerin");
        assert_eq!(names(&result), vec!["aqua", "glycerin"]);
    }

    #[test]
    fn empty_fallback_list_is_rejected() {
        let mut tables = NormalizerTables::standard().expect("tables");
        tables.fallback.clear();

        let result = TextNormalizer::with_tables(NormalizerSettings::default(), tables);
        assert!(matches!(result, Err(ApplicationError::Configuration(_))));
    }
}
