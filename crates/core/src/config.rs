use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub knowledge: KnowledgeConfig,
    pub normalizer: NormalizerConfig,
    pub scoring: ScoringConfig,
    pub substitutes: SubstitutesConfig,
    pub recommender: RecommenderConfig,
    pub logging: LoggingConfig,
}

/// Locations of the optional data files. A missing file selects the built-in table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnowledgeConfig {
    pub health_db_path: PathBuf,
    pub substitute_db_path: PathBuf,
    pub catalog_path: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizerConfig {
    pub min_token_len: usize,
    pub max_token_len: usize,
    pub min_alpha_ratio: f64,
    pub max_ingredients: usize,
    pub min_confident_tokens: usize,
    pub max_confident_token_len: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    pub quick_flag_threshold: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstitutesConfig {
    pub default_max_suggestions: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecommenderConfig {
    pub default_max_results: usize,
    pub similarity: SimilarityKind,
    pub fixed_similarity: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    Fixed,
    IngredientOverlap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub health_db_path: Option<PathBuf>,
    pub substitute_db_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub similarity: Option<SimilarityKind>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            knowledge: KnowledgeConfig {
                health_db_path: PathBuf::from("data/processed/ingredient_health_scores.json"),
                substitute_db_path: PathBuf::from("data/processed/ingredient_substitutes.json"),
                catalog_path: PathBuf::from("data/processed/product_database.json"),
            },
            normalizer: NormalizerConfig {
                min_token_len: 3,
                max_token_len: 80,
                min_alpha_ratio: 0.3,
                max_ingredients: 30,
                min_confident_tokens: 3,
                max_confident_token_len: 50,
            },
            scoring: ScoringConfig { quick_flag_threshold: 50.0 },
            substitutes: SubstitutesConfig { default_max_suggestions: 5 },
            recommender: RecommenderConfig {
                default_max_results: 5,
                similarity: SimilarityKind::Fixed,
                fixed_similarity: 0.85,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl std::str::FromStr for SimilarityKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fixed" => Ok(Self::Fixed),
            "ingredient_overlap" => Ok(Self::IngredientOverlap),
            other => Err(ConfigError::Validation(format!(
                "unsupported similarity metric `{other}` (expected fixed|ingredient_overlap)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("bottlescan.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(knowledge) = patch.knowledge {
            if let Some(path) = knowledge.health_db_path {
                self.knowledge.health_db_path = path;
            }
            if let Some(path) = knowledge.substitute_db_path {
                self.knowledge.substitute_db_path = path;
            }
            if let Some(path) = knowledge.catalog_path {
                self.knowledge.catalog_path = path;
            }
        }

        if let Some(normalizer) = patch.normalizer {
            if let Some(value) = normalizer.min_token_len {
                self.normalizer.min_token_len = value;
            }
            if let Some(value) = normalizer.max_token_len {
                self.normalizer.max_token_len = value;
            }
            if let Some(value) = normalizer.min_alpha_ratio {
                self.normalizer.min_alpha_ratio = value;
            }
            if let Some(value) = normalizer.max_ingredients {
                self.normalizer.max_ingredients = value;
            }
            if let Some(value) = normalizer.min_confident_tokens {
                self.normalizer.min_confident_tokens = value;
            }
            if let Some(value) = normalizer.max_confident_token_len {
                self.normalizer.max_confident_token_len = value;
            }
        }

        if let Some(scoring) = patch.scoring {
            if let Some(value) = scoring.quick_flag_threshold {
                self.scoring.quick_flag_threshold = value;
            }
        }

        if let Some(substitutes) = patch.substitutes {
            if let Some(value) = substitutes.default_max_suggestions {
                self.substitutes.default_max_suggestions = value;
            }
        }

        if let Some(recommender) = patch.recommender {
            if let Some(value) = recommender.default_max_results {
                self.recommender.default_max_results = value;
            }
            if let Some(value) = recommender.similarity {
                self.recommender.similarity = value;
            }
            if let Some(value) = recommender.fixed_similarity {
                self.recommender.fixed_similarity = value;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BOTTLESCAN_KNOWLEDGE_HEALTH_DB_PATH") {
            self.knowledge.health_db_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("BOTTLESCAN_KNOWLEDGE_SUBSTITUTE_DB_PATH") {
            self.knowledge.substitute_db_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("BOTTLESCAN_KNOWLEDGE_CATALOG_PATH") {
            self.knowledge.catalog_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("BOTTLESCAN_NORMALIZER_MIN_TOKEN_LEN") {
            self.normalizer.min_token_len =
                parse_usize("BOTTLESCAN_NORMALIZER_MIN_TOKEN_LEN", &value)?;
        }
        if let Some(value) = read_env("BOTTLESCAN_NORMALIZER_MAX_TOKEN_LEN") {
            self.normalizer.max_token_len =
                parse_usize("BOTTLESCAN_NORMALIZER_MAX_TOKEN_LEN", &value)?;
        }
        if let Some(value) = read_env("BOTTLESCAN_NORMALIZER_MIN_ALPHA_RATIO") {
            self.normalizer.min_alpha_ratio =
                parse_f64("BOTTLESCAN_NORMALIZER_MIN_ALPHA_RATIO", &value)?;
        }
        if let Some(value) = read_env("BOTTLESCAN_NORMALIZER_MAX_INGREDIENTS") {
            self.normalizer.max_ingredients =
                parse_usize("BOTTLESCAN_NORMALIZER_MAX_INGREDIENTS", &value)?;
        }
        if let Some(value) = read_env("BOTTLESCAN_NORMALIZER_MIN_CONFIDENT_TOKENS") {
            self.normalizer.min_confident_tokens =
                parse_usize("BOTTLESCAN_NORMALIZER_MIN_CONFIDENT_TOKENS", &value)?;
        }
        if let Some(value) = read_env("BOTTLESCAN_NORMALIZER_MAX_CONFIDENT_TOKEN_LEN") {
            self.normalizer.max_confident_token_len =
                parse_usize("BOTTLESCAN_NORMALIZER_MAX_CONFIDENT_TOKEN_LEN", &value)?;
        }

        if let Some(value) = read_env("BOTTLESCAN_SCORING_QUICK_FLAG_THRESHOLD") {
            self.scoring.quick_flag_threshold =
                parse_f64("BOTTLESCAN_SCORING_QUICK_FLAG_THRESHOLD", &value)?;
        }

        if let Some(value) = read_env("BOTTLESCAN_SUBSTITUTES_DEFAULT_MAX_SUGGESTIONS") {
            self.substitutes.default_max_suggestions =
                parse_usize("BOTTLESCAN_SUBSTITUTES_DEFAULT_MAX_SUGGESTIONS", &value)?;
        }

        if let Some(value) = read_env("BOTTLESCAN_RECOMMENDER_DEFAULT_MAX_RESULTS") {
            self.recommender.default_max_results =
                parse_usize("BOTTLESCAN_RECOMMENDER_DEFAULT_MAX_RESULTS", &value)?;
        }
        if let Some(value) = read_env("BOTTLESCAN_RECOMMENDER_SIMILARITY") {
            self.recommender.similarity = value.parse()?;
        }
        if let Some(value) = read_env("BOTTLESCAN_RECOMMENDER_FIXED_SIMILARITY") {
            self.recommender.fixed_similarity =
                parse_f64("BOTTLESCAN_RECOMMENDER_FIXED_SIMILARITY", &value)?;
        }

        let log_level =
            read_env("BOTTLESCAN_LOGGING_LEVEL").or_else(|| read_env("BOTTLESCAN_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BOTTLESCAN_LOGGING_FORMAT").or_else(|| read_env("BOTTLESCAN_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.health_db_path {
            self.knowledge.health_db_path = path;
        }
        if let Some(path) = overrides.substitute_db_path {
            self.knowledge.substitute_db_path = path;
        }
        if let Some(path) = overrides.catalog_path {
            self.knowledge.catalog_path = path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(similarity) = overrides.similarity {
            self.recommender.similarity = similarity;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_normalizer(&self.normalizer)?;
        validate_scoring(&self.scoring)?;
        validate_substitutes(&self.substitutes)?;
        validate_recommender(&self.recommender)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("bottlescan.toml"), PathBuf::from("config/bottlescan.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_normalizer(normalizer: &NormalizerConfig) -> Result<(), ConfigError> {
    if normalizer.min_token_len == 0 {
        return Err(ConfigError::Validation(
            "normalizer.min_token_len must be greater than zero".to_string(),
        ));
    }

    if normalizer.min_token_len > normalizer.max_token_len {
        return Err(ConfigError::Validation(format!(
            "normalizer.min_token_len ({}) must not exceed normalizer.max_token_len ({})",
            normalizer.min_token_len, normalizer.max_token_len
        )));
    }

    if !(0.0..=1.0).contains(&normalizer.min_alpha_ratio) {
        return Err(ConfigError::Validation(
            "normalizer.min_alpha_ratio must be in range 0.0..=1.0".to_string(),
        ));
    }

    if normalizer.max_ingredients == 0 {
        return Err(ConfigError::Validation(
            "normalizer.max_ingredients must be greater than zero".to_string(),
        ));
    }

    if normalizer.max_confident_token_len == 0 {
        return Err(ConfigError::Validation(
            "normalizer.max_confident_token_len must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_scoring(scoring: &ScoringConfig) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&scoring.quick_flag_threshold) {
        return Err(ConfigError::Validation(
            "scoring.quick_flag_threshold must be in range 0..=100".to_string(),
        ));
    }

    Ok(())
}

fn validate_substitutes(substitutes: &SubstitutesConfig) -> Result<(), ConfigError> {
    if substitutes.default_max_suggestions == 0 {
        return Err(ConfigError::Validation(
            "substitutes.default_max_suggestions must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_recommender(recommender: &RecommenderConfig) -> Result<(), ConfigError> {
    if recommender.default_max_results == 0 {
        return Err(ConfigError::Validation(
            "recommender.default_max_results must be greater than zero".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&recommender.fixed_similarity) {
        return Err(ConfigError::Validation(
            "recommender.fixed_similarity must be in range 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    knowledge: Option<KnowledgePatch>,
    normalizer: Option<NormalizerPatch>,
    scoring: Option<ScoringPatch>,
    substitutes: Option<SubstitutesPatch>,
    recommender: Option<RecommenderPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgePatch {
    health_db_path: Option<PathBuf>,
    substitute_db_path: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct NormalizerPatch {
    min_token_len: Option<usize>,
    max_token_len: Option<usize>,
    min_alpha_ratio: Option<f64>,
    max_ingredients: Option<usize>,
    min_confident_tokens: Option<usize>,
    max_confident_token_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringPatch {
    quick_flag_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct SubstitutesPatch {
    default_max_suggestions: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommenderPatch {
    default_max_results: Option<usize>,
    similarity: Option<SimilarityKind>,
    fixed_similarity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
