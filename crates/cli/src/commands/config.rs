use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bottlescan_core::config::{AppConfig, LogFormat, SimilarityKind};
use toml::Value;

use crate::commands::{CommandContext, CommandResult};

pub fn run(context: &CommandContext) -> CommandResult {
    let config = match context.load_config() {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", error),
    };

    let config_file_path = context.config_path.clone().or_else(detect_config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in CONFIG_FIELDS {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field_value(&config, field.key_path), source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

struct ConfigField {
    key_path: &'static str,
    env_keys: &'static [&'static str],
}

const CONFIG_FIELDS: &[ConfigField] = &[
    ConfigField {
        key_path: "knowledge.health_db_path",
        env_keys: &["BOTTLESCAN_KNOWLEDGE_HEALTH_DB_PATH"],
    },
    ConfigField {
        key_path: "knowledge.substitute_db_path",
        env_keys: &["BOTTLESCAN_KNOWLEDGE_SUBSTITUTE_DB_PATH"],
    },
    ConfigField {
        key_path: "knowledge.catalog_path",
        env_keys: &["BOTTLESCAN_KNOWLEDGE_CATALOG_PATH"],
    },
    ConfigField {
        key_path: "normalizer.min_token_len",
        env_keys: &["BOTTLESCAN_NORMALIZER_MIN_TOKEN_LEN"],
    },
    ConfigField {
        key_path: "normalizer.max_token_len",
        env_keys: &["BOTTLESCAN_NORMALIZER_MAX_TOKEN_LEN"],
    },
    ConfigField {
        key_path: "normalizer.min_alpha_ratio",
        env_keys: &["BOTTLESCAN_NORMALIZER_MIN_ALPHA_RATIO"],
    },
    ConfigField {
        key_path: "normalizer.max_ingredients",
        env_keys: &["BOTTLESCAN_NORMALIZER_MAX_INGREDIENTS"],
    },
    ConfigField {
        key_path: "normalizer.min_confident_tokens",
        env_keys: &["BOTTLESCAN_NORMALIZER_MIN_CONFIDENT_TOKENS"],
    },
    ConfigField {
        key_path: "normalizer.max_confident_token_len",
        env_keys: &["BOTTLESCAN_NORMALIZER_MAX_CONFIDENT_TOKEN_LEN"],
    },
    ConfigField {
        key_path: "scoring.quick_flag_threshold",
        env_keys: &["BOTTLESCAN_SCORING_QUICK_FLAG_THRESHOLD"],
    },
    ConfigField {
        key_path: "substitutes.default_max_suggestions",
        env_keys: &["BOTTLESCAN_SUBSTITUTES_DEFAULT_MAX_SUGGESTIONS"],
    },
    ConfigField {
        key_path: "recommender.default_max_results",
        env_keys: &["BOTTLESCAN_RECOMMENDER_DEFAULT_MAX_RESULTS"],
    },
    ConfigField {
        key_path: "recommender.similarity",
        env_keys: &["BOTTLESCAN_RECOMMENDER_SIMILARITY"],
    },
    ConfigField {
        key_path: "recommender.fixed_similarity",
        env_keys: &["BOTTLESCAN_RECOMMENDER_FIXED_SIMILARITY"],
    },
    ConfigField {
        key_path: "logging.level",
        env_keys: &["BOTTLESCAN_LOGGING_LEVEL", "BOTTLESCAN_LOG_LEVEL"],
    },
    ConfigField {
        key_path: "logging.format",
        env_keys: &["BOTTLESCAN_LOGGING_FORMAT", "BOTTLESCAN_LOG_FORMAT"],
    },
];

fn field_value(config: &AppConfig, key_path: &str) -> String {
    match key_path {
        "knowledge.health_db_path" => config.knowledge.health_db_path.display().to_string(),
        "knowledge.substitute_db_path" => config.knowledge.substitute_db_path.display().to_string(),
        "knowledge.catalog_path" => config.knowledge.catalog_path.display().to_string(),
        "normalizer.min_token_len" => config.normalizer.min_token_len.to_string(),
        "normalizer.max_token_len" => config.normalizer.max_token_len.to_string(),
        "normalizer.min_alpha_ratio" => config.normalizer.min_alpha_ratio.to_string(),
        "normalizer.max_ingredients" => config.normalizer.max_ingredients.to_string(),
        "normalizer.min_confident_tokens" => config.normalizer.min_confident_tokens.to_string(),
        "normalizer.max_confident_token_len" => {
            config.normalizer.max_confident_token_len.to_string()
        }
        "scoring.quick_flag_threshold" => config.scoring.quick_flag_threshold.to_string(),
        "substitutes.default_max_suggestions" => {
            config.substitutes.default_max_suggestions.to_string()
        }
        "recommender.default_max_results" => config.recommender.default_max_results.to_string(),
        "recommender.similarity" => similarity_label(config.recommender.similarity).to_string(),
        "recommender.fixed_similarity" => config.recommender.fixed_similarity.to_string(),
        "logging.level" => config.logging.level.clone(),
        "logging.format" => format_label(config.logging.format).to_string(),
        _ => "<unknown>".to_string(),
    }
}

fn similarity_label(kind: SimilarityKind) -> &'static str {
    match kind {
        SimilarityKind::Fixed => "fixed",
        SimilarityKind::IngredientOverlap => "ingredient_overlap",
    }
}

fn format_label(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("bottlescan.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/bottlescan.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, field_source};
    use toml::Value;

    #[test]
    fn nested_keys_are_found_in_the_file_document() {
        let doc: Value = "[knowledge]\nhealth_db_path = \"data/health.json\"\n"
            .parse()
            .expect("toml should parse");

        assert!(contains_path(&doc, "knowledge.health_db_path"));
        assert!(!contains_path(&doc, "knowledge.catalog_path"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn unset_keys_fall_back_to_default_source() {
        let source = field_source("recommender.similarity", &["BOTTLESCAN_TEST_UNSET_KEY"], None, None);
        assert_eq!(source, "default");
    }
}
