use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use bottlescan_cli::commands::{
    analyze, build_kb, catalog, config, doctor, normalize, score, substitutes, CommandContext,
    TextSource,
};
use bottlescan_core::recommender::RecommendationFilters;
use bottlescan_core::runtime::ScanOptions;
use serde_json::Value;

#[test]
fn analyze_returns_full_report_for_label_text() {
    with_builtin_tables(&[], |context| {
        let source = TextSource::Inline(
            "Foaming wash. INGREDIENTS: Water, Sodium Lauryl Sulfate, Glycerin, Methylparaben, Parfum."
                .to_string(),
        );
        let result = analyze::run(context, source, &ScanOptions::default());
        assert_eq!(result.exit_code, 0, "expected successful analysis");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "analyze");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["normalized"]["used_fallback"], false);
        assert_eq!(payload["data"]["analysis"]["flagged_count"], 3);
        assert_eq!(payload["data"]["substitutes"].as_array().map(Vec::len), Some(6));
    });
}

#[test]
fn analyze_reports_fallback_for_unreadable_text() {
    with_builtin_tables(&[], |context| {
        let result =
            analyze::run(context, TextSource::Inline("   ".to_string()), &ScanOptions::default());
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["normalized"]["used_fallback"], true);
        assert!(payload["message"].as_str().unwrap_or("").contains("fallback list used"));
    });
}

#[test]
fn normalize_rejects_non_utf8_file() {
    with_builtin_tables(&[], |context| {
        let dir = tempfile::tempdir().expect("tempdir");
        let label = dir.path().join("label.txt");
        fs::write(&label, [0x49, 0x6e, 0xc3, 0x28]).expect("write label");

        let result = normalize::run(context, TextSource::File(label));
        assert_eq!(result.exit_code, 1, "expected input failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_input");
        assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    });
}

#[test]
fn normalize_applies_synonyms() {
    with_builtin_tables(&[], |context| {
        let source = TextSource::Inline("Ingredients: Water, Glycerin, Parfum".to_string());
        let result = normalize::run(context, source);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["ingredients"][0], "aqua");
        assert_eq!(payload["data"]["used_fallback"], false);
    });
}

#[test]
fn quick_score_truncates_mean_and_flags_below_threshold() {
    with_builtin_tables(&[], |context| {
        let result = score::run_quick(context, &strings(&["aqua", "parfum", "methylparaben"]));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quick-score");
        assert_eq!(payload["data"]["product_score"], 43);
        assert_eq!(payload["data"]["flagged_ingredients"].as_array().map(Vec::len), Some(2));
    });
}

#[test]
fn score_of_empty_list_is_neutral() {
    with_builtin_tables(&[], |context| {
        let result = score::run(context, &[]);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["product_score"], 60.0);
        assert_eq!(payload["data"]["flagged_count"], 0);
    });
}

#[test]
fn substitutes_respect_per_ingredient_cap() {
    with_builtin_tables(&[], |context| {
        let result = substitutes::run(context, &strings(&["parfum", "aqua"]), Some(1));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let candidates = payload["data"].as_array().expect("substitute list");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["original_ingredient"], "parfum");
    });
}

#[test]
fn alternatives_list_products_using_the_substitute() {
    with_builtin_tables(&[], |context| {
        let result = substitutes::run_alternatives(context, "sodium lauryl sulfate");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["ingredient"], "sodium lauryl sulfate");
        assert_eq!(payload["data"]["alternatives"][0]["alternative"], "decyl glucoside");
        assert_eq!(payload["data"]["alternatives"][0]["products_using"][0], "6");
    });
}

#[test]
fn recommend_excludes_flagged_ingredients_in_score_order() {
    with_builtin_tables(&[], |context| {
        let result = catalog::run_recommend(
            context,
            &strings(&["parfum"]),
            &RecommendationFilters::default(),
            None,
        );
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let ids: Vec<&str> = payload["data"]
            .as_array()
            .expect("recommendation list")
            .iter()
            .filter_map(|product| product["product_id"].as_str())
            .collect();
        assert_eq!(ids, vec!["3", "1", "2", "6"]);
    });
}

#[test]
fn recommend_applies_category_filter() {
    with_builtin_tables(&[], |context| {
        let filters =
            RecommendationFilters { category: Some("Cleanser".to_string()), ..Default::default() };
        let result = catalog::run_recommend(context, &strings(&["parfum"]), &filters, Some(5));

        let payload = parse_payload(&result.output);
        let ids: Vec<&str> = payload["data"]
            .as_array()
            .expect("recommendation list")
            .iter()
            .filter_map(|product| product["product_id"].as_str())
            .collect();
        assert_eq!(ids, vec!["1", "6"]);
    });
}

#[test]
fn products_lists_catalog() {
    with_builtin_tables(&[], |context| {
        let result = catalog::run_products(context);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"].as_array().map(Vec::len), Some(6));
    });
}

#[test]
fn price_returns_retailer_quotes() {
    with_builtin_tables(&[], |context| {
        let result = catalog::run_price(context, "1");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["product_name"], "Hydrating Facial Cleanser");
        assert_eq!(payload["data"]["price_sources"].as_array().map(Vec::len), Some(4));
    });
}

#[test]
fn price_for_unknown_product_is_not_found() {
    with_builtin_tables(&[], |context| {
        let result = catalog::run_price(context, "99");
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "price");
        assert_eq!(payload["error_class"], "not_found");
    });
}

#[test]
fn invalid_env_override_fails_with_config_code() {
    with_builtin_tables(&[("BOTTLESCAN_RECOMMENDER_DEFAULT_MAX_RESULTS", "many")], |context| {
        let result = score::run(context, &strings(&["aqua"]));
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn malformed_knowledge_table_fails_with_configuration_class() {
    let dir = tempfile::tempdir().expect("tempdir");
    let health = dir.path().join("health.json");
    fs::write(&health, "not json").expect("write health table");
    let health = health.to_string_lossy().into_owned();

    with_builtin_tables(&[("BOTTLESCAN_KNOWLEDGE_HEALTH_DB_PATH", health.as_str())], |context| {
        let result = score::run(context, &strings(&["aqua"]));
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "configuration");
    });
}

#[test]
fn build_kb_writes_loadable_health_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let corpus = dir.path().join("corpus.txt");
    let output = dir.path().join("processed").join("health.json");
    fs::write(&corpus, "aqua, glycerin, parfum\n['aqua', 'niacinamide']\n\n")
        .expect("write corpus");

    let result = build_kb::run(&corpus, &output);
    assert_eq!(result.exit_code, 0, "expected successful build: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["products"], 2);
    assert_eq!(payload["data"]["ingredients"], 4);

    let table: Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("read table")).expect("json");
    assert!(table["parfum"]["health_score"].as_f64().is_some_and(|score| score < 50.0));

    let health = output.to_string_lossy().into_owned();
    with_builtin_tables(&[("BOTTLESCAN_KNOWLEDGE_HEALTH_DB_PATH", health.as_str())], |context| {
        let result = score::run(context, &strings(&["parfum"]));
        assert_eq!(result.exit_code, 0, "generated table should load: {}", result.output);
    });
}

#[test]
fn build_kb_reports_missing_corpus() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = build_kb::run(&dir.path().join("missing.txt"), &dir.path().join("out.json"));
    assert_eq!(result.exit_code, 1);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "build_failed");
    assert!(payload["message"].as_str().unwrap_or("").contains("missing.txt"));
}

#[test]
fn config_attributes_env_sources() {
    with_builtin_tables(&[("BOTTLESCAN_LOG_LEVEL", "warn")], |context| {
        let result = config::run(context);
        assert_eq!(result.exit_code, 0);
        assert!(result
            .output
            .contains("- logging.level = warn (source: env (BOTTLESCAN_LOG_LEVEL))"));
        assert!(result.output.contains("- recommender.similarity = fixed (source: default)"));
    });
}

#[test]
fn config_attributes_file_sources() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bottlescan.toml");
    fs::write(&path, "[recommender]\nsimilarity = \"ingredient_overlap\"\n").expect("write config");

    with_builtin_tables(&[], |_| {
        let context = CommandContext { config_path: Some(path.clone()) };
        let result = config::run(&context);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains(&format!(
            "- recommender.similarity = ingredient_overlap (source: file ({}))",
            path.display()
        )));
    });
}

#[test]
fn doctor_passes_with_builtin_tables() {
    with_builtin_tables(&[], |context| {
        let result = doctor::run(context, true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let names: Vec<&str> = payload["checks"]
            .as_array()
            .expect("checks")
            .iter()
            .filter_map(|check| check["name"].as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "config_validation",
                "health_table",
                "substitute_table",
                "product_catalog",
                "runtime_assembly"
            ]
        );
    });
}

#[test]
fn doctor_skips_table_checks_when_config_invalid() {
    with_builtin_tables(&[("BOTTLESCAN_NORMALIZER_MIN_TOKEN_LEN", "0")], |context| {
        let result = doctor::run(context, false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] health_table:"));
    });
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

/// Points every knowledge path at missing files in a fresh directory so the
/// built-in tables load, then applies `vars` on top.
fn with_builtin_tables(vars: &[(&str, &str)], test_fn: impl FnOnce(&CommandContext)) {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = |name: &str| -> String { missing_path(dir.path(), name) };
    let mut all_vars = vec![
        ("BOTTLESCAN_KNOWLEDGE_HEALTH_DB_PATH", missing("health.json")),
        ("BOTTLESCAN_KNOWLEDGE_SUBSTITUTE_DB_PATH", missing("substitutes.json")),
        ("BOTTLESCAN_KNOWLEDGE_CATALOG_PATH", missing("products.json")),
    ];
    for (key, value) in vars {
        all_vars.retain(|(existing, _)| existing != key);
        all_vars.push((*key, value.to_string()));
    }

    let borrowed: Vec<(&str, &str)> =
        all_vars.iter().map(|(key, value)| (*key, value.as_str())).collect();
    with_env(&borrowed, || test_fn(&CommandContext::default()));
}

fn missing_path(dir: &Path, name: &str) -> String {
    PathBuf::from(dir).join("missing").join(name).to_string_lossy().into_owned()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BOTTLESCAN_KNOWLEDGE_HEALTH_DB_PATH",
        "BOTTLESCAN_KNOWLEDGE_SUBSTITUTE_DB_PATH",
        "BOTTLESCAN_KNOWLEDGE_CATALOG_PATH",
        "BOTTLESCAN_NORMALIZER_MIN_TOKEN_LEN",
        "BOTTLESCAN_NORMALIZER_MAX_TOKEN_LEN",
        "BOTTLESCAN_NORMALIZER_MIN_ALPHA_RATIO",
        "BOTTLESCAN_NORMALIZER_MAX_INGREDIENTS",
        "BOTTLESCAN_NORMALIZER_MIN_CONFIDENT_TOKENS",
        "BOTTLESCAN_NORMALIZER_MAX_CONFIDENT_TOKEN_LEN",
        "BOTTLESCAN_SCORING_QUICK_FLAG_THRESHOLD",
        "BOTTLESCAN_SUBSTITUTES_DEFAULT_MAX_SUGGESTIONS",
        "BOTTLESCAN_RECOMMENDER_DEFAULT_MAX_RESULTS",
        "BOTTLESCAN_RECOMMENDER_SIMILARITY",
        "BOTTLESCAN_RECOMMENDER_FIXED_SIMILARITY",
        "BOTTLESCAN_LOGGING_LEVEL",
        "BOTTLESCAN_LOGGING_FORMAT",
        "BOTTLESCAN_LOG_LEVEL",
        "BOTTLESCAN_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
