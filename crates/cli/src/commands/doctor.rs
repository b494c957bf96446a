use std::path::Path;
use std::sync::Arc;

use bottlescan_core::config::AppConfig;
use bottlescan_core::errors::ApplicationError;
use bottlescan_core::knowledge::{HealthKnowledgeBase, SubstituteKnowledgeBase, TableSource};
use bottlescan_core::recommender::catalog::ProductCatalog;
use bottlescan_core::runtime::BottleScanRuntime;
use serde::Serialize;

use crate::commands::{CommandContext, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(context: &CommandContext, json_output: bool) -> CommandResult {
    let report = build_report(context);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(context: &CommandContext) -> DoctorReport {
    let mut checks = Vec::new();

    match context.load_config() {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(check_tables(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["health_table", "substitute_table", "product_catalog", "runtime_assembly"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_tables(config: &AppConfig) -> Vec<DoctorCheck> {
    let knowledge = &config.knowledge;
    let health = HealthKnowledgeBase::load(&knowledge.health_db_path);
    let substitutes = SubstituteKnowledgeBase::load(&knowledge.substitute_db_path);
    let catalog = ProductCatalog::load(&knowledge.catalog_path);

    let mut checks = vec![
        table_check(
            "health_table",
            &knowledge.health_db_path,
            health.as_ref().map(|table| (table.source(), table.len())),
        ),
        table_check(
            "substitute_table",
            &knowledge.substitute_db_path,
            substitutes.as_ref().map(|table| (table.source(), table.len())),
        ),
        table_check(
            "product_catalog",
            &knowledge.catalog_path,
            catalog.as_ref().map(|table| (table.source(), table.len())),
        ),
    ];

    let assembly = match (health, substitutes, catalog) {
        (Ok(health), Ok(substitutes), Ok(catalog)) => {
            match BottleScanRuntime::assemble(
                config,
                Arc::new(health),
                Arc::new(substitutes),
                Arc::new(catalog),
            ) {
                Ok(runtime) => DoctorCheck {
                    name: "runtime_assembly",
                    status: CheckStatus::Pass,
                    details: format!(
                        "pipeline ready with `{}` similarity",
                        runtime.status().similarity
                    ),
                },
                Err(error) => DoctorCheck {
                    name: "runtime_assembly",
                    status: CheckStatus::Fail,
                    details: error.to_string(),
                },
            }
        }
        _ => DoctorCheck {
            name: "runtime_assembly",
            status: CheckStatus::Skipped,
            details: "skipped because a knowledge table failed to load".to_string(),
        },
    };
    checks.push(assembly);

    checks
}

fn table_check(
    name: &'static str,
    path: &Path,
    loaded: Result<(TableSource, usize), &ApplicationError>,
) -> DoctorCheck {
    match loaded {
        Ok((TableSource::File, entries)) => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("{entries} entries loaded from `{}`", path.display()),
        },
        Ok((TableSource::Fallback, entries)) => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!(
                "`{}` not found, using {entries} built-in fallback entries",
                path.display()
            ),
        },
        Err(error) => {
            DoctorCheck { name, status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
