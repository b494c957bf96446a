use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bottlescan_core::knowledge::HealthDatabaseBuilder;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct BuildSummary {
    input: PathBuf,
    output: PathBuf,
    products: usize,
    ingredients: usize,
}

pub fn run(input: &Path, output: &Path) -> CommandResult {
    match build(input, output) {
        Ok(summary) => {
            let message = format!(
                "health table with {} ingredients from {} products written to `{}`",
                summary.ingredients,
                summary.products,
                output.display()
            );
            CommandResult::success_with("build-kb", message, Some(summary))
        }
        Err(error) => {
            let detail = format!("{error:#}");
            tracing::warn!(event_name = "cli.build_kb.failed", error = %detail, "health table build failed");
            CommandResult::failure("build-kb", "build_failed", detail, 1)
        }
    }
}

fn build(input: &Path, output: &Path) -> Result<BuildSummary> {
    let corpus = fs::read_to_string(input)
        .with_context(|| format!("failed to read product corpus `{}`", input.display()))?;

    let mut builder = HealthDatabaseBuilder::new().context("failed to prepare term matchers")?;
    let products = builder.ingest_corpus(&corpus);
    let table = builder.build();
    let rendered = table.to_json_pretty().context("failed to render health table")?;

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    fs::write(output, rendered)
        .with_context(|| format!("failed to write health table `{}`", output.display()))?;

    Ok(BuildSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        products,
        ingredients: table.len(),
    })
}
