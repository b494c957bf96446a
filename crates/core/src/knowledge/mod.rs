//! Read-only ingredient knowledge tables.
//!
//! Both tables are loaded once, either from a flat JSON mapping on disk or
//! from the built-in seed tables when no file exists, and never mutated after.

pub mod builder;
mod fallback;
pub mod health;
pub mod substitutes;

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::errors::ApplicationError;

pub use builder::{BuiltHealthEntry, BuiltHealthTable, HealthDatabaseBuilder};
pub use health::HealthKnowledgeBase;
pub use substitutes::SubstituteKnowledgeBase;

/// Where a loaded table came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    File,
    Fallback,
}

impl TableSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Fallback => "fallback",
        }
    }
}

/// Reads a table file, returning `None` when it does not exist.
pub(crate) fn read_table(path: &Path) -> Result<Option<String>, ApplicationError> {
    if !path.exists() {
        return Ok(None);
    }

    fs::read_to_string(path).map(Some).map_err(|error| {
        ApplicationError::Configuration(format!(
            "failed to read knowledge table `{}`: {error}",
            path.display()
        ))
    })
}

pub(crate) fn parse_error(path: &Path, error: serde_json::Error) -> ApplicationError {
    ApplicationError::Configuration(format!(
        "knowledge table `{}` is not a valid JSON mapping: {error}",
        path.display()
    ))
}
