use serde::Serialize;

use bottlescan_core::domain::substitute::IngredientAlternative;

use crate::commands::{CommandContext, CommandResult};

pub fn run(
    context: &CommandContext,
    ingredients: &[String],
    max_suggestions: Option<usize>,
) -> CommandResult {
    match context.load_runtime() {
        Ok(runtime) => {
            let substitutes = runtime.find_substitutes(ingredients, max_suggestions);
            let message = format!("{} substitutes found", substitutes.len());
            CommandResult::success_with("substitutes", message, Some(substitutes))
        }
        Err(error) => CommandResult::from_error("substitutes", error),
    }
}

#[derive(Debug, Serialize)]
struct AlternativesReport {
    ingredient: String,
    alternatives: Vec<IngredientAlternative>,
}

pub fn run_alternatives(context: &CommandContext, ingredient: &str) -> CommandResult {
    match context.load_runtime() {
        Ok(runtime) => {
            let alternatives = runtime.ingredient_alternatives(ingredient);
            let message = format!("{} alternatives for `{ingredient}`", alternatives.len());
            let report = AlternativesReport { ingredient: ingredient.to_owned(), alternatives };
            CommandResult::success_with("alternatives", message, Some(report))
        }
        Err(error) => CommandResult::from_error("alternatives", error),
    }
}
