use crate::commands::{CommandContext, CommandResult};

pub fn run(context: &CommandContext, ingredients: &[String]) -> CommandResult {
    match context.load_runtime() {
        Ok(runtime) => {
            let analysis = runtime.score_product(ingredients);
            let message = format!(
                "product score {} ({}), {} flagged",
                analysis.product_score, analysis.interpretation, analysis.flagged_count
            );
            CommandResult::success_with("score", message, Some(analysis))
        }
        Err(error) => CommandResult::from_error("score", error),
    }
}

/// Unweighted integer score with a raw threshold for flagging.
pub fn run_quick(context: &CommandContext, ingredients: &[String]) -> CommandResult {
    match context.load_runtime() {
        Ok(runtime) => {
            let quick = runtime.quick_analysis(ingredients);
            let message = format!(
                "product score {}, {} flagged",
                quick.product_score,
                quick.flagged_ingredients.len()
            );
            CommandResult::success_with("quick-score", message, Some(quick))
        }
        Err(error) => CommandResult::from_error("quick-score", error),
    }
}
