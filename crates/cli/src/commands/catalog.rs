use bottlescan_core::recommender::RecommendationFilters;

use crate::commands::{CommandContext, CommandResult};

pub fn run_recommend(
    context: &CommandContext,
    flagged: &[String],
    filters: &RecommendationFilters,
    max_results: Option<usize>,
) -> CommandResult {
    match context.load_runtime() {
        Ok(runtime) => {
            let products = runtime.recommend_products(flagged, filters, max_results);
            let message = format!("{} products avoid the flagged ingredients", products.len());
            CommandResult::success_with("recommend", message, Some(products))
        }
        Err(error) => CommandResult::from_error("recommend", error),
    }
}

pub fn run_products(context: &CommandContext) -> CommandResult {
    match context.load_runtime() {
        Ok(runtime) => {
            let products = runtime.products();
            let message = format!("{} products in catalog", products.len());
            CommandResult::success_with("products", message, Some(products))
        }
        Err(error) => CommandResult::from_error("products", error),
    }
}

pub fn run_price(context: &CommandContext, product_id: &str) -> CommandResult {
    let result =
        context.load_runtime().and_then(|runtime| runtime.price_comparison(product_id));

    match result {
        Ok(comparison) => {
            let message = format!(
                "{} {} quotes for `{}`",
                comparison.price_sources.len(),
                comparison.currency,
                comparison.product_name
            );
            CommandResult::success_with("price", message, Some(comparison))
        }
        Err(error) => CommandResult::from_error("price", error),
    }
}
