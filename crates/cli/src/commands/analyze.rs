use bottlescan_core::runtime::ScanOptions;

use crate::commands::{CommandContext, CommandResult, TextSource};

pub fn run(context: &CommandContext, source: TextSource, options: &ScanOptions) -> CommandResult {
    let result = context.load_runtime().and_then(|runtime| {
        let text = source.into_text()?;
        Ok(runtime.analyze_text(&text, options))
    });

    match result {
        Ok(report) => {
            let message = format!(
                "product score {} ({}), {} flagged, {} substitutes, {} products{}",
                report.analysis.product_score,
                report.analysis.interpretation,
                report.analysis.flagged_count,
                report.substitutes.len(),
                report.recommendations.len(),
                if report.normalized.used_fallback { ", low-confidence text: fallback list used" } else { "" }
            );
            CommandResult::success_with("analyze", message, Some(report))
        }
        Err(error) => CommandResult::from_error("analyze", error),
    }
}
