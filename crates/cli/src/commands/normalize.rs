use crate::commands::{CommandContext, CommandResult, TextSource};

pub fn run(context: &CommandContext, source: TextSource) -> CommandResult {
    let result = context.load_runtime().and_then(|runtime| {
        let bytes = source.into_bytes()?;
        runtime.normalize_bytes(&bytes)
    });

    match result {
        Ok(normalized) => {
            let message = if normalized.used_fallback {
                format!("{} ingredients (fallback list)", normalized.ingredients.len())
            } else {
                format!("{} ingredients extracted", normalized.ingredients.len())
            };
            CommandResult::success_with("normalize", message, Some(normalized))
        }
        Err(error) => CommandResult::from_error("normalize", error),
    }
}
