pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use bottlescan_core::config::{AppConfig, LogFormat, LoggingConfig};
use bottlescan_core::recommender::RecommendationFilters;
use bottlescan_core::runtime::ScanOptions;
use clap::{Args, Parser, Subcommand};

use crate::commands::{CommandContext, CommandResult, TextSource};

#[derive(Debug, Parser)]
#[command(
    name = "bottlescan",
    about = "BottleScan ingredient pipeline CLI",
    long_about = "Normalize label text, score ingredients against the health table, suggest substitutes, and recommend products that avoid flagged ingredients.",
    after_help = "Examples:\n  bottlescan analyze --text \"Ingredients: Water, Parfum, Glycerin\"\n  bottlescan substitutes methylparaben parfum --max 2\n  bottlescan recommend --flagged parfum --category cleanser\n  bottlescan doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a bottlescan.toml configuration file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct TextInput {
    #[arg(long, help = "Raw label text", conflicts_with = "file")]
    text: Option<String>,
    #[arg(long, help = "Read raw label text from a file")]
    file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FilterArgs {
    #[arg(long, help = "Only recommend products in this category")]
    category: Option<String>,
    #[arg(long = "skin-type", help = "Skin type the product must suit (repeatable)")]
    skin_type: Vec<String>,
    #[arg(long = "concern", help = "Concern the product must address (repeatable)")]
    concerns: Vec<String>,
}

impl From<FilterArgs> for RecommendationFilters {
    fn from(args: FilterArgs) -> Self {
        Self { category: args.category, skin_type: args.skin_type, concerns: args.concerns }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the full scan: normalize, score, substitutes, and recommendations")]
    Analyze {
        #[command(flatten)]
        input: TextInput,
        #[arg(long, help = "Maximum substitutes per flagged ingredient")]
        max_suggestions: Option<usize>,
        #[arg(long, help = "Maximum recommended products")]
        max_results: Option<usize>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    #[command(about = "Extract a canonical ingredient list from raw label text")]
    Normalize {
        #[command(flatten)]
        input: TextInput,
    },
    #[command(about = "Score an ingredient list with position weighting")]
    Score {
        #[arg(required = true, help = "Ingredient names in label order")]
        ingredients: Vec<String>,
    },
    #[command(about = "Score an ingredient list with an unweighted mean")]
    QuickScore {
        #[arg(required = true, help = "Ingredient names in label order")]
        ingredients: Vec<String>,
    },
    #[command(about = "Suggest healthier substitutes for flagged ingredients")]
    Substitutes {
        #[arg(required = true, help = "Ingredient names in label order")]
        ingredients: Vec<String>,
        #[arg(long = "max", help = "Maximum substitutes per flagged ingredient")]
        max_suggestions: Option<usize>,
    },
    #[command(about = "Recommend catalog products that avoid the flagged ingredients")]
    Recommend {
        #[arg(long, value_delimiter = ',', help = "Flagged ingredients to avoid")]
        flagged: Vec<String>,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long = "max", help = "Maximum recommended products")]
        max_results: Option<usize>,
    },
    #[command(about = "List the product catalog")]
    Products,
    #[command(about = "Compare retailer prices for one catalog product")]
    Price {
        #[arg(help = "Catalog product id")]
        product_id: String,
    },
    #[command(about = "List substitute alternatives for a single ingredient")]
    Alternatives {
        #[arg(help = "Ingredient name")]
        ingredient: String,
    },
    #[command(about = "Build a health table from a corpus of product ingredient lists")]
    BuildKb {
        #[arg(long, help = "Corpus file, one comma-separated ingredient list per line")]
        input: PathBuf,
        #[arg(long, help = "Destination for the generated JSON health table")]
        output: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and check that every knowledge table loads")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let context = CommandContext { config_path: cli.config };

    let logging = context
        .load_config()
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    init_logging(&logging);

    let result = execute(&context, cli.command);

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn execute(context: &CommandContext, command: Command) -> CommandResult {
    match command {
        Command::Analyze { input, max_suggestions, max_results, filters } => {
            match TextSource::from_args(input.text, input.file) {
                Ok(source) => {
                    let options =
                        ScanOptions { max_suggestions, max_results, filters: filters.into() };
                    commands::analyze::run(context, source, &options)
                }
                Err(error) => CommandResult::from_error("analyze", error),
            }
        }
        Command::Normalize { input } => match TextSource::from_args(input.text, input.file) {
            Ok(source) => commands::normalize::run(context, source),
            Err(error) => CommandResult::from_error("normalize", error),
        },
        Command::Score { ingredients } => commands::score::run(context, &ingredients),
        Command::QuickScore { ingredients } => commands::score::run_quick(context, &ingredients),
        Command::Substitutes { ingredients, max_suggestions } => {
            commands::substitutes::run(context, &ingredients, max_suggestions)
        }
        Command::Recommend { flagged, filters, max_results } => {
            commands::catalog::run_recommend(context, &flagged, &filters.into(), max_results)
        }
        Command::Products => commands::catalog::run_products(context),
        Command::Price { product_id } => commands::catalog::run_price(context, &product_id),
        Command::Alternatives { ingredient } => {
            commands::substitutes::run_alternatives(context, &ingredient)
        }
        Command::BuildKb { input, output } => commands::build_kb::run(&input, &output),
        Command::Config => commands::config::run(context),
        Command::Doctor { json } => commands::doctor::run(context, json),
    }
}

/// Diagnostics go to stderr so stdout stays a single JSON payload.
fn init_logging(config: &LoggingConfig) {
    use tracing::Level;

    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
