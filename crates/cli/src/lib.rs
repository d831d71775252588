pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::routine::RoutineArgs;

#[derive(Debug, Parser)]
#[command(
    name = "dermis",
    about = "Skincare ingredient compatibility and routine advisor",
    long_about = "Check ingredient interactions, order routines, browse the ingredient catalog, and ask the rule-based advisor.",
    after_help = "Examples:\n  dermis check retinol \"vitamin c\"\n  dermis routine --time pm --product \"Serum=retinol\" --product \"Cream=ceramides\"\n  dermis ask \"What does niacinamide do?\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Check every pair in a list of ingredients for known interactions")]
    Check {
        #[arg(required = true, help = "Ingredient ids, names or aliases")]
        ingredients: Vec<String>,
    },
    #[command(about = "Order products into a routine and report conflicts, waits and gaps")]
    Routine {
        #[arg(long, help = "Routine time: am or pm")]
        time: String,
        #[arg(long = "product", required = true, help = "Product as `Name=ingredient,ingredient`")]
        products: Vec<String>,
        #[arg(long, help = "Evaluate products in the given order and report misplaced steps")]
        audit: bool,
        #[arg(long, help = "Skin type for profile-specific suggestions")]
        skin_type: Option<String>,
        #[arg(long = "concern", help = "Skin concern; repeatable")]
        concerns: Vec<String>,
    },
    #[command(about = "Suggest a starter routine for a skin profile")]
    Suggest {
        #[arg(long, help = "Routine time: am or pm")]
        time: String,
        #[arg(long)]
        skin_type: Option<String>,
        #[arg(long = "concern")]
        concerns: Vec<String>,
    },
    #[command(about = "Check whether two products can be layered together")]
    Compare {
        #[arg(help = "First product as `Name=ingredient,ingredient`")]
        first: String,
        #[arg(help = "Second product as `Name=ingredient,ingredient`")]
        second: String,
    },
    #[command(about = "Analyze a product label's ingredient list")]
    Analyze {
        #[arg(required = true)]
        ingredients: Vec<String>,
    },
    #[command(about = "List catalog ingredients, optionally filtered")]
    Ingredients {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        concern: Option<String>,
        #[arg(long, help = "Case-insensitive substring of the ingredient name")]
        search: Option<String>,
    },
    #[command(about = "Show the full record for one ingredient")]
    Ingredient { id: String },
    #[command(about = "Ask the advisor a free-text skincare question")]
    Ask {
        question: String,
        #[arg(long)]
        skin_type: Option<String>,
        #[arg(long = "concern")]
        concerns: Vec<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, knowledge base integrity and advisor readiness")]
    Doctor,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { ingredients } => commands::check::run(&ingredients),
        Command::Routine { time, products, audit, skin_type, concerns } => {
            commands::routine::run(&RoutineArgs { time, products, audit, skin_type, concerns })
        }
        Command::Suggest { time, skin_type, concerns } => {
            commands::suggest::run(&time, skin_type.as_deref(), &concerns)
        }
        Command::Compare { first, second } => commands::compare::run(&first, &second),
        Command::Analyze { ingredients } => commands::analyze::run(&ingredients),
        Command::Ingredients { category, concern, search } => {
            commands::ingredients::run(category.as_deref(), concern.as_deref(), search.as_deref())
        }
        Command::Ingredient { id } => commands::ingredient::run(&id),
        Command::Ask { question, skin_type, concerns } => {
            commands::ask::run(&question, skin_type.as_deref(), &concerns)
        }
        Command::Config => commands::config::run(),
        Command::Doctor => commands::doctor::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
