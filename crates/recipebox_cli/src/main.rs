//! Command-line probe over the recipe store.
//!
//! # Responsibility
//! - Exercise `RecipeService` end to end without the Flutter runtime.
//! - Keep output line-oriented so it can be diffed in quick sanity checks.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use recipebox_core::{
    default_log_level, init_logging, IngredientRow, RecipeDraft, RecipeId, RecipeService,
    RecipeSummary, StoreConfig,
};

#[derive(Debug, Parser)]
#[command(name = "recipebox")]
#[command(about = "RecipeBox CLI")]
struct Cli {
    /// Database file; defaults to `RECIPEBOX_DB_PATH` or the temp dir.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off without it.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// SQLite busy timeout; defaults to `RECIPEBOX_BUSY_TIMEOUT_MS` or 5000.
    #[arg(long)]
    busy_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Ping,
    List,
    Search {
        query: String,
    },
    Show {
        id: RecipeId,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    Add(AddArgs),
    Delete {
        id: RecipeId,
    },
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    instructions: String,
    /// Preparation time in minutes.
    #[arg(long, default_value = "")]
    time: String,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long, default_value = "")]
    notes: String,
    /// Ingredient as `quantity|unit|name`; repeatable.
    #[arg(long = "ingredient")]
    ingredients: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        init_logging(default_log_level().as_str(), log_dir)
            .map_err(|err| anyhow!("failed to start logging in {}: {err}", log_dir.display()))?;
    }

    let mut service = RecipeService::new(store_config(&cli));
    let result = run(cli.command, &mut service);
    service.disconnect();
    result
}

fn run(command: Command, service: &mut RecipeService) -> Result<()> {
    match command {
        Command::Ping => {
            println!("recipebox_core ping={}", recipebox_core::ping());
            println!("recipebox_core version={}", recipebox_core::core_version());
            println!("recipebox_core db={}", service.config().location);
            Ok(())
        }
        Command::List => {
            print_summaries(&service.try_list_short()?);
            Ok(())
        }
        Command::Search { query } => {
            let query = query.trim();
            let summaries = if query.is_empty() {
                service.try_list_short()?
            } else {
                service.try_search(query)?
            };
            print_summaries(&summaries);
            Ok(())
        }
        Command::Show { id, json } => {
            let details = service
                .try_get_details(id)?
                .ok_or_else(|| anyhow!("recipe not found: {id}"))?;
            if let Some(err) = &details.partial_read {
                eprintln!("warning: {err}");
            }
            let recipe = details.recipe;
            if json {
                let body =
                    serde_json::to_string_pretty(&recipe).context("failed to serialize recipe")?;
                println!("{body}");
                return Ok(());
            }

            println!("{recipe}");
            if let Some(minutes) = recipe.preparation_time_minutes {
                println!("time: {minutes} min");
            }
            if !recipe.difficulty.is_empty() {
                println!("difficulty: {}", recipe.difficulty);
            }
            for ingredient in &recipe.ingredients {
                println!("- {ingredient}");
            }
            if !recipe.instructions.is_empty() {
                println!();
                println!("{}", recipe.instructions);
            }
            if !recipe.notes.is_empty() {
                println!();
                println!("notes: {}", recipe.notes);
            }
            Ok(())
        }
        Command::Add(args) => {
            let draft = RecipeDraft {
                title: args.title,
                instructions: args.instructions,
                preparation_time: args.time,
                difficulty: args.difficulty,
                notes: args.notes,
                ingredient_rows: args
                    .ingredients
                    .iter()
                    .map(String::as_str)
                    .map(parse_ingredient)
                    .collect(),
            };
            let recipe = draft.into_recipe().context("invalid recipe input")?;
            let id = service.try_save(&recipe)?;
            println!("{id}");
            Ok(())
        }
        Command::Delete { id } => {
            if !service.try_delete(id)? {
                return Err(anyhow!("recipe not found: {id}"));
            }
            println!("deleted {id}");
            Ok(())
        }
    }
}

/// Resolves storage settings; flags win over the environment.
fn store_config(cli: &Cli) -> StoreConfig {
    let config = match &cli.db {
        Some(path) => StoreConfig::file(path),
        None => StoreConfig::from_env(),
    };
    match cli.busy_timeout_ms {
        Some(millis) => config.with_busy_timeout(Duration::from_millis(millis)),
        None => config,
    }
}

/// Splits `quantity|unit|name`; a value without `|` is a bare name.
fn parse_ingredient(raw: &str) -> IngredientRow {
    let parts: Vec<&str> = raw.splitn(3, '|').collect();
    match parts.as_slice() {
        [name] => IngredientRow::new("", "", *name),
        [quantity, name] => IngredientRow::new(*quantity, "", *name),
        [quantity, unit, name] => IngredientRow::new(*quantity, *unit, *name),
        _ => IngredientRow::default(),
    }
}

fn print_summaries(summaries: &[RecipeSummary]) {
    for summary in summaries {
        println!("{}\t{}", summary.id, summary.title);
    }
}
