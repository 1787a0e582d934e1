//! Core domain logic for RecipeBox.
//! This crate owns recipe storage and the rules for what a valid recipe is.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod worker;

pub use config::{DbLocation, StoreConfig};
pub use logging::{
    default_log_level, init_logging, logging_status, LogLevel, LoggingError, LoggingStatus,
};
pub use model::draft::{DraftError, IngredientRow, RecipeDraft};
pub use model::ingredient::{Ingredient, IngredientId};
pub use model::recipe::{Difficulty, Recipe, RecipeId, RecipeSummary, RecipeValidationError};
pub use repo::recipe_repo::{RecipeRepository, RepoError, RepoResult, SqliteRecipeRepository};
pub use service::recipe_service::{RecipeDetails, RecipeService, StoreError, StoreResult};
pub use worker::{CompletionQueue, CompletionSender, SharedRecipeService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
