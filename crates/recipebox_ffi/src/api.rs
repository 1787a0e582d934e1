//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose recipe list/search/detail/edit use-cases to Dart via FRB.
//! - Convert plain input DTOs through `RecipeDraft` so the UI never builds
//!   core records directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage-backed functions are non-`sync`: FRB runs them off the UI
//!   thread, and they serialize on one process-wide service.
//! - Failures come back as empty results or `ok=false` envelopes, never as
//!   driver errors.

use log::warn;
use recipebox_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Ingredient, IngredientRow, Recipe, RecipeDraft, RecipeId, RecipeService, RecipeSummary,
    SharedRecipeService, StoreConfig,
};
use std::sync::OnceLock;

static RECIPE_SERVICE: OnceLock<SharedRecipeService> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the recipe list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeListItem {
    pub recipe_id: i64,
    pub title: String,
}

/// One ingredient row as typed into the edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientInput {
    pub quantity: String,
    pub unit: String,
    pub name: String,
}

/// Edit-form payload for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeInput {
    pub title: String,
    pub instructions: String,
    /// Raw time field text; empty or non-numeric means "not specified".
    pub preparation_time: String,
    pub difficulty: Option<String>,
    pub notes: String,
    pub ingredients: Vec<IngredientInput>,
}

/// Ingredient as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientView {
    pub ingredient_id: Option<i64>,
    pub quantity: String,
    pub unit: String,
    pub name: String,
    /// Preformatted "quantity unit name" line.
    pub display: String,
}

/// Full recipe for the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub recipe_id: i64,
    pub title: String,
    pub instructions: String,
    pub preparation_time_minutes: Option<u32>,
    pub difficulty: String,
    pub notes: String,
    pub ingredients: Vec<IngredientView>,
    /// `false` when some ingredient rows could not be read.
    pub ingredients_complete: bool,
}

/// Generic action response envelope for write flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected recipe ID, when known.
    pub recipe_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl RecipeActionResponse {
    fn success(message: impl Into<String>, recipe_id: RecipeId) -> Self {
        Self {
            ok: true,
            recipe_id: Some(recipe_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            recipe_id: None,
            message: message.into(),
        }
    }
}

/// Lists all recipes sorted by title.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics; storage failures yield an empty list.
pub fn recipes_list() -> Vec<RecipeListItem> {
    with_service(|service| service.list_short())
        .into_iter()
        .map(to_list_item)
        .collect()
}

/// Searches recipe titles; blank input lists everything.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics; storage failures yield an empty list.
pub fn recipes_search(query: String) -> Vec<RecipeListItem> {
    with_service(|service| service.search_or_list(&query))
        .into_iter()
        .map(to_list_item)
        .collect()
}

/// Loads one recipe with its ingredients.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Returns `None` for unknown IDs and on storage failure.
pub fn recipe_get(recipe_id: i64) -> Option<RecipeView> {
    match with_service(|service| service.try_get_details(recipe_id)) {
        Ok(details) => details.map(|details| {
            let ingredients_complete = details.is_complete();
            to_recipe_view(details.recipe, ingredients_complete)
        }),
        Err(err) => {
            warn!(
                "event=ffi_call module=ffi status=error call=recipe_get error_code={}",
                err.error_code()
            );
            None
        }
    }
}

/// Creates a recipe from edit-form input.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics.
/// - Returns the created recipe ID on success.
pub fn recipe_create(input: RecipeInput) -> RecipeActionResponse {
    let recipe = match to_draft(input).into_recipe() {
        Ok(recipe) => recipe,
        Err(err) => return RecipeActionResponse::failure(format!("recipe_create rejected: {err}")),
    };
    match with_service(|service| service.try_save(&recipe)) {
        Ok(recipe_id) => RecipeActionResponse::success("Recipe saved.", recipe_id),
        Err(err) => RecipeActionResponse::failure(format!("recipe_create failed: {err}")),
    }
}

/// Replaces an existing recipe with edit-form input.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics.
/// - Unknown IDs return `ok=false` and leave storage unchanged.
pub fn recipe_update(recipe_id: i64, input: RecipeInput) -> RecipeActionResponse {
    let mut recipe = match to_draft(input).into_recipe() {
        Ok(recipe) => recipe,
        Err(err) => return RecipeActionResponse::failure(format!("recipe_update rejected: {err}")),
    };
    recipe.id = Some(recipe_id);
    match with_service(|service| service.try_update(&recipe)) {
        Ok(()) => RecipeActionResponse::success("Recipe updated.", recipe_id),
        Err(err) => RecipeActionResponse::failure(format!("recipe_update failed: {err}")),
    }
}

/// Deletes a recipe and its ingredients.
///
/// # FFI contract
/// - Async call, DB-backed execution.
/// - Never panics.
pub fn recipe_delete(recipe_id: i64) -> RecipeActionResponse {
    match with_service(|service| service.try_delete(recipe_id)) {
        Ok(true) => RecipeActionResponse::success("Recipe deleted.", recipe_id),
        Ok(false) => RecipeActionResponse::failure(format!("recipe {recipe_id} not found")),
        Err(err) => RecipeActionResponse::failure(format!("recipe_delete failed: {err}")),
    }
}

fn with_service<T>(job: impl FnOnce(&mut RecipeService) -> T) -> T {
    RECIPE_SERVICE
        .get_or_init(|| SharedRecipeService::new(RecipeService::new(StoreConfig::from_env())))
        .with_service(job)
}

fn to_draft(input: RecipeInput) -> RecipeDraft {
    RecipeDraft {
        title: input.title,
        instructions: input.instructions,
        preparation_time: input.preparation_time,
        difficulty: input.difficulty,
        notes: input.notes,
        ingredient_rows: input
            .ingredients
            .into_iter()
            .map(|row| IngredientRow::new(row.quantity, row.unit, row.name))
            .collect(),
    }
}

fn to_list_item(summary: RecipeSummary) -> RecipeListItem {
    RecipeListItem {
        recipe_id: summary.id,
        title: summary.title,
    }
}

fn to_recipe_view(recipe: Recipe, ingredients_complete: bool) -> RecipeView {
    RecipeView {
        recipe_id: recipe.id.unwrap_or_default(),
        ingredients: recipe.ingredients.iter().map(to_ingredient_view).collect(),
        title: recipe.title,
        instructions: recipe.instructions,
        preparation_time_minutes: recipe.preparation_time_minutes,
        difficulty: recipe.difficulty,
        notes: recipe.notes,
        ingredients_complete,
    }
}

fn to_ingredient_view(ingredient: &Ingredient) -> IngredientView {
    IngredientView {
        ingredient_id: ingredient.id,
        quantity: ingredient.quantity.clone(),
        unit: ingredient.unit.clone(),
        name: ingredient.name.clone(),
        display: ingredient.to_string(),
    }
}
