//! Recipe repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and title-search APIs over `Recipes`/`Ingredients`.
//! - Keep SQL details inside the core persistence boundary.
//! - Own the transaction boundary for multi-table writes.
//!
//! # Invariants
//! - Write paths must call `Recipe::validate()` before SQL mutations.
//! - `insert_recipe`/`replace_recipe` commit everything or nothing.
//! - Read paths map NULL text to empty strings and keep NULL time as `None`.
//! - Stored times outside `0..=u32::MAX` read as `None`, not as an error.
//! - Ingredients are returned in storage order (`ingredient_id ASC`).
//! - Title search and ordering fold Unicode case, not only ASCII.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::db::DbError;
use crate::model::ingredient::Ingredient;
use crate::model::recipe::{Recipe, RecipeId, RecipeSummary, RecipeValidationError};
use log::warn;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SUMMARY_SELECT_SQL: &str = "SELECT recipe_id, title FROM Recipes";
const SUMMARY_ORDER_SQL: &str = "ORDER BY title COLLATE RECIPE_TITLE ASC, recipe_id ASC";

const RECIPE_SELECT_SQL: &str = "SELECT
    recipe_id,
    title,
    instructions,
    preparation_time_minutes,
    difficulty,
    notes
FROM Recipes
WHERE recipe_id = ?1;";

const INGREDIENTS_SELECT_SQL: &str = "SELECT
    ingredient_id,
    recipe_id,
    name,
    quantity,
    unit
FROM Ingredients
WHERE recipe_id = ?1
ORDER BY ingredient_id ASC;";

const INSERT_RECIPE_SQL: &str = "INSERT INTO Recipes (
    title,
    instructions,
    preparation_time_minutes,
    difficulty,
    notes
) VALUES (?1, ?2, ?3, ?4, ?5);";

const UPDATE_RECIPE_SQL: &str = "UPDATE Recipes
 SET
    title = ?1,
    instructions = ?2,
    preparation_time_minutes = ?3,
    difficulty = ?4,
    notes = ?5
 WHERE recipe_id = ?6;";

const INSERT_INGREDIENT_SQL: &str =
    "INSERT INTO Ingredients (recipe_id, name, quantity, unit) VALUES (?1, ?2, ?3, ?4);";

const DELETE_INGREDIENTS_SQL: &str = "DELETE FROM Ingredients WHERE recipe_id = ?1;";
const DELETE_RECIPE_SQL: &str = "DELETE FROM Recipes WHERE recipe_id = ?1;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for recipe persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecipeValidationError),
    Db(DbError),
    NotFound(RecipeId),
    InvalidData(String),
}

impl RepoError {
    /// Stable diagnostic code for log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Db(err) => err.error_code(),
            Self::NotFound(_) => "recipe_not_found",
            Self::InvalidData(_) => "invalid_persisted_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "recipe not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted recipe data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<RecipeValidationError> for RepoError {
    fn from(value: RecipeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for recipe persistence.
pub trait RecipeRepository {
    /// Lists all recipes as id + title, sorted by title.
    fn list_summaries(&self) -> RepoResult<Vec<RecipeSummary>>;
    /// Lists recipes whose title matches `%query%`, sorted by title.
    fn search_summaries(&self, query: &str) -> RepoResult<Vec<RecipeSummary>>;
    /// Loads the recipe row only; `ingredients` is left empty.
    fn get_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>>;
    /// Appends ingredient rows of `recipe_id` to `out` as they are read.
    ///
    /// On error, rows read before the failure stay in `out`.
    fn load_ingredients_into(&self, recipe_id: RecipeId, out: &mut Vec<Ingredient>)
        -> RepoResult<()>;
    /// Inserts the recipe and all its ingredients in one transaction.
    fn insert_recipe(&mut self, recipe: &Recipe) -> RepoResult<RecipeId>;
    /// Replaces the recipe row and its full ingredient set in one transaction.
    fn replace_recipe(&mut self, recipe: &Recipe) -> RepoResult<()>;
    /// Deletes one recipe; ingredient rows follow via `ON DELETE CASCADE`.
    ///
    /// Returns whether a row was removed.
    fn delete_recipe(&self, id: RecipeId) -> RepoResult<bool>;
}

/// SQLite-backed recipe repository.
pub struct SqliteRecipeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecipeRepository<'conn> {
    /// Constructs a repository over a bootstrapped connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl RecipeRepository for SqliteRecipeRepository<'_> {
    fn list_summaries(&self) -> RepoResult<Vec<RecipeSummary>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUMMARY_SELECT_SQL} {SUMMARY_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(parse_summary_row(row)?);
        }
        Ok(summaries)
    }

    fn search_summaries(&self, query: &str) -> RepoResult<Vec<RecipeSummary>> {
        // `%` and `_` inside `query` keep their LIKE meaning.
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(&format!(
            "{SUMMARY_SELECT_SQL} WHERE fold_case(title) LIKE fold_case(?1) {SUMMARY_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([pattern.as_str()])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(parse_summary_row(row)?);
        }
        Ok(summaries)
    }

    fn get_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>> {
        let mut stmt = self.conn.prepare(RECIPE_SELECT_SQL)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_recipe_row(row)?));
        }
        Ok(None)
    }

    fn load_ingredients_into(
        &self,
        recipe_id: RecipeId,
        out: &mut Vec<Ingredient>,
    ) -> RepoResult<()> {
        let mut stmt = self.conn.prepare(INGREDIENTS_SELECT_SQL)?;
        let mut rows = stmt.query([recipe_id])?;
        while let Some(row) = rows.next()? {
            out.push(parse_ingredient_row(row)?);
        }
        Ok(())
    }

    fn insert_recipe(&mut self, recipe: &Recipe) -> RepoResult<RecipeId> {
        recipe.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = insert_recipe_in_tx(&tx, recipe);
        finish_transaction(tx, result)
    }

    fn replace_recipe(&mut self, recipe: &Recipe) -> RepoResult<()> {
        let recipe_id = match recipe.persisted_id() {
            Some(id) => id,
            None => {
                return Err(RepoError::Validation(RecipeValidationError::InvalidId(
                    recipe.id.unwrap_or_default(),
                )))
            }
        };
        recipe.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = replace_recipe_in_tx(&tx, recipe_id, recipe);
        finish_transaction(tx, result)
    }

    fn delete_recipe(&self, id: RecipeId) -> RepoResult<bool> {
        let changed = self.conn.execute(DELETE_RECIPE_SQL, [id])?;
        Ok(changed > 0)
    }
}

fn insert_recipe_in_tx(tx: &Transaction<'_>, recipe: &Recipe) -> RepoResult<RecipeId> {
    let changed = tx.execute(
        INSERT_RECIPE_SQL,
        params![
            recipe.title.as_str(),
            recipe.instructions.as_str(),
            recipe.preparation_time_minutes,
            recipe.difficulty.as_str(),
            recipe.notes.as_str(),
        ],
    )?;
    if changed == 0 {
        return Err(RepoError::InvalidData(
            "recipe insert affected no rows".to_string(),
        ));
    }

    let recipe_id = tx.last_insert_rowid();
    insert_ingredients_in_tx(tx, recipe_id, &recipe.ingredients)?;
    Ok(recipe_id)
}

fn replace_recipe_in_tx(
    tx: &Transaction<'_>,
    recipe_id: RecipeId,
    recipe: &Recipe,
) -> RepoResult<()> {
    tx.execute(DELETE_INGREDIENTS_SQL, [recipe_id])?;

    let changed = tx.execute(
        UPDATE_RECIPE_SQL,
        params![
            recipe.title.as_str(),
            recipe.instructions.as_str(),
            recipe.preparation_time_minutes,
            recipe.difficulty.as_str(),
            recipe.notes.as_str(),
            recipe_id,
        ],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound(recipe_id));
    }

    insert_ingredients_in_tx(tx, recipe_id, &recipe.ingredients)
}

/// Inserts all lines through one cached prepared statement.
fn insert_ingredients_in_tx(
    tx: &Transaction<'_>,
    recipe_id: RecipeId,
    ingredients: &[Ingredient],
) -> RepoResult<()> {
    if ingredients.is_empty() {
        return Ok(());
    }

    let mut stmt = tx.prepare_cached(INSERT_INGREDIENT_SQL)?;
    for ingredient in ingredients {
        stmt.execute(params![
            recipe_id,
            ingredient.name.as_str(),
            ingredient.quantity.as_str(),
            ingredient.unit.as_str(),
        ])?;
    }
    Ok(())
}

/// Commits on success; rolls back explicitly on failure.
///
/// SQLite returns to auto-commit mode after either outcome.
fn finish_transaction<T>(tx: Transaction<'_>, result: RepoResult<T>) -> RepoResult<T> {
    match result {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                let rollback_err = DbError::Sqlite(rollback_err);
                warn!(
                    "event=tx_rollback module=repo status=error error_code={} error={} cause_code={}",
                    rollback_err.error_code(),
                    rollback_err,
                    err.error_code()
                );
            }
            Err(err)
        }
    }
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<RecipeSummary> {
    Ok(RecipeSummary {
        id: row.get("recipe_id")?,
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
    })
}

fn parse_recipe_row(row: &Row<'_>) -> RepoResult<Recipe> {
    let id: RecipeId = row.get("recipe_id")?;
    let preparation_time_minutes = row
        .get::<_, Option<i64>>("preparation_time_minutes")?
        .and_then(|value| match u32::try_from(value) {
            Ok(minutes) => Some(minutes),
            Err(_) => {
                warn!(
                    "event=recipe_read module=repo status=degraded recipe_id={id} reason=invalid_time value={value}"
                );
                None
            }
        });

    Ok(Recipe {
        id: Some(id),
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        instructions: row
            .get::<_, Option<String>>("instructions")?
            .unwrap_or_default(),
        preparation_time_minutes,
        difficulty: row
            .get::<_, Option<String>>("difficulty")?
            .unwrap_or_default(),
        notes: row.get::<_, Option<String>>("notes")?.unwrap_or_default(),
        ingredients: Vec::new(),
    })
}

fn parse_ingredient_row(row: &Row<'_>) -> RepoResult<Ingredient> {
    Ok(Ingredient::from_storage(
        row.get("ingredient_id")?,
        row.get("recipe_id")?,
        row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        row.get("quantity")?,
        row.get("unit")?,
    ))
}
