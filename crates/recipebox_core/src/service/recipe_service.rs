//! Recipe persistence service.
//!
//! # Responsibility
//! - Own the single storage connection and its connect/disconnect lifecycle.
//! - Expose list/search/detail/save/update/delete use-cases to UI callers.
//! - Collapse storage failures into plain results for compatibility callers,
//!   while `try_*` variants keep the typed diagnostic.
//!
//! # Invariants
//! - Every operation ensures a live connection on entry, reconnecting if
//!   needed; there is no separate "ensure" call for callers.
//! - `disconnect` never fails and may be called any number of times.
//! - The service is not re-entrant: one operation at a time. Share it across
//!   workers through `SharedRecipeService`.
//! - Recipe text and search input are never written to logs.
//!
//! # See also
//! - docs/architecture/logging.md

use crate::config::StoreConfig;
use crate::db::{open_with_config, DbError};
use crate::model::recipe::{Recipe, RecipeId, RecipeSummary, RecipeValidationError};
use crate::repo::recipe_repo::{
    RecipeRepository, RepoError, RepoResult, SqliteRecipeRepository,
};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Domain error surfaced by the checked (`try_*`) service operations.
#[derive(Debug)]
pub enum StoreError {
    /// Storage could not be opened or re-opened.
    Connection(DbError),
    /// A statement failed, input was invalid or the target row is missing.
    Query(RepoError),
    /// The recipe row was read but its ingredient rows were not.
    PartialRead {
        recipe_id: RecipeId,
        source: RepoError,
    },
}

impl StoreError {
    /// Stable diagnostic code for log events and UI envelopes.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connection(err) => err.error_code(),
            Self::Query(err) => err.error_code(),
            Self::PartialRead { .. } => "ingredients_partial_read",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "database connection failed: {err}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::PartialRead { recipe_id, source } => write!(
                f,
                "ingredients of recipe {recipe_id} could not be fully read: {source}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::PartialRead { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Query(value)
    }
}

/// Detail lookup result that keeps a partial-read diagnostic next to the
/// recipe instead of failing the whole lookup.
#[derive(Debug)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    /// Set when ingredient rows could not all be read.
    pub partial_read: Option<StoreError>,
}

impl RecipeDetails {
    pub fn is_complete(&self) -> bool {
        self.partial_read.is_none()
    }
}

/// Persistence service over one owned SQLite connection.
pub struct RecipeService {
    config: StoreConfig,
    conn: Option<Connection>,
}

impl RecipeService {
    /// Creates a disconnected service. No I/O happens until first use.
    pub fn new(config: StoreConfig) -> Self {
        Self { config, conn: None }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Opens a connection unless a live one is already held.
    ///
    /// # Errors
    /// - `StoreError::Connection` with the driver message when opening or
    ///   bootstrapping the database fails.
    pub fn connect(&mut self) -> StoreResult<()> {
        self.live_connection().map(|_| ())
    }

    /// Closes the connection if one is open. Close failures are logged only.
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            close_quietly(conn, self.config.mode_label());
        }
    }

    /// Lists every recipe as id + title, sorted by title.
    ///
    /// Returns an empty list on any failure; see [`Self::try_list_short`].
    pub fn list_short(&mut self) -> Vec<RecipeSummary> {
        self.try_list_short().unwrap_or_default()
    }

    pub fn try_list_short(&mut self) -> StoreResult<Vec<RecipeSummary>> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.list_summaries());
        match &result {
            Ok(items) => debug!(
                "event=recipe_list module=service status=ok count={} duration_ms={}",
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("recipe_list", started_at, err),
        }
        result
    }

    /// Lists recipes whose title contains `query`, ignoring ASCII case.
    ///
    /// `query` is used as-is: no trimming, and `%`/`_` act as wildcards.
    /// Callers should send blank input to [`Self::list_short`] instead, or
    /// use [`Self::search_or_list`].
    pub fn search(&mut self, query: &str) -> Vec<RecipeSummary> {
        self.try_search(query).unwrap_or_default()
    }

    pub fn try_search(&mut self, query: &str) -> StoreResult<Vec<RecipeSummary>> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.search_summaries(query));
        match &result {
            Ok(items) => debug!(
                "event=recipe_search module=service status=ok query_len={} count={} duration_ms={}",
                query.chars().count(),
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("recipe_search", started_at, err),
        }
        result
    }

    /// Redirects blank input to the full list, otherwise searches the
    /// trimmed query.
    pub fn search_or_list(&mut self, query: &str) -> Vec<RecipeSummary> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.list_short()
        } else {
            self.search(trimmed)
        }
    }

    /// Loads one full recipe including its ingredients in storage order.
    ///
    /// If the ingredient rows fail to load, the recipe is still returned
    /// with the ingredients read so far.
    pub fn get_details(&mut self, id: RecipeId) -> Option<Recipe> {
        self.try_get_details(id)
            .ok()
            .flatten()
            .map(|details| details.recipe)
    }

    pub fn try_get_details(&mut self, id: RecipeId) -> StoreResult<Option<RecipeDetails>> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| {
            let Some(mut recipe) = repo.get_recipe(id)? else {
                return Ok(None);
            };
            let mut ingredients = Vec::new();
            let ingredient_error = repo.load_ingredients_into(id, &mut ingredients).err();
            recipe.ingredients = ingredients;
            Ok(Some((recipe, ingredient_error)))
        });

        let found = match result {
            Ok(found) => found,
            Err(err) => {
                log_failure("recipe_details", started_at, &err);
                return Err(err);
            }
        };

        let Some((recipe, ingredient_error)) = found else {
            debug!(
                "event=recipe_details module=service status=not_found recipe_id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Ok(None);
        };

        let partial_read = ingredient_error.map(|source| StoreError::PartialRead {
            recipe_id: id,
            source,
        });
        match &partial_read {
            Some(err) => warn!(
                "event=recipe_details module=service status=partial recipe_id={id} ingredients_read={} duration_ms={} error_code={} error={}",
                recipe.ingredients.len(),
                started_at.elapsed().as_millis(),
                err.error_code(),
                err
            ),
            None => debug!(
                "event=recipe_details module=service status=ok recipe_id={id} ingredients={} duration_ms={}",
                recipe.ingredients.len(),
                started_at.elapsed().as_millis()
            ),
        }

        Ok(Some(RecipeDetails {
            recipe,
            partial_read,
        }))
    }

    /// Saves a new recipe and its ingredients atomically.
    ///
    /// On success the generated id is written into `recipe.id` and into
    /// every ingredient's `recipe_id`. On failure `recipe` is unchanged.
    pub fn save(&mut self, recipe: &mut Recipe) -> bool {
        match self.try_save(recipe) {
            Ok(id) => {
                recipe.assign_id(id);
                true
            }
            Err(_) => false,
        }
    }

    /// Saves a new recipe and returns its generated id without touching
    /// the caller's record.
    ///
    /// # Errors
    /// - `StoreError::Query(RepoError::Validation(..))` when the recipe
    ///   already carries an id or fails validation.
    pub fn try_save(&mut self, recipe: &Recipe) -> StoreResult<RecipeId> {
        let started_at = Instant::now();
        let result = match recipe.persisted_id() {
            Some(existing) => Err(StoreError::Query(RepoError::Validation(
                RecipeValidationError::AlreadyPersisted(existing),
            ))),
            None => self.with_repo(|repo| repo.insert_recipe(recipe)),
        };
        match &result {
            Ok(id) => info!(
                "event=recipe_save module=service status=ok recipe_id={id} ingredients={} duration_ms={}",
                recipe.ingredients.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("recipe_save", started_at, err),
        }
        result
    }

    /// Replaces an existing recipe and its full ingredient set atomically.
    ///
    /// Returns `false` when the id is missing or unknown; nothing changes in
    /// storage in that case.
    pub fn update(&mut self, recipe: &Recipe) -> bool {
        self.try_update(recipe).is_ok()
    }

    pub fn try_update(&mut self, recipe: &Recipe) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.replace_recipe(recipe));
        match &result {
            Ok(()) => info!(
                "event=recipe_update module=service status=ok recipe_id={} ingredients={} duration_ms={}",
                recipe.id.unwrap_or_default(),
                recipe.ingredients.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("recipe_update", started_at, err),
        }
        result
    }

    /// Deletes a recipe; its ingredients go with it via storage cascade.
    ///
    /// Returns `true` only when a row was removed.
    pub fn delete(&mut self, id: RecipeId) -> bool {
        self.try_delete(id).unwrap_or(false)
    }

    pub fn try_delete(&mut self, id: RecipeId) -> StoreResult<bool> {
        let started_at = Instant::now();
        let result = self.with_repo(|repo| repo.delete_recipe(id));
        match &result {
            Ok(removed) => info!(
                "event=recipe_delete module=service status=ok recipe_id={id} removed={removed} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("recipe_delete", started_at, err),
        }
        result
    }

    fn with_repo<T>(
        &mut self,
        f: impl FnOnce(&mut SqliteRecipeRepository<'_>) -> RepoResult<T>,
    ) -> StoreResult<T> {
        let conn = self.live_connection()?;
        let mut repo = SqliteRecipeRepository::new(conn);
        f(&mut repo).map_err(StoreError::from)
    }

    fn live_connection(&mut self) -> StoreResult<&mut Connection> {
        if let Some(conn) = self.conn.take() {
            if connection_is_alive(&conn) {
                return Ok(self.conn.insert(conn));
            }
            warn!(
                "event=db_reconnect module=service status=start mode={} reason=stale_connection",
                self.config.mode_label()
            );
            close_quietly(conn, self.config.mode_label());
        }

        let conn = open_with_config(&self.config).map_err(StoreError::Connection)?;
        Ok(self.conn.insert(conn))
    }
}

fn connection_is_alive(conn: &Connection) -> bool {
    conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))
        .is_ok()
}

fn close_quietly(conn: Connection, mode: &str) {
    match conn.close() {
        Ok(()) => info!("event=db_close module=service status=ok mode={mode}"),
        Err((_conn, err)) => {
            let err = DbError::Sqlite(err);
            warn!(
                "event=db_close module=service status=error mode={mode} error_code={} error={}",
                err.error_code(),
                err
            );
        }
    }
}

fn log_failure(event: &str, started_at: Instant, err: &StoreError) {
    error!(
        "event={event} module=service status=error duration_ms={} error_code={} error={}",
        started_at.elapsed().as_millis(),
        err.error_code(),
        err
    );
}
