//! Recipe domain model.
//!
//! # Responsibility
//! - Define the full recipe record used by detail and edit views.
//! - Define the short projection used by list/search results.
//! - Provide the write-path validation shared by every repository.
//!
//! # Invariants
//! - `title` must be non-blank before persistence.
//! - Optional text fields hold the empty string instead of "no value".
//! - `preparation_time_minutes = None` means "not specified" and is distinct
//!   from `Some(0)`.
//! - Every ingredient's `recipe_id` equals `id` once the recipe is persisted.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::ingredient::Ingredient;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Database-assigned recipe identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecipeId = i64;

/// Difficulty levels offered by the edit dialog.
///
/// Storage keeps difficulty as free text, so values outside this set
/// survive a round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Einfach,
    Mittel,
    Schwer,
}

impl Difficulty {
    /// All levels in the order the UI presents them.
    pub const ALL: [Difficulty; 3] = [Self::Einfach, Self::Mittel, Self::Schwer];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Einfach => "Einfach",
            Self::Mittel => "Mittel",
            Self::Schwer => "Schwer",
        }
    }

    /// Parses an exact stored label. Unknown labels return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == value.trim())
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failure for recipe write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    EmptyTitle,
    /// `position` is the zero-based index inside the recipe, when known.
    EmptyIngredientName { position: Option<usize> },
    InvalidId(RecipeId),
    /// A new-recipe save was given a record that already has an id.
    AlreadyPersisted(RecipeId),
}

impl Display for RecipeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "recipe title must not be empty"),
            Self::EmptyIngredientName {
                position: Some(position),
            } => write!(f, "ingredient #{} has an empty name", position + 1),
            Self::EmptyIngredientName { position: None } => {
                write!(f, "ingredient name must not be empty")
            }
            Self::InvalidId(id) => write!(f, "recipe id must be positive, got {id}"),
            Self::AlreadyPersisted(id) => {
                write!(f, "recipe {id} is already stored; use update instead")
            }
        }
    }
}

impl Error for RecipeValidationError {}

/// Short projection carrying only id and title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
}

impl Display for RecipeSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Full recipe record including its ordered ingredient lines.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// `None` until the recipe has been saved.
    pub id: Option<RecipeId>,
    pub title: String,
    pub instructions: String,
    pub preparation_time_minutes: Option<u32>,
    /// Free text; the UI offers [`Difficulty`] labels.
    pub difficulty: String,
    pub notes: String,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Creates an unsaved recipe with empty optional fields.
    ///
    /// # Errors
    /// - Returns `RecipeValidationError::EmptyTitle` for blank titles.
    pub fn new(title: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }

        Ok(Self {
            id: None,
            title,
            instructions: String::new(),
            preparation_time_minutes: None,
            difficulty: String::new(),
            notes: String::new(),
            ingredients: Vec::new(),
        })
    }

    pub fn set_instructions(&mut self, instructions: Option<&str>) {
        self.instructions = instructions.unwrap_or_default().to_string();
    }

    pub fn set_difficulty(&mut self, difficulty: Option<&str>) {
        self.difficulty = difficulty.unwrap_or_default().to_string();
    }

    pub fn set_notes(&mut self, notes: Option<&str>) {
        self.notes = notes.unwrap_or_default().to_string();
    }

    /// Returns the difficulty as a known level, if it is one.
    pub fn difficulty_level(&self) -> Option<Difficulty> {
        Difficulty::parse(&self.difficulty)
    }

    /// Appends an ingredient, stamping this recipe's id on it when persisted.
    pub fn add_ingredient(&mut self, mut ingredient: Ingredient) {
        if let Some(id) = self.persisted_id() {
            ingredient.recipe_id = Some(id);
        }
        self.ingredients.push(ingredient);
    }

    /// Removes the first ingredient equal to `ingredient`.
    ///
    /// Returns whether an element was removed.
    pub fn remove_ingredient(&mut self, ingredient: &Ingredient) -> bool {
        match self.ingredients.iter().position(|item| item == ingredient) {
            Some(index) => {
                self.ingredients.remove(index);
                true
            }
            None => false,
        }
    }

    /// Records the storage id and propagates it to all ingredient lines.
    pub(crate) fn assign_id(&mut self, id: RecipeId) {
        self.id = Some(id);
        for ingredient in &mut self.ingredients {
            ingredient.recipe_id = Some(id);
        }
    }

    /// Returns the short projection when this recipe is persisted.
    pub fn summary(&self) -> Option<RecipeSummary> {
        self.persisted_id().map(|id| RecipeSummary {
            id,
            title: self.title.clone(),
        })
    }

    /// Checks write-path invariants: non-blank title and ingredient names.
    pub fn validate(&self) -> Result<(), RecipeValidationError> {
        if self.title.trim().is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        for (position, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.validate().is_err() {
                return Err(RecipeValidationError::EmptyIngredientName {
                    position: Some(position),
                });
            }
        }
        Ok(())
    }

    /// Returns the id when it is a persisted (`> 0`) value.
    pub fn persisted_id(&self) -> Option<RecipeId> {
        self.id.filter(|id| *id > 0)
    }
}

impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(left), Some(right)) = (self.persisted_id(), other.persisted_id()) {
            return left == right;
        }
        self.title == other.title && self.ingredients == other.ingredients
    }
}

/// List views render a recipe by its title.
impl Display for Recipe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::{Difficulty, Recipe, RecipeValidationError};
    use crate::model::ingredient::Ingredient;

    fn zucker() -> Ingredient {
        Ingredient::new("Zucker", Some("1"), Some("TL")).unwrap()
    }

    #[test]
    fn new_rejects_blank_title() {
        assert_eq!(
            Recipe::new("  ").unwrap_err(),
            RecipeValidationError::EmptyTitle
        );
    }

    #[test]
    fn new_starts_with_empty_optional_fields() {
        let recipe = Recipe::new("Tee").unwrap();
        assert_eq!(recipe.id, None);
        assert_eq!(recipe.instructions, "");
        assert_eq!(recipe.difficulty, "");
        assert_eq!(recipe.notes, "");
        assert_eq!(recipe.preparation_time_minutes, None);
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn add_ingredient_stamps_recipe_id_only_when_persisted() {
        let mut recipe = Recipe::new("Tee").unwrap();
        recipe.add_ingredient(zucker());
        assert_eq!(recipe.ingredients[0].recipe_id, None);

        recipe.id = Some(12);
        recipe.add_ingredient(zucker());
        assert_eq!(recipe.ingredients[1].recipe_id, Some(12));
    }

    #[test]
    fn assign_id_propagates_to_ingredients() {
        let mut recipe = Recipe::new("Tee").unwrap();
        recipe.add_ingredient(zucker());
        recipe.assign_id(5);
        assert_eq!(recipe.id, Some(5));
        assert_eq!(recipe.ingredients[0].recipe_id, Some(5));
    }

    #[test]
    fn remove_ingredient_removes_first_match() {
        let mut recipe = Recipe::new("Tee").unwrap();
        recipe.add_ingredient(zucker());
        recipe.add_ingredient(Ingredient::new("Zitrone", None, None).unwrap());

        assert!(recipe.remove_ingredient(&zucker()));
        assert_eq!(recipe.ingredients.len(), 1);
        assert!(!recipe.remove_ingredient(&zucker()));
    }

    #[test]
    fn validate_reports_position_of_blank_ingredient() {
        let mut recipe = Recipe::new("Tee").unwrap();
        recipe.add_ingredient(zucker());
        let mut blank = zucker();
        blank.name = " ".to_string();
        recipe.ingredients.push(blank);

        assert_eq!(
            recipe.validate().unwrap_err(),
            RecipeValidationError::EmptyIngredientName { position: Some(1) }
        );
    }

    #[test]
    fn equality_uses_ids_then_title_and_ingredients() {
        let mut left = Recipe::new("Tee").unwrap();
        let mut right = Recipe::new("Kaffee").unwrap();
        left.id = Some(1);
        right.id = Some(1);
        assert_eq!(left, right);

        right.id = None;
        assert_ne!(left, right);

        right.title = "Tee".to_string();
        right.notes = "anders".to_string();
        assert_eq!(left, right);
    }

    #[test]
    fn difficulty_parses_known_labels_only() {
        assert_eq!(Difficulty::parse("Mittel"), Some(Difficulty::Mittel));
        assert_eq!(Difficulty::parse("mittel"), None);

        let mut recipe = Recipe::new("Tee").unwrap();
        recipe.set_difficulty(Some("Schwer"));
        assert_eq!(recipe.difficulty_level(), Some(Difficulty::Schwer));
        recipe.set_difficulty(None);
        assert_eq!(recipe.difficulty, "");
        assert_eq!(recipe.difficulty_level(), None);
    }

    #[test]
    fn summary_requires_persisted_id() {
        let mut recipe = Recipe::new("Tee").unwrap();
        assert!(recipe.summary().is_none());
        recipe.id = Some(4);
        let summary = recipe.summary().unwrap();
        assert_eq!(summary.id, 4);
        assert_eq!(summary.to_string(), "Tee");
    }
}
