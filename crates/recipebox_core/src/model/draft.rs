//! Edit-form drafts and their conversion into recipes.
//!
//! # Responsibility
//! - Capture raw edit-dialog input as plain strings.
//! - Apply the dialog's input rules when turning a draft into a `Recipe`.
//!
//! # Invariants
//! - Blank ingredient rows are dropped silently.
//! - A row with quantity or unit but no name rejects the whole draft.
//! - Two or more rows with no name among them reject the draft; a single
//!   blank row means "no ingredients".
//! - Unparseable preparation time is treated as "not specified".

use crate::model::ingredient::Ingredient;
use crate::model::recipe::{Recipe, RecipeValidationError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One raw ingredient row from the edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRow {
    pub quantity: String,
    pub unit: String,
    pub name: String,
}

impl IngredientRow {
    pub fn new(
        quantity: impl Into<String>,
        unit: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            quantity: quantity.into(),
            unit: unit.into(),
            name: name.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.quantity.trim().is_empty()
            && self.unit.trim().is_empty()
            && self.name.trim().is_empty()
    }
}

/// Raw edit-form state for creating or editing one recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    pub instructions: String,
    /// Text typed into the time field; empty means "not specified".
    pub preparation_time: String,
    pub difficulty: Option<String>,
    pub notes: String,
    pub ingredient_rows: Vec<IngredientRow>,
}

/// Draft conversion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    EmptyTitle,
    /// Zero-based index of the offending row.
    IngredientWithoutName { row: usize },
    /// Several rows were offered but none carries a name.
    NoNamedIngredient,
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "recipe title must not be empty"),
            Self::IngredientWithoutName { row } => write!(
                f,
                "ingredient row {} has quantity or unit but no name",
                row + 1
            ),
            Self::NoNamedIngredient => write!(f, "at least one ingredient must have a name"),
        }
    }
}

impl Error for DraftError {}

impl From<RecipeValidationError> for DraftError {
    fn from(value: RecipeValidationError) -> Self {
        match value {
            RecipeValidationError::EmptyIngredientName { position } => {
                Self::IngredientWithoutName {
                    row: position.unwrap_or_default(),
                }
            }
            RecipeValidationError::EmptyTitle
            | RecipeValidationError::InvalidId(_)
            | RecipeValidationError::AlreadyPersisted(_) => Self::EmptyTitle,
        }
    }
}

impl RecipeDraft {
    /// Prefills a draft from an existing recipe, e.g. when opening the editor.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            instructions: recipe.instructions.clone(),
            preparation_time: recipe
                .preparation_time_minutes
                .map(|minutes| minutes.to_string())
                .unwrap_or_default(),
            difficulty: Some(recipe.difficulty.clone()).filter(|value| !value.is_empty()),
            notes: recipe.notes.clone(),
            ingredient_rows: recipe
                .ingredients
                .iter()
                .map(|ingredient| {
                    IngredientRow::new(
                        ingredient.quantity.as_str(),
                        ingredient.unit.as_str(),
                        ingredient.name.as_str(),
                    )
                })
                .collect(),
        }
    }

    /// Builds a new, unsaved recipe from this draft.
    pub fn into_recipe(self) -> Result<Recipe, DraftError> {
        let title = self.title.trim().to_string();
        let mut recipe = Recipe::new(title).map_err(DraftError::from)?;
        self.apply_fields(&mut recipe)?;
        Ok(recipe)
    }

    /// Overwrites every editable field of `recipe`, keeping its id.
    ///
    /// `recipe` is left untouched when the draft is rejected.
    pub fn apply_to(self, recipe: &mut Recipe) -> Result<(), DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }

        let mut edited = recipe.clone();
        edited.title = title.to_string();
        edited.ingredients.clear();
        self.apply_fields(&mut edited)?;
        *recipe = edited;
        Ok(())
    }

    fn apply_fields(self, recipe: &mut Recipe) -> Result<(), DraftError> {
        recipe.set_instructions(Some(self.instructions.trim()));
        recipe.set_notes(Some(self.notes.trim()));
        recipe.set_difficulty(self.difficulty.as_deref().map(str::trim));
        recipe.preparation_time_minutes = parse_preparation_time(&self.preparation_time);

        for (row, input) in self.ingredient_rows.iter().enumerate() {
            if input.is_blank() {
                continue;
            }
            let name = input.name.trim();
            if name.is_empty() {
                return Err(DraftError::IngredientWithoutName { row });
            }
            let ingredient = Ingredient::new(
                name,
                Some(input.quantity.trim()),
                Some(input.unit.trim()),
            )?;
            recipe.add_ingredient(ingredient);
        }

        if recipe.ingredients.is_empty() && self.ingredient_rows.len() > 1 {
            return Err(DraftError::NoNamedIngredient);
        }

        Ok(())
    }
}

/// Parses the time field: empty or invalid input means "not specified".
pub fn parse_preparation_time(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<u32>().ok()
}
