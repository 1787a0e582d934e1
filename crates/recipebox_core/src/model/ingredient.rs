//! Ingredient line item model.
//!
//! # Responsibility
//! - Define one free-form ingredient line owned by a recipe.
//! - Normalize optional text fields to empty strings.
//!
//! # Invariants
//! - `name` is never blank once constructed through [`Ingredient::new`].
//! - `quantity` and `unit` use the empty string as their "unset" value.
//! - `recipe_id` matches the owning recipe id once that recipe is persisted.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::recipe::{RecipeId, RecipeValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Database-assigned identifier of one ingredient row.
pub type IngredientId = i64;

/// One ingredient line: free-text quantity and unit plus a required name.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// `None` until the row is persisted.
    pub id: Option<IngredientId>,
    /// Owning recipe. `None` while the owning recipe is unsaved.
    pub recipe_id: Option<RecipeId>,
    pub name: String,
    pub quantity: String,
    pub unit: String,
}

impl Ingredient {
    /// Creates an unsaved ingredient line.
    ///
    /// # Errors
    /// - Returns `RecipeValidationError::EmptyIngredientName` for blank names.
    pub fn new(
        name: impl Into<String>,
        quantity: Option<&str>,
        unit: Option<&str>,
    ) -> Result<Self, RecipeValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RecipeValidationError::EmptyIngredientName { position: None });
        }

        Ok(Self {
            id: None,
            recipe_id: None,
            name,
            quantity: quantity.unwrap_or_default().to_string(),
            unit: unit.unwrap_or_default().to_string(),
        })
    }

    /// Rebuilds an ingredient from stored column values.
    ///
    /// Nullable text columns are mapped to empty strings.
    pub(crate) fn from_storage(
        id: IngredientId,
        recipe_id: RecipeId,
        name: String,
        quantity: Option<String>,
        unit: Option<String>,
    ) -> Self {
        Self {
            id: Some(id),
            recipe_id: Some(recipe_id),
            name,
            quantity: quantity.unwrap_or_default(),
            unit: unit.unwrap_or_default(),
        }
    }

    pub fn set_quantity(&mut self, quantity: Option<&str>) {
        self.quantity = quantity.unwrap_or_default().to_string();
    }

    pub fn set_unit(&mut self, unit: Option<&str>) {
        self.unit = unit.unwrap_or_default().to_string();
    }

    /// Checks the write-path invariant for this line.
    pub fn validate(&self) -> Result<(), RecipeValidationError> {
        if self.name.trim().is_empty() {
            return Err(RecipeValidationError::EmptyIngredientName { position: None });
        }
        Ok(())
    }

    /// Whether both sides carry a persisted id (`> 0`).
    fn persisted_id(&self) -> Option<IngredientId> {
        self.id.filter(|id| *id > 0)
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(left), Some(right)) = (self.persisted_id(), other.persisted_id()) {
            return left == right;
        }

        self.recipe_id == other.recipe_id
            && self.name == other.name
            && self.quantity == other.quantity
            && self.unit == other.unit
    }
}

/// Renders the display line `quantity unit name`, skipping empty parts.
impl Display for Ingredient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = format!(
            "{} {} {}",
            self.quantity.trim(),
            self.unit.trim(),
            self.name.trim()
        );
        write!(f, "{}", WHITESPACE_RE.replace_all(joined.trim(), " "))
    }
}

#[cfg(test)]
mod tests {
    use super::Ingredient;
    use crate::model::recipe::RecipeValidationError;

    #[test]
    fn new_rejects_blank_name() {
        let err = Ingredient::new("   ", Some("1"), Some("TL")).unwrap_err();
        assert!(matches!(
            err,
            RecipeValidationError::EmptyIngredientName { .. }
        ));
    }

    #[test]
    fn missing_quantity_and_unit_become_empty_strings() {
        let ingredient = Ingredient::new("Salz", None, None).unwrap();
        assert_eq!(ingredient.quantity, "");
        assert_eq!(ingredient.unit, "");
        assert_eq!(ingredient.id, None);
        assert_eq!(ingredient.recipe_id, None);
    }

    #[test]
    fn setters_normalize_none_to_empty() {
        let mut ingredient = Ingredient::new("Mehl", Some("500"), Some("g")).unwrap();
        ingredient.set_quantity(None);
        ingredient.set_unit(None);
        assert_eq!(ingredient.quantity, "");
        assert_eq!(ingredient.unit, "");
    }

    #[test]
    fn display_skips_empty_parts_and_collapses_whitespace() {
        let full = Ingredient::new("Zucker", Some(" 1 "), Some("TL")).unwrap();
        assert_eq!(full.to_string(), "1 TL Zucker");

        let name_only = Ingredient::new("  Prise Salz ", None, Some("  ")).unwrap();
        assert_eq!(name_only.to_string(), "Prise Salz");
    }

    #[test]
    fn equality_prefers_ids_when_both_are_persisted() {
        let mut left = Ingredient::new("Eier", Some("2"), None).unwrap();
        let mut right = Ingredient::new("Milch", Some("200"), Some("ml")).unwrap();
        left.id = Some(7);
        right.id = Some(7);
        assert_eq!(left, right);

        right.id = Some(8);
        assert_ne!(left, right);
    }

    #[test]
    fn equality_falls_back_to_fields_when_an_id_is_missing() {
        let mut saved = Ingredient::new("Eier", Some("2"), None).unwrap();
        saved.id = Some(3);
        let draft = Ingredient::new("Eier", Some("2"), None).unwrap();
        assert_eq!(saved, draft);

        let mut other_recipe = draft.clone();
        other_recipe.recipe_id = Some(99);
        assert_ne!(draft, other_recipe);
    }
}
