//! Flutter bridge for RecipeBox core.

pub mod api;
