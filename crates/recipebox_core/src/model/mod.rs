//! Recipe domain model.
//!
//! # Responsibility
//! - Define the recipe/ingredient records shared by storage, services and UI
//!   bridges.
//! - Keep edit-form conversion rules next to the records they produce.
//!
//! # Invariants
//! - Records never hold "no value" text; optional text is the empty string.
//! - Ids are assigned by storage only.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod draft;
pub mod ingredient;
pub mod recipe;
