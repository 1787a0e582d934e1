//! Core use-case services.
//!
//! # Responsibility
//! - Own the storage connection on behalf of UI callers.
//! - Keep UI/FFI layers decoupled from repository and SQL details.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod recipe_service;
