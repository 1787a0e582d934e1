//! Unicode-aware text helpers registered on every recipe connection.
//!
//! # Responsibility
//! - Provide `fold_case(text)` for case-insensitive title matching.
//! - Provide the `RECIPE_TITLE` collation for title ordering.
//!
//! # Invariants
//! - `fold_case` is deterministic and maps NULL to NULL.
//! - `RECIPE_TITLE` ignores case and accents first, then breaks ties by case
//!   and finally by raw text, so the order is total.

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const FOLD_CASE_FN: &str = "fold_case";
const TITLE_COLLATION: &str = "RECIPE_TITLE";

pub(super) fn register_text_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        fold_case_sql,
    )?;
    conn.create_collation(TITLE_COLLATION, compare_titles)?;
    Ok(())
}

fn fold_case_sql(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
    Ok(ctx.get::<Option<String>>(0)?.map(|text| fold_case(&text)))
}

/// Composes and lowercases `text` so `Ä`, `ä` and `a\u{308}` compare equal.
fn fold_case(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Lowercased text with accents stripped; `Äpfel` sorts next to `Apfel`.
fn sort_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn compare_titles(left: &str, right: &str) -> Ordering {
    sort_key(left)
        .cmp(&sort_key(right))
        .then_with(|| fold_case(left).cmp(&fold_case(right)))
        .then_with(|| left.cmp(right))
}
