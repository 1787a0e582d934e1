use recipebox_core::db::open_db_in_memory;
use recipebox_core::{
    Ingredient, Recipe, RecipeRepository, RecipeService, RepoError, SqliteRecipeRepository,
    StoreConfig, StoreError,
};
use rusqlite::Connection;

fn memory_service() -> RecipeService {
    RecipeService::new(StoreConfig::in_memory())
}

fn ingredient(quantity: &str, unit: &str, name: &str) -> Ingredient {
    Ingredient::new(name, Some(quantity), Some(unit)).unwrap()
}

fn cake(title: &str) -> Recipe {
    let mut recipe = Recipe::new(title).unwrap();
    recipe.set_instructions(Some("Alles verrühren und backen."));
    recipe.preparation_time_minutes = Some(60);
    recipe.set_difficulty(Some("Mittel"));
    recipe.set_notes(Some("Schmeckt am zweiten Tag besser."));
    recipe.add_ingredient(ingredient("200", "g", "Mehl"));
    recipe.add_ingredient(ingredient("3", "", "Eier"));
    recipe.add_ingredient(ingredient("", "", "Salz"));
    recipe
}

fn line_parts(recipe: &Recipe) -> Vec<(String, String, String)> {
    recipe
        .ingredients
        .iter()
        .map(|item| (item.quantity.clone(), item.unit.clone(), item.name.clone()))
        .collect()
}

#[test]
fn save_then_get_details_roundtrip() {
    let mut service = memory_service();
    let mut recipe = cake("Apfelkuchen");

    assert!(service.save(&mut recipe));
    let id = recipe.id.expect("save should assign id");
    assert!(id > 0);
    assert!(recipe
        .ingredients
        .iter()
        .all(|item| item.recipe_id == Some(id)));

    let loaded = service.get_details(id).expect("saved recipe should load");
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.title, recipe.title);
    assert_eq!(loaded.instructions, recipe.instructions);
    assert_eq!(loaded.preparation_time_minutes, Some(60));
    assert_eq!(loaded.difficulty, "Mittel");
    assert_eq!(loaded.notes, recipe.notes);
    assert_eq!(line_parts(&loaded), line_parts(&recipe));
    assert!(loaded.ingredients.iter().all(|item| item.id.is_some()));
    assert_eq!(loaded.ingredients, recipe.ingredients);
}

#[test]
fn preparation_time_keeps_absent_and_zero_apart() {
    let mut service = memory_service();

    let mut without_time = Recipe::new("Wasser").unwrap();
    let mut zero_time = Recipe::new("Brot vom Bäcker").unwrap();
    zero_time.preparation_time_minutes = Some(0);
    assert!(service.save(&mut without_time));
    assert!(service.save(&mut zero_time));

    let loaded = service.get_details(without_time.id.unwrap()).unwrap();
    assert_eq!(loaded.preparation_time_minutes, None);
    let loaded = service.get_details(zero_time.id.unwrap()).unwrap();
    assert_eq!(loaded.preparation_time_minutes, Some(0));
}

#[test]
fn missing_optional_text_reads_back_as_empty() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO Recipes (title, instructions, difficulty, notes) VALUES ('Tee', NULL, NULL, NULL);",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO Ingredients (recipe_id, name, quantity, unit) VALUES (?1, 'Wasser', NULL, NULL);",
        [id],
    )
    .unwrap();

    let repo = SqliteRecipeRepository::new(&mut conn);
    let recipe = repo.get_recipe(id).unwrap().unwrap();
    assert_eq!(recipe.instructions, "");
    assert_eq!(recipe.difficulty, "");
    assert_eq!(recipe.notes, "");

    let mut ingredients = Vec::new();
    repo.load_ingredients_into(id, &mut ingredients).unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0].quantity, "");
    assert_eq!(ingredients[0].unit, "");
    assert_eq!(ingredients[0].to_string(), "Wasser");
}

#[test]
fn update_replaces_full_ingredient_set() {
    let mut service = memory_service();
    let mut recipe = cake("Apfelkuchen");
    assert!(service.save(&mut recipe));
    let id = recipe.id.unwrap();

    recipe.title = "Apfelkuchen vom Blech".to_string();
    recipe.preparation_time_minutes = None;
    recipe.ingredients = vec![ingredient("1", "kg", "Äpfel")];
    assert!(service.update(&recipe));

    let loaded = service.get_details(id).unwrap();
    assert_eq!(loaded.title, "Apfelkuchen vom Blech");
    assert_eq!(loaded.preparation_time_minutes, None);
    assert_eq!(
        line_parts(&loaded),
        vec![("1".to_string(), "kg".to_string(), "Äpfel".to_string())]
    );
}

#[test]
fn update_of_unknown_or_unsaved_recipe_returns_false() {
    let mut service = memory_service();

    let unsaved = cake("Nie gespeichert");
    assert!(!service.update(&unsaved));

    let mut ghost = cake("Geist");
    ghost.id = Some(4242);
    assert!(!service.update(&ghost));
    assert!(matches!(
        service.try_update(&ghost),
        Err(StoreError::Query(RepoError::NotFound(4242)))
    ));
    assert!(service.list_short().is_empty());
}

#[test]
fn search_matches_substring_case_insensitively_sorted_by_title() {
    let mut service = memory_service();
    for title in ["Schokokuchen", "Apfelkuchen", "Linsensuppe"] {
        let mut recipe = Recipe::new(title).unwrap();
        assert!(service.save(&mut recipe));
    }

    let titles = |items: Vec<recipebox_core::RecipeSummary>| {
        items.into_iter().map(|item| item.title).collect::<Vec<_>>()
    };

    assert_eq!(
        titles(service.search("kuchen")),
        vec!["Apfelkuchen", "Schokokuchen"]
    );
    assert_eq!(titles(service.search("APFEL")), vec!["Apfelkuchen"]);
    assert!(service.search("xyz").is_empty());
    assert_eq!(
        titles(service.list_short()),
        vec!["Apfelkuchen", "Linsensuppe", "Schokokuchen"]
    );
}

#[test]
fn search_and_ordering_fold_umlauts() {
    let mut service = memory_service();
    for title in ["Äpfelstrudel", "Zwiebelkuchen", "Apfelkuchen"] {
        let mut recipe = Recipe::new(title).unwrap();
        assert!(service.save(&mut recipe));
    }

    let titles = |items: Vec<recipebox_core::RecipeSummary>| {
        items.into_iter().map(|item| item.title).collect::<Vec<_>>()
    };

    assert_eq!(titles(service.search("äpfel")), vec!["Äpfelstrudel"]);
    assert_eq!(titles(service.search("ÄPFEL")), vec!["Äpfelstrudel"]);
    assert_eq!(titles(service.search("a\u{308}pfel")), vec!["Äpfelstrudel"]);
    assert_eq!(
        titles(service.search("%kuchen")),
        vec!["Apfelkuchen", "Zwiebelkuchen"]
    );
    assert_eq!(
        titles(service.list_short()),
        vec!["Apfelkuchen", "Äpfelstrudel", "Zwiebelkuchen"]
    );
}

#[test]
fn out_of_range_stored_time_reads_as_unspecified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipebox.db");
    let mut service = RecipeService::new(StoreConfig::file(&path));
    let mut recipe = cake("Apfelkuchen");
    assert!(service.save(&mut recipe));
    let id = recipe.id.unwrap();

    let raw = Connection::open(&path).unwrap();
    raw.execute(
        "UPDATE Recipes SET preparation_time_minutes = -5 WHERE recipe_id = ?1;",
        [id],
    )
    .unwrap();
    drop(raw);

    let loaded = service.get_details(id).expect("recipe should still load");
    assert_eq!(loaded.title, "Apfelkuchen");
    assert_eq!(loaded.preparation_time_minutes, None);
    assert_eq!(loaded.ingredients.len(), 3);
    assert!(service.try_get_details(id).unwrap().unwrap().is_complete());
}

#[test]
fn search_wildcards_are_not_escaped() {
    let mut service = memory_service();
    for title in ["Apfelkuchen", "Linsensuppe"] {
        let mut recipe = Recipe::new(title).unwrap();
        assert!(service.save(&mut recipe));
    }

    assert_eq!(service.search("%").len(), 2);
    assert_eq!(service.search("Apfel_uchen").len(), 1);
}

#[test]
fn delete_cascades_to_ingredients() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipebox.db");
    let mut service = RecipeService::new(StoreConfig::file(&path));
    let mut recipe = cake("Apfelkuchen");
    assert!(service.save(&mut recipe));
    let id = recipe.id.unwrap();

    assert!(service.delete(id));
    assert!(service.get_details(id).is_none());
    assert!(!service.delete(id));

    let conn = Connection::open(&path).unwrap();
    let leftovers: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM Ingredients WHERE recipe_id = ?1;",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(leftovers, 0);
}

#[test]
fn tea_scenario_save_update_delete() {
    let mut service = memory_service();

    let mut tea = Recipe::new("Tee").unwrap();
    tea.add_ingredient(ingredient("1", "TL", "Zucker"));
    assert!(service.save(&mut tea));
    let id = tea.id.unwrap();
    assert!(id > 0);
    assert_eq!(service.get_details(id).unwrap().ingredients.len(), 1);

    tea.ingredients.clear();
    assert!(service.update(&tea));
    assert!(service.get_details(id).unwrap().ingredients.is_empty());

    assert!(service.delete(id));
    assert!(service.get_details(id).is_none());
}

#[test]
fn get_details_of_unknown_id_is_absent() {
    let mut service = memory_service();
    assert!(service.get_details(99).is_none());
    assert!(service.try_get_details(99).unwrap().is_none());
}

#[test]
fn save_rejects_blank_ingredient_name_before_storage() {
    let mut service = memory_service();
    let mut recipe = Recipe::new("Suppe").unwrap();
    let mut blank = ingredient("1", "l", "Wasser");
    blank.name = "  ".to_string();
    recipe.ingredients.push(blank);

    assert!(!service.save(&mut recipe));
    assert_eq!(recipe.id, None);
    assert!(service.list_short().is_empty());
}
