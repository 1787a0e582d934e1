use recipebox_core::{
    CompletionQueue, Recipe, RecipeService, RecipeSummary, SharedRecipeService, StoreConfig,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[test]
fn concurrent_saves_are_serialized_and_all_completions_arrive() {
    let dir = tempfile::tempdir().unwrap();
    let shared = SharedRecipeService::new(RecipeService::new(StoreConfig::file(
        dir.path().join("recipebox.db"),
    )));
    let queue = CompletionQueue::new();
    let saved_ids = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..8)
        .map(|index| {
            let saved_ids = Arc::clone(&saved_ids);
            shared
                .spawn(
                    &queue.sender(),
                    move |service| {
                        let mut recipe = Recipe::new(format!("Rezept {index}")).unwrap();
                        service.save(&mut recipe);
                        recipe.id
                    },
                    move |id| saved_ids.lock().unwrap().push(id),
                )
                .unwrap()
        })
        .collect();

    let mut delivered = 0;
    while delivered < handles.len() {
        assert!(queue.wait_one(Duration::from_secs(5)), "worker result missing");
        delivered += 1;
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let mut ids: Vec<_> = saved_ids.lock().unwrap().iter().map(|id| id.unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(shared.with_service(|service| service.list_short().len()), 8);
}

#[test]
fn blank_search_from_worker_lists_everything() {
    let shared = SharedRecipeService::new(RecipeService::new(StoreConfig::in_memory()));
    shared.with_service(|service| {
        for title in ["Apfelkuchen", "Schokokuchen", "Linsensuppe"] {
            let mut recipe = Recipe::new(title).unwrap();
            assert!(service.save(&mut recipe));
        }
    });

    let queue = CompletionQueue::new();
    let results: Arc<Mutex<Vec<Vec<RecipeSummary>>>> = Arc::new(Mutex::new(Vec::new()));
    for query in ["  ", "kuchen"] {
        let results = Arc::clone(&results);
        shared
            .spawn(
                &queue.sender(),
                move |service| service.search_or_list(query),
                move |found| results.lock().unwrap().push(found),
            )
            .unwrap()
            .join()
            .unwrap();
    }

    assert_eq!(queue.drain(), 2);
    let results = results.lock().unwrap();
    assert_eq!(results[0].len(), 3);
    assert_eq!(results[1].len(), 2);
}
