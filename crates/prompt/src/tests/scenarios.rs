//! End-to-end scenarios across codec, resolver, display names and references.

use crate::display::{calculate_display_names, NameEntry};
use crate::id::{generate_id, parse_id};
use crate::lookup::{MemoryStore, PromptLookup};
use crate::references::find_references;
use crate::resolver::{expand, ResolutionContext, ResolverOptions};
use crate::types::Prompt;
use std::collections::{BTreeSet, HashSet};
use stitch_core::AppError;

/// Build a store from `(directory, name, content)` triples.
fn store(prompts: &[(&str, &str, &str)]) -> MemoryStore {
    prompts
        .iter()
        .map(|(dir, name, content)| Prompt::new(*dir, name, *content).unwrap())
        .collect()
}

fn get(store: &MemoryStore, id: &str) -> Prompt {
    store.get_by_id(id).unwrap().unwrap()
}

#[test]
fn test_simple_inclusion() {
    let store = store(&[("/p1", "A", "see [[B]]"), ("/p1", "B", "leaf")]);
    let a = get(&store, "/p1/A");

    let result = expand(
        &store,
        &a.content,
        &ResolutionContext::in_directory("/p1"),
        &ResolverOptions::default(),
    )
    .unwrap();

    assert_eq!(result.text, "see leaf");
    assert_eq!(
        result.dependencies,
        BTreeSet::from([generate_id("/p1", "B").unwrap()])
    );
    assert!(result.warnings.is_empty());
}

#[test]
fn test_self_reference_terminates() {
    let store = store(&[("/p1", "A", "[[A]]")]);
    let a = get(&store, "/p1/A");

    // Expanding from a bare directory context still stops after one level
    let result = expand(
        &store,
        &a.content,
        &ResolutionContext::in_directory("/p1"),
        &ResolverOptions::unbounded(),
    )
    .unwrap();

    assert!(result.text.contains("CIRCULAR DEPENDENCY: A"));
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_one_warning_per_cycle_edge() {
    // Two independent cycles reachable from the root: A<->B and C->D->C
    let store = store(&[
        ("/g", "root", "[[A]] [[C]]"),
        ("/g", "A", "[[B]]"),
        ("/g", "B", "[[A]]"),
        ("/g", "C", "[[D]]"),
        ("/g", "D", "[[C]]"),
    ]);
    let root = get(&store, "/g/root");

    let result = expand(
        &store,
        &root.content,
        &ResolutionContext::for_prompt(&root),
        &ResolverOptions::unbounded(),
    )
    .unwrap();

    assert_eq!(
        result.text,
        "[[CIRCULAR DEPENDENCY: A]] [[CIRCULAR DEPENDENCY: C]]"
    );
    assert_eq!(
        result.warnings,
        vec![
            "Circular dependency detected: A",
            "Circular dependency detected: C",
        ]
    );
    assert_eq!(result.dependencies.len(), 4);
}

#[test]
fn test_two_projects_display_names() {
    let id1 = generate_id("/proj1", "setup").unwrap();
    let id2 = generate_id("/proj2", "setup").unwrap();

    let table = calculate_display_names(vec![
        NameEntry::new(&id1, "setup", "/proj1"),
        NameEntry::new(&id2, "setup", "/proj2"),
    ]);

    assert_eq!(table.get(&id1), Some("proj1:setup"));
    assert_eq!(table.get(&id2), Some("proj2:setup"));
}

#[test]
fn test_display_names_from_store() {
    let store = store(&[
        ("/team/a", "setup", ""),
        ("/team/b", "setup", ""),
        ("/team/c", "setup", ""),
        ("/team/d", "setup", ""),
        ("/team/e", "setup", ""),
        ("/team/e/sub", "setup", ""),
        ("/team/a", "review", ""),
    ]);

    let table = calculate_display_names(store.iter().map(NameEntry::from));
    let labels: HashSet<&String> = table.names.values().collect();
    assert_eq!(labels.len(), store.len());
    assert_eq!(table.get("/team/a/review"), Some("review"));
    assert_eq!(table.get("/team/e/sub/setup"), Some("sub:setup"));
}

#[test]
fn test_references_scenario() {
    let store = store(&[
        ("/p1", "A", "see [[B]]"),
        ("/p1", "B", "leaf"),
        ("/p1", "C", "unrelated"),
    ]);

    let refs = find_references(&store, "/p1/B", &ResolverOptions::default()).unwrap();
    let ids: Vec<&str> = refs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["/p1/A"]);

    let missing = find_references(&store, "nonexistent", &ResolverOptions::default());
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[test]
fn test_ids_of_stored_prompts_round_trip() {
    let store = store(&[
        ("/p1", "A", ""),
        ("/deep/er/path", "B", ""),
        ("", "C", ""),
    ]);

    for prompt in store.iter() {
        let (dir, name) = parse_id(&prompt.id).unwrap();
        assert_eq!(dir, prompt.directory);
        assert_eq!(name, prompt.name);
    }
}
