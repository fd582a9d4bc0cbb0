//! End-to-end ingest and search over a small banking corpus

mod common;

use common::{ingest, BANKING};
use semwiki::{Advisory, EdgeId, ResolutionOrigin, SearchOptions, WikiEngine};

fn create_banking_engine() -> WikiEngine {
    let mut engine = WikiEngine::new();
    ingest(&mut engine, BANKING);
    engine
}

#[test]
fn test_sense_parent_resolves_under_registered_path() {
    let engine = create_banking_engine();
    let taxonomy = engine.taxonomy();

    assert_eq!(
        taxonomy.classification_of("bank"),
        Some("institution/financial/bank")
    );
    assert_eq!(
        taxonomy.classification_of("credit_union"),
        Some("institution/financial/bank/credit_union")
    );
    assert_eq!(
        taxonomy.search_of("institution/financial/bank/credit_union"),
        Some("credit_union")
    );

    // The is_a edge points at the concept, not at the sense-qualified name
    let graph = engine.graph();
    assert!(graph.contains_edge(&EdgeId::new("credit_union", "is_a", "bank")));
    assert!(graph.contains_edge(&EdgeId::new("bank", "has_instance", "credit_union")));
    assert!(graph.node("bank/financial").is_none());
}

#[test]
fn test_edges_and_placeholders() {
    let engine = create_banking_engine();
    let graph = engine.graph();

    // is_a x2, offers x2, each with an inverse
    assert_eq!(graph.edge_count(), 8);
    assert!(graph.missing_inverses().is_empty());
    assert!(graph.contains_edge(&EdgeId::new("loans", "offered_by", "bank")));

    let parent = graph.node("institution/financial").unwrap();
    assert!(parent.is_placeholder());
    assert!(!graph.is_defined("institution/financial"));
    assert!(graph.is_defined("credit_union"));
}

#[test]
fn test_search_bank_ranks_exact_concept_first() {
    let engine = create_banking_engine();
    let mut search = engine.search_engine();
    let results = search.search("bank", &SearchOptions::new().with_hierarchy());

    let first = &results[0];
    assert_eq!(first.classification_path, "institution/financial/bank");
    assert_eq!(first.specificity, 3);
    assert_eq!(first.search_path, "bank");
    assert_eq!(
        first.hierarchy.as_deref(),
        Some(&["institution/financial".to_string()][..])
    );
    // credit_union truncates to the same path and is deduplicated away
    assert!(results
        .iter()
        .all(|r| r.classification_path != "institution/financial/bank/credit_union"));
}

#[test]
fn test_ancestors_follow_primary_chain() {
    let engine = create_banking_engine();
    let mut search = engine.search_engine();
    assert_eq!(
        search.ancestors("institution/financial/bank/credit_union"),
        ["institution/financial/bank", "institution/financial"]
    );
}

#[test]
fn test_advisories_do_not_block_ingest() {
    let mut engine = WikiEngine::new();
    let reports = ingest(&mut engine, BANKING);

    assert!(reports[0].advisories.iter().any(|a| matches!(
        a,
        Advisory::MissingParent { parent, .. } if parent == "institution"
    )));
    // concepts/bank.md is not where the classification places bank
    assert!(reports[0]
        .advisories
        .iter()
        .any(|a| matches!(a, Advisory::LocationMismatch { concept, .. } if concept == "bank")));
    assert_eq!(reports[0].concepts[0].origin, ResolutionOrigin::Declared);
    assert_eq!(engine.graph().node_count(), 5);
}

#[test]
fn test_concept_files_are_staged_for_declared_paths() {
    let engine = create_banking_engine();
    let files: Vec<&str> = engine
        .staged_changes()
        .iter()
        .map(|c| c.file.as_str())
        .collect();
    assert_eq!(
        files,
        [
            "concepts/institution/financial/bank.md",
            "concepts/institution/financial/bank/credit_union.md"
        ]
    );
}

#[test]
fn test_reingest_is_idempotent() {
    let mut engine = create_banking_engine();
    let edges = engine.graph().edge_count();
    let staged = engine.staged_changes().len();

    let reports = ingest(&mut engine, BANKING);
    assert_eq!(reports[1].concepts[0].origin, ResolutionOrigin::Existing);
    assert_eq!(
        reports[1].concepts[0].classification_path,
        "institution/financial/bank/credit_union"
    );
    assert_eq!(engine.graph().edge_count(), edges);
    assert_eq!(engine.staged_changes().len(), staged);
    assert!(reports.iter().all(|r| r.edges_added == 0));
}

#[test]
fn test_missing_references_after_batch() {
    let mut engine = create_banking_engine();
    assert!(engine.graph().missing_references().is_empty());

    ingest(
        &mut engine,
        &[(
            "notes/todo.md",
            "Ask the [[credt_union]] about a [[mortgage]].\n",
        )],
    );
    let missing = engine.graph().missing_references();
    assert_eq!(missing.len(), 2);
    assert_eq!(missing[0].reference, "credt_union");
    assert_eq!(missing[0].context, "notes/todo.md");
    assert_eq!(missing[0].suggestions, ["credit_union"]);
    assert_eq!(missing[1].reference, "mortgage");
    assert!(missing[1].suggestions.is_empty());

    // Defining the concept later clears it from the next batch
    ingest(&mut engine, &[("concepts/mortgage.md", "[[mortgage]]{offered_by: bank}\n")]);
    let missing = engine.graph().missing_references();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].reference, "credt_union");
}
