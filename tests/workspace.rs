//! Directory processing and persistence through both backends

mod common;

use common::{write_documents, BANKING};
use semwiki::config::WORKSPACE_CONFIG_FILE;
use semwiki::storage::{CHANGELOG_FILE, GRAPH_FILE, TAXONOMY_FILE};
use semwiki::{Backend, ChangeAction, ProcessOptions, Workspace};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn process(base: &Path, options: ProcessOptions) -> Workspace {
    let mut workspace = Workspace::open(base).unwrap();
    workspace.process_directory(base, options).unwrap();
    workspace
}

fn assert_banking_state(workspace: &Workspace) {
    let engine = workspace.engine();
    assert_eq!(
        engine.taxonomy().classification_of("credit_union"),
        Some("institution/financial/bank/credit_union")
    );
    assert_eq!(engine.graph().edge_count(), 8);
    assert!(engine.graph().is_defined("bank"));
    assert!(engine.graph().missing_references().is_empty());
}

#[test]
fn test_json_backend_roundtrip() {
    let dir = TempDir::new().unwrap();
    write_documents(dir.path(), BANKING);

    let workspace = process(dir.path(), ProcessOptions::default());
    assert_eq!(workspace.config().backend, Backend::Json);
    for file in [GRAPH_FILE, TAXONOMY_FILE, CHANGELOG_FILE] {
        assert!(dir.path().join(file).exists(), "{file} not written");
    }

    let reopened = Workspace::open(dir.path()).unwrap();
    assert_banking_state(&reopened);
    assert_eq!(reopened.engine().stats(), workspace.engine().stats());

    let graph: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(GRAPH_FILE)).unwrap()).unwrap();
    assert_eq!(graph["metadata"]["edges_count"], 8);
    assert_eq!(
        graph["taxonomy_mappings"]["bank"],
        "institution/financial/bank"
    );
}

#[test]
fn test_sqlite_backend_roundtrip() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(WORKSPACE_CONFIG_FILE), "backend: sqlite\n").unwrap();
    write_documents(dir.path(), BANKING);

    let workspace = process(
        dir.path(),
        ProcessOptions {
            dry_run: false,
            apply: true,
        },
    );
    assert_eq!(workspace.config().backend, Backend::Sqlite);
    assert!(dir.path().join("semwiki.db").exists());
    assert!(!dir.path().join(GRAPH_FILE).exists());
    drop(workspace);

    let reopened = Workspace::open(dir.path()).unwrap();
    assert_banking_state(&reopened);
    let changelog = reopened.engine().changelog();
    assert_eq!(changelog.len(), 2);
    assert!(changelog.iter().all(|e| e.action == ChangeAction::Create));
    assert_eq!(changelog[0].path, "concepts/institution/financial/bank.md");
}

#[test]
fn test_dry_run_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    write_documents(dir.path(), BANKING);

    let workspace = process(
        dir.path(),
        ProcessOptions {
            dry_run: true,
            apply: false,
        },
    );
    assert_eq!(workspace.engine().graph().edge_count(), 8);
    assert!(!dir.path().join(GRAPH_FILE).exists());

    let reopened = Workspace::open(dir.path()).unwrap();
    assert_eq!(reopened.engine().graph().node_count(), 0);
}

#[test]
fn test_applied_files_parse_back_consistently() {
    let dir = TempDir::new().unwrap();
    write_documents(dir.path(), BANKING);
    let options = ProcessOptions {
        dry_run: false,
        apply: true,
    };

    process(dir.path(), options);
    let bank = fs::read_to_string(dir.path().join("concepts/institution/financial/bank.md")).unwrap();
    assert!(bank.contains("[[bank]]{is_a: institution/financial}"));

    // Second pass reads the generated files too; the hierarchy is unchanged
    let mut workspace = Workspace::open(dir.path()).unwrap();
    let report = workspace.process_directory(dir.path(), options).unwrap();
    assert!(report.staged.is_empty());
    assert!(report.applied.is_empty());
    assert_banking_state(&workspace);
    assert_eq!(workspace.engine().changelog().len(), 2);
}
