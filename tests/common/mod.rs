//! Shared fixtures for the integration tests

#![allow(dead_code)]

use semwiki::{DocumentReport, WikiEngine};
use std::fs;
use std::path::Path;

/// A small banking corpus: two concept documents and one that mentions them
pub const BANKING: &[(&str, &str)] = &[
    (
        "concepts/bank.md",
        "# Bank\n\n[[bank]]{is_a: institution/financial, offers: [loans, savings]}\n\nA place that keeps money.\n",
    ),
    (
        "concepts/credit_union.md",
        "# Credit Union\n\n[[credit_union]]{is_a: bank/financial}\n\nA member-owned [[bank]].\n",
    ),
    (
        "notes/visit.md",
        "Opened an account at the [[credit_union]] after comparing it with a [[bank]].\n",
    ),
];

/// Ingest `documents` in order as one batch
pub fn ingest(engine: &mut WikiEngine, documents: &[(&str, &str)]) -> Vec<DocumentReport> {
    let reports = documents
        .iter()
        .map(|(document, text)| {
            let context = engine.context_for(document);
            engine.ingest_document(&context, text)
        })
        .collect();
    engine.finish_batch();
    reports
}

/// Write `documents` below `base`, creating directories as needed
pub fn write_documents(base: &Path, documents: &[(&str, &str)]) {
    for (document, text) in documents {
        let path = base.join(document);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
}
