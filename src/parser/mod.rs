//! Document parser
//!
//! Extracts `[[concept]]{ key: value, ... }` relation blocks and every
//! `[[reference]]` mention from raw document text. Parsing is purely
//! syntactic; resolution and graph insertion happen in the engine.

mod block;
mod relations;

pub use block::{next_reference, Reference};
pub use relations::{parse_relations, BlockError, RelationValue, Relations, ValueKind};

use block::{block_close, block_open};

/// One `[[concept]]{...}` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    /// Concept name as written (search-endian)
    pub concept: String,
    /// Byte offset of the block's `[[`
    pub offset: usize,
    /// Declared relations, or why the block was skipped
    pub relations: Result<Relations, BlockError>,
}

impl ParsedBlock {
    /// Declared is_a values, empty for malformed blocks
    pub fn parents(&self) -> Vec<String> {
        self.relations
            .as_ref()
            .map(|r| r.texts(crate::graph::IS_A))
            .unwrap_or_default()
    }
}

/// Everything extracted from one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub blocks: Vec<ParsedBlock>,
    /// Distinct `[[name]]` targets in order of first appearance
    pub mentions: Vec<String>,
}

/// Parse a whole document
pub fn parse_document(text: &str) -> ParsedDocument {
    let mut document = ParsedDocument::default();
    let mut cursor = 0;

    while let Some(reference) = next_reference(text, cursor) {
        if !document.mentions.iter().any(|m| m == reference.name) {
            document.mentions.push(reference.name.to_string());
        }
        cursor = reference.end;

        let Some(open) = block_open(text, reference.end) else {
            continue;
        };
        let relations = match block_close(text, open) {
            Some(close) => {
                // References inside the block body are still mentions
                collect_mentions(&text[open..close], &mut document.mentions);
                cursor = close + 1;
                parse_relations(&text[open + 1..close])
            }
            None => {
                cursor = open + 1;
                Err(BlockError::Unclosed)
            }
        };
        document.blocks.push(ParsedBlock {
            concept: reference.name.to_string(),
            offset: reference.start,
            relations,
        });
    }

    tracing::trace!(
        blocks = document.blocks.len(),
        mentions = document.mentions.len(),
        "parsed document"
    );
    document
}

fn collect_mentions(text: &str, mentions: &mut Vec<String>) {
    let mut cursor = 0;
    while let Some(reference) = next_reference(text, cursor) {
        if !mentions.iter().any(|m| m == reference.name) {
            mentions.push(reference.name.to_string());
        }
        cursor = reference.end;
    }
}
