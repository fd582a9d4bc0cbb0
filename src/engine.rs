//! WikiEngine: the main entry point for building and querying the wiki graph

use crate::changelog::{ChangelogEntry, StagedChange};
use crate::graph::{EdgeInsertion, KnowledgeGraph, MissingReference, PropertyValue, IS_A};
use crate::parser::{self, BlockError, ParsedBlock, RelationValue, ValueKind};
use crate::search::SearchEngine;
use crate::storage::Snapshot;
use crate::taxonomy::{local_name, ParseContext, PathResolver, Resolution, ResolutionOrigin, TaxonomyIndex};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Errors that can occur in wiki operations
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("Circular is_a reference: {}", .cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for wiki operations
pub type WikiResult<T> = Result<T, WikiError>;

/// Default directory holding concept documents
pub const DEFAULT_CONTENT_DIR: &str = "concepts";

const MAX_SUGGESTIONS: usize = 3;
const SUGGESTION_THRESHOLD: f64 = 0.6;

/// A soft warning raised while ingesting a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// A prefix of a classification names nothing known
    MissingParent { concept: String, parent: String },
    /// The concept's own document is not where its classification puts it
    LocationMismatch {
        concept: String,
        document: String,
        expected: String,
    },
    /// A hierarchy edge was dropped because it would close a cycle
    RejectedEdge {
        source: String,
        relation: String,
        target: String,
        cycle: Vec<String>,
    },
    /// A relation block could not be parsed and was skipped
    MalformedBlock { concept: String, reason: BlockError },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::MissingParent { concept, parent } => {
                write!(f, "{concept}: parent '{parent}' does not exist")
            }
            Advisory::LocationMismatch {
                concept,
                document,
                expected,
            } => write!(
                f,
                "{concept}: defined in '{document}' but classification places it at '{expected}'"
            ),
            Advisory::RejectedEdge {
                source,
                relation,
                target,
                cycle,
            } => write!(
                f,
                "skipped {source} {relation} {target}: circular reference {}",
                cycle.join(" -> ")
            ),
            Advisory::MalformedBlock { concept, reason } => {
                write!(f, "skipped block for [[{concept}]]: {reason}")
            }
        }
    }
}

/// What ingesting one document produced
#[derive(Debug, Clone, Default)]
pub struct DocumentReport {
    pub document: String,
    /// One resolution per well-formed block, in document order
    pub concepts: Vec<Resolution>,
    pub advisories: Vec<Advisory>,
    /// Edges newly inserted, inverses included
    pub edges_added: usize,
}

/// Counts across the graph, taxonomy and changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WikiStats {
    pub nodes: usize,
    pub edges: usize,
    pub taxonomy_mappings: usize,
    pub aliases: usize,
    pub changelog_entries: usize,
    pub missing_references: usize,
    pub staged_changes: usize,
}

/// The wiki engine
///
/// Owns the graph, the taxonomy index and the changelog. Documents are
/// ingested one at a time with an explicit [`ParseContext`]; a batch is
/// closed with [`WikiEngine::finish_batch`], which recomputes missing
/// references across everything mentioned since the last batch.
#[derive(Debug, Clone)]
pub struct WikiEngine {
    graph: KnowledgeGraph,
    taxonomy: TaxonomyIndex,
    changelog: Vec<ChangelogEntry>,
    staged: Vec<StagedChange>,
    /// (reference, document) pairs awaiting the end of the batch
    pending_mentions: Vec<(String, String)>,
    content_dir: String,
}

impl Default for WikiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WikiEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    /// Resume from persisted state
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            graph: snapshot.graph,
            taxonomy: snapshot.taxonomy,
            changelog: snapshot.changelog,
            staged: Vec::new(),
            pending_mentions: Vec::new(),
            content_dir: DEFAULT_CONTENT_DIR.to_string(),
        }
    }

    /// Set the directory stripped from document ids and used for staged files
    pub fn with_content_dir(mut self, content_dir: impl Into<String>) -> Self {
        self.content_dir = content_dir.into();
        self
    }

    /// Copy of the persistable state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            graph: self.graph.clone(),
            taxonomy: self.taxonomy.clone(),
            changelog: self.changelog.clone(),
        }
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn taxonomy(&self) -> &TaxonomyIndex {
        &self.taxonomy
    }

    pub fn changelog(&self) -> &[ChangelogEntry] {
        &self.changelog
    }

    pub fn content_dir(&self) -> &str {
        &self.content_dir
    }

    /// Parsing context for a document id
    pub fn context_for(&self, document: &str) -> ParseContext {
        ParseContext::for_document(document, &self.content_dir)
    }

    /// Resolve a concept name against the taxonomy (see [`PathResolver::resolve`])
    pub fn resolve(
        &mut self,
        search_name: &str,
        declared_parents: &[String],
        context: Option<&ParseContext>,
    ) -> Resolution {
        PathResolver::new(&mut self.taxonomy).resolve(search_name, declared_parents, context)
    }

    /// Insert an edge directly (see [`KnowledgeGraph::add_edge`])
    pub fn add_edge(
        &mut self,
        source: &str,
        relation: &str,
        target: &str,
        source_document: &str,
    ) -> WikiResult<EdgeInsertion> {
        self.graph.add_edge(source, relation, target, source_document)
    }

    /// Parse a document and fold its blocks into the graph.
    ///
    /// Malformed blocks and rejected edges become advisories; nothing here
    /// aborts the document.
    pub fn ingest_document(&mut self, context: &ParseContext, text: &str) -> DocumentReport {
        let document = context.document().to_string();
        let parsed = parser::parse_document(text);
        let mut report = DocumentReport {
            document: document.clone(),
            ..Default::default()
        };

        self.pending_mentions.extend(
            parsed
                .mentions
                .into_iter()
                .map(|mention| (mention, document.clone())),
        );

        for block in parsed.blocks {
            self.ingest_block(block, context, &mut report);
        }

        for advisory in &report.advisories {
            tracing::warn!(document = %document, "{advisory}");
        }
        tracing::info!(
            document = %document,
            concepts = report.concepts.len(),
            edges = report.edges_added,
            "ingested document"
        );
        report
    }

    fn ingest_block(&mut self, block: ParsedBlock, context: &ParseContext, report: &mut DocumentReport) {
        let relations = match block.relations {
            Ok(relations) => relations,
            Err(reason) => {
                report.advisories.push(Advisory::MalformedBlock {
                    concept: block.concept,
                    reason,
                });
                return;
            }
        };

        let edges_before = self.graph.edge_count();
        let declared = relations.texts(IS_A);
        let resolution = self.resolve(&block.concept, &declared, Some(context));
        let id = resolution.search_path.as_str();
        let document = context.document();

        // A declared hierarchy replaces any context or flat path the node had
        let adopt = resolution.origin == ResolutionOrigin::Declared;
        self.graph
            .define_node(id, &resolution.classification_path, document, adopt);
        let classification = self
            .graph
            .node(id)
            .map(|n| n.classification_path.clone())
            .unwrap_or_else(|| resolution.classification_path.clone());
        tracing::debug!(search = id, classification = %classification, "resolved concept");

        for (relation, values) in relations.iter() {
            let targets: Vec<String> = if relation == IS_A {
                resolution
                    .parents
                    .iter()
                    .map(|p| self.taxonomy.owner_of(p).unwrap_or(p.as_str()).to_string())
                    .collect()
            } else {
                let (literals, concepts): (Vec<&RelationValue>, Vec<&RelationValue>) =
                    values.iter().partition(|v| v.kind == ValueKind::Quoted);
                if !literals.is_empty() {
                    self.store_literals(id, relation, &literals);
                }
                concepts
                    .iter()
                    .map(|v| self.taxonomy.canonical_target(&v.text))
                    .collect()
            };

            for target in targets {
                match self.graph.add_edge(id, relation, &target, document) {
                    Ok(EdgeInsertion::Inserted | EdgeInsertion::Duplicate) => {}
                    Err(WikiError::CycleDetected { cycle }) => {
                        report.advisories.push(Advisory::RejectedEdge {
                            source: id.to_string(),
                            relation: relation.to_string(),
                            target,
                            cycle,
                        });
                    }
                    Err(err) => tracing::warn!(error = %err, "edge insertion failed"),
                }
            }
        }

        report.edges_added += self.graph.edge_count() - edges_before;
        report
            .advisories
            .extend(self.missing_parents(id, &classification));
        if let Some(advisory) = self.location_mismatch(id, &classification, context) {
            report.advisories.push(advisory);
        }

        if resolution.origin == ResolutionOrigin::Declared
            && resolution.classification_path != resolution.search_path
            && context.classification() != Some(resolution.classification_path.as_str())
            && !self
                .staged
                .iter()
                .any(|s| s.classification_path == resolution.classification_path)
        {
            let change = StagedChange::create(&resolution.classification_path, &self.content_dir);
            tracing::info!(file = %change.file, "staged concept file");
            self.staged.push(change);
        }

        report.concepts.push(resolution);
    }

    /// Quoted values are text, not concepts; they land as node properties
    fn store_literals(&mut self, id: &str, relation: &str, literals: &[&RelationValue]) {
        let value = match literals {
            [single] => PropertyValue::String(single.text.clone()),
            many => PropertyValue::Array(
                many.iter()
                    .map(|v| PropertyValue::String(v.text.clone()))
                    .collect(),
            ),
        };
        if let Err(err) = self.graph.set_property(id, relation, value) {
            tracing::warn!(error = %err, "property not stored");
        }
    }

    /// Every proper prefix of `classification` that names nothing known
    fn missing_parents(&self, concept: &str, classification: &str) -> Vec<Advisory> {
        let segments: Vec<&str> = classification.split('/').collect();
        (1..segments.len())
            .map(|end| segments[..end].join("/"))
            .filter(|prefix| {
                self.graph.node(prefix).is_none()
                    && self.graph.find_by_classification(prefix).is_none()
                    && !self.taxonomy.knows(prefix)
            })
            .map(|parent| Advisory::MissingParent {
                concept: concept.to_string(),
                parent,
            })
            .collect()
    }

    /// The concept named like its document should live where its classification says
    fn location_mismatch(
        &self,
        concept: &str,
        classification: &str,
        context: &ParseContext,
    ) -> Option<Advisory> {
        let expected_here = context.classification()?;
        if local_name(classification) != context.document_name() || expected_here == classification {
            return None;
        }
        Some(Advisory::LocationMismatch {
            concept: concept.to_string(),
            document: context.document().to_string(),
            expected: format!("{}/{classification}.md", self.content_dir.trim_end_matches('/')),
        })
    }

    /// Close a batch: recompute `missing_references` from earlier results and
    /// every mention seen since the last batch.
    pub fn finish_batch(&mut self) -> &[MissingReference] {
        let mut candidates: Vec<(String, String)> = self
            .graph
            .missing_references()
            .iter()
            .map(|m| (m.reference.clone(), m.context.clone()))
            .collect();
        candidates.append(&mut self.pending_mentions);

        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for (reference, context) in candidates {
            if self.is_known_reference(&reference) || !seen.insert((reference.clone(), context.clone())) {
                continue;
            }
            missing.push(MissingReference {
                suggestions: self.suggestions_for(&reference),
                reference,
                context,
            });
        }

        if !missing.is_empty() {
            tracing::warn!(count = missing.len(), "missing references");
        }
        self.graph.set_missing_references(missing);
        self.graph.missing_references()
    }

    fn is_known_reference(&self, reference: &str) -> bool {
        self.graph.is_defined(reference)
            || self.taxonomy.knows(reference)
            || self
                .graph
                .is_defined(&self.taxonomy.canonical_target(reference))
    }

    /// Up to three defined ids that look like `reference`
    fn suggestions_for(&self, reference: &str) -> Vec<String> {
        let wanted = reference.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .graph
            .nodes()
            .filter(|n| !n.is_placeholder())
            .filter_map(|n| {
                let score = strsim::normalized_levenshtein(&wanted, &n.id.to_lowercase()).max(
                    strsim::normalized_levenshtein(&wanted, &n.local_name().to_lowercase()),
                );
                (score >= SUGGESTION_THRESHOLD).then_some((score, n.id.as_str()))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, id)| id.to_string())
            .collect()
    }

    // === Staged changes ===

    pub fn staged_changes(&self) -> &[StagedChange] {
        &self.staged
    }

    /// Drain the staged changes
    pub fn take_staged(&mut self) -> Vec<StagedChange> {
        std::mem::take(&mut self.staged)
    }

    /// Record that a staged change was written
    pub fn record_applied(&mut self, change: &StagedChange) {
        self.changelog.push(change.to_entry());
    }

    /// Replace the primary classification of an existing concept
    pub fn remap(&mut self, search_path: &str, classification_path: &str) -> WikiResult<()> {
        self.graph.set_classification(search_path, classification_path)?;
        let previous = self.taxonomy.remap(search_path, classification_path);
        tracing::info!(
            search = search_path,
            from = previous.as_deref().unwrap_or(""),
            to = classification_path,
            "remapped concept"
        );
        self.changelog
            .push(ChangelogEntry::remap(search_path, classification_path));
        Ok(())
    }

    pub fn stats(&self) -> WikiStats {
        WikiStats {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            taxonomy_mappings: self.taxonomy.mapping_count(),
            aliases: self.taxonomy.alias_count(),
            changelog_entries: self.changelog.len(),
            missing_references: self.graph.missing_references().len(),
            staged_changes: self.staged.len(),
        }
    }

    /// A search session over the current graph
    pub fn search_engine(&self) -> SearchEngine<'_> {
        SearchEngine::new(&self.graph)
    }
}
