//! Workspace: a base directory with its config, its store and a loaded engine

use crate::changelog::StagedChange;
use crate::config::{Backend, ConfigError, WikiConfig};
use crate::engine::{DocumentReport, WikiEngine};
use crate::graph::MissingReference;
use crate::storage::{JsonStore, OpenStore, SqliteStore, StorageError, WikiStore};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// How `process_directory` treats its results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Ingest in memory only; nothing is written or saved
    pub dry_run: bool,
    /// Write staged concept files
    pub apply: bool,
}

/// Outcome of processing a directory
#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
    pub documents: Vec<DocumentReport>,
    pub missing_references: Vec<MissingReference>,
    /// Staged concept files whose target does not exist yet
    pub staged: Vec<StagedChange>,
    /// Files written by `apply`, relative to the base directory
    pub applied: Vec<String>,
}

impl ProcessReport {
    pub fn advisory_count(&self) -> usize {
        self.documents.iter().map(|d| d.advisories.len()).sum()
    }
}

pub struct Workspace {
    base: PathBuf,
    config: WikiConfig,
    store: Box<dyn WikiStore>,
    engine: WikiEngine,
}

impl Workspace {
    /// Open the workspace at `base` with its configured backend
    pub fn open(base: impl Into<PathBuf>) -> WorkspaceResult<Self> {
        let base = base.into();
        let config = WikiConfig::load(&base)?;
        Self::with_config(base, config)
    }

    pub fn with_config(base: impl Into<PathBuf>, config: WikiConfig) -> WorkspaceResult<Self> {
        let base = base.into();
        let store: Box<dyn WikiStore> = match config.backend {
            Backend::Json => Box::new(JsonStore::new(&base)),
            Backend::Sqlite => Box::new(SqliteStore::open(config.database_path(&base))?),
        };
        let snapshot = store.load()?;
        tracing::info!(
            base = %base.display(),
            backend = ?config.backend,
            nodes = snapshot.graph.node_count(),
            edges = snapshot.graph.edge_count(),
            "opened workspace"
        );
        let engine = WikiEngine::from_snapshot(snapshot).with_content_dir(config.content_dir.clone());
        Ok(Self {
            base,
            config,
            store,
            engine,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn engine(&self) -> &WikiEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut WikiEngine {
        &mut self.engine
    }

    /// Persist the engine state
    pub fn save(&self) -> WorkspaceResult<()> {
        self.store.save(&self.engine.snapshot())?;
        Ok(())
    }

    /// Ingest every `*.md` under `dir` (sorted by path) as one batch.
    ///
    /// Document ids are paths relative to the base directory when `dir` lies
    /// under it, otherwise relative to `dir`.
    pub fn process_directory(
        &mut self,
        dir: &Path,
        options: ProcessOptions,
    ) -> WorkspaceResult<ProcessReport> {
        if !dir.is_dir() {
            return Err(WorkspaceError::DirectoryNotFound(dir.to_path_buf()));
        }

        // Both sides canonical, otherwise a base of `.` never prefixes the walked paths
        let root = dir.canonicalize()?;
        let base = self.base.canonicalize().unwrap_or_else(|_| self.base.clone());
        let files = markdown_files(&root)?;
        tracing::info!(dir = %dir.display(), files = files.len(), "processing directory");

        let mut report = ProcessReport::default();
        for path in files {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            let document = document_id(&base, &root, &path);
            let context = self.engine.context_for(&document);
            report
                .documents
                .push(self.engine.ingest_document(&context, &text));
        }
        report.missing_references = self.engine.finish_batch().to_vec();

        report.staged = self
            .engine
            .take_staged()
            .into_iter()
            .filter(|change| !self.base.join(&change.file).exists())
            .collect();

        if options.dry_run {
            tracing::info!(staged = report.staged.len(), "dry run, nothing written");
            return Ok(report);
        }

        if options.apply {
            report.applied = self.apply_staged(&report.staged)?;
        }
        self.save()?;
        Ok(report)
    }

    /// Write staged concept files that do not exist yet and log each in the changelog
    pub fn apply_staged(&mut self, changes: &[StagedChange]) -> WorkspaceResult<Vec<String>> {
        let mut applied = Vec::new();
        for change in changes {
            let target = self.base.join(&change.file);
            if target.exists() {
                tracing::debug!(file = %change.file, "concept file exists, skipping");
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &change.content)?;
            self.engine.record_applied(change);
            tracing::info!(file = %change.file, "created concept file");
            applied.push(change.file.clone());
        }
        Ok(applied)
    }
}

/// Path of a document relative to `base`, or to `root` when it lies outside `base`
fn document_id(base: &Path, root: &Path, path: &Path) -> String {
    let relative = path
        .strip_prefix(base)
        .or_else(|_| path.strip_prefix(root))
        .unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// All markdown files under `dir`, sorted
fn markdown_files(dir: &Path) -> WorkspaceResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "md")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
