//! Semwiki CLI: build and query a semantic wiki graph.
//!
//! Usage:
//!   semwiki parse <dir> [--dry-run] [--apply]
//!   semwiki search <query> [--hierarchy]
//!   semwiki index | tree [root] | stats

use clap::{Parser, Subcommand};
use semwiki::{ProcessOptions, SearchOptions, TreeNode, Workspace};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "semwiki",
    version,
    about = "Semantic wiki knowledge graph with dual-endian concept addressing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace directory holding the config and stored graph
    #[arg(long, global = true, default_value = ".")]
    base_path: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every markdown file under a directory into the graph
    Parse {
        /// Directory to scan recursively
        dir: PathBuf,
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Create staged concept files
        #[arg(long)]
        apply: bool,
    },
    /// Search concepts by term
    Search {
        query: String,
        /// Show ancestors for each result
        #[arg(long)]
        hierarchy: bool,
    },
    /// Print the inverted index
    Index,
    /// Print the classification tree
    Tree {
        /// Classification path to start from
        root: Option<String>,
    },
    /// Print graph statistics
    Stats,
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_parse(workspace: &mut Workspace, dir: &Path, dry_run: bool, apply: bool) -> i32 {
    let report = match workspace.process_directory(dir, ProcessOptions { dry_run, apply }) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    for document in &report.documents {
        for advisory in &document.advisories {
            println!("warning: {}: {}", document.document, advisory);
        }
    }
    for missing in &report.missing_references {
        if missing.suggestions.is_empty() {
            println!("missing: [[{}]] in {}", missing.reference, missing.context);
        } else {
            println!(
                "missing: [[{}]] in {} (did you mean: {}?)",
                missing.reference,
                missing.context,
                missing.suggestions.join(", ")
            );
        }
    }
    for change in &report.staged {
        let marker = if report.applied.contains(&change.file) {
            "created"
        } else {
            "staged"
        };
        println!("{}: {} ({})", marker, change.file, change.classification_path);
    }

    let stats = workspace.engine().stats();
    println!(
        "Processed {} documents: {} nodes, {} edges, {} advisories{}",
        report.documents.len(),
        stats.nodes,
        stats.edges,
        report.advisory_count(),
        if dry_run { " (dry run)" } else { "" }
    );
    0
}

fn cmd_search(workspace: &Workspace, query: &str, hierarchy: bool) -> i32 {
    let config = &workspace.config().search;
    let mut options = SearchOptions::new().limit(config.max_results);
    if hierarchy {
        options = options.with_hierarchy();
    }

    let mut engine = workspace.engine().search_engine();
    let results = engine.search(query, &options);
    if results.is_empty() {
        println!("No results for '{}'", query);
        return 0;
    }

    for result in &results {
        println!(
            "{} [{}] (specificity {}, via {})",
            result.classification_path,
            result.search_path,
            result.specificity,
            result.matched_term
        );
        if let Some(ancestors) = &result.hierarchy {
            for ancestor in ancestors.iter().take(config.hierarchy_preview) {
                println!("    <- {}", ancestor);
            }
            if ancestors.len() > config.hierarchy_preview {
                println!("    ... {} more", ancestors.len() - config.hierarchy_preview);
            }
        }
    }
    0
}

fn cmd_index(workspace: &Workspace) -> i32 {
    let engine = workspace.engine().search_engine();
    for (term, entries) in engine.index().terms() {
        println!("{} ({})", term, entries.len());
        let mut entries = entries.to_vec();
        entries.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then_with(|| a.search_path.cmp(&b.search_path))
        });
        for entry in entries {
            let kind = if entry.partial { "ancestor" } else { "concept" };
            println!(
                "    {} -> {} [{}, specificity {}]",
                entry.search_path, entry.classification_path, kind, entry.specificity
            );
        }
    }
    0
}

fn print_tree(node: &TreeNode, indent: usize) {
    println!("{}{}", "  ".repeat(indent), node.name);
    for child in &node.children {
        print_tree(child, indent + 1);
    }
}

fn cmd_tree(workspace: &Workspace, root: Option<&str>) -> i32 {
    let forest = workspace.engine().search_engine().tree(root);
    if forest.is_empty() {
        match root {
            Some(root) => eprintln!("Error: no classification '{}'", root),
            None => println!("(empty)"),
        }
        return i32::from(root.is_some());
    }
    for tree in &forest {
        print_tree(tree, 0);
    }
    0
}

fn cmd_stats(workspace: &Workspace) -> i32 {
    let stats = workspace.engine().stats();
    println!("Nodes:              {}", stats.nodes);
    println!("Edges:              {}", stats.edges);
    println!("Taxonomy mappings:  {}", stats.taxonomy_mappings);
    println!("Aliases:            {}", stats.aliases);
    println!("Changelog entries:  {}", stats.changelog_entries);
    println!("Missing references: {}", stats.missing_references);
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut workspace = match Workspace::open(&cli.base_path) {
        Ok(workspace) => workspace,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Parse { dir, dry_run, apply } => cmd_parse(&mut workspace, &dir, dry_run, apply),
        Commands::Search { query, hierarchy } => cmd_search(&workspace, &query, hierarchy),
        Commands::Index => cmd_index(&workspace),
        Commands::Tree { root } => cmd_tree(&workspace, root.as_deref()),
        Commands::Stats => cmd_stats(&workspace),
    };
    std::process::exit(code);
}
