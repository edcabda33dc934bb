//! scopegraph - inspect and edit context trees and graph modules
//!
//! ## Commands
//!
//! - `module`: validate or digest a stored graph module
//! - `delta`: validate a delta record or apply it to a module
//! - `context`: read, transform, project and render a context tree
//! - `history`: rebuild a module from a base snapshot and a sequence of deltas

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scopegraph_core::context::value::value_to_string;
use scopegraph_core::metrics::METRICS;
use scopegraph_core::{
    ApplyDeltaRequest, ContextTree, DeltaEngine, DeltaRecord, EngineConfig, GraphModule,
    ModuleHistory, PlaceholderRenderer, ReplaySummary, Transformation,
};
use scopegraph_state::fakes::{MemoryCasStore, MemoryDeltaLedger};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "scopegraph")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scoped memory trees and versioned graph deltas", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Fully validate created nodes and links before inserting them
    #[arg(long, global = true, env = "SCOPEGRAPH_STRICT_PAYLOADS")]
    strict: bool,

    /// Validate the module after every applied delta
    #[arg(long, global = true, env = "SCOPEGRAPH_VALIDATE_AFTER_APPLY")]
    validate_after_apply: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Graph module checks
    Module {
        #[command(subcommand)]
        action: ModuleAction,
    },

    /// Delta records
    Delta {
        #[command(subcommand)]
        action: DeltaAction,
    },

    /// Context trees
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Module history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum ModuleAction {
    /// Run structural validation on a module file
    Validate { file: PathBuf },
    /// Print the SHA-256 digest of a module file
    Digest { file: PathBuf },
}

#[derive(Subcommand)]
enum DeltaAction {
    /// Check every operation of a delta file
    Validate { file: PathBuf },
    /// Apply a delta file to a module file
    Apply {
        /// Module to edit (JSON)
        #[arg(short, long)]
        module: PathBuf,

        /// Delta record or apply request (JSON)
        #[arg(short, long)]
        delta: PathBuf,

        /// Where to write the edited module (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave the module untouched unless every operation succeeds
        #[arg(long)]
        atomic: bool,
    },
}

#[derive(Subcommand)]
enum ContextAction {
    /// Print the value stored at `level.container.key`
    Get {
        #[arg(short, long)]
        tree: PathBuf,
        path: String,
    },
    /// Apply a transformation batch and print the new tree
    Transform {
        #[arg(short, long)]
        tree: PathBuf,

        /// JSON array of transformations
        #[arg(short, long)]
        batch: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the `{level: {container: data}}` projection
    Project {
        #[arg(short, long)]
        tree: PathBuf,
    },
    /// Render a `{{ level.container.key }}` template against the tree
    Render {
        #[arg(short, long)]
        tree: PathBuf,
        #[arg(long)]
        template: String,
    },
    /// Print the dot-joined level ids, root first
    IdPath {
        #[arg(short, long)]
        tree: PathBuf,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Replay deltas over a base module using in-memory stores
    Replay {
        /// Base module snapshot (JSON)
        #[arg(long)]
        base: PathBuf,

        /// Delta files, committed in the order given
        #[arg(long = "delta")]
        deltas: Vec<PathBuf>,

        /// Only consider history entries up to this sequence number
        #[arg(long)]
        upto: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    scopegraph_core::init_tracing(cli.json, level);

    let mut config = EngineConfig::from_env();
    if cli.strict {
        config = config.strict(true);
    }
    if cli.validate_after_apply {
        config = config.validating(true);
    }
    let engine = DeltaEngine::new(config);

    let result = match cli.command {
        Commands::Module { action } => match action {
            ModuleAction::Validate { file } => cmd_module_validate(&file),
            ModuleAction::Digest { file } => cmd_module_digest(&file),
        },
        Commands::Delta { action } => match action {
            DeltaAction::Validate { file } => cmd_delta_validate(&file),
            DeltaAction::Apply {
                module,
                delta,
                output,
                atomic,
            } => cmd_delta_apply(&engine, &module, &delta, output.as_deref(), atomic),
        },
        Commands::Context { action } => match action {
            ContextAction::Get { tree, path } => cmd_context_get(&tree, &path),
            ContextAction::Transform {
                tree,
                batch,
                output,
            } => cmd_context_transform(&tree, &batch, output.as_deref()),
            ContextAction::Project { tree } => cmd_context_project(&tree),
            ContextAction::Render { tree, template } => cmd_context_render(&tree, &template),
            ContextAction::IdPath { tree } => cmd_context_id_path(&tree),
        },
        Commands::History { action } => match action {
            HistoryAction::Replay { base, deltas, upto } => {
                cmd_history_replay(engine, &base, &deltas, upto).await
            }
        },
    };

    METRICS.flush();
    result
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

/// Pretty JSON to `output`, or stdout when no path is given.
fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write to {:?}", path))?;
            println!("Wrote {:?}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// A delta file holds either a stored record or a bare apply request.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeltaInput {
    Record(DeltaRecord),
    Request(ApplyDeltaRequest),
}

fn load_delta(path: &Path) -> Result<DeltaRecord> {
    let record = match read_json_file::<DeltaInput>(path)? {
        DeltaInput::Record(record) => record,
        DeltaInput::Request(request) => request.into_record(Uuid::nil()),
    };
    Ok(record)
}

fn cmd_module_validate(path: &Path) -> Result<()> {
    let module: GraphModule = read_json_file(path)?;
    module
        .validate()
        .with_context(|| format!("Module {:?} is invalid", path))?;
    println!(
        "Module {} ok ({} nodes, {} links)",
        module.id,
        module.node_count(),
        module.link_count()
    );
    Ok(())
}

fn cmd_module_digest(path: &Path) -> Result<()> {
    let module: GraphModule = read_json_file(path)?;
    println!("{}", module.digest()?);
    Ok(())
}

fn cmd_delta_validate(path: &Path) -> Result<()> {
    let record = load_delta(path)?;
    record
        .validate()
        .with_context(|| format!("Delta {:?} is invalid", path))?;
    println!(
        "Delta {} ok ({} operations)",
        record.id,
        record.operations.len()
    );
    Ok(())
}

/// Load, apply and return the edited module with the number of operations applied.
fn apply_delta_file(
    engine: &DeltaEngine,
    module_path: &Path,
    delta_path: &Path,
    atomic: bool,
) -> Result<(GraphModule, usize)> {
    let mut module: GraphModule = read_json_file(module_path)?;
    let record = load_delta(delta_path)?;
    let applied = if atomic {
        engine.apply_atomic(&mut module, &record)
    } else {
        engine.apply(&mut module, &record)
    }
    .with_context(|| format!("Failed to apply {:?}", delta_path))?;
    Ok((module, applied))
}

fn cmd_delta_apply(
    engine: &DeltaEngine,
    module_path: &Path,
    delta_path: &Path,
    output: Option<&Path>,
    atomic: bool,
) -> Result<()> {
    let (module, applied) = apply_delta_file(engine, module_path, delta_path, atomic)?;
    info!(module_id = %module.id, applied, "delta applied");
    write_json(&module, output)
}

fn cmd_context_get(tree_path: &Path, data_path: &str) -> Result<()> {
    let tree: ContextTree = read_json_file(tree_path)?;
    let value = tree
        .get_data(data_path)
        .with_context(|| format!("No data at {}", data_path))?;
    println!("{}", value_to_string(value));
    Ok(())
}

fn transform_file(tree_path: &Path, batch_path: &Path) -> Result<ContextTree> {
    let tree: ContextTree = read_json_file(tree_path)?;
    let batch: Vec<Transformation> = read_json_file(batch_path)?;
    Ok(tree.with_transformations(&batch)?)
}

fn cmd_context_transform(tree_path: &Path, batch_path: &Path, output: Option<&Path>) -> Result<()> {
    let next = transform_file(tree_path, batch_path)?;
    write_json(&next, output)
}

fn cmd_context_project(tree_path: &Path) -> Result<()> {
    let tree: ContextTree = read_json_file(tree_path)?;
    write_json(&tree.project_for_template(), None)
}

fn cmd_context_render(tree_path: &Path, template: &str) -> Result<()> {
    let tree: ContextTree = read_json_file(tree_path)?;
    println!("{}", tree.render(&PlaceholderRenderer, template)?);
    Ok(())
}

fn cmd_context_id_path(tree_path: &Path) -> Result<()> {
    let tree: ContextTree = read_json_file(tree_path)?;
    println!("{}", tree.id_path());
    Ok(())
}

#[derive(Serialize)]
struct ReplayOutput {
    digest: String,
    entries_considered: usize,
    deltas_applied: usize,
    module: GraphModule,
}

impl From<ReplaySummary> for ReplayOutput {
    fn from(summary: ReplaySummary) -> Self {
        Self {
            digest: summary.digest.to_string(),
            entries_considered: summary.entries_considered,
            deltas_applied: summary.deltas_applied,
            module: summary.module,
        }
    }
}

async fn replay_files(
    engine: DeltaEngine,
    base_path: &Path,
    delta_paths: &[PathBuf],
    upto: Option<u64>,
) -> Result<ReplaySummary> {
    let base: GraphModule = read_json_file(base_path)?;
    let history = ModuleHistory::new(
        Arc::new(MemoryCasStore::new()),
        Arc::new(MemoryDeltaLedger::new()),
        engine,
    );
    history.begin(&base).await?;

    for path in delta_paths {
        let record = load_delta(path)?;
        history
            .commit(base.id, record)
            .await
            .with_context(|| format!("Failed to commit {:?}", path))?;
    }

    Ok(history.replay(base.id, upto).await?)
}

async fn cmd_history_replay(
    engine: DeltaEngine,
    base_path: &Path,
    delta_paths: &[PathBuf],
    upto: Option<u64>,
) -> Result<()> {
    let summary = replay_files(engine, base_path, delta_paths, upto).await?;
    write_json(&ReplayOutput::from(summary), None)
}
