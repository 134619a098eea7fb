//! # vfsearch CLI
//!
//! Command-line interface for vfsearch, an incremental full-text search
//! indexer for content repositories.
//!
//! ## Commands
//!
//! - `vfsearch rebuild [PATH]` - Rebuild the index for a directory or all configured scopes
//! - `vfsearch update <CHANGES>` - Apply a change-record file incrementally
//! - `vfsearch status` - Show index statistics
//! - `vfsearch config` - Manage configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vfsearch_core::{
    ChangeRecord, DependencyResolver, IndexWriter, ReportSink, Repository, SourceScope,
};
use vfsearch_extract::{FactoryRegistry, LegacyContentFactory, PlainTextFactory};
use vfsearch_index::{
    CancellationPolicy, FsRepository, IndexScheduler, LocaleVariantResolver, LogReport,
    RebuildTraversal, SingletonResolver, UpdatePlanner,
};
use vfsearch_store::{MemoryIndexWriter, TantivyIndexWriter};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "vfsearch")]
#[command(about = "Incremental full-text search indexing for content repositories")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/vfsearch/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Per-document extraction deadline in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Commit after this many started extractions (0 disables batching)
    #[arg(long, global = true)]
    commit_threshold: Option<u64>,

    /// What to do with workers that exceed the deadline
    #[arg(long, global = true)]
    cancellation: Option<PolicyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum PolicyArg {
    Cooperative,
    Forced,
}

impl From<PolicyArg> for CancellationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Cooperative => Self::Cooperative,
            PolicyArg::Forced => Self::Forced,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from scratch
    Rebuild {
        /// Directory to index; omit to rebuild all configured scopes
        path: Option<PathBuf>,

        /// Record writes in memory instead of touching the index
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply change records from a JSON file
    Update {
        /// File with an array of change records
        changes: PathBuf,
    },

    /// Show index status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Output structure for status.
#[derive(Serialize)]
struct StatusOutput {
    index_dir: String,
    documents: u64,
}

/// The indexing stack shared by rebuild and update.
struct Components {
    writer: Arc<dyn IndexWriter>,
    /// Present on dry runs; holds the recorded writes
    dry: Option<Arc<MemoryIndexWriter>>,
    scheduler: IndexScheduler,
    repository: Arc<dyn Repository>,
    resolver: Arc<dyn DependencyResolver>,
}

fn create_components(config: &Config, dry_run: bool) -> Result<Components> {
    let (writer, dry): (Arc<dyn IndexWriter>, Option<Arc<MemoryIndexWriter>>) = if dry_run {
        let memory = Arc::new(MemoryIndexWriter::new());
        (Arc::clone(&memory) as Arc<dyn IndexWriter>, Some(memory))
    } else {
        let index_dir = config.index_dir()?;
        std::fs::create_dir_all(&index_dir)
            .with_context(|| format!("failed to create {}", index_dir.display()))?;
        let writer = TantivyIndexWriter::open(&index_dir).context("failed to open index")?;
        (Arc::new(writer) as Arc<dyn IndexWriter>, None)
    };

    let mut factories = FactoryRegistry::new();
    factories.register("text", PlainTextFactory::new());
    if !config.index.legacy_content_types.is_empty() {
        factories.register(
            "legacy",
            LegacyContentFactory::new(&config.index.legacy_content_types),
        );
    }

    let resolver: Arc<dyn DependencyResolver> = if config.index.chain_locale_variants {
        Arc::new(LocaleVariantResolver)
    } else {
        Arc::new(SingletonResolver)
    };

    let scheduler = IndexScheduler::new(
        Arc::clone(&writer),
        Arc::new(factories),
        Arc::new(LogReport) as Arc<dyn ReportSink>,
        config.scheduler,
    );

    Ok(Components {
        writer,
        dry,
        scheduler,
        repository: Arc::new(FsRepository::new("/")),
        resolver,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_from(cli.config.clone()).context("failed to load config")?;
    if let Some(secs) = cli.timeout {
        config.scheduler.timeout = std::time::Duration::from_secs(secs);
    }
    if let Some(threshold) = cli.commit_threshold {
        config.scheduler.commit_threshold = threshold;
    }
    if let Some(policy) = cli.cancellation {
        config.scheduler.cancellation = policy.into();
    }

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    match cli.command {
        Commands::Rebuild { path, dry_run } => {
            let scopes = match path {
                Some(path) => {
                    if !path.exists() {
                        anyhow::bail!("directory does not exist: {}", path.display());
                    }
                    let path = path.canonicalize()?;
                    vec![SourceScope::new("cli", vec![path])]
                }
                None => {
                    if config.scopes.is_empty() {
                        anyhow::bail!("no scopes configured; pass a path or edit the config");
                    }
                    config.scopes.clone()
                }
            };

            let components = create_components(&config, dry_run)?;
            let traversal = RebuildTraversal::new(
                Arc::clone(&components.repository),
                Arc::clone(&components.resolver),
                config.type_registry(),
                Arc::new(LogReport) as Arc<dyn ReportSink>,
            );

            for scope in &scopes {
                info!("rebuilding scope {}", scope.name);
                let stats = traversal.rebuild(scope, &components.scheduler).await;
                info!(
                    "scope {} done: {} indexed, {} abandoned",
                    scope.name, stats.returned, stats.abandoned
                );
            }
            if let Some(ref dry) = components.dry {
                println!(
                    "dry run: {} documents would be written in {} operations",
                    dry.doc_count().await,
                    dry.ops().await.len()
                );
            }
            components
                .writer
                .close()
                .await
                .context("failed to close index")?;
        }

        Commands::Update { changes } => {
            let raw = std::fs::read_to_string(&changes)
                .with_context(|| format!("failed to read {}", changes.display()))?;
            let records: Vec<ChangeRecord> =
                serde_json::from_str(&raw).context("failed to parse change records")?;

            if config.scopes.is_empty() {
                anyhow::bail!("no scopes configured; edit the config first");
            }

            let components = create_components(&config, false)?;
            let planner = UpdatePlanner::new(
                Arc::clone(&components.repository),
                Arc::clone(&components.resolver),
                config.type_registry(),
            );

            for scope in &config.scopes {
                match planner.plan_update(scope, &records).await {
                    Ok(data) if data.is_empty() => {
                        info!("scope {}: nothing to do", scope.name);
                    }
                    Ok(data) => {
                        info!(
                            "scope {}: {} updates, {} deletes",
                            scope.name,
                            data.to_update.len(),
                            data.to_delete.len()
                        );
                        components.scheduler.run(&data).await;
                    }
                    Err(e) => {
                        // One unreadable scope must not stop the others
                        tracing::warn!("skipping scope {}: {e}", scope.name);
                    }
                }
            }
            components
                .writer
                .close()
                .await
                .context("failed to close index")?;
        }

        Commands::Status => {
            let index_dir = config.index_dir()?;
            if !index_dir.join("meta.json").exists() {
                match cli.format {
                    OutputFormat::Json => println!(r#"{{"error": "index not found"}}"#),
                    OutputFormat::Text => {
                        println!("Index not found at {}", index_dir.display());
                        println!("Run 'vfsearch rebuild <PATH>' to create it.");
                    }
                }
                return Ok(());
            }

            let writer = TantivyIndexWriter::open(&index_dir).context("failed to open index")?;
            let documents = writer.doc_count().context("failed to read index")?;

            match cli.format {
                OutputFormat::Json => {
                    let output = StatusOutput {
                        index_dir: index_dir.to_string_lossy().to_string(),
                        documents,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("Index at {}", index_dir.display());
                    println!("  Documents: {documents}");
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("failed to serialize config")?
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "{}",
                        toml::to_string_pretty(&config).context("failed to serialize config")?
                    );
                }
            },
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("could not determine config directory");
                }
            }
        },
    }

    Ok(())
}
