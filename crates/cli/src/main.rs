use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use prometheus::{Encoder, Registry, TextEncoder};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reconciler_core::{
    load_config, validate_config, ArtifactCategory, CancelFlag, Library, MemoryCatalog,
    ScanControl, ScanReport, Scanner,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "reconcile", version)]
#[command(about = "Reconcile a TV library against the files on disk and print the action plan")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    inputs: InputArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct InputArgs {
    /// Configuration file (TOML)
    #[arg(long, env = "RECONCILE_CONFIG", default_value = "reconcile.toml", global = true)]
    config: PathBuf,

    /// Library description (JSON)
    #[arg(long, env = "RECONCILE_LIBRARY", default_value = "library.json", global = true)]
    library: PathBuf,

    /// Catalog dump (JSON)
    #[arg(long, env = "RECONCILE_CATALOG", default_value = "catalog.json", global = true)]
    catalog: PathBuf,

    /// Reference time for air-date checks (RFC 3339). Defaults to now.
    #[arg(long, env = "RECONCILE_NOW", value_parser = parse_rfc3339, global = true)]
    now: Option<DateTime<Utc>>,

    /// Write Prometheus metrics to this file after the run
    #[arg(long, env = "RECONCILE_METRICS_FILE", global = true)]
    metrics_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Full reconciliation pass (default)
    Scan,
    /// Regenerate artifacts for files already in the library
    Refresh {
        #[arg(value_enum, default_value_t = RefreshArg::All)]
        category: RefreshArg,
    },
}

/// Artifact categories a refresh can be limited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RefreshArg {
    All,
    Images,
    Metadata,
    Timestamps,
}

impl RefreshArg {
    fn category(self) -> Option<ArtifactCategory> {
        match self {
            RefreshArg::All => None,
            RefreshArg::Images => Some(ArtifactCategory::Image),
            RefreshArg::Metadata => Some(ArtifactCategory::Metadata),
            RefreshArg::Timestamps => Some(ArtifactCategory::Timestamp),
        }
    }
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 time: {}", e))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Logs go to stderr; stdout carries the plan.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = cli.command.unwrap_or(Command::Scan);
    let inputs = cli.inputs;
    info!(version = VERSION, command = ?command, "Starting reconcile");

    info!("Loading configuration from {:?}", inputs.config);
    let config = load_config(&inputs.config)
        .with_context(|| format!("Failed to load config from {:?}", inputs.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let library = Library::load(&inputs.library)
        .with_context(|| format!("Failed to load library from {:?}", inputs.library))?;

    let catalog_json = tokio::fs::read_to_string(&inputs.catalog)
        .await
        .with_context(|| format!("Failed to read catalog from {:?}", inputs.catalog))?;
    let catalog = MemoryCatalog::from_json(&catalog_json).context("Failed to parse catalog")?;
    info!(
        shows = library.shows.len(),
        catalog_shows = catalog.len(),
        "Library and catalog loaded"
    );

    let now = inputs.now.unwrap_or_else(Utc::now);

    // Ctrl-C raises the cancel flag; the scan stops at its next check.
    let cancel = CancelFlag::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling scan");
            interrupt.cancel();
        }
    });

    let report = tokio::task::spawn_blocking(move || {
        let scanner = Scanner::new(&config, &catalog);
        let mut control = ScanControl::new(cancel).with_progress(|progress| {
            debug!(phase = ?progress.phase, percent = progress.percent, "Scan progress");
        });
        match command {
            Command::Scan => scanner.run(&library, now, &mut control),
            Command::Refresh { category } => {
                scanner.force_refresh(&library, category.category(), now, &mut control)
            }
        }
    })
    .await
    .context("Scan task panicked")?
    .context("Scan failed")?;

    print_report(&report)?;

    if let Some(path) = inputs.metrics_file {
        let text = encode_metrics()?;
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("Failed to write metrics to {:?}", path))?;
        info!(path = %path.display(), "Metrics written");
    }

    Ok(())
}

fn print_report(report: &ScanReport) -> Result<()> {
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    for rule in &report.synthesized_rules {
        info!(
            series_id = rule.series_id,
            season = rule.season,
            rule = ?rule.rule,
            "Merge rule synthesized; add it to the library to keep it"
        );
    }

    let json = serde_json::to_string_pretty(&report.plan).context("Failed to serialize plan")?;
    println!("{}", json);

    // Two runs over unchanged inputs print the same fingerprint.
    let fingerprint = format!("{:x}", Sha256::digest(json.as_bytes()));
    info!(
        fingerprint = %&fingerprint[..16],
        actions = report.plan.len(),
        missing = report.stats.missing,
        resolved = report.stats.resolved,
        warnings = report.warnings.len(),
        "Plan ready"
    );
    Ok(())
}

/// Encode all core metrics as Prometheus text format.
fn encode_metrics() -> Result<String> {
    let registry = Registry::new();
    for metric in reconciler_core::metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metric")?;
    }
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics are not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("reconcile").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_commands_parse() {
        assert_eq!(parse(&[]).unwrap().command, None);
        assert_eq!(parse(&["scan"]).unwrap().command, Some(Command::Scan));
        assert_eq!(
            parse(&["refresh"]).unwrap().command,
            Some(Command::Refresh {
                category: RefreshArg::All
            })
        );
        assert_eq!(
            parse(&["refresh", "images"]).unwrap().command,
            Some(Command::Refresh {
                category: RefreshArg::Images
            })
        );
        assert!(parse(&["refresh", "posters"]).is_err());
        assert!(parse(&["delete"]).is_err());
    }

    #[test]
    fn test_refresh_categories() {
        assert_eq!(RefreshArg::All.category(), None);
        assert_eq!(
            RefreshArg::Timestamps.category(),
            Some(ArtifactCategory::Timestamp)
        );
    }

    #[test]
    fn test_now_must_be_rfc3339() {
        let cli = parse(&["--now", "2024-01-01T00:00:00Z", "scan"]).unwrap();
        assert_eq!(cli.inputs.now, Some(parse_rfc3339("2024-01-01T00:00:00+00:00").unwrap()));
        assert!(parse(&["--now", "yesterday"]).is_err());
    }
}
