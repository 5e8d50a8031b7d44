//! BarPilot CLI: one-shot agent tick, feature inspection, dataset export.
//!
//! Commands:
//! - `tick`: check the clock, build the observation, ask the policy, place or close
//! - `features`: print the newest scaled feature rows and the observation shape
//! - `dataset`: build the training dataset and write it as Parquet or CSV
//! - `config`: print the effective configuration as TOML

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use barpilot_core::broker::{AlpacaBroker, Broker, DryRunBroker, OfflineBroker};
use barpilot_core::data::{DataProvider, DatasetFormat};
use barpilot_core::features::{FeatureBuilder, FeatureTable};
use barpilot_core::policy::HttpPolicy;
use barpilot_core::build_obs;
use barpilot_runner::{
    credentials_with, load_bars, load_dataset, load_dotenv, make_provider, process_env, run_tick,
    AgentConfig, BarSource, LoadPurpose,
};

#[derive(Parser)]
#[command(
    name = "barpilot",
    about = "BarPilot: intraday feature pipeline and long/flat trading agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbol override.
    #[arg(long)]
    symbol: Option<String>,

    /// Read bars from a CSV file instead of the network.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Generate synthetic bars (offline development only).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Last trading day of synthetic bars (YYYY-MM-DD). Defaults to today.
    #[arg(long, requires = "synthetic")]
    anchor: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one trading tick.
    Tick {
        #[command(flatten)]
        source: SourceArgs,

        /// Log orders instead of sending them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Policy endpoint override.
        #[arg(long)]
        policy_url: Option<String>,

        /// Print the outcome as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the newest feature rows from a live fetch.
    Features {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of rows to print.
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
    /// Build the training dataset and write it to disk.
    Dataset {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file. Defaults to `<symbol>_features.<ext>`.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: parquet or csv.
        #[arg(long, default_value = "parquet")]
        format: DatasetFormat,
    },
    /// Print the effective configuration.
    Config {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    load_dotenv();
    let cli = Cli::parse();

    match cli.command {
        Commands::Tick {
            source,
            dry_run,
            policy_url,
            json,
        } => run_tick_cmd(&source, dry_run, policy_url, json),
        Commands::Features { source, rows } => run_features_cmd(&source, rows),
        Commands::Dataset {
            source,
            output,
            format,
        } => run_dataset_cmd(&source, output, format),
        Commands::Config { config } => {
            let config = load_config(config.as_ref(), None)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>, symbol: Option<&str>) -> Result<AgentConfig> {
    let mut config = match path {
        Some(path) => AgentConfig::from_file(path)?,
        None => AgentConfig::default(),
    };
    config.apply_env_overrides(process_env);
    if let Some(symbol) = symbol {
        config.symbol = symbol.to_uppercase();
    }
    config.validate()?;
    Ok(config)
}

fn bar_source(args: &SourceArgs) -> Result<BarSource> {
    if let Some(path) = &args.csv {
        return Ok(BarSource::Csv(path.clone()));
    }
    if args.synthetic {
        let anchor = args
            .anchor
            .as_deref()
            .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            .transpose()
            .context("--anchor must be YYYY-MM-DD")?;
        return Ok(BarSource::Synthetic { anchor });
    }
    Ok(BarSource::Yahoo)
}

fn open_provider(args: &SourceArgs, config: &AgentConfig) -> Result<Box<dyn DataProvider>> {
    Ok(make_provider(&bar_source(args)?, config)?)
}

/// Paper/live broker from the environment. A dry run without credentials
/// falls back to an offline account that is always open and flat.
fn open_broker(config: &AgentConfig) -> Result<Box<dyn Broker>> {
    match credentials_with(process_env) {
        Ok(credentials) => {
            let broker = AlpacaBroker::new(config.broker_base_url.clone(), credentials)?;
            if config.dry_run {
                Ok(Box::new(DryRunBroker::new(broker)))
            } else {
                Ok(Box::new(broker))
            }
        }
        Err(e) if config.dry_run => {
            warn!(error = %e, "no broker credentials, using offline account");
            Ok(Box::new(DryRunBroker::new(OfflineBroker)))
        }
        Err(e) => Err(e.into()),
    }
}

fn run_tick_cmd(
    args: &SourceArgs,
    dry_run: bool,
    policy_url: Option<String>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(args.config.as_ref(), args.symbol.as_deref())?;
    if let Some(url) = policy_url {
        config.policy_url = url;
    }
    config.dry_run |= dry_run;

    let provider = open_provider(args, &config)?;
    let policy = HttpPolicy::new(config.policy_url.clone())?
        .with_expected_len(config.pipeline.observation_len());
    let broker = open_broker(&config)?;

    let outcome = run_tick(&config, provider.as_ref(), &policy, broker.as_ref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{} [{}]: {outcome}", config.symbol, broker.name());
    }
    Ok(())
}

fn run_features_cmd(args: &SourceArgs, rows: usize) -> Result<()> {
    let config = load_config(args.config.as_ref(), args.symbol.as_deref())?;
    let provider = open_provider(args, &config)?;
    let bars = load_bars(provider.as_ref(), &config, LoadPurpose::Live)?;
    let scaled = FeatureBuilder::default().build(&bars)?;
    let features = &scaled.table;

    println!(
        "{}: {} bars, {} feature rows after warm-up",
        config.symbol,
        bars.len(),
        features.len()
    );
    if features.is_empty() {
        bail!("no feature rows; fetch more history");
    }
    print_rows(features, &config, rows);
    for column in &config.pipeline.features {
        if let Some(stats) = scaled.stats_for(*column) {
            println!(
                "  {:<12} median {:>12.6}  iqr {:>12.6}",
                column.name(),
                stats.median,
                stats.iqr()
            );
        }
    }

    match build_obs(features, config.pipeline.window, &config.pipeline.features) {
        Ok(obs) => println!(
            "observation: {} values ({} rows x {} features), last close {:.2} at {}",
            obs.len(),
            obs.window,
            obs.columns.len(),
            obs.last_close,
            obs.last_timestamp
        ),
        Err(short) => println!("observation: {short}"),
    }
    Ok(())
}

fn print_rows(features: &FeatureTable, config: &AgentConfig, rows: usize) {
    let columns = &config.pipeline.features;
    let header: Vec<&str> = columns.iter().map(|c| c.name()).collect();
    println!("{:<26} {}", "timestamp", header.join(" "));

    let tail = features.tail(rows);
    for (i, ts) in tail.timestamps().iter().enumerate() {
        let values: Vec<String> = tail
            .row(i, columns)
            .unwrap_or_default()
            .iter()
            .zip(&header)
            .map(|(v, name)| format!("{v:>width$.4}", width = name.len()))
            .collect();
        println!("{:<26} {}", ts.to_rfc3339(), values.join(" "));
    }
}

fn run_dataset_cmd(args: &SourceArgs, output: Option<PathBuf>, format: DatasetFormat) -> Result<()> {
    let config = load_config(args.config.as_ref(), args.symbol.as_deref())?;
    let provider = open_provider(args, &config)?;
    let dataset = load_dataset(&config, provider.as_ref())?;

    let output = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}_features.{}",
            config.symbol.to_lowercase(),
            format.extension()
        ))
    });
    dataset.export(&output, format)?;

    let episodes = dataset.episodes();
    let (first, last) = match (episodes.first(), episodes.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => bail!("dataset has no episodes"),
    };
    println!(
        "{}: {} rows over {} trading days ({first} to {last})",
        dataset.symbol,
        dataset.len(),
        episodes.len()
    );
    println!("Dataset written to: {}", output.display());
    Ok(())
}
