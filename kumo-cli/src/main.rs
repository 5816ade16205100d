//! Kumo CLI: Ichimoku scans and configuration management.
//!
//! Commands:
//! - `scan`: scan an instrument universe from CSV files or synthetic data
//! - `config init`: write the default configuration to a TOML file
//! - `config show`: print the effective configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use kumo_core::data::{CandleProvider, CsvProvider, SyntheticProvider};
use kumo_core::domain::Granularity;
use kumo_runner::{
    export_csv, export_json, render_table, run_scan, write_output, ScanConfig, ScanReport,
};

#[derive(Parser)]
#[command(name = "kumo", about = "Kumo CLI: Ichimoku signal scanner", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan instruments for crossovers, confluence verdicts, and alignment.
    Scan(ScanArgs),
    /// Configuration commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of `<INSTRUMENT>_<GRANULARITY>.csv` candle files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Use deterministic synthetic candles instead of CSV files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Seed for --synthetic.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Instruments to scan (e.g., EUR_USD USD_JPY). Overrides the config.
    #[arg(long = "instrument", num_args = 1..)]
    instruments: Vec<String>,

    /// Timeframes to align, primary first (e.g., H1 H4 D). Overrides the config.
    #[arg(long = "timeframe", num_args = 1..)]
    timeframes: Vec<Granularity>,

    /// Candles to request per instrument and timeframe.
    #[arg(long)]
    candles: Option<usize>,

    /// Worker threads (0 = all cores, 1 = sequential).
    #[arg(long)]
    threads: Option<usize>,

    /// Keep the forming candle instead of trimming it before analysis.
    #[arg(long, default_value_t = false)]
    keep_forming: bool,

    /// Report every crossover, not just the latest.
    #[arg(long, default_value_t = false)]
    history: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write the output to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration as TOML.
    Init {
        /// Destination file.
        #[arg(long, default_value = "kumo.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print the effective configuration (defaults merged with a file).
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan_cmd(args),
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => run_config_init(&path, force),
            ConfigAction::Show { config } => run_config_show(config.as_deref()),
        },
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kumo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn run_scan_cmd(args: ScanArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let provider: Box<dyn CandleProvider> = if args.synthetic {
        Box::new(SyntheticProvider::new(args.seed))
    } else {
        if !args.data_dir.is_dir() {
            bail!(
                "data directory does not exist: {} (pass --synthetic for generated candles)",
                args.data_dir.display()
            );
        }
        Box::new(CsvProvider::new(&args.data_dir))
    };

    tracing::debug!(provider = provider.name(), "data source selected");
    let report = run_scan(&config, provider.as_ref(), None).context("scan failed")?;

    let rendered = match args.format {
        Format::Table => {
            let mut out = render_table(&report);
            if config.scan.history {
                out.push_str(&render_history(&report));
            }
            out
        }
        Format::Json => export_json(&report)?,
        Format::Csv => export_csv(&report)?,
    };

    match &args.output {
        Some(path) => {
            write_output(path, &rendered)?;
            println!(
                "Scanned {} instrument(s); output written to {}",
                report.instruments.len(),
                path.display()
            );
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Command-line flags override the file.
fn apply_overrides(config: &mut ScanConfig, args: &ScanArgs) {
    if !args.instruments.is_empty() {
        config.scan.instruments = args.instruments.clone();
    }
    if !args.timeframes.is_empty() {
        config.scan.timeframes = args.timeframes.clone();
    }
    if let Some(candles) = args.candles {
        config.scan.candle_count = candles;
    }
    if let Some(threads) = args.threads {
        config.scan.threads = threads;
    }
    if args.keep_forming {
        config.scan.drop_incomplete = false;
    }
    if args.history {
        config.scan.history = true;
    }
    config.normalize();
}

fn render_history(report: &ScanReport) -> String {
    let mut out = String::from("\nCrossover history (oldest first)\n");
    for inst in &report.instruments {
        for tf in &inst.timeframes {
            if tf.history.is_empty() {
                continue;
            }
            out.push_str(&format!("{} {}:\n", inst.instrument, tf.granularity));
            for event in &tf.history {
                out.push_str(&format!(
                    "  {:>5}  {}  {}\n",
                    event.index,
                    event.time.format("%Y-%m-%d %H:%M"),
                    event.direction
                ));
            }
        }
    }
    out
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    let toml_str = ScanConfig::default().to_toml()?;
    write_output(path, &toml_str)?;
    println!("Default configuration written to {}", path.display());
    Ok(())
}

fn run_config_show(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
