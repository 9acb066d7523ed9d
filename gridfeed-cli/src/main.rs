//! Gridfeed CLI — fetch NYISO load and interchange records.
//!
//! Commands:
//! - `load` — total load per five-minute interval
//! - `trade` — imports and exports across external interfaces
//! - `interfaces` — print the external interface allow-list

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gridfeed_core::data::{CsvSource, DirSource, HttpSource, EXTERNAL_NEIGHBORS};
use gridfeed_core::{
    tz, ClientConfig, DataKind, Frequency, Market, NyisoClient, Record, RequestOptions,
    WindowPolicy,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridfeed", about = "Gridfeed CLI — NYISO load and interchange records")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Total load per timestamp.
    Load(RequestArgs),
    /// Imports and exports per timestamp.
    Trade(RequestArgs),
    /// Print the external interfaces counted toward imports and exports.
    Interfaces,
}

#[derive(Args)]
struct RequestArgs {
    /// Only the most recent record for today.
    #[arg(long, default_value_t = false, conflicts_with_all = ["start", "end"])]
    latest: bool,

    /// Window start (RFC 3339, or YYYY-MM-DD for Eastern midnight).
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Window end (RFC 3339, or YYYY-MM-DD for the end of that Eastern day).
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Frequency tag (five-minute, ten-minute, fifteen-minute, hourly, n/a).
    #[arg(long, default_value = "five-minute")]
    freq: Frequency,

    /// Market tag (five-minute-real-time, hourly-real-time, day-ahead-hourly).
    #[arg(long, default_value = "five-minute-real-time")]
    market: Market,

    /// Keep only records stamped exactly at --end (historical filter).
    #[arg(long, default_value_t = false)]
    legacy_window: bool,

    /// TOML config file (base_url, timeout_secs, user_agent).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read CSVs from a local mirror (<dir>/<label>/<YYYYMMDD><label>.csv) instead of HTTP.
    #[arg(long)]
    offline_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Load(args) => run_request(DataKind::Load, args),
        Commands::Trade(args) => run_request(DataKind::Trade, args),
        Commands::Interfaces => {
            for neighbor in EXTERNAL_NEIGHBORS {
                println!("{}: {}", neighbor.name, neighbor.interfaces.join(", "));
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_request(kind: DataKind, args: RequestArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    let opts = build_options(kind, &args)?;
    tracing::debug!(?opts, base_url = %config.base_url, "request");

    let source: Box<dyn CsvSource> = match &args.offline_dir {
        Some(dir) => Box::new(DirSource::new(dir)),
        None => Box::new(HttpSource::new(&config)?),
    };
    let client = NyisoClient::new(&*source, &config.base_url);

    let records = client
        .get(&opts)
        .with_context(|| format!("fetching {kind} data"))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &records)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(&mut out, &records)?,
    }
    Ok(())
}

fn build_options(kind: DataKind, args: &RequestArgs) -> Result<RequestOptions> {
    let opts = if args.latest {
        RequestOptions::latest(kind)
    } else {
        match (&args.start, &args.end) {
            (Some(start), Some(end)) => {
                RequestOptions::range(kind, parse_bound(start, false)?, parse_bound(end, true)?)
            }
            _ => bail!("either --latest or both --start and --end are required"),
        }
    };

    let window = if args.legacy_window {
        WindowPolicy::LegacyEndOnly
    } else {
        WindowPolicy::Inclusive
    };

    Ok(opts
        .with_freq(args.freq)
        .with_market(args.market)
        .with_window(window))
}

/// RFC 3339 instant, or an Eastern calendar date (start or end of that day).
fn parse_bound(text: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{text}' (expected RFC 3339 or YYYY-MM-DD)"))?;
    let time = if end_of_day {
        NaiveTime::from_hms_opt(23, 59, 59)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .context("invalid time of day")?;
    Ok(tz::utcify(date.and_time(time), None)?)
}

fn write_csv<W: Write>(out: W, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["timestamp", "field", "value", "freq", "market", "ba_name"])?;
    for r in records {
        writer.write_record([
            r.timestamp.to_rfc3339(),
            r.measurement.field().to_string(),
            r.value().to_string(),
            r.freq.to_string(),
            r.market.to_string(),
            r.ba_name.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
