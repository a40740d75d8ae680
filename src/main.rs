//! CLI entry point for the MSP flights pipeline.
//!
//! Loads the flight spreadsheet once, then prints or writes one aggregated
//! view (or headline statistics) for a date range.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use msp_flights::analyzers::analyzer::{View, build_view};
use msp_flights::analyzers::summary::Summary;
use msp_flights::config::{Settings, parse_offset};
use msp_flights::output::{Format, emit_view, print_pretty};
use msp_flights::parser::{CsvSource, TableLayout};
use msp_flights::range::DateRange;
use msp_flights::{FlightTable, load};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "msp_flights")]
#[command(about = "Aggregate ICE deportation-flight records from MSP", long_about = None)]
struct Cli {
    /// Spreadsheet or export CSV to load (overrides MSP_FLIGHTS_SOURCE)
    #[arg(short, long, global = true, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Row layout of the source: spreadsheet or export (overrides MSP_FLIGHTS_LAYOUT)
    #[arg(short, long, global = true)]
    layout: Option<TableLayout>,

    /// UTC offset for Arrive timestamps, e.g. -06:00 (overrides MSP_FLIGHTS_ARRIVAL_OFFSET)
    #[arg(long, global = true, value_name = "OFFSET")]
    arrival_offset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RangeArgs {
    /// First day to include (YYYY-MM-DD); defaults to the first day with data
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD); defaults to today, capped at the last day with data
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate one chart view and write its rows
    View {
        /// daily-detainees, flights-per-day, detainees-offloaded, detainees-by-airline,
        /// detainees-by-destination, detainees-by-final-destination or detainees-by-tail
        #[arg(value_name = "VIEW", default_value = "daily-detainees")]
        view: View,

        #[command(flatten)]
        range: RangeArgs,

        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: Format,

        /// File to write; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print headline statistics for a date range
    Summary {
        #[command(flatten)]
        range: RangeArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/msp_flights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("msp_flights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info")?);

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug")?);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;

    info!(
        source = %settings.source.display(),
        layout = ?settings.layout,
        arrival_offset = %settings.arrival_offset,
        "Loading flight data"
    );
    let flights = load(&CsvSource::new(&settings.source), &settings.load_options())
        .with_context(|| format!("loading {}", settings.source.display()))?;
    print_pretty(flights.report());

    match cli.command {
        Commands::View {
            view,
            range,
            format,
            output,
        } => {
            let Some(range) = resolve_range(&flights, &range)? else {
                warn!("No counted flight records; nothing to aggregate");
                return Ok(());
            };
            info!(%view, title = view.title(), start = %range.start(), end = %range.end(), "Building view");

            let data = build_view(&flights, range, view);
            emit_view(output.as_deref(), &data, format)?;
        }
        Commands::Summary { range } => {
            let Some(range) = resolve_range(&flights, &range)? else {
                warn!("No counted flight records; nothing to summarize");
                return Ok(());
            };
            let summary = Summary::for_range(&flights, range);

            println!("Range:              {} to {}", range.start(), range.end());
            println!("Days in range:      {}", summary.days);
            println!("Days with flights:  {}", summary.days_with_flights);
            println!("Total detainees:    {:.0}", summary.total);
            println!("Observed detainees: {:.0}", summary.observed);
            println!("Estimated:          {:.0}", summary.estimated);
            println!("Average per day:    {:.1}", summary.average_per_day);
        }
    }

    Ok(())
}

/// Filter read from `var`, or `default` when the variable is unset or invalid.
fn env_filter(var: &str, default: &str) -> Result<EnvFilter> {
    Ok(EnvFilter::try_from_env(var).or_else(|_| EnvFilter::try_new(default))?)
}

/// Environment settings with command-line overrides applied.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::from_env()?;

    if let Some(source) = &cli.source {
        settings.source = source.clone();
    }
    if let Some(layout) = cli.layout {
        settings.layout = layout;
    }
    if let Some(offset) = &cli.arrival_offset {
        settings.arrival_offset = parse_offset(offset)
            .with_context(|| format!("invalid --arrival-offset {offset:?}"))?;
    }

    Ok(settings)
}

/// Fills unspecified bounds from the data, the way the dashboard picks its
/// initial filter. `None` when the table has no counted records.
fn resolve_range(flights: &FlightTable, args: &RangeArgs) -> Result<Option<DateRange>> {
    let Some(bounds) = flights.date_bounds() else {
        return Ok(None);
    };
    let default = DateRange::default_view(bounds, Local::now().date_naive());

    let range = DateRange::new(
        args.start.unwrap_or(default.start()),
        args.end.unwrap_or(default.end()),
    )?;
    Ok(Some(range))
}
