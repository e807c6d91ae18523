//! placemap CLI - inspect and export location-history files
//!
//! Usage:
//!   placemap-cli stats <file> [filter flags]
//!   placemap-cli export <file> --format <csv|json> [--output <dir>] [--metadata]
//!
//! Imports a CSV/JSON location-history file, applies the requested filters,
//! and either prints the aggregate statistics or writes a timestamped export
//! file of the filtered set.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use placemap::{parse_timestamp, ExportFormat, FilterOptions, TimeRange, TimelineEngine};

#[derive(Parser)]
#[command(name = "placemap-cli")]
#[command(about = "Inspect and export location-history files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a file and print aggregate statistics
    Stats {
        /// CSV or JSON location-history file
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Import a file and export the filtered set
    Export {
        /// CSV or JSON location-history file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Output directory (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the metadata envelope (JSON only)
        #[arg(long)]
        metadata: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ExportFormat::Csv,
            Format::Json => ExportFormat::Json,
        }
    }
}

#[derive(Args)]
struct FilterArgs {
    /// Only include points in these categories (repeatable)
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Minimum visit count
    #[arg(long)]
    min_visits: Option<u32>,

    /// Maximum visit count
    #[arg(long)]
    max_visits: Option<u32>,

    /// Start of the time window (e.g. 2024-01-01), inclusive
    #[arg(long)]
    from: Option<String>,

    /// End of the time window, inclusive
    #[arg(long)]
    to: Option<String>,

    /// Enable visit-frequency rendering mode
    #[arg(long)]
    frequency: bool,
}

impl FilterArgs {
    fn to_options(&self) -> Result<FilterOptions, String> {
        let time_range = match (&self.from, &self.to) {
            (None, None) => None,
            (from, to) => {
                let start = parse_date(from.as_deref(), "1970-01-01")?;
                let end = parse_date(to.as_deref(), "9999-12-31")?;
                Some(TimeRange { start, end })
            }
        };

        Ok(FilterOptions {
            time_range,
            min_visit_count: self.min_visits,
            max_visit_count: self.max_visits,
            categories: (!self.categories.is_empty()).then(|| self.categories.clone()),
            show_visit_frequency: self.frequency,
        })
    }
}

fn parse_date(raw: Option<&str>, default: &str) -> Result<chrono::DateTime<chrono::Utc>, String> {
    let text = raw.unwrap_or(default);
    parse_timestamp(text).ok_or_else(|| format!("unrecognized date: {text}"))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let result = match cli.command {
        Commands::Stats { file, filters } => run_stats(&file, &filters),
        Commands::Export {
            file,
            format,
            output,
            metadata,
            filters,
        } => run_export(&file, format.into(), output, metadata, &filters),
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn load(file: &std::path::Path, filters: &FilterArgs) -> Result<TimelineEngine, String> {
    let mut engine = TimelineEngine::new();
    engine.import_file(file).map_err(|e| e.to_string())?;
    engine.set_filters(filters.to_options()?);
    Ok(engine)
}

fn run_stats(file: &std::path::Path, filters: &FilterArgs) -> Result<(), String> {
    let engine = load(file, filters)?;
    let stats = engine.statistics();

    println!("Points:       {}", stats.total_points);
    println!("Total visits: {}", stats.total_visits);
    println!("Avg visits:   {:.1}", stats.average_visits);
    println!("Recent (30d): {}", stats.recent_visits);

    if !stats.categories.is_empty() {
        println!("\nBy category:");
        for row in &stats.categories {
            println!(
                "  {:<16} {:>4} places, {:>4} visits",
                row.category, row.count, row.visit_count
            );
        }
    }

    if !stats.most_visited.is_empty() {
        println!("\nMost visited:");
        for (rank, point) in stats.most_visited.iter().enumerate() {
            println!("  #{} {} ({} visits)", rank + 1, point.title, point.visits());
        }
    }

    if !stats.time_distribution.is_empty() {
        println!("\nOver time:");
        for bucket in &stats.time_distribution {
            println!("  {:<9} {}", bucket.month, bucket.count);
        }
    }

    Ok(())
}

fn run_export(
    file: &std::path::Path,
    format: ExportFormat,
    output: Option<PathBuf>,
    metadata: bool,
    filters: &FilterArgs,
) -> Result<(), String> {
    let engine = load(file, filters)?;
    let dir = output.unwrap_or_else(|| PathBuf::from("."));

    let path = engine
        .export_to_file(&dir, format, metadata)
        .map_err(|e| e.to_string())?;

    println!(
        "Exported {} of {} points to {}",
        engine.filtered().len(),
        engine.points().len(),
        path.display()
    );
    Ok(())
}
