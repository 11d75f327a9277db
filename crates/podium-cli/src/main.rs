//! podium CLI: run the dashboard queries against local CSV files.

use clap::{Parser, Subcommand, ValueEnum};
use podium_core::config::{ConfigFile, EngineConfig, MalformedPolicy};
use podium_core::Row;
use podium_exec::{
    Engine, EfficiencyParams, LeaderboardParams, PreviewTable, QueryResult, SearchParams,
};
use podium_io::writers::{CsvWriter, JsonlWriter};
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "podium")]
#[command(version = podium_core::VERSION)]
#[command(about = "Olympic medal queries over streaming CSV files", long_about = None)]
struct Cli {
    /// YAML config file (applied over PODIUM_* environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the CSV files (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Malformed-row policy: skip, fail or pad (overrides config)
    #[arg(long, global = true)]
    malformed: Option<String>,

    /// Keep small tables cached between queries
    #[arg(long, global = true)]
    cache: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Jsonl,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the first rows of a table (events or countries)
    Preview {
        table: String,

        /// Number of rows (defaults to 50 for events, 20 for countries)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search athlete results with filters and pagination
    Search {
        /// Case-insensitive substring of the athlete name
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        season: Option<String>,

        #[arg(long)]
        year_min: Option<i64>,

        #[arg(long)]
        year_max: Option<i64>,

        #[arg(long)]
        noc: Option<String>,

        #[arg(long)]
        sport: Option<String>,

        /// Only rows that won a medal
        #[arg(long)]
        medal_only: bool,

        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long, default_value = "50")]
        page_size: usize,

        /// Pagination order: file or year
        #[arg(long, default_value = "file")]
        order: String,

        /// Comma-separated columns to return
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
    },

    /// List distinct sports
    Sports,

    /// Medal counts per country, optionally for one year
    Leaderboard {
        #[arg(long)]
        year: Option<i64>,

        #[arg(long, default_value = "20")]
        top_n: usize,
    },

    /// Medals per million people / per billion GDP for one year
    Efficiency {
        #[arg(long)]
        year: i64,

        #[arg(long)]
        season: Option<String>,

        /// Gold, Silver or Bronze
        #[arg(long)]
        medal: Option<String>,

        /// medal_count, medals_per_million or medals_per_billion_gdp
        #[arg(long, default_value = "medals_per_million")]
        sort_by: String,

        #[arg(long, default_value = "20")]
        top_n: usize,
    },

    /// Events sample joined with country regions
    JoinDemo {
        #[arg(long, default_value = "100")]
        limit: usize,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Overrides taken from global flags; applied last.
#[derive(Debug, Default)]
struct Overrides {
    data_dir: Option<PathBuf>,
    malformed: Option<MalformedPolicy>,
    cache: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout carries query results
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let overrides = Overrides {
        data_dir: cli.data_dir,
        malformed: cli.malformed.as_deref().map(str::parse).transpose()?,
        cache: cli.cache,
    };
    let config = load_config(cli.config.as_deref(), overrides)?;
    tracing::debug!(?config, "effective configuration");

    if let Commands::Config = cli.command {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let engine = Engine::new(config)?;
    let format = cli.format;

    match cli.command {
        Commands::Preview { table, limit } => {
            let table: PreviewTable = table.parse()?;
            let result = engine.preview(table, limit.unwrap_or(table.default_limit()))?;
            emit_result(&result, format)
        }
        Commands::Search {
            name,
            season,
            year_min,
            year_max,
            noc,
            sport,
            medal_only,
            page,
            page_size,
            order,
            columns,
        } => {
            let params = SearchParams {
                name,
                season,
                year_min,
                year_max,
                noc,
                sport,
                medal_only,
                page,
                page_size,
                order: order.parse()?,
                columns,
            };
            let found = engine.search_athletes(&params)?;
            emit(&found, &found.columns, &found.data, format)
        }
        Commands::Sports => {
            let sports = engine.list_sports()?;
            emit_sports(&sports, format)
        }
        Commands::Leaderboard { year, top_n } => {
            let result = engine.leaderboard(&LeaderboardParams { year, top_n })?;
            emit_result(&result, format)
        }
        Commands::Efficiency {
            year,
            season,
            medal,
            sort_by,
            top_n,
        } => {
            let params = EfficiencyParams {
                season,
                medal,
                sort_by: sort_by.parse()?,
                top_n,
                ..EfficiencyParams::for_year(year)
            };
            let result = engine.efficiency(&params)?;
            emit_result(&result, format)
        }
        Commands::JoinDemo { limit } => {
            let result = engine.join_demo(limit)?;
            emit_result(&result, format)
        }
        Commands::Config => Ok(()),
    }
}

/// Defaults < environment < config file < flags, then validated.
fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<EngineConfig, Box<dyn Error>> {
    let mut config = EngineConfig::from_env();
    if let Some(path) = path {
        let text = fs::read_to_string(path)?;
        config.apply_file(&ConfigFile::from_yaml_str(&text)?);
    }
    apply_overrides(&mut config, overrides);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(cfg: &mut EngineConfig, overrides: Overrides) {
    if let Some(dir) = overrides.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(policy) = overrides.malformed {
        cfg.malformed_policy = policy;
    }
    if overrides.cache {
        cfg.cache_tables = true;
    }
}

fn emit_result(result: &QueryResult, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    emit(result, &result.columns, &result.rows, format)
}

/// `json` prints the whole document; `jsonl` and `csv` print only the rows.
fn emit<T: Serialize>(
    doc: &T,
    columns: &[String],
    rows: &[Row],
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, doc)?;
            writeln!(out)?;
        }
        OutputFormat::Jsonl => {
            let mut w = JsonlWriter::to_writer(&mut out);
            w.write_rows(rows)?;
        }
        OutputFormat::Csv => {
            let mut w = CsvWriter::to_writer(&mut out, columns, b',')?;
            w.write_rows(rows)?;
            w.into_inner()?;
        }
    }
    out.flush()?;
    Ok(())
}

fn emit_sports(sports: &[String], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, sports)?;
            writeln!(out)?;
        }
        OutputFormat::Jsonl => {
            for sport in sports {
                serde_json::to_writer(&mut out, sport)?;
                writeln!(out)?;
            }
        }
        OutputFormat::Csv => {
            let rows: Vec<Row> = sports
                .iter()
                .map(|s| Row::from_pairs([("Sport", s.as_str())]))
                .collect::<Result<_, _>>()?;
            let mut w = CsvWriter::to_writer(&mut out, &["Sport".to_string()], b',')?;
            w.write_rows(&rows)?;
            w.into_inner()?;
        }
    }
    out.flush()?;
    Ok(())
}
