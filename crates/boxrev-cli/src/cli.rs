//! CLI argument definitions for boxrev.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` | Bootstrap staging and warehouse schema |
//! | `ingest-csv` | Merge any CSV into a registered staging table |
//! | `ingest-revenues` | Optimized merge of the daily revenue CSV |
//! | `fetch-details` | Fetch OMDb metadata for staged titles |
//! | `create-views` | Run view-definition SQL scripts |
//! | `transform` | Run staging → warehouse transformation scripts |
//! | `dashboard` | Render a canned aggregate as a bar chart |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Movie box-office analytics pipeline: CSV + OMDb ingestion into a SQLite
/// staging store, SQL-driven transformation into a star-schema warehouse,
/// and bar-chart dashboards over precomputed views.
#[derive(Debug, Parser)]
#[command(name = "boxrev", author, version, about)]
pub struct Cli {
    /// Database file (env: BOXREV_DB).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Directory holding views/ and transformations/ (env: BOXREV_SQL_DIR).
    #[arg(long, global = true)]
    pub sql_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create all staging and warehouse tables plus their triggers.
    Init,

    /// Merge a CSV file into a registered staging table.
    IngestCsv(IngestCsvArgs),

    /// Merge the daily revenue CSV via the bulk temp-table upsert.
    IngestRevenues(IngestRevenuesArgs),

    /// Fetch OMDb metadata for staged revenue titles.
    FetchDetails(FetchDetailsArgs),

    /// Run one view-definition script, or all of them.
    CreateViews(ScriptArgs),

    /// Run one transformation script, or all of them.
    Transform(ScriptArgs),

    /// Render a dashboard selection to an HTML bar chart.
    Dashboard(DashboardArgs),
}

#[derive(Debug, Args)]
pub struct IngestCsvArgs {
    /// Path to the CSV file.
    pub file: PathBuf,

    /// Target staging table.
    #[arg(long, default_value = "stg_revenues_per_day")]
    pub table: String,

    /// Field delimiter.
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Treat the first line as data, not a header.
    #[arg(long, default_value_t = false)]
    pub no_header: bool,
}

#[derive(Debug, Args)]
pub struct IngestRevenuesArgs {
    /// Path to the CSV file.
    pub file: PathBuf,

    /// Field delimiter.
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Treat the first line as data, not a header.
    #[arg(long, default_value_t = false)]
    pub no_header: bool,
}

#[derive(Debug, Args)]
pub struct FetchDetailsArgs {
    /// Failure budget before the pass halts.
    #[arg(long, default_value_t = 3)]
    pub allowed_failures: u32,

    /// Consider every distinct revenue title, not only missing ones.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Stop after this many successfully fetched entries.
    #[arg(long)]
    pub limit: Option<usize>,

    /// OMDb endpoint.
    #[arg(long, default_value = boxrev_core::OMDB_ADDRESS)]
    pub omdb_address: String,
}

#[derive(Debug, Args)]
pub struct ScriptArgs {
    /// Script filename inside the kind's directory; all scripts when omitted.
    pub script: Option<String>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Selection key, e.g. "genres" or "per_year".
    pub selection: Option<String>,

    /// Output HTML file.
    #[arg(long, default_value = "chart.html")]
    pub out: PathBuf,

    /// List the available selection keys and exit.
    #[arg(long, default_value_t = false)]
    pub list: bool,
}
