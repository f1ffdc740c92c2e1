mod dashboard;
mod fetch;
mod ingest;
mod init;
mod scripts;

use std::env;
use std::path::PathBuf;

use boxrev_core::Warehouse;
use boxrev_warehouse::ScriptKind;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub fn run(cli: &Cli) -> Result<(), CliError> {
    let warehouse = Warehouse::open(db_path(cli))?;
    match &cli.command {
        Command::Init => init::run(&warehouse),
        Command::IngestCsv(args) => ingest::run_generic(&warehouse, args),
        Command::IngestRevenues(args) => ingest::run_revenues(&warehouse, args),
        Command::FetchDetails(args) => fetch::run(&warehouse, args),
        Command::CreateViews(args) => {
            scripts::run(&warehouse, &sql_dir(cli), ScriptKind::Views, args)
        }
        Command::Transform(args) => {
            scripts::run(&warehouse, &sql_dir(cli), ScriptKind::Transformations, args)
        }
        Command::Dashboard(args) => dashboard::run(&warehouse, args),
    }
}

fn db_path(cli: &Cli) -> PathBuf {
    cli.db
        .clone()
        .or_else(|| env::var_os("BOXREV_DB").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("boxrev.db"))
}

fn sql_dir(cli: &Cli) -> PathBuf {
    cli.sql_dir
        .clone()
        .or_else(|| env::var_os("BOXREV_SQL_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("sql"))
}
