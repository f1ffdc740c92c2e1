use boxrev_core::{CsvIngestDefinition, Warehouse};
use boxrev_warehouse::schema;

use crate::cli::{IngestCsvArgs, IngestRevenuesArgs};
use crate::error::CliError;

pub fn run_generic(warehouse: &Warehouse, args: &IngestCsvArgs) -> Result<(), CliError> {
    let table = schema::table(&args.table)
        .ok_or_else(|| CliError::Command(format!("unknown table '{}'", args.table)))?;
    let definition = CsvIngestDefinition::new(&args.file)
        .delimiter(delimiter(args.delimiter)?)
        .has_header(!args.no_header);

    let rows = warehouse.merge_csv(&definition, table)?;
    println!("merged {rows} rows into {}", table.name);
    Ok(())
}

pub fn run_revenues(warehouse: &Warehouse, args: &IngestRevenuesArgs) -> Result<(), CliError> {
    let definition = CsvIngestDefinition::new(&args.file)
        .delimiter(delimiter(args.delimiter)?)
        .has_header(!args.no_header);

    let rows = warehouse.merge_revenue_csv(&definition)?;
    println!("merged {rows} rows into stg_revenues_per_day");
    Ok(())
}

fn delimiter(value: char) -> Result<u8, CliError> {
    u8::try_from(value)
        .map_err(|_| CliError::Command(format!("delimiter '{value}' is not a single byte")))
}
