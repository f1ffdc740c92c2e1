use boxrev_core::Warehouse;
use boxrev_warehouse::{STAGING_TABLES, WAREHOUSE_TABLES};

use crate::error::CliError;

pub fn run(warehouse: &Warehouse) -> Result<(), CliError> {
    warehouse.ensure_schema(STAGING_TABLES)?;
    warehouse.ensure_schema(WAREHOUSE_TABLES)?;
    println!(
        "schema ready: {} staging tables, {} warehouse tables",
        STAGING_TABLES.len(),
        WAREHOUSE_TABLES.len()
    );
    Ok(())
}
