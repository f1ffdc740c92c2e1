use boxrev_core::Warehouse;
use boxrev_warehouse::{selection_keys, write_html};

use crate::cli::DashboardArgs;
use crate::error::CliError;

pub fn run(warehouse: &Warehouse, args: &DashboardArgs) -> Result<(), CliError> {
    if args.list {
        for key in selection_keys() {
            println!("{key}");
        }
        return Ok(());
    }

    let selection = args
        .selection
        .as_deref()
        .ok_or_else(|| CliError::Command("pass a selection key or --list".to_string()))?;
    let figure = warehouse.render_dashboard(selection)?;
    write_html(&figure, &args.out)?;
    println!("wrote {} chart to {}", selection, args.out.display());
    Ok(())
}
