use std::path::Path;

use boxrev_core::Warehouse;
use boxrev_warehouse::ScriptKind;

use crate::cli::ScriptArgs;
use crate::error::CliError;

pub fn run(
    warehouse: &Warehouse,
    sql_dir: &Path,
    kind: ScriptKind,
    args: &ScriptArgs,
) -> Result<(), CliError> {
    match &args.script {
        Some(script) => {
            warehouse.run_script(sql_dir, kind, script)?;
            println!("applied {script}");
        }
        None => {
            let ran = warehouse.run_all_scripts(sql_dir, kind)?;
            println!("applied {} {} scripts", ran.len(), kind.subdir());
        }
    }
    Ok(())
}
