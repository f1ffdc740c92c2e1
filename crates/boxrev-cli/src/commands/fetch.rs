use boxrev_core::{fetch_movie_details, CoreError, OmdbClient, OmdbFetchDefinition, Warehouse};

use crate::cli::FetchDetailsArgs;
use crate::error::CliError;

pub fn run(warehouse: &Warehouse, args: &FetchDetailsArgs) -> Result<(), CliError> {
    let mut definition = OmdbFetchDefinition::default()
        .allowed_failures(args.allowed_failures)
        .dry_run(args.dry_run)
        .limit(args.limit);
    definition.address = args.omdb_address.clone();

    let client = OmdbClient::new(
        definition.address.clone(),
        definition.api_key.clone().unwrap_or_default(),
    )
    .map_err(CoreError::from)?;
    let report = fetch_movie_details(&definition, &client, warehouse)?;

    for message in &report.messages {
        println!("{message}");
    }
    println!(
        "attempted {} titles: {} fetched, {} not found, {} failures{}",
        report.attempted.len(),
        report.fetched,
        report.not_found,
        report.failures,
        match report.halted {
            Some(reason) => format!(" (halted early: {reason:?})"),
            None => String::new(),
        }
    );
    Ok(())
}
