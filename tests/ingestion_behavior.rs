//! Behavior tests for CSV ingestion into staging.
//!
//! These verify the user-visible merge semantics: ingestion is idempotent,
//! restatements update in place, and the audit trail only moves when a row
//! actually changed.

use boxrev_core::{fetch_movie_details, MetadataSource, OmdbFetchDefinition, Title, TransportError};
use boxrev_tests::{
    backdate_modified, bootstrapped_warehouse, omdb_movie_payload, schema, write_csv,
    CsvIngestDefinition, MovieDetailsEntry, BACKDATED,
};
use tempfile::tempdir;

#[test]
fn when_user_ingests_the_daily_revenue_csv_rows_land_in_staging() {
    let warehouse = bootstrapped_warehouse();
    let scratch = tempdir().expect("tempdir");
    let csv = write_csv(
        scratch.path(),
        "revenues.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dune,1000000,3100,Warner Bros.\n\
         rl2,2021-10-22,No Time to Die,700000,2800,United Artists\n",
    );

    let ingested = warehouse
        .merge_revenue_csv(&CsvIngestDefinition::new(csv))
        .expect("merge should succeed");

    assert_eq!(ingested, 2);
    assert_eq!(warehouse.count_rows("stg_revenues_per_day").unwrap(), 2);
    let revenue: i64 = warehouse
        .connection()
        .query_row(
            "SELECT revenue FROM stg_revenues_per_day WHERE id = 'rl1' AND date = '2021-10-22'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(revenue, 1_000_000);
}

#[test]
fn re_ingesting_the_same_file_leaves_rows_untouched() {
    let warehouse = bootstrapped_warehouse();
    let scratch = tempdir().expect("tempdir");
    let csv = write_csv(
        scratch.path(),
        "revenues.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dune,1000000,3100,Warner Bros.\n",
    );
    let definition = CsvIngestDefinition::new(csv);
    warehouse.merge_revenue_csv(&definition).expect("first merge");
    backdate_modified(&warehouse, &schema::STG_REVENUES_PER_DAY);

    warehouse.merge_revenue_csv(&definition).expect("second merge");

    // No change in content: the comparison guard skipped the update and the
    // audit trigger never fired.
    assert_eq!(warehouse.count_rows("stg_revenues_per_day").unwrap(), 1);
    let modified: String = warehouse
        .connection()
        .query_row(
            "SELECT modified_date FROM stg_revenues_per_day",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(modified, BACKDATED);
}

#[test]
fn re_ingesting_through_the_generic_merge_leaves_rows_untouched() {
    let warehouse = bootstrapped_warehouse();
    let scratch = tempdir().expect("tempdir");
    let csv = write_csv(
        scratch.path(),
        "revenues.csv",
        "id,date,title,revenue\n\
         rl1,2021-10-22,Dune,1000000\n",
    );
    let definition = CsvIngestDefinition::new(csv);
    warehouse
        .merge_csv(&definition, &schema::STG_REVENUES_PER_DAY)
        .expect("first merge");
    backdate_modified(&warehouse, &schema::STG_REVENUES_PER_DAY);

    warehouse
        .merge_csv(&definition, &schema::STG_REVENUES_PER_DAY)
        .expect("second merge");

    // Identical data: the row-by-row upsert's guard skipped the update and
    // the audit trigger never fired.
    assert_eq!(warehouse.count_rows("stg_revenues_per_day").unwrap(), 1);
    let modified: String = warehouse
        .connection()
        .query_row(
            "SELECT modified_date FROM stg_revenues_per_day",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(modified, BACKDATED);
}

#[test]
fn a_restated_day_updates_in_place_and_restamps_the_audit_trail() {
    let warehouse = bootstrapped_warehouse();
    let scratch = tempdir().expect("tempdir");
    let first = write_csv(
        scratch.path(),
        "first.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dune,1000000,3100,Warner Bros.\n",
    );
    warehouse
        .merge_revenue_csv(&CsvIngestDefinition::new(first))
        .expect("first merge");
    backdate_modified(&warehouse, &schema::STG_REVENUES_PER_DAY);

    let restated = write_csv(
        scratch.path(),
        "restated.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dune,1250000,3100,Warner Bros.\n",
    );
    warehouse
        .merge_revenue_csv(&CsvIngestDefinition::new(restated))
        .expect("restated merge");

    assert_eq!(warehouse.count_rows("stg_revenues_per_day").unwrap(), 1);
    let (revenue, modified): (i64, String) = warehouse
        .connection()
        .query_row(
            "SELECT revenue, modified_date FROM stg_revenues_per_day",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(revenue, 1_250_000);
    assert_ne!(modified, BACKDATED);
}

#[test]
fn a_corrected_title_replaces_the_old_one_for_the_same_day() {
    let warehouse = bootstrapped_warehouse();
    let scratch = tempdir().expect("tempdir");
    let first = write_csv(
        scratch.path(),
        "first.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dunne,1000000,3100,Warner Bros.\n",
    );
    warehouse
        .merge_revenue_csv(&CsvIngestDefinition::new(first))
        .expect("first merge");

    let corrected = write_csv(
        scratch.path(),
        "corrected.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dune,1000000,3100,Warner Bros.\n",
    );
    warehouse
        .merge_revenue_csv(&CsvIngestDefinition::new(corrected))
        .expect("corrected merge");

    assert_eq!(warehouse.count_rows("stg_revenues_per_day").unwrap(), 1);
    let title: String = warehouse
        .connection()
        .query_row("SELECT title FROM stg_revenues_per_day", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(title, "Dune");
}

#[test]
fn duplicate_keys_within_one_file_collapse_to_the_last_row() {
    let warehouse = bootstrapped_warehouse();
    let scratch = tempdir().expect("tempdir");
    let csv = write_csv(
        scratch.path(),
        "revenues.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dune,1000000,3100,Warner Bros.\n\
         rl2,2021-10-22,No Time to Die,700000,2800,United Artists\n\
         rl1,2021-10-22,Dune,1000000,3150,Warner Bros.\n",
    );

    warehouse
        .merge_revenue_csv(&CsvIngestDefinition::new(csv))
        .expect("merge should succeed");

    assert_eq!(warehouse.count_rows("stg_revenues_per_day").unwrap(), 2);
    let theaters: i64 = warehouse
        .connection()
        .query_row(
            "SELECT theaters FROM stg_revenues_per_day WHERE id = 'rl1'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(theaters, 3150);
}

/// Metadata source that serves canned OMDb payloads by title.
struct CannedOmdb;

impl MetadataSource for CannedOmdb {
    fn lookup(&self, title: &Title) -> Result<serde_json::Value, TransportError> {
        let payload = match title.as_str() {
            "Dune" => omdb_movie_payload("Dune", "tt1160419"),
            "No Time to Die" => omdb_movie_payload("No Time to Die", "tt2382320"),
            _ => r#"{"Response":"False","Error":"Movie not found!"}"#.to_string(),
        };
        serde_json::from_str(&payload).map_err(|error| TransportError(error.to_string()))
    }
}

#[test]
fn fetch_pass_stages_payloads_for_every_missing_title() {
    let warehouse = bootstrapped_warehouse();
    let scratch = tempdir().expect("tempdir");
    let csv = write_csv(
        scratch.path(),
        "revenues.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dune,1000000,3100,Warner Bros.\n\
         rl2,2021-10-22,No Time to Die,700000,2800,United Artists\n\
         rl3,2021-10-22,Some Obscure Short,1000,12,\n",
    );
    warehouse
        .merge_revenue_csv(&CsvIngestDefinition::new(csv))
        .expect("merge should succeed");

    let definition = OmdbFetchDefinition::default().with_api_key("test-key");
    let report = fetch_movie_details(&definition, &CannedOmdb, &warehouse).expect("fetch pass");

    assert_eq!(report.attempted.len(), 3);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.not_found, 1);
    assert_eq!(report.failures, 0);
    assert_eq!(warehouse.count_rows("stg_movies_details").unwrap(), 2);

    // Fetched titles are no longer candidates; the unknown one still is.
    let pending = warehouse.candidate_titles(false).expect("candidates");
    assert_eq!(pending, vec!["Some Obscure Short".to_string()]);
}

#[test]
fn only_titles_without_details_are_fetch_candidates() {
    let warehouse = bootstrapped_warehouse();
    let scratch = tempdir().expect("tempdir");
    let csv = write_csv(
        scratch.path(),
        "revenues.csv",
        "id,date,title,revenue,theaters,distributor\n\
         rl1,2021-10-22,Dune,1000000,3100,Warner Bros.\n\
         rl2,2021-10-22,No Time to Die,700000,2800,United Artists\n",
    );
    warehouse
        .merge_revenue_csv(&CsvIngestDefinition::new(csv))
        .expect("merge should succeed");
    warehouse
        .upsert_movie_details(&[MovieDetailsEntry {
            title: "Dune".to_string(),
            response: "{\"Response\":\"True\"}".to_string(),
        }])
        .expect("details upsert");

    let pending = warehouse.candidate_titles(false).expect("candidates");
    assert_eq!(pending, vec!["No Time to Die".to_string()]);

    // Dry-run mode surveys every distinct title regardless.
    let all = warehouse.candidate_titles(true).expect("dry-run candidates");
    assert_eq!(
        all,
        vec!["Dune".to_string(), "No Time to Die".to_string()]
    );
}
