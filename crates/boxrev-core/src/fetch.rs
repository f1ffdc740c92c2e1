//! The metadata fetch pass: pull OMDb payloads for staged revenue titles
//! and merge them into `stg_movies_details`.
//!
//! The pass tolerates lookup failures up to a budget and then stops early;
//! budget exhaustion is an early stop, not a hard failure. Everything the
//! loop observes is collected into a [`FetchReport`] so the decision logic
//! stays separate from side-effect ordering.

use serde_json::Value;
use tracing::info;

use boxrev_warehouse::schema::{self, TableDef};
use boxrev_warehouse::{MovieDetailsEntry, Warehouse, WarehouseError};

use crate::config::OmdbFetchDefinition;
use crate::domain::{AgeRating, Title, TitleKind};
use crate::error::CoreError;
use crate::omdb::{self, MetadataSource};

/// Why a fetch pass stopped before exhausting the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The failure count exceeded the allowed budget.
    FailureBudgetExceeded,
    /// The optional cap on fetched entries was reached.
    FetchLimitReached,
}

/// Accumulated outcome of one fetch pass.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Titles a lookup was attempted for, in order.
    pub attempted: Vec<Title>,
    /// Entries fetched and merged into staging.
    pub fetched: usize,
    /// Titles OMDb did not know; exempt from the failure budget.
    pub not_found: usize,
    /// Budget-counted failures (transport errors and negative payloads).
    pub failures: u32,
    pub messages: Vec<String>,
    pub halted: Option<HaltReason>,
}

/// Fetch metadata for every candidate title and merge the results.
///
/// Candidates are the distinct revenue titles missing from
/// `stg_movies_details` (all distinct titles in dry-run mode). A missing
/// API key or a staging table without the expected columns is a
/// configuration error raised before any network call.
pub fn fetch_movie_details(
    definition: &OmdbFetchDefinition,
    source: &dyn MetadataSource,
    warehouse: &Warehouse,
) -> Result<FetchReport, CoreError> {
    match definition.api_key.as_deref() {
        Some(key) if !key.is_empty() => {}
        _ => return Err(CoreError::MissingApiKey),
    }
    require_column(&schema::STG_MOVIES_DETAILS, "title")?;
    require_column(&schema::STG_MOVIES_DETAILS, "response")?;
    require_column(&schema::STG_REVENUES_PER_DAY, "title")?;

    let titles: Vec<Title> = warehouse
        .candidate_titles(definition.dry_run)?
        .into_iter()
        .map(Title)
        .collect();
    info!(candidates = titles.len(), dry_run = definition.dry_run, "starting OMDb fetch pass");

    let mut report = FetchReport::default();
    let mut entries: Vec<MovieDetailsEntry> = Vec::new();

    for title in titles {
        if report.failures > definition.allowed_failures {
            report
                .messages
                .push("faulty API responses exceeded the allowance, finishing calling API".into());
            report.halted = Some(HaltReason::FailureBudgetExceeded);
            break;
        }

        report.attempted.push(title.clone());
        let payload = match source.lookup(&title) {
            Ok(payload) => payload,
            Err(error) => {
                report.failures += 1;
                report.messages.push(format!("faulty API response for {title}: {error}"));
                continue;
            }
        };

        if !omdb::response_flag(&payload) {
            let reason = omdb::error_text(&payload).unwrap_or("error not known");
            if reason != omdb::NOT_FOUND_ERROR {
                report.failures += 1;
            } else {
                report.not_found += 1;
            }
            report.messages.push(format!("faulty API response for {title}: {reason}"));
            continue;
        }

        note_vocabulary_gaps(&payload, &title, &mut report.messages);
        entries.push(MovieDetailsEntry {
            title: title.0,
            response: payload.to_string(),
        });
        if definition.limit.is_some_and(|limit| entries.len() >= limit) {
            report.halted = Some(HaltReason::FetchLimitReached);
            break;
        }
    }

    for message in &report.messages {
        info!("{message}");
    }

    if entries.is_empty() {
        info!("API calls finished, 0 entries fetched");
        return Ok(report);
    }

    info!(entries = entries.len(), "API calls finished, the db merge starts");
    warehouse.upsert_movie_details(&entries)?;
    report.fetched = entries.len();
    Ok(report)
}

/// Successful payloads merge wholesale; a tag outside the known rating or
/// title-kind vocabulary still lands in the warehouse lowercased, so it is
/// worth a note in the report.
fn note_vocabulary_gaps(payload: &Value, title: &Title, messages: &mut Vec<String>) {
    if let Some(kind) = payload.get("Type").and_then(Value::as_str) {
        if TitleKind::parse(kind).is_none() {
            messages.push(format!("unknown title type '{kind}' for {title}"));
        }
    }
    if let Some(rated) = payload.get("Rated").and_then(Value::as_str) {
        if rated != "N/A" && AgeRating::parse(rated).is_none() {
            messages.push(format!("unknown age rating '{rated}' for {title}"));
        }
    }
}

fn require_column(table: &TableDef, column: &str) -> Result<(), CoreError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(CoreError::Warehouse(WarehouseError::NoSuchColumn {
            table: table.name.to_string(),
            column: column.to_string(),
        }))
    }
}
