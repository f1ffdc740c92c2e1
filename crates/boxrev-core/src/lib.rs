//! Core contracts for boxrev.
//!
//! This crate contains:
//! - Domain value types (titles, the rating and title-kind vocabularies)
//! - Fetch-pass configuration
//! - The OMDb metadata source and its strict response parsing
//! - The budgeted fetch pass that feeds `stg_movies_details`

pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod omdb;

pub use config::{OmdbFetchDefinition, OMDB_ADDRESS, OMDB_API_KEY_VAR};
pub use domain::{AgeRating, Title, TitleKind};
pub use error::CoreError;
pub use fetch::{fetch_movie_details, FetchReport, HaltReason};
pub use omdb::{MetadataSource, OmdbClient, TransportError, NOT_FOUND_ERROR};

pub use boxrev_warehouse::{
    plot_details, selection_keys, write_html, CsvIngestDefinition, MovieDetailsEntry, PlotDetails,
    ScriptKind, TableDef, Warehouse, WarehouseError, STAGING_TABLES, WAREHOUSE_TABLES,
};
