//! Ingestion engine: CSV merges into the staging tables and the bulk upsert
//! used by the metadata fetch pass.
//!
//! Both CSV operations are idempotent and comparison-guarded: the generic
//! merge upserts row by row keyed on the target table's declared primary
//! key, the revenue merge bulk loads through a temporary table and applies
//! one set-based upsert. In both, unchanged rows never fire the
//! `modified_date` trigger.

use std::path::PathBuf;

use csv::{ReaderBuilder, StringRecord, Trim};
use rusqlite::params_from_iter;
use tracing::info;

use crate::schema::{self, TableDef};
use crate::{Warehouse, WarehouseError};

/// Where and how to read a delimited file: configurable delimiter, first
/// line header by convention.
#[derive(Debug, Clone)]
pub struct CsvIngestDefinition {
    pub path: PathBuf,
    pub delimiter: u8,
    pub has_header: bool,
}

impl CsvIngestDefinition {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            has_header: true,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }
}

/// One fetched OMDb payload, ready for the staging merge.
#[derive(Debug, Clone)]
pub struct MovieDetailsEntry {
    pub title: String,
    /// Raw response JSON, stored wholesale.
    pub response: String,
}

/// Parsed CSV: header names plus rows of trimmed, empty-as-NULL fields.
struct CsvBatch {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Warehouse {
    /// Generic CSV merge into any registered table.
    ///
    /// Header names must each match a declared column; with `has_header`
    /// off, fields map positionally onto the declared columns. Every row is
    /// upserted keyed on the table's primary key; on conflict the non-key
    /// columns are updated only when at least one actually differs
    /// (NULL-safe), so an identical re-ingest never restamps
    /// `modified_date`. The whole batch is one transaction: all rows are
    /// committed or none are.
    pub fn merge_csv(
        &self,
        definition: &CsvIngestDefinition,
        table: &TableDef,
    ) -> Result<usize, WarehouseError> {
        let batch = read_csv(definition, table)?;
        info!(
            table = table.name,
            rows = batch.rows.len(),
            "CSV loaded to memory, starting db merge"
        );

        let key_columns: Vec<&str> = batch
            .columns
            .iter()
            .map(String::as_str)
            .filter(|name| table.primary_key.contains(name))
            .collect();
        let value_columns: Vec<&str> = batch
            .columns
            .iter()
            .map(String::as_str)
            .filter(|name| !table.primary_key.contains(name))
            .collect();

        let placeholders = (1..=batch.columns.len())
            .map(|n| format!("?{n}"))
            .collect::<Vec<_>>()
            .join(", ");
        let conflict = if key_columns.is_empty() || value_columns.is_empty() {
            format!("ON CONFLICT({}) DO NOTHING", table.primary_key.join(", "))
        } else {
            format!(
                "ON CONFLICT({}) DO UPDATE SET {} WHERE {}",
                table.primary_key.join(", "),
                value_columns
                    .iter()
                    .map(|name| format!("{name} = excluded.{name}"))
                    .collect::<Vec<_>>()
                    .join(", "),
                value_columns
                    .iter()
                    .map(|name| format!("{name} IS NOT excluded.{name}"))
                    .collect::<Vec<_>>()
                    .join(" OR ")
            )
        };
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) {conflict}",
            table.name,
            batch.columns.join(", ")
        );

        let tx = self.connection().unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in &batch.rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(batch.rows.len())
    }

    /// Optimized merge for the daily revenue CSV.
    ///
    /// Bulk loads the file into a temporary table, then runs a single
    /// set-based upsert into `stg_revenues_per_day` keyed on (id, date),
    /// casting the numeric columns and updating only when at least one
    /// non-key column actually differs. The temporary table is dropped
    /// afterward regardless of outcome; upsert errors roll back before the
    /// drop step runs, drop errors are fatal.
    pub fn merge_revenue_csv(
        &self,
        definition: &CsvIngestDefinition,
    ) -> Result<usize, WarehouseError> {
        let table = &schema::STG_REVENUES_PER_DAY;
        let batch = read_csv(definition, table)?;
        for required in ["id", "date", "title", "revenue", "theaters", "distributor"] {
            if !batch.columns.iter().any(|name| name == required) {
                return Err(WarehouseError::MissingCsvColumn {
                    path: definition.path.clone(),
                    column: required.to_string(),
                });
            }
        }
        info!(rows = batch.rows.len(), "CSV loaded to memory, starting db merge");

        let tmp = format!("tmp_{}", table.name);
        let create_tmp = format!(
            "DROP TABLE IF EXISTS {tmp};\n\
             CREATE TABLE {tmp} (id TEXT, date TEXT, title TEXT, revenue TEXT, theaters TEXT, distributor TEXT);"
        );
        let insert_tmp = format!(
            "INSERT INTO {tmp} ({}) VALUES ({})",
            batch.columns.join(", "),
            (1..=batch.columns.len())
                .map(|n| format!("?{n}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let upsert = format!(
            "INSERT INTO {table} (id, date, title, revenue, theaters, distributor)\n\
             SELECT id,\n\
             \x20   date,\n\
             \x20   title,\n\
             \x20   CAST(revenue AS INTEGER),\n\
             \x20   CAST(theaters AS INTEGER),\n\
             \x20   distributor\n\
             FROM {tmp}\n\
             WHERE true\n\
             ON CONFLICT(id, date) DO UPDATE SET\n\
             \x20   title = excluded.title,\n\
             \x20   revenue = excluded.revenue,\n\
             \x20   theaters = excluded.theaters,\n\
             \x20   distributor = excluded.distributor\n\
             WHERE title IS NOT excluded.title\n\
             \x20  OR revenue IS NOT excluded.revenue\n\
             \x20  OR theaters IS NOT excluded.theaters\n\
             \x20  OR distributor IS NOT excluded.distributor;",
            table = table.name,
        );

        let count = batch.rows.len();
        self.upsert_via_temp(&tmp, &create_tmp, &insert_tmp, &batch.rows, &upsert)?;
        Ok(count)
    }

    /// Bulk upsert of fetched OMDb payloads into `stg_movies_details`, via
    /// the same temporary-table discipline as the revenue merge. The stored
    /// blob is replaced wholesale, and only when it differs.
    pub fn upsert_movie_details(
        &self,
        entries: &[MovieDetailsEntry],
    ) -> Result<(), WarehouseError> {
        let table = &schema::STG_MOVIES_DETAILS;
        let tmp = format!("tmp_{}", table.name);
        let create_tmp = format!(
            "DROP TABLE IF EXISTS {tmp};\n\
             CREATE TABLE {tmp} (title TEXT, response TEXT);"
        );
        let insert_tmp = format!("INSERT INTO {tmp} (title, response) VALUES (?1, ?2)");
        let upsert = format!(
            "INSERT INTO {table} (title, response)\n\
             SELECT title, response FROM {tmp}\n\
             WHERE true\n\
             ON CONFLICT(title) DO UPDATE SET response = excluded.response\n\
             WHERE response IS NOT excluded.response;",
            table = table.name,
        );

        let rows: Vec<Vec<Option<String>>> = entries
            .iter()
            .map(|entry| vec![Some(entry.title.clone()), Some(entry.response.clone())])
            .collect();
        self.upsert_via_temp(&tmp, &create_tmp, &insert_tmp, &rows, &upsert)
    }

    /// Distinct candidate titles for the metadata fetch: all revenue titles
    /// in dry-run mode, otherwise only titles with no details row yet
    /// (left anti-join).
    pub fn candidate_titles(&self, dry_run: bool) -> Result<Vec<String>, WarehouseError> {
        let sql = if dry_run {
            "SELECT DISTINCT title FROM stg_revenues_per_day ORDER BY title"
        } else {
            "SELECT DISTINCT r.title\n\
             FROM stg_revenues_per_day r\n\
             LEFT JOIN stg_movies_details m ON r.title = m.title\n\
             WHERE m.title IS NULL\n\
             ORDER BY r.title"
        };
        let mut stmt = self.connection().prepare(sql)?;
        let titles = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(titles)
    }

    /// Load rows into a scratch table, apply the set-based upsert, then drop
    /// the scratch table. The upsert runs in its own transaction and rolls
    /// back on error before the drop step; errors from the drop itself
    /// propagate and win over an upsert failure.
    fn upsert_via_temp(
        &self,
        tmp: &str,
        create_tmp: &str,
        insert_tmp: &str,
        rows: &[Vec<Option<String>>],
        upsert: &str,
    ) -> Result<(), WarehouseError> {
        let load = self.connection().unchecked_transaction()?;
        load.execute_batch(create_tmp)?;
        {
            let mut stmt = load.prepare(insert_tmp)?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        load.commit()?;

        let merged = {
            let tx = self.connection().unchecked_transaction()?;
            match tx.execute_batch(upsert) {
                Ok(()) => tx.commit().map_err(WarehouseError::from),
                Err(error) => {
                    tx.rollback()?;
                    Err(error.into())
                }
            }
        };

        self.connection()
            .execute_batch(&format!("DROP TABLE {tmp}"))?;
        merged
    }
}

fn read_csv(
    definition: &CsvIngestDefinition,
    table: &TableDef,
) -> Result<CsvBatch, WarehouseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(definition.delimiter)
        .has_headers(definition.has_header)
        .trim(Trim::All)
        .flexible(true)
        .from_path(&definition.path)?;

    let columns: Vec<String> = if definition.has_header {
        reader.headers()?.iter().map(str::to_string).collect()
    } else {
        table.column_names().iter().map(|s| s.to_string()).collect()
    };
    for column in &columns {
        if !table.column_names().contains(&column.as_str()) {
            return Err(WarehouseError::NoSuchColumn {
                table: table.name.to_string(),
                column: column.clone(),
            });
        }
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record: StringRecord = record?;
        if record.len() != columns.len() {
            return Err(WarehouseError::CsvRowShape {
                row: index + 1,
                found: record.len(),
                expected: columns.len(),
            });
        }
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(CsvBatch { columns, rows })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::CsvIngestDefinition;
    use crate::schema::{STAGING_TABLES, STG_REVENUES_PER_DAY};
    use crate::{Warehouse, WarehouseError};

    fn staging_warehouse() -> Warehouse {
        let warehouse = Warehouse::open_in_memory().unwrap();
        warehouse.ensure_schema(STAGING_TABLES).unwrap();
        warehouse
    }

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn generic_merge_rejects_undeclared_header_before_writing() {
        let warehouse = staging_warehouse();
        let file = csv_file("id,date,title,box_office\nrl1,2021-01-01,Dune,100\n");
        let definition = CsvIngestDefinition::new(file.path());

        let error = warehouse
            .merge_csv(&definition, &STG_REVENUES_PER_DAY)
            .unwrap_err();
        assert!(matches!(error, WarehouseError::NoSuchColumn { .. }));
        assert_eq!(warehouse.count_rows("stg_revenues_per_day").unwrap(), 0);
    }

    #[test]
    fn generic_merge_overwrites_non_key_columns_on_conflict() {
        let warehouse = staging_warehouse();
        let first = csv_file("id,date,title,revenue\nrl1,2021-01-01,Dune,100\n");
        warehouse
            .merge_csv(&CsvIngestDefinition::new(first.path()), &STG_REVENUES_PER_DAY)
            .unwrap();

        let second = csv_file("id,date,title,revenue\nrl1,2021-01-01,Dune,250\n");
        warehouse
            .merge_csv(&CsvIngestDefinition::new(second.path()), &STG_REVENUES_PER_DAY)
            .unwrap();

        assert_eq!(warehouse.count_rows("stg_revenues_per_day").unwrap(), 1);
        let revenue: i64 = warehouse
            .connection()
            .query_row(
                "SELECT revenue FROM stg_revenues_per_day WHERE id = 'rl1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(revenue, 250);
    }

    #[test]
    fn headerless_csv_maps_fields_positionally() {
        let warehouse = staging_warehouse();
        let file = csv_file("rl1,2021-01-01,Dune,100,3100,WB\n");
        let definition = CsvIngestDefinition::new(file.path()).has_header(false);

        let ingested = warehouse
            .merge_csv(&definition, &STG_REVENUES_PER_DAY)
            .unwrap();
        assert_eq!(ingested, 1);
        let distributor: String = warehouse
            .connection()
            .query_row(
                "SELECT distributor FROM stg_revenues_per_day",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(distributor, "WB");
    }

    #[test]
    fn revenue_merge_drops_its_temporary_table() {
        let warehouse = staging_warehouse();
        let file = csv_file(
            "id,date,title,revenue,theaters,distributor\nrl1,2021-01-01,Dune,100,3100,WB\n",
        );
        warehouse
            .merge_revenue_csv(&CsvIngestDefinition::new(file.path()))
            .unwrap();

        let leftover: i64 = warehouse
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'tmp_stg_revenues_per_day'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn revenue_merge_casts_numeric_columns_and_nulls_empty_fields() {
        let warehouse = staging_warehouse();
        let file = csv_file(
            "id,date,title,revenue,theaters,distributor\nrl1,2021-01-01,Dune,1234,,\n",
        );
        warehouse
            .merge_revenue_csv(&CsvIngestDefinition::new(file.path()))
            .unwrap();

        let (revenue, theaters, distributor): (i64, Option<i64>, Option<String>) = warehouse
            .connection()
            .query_row(
                "SELECT revenue, theaters, distributor FROM stg_revenues_per_day",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(revenue, 1234);
        assert_eq!(theaters, None);
        assert_eq!(distributor, None);
    }
}
