//! Declarative schema registry for the staging and warehouse tables.
//!
//! Tables are described as plain const data instead of ORM classes: each
//! [`TableDef`] carries its columns, key constraints, and enough metadata to
//! derive the `modified_date` trigger for the table. The bootstrapper and the
//! ingestion engine interpret these definitions; the registry itself has no
//! side effects.

/// A single column of a staging or warehouse table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub not_null: bool,
    pub unique: bool,
    /// Foreign key target as `(table, column)`.
    pub references: Option<(&'static str, &'static str)>,
}

impl ColumnDef {
    const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            not_null: false,
            unique: false,
            references: None,
        }
    }

    const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }
}

/// A named multi-column uniqueness constraint.
#[derive(Debug, Clone, Copy)]
pub struct NamedUnique {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Declarative definition of one table.
///
/// `audited` tables carry `created_date`/`modified_date` columns stamped by
/// the store on insert and kept current on update by a per-table trigger.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub primary_key: &'static [&'static str],
    pub unique_sets: &'static [NamedUnique],
    pub audited: bool,
}

pub const CREATED_DATE: &str = "created_date";
pub const MODIFIED_DATE: &str = "modified_date";

impl TableDef {
    /// Whether `name` is a declared column (audit columns included).
    pub fn has_column(&self, name: &str) -> bool {
        if self.audited && (name == CREATED_DATE || name == MODIFIED_DATE) {
            return true;
        }
        self.columns.iter().any(|column| column.name == name)
    }

    /// Declared column names, audit columns excluded.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }

    /// Render idempotent `CREATE TABLE IF NOT EXISTS` DDL for this table.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        for column in self.columns {
            let mut line = format!("    {} {}", column.name, column.sql_type);
            if column.not_null {
                line.push_str(" NOT NULL");
            }
            if column.unique {
                line.push_str(" UNIQUE");
            }
            if let Some((table, target)) = column.references {
                line.push_str(&format!(" REFERENCES {table}({target})"));
            }
            parts.push(line);
        }

        if self.audited {
            parts.push(format!(
                "    {CREATED_DATE} TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP"
            ));
            parts.push(format!(
                "    {MODIFIED_DATE} TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP"
            ));
        }

        if !self.primary_key.is_empty() {
            parts.push(format!("    PRIMARY KEY ({})", self.primary_key.join(", ")));
        }

        for unique in self.unique_sets {
            parts.push(format!(
                "    CONSTRAINT {} UNIQUE ({})",
                unique.name,
                unique.columns.join(", ")
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            parts.join(",\n")
        )
    }

    /// Name of the `modified_date` trigger, derived from the table name.
    pub fn trigger_name(&self) -> String {
        format!("trigger_update_modified_date_{}", self.name)
    }

    /// Trigger that re-stamps `modified_date` after any row update.
    ///
    /// One template serves single- and composite-key tables: the updated row
    /// is matched on every primary-key column.
    pub fn trigger_sql(&self) -> String {
        let key_match = self
            .primary_key
            .iter()
            .map(|key| format!("{key} = OLD.{key}"))
            .collect::<Vec<_>>()
            .join("\n      AND ");

        format!(
            "CREATE TRIGGER {trigger}\n\
             AFTER UPDATE ON {table}\n\
             FOR EACH ROW\n\
             BEGIN\n\
             \x20   UPDATE {table}\n\
             \x20   SET {MODIFIED_DATE} = CURRENT_TIMESTAMP\n\
             \x20   WHERE {key_match};\n\
             END;",
            trigger = self.trigger_name(),
            table = self.name,
        )
    }
}

// ─── Staging tables (business keys, no foreign keys) ────────────────────────

/// Daily box-office revenue as shipped in the source CSV. Dates stay opaque
/// text. At most one row per (id, date); title is a mutable attribute of
/// that key, so (id, date) is the one declared uniqueness constraint and the
/// upsert conflict target.
pub const STG_REVENUES_PER_DAY: TableDef = TableDef {
    name: "stg_revenues_per_day",
    columns: &[
        ColumnDef::new("id", "TEXT"),
        ColumnDef::new("date", "TEXT").not_null(),
        ColumnDef::new("title", "TEXT").not_null(),
        ColumnDef::new("revenue", "INTEGER"),
        ColumnDef::new("theaters", "INTEGER"),
        ColumnDef::new("distributor", "TEXT"),
    ],
    primary_key: &["id", "date"],
    unique_sets: &[],
    audited: true,
};

/// Raw OMDb payloads keyed by the queried title. The blob is replaced
/// wholesale on update, never merged field by field.
pub const STG_MOVIES_DETAILS: TableDef = TableDef {
    name: "stg_movies_details",
    columns: &[
        ColumnDef::new("title", "TEXT").not_null(),
        ColumnDef::new("response", "TEXT").not_null(),
    ],
    primary_key: &["title"],
    unique_sets: &[],
    audited: true,
};

// ─── Warehouse tables (surrogate keys, referential integrity) ───────────────

pub const DWH_DATES: TableDef = TableDef {
    name: "dwh_dim__dates",
    columns: &[
        ColumnDef::new("id", "INTEGER"),
        ColumnDef::new("value", "TEXT").not_null().unique(),
    ],
    primary_key: &["id"],
    unique_sets: &[],
    audited: true,
};

pub const DWH_DISTRIBUTORS: TableDef = TableDef {
    name: "dwh_dim__distributors",
    columns: &[
        ColumnDef::new("id", "INTEGER"),
        ColumnDef::new("name", "TEXT").not_null().unique(),
    ],
    primary_key: &["id"],
    unique_sets: &[],
    audited: true,
};

pub const DWH_MOVIES_REVIEWERS: TableDef = TableDef {
    name: "dwh_dim__movies_reviewers",
    columns: &[
        ColumnDef::new("id", "INTEGER"),
        ColumnDef::new("name", "TEXT").not_null().unique(),
    ],
    primary_key: &["id"],
    unique_sets: &[],
    audited: true,
};

/// Movie dimension. List-valued attributes (genre, cast, …) are stored as
/// order-preserving JSON arrays in TEXT columns.
pub const DWH_MOVIES: TableDef = TableDef {
    name: "dwh_dim__movies",
    columns: &[
        ColumnDef::new("id", "INTEGER"),
        ColumnDef::new("title", "TEXT").not_null(),
        ColumnDef::new("start_year_date_id", "INTEGER").references("dwh_dim__dates", "id"),
        ColumnDef::new("end_year_date_id", "INTEGER").references("dwh_dim__dates", "id"),
        ColumnDef::new("rated", "TEXT"),
        ColumnDef::new("release_date_id", "INTEGER").references("dwh_dim__dates", "id"),
        ColumnDef::new("length_min", "INTEGER"),
        ColumnDef::new("genre", "TEXT"),
        ColumnDef::new("directors", "TEXT"),
        ColumnDef::new("writers", "TEXT"),
        ColumnDef::new("actors", "TEXT"),
        ColumnDef::new("plot", "TEXT"),
        ColumnDef::new("languages", "TEXT"),
        ColumnDef::new("countries", "TEXT"),
        ColumnDef::new("awards", "TEXT"),
        ColumnDef::new("poster_url", "TEXT"),
        ColumnDef::new("imdb_votes_number", "INTEGER"),
        ColumnDef::new("imdb_id", "TEXT").not_null().unique(),
        ColumnDef::new("type", "TEXT").not_null(),
        ColumnDef::new("dvd_release_date_id", "INTEGER").references("dwh_dim__dates", "id"),
        ColumnDef::new("boxoffice", "INTEGER"),
        ColumnDef::new("production", "TEXT"),
    ],
    primary_key: &["id"],
    unique_sets: &[],
    audited: true,
};

pub const DWH_FACT_REVENUES: TableDef = TableDef {
    name: "dwh_fact__revenues",
    columns: &[
        ColumnDef::new("id", "INTEGER"),
        ColumnDef::new("movie_id", "INTEGER")
            .not_null()
            .references("dwh_dim__movies", "id"),
        ColumnDef::new("distributor_id", "INTEGER").references("dwh_dim__distributors", "id"),
        ColumnDef::new("date_id", "INTEGER")
            .not_null()
            .references("dwh_dim__dates", "id"),
        ColumnDef::new("revenue", "INTEGER").not_null(),
        ColumnDef::new("theaters_number", "INTEGER"),
    ],
    primary_key: &["id"],
    unique_sets: &[NamedUnique {
        name: "uix_movie_id_date_id",
        columns: &["movie_id", "date_id"],
    }],
    audited: true,
};

pub const DWH_REVIEWS_RESULTS: TableDef = TableDef {
    name: "dwh_dim__reviews_results",
    columns: &[
        ColumnDef::new("id", "INTEGER"),
        ColumnDef::new("movie_id", "INTEGER")
            .not_null()
            .references("dwh_dim__movies", "id"),
        ColumnDef::new("reviewer_id", "INTEGER")
            .not_null()
            .references("dwh_dim__movies_reviewers", "id"),
        ColumnDef::new("score_percent", "INTEGER").not_null(),
    ],
    primary_key: &["id"],
    unique_sets: &[NamedUnique {
        name: "uix_movie_id_reviewer_id",
        columns: &["movie_id", "reviewer_id"],
    }],
    audited: true,
};

/// Staging tables in bootstrap order.
pub const STAGING_TABLES: &[TableDef] = &[STG_REVENUES_PER_DAY, STG_MOVIES_DETAILS];

/// Warehouse tables in bootstrap order: tables with foreign keys come after
/// the tables they reference.
pub const WAREHOUSE_TABLES: &[TableDef] = &[
    DWH_DATES,
    DWH_DISTRIBUTORS,
    DWH_MOVIES_REVIEWERS,
    DWH_MOVIES,
    DWH_FACT_REVENUES,
    DWH_REVIEWS_RESULTS,
];

/// Look up a registered table by name.
pub fn table(name: &str) -> Option<&'static TableDef> {
    STAGING_TABLES
        .iter()
        .chain(WAREHOUSE_TABLES.iter())
        .find(|def| def.name == name)
}
