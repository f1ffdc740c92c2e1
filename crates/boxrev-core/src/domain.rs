//! Domain value types. Semantic tags over plain data; no behavior beyond
//! parsing and textual serialization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A movie title as it appears in the revenue feed and OMDb queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Title(pub String);

impl Title {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Title {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Age classification as published by OMDb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeRating {
    R,
    Pg,
    Pg13,
    G,
    Passed,
    Not,
    Rated,
    Approved,
    Unrated,
    TvMa,
    Tv14,
    TvY7,
    TvG,
    TvPg,
    Nc17,
}

impl AgeRating {
    /// Lowercase textual tag used in the warehouse.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::R => "r",
            Self::Pg => "pg",
            Self::Pg13 => "pg-13",
            Self::G => "g",
            Self::Passed => "passed",
            Self::Not => "not",
            Self::Rated => "rated",
            Self::Approved => "approved",
            Self::Unrated => "unrated",
            Self::TvMa => "tv-ma",
            Self::Tv14 => "tv-14",
            Self::TvY7 => "tv-y7",
            Self::TvG => "tv-g",
            Self::TvPg => "tv-pg",
            Self::Nc17 => "nc-17",
        }
    }

    /// Parse the OMDb string form; unknown classifications map to `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "R" => Some(Self::R),
            "PG" => Some(Self::Pg),
            "PG-13" => Some(Self::Pg13),
            "G" => Some(Self::G),
            "PASSED" => Some(Self::Passed),
            "NOT" => Some(Self::Not),
            "RATED" => Some(Self::Rated),
            "APPROVED" => Some(Self::Approved),
            "UNRATED" => Some(Self::Unrated),
            "TV-MA" => Some(Self::TvMa),
            "TV-14" => Some(Self::Tv14),
            "TV-Y7" => Some(Self::TvY7),
            "TV-G" => Some(Self::TvG),
            "TV-PG" => Some(Self::TvPg),
            "NC-17" => Some(Self::Nc17),
            _ => None,
        }
    }
}

/// Whether a warehouse movie row describes a film or a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    Movie,
    Series,
}

impl TitleKind {
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "movie" => Some(Self::Movie),
            "series" => Some(Self::Series),
            _ => None,
        }
    }
}
