#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Relational persistence adapter.
//!
//! [`DbStore`] implements the geography and record read traits over any
//! `switchy_database` backend. All SQL is raw and parameterized with
//! `query_raw_params()`; dates travel as ISO `YYYY-MM-DD` text and amounts
//! as decimal text, so the same statements run against Postgres and `SQLite`.

pub mod db;
pub mod import;
pub mod queries;
pub mod schema;
pub mod store;

use sanitation_geography::GeoError;
use sanitation_metrics::ProviderError;

pub use db::{connect_from_env, open_sqlite};
pub use schema::ensure_schema;
pub use store::DbStore;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The connection could not be established.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// Filesystem error while preparing a database file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbError> for GeoError {
    fn from(value: DbError) -> Self {
        Self::Source {
            message: value.to_string(),
        }
    }
}

impl From<DbError> for ProviderError {
    fn from(value: DbError) -> Self {
        Self::Source {
            message: value.to_string(),
        }
    }
}
