//! Data-access core for pet records.
//! Validation and routing rules for the `pets` table live here and nowhere else.

pub mod config;
pub mod contract;
pub mod db;
pub mod logging;
pub mod model;
pub mod provider;
pub mod router;

pub use config::{ConfigError, PetsConfig};
pub use db::{CursorRow, DbError, DbResult, PetCursor, SqliteStorage, StorageEngine, StorageTarget};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::pet::{
    validate_for_insert, validate_for_update, validate_gender, validate_name, validate_weight,
    Gender, InvalidField, PetColumn, PetField, PetId, PetRecord,
};
pub use model::values::{FieldValue, PetValues, Selection, SortDirection, SortOrder};
pub use provider::{PetError, PetProvider, PetResult};
pub use router::{ContentType, Dispatch, Locator, Operation, Route, RouteCode, RouteTable, Router};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
