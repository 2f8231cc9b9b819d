//! Runtime configuration for opening a pet provider.
//!
//! # Invariants
//! - `db_path` defaults to `pets.db` in the working directory.
//! - `db_path = ":memory:"` selects a private in-memory database.
//! - `authority` is non-empty and contains no `/`.

use crate::contract::CONTENT_AUTHORITY;
use crate::db::SqliteStorage;
#[cfg(test)]
use crate::db::StorageTarget;
use crate::logging::{default_log_level, normalize_level};
use crate::provider::{PetProvider, PetResult};
use crate::router::Router;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PETS_DB_PATH";
pub const ENV_AUTHORITY: &str = "PETS_AUTHORITY";
pub const ENV_LOG_LEVEL: &str = "PETS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PETS_LOG_DIR";

pub const DEFAULT_DB_FILE_NAME: &str = "pets.db";
/// Database path selecting a private in-memory database.
pub const MEMORY_DB_PATH: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetsConfig {
    pub db_path: PathBuf,
    pub authority: String,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for PetsConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            authority: CONTENT_AUTHORITY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidAuthority(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAuthority(value) => {
                write!(f, "authority must be non-empty and contain no `/`, got `{value}`")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

impl PetsConfig {
    /// Defaults overridden by `PETS_*` environment variables that are set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            authority: read(ENV_AUTHORITY).unwrap_or(defaults.authority),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let authority = self.authority.trim();
        if authority.is_empty() || authority.contains('/') {
            return Err(ConfigError::InvalidAuthority(self.authority.clone()));
        }
        normalize_level(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        Ok(())
    }

    /// Storage handle for the configured target. The connection opens on first use.
    pub fn storage(&self) -> SqliteStorage {
        if self.is_in_memory() {
            SqliteStorage::in_memory()
        } else {
            SqliteStorage::file(&self.db_path)
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == MEMORY_DB_PATH
    }

    pub fn open_provider(&self) -> PetResult<PetProvider<SqliteStorage>> {
        let router = Router::for_authority(&self.authority)?;
        Ok(PetProvider::new(self.storage(), router))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_use_file_database_and_standard_authority() {
        let config = PetsConfig::default();
        assert_eq!(config.db_path, PathBuf::from("pets.db"));
        assert!(!config.is_in_memory());
        assert_eq!(config.storage().target(), &StorageTarget::File(PathBuf::from("pets.db")));
        assert_eq!(config.authority, "com.example.android.pets");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn lookup_overrides_defaults_and_skips_blank_values() {
        let env = HashMap::from([
            (ENV_DB_PATH, "/tmp/pets.db"),
            (ENV_AUTHORITY, "org.example.shelter"),
            (ENV_LOG_LEVEL, "  "),
        ]);
        let config = PetsConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/pets.db"));
        assert_eq!(config.authority, "org.example.shelter");
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn validate_rejects_bad_authority_and_level() {
        let config = PetsConfig {
            authority: "a/b".to_string(),
            ..PetsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAuthority(_))
        ));

        let config = PetsConfig {
            log_level: "loud".to_string(),
            ..PetsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let config: PetsConfig =
            serde_json::from_str(r#"{"authority":"org.example.shelter"}"#).unwrap();
        assert_eq!(config.authority, "org.example.shelter");
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
    }

    #[test]
    fn memory_path_selects_in_memory_storage() {
        let config = PetsConfig {
            db_path: PathBuf::from(MEMORY_DB_PATH),
            ..PetsConfig::default()
        };
        assert!(config.is_in_memory());
        assert_eq!(config.storage().target(), &StorageTarget::Memory);
    }

    #[test]
    fn open_provider_routes_with_configured_authority() {
        let config = PetsConfig {
            db_path: PathBuf::from(MEMORY_DB_PATH),
            authority: "org.example.shelter".to_string(),
            ..PetsConfig::default()
        };
        let provider = config.open_provider().unwrap();
        assert_eq!(provider.router().authority(), "org.example.shelter");
        assert!(!provider.storage().is_open());
    }
}
