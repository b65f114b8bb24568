use std::env;
use std::path::PathBuf;

pub const DB_PATH_ENV_VAR: &str = "NUTRI_DB_PATH";
pub const LOG_LEVEL_ENV_VAR: &str = "NUTRI_LOG_LEVEL";

const DEFAULT_DB_PATH: &str = "data/nutrition_db.json";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Loads `.env` if present, then reads the environment over the defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_path: lookup(DB_PATH_ENV_VAR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_level: lookup(LOG_LEVEL_ENV_VAR)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
        }
    }
}
