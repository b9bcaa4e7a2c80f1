use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::generator::DEFAULT_GENERATION_DELAY;

pub const STORE_PATH_ENV: &str = "SMART_MEAL_STORE_PATH";
pub const CATALOG_DIR_ENV: &str = "SMART_MEAL_CATALOG_DIR";
pub const GENERATION_DELAY_ENV: &str = "SMART_MEAL_GENERATION_DELAY_MS";
pub const LOG_ENV: &str = "SMART_MEAL_LOG";

pub const DEFAULT_STORE_PATH: &str = "smart_meal_store.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where the store file lives, which catalog to load, and how long generation pauses.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Nothing survives the process.
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store: StoreLocation,
    /// None means the catalog embedded in the binary.
    pub catalog_dir: Option<PathBuf>,
    pub generation_delay: Duration,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreLocation::File(PathBuf::from(DEFAULT_STORE_PATH)),
            catalog_dir: None,
            generation_delay: DEFAULT_GENERATION_DELAY,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl AppConfig {
    /// Reads the environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store: non_empty_var(STORE_PATH_ENV)
                .map(|path| StoreLocation::File(PathBuf::from(path)))
                .unwrap_or(defaults.store),
            catalog_dir: non_empty_var(CATALOG_DIR_ENV).map(PathBuf::from),
            generation_delay: non_empty_var(GENERATION_DELAY_ENV)
                .and_then(|ms| ms.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.generation_delay),
            log_level: non_empty_var(LOG_ENV)
                .or_else(|| non_empty_var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    }

    /// Settings for tests and throwaway runs: in-memory store, no generation delay.
    pub fn ephemeral() -> Self {
        Self {
            store: StoreLocation::Memory,
            generation_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.store, StoreLocation::File(PathBuf::from("smart_meal_store.json")));
        assert_eq!(config.generation_delay, Duration::from_millis(800));
        assert!(config.catalog_dir.is_none());
    }

    // Only this test touches the process environment.
    #[test]
    fn test_from_env_overrides_and_bad_values() {
        env::set_var(STORE_PATH_ENV, "/tmp/meals.json");
        env::set_var(GENERATION_DELAY_ENV, "not a number");
        env::set_var(CATALOG_DIR_ENV, "  ");
        let config = AppConfig::from_env();
        env::remove_var(STORE_PATH_ENV);
        env::remove_var(GENERATION_DELAY_ENV);
        env::remove_var(CATALOG_DIR_ENV);

        assert_eq!(config.store, StoreLocation::File(PathBuf::from("/tmp/meals.json")));
        assert_eq!(config.generation_delay, DEFAULT_GENERATION_DELAY);
        assert!(config.catalog_dir.is_none());
    }
}
