use std::env;
use std::path::{Path, PathBuf};

pub const DATA_DIR_VAR: &str = "POCKET_TRADING_DATA_DIR";
pub const DB_FILE_VAR: &str = "POCKET_TRADING_DB_FILE";
pub const DEFAULT_DB_FILE: &str = "pocket_trading.db";

/// Where the catalog database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_file: String,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_file: DEFAULT_DB_FILE.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or blank variables fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = value(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let db_file = value(DB_FILE_VAR).unwrap_or_else(|| DEFAULT_DB_FILE.to_string());

        Self { data_dir, db_file }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn backup_dir(&self) -> PathBuf {
        backup_dir_for(&self.db_path())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(default_data_dir())
    }
}

fn default_data_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".pocket-trading"))
        .unwrap_or_else(|_| PathBuf::from(".pocket-trading"))
}

/// Backups sit in a `backups` folder next to the database file.
pub fn backup_dir_for(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("backups")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (DATA_DIR_VAR, "/var/lib/pocket"),
            (DB_FILE_VAR, "catalog.db"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.db_path(), PathBuf::from("/var/lib/pocket/catalog.db"));
        assert_eq!(config.backup_dir(), PathBuf::from("/var/lib/pocket/backups"));
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = AppConfig::from_lookup(|key| (key == DB_FILE_VAR).then(|| "  ".to_string()));
        assert_eq!(config.db_file, DEFAULT_DB_FILE);
        assert!(config.data_dir.ends_with(".pocket-trading"));
    }
}
