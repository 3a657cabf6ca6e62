use crate::db::SqliteEntryStore;
use crate::error::{Result, TombolaError};
use crate::store::{CsvEntryStore, EntryStore};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Csv,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = TombolaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(StoreBackend::Csv),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(TombolaError::parse(
                "store backend",
                format!("'{}' is not one of csv, sqlite", other),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub backend: StoreBackend,
    pub entries_path: PathBuf,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            backend: StoreBackend::Csv,
            entries_path: PathBuf::from("tombola_entries.csv"),
            db_path: PathBuf::from("tombola_entries.db"),
            static_dir: PathBuf::from("web/static"),
        }
    }
}

impl Config {
    /// Defaults overridden by `TOMBOLA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            addr: lookup("TOMBOLA_ADDR").unwrap_or(defaults.addr),
            backend: match lookup("TOMBOLA_STORE") {
                Some(value) => value.parse()?,
                None => defaults.backend,
            },
            entries_path: lookup("TOMBOLA_ENTRIES")
                .map(PathBuf::from)
                .unwrap_or(defaults.entries_path),
            db_path: lookup("TOMBOLA_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            static_dir: lookup("TOMBOLA_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        })
    }

    pub fn open_store(&self) -> Result<Arc<dyn EntryStore>> {
        Ok(match self.backend {
            StoreBackend::Csv => Arc::new(CsvEntryStore::new(&self.entries_path)),
            StoreBackend::Sqlite => Arc::new(SqliteEntryStore::open(&self.db_path)?),
        })
    }
}
