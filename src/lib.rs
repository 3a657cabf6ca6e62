// Baby Tombola - Core Library
// Exposes all modules for use in the CLI, the web server, and tests

pub mod charts;
pub mod config;
pub mod db;
pub mod entry;
pub mod error;
pub mod scoring;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use charts::{render_charts, Chart};
pub use config::{Config, StoreBackend};
pub use db::SqliteEntryStore;
pub use entry::{
    days_between, ActualForm, ActualOutcome, Guess, GuessForm, GuessRecord, DATE_FORMAT, HEADER,
};
pub use error::{Result, TombolaError};
pub use scoring::{score, score_record, select_winner, Standings};
pub use store::{CsvEntryStore, EntryStore, MemoryEntryStore};
pub use web::{router, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
