// 🗂️ Entry Store - append-only collection of guesses
//
// The scoring and web layers only see the `EntryStore` trait; the backing
// medium is picked at startup (CSV file, SQLite, or memory for tests).

use crate::entry::GuessRecord;
use crate::error::{Result, TombolaError};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub trait EntryStore: Send + Sync {
    /// Add one entry after all existing ones
    fn append(&self, record: &GuessRecord) -> Result<()>;

    /// All entries in insertion order; empty when nothing was stored yet
    fn read_all(&self) -> Result<Vec<GuessRecord>>;

    /// Remove every entry. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<()>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

/// Lock a mutex even if a previous holder panicked; the guarded data is
/// either `()` or a plain Vec, so it cannot be left half-updated.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// CSV FILE STORE
// ============================================================================

/// Flat comma separated file with a `Name,DateOfBirth,Length,Weight,Gender`
/// header. One in-process lock serializes every operation, so concurrent
/// requests cannot interleave appends or race a clear.
pub struct CsvEntryStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl CsvEntryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_header(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(TombolaError::store(self.context("inspecting"), e)),
        }
    }

    fn context(&self, action: &str) -> String {
        format!("{} {}", action, self.path.display())
    }
}

impl EntryStore for CsvEntryStore {
    fn append(&self, record: &GuessRecord) -> Result<()> {
        let _guard = lock(&self.guard);

        let write_header = self.needs_header()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TombolaError::store(self.context("opening"), e))?;

        // The header comes from the serde field names of GuessRecord
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer
            .serialize(record)
            .map_err(|e| TombolaError::store(self.context("writing"), e))?;
        writer
            .flush()
            .map_err(|e| TombolaError::store(self.context("flushing"), e))?;

        debug!(name = %record.name, path = %self.path.display(), "appended entry");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<GuessRecord>> {
        let _guard = lock(&self.guard);

        let mut reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e) => {
                if let csv::ErrorKind::Io(io) = e.kind() {
                    if io.kind() == ErrorKind::NotFound {
                        return Ok(Vec::new());
                    }
                }
                return Err(TombolaError::store(self.context("opening"), e));
            }
        };

        // Rows are read by position and decoded lossily, so a short or
        // mangled row still loads and only fails later when it is parsed
        let mut records = Vec::new();
        for result in reader.byte_records() {
            let row = result.map_err(|e| TombolaError::store(self.context("reading"), e))?;
            records.push(record_from_row(&row));
        }

        Ok(records)
    }

    fn clear(&self) -> Result<()> {
        let _guard = lock(&self.guard);

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "entry file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TombolaError::store(self.context("removing"), e)),
        }
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

/// Columns follow the fixed `Name,DateOfBirth,Length,Weight,Gender` order;
/// missing columns read as empty text
fn record_from_row(row: &csv::ByteRecord) -> GuessRecord {
    let field = |i: usize| {
        row.get(i)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    };

    GuessRecord {
        name: field(0),
        date_of_birth: field(1),
        length: field(2),
        weight: field(3),
        gender: field(4),
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Volatile store for tests and throwaway runs
#[derive(Default)]
pub struct MemoryEntryStore {
    records: Mutex<Vec<GuessRecord>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<GuessRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl EntryStore for MemoryEntryStore {
    fn append(&self, record: &GuessRecord) -> Result<()> {
        lock(&self.records).push(record.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<GuessRecord>> {
        Ok(lock(&self.records).clone())
    }

    fn clear(&self) -> Result<()> {
        lock(&self.records).clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::HEADER;

    fn temp_csv() -> PathBuf {
        std::env::temp_dir().join(format!("tombola-{}.csv", uuid::Uuid::new_v4()))
    }

    fn alice() -> GuessRecord {
        GuessRecord::new("Alice", "2024-01-01", "50.0", "3000", "F")
    }

    fn bob() -> GuessRecord {
        GuessRecord::new("Bob", "2024-01-02", "51", "3050", "M")
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let store = CsvEntryStore::new(temp_csv());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_writes_header_once() {
        let path = temp_csv();
        let store = CsvEntryStore::new(&path);

        store.append(&alice()).unwrap();
        store.append(&bob()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Alice,2024-01-01,50.0,3000,F");

        store.clear().unwrap();
    }

    #[test]
    fn test_append_then_read_preserves_order_and_text() {
        let store = CsvEntryStore::new(temp_csv());
        let tricky = GuessRecord::new("O'Brien, \"Junior\"", "2024-01-03", "49.5", "2990.25", "M");

        store.append(&alice()).unwrap();
        store.append(&tricky).unwrap();
        store.append(&bob()).unwrap();

        assert_eq!(store.read_all().unwrap(), vec![alice(), tricky, bob()]);

        store.clear().unwrap();
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let store = CsvEntryStore::new(temp_csv());

        store.append(&alice()).unwrap();
        store.append(&alice()).unwrap();

        assert_eq!(store.read_all().unwrap().len(), 2);

        store.clear().unwrap();
    }

    #[test]
    fn test_clear_is_idempotent() {
        let path = temp_csv();
        let store = CsvEntryStore::new(&path);

        store.clear().unwrap();
        store.append(&alice()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();

        assert!(!path.exists());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_header_rewritten_after_clear() {
        let path = temp_csv();
        let store = CsvEntryStore::new(&path);

        store.append(&alice()).unwrap();
        store.clear().unwrap();
        store.append(&bob()).unwrap();

        assert_eq!(store.read_all().unwrap(), vec![bob()]);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Name,DateOfBirth,Length,Weight,Gender"));

        store.clear().unwrap();
    }

    #[test]
    fn test_short_rows_read_as_empty_fields() {
        let path = temp_csv();
        fs::write(&path, "Name,DateOfBirth,Length,Weight,Gender\nEve,2024-01-01\n").unwrap();
        let store = CsvEntryStore::new(&path);

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Eve");
        assert_eq!(records[0].length, "");
        assert!(records[0].parse().is_err());

        store.clear().unwrap();
    }

    #[test]
    fn test_short_row_does_not_hide_other_rows() {
        let path = temp_csv();
        fs::write(
            &path,
            "Name,DateOfBirth,Length,Weight,Gender\nEve\nAlice,2024-01-01,50.0,3000,F\n",
        )
        .unwrap();
        let store = CsvEntryStore::new(&path);

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date_of_birth, "");
        assert_eq!(records[1], alice());

        store.clear().unwrap();
    }

    #[test]
    fn test_invalid_utf8_row_is_kept_lossily() {
        let path = temp_csv();
        let mut bytes = b"Name,DateOfBirth,Length,Weight,Gender\nAlice,2024-01-01,50.0,3000,F\n".to_vec();
        bytes.extend_from_slice(b"B\xffob,2024-01-02,51,3050,F\n");
        fs::write(&path, bytes).unwrap();
        let store = CsvEntryStore::new(&path);

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], alice());
        assert_eq!(records[1].name, "B\u{FFFD}ob");
        assert_eq!(records[1].weight, "3050");

        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryEntryStore::new();
        store.append(&alice()).unwrap();
        store.append(&bob()).unwrap();

        assert_eq!(store.read_all().unwrap(), vec![alice(), bob()]);

        store.clear().unwrap();
        assert!(store.read_all().unwrap().is_empty());
        store.clear().unwrap();
    }
}
