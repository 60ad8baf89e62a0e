//! Storage layer for preppy.
//!
//! This module provides `SQLite`-based persistent storage for the catalog,
//! household profiles, kit selections, progress flags, custom items and the
//! household's own records: contacts, medical records, providers, the routine
//! schedule and meet-up points. Operations are grouped by concern in the submodules; each adds
//! methods to [`Storage`].
//!
//! Every write that touches more than one row runs inside a single
//! transaction. Dropping an uncommitted transaction rolls it back, so an
//! error returned half-way through leaves no partial writes behind.
//!
//! Writes begin with `BEGIN IMMEDIATE`, so a transaction holds the write
//! lock before it reads the state it diffs against. A second writer waits
//! for the busy timeout, then recomputes its diff from what the first one
//! committed; the last writer to commit wins. A writer still blocked when
//! the timeout expires fails with a storage error and writes nothing.

pub mod catalog;
pub mod checklist;
pub mod contacts;
pub mod evacuation;
pub mod household;
pub mod medical;
pub mod migrations;
pub mod providers;
pub mod routine;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};

/// Storage engine for preppy data.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Bulk catalog replacement
/// - Household profiles and recommendations
/// - Transactional checklist reconciliation
/// - Custom items, contacts and the other household records
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Open the database named by the configuration and apply its busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_configured(config: &Config) -> Result<Self> {
        let storage = Self::open(config.database_path())?;
        storage.set_busy_timeout(config.busy_timeout())?;
        Ok(storage)
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How long a writer waits on a locked database before failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver rejects the setting.
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Begin a transaction that takes the write lock up front.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is not granted within the busy timeout.
    pub(crate) fn write_transaction(&self) -> Result<Transaction<'_>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        Ok(tx)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let schema_version = migrations::get_schema_version(&self.conn)?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            schema_version,
            households: self.count_rows("households")?,
            selections: self.count_rows("selections")?,
            custom_items: self.count_rows("custom_items")?,
            contacts: self.count_rows("contacts")?,
            medical_records: self.count_rows("medical_records")?,
            providers: self.count_rows("providers")?,
            routine_events: self.count_rows("routine_events")?,
            meetup_points: self.count_rows("meetup_points")?,
            db_size_bytes,
        })
    }

    /// Count the rows of a table named by a schema constant.
    fn count_rows(&self, table: &str) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}

/// Statistics about user data in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Schema version recorded in the database.
    pub schema_version: i32,
    /// Number of household profiles.
    pub households: i64,
    /// Number of selection records across all kits.
    pub selections: i64,
    /// Number of custom items.
    pub custom_items: i64,
    /// Number of contacts.
    pub contacts: i64,
    /// Number of medical records.
    pub medical_records: i64,
    /// Number of medical providers.
    pub providers: i64,
    /// Number of routine schedule events.
    pub routine_events: i64,
    /// Number of evacuation meet-up points.
    pub meetup_points: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::CustomItem;
    use crate::config::LimitsConfig;
    use crate::kit::KitType;

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_path() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_stats_empty() {
        let storage = Storage::open_in_memory().unwrap();
        let stats = storage.stats().unwrap();

        assert_eq!(stats.schema_version, migrations::CURRENT_VERSION);
        assert_eq!(stats.households, 0);
        assert_eq!(stats.selections, 0);
        assert_eq!(stats.custom_items, 0);
        assert_eq!(stats.contacts, 0);
        assert_eq!(stats.medical_records, 0);
        assert_eq!(stats.meetup_points, 0);
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let storage = test_support::seeded_storage();
        storage
            .save_selection(1, KitType::GoBag, &["water-uuid".to_string()])
            .unwrap();
        let item = CustomItem::new(1, KitType::GoBag, "Spare keys", &LimitsConfig::default())
            .unwrap();
        storage.add_custom_item(&item).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.households, 1);
        assert_eq!(stats.selections, 2);
        assert_eq!(stats.custom_items, 1);
    }

    #[test]
    fn test_open_file_based() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("preppy.db");

        {
            let storage = Storage::open(&db_path).unwrap();
            storage
                .save_household(&test_support::household(7, 2, 0, "FL"))
                .unwrap();
            assert_eq!(storage.path(), db_path);
        }

        let reopened = Storage::open(&db_path).unwrap();
        let household = reopened.household(7).unwrap().unwrap();
        assert_eq!(household.adults, 2);
        assert!(reopened.stats().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested").join("deeper").join("preppy.db");

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());
        drop(storage);
    }

    #[test]
    fn test_open_configured_uses_database_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.database_path = Some(dir.path().join("configured.db"));

        let storage = Storage::open_configured(&config).unwrap();
        assert_eq!(storage.path(), dir.path().join("configured.db"));
    }

    #[test]
    fn test_storage_stats_serializes() {
        let storage = Storage::open_in_memory().unwrap();
        let json = serde_json::to_value(storage.stats().unwrap()).unwrap();
        assert_eq!(json["households"], 0);
    }
}
