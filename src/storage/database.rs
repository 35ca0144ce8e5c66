//! Database
//!
//! The storage engine that coordinates the WAL and the tables.
//!
//! ## Responsibilities
//! - Recover tables from the WAL on open
//! - Switch on foreign-key enforcement at connect time
//! - Serialize writes, allow concurrent reads

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::error::{ReqbinError, Result};
use crate::model::{Bin, BinId, NewBin, NewRequest, Request, RequestId};
use crate::wal::{Record, WalRecovery, WalWriter};

use super::{Storage, Tables};

/// The storage engine behind every service
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader
///
/// - **Writes** (create_bin/insert_request): serialized by the `wal` mutex.
///   A write validates and allocates ids under the tables read lock, appends
///   to the WAL, then takes the write lock only to apply the row.
/// - **Reads**: take the tables read lock; many readers run concurrently.
///
/// Lock order is always `wal` → `tables`.
///
/// ## Ownership of the data directory
///
/// A data directory belongs to one open `Database` at a time. `open` takes an
/// exclusive advisory lock on `<data_dir>/LOCK` and fails with `Storage` while
/// another handle (in this or another process) holds it. The lock is released
/// when the `Database` is dropped.
pub struct Database {
    /// Root directory, `None` for an in-memory database
    data_dir: Option<PathBuf>,

    /// Held for the lifetime of a durable database
    _dir_lock: Option<File>,

    /// Write-ahead log; the mutex doubles as the write lock.
    /// `None` for an in-memory database.
    wal: Mutex<Option<WalWriter>>,

    tables: RwLock<Tables>,
}

impl Database {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const LOCK_FILENAME: &'static str = "LOCK";

    /// Open or create a database with the given config
    ///
    /// On startup:
    /// 1. Create data directory and lock it
    /// 2. Connect to empty tables (enables foreign keys)
    /// 3. Recover and replay the WAL if it exists
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;
        let dir_lock = Self::lock_dir(&config.data_dir)?;

        let wal_path = config.data_dir.join(Self::WAL_FILENAME);
        let mut tables = Self::connect()?;

        let last_lsn = if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;
            for entry in entries {
                tables.apply(entry.record).map_err(|e| {
                    ReqbinError::WalCorruption(format!("replay of lsn {} failed: {}", entry.lsn, e))
                })?;
            }

            tracing::info!(
                path = %wal_path.display(),
                entries = recovery.entries_recovered,
                truncated = recovery.was_truncated,
                bins = tables.bin_count(),
                requests = tables.request_count(),
                "WAL recovery complete"
            );
            recovery.last_lsn
        } else {
            tracing::debug!(path = %wal_path.display(), "no WAL found, starting fresh");
            0
        };

        let wal = WalWriter::open_at(&wal_path, config.wal_sync_strategy, last_lsn)?;

        Ok(Self {
            data_dir: Some(config.data_dir),
            _dir_lock: Some(dir_lock),
            wal: Mutex::new(Some(wal)),
            tables: RwLock::new(tables),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// A non-durable database with the same semantics, for tests and demos
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            data_dir: None,
            _dir_lock: None,
            wal: Mutex::new(None),
            tables: RwLock::new(Self::connect()?),
        })
    }

    fn lock_dir(data_dir: &Path) -> Result<File> {
        let lock_path = data_dir.join(Self::LOCK_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;

        file.try_lock_exclusive().map_err(|_| {
            ReqbinError::Storage(format!(
                "data directory {} is already in use",
                data_dir.display()
            ))
        })?;
        Ok(file)
    }

    /// Establish tables with referential integrity switched on
    fn connect() -> Result<Tables> {
        let mut tables = Tables::new();
        tables.set_foreign_keys(true);
        if !tables.foreign_keys_enabled() {
            return Err(ReqbinError::Storage(
                "failed to enable foreign key enforcement".to_string(),
            ));
        }
        Ok(tables)
    }

    /// Write a prepared row: WAL first, then tables
    ///
    /// Caller holds the `wal` lock. A failed append leaves nothing in the log,
    /// so returning before `apply` keeps the tables and the log in step.
    fn commit(&self, wal: &mut Option<WalWriter>, record: Record) -> Result<()> {
        if let Some(writer) = wal.as_mut() {
            writer.append(record.clone())?;
        }
        self.tables.write().apply(record)
    }

    /// Close the database gracefully, syncing the WAL to disk
    pub fn close(self) -> Result<()> {
        if let Some(writer) = self.wal.lock().as_mut() {
            writer.sync()?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Data directory, `None` when in memory
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn foreign_keys_enabled(&self) -> bool {
        self.tables.read().foreign_keys_enabled()
    }

    pub fn bin_count(&self) -> usize {
        self.tables.read().bin_count()
    }

    pub fn request_count(&self) -> usize {
        self.tables.read().request_count()
    }

    /// LSN of the last WAL entry (0 when in memory or empty)
    pub fn current_lsn(&self) -> u64 {
        self.wal.lock().as_ref().map_or(0, |w| w.current_lsn())
    }
}

impl Storage for Database {
    fn create_bin(&self, bin: NewBin) -> Result<BinId> {
        let mut wal = self.wal.lock();

        let row = self.tables.read().prepare_bin(bin, Utc::now());
        let id = row.id;
        self.commit(&mut wal, Record::CreateBin(row))?;

        tracing::debug!(bin = %id, "bin created");
        Ok(id)
    }

    fn insert_request(&self, request: NewRequest) -> Result<RequestId> {
        let mut wal = self.wal.lock();

        let row = self.tables.read().prepare_request(request)?;
        let (id, bin) = (row.id, row.bin);
        self.commit(&mut wal, Record::InsertRequest(row))?;

        tracing::debug!(request = %id, bin = %bin, "request stored");
        Ok(id)
    }

    fn get_bin_contents(&self, bin: BinId) -> Result<Vec<Request>> {
        Ok(self.tables.read().bin_contents(bin))
    }

    fn get_bin(&self, bin: BinId) -> Result<Option<Bin>> {
        Ok(self.tables.read().bin(bin).cloned())
    }
}
