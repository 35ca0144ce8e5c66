//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::error::Result;

use super::{Record, WalEntry, WalRecovery};

/// Writes entries to the WAL file
pub struct WalWriter {
    file: File,
    path: PathBuf,

    /// LSN of the last entry written (0 when empty)
    current_lsn: u64,

    /// File length covered by complete entries
    committed_len: u64,

    sync_strategy: WalSyncStrategy,

    /// Entries appended since the last fsync
    uncommitted: usize,

    /// Makes the next fsync fail
    #[cfg(test)]
    pub(crate) fail_next_sync: bool,
}

impl WalWriter {
    /// Open or create a WAL file
    ///
    /// An existing file is scanned to find the last LSN; a damaged tail is
    /// truncated first so new entries never follow garbage.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let last_lsn = if path.exists() {
            WalRecovery::recover(path)?.1.last_lsn
        } else {
            0
        };
        Self::open_at(path, sync_strategy, last_lsn)
    }

    /// Open a WAL whose valid contents end at `last_lsn` (already recovered)
    pub fn open_at(path: &Path, sync_strategy: WalSyncStrategy, last_lsn: u64) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        let committed_len = file.seek(SeekFrom::End(0))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            current_lsn: last_lsn,
            committed_len,
            sync_strategy,
            uncommitted: 0,
            #[cfg(test)]
            fail_next_sync: false,
        })
    }

    /// Append a record to the WAL; returns its LSN
    ///
    /// An append either lands whole or not at all: if the write or a due
    /// fsync fails, the file is cut back to the previous entry and the LSN
    /// is left unchanged, so an `Err` never leaves the entry in the log.
    pub fn append(&mut self, record: Record) -> Result<u64> {
        let lsn = self.current_lsn + 1;
        let frame = WalEntry::new(lsn, record).serialize()?;

        if let Err(e) = self.file.write_all(&frame) {
            self.rollback();
            return Err(e.into());
        }

        let should_sync = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.uncommitted + 1 >= count,
        };
        if should_sync {
            if let Err(e) = self.sync_file() {
                self.rollback();
                return Err(e);
            }
            self.uncommitted = 0;
        } else {
            self.uncommitted += 1;
        }

        self.current_lsn = lsn;
        self.committed_len += frame.len() as u64;
        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.sync_file()?;
        self.uncommitted = 0;
        Ok(())
    }

    fn sync_file(&mut self) -> Result<()> {
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_sync) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "injected fsync failure").into());
        }
        self.file.sync_data()?;
        Ok(())
    }

    /// Get the current LSN
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    /// Entries appended since the last fsync
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rollback(&mut self) {
        let restored = self
            .file
            .set_len(self.committed_len)
            .and_then(|_| self.file.seek(SeekFrom::Start(self.committed_len)).map(|_| ()));
        if let Err(e) = restored {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "failed to roll back partial WAL write; recovery will truncate it"
            );
        }
    }
}
