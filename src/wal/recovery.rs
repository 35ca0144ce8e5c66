//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL.
//!
//! Recovery keeps the longest valid prefix of the log. A request row depends on
//! the bin row before it, so skipping a damaged entry and continuing could
//! resurrect requests whose bin was lost; everything after the first bad entry
//! is discarded instead.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::{ReqbinError, Result};

use super::{WalEntry, WalReader};

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Bytes after the last valid entry (torn or corrupt tail)
    pub bytes_discarded: u64,

    /// Last valid LSN (0 for an empty log)
    pub last_lsn: u64,

    /// Whether the WAL was truncated (partial writes removed)
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Recover entries from a WAL file
    ///
    /// This will:
    /// 1. Read all valid entries in order
    /// 2. Stop at the first torn, corrupt or out-of-sequence entry
    /// 3. Truncate the file to the end of the valid prefix
    /// 4. Return the valid entries in order
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let (entries, mut result) = Self::scan(path)?;

        if result.bytes_discarded > 0 {
            let valid_len = std::fs::metadata(path)?.len() - result.bytes_discarded;
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len)?;
            file.sync_all()?;
            result.was_truncated = true;

            tracing::warn!(
                path = %path.display(),
                discarded = result.bytes_discarded,
                last_lsn = result.last_lsn,
                "WAL tail truncated during recovery"
            );
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path).map(|(_, result)| result)
    }

    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let file_len = std::fs::metadata(path)?.len();
        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();
        let mut valid_len = 0u64;

        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => {
                    if entry.lsn != result.last_lsn + 1 {
                        tracing::warn!(
                            expected = result.last_lsn + 1,
                            found = entry.lsn,
                            "WAL sequence gap; discarding remainder"
                        );
                        break;
                    }
                    result.last_lsn = entry.lsn;
                    result.entries_recovered += 1;
                    entries.push(entry);
                    valid_len = reader.position();
                }
                Ok(None) => break,
                Err(ReqbinError::WalCorruption(reason)) => {
                    tracing::warn!(%reason, "WAL corruption detected");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        result.bytes_discarded = file_len - valid_len;

        Ok((entries, result))
    }
}
