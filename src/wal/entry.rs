//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their framing.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{ReqbinError, Result};
use crate::model::{Bin, Request};

/// Frame header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Largest payload accepted when reading (64 MB); anything bigger is corruption
pub const MAX_ENTRY_SIZE: u32 = 64 * 1024 * 1024;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing, starts at 1
    pub lsn: u64,

    /// The row that was written
    pub record: Record,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: i64,
}

/// Rows that can be logged; each carries its storage-assigned id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    CreateBin(Bin),
    InsertRequest(Request),
}

impl WalEntry {
    pub fn new(lsn: u64, record: Record) -> Self {
        Self {
            lsn,
            record,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Serialize into a framed entry: `[lsn][crc][len][payload]`, little-endian
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|&len| len <= MAX_ENTRY_SIZE)
            .ok_or_else(|| {
                ReqbinError::Serialization(format!(
                    "WAL entry too large: {} bytes (max {})",
                    payload.len(),
                    MAX_ENTRY_SIZE
                ))
            })?;

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&self.lsn.to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Deserialize a complete framed entry, verifying length, CRC and LSN
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let header = FrameHeader::parse(bytes)?;
        let end = HEADER_SIZE + header.len as usize;
        if bytes.len() < end {
            return Err(ReqbinError::WalCorruption(format!(
                "incomplete entry: expected {} bytes, got {}",
                end,
                bytes.len()
            )));
        }
        header.decode_payload(&bytes[HEADER_SIZE..end])
    }
}

/// Parsed frame header
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl FrameHeader {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(ReqbinError::WalCorruption(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&bytes[0..8]);
        crc.copy_from_slice(&bytes[8..12]);
        len.copy_from_slice(&bytes[12..16]);

        let header = Self {
            lsn: u64::from_le_bytes(lsn),
            crc: u32::from_le_bytes(crc),
            len: u32::from_le_bytes(len),
        };

        if header.len > MAX_ENTRY_SIZE {
            return Err(ReqbinError::WalCorruption(format!(
                "entry length {} exceeds maximum {}",
                header.len, MAX_ENTRY_SIZE
            )));
        }
        Ok(header)
    }

    pub(crate) fn decode_payload(&self, payload: &[u8]) -> Result<WalEntry> {
        let actual = crc32fast::hash(payload);
        if actual != self.crc {
            return Err(ReqbinError::WalCorruption(format!(
                "CRC mismatch at lsn {}: expected {:08x}, got {:08x}",
                self.lsn, self.crc, actual
            )));
        }

        let entry: WalEntry = bincode::deserialize(payload)
            .map_err(|e| ReqbinError::WalCorruption(format!("undecodable entry: {}", e)))?;

        if entry.lsn != self.lsn {
            return Err(ReqbinError::WalCorruption(format!(
                "frame lsn {} does not match entry lsn {}",
                self.lsn, entry.lsn
            )));
        }
        Ok(entry)
    }
}
