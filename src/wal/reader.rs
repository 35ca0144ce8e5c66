//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{ReqbinError, Result};

use super::entry::{FrameHeader, HEADER_SIZE};
use super::WalEntry;

/// Reads entries from the WAL file, front to back
pub struct WalReader {
    reader: BufReader<File>,

    /// Offset just past the last entry returned successfully
    position: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns:
    /// - `Ok(Some(entry))` — a complete, checksummed entry
    /// - `Ok(None)` — clean end of file
    /// - `Err(WalCorruption)` — torn write or damaged entry at `position()`
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let mut header = [0u8; HEADER_SIZE];
        let read = read_up_to(&mut self.reader, &mut header)?;
        if read == 0 {
            return Ok(None);
        }
        if read < HEADER_SIZE {
            return Err(ReqbinError::WalCorruption(format!(
                "torn header at offset {} ({} of {} bytes)",
                self.position, read, HEADER_SIZE
            )));
        }

        let frame = FrameHeader::parse(&header)?;
        let mut payload = vec![0u8; frame.len as usize];
        let read = read_up_to(&mut self.reader, &mut payload)?;
        if read < payload.len() {
            return Err(ReqbinError::WalCorruption(format!(
                "torn entry at offset {} ({} of {} payload bytes)",
                self.position,
                read,
                payload.len()
            )));
        }

        let entry = frame.decode_payload(&payload)?;
        self.position += (HEADER_SIZE + payload.len()) as u64;
        Ok(Some(entry))
    }

    /// Offset of the end of the last valid entry read
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Iterate over entries; stops after the first error
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the file allows; returns bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
