//! In-memory tables
//!
//! Row storage plus the constraint checks. Not synchronized; `Database` wraps
//! it in a lock.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::error::{ReqbinError, Result};
use crate::model::{Bin, BinId, NewBin, NewRequest, Request, RequestId};
use crate::wal::Record;

/// The `bins` and `requests` tables
///
/// Foreign-key checking starts disabled and must be switched on by whoever
/// connects to the tables (see `Database`).
#[derive(Debug)]
pub struct Tables {
    bins: BTreeMap<BinId, Bin>,
    requests: BTreeMap<RequestId, Request>,

    /// bin → request ids in insertion order
    by_bin: HashMap<BinId, Vec<RequestId>>,

    next_bin_id: u64,
    next_request_id: u64,

    foreign_keys: bool,
}

impl Tables {
    /// Create empty tables; ids start at 1
    pub fn new() -> Self {
        Self {
            bins: BTreeMap::new(),
            requests: BTreeMap::new(),
            by_bin: HashMap::new(),
            next_bin_id: 1,
            next_request_id: 1,
            foreign_keys: false,
        }
    }

    pub fn set_foreign_keys(&mut self, enabled: bool) {
        self.foreign_keys = enabled;
    }

    pub fn foreign_keys_enabled(&self) -> bool {
        self.foreign_keys
    }

    // =========================================================================
    // Write Path: prepare (validate + allocate) then apply
    // =========================================================================

    /// Build the bin row that the next insert would store
    pub fn prepare_bin(&self, bin: NewBin, created_at: DateTime<Utc>) -> Bin {
        Bin {
            id: BinId(self.next_bin_id),
            created_at,
            owner: bin.owner,
        }
    }

    /// Validate a request insert and build its row
    pub fn prepare_request(&self, request: NewRequest) -> Result<Request> {
        self.check_bin_reference(request.bin)?;

        Ok(Request {
            id: RequestId(self.next_request_id),
            bin: request.bin,
            received_at: request.received_at,
            headers: request.headers,
            body: request.body,
            host: request.host,
            remote_addr: request.remote_addr,
            request_uri: request.request_uri,
            method: request.method,
        })
    }

    /// Store a prepared (or replayed) row
    ///
    /// Enforces primary-key uniqueness and, when enabled, the bin reference.
    pub fn apply(&mut self, record: Record) -> Result<()> {
        match record {
            Record::CreateBin(bin) => {
                if self.bins.contains_key(&bin.id) {
                    return Err(ReqbinError::Storage(format!(
                        "UNIQUE constraint failed: bins.id = {}",
                        bin.id
                    )));
                }
                self.next_bin_id = self.next_bin_id.max(bin.id.0 + 1);
                self.bins.insert(bin.id, bin);
            }
            Record::InsertRequest(request) => {
                if self.requests.contains_key(&request.id) {
                    return Err(ReqbinError::Storage(format!(
                        "UNIQUE constraint failed: requests.id = {}",
                        request.id
                    )));
                }
                self.check_bin_reference(request.bin)?;
                self.next_request_id = self.next_request_id.max(request.id.0 + 1);
                self.by_bin.entry(request.bin).or_default().push(request.id);
                self.requests.insert(request.id, request);
            }
        }
        Ok(())
    }

    fn check_bin_reference(&self, bin: BinId) -> Result<()> {
        if self.foreign_keys && !self.bins.contains_key(&bin) {
            return Err(ReqbinError::ForeignKeyViolation(bin));
        }
        Ok(())
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    pub fn bin(&self, id: BinId) -> Option<&Bin> {
        self.bins.get(&id)
    }

    /// Requests for a bin in ascending id order
    pub fn bin_contents(&self, id: BinId) -> Vec<Request> {
        self.by_bin
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|request_id| self.requests.get(request_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}
