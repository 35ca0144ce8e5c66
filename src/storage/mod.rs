//! Storage Module
//!
//! Owns the `bins` and `requests` tables and every read and write against
//! them, including referential integrity between the two.
//!
//! ## Responsibilities
//! - Assign bin and request ids (strictly increasing, never reused)
//! - Stamp bins with their creation time
//! - Reject requests whose bin does not exist
//! - Return a bin's requests in insertion order
//!
//! ## Layout
//! ```text
//!   Storage (trait) ◄── services depend on this only
//!        │
//!   Database ── write lock ──► WalWriter (wal.log)
//!        │
//!        └──── RwLock ───────► Tables (bins, requests, bin → request index)
//! ```

mod database;
mod tables;

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Bin, BinId, NewBin, NewRequest, Request, RequestId};

pub use database::Database;
pub use tables::Tables;

/// Operations the services need from a storage backend
///
/// Implementations must be safe to share between threads; every method takes
/// `&self` and holds no lock once it returns.
pub trait Storage: Send + Sync {
    /// Insert a bin; the backend assigns id and creation time
    fn create_bin(&self, bin: NewBin) -> Result<BinId>;

    /// Insert a request row
    ///
    /// Fails with `ForeignKeyViolation` when `request.bin` names no bin.
    fn insert_request(&self, request: NewRequest) -> Result<RequestId>;

    /// All requests referencing `bin`, oldest first
    ///
    /// An unknown bin yields an empty vector, same as an empty one.
    fn get_bin_contents(&self, bin: BinId) -> Result<Vec<Request>>;

    /// Look up a bin row
    fn get_bin(&self, bin: BinId) -> Result<Option<Bin>>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn create_bin(&self, bin: NewBin) -> Result<BinId> {
        (**self).create_bin(bin)
    }

    fn insert_request(&self, request: NewRequest) -> Result<RequestId> {
        (**self).insert_request(request)
    }

    fn get_bin_contents(&self, bin: BinId) -> Result<Vec<Request>> {
        (**self).get_bin_contents(bin)
    }

    fn get_bin(&self, bin: BinId) -> Result<Option<Bin>> {
        (**self).get_bin(bin)
    }
}
