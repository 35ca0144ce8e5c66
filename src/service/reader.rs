//! Bin contents

use crate::error::{ReqbinError, Result};
use crate::model::{BinId, Request};
use crate::storage::Storage;

/// Lists the requests captured by a bin
pub struct BinReader<S> {
    storage: S,
}

impl<S: Storage> BinReader<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Requests in `bin`, in arrival order
    ///
    /// Storage alone cannot tell an empty bin from a missing one, so the bin
    /// row is checked first: a missing bin is `BinNotFound`, an empty bin is
    /// `Ok(vec![])`.
    pub fn get_requests_in_bin(&self, bin: &str) -> Result<Vec<Request>> {
        let id = BinId::parse(bin)?;
        self.get_requests(id)
    }

    /// Same as [`get_requests_in_bin`](Self::get_requests_in_bin) for an
    /// already parsed id
    pub fn get_requests(&self, id: BinId) -> Result<Vec<Request>> {
        if self.storage.get_bin(id)?.is_none() {
            return Err(ReqbinError::BinNotFound(id));
        }
        self.storage.get_bin_contents(id)
    }
}
