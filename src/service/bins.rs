//! Bin creation

use crate::error::Result;
use crate::model::{BinId, NewBin};
use crate::storage::Storage;

/// Creates bins; ids come from the storage backend
pub struct BinService<S> {
    storage: S,
}

impl<S: Storage> BinService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create an anonymous bin
    pub fn create_new_bin(&self) -> Result<BinId> {
        self.create(NewBin::default())
    }

    /// Create a bin tagged with an opaque owner string
    pub fn create_owned_bin(&self, owner: impl Into<String>) -> Result<BinId> {
        self.create(NewBin::owned(owner))
    }

    fn create(&self, bin: NewBin) -> Result<BinId> {
        let id = self.storage.create_bin(bin)?;
        tracing::info!(bin = %id, "new bin");
        Ok(id)
    }
}
