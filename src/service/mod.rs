//! Service Module
//!
//! The operations exposed to the HTTP boundary. Each service owns a handle to
//! a [`Storage`] backend, injected at construction.
//!
//! - [`BinService`]: create bins
//! - [`RequestLogger`]: validate and persist captured requests
//! - [`BinReader`]: validate and list a bin's requests

mod bins;
mod logger;
mod reader;

pub use bins::BinService;
pub use logger::RequestLogger;
pub use reader::BinReader;

use crate::error::Result;
use crate::model::{BinId, CapturedRequest, Request, RequestId};
use crate::storage::Storage;

/// All three services over one shared backend
pub struct Services<S> {
    pub bins: BinService<S>,
    pub logger: RequestLogger<S>,
    pub reader: BinReader<S>,
}

impl<S: Storage + Clone> Services<S> {
    pub fn new(storage: S) -> Self {
        Self {
            bins: BinService::new(storage.clone()),
            logger: RequestLogger::new(storage.clone()),
            reader: BinReader::new(storage),
        }
    }

    pub fn create_new_bin(&self) -> Result<BinId> {
        self.bins.create_new_bin()
    }

    pub fn log_request(&self, request: CapturedRequest) -> Result<RequestId> {
        self.logger.log_request(request)
    }

    pub fn get_requests_in_bin(&self, bin: &str) -> Result<Vec<Request>> {
        self.reader.get_requests_in_bin(bin)
    }
}
