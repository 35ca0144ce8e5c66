//! Request logging
//!
//! Turns a [`CapturedRequest`] into a stored row.

use crate::codec;
use crate::error::Result;
use crate::model::{BinId, CapturedRequest, NewRequest, RequestId};
use crate::storage::Storage;

/// Persists captured requests against their bin
pub struct RequestLogger<S> {
    storage: S,
}

impl<S: Storage> RequestLogger<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Validate the bin reference, encode headers, and store the request
    ///
    /// Errors:
    /// - `InvalidBinReference` — `request.bin` is not a positive integer;
    ///   storage is not touched
    /// - `ForeignKeyViolation` — well-formed id with no such bin
    /// - `Storage`/`Io` — engine failure, passed through unchanged
    /// - `Serialization` — a durable engine cannot log the row because its WAL
    ///   entry would exceed [`MAX_ENTRY_SIZE`](crate::wal::MAX_ENTRY_SIZE)
    ///   (64 MiB, body and headers included). There is no other size limit.
    pub fn log_request(&self, request: CapturedRequest) -> Result<RequestId> {
        let bin = BinId::parse(&request.bin)?;
        let headers = codec::encode(&request.headers)?;

        let id = self.storage.insert_request(NewRequest {
            bin,
            received_at: request.received_at,
            headers,
            body: request.body,
            host: request.host,
            remote_addr: request.remote_addr,
            request_uri: request.request_uri,
            method: request.method,
        })?;

        tracing::debug!(bin = %bin, request = %id, "request logged");
        Ok(id)
    }
}
