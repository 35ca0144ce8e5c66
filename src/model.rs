//! Data model
//!
//! Rows stored by the engine and the record handed in by the capture boundary.
//!
//! ## Schema
//! ```text
//! bins(id PK, created_at, owner NULL)
//! requests(id PK AUTOINCREMENT, received_at, headers, body,
//!          host, remote_addr, request_uri, method, bin → bins.id)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{ReqbinError, Result};

/// Multi-valued header mapping: name → values in arrival order
pub type Headers = BTreeMap<String, Vec<String>>;

// =============================================================================
// Identifiers
// =============================================================================

/// Bin identifier (surrogate key, always positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BinId(pub(crate) u64);

impl BinId {
    /// Parse a bin reference taken from a route segment
    ///
    /// Accepts a positive decimal integer; anything else is
    /// `InvalidBinReference`. This is a syntactic check only.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.parse::<u64>() {
            Ok(0) | Err(_) => Err(ReqbinError::InvalidBinReference(raw.to_string())),
            Ok(id) => Ok(Self(id)),
        }
    }

    /// Raw integer value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for BinId {
    type Error = ReqbinError;

    fn try_from(raw: i64) -> Result<Self> {
        if raw <= 0 {
            return Err(ReqbinError::InvalidBinReference(raw.to_string()));
        }
        Ok(Self(raw as u64))
    }
}

impl FromStr for BinId {
    type Err = ReqbinError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request identifier, assigned by storage in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub(crate) u64);

impl RequestId {
    /// Wrap a backend-assigned id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Bins
// =============================================================================

/// A stored bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub id: BinId,

    /// Assigned by storage at insert time
    pub created_at: DateTime<Utc>,

    /// Opaque owner tag, never interpreted
    pub owner: Option<String>,
}

/// Insert payload for a bin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBin {
    pub owner: Option<String>,
}

impl NewBin {
    pub fn owned(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// A stored request row
///
/// `headers` holds the codec's serialized form; use [`Request::decode_headers`]
/// to get the mapping back. A decode failure affects only this row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub bin: BinId,
    pub received_at: DateTime<Utc>,
    pub headers: String,
    pub body: Bytes,
    pub host: String,
    pub remote_addr: String,
    pub request_uri: String,
    pub method: String,
}

impl Request {
    /// Decode the stored header mapping
    pub fn decode_headers(&self) -> Result<Headers> {
        codec::decode(&self.headers)
    }
}

/// Insert payload for a request; the bin reference is already well-formed
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub bin: BinId,
    pub received_at: DateTime<Utc>,
    pub headers: String,
    pub body: Bytes,
    pub host: String,
    pub remote_addr: String,
    pub request_uri: String,
    pub method: String,
}

/// A fully parsed inbound call, as produced by the capture boundary
///
/// `bin` is the raw route segment and has not been validated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    pub bin: String,
    pub received_at: DateTime<Utc>,
    pub method: String,
    pub host: String,
    pub remote_addr: String,
    pub request_uri: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl CapturedRequest {
    /// Start a capture against the given route segment, stamped now
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            received_at: Utc::now(),
            method: "GET".to_string(),
            host: String::new(),
            remote_addr: String::new(),
            request_uri: String::new(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = addr.into();
        self
    }

    pub fn request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = uri.into();
        self
    }

    /// Append one value for a header name (repeated names accumulate)
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn received_at(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = at;
        self
    }
}
