//! # reqbin
//!
//! Persistence core for a request bin: create an anonymous bin, capture every
//! HTTP request sent to it, and list them back in arrival order.
//! - Surrogate bin ids, strictly increasing and never reused
//! - Referential integrity between requests and bins
//! - Multi-value header serialization
//! - Write-Ahead Logging (WAL) for durability, with crash recovery
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                HTTP boundary (not in this crate)             │
//! └──────────┬──────────────────┬──────────────────┬────────────┘
//!            │                  │                  │
//!     ┌──────▼──────┐   ┌───────▼───────┐   ┌──────▼──────┐
//!     │ BinService  │   │ RequestLogger │   │  BinReader  │
//!     └──────┬──────┘   └───────┬───────┘   └──────┬──────┘
//!            │          header codec               │
//!            └──────────────────┼──────────────────┘
//!                        ┌──────▼──────┐
//!                        │   Storage   │  (trait)
//!                        └──────┬──────┘
//!                 ┌─────────────┴─────────────┐
//!                 ▼                           ▼
//!          ┌─────────────┐             ┌─────────────┐
//!          │     WAL     │             │   Tables    │
//!          │  (Append)   │             │  (RwLock)   │
//!          └─────────────┘             └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use reqbin::{CapturedRequest, Database, Services};
//!
//! let db = Arc::new(Database::in_memory()?);
//! let services = Services::new(db);
//!
//! let bin = services.create_new_bin()?;
//! services.log_request(
//!     CapturedRequest::new(bin.to_string())
//!         .method("POST")
//!         .host("example.com")
//!         .header("X-Test", "1")
//!         .body("hello"),
//! )?;
//!
//! let requests = services.get_requests_in_bin(&bin.to_string())?;
//! assert_eq!(requests.len(), 1);
//! assert_eq!(requests[0].method, "POST");
//! # Ok::<(), reqbin::ReqbinError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod codec;
pub mod model;
pub mod service;
pub mod storage;
pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, WalSyncStrategy};
pub use error::{ReqbinError, Result};
pub use model::{Bin, BinId, CapturedRequest, Headers, NewBin, NewRequest, Request, RequestId};
pub use service::{BinReader, BinService, RequestLogger, Services};
pub use storage::{Database, Storage};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of reqbin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
