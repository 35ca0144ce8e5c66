//! Shared helpers for storage tests

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use reqbin::{BinId, Config, Database, NewRequest, WalSyncStrategy};
use tempfile::TempDir;

pub fn setup_temp_database() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(durable_config(&temp_dir)).unwrap();
    (temp_dir, db)
}

pub fn durable_config(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .build()
}

pub fn new_request(bin: BinId, body: &str) -> NewRequest {
    NewRequest {
        bin,
        received_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        headers: r#"{"v":1,"h":{"X-Test":["1"]}}"#.to_string(),
        body: Bytes::from(body.to_string()),
        host: "host".to_string(),
        remote_addr: "127.0.0.1:5555".to_string(),
        request_uri: "/bin".to_string(),
        method: "PUT".to_string(),
    }
}
