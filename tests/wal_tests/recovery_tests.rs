//! Tests for WAL Recovery
//!
//! These tests verify:
//! - Recovery from a clean WAL
//! - Recovery from an empty WAL
//! - Torn tails are truncated
//! - Corruption mid-log discards everything after it
//! - Verify mode does not modify the file

use std::fs::{self, File, OpenOptions};
use std::io::Write;

use reqbin::wal::{WalEntry, WalRecovery, WalWriter};
use reqbin::WalSyncStrategy;

use crate::common::{bin_record, request_record, setup_temp_wal};

fn write_entries(path: &std::path::Path, count: u64) {
    let mut writer = WalWriter::open(path, WalSyncStrategy::EveryWrite).unwrap();
    writer.append(bin_record(1)).unwrap();
    for id in 1..count {
        writer.append(request_record(id, 1)).unwrap();
    }
}

// =============================================================================
// Clean WAL Tests
// =============================================================================

#[test]
fn test_recover_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result.entries_recovered, 0);
    assert_eq!(result.last_lsn, 0);
    assert_eq!(result.bytes_discarded, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_clean_log() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries(&wal_path, 10);

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 10);
    assert_eq!(result.entries_recovered, 10);
    assert_eq!(result.last_lsn, 10);
    assert!(!result.was_truncated);
}

// =============================================================================
// Partial Write Tests
// =============================================================================

#[test]
fn test_recover_truncates_torn_tail() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries(&wal_path, 3);
    let clean_len = fs::metadata(&wal_path).unwrap().len();

    // Half of a fourth entry
    let torn = WalEntry::new(4, request_record(9, 1)).serialize().unwrap();
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&torn[..torn.len() / 2]).unwrap();
    drop(file);

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(result.last_lsn, 3);
    assert!(result.was_truncated);
    assert_eq!(result.bytes_discarded, (torn.len() / 2) as u64);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), clean_len);
}

#[test]
fn test_recover_truncates_torn_header() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries(&wal_path, 2);

    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0xAB; 5]).unwrap();
    drop(file);

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(result.bytes_discarded, 5);
    assert!(result.was_truncated);
}

#[test]
fn test_writer_appends_cleanly_after_torn_tail() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries(&wal_path, 2);

    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0u8; 7]).unwrap();
    drop(file);

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        assert_eq!(writer.append(bin_record(2)).unwrap(), 3);
    }

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(!result.was_truncated);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corruption_discards_remainder() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries(&wal_path, 1);
    let first_len = fs::metadata(&wal_path).unwrap().len() as usize;
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(request_record(1, 1)).unwrap();
        writer.append(request_record(2, 1)).unwrap();
    }

    // Damage the payload of entry 2; entry 3 is intact but must be dropped
    let mut bytes = fs::read(&wal_path).unwrap();
    bytes[first_len + 20] ^= 0xFF;
    fs::write(&wal_path, &bytes).unwrap();

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(result.last_lsn, 1);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&wal_path).unwrap().len() as usize, first_len);
}

#[test]
fn test_sequence_gap_discards_remainder() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut file = File::create(&wal_path).unwrap();
    file.write_all(&WalEntry::new(1, bin_record(1)).serialize().unwrap())
        .unwrap();
    file.write_all(&WalEntry::new(3, bin_record(2)).serialize().unwrap())
        .unwrap();
    drop(file);

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(result.last_lsn, 1);
    assert!(result.was_truncated);
}

// =============================================================================
// Verify Tests
// =============================================================================

#[test]
fn test_verify_does_not_modify_file() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries(&wal_path, 2);
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[1, 2, 3]).unwrap();
    drop(file);
    let len_before = fs::metadata(&wal_path).unwrap().len();

    let result = WalRecovery::verify(&wal_path).unwrap();

    assert_eq!(result.entries_recovered, 2);
    assert_eq!(result.bytes_discarded, 3);
    assert!(!result.was_truncated);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), len_before);
}
