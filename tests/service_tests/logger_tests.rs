//! Tests for RequestLogger

use std::sync::Arc;

use reqbin::{codec, BinId, CapturedRequest, ReqbinError, RequestId, RequestLogger};

use crate::fake::{storage_error, Expected, FakeStorage, Recorder};

fn captured(bin: &str) -> CapturedRequest {
    CapturedRequest::new(bin)
        .method("POST")
        .host("example.com")
        .remote_addr("192.0.2.1:443")
        .request_uri("/bin/5?x=1")
        .header("X-Test", "1")
        .header("Accept", "a")
        .header("Accept", "b")
        .body("hello")
}

#[test]
fn test_log_request_happy_path() {
    let seen = Recorder::new();
    let handle = seen.handle();
    let mut fake = FakeStorage::new();
    fake.insert_request = Box::new(move |request| {
        handle.lock().push(request);
        Ok(RequestId::new(1))
    });
    let fake = fake.into_shared();

    let logger = RequestLogger::new(Arc::clone(&fake));
    let request = captured("5");
    let id = logger.log_request(request.clone()).unwrap();

    assert_eq!(id.get(), 1);
    let recorded = seen.0.lock();
    let stored = &recorded[0];
    assert_eq!(stored.bin, BinId::parse("5").unwrap());
    assert_eq!(stored.method, "POST");
    assert_eq!(stored.host, "example.com");
    assert_eq!(stored.remote_addr, "192.0.2.1:443");
    assert_eq!(stored.request_uri, "/bin/5?x=1");
    assert_eq!(&stored.body[..], b"hello");
    assert_eq!(stored.received_at, request.received_at);
    assert_eq!(codec::decode(&stored.headers).unwrap(), request.headers);
    fake.verify_call_counts(Expected {
        insert_request: 1,
        ..Default::default()
    });
}

#[test]
fn test_log_request_invalid_bin_reference_skips_storage() {
    for raw in ["", "0", "-1", "abc", "2.5", "018f3c1e-7d2a-7c4e-9b1a-2f1e5c3d4b6a"] {
        let fake = FakeStorage::new().into_shared();
        let logger = RequestLogger::new(Arc::clone(&fake));

        let err = logger.log_request(captured(raw)).unwrap_err();

        assert!(matches!(err, ReqbinError::InvalidBinReference(ref r) if r == raw));
        assert!(err.is_client_fault());
        fake.verify_call_counts(Expected::default());
    }
}

#[test]
fn test_log_request_surfaces_foreign_key_violation() {
    let mut fake = FakeStorage::new();
    fake.insert_request = Box::new(|request| Err(ReqbinError::ForeignKeyViolation(request.bin)));
    let fake = fake.into_shared();

    let logger = RequestLogger::new(Arc::clone(&fake));
    let err = logger.log_request(captured("8")).unwrap_err();

    assert!(matches!(err, ReqbinError::ForeignKeyViolation(id) if id.get() == 8));
    assert!(err.is_client_fault());
    fake.verify_call_counts(Expected {
        insert_request: 1,
        ..Default::default()
    });
}

#[test]
fn test_log_request_surfaces_storage_error() {
    let mut fake = FakeStorage::new();
    fake.insert_request = Box::new(|_| Err(storage_error()));

    let logger = RequestLogger::new(fake.into_shared());
    let err = logger.log_request(captured("3")).unwrap_err();

    assert!(matches!(err, ReqbinError::Storage(_)));
}
