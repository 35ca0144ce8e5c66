//! Header codec properties
//!
//! These tests verify:
//! - decode(encode(h)) == h for arbitrary mappings
//! - Stored strings survive a trip through the database unchanged

use proptest::prelude::*;
use reqbin::{codec, Headers, ReqbinError};

fn header_map() -> impl Strategy<Value = Headers> {
    prop::collection::btree_map(
        "[A-Za-z][A-Za-z0-9-]{0,20}",
        prop::collection::vec(any::<String>(), 0..4),
        0..8,
    )
}

proptest! {
    #[test]
    fn round_trip(headers in header_map()) {
        let encoded = codec::encode(&headers).unwrap();
        prop_assert_eq!(codec::decode(&encoded).unwrap(), headers);
    }

    #[test]
    fn arbitrary_names_round_trip(headers in prop::collection::btree_map(any::<String>(), prop::collection::vec(any::<String>(), 0..3), 0..4)) {
        let encoded = codec::encode(&headers).unwrap();
        prop_assert_eq!(codec::decode(&encoded).unwrap(), headers);
    }

    #[test]
    fn random_text_never_panics(input in any::<String>()) {
        match codec::decode(&input) {
            Ok(_) | Err(ReqbinError::CorruptEncoding(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}

#[test]
fn empty_mapping_round_trips() {
    let headers = Headers::new();
    assert_eq!(codec::decode(&codec::encode(&headers).unwrap()).unwrap(), headers);
}
