//! WAL test suite

mod recovery_tests;
