//! Test helpers module
//!
//! A mock portal backend built on wiremock plus JSON fixtures for the
//! admin, faculty and student endpoints.

#![allow(dead_code)]

pub mod portal_mock;
pub mod test_data;

pub use portal_mock::*;
pub use test_data::*;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}
