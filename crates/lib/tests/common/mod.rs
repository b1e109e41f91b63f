#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared helpers for the integration tests: tracing setup and a lock serialising
//! tests that mutate process environment variables.

use dotenvy::dotenv;
use std::sync::{Mutex, Once};

#[cfg(test)]
static INIT: Once = Once::new();

/// Serialises tests that read or write environment variables.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Initializes the tracing subscriber and loads .env for tests.
#[cfg(test)]
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}
