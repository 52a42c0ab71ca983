//! Graft Testkit - shared test infrastructure
//!
//! - [`MemoryBridge`]: an in-memory [`IpldBridge`](graft_core::IpldBridge)
//!   fake with failure injection
//! - [`fixtures`]: deterministic links and request ids
//! - [`strategies`]: proptest strategies for links, metadata and tracker
//!   operations
//! - [`init_test_tracing`]: opt-in log output for tests (`RUST_LOG=graft=trace`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod bridge;
pub mod fixtures;
pub mod strategies;

pub use bridge::MemoryBridge;
pub use fixtures::{link, links, request};

/// Install a test-friendly tracing subscriber once per process
///
/// Output honours `RUST_LOG` and goes through the test harness capture.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
