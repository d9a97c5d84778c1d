//! Common test infrastructure
//!
//! Everything end-to-end tests need: a mock backend, client wiring and
//! shared constants. Tests should only import from this module.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{MockBackend, TestContext};
//!
//! #[tokio::test]
//! async fn test_lists_originals() {
//!     let backend = MockBackend::spawn_seeded().await;
//!     let context = TestContext::authenticated(&backend.base_url).await;
//!
//!     let files = context.api.original_files().await.unwrap();
//!     assert_eq!(files.len(), 2);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestContext;
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::write_audio_files;
#[allow(unused_imports)]
pub use server::{MockBackend, RecordedRequest};
