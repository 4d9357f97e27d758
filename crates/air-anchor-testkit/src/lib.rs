//! # Air Anchor Testkit
//!
//! Testing utilities for Air Anchor.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known keys, payloads, and the addresses they map to
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//! - **Mock ledger**: An in-process HTTP ledger and certificate authority
//!
//! ## Golden Vectors
//!
//! ```rust
//! use air_anchor_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, address) in verify_all_vectors() {
//!     assert!(matches, "{name}: {address}");
//! }
//! ```
//!
//! ## Mock Ledger
//!
//! ```rust,no_run
//! use air_anchor_testkit::{fast_config, MockLedger, TestFixture};
//!
//! async fn example() {
//!     let ledger = MockLedger::start().await.unwrap();
//!     let client = TestFixture::new().rest_client(fast_config(&ledger.url())).unwrap();
//!     client.location("0xfeed").await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod mock_ledger;
pub mod vectors;

pub use fixtures::{fast_config, multi_party_fixtures, TestFixture, TEST_SUBJECT};
pub use generators::BatchParams;
pub use mock_ledger::{MockLedger, Override};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
