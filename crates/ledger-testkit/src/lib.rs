//! # Ledger Testkit
//!
//! Testing utilities for the ledger record types.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known transactions with their expected canonical bytes and intrinsic gas
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up signed transactions and blocks
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical encoding across implementations:
//!
//! ```rust
//! use ledger_testkit::vectors::{all_vectors, transaction_from_vector};
//!
//! for vector in all_vectors() {
//!     let tx = transaction_from_vector(&vector);
//!     println!("{}: {}", vector.name, tx.hash().to_hex());
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ledger_testkit::generators::{TxParams, transaction_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn tx_hash_is_deterministic(params: TxParams) {
//!         let t1 = transaction_from_params(&params);
//!         let t2 = transaction_from_params(&params);
//!         prop_assert_eq!(t1.hash(), t2.hash());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ledger_testkit::fixtures::{recipient, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let tx = fixture.make_transfer(recipient(1), 1_000, 0);
//! assert!(tx.is_signed());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, recipient, TestFixture};
pub use generators::{transaction_from_params, TxParams};
pub use vectors::{
    all_vectors, transaction_from_vector, vectors_json, verify_all_vectors, GoldenVector,
};
