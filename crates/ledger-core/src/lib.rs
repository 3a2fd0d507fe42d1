//! # Ledger Core
//!
//! Immutable ledger record types: blocks and multi-clause transactions.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over the consensus-critical encodings of ledger records.
//!
//! ## Key Types
//!
//! - [`Transaction`] - An immutable bundle of [`Clause`]s with gas parameters
//! - [`Block`] - A [`Header`] and an ordered list of transactions
//! - [`Hash256`] - 32-byte Blake3 hash identifying transactions and headers
//! - [`GasSchedule`] - The protocol's intrinsic gas constants
//!
//! ## Canonicalization
//!
//! Every record has exactly one byte representation, deterministic CBOR.
//! The same encoding is hashed, sent over the wire, and measured for block
//! size. See the [`canonical`] module.
//!
//! ## Signing
//!
//! Signatures are excluded from signing hashes, so attaching one never
//! changes what was signed. Anything implementing [`Signable`] can be
//! signed and verified with [`crypto::sign`] and [`crypto::verify`].

pub mod block;
pub mod canonical;
pub mod clause;
pub mod crypto;
pub mod error;
pub mod gas;
pub mod header;
pub mod transaction;
pub mod types;

pub use block::{Block, Body};
pub use canonical::{Decode, Encode, EncodeSink, SizeCounter};
pub use clause::Clause;
pub use crypto::{Hasher, Keypair, PublicKey, Signable};
pub use error::{CoreError, DecodeError, GasError};
pub use gas::GasSchedule;
pub use header::{Header, HeaderBuilder};
pub use primitive_types::U256;
pub use transaction::{ClauseIter, Transaction, TransactionBuilder};
pub use types::{Address, Hash256};
