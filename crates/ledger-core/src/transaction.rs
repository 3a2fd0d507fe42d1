//! Transaction: an immutable bundle of clauses.
//!
//! Everything except the signature lives behind an `Arc`, so attaching a
//! signature produces a new transaction that shares the unsigned fields with
//! its origin instead of copying them.

use bytes::Bytes;
use ciborium::value::Value;
use primitive_types::U256;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::{Arc, OnceLock};

use crate::canonical::{
    decode, decode_field, encode_array_header, expect_array, Decode, Encode, EncodeSink,
};
use crate::clause::Clause;
use crate::crypto::Signable;
use crate::error::{DecodeError, GasError};
use crate::gas::GasSchedule;
use crate::types::Hash256;

/// The fields covered by the signing hash.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Unsigned {
    clauses: Vec<Clause>,
    gas_price: U256,
    gas: u64,
    nonce: u64,
    time_barrier: u64,
    depends_on: Option<Hash256>,
}

impl Unsigned {
    /// Write the unsigned fields without an array header.
    fn encode_fields<S: EncodeSink>(&self, out: &mut S) {
        self.clauses.encode(out);
        self.gas_price.encode(out);
        self.gas.encode(out);
        self.nonce.encode(out);
        self.time_barrier.encode(out);
        self.depends_on.encode(out);
    }
}

impl Encode for Unsigned {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_array_header(out, 6);
        self.encode_fields(out);
    }
}

/// An immutable transaction.
///
/// The hash cache is filled on first use and is not part of the value:
/// equality compares fields and signature only.
#[derive(Clone)]
pub struct Transaction {
    unsigned: Arc<Unsigned>,
    signature: Bytes,
    hash_cache: OnceLock<Hash256>,
}

impl Transaction {
    fn from_parts(unsigned: Arc<Unsigned>, signature: Bytes) -> Self {
        Self {
            unsigned,
            signature,
            hash_cache: OnceLock::new(),
        }
    }

    /// Start building an unsigned transaction.
    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::new()
    }

    /// Hash of the full canonical encoding, signature included.
    ///
    /// Computed once per instance and never under a lock: concurrent first
    /// callers each compute it, the first to publish wins, and all agree on
    /// the value because it depends only on immutable fields.
    pub fn hash(&self) -> Hash256 {
        if let Some(hash) = self.hash_cache.get() {
            return *hash;
        }

        let hash = Hash256::of(self);
        if self.hash_cache.set(hash).is_ok() {
            tracing::trace!(%hash, "transaction hash cached");
        }
        hash
    }

    /// Hash of `[clauses, gas_price, gas, nonce, time_barrier, depends_on]`.
    pub fn signing_hash(&self) -> Hash256 {
        Hash256::of(&*self.unsigned)
    }

    /// The gas price.
    pub fn gas_price(&self) -> U256 {
        self.unsigned.gas_price
    }

    /// The gas limit.
    pub fn gas(&self) -> u64 {
        self.unsigned.gas
    }

    /// The sender-chosen nonce.
    pub fn nonce(&self) -> u64 {
        self.unsigned.nonce
    }

    /// Minimum timestamp of a block that may include this transaction.
    pub fn time_barrier(&self) -> u64 {
        self.unsigned.time_barrier
    }

    /// Hash of a transaction that must be included first, if any.
    pub fn depends_on(&self) -> Option<Hash256> {
        self.unsigned.depends_on
    }

    /// Get the number of clauses.
    pub fn clause_count(&self) -> usize {
        self.unsigned.clauses.len()
    }

    /// Get the clauses in order.
    pub fn clauses(&self) -> &[Clause] {
        &self.unsigned.clauses
    }

    /// Iterate the clauses in order, paired with their index.
    ///
    /// The iterator is not restartable; create a new one to traverse again.
    pub fn clause_iter(&self) -> ClauseIter<'_> {
        ClauseIter {
            clauses: &self.unsigned.clauses,
            cursor: 0,
        }
    }

    /// The signature bytes. Empty before signing.
    pub fn signature(&self) -> Bytes {
        self.signature.clone()
    }

    /// True once a signature is attached.
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// A new transaction with the same content and `signature` attached.
    pub fn with_signature(&self, signature: impl Into<Bytes>) -> Transaction {
        Self::from_parts(Arc::clone(&self.unsigned), signature.into())
    }

    /// Canonical bytes: `[clauses, gas_price, gas, nonce, time_barrier,
    /// depends_on, signature]`.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        self.to_canonical_bytes()
    }

    /// Decode a transaction from its canonical bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode(bytes).map_err(|e| {
            tracing::debug!(error = %e, len = bytes.len(), "rejected transaction encoding");
            e
        })
    }

    /// Intrinsic gas under the protocol gas schedule.
    pub fn intrinsic_gas(&self) -> Result<u64, GasError> {
        self.intrinsic_gas_with(&GasSchedule::PROTOCOL)
    }

    /// Intrinsic gas under a custom gas schedule.
    pub fn intrinsic_gas_with(&self, schedule: &GasSchedule) -> Result<u64, GasError> {
        schedule.intrinsic_gas(&self.unsigned.clauses)
    }
}

impl Signable for Transaction {
    fn signing_hash(&self) -> Hash256 {
        Transaction::signing_hash(self)
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.unsigned == other.unsigned && self.signature == other.signature
    }
}

impl Eq for Transaction {}

impl Encode for Transaction {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_array_header(out, 7);
        self.unsigned.encode_fields(out);
        self.signature.encode(out);
    }
}

impl Decode for Transaction {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let items = expect_array(value, 7)?;
        let unsigned = Unsigned {
            clauses: decode_field(&items[0], "clauses")?,
            gas_price: decode_field(&items[1], "gas_price")?,
            gas: decode_field(&items[2], "gas")?,
            nonce: decode_field(&items[3], "nonce")?,
            time_barrier: decode_field(&items[4], "time_barrier")?,
            depends_on: decode_field(&items[5], "depends_on")?,
        };
        let signature = decode_field(&items[6], "signature")?;
        Ok(Self::from_parts(Arc::new(unsigned), signature))
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("clauses", &self.unsigned.clauses)
            .field("gas_price", &self.unsigned.gas_price)
            .field("gas", &self.unsigned.gas)
            .field("nonce", &self.unsigned.nonce)
            .field("time_barrier", &self.unsigned.time_barrier)
            .field("depends_on", &self.unsigned.depends_on)
            .field("signature", &hex::encode(&self.signature))
            .finish()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tx({}, clauses: {}, gas: {}, gas_price: {}, nonce: {})",
            self.hash(),
            self.clause_count(),
            self.gas(),
            self.gas_price(),
            self.nonce()
        )
    }
}

/// Iterator over a transaction's clauses and their indexes.
///
/// Once exhausted it keeps returning `None`.
#[derive(Debug)]
pub struct ClauseIter<'a> {
    clauses: &'a [Clause],
    cursor: usize,
}

impl<'a> Iterator for ClauseIter<'a> {
    type Item = (&'a Clause, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let clause = self.clauses.get(self.cursor)?;
        let index = self.cursor;
        self.cursor += 1;
        Some((clause, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.clauses.len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ClauseIter<'_> {}

impl FusedIterator for ClauseIter<'_> {}

/// Builder for unsigned transactions.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    clauses: Vec<Clause>,
    gas_price: U256,
    gas: u64,
    nonce: u64,
    time_barrier: u64,
    depends_on: Option<Hash256>,
}

impl TransactionBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause.
    pub fn clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Set the gas price.
    pub fn gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Set the gas limit.
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Set the nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the time barrier.
    pub fn time_barrier(mut self, time_barrier: u64) -> Self {
        self.time_barrier = time_barrier;
        self
    }

    /// Set the transaction this one depends on.
    pub fn depends_on(mut self, depends_on: Hash256) -> Self {
        self.depends_on = Some(depends_on);
        self
    }

    /// Build the unsigned transaction.
    pub fn build(self) -> Transaction {
        let unsigned = Unsigned {
            clauses: self.clauses,
            gas_price: self.gas_price,
            gas: self.gas,
            nonce: self.nonce,
            time_barrier: self.time_barrier,
            depends_on: self.depends_on,
        };
        Transaction::from_parts(Arc::new(unsigned), Bytes::new())
    }
}
