//! Block header.
//!
//! The block types treat the header as opaque: they only replace its
//! signature, encode it, decode it and print it. The consensus meaning of
//! the fields belongs to the layers that build and validate blocks.

use bytes::Bytes;
use ciborium::value::Value;
use std::fmt;

use crate::canonical::{decode_field, encode_array_header, expect_array, Decode, Encode, EncodeSink};
use crate::crypto::Signable;
use crate::error::DecodeError;
use crate::types::{Address, Hash256};

/// Number of fields in an encoded header, signature included.
const HEADER_FIELDS: usize = 10;

/// A block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    parent_id: Hash256,
    timestamp: u64,
    gas_limit: u64,
    beneficiary: Address,
    gas_used: u64,
    total_score: u64,
    txs_root: Hash256,
    state_root: Hash256,
    receipts_root: Hash256,
    signature: Bytes,
}

impl Header {
    /// Start building a header.
    pub fn builder() -> HeaderBuilder {
        HeaderBuilder::default()
    }

    /// Get the parent block id.
    pub fn parent_id(&self) -> Hash256 {
        self.parent_id
    }

    /// Get the block timestamp.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Get the block gas limit.
    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Get the address credited with the block reward.
    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    /// Get the gas used by the block's transactions.
    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }

    /// Get the accumulated chain score.
    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    /// Commitment to the block's transactions. Not checked against the body.
    pub fn txs_root(&self) -> Hash256 {
        self.txs_root
    }

    /// Get the state root.
    pub fn state_root(&self) -> Hash256 {
        self.state_root
    }

    /// Get the receipts root.
    pub fn receipts_root(&self) -> Hash256 {
        self.receipts_root
    }

    /// Get the signature bytes. Empty before signing.
    pub fn signature(&self) -> Bytes {
        self.signature.clone()
    }

    /// Hash of the complete header, signature included.
    pub fn id(&self) -> Hash256 {
        Hash256::of(self)
    }

    /// A copy of this header carrying `signature`.
    pub fn with_signature(&self, signature: impl Into<Bytes>) -> Header {
        Header {
            signature: signature.into(),
            ..self.clone()
        }
    }

    fn encode_unsigned_fields<S: EncodeSink>(&self, out: &mut S) {
        self.parent_id.encode(out);
        self.timestamp.encode(out);
        self.gas_limit.encode(out);
        self.beneficiary.encode(out);
        self.gas_used.encode(out);
        self.total_score.encode(out);
        self.txs_root.encode(out);
        self.state_root.encode(out);
        self.receipts_root.encode(out);
    }
}

impl Signable for Header {
    fn signing_hash(&self) -> Hash256 {
        let mut hasher = crate::crypto::Hasher::new();
        encode_array_header(&mut hasher, HEADER_FIELDS - 1);
        self.encode_unsigned_fields(&mut hasher);
        hasher.finalize()
    }
}

impl Encode for Header {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_array_header(out, HEADER_FIELDS);
        self.encode_unsigned_fields(out);
        self.signature.encode(out);
    }
}

impl Decode for Header {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let items = expect_array(value, HEADER_FIELDS)?;
        Ok(Header {
            parent_id: decode_field(&items[0], "parent_id")?,
            timestamp: decode_field(&items[1], "timestamp")?,
            gas_limit: decode_field(&items[2], "gas_limit")?,
            beneficiary: decode_field(&items[3], "beneficiary")?,
            gas_used: decode_field(&items[4], "gas_used")?,
            total_score: decode_field(&items[5], "total_score")?,
            txs_root: decode_field(&items[6], "txs_root")?,
            state_root: decode_field(&items[7], "state_root")?,
            receipts_root: decode_field(&items[8], "receipts_root")?,
            signature: decode_field(&items[9], "signature")?,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header({}):
    ParentID:     {}
    Timestamp:    {}
    GasLimit:     {}
    Beneficiary:  {}
    GasUsed:      {}
    TotalScore:   {}
    TxsRoot:      {}
    StateRoot:    {}
    ReceiptsRoot: {}
    Signature:    0x{}",
            self.id(),
            self.parent_id,
            self.timestamp,
            self.gas_limit,
            self.beneficiary,
            self.gas_used,
            self.total_score,
            self.txs_root,
            self.state_root,
            self.receipts_root,
            hex::encode(&self.signature)
        )
    }
}

/// Builder for block headers.
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    header: Header,
}

impl Default for HeaderBuilder {
    fn default() -> Self {
        Self {
            header: Header {
                parent_id: Hash256::from_bytes([0u8; 32]),
                timestamp: 0,
                gas_limit: 0,
                beneficiary: Address::from_bytes([0u8; 20]),
                gas_used: 0,
                total_score: 0,
                txs_root: Hash256::from_bytes([0u8; 32]),
                state_root: Hash256::from_bytes([0u8; 32]),
                receipts_root: Hash256::from_bytes([0u8; 32]),
                signature: Bytes::new(),
            },
        }
    }
}

impl HeaderBuilder {
    /// Set the parent block id.
    pub fn parent_id(mut self, parent_id: Hash256) -> Self {
        self.header.parent_id = parent_id;
        self
    }

    /// Set the block timestamp.
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.header.timestamp = timestamp;
        self
    }

    /// Set the block gas limit.
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.header.gas_limit = gas_limit;
        self
    }

    /// Set the beneficiary.
    pub fn beneficiary(mut self, beneficiary: Address) -> Self {
        self.header.beneficiary = beneficiary;
        self
    }

    /// Set the gas used.
    pub fn gas_used(mut self, gas_used: u64) -> Self {
        self.header.gas_used = gas_used;
        self
    }

    /// Set the accumulated chain score.
    pub fn total_score(mut self, total_score: u64) -> Self {
        self.header.total_score = total_score;
        self
    }

    /// Set the transactions root.
    pub fn txs_root(mut self, txs_root: Hash256) -> Self {
        self.header.txs_root = txs_root;
        self
    }

    /// Set the state root.
    pub fn state_root(mut self, state_root: Hash256) -> Self {
        self.header.state_root = state_root;
        self
    }

    /// Set the receipts root.
    pub fn receipts_root(mut self, receipts_root: Hash256) -> Self {
        self.header.receipts_root = receipts_root;
        self
    }

    /// Build the unsigned header.
    pub fn build(self) -> Header {
        self.header
    }
}
