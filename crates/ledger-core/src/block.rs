//! Block: a header plus an ordered list of transactions.
//!
//! Blocks are immutable. The transaction list is shared between a block and
//! the blocks derived from it with [`Block::with_signature`]; callers only
//! ever receive their own copies of it.

use bytes::Bytes;
use ciborium::value::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::canonical::{
    decode, decode_field, encode_array_header, expect_array, Decode, Encode, EncodeSink,
};
use crate::error::DecodeError;
use crate::header::Header;
use crate::transaction::Transaction;

/// The transaction list of a block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
    pub transactions: Vec<Transaction>,
}

/// An immutable block.
///
/// The size cache is filled on first use and does not take part in
/// equality.
#[derive(Debug, Clone)]
pub struct Block {
    header: Header,
    transactions: Arc<[Transaction]>,
    size_cache: OnceLock<usize>,
}

impl Block {
    /// Assemble a block from existing parts.
    ///
    /// Used to recover a block from storage or the network: the header's
    /// transaction root is not checked against `transactions`.
    pub fn compose(header: Header, transactions: impl IntoIterator<Item = Transaction>) -> Self {
        Self {
            header,
            transactions: transactions.into_iter().collect(),
            size_cache: OnceLock::new(),
        }
    }

    /// Assemble a block from a header and a body.
    pub fn from_parts(header: Header, body: Body) -> Self {
        Self::compose(header, body.transactions)
    }

    /// A new block whose header carries `signature`. The transaction list
    /// is shared, the size is computed afresh.
    pub fn with_signature(&self, signature: impl Into<Bytes>) -> Block {
        Self {
            header: self.header.with_signature(signature),
            transactions: Arc::clone(&self.transactions),
            size_cache: OnceLock::new(),
        }
    }

    /// Get the block header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// A copy of the transaction list.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.to_vec()
    }

    /// Get the number of transactions.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// A copy of the block body.
    pub fn body(&self) -> Body {
        Body {
            transactions: self.transactions(),
        }
    }

    /// Length in bytes of the block's canonical encoding.
    ///
    /// Counted without materializing the encoding. Racing first callers each
    /// count and publish; the first publish is kept.
    pub fn size(&self) -> usize {
        if let Some(size) = self.size_cache.get() {
            return *size;
        }

        let size = self.encoded_len();
        if self.size_cache.set(size).is_ok() {
            tracing::trace!(size, "block size cached");
        }
        size
    }

    /// Canonical bytes: `[header, [transaction...]]`.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        self.to_canonical_bytes()
    }

    /// Decode a block from its canonical bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode(bytes).map_err(|e| {
            tracing::debug!(error = %e, len = bytes.len(), "rejected block encoding");
            e
        })
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.transactions == other.transactions
    }
}

impl Eq for Block {}

impl Encode for Block {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_array_header(out, 2);
        self.header.encode(out);
        self.transactions.encode(out);
    }
}

impl Decode for Block {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let items = expect_array(value, 2)?;
        let header: Header = decode_field(&items[0], "header")?;
        let transactions: Vec<Transaction> = decode_field(&items[1], "transactions")?;
        Ok(Self::compose(header, transactions))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block({} bytes)", self.size())?;
        writeln!(f, "{}", self.header)?;
        write!(f, "Transactions: [")?;
        for (i, tx) in self.transactions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", tx)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Clause;
    use crate::types::{Address, Hash256};
    use primitive_types::U256;

    fn tx(nonce: u64) -> Transaction {
        Transaction::builder()
            .clause(Clause::call(Address::from_bytes([0x44; 20])).with_value(U256::from(nonce)))
            .gas(21_000)
            .nonce(nonce)
            .build()
            .with_signature(vec![nonce as u8; 64])
    }

    fn block() -> Block {
        let header = Header::builder()
            .parent_id(Hash256::from_bytes([0x10; 32]))
            .timestamp(1_700_000_000)
            .build();
        Block::compose(header, vec![tx(1), tx(2)])
    }

    #[test]
    fn test_size_matches_encoding() {
        let block = block();
        assert_eq!(block.size(), block.encode_to_vec().len());
        assert_eq!(block.size_cache.get(), Some(&block.size()));
    }

    #[test]
    fn test_racing_first_size_callers_agree() {
        use std::sync::Barrier;

        let block = block();
        let barrier = Barrier::new(4);
        let sizes: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        block.size()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let expected = block.encode_to_vec().len();
        assert!(sizes.iter().all(|s| *s == expected));
        assert_eq!(block.size_cache.get(), Some(&expected));
    }

    #[test]
    fn test_with_signature_has_independent_size() {
        let block = block();
        let unsigned_size = block.size();
        let signed = block.with_signature(vec![0xee; 65]);

        assert!(signed.size_cache.get().is_none());
        assert_eq!(signed.size(), signed.encode_to_vec().len());
        // 65 bytes of signature plus a two-byte length head replace 0x40.
        assert_eq!(signed.size(), unsigned_size + 66);
        assert_eq!(block.size(), unsigned_size);
        assert!(Arc::ptr_eq(&block.transactions, &signed.transactions));
    }

    #[test]
    fn test_block_roundtrip() {
        let block = block().with_signature(vec![0x01; 65]);
        let decoded = Block::decode(&block.encode_to_vec()).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.transactions()[1].hash(), tx(2).hash());
    }

    #[test]
    fn test_empty_block_roundtrip() {
        let block = Block::compose(Header::builder().build(), Vec::new());
        let decoded = Block::decode(&block.encode_to_vec()).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.transaction_count(), 0);
    }

    #[test]
    fn test_transactions_returns_copy() {
        let block = block();
        let mut txs = block.transactions();
        txs.clear();
        assert_eq!(block.transaction_count(), 2);

        let mut body = block.body();
        body.transactions.push(tx(3));
        assert_eq!(block.transactions().len(), 2);
    }

    #[test]
    fn test_decode_truncated_block() {
        let mut bytes = block().encode_to_vec();
        bytes.pop();
        assert!(matches!(Block::decode(&bytes), Err(DecodeError::Cbor(_))));
    }

    #[test]
    fn test_display_summary() {
        let block = block();
        let text = block.to_string();
        assert!(text.starts_with(&format!("Block({} bytes)", block.size())));
        assert!(text.contains("Header(0x"));
        assert!(text.contains("Transactions: [Tx(0x"));
    }
}
