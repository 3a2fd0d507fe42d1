//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use ledger_core::crypto::sign;
use ledger_core::{Address, Block, Clause, Hash256, Header, Keypair, PublicKey, Transaction, U256};

/// A test fixture with a deterministic signing identity.
pub struct TestFixture {
    pub keypair: Keypair,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Sign a transaction and attach the signature.
    pub fn sign(&self, tx: &Transaction) -> Transaction {
        tx.with_signature(sign(&self.keypair, tx))
    }

    /// Create a signed single-clause value transfer.
    pub fn make_transfer(&self, to: Address, value: u64, nonce: u64) -> Transaction {
        let tx = Transaction::builder()
            .clause(Clause::call(to).with_value(U256::from(value)))
            .gas_price(U256::from(1_000_000_000u64))
            .gas(21_000)
            .nonce(nonce)
            .build();
        self.sign(&tx)
    }

    /// Create a signed transaction paying `value` to every recipient.
    pub fn make_batch(&self, recipients: &[Address], value: u64, nonce: u64) -> Transaction {
        let mut builder = Transaction::builder()
            .gas_price(U256::from(1_000_000_000u64))
            .gas(21_000 + 16_000 * recipients.len() as u64)
            .nonce(nonce);
        for to in recipients {
            builder = builder.clause(Clause::call(*to).with_value(U256::from(value)));
        }
        self.sign(&builder.build())
    }

    /// Compose an unsigned block on top of `parent_id`.
    ///
    /// The header's transaction root is a placeholder; blocks composed here
    /// are never checked against it.
    pub fn make_block(&self, parent_id: Hash256, timestamp: u64, txs: Vec<Transaction>) -> Block {
        let header = Header::builder()
            .parent_id(parent_id)
            .timestamp(timestamp)
            .gas_limit(10_000_000)
            .gas_used(txs.iter().map(Transaction::gas).sum())
            .beneficiary(Address::from_bytes([0xbe; 20]))
            .build();
        Block::compose(header, txs)
    }

    /// Compose a block and sign its header.
    pub fn make_signed_block(
        &self,
        parent_id: Hash256,
        timestamp: u64,
        txs: Vec<Transaction>,
    ) -> Block {
        let block = self.make_block(parent_id, timestamp, txs);
        block.with_signature(sign(&self.keypair, block.header()))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// Deterministic recipient address number `i`.
pub fn recipient(i: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = i;
    Address::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::crypto::verify;

    #[test]
    fn test_fixture_transfer_is_signed() {
        let fixture = TestFixture::with_seed([0x42; 32]);
        let tx = fixture.make_transfer(recipient(1), 100, 0);

        assert!(tx.is_signed());
        verify(&fixture.public_key(), &tx, &tx.signature()).unwrap();
    }

    #[test]
    fn test_fixture_batch_gas() {
        let fixture = TestFixture::new();
        let tx = fixture.make_batch(&[recipient(1), recipient(2), recipient(3)], 5, 0);

        assert_eq!(tx.clause_count(), 3);
        assert_eq!(tx.intrinsic_gas(), Ok(21_000 + 2 * 16_000));
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);

        // Same content signed by different parties: one signing hash.
        let txs: Vec<_> = parties
            .iter()
            .map(|p| p.make_transfer(recipient(1), 10, 0))
            .collect();
        assert_eq!(txs[0].signing_hash(), txs[1].signing_hash());
        assert_ne!(txs[0].hash(), txs[1].hash());
    }

    #[test]
    fn test_fixture_signed_block() {
        let fixture = TestFixture::with_seed([0x07; 32]);
        let tx = fixture.make_transfer(recipient(9), 1, 0);
        let block = fixture.make_signed_block(Hash256::from_bytes([0u8; 32]), 10, vec![tx]);

        let header = block.header();
        verify(&fixture.public_key(), header, &header.signature()).unwrap();
    }
}
