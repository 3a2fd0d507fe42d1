//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ledger_core::{Address, Block, Clause, Hash256, Header, Transaction, U256};

/// Generate a random Hash256.
pub fn hash256() -> impl Strategy<Value = Hash256> {
    any::<[u8; 32]>().prop_map(Hash256::from_bytes)
}

/// Generate a random Address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a U256 covering small, 64-bit and full-width values.
pub fn u256() -> impl Strategy<Value = U256> {
    prop_oneof![
        Just(U256::zero()),
        any::<u64>().prop_map(U256::from),
        any::<[u8; 32]>().prop_map(|b| U256::from_big_endian(&b)),
    ]
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a clause: a call or a contract creation.
pub fn clause() -> impl Strategy<Value = Clause> {
    (prop::option::of(address()), u256(), payload(64)).prop_map(|(to, value, data)| {
        let clause = match to {
            Some(addr) => Clause::call(addr),
            None => Clause::create(),
        };
        clause.with_value(value).with_data(data)
    })
}

/// Parameters for generating a transaction.
#[derive(Debug, Clone)]
pub struct TxParams {
    pub clauses: Vec<Clause>,
    pub gas_price: U256,
    pub gas: u64,
    pub nonce: u64,
    pub time_barrier: u64,
    pub depends_on: Option<Hash256>,
    pub signature: Vec<u8>,
}

impl Arbitrary for TxParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(clause(), 0..4),
            u256(),
            any::<u64>(),
            any::<u64>(),
            any::<u64>(),
            prop::option::of(hash256()),
            prop_oneof![Just(Vec::new()), payload(65)],
        )
            .prop_map(
                |(clauses, gas_price, gas, nonce, time_barrier, depends_on, signature)| TxParams {
                    clauses,
                    gas_price,
                    gas,
                    nonce,
                    time_barrier,
                    depends_on,
                    signature,
                },
            )
            .boxed()
    }
}

/// Build a transaction from parameters.
pub fn transaction_from_params(params: &TxParams) -> Transaction {
    let mut builder = Transaction::builder()
        .gas_price(params.gas_price)
        .gas(params.gas)
        .nonce(params.nonce)
        .time_barrier(params.time_barrier);

    for clause in &params.clauses {
        builder = builder.clause(clause.clone());
    }
    if let Some(dep) = params.depends_on {
        builder = builder.depends_on(dep);
    }

    builder.build().with_signature(params.signature.clone())
}

/// Generate a transaction.
pub fn transaction() -> impl Strategy<Value = Transaction> {
    any::<TxParams>().prop_map(|p| transaction_from_params(&p))
}

/// Generate a header, signed or not.
pub fn header() -> impl Strategy<Value = Header> {
    (
        (hash256(), any::<u64>(), any::<u64>(), address(), any::<u64>()),
        (any::<u64>(), hash256(), hash256(), hash256()),
        prop_oneof![Just(Vec::new()), payload(65)],
    )
        .prop_map(
            |(
                (parent_id, timestamp, gas_limit, beneficiary, gas_used),
                (total_score, txs_root, state_root, receipts_root),
                signature,
            )| {
                Header::builder()
                    .parent_id(parent_id)
                    .timestamp(timestamp)
                    .gas_limit(gas_limit)
                    .beneficiary(beneficiary)
                    .gas_used(gas_used)
                    .total_score(total_score)
                    .txs_root(txs_root)
                    .state_root(state_root)
                    .receipts_root(receipts_root)
                    .build()
                    .with_signature(signature)
            },
        )
}

/// Generate a block with up to `max_txs` transactions.
pub fn block(max_txs: usize) -> impl Strategy<Value = Block> {
    (header(), prop::collection::vec(transaction(), 0..=max_txs))
        .prop_map(|(header, txs)| Block::compose(header, txs))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_transaction_hash_deterministic(params: TxParams) {
            let t1 = transaction_from_params(&params);
            let t2 = transaction_from_params(&params);

            prop_assert_eq!(t1.hash(), t2.hash());
            prop_assert_eq!(t1.encode_to_vec(), t2.encode_to_vec());
        }

        #[test]
        fn test_signature_does_not_change_signing_hash(
            params: TxParams,
            sig in payload(65),
        ) {
            let tx = transaction_from_params(&params);
            prop_assert_eq!(tx.with_signature(sig).signing_hash(), tx.signing_hash());
        }

        #[test]
        fn test_nonce_changes_hash(params: TxParams, other in any::<u64>()) {
            prop_assume!(params.nonce != other);

            let t1 = transaction_from_params(&params);
            let t2 = transaction_from_params(&TxParams { nonce: other, ..params.clone() });

            prop_assert_ne!(t1.hash(), t2.hash());
            prop_assert_ne!(t1.signing_hash(), t2.signing_hash());
        }
    }
}
