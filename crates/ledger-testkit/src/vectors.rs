//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical bytes and intrinsic gas of known
//! transactions, so every implementation of the encoding can be checked
//! against the same expected output.

use serde::Serialize;

use ledger_core::{Address, Clause, Hash256, Transaction, U256};

/// One clause of a golden vector. A `None` recipient creates a contract.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VectorClause {
    pub to: Option<[u8; 20]>,
    pub value: u64,
    pub data: &'static [u8],
}

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub clauses: &'static [VectorClause],
    pub gas_price: u64,
    pub gas: u64,
    pub nonce: u64,
    pub time_barrier: u64,
    pub depends_on: Option<[u8; 32]>,
    pub signature: &'static [u8],
    /// Expected canonical encoding (hex).
    pub expected_encoding: &'static str,
    /// Expected intrinsic gas under the protocol schedule.
    pub expected_intrinsic_gas: u64,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty unsigned transaction",
            clauses: &[],
            gas_price: 0,
            gas: 0,
            nonce: 0,
            time_barrier: 0,
            depends_on: None,
            signature: b"",
            expected_encoding: "878040000000f640",
            expected_intrinsic_gas: 21_000,
        },
        GoldenVector {
            name: "single value transfer",
            clauses: &[VectorClause {
                to: Some([0x11; 20]),
                value: 1_000,
                data: b"",
            }],
            gas_price: 1_000_000_000,
            gas: 21_000,
            nonce: 1,
            time_barrier: 0,
            depends_on: None,
            signature: b"",
            expected_encoding: "8781835411111111111111111111111111111111111111114203e840443b9aca001952080100f640",
            expected_intrinsic_gas: 21_000,
        },
        GoldenVector {
            name: "contract creation with dependency and signature",
            clauses: &[VectorClause {
                to: None,
                value: 0,
                data: &[0x60, 0x80, 0x60, 0x40],
            }],
            gas_price: 0,
            gas: 100_000,
            nonce: 0xdead_beef,
            time_barrier: 1_700_000_000,
            depends_on: Some([0xaa; 32]),
            signature: &[0x01, 0x02, 0x03, 0x04],
            expected_encoding: "878183f6404460806040401a000186a01adeadbeef1a6553f1005820aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa4401020304",
            expected_intrinsic_gas: 53_000 + 4 * 68,
        },
        GoldenVector {
            name: "two call clauses",
            clauses: &[
                VectorClause {
                    to: Some([0x22; 20]),
                    value: 0,
                    data: b"",
                },
                VectorClause {
                    to: Some([0x33; 20]),
                    value: 0,
                    data: &[0x00, 0x01],
                },
            ],
            gas_price: 1,
            gas: 50_000,
            nonce: 2,
            time_barrier: 0,
            depends_on: None,
            signature: b"",
            expected_encoding: "87828354222222222222222222222222222222222222222240408354333333333333333333333333333333333333333340420001410119c3500200f640",
            expected_intrinsic_gas: 21_000 + 16_000 + 4 + 68,
        },
    ]
}

/// Build the transaction described by a golden vector.
pub fn transaction_from_vector(vector: &GoldenVector) -> Transaction {
    let mut builder = Transaction::builder()
        .gas_price(U256::from(vector.gas_price))
        .gas(vector.gas)
        .nonce(vector.nonce)
        .time_barrier(vector.time_barrier);

    for vc in vector.clauses {
        let clause = match vc.to {
            Some(addr) => Clause::call(Address::from_bytes(addr)),
            None => Clause::create(),
        };
        let clause = clause
            .with_value(U256::from(vc.value))
            .with_data(vc.data.to_vec());
        builder = builder.clause(clause);
    }

    if let Some(dep) = vector.depends_on {
        builder = builder.depends_on(Hash256::from_bytes(dep));
    }

    builder.build().with_signature(vector.signature.to_vec())
}

/// Check every vector's encoding, and report its hash.
///
/// Returns (name, encoding matches, transaction hash hex).
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let tx = transaction_from_vector(v);
            let matches = hex::encode(tx.encode_to_vec()) == v.expected_encoding;
            (v.name.to_string(), matches, tx.hash().to_hex())
        })
        .collect()
}

/// All vectors as pretty-printed JSON, for other implementations to load.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_encode_as_expected() {
        for (name, matches, _) in verify_all_vectors() {
            assert!(matches, "Vector '{}' produced unexpected canonical bytes", name);
        }
    }

    #[test]
    fn test_vectors_intrinsic_gas() {
        for vector in all_vectors() {
            let tx = transaction_from_vector(&vector);
            assert_eq!(
                tx.intrinsic_gas(),
                Ok(vector.expected_intrinsic_gas),
                "Vector '{}' has unexpected intrinsic gas",
                vector.name
            );
        }
    }

    #[test]
    fn test_vectors_decode_to_same_transaction() {
        for vector in all_vectors() {
            let bytes = hex::decode(vector.expected_encoding).unwrap();
            let decoded = Transaction::decode(&bytes).unwrap();
            assert_eq!(decoded, transaction_from_vector(&vector), "Vector '{}'", vector.name);
        }
    }

    #[test]
    fn test_vectors_json_lists_every_vector() {
        let json: serde_json::Value = serde_json::from_str(&vectors_json().unwrap()).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), all_vectors().len());
        assert_eq!(entries[0]["expected_encoding"], "878040000000f640");
        assert_eq!(entries[2]["clauses"][0]["to"], serde_json::Value::Null);
    }

    #[test]
    fn test_vectors_are_deterministic() {
        // Generate each vector twice, verify identical results
        for vector in all_vectors() {
            let t1 = transaction_from_vector(&vector);
            let t2 = transaction_from_vector(&vector);
            assert_eq!(
                t1.hash(),
                t2.hash(),
                "Vector '{}' produced different hashes on regeneration",
                vector.name
            );
        }
    }
}
