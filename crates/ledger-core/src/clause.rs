//! Clause: one action within a multi-clause transaction.

use bytes::Bytes;
use ciborium::value::Value;
use primitive_types::U256;

use crate::canonical::{
    decode_field, encode_array_header, expect_array, Decode, Encode, EncodeSink,
};
use crate::error::DecodeError;
use crate::types::Address;

/// A single action: a value transfer and/or a contract call, or a contract
/// creation when there is no recipient.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clause {
    to: Option<Address>,
    value: U256,
    data: Bytes,
}

impl Clause {
    /// A clause addressed to `to`.
    pub fn call(to: Address) -> Self {
        Self {
            to: Some(to),
            ..Self::default()
        }
    }

    /// A contract-creation clause (no recipient).
    pub fn create() -> Self {
        Self::default()
    }

    /// Set the transferred value.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the call data or creation code.
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// The recipient, `None` for contract creation.
    pub fn to(&self) -> Option<&Address> {
        self.to.as_ref()
    }

    /// The transferred value.
    pub fn value(&self) -> U256 {
        self.value
    }

    /// The data payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// True if this clause creates a contract.
    pub fn is_creation(&self) -> bool {
        self.to.is_none()
    }
}

impl Encode for Clause {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_array_header(out, 3);
        self.to.encode(out);
        self.value.encode(out);
        self.data.encode(out);
    }
}

impl Decode for Clause {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let items = expect_array(value, 3)?;
        Ok(Self {
            to: decode_field(&items[0], "to")?,
            value: decode_field(&items[1], "value")?,
            data: decode_field(&items[2], "data")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::decode;

    #[test]
    fn test_clause_creation_flag() {
        assert!(Clause::create().is_creation());
        assert!(!Clause::call(Address::from_bytes([0x11; 20])).is_creation());
    }

    #[test]
    fn test_clause_encoding_layout() {
        let clause = Clause::call(Address::from_bytes([0x11; 20]))
            .with_value(U256::from(1u64))
            .with_data(vec![0xab]);
        let bytes = clause.to_canonical_bytes();

        let mut expected = vec![0x83, 0x54];
        expected.extend_from_slice(&[0x11; 20]);
        expected.extend_from_slice(&[0x41, 0x01, 0x41, 0xab]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_creation_clause_encodes_null_recipient() {
        let bytes = Clause::create().to_canonical_bytes();
        assert_eq!(bytes, vec![0x83, 0xf6, 0x40, 0x40]);

        let decoded: Clause = decode(&bytes).unwrap();
        assert!(decoded.is_creation());
    }

    #[test]
    fn test_clause_rejects_short_recipient() {
        let bytes = vec![0x83, 0x42, 0x11, 0x11, 0x40, 0x40];
        let err = decode::<Clause>(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::InField { field: "to", .. }));
    }
}
