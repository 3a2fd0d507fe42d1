//! Error types for the ledger core.

use thiserror::Error;

/// Errors produced while decoding canonical bytes.
///
/// Decoding never yields a partially-built value: every path that returns
/// one of these has discarded whatever it had parsed so far.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed CBOR: {0}")]
    Cbor(String),

    #[error("unexpected type: expected {expected}")]
    UnexpectedType { expected: &'static str },

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("integer out of range")]
    IntegerOutOfRange,

    #[error("non-canonical encoding")]
    NonCanonical,

    #[error("trailing bytes after encoded value")]
    TrailingBytes,

    #[error("in field `{field}`: {source}")]
    InField {
        field: &'static str,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Attach the name of the field being decoded.
    pub fn in_field(self, field: &'static str) -> Self {
        DecodeError::InField {
            field,
            source: Box::new(self),
        }
    }
}

/// Errors produced by intrinsic gas accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GasError {
    #[error("intrinsic gas too large")]
    GasTooLarge,
}

/// Core errors surfaced by signing and the aggregate types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("gas error: {0}")]
    Gas(#[from] GasError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_field_display_nests() {
        let err = DecodeError::IntegerOutOfRange
            .in_field("gas")
            .in_field("transactions");
        assert_eq!(
            err.to_string(),
            "in field `transactions`: in field `gas`: integer out of range"
        );
    }

    #[test]
    fn test_core_error_from_gas() {
        let err: CoreError = GasError::GasTooLarge.into();
        assert!(matches!(err, CoreError::Gas(GasError::GasTooLarge)));
    }
}
