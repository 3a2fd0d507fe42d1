//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements the RFC 8949 core deterministic subset the ledger
//! needs:
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Aggregates are arrays in field order (no maps)
//! - An absent optional field is `null`
//! - 256-bit integers are minimal big-endian byte strings (zero is empty)
//!
//! The same bytes feed the wire, the hash accumulator and the block size
//! counter, so encoding is written against [`EncodeSink`] and never has to
//! materialize a buffer unless the caller asks for one.

use bytes::Bytes;
use ciborium::value::Value;
use primitive_types::U256;

use crate::error::DecodeError;
use crate::types::{Address, Hash256, ADDRESS_LEN, HASH_LEN};

/// CBOR major types used by the ledger encoding.
mod major {
    pub const UINT: u8 = 0;
    pub const BYTES: u8 = 2;
    pub const ARRAY: u8 = 4;
}

/// The CBOR `null` simple value, used as the absent marker.
const NULL: u8 = 0xf6;

/// Sink for writing encoded bytes.
///
/// Implemented by byte buffers, the size counter and the hash accumulator.
pub trait EncodeSink {
    /// Writes the given bytes to the sink.
    fn write(&mut self, bytes: &[u8]);
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Counts encoded bytes without storing them.
#[derive(Debug, Default)]
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self { len: 0 }
    }

    /// Returns the total number of bytes counted.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl EncodeSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

/// Types with a canonical encoding.
pub trait Encode {
    /// Stream the canonical encoding into `out`.
    fn encode<S: EncodeSink>(&self, out: &mut S);

    /// Length of the canonical encoding, counted without allocating.
    fn encoded_len(&self) -> usize {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);
        counter.len()
    }

    /// Encode into a new buffer with exact capacity.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf
    }
}

/// Types that can be rebuilt from a parsed CBOR value.
pub trait Decode: Sized {
    /// Convert a parsed CBOR value into `Self`.
    fn from_value(value: &Value) -> Result<Self, DecodeError>;
}

/// Decode a value from canonical bytes.
///
/// The input is parsed into a value tree, converted into a fresh `T`, and
/// then re-encoded: anything that does not reproduce the input byte-for-byte
/// is rejected, so two distinct byte strings never decode to the same value.
pub fn decode<T: Decode + Encode>(bytes: &[u8]) -> Result<T, DecodeError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| DecodeError::Cbor(e.to_string()))?;
    let decoded = T::from_value(&value)?;

    let reencoded = decoded.to_canonical_bytes();
    if reencoded.len() < bytes.len() && bytes.starts_with(&reencoded) {
        return Err(DecodeError::TrailingBytes);
    }
    if reencoded != bytes {
        return Err(DecodeError::NonCanonical);
    }
    Ok(decoded)
}

/// Encode an unsigned integer argument with the given major type.
fn encode_head<S: EncodeSink>(out: &mut S, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        out.write(&[mt | (n as u8)]);
    } else if n <= 0xff {
        out.write(&[mt | 24, n as u8]);
    } else if n <= 0xffff {
        out.write(&[mt | 25]);
        out.write(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        out.write(&[mt | 26]);
        out.write(&(n as u32).to_be_bytes());
    } else {
        out.write(&[mt | 27]);
        out.write(&n.to_be_bytes());
    }
}

/// Encode an unsigned integer (major type 0).
pub fn encode_uint<S: EncodeSink>(out: &mut S, n: u64) {
    encode_head(out, major::UINT, n);
}

/// Encode a byte string (major type 2).
pub fn encode_bytes<S: EncodeSink>(out: &mut S, bytes: &[u8]) {
    encode_head(out, major::BYTES, bytes.len() as u64);
    out.write(bytes);
}

/// Encode an array header (major type 4). The caller writes `len` items.
pub fn encode_array_header<S: EncodeSink>(out: &mut S, len: usize) {
    encode_head(out, major::ARRAY, len as u64);
}

/// Encode the absent marker.
pub fn encode_null<S: EncodeSink>(out: &mut S) {
    out.write(&[NULL]);
}

impl Encode for u64 {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_uint(out, *self);
    }
}

impl Encode for U256 {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        let mut buf = [0u8; 32];
        self.to_big_endian(&mut buf);
        let skip = (self.leading_zeros() / 8) as usize;
        encode_bytes(out, &buf[skip..]);
    }
}

impl Encode for Bytes {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_bytes(out, self);
    }
}

impl Encode for Hash256 {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_bytes(out, &self.0);
    }
}

impl Encode for Address {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_bytes(out, &self.0);
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        match self {
            Some(value) => value.encode(out),
            None => encode_null(out),
        }
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_array_header(out, self.len());
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.as_slice().encode(out);
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        (**self).encode(out);
    }
}

/// Borrow the items of an array value, checking its length.
pub fn expect_array(value: &Value, len: usize) -> Result<&[Value], DecodeError> {
    match value {
        Value::Array(items) if items.len() == len => Ok(items),
        Value::Array(items) => Err(DecodeError::InvalidLength {
            expected: len,
            got: items.len(),
        }),
        _ => Err(DecodeError::UnexpectedType { expected: "array" }),
    }
}

/// Decode one named element of an array, tagging errors with the field name.
pub fn decode_field<T: Decode>(value: &Value, field: &'static str) -> Result<T, DecodeError> {
    T::from_value(value).map_err(|e| e.in_field(field))
}

fn expect_bytes(value: &Value) -> Result<&[u8], DecodeError> {
    match value {
        Value::Bytes(b) => Ok(b.as_slice()),
        _ => Err(DecodeError::UnexpectedType {
            expected: "byte string",
        }),
    }
}

fn decode_fixed<const N: usize>(value: &Value) -> Result<[u8; N], DecodeError> {
    let bytes = expect_bytes(value)?;
    bytes.try_into().map_err(|_| DecodeError::InvalidLength {
        expected: N,
        got: bytes.len(),
    })
}

impl Decode for u64 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Integer(i) => u64::try_from(*i).map_err(|_| DecodeError::IntegerOutOfRange),
            _ => Err(DecodeError::UnexpectedType {
                expected: "unsigned integer",
            }),
        }
    }
}

impl Decode for U256 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let bytes = expect_bytes(value)?;
        if bytes.len() > 32 {
            return Err(DecodeError::IntegerOutOfRange);
        }
        if bytes.first() == Some(&0) {
            return Err(DecodeError::NonCanonical);
        }
        Ok(U256::from_big_endian(bytes))
    }
}

impl Decode for Bytes {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        expect_bytes(value).map(Bytes::copy_from_slice)
    }
}

impl Decode for Hash256 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        decode_fixed::<HASH_LEN>(value).map(Hash256)
    }
}

impl Decode for Address {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        decode_fixed::<ADDRESS_LEN>(value).map(Address)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => Err(DecodeError::UnexpectedType { expected: "array" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bytes_of<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
        let mut buf = Vec::new();
        value.encode(&mut buf);
        buf
    }

    #[test]
    fn test_integer_encoding() {
        // Test smallest encoding for various integer sizes
        assert_eq!(bytes_of(&0u64), vec![0x00]);
        assert_eq!(bytes_of(&23u64), vec![0x17]);
        assert_eq!(bytes_of(&24u64), vec![0x18, 24]);
        assert_eq!(bytes_of(&255u64), vec![0x18, 255]);
        assert_eq!(bytes_of(&256u64), vec![0x19, 0x01, 0x00]);
        assert_eq!(bytes_of(&65535u64), vec![0x19, 0xff, 0xff]);
        assert_eq!(bytes_of(&21000u64), vec![0x19, 0x52, 0x08]);
        assert_eq!(bytes_of(&65536u64), vec![0x1a, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            bytes_of(&u64::MAX),
            vec![0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_u256_is_minimal_big_endian() {
        assert_eq!(bytes_of(&U256::zero()), vec![0x40]);
        assert_eq!(bytes_of(&U256::from(1u64)), vec![0x41, 0x01]);
        assert_eq!(bytes_of(&U256::from(0x0100u64)), vec![0x42, 0x01, 0x00]);

        let max = bytes_of(&U256::MAX);
        assert_eq!(max.len(), 2 + 32);
        assert_eq!(&max[..2], &[0x58, 32]);
    }

    #[test]
    fn test_option_uses_null_marker() {
        let absent: Option<Hash256> = None;
        assert_eq!(bytes_of(&absent), vec![0xf6]);

        // A zero hash is still a real value, not the absent marker.
        let zero = Some(Hash256::from_bytes([0u8; 32]));
        let encoded = bytes_of(&zero);
        assert_eq!(encoded[0], 0x58);
        assert_eq!(encoded.len(), 2 + 32);
    }

    #[test]
    fn test_size_counter_matches_buffer() {
        let items = vec![1u64, 300, 70000, u64::MAX];
        assert_eq!(items.encoded_len(), items.to_canonical_bytes().len());
    }

    #[test]
    fn test_decode_rejects_non_minimal_integer() {
        // 5 encoded with a one-byte argument instead of inline
        let err = decode::<u64>(&[0x18, 0x05]).unwrap_err();
        assert_eq!(err, DecodeError::NonCanonical);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let err = decode::<u64>(&[0x05, 0x00]).unwrap_err();
        assert_eq!(err, DecodeError::TrailingBytes);
    }

    #[test]
    fn test_decode_rejects_u256_leading_zero() {
        let err = decode::<U256>(&[0x42, 0x00, 0x01]).unwrap_err();
        assert_eq!(err, DecodeError::NonCanonical);
    }

    #[test]
    fn test_decode_rejects_oversized_u256() {
        let mut input = vec![0x58, 33];
        input.extend_from_slice(&[0xff; 33]);
        let err = decode::<U256>(&input).unwrap_err();
        assert_eq!(err, DecodeError::IntegerOutOfRange);
    }

    #[test]
    fn test_decode_truncated_input() {
        // Byte string announcing 32 bytes, only 2 present
        let err = decode::<Hash256>(&[0x58, 32, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::Cbor(_)));
    }

    #[test]
    fn test_expect_array_length() {
        let value = Value::Array(vec![Value::Null]);
        assert!(expect_array(&value, 1).is_ok());
        assert_eq!(
            expect_array(&value, 2).unwrap_err(),
            DecodeError::InvalidLength {
                expected: 2,
                got: 1
            }
        );
    }

    proptest! {
        #[test]
        fn test_u64_roundtrip(n: u64) {
            prop_assert_eq!(decode::<u64>(&bytes_of(&n)).unwrap(), n);
        }

        #[test]
        fn test_u256_roundtrip(raw: [u8; 32]) {
            let n = U256::from_big_endian(&raw);
            let bytes = bytes_of(&n);
            prop_assert!(bytes.len() <= 2 + 32);
            prop_assert_eq!(decode::<U256>(&bytes).unwrap(), n);
        }

        #[test]
        fn test_size_counter_matches_buffer_for_bytes_and_uint(data: Vec<u8>, n: u64) {
            let mut counter = SizeCounter::new();
            Bytes::from(data.clone()).encode(&mut counter);
            n.encode(&mut counter);

            let mut buf = Vec::new();
            Bytes::from(data).encode(&mut buf);
            n.encode(&mut buf);
            prop_assert_eq!(counter.len(), buf.len());
        }
    }
}
