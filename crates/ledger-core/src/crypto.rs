//! Cryptographic primitives for the ledger.
//!
//! Wraps Blake3 hashing and Ed25519 signing with strong types. Hashing is
//! streaming: canonical encodings are written straight into the hasher.

use bytes::Bytes;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::{Encode, EncodeSink};
use crate::error::CoreError;
use crate::types::Hash256;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Streaming 256-bit hash accumulator (Blake3).
#[derive(Clone, Default)]
pub struct Hasher {
    inner: blake3::Hasher,
}

impl Hasher {
    /// Creates a hasher with empty state.
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Feeds data into the hash computation.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Consumes the hasher and returns the final hash.
    pub fn finalize(self) -> Hash256 {
        Hash256(*self.inner.finalize().as_bytes())
    }
}

impl EncodeSink for Hasher {
    fn write(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }
}

impl Hash256 {
    /// Hash raw bytes.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash the canonical encoding of `value` without materializing it.
    pub fn of<E: Encode + ?Sized>(value: &E) -> Self {
        let mut hasher = Hasher::new();
        value.encode(&mut hasher);
        hasher.finalize()
    }
}

/// Entities whose content can be signed.
///
/// The signing hash covers every field except the signature itself, so it is
/// unchanged when a signature is attached or replaced.
pub trait Signable {
    /// Hash of the entity's content, excluding its signature.
    fn signing_hash(&self) -> Hash256;
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CoreError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;

        let sig_bytes: [u8; SIGNATURE_LEN] = signature
            .try_into()
            .map_err(|_| CoreError::InvalidSignature)?;
        let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A keypair for signing ledger entities.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Bytes {
        let sig = self.signing_key.sign(message);
        Bytes::copy_from_slice(&sig.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

/// Sign any signable entity. Attach the result with the entity's
/// `with_signature`.
pub fn sign<T: Signable + ?Sized>(keypair: &Keypair, entity: &T) -> Bytes {
    keypair.sign(entity.signing_hash().as_bytes())
}

/// Verify a signature over any signable entity.
pub fn verify<T: Signable + ?Sized>(
    public_key: &PublicKey,
    entity: &T,
    signature: &[u8],
) -> Result<(), CoreError> {
    public_key.verify(entity.signing_hash().as_bytes(), signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note(&'static [u8]);

    impl Signable for Note {
        fn signing_hash(&self) -> Hash256 {
            Hash256::hash(self.0)
        }
    }

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message);
        assert_eq!(signature.len(), SIGNATURE_LEN);

        // Valid signature should verify
        keypair
            .public_key()
            .verify(message, &signature)
            .expect("valid signature should verify");

        // Tampered message should fail
        let tampered = b"hello worlD";
        assert!(keypair.public_key().verify(tampered, &signature).is_err());
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn test_verify_rejects_short_signature() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let err = keypair.public_key().verify(b"msg", &[0u8; 10]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSignature));
    }

    #[test]
    fn test_generic_sign_verify() {
        let keypair = Keypair::from_seed(&[0x07; 32]);
        let note = Note(b"clause bundle");
        let signature = sign(&keypair, &note);

        verify(&keypair.public_key(), &note, &signature).unwrap();
        assert!(verify(&keypair.public_key(), &Note(b"other"), &signature).is_err());
    }

    #[test]
    fn test_streaming_hash_matches_one_shot() {
        let value = vec![1u64, 2, 3];
        let bytes = value.to_canonical_bytes();
        assert_eq!(Hash256::of(&value), Hash256::hash(&bytes));
    }

    #[test]
    fn test_hasher_chunking() {
        let mut hasher = Hasher::new();
        hasher.update(b"test ");
        hasher.update(b"data");
        assert_eq!(hasher.finalize(), Hash256::hash(b"test data"));
    }
}
