//! Structural fingerprints for atoms.
//!
//! Every atom carries a 256‑bit fingerprint computed once at construction from
//! its kind tag, its type's fingerprint and the fingerprints of its children
//! (Merkle style). Structural equality of atoms is fingerprint equality, and the
//! constant pools used by commutative matching are keyed by fingerprint.
//!
//! # Citations
//! - SHA-256: NIST FIPS 180-4 (2015)
//! - Domain separation & length prefixing: Bernstein et al., "How to hash into elliptic curves" (2009)
//! - Hash-consing of terms: Filliâtre & Conchon, "Type-safe modular hash-consing" (2006)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 256‑bit hash value.
///
/// Wraps a byte array for type safety. Ordering is bytewise, which gives
/// constant pools a deterministic iteration order.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashValue(pub [u8; 32]);

impl HashValue {
    /// Creates a zero hash (all zeros).
    #[inline]
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Creates a hash from a raw byte array.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw byte array.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Computes SHA‑256 of the given data with domain separation.
    ///
    /// Domain separation prefix is applied as `b"ACT:<domain>:v1" || length_prefix(data) || data`.
    /// Length prefix is a 64‑bit little‑endian count of bytes.
    pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"ACT:");
        hasher.update(domain);
        hasher.update(b":v1");
        let len = data.len() as u64;
        hasher.update(len.to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }
}

impl std::fmt::Display for HashValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HashValue({:02x}{:02x}{:02x}{:02x}…)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Incremental builder for a domain-separated fingerprint.
///
/// Variable-length fields (strings, child lists) are length prefixed so that
/// adjacent fields cannot be confused with one another.
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    domain: &'static [u8],
    data: Vec<u8>,
}

impl FingerprintBuilder {
    /// Starts a fingerprint in the given hash domain.
    pub fn new(domain: &'static [u8]) -> Self {
        Self {
            domain,
            data: Vec::with_capacity(128),
        }
    }

    /// Appends a single tag byte.
    pub fn tag(mut self, tag: u8) -> Self {
        self.data.push(tag);
        self
    }

    /// Appends a 64-bit little-endian integer.
    pub fn u64(mut self, value: u64) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Appends a length-prefixed byte string.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
        self.data.extend_from_slice(bytes);
        self
    }

    /// Appends a length-prefixed UTF-8 string.
    pub fn str(self, s: &str) -> Self {
        self.bytes(s.as_bytes())
    }

    /// Appends another fingerprint.
    pub fn hash(mut self, hash: &HashValue) -> Self {
        self.data.extend_from_slice(hash.as_bytes());
        self
    }

    /// Appends an optional fingerprint with a presence marker.
    pub fn optional(self, hash: Option<&HashValue>) -> Self {
        match hash {
            Some(hash) => self.tag(1).hash(hash),
            None => self.tag(0),
        }
    }

    /// Finishes the fingerprint.
    pub fn finish(self) -> HashValue {
        HashValue::hash_with_domain(self.domain, &self.data)
    }
}
