// crates/truth-gate-core/src/core/hashing.rs
// ============================================================================
// Module: Truth Gate Canonical Hashing
// Description: RFC 8785 canonical JSON hashing and evidence chain hashes.
// Purpose: Provide deterministic digests for evidence payloads and chains.
// Dependencies: serde, serde_jcs, serde_json, sha2
// ============================================================================

//! ## Overview
//! All evidence hashing goes through canonical JSON (RFC 8785) so digests are
//! independent of key ordering and numeric spelling. The chain hash binds a
//! payload to its predecessor, timestamp, and producing agent, making the
//! ledger tamper-evident under recomputation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use serde::ser::SerializeStruct;
use serde::ser::SerializeStructVariant;
use serde::ser::SerializeTuple;
use serde::ser::SerializeTupleStruct;
use serde::ser::SerializeTupleVariant;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::identifiers::AgentName;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Algorithm and Digest
// ============================================================================

/// Default hash algorithm for evidence payloads and chains.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

/// Supported hash algorithms.
///
/// # Invariants
/// - Variants are stable for serialization and offline verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the stable string label for the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hash digest with its producing algorithm.
///
/// # Invariants
/// - `value` is lowercase hex of the raw digest bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm that produced the digest.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest value.
    pub value: String,
}

impl HashDigest {
    /// Creates a digest from raw bytes, encoding as lowercase hex.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        let mut value = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            value.push_str(&format!("{byte:02x}"));
        }
        Self {
            algorithm,
            value,
        }
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.value)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Hashing errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HashError {
    /// Canonicalization failed (non-finite floats or unserializable input).
    #[error("canonicalization failure: {0}")]
    Canonicalization(String),
    /// Canonical payload exceeds the configured size limit.
    #[error("canonical payload too large: {actual} > {limit}")]
    SizeLimitExceeded {
        /// Maximum allowed canonical bytes.
        limit: usize,
        /// Actual canonical byte length.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Float Guard
// ============================================================================

/// Error raised by the float guard during value traversal.
#[derive(Debug)]
struct FloatGuardError(String);

impl fmt::Display for FloatGuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for FloatGuardError {}

impl serde::ser::Error for FloatGuardError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

/// Serializer that traverses a value and rejects non-finite floats.
///
/// `serde_jcs` inherits serde_json's float handling and writes NaN and the
/// infinities as `null`; the guard runs before canonicalization so those
/// values surface as [`HashError::Canonicalization`] instead of being
/// silently rewritten.
struct FloatGuard;

/// Compound-type walker for [`FloatGuard`].
struct FloatGuardCompound;

impl serde::Serializer for FloatGuard {
    type Ok = ();
    type Error = FloatGuardError;
    type SerializeSeq = FloatGuardCompound;
    type SerializeTuple = FloatGuardCompound;
    type SerializeTupleStruct = FloatGuardCompound;
    type SerializeTupleVariant = FloatGuardCompound;
    type SerializeMap = FloatGuardCompound;
    type SerializeStruct = FloatGuardCompound;
    type SerializeStructVariant = FloatGuardCompound;

    fn serialize_bool(self, _v: bool) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), FloatGuardError> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(FloatGuardError(format!("non-finite float {v}")))
        }
    }

    fn serialize_f64(self, v: f64) -> Result<(), FloatGuardError> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(FloatGuardError(format!("non-finite float {v}")))
        }
    }

    fn serialize_char(self, _v: char) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), FloatGuardError> {
        value.serialize(Self)
    }

    fn serialize_unit(self) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), FloatGuardError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(Self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(Self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<FloatGuardCompound, FloatGuardError> {
        Ok(FloatGuardCompound)
    }

    fn serialize_tuple(self, _len: usize) -> Result<FloatGuardCompound, FloatGuardError> {
        Ok(FloatGuardCompound)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<FloatGuardCompound, FloatGuardError> {
        Ok(FloatGuardCompound)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<FloatGuardCompound, FloatGuardError> {
        Ok(FloatGuardCompound)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<FloatGuardCompound, FloatGuardError> {
        Ok(FloatGuardCompound)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<FloatGuardCompound, FloatGuardError> {
        Ok(FloatGuardCompound)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<FloatGuardCompound, FloatGuardError> {
        Ok(FloatGuardCompound)
    }
}

impl SerializeSeq for FloatGuardCompound {
    type Ok = ();
    type Error = FloatGuardError;

    fn serialize_element<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(FloatGuard)
    }

    fn end(self) -> Result<(), FloatGuardError> {
        Ok(())
    }
}

impl SerializeTuple for FloatGuardCompound {
    type Ok = ();
    type Error = FloatGuardError;

    fn serialize_element<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(FloatGuard)
    }

    fn end(self) -> Result<(), FloatGuardError> {
        Ok(())
    }
}

impl SerializeTupleStruct for FloatGuardCompound {
    type Ok = ();
    type Error = FloatGuardError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(FloatGuard)
    }

    fn end(self) -> Result<(), FloatGuardError> {
        Ok(())
    }
}

impl SerializeTupleVariant for FloatGuardCompound {
    type Ok = ();
    type Error = FloatGuardError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(FloatGuard)
    }

    fn end(self) -> Result<(), FloatGuardError> {
        Ok(())
    }
}

impl SerializeMap for FloatGuardCompound {
    type Ok = ();
    type Error = FloatGuardError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), FloatGuardError> {
        key.serialize(FloatGuard)
    }

    fn serialize_value<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(FloatGuard)
    }

    fn end(self) -> Result<(), FloatGuardError> {
        Ok(())
    }
}

impl SerializeStruct for FloatGuardCompound {
    type Ok = ();
    type Error = FloatGuardError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(FloatGuard)
    }

    fn end(self) -> Result<(), FloatGuardError> {
        Ok(())
    }
}

impl SerializeStructVariant for FloatGuardCompound {
    type Ok = ();
    type Error = FloatGuardError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), FloatGuardError> {
        value.serialize(FloatGuard)
    }

    fn end(self) -> Result<(), FloatGuardError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Hash Functions
// ============================================================================

/// Hashes raw bytes with the selected algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let digest = Sha256::digest(bytes);
            HashDigest::new(algorithm, &digest)
        }
    }
}

/// Serializes a value to RFC 8785 canonical JSON bytes.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when the value cannot be
/// canonicalized (for example non-finite floats).
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, HashError> {
    value
        .serialize(FloatGuard)
        .map_err(|err| HashError::Canonicalization(err.to_string()))?;
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes a value's canonical JSON form.
///
/// # Errors
///
/// Returns [`HashError`] when canonicalization fails.
pub fn hash_canonical_json<T: Serialize>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes a value's canonical JSON form with a size limit.
///
/// # Errors
///
/// Returns [`HashError`] when canonicalization fails or the canonical form
/// exceeds `max_bytes`.
pub fn hash_canonical_json_with_limit<T: Serialize>(
    algorithm: HashAlgorithm,
    value: &T,
    max_bytes: usize,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    if bytes.len() > max_bytes {
        return Err(HashError::SizeLimitExceeded {
            limit: max_bytes,
            actual: bytes.len(),
        });
    }
    Ok(hash_bytes(algorithm, &bytes))
}

/// Computes the evidence chain hash binding a payload to its predecessor.
///
/// The chain input is `canonical(payload) || prev || timestamp || producer`,
/// with stable separators so field boundaries cannot be confused.
///
/// # Errors
///
/// Returns [`HashError`] when the payload cannot be canonicalized.
pub fn chain_hash<T: Serialize>(
    algorithm: HashAlgorithm,
    payload: &T,
    prev_hash: &str,
    recorded_at: Timestamp,
    producer: AgentName,
) -> Result<HashDigest, HashError> {
    let payload_bytes = canonical_json_bytes(payload)?;
    let mut input = Vec::with_capacity(payload_bytes.len() + 96);
    input.extend_from_slice(&payload_bytes);
    input.push(0x1e);
    input.extend_from_slice(prev_hash.as_bytes());
    input.push(0x1e);
    input.extend_from_slice(recorded_at.chain_repr().as_bytes());
    input.push(0x1e);
    input.extend_from_slice(producer.as_str().as_bytes());
    Ok(hash_bytes(algorithm, &input))
}
