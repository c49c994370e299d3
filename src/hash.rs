//! Semantic integrity hashing.
//!
//! An expression's content address is the sha2-256 multihash of its
//! serialized encoding: two prefix bytes (`0x12` for sha2-256, `0x20` for
//! the 32-byte length) followed by the raw digest. The same 34-byte form
//! is what an import's hash field carries on the wire.

use crate::expr::Expr;

use multihash::Multihash;
use multihash_codetable::{
  Code,
  MultihashDigest,
};

/// Multihash code of sha2-256.
pub const SHA256_CODE: u64 = 0x12;
/// Byte length of a sha2-256 digest.
pub const SHA256_LEN: usize = 32;

/// Wraps a raw digest into the multihash form the wire carries.
pub fn wrap_digest(digest: &[u8; SHA256_LEN]) -> Vec<u8> {
  Multihash::<SHA256_LEN>::wrap(SHA256_CODE, digest)
    .unwrap()
    .to_bytes()
}

/// Validates a wire hash field and extracts the raw digest. `None` for
/// anything that is not exactly a sha2-256 multihash.
pub fn unwrap_digest(bytes: &[u8]) -> Option<[u8; SHA256_LEN]> {
  if bytes.len() != 2 + SHA256_LEN {
    return None;
  }
  let multihash = Multihash::<SHA256_LEN>::from_bytes(bytes).ok()?;
  if multihash.code() != SHA256_CODE
    || multihash.size() as usize != SHA256_LEN
  {
    return None;
  }
  multihash.digest().try_into().ok()
}

/// The content address of an expression. Callers hashing for cache keys
/// or import verification must resolve and normalize first; this function
/// hashes whatever tree it is given.
pub fn semantic_hash(expr: &Expr) -> Multihash<64> {
  Code::Sha2_256.digest(&expr.to_cbor().to_bytes())
}
