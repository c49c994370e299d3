pub mod decode;
pub mod encode;
pub mod f16;

use num_bigint::BigUint;

use std::fmt;

/// Tag wrapping a byte string holding a positive arbitrary-precision
/// integer (RFC 7049 §2.4.2).
pub const TAG_BIGNUM_POS: u64 = 2;
/// Tag wrapping a byte string holding the magnitude of `-1 - n` for a
/// negative arbitrary-precision integer.
pub const TAG_BIGNUM_NEG: u64 = 3;
/// Tag wrapping an `[exponent, mantissa]` decimal fraction.
pub const TAG_DECIMAL_FRACTION: u64 = 4;
/// The "self-describe CBOR" tag, transparent on decode.
pub const TAG_SELF_DESCRIBE: u64 = 55799;

/// The CBOR items this codec produces and consumes. This is the sole
/// interface to the byte serializer; the expression encoder and decoder
/// never see raw bytes.
///
/// `Negative(n)` and `BigNeg(n)` denote the value `-1 - n`, mirroring the
/// wire representation. Maps preserve insertion order; the serializer
/// writes entries exactly as stored.
#[derive(Clone, PartialEq)]
pub enum Cbor {
  Unsigned(u64),
  Negative(u64),
  Bytes(Vec<u8>),
  String(String),
  Array(Vec<Cbor>),
  Map(Vec<(String, Cbor)>),
  Bool(bool),
  Null,
  F16(u16),
  F32(f32),
  F64(f64),
  BigPos(BigUint),
  BigNeg(BigUint),
  Tag(u64, Box<Cbor>),
}

impl fmt::Debug for Cbor {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Unsigned(x) => write!(f, "{}", x),
      Self::Negative(x) => write!(f, "{}", -1 - i128::from(*x)),
      Self::Bytes(x) => {
        write!(f, "h'")?;
        for b in x {
          write!(f, "{:02x}", b)?;
        }
        write!(f, "'")
      }
      Self::String(x) => write!(f, "{:?}", x),
      Self::Array(xs) => f.debug_list().entries(xs).finish(),
      Self::Map(kvs) => {
        f.debug_map().entries(kvs.iter().map(|(k, v)| (k, v))).finish()
      }
      Self::Bool(x) => write!(f, "{}", x),
      Self::Null => write!(f, "null"),
      Self::F16(bits) => write!(f, "f16(0x{:04x})", bits),
      Self::F32(x) => write!(f, "f32({:?})", x),
      Self::F64(x) => write!(f, "f64({:?})", x),
      Self::BigPos(x) => write!(f, "{}", x),
      Self::BigNeg(x) => write!(f, "-{}", x + 1u8),
      Self::Tag(tag, x) => write!(f, "{}({:?})", tag, x),
    }
  }
}
