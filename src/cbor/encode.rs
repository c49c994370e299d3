//! Serialization of the CBOR value model into bytes.
//!
//! Every item is written definite-length with the minimal argument width,
//! which is what makes the byte output (and therefore the semantic hash)
//! deterministic.

use crate::cbor::{
  Cbor,
  TAG_BIGNUM_NEG,
  TAG_BIGNUM_POS,
};

use byteorder::{
  BigEndian,
  ByteOrder,
};
use num_bigint::BigUint;

pub fn write_u8(w: &mut Vec<u8>, major: u8, value: u8) {
  if value <= 0x17 {
    w.push(major << 5 | value);
  }
  else {
    w.push(major << 5 | 24);
    w.push(value);
  }
}

pub fn write_u16(w: &mut Vec<u8>, major: u8, value: u16) {
  if let Ok(small) = u8::try_from(value) {
    write_u8(w, major, small);
  }
  else {
    let mut buf = [major << 5 | 25, 0, 0];
    BigEndian::write_u16(&mut buf[1..], value);
    w.extend_from_slice(&buf);
  }
}

pub fn write_u32(w: &mut Vec<u8>, major: u8, value: u32) {
  if let Ok(small) = u16::try_from(value) {
    write_u16(w, major, small);
  }
  else {
    let mut buf = [major << 5 | 26, 0, 0, 0, 0];
    BigEndian::write_u32(&mut buf[1..], value);
    w.extend_from_slice(&buf);
  }
}

pub fn write_u64(w: &mut Vec<u8>, major: u8, value: u64) {
  if let Ok(small) = u32::try_from(value) {
    write_u32(w, major, small);
  }
  else {
    let mut buf = [major << 5 | 27, 0, 0, 0, 0, 0, 0, 0, 0];
    BigEndian::write_u64(&mut buf[1..], value);
    w.extend_from_slice(&buf);
  }
}

pub fn write_tag(w: &mut Vec<u8>, tag: u64) {
  write_u64(w, 6, tag);
}

fn write_text(w: &mut Vec<u8>, text: &str) {
  write_u64(w, 3, text.len() as u64);
  w.extend_from_slice(text.as_bytes());
}

// Magnitude bytes of a bignum: big-endian, no leading zeros, empty for
// zero (RFC 7049 §2.4.2).
fn magnitude_bytes(n: &BigUint) -> Vec<u8> {
  let bytes = n.to_bytes_be();
  if bytes == [0] { Vec::new() } else { bytes }
}

impl Cbor {
  /// Serializes the value. Infallible: every value the model can hold has
  /// a byte representation.
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut w = Vec::new();
    self.write(&mut w);
    w
  }

  fn write(&self, w: &mut Vec<u8>) {
    match self {
      Self::Unsigned(x) => write_u64(w, 0, *x),
      Self::Negative(x) => write_u64(w, 1, *x),
      Self::Bytes(x) => {
        write_u64(w, 2, x.len() as u64);
        w.extend_from_slice(x);
      }
      Self::String(x) => write_text(w, x),
      Self::Array(xs) => {
        write_u64(w, 4, xs.len() as u64);
        for x in xs {
          x.write(w);
        }
      }
      Self::Map(kvs) => {
        write_u64(w, 5, kvs.len() as u64);
        for (k, v) in kvs {
          write_text(w, k);
          v.write(w);
        }
      }
      Self::Bool(x) => w.push(if *x { 0xf5 } else { 0xf4 }),
      Self::Null => w.push(0xf6),
      Self::F16(bits) => {
        let mut buf = [0xf9, 0, 0];
        BigEndian::write_u16(&mut buf[1..], *bits);
        w.extend_from_slice(&buf);
      }
      Self::F32(x) => {
        let mut buf = [0xfa, 0, 0, 0, 0];
        BigEndian::write_f32(&mut buf[1..], *x);
        w.extend_from_slice(&buf);
      }
      Self::F64(x) => {
        let mut buf = [0xfb, 0, 0, 0, 0, 0, 0, 0, 0];
        BigEndian::write_f64(&mut buf[1..], *x);
        w.extend_from_slice(&buf);
      }
      Self::BigPos(n) => {
        write_tag(w, TAG_BIGNUM_POS);
        let bytes = magnitude_bytes(n);
        write_u64(w, 2, bytes.len() as u64);
        w.extend_from_slice(&bytes);
      }
      Self::BigNeg(n) => {
        write_tag(w, TAG_BIGNUM_NEG);
        let bytes = magnitude_bytes(n);
        write_u64(w, 2, bytes.len() as u64);
        w.extend_from_slice(&bytes);
      }
      Self::Tag(tag, x) => {
        write_tag(w, *tag);
        x.write(w);
      }
    }
  }
}
