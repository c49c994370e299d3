//! Deserialization of bytes into the CBOR value model.
//!
//! The reader is deliberately more tolerant than the writer: it accepts
//! every argument width (not just the minimal one) and indefinite-length
//! arrays and maps, so byte streams produced by other encoders still
//! decode. Tag 2/3 byte strings are folded into bignum items here, which
//! keeps the expression decoder working on exactly one representation per
//! integer.

use crate::{
  cbor::{
    Cbor,
    TAG_BIGNUM_NEG,
    TAG_BIGNUM_POS,
  },
  error::ReadError,
};

use byteorder::{
  BigEndian,
  ByteOrder,
};
use num_bigint::BigUint;

struct Reader<'a> {
  buf: &'a [u8],
  pos: usize,
}

impl<'a> Reader<'a> {
  fn new(buf: &'a [u8]) -> Self {
    Reader { buf, pos: 0 }
  }

  fn next(&mut self) -> Result<u8, ReadError> {
    let byte = *self.buf.get(self.pos).ok_or(ReadError::Eof)?;
    self.pos += 1;
    Ok(byte)
  }

  fn peek(&self) -> Result<u8, ReadError> {
    self.buf.get(self.pos).copied().ok_or(ReadError::Eof)
  }

  fn take(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
    let end = self.pos.checked_add(len).ok_or(ReadError::Eof)?;
    if end > self.buf.len() {
      return Err(ReadError::Eof);
    }
    let bytes = &self.buf[self.pos..end];
    self.pos = end;
    Ok(bytes)
  }
}

fn read_arg(r: &mut Reader, info: u8) -> Result<u64, ReadError> {
  match info {
    0x00..=0x17 => Ok(u64::from(info)),
    0x18 => Ok(u64::from(r.next()?)),
    0x19 => Ok(u64::from(BigEndian::read_u16(r.take(2)?))),
    0x1a => Ok(u64::from(BigEndian::read_u32(r.take(4)?))),
    0x1b => Ok(BigEndian::read_u64(r.take(8)?)),
    info => Err(ReadError::UnexpectedCode(info)),
  }
}

fn read_len(r: &mut Reader, info: u8) -> Result<usize, ReadError> {
  let len = read_arg(r, info)?;
  usize::try_from(len).map_err(|_| ReadError::LengthOverflow(len))
}

fn read_text(r: &mut Reader, len: usize) -> Result<String, ReadError> {
  let bytes = r.take(len)?.to_vec();
  String::from_utf8(bytes).map_err(ReadError::Utf8)
}

// Map keys in this format are always text strings.
fn read_key(r: &mut Reader) -> Result<String, ReadError> {
  let byte = r.next()?;
  if byte >> 5 != 3 {
    return Err(ReadError::NonTextKey(byte));
  }
  let len = read_len(r, byte & 0x1f)?;
  read_text(r, len)
}

fn read_item(r: &mut Reader) -> Result<Cbor, ReadError> {
  let byte = r.next()?;
  let (major, info) = (byte >> 5, byte & 0x1f);
  match major {
    0 => Ok(Cbor::Unsigned(read_arg(r, info)?)),
    1 => Ok(Cbor::Negative(read_arg(r, info)?)),
    2 => {
      let len = read_len(r, info)?;
      Ok(Cbor::Bytes(r.take(len)?.to_vec()))
    }
    3 => {
      let len = read_len(r, info)?;
      Ok(Cbor::String(read_text(r, len)?))
    }
    4 => {
      let mut items = Vec::new();
      if info == 0x1f {
        while r.peek()? != 0xff {
          items.push(read_item(r)?);
        }
        r.next()?;
      }
      else {
        let len = read_len(r, info)?;
        for _ in 0..len {
          items.push(read_item(r)?);
        }
      }
      Ok(Cbor::Array(items))
    }
    5 => {
      let mut entries = Vec::new();
      if info == 0x1f {
        while r.peek()? != 0xff {
          let key = read_key(r)?;
          entries.push((key, read_item(r)?));
        }
        r.next()?;
      }
      else {
        let len = read_len(r, info)?;
        for _ in 0..len {
          let key = read_key(r)?;
          entries.push((key, read_item(r)?));
        }
      }
      Ok(Cbor::Map(entries))
    }
    6 => {
      let tag = read_arg(r, info)?;
      match tag {
        TAG_BIGNUM_POS | TAG_BIGNUM_NEG => match read_item(r)? {
          Cbor::Bytes(bytes) => {
            let n = BigUint::from_bytes_be(&bytes);
            if tag == TAG_BIGNUM_POS {
              Ok(Cbor::BigPos(n))
            }
            else {
              Ok(Cbor::BigNeg(n))
            }
          }
          _ => Err(ReadError::InvalidBignum),
        },
        tag => Ok(Cbor::Tag(tag, Box::new(read_item(r)?))),
      }
    }
    _ => match info {
      20 => Ok(Cbor::Bool(false)),
      21 => Ok(Cbor::Bool(true)),
      22 | 23 => Ok(Cbor::Null),
      25 => Ok(Cbor::F16(BigEndian::read_u16(r.take(2)?))),
      26 => Ok(Cbor::F32(BigEndian::read_f32(r.take(4)?))),
      27 => Ok(Cbor::F64(BigEndian::read_f64(r.take(8)?))),
      _ => Err(ReadError::UnexpectedCode(byte)),
    },
  }
}

impl Cbor {
  /// Deserializes one value and requires the whole buffer to be consumed.
  pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReadError> {
    let mut r = Reader::new(bytes);
    let value = read_item(&mut r)?;
    if r.pos != bytes.len() {
      return Err(ReadError::TrailingBytes(bytes.len() - r.pos));
    }
    Ok(value)
  }
}
