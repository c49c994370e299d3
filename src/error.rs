use crate::cbor::Cbor;

use std::{
  fmt,
  string::FromUtf8Error,
};

/// Errors from the byte-level CBOR reader.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ReadError {
  Eof,
  UnexpectedCode(u8),
  Utf8(FromUtf8Error),
  NonTextKey(u8),
  InvalidBignum,
  LengthOverflow(u64),
  TrailingBytes(usize),
}

impl fmt::Display for ReadError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Eof => write!(f, "Unexpected end of input"),
      Self::UnexpectedCode(byte) => {
        write!(f, "Unexpected cbor code `0x{:02x}`", byte)
      }
      Self::Utf8(err) => write!(f, "Text string is not UTF-8: {}", err),
      Self::NonTextKey(byte) => {
        write!(f, "Map key starts with `0x{:02x}`, expected a text string", byte)
      }
      Self::InvalidBignum => {
        write!(f, "Bignum tag wraps something other than a byte string")
      }
      Self::LengthOverflow(len) => {
        write!(f, "Length {} does not fit this platform", len)
      }
      Self::TrailingBytes(count) => {
        write!(f, "{} trailing bytes after the value", count)
      }
    }
  }
}

/// One step of the route from the root of a CBOR value to the item a
/// decode error is about.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Step {
  Index(usize),
  Key(String),
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Index(i) => write!(f, "[{}]", i),
      Self::Key(k) => write!(f, "[{:?}]", k),
    }
  }
}

#[derive(PartialEq, Clone, Debug)]
pub enum DecodeErrorKind {
  UnknownLabel(u64),
  WrongArity(u64, usize),
  TypeMismatch(Cbor),
  UnknownBuiltin(String),
  ReservedName,
  EmptyApplication,
  BadImportScheme(u64),
  BadMultihash(Vec<u8>),
  BadMode(u64),
  BadOperator(Cbor),
  MalformedText,
  MalformedTime(Cbor),
  MalformedDate(Cbor),
  MalformedUnionLegacy(u64),
  UnknownTag(u64),
}

impl fmt::Display for DecodeErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnknownLabel(label) => {
        write!(f, "Unknown expression label {}", label)
      }
      Self::WrongArity(label, len) => {
        write!(f, "Array for label {} has wrong length {}", label, len)
      }
      Self::TypeMismatch(item) => {
        write!(f, "Item {:?} has the wrong shape for this position", item)
      }
      Self::UnknownBuiltin(name) => {
        write!(f, "{:?} is not a builtin or a constant", name)
      }
      Self::ReservedName => {
        write!(f, "The name `_` must use the short encoding")
      }
      Self::EmptyApplication => {
        write!(f, "Application without arguments")
      }
      Self::BadImportScheme(code) => {
        write!(f, "Unknown import scheme {}", code)
      }
      Self::BadMultihash(bytes) => {
        write!(
          f,
          "Import hash is not a 34-byte sha256 multihash (got {} bytes)",
          bytes.len()
        )
      }
      Self::BadMode(code) => write!(f, "Unknown import mode {}", code),
      Self::BadOperator(item) => {
        write!(f, "{:?} is not an operator code", item)
      }
      Self::MalformedText => {
        write!(f, "Text literal must interleave strings and expressions")
      }
      Self::MalformedTime(item) => write!(f, "Malformed time field {:?}", item),
      Self::MalformedDate(item) => write!(f, "Malformed date field {:?}", item),
      Self::MalformedUnionLegacy(label) => {
        write!(f, "Label {} belongs to a removed construct", label)
      }
      Self::UnknownTag(tag) => write!(f, "Unknown cbor tag {}", tag),
    }
  }
}

/// A decoding failure, annotated with the CBOR route that led to it.
#[derive(PartialEq, Clone, Debug)]
pub struct DecodeError {
  pub path: Vec<Step>,
  pub kind: DecodeErrorKind,
}

impl DecodeError {
  pub fn new(kind: DecodeErrorKind) -> Self {
    DecodeError { path: Vec::new(), kind }
  }

  /// Records that the error happened below `step` of the current item.
  pub fn in_item(mut self, step: Step) -> Self {
    self.path.insert(0, step);
    self
  }
}

impl fmt::Display for DecodeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "$")?;
    for step in &self.path {
      write!(f, "{}", step)?;
    }
    write!(f, ": {}", self.kind)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_includes_the_path() {
    let err = DecodeError::new(DecodeErrorKind::MalformedText)
      .in_item(Step::Key("body".to_owned()))
      .in_item(Step::Index(2));
    assert_eq!(err.to_string(), "$[2][\"body\"]: Text literal must interleave strings and expressions");
  }
}
