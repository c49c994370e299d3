//! Decoding of CBOR values back into expressions.
//!
//! Decoding is the partial inverse of encoding: it dispatches on the
//! shape of the value (naked string, naked number, array with a leading
//! integer label), validates arity and element shapes, and rebuilds the
//! expression. Non-minimal integer representations are accepted; the
//! self-describe tag 55799 is stripped transparently at every node.

use crate::{
  builtin::{
    Builtin,
    Const,
  },
  cbor::{
    f16,
    Cbor,
    TAG_DECIMAL_FRACTION,
    TAG_SELF_DESCRIBE,
  },
  error::{
    DecodeError,
    DecodeErrorKind,
    Step,
  },
  expr::{
    Double,
    Expr,
    PathComponent,
  },
  hash,
  import::{
    File,
    FilePrefix,
    Import,
    ImportMode,
    ImportTarget,
    Scheme,
    Url,
  },
  op::{
    BinOp,
    COMPLETION_CODE,
  },
};

use num_bigint::{
  BigInt,
  BigUint,
};

use std::collections::BTreeMap;

fn err<T>(kind: DecodeErrorKind) -> Result<T, DecodeError> {
  Err(DecodeError::new(kind))
}

fn mismatch<T>(item: &Cbor) -> Result<T, DecodeError> {
  err(DecodeErrorKind::TypeMismatch(item.clone()))
}

// Decodes the expression at `items[index]`, extending the error path.
fn expr_at(items: &[Cbor], index: usize) -> Result<Expr, DecodeError> {
  decode(&items[index]).map_err(|e| e.in_item(Step::Index(index)))
}

fn string_at(items: &[Cbor], index: usize) -> Result<String, DecodeError> {
  match &items[index] {
    Cbor::String(s) => Ok(s.clone()),
    other => mismatch::<String>(other)
      .map_err(|e| e.in_item(Step::Index(index))),
  }
}

// Natural-number slots: a compact unsigned int or a positive bignum,
// whichever the producer chose.
fn nat_at(items: &[Cbor], index: usize) -> Result<BigUint, DecodeError> {
  match &items[index] {
    Cbor::Unsigned(n) => Ok(BigUint::from(*n)),
    Cbor::BigPos(n) => Ok(n.clone()),
    other => mismatch::<BigUint>(other)
      .map_err(|e| e.in_item(Step::Index(index))),
  }
}

fn decode(value: &Cbor) -> Result<Expr, DecodeError> {
  // self-describe wrappers are transparent, however many times applied
  let mut value = value;
  while let Cbor::Tag(TAG_SELF_DESCRIBE, inner) = value {
    value = inner;
  }
  match value {
    Cbor::Unsigned(n) => Ok(Expr::Var("_".to_owned(), BigUint::from(*n))),
    Cbor::BigPos(n) => Ok(Expr::Var("_".to_owned(), n.clone())),
    Cbor::String(name) => decode_name(name),
    Cbor::Bool(b) => Ok(Expr::BoolLit(*b)),
    Cbor::F16(bits) => Ok(Expr::DoubleLit(Double(f16::decode_f16(*bits)))),
    Cbor::F32(x) => Ok(Expr::DoubleLit(Double(f64::from(*x)))),
    Cbor::F64(x) => Ok(Expr::DoubleLit(Double(*x))),
    Cbor::Array(items) => decode_array(items),
    Cbor::Tag(tag, _) => err(DecodeErrorKind::UnknownTag(*tag)),
    other => mismatch(other),
  }
}

fn decode_name(name: &str) -> Result<Expr, DecodeError> {
  if let Some(builtin) = Builtin::from_name(name) {
    return Ok(Expr::Builtin(builtin));
  }
  if let Some(constant) = Const::from_name(name) {
    return Ok(Expr::Const(constant));
  }
  err(DecodeErrorKind::UnknownBuiltin(name.to_owned()))
}

fn decode_array(items: &[Cbor]) -> Result<Expr, DecodeError> {
  match items {
    [Cbor::String(name), index] => decode_var(name, index),
    [Cbor::Unsigned(label), ..] => decode_labeled(*label, items),
    [first, ..] => mismatch::<Expr>(first)
      .map_err(|e| e.in_item(Step::Index(0))),
    [] => mismatch(&Cbor::Array(Vec::new())),
  }
}

fn decode_var(name: &str, index: &Cbor) -> Result<Expr, DecodeError> {
  if name == "_" {
    // `_` has a dedicated short encoding; the long form is reserved
    return err(DecodeErrorKind::ReservedName);
  }
  let index = match index {
    Cbor::Unsigned(n) => BigUint::from(*n),
    Cbor::BigPos(n) => n.clone(),
    other => {
      return mismatch::<Expr>(other)
        .map_err(|e| e.in_item(Step::Index(1)));
    }
  };
  Ok(Expr::Var(name.to_owned(), index))
}

fn decode_labeled(label: u64, items: &[Cbor]) -> Result<Expr, DecodeError> {
  let arity = items.len();
  match label {
    0 => match arity {
      0 | 1 => err(DecodeErrorKind::WrongArity(0, arity)),
      2 => err(DecodeErrorKind::EmptyApplication),
      _ => {
        let fun = expr_at(items, 1)?;
        let mut args = Vec::with_capacity(arity - 2);
        for index in 2..arity {
          args.push(expr_at(items, index)?);
        }
        Ok(Expr::App(Box::new(fun), args))
      }
    },
    1 => decode_binder(label, items, Expr::Lam),
    2 => decode_binder(label, items, Expr::Pi),
    3 => {
      if arity != 4 {
        return err(DecodeErrorKind::WrongArity(3, arity));
      }
      let lhs = expr_at(items, 2)?;
      let rhs = expr_at(items, 3)?;
      let args = Box::new((lhs, rhs));
      match &items[1] {
        Cbor::Unsigned(code) if *code == COMPLETION_CODE => {
          Ok(Expr::Complete(args))
        }
        Cbor::Unsigned(code) => match BinOp::from_code(*code) {
          Some(op) => Ok(Expr::Op(op, args)),
          None => err(DecodeErrorKind::BadOperator(items[1].clone())),
        },
        other => err(DecodeErrorKind::BadOperator((*other).clone())),
      }
    }
    4 => match arity {
      2 => {
        // a `[4, T]` empty list reconstructs its `List T` annotation
        let elem = expr_at(items, 1)?;
        let annot =
          Expr::App(Box::new(Expr::Builtin(Builtin::List)), vec![elem]);
        Ok(Expr::EmptyList(Box::new(annot)))
      }
      0 | 1 => err(DecodeErrorKind::WrongArity(4, arity)),
      _ => {
        match &items[1] {
          Cbor::Null => {}
          other => {
            return mismatch::<Expr>(other)
              .map_err(|e| e.in_item(Step::Index(1)));
          }
        }
        let mut elems = Vec::with_capacity(arity - 2);
        for index in 2..arity {
          elems.push(expr_at(items, index)?);
        }
        Ok(Expr::NonEmptyList(elems))
      }
    },
    5 => {
      if arity != 3 {
        return err(DecodeErrorKind::WrongArity(5, arity));
      }
      match &items[1] {
        Cbor::Null => Ok(Expr::Some(Box::new(expr_at(items, 2)?))),
        other => mismatch::<Expr>(other)
          .map_err(|e| e.in_item(Step::Index(1))),
      }
    }
    6 => {
      if arity != 3 && arity != 4 {
        return err(DecodeErrorKind::WrongArity(6, arity));
      }
      let handler = expr_at(items, 1)?;
      let target = expr_at(items, 2)?;
      let annot = if arity == 4 {
        Some(Box::new(expr_at(items, 3)?))
      }
      else {
        None
      };
      Ok(Expr::Merge(Box::new((handler, target)), annot))
    }
    7 => Ok(Expr::RecordType(decode_record(label, items)?)),
    8 => Ok(Expr::RecordLit(decode_record(label, items)?)),
    9 => {
      if arity != 3 {
        return err(DecodeErrorKind::WrongArity(9, arity));
      }
      let target = expr_at(items, 1)?;
      let field = string_at(items, 2)?;
      Ok(Expr::Field(Box::new(target), field))
    }
    10 => {
      if arity < 2 {
        return err(DecodeErrorKind::WrongArity(10, arity));
      }
      let target = expr_at(items, 1)?;
      // a single array element selects projection by type
      if arity == 3 {
        if let Cbor::Array(typ) = &items[2] {
          if typ.len() != 1 {
            return err(DecodeErrorKind::WrongArity(10, typ.len()))
              .map_err(|e| e.in_item(Step::Index(2)));
          }
          let typ = decode(&typ[0])
            .map_err(|e| e.in_item(Step::Index(0)).in_item(Step::Index(2)))?;
          return Ok(Expr::ProjectByType(Box::new((target, typ))));
        }
      }
      let mut labels = Vec::with_capacity(arity - 2);
      for index in 2..arity {
        labels.push(string_at(items, index)?);
      }
      Ok(Expr::Project(Box::new(target), labels))
    }
    11 => {
      if arity != 2 {
        return err(DecodeErrorKind::WrongArity(11, arity));
      }
      let entries = match &items[1] {
        Cbor::Map(entries) => entries,
        other => {
          return mismatch::<Expr>(other)
            .map_err(|e| e.in_item(Step::Index(1)));
        }
      };
      // alternative-name uniqueness is the type checker's concern;
      // duplicates simply collapse here
      let mut alternatives = BTreeMap::new();
      for (name, payload) in entries {
        let payload = match payload {
          Cbor::Null => None,
          other => Some(decode(other).map_err(|e| {
            e.in_item(Step::Key(name.clone())).in_item(Step::Index(1))
          })?),
        };
        alternatives.insert(name.clone(), payload);
      }
      Ok(Expr::UnionType(alternatives))
    }
    12 | 13 => err(DecodeErrorKind::MalformedUnionLegacy(label)),
    14 => {
      if arity != 4 {
        return err(DecodeErrorKind::WrongArity(14, arity));
      }
      let cond = expr_at(items, 1)?;
      let then = expr_at(items, 2)?;
      let alt = expr_at(items, 3)?;
      Ok(Expr::BoolIf(Box::new((cond, then, alt))))
    }
    15 => {
      if arity != 2 {
        return err(DecodeErrorKind::WrongArity(15, arity));
      }
      Ok(Expr::NaturalLit(nat_at(items, 1)?))
    }
    16 => {
      if arity != 2 {
        return err(DecodeErrorKind::WrongArity(16, arity));
      }
      let value = match &items[1] {
        Cbor::Unsigned(n) => BigInt::from(*n),
        Cbor::BigPos(n) => BigInt::from(n.clone()),
        Cbor::Negative(n) => -BigInt::from(*n) - 1,
        Cbor::BigNeg(n) => -BigInt::from(n.clone()) - 1,
        other => {
          return mismatch::<Expr>(other)
            .map_err(|e| e.in_item(Step::Index(1)));
        }
      };
      Ok(Expr::IntegerLit(value))
    }
    18 => {
      if arity % 2 != 0 {
        // label + alternating chunks must leave an odd tail
        return err(DecodeErrorKind::MalformedText);
      }
      let mut chunks = Vec::new();
      let mut index = 1;
      while index + 1 < arity {
        let prefix = string_at(items, index)?;
        let interpolation = expr_at(items, index + 1)?;
        chunks.push((prefix, interpolation));
        index += 2;
      }
      let suffix = string_at(items, arity - 1)?;
      Ok(Expr::TextLit(chunks, suffix))
    }
    19 => {
      if arity != 2 {
        return err(DecodeErrorKind::WrongArity(19, arity));
      }
      Ok(Expr::Assert(Box::new(expr_at(items, 1)?)))
    }
    24 => decode_import(items),
    25 => {
      if arity < 5 || (arity - 2) % 3 != 0 {
        return err(DecodeErrorKind::WrongArity(25, arity));
      }
      let mut body = expr_at(items, arity - 1)?;
      // rebuild the right-associated chain of single-binding lets
      let mut index = arity - 1;
      while index > 1 {
        index -= 3;
        let name = string_at(items, index)?;
        let annot = match &items[index + 1] {
          Cbor::Null => None,
          _ => Some(Box::new(expr_at(items, index + 1)?)),
        };
        let value = expr_at(items, index + 2)?;
        body = Expr::Let(name, annot, Box::new((value, body)));
      }
      Ok(body)
    }
    26 => {
      if arity != 3 {
        return err(DecodeErrorKind::WrongArity(26, arity));
      }
      let value = expr_at(items, 1)?;
      let typ = expr_at(items, 2)?;
      Ok(Expr::Annot(Box::new((value, typ))))
    }
    27 => {
      if arity != 2 && arity != 3 {
        return err(DecodeErrorKind::WrongArity(27, arity));
      }
      let target = expr_at(items, 1)?;
      let annot = if arity == 3 {
        Some(Box::new(expr_at(items, 2)?))
      }
      else {
        None
      };
      Ok(Expr::ToMap(Box::new(target), annot))
    }
    28 => {
      if arity != 2 {
        return err(DecodeErrorKind::WrongArity(28, arity));
      }
      Ok(Expr::EmptyList(Box::new(expr_at(items, 1)?)))
    }
    29 => {
      if arity != 4 {
        return err(DecodeErrorKind::WrongArity(29, arity));
      }
      let subject = expr_at(items, 1)?;
      let keys = match &items[2] {
        Cbor::Array(keys) if !keys.is_empty() => keys,
        other => {
          return mismatch::<Expr>(other)
            .map_err(|e| e.in_item(Step::Index(2)));
        }
      };
      let mut path = Vec::with_capacity(keys.len());
      for (offset, key) in keys.iter().enumerate() {
        match key {
          Cbor::String(label) => {
            path.push(PathComponent::Label(label.clone()));
          }
          Cbor::Unsigned(0) => path.push(PathComponent::DescendOptional),
          other => {
            return mismatch::<Expr>(other).map_err(|e| {
              e.in_item(Step::Index(offset)).in_item(Step::Index(2))
            });
          }
        }
      }
      let value = expr_at(items, 3)?;
      Ok(Expr::With(Box::new((subject, value)), path))
    }
    30 => {
      if arity != 4 {
        return err(DecodeErrorKind::WrongArity(30, arity));
      }
      let year = date_field(items, 1, u64::from(u16::MAX))? as u16;
      let month = date_field(items, 2, u64::from(u8::MAX))? as u8;
      let day = date_field(items, 3, u64::from(u8::MAX))? as u8;
      Ok(Expr::Date(year, month, day))
    }
    31 => {
      if arity != 4 {
        return err(DecodeErrorKind::WrongArity(31, arity));
      }
      let hour = time_field(items, 1, u64::from(u8::MAX))? as u8;
      let minute = time_field(items, 2, u64::from(u8::MAX))? as u8;
      let (mantissa, precision) = decode_seconds(&items[3])
        .map_err(|e| e.in_item(Step::Index(3)))?;
      Ok(Expr::Time(hour, minute, mantissa, precision))
    }
    32 => {
      if arity != 4 {
        return err(DecodeErrorKind::WrongArity(32, arity));
      }
      let positive = match &items[1] {
        Cbor::Bool(positive) => *positive,
        other => {
          return err(DecodeErrorKind::MalformedTime((*other).clone()))
            .map_err(|e| e.in_item(Step::Index(1)));
        }
      };
      let hours = time_field(items, 2, u64::from(u16::MAX))?;
      let minutes = time_field(items, 3, u64::from(u16::MAX))?;
      let total = hours as i64 * 60 + minutes as i64;
      let total = if positive { total } else { -total };
      match i16::try_from(total) {
        Ok(minutes) => Ok(Expr::TimeZone(minutes)),
        Err(_) => err(DecodeErrorKind::MalformedTime(items[2].clone())),
      }
    }
    33 => {
      if arity != 2 {
        return err(DecodeErrorKind::WrongArity(33, arity));
      }
      match &items[1] {
        Cbor::Bytes(bytes) => Ok(Expr::BytesLit(bytes.clone())),
        other => mismatch::<Expr>(other)
          .map_err(|e| e.in_item(Step::Index(1))),
      }
    }
    34 => {
      if arity != 2 {
        return err(DecodeErrorKind::WrongArity(34, arity));
      }
      Ok(Expr::ShowConstructor(Box::new(expr_at(items, 1)?)))
    }
    label => err(DecodeErrorKind::UnknownLabel(label)),
  }
}

// Lambdas and function types share their shape: the 3-element form binds
// `_`, the 4-element form binds a name, and spelling `_` in the long form
// is reserved.
fn decode_binder(
  label: u64,
  items: &[Cbor],
  build: fn(String, Box<(Expr, Expr)>) -> Expr,
) -> Result<Expr, DecodeError> {
  match items.len() {
    3 => {
      let dom = expr_at(items, 1)?;
      let body = expr_at(items, 2)?;
      Ok(build("_".to_owned(), Box::new((dom, body))))
    }
    4 => {
      let name = string_at(items, 1)?;
      if name == "_" {
        return err(DecodeErrorKind::ReservedName)
          .map_err(|e: DecodeError| e.in_item(Step::Index(1)));
      }
      let dom = expr_at(items, 2)?;
      let body = expr_at(items, 3)?;
      Ok(build(name, Box::new((dom, body))))
    }
    arity => err(DecodeErrorKind::WrongArity(label, arity)),
  }
}

fn decode_record(
  label: u64,
  items: &[Cbor],
) -> Result<BTreeMap<String, Expr>, DecodeError> {
  if items.len() != 2 {
    return err(DecodeErrorKind::WrongArity(label, items.len()));
  }
  let entries = match &items[1] {
    Cbor::Map(entries) => entries,
    other => {
      return mismatch::<BTreeMap<String, Expr>>(other)
        .map_err(|e| e.in_item(Step::Index(1)));
    }
  };
  let mut fields = BTreeMap::new();
  for (name, value) in entries {
    let value = decode(value).map_err(|e| {
      e.in_item(Step::Key(name.clone())).in_item(Step::Index(1))
    })?;
    fields.insert(name.clone(), value);
  }
  Ok(fields)
}

// The seconds slot of a time literal: a tag-4 decimal fraction with a
// non-positive exponent and a non-negative mantissa.
fn decode_seconds(item: &Cbor) -> Result<(BigUint, u8), DecodeError> {
  let pair = match item {
    Cbor::Tag(TAG_DECIMAL_FRACTION, inner) => match inner.as_ref() {
      Cbor::Array(pair) if pair.len() == 2 => pair,
      other => {
        return err(DecodeErrorKind::MalformedTime((*other).clone()));
      }
    },
    other => return err(DecodeErrorKind::MalformedTime((*other).clone())),
  };
  let precision = match &pair[0] {
    Cbor::Unsigned(0) => 0,
    Cbor::Negative(n) if *n < u64::from(u8::MAX) => (*n + 1) as u8,
    other => return err(DecodeErrorKind::MalformedTime((*other).clone())),
  };
  let mantissa = match &pair[1] {
    Cbor::Unsigned(n) => BigUint::from(*n),
    Cbor::BigPos(n) => n.clone(),
    other => return err(DecodeErrorKind::MalformedTime((*other).clone())),
  };
  Ok((mantissa, precision))
}

fn date_field(
  items: &[Cbor],
  index: usize,
  max: u64,
) -> Result<u64, DecodeError> {
  match &items[index] {
    Cbor::Unsigned(n) if *n <= max => Ok(*n),
    other => Err(
      DecodeError::new(DecodeErrorKind::MalformedDate((*other).clone()))
        .in_item(Step::Index(index)),
    ),
  }
}

fn time_field(
  items: &[Cbor],
  index: usize,
  max: u64,
) -> Result<u64, DecodeError> {
  match &items[index] {
    Cbor::Unsigned(n) if *n <= max => Ok(*n),
    other => Err(
      DecodeError::new(DecodeErrorKind::MalformedTime((*other).clone()))
        .in_item(Step::Index(index)),
    ),
  }
}

fn decode_import(items: &[Cbor]) -> Result<Expr, DecodeError> {
  let arity = items.len();
  if arity < 4 {
    return err(DecodeErrorKind::WrongArity(24, arity));
  }
  let hash = match &items[1] {
    Cbor::Null => None,
    Cbor::Bytes(bytes) => match hash::unwrap_digest(bytes) {
      Some(digest) => Some(digest),
      None => {
        return err(DecodeErrorKind::BadMultihash(bytes.clone()))
          .map_err(|e: DecodeError| e.in_item(Step::Index(1)));
      }
    },
    other => {
      return mismatch::<Expr>(other).map_err(|e| e.in_item(Step::Index(1)));
    }
  };
  let mode = match &items[2] {
    Cbor::Unsigned(code) => match ImportMode::from_code(*code) {
      Some(mode) => mode,
      None => {
        return err(DecodeErrorKind::BadMode(*code))
          .map_err(|e: DecodeError| e.in_item(Step::Index(2)));
      }
    },
    other => {
      return mismatch::<Expr>(other).map_err(|e| e.in_item(Step::Index(2)));
    }
  };
  let scheme = match &items[3] {
    Cbor::Unsigned(code) => *code,
    other => {
      return mismatch::<Expr>(other).map_err(|e| e.in_item(Step::Index(3)));
    }
  };
  let target = match scheme {
    0 | 1 => {
      if arity < 8 {
        return err(DecodeErrorKind::WrongArity(24, arity));
      }
      let headers = match &items[4] {
        Cbor::Null => None,
        _ => Some(Box::new(expr_at(items, 4)?)),
      };
      let authority = string_at(items, 5)?;
      let mut directory = Vec::with_capacity(arity - 8);
      for index in 6..arity - 2 {
        directory.push(string_at(items, index)?);
      }
      let file = string_at(items, arity - 2)?;
      let query = match &items[arity - 1] {
        Cbor::Null => None,
        Cbor::String(query) => Some(query.clone()),
        other => {
          return mismatch::<Expr>(other)
            .map_err(|e| e.in_item(Step::Index(arity - 1)));
        }
      };
      let scheme = if scheme == 0 { Scheme::Http } else { Scheme::Https };
      ImportTarget::Remote(Url {
        scheme,
        authority,
        path: File { directory, file },
        query,
        headers,
      })
    }
    2..=5 => {
      if arity < 5 {
        return err(DecodeErrorKind::WrongArity(24, arity));
      }
      // the discriminant range makes from_code infallible here
      let prefix = match FilePrefix::from_code(scheme) {
        Some(prefix) => prefix,
        None => return err(DecodeErrorKind::BadImportScheme(scheme)),
      };
      let mut directory = Vec::with_capacity(arity - 5);
      for index in 4..arity - 1 {
        directory.push(string_at(items, index)?);
      }
      let file = string_at(items, arity - 1)?;
      ImportTarget::Local(prefix, File { directory, file })
    }
    6 => {
      if arity != 5 {
        return err(DecodeErrorKind::WrongArity(24, arity));
      }
      ImportTarget::Env(string_at(items, 4)?)
    }
    7 => {
      if arity != 4 {
        return err(DecodeErrorKind::WrongArity(24, arity));
      }
      ImportTarget::Missing
    }
    scheme => return err(DecodeErrorKind::BadImportScheme(scheme)),
  };
  Ok(Expr::Import(Import { target, mode, hash }))
}

impl Expr {
  /// Decodes an expression from its CBOR form. Errors name the failure
  /// and the route to the item that caused it.
  pub fn from_cbor(value: &Cbor) -> Result<Self, DecodeError> {
    decode(value)
  }
}
