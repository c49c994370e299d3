//! Encoding of expressions into the CBOR value model.
//!
//! Encoding is total and deterministic: record and union maps are emitted
//! in ascending codepoint order of their labels, integers take the
//! narrowest representation that holds them, and doubles take the
//! narrowest IEEE-754 width that round-trips.

use crate::{
  builtin::Builtin,
  cbor::{
    f16,
    Cbor,
    TAG_DECIMAL_FRACTION,
  },
  expr::{
    Expr,
    PathComponent,
  },
  hash,
  import::{
    Import,
    ImportTarget,
  },
  op::COMPLETION_CODE,
};

use num_bigint::{
  BigInt,
  BigUint,
  Sign,
};

use std::collections::BTreeMap;

// Natural numbers: a compact unsigned int when possible, else a positive
// bignum.
fn nat(n: &BigUint) -> Cbor {
  match u64::try_from(n) {
    Ok(small) => Cbor::Unsigned(small),
    Err(_) => Cbor::BigPos(n.clone()),
  }
}

// Signed integers: the narrowest of compact unsigned, compact negative,
// positive bignum, negative bignum.
fn integer(n: &BigInt) -> Cbor {
  if n.sign() == Sign::Minus {
    // the wire carries -1 - n
    let pred: BigInt = n + 1;
    let magnitude = pred.magnitude();
    match u64::try_from(magnitude) {
      Ok(small) => Cbor::Negative(small),
      Err(_) => Cbor::BigNeg(magnitude.clone()),
    }
  }
  else {
    nat(n.magnitude())
  }
}

// Doubles: the shortest width whose expansion restores the exact bit
// pattern. NaN compares unequal to itself, so it is dispatched before the
// width probes and always becomes the canonical half.
fn double(x: f64) -> Cbor {
  if x.is_nan() {
    return Cbor::F16(f16::CANONICAL_NAN);
  }
  let half = f16::encode_f16(x as f32);
  if f16::decode_f16(half).to_bits() == x.to_bits() {
    return Cbor::F16(half);
  }
  let single = x as f32;
  if f64::from(single).to_bits() == x.to_bits() {
    return Cbor::F32(single);
  }
  Cbor::F64(x)
}

// The seconds of a time literal: a decimal fraction whose mantissa stays
// compact only while it fits a 64-bit signed int.
fn seconds(mantissa: &BigUint, precision: u8) -> Cbor {
  let exponent = if precision == 0 {
    Cbor::Unsigned(0)
  }
  else {
    Cbor::Negative(u64::from(precision) - 1)
  };
  let mantissa = match u64::try_from(mantissa) {
    Ok(small) if small < 1u64 << 63 => Cbor::Unsigned(small),
    _ => Cbor::BigPos(mantissa.clone()),
  };
  Cbor::Tag(
    TAG_DECIMAL_FRACTION,
    Box::new(Cbor::Array(vec![exponent, mantissa])),
  )
}

// BTreeMap iteration is ascending by the UTF-8 bytes of the key, which is
// exactly the codepoint order the wire format fixes.
fn record(fields: &BTreeMap<String, Expr>) -> Cbor {
  Cbor::Map(fields.iter().map(|(k, v)| (k.clone(), v.to_cbor())).collect())
}

fn union(alternatives: &BTreeMap<String, Option<Expr>>) -> Cbor {
  Cbor::Map(
    alternatives
      .iter()
      .map(|(k, v)| {
        (k.clone(), v.as_ref().map_or(Cbor::Null, |t| t.to_cbor()))
      })
      .collect(),
  )
}

fn optional(annot: &Option<Box<Expr>>) -> Option<Cbor> {
  annot.as_ref().map(|t| t.to_cbor())
}

fn import(import: &Import) -> Cbor {
  let hash = match &import.hash {
    Some(digest) => Cbor::Bytes(hash::wrap_digest(digest)),
    None => Cbor::Null,
  };
  let mut items =
    vec![Cbor::Unsigned(24), hash, Cbor::Unsigned(import.mode.code())];
  match &import.target {
    ImportTarget::Remote(url) => {
      items.push(Cbor::Unsigned(url.scheme.code()));
      items.push(match &url.headers {
        Some(headers) => headers.to_cbor(),
        None => Cbor::Null,
      });
      items.push(Cbor::String(url.authority.clone()));
      for dir in &url.path.directory {
        items.push(Cbor::String(dir.clone()));
      }
      items.push(Cbor::String(url.path.file.clone()));
      items.push(match &url.query {
        Some(query) => Cbor::String(query.clone()),
        None => Cbor::Null,
      });
    }
    ImportTarget::Local(prefix, file) => {
      items.push(Cbor::Unsigned(prefix.code()));
      for dir in &file.directory {
        items.push(Cbor::String(dir.clone()));
      }
      items.push(Cbor::String(file.file.clone()));
    }
    ImportTarget::Env(name) => {
      items.push(Cbor::Unsigned(6));
      items.push(Cbor::String(name.clone()));
    }
    ImportTarget::Missing => {
      items.push(Cbor::Unsigned(7));
    }
  }
  Cbor::Array(items)
}

impl Expr {
  /// Encodes the expression into the CBOR value whose serialization is
  /// hashed for semantic integrity checks. Total: every expression has an
  /// encoding.
  pub fn to_cbor(&self) -> Cbor {
    match self {
      Self::Var(name, idx) if name == "_" => nat(idx),
      Self::Var(name, idx) => {
        Cbor::Array(vec![Cbor::String(name.clone()), nat(idx)])
      }
      Self::Builtin(builtin) => Cbor::String(builtin.name().to_owned()),
      Self::Const(constant) => Cbor::String(constant.name().to_owned()),
      Self::Lam(name, dom_bod) => {
        let (dom, bod) = dom_bod.as_ref();
        if name == "_" {
          Cbor::Array(vec![Cbor::Unsigned(1), dom.to_cbor(), bod.to_cbor()])
        }
        else {
          Cbor::Array(vec![
            Cbor::Unsigned(1),
            Cbor::String(name.clone()),
            dom.to_cbor(),
            bod.to_cbor(),
          ])
        }
      }
      Self::Pi(name, dom_cod) => {
        let (dom, cod) = dom_cod.as_ref();
        if name == "_" {
          Cbor::Array(vec![Cbor::Unsigned(2), dom.to_cbor(), cod.to_cbor()])
        }
        else {
          Cbor::Array(vec![
            Cbor::Unsigned(2),
            Cbor::String(name.clone()),
            dom.to_cbor(),
            cod.to_cbor(),
          ])
        }
      }
      Self::App(fun, args) => {
        // walk the left spine with a loop so nested applications flatten
        // into a single array and deep spines cost no stack
        let mut spine = vec![args.as_slice()];
        let mut head = fun.as_ref();
        while let Self::App(fun, args) = head {
          spine.push(args.as_slice());
          head = fun.as_ref();
        }
        let mut items = vec![Cbor::Unsigned(0), head.to_cbor()];
        for args in spine.into_iter().rev() {
          for arg in args {
            items.push(arg.to_cbor());
          }
        }
        Cbor::Array(items)
      }
      Self::Op(op, args) => {
        let (lhs, rhs) = args.as_ref();
        Cbor::Array(vec![
          Cbor::Unsigned(3),
          Cbor::Unsigned(op.code()),
          lhs.to_cbor(),
          rhs.to_cbor(),
        ])
      }
      Self::Complete(args) => {
        let (lhs, rhs) = args.as_ref();
        Cbor::Array(vec![
          Cbor::Unsigned(3),
          Cbor::Unsigned(COMPLETION_CODE),
          lhs.to_cbor(),
          rhs.to_cbor(),
        ])
      }
      Self::EmptyList(annot) => match annot.as_ref() {
        Self::App(fun, args)
          if matches!(fun.as_ref(), Self::Builtin(Builtin::List))
            && args.len() == 1 =>
        {
          Cbor::Array(vec![Cbor::Unsigned(4), args[0].to_cbor()])
        }
        other => Cbor::Array(vec![Cbor::Unsigned(28), other.to_cbor()]),
      },
      Self::NonEmptyList(elems) => {
        let mut items = vec![Cbor::Unsigned(4), Cbor::Null];
        for elem in elems {
          items.push(elem.to_cbor());
        }
        Cbor::Array(items)
      }
      Self::Some(value) => {
        Cbor::Array(vec![Cbor::Unsigned(5), Cbor::Null, value.to_cbor()])
      }
      Self::Merge(args, annot) => {
        let (handler, target) = args.as_ref();
        let mut items =
          vec![Cbor::Unsigned(6), handler.to_cbor(), target.to_cbor()];
        if let Some(annot) = optional(annot) {
          items.push(annot);
        }
        Cbor::Array(items)
      }
      Self::ToMap(target, annot) => {
        let mut items = vec![Cbor::Unsigned(27), target.to_cbor()];
        if let Some(annot) = optional(annot) {
          items.push(annot);
        }
        Cbor::Array(items)
      }
      Self::ShowConstructor(target) => {
        Cbor::Array(vec![Cbor::Unsigned(34), target.to_cbor()])
      }
      Self::RecordType(fields) => {
        Cbor::Array(vec![Cbor::Unsigned(7), record(fields)])
      }
      Self::RecordLit(fields) => {
        Cbor::Array(vec![Cbor::Unsigned(8), record(fields)])
      }
      Self::Field(target, label) => Cbor::Array(vec![
        Cbor::Unsigned(9),
        target.to_cbor(),
        Cbor::String(label.clone()),
      ]),
      Self::Project(target, labels) => {
        // labels keep their source order, unlike record fields
        let mut items = vec![Cbor::Unsigned(10), target.to_cbor()];
        for label in labels {
          items.push(Cbor::String(label.clone()));
        }
        Cbor::Array(items)
      }
      Self::ProjectByType(args) => {
        let (target, typ) = args.as_ref();
        Cbor::Array(vec![
          Cbor::Unsigned(10),
          target.to_cbor(),
          Cbor::Array(vec![typ.to_cbor()]),
        ])
      }
      Self::UnionType(alternatives) => {
        Cbor::Array(vec![Cbor::Unsigned(11), union(alternatives)])
      }
      Self::BoolIf(args) => {
        let (cond, then, alt) = args.as_ref();
        Cbor::Array(vec![
          Cbor::Unsigned(14),
          cond.to_cbor(),
          then.to_cbor(),
          alt.to_cbor(),
        ])
      }
      Self::BoolLit(value) => Cbor::Bool(*value),
      Self::NaturalLit(value) => {
        Cbor::Array(vec![Cbor::Unsigned(15), nat(value)])
      }
      Self::IntegerLit(value) => {
        Cbor::Array(vec![Cbor::Unsigned(16), integer(value)])
      }
      Self::DoubleLit(value) => double(value.0),
      Self::TextLit(chunks, suffix) => {
        let mut items = vec![Cbor::Unsigned(18)];
        for (prefix, interpolation) in chunks {
          items.push(Cbor::String(prefix.clone()));
          items.push(interpolation.to_cbor());
        }
        items.push(Cbor::String(suffix.clone()));
        Cbor::Array(items)
      }
      Self::BytesLit(bytes) => {
        Cbor::Array(vec![Cbor::Unsigned(33), Cbor::Bytes(bytes.clone())])
      }
      Self::Assert(typ) => {
        Cbor::Array(vec![Cbor::Unsigned(19), typ.to_cbor()])
      }
      Self::Import(descriptor) => import(descriptor),
      Self::Let(name, annot, value_body) => {
        // flatten a contiguous spine of lets into one array, three items
        // per binding, body last
        let mut items = vec![Cbor::Unsigned(25)];
        let (mut name, mut annot, mut value_body) = (name, annot, value_body);
        loop {
          let (value, body) = value_body.as_ref();
          items.push(Cbor::String(name.clone()));
          items.push(match annot {
            Some(typ) => typ.to_cbor(),
            None => Cbor::Null,
          });
          items.push(value.to_cbor());
          match body {
            Self::Let(next_name, next_annot, next_value_body) => {
              name = next_name;
              annot = next_annot;
              value_body = next_value_body;
            }
            body => {
              items.push(body.to_cbor());
              break;
            }
          }
        }
        Cbor::Array(items)
      }
      Self::Annot(args) => {
        let (value, typ) = args.as_ref();
        Cbor::Array(vec![
          Cbor::Unsigned(26),
          value.to_cbor(),
          typ.to_cbor(),
        ])
      }
      Self::With(args, path) => {
        let (subject, value) = args.as_ref();
        let keys = path
          .iter()
          .map(|component| match component {
            PathComponent::Label(label) => Cbor::String(label.clone()),
            PathComponent::DescendOptional => Cbor::Unsigned(0),
          })
          .collect();
        Cbor::Array(vec![
          Cbor::Unsigned(29),
          subject.to_cbor(),
          Cbor::Array(keys),
          value.to_cbor(),
        ])
      }
      Self::Date(year, month, day) => Cbor::Array(vec![
        Cbor::Unsigned(30),
        Cbor::Unsigned(u64::from(*year)),
        Cbor::Unsigned(u64::from(*month)),
        Cbor::Unsigned(u64::from(*day)),
      ]),
      Self::Time(hour, minute, mantissa, precision) => Cbor::Array(vec![
        Cbor::Unsigned(31),
        Cbor::Unsigned(u64::from(*hour)),
        Cbor::Unsigned(u64::from(*minute)),
        seconds(mantissa, *precision),
      ]),
      Self::TimeZone(minutes) => {
        let magnitude = minutes.unsigned_abs();
        Cbor::Array(vec![
          Cbor::Unsigned(32),
          Cbor::Bool(*minutes >= 0),
          Cbor::Unsigned(u64::from(magnitude / 60)),
          Cbor::Unsigned(u64::from(magnitude % 60)),
        ])
      }
    }
  }
}
