use crate::{
  builtin::{
    Builtin,
    Const,
  },
  import::Import,
  op::BinOp,
};

use num_bigint::{
  BigInt,
  BigUint,
};

use std::collections::BTreeMap;

/// An IEEE-754 double compared by bit pattern, so `0.0` and `-0.0` stay
/// distinct and the canonical NaN equals itself. Both matter for
/// round-trip tests: the two zeros encode differently, and float equality
/// would make every NaN unequal to itself.
#[derive(Clone, Copy, Debug)]
pub struct Double(pub f64);

impl PartialEq for Double {
  fn eq(&self, other: &Self) -> bool {
    self.0.to_bits() == other.0.to_bits()
  }
}

impl From<f64> for Double {
  fn from(x: f64) -> Self {
    Double(x)
  }
}

/// One step of a `with` path.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum PathComponent {
  Label(String),
  /// The `?` step that updates through an `Optional`.
  DescendOptional,
}

/// A Dhall expression, in the shape the binary codec works on. The tree
/// is immutable; both codec directions build fresh trees and never touch
/// their input.
///
/// Conventions carried by the variants:
/// - `Var` holds a de Bruijn-indexed name; after α-normalization every
///   bound name is `_`.
/// - `App` keeps its arguments flattened, at least one.
/// - `EmptyList` stores the annotation as written (usually `List T`).
/// - `Let` is a single binding (name, optional annotation, value, body);
///   contiguous chains are flattened on the wire only.
/// - `TextLit` is interleaved `(prefix, interpolation)` chunks followed by
///   the trailing text.
/// - `Time` stores the seconds as an integer mantissa scaled by
///   `10^precision`, preserving how many fractional digits were written.
/// - `TimeZone` is the signed offset in minutes.
#[derive(PartialEq, Clone, Debug)]
pub enum Expr {
  Var(String, BigUint),
  Builtin(Builtin),
  Const(Const),
  Lam(String, Box<(Expr, Expr)>),
  Pi(String, Box<(Expr, Expr)>),
  App(Box<Expr>, Vec<Expr>),
  Op(BinOp, Box<(Expr, Expr)>),
  Complete(Box<(Expr, Expr)>),
  EmptyList(Box<Expr>),
  NonEmptyList(Vec<Expr>),
  Some(Box<Expr>),
  Merge(Box<(Expr, Expr)>, Option<Box<Expr>>),
  ToMap(Box<Expr>, Option<Box<Expr>>),
  ShowConstructor(Box<Expr>),
  RecordType(BTreeMap<String, Expr>),
  RecordLit(BTreeMap<String, Expr>),
  Field(Box<Expr>, String),
  Project(Box<Expr>, Vec<String>),
  ProjectByType(Box<(Expr, Expr)>),
  UnionType(BTreeMap<String, Option<Expr>>),
  BoolIf(Box<(Expr, Expr, Expr)>),
  BoolLit(bool),
  NaturalLit(BigUint),
  IntegerLit(BigInt),
  DoubleLit(Double),
  TextLit(Vec<(String, Expr)>, String),
  BytesLit(Vec<u8>),
  Assert(Box<Expr>),
  Import(Import),
  Let(String, Option<Box<Expr>>, Box<(Expr, Expr)>),
  Annot(Box<(Expr, Expr)>),
  With(Box<(Expr, Expr)>, Vec<PathComponent>),
  Date(u16, u8, u8),
  Time(u8, u8, BigUint, u8),
  TimeZone(i16),
}

#[cfg(test)]
pub mod tests {
  use super::*;
  use crate::{
    cbor::tests::arbitrary_biguint,
    import::{
      File,
      FilePrefix,
      ImportMode,
      ImportTarget,
      Scheme,
      Url,
    },
    tests::frequency,
  };
  use quickcheck::{
    Arbitrary,
    Gen,
  };
  use rand::Rng;

  pub fn arbitrary_name(g: &mut Gen) -> String {
    let alphabet = ['a', 'b', 'c', 'x', 'y', 'z'];
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(1..=4);
    (0..len).map(|_| *g.choose(&alphabet).unwrap()).collect()
  }

  pub fn arbitrary_bigint(g: &mut Gen) -> BigInt {
    let bytes: Vec<u8> = Arbitrary::arbitrary(g);
    BigInt::from_signed_bytes_be(&bytes)
  }

  pub fn arbitrary_double(g: &mut Gen) -> Double {
    let x: f64 = Arbitrary::arbitrary(g);
    // the codec canonicalizes NaN payloads, so the generator produces
    // only the NaN that survives a round trip
    Double(if x.is_nan() { f64::NAN } else { x })
  }

  fn arbitrary_digest(g: &mut Gen) -> [u8; 32] {
    let mut bytes: [u8; 32] = [0; 32];
    for x in bytes.iter_mut() {
      *x = Arbitrary::arbitrary(g);
    }
    bytes
  }

  fn arbitrary_file(g: &mut Gen) -> File {
    let mut rng = rand::thread_rng();
    let dirs = rng.gen_range(0..3);
    File {
      directory: (0..dirs).map(|_| arbitrary_name(g)).collect(),
      file: arbitrary_name(g),
    }
  }

  pub fn arbitrary_import(g: &mut Gen, depth: usize) -> Import {
    let mut rng = rand::thread_rng();
    let target = match rng.gen_range(0..4) {
      0 => {
        let headers = if depth > 0 && bool::arbitrary(g) {
          Option::Some(Box::new(arbitrary_expr(g, 0)))
        }
        else {
          Option::None
        };
        ImportTarget::Remote(Url {
          scheme: Arbitrary::arbitrary(g),
          authority: arbitrary_name(g),
          path: arbitrary_file(g),
          query: Arbitrary::arbitrary(g),
          headers,
        })
      }
      1 => ImportTarget::Local(FilePrefix::arbitrary(g), arbitrary_file(g)),
      2 => ImportTarget::Env(arbitrary_name(g)),
      _ => ImportTarget::Missing,
    };
    let hash = if bool::arbitrary(g) {
      Option::Some(arbitrary_digest(g))
    }
    else {
      Option::None
    };
    Import { target, mode: Arbitrary::arbitrary(g), hash }
  }

  fn arbitrary_path(g: &mut Gen) -> Vec<PathComponent> {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(1..=3);
    (0..len)
      .map(|_| {
        if bool::arbitrary(g) {
          PathComponent::Label(arbitrary_name(g))
        }
        else {
          PathComponent::DescendOptional
        }
      })
      .collect()
  }

  fn arbitrary_leaf(g: &mut Gen) -> Expr {
    frequency(g, vec![
      (100, Box::new(|g: &mut Gen| {
        Expr::Var("_".to_owned(), arbitrary_biguint(g))
      }) as Box<dyn Fn(&mut Gen) -> Expr>),
      (100, Box::new(|g| Expr::Var(arbitrary_name(g), arbitrary_biguint(g)))),
      (100, Box::new(|g| Expr::Builtin(Arbitrary::arbitrary(g)))),
      (50, Box::new(|g| Expr::Const(Arbitrary::arbitrary(g)))),
      (100, Box::new(|g| Expr::BoolLit(Arbitrary::arbitrary(g)))),
      (100, Box::new(|g| Expr::NaturalLit(arbitrary_biguint(g)))),
      (100, Box::new(|g| Expr::IntegerLit(arbitrary_bigint(g)))),
      (100, Box::new(|g| Expr::DoubleLit(arbitrary_double(g)))),
      (50, Box::new(|g| Expr::BytesLit(Arbitrary::arbitrary(g)))),
      (50, Box::new(|g| Expr::TextLit(Vec::new(), arbitrary_name(g)))),
      (50, Box::new(|g| {
        Expr::Date(
          Arbitrary::arbitrary(g),
          Arbitrary::arbitrary(g),
          Arbitrary::arbitrary(g),
        )
      })),
      (50, Box::new(|g| {
        Expr::Time(
          Arbitrary::arbitrary(g),
          Arbitrary::arbitrary(g),
          arbitrary_biguint(g),
          Arbitrary::arbitrary(g),
        )
      })),
      (50, Box::new(|g| Expr::TimeZone(Arbitrary::arbitrary(g)))),
      (30, Box::new(|g| Expr::Import(arbitrary_import(g, 0)))),
    ])
  }

  fn arbitrary_fields(
    g: &mut Gen,
    depth: usize,
  ) -> BTreeMap<String, Expr> {
    let mut rng = rand::thread_rng();
    let size = rng.gen_range(0..3);
    (0..size)
      .map(|_| (arbitrary_name(g), arbitrary_expr(g, depth)))
      .collect()
  }

  pub fn arbitrary_expr(g: &mut Gen, depth: usize) -> Expr {
    if depth == 0 {
      return arbitrary_leaf(g);
    }
    let d = depth - 1;
    frequency(g, vec![
      (200, Box::new(move |g: &mut Gen| arbitrary_leaf(g))
        as Box<dyn Fn(&mut Gen) -> Expr>),
      (60, Box::new(move |g| {
        let name =
          if bool::arbitrary(g) { "_".to_owned() } else { arbitrary_name(g) };
        Expr::Lam(
          name,
          Box::new((arbitrary_expr(g, d), arbitrary_expr(g, d))),
        )
      })),
      (60, Box::new(move |g| {
        let name =
          if bool::arbitrary(g) { "_".to_owned() } else { arbitrary_name(g) };
        Expr::Pi(name, Box::new((arbitrary_expr(g, d), arbitrary_expr(g, d))))
      })),
      (60, Box::new(move |g| {
        // the head is a leaf so flattening cannot restructure the spine
        let mut rng = rand::thread_rng();
        let args = (0..rng.gen_range(1..=3))
          .map(|_| arbitrary_expr(g, d))
          .collect();
        Expr::App(Box::new(arbitrary_leaf(g)), args)
      })),
      (60, Box::new(move |g| {
        Expr::Op(
          Arbitrary::arbitrary(g),
          Box::new((arbitrary_expr(g, d), arbitrary_expr(g, d))),
        )
      })),
      (30, Box::new(move |g| {
        Expr::Complete(Box::new((arbitrary_expr(g, d), arbitrary_expr(g, d))))
      })),
      (40, Box::new(move |g| {
        let annot = if bool::arbitrary(g) {
          Expr::App(Box::new(Expr::Builtin(Builtin::List)), vec![
            arbitrary_expr(g, d),
          ])
        }
        else {
          arbitrary_expr(g, d)
        };
        Expr::EmptyList(Box::new(annot))
      })),
      (40, Box::new(move |g| {
        let mut rng = rand::thread_rng();
        let elems =
          (0..rng.gen_range(1..=3)).map(|_| arbitrary_expr(g, d)).collect();
        Expr::NonEmptyList(elems)
      })),
      (40, Box::new(move |g| Expr::Some(Box::new(arbitrary_expr(g, d))))),
      (30, Box::new(move |g| {
        let annot = if bool::arbitrary(g) {
          Option::Some(Box::new(arbitrary_expr(g, d)))
        }
        else {
          Option::None
        };
        Expr::Merge(
          Box::new((arbitrary_expr(g, d), arbitrary_expr(g, d))),
          annot,
        )
      })),
      (30, Box::new(move |g| {
        let annot = if bool::arbitrary(g) {
          Option::Some(Box::new(arbitrary_expr(g, d)))
        }
        else {
          Option::None
        };
        Expr::ToMap(Box::new(arbitrary_expr(g, d)), annot)
      })),
      (20, Box::new(move |g| {
        Expr::ShowConstructor(Box::new(arbitrary_expr(g, d)))
      })),
      (40, Box::new(move |g| Expr::RecordType(arbitrary_fields(g, d)))),
      (40, Box::new(move |g| Expr::RecordLit(arbitrary_fields(g, d)))),
      (40, Box::new(move |g| {
        Expr::Field(Box::new(arbitrary_expr(g, d)), arbitrary_name(g))
      })),
      (30, Box::new(move |g| {
        let mut rng = rand::thread_rng();
        let labels =
          (0..rng.gen_range(0..3)).map(|_| arbitrary_name(g)).collect();
        Expr::Project(Box::new(arbitrary_expr(g, d)), labels)
      })),
      (20, Box::new(move |g| {
        Expr::ProjectByType(Box::new((
          arbitrary_expr(g, d),
          arbitrary_expr(g, d),
        )))
      })),
      (40, Box::new(move |g| {
        let mut rng = rand::thread_rng();
        let size = rng.gen_range(0..3);
        let alts = (0..size)
          .map(|_| {
            let payload = if bool::arbitrary(g) {
              Option::Some(arbitrary_expr(g, d))
            }
            else {
              Option::None
            };
            (arbitrary_name(g), payload)
          })
          .collect();
        Expr::UnionType(alts)
      })),
      (30, Box::new(move |g| {
        Expr::BoolIf(Box::new((
          arbitrary_expr(g, d),
          arbitrary_expr(g, d),
          arbitrary_expr(g, d),
        )))
      })),
      (40, Box::new(move |g| {
        let mut rng = rand::thread_rng();
        let chunks = (0..rng.gen_range(1..=2))
          .map(|_| (arbitrary_name(g), arbitrary_expr(g, d)))
          .collect();
        Expr::TextLit(chunks, arbitrary_name(g))
      })),
      (20, Box::new(move |g| Expr::Assert(Box::new(arbitrary_expr(g, d))))),
      (30, Box::new(move |g| Expr::Import(arbitrary_import(g, d)))),
      (40, Box::new(move |g| {
        let annot = if bool::arbitrary(g) {
          Option::Some(Box::new(arbitrary_expr(g, d)))
        }
        else {
          Option::None
        };
        Expr::Let(
          arbitrary_name(g),
          annot,
          Box::new((arbitrary_expr(g, d), arbitrary_expr(g, d))),
        )
      })),
      (30, Box::new(move |g| {
        Expr::Annot(Box::new((arbitrary_expr(g, d), arbitrary_expr(g, d))))
      })),
      (30, Box::new(move |g| {
        Expr::With(
          Box::new((arbitrary_expr(g, d), arbitrary_expr(g, d))),
          arbitrary_path(g),
        )
      })),
    ])
  }

  impl Arbitrary for Expr {
    fn arbitrary(g: &mut Gen) -> Self {
      arbitrary_expr(g, 3)
    }
  }

  #[test]
  fn double_equality_is_bitwise() {
    assert_eq!(Double(0.0), Double(0.0));
    assert_ne!(Double(0.0), Double(-0.0));
    assert_eq!(Double(f64::NAN), Double(f64::NAN));
    assert_ne!(Double(1.0), Double(2.0));
  }
}
