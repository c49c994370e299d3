//! Binary codec for Dhall expressions.
//!
//! Encodes a Dhall abstract syntax tree into the subset of CBOR
//! (RFC 7049) whose SHA-256 digest is the expression's semantic integrity
//! check, and decodes such CBOR back into a tree. Encoding is total and
//! deterministic down to the byte; decoding validates shape and reports
//! structured errors carrying the CBOR path of the failure.
//!
//! The codec does not parse, type-check, normalize or resolve imports;
//! it transforms trees. It does not assume its input is normalized; it
//! merely encodes α-normalized variables (all named `_`) in a more
//! compact form.

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
#[cfg(test)]
extern crate rand;

pub mod builtin;
pub mod cbor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod expr;
pub mod hash;
pub mod import;
pub mod op;

pub use crate::{
  cbor::Cbor,
  error::{
    DecodeError,
    DecodeErrorKind,
  },
  expr::Expr,
};

#[cfg(test)]
pub mod tests {
  use quickcheck::Gen;
  use rand::Rng;

  pub fn frequency<T, F: Fn(&mut Gen) -> T>(
    g: &mut Gen,
    gens: Vec<(i64, F)>,
  ) -> T {
    if gens.iter().any(|(v, _)| *v < 0) {
      panic!("Negative weight");
    }
    let sum: i64 = gens.iter().map(|x| x.0).sum();
    let mut rng = rand::thread_rng();
    let mut weight: i64 = rng.gen_range(1..=sum);
    for gen in gens {
      if weight - gen.0 <= 0 {
        return gen.1(g);
      }
      else {
        weight -= gen.0;
      }
    }
    panic!("Calculation error for weight = {}", weight)
  }
}
