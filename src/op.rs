use std::fmt;

/// Binary operators, in wire-code order. Record completion (`::`) shares
/// the operator encoding slot under code [`COMPLETION_CODE`] but is its
/// own expression variant.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BinOp {
  BoolOr,
  BoolAnd,
  BoolEQ,
  BoolNE,
  NaturalPlus,
  NaturalTimes,
  TextAppend,
  ListAppend,
  Combine,
  Prefer,
  CombineTypes,
  ImportAlt,
  Equivalence,
}

/// The operator code the completion expression `T::r` encodes under.
pub const COMPLETION_CODE: u64 = 13;

pub const ALL_OPS: [BinOp; 13] = [
  BinOp::BoolOr,
  BinOp::BoolAnd,
  BinOp::BoolEQ,
  BinOp::BoolNE,
  BinOp::NaturalPlus,
  BinOp::NaturalTimes,
  BinOp::TextAppend,
  BinOp::ListAppend,
  BinOp::Combine,
  BinOp::Prefer,
  BinOp::CombineTypes,
  BinOp::ImportAlt,
  BinOp::Equivalence,
];

impl BinOp {
  pub fn code(self) -> u64 {
    match self {
      Self::BoolOr => 0,
      Self::BoolAnd => 1,
      Self::BoolEQ => 2,
      Self::BoolNE => 3,
      Self::NaturalPlus => 4,
      Self::NaturalTimes => 5,
      Self::TextAppend => 6,
      Self::ListAppend => 7,
      Self::Combine => 8,
      Self::Prefer => 9,
      Self::CombineTypes => 10,
      Self::ImportAlt => 11,
      Self::Equivalence => 12,
    }
  }

  pub fn from_code(code: u64) -> Option<Self> {
    match code {
      0 => Some(Self::BoolOr),
      1 => Some(Self::BoolAnd),
      2 => Some(Self::BoolEQ),
      3 => Some(Self::BoolNE),
      4 => Some(Self::NaturalPlus),
      5 => Some(Self::NaturalTimes),
      6 => Some(Self::TextAppend),
      7 => Some(Self::ListAppend),
      8 => Some(Self::Combine),
      9 => Some(Self::Prefer),
      10 => Some(Self::CombineTypes),
      11 => Some(Self::ImportAlt),
      12 => Some(Self::Equivalence),
      _ => None,
    }
  }
}

impl fmt::Display for BinOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BoolOr => write!(f, "||"),
      Self::BoolAnd => write!(f, "&&"),
      Self::BoolEQ => write!(f, "=="),
      Self::BoolNE => write!(f, "!="),
      Self::NaturalPlus => write!(f, "+"),
      Self::NaturalTimes => write!(f, "*"),
      Self::TextAppend => write!(f, "++"),
      Self::ListAppend => write!(f, "#"),
      Self::Combine => write!(f, "∧"),
      Self::Prefer => write!(f, "⫽"),
      Self::CombineTypes => write!(f, "⩓"),
      Self::ImportAlt => write!(f, "?"),
      Self::Equivalence => write!(f, "==="),
    }
  }
}
