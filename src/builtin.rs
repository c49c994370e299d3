use std::fmt;

/// The closed set of builtin identifiers. Each one crosses the wire as a
/// naked text string equal to its source spelling.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Builtin {
  NaturalBuild,
  NaturalFold,
  NaturalIsZero,
  NaturalEven,
  NaturalOdd,
  NaturalToInteger,
  NaturalShow,
  NaturalSubtract,
  IntegerToDouble,
  IntegerShow,
  IntegerNegate,
  IntegerClamp,
  DoubleShow,
  ListBuild,
  ListFold,
  ListLength,
  ListHead,
  ListLast,
  ListIndexed,
  ListReverse,
  TextShow,
  TextReplace,
  DateShow,
  TimeShow,
  TimeZoneShow,
  Bool,
  Optional,
  None,
  Natural,
  Integer,
  Double,
  Text,
  Bytes,
  List,
  Date,
  Time,
  TimeZone,
}

pub const ALL_BUILTINS: [Builtin; 37] = [
  Builtin::NaturalBuild,
  Builtin::NaturalFold,
  Builtin::NaturalIsZero,
  Builtin::NaturalEven,
  Builtin::NaturalOdd,
  Builtin::NaturalToInteger,
  Builtin::NaturalShow,
  Builtin::NaturalSubtract,
  Builtin::IntegerToDouble,
  Builtin::IntegerShow,
  Builtin::IntegerNegate,
  Builtin::IntegerClamp,
  Builtin::DoubleShow,
  Builtin::ListBuild,
  Builtin::ListFold,
  Builtin::ListLength,
  Builtin::ListHead,
  Builtin::ListLast,
  Builtin::ListIndexed,
  Builtin::ListReverse,
  Builtin::TextShow,
  Builtin::TextReplace,
  Builtin::DateShow,
  Builtin::TimeShow,
  Builtin::TimeZoneShow,
  Builtin::Bool,
  Builtin::Optional,
  Builtin::None,
  Builtin::Natural,
  Builtin::Integer,
  Builtin::Double,
  Builtin::Text,
  Builtin::Bytes,
  Builtin::List,
  Builtin::Date,
  Builtin::Time,
  Builtin::TimeZone,
];

impl Builtin {
  pub fn name(self) -> &'static str {
    match self {
      Self::NaturalBuild => "Natural/build",
      Self::NaturalFold => "Natural/fold",
      Self::NaturalIsZero => "Natural/isZero",
      Self::NaturalEven => "Natural/even",
      Self::NaturalOdd => "Natural/odd",
      Self::NaturalToInteger => "Natural/toInteger",
      Self::NaturalShow => "Natural/show",
      Self::NaturalSubtract => "Natural/subtract",
      Self::IntegerToDouble => "Integer/toDouble",
      Self::IntegerShow => "Integer/show",
      Self::IntegerNegate => "Integer/negate",
      Self::IntegerClamp => "Integer/clamp",
      Self::DoubleShow => "Double/show",
      Self::ListBuild => "List/build",
      Self::ListFold => "List/fold",
      Self::ListLength => "List/length",
      Self::ListHead => "List/head",
      Self::ListLast => "List/last",
      Self::ListIndexed => "List/indexed",
      Self::ListReverse => "List/reverse",
      Self::TextShow => "Text/show",
      Self::TextReplace => "Text/replace",
      Self::DateShow => "Date/show",
      Self::TimeShow => "Time/show",
      Self::TimeZoneShow => "TimeZone/show",
      Self::Bool => "Bool",
      Self::Optional => "Optional",
      Self::None => "None",
      Self::Natural => "Natural",
      Self::Integer => "Integer",
      Self::Double => "Double",
      Self::Text => "Text",
      Self::Bytes => "Bytes",
      Self::List => "List",
      Self::Date => "Date",
      Self::Time => "Time",
      Self::TimeZone => "TimeZone",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "Natural/build" => Some(Self::NaturalBuild),
      "Natural/fold" => Some(Self::NaturalFold),
      "Natural/isZero" => Some(Self::NaturalIsZero),
      "Natural/even" => Some(Self::NaturalEven),
      "Natural/odd" => Some(Self::NaturalOdd),
      "Natural/toInteger" => Some(Self::NaturalToInteger),
      "Natural/show" => Some(Self::NaturalShow),
      "Natural/subtract" => Some(Self::NaturalSubtract),
      "Integer/toDouble" => Some(Self::IntegerToDouble),
      "Integer/show" => Some(Self::IntegerShow),
      "Integer/negate" => Some(Self::IntegerNegate),
      "Integer/clamp" => Some(Self::IntegerClamp),
      "Double/show" => Some(Self::DoubleShow),
      "List/build" => Some(Self::ListBuild),
      "List/fold" => Some(Self::ListFold),
      "List/length" => Some(Self::ListLength),
      "List/head" => Some(Self::ListHead),
      "List/last" => Some(Self::ListLast),
      "List/indexed" => Some(Self::ListIndexed),
      "List/reverse" => Some(Self::ListReverse),
      "Text/show" => Some(Self::TextShow),
      "Text/replace" => Some(Self::TextReplace),
      "Date/show" => Some(Self::DateShow),
      "Time/show" => Some(Self::TimeShow),
      "TimeZone/show" => Some(Self::TimeZoneShow),
      "Bool" => Some(Self::Bool),
      "Optional" => Some(Self::Optional),
      "None" => Some(Self::None),
      "Natural" => Some(Self::Natural),
      "Integer" => Some(Self::Integer),
      "Double" => Some(Self::Double),
      "Text" => Some(Self::Text),
      "Bytes" => Some(Self::Bytes),
      "List" => Some(Self::List),
      "Date" => Some(Self::Date),
      "Time" => Some(Self::Time),
      "TimeZone" => Some(Self::TimeZone),
      _ => None,
    }
  }
}

impl fmt::Display for Builtin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Type universes.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Const {
  Type,
  Kind,
  Sort,
}

pub const ALL_CONSTS: [Const; 3] = [Const::Type, Const::Kind, Const::Sort];

impl Const {
  pub fn name(self) -> &'static str {
    match self {
      Self::Type => "Type",
      Self::Kind => "Kind",
      Self::Sort => "Sort",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "Type" => Some(Self::Type),
      "Kind" => Some(Self::Kind),
      "Sort" => Some(Self::Sort),
      _ => None,
    }
  }
}

impl fmt::Display for Const {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
