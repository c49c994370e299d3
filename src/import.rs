use crate::expr::Expr;

/// An unresolved import together with how it is to be interpreted and the
/// expected digest of its resolved, normalized content (raw 32 bytes; the
/// multihash framing is a wire concern).
#[derive(PartialEq, Clone, Debug)]
pub struct Import {
  pub target: ImportTarget,
  pub mode: ImportMode,
  pub hash: Option<[u8; 32]>,
}

#[derive(PartialEq, Clone, Debug)]
pub enum ImportTarget {
  Remote(Url),
  Local(FilePrefix, File),
  Env(String),
  Missing,
}

/// How the fetched content is interpreted.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ImportMode {
  Code,
  RawText,
  Location,
  RawBytes,
}

impl ImportMode {
  pub fn code(self) -> u64 {
    match self {
      Self::Code => 0,
      Self::RawText => 1,
      Self::Location => 2,
      Self::RawBytes => 3,
    }
  }

  pub fn from_code(code: u64) -> Option<Self> {
    match code {
      0 => Some(Self::Code),
      1 => Some(Self::RawText),
      2 => Some(Self::Location),
      3 => Some(Self::RawBytes),
      _ => None,
    }
  }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Scheme {
  Http,
  Https,
}

impl Scheme {
  pub fn code(self) -> u64 {
    match self {
      Self::Http => 0,
      Self::Https => 1,
    }
  }
}

/// Where a local path is anchored. The wire discriminants continue the
/// scheme numbering, so they start at 2.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FilePrefix {
  Absolute,
  Here,
  Parent,
  Home,
}

impl FilePrefix {
  pub fn code(self) -> u64 {
    match self {
      Self::Absolute => 2,
      Self::Here => 3,
      Self::Parent => 4,
      Self::Home => 5,
    }
  }

  pub fn from_code(code: u64) -> Option<Self> {
    match code {
      2 => Some(Self::Absolute),
      3 => Some(Self::Here),
      4 => Some(Self::Parent),
      5 => Some(Self::Home),
      _ => None,
    }
  }
}

/// A path: directory components in root-first order, then the file name.
/// Stored in wire order, so nothing reverses on encode or decode. An
/// origin with an empty path is represented as the file `""` with no
/// directories, which is how `/` serializes.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct File {
  pub directory: Vec<String>,
  pub file: String,
}

/// A remote origin. The authority keeps any userinfo and port but has no
/// leading `//` or trailing `/`; the query drops its leading `?`.
#[derive(PartialEq, Clone, Debug)]
pub struct Url {
  pub scheme: Scheme,
  pub authority: String,
  pub path: File,
  pub query: Option<String>,
  pub headers: Option<Box<Expr>>,
}
