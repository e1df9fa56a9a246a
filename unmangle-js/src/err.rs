use ast_js::StructureError;
use core::fmt;
use core::fmt::Display;
use core::fmt::Formatter;
use parse_js::error::SyntaxError;
use std::error::Error;

#[derive(Debug)]
pub enum UnmangleError {
  /// The input did not parse.
  Syntax(SyntaxError),
  /// A pass hit a structural invariant violation (cyclic subtree); the run
  /// is aborted rather than risking a half-rewritten tree.
  Structure(StructureError),
}

impl Display for UnmangleError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      UnmangleError::Syntax(err) => write!(f, "syntax error: {err}"),
      UnmangleError::Structure(err) => write!(f, "internal invariant violation: {err}"),
    }
  }
}

impl Error for UnmangleError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      UnmangleError::Syntax(err) => Some(err),
      UnmangleError::Structure(err) => Some(err),
    }
  }
}

impl From<SyntaxError> for UnmangleError {
  fn from(err: SyntaxError) -> Self {
    UnmangleError::Syntax(err)
  }
}

impl From<StructureError> for UnmangleError {
  fn from(err: StructureError) -> Self {
    UnmangleError::Structure(err)
  }
}
