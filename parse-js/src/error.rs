use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::fmt::Formatter;
use std::error::Error;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedSyntax(&'static str),
  ExpectedToken(&'static str),
  InvalidAssignmentTarget,
  MalformedNumber,
  UnexpectedChar(char),
  UnexpectedEnd,
  UnexpectedToken,
  UnterminatedComment,
  UnterminatedRegex,
  UnterminatedString,
  UnterminatedTemplate,
}

#[derive(Clone, Copy, Eq)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  /// Byte offset into the source.
  pub pos: usize,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, pos: usize) -> SyntaxError {
    SyntaxError { typ, pos }
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} at position {}", self, self.pos)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self.typ {
      SyntaxErrorType::ExpectedSyntax(what) => write!(f, "expected {what}"),
      SyntaxErrorType::ExpectedToken(tok) => write!(f, "expected `{tok}`"),
      SyntaxErrorType::InvalidAssignmentTarget => write!(f, "invalid assignment target"),
      SyntaxErrorType::MalformedNumber => write!(f, "malformed number literal"),
      SyntaxErrorType::UnexpectedChar(c) => write!(f, "unexpected character `{c}`"),
      SyntaxErrorType::UnexpectedEnd => write!(f, "unexpected end of input"),
      SyntaxErrorType::UnexpectedToken => write!(f, "unexpected token"),
      SyntaxErrorType::UnterminatedComment => write!(f, "unterminated comment"),
      SyntaxErrorType::UnterminatedRegex => write!(f, "unterminated regular expression"),
      SyntaxErrorType::UnterminatedString => write!(f, "unterminated string literal"),
      SyntaxErrorType::UnterminatedTemplate => write!(f, "unterminated template literal"),
    }
  }
}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Error for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;
