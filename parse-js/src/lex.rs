use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;

/// Token types. Identifier-like words (including reserved words) all lex as
/// `Ident`; the parser decides keyword-ness from the token text, which keeps
/// contextual keywords (`of`, `get`, `static`, ...) trivial.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TT {
  Eof,
  Ident,
  PrivateIdent,
  Num,
  BigIntLit,
  Str,
  Regex,
  TemplateStart,
  Amp,
  AmpAmp,
  AmpAmpAssign,
  AmpAssign,
  Arrow,
  Bang,
  Caret,
  CaretAssign,
  Colon,
  Comma,
  Dot,
  DotDotDot,
  Eq,
  Assign,
  Ge,
  Gt,
  LBrace,
  LBracket,
  LParen,
  Le,
  Lt,
  Minus,
  MinusAssign,
  MinusMinus,
  NotEq,
  Percent,
  PercentAssign,
  Pipe,
  PipeAssign,
  PipePipe,
  PipePipeAssign,
  Plus,
  PlusAssign,
  PlusPlus,
  Question,
  QuestionDot,
  QuestionQuestion,
  QuestionQuestionAssign,
  RBrace,
  RBracket,
  RParen,
  Semicolon,
  Shl,
  ShlAssign,
  Shr,
  ShrAssign,
  Slash,
  SlashAssign,
  Star,
  StarAssign,
  StarStar,
  StarStarAssign,
  StrictEq,
  StrictNotEq,
  Tilde,
  UShr,
  UShrAssign,
}

#[derive(Clone, Copy, Debug)]
pub struct Token {
  pub tt: TT,
  pub start: usize,
  pub end: usize,
  /// Whether a line terminator occurred between the previous token and this
  /// one; drives automatic semicolon handling and restricted productions.
  pub newline_before: bool,
}

fn is_ident_start(c: char) -> bool {
  c.is_ascii_alphabetic() || c == '_' || c == '$' || !c.is_ascii()
}

fn is_ident_continue(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '$' || !c.is_ascii()
}

/// Byte-cursor lexer. `Copy` so the parser can checkpoint and re-lex (used
/// for `/` regex disambiguation and arrow-function lookahead).
#[derive(Clone, Copy, Debug)]
pub struct Lexer<'a> {
  src: &'a str,
  pos: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(src: &'a str) -> Lexer<'a> {
    Lexer { src, pos: 0 }
  }

  pub fn source(&self) -> &'a str {
    self.src
  }

  pub fn pos(&self) -> usize {
    self.pos
  }

  /// Repositions the cursor; used when template-literal parsing resumes raw
  /// scanning after a substitution's closing brace.
  pub fn set_pos(&mut self, pos: usize) {
    self.pos = pos;
  }

  fn rest(&self) -> &'a str {
    &self.src[self.pos..]
  }

  fn peek_char(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn bump_char(&mut self) -> Option<char> {
    let c = self.peek_char()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  fn eat(&mut self, prefix: &str) -> bool {
    if self.rest().starts_with(prefix) {
      self.pos += prefix.len();
      true
    } else {
      false
    }
  }

  fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    SyntaxError::new(typ, self.pos)
  }

  /// Skips whitespace and comments; reports whether a line terminator was
  /// crossed.
  fn skip_trivia(&mut self) -> SyntaxResult<bool> {
    let mut newline = false;
    loop {
      match self.peek_char() {
        Some(c) if c.is_whitespace() => {
          if c == '\n' || c == '\r' || c == '\u{2028}' || c == '\u{2029}' {
            newline = true;
          }
          self.bump_char();
        }
        Some('/') if self.rest().starts_with("//") => {
          while let Some(c) = self.peek_char() {
            if c == '\n' || c == '\r' {
              break;
            }
            self.bump_char();
          }
        }
        Some('/') if self.rest().starts_with("/*") => {
          self.pos += 2;
          let Some(end) = self.rest().find("*/") else {
            return Err(self.error(SyntaxErrorType::UnterminatedComment));
          };
          if self.rest()[..end].contains(['\n', '\r']) {
            newline = true;
          }
          self.pos += end + 2;
        }
        _ => return Ok(newline),
      }
    }
  }

  pub fn next_token(&mut self) -> SyntaxResult<Token> {
    let newline_before = self.skip_trivia()?;
    let start = self.pos;
    let Some(c) = self.peek_char() else {
      return Ok(Token {
        tt: TT::Eof,
        start,
        end: start,
        newline_before,
      });
    };
    let tt = if is_ident_start(c) {
      self.bump_char();
      while let Some(c) = self.peek_char() {
        if !is_ident_continue(c) {
          break;
        }
        self.bump_char();
      }
      TT::Ident
    } else if c.is_ascii_digit() || (c == '.' && self.dot_starts_number()) {
      self.lex_number()?
    } else if c == '"' || c == '\'' {
      self.lex_string(c)?;
      TT::Str
    } else if c == '`' {
      self.bump_char();
      TT::TemplateStart
    } else if c == '#' {
      self.bump_char();
      while let Some(c) = self.peek_char() {
        if !is_ident_continue(c) {
          break;
        }
        self.bump_char();
      }
      TT::PrivateIdent
    } else {
      self.lex_punct()?
    };
    Ok(Token {
      tt,
      start,
      end: self.pos,
      newline_before,
    })
  }

  fn dot_starts_number(&self) -> bool {
    let mut chars = self.rest().chars();
    chars.next();
    matches!(chars.next(), Some(c) if c.is_ascii_digit())
  }

  fn lex_number(&mut self) -> SyntaxResult<TT> {
    let start = self.pos;
    if self.eat("0x") || self.eat("0X") {
      self.eat_digits(16);
    } else if self.eat("0o") || self.eat("0O") {
      self.eat_digits(8);
    } else if self.eat("0b") || self.eat("0B") {
      self.eat_digits(2);
    } else {
      self.eat_digits(10);
      if self.peek_char() == Some('.') {
        self.bump_char();
        self.eat_digits(10);
      }
      if matches!(self.peek_char(), Some('e') | Some('E')) {
        self.bump_char();
        if matches!(self.peek_char(), Some('+') | Some('-')) {
          self.bump_char();
        }
        if !matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
          return Err(self.error(SyntaxErrorType::MalformedNumber));
        }
        self.eat_digits(10);
      }
    }
    if self.pos == start {
      return Err(self.error(SyntaxErrorType::MalformedNumber));
    }
    if self.peek_char() == Some('n') {
      self.bump_char();
      return Ok(TT::BigIntLit);
    }
    if matches!(self.peek_char(), Some(c) if is_ident_start(c)) {
      return Err(self.error(SyntaxErrorType::MalformedNumber));
    }
    Ok(TT::Num)
  }

  fn eat_digits(&mut self, radix: u32) {
    while let Some(c) = self.peek_char() {
      if c.to_digit(radix).is_none() {
        break;
      }
      self.bump_char();
    }
  }

  fn lex_string(&mut self, quote: char) -> SyntaxResult<()> {
    self.bump_char();
    loop {
      match self.bump_char() {
        None => return Err(self.error(SyntaxErrorType::UnterminatedString)),
        Some(c) if c == quote => return Ok(()),
        Some('\\') => {
          if self.bump_char().is_none() {
            return Err(self.error(SyntaxErrorType::UnterminatedString));
          }
        }
        Some('\n') | Some('\r') => {
          return Err(self.error(SyntaxErrorType::UnterminatedString));
        }
        Some(_) => {}
      }
    }
  }

  /// Re-lexes from the start of a `/` or `/=` token as a regex literal.
  pub fn relex_regex(&mut self, start: usize) -> SyntaxResult<Token> {
    self.pos = start;
    self.bump_char();
    let mut in_class = false;
    loop {
      match self.bump_char() {
        None | Some('\n') | Some('\r') => {
          return Err(self.error(SyntaxErrorType::UnterminatedRegex));
        }
        Some('\\') => {
          if self.bump_char().is_none() {
            return Err(self.error(SyntaxErrorType::UnterminatedRegex));
          }
        }
        Some('[') => in_class = true,
        Some(']') => in_class = false,
        Some('/') if !in_class => break,
        Some(_) => {}
      }
    }
    while let Some(c) = self.peek_char() {
      if !is_ident_continue(c) {
        break;
      }
      self.bump_char();
    }
    Ok(Token {
      tt: TT::Regex,
      start,
      end: self.pos,
      newline_before: false,
    })
  }

  /// Lexes one template-literal part, starting just after a backtick or a
  /// substitution's `{`...`}` close. Returns (raw, ends_template).
  pub fn template_part(&mut self) -> SyntaxResult<(&'a str, bool)> {
    let start = self.pos;
    loop {
      match self.peek_char() {
        None => return Err(self.error(SyntaxErrorType::UnterminatedTemplate)),
        Some('`') => {
          let raw = &self.src[start..self.pos];
          self.bump_char();
          return Ok((raw, true));
        }
        Some('$') if self.rest().starts_with("${") => {
          let raw = &self.src[start..self.pos];
          self.pos += 2;
          return Ok((raw, false));
        }
        Some('\\') => {
          self.bump_char();
          if self.bump_char().is_none() {
            return Err(self.error(SyntaxErrorType::UnterminatedTemplate));
          }
        }
        Some(_) => {
          self.bump_char();
        }
      }
    }
  }

  fn lex_punct(&mut self) -> SyntaxResult<TT> {
    // Longest match first within each leading character.
    static TABLE: &[(&str, TT)] = &[
      (">>>=", TT::UShrAssign),
      ("...", TT::DotDotDot),
      ("===", TT::StrictEq),
      ("!==", TT::StrictNotEq),
      ("**=", TT::StarStarAssign),
      ("<<=", TT::ShlAssign),
      (">>=", TT::ShrAssign),
      (">>>", TT::UShr),
      ("&&=", TT::AmpAmpAssign),
      ("||=", TT::PipePipeAssign),
      ("??=", TT::QuestionQuestionAssign),
      ("=>", TT::Arrow),
      ("==", TT::Eq),
      ("!=", TT::NotEq),
      ("<=", TT::Le),
      (">=", TT::Ge),
      ("<<", TT::Shl),
      (">>", TT::Shr),
      ("&&", TT::AmpAmp),
      ("||", TT::PipePipe),
      ("??", TT::QuestionQuestion),
      ("?.", TT::QuestionDot),
      ("++", TT::PlusPlus),
      ("--", TT::MinusMinus),
      ("+=", TT::PlusAssign),
      ("-=", TT::MinusAssign),
      ("*=", TT::StarAssign),
      ("/=", TT::SlashAssign),
      ("%=", TT::PercentAssign),
      ("&=", TT::AmpAssign),
      ("|=", TT::PipeAssign),
      ("^=", TT::CaretAssign),
      ("**", TT::StarStar),
      ("{", TT::LBrace),
      ("}", TT::RBrace),
      ("(", TT::LParen),
      (")", TT::RParen),
      ("[", TT::LBracket),
      ("]", TT::RBracket),
      (";", TT::Semicolon),
      (",", TT::Comma),
      (".", TT::Dot),
      ("<", TT::Lt),
      (">", TT::Gt),
      ("=", TT::Assign),
      ("+", TT::Plus),
      ("-", TT::Minus),
      ("*", TT::Star),
      ("/", TT::Slash),
      ("%", TT::Percent),
      ("&", TT::Amp),
      ("|", TT::Pipe),
      ("^", TT::Caret),
      ("!", TT::Bang),
      ("~", TT::Tilde),
      ("?", TT::Question),
      (":", TT::Colon),
    ];
    for (text, tt) in TABLE {
      if self.eat(text) {
        return Ok(*tt);
      }
    }
    let c = self.peek_char().unwrap_or('\0');
    Err(self.error(SyntaxErrorType::UnexpectedChar(c)))
  }
}

/// Cooks the body of a string literal (quotes excluded) into its runtime
/// value.
pub fn cook_string(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    let Some(esc) = chars.next() else {
      break;
    };
    match esc {
      'n' => out.push('\n'),
      't' => out.push('\t'),
      'r' => out.push('\r'),
      'b' => out.push('\u{8}'),
      'f' => out.push('\u{c}'),
      'v' => out.push('\u{b}'),
      '0' => out.push('\0'),
      'x' => {
        let hex: String = chars.by_ref().take(2).collect();
        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
          Some(c) => out.push(c),
          None => out.push_str(&hex),
        }
      }
      'u' => {
        let mut peek = chars.clone();
        if peek.next() == Some('{') {
          chars.next();
          let hex: String = chars.by_ref().take_while(|c| *c != '}').collect();
          if let Some(c) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            out.push(c);
          }
        } else {
          let hex: String = chars.by_ref().take(4).collect();
          match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            Some(c) => out.push(c),
            None => out.push_str(&hex),
          }
        }
      }
      '\n' => {}
      '\r' => {
        // \<CRLF> line continuation.
        let mut peek = chars.clone();
        if peek.next() == Some('\n') {
          chars.next();
        }
      }
      other => out.push(other),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<TT> {
    let mut lexer = Lexer::new(src);
    let mut out = Vec::new();
    loop {
      let tok = lexer.next_token().unwrap();
      if tok.tt == TT::Eof {
        return out;
      }
      out.push(tok.tt);
    }
  }

  #[test]
  fn lexes_punctuation_longest_first() {
    assert_eq!(kinds("a >>>= b"), vec![TT::Ident, TT::UShrAssign, TT::Ident]);
    assert_eq!(kinds("a?.b ?? c"), vec![
      TT::Ident,
      TT::QuestionDot,
      TT::Ident,
      TT::QuestionQuestion,
      TT::Ident
    ]);
  }

  #[test]
  fn lexes_numbers() {
    assert_eq!(kinds("0x5f 12.5 1e3 .5 10n"), vec![
      TT::Num,
      TT::Num,
      TT::Num,
      TT::Num,
      TT::BigIntLit
    ]);
  }

  #[test]
  fn tracks_newlines_across_comments() {
    let mut lexer = Lexer::new("a // c\nb /* x\ny */ c");
    assert!(!lexer.next_token().unwrap().newline_before);
    assert!(lexer.next_token().unwrap().newline_before);
    assert!(lexer.next_token().unwrap().newline_before);
  }

  #[test]
  fn cooks_escapes() {
    assert_eq!(cook_string("a\\x20b"), "a b");
    assert_eq!(cook_string("\\u0041\\n"), "A\n");
    assert_eq!(cook_string("\\q"), "q");
  }
}
