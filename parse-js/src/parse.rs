use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::cook_string;
use crate::lex::Lexer;
use crate::lex::Token;
use crate::lex::TT;
use ast_js::num;
use ast_js::syntax::AssignOp;
use ast_js::syntax::BinaryOp;
use ast_js::syntax::LogicalOp;
use ast_js::syntax::MethodKind;
use ast_js::syntax::PropertyKind;
use ast_js::syntax::UnaryOp;
use ast_js::syntax::UpdateOp;
use ast_js::syntax::VarDeclKind;
use ast_js::Ast;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;
use ast_js::Value;
use num_bigint::BigInt;

pub struct Parser<'a> {
  lexer: Lexer<'a>,
  tok: Token,
  tree: Tree,
  /// (is_generator, is_async) for the enclosing function, governing whether
  /// `yield`/`await` parse as operators or plain identifiers.
  fn_ctx: Vec<(bool, bool)>,
}

impl<'a> Parser<'a> {
  pub fn new(source: &'a str) -> SyntaxResult<Parser<'a>> {
    let mut lexer = Lexer::new(source);
    let tok = lexer.next_token()?;
    Ok(Parser {
      lexer,
      tok,
      tree: Tree::new(),
      fn_ctx: vec![(false, false)],
    })
  }

  pub fn parse_program(mut self) -> SyntaxResult<Ast> {
    let mut body = Vec::new();
    while self.tok.tt != TT::Eof {
      body.push(self.parse_stmt()?);
    }
    let root = self.tree.alloc(Syntax::Program { body });
    let mut tree = self.tree;
    tree.link_parents(root);
    Ok(Ast { tree, root })
  }

  fn bump(&mut self) -> SyntaxResult<Token> {
    let tok = self.tok;
    self.tok = self.lexer.next_token()?;
    Ok(tok)
  }

  fn checkpoint(&self) -> (Lexer<'a>, Token) {
    (self.lexer, self.tok)
  }

  fn restore(&mut self, saved: (Lexer<'a>, Token)) {
    self.lexer = saved.0;
    self.tok = saved.1;
  }

  fn text(&self, tok: Token) -> &'a str {
    &self.lexer.source()[tok.start..tok.end]
  }

  fn at(&self, tt: TT) -> bool {
    self.tok.tt == tt
  }

  fn at_word(&self, word: &str) -> bool {
    self.tok.tt == TT::Ident && self.text(self.tok) == word
  }

  fn eat(&mut self, tt: TT) -> SyntaxResult<bool> {
    if self.at(tt) {
      self.bump()?;
      Ok(true)
    } else {
      Ok(false)
    }
  }

  fn expect(&mut self, tt: TT, name: &'static str) -> SyntaxResult<Token> {
    if self.at(tt) {
      self.bump()
    } else {
      Err(self.error(SyntaxErrorType::ExpectedToken(name)))
    }
  }

  fn expect_word(&mut self, word: &'static str) -> SyntaxResult<Token> {
    if self.at_word(word) {
      self.bump()
    } else {
      Err(self.error(SyntaxErrorType::ExpectedToken(word)))
    }
  }

  fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    SyntaxError::new(typ, self.tok.start)
  }

  /// Automatic semicolon insertion: an explicit `;`, a closing brace, end of
  /// input, or a preceding line terminator all end the statement.
  fn semicolon(&mut self) -> SyntaxResult<()> {
    if self.eat(TT::Semicolon)? {
      return Ok(());
    }
    if self.at(TT::RBrace) || self.at(TT::Eof) || self.tok.newline_before {
      return Ok(());
    }
    Err(self.error(SyntaxErrorType::ExpectedToken(";")))
  }

  fn in_generator(&self) -> bool {
    self.fn_ctx.last().map(|c| c.0).unwrap_or(false)
  }

  fn in_async(&self) -> bool {
    self.fn_ctx.last().map(|c| c.1).unwrap_or(false)
  }

  // ---- statements ----

  fn parse_stmt(&mut self) -> SyntaxResult<NodeId> {
    match self.tok.tt {
      TT::LBrace => self.parse_block(),
      TT::Semicolon => {
        self.bump()?;
        Ok(self.tree.alloc(Syntax::EmptyStatement))
      }
      TT::Ident => match self.text(self.tok) {
        "var" | "const" => self.parse_var_stmt(),
        "let" if self.let_starts_declaration() => self.parse_var_stmt(),
        "function" => self.parse_function(true, false),
        "async" if self.async_starts_function() => {
          self.bump()?;
          self.parse_function(true, true)
        }
        "class" => self.parse_class(true),
        "if" => self.parse_if(),
        "switch" => self.parse_switch(),
        "while" => self.parse_while(),
        "do" => self.parse_do_while(),
        "for" => self.parse_for(),
        "try" => self.parse_try(),
        "return" => self.parse_return(),
        "throw" => self.parse_throw(),
        "break" | "continue" => self.parse_break_continue(),
        "debugger" => {
          self.bump()?;
          self.semicolon()?;
          Ok(self.tree.alloc(Syntax::DebuggerStatement))
        }
        "with" => self.parse_with(),
        _ => self.parse_labeled_or_expr_stmt(),
      },
      _ => self.parse_expr_stmt(),
    }
  }

  fn let_starts_declaration(&self) -> bool {
    let mut lexer = self.lexer;
    match lexer.next_token() {
      Ok(next) => matches!(next.tt, TT::Ident | TT::LBracket | TT::LBrace),
      Err(_) => false,
    }
  }

  fn async_starts_function(&self) -> bool {
    let mut lexer = self.lexer;
    match lexer.next_token() {
      Ok(next) => {
        !next.newline_before
          && next.tt == TT::Ident
          && &self.lexer.source()[next.start..next.end] == "function"
      }
      Err(_) => false,
    }
  }

  fn parse_block(&mut self) -> SyntaxResult<NodeId> {
    self.expect(TT::LBrace, "{")?;
    let mut body = Vec::new();
    while !self.at(TT::RBrace) {
      if self.at(TT::Eof) {
        return Err(self.error(SyntaxErrorType::UnexpectedEnd));
      }
      body.push(self.parse_stmt()?);
    }
    self.bump()?;
    Ok(self.tree.alloc(Syntax::BlockStatement { body }))
  }

  fn parse_var_stmt(&mut self) -> SyntaxResult<NodeId> {
    let decl = self.parse_var_decl(false)?;
    self.semicolon()?;
    Ok(decl)
  }

  fn parse_var_decl(&mut self, no_in: bool) -> SyntaxResult<NodeId> {
    let kw = self.bump()?;
    let kind = match self.text(kw) {
      "var" => VarDeclKind::Var,
      "let" => VarDeclKind::Let,
      _ => VarDeclKind::Const,
    };
    let mut declarations = Vec::new();
    loop {
      declarations.push(self.parse_declarator(no_in)?);
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    Ok(self.tree.alloc(Syntax::VariableDeclaration {
      kind,
      declarations,
    }))
  }

  fn parse_declarator(&mut self, no_in: bool) -> SyntaxResult<NodeId> {
    let id = self.parse_binding_pattern()?;
    let init = if self.eat(TT::Assign)? {
      Some(self.parse_assign(no_in)?)
    } else {
      None
    };
    Ok(self.tree.alloc(Syntax::VariableDeclarator { id, init }))
  }

  fn parse_if(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    self.expect(TT::LParen, "(")?;
    let test = self.parse_expr(false)?;
    self.expect(TT::RParen, ")")?;
    let consequent = self.parse_stmt()?;
    let alternate = if self.at_word("else") {
      self.bump()?;
      Some(self.parse_stmt()?)
    } else {
      None
    };
    Ok(self.tree.alloc(Syntax::IfStatement {
      test,
      consequent,
      alternate,
    }))
  }

  fn parse_switch(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    self.expect(TT::LParen, "(")?;
    let discriminant = self.parse_expr(false)?;
    self.expect(TT::RParen, ")")?;
    self.expect(TT::LBrace, "{")?;
    let mut cases = Vec::new();
    while !self.eat(TT::RBrace)? {
      let test = if self.at_word("case") {
        self.bump()?;
        Some(self.parse_expr(false)?)
      } else if self.at_word("default") {
        self.bump()?;
        None
      } else {
        return Err(self.error(SyntaxErrorType::ExpectedSyntax("switch case")));
      };
      self.expect(TT::Colon, ":")?;
      let mut consequent = Vec::new();
      while !self.at(TT::RBrace) && !self.at_word("case") && !self.at_word("default") {
        consequent.push(self.parse_stmt()?);
      }
      cases.push(self.tree.alloc(Syntax::SwitchCase { test, consequent }));
    }
    Ok(self.tree.alloc(Syntax::SwitchStatement {
      discriminant,
      cases,
    }))
  }

  fn parse_while(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    self.expect(TT::LParen, "(")?;
    let test = self.parse_expr(false)?;
    self.expect(TT::RParen, ")")?;
    let body = self.parse_stmt()?;
    Ok(self.tree.alloc(Syntax::WhileStatement { test, body }))
  }

  fn parse_do_while(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    let body = self.parse_stmt()?;
    self.expect_word("while")?;
    self.expect(TT::LParen, "(")?;
    let test = self.parse_expr(false)?;
    self.expect(TT::RParen, ")")?;
    // The trailing semicolon after do-while is always optional.
    self.eat(TT::Semicolon)?;
    Ok(self.tree.alloc(Syntax::DoWhileStatement { body, test }))
  }

  fn parse_for(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    self.expect(TT::LParen, "(")?;
    let init = if self.at(TT::Semicolon) {
      None
    } else if self.at_word("var")
      || self.at_word("const")
      || (self.at_word("let") && self.let_starts_declaration())
    {
      Some(self.parse_var_decl(true)?)
    } else {
      Some(self.parse_expr(true)?)
    };
    if let Some(left) = init {
      if self.at_word("of") || self.at_word("in") {
        let is_of = self.at_word("of");
        self.bump()?;
        let right = if is_of {
          self.parse_assign(false)?
        } else {
          self.parse_expr(false)?
        };
        self.expect(TT::RParen, ")")?;
        let body = self.parse_stmt()?;
        return Ok(self.tree.alloc(if is_of {
          Syntax::ForOfStatement {
            left,
            right,
            body,
            is_await: false,
          }
        } else {
          Syntax::ForInStatement { left, right, body }
        }));
      }
    }
    self.expect(TT::Semicolon, ";")?;
    let test = if self.at(TT::Semicolon) {
      None
    } else {
      Some(self.parse_expr(false)?)
    };
    self.expect(TT::Semicolon, ";")?;
    let update = if self.at(TT::RParen) {
      None
    } else {
      Some(self.parse_expr(false)?)
    };
    self.expect(TT::RParen, ")")?;
    let body = self.parse_stmt()?;
    Ok(self.tree.alloc(Syntax::ForStatement {
      init,
      test,
      update,
      body,
    }))
  }

  fn parse_try(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    let block = self.parse_block()?;
    let handler = if self.at_word("catch") {
      self.bump()?;
      let param = if self.eat(TT::LParen)? {
        let pattern = self.parse_binding_pattern()?;
        self.expect(TT::RParen, ")")?;
        Some(pattern)
      } else {
        None
      };
      let body = self.parse_block()?;
      Some(self.tree.alloc(Syntax::CatchClause { param, body }))
    } else {
      None
    };
    let finalizer = if self.at_word("finally") {
      self.bump()?;
      Some(self.parse_block()?)
    } else {
      None
    };
    if handler.is_none() && finalizer.is_none() {
      return Err(self.error(SyntaxErrorType::ExpectedSyntax("catch or finally")));
    }
    Ok(self.tree.alloc(Syntax::TryStatement {
      block,
      handler,
      finalizer,
    }))
  }

  fn parse_return(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    let argument = if self.at(TT::Semicolon)
      || self.at(TT::RBrace)
      || self.at(TT::Eof)
      || self.tok.newline_before
    {
      None
    } else {
      Some(self.parse_expr(false)?)
    };
    self.semicolon()?;
    Ok(self.tree.alloc(Syntax::ReturnStatement { argument }))
  }

  fn parse_throw(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    let argument = self.parse_expr(false)?;
    self.semicolon()?;
    Ok(self.tree.alloc(Syntax::ThrowStatement { argument }))
  }

  fn parse_break_continue(&mut self) -> SyntaxResult<NodeId> {
    let kw = self.bump()?;
    let is_break = self.text(kw) == "break";
    let label = if self.at(TT::Ident) && !self.tok.newline_before {
      let tok = self.bump()?;
      Some(
        self
          .tree
          .new_identifier(&self.lexer.source()[tok.start..tok.end], None),
      )
    } else {
      None
    };
    self.semicolon()?;
    Ok(self.tree.alloc(if is_break {
      Syntax::BreakStatement { label }
    } else {
      Syntax::ContinueStatement { label }
    }))
  }

  fn parse_with(&mut self) -> SyntaxResult<NodeId> {
    self.bump()?;
    self.expect(TT::LParen, "(")?;
    let object = self.parse_expr(false)?;
    self.expect(TT::RParen, ")")?;
    let body = self.parse_stmt()?;
    Ok(self.tree.alloc(Syntax::WithStatement { object, body }))
  }

  fn parse_labeled_or_expr_stmt(&mut self) -> SyntaxResult<NodeId> {
    let saved = self.checkpoint();
    let word = self.bump()?;
    if self.at(TT::Colon) {
      self.bump()?;
      let label = self
        .tree
        .new_identifier(&self.lexer.source()[word.start..word.end], None);
      let body = self.parse_stmt()?;
      return Ok(self.tree.alloc(Syntax::LabeledStatement { label, body }));
    }
    self.restore(saved);
    self.parse_expr_stmt()
  }

  fn parse_expr_stmt(&mut self) -> SyntaxResult<NodeId> {
    let expression = self.parse_expr(false)?;
    self.semicolon()?;
    Ok(self.tree.alloc(Syntax::ExpressionStatement { expression }))
  }

  // ---- functions and classes ----

  fn parse_function(&mut self, is_decl: bool, is_async: bool) -> SyntaxResult<NodeId> {
    self.expect_word("function")?;
    let is_generator = self.eat(TT::Star)?;
    let id = if self.at(TT::Ident) {
      let tok = self.bump()?;
      Some(
        self
          .tree
          .new_identifier(&self.lexer.source()[tok.start..tok.end], None),
      )
    } else {
      None
    };
    self.fn_ctx.push((is_generator, is_async));
    let params = self.parse_params()?;
    let body = self.parse_block()?;
    self.fn_ctx.pop();
    Ok(self.tree.alloc(if is_decl {
      Syntax::FunctionDeclaration {
        id,
        params,
        body,
        is_async,
        is_generator,
      }
    } else {
      Syntax::FunctionExpression {
        id,
        params,
        body,
        is_async,
        is_generator,
      }
    }))
  }

  fn parse_params(&mut self) -> SyntaxResult<Vec<NodeId>> {
    self.expect(TT::LParen, "(")?;
    let mut params = Vec::new();
    while !self.at(TT::RParen) {
      if self.eat(TT::DotDotDot)? {
        let argument = self.parse_binding_pattern()?;
        params.push(self.tree.alloc(Syntax::RestElement { argument }));
      } else {
        params.push(self.parse_binding_element()?);
      }
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    self.expect(TT::RParen, ")")?;
    Ok(params)
  }

  fn parse_binding_element(&mut self) -> SyntaxResult<NodeId> {
    let left = self.parse_binding_pattern()?;
    if self.eat(TT::Assign)? {
      let right = self.parse_assign(false)?;
      return Ok(self.tree.alloc(Syntax::AssignmentPattern { left, right }));
    }
    Ok(left)
  }

  fn parse_binding_pattern(&mut self) -> SyntaxResult<NodeId> {
    match self.tok.tt {
      TT::Ident => {
        let tok = self.bump()?;
        Ok(
          self
            .tree
            .new_identifier(&self.lexer.source()[tok.start..tok.end], None),
        )
      }
      TT::LBracket => {
        self.bump()?;
        let mut elements = Vec::new();
        while !self.at(TT::RBracket) {
          if self.at(TT::Comma) {
            self.bump()?;
            elements.push(None);
            continue;
          }
          if self.eat(TT::DotDotDot)? {
            let argument = self.parse_binding_pattern()?;
            elements.push(Some(self.tree.alloc(Syntax::RestElement { argument })));
          } else {
            elements.push(Some(self.parse_binding_element()?));
          }
          if !self.at(TT::RBracket) {
            self.expect(TT::Comma, ",")?;
          }
        }
        self.bump()?;
        Ok(self.tree.alloc(Syntax::ArrayPattern { elements }))
      }
      TT::LBrace => {
        self.bump()?;
        let mut properties = Vec::new();
        while !self.at(TT::RBrace) {
          if self.eat(TT::DotDotDot)? {
            let argument = self.parse_binding_pattern()?;
            properties.push(self.tree.alloc(Syntax::RestElement { argument }));
          } else {
            let (key, computed) = self.parse_property_key()?;
            let value = if self.eat(TT::Colon)? {
              self.parse_binding_element()?
            } else {
              let name = match self.tree.syntax(key).ident_name() {
                Some(name) => name.to_string(),
                None => return Err(self.error(SyntaxErrorType::ExpectedSyntax("binding name"))),
              };
              let shorthand = self.tree.new_identifier(&name, None);
              if self.eat(TT::Assign)? {
                let right = self.parse_assign(false)?;
                self.tree.alloc(Syntax::AssignmentPattern {
                  left: shorthand,
                  right,
                })
              } else {
                shorthand
              }
            };
            let shorthand = matches!(self.tree.syntax(value).ident_name(), Some(n)
              if Some(n) == self.tree.syntax(key).ident_name())
              || matches!(self.tree.syntax(value), Syntax::AssignmentPattern { left, .. }
                if self.tree.syntax(*left).ident_name() == self.tree.syntax(key).ident_name());
            properties.push(self.tree.alloc(Syntax::Property {
              key,
              value,
              kind: PropertyKind::Init,
              computed,
              shorthand,
              method: false,
            }));
          }
          if !self.at(TT::RBrace) {
            self.expect(TT::Comma, ",")?;
          }
        }
        self.bump()?;
        Ok(self.tree.alloc(Syntax::ObjectPattern { properties }))
      }
      _ => Err(self.error(SyntaxErrorType::ExpectedSyntax("binding pattern"))),
    }
  }

  fn parse_class(&mut self, is_decl: bool) -> SyntaxResult<NodeId> {
    self.expect_word("class")?;
    let id = if self.at(TT::Ident) && !self.at_word("extends") {
      let tok = self.bump()?;
      Some(
        self
          .tree
          .new_identifier(&self.lexer.source()[tok.start..tok.end], None),
      )
    } else {
      None
    };
    let super_class = if self.at_word("extends") {
      self.bump()?;
      Some(self.parse_lhs_expr()?)
    } else {
      None
    };
    self.expect(TT::LBrace, "{")?;
    let mut members = Vec::new();
    while !self.at(TT::RBrace) {
      if self.eat(TT::Semicolon)? {
        continue;
      }
      members.push(self.parse_class_member()?);
    }
    self.bump()?;
    let body = self.tree.alloc(Syntax::ClassBody { body: members });
    Ok(self.tree.alloc(if is_decl {
      Syntax::ClassDeclaration {
        id,
        super_class,
        body,
      }
    } else {
      Syntax::ClassExpression {
        id,
        super_class,
        body,
      }
    }))
  }

  fn parse_class_member(&mut self) -> SyntaxResult<NodeId> {
    let is_static = self.at_word("static") && {
      let saved = self.checkpoint();
      self.bump()?;
      let is_modifier = !matches!(self.tok.tt, TT::LParen | TT::Assign | TT::Semicolon);
      if !is_modifier {
        self.restore(saved);
      }
      is_modifier
    };
    if is_static && self.at(TT::LBrace) {
      let block = self.parse_block()?;
      let body = match self.tree.syntax(block) {
        Syntax::BlockStatement { body } => body.clone(),
        _ => Vec::new(),
      };
      return Ok(self.tree.alloc(Syntax::StaticBlock { body }));
    }
    let mut kind = MethodKind::Method;
    let mut is_async = false;
    let mut is_generator = false;
    loop {
      if (self.at_word("get") || self.at_word("set") || self.at_word("async"))
        && self.next_starts_member_name()
      {
        let word = self.bump()?;
        match self.text(word) {
          "get" => kind = MethodKind::Get,
          "set" => kind = MethodKind::Set,
          _ => is_async = true,
        }
        continue;
      }
      if self.at(TT::Star) {
        self.bump()?;
        is_generator = true;
        continue;
      }
      break;
    }
    let (key, computed) = self.parse_property_key()?;
    if self.at(TT::LParen) {
      self.fn_ctx.push((is_generator, is_async));
      let params = self.parse_params()?;
      let body = self.parse_block()?;
      self.fn_ctx.pop();
      let value = self.tree.alloc(Syntax::FunctionExpression {
        id: None,
        params,
        body,
        is_async,
        is_generator,
      });
      let kind = if kind == MethodKind::Method
        && !is_static
        && !computed
        && matches!(self.tree.syntax(key).ident_name(), Some("constructor"))
      {
        MethodKind::Constructor
      } else {
        kind
      };
      return Ok(self.tree.alloc(Syntax::MethodDefinition {
        key,
        value,
        kind,
        computed,
        is_static,
      }));
    }
    let value = if self.eat(TT::Assign)? {
      Some(self.parse_assign(false)?)
    } else {
      None
    };
    self.semicolon()?;
    Ok(self.tree.alloc(Syntax::PropertyDefinition {
      key,
      value,
      computed,
      is_static,
    }))
  }

  fn next_starts_member_name(&self) -> bool {
    let mut lexer = self.lexer;
    match lexer.next_token() {
      Ok(next) => matches!(
        next.tt,
        TT::Ident | TT::Str | TT::Num | TT::LBracket | TT::PrivateIdent | TT::Star
      ),
      Err(_) => false,
    }
  }

  fn parse_property_key(&mut self) -> SyntaxResult<(NodeId, bool)> {
    match self.tok.tt {
      TT::LBracket => {
        self.bump()?;
        let key = self.parse_assign(false)?;
        self.expect(TT::RBracket, "]")?;
        Ok((key, true))
      }
      TT::Str => {
        let tok = self.bump()?;
        Ok((self.string_literal(tok), false))
      }
      TT::Num => {
        let tok = self.bump()?;
        Ok((self.number_literal(tok)?, false))
      }
      TT::PrivateIdent => {
        let tok = self.bump()?;
        let name = self.lexer.source()[tok.start + 1..tok.end].to_string();
        Ok((self.tree.alloc(Syntax::PrivateIdentifier { name }), false))
      }
      TT::Ident => {
        let tok = self.bump()?;
        let id = self
          .tree
          .new_identifier(&self.lexer.source()[tok.start..tok.end], None);
        Ok((id, false))
      }
      _ => Err(self.error(SyntaxErrorType::ExpectedSyntax("property key"))),
    }
  }

  // ---- expressions ----

  fn parse_expr(&mut self, no_in: bool) -> SyntaxResult<NodeId> {
    let first = self.parse_assign(no_in)?;
    if !self.at(TT::Comma) {
      return Ok(first);
    }
    let mut expressions = vec![first];
    while self.eat(TT::Comma)? {
      expressions.push(self.parse_assign(no_in)?);
    }
    Ok(self.tree.alloc(Syntax::SequenceExpression { expressions }))
  }

  fn parse_assign(&mut self, no_in: bool) -> SyntaxResult<NodeId> {
    if let Some(arrow) = self.try_parse_arrow()? {
      return Ok(arrow);
    }
    if self.at_word("yield") && self.in_generator() {
      return self.parse_yield(no_in);
    }
    let left = self.parse_conditional(no_in)?;
    let operator = match self.tok.tt {
      TT::Assign => AssignOp::Assign,
      TT::PlusAssign => AssignOp::AddAssign,
      TT::MinusAssign => AssignOp::SubAssign,
      TT::StarAssign => AssignOp::MulAssign,
      TT::SlashAssign => AssignOp::DivAssign,
      TT::PercentAssign => AssignOp::RemAssign,
      TT::StarStarAssign => AssignOp::ExpAssign,
      TT::ShlAssign => AssignOp::ShlAssign,
      TT::ShrAssign => AssignOp::ShrAssign,
      TT::UShrAssign => AssignOp::UnsignedShrAssign,
      TT::AmpAssign => AssignOp::BitAndAssign,
      TT::PipeAssign => AssignOp::BitOrAssign,
      TT::CaretAssign => AssignOp::BitXorAssign,
      TT::AmpAmpAssign => AssignOp::AndAssign,
      TT::PipePipeAssign => AssignOp::OrAssign,
      TT::QuestionQuestionAssign => AssignOp::NullishAssign,
      _ => return Ok(left),
    };
    if !self.is_assignment_target(left) {
      return Err(self.error(SyntaxErrorType::InvalidAssignmentTarget));
    }
    self.bump()?;
    let right = self.parse_assign(no_in)?;
    Ok(self.tree.alloc(Syntax::AssignmentExpression {
      operator,
      left,
      right,
    }))
  }

  fn is_assignment_target(&self, id: NodeId) -> bool {
    matches!(
      self.tree.syntax(id),
      Syntax::Identifier { .. }
        | Syntax::MemberExpression { .. }
        | Syntax::ArrayExpression { .. }
        | Syntax::ObjectExpression { .. }
        | Syntax::ArrayPattern { .. }
        | Syntax::ObjectPattern { .. }
    )
  }

  fn parse_yield(&mut self, no_in: bool) -> SyntaxResult<NodeId> {
    self.bump()?;
    let delegate = self.eat(TT::Star)?;
    let argument = if self.tok.newline_before
      || matches!(
        self.tok.tt,
        TT::Semicolon | TT::RParen | TT::RBracket | TT::RBrace | TT::Comma | TT::Colon | TT::Eof
      ) {
      None
    } else {
      Some(self.parse_assign(no_in)?)
    };
    Ok(self.tree.alloc(Syntax::YieldExpression { argument, delegate }))
  }

  /// Arrow functions need lookahead: a bare identifier or a balanced
  /// parenthesized list is an arrow head only when `=>` follows.
  fn try_parse_arrow(&mut self) -> SyntaxResult<Option<NodeId>> {
    let is_async = self.at_word("async") && {
      let mut lexer = self.lexer;
      match lexer.next_token() {
        Ok(next) => !next.newline_before && matches!(next.tt, TT::Ident | TT::LParen),
        Err(_) => false,
      }
    } && !self.async_starts_function();
    let saved = self.checkpoint();
    if is_async {
      self.bump()?;
    }
    match self.tok.tt {
      TT::Ident if !self.at_word("function") => {
        let word = self.bump()?;
        if self.at(TT::Arrow) && !self.tok.newline_before {
          let param = self
            .tree
            .new_identifier(&self.lexer.source()[word.start..word.end], None);
          let arrow = self.finish_arrow(vec![param], is_async)?;
          return Ok(Some(arrow));
        }
        self.restore(saved);
        Ok(None)
      }
      TT::LParen => {
        if !self.paren_starts_arrow() {
          self.restore(saved);
          return Ok(None);
        }
        let params = self.parse_params()?;
        let arrow = self.finish_arrow(params, is_async)?;
        Ok(Some(arrow))
      }
      _ => {
        self.restore(saved);
        Ok(None)
      }
    }
  }

  fn paren_starts_arrow(&self) -> bool {
    let mut lexer = self.lexer;
    let mut depth = 0usize;
    let mut tok = self.tok;
    loop {
      match tok.tt {
        TT::LParen | TT::LBracket | TT::LBrace => depth += 1,
        TT::RParen | TT::RBracket | TT::RBrace => {
          depth -= 1;
          if depth == 0 {
            return matches!(lexer.next_token(), Ok(next) if next.tt == TT::Arrow);
          }
        }
        TT::Eof => return false,
        _ => {}
      }
      tok = match lexer.next_token() {
        Ok(t) => t,
        Err(_) => return false,
      };
    }
  }

  fn finish_arrow(&mut self, params: Vec<NodeId>, is_async: bool) -> SyntaxResult<NodeId> {
    self.expect(TT::Arrow, "=>")?;
    self.fn_ctx.push((false, is_async));
    let (body, expression) = if self.at(TT::LBrace) {
      (self.parse_block()?, false)
    } else {
      (self.parse_assign(false)?, true)
    };
    self.fn_ctx.pop();
    Ok(self.tree.alloc(Syntax::ArrowFunctionExpression {
      params,
      body,
      is_async,
      expression,
    }))
  }

  fn parse_conditional(&mut self, no_in: bool) -> SyntaxResult<NodeId> {
    let test = self.parse_binary(no_in, 0)?;
    if !self.eat(TT::Question)? {
      return Ok(test);
    }
    let consequent = self.parse_assign(false)?;
    self.expect(TT::Colon, ":")?;
    let alternate = self.parse_assign(no_in)?;
    Ok(self.tree.alloc(Syntax::ConditionalExpression {
      test,
      consequent,
      alternate,
    }))
  }

  fn binary_op(&self, no_in: bool) -> Option<(u8, bool, Result<BinaryOp, LogicalOp>)> {
    // Precedence values match the serializer's operator table.
    Some(match self.tok.tt {
      TT::PipePipe => (2, false, Err(LogicalOp::Or)),
      TT::QuestionQuestion => (3, false, Err(LogicalOp::Nullish)),
      TT::AmpAmp => (4, false, Err(LogicalOp::And)),
      TT::Pipe => (5, false, Ok(BinaryOp::BitOr)),
      TT::Caret => (6, false, Ok(BinaryOp::BitXor)),
      TT::Amp => (7, false, Ok(BinaryOp::BitAnd)),
      TT::Eq => (8, false, Ok(BinaryOp::LooseEq)),
      TT::NotEq => (8, false, Ok(BinaryOp::LooseNotEq)),
      TT::StrictEq => (8, false, Ok(BinaryOp::StrictEq)),
      TT::StrictNotEq => (8, false, Ok(BinaryOp::StrictNotEq)),
      TT::Lt => (9, false, Ok(BinaryOp::Lt)),
      TT::Le => (9, false, Ok(BinaryOp::LtEq)),
      TT::Gt => (9, false, Ok(BinaryOp::Gt)),
      TT::Ge => (9, false, Ok(BinaryOp::GtEq)),
      TT::Ident if self.at_word("instanceof") => (9, false, Ok(BinaryOp::Instanceof)),
      TT::Ident if self.at_word("in") && !no_in => (9, false, Ok(BinaryOp::In)),
      TT::Shl => (10, false, Ok(BinaryOp::Shl)),
      TT::Shr => (10, false, Ok(BinaryOp::Shr)),
      TT::UShr => (10, false, Ok(BinaryOp::UnsignedShr)),
      TT::Plus => (11, false, Ok(BinaryOp::Add)),
      TT::Minus => (11, false, Ok(BinaryOp::Sub)),
      TT::Star => (12, false, Ok(BinaryOp::Mul)),
      TT::Slash => (12, false, Ok(BinaryOp::Div)),
      TT::Percent => (12, false, Ok(BinaryOp::Rem)),
      TT::StarStar => (13, true, Ok(BinaryOp::Exp)),
      _ => return None,
    })
  }

  fn parse_binary(&mut self, no_in: bool, min_prec: u8) -> SyntaxResult<NodeId> {
    let mut left = self.parse_unary(no_in)?;
    while let Some((prec, right_assoc, op)) = self.binary_op(no_in) {
      if prec < min_prec {
        break;
      }
      self.bump()?;
      let next_min = if right_assoc { prec } else { prec + 1 };
      let right = self.parse_binary(no_in, next_min)?;
      left = self.tree.alloc(match op {
        Ok(operator) => Syntax::BinaryExpression {
          operator,
          left,
          right,
        },
        Err(operator) => Syntax::LogicalExpression {
          operator,
          left,
          right,
        },
      });
    }
    Ok(left)
  }

  fn parse_unary(&mut self, no_in: bool) -> SyntaxResult<NodeId> {
    let operator = match self.tok.tt {
      TT::Bang => Some(UnaryOp::Not),
      TT::Tilde => Some(UnaryOp::BitNot),
      TT::Plus => Some(UnaryOp::Plus),
      TT::Minus => Some(UnaryOp::Minus),
      TT::Ident if self.at_word("typeof") => Some(UnaryOp::Typeof),
      TT::Ident if self.at_word("void") => Some(UnaryOp::Void),
      TT::Ident if self.at_word("delete") => Some(UnaryOp::Delete),
      _ => None,
    };
    if let Some(operator) = operator {
      self.bump()?;
      let argument = self.parse_unary(no_in)?;
      return Ok(self.tree.alloc(Syntax::UnaryExpression { operator, argument }));
    }
    if matches!(self.tok.tt, TT::PlusPlus | TT::MinusMinus) {
      let operator = if self.at(TT::PlusPlus) {
        UpdateOp::Increment
      } else {
        UpdateOp::Decrement
      };
      self.bump()?;
      let argument = self.parse_unary(no_in)?;
      return Ok(self.tree.alloc(Syntax::UpdateExpression {
        operator,
        prefix: true,
        argument,
      }));
    }
    if self.at_word("await") && self.in_async() {
      self.bump()?;
      let argument = self.parse_unary(no_in)?;
      return Ok(self.tree.alloc(Syntax::AwaitExpression { argument }));
    }
    let expr = self.parse_lhs_expr()?;
    if matches!(self.tok.tt, TT::PlusPlus | TT::MinusMinus) && !self.tok.newline_before {
      let operator = if self.at(TT::PlusPlus) {
        UpdateOp::Increment
      } else {
        UpdateOp::Decrement
      };
      self.bump()?;
      return Ok(self.tree.alloc(Syntax::UpdateExpression {
        operator,
        prefix: false,
        argument: expr,
      }));
    }
    Ok(expr)
  }

  fn parse_lhs_expr(&mut self) -> SyntaxResult<NodeId> {
    let mut optional_chain = false;
    let base = self.parse_callee()?;
    let expr = self.parse_chain(base, &mut optional_chain)?;
    if optional_chain {
      return Ok(self.tree.alloc(Syntax::ChainExpression { expression: expr }));
    }
    Ok(expr)
  }

  fn parse_callee(&mut self) -> SyntaxResult<NodeId> {
    if self.at_word("new") {
      let saved = self.checkpoint();
      self.bump()?;
      if self.at(TT::Dot) {
        self.bump()?;
        let meta_id = self.tree.new_identifier("new", None);
        let tok = self.expect(TT::Ident, "target")?;
        let prop = self
          .tree
          .new_identifier(&self.lexer.source()[tok.start..tok.end], None);
        return Ok(self.tree.alloc(Syntax::MetaProperty {
          meta: meta_id,
          property: prop,
        }));
      }
      self.restore(saved);
      return self.parse_new();
    }
    self.parse_primary()
  }

  fn parse_new(&mut self) -> SyntaxResult<NodeId> {
    self.expect_word("new")?;
    // The callee of `new` binds member accesses but not calls.
    let mut callee = self.parse_callee()?;
    loop {
      if self.at(TT::Dot) {
        self.bump()?;
        let property = self.parse_member_name()?;
        callee = self.tree.alloc(Syntax::MemberExpression {
          object: callee,
          property,
          computed: false,
          optional: false,
        });
      } else if self.at(TT::LBracket) {
        self.bump()?;
        let property = self.parse_expr(false)?;
        self.expect(TT::RBracket, "]")?;
        callee = self.tree.alloc(Syntax::MemberExpression {
          object: callee,
          property,
          computed: true,
          optional: false,
        });
      } else {
        break;
      }
    }
    let arguments = if self.at(TT::LParen) {
      self.parse_arguments()?
    } else {
      Vec::new()
    };
    Ok(self.tree.alloc(Syntax::NewExpression { callee, arguments }))
  }

  fn parse_member_name(&mut self) -> SyntaxResult<NodeId> {
    if self.at(TT::PrivateIdent) {
      let tok = self.bump()?;
      let name = self.lexer.source()[tok.start + 1..tok.end].to_string();
      return Ok(self.tree.alloc(Syntax::PrivateIdentifier { name }));
    }
    let tok = self.expect(TT::Ident, "property name")?;
    Ok(
      self
        .tree
        .new_identifier(&self.lexer.source()[tok.start..tok.end], None),
    )
  }

  fn parse_chain(&mut self, mut expr: NodeId, optional_chain: &mut bool) -> SyntaxResult<NodeId> {
    loop {
      match self.tok.tt {
        TT::Dot => {
          self.bump()?;
          let property = self.parse_member_name()?;
          expr = self.tree.alloc(Syntax::MemberExpression {
            object: expr,
            property,
            computed: false,
            optional: false,
          });
        }
        TT::QuestionDot => {
          self.bump()?;
          *optional_chain = true;
          if self.at(TT::LParen) {
            let arguments = self.parse_arguments()?;
            expr = self.tree.alloc(Syntax::CallExpression {
              callee: expr,
              arguments,
              optional: true,
            });
          } else if self.at(TT::LBracket) {
            self.bump()?;
            let property = self.parse_expr(false)?;
            self.expect(TT::RBracket, "]")?;
            expr = self.tree.alloc(Syntax::MemberExpression {
              object: expr,
              property,
              computed: true,
              optional: true,
            });
          } else {
            let property = self.parse_member_name()?;
            expr = self.tree.alloc(Syntax::MemberExpression {
              object: expr,
              property,
              computed: false,
              optional: true,
            });
          }
        }
        TT::LBracket => {
          self.bump()?;
          let property = self.parse_expr(false)?;
          self.expect(TT::RBracket, "]")?;
          expr = self.tree.alloc(Syntax::MemberExpression {
            object: expr,
            property,
            computed: true,
            optional: false,
          });
        }
        TT::LParen => {
          let arguments = self.parse_arguments()?;
          expr = self.tree.alloc(Syntax::CallExpression {
            callee: expr,
            arguments,
            optional: false,
          });
        }
        TT::TemplateStart => {
          let quasi = self.parse_template()?;
          expr = self.tree.alloc(Syntax::TaggedTemplateExpression {
            tag: expr,
            quasi,
          });
        }
        _ => return Ok(expr),
      }
    }
  }

  fn parse_arguments(&mut self) -> SyntaxResult<Vec<NodeId>> {
    self.expect(TT::LParen, "(")?;
    let mut arguments = Vec::new();
    while !self.at(TT::RParen) {
      if self.eat(TT::DotDotDot)? {
        let argument = self.parse_assign(false)?;
        arguments.push(self.tree.alloc(Syntax::SpreadElement { argument }));
      } else {
        arguments.push(self.parse_assign(false)?);
      }
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    self.expect(TT::RParen, ")")?;
    Ok(arguments)
  }

  fn string_literal(&mut self, tok: Token) -> NodeId {
    let raw = &self.lexer.source()[tok.start..tok.end];
    let cooked = cook_string(&raw[1..raw.len() - 1]);
    self.tree.alloc(Syntax::Literal {
      value: Value::Str(cooked),
      raw: Some(raw.to_string()),
    })
  }

  fn number_literal(&mut self, tok: Token) -> SyntaxResult<NodeId> {
    let raw = &self.lexer.source()[tok.start..tok.end];
    let value = num::str_to_number(raw);
    if value.is_nan() {
      return Err(SyntaxError::new(SyntaxErrorType::MalformedNumber, tok.start));
    }
    Ok(self.tree.alloc(Syntax::Literal {
      value: Value::Num(value),
      raw: Some(raw.to_string()),
    }))
  }

  fn parse_template(&mut self) -> SyntaxResult<NodeId> {
    // Current token is TemplateStart; the lexer sits just past the backtick.
    let mut quasis = Vec::new();
    let mut expressions = Vec::new();
    loop {
      let (raw, done) = self.lexer.template_part()?;
      let raw = raw.to_string();
      let quasi = self.tree.alloc(Syntax::TemplateElement {
        cooked: Some(cook_string(&raw)),
        raw,
        tail: done,
      });
      quasis.push(quasi);
      if done {
        break;
      }
      self.bump()?;
      let expr = self.parse_expr(false)?;
      if !self.at(TT::RBrace) {
        return Err(self.error(SyntaxErrorType::ExpectedToken("}")));
      }
      // Resume raw template scanning right after the closing brace instead
      // of lexing what follows as ordinary tokens.
      self.lexer.set_pos(self.tok.start + 1);
    }
    self.bump()?;
    Ok(self.tree.alloc(Syntax::TemplateLiteral {
      quasis,
      expressions,
    }))
  }

  fn parse_primary(&mut self) -> SyntaxResult<NodeId> {
    match self.tok.tt {
      TT::Num => {
        let tok = self.bump()?;
        self.number_literal(tok)
      }
      TT::BigIntLit => {
        let tok = self.bump()?;
        let raw = &self.lexer.source()[tok.start..tok.end];
        let digits = &raw[..raw.len() - 1];
        let (digits, radix) = match digits.get(..2) {
          Some("0x") | Some("0X") => (&digits[2..], 16),
          Some("0o") | Some("0O") => (&digits[2..], 8),
          Some("0b") | Some("0B") => (&digits[2..], 2),
          _ => (digits, 10),
        };
        let value = BigInt::parse_bytes(digits.as_bytes(), radix)
          .ok_or(SyntaxError::new(SyntaxErrorType::MalformedNumber, tok.start))?;
        Ok(self.tree.alloc(Syntax::Literal {
          value: Value::BigInt(value),
          raw: Some(raw.to_string()),
        }))
      }
      TT::Str => {
        let tok = self.bump()?;
        Ok(self.string_literal(tok))
      }
      TT::Slash | TT::SlashAssign => {
        let start = self.tok.start;
        let tok = self.lexer.relex_regex(start)?;
        let raw = &self.lexer.source()[tok.start..tok.end];
        let close = raw.rfind('/').expect("regex token contains closing slash");
        let value = Value::Regex {
          pattern: raw[1..close].to_string(),
          flags: raw[close + 1..].to_string(),
        };
        let node = self.tree.alloc(Syntax::Literal {
          value,
          raw: Some(raw.to_string()),
        });
        self.tok = tok;
        self.bump()?;
        Ok(node)
      }
      TT::TemplateStart => self.parse_template(),
      TT::LParen => {
        self.bump()?;
        let expr = self.parse_expr(false)?;
        self.expect(TT::RParen, ")")?;
        Ok(expr)
      }
      TT::LBracket => self.parse_array_literal(),
      TT::LBrace => self.parse_object_literal(),
      TT::Ident => {
        match self.text(self.tok) {
          "true" | "false" => {
            let tok = self.bump()?;
            let raw = self.lexer.source()[tok.start..tok.end].to_string();
            Ok(self.tree.alloc(Syntax::Literal {
              value: Value::Bool(raw == "true"),
              raw: Some(raw),
            }))
          }
          "null" => {
            let tok = self.bump()?;
            let raw = self.lexer.source()[tok.start..tok.end].to_string();
            Ok(self.tree.alloc(Syntax::Literal {
              value: Value::Null,
              raw: Some(raw),
            }))
          }
          "this" => {
            self.bump()?;
            Ok(self.tree.alloc(Syntax::ThisExpression))
          }
          "super" => {
            self.bump()?;
            Ok(self.tree.alloc(Syntax::Super))
          }
          "function" => self.parse_function(false, false),
          "async" if self.async_starts_function() => {
            self.bump()?;
            self.parse_function(false, true)
          }
          "class" => self.parse_class(false),
          "import" => {
            self.bump()?;
            self.expect(TT::LParen, "(")?;
            let source = self.parse_assign(false)?;
            self.expect(TT::RParen, ")")?;
            Ok(self.tree.alloc(Syntax::ImportExpression { source }))
          }
          _ => {
            let tok = self.bump()?;
            Ok(
              self
                .tree
                .new_identifier(&self.lexer.source()[tok.start..tok.end], None),
            )
          }
        }
      }
      TT::Eof => Err(self.error(SyntaxErrorType::UnexpectedEnd)),
      _ => Err(self.error(SyntaxErrorType::UnexpectedToken)),
    }
  }

  fn parse_array_literal(&mut self) -> SyntaxResult<NodeId> {
    self.expect(TT::LBracket, "[")?;
    let mut elements = Vec::new();
    while !self.at(TT::RBracket) {
      if self.at(TT::Comma) {
        self.bump()?;
        elements.push(None);
        continue;
      }
      if self.eat(TT::DotDotDot)? {
        let argument = self.parse_assign(false)?;
        elements.push(Some(self.tree.alloc(Syntax::SpreadElement { argument })));
      } else {
        elements.push(Some(self.parse_assign(false)?));
      }
      if !self.at(TT::RBracket) {
        self.expect(TT::Comma, ",")?;
      }
    }
    self.bump()?;
    Ok(self.tree.alloc(Syntax::ArrayExpression { elements }))
  }

  fn parse_object_literal(&mut self) -> SyntaxResult<NodeId> {
    self.expect(TT::LBrace, "{")?;
    let mut properties = Vec::new();
    while !self.at(TT::RBrace) {
      if self.eat(TT::DotDotDot)? {
        let argument = self.parse_assign(false)?;
        properties.push(self.tree.alloc(Syntax::SpreadElement { argument }));
        if !self.at(TT::RBrace) {
          self.expect(TT::Comma, ",")?;
        }
        continue;
      }
      properties.push(self.parse_object_property()?);
      if !self.at(TT::RBrace) {
        self.expect(TT::Comma, ",")?;
      }
    }
    self.bump()?;
    Ok(self.tree.alloc(Syntax::ObjectExpression { properties }))
  }

  fn parse_object_property(&mut self) -> SyntaxResult<NodeId> {
    let mut kind = PropertyKind::Init;
    let mut is_async = false;
    let mut is_generator = false;
    loop {
      if (self.at_word("get") || self.at_word("set") || self.at_word("async"))
        && self.next_starts_member_name()
      {
        let word = self.bump()?;
        match self.text(word) {
          "get" => kind = PropertyKind::Get,
          "set" => kind = PropertyKind::Set,
          _ => is_async = true,
        }
        continue;
      }
      if self.at(TT::Star) && kind == PropertyKind::Init {
        self.bump()?;
        is_generator = true;
        continue;
      }
      break;
    }
    let (key, computed) = self.parse_property_key()?;
    if self.at(TT::LParen) {
      self.fn_ctx.push((is_generator, is_async));
      let params = self.parse_params()?;
      let body = self.parse_block()?;
      self.fn_ctx.pop();
      let value = self.tree.alloc(Syntax::FunctionExpression {
        id: None,
        params,
        body,
        is_async,
        is_generator,
      });
      return Ok(self.tree.alloc(Syntax::Property {
        key,
        value,
        kind,
        computed,
        shorthand: false,
        method: kind == PropertyKind::Init,
      }));
    }
    if self.eat(TT::Colon)? {
      let value = self.parse_assign(false)?;
      return Ok(self.tree.alloc(Syntax::Property {
        key,
        value,
        kind: PropertyKind::Init,
        computed,
        shorthand: false,
        method: false,
      }));
    }
    // Shorthand property; `= default` appears only under destructuring
    // cover grammar.
    let name = match self.tree.syntax(key).ident_name() {
      Some(name) => name.to_string(),
      None => return Err(self.error(SyntaxErrorType::ExpectedSyntax("property value"))),
    };
    let value_id = self.tree.new_identifier(&name, None);
    let value = if self.eat(TT::Assign)? {
      let right = self.parse_assign(false)?;
      self.tree.alloc(Syntax::AssignmentPattern {
        left: value_id,
        right,
      })
    } else {
      value_id
    };
    Ok(self.tree.alloc(Syntax::Property {
      key,
      value,
      kind: PropertyKind::Init,
      computed,
      shorthand: true,
      method: false,
    }))
  }
}
