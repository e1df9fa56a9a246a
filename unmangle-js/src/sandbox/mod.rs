//! Minimal tree-walking interpreter for matched string-array machinery.
//!
//! This is deliberately not a JavaScript engine: it executes exactly the
//! grammar subset the string-array matchers validate (function and variable
//! declarations, plain control flow, arithmetic, array/string builtins) over
//! its own value domain, with a hard step budget. Matched obfuscator code is
//! attacker-authored, so anything outside the subset, any runaway loop, and
//! any thrown value surfaces as a [`SandboxError`] and the enclosing match
//! is abandoned.

mod builtins;

use ahash::HashMap;
use ahash::HashMapExt;
use ast_js::eval;
use ast_js::syntax::AssignOp;
use ast_js::syntax::LogicalOp;
use ast_js::syntax::UnaryOp;
use ast_js::syntax::UpdateOp;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;
use ast_js::Value;
use core::fmt;
use core::fmt::Display;
use core::fmt::Formatter;
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

const STEP_BUDGET: u64 = 2_000_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SandboxErrorType {
  /// Node kind or builtin outside the supported subset.
  Unsupported(&'static str),
  /// Step budget exhausted; the time bound on attacker-authored snippets.
  BudgetExhausted,
  /// An uncaught thrown value (includes reference and URI errors).
  Thrown,
}

#[derive(Clone, Debug)]
pub struct SandboxError {
  pub typ: SandboxErrorType,
  pub detail: String,
}

impl SandboxError {
  fn unsupported(what: &'static str) -> SandboxError {
    SandboxError {
      typ: SandboxErrorType::Unsupported(what),
      detail: what.to_string(),
    }
  }

  fn thrown(detail: impl Into<String>) -> SandboxError {
    SandboxError {
      typ: SandboxErrorType::Thrown,
      detail: detail.into(),
    }
  }
}

impl Display for SandboxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self.typ {
      SandboxErrorType::Unsupported(what) => write!(f, "unsupported in sandbox: {what}"),
      SandboxErrorType::BudgetExhausted => write!(f, "sandbox step budget exhausted"),
      SandboxErrorType::Thrown => write!(f, "sandboxed code threw: {}", self.detail),
    }
  }
}

impl Error for SandboxError {}

pub type SandboxResult<T> = Result<T, SandboxError>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Native {
  StringNamespace,
  FromCharCode,
  ParseInt,
  ParseFloat,
  DecodeUriComponent,
}

#[derive(Clone)]
pub enum JsVal {
  Undefined,
  Null,
  Bool(bool),
  Num(f64),
  Str(String),
  Arr(Rc<RefCell<Vec<JsVal>>>),
  Func(Rc<Closure>),
  Native(Native),
}

impl fmt::Debug for JsVal {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      JsVal::Undefined => write!(f, "undefined"),
      JsVal::Null => write!(f, "null"),
      JsVal::Bool(b) => write!(f, "{b}"),
      JsVal::Num(n) => write!(f, "{n}"),
      JsVal::Str(s) => write!(f, "{s:?}"),
      JsVal::Arr(a) => write!(f, "Arr(len={})", a.borrow().len()),
      JsVal::Func(_) => write!(f, "[function]"),
      JsVal::Native(n) => write!(f, "[native {n:?}]"),
    }
  }
}

pub struct Closure {
  params: Vec<String>,
  body: NodeId,
  /// Expression-bodied arrow function.
  expression: bool,
  env: Env,
}

type Env = Rc<RefCell<Scope>>;

pub struct Scope {
  vars: HashMap<String, JsVal>,
  parent: Option<Env>,
}

impl Scope {
  fn root() -> Env {
    let mut vars = HashMap::new();
    vars.insert("String".to_string(), JsVal::Native(Native::StringNamespace));
    vars.insert("parseInt".to_string(), JsVal::Native(Native::ParseInt));
    vars.insert("parseFloat".to_string(), JsVal::Native(Native::ParseFloat));
    vars.insert(
      "decodeURIComponent".to_string(),
      JsVal::Native(Native::DecodeUriComponent),
    );
    vars.insert("undefined".to_string(), JsVal::Undefined);
    vars.insert("NaN".to_string(), JsVal::Num(f64::NAN));
    vars.insert("Infinity".to_string(), JsVal::Num(f64::INFINITY));
    Rc::new(RefCell::new(Scope {
      vars,
      parent: None,
    }))
  }

  fn child(parent: &Env) -> Env {
    Rc::new(RefCell::new(Scope {
      vars: HashMap::new(),
      parent: Some(parent.clone()),
    }))
  }

  fn lookup(env: &Env, name: &str) -> Option<JsVal> {
    let scope = env.borrow();
    if let Some(v) = scope.vars.get(name) {
      return Some(v.clone());
    }
    scope.parent.as_ref().and_then(|p| Scope::lookup(p, name))
  }

  /// Assignment walks the chain; undeclared names land on the root scope,
  /// matching sloppy-mode implicit globals.
  fn assign(env: &Env, name: &str, value: JsVal) {
    {
      let mut scope = env.borrow_mut();
      if scope.vars.contains_key(name) {
        scope.vars.insert(name.to_string(), value);
        return;
      }
    }
    let parent = env.borrow().parent.clone();
    match parent {
      Some(p) => Scope::assign(&p, name, value),
      None => {
        env.borrow_mut().vars.insert(name.to_string(), value);
      }
    }
  }

  fn declare(env: &Env, name: &str, value: JsVal) {
    env.borrow_mut().vars.insert(name.to_string(), value);
  }
}

enum Completion {
  Normal,
  Return(JsVal),
  Break,
  Continue,
}

pub struct Sandbox<'t> {
  tree: &'t Tree,
  env: Env,
  steps: u64,
}

impl<'t> Sandbox<'t> {
  pub fn new(tree: &'t Tree) -> Sandbox<'t> {
    Sandbox {
      tree,
      env: Scope::root(),
      steps: STEP_BUDGET,
    }
  }

  fn tick(&mut self) -> SandboxResult<()> {
    if self.steps == 0 {
      return Err(SandboxError {
        typ: SandboxErrorType::BudgetExhausted,
        detail: String::new(),
      });
    }
    self.steps -= 1;
    Ok(())
  }

  /// Executes top-level statements (the matched declarations plus rotator).
  pub fn run(&mut self, stmts: &[NodeId]) -> SandboxResult<()> {
    let env = self.env.clone();
    match self.exec_stmts(&env, stmts)? {
      Completion::Normal | Completion::Return(_) => Ok(()),
      Completion::Break | Completion::Continue => Ok(()),
    }
  }

  pub fn global(&self, name: &str) -> Option<JsVal> {
    Scope::lookup(&self.env, name)
  }

  pub fn call_function(&mut self, function: &JsVal, args: Vec<JsVal>) -> SandboxResult<JsVal> {
    self.call(function.clone(), args)
  }

  fn exec_stmts(&mut self, env: &Env, stmts: &[NodeId]) -> SandboxResult<Completion> {
    // Function declarations hoist to the top of the list.
    for stmt in stmts {
      if let Syntax::FunctionDeclaration {
        id: Some(id),
        params,
        body,
        ..
      } = self.tree.syntax(*stmt)
      {
        let name = match self.tree.syntax(*id).ident_name() {
          Some(name) => name.to_string(),
          None => continue,
        };
        let closure = self.make_closure(env, params, *body, false)?;
        Scope::declare(env, &name, closure);
      }
    }
    for stmt in stmts {
      match self.exec_stmt(env, *stmt)? {
        Completion::Normal => {}
        other => return Ok(other),
      }
    }
    Ok(Completion::Normal)
  }

  fn make_closure(
    &mut self,
    env: &Env,
    params: &[NodeId],
    body: NodeId,
    expression: bool,
  ) -> SandboxResult<JsVal> {
    let mut names = Vec::with_capacity(params.len());
    for param in params {
      match self.tree.syntax(*param).ident_name() {
        Some(name) => names.push(name.to_string()),
        None => return Err(SandboxError::unsupported("non-identifier parameter")),
      }
    }
    Ok(JsVal::Func(Rc::new(Closure {
      params: names,
      body,
      expression,
      env: env.clone(),
    })))
  }

  fn exec_stmt(&mut self, env: &Env, stmt: NodeId) -> SandboxResult<Completion> {
    self.tick()?;
    match self.tree.syntax(stmt) {
      Syntax::EmptyStatement | Syntax::FunctionDeclaration { .. } => Ok(Completion::Normal),
      Syntax::BlockStatement { body } => {
        let body = body.clone();
        self.exec_stmts(env, &body)
      }
      Syntax::VariableDeclaration { declarations, .. } => {
        for declarator in declarations.clone() {
          let Syntax::VariableDeclarator { id, init } = self.tree.syntax(declarator) else {
            continue;
          };
          let name = match self.tree.syntax(*id).ident_name() {
            Some(name) => name.to_string(),
            None => return Err(SandboxError::unsupported("destructuring declaration")),
          };
          let value = match init {
            Some(init) => self.eval(env, *init)?,
            None => JsVal::Undefined,
          };
          Scope::declare(env, &name, value);
        }
        Ok(Completion::Normal)
      }
      Syntax::ExpressionStatement { expression } => {
        self.eval(env, *expression)?;
        Ok(Completion::Normal)
      }
      Syntax::ReturnStatement { argument } => {
        let value = match argument {
          Some(argument) => self.eval(env, *argument)?,
          None => JsVal::Undefined,
        };
        Ok(Completion::Return(value))
      }
      Syntax::IfStatement {
        test,
        consequent,
        alternate,
      } => {
        let (test, consequent, alternate) = (*test, *consequent, *alternate);
        if truthy(&self.eval(env, test)?) {
          self.exec_stmt(env, consequent)
        } else if let Some(alternate) = alternate {
          self.exec_stmt(env, alternate)
        } else {
          Ok(Completion::Normal)
        }
      }
      Syntax::WhileStatement { test, body } => {
        let (test, body) = (*test, *body);
        loop {
          self.tick()?;
          if !truthy(&self.eval(env, test)?) {
            return Ok(Completion::Normal);
          }
          match self.exec_stmt(env, body)? {
            Completion::Break => return Ok(Completion::Normal),
            Completion::Return(v) => return Ok(Completion::Return(v)),
            Completion::Normal | Completion::Continue => {}
          }
        }
      }
      Syntax::DoWhileStatement { body, test } => {
        let (test, body) = (*test, *body);
        loop {
          self.tick()?;
          match self.exec_stmt(env, body)? {
            Completion::Break => return Ok(Completion::Normal),
            Completion::Return(v) => return Ok(Completion::Return(v)),
            Completion::Normal | Completion::Continue => {}
          }
          if !truthy(&self.eval(env, test)?) {
            return Ok(Completion::Normal);
          }
        }
      }
      Syntax::ForStatement {
        init,
        test,
        update,
        body,
      } => {
        let (init, test, update, body) = (*init, *test, *update, *body);
        if let Some(init) = init {
          if matches!(self.tree.syntax(init), Syntax::VariableDeclaration { .. }) {
            self.exec_stmt(env, init)?;
          } else {
            self.eval(env, init)?;
          }
        }
        loop {
          self.tick()?;
          if let Some(test) = test {
            if !truthy(&self.eval(env, test)?) {
              return Ok(Completion::Normal);
            }
          }
          match self.exec_stmt(env, body)? {
            Completion::Break => return Ok(Completion::Normal),
            Completion::Return(v) => return Ok(Completion::Return(v)),
            Completion::Normal | Completion::Continue => {}
          }
          if let Some(update) = update {
            self.eval(env, update)?;
          }
        }
      }
      Syntax::TryStatement {
        block,
        handler,
        finalizer,
      } => {
        let (block, handler, finalizer) = (*block, *handler, *finalizer);
        let mut outcome = self.exec_stmt(env, block);
        if let (Err(err), Some(handler)) = (&outcome, handler) {
          if err.typ == SandboxErrorType::Thrown {
            let detail = err.detail.clone();
            let Syntax::CatchClause { param, body } = self.tree.syntax(handler) else {
              return Err(SandboxError::unsupported("malformed catch"));
            };
            let (param, body) = (*param, *body);
            let catch_env = Scope::child(env);
            if let Some(param) = param {
              if let Some(name) = self.tree.syntax(param).ident_name() {
                Scope::declare(&catch_env, name, JsVal::Str(detail));
              }
            }
            outcome = self.exec_stmt(&catch_env, body);
          }
        }
        if let Some(finalizer) = finalizer {
          self.exec_stmt(env, finalizer)?;
        }
        outcome
      }
      Syntax::ThrowStatement { argument } => {
        let value = self.eval(env, *argument)?;
        Err(SandboxError::thrown(to_js_string(&value)))
      }
      Syntax::BreakStatement { label: None } => Ok(Completion::Break),
      Syntax::ContinueStatement { label: None } => Ok(Completion::Continue),
      _ => Err(SandboxError::unsupported("statement kind")),
    }
  }

  fn eval(&mut self, env: &Env, expr: NodeId) -> SandboxResult<JsVal> {
    self.tick()?;
    match self.tree.syntax(expr) {
      Syntax::Literal { value, .. } => value_to_jsval(value)
        .ok_or_else(|| SandboxError::unsupported("literal kind")),
      Syntax::Identifier { name } => match Scope::lookup(env, name) {
        Some(value) => Ok(value),
        None => Err(SandboxError::thrown(format!("{name} is not defined"))),
      },
      Syntax::ArrayExpression { elements } => {
        let elements = elements.clone();
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
          match element {
            Some(element) => out.push(self.eval(env, element)?),
            None => out.push(JsVal::Undefined),
          }
        }
        Ok(JsVal::Arr(Rc::new(RefCell::new(out))))
      }
      Syntax::FunctionExpression { params, body, .. } => {
        let params = params.clone();
        self.make_closure(env, &params, *body, false)
      }
      Syntax::ArrowFunctionExpression {
        params,
        body,
        expression,
        ..
      } => {
        let params = params.clone();
        self.make_closure(env, &params, *body, *expression)
      }
      Syntax::SequenceExpression { expressions } => {
        let expressions = expressions.clone();
        let mut last = JsVal::Undefined;
        for expression in expressions {
          last = self.eval(env, expression)?;
        }
        Ok(last)
      }
      Syntax::ConditionalExpression {
        test,
        consequent,
        alternate,
      } => {
        let (test, consequent, alternate) = (*test, *consequent, *alternate);
        if truthy(&self.eval(env, test)?) {
          self.eval(env, consequent)
        } else {
          self.eval(env, alternate)
        }
      }
      Syntax::LogicalExpression {
        operator,
        left,
        right,
      } => {
        let (operator, left, right) = (*operator, *left, *right);
        let lhs = self.eval(env, left)?;
        match operator {
          LogicalOp::And => {
            if truthy(&lhs) {
              self.eval(env, right)
            } else {
              Ok(lhs)
            }
          }
          LogicalOp::Or => {
            if truthy(&lhs) {
              Ok(lhs)
            } else {
              self.eval(env, right)
            }
          }
          LogicalOp::Nullish => {
            if matches!(lhs, JsVal::Undefined | JsVal::Null) {
              self.eval(env, right)
            } else {
              Ok(lhs)
            }
          }
        }
      }
      Syntax::BinaryExpression {
        operator,
        left,
        right,
      } => {
        let (operator, left, right) = (*operator, *left, *right);
        let lhs = self.eval(env, left)?;
        let rhs = self.eval(env, right)?;
        let (Some(l), Some(r)) = (jsval_to_value(&lhs), jsval_to_value(&rhs)) else {
          return Err(SandboxError::unsupported("binary operand"));
        };
        match eval::binary(operator, &l, &r) {
          Ok(v) => value_to_jsval(&v).ok_or_else(|| SandboxError::unsupported("binary result")),
          Err(_) => Err(SandboxError::unsupported("binary operator")),
        }
      }
      Syntax::UnaryExpression { operator, argument } => {
        let (operator, argument) = (*operator, *argument);
        let value = self.eval(env, argument)?;
        if operator == UnaryOp::Typeof {
          return Ok(JsVal::Str(
            match value {
              JsVal::Undefined => "undefined",
              JsVal::Null | JsVal::Arr(_) => "object",
              JsVal::Bool(_) => "boolean",
              JsVal::Num(_) => "number",
              JsVal::Str(_) => "string",
              JsVal::Func(_) | JsVal::Native(_) => "function",
            }
            .to_string(),
          ));
        }
        let Some(v) = jsval_to_value(&value) else {
          return Err(SandboxError::unsupported("unary operand"));
        };
        match eval::unary(operator, &v) {
          Ok(v) => value_to_jsval(&v).ok_or_else(|| SandboxError::unsupported("unary result")),
          Err(_) => Err(SandboxError::unsupported("unary operator")),
        }
      }
      Syntax::UpdateExpression {
        operator,
        prefix,
        argument,
      } => {
        let (operator, prefix, argument) = (*operator, *prefix, *argument);
        let old = to_number(&self.eval(env, argument)?);
        let new = match operator {
          UpdateOp::Increment => old + 1.0,
          UpdateOp::Decrement => old - 1.0,
        };
        self.assign_to(env, argument, JsVal::Num(new))?;
        Ok(JsVal::Num(if prefix { new } else { old }))
      }
      Syntax::AssignmentExpression {
        operator,
        left,
        right,
      } => {
        let (operator, left, right) = (*operator, *left, *right);
        let rhs = self.eval(env, right)?;
        let value = match operator {
          AssignOp::Assign => rhs,
          AssignOp::AddAssign | AssignOp::SubAssign | AssignOp::MulAssign
          | AssignOp::DivAssign | AssignOp::RemAssign => {
            let old = self.eval(env, left)?;
            let (Some(l), Some(r)) = (jsval_to_value(&old), jsval_to_value(&rhs)) else {
              return Err(SandboxError::unsupported("compound assignment operand"));
            };
            let op = match operator {
              AssignOp::AddAssign => ast_js::syntax::BinaryOp::Add,
              AssignOp::SubAssign => ast_js::syntax::BinaryOp::Sub,
              AssignOp::MulAssign => ast_js::syntax::BinaryOp::Mul,
              AssignOp::DivAssign => ast_js::syntax::BinaryOp::Div,
              _ => ast_js::syntax::BinaryOp::Rem,
            };
            match eval::binary(op, &l, &r) {
              Ok(v) => value_to_jsval(&v)
                .ok_or_else(|| SandboxError::unsupported("compound assignment result"))?,
              Err(_) => return Err(SandboxError::unsupported("compound assignment")),
            }
          }
          _ => return Err(SandboxError::unsupported("assignment operator")),
        };
        self.assign_to(env, left, value.clone())?;
        Ok(value)
      }
      Syntax::MemberExpression {
        object,
        property,
        computed,
        ..
      } => {
        let (object, property, computed) = (*object, *property, *computed);
        let obj = self.eval(env, object)?;
        let key = self.member_key(env, property, computed)?;
        self.member_get(&obj, &key)
      }
      Syntax::CallExpression {
        callee, arguments, ..
      } => {
        let (callee, arguments) = (*callee, arguments.clone());
        let mut args = Vec::with_capacity(arguments.len());
        for argument in &arguments {
          args.push(self.eval(env, *argument)?);
        }
        match self.tree.syntax(callee) {
          Syntax::MemberExpression {
            object,
            property,
            computed,
            ..
          } => {
            let (object, property, computed) = (*object, *property, *computed);
            let obj = self.eval(env, object)?;
            let key = self.member_key(env, property, computed)?;
            self.call_method(obj, &key, args)
          }
          _ => {
            let function = self.eval(env, callee)?;
            self.call(function, args)
          }
        }
      }
      _ => Err(SandboxError::unsupported("expression kind")),
    }
  }

  fn member_key(&mut self, env: &Env, property: NodeId, computed: bool) -> SandboxResult<String> {
    if computed {
      let key = self.eval(env, property)?;
      Ok(to_js_string(&key))
    } else {
      match self.tree.syntax(property).ident_name() {
        Some(name) => Ok(name.to_string()),
        None => Err(SandboxError::unsupported("member name")),
      }
    }
  }

  fn member_get(&mut self, obj: &JsVal, key: &str) -> SandboxResult<JsVal> {
    match obj {
      JsVal::Arr(elements) => {
        if key == "length" {
          return Ok(JsVal::Num(elements.borrow().len() as f64));
        }
        match key.parse::<usize>() {
          Ok(index) => Ok(
            elements
              .borrow()
              .get(index)
              .cloned()
              .unwrap_or(JsVal::Undefined),
          ),
          Err(_) => Ok(JsVal::Undefined),
        }
      }
      JsVal::Str(s) => {
        if key == "length" {
          return Ok(JsVal::Num(s.chars().count() as f64));
        }
        match key.parse::<usize>() {
          Ok(index) => Ok(
            s.chars()
              .nth(index)
              .map(|c| JsVal::Str(c.to_string()))
              .unwrap_or(JsVal::Undefined),
          ),
          Err(_) => Ok(JsVal::Undefined),
        }
      }
      JsVal::Undefined | JsVal::Null => {
        Err(SandboxError::thrown(format!("cannot read '{key}'")))
      }
      _ => Ok(JsVal::Undefined),
    }
  }

  fn assign_to(&mut self, env: &Env, target: NodeId, value: JsVal) -> SandboxResult<()> {
    match self.tree.syntax(target) {
      Syntax::Identifier { name } => {
        let name = name.clone();
        Scope::assign(env, &name, value);
        Ok(())
      }
      Syntax::MemberExpression {
        object,
        property,
        computed,
        ..
      } => {
        let (object, property, computed) = (*object, *property, *computed);
        let obj = self.eval(env, object)?;
        let key = self.member_key(env, property, computed)?;
        match obj {
          JsVal::Arr(elements) => {
            let Ok(index) = key.parse::<usize>() else {
              return Err(SandboxError::unsupported("non-index array store"));
            };
            let mut elements = elements.borrow_mut();
            if elements.len() <= index {
              elements.resize(index + 1, JsVal::Undefined);
            }
            elements[index] = value;
            Ok(())
          }
          _ => Err(SandboxError::unsupported("member store target")),
        }
      }
      _ => Err(SandboxError::unsupported("assignment target")),
    }
  }

  fn call(&mut self, function: JsVal, args: Vec<JsVal>) -> SandboxResult<JsVal> {
    self.tick()?;
    match function {
      JsVal::Func(closure) => {
        let call_env = Scope::child(&closure.env);
        for (i, param) in closure.params.iter().enumerate() {
          let value = args.get(i).cloned().unwrap_or(JsVal::Undefined);
          Scope::declare(&call_env, param, value);
        }
        if closure.expression {
          return self.eval(&call_env, closure.body);
        }
        match self.exec_stmt(&call_env, closure.body)? {
          Completion::Return(value) => Ok(value),
          _ => Ok(JsVal::Undefined),
        }
      }
      JsVal::Native(native) => builtins::call_native(native, &args),
      _ => Err(SandboxError::thrown("value is not a function")),
    }
  }

  fn call_method(&mut self, obj: JsVal, key: &str, args: Vec<JsVal>) -> SandboxResult<JsVal> {
    match &obj {
      JsVal::Native(Native::StringNamespace) if key == "fromCharCode" => {
        builtins::call_native(Native::FromCharCode, &args)
      }
      JsVal::Str(s) => builtins::string_method(s, key, &args),
      JsVal::Arr(elements) => builtins::array_method(elements, key, &args),
      _ => {
        // A closure stored somewhere reachable as a property is outside the
        // supported subset.
        Err(SandboxError::unsupported("method receiver"))
      }
    }
  }
}

pub(crate) fn truthy(v: &JsVal) -> bool {
  match v {
    JsVal::Undefined | JsVal::Null => false,
    JsVal::Bool(b) => *b,
    JsVal::Num(n) => *n != 0.0 && !n.is_nan(),
    JsVal::Str(s) => !s.is_empty(),
    JsVal::Arr(_) | JsVal::Func(_) | JsVal::Native(_) => true,
  }
}

pub(crate) fn to_number(v: &JsVal) -> f64 {
  match jsval_to_value(v) {
    Some(value) => eval::to_number(&value).unwrap_or(f64::NAN),
    None => f64::NAN,
  }
}

pub(crate) fn to_js_string(v: &JsVal) -> String {
  match jsval_to_value(v) {
    Some(value) => eval::to_string_value(&value),
    None => "function".to_string(),
  }
}

/// Converts a sandbox value into the evaluator's value domain. Functions
/// have no counterpart.
pub fn jsval_to_value(v: &JsVal) -> Option<Value> {
  Some(match v {
    JsVal::Undefined => Value::Undefined,
    JsVal::Null => Value::Null,
    JsVal::Bool(b) => Value::Bool(*b),
    JsVal::Num(n) => Value::Num(*n),
    JsVal::Str(s) => Value::Str(s.clone()),
    JsVal::Arr(elements) => Value::Arr(
      elements
        .borrow()
        .iter()
        .map(jsval_to_value)
        .collect::<Option<Vec<_>>>()?,
    ),
    JsVal::Func(_) | JsVal::Native(_) => return None,
  })
}

pub fn value_to_jsval(v: &Value) -> Option<JsVal> {
  Some(match v {
    Value::Undefined => JsVal::Undefined,
    Value::Null => JsVal::Null,
    Value::Bool(b) => JsVal::Bool(*b),
    Value::Num(n) => JsVal::Num(*n),
    Value::Str(s) => JsVal::Str(s.clone()),
    Value::Arr(elements) => JsVal::Arr(Rc::new(RefCell::new(
      elements
        .iter()
        .map(value_to_jsval)
        .collect::<Option<Vec<_>>>()?,
    ))),
    Value::BigInt(_) | Value::Regex { .. } | Value::Obj => return None,
  })
}
