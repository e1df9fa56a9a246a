//! Constant evaluation over a restricted expression subset: literals, unary
//! and binary operators with standard coercion semantics, the empty array,
//! and the two free identifiers `window` and `undefined`. Anything else is
//! [`NotEvaluable`], which callers treat as "leave the tree unchanged".

use crate::node::NodeId;
use crate::node::Tree;
use crate::num;
use crate::syntax::BinaryOp;
use crate::syntax::Syntax;
use crate::syntax::UnaryOp;
use core::fmt;
use core::fmt::Display;
use core::fmt::Formatter;
use num_bigint::BigInt;
use std::error::Error;

/// Runtime value domain of the evaluator. Also doubles as the literal
/// payload on [`Syntax::Literal`] (literals only ever carry the first six
/// variants).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Undefined,
  Null,
  Bool(bool),
  Num(f64),
  Str(String),
  BigInt(BigInt),
  Regex { pattern: String, flags: String },
  Arr(Vec<Value>),
  /// Opaque stand-in for the `window` global. A single shared sentinel, so
  /// `window === window` folds to true while nothing can be read off it.
  Obj,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NotEvaluable;

impl Display for NotEvaluable {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "expression is not constant-evaluable")
  }
}

impl Error for NotEvaluable {}

pub type EvalResult = Result<Value, NotEvaluable>;

pub fn evaluate(tree: &Tree, id: NodeId) -> EvalResult {
  match tree.syntax(id) {
    Syntax::Literal { value, .. } => Ok(value.clone()),
    Syntax::UnaryExpression { operator, argument } => {
      let argument = evaluate(tree, *argument)?;
      unary(*operator, &argument)
    }
    Syntax::BinaryExpression {
      operator,
      left,
      right,
    } => {
      let left = evaluate(tree, *left)?;
      let right = evaluate(tree, *right)?;
      binary(*operator, &left, &right)
    }
    Syntax::ArrayExpression { elements } if elements.is_empty() => Ok(Value::Arr(Vec::new())),
    Syntax::Identifier { name } if name == "window" => Ok(Value::Obj),
    Syntax::Identifier { name } if name == "undefined" => Ok(Value::Undefined),
    _ => Err(NotEvaluable),
  }
}

pub fn unary(operator: UnaryOp, argument: &Value) -> EvalResult {
  Ok(match operator {
    UnaryOp::Minus => match argument {
      Value::BigInt(b) => Value::BigInt(-b),
      other => Value::Num(-to_number(other)?),
    },
    UnaryOp::Plus => Value::Num(to_number(argument)?),
    UnaryOp::Not => Value::Bool(!truthy(argument)),
    UnaryOp::BitNot => match argument {
      Value::BigInt(b) => Value::BigInt(-(b + BigInt::from(1))),
      other => Value::Num(!num::to_int32(to_number(other)?) as f64),
    },
    UnaryOp::Typeof => Value::Str(type_of(argument).to_string()),
    UnaryOp::Void => Value::Undefined,
    UnaryOp::Delete => return Err(NotEvaluable),
  })
}

pub fn binary(operator: BinaryOp, left: &Value, right: &Value) -> EvalResult {
  use BinaryOp::*;
  Ok(match operator {
    LooseEq => Value::Bool(loose_eq(left, right)),
    LooseNotEq => Value::Bool(!loose_eq(left, right)),
    StrictEq => Value::Bool(strict_eq(left, right)),
    StrictNotEq => Value::Bool(!strict_eq(left, right)),
    Lt | LtEq | Gt | GtEq => compare(operator, left, right)?,
    Add => add(left, right)?,
    Sub | Mul | Div | Rem | Exp => numeric(operator, left, right)?,
    Shl => Value::Num(((num::to_int32(to_number(left)?)) << shift_count(right)?) as f64),
    Shr => Value::Num(((num::to_int32(to_number(left)?)) >> shift_count(right)?) as f64),
    UnsignedShr => Value::Num(((num::to_uint32(to_number(left)?)) >> shift_count(right)?) as f64),
    BitOr => Value::Num((num::to_int32(to_number(left)?) | num::to_int32(to_number(right)?)) as f64),
    BitXor => {
      Value::Num((num::to_int32(to_number(left)?) ^ num::to_int32(to_number(right)?)) as f64)
    }
    BitAnd => {
      Value::Num((num::to_int32(to_number(left)?) & num::to_int32(to_number(right)?)) as f64)
    }
    In => Value::Bool(has_property(left, right)?),
    // `instanceof` needs a callable right operand, which this value domain
    // never produces.
    Instanceof => return Err(NotEvaluable),
  })
}

fn shift_count(v: &Value) -> Result<u32, NotEvaluable> {
  Ok(num::to_uint32(to_number(v)?) & 31)
}

fn add(left: &Value, right: &Value) -> EvalResult {
  if let (Value::BigInt(a), Value::BigInt(b)) = (left, right) {
    return Ok(Value::BigInt(a + b));
  }
  let lp = to_primitive(left);
  let rp = to_primitive(right);
  if matches!(lp, Value::Str(_)) || matches!(rp, Value::Str(_)) {
    return Ok(Value::Str(format!(
      "{}{}",
      to_string_value(&lp),
      to_string_value(&rp)
    )));
  }
  Ok(Value::Num(to_number(&lp)? + to_number(&rp)?))
}

fn numeric(operator: BinaryOp, left: &Value, right: &Value) -> EvalResult {
  if let (Value::BigInt(a), Value::BigInt(b)) = (left, right) {
    use num_bigint::Sign;
    return Ok(Value::BigInt(match operator {
      BinaryOp::Sub => a - b,
      BinaryOp::Mul => a * b,
      BinaryOp::Div | BinaryOp::Rem if b.sign() == Sign::NoSign => return Err(NotEvaluable),
      BinaryOp::Div => a / b,
      BinaryOp::Rem => a % b,
      BinaryOp::Exp => return Err(NotEvaluable),
      _ => unreachable!(),
    }));
  }
  let a = to_number(left)?;
  let b = to_number(right)?;
  Ok(Value::Num(match operator {
    BinaryOp::Sub => a - b,
    BinaryOp::Mul => a * b,
    BinaryOp::Div => a / b,
    BinaryOp::Rem => {
      // IEEE remainder with JavaScript sign semantics.
      if b == 0.0 {
        f64::NAN
      } else {
        a % b
      }
    }
    BinaryOp::Exp => a.powf(b),
    _ => unreachable!(),
  }))
}

fn compare(operator: BinaryOp, left: &Value, right: &Value) -> EvalResult {
  let lp = to_primitive(left);
  let rp = to_primitive(right);
  let result = if let (Value::Str(a), Value::Str(b)) = (&lp, &rp) {
    match operator {
      BinaryOp::Lt => a < b,
      BinaryOp::LtEq => a <= b,
      BinaryOp::Gt => a > b,
      BinaryOp::GtEq => a >= b,
      _ => unreachable!(),
    }
  } else if let (Value::BigInt(a), Value::BigInt(b)) = (&lp, &rp) {
    match operator {
      BinaryOp::Lt => a < b,
      BinaryOp::LtEq => a <= b,
      BinaryOp::Gt => a > b,
      BinaryOp::GtEq => a >= b,
      _ => unreachable!(),
    }
  } else {
    let a = to_number(&lp)?;
    let b = to_number(&rp)?;
    if a.is_nan() || b.is_nan() {
      false
    } else {
      match operator {
        BinaryOp::Lt => a < b,
        BinaryOp::LtEq => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::GtEq => a >= b,
        _ => unreachable!(),
      }
    }
  };
  Ok(Value::Bool(result))
}

fn has_property(key: &Value, object: &Value) -> Result<bool, NotEvaluable> {
  match object {
    Value::Arr(elements) => {
      let key = to_string_value(key);
      if key == "length" {
        return Ok(true);
      }
      match key.parse::<usize>() {
        Ok(index) => Ok(index < elements.len()),
        Err(_) => Ok(false),
      }
    }
    Value::Obj => Ok(false),
    _ => Err(NotEvaluable),
  }
}

pub fn truthy(v: &Value) -> bool {
  match v {
    Value::Undefined | Value::Null => false,
    Value::Bool(b) => *b,
    Value::Num(n) => *n != 0.0 && !n.is_nan(),
    Value::Str(s) => !s.is_empty(),
    Value::BigInt(b) => b.sign() != num_bigint::Sign::NoSign,
    Value::Regex { .. } | Value::Arr(_) | Value::Obj => true,
  }
}

pub fn type_of(v: &Value) -> &'static str {
  match v {
    Value::Undefined => "undefined",
    Value::Null | Value::Regex { .. } | Value::Arr(_) | Value::Obj => "object",
    Value::Bool(_) => "boolean",
    Value::Num(_) => "number",
    Value::Str(_) => "string",
    Value::BigInt(_) => "bigint",
  }
}

/// Default-hint ToPrimitive over this closed domain.
pub fn to_primitive(v: &Value) -> Value {
  match v {
    Value::Arr(elements) => Value::Str(
      elements
        .iter()
        .map(|e| match e {
          Value::Undefined | Value::Null => String::new(),
          other => to_string_value(other),
        })
        .collect::<Vec<_>>()
        .join(","),
    ),
    Value::Obj => Value::Str("[object Object]".to_string()),
    Value::Regex { pattern, flags } => Value::Str(format!("/{pattern}/{flags}")),
    other => other.clone(),
  }
}

pub fn to_number(v: &Value) -> Result<f64, NotEvaluable> {
  match v {
    Value::Undefined => Ok(f64::NAN),
    Value::Null => Ok(0.0),
    Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
    Value::Num(n) => Ok(*n),
    Value::Str(s) => Ok(num::str_to_number(s)),
    // Number coercion of a BigInt throws in JavaScript.
    Value::BigInt(_) => Err(NotEvaluable),
    Value::Arr(_) | Value::Obj | Value::Regex { .. } => to_number(&to_primitive(v)),
  }
}

pub fn to_string_value(v: &Value) -> String {
  match v {
    Value::Undefined => "undefined".to_string(),
    Value::Null => "null".to_string(),
    Value::Bool(b) => b.to_string(),
    Value::Num(n) => num::format_number(*n),
    Value::Str(s) => s.clone(),
    Value::BigInt(b) => b.to_str_radix(10),
    Value::Arr(_) | Value::Obj | Value::Regex { .. } => to_string_value(&to_primitive(v)),
  }
}

pub fn strict_eq(left: &Value, right: &Value) -> bool {
  match (left, right) {
    (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
    (Value::Bool(a), Value::Bool(b)) => a == b,
    (Value::Num(a), Value::Num(b)) => a == b,
    (Value::Str(a), Value::Str(b)) => a == b,
    (Value::BigInt(a), Value::BigInt(b)) => a == b,
    // The window sentinel is one shared object; arrays and regexes are
    // fresh references each time they are produced.
    (Value::Obj, Value::Obj) => true,
    _ => false,
  }
}

pub fn loose_eq(left: &Value, right: &Value) -> bool {
  match (left, right) {
    (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
    (Value::Num(_), Value::Num(_))
    | (Value::Str(_), Value::Str(_))
    | (Value::Bool(_), Value::Bool(_))
    | (Value::BigInt(_), Value::BigInt(_))
    | (Value::Obj, Value::Obj) => strict_eq(left, right),
    (Value::Num(a), Value::Str(s)) | (Value::Str(s), Value::Num(a)) => {
      *a == num::str_to_number(s)
    }
    (Value::Bool(b), other) | (other, Value::Bool(b)) => {
      loose_eq(&Value::Num(if *b { 1.0 } else { 0.0 }), other)
    }
    (Value::Arr(_) | Value::Obj | Value::Regex { .. }, other) => {
      loose_eq(&to_primitive(left), other)
    }
    (other, Value::Arr(_) | Value::Obj | Value::Regex { .. }) => {
      loose_eq(other, &to_primitive(right))
    }
    _ => false,
  }
}

/// Literal, or a unary/binary expression built purely from literals:
/// evaluable without touching any binding.
pub fn is_literal_like(tree: &Tree, id: NodeId) -> bool {
  match tree.syntax(id) {
    Syntax::Literal { .. } => true,
    Syntax::UnaryExpression { argument, .. } => is_literal_like(tree, *argument),
    Syntax::BinaryExpression { left, right, .. } => {
      is_literal_like(tree, *left) && is_literal_like(tree, *right)
    }
    _ => false,
  }
}

/// Numeric literal, possibly under a chain of unary operators.
pub fn is_number(tree: &Tree, id: NodeId) -> bool {
  match tree.syntax(id) {
    Syntax::Literal { value, .. } => matches!(value, Value::Num(_)),
    Syntax::UnaryExpression { argument, .. } => is_number(tree, *argument),
    _ => false,
  }
}

/// Collapses an additive chain that mentions exactly one identifier and
/// otherwise only numeric operands into `ident + c` / `ident - c`, e.g.
/// `x - -0x37d - 0x1d0 - 0x1c6` becomes `x - 25`. Returns the replacement
/// node, or None when the chain has any other shape.
pub fn simplify_additive(tree: &mut Tree, id: NodeId) -> Option<NodeId> {
  let mut ident: Option<NodeId> = None;
  let mut constant = 0.0f64;
  if !gather_additive(tree, id, 1.0, &mut ident, &mut constant) {
    return None;
  }
  let ident = ident?;
  let ident = tree.clone_subtree(ident).ok()?;
  if constant == 0.0 {
    return Some(ident);
  }
  let operator = if constant < 0.0 {
    BinaryOp::Sub
  } else {
    BinaryOp::Add
  };
  let literal = tree.new_value(&Value::Num(constant.abs()), None);
  let folded = tree.alloc(Syntax::BinaryExpression {
    operator,
    left: ident,
    right: literal,
  });
  tree.set_parent(ident, Some(folded));
  tree.set_parent(literal, Some(folded));
  Some(folded)
}

fn gather_additive(
  tree: &Tree,
  id: NodeId,
  sign: f64,
  ident: &mut Option<NodeId>,
  constant: &mut f64,
) -> bool {
  match tree.syntax(id) {
    Syntax::BinaryExpression {
      operator: operator @ (BinaryOp::Add | BinaryOp::Sub),
      left,
      right,
    } => {
      let right_sign = if *operator == BinaryOp::Sub { -sign } else { sign };
      gather_additive(tree, *left, sign, ident, constant)
        && gather_additive(tree, *right, right_sign, ident, constant)
    }
    Syntax::Identifier { .. } => {
      if ident.is_some() || sign < 0.0 {
        return false;
      }
      *ident = Some(id);
      true
    }
    _ => match evaluate(tree, id) {
      Ok(Value::Num(n)) => {
        *constant += sign * n;
        true
      }
      _ => false,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn binary_matches_javascript_semantics() {
    let cases: &[(BinaryOp, Value, Value, Value)] = &[
      (
        BinaryOp::Add,
        Value::Num(2.0),
        Value::Num(1.0),
        Value::Num(3.0),
      ),
      (
        BinaryOp::Add,
        Value::Str("a".into()),
        Value::Num(1.0),
        Value::Str("a1".into()),
      ),
      (
        BinaryOp::Add,
        Value::Arr(Vec::new()),
        Value::Arr(Vec::new()),
        Value::Str(String::new()),
      ),
      (
        BinaryOp::Sub,
        Value::Str("5".into()),
        Value::Num(1.0),
        Value::Num(4.0),
      ),
      (
        BinaryOp::Gt,
        Value::Num(2.0),
        Value::Num(1.0),
        Value::Bool(true),
      ),
      (
        BinaryOp::Lt,
        Value::Str("a".into()),
        Value::Str("b".into()),
        Value::Bool(true),
      ),
      (
        BinaryOp::Shl,
        Value::Num(1.0),
        Value::Num(3.0),
        Value::Num(8.0),
      ),
      (
        BinaryOp::UnsignedShr,
        Value::Num(-1.0),
        Value::Num(28.0),
        Value::Num(15.0),
      ),
      (
        BinaryOp::LooseEq,
        Value::Str("1".into()),
        Value::Num(1.0),
        Value::Bool(true),
      ),
      (
        BinaryOp::StrictEq,
        Value::Str("1".into()),
        Value::Num(1.0),
        Value::Bool(false),
      ),
      (
        BinaryOp::StrictEq,
        Value::Obj,
        Value::Obj,
        Value::Bool(true),
      ),
    ];
    for (op, l, r, expected) in cases {
      assert_eq!(binary(*op, l, r).unwrap(), *expected, "{op:?} {l:?} {r:?}");
    }
  }

  #[test]
  fn unary_semantics() {
    assert_eq!(
      unary(UnaryOp::Not, &Value::Num(0.0)).unwrap(),
      Value::Bool(true)
    );
    assert_eq!(
      unary(UnaryOp::Typeof, &Value::Num(1.0)).unwrap(),
      Value::Str("number".into())
    );
    assert_eq!(
      unary(UnaryOp::Minus, &Value::Str("3".into())).unwrap(),
      Value::Num(-3.0)
    );
    assert_eq!(
      unary(UnaryOp::BitNot, &Value::Num(0.0)).unwrap(),
      Value::Num(-1.0)
    );
    assert!(unary(UnaryOp::Delete, &Value::Num(1.0)).is_err());
  }

  #[test]
  fn simplify_additive_collapses_chains() {
    use crate::node::Tree;
    use crate::syntax::Syntax;

    // x + 0x10 - 0x20
    let mut tree = Tree::new();
    let x = tree.new_identifier("x", None);
    let sixteen = tree.new_value(&Value::Num(16.0), None);
    let add = tree.alloc(Syntax::BinaryExpression {
      operator: BinaryOp::Add,
      left: x,
      right: sixteen,
    });
    let thirty_two = tree.new_value(&Value::Num(32.0), None);
    let sub = tree.alloc(Syntax::BinaryExpression {
      operator: BinaryOp::Sub,
      left: add,
      right: thirty_two,
    });
    tree.link_parents(sub);

    let folded = simplify_additive(&mut tree, sub).expect("chain must collapse");
    let Syntax::BinaryExpression {
      operator: BinaryOp::Sub,
      left,
      right,
    } = tree.syntax(folded)
    else {
      panic!("expected ident - constant, got {:?}", tree.syntax(folded));
    };
    assert_eq!(tree.syntax(*left).ident_name(), Some("x"));
    assert_eq!(
      tree.syntax(*right).literal_value(),
      Some(&Value::Num(16.0))
    );
  }

  #[test]
  fn simplify_additive_rejects_other_shapes() {
    use crate::node::Tree;
    use crate::syntax::Syntax;

    // Two identifiers, and a negated identifier, are both out.
    let mut tree = Tree::new();
    let x = tree.new_identifier("x", None);
    let y = tree.new_identifier("y", None);
    let both = tree.alloc(Syntax::BinaryExpression {
      operator: BinaryOp::Add,
      left: x,
      right: y,
    });
    tree.link_parents(both);
    assert!(simplify_additive(&mut tree, both).is_none());

    let one = tree.new_value(&Value::Num(1.0), None);
    let z = tree.new_identifier("z", None);
    let negated = tree.alloc(Syntax::BinaryExpression {
      operator: BinaryOp::Sub,
      left: one,
      right: z,
    });
    tree.link_parents(negated);
    assert!(simplify_additive(&mut tree, negated).is_none());
  }

  #[test]
  fn division_remainder_edge_cases() {
    assert_eq!(
      binary(BinaryOp::Div, &Value::Num(1.0), &Value::Num(0.0)).unwrap(),
      Value::Num(f64::INFINITY)
    );
    let nan = binary(BinaryOp::Rem, &Value::Num(1.0), &Value::Num(0.0)).unwrap();
    match nan {
      Value::Num(n) => assert!(n.is_nan()),
      other => panic!("expected NaN, got {other:?}"),
    }
  }
}
