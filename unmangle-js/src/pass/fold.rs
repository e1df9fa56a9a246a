use super::run_to_fixpoint;
use super::PassResult;
use ast_js::eval;
use ast_js::num::format_number;
use ast_js::syntax::BinaryOp;
use ast_js::syntax::LogicalOp;
use ast_js::syntax::UnaryOp;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;
use ast_js::Value;

/// Folds constant subexpressions: `!`/`typeof` over literals (plus the
/// `[]`/`window`/`undefined` special cases), binary operators over two
/// literals, `x === x` comparisons, and `&&`/`||` over two literals. Numeric
/// literal raw text is canonicalized to decimal as a side effect.
pub fn eval_constant_expressions(t: &mut Tree, root: NodeId) -> PassResult {
  let mut changed = false;
  let candidates = t.collect(root, &mut |n| {
    matches!(
      t.syntax(n),
      Syntax::UnaryExpression { .. }
        | Syntax::BinaryExpression { .. }
        | Syntax::LogicalExpression { .. }
        | Syntax::Literal {
          value: Value::Num(_),
          ..
        }
    )
  });
  for id in candidates {
    if !t.is_attached_under(id, root) {
      continue;
    }
    if let Some(value) = fold_value(t, id) {
      let replacement = t.new_value(&value, None);
      if t.replace(id, replacement) {
        tracing::debug!(node = id.index(), ?value, "eval_constant_expressions");
        changed = true;
      }
      continue;
    }
    // Canonicalize numeric literal source text.
    if let Syntax::Literal {
      value: Value::Num(n),
      raw,
    } = t.syntax_mut(id)
    {
      let decimal = format_number(*n);
      if raw.is_some() && raw.as_deref() != Some(decimal.as_str()) {
        *raw = Some(decimal);
        changed = true;
      }
    }
  }
  Ok(changed)
}

fn fold_value(t: &Tree, id: NodeId) -> Option<Value> {
  match t.syntax(id) {
    Syntax::UnaryExpression { operator, argument } => match operator {
      UnaryOp::Not => match t.syntax(*argument) {
        Syntax::Literal { value, .. } => Some(Value::Bool(!eval::truthy(value))),
        Syntax::ArrayExpression { elements } if elements.is_empty() => Some(Value::Bool(false)),
        _ => None,
      },
      UnaryOp::Typeof => match t.syntax(*argument) {
        Syntax::Literal { value, .. } => Some(Value::Str(eval::type_of(value).to_string())),
        Syntax::Identifier { name } if name == "window" => {
          Some(Value::Str("object".to_string()))
        }
        Syntax::Identifier { name } if name == "undefined" => {
          Some(Value::Str("undefined".to_string()))
        }
        _ => None,
      },
      _ => None,
    },
    Syntax::BinaryExpression {
      operator,
      left,
      right,
    } => {
      if let (Syntax::Literal { value: l, .. }, Syntax::Literal { value: r, .. }) =
        (t.syntax(*left), t.syntax(*right))
      {
        return eval::binary(*operator, l, r).ok();
      }
      // Identical identifiers compare equal.
      if matches!(operator, BinaryOp::LooseEq | BinaryOp::StrictEq) {
        if let (Some(a), Some(b)) = (
          t.syntax(*left).ident_name(),
          t.syntax(*right).ident_name(),
        ) {
          if a == b {
            return Some(Value::Bool(true));
          }
        }
      }
      None
    }
    Syntax::LogicalExpression {
      operator,
      left,
      right,
    } => {
      let (Syntax::Literal { value: l, .. }, Syntax::Literal { value: r, .. }) =
        (t.syntax(*left), t.syntax(*right))
      else {
        return None;
      };
      match operator {
        LogicalOp::And => Some(if eval::truthy(l) { r.clone() } else { l.clone() }),
        LogicalOp::Or => Some(if eval::truthy(l) { l.clone() } else { r.clone() }),
        LogicalOp::Nullish => None,
      }
    }
    _ => None,
  }
}

pub fn eval_constant_expressions_all(t: &mut Tree, root: NodeId) -> PassResult {
  run_to_fixpoint(|| eval_constant_expressions(t, root))
}
