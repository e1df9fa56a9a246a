//! Expression precedence model. The per-kind numbers, the operator table,
//! and the parenthesization rules must stay exactly as they are: rewrite
//! passes assume that re-serializing an already-clean tree is a no-op, which
//! only holds while these tables match the parser's grammar.

use ast_js::syntax::BinaryOp;
use ast_js::syntax::LogicalOp;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;

/// Sentinel precedence forcing parentheses regardless of context.
pub const NEEDS_PARENS: u8 = 17;

/// Precedence of an expression kind, or None for kinds that never take part
/// in precedence comparisons (they then never get parenthesized here).
pub fn expr_precedence(syntax: &Syntax) -> Option<u8> {
  Some(match syntax {
    Syntax::ArrayExpression { .. }
    | Syntax::TaggedTemplateExpression { .. }
    | Syntax::ThisExpression
    | Syntax::Identifier { .. }
    | Syntax::PrivateIdentifier { .. }
    | Syntax::TemplateLiteral { .. }
    | Syntax::Super
    | Syntax::SequenceExpression { .. } => 20,
    Syntax::Literal { .. } => 18,
    Syntax::MemberExpression { .. }
    | Syntax::ChainExpression { .. }
    | Syntax::CallExpression { .. }
    | Syntax::NewExpression { .. } => 19,
    Syntax::ArrowFunctionExpression { .. }
    | Syntax::ClassExpression { .. }
    | Syntax::FunctionExpression { .. }
    | Syntax::ObjectExpression { .. } => NEEDS_PARENS,
    Syntax::UpdateExpression { .. } => 16,
    Syntax::UnaryExpression { .. } | Syntax::AwaitExpression { .. } => 15,
    Syntax::BinaryExpression { .. } => 14,
    Syntax::LogicalExpression { .. } => 13,
    Syntax::ConditionalExpression { .. } => 4,
    Syntax::AssignmentExpression { .. } => 3,
    Syntax::YieldExpression { .. } => 2,
    Syntax::RestElement { .. } => 1,
    _ => return None,
  })
}

pub fn binary_op_precedence(op: BinaryOp) -> u8 {
  use BinaryOp::*;
  match op {
    BitOr => 5,
    BitXor => 6,
    BitAnd => 7,
    LooseEq | LooseNotEq | StrictEq | StrictNotEq => 8,
    Lt | LtEq | Gt | GtEq | In | Instanceof => 9,
    Shl | Shr | UnsignedShr => 10,
    Add | Sub => 11,
    Mul | Div | Rem => 12,
    Exp => 13,
  }
}

pub fn logical_op_precedence(op: LogicalOp) -> u8 {
  match op {
    LogicalOp::Or => 2,
    LogicalOp::Nullish => 3,
    LogicalOp::And => 4,
  }
}

fn operator_precedence(syntax: &Syntax) -> u8 {
  match syntax {
    Syntax::BinaryExpression { operator, .. } => binary_op_precedence(*operator),
    Syntax::LogicalExpression { operator, .. } => logical_op_precedence(*operator),
    _ => 0,
  }
}

fn is_exponentiation(syntax: &Syntax) -> bool {
  matches!(
    syntax,
    Syntax::BinaryExpression {
      operator: BinaryOp::Exp,
      ..
    }
  )
}

fn is_nullish(syntax: &Syntax) -> bool {
  matches!(
    syntax,
    Syntax::LogicalExpression {
      operator: LogicalOp::Nullish,
      ..
    }
  )
}

/// Whether `node` must be parenthesized when emitted as an operand of
/// `parent` (`is_right` for the right-hand side of a binary/logical parent).
pub fn needs_parens(tree: &Tree, node: NodeId, parent: NodeId, is_right: bool) -> bool {
  let node_syntax = tree.syntax(node);
  let Some(node_prec) = expr_precedence(node_syntax) else {
    return false;
  };
  if node_prec == NEEDS_PARENS {
    return true;
  }
  let parent_syntax = tree.syntax(parent);
  let Some(parent_prec) = expr_precedence(parent_syntax) else {
    return false;
  };
  if node_prec != parent_prec {
    // Unary operand of exponentiation still needs parentheses on the left.
    return (!is_right && node_prec == 15 && parent_prec == 14 && is_exponentiation(parent_syntax))
      || node_prec < parent_prec;
  }
  if node_prec != 13 && node_prec != 14 {
    return false;
  }
  if is_exponentiation(node_syntax) && is_exponentiation(parent_syntax) {
    // Exponentiation is right-associative.
    return !is_right;
  }
  if node_prec == 13 && (is_nullish(node_syntax) || is_nullish(parent_syntax)) {
    // Nullish coalescing never combines bare with && or ||.
    return true;
  }
  if is_right {
    // Equal operator precedence parenthesizes on the right.
    operator_precedence(node_syntax) <= operator_precedence(parent_syntax)
  } else {
    operator_precedence(node_syntax) < operator_precedence(parent_syntax)
  }
}
