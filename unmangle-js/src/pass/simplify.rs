use super::run_to_fixpoint;
use super::PassResult;
use ast_js::eval;
use ast_js::query::is_empty_block_or_statement;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;

/// Collapses constant-condition control flow: literal-tested `if`/ternary
/// take their decided branch, always-false loops disappear, and an
/// always-true loop with no body left becomes an explicit throw marker (the
/// flattened switch contents were already hoisted out by the control-flow
/// pass, so reaching such a loop would mean spinning forever).
pub fn simplify(t: &mut Tree, root: NodeId) -> PassResult {
  let mut changed = false;
  let candidates = t.collect_post(root, &mut |n| {
    matches!(
      t.syntax(n),
      Syntax::IfStatement { .. }
        | Syntax::WhileStatement { .. }
        | Syntax::DoWhileStatement { .. }
        | Syntax::ConditionalExpression { .. }
    )
  });
  for id in candidates {
    if !t.is_attached_under(id, root) {
      continue;
    }
    match t.syntax(id) {
      Syntax::IfStatement {
        test,
        consequent,
        alternate,
      } => {
        let (test, consequent, alternate) = (*test, *consequent, *alternate);
        let Some(value) = literal_value(t, test) else {
          continue;
        };
        if value {
          changed |= t.replace(id, consequent);
        } else if let Some(alternate) = alternate {
          changed |= t.replace(id, alternate);
        } else {
          tracing::debug!(node = id.index(), "simplify: removing always-false if");
          changed |= t.detach(id);
        }
      }
      Syntax::WhileStatement { test, body } => {
        let (test, body) = (*test, *body);
        let Some(value) = literal_value(t, test) else {
          continue;
        };
        if value {
          if is_empty_block_or_statement(t, body) {
            tracing::debug!(node = id.index(), "simplify: empty infinite loop");
            let parent = t.parent(id);
            let throw = t.new_throw("infinity loop", parent);
            changed |= t.replace(id, throw);
          }
        } else {
          tracing::debug!(node = id.index(), "simplify: removing always-false while");
          changed |= t.detach(id);
        }
      }
      Syntax::DoWhileStatement { body, test } => {
        let (body, test) = (*body, *test);
        let Some(value) = literal_value(t, test) else {
          continue;
        };
        if value {
          if is_empty_block_or_statement(t, body) {
            let parent = t.parent(id);
            let throw = t.new_throw("infinity loop", parent);
            changed |= t.replace(id, throw);
          }
        } else if is_empty_block_or_statement(t, body) {
          changed |= t.detach(id);
        } else {
          // Runs exactly once.
          changed |= t.replace(id, body);
        }
      }
      Syntax::ConditionalExpression {
        test,
        consequent,
        alternate,
      } => {
        let (test, consequent, alternate) = (*test, *consequent, *alternate);
        let Some(value) = literal_value(t, test) else {
          continue;
        };
        let taken = if value { consequent } else { alternate };
        changed |= t.replace(id, taken);
      }
      _ => {}
    }
  }
  Ok(changed)
}

fn literal_value(t: &Tree, id: NodeId) -> Option<bool> {
  match t.syntax(id) {
    Syntax::Literal { value, .. } => Some(eval::truthy(value)),
    _ => None,
  }
}

pub fn simplify_all(t: &mut Tree, root: NodeId) -> PassResult {
  run_to_fixpoint(|| simplify(t, root))
}
