use super::run_to_fixpoint;
use super::PassResult;
use ast_js::query::is_valid_identifier_name;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;

/// Rewrites `obj["name"]` member accesses and computed method definitions to
/// their dot/plain forms when the string key is a valid, unreserved
/// identifier.
pub fn computed_to_dot(t: &mut Tree, root: NodeId) -> PassResult {
  let mut changed = false;
  let members = t.collect_post(root, &mut |n| {
    matches!(
      t.syntax(n),
      Syntax::MemberExpression { computed: true, .. }
        | Syntax::MethodDefinition { computed: true, .. }
    )
  });
  for id in members {
    let key_slot = match t.syntax(id) {
      Syntax::MemberExpression {
        property, computed, ..
      } if *computed => *property,
      Syntax::MethodDefinition { key, computed, .. } if *computed => *key,
      _ => continue,
    };
    let name = match t.syntax(key_slot).string_value() {
      Some(name) => name.to_string(),
      None => continue,
    };
    if !is_valid_identifier_name(&name) {
      continue;
    }
    let ident = t.new_identifier(&name, Some(id));
    match t.syntax_mut(id) {
      Syntax::MemberExpression {
        property, computed, ..
      } => {
        *property = ident;
        *computed = false;
      }
      Syntax::MethodDefinition { key, computed, .. } => {
        *key = ident;
        *computed = false;
      }
      _ => {}
    }
    changed = true;
  }
  Ok(changed)
}

pub fn computed_to_dot_all(t: &mut Tree, root: NodeId) -> PassResult {
  run_to_fixpoint(|| computed_to_dot(t, root))
}
