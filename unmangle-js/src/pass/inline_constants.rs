use super::run_to_fixpoint;
use super::PassResult;
use ast_js::eval::is_literal_like;
use ast_js::query;
use ast_js::Flow;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;

/// Inlines declared names whose initializer is literal-like. A never-
/// reassigned binding is substituted everywhere and its declaration removed
/// (kept at Program scope); a later-reassigned binding is substituted only
/// at references occurring before its first reassignment.
pub fn inline_constants(t: &mut Tree, root: NodeId) -> PassResult {
  // Collect declarator ids with literal-like initializers.
  let mut vars: Vec<NodeId> = Vec::new();
  t.walk(root, &mut |n| {
    if let Syntax::VariableDeclarator {
      id,
      init: Some(init),
    } = t.syntax(n)
    {
      if t.syntax(*id).ident_name().is_some() && is_literal_like(t, *init) {
        vars.push(*id);
        return Flow::Skip;
      }
    }
    Flow::Continue
  });
  if vars.is_empty() {
    return Ok(false);
  }

  let mut changed = false;
  let mut removable: Vec<NodeId> = Vec::new();
  for var in vars {
    let Some(scope) = query::closest_block(t, var) else {
      continue;
    };
    let name = match t.syntax(var).ident_name() {
      Some(name) => name.to_string(),
      None => continue,
    };
    let init = match t.parent(var).map(|p| t.syntax(p)) {
      Some(Syntax::VariableDeclarator {
        init: Some(init), ..
      }) => *init,
      _ => continue,
    };
    let fully_final = query::is_final(t, &name, scope);
    let references = t.collect_post(scope, &mut |n| {
      n != var
        && query::is_identifier_named(t, n, &name)
        && !query::is_declared_id(t, n)
    });
    for reference in references {
      if !t.is_attached_under(reference, scope) {
        continue;
      }
      if !fully_final && !query::is_final_until(t, &name, scope, reference) {
        continue;
      }
      let copy = t.clone_subtree(init)?;
      if t.replace(reference, copy) {
        changed = true;
      }
    }
    if fully_final {
      removable.push(var);
    }
  }

  for var in removable {
    // Top-level constants stay; everything else goes once inlined.
    let at_program_scope = matches!(
      query::closest_block(t, var).map(|s| t.syntax(s)),
      Some(Syntax::Program { .. })
    );
    if !at_program_scope {
      let target = query::removable_ancestor(t, var);
      if t.detach(target) {
        tracing::debug!(node = target.index(), "inline_constants: removed declaration");
        changed = true;
      }
    }
  }
  Ok(changed)
}

pub fn inline_constants_all(t: &mut Tree, root: NodeId) -> PassResult {
  run_to_fixpoint(|| inline_constants(t, root))
}
