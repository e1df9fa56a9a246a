use super::run_to_fixpoint;
use super::PassResult;
use ast_js::eval;
use ast_js::query;
use ast_js::syntax::UpdateOp;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;
use ast_js::Value;

/// One matched flattened construct: the while/switch pair, the case order,
/// and the two declarations to delete afterwards.
struct FlattenedLoop {
  scope: NodeId,
  while_stmt: NodeId,
  /// Statements per flow step, already in execution order.
  ordered: Vec<Vec<NodeId>>,
  removables: Vec<NodeId>,
}

/// Reverses the obfuscator's control-flow flattening: an always-true `while`
/// holding exactly a `switch` over `order[i++]` plus a `break`, where
/// `order` splits a digit/pipe string and `i` starts at zero. The construct
/// is replaced by the case bodies laid out in flow order (minus their
/// `continue`s) and the two driver declarations are removed.
pub fn control_flow_flattening(t: &mut Tree, root: NodeId) -> PassResult {
  let mut matches: Vec<FlattenedLoop> = Vec::new();
  let whiles = t.collect(root, &mut |n| {
    matches!(t.syntax(n), Syntax::WhileStatement { .. })
      && matches!(
        t.parent(n).map(|p| t.syntax(p)),
        Some(Syntax::BlockStatement { .. })
      )
  });
  for while_stmt in whiles {
    if let Some(found) = match_flattened_loop(t, while_stmt) {
      matches.push(found);
    }
  }
  if matches.is_empty() {
    return Ok(false);
  }

  let mut changed = false;
  for m in matches {
    if !t.is_attached_under(m.while_stmt, root) {
      continue;
    }
    let Some(body) = t.body_mut(m.scope) else {
      continue;
    };
    let Some(at) = body.iter().position(|s| *s == m.while_stmt) else {
      continue;
    };
    let flattened: Vec<NodeId> = m.ordered.into_iter().flatten().collect();
    let _removed: Vec<NodeId> = body.splice(at..=at, flattened.iter().copied()).collect();
    t.set_parent(m.while_stmt, None);
    for stmt in flattened {
      t.set_parent(stmt, Some(m.scope));
    }
    for removable in m.removables {
      t.detach(removable);
    }
    tracing::debug!(node = m.while_stmt.index(), "control_flow_flattening: unflattened");
    changed = true;
  }
  Ok(changed)
}

fn match_flattened_loop(t: &Tree, while_stmt: NodeId) -> Option<FlattenedLoop> {
  let Syntax::WhileStatement { test, body } = t.syntax(while_stmt) else {
    return None;
  };
  // The test must evaluate to exactly `true` (e.g. `!![]`).
  if eval::evaluate(t, *test) != Ok(Value::Bool(true)) {
    return None;
  }
  let Syntax::BlockStatement { body } = t.syntax(*body) else {
    return None;
  };
  let [switch_stmt, break_stmt] = body.as_slice() else {
    return None;
  };
  if !matches!(t.syntax(*break_stmt), Syntax::BreakStatement { label: None }) {
    return None;
  }
  let Syntax::SwitchStatement {
    discriminant,
    cases,
  } = t.syntax(*switch_stmt)
  else {
    return None;
  };
  // Every case is tested against a numeric string.
  for case in cases {
    let Syntax::SwitchCase {
      test: Some(test), ..
    } = t.syntax(*case)
    else {
      return None;
    };
    match t.syntax(*test).string_value() {
      Some(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {}
      _ => return None,
    }
  }
  // Discriminant: order[i++].
  let Syntax::MemberExpression {
    object, property, ..
  } = t.syntax(*discriminant)
  else {
    return None;
  };
  let flow_name = t.syntax(*object).ident_name()?;
  let Syntax::UpdateExpression {
    operator: UpdateOp::Increment,
    argument,
    ..
  } = t.syntax(*property)
  else {
    return None;
  };
  let counter_name = t.syntax(*argument).ident_name()?;

  // The sibling declarations: `order = "..".split(..)` and `i = 0`.
  let scope = t.parent(while_stmt)?;
  let Syntax::BlockStatement { body: scope_body } = t.syntax(scope) else {
    return None;
  };
  let mut flow: Option<Vec<String>> = None;
  let mut flow_declarator = None;
  let mut counter_declarator = None;
  for stmt in scope_body {
    let Syntax::VariableDeclaration { declarations, .. } = t.syntax(*stmt) else {
      continue;
    };
    for declarator in declarations {
      let Syntax::VariableDeclarator { id, init } = t.syntax(*declarator) else {
        continue;
      };
      if flow_declarator.is_none() && query::is_identifier_named(t, *id, flow_name) {
        if let Some(order) = init.and_then(|init| match_split_call(t, init)) {
          flow = Some(order);
          flow_declarator = Some(*declarator);
          continue;
        }
      }
      if counter_declarator.is_none()
        && query::is_identifier_named(t, *id, counter_name)
        && matches!(init, Some(init) if query::is_literal_eq(t, *init, &Value::Num(0.0)))
      {
        counter_declarator = Some(*declarator);
      }
    }
  }
  let flow = flow?;
  let flow_declarator = flow_declarator?;
  let counter_declarator = counter_declarator?;

  // Map case labels to their statement lists, minus `continue`.
  let Syntax::SwitchStatement { cases, .. } = t.syntax(*switch_stmt) else {
    return None;
  };
  let mut by_label: ahash::HashMap<String, Vec<NodeId>> = ahash::HashMap::default();
  for case in cases {
    let Syntax::SwitchCase {
      test: Some(test),
      consequent,
    } = t.syntax(*case)
    else {
      return None;
    };
    let label = t.syntax(*test).string_value()?.to_string();
    let stmts: Vec<NodeId> = consequent
      .iter()
      .copied()
      .filter(|s| !matches!(t.syntax(*s), Syntax::ContinueStatement { .. }))
      .collect();
    by_label.insert(label, stmts);
  }
  let mut ordered = Vec::with_capacity(flow.len());
  for step in &flow {
    ordered.push(by_label.get(step)?.clone());
  }

  // Shared declaration with exactly the two declarators goes wholesale;
  // otherwise each declarator widens independently.
  let mut removables = Vec::new();
  let flow_parent = t.parent(flow_declarator);
  let counter_parent = t.parent(counter_declarator);
  if flow_parent.is_some() && flow_parent == counter_parent {
    let declaration = flow_parent?;
    let two = matches!(
      t.syntax(declaration),
      Syntax::VariableDeclaration { declarations, .. } if declarations.len() == 2
    );
    if two {
      removables.push(declaration);
    } else {
      removables.push(flow_declarator);
      removables.push(counter_declarator);
    }
  } else {
    removables.push(query::removable_ancestor(t, flow_declarator));
    removables.push(query::removable_ancestor(t, counter_declarator));
  }

  Some(FlattenedLoop {
    scope,
    while_stmt,
    ordered,
    removables,
  })
}

/// `("0|4|2|1|3").split('|')` (or any string-literal receiver matching the
/// digit/pipe shape); returns the flow steps.
fn match_split_call(t: &Tree, init: NodeId) -> Option<Vec<String>> {
  let Syntax::CallExpression { callee, .. } = t.syntax(init) else {
    return None;
  };
  let Syntax::MemberExpression {
    object, property, ..
  } = t.syntax(*callee)
  else {
    return None;
  };
  if !query::is_name_equals(t, *property, "split") {
    return None;
  }
  let text = t.syntax(*object).string_value()?;
  if !is_digit_pipe_string(text) {
    return None;
  }
  Some(text.split('|').map(str::to_string).collect())
}

/// `/^\d[\d|]+\d$/`.
fn is_digit_pipe_string(s: &str) -> bool {
  let chars: Vec<char> = s.chars().collect();
  chars.len() >= 3
    && chars[0].is_ascii_digit()
    && chars[chars.len() - 1].is_ascii_digit()
    && chars[1..chars.len() - 1]
      .iter()
      .all(|c| c.is_ascii_digit() || *c == '|')
}

pub fn control_flow_flattening_all(t: &mut Tree, root: NodeId) -> PassResult {
  run_to_fixpoint(|| control_flow_flattening(t, root))
}
