//! String-array deobfuscation: finds the array-builder function, the decode
//! function and the optional rotator, executes them in the sandbox to obtain
//! a live decoder, then replaces every decodable call site with its string
//! literal. Wrapper functions and identifier aliases around the decoder are
//! resolved first so their call sites decode too.

use super::flatten_hashed_members_all;
use super::PassResult;
use crate::sandbox::jsval_to_value;
use crate::sandbox::value_to_jsval;
use crate::sandbox::JsVal;
use crate::sandbox::Sandbox;
use ahash::HashMap;
use ahash::HashMapExt;
use ast_js::eval;
use ast_js::query;
use ast_js::Flow;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;
use ast_js::Value;

/// The whole string-array pipeline step. Hashed-object flattening runs both
/// before and after since each can expose matches for the other.
pub fn string_array_transformations(t: &mut Tree, root: NodeId) -> PassResult {
  let mut changed = flatten_hashed_members_all(t, root)?;

  let Syntax::Program { body } = t.syntax(root) else {
    tracing::debug!("string_array_transformations: root is not a program");
    return Ok(changed);
  };
  let body = body.clone();

  let Some(found) = find_string_array_function(t, &body) else {
    tracing::debug!("string_array_transformations: no string-array function");
    return Ok(changed);
  };
  let array_fn = found.function;
  let array_fn_name = declared_name(t, array_fn).unwrap_or_default();

  let Some(decode_fn) = find_string_array_decode_function(t, &array_fn_name, &body) else {
    tracing::debug!("string_array_transformations: no decode function");
    return Ok(changed);
  };
  let decode_name = declared_name(t, decode_fn).unwrap_or_default();

  let rotate_stmt = find_string_array_rotate_stmt(t, &array_fn_name, &decode_name, &body);

  // Statements interpreted in the sandbox to build the decoder.
  let mut eval_nodes = Vec::new();
  if let Some(version_name) = &found.version_variable {
    if let Some(decl) = find_version_declaration(t, version_name, &body) {
      eval_nodes.push(decl);
    }
  }
  eval_nodes.push(array_fn);
  eval_nodes.push(decode_fn);
  if let Some(rotate) = rotate_stmt {
    eval_nodes.push(rotate);
  }

  // The matched nodes are copied into a self-contained snippet tree; the
  // sandbox never touches the tree under rewrite.
  let mut snippet = Tree::new();
  let mut snippet_stmts = Vec::with_capacity(eval_nodes.len());
  for node in &eval_nodes {
    snippet_stmts.push(t.copy_into(*node, &mut snippet)?);
  }
  let mut sandbox = Sandbox::new(&snippet);
  let decoder = match sandbox.run(&snippet_stmts) {
    Ok(()) => match sandbox.global(&decode_name) {
      Some(f @ JsVal::Func(_)) => f,
      _ => {
        tracing::debug!("string_array_transformations: decoder not materialized");
        return Ok(changed);
      }
    },
    // Abandon the match wholesale; nothing has been removed yet.
    Err(err) => {
      tracing::debug!(error = %err, "string_array_transformations: sandbox rejected snippet");
      return Ok(changed);
    }
  };

  for node in [Some(array_fn), Some(decode_fn), rotate_stmt].into_iter().flatten() {
    changed |= t.detach(node);
  }

  string_array_function_wrappers_all(t, root, &decode_name)?;

  // Names reaching the decoder through id-to-id assignments/declarations.
  let mut aliases = vec![decode_name.clone()];
  let mut alias_bindings: Vec<NodeId> = Vec::new();
  t.walk(root, &mut |n| {
    match t.syntax(n) {
      Syntax::AssignmentExpression { left, right, .. } => {
        if let (Some(to), Some(from)) =
          (t.syntax(*left).ident_name(), t.syntax(*right).ident_name())
        {
          if aliases.iter().any(|a| a == from) {
            aliases.push(to.to_string());
            alias_bindings.push(query::removable_ancestor(t, *left));
          }
        }
      }
      Syntax::VariableDeclarator {
        id,
        init: Some(init),
      } => {
        if let (Some(to), Some(from)) =
          (t.syntax(*id).ident_name(), t.syntax(*init).ident_name())
        {
          if aliases.iter().any(|a| a == from) {
            aliases.push(to.to_string());
            alias_bindings.push(query::removable_ancestor(t, *id));
          }
        }
      }
      _ => {}
    }
    Flow::Continue
  });

  // Decode every alias call whose arguments are all literal-like.
  let sites = t.collect_post(root, &mut |n| {
    let Syntax::CallExpression {
      callee, arguments, ..
    } = t.syntax(n)
    else {
      return false;
    };
    matches!(t.syntax(*callee).ident_name(), Some(name) if aliases.iter().any(|a| a == name))
      && arguments.iter().all(|a| eval::is_literal_like(t, *a))
  });
  for site in sites {
    if !t.is_attached_under(site, root) {
      continue;
    }
    let Syntax::CallExpression { arguments, .. } = t.syntax(site) else {
      continue;
    };
    let mut args = Vec::with_capacity(arguments.len());
    let mut ok = true;
    for argument in arguments.clone() {
      match eval::evaluate(t, argument).ok().and_then(|v| value_to_jsval(&v)) {
        Some(v) => args.push(v),
        None => {
          ok = false;
          break;
        }
      }
    }
    if !ok {
      continue;
    }
    match sandbox.call_function(&decoder, args) {
      Ok(result) => match jsval_to_value(&result) {
        Some(value) => {
          let literal = t.new_value(&value, None);
          if t.replace(site, literal) {
            tracing::debug!(node = site.index(), ?value, "string_array: decoded call");
            changed = true;
          }
        }
        None => tracing::debug!(node = site.index(), "string_array: non-literal decode result"),
      },
      Err(err) => {
        tracing::debug!(node = site.index(), error = %err, "string_array: decode call failed");
      }
    }
  }

  for binding in alias_bindings {
    if t.detach(binding) {
      tracing::debug!(node = binding.index(), "string_array: removed alias binding");
      changed = true;
    }
  }

  changed |= flatten_hashed_members_all(t, root)?;
  Ok(changed)
}

fn declared_name(t: &Tree, fn_decl: NodeId) -> Option<String> {
  match t.syntax(fn_decl) {
    Syntax::FunctionDeclaration { id: Some(id), .. } => {
      t.syntax(*id).ident_name().map(str::to_string)
    }
    _ => None,
  }
}

pub(crate) struct StringArrayFunction {
  pub function: NodeId,
  /// An identifier element among the strings, used by some obfuscator
  /// variants to embed a version marker.
  pub version_variable: Option<String>,
}

/// The array builder: a zero-parameter function whose body declares the
/// string array (directly or via a self-invoking concat chain), reassigns
/// itself to a function returning that array, and returns a call through
/// the reassigned binding.
pub(crate) fn find_string_array_function(
  t: &Tree,
  root_body: &[NodeId],
) -> Option<StringArrayFunction> {
  for stmt in root_body {
    if let Some(found) = match_string_array_function(t, *stmt) {
      return Some(found);
    }
  }
  None
}

fn match_string_array_function(t: &Tree, stmt: NodeId) -> Option<StringArrayFunction> {
  let Syntax::FunctionDeclaration { params, body, .. } = t.syntax(stmt) else {
    return None;
  };
  if !params.is_empty() {
    return None;
  }
  let Syntax::BlockStatement { body } = t.syntax(*body) else {
    return None;
  };
  let [first, second, third] = body.as_slice() else {
    return None;
  };

  // First: `var a = [...]` or `var a = (function () { return [...].concat(...) })()`.
  let Syntax::VariableDeclaration { declarations, .. } = t.syntax(*first) else {
    return None;
  };
  let [declarator] = declarations.as_slice() else {
    return None;
  };
  let Syntax::VariableDeclarator {
    id,
    init: Some(init),
  } = t.syntax(*declarator)
  else {
    return None;
  };
  let first_variable = t.syntax(*id).ident_name()?;
  let elements = match t.syntax(*init) {
    Syntax::ArrayExpression { elements } => {
      elements.iter().copied().collect::<Option<Vec<_>>>()?
    }
    Syntax::CallExpression {
      callee, arguments, ..
    } => {
      if !arguments.is_empty() {
        return None;
      }
      let Syntax::FunctionExpression {
        params,
        body: callee_body,
        ..
      } = t.syntax(*callee)
      else {
        return None;
      };
      if !params.is_empty() {
        return None;
      }
      let Syntax::BlockStatement { body: callee_body } = t.syntax(*callee_body) else {
        return None;
      };
      let [ret] = callee_body.as_slice() else {
        return None;
      };
      let Syntax::ReturnStatement {
        argument: Some(argument),
      } = t.syntax(*ret)
      else {
        return None;
      };
      flatten_string_array_concat(t, *argument)?
    }
    _ => return None,
  };
  if elements.is_empty() {
    return None;
  }
  let mut version_variable = None;
  for element in &elements {
    match t.syntax(*element) {
      Syntax::Identifier { name } => {
        if version_variable.is_some() {
          return None;
        }
        version_variable = Some(name.clone());
      }
      syntax if syntax.string_value().is_some() => {}
      _ => return None,
    }
  }

  // Second: `a = function () { return <first variable>; };`
  let Syntax::ExpressionStatement { expression } = t.syntax(*second) else {
    return None;
  };
  let Syntax::AssignmentExpression { left, right, .. } = t.syntax(*expression) else {
    return None;
  };
  let second_variable = t.syntax(*left).ident_name()?;
  let Syntax::FunctionExpression {
    id: None,
    params,
    body: second_body,
    ..
  } = t.syntax(*right)
  else {
    return None;
  };
  if !params.is_empty() {
    return None;
  }
  let Syntax::BlockStatement { body: second_body } = t.syntax(*second_body) else {
    return None;
  };
  let [second_ret] = second_body.as_slice() else {
    return None;
  };
  let Syntax::ReturnStatement {
    argument: Some(returned),
  } = t.syntax(*second_ret)
  else {
    return None;
  };
  if !query::is_identifier_named(t, *returned, first_variable) {
    return None;
  }

  // Third: `return a();`
  let Syntax::ReturnStatement {
    argument: Some(call),
  } = t.syntax(*third)
  else {
    return None;
  };
  let Syntax::CallExpression { callee, .. } = t.syntax(*call) else {
    return None;
  };
  if !query::is_identifier_named(t, *callee, second_variable) {
    return None;
  }

  Some(StringArrayFunction {
    function: stmt,
    version_variable,
  })
}

/// Unwraps `[...].concat((function () { return [...].concat(...) })())`
/// chains to the flattened element list.
pub(crate) fn flatten_string_array_concat(t: &Tree, node: NodeId) -> Option<Vec<NodeId>> {
  if let Syntax::ArrayExpression { elements } = t.syntax(node) {
    return elements.iter().copied().collect();
  }
  let mut result: Vec<NodeId> = Vec::new();
  let mut call = node;
  loop {
    let Syntax::CallExpression {
      callee, arguments, ..
    } = t.syntax(call)
    else {
      return None;
    };
    let Syntax::MemberExpression {
      object, property, ..
    } = t.syntax(*callee)
    else {
      return None;
    };
    let Syntax::ArrayExpression { elements } = t.syntax(*object) else {
      return None;
    };
    if !query::is_identifier_named(t, *property, "concat") {
      return None;
    }
    let [argument] = arguments.as_slice() else {
      return None;
    };
    result.extend(elements.iter().copied().collect::<Option<Vec<_>>>()?);
    let Syntax::CallExpression {
      callee: inner_callee,
      arguments: inner_arguments,
      ..
    } = t.syntax(*argument)
    else {
      return None;
    };
    if !inner_arguments.is_empty() {
      return None;
    }
    let Syntax::FunctionExpression { params, body, .. } = t.syntax(*inner_callee) else {
      return None;
    };
    if !params.is_empty() {
      return None;
    }
    let Syntax::BlockStatement { body } = t.syntax(*body) else {
      return None;
    };
    let [ret] = body.as_slice() else {
      return None;
    };
    let Syntax::ReturnStatement {
      argument: Some(returned),
    } = t.syntax(*ret)
    else {
      return None;
    };
    match t.syntax(*returned) {
      Syntax::ArrayExpression { elements } => {
        result.extend(elements.iter().copied().collect::<Option<Vec<_>>>()?);
        return Some(result);
      }
      Syntax::CallExpression { .. } => call = *returned,
      _ => return None,
    }
  }
}

/// The decoder: at least two parameters; first statement captures the string
/// array, then the function reassigns itself and returns a call through the
/// new binding — either as two separate statements or compacted into one
/// returned sequence expression.
pub(crate) fn find_string_array_decode_function(
  t: &Tree,
  array_fn_name: &str,
  root_body: &[NodeId],
) -> Option<NodeId> {
  root_body
    .iter()
    .copied()
    .find(|stmt| match_decode_function(t, array_fn_name, *stmt))
}

fn match_decode_function(t: &Tree, array_fn_name: &str, stmt: NodeId) -> bool {
  let Syntax::FunctionDeclaration {
    id: Some(id),
    params,
    body,
    ..
  } = t.syntax(stmt)
  else {
    return false;
  };
  if params.len() < 2 {
    return false;
  }
  let Some(fn_name) = t.syntax(*id).ident_name() else {
    return false;
  };
  let Syntax::BlockStatement { body } = t.syntax(*body) else {
    return false;
  };
  if body.len() != 2 && body.len() != 3 {
    return false;
  }
  let Syntax::VariableDeclaration { declarations, .. } = t.syntax(body[0]) else {
    return false;
  };
  let [declarator] = declarations.as_slice() else {
    return false;
  };
  let Syntax::VariableDeclarator {
    init: Some(init), ..
  } = t.syntax(*declarator)
  else {
    return false;
  };
  let Syntax::CallExpression { callee, .. } = t.syntax(*init) else {
    return false;
  };
  if !query::is_identifier_named(t, *callee, array_fn_name) {
    return false;
  }

  let (reassign, call) = if body.len() == 2 {
    let Syntax::ReturnStatement {
      argument: Some(argument),
    } = t.syntax(body[1])
    else {
      return false;
    };
    let Syntax::SequenceExpression { expressions } = t.syntax(*argument) else {
      return false;
    };
    let [reassign, call] = expressions.as_slice() else {
      return false;
    };
    (*reassign, *call)
  } else {
    let Syntax::ExpressionStatement { expression } = t.syntax(body[1]) else {
      return false;
    };
    let Syntax::ReturnStatement {
      argument: Some(call),
    } = t.syntax(body[2])
    else {
      return false;
    };
    (*expression, *call)
  };
  let Syntax::AssignmentExpression { left, right, .. } = t.syntax(reassign) else {
    return false;
  };
  if !query::is_identifier_named(t, *left, fn_name) {
    return false;
  }
  if !matches!(t.syntax(*right), Syntax::FunctionExpression { .. }) {
    return false;
  }
  let Syntax::CallExpression { callee, .. } = t.syntax(call) else {
    return false;
  };
  query::is_identifier_named(t, *callee, fn_name)
}

/// The rotator: a top-level expression statement unwrapping (through
/// logical/sequence layers) to an immediately invoked function taking the
/// array function plus numeric seeds, spinning a while/try loop that
/// references the decode function.
pub(crate) fn find_string_array_rotate_stmt(
  t: &Tree,
  array_fn_name: &str,
  decode_fn_name: &str,
  root_body: &[NodeId],
) -> Option<NodeId> {
  root_body
    .iter()
    .copied()
    .find(|stmt| match_rotate_stmt(t, array_fn_name, decode_fn_name, *stmt))
}

fn match_rotate_stmt(t: &Tree, array_fn_name: &str, decode_fn_name: &str, stmt: NodeId) -> bool {
  let Syntax::ExpressionStatement { expression } = t.syntax(stmt) else {
    return false;
  };
  let mut call = *expression;
  loop {
    match t.syntax(call) {
      Syntax::CallExpression { .. } => break,
      Syntax::LogicalExpression { left, .. } => call = *left,
      Syntax::SequenceExpression { expressions } => match expressions.first() {
        Some(first) => call = *first,
        None => return false,
      },
      _ => return false,
    }
  }
  let Syntax::CallExpression {
    callee, arguments, ..
  } = t.syntax(call)
  else {
    return false;
  };
  let Syntax::FunctionExpression { body, .. } = t.syntax(*callee) else {
    return false;
  };
  // Arguments: the array function id exactly once, everything else numeric.
  let mut array_fn_present = false;
  for argument in arguments {
    match t.syntax(*argument) {
      Syntax::Identifier { name } => {
        if array_fn_present || name != array_fn_name {
          return false;
        }
        array_fn_present = true;
      }
      _ => {
        if !eval::is_number(t, *argument) {
          return false;
        }
      }
    }
  }
  let body = *body;
  let Some(while_stmt) = t.find_first(body, &mut |n| {
    matches!(t.syntax(n), Syntax::WhileStatement { .. })
  }) else {
    return false;
  };
  let while_body = match t.syntax(while_stmt) {
    Syntax::WhileStatement { body, .. } => *body,
    _ => return false,
  };
  if t
    .find_first(while_body, &mut |n| {
      matches!(t.syntax(n), Syntax::TryStatement { .. })
    })
    .is_none()
  {
    return false;
  }
  // The decode function must be captured or invoked inside.
  t.find_first(body, &mut |n| {
    if !query::is_identifier_named(t, n, decode_fn_name) {
      return false;
    }
    match t.parent(n).map(|p| (p, t.syntax(p))) {
      Some((_, Syntax::VariableDeclarator { init, .. })) => *init == Some(n),
      Some((_, Syntax::CallExpression { callee, .. })) => *callee == n,
      _ => false,
    }
  })
  .is_some()
}

fn find_version_declaration(t: &Tree, version_name: &str, root_body: &[NodeId]) -> Option<NodeId> {
  root_body.iter().copied().find(|stmt| {
    let Syntax::VariableDeclaration { declarations, .. } = t.syntax(*stmt) else {
      return false;
    };
    declarations.iter().any(|declarator| {
      matches!(t.syntax(*declarator), Syntax::VariableDeclarator { id, .. }
        if query::is_identifier_named(t, *id, version_name))
    })
  })
}

struct Wrapper {
  function: NodeId,
  id: NodeId,
  name: String,
  params: Vec<String>,
  /// The single ReturnStatement; its argument is the forwarded call.
  ret: NodeId,
}

/// Two-parameter functions whose single statement returns a call forwarding
/// (possibly offset) parameters to the decoder or to another wrapper.
fn find_wrapper_candidates(t: &Tree, root: NodeId) -> Vec<Wrapper> {
  let mut out = Vec::new();
  t.walk(root, &mut |n| {
    if let Some(wrapper) = match_wrapper(t, n) {
      out.push(wrapper);
    }
    Flow::Continue
  });
  out
}

fn match_wrapper(t: &Tree, n: NodeId) -> Option<Wrapper> {
  let Syntax::FunctionDeclaration {
    id: Some(id),
    params,
    body,
    ..
  } = t.syntax(n)
  else {
    return None;
  };
  if params.len() != 2 {
    return None;
  }
  let mut param_names = Vec::with_capacity(2);
  for param in params {
    param_names.push(t.syntax(*param).ident_name()?.to_string());
  }
  let Syntax::BlockStatement { body } = t.syntax(*body) else {
    return None;
  };
  let [ret] = body.as_slice() else {
    return None;
  };
  let Syntax::ReturnStatement {
    argument: Some(argument),
  } = t.syntax(*ret)
  else {
    return None;
  };
  let Syntax::CallExpression {
    callee, arguments, ..
  } = t.syntax(*argument)
  else {
    return None;
  };
  if t.syntax(*callee).ident_name().is_none() || arguments.len() != 2 {
    return None;
  }
  // Each argument consumes one distinct parameter, bare or offset by a
  // numeric term.
  let mut unused = param_names.clone();
  for argument in arguments {
    let param = match t.syntax(*argument) {
      Syntax::Identifier { name } => name.clone(),
      Syntax::BinaryExpression { left, right, .. } => {
        if let Some(name) = t.syntax(*left).ident_name() {
          if !eval::is_number(t, *right) {
            return None;
          }
          name.to_string()
        } else if let Some(name) = t.syntax(*right).ident_name() {
          if !eval::is_number(t, *left) {
            return None;
          }
          name.to_string()
        } else {
          return None;
        }
      }
      _ => return None,
    };
    let at = unused.iter().position(|p| *p == param)?;
    unused.remove(at);
  }
  let name = t.syntax(*id).ident_name()?.to_string();
  Some(Wrapper {
    function: n,
    id: *id,
    name,
    params: param_names,
    ret: *ret,
  })
}

fn wrapper_call_parts(t: &Tree, ret: NodeId) -> Option<(String, Vec<NodeId>)> {
  let Syntax::ReturnStatement {
    argument: Some(argument),
  } = t.syntax(ret)
  else {
    return None;
  };
  let Syntax::CallExpression {
    callee, arguments, ..
  } = t.syntax(*argument)
  else {
    return None;
  };
  Some((
    t.syntax(*callee).ident_name()?.to_string(),
    arguments.clone(),
  ))
}

/// Resolves wrapper chains down to direct decoder calls and substitutes
/// every fully numeric wrapper call site.
pub(crate) fn string_array_function_wrappers(
  t: &mut Tree,
  root: NodeId,
  decode_name: &str,
) -> PassResult {
  let mut pending = find_wrapper_candidates(t, root);
  if pending.is_empty() {
    return Ok(false);
  }
  // name -> (params, ret) of already-resolved wrappers.
  let mut resolved_by_name: HashMap<String, (Vec<String>, NodeId)> = HashMap::new();
  let mut resolved: Vec<Wrapper> = Vec::new();
  loop {
    let before = pending.len();
    let mut i = 0;
    while i < pending.len() {
      let Some((callee_name, call_args)) = wrapper_call_parts(t, pending[i].ret) else {
        i += 1;
        continue;
      };
      if callee_name == decode_name {
        let wrapper = pending.remove(i);
        resolved_by_name.insert(
          wrapper.name.clone(),
          (wrapper.params.clone(), wrapper.ret),
        );
        resolved.push(wrapper);
        continue;
      }
      if let Some((alias_params, alias_ret)) = resolved_by_name.get(&callee_name).cloned() {
        let alias_call = match t.syntax(alias_ret) {
          Syntax::ReturnStatement {
            argument: Some(alias_call),
          } => *alias_call,
          _ => {
            i += 1;
            continue;
          }
        };
        let actual = t.clone_subtree(alias_call)?;
        let mut substitution: HashMap<String, NodeId> = HashMap::new();
        for (slot, param) in alias_params.iter().enumerate() {
          if let Some(arg) = call_args.get(slot) {
            substitution.insert(param.clone(), *arg);
          }
        }
        query::replace_identifiers(t, actual, &substitution)?;
        if let Syntax::CallExpression { arguments, .. } = t.syntax(actual) {
          for argument in arguments.clone() {
            if matches!(t.syntax(argument), Syntax::BinaryExpression { .. }) {
              if let Some(simplified) = eval::simplify_additive(t, argument) {
                t.replace(argument, simplified);
              }
            }
          }
        }
        let old_call = match t.syntax(pending[i].ret) {
          Syntax::ReturnStatement {
            argument: Some(old_call),
          } => *old_call,
          _ => {
            i += 1;
            continue;
          }
        };
        t.replace(old_call, actual);
        let wrapper = pending.remove(i);
        resolved_by_name.insert(
          wrapper.name.clone(),
          (wrapper.params.clone(), wrapper.ret),
        );
        resolved.push(wrapper);
        continue;
      }
      i += 1;
    }
    if pending.len() == before {
      break;
    }
  }

  let mut changed = false;
  for wrapper in &resolved {
    changed |= substitute_wrapper_calls(t, wrapper)?;
  }
  Ok(changed)
}

fn substitute_wrapper_calls(t: &mut Tree, wrapper: &Wrapper) -> PassResult {
  let Some(scope) = query::closest_block(t, wrapper.function) else {
    return Ok(false);
  };
  let sites = t.collect_post(scope, &mut |n| {
    let Syntax::CallExpression {
      callee, arguments, ..
    } = t.syntax(n)
    else {
      return false;
    };
    query::is_identifier_named(t, *callee, &wrapper.name)
      && arguments.len() == 2
      && arguments.iter().all(|a| eval::is_number(t, *a))
  });
  let mut changed = false;
  for site in sites {
    if !t.is_attached_under(site, scope) {
      continue;
    }
    let Syntax::CallExpression { arguments, .. } = t.syntax(site) else {
      continue;
    };
    let mut values = Vec::with_capacity(arguments.len());
    let mut ok = true;
    for argument in arguments.clone() {
      match eval::evaluate(t, argument) {
        Ok(Value::Num(n)) => values.push(n),
        _ => {
          ok = false;
          break;
        }
      }
    }
    if !ok {
      continue;
    }
    let Syntax::ReturnStatement {
      argument: Some(template),
    } = t.syntax(wrapper.ret)
    else {
      continue;
    };
    let template = *template;
    let copy = t.clone_subtree(template)?;
    if rewrite_forwarded_arguments(t, copy, &wrapper.params, &values) {
      if t.replace(site, copy) {
        tracing::debug!(wrapper = %wrapper.name, "string_array: unwrapped call");
        changed = true;
      }
    }
  }
  if query::remove_if_unused(t, wrapper.id, Some(scope)) {
    changed = true;
  }
  Ok(changed)
}

/// Rewrites the cloned forwarded call's arguments, resolving parameter
/// references against the actual numeric call values.
fn rewrite_forwarded_arguments(
  t: &mut Tree,
  call: NodeId,
  params: &[String],
  values: &[f64],
) -> bool {
  let Syntax::CallExpression { arguments, .. } = t.syntax(call) else {
    return false;
  };
  let param_value = |name: &str| -> Option<Value> {
    params
      .iter()
      .position(|p| p == name)
      .and_then(|i| values.get(i))
      .map(|n| Value::Num(*n))
  };
  let mut rewrites: Vec<(NodeId, Value)> = Vec::new();
  for argument in arguments.clone() {
    let value = match t.syntax(argument) {
      Syntax::Identifier { name } => param_value(name),
      Syntax::UnaryExpression { operator, argument } => side_value(t, *argument, &param_value)
        .and_then(|v| eval::unary(*operator, &v).ok()),
      Syntax::BinaryExpression {
        operator,
        left,
        right,
      } => {
        let l = side_value(t, *left, &param_value);
        let r = side_value(t, *right, &param_value);
        match (l, r) {
          (Some(l), Some(r)) => eval::binary(*operator, &l, &r).ok(),
          _ => None,
        }
      }
      _ => None,
    };
    match value {
      Some(value) => rewrites.push((argument, value)),
      None => return false,
    }
  }
  for (argument, value) in rewrites {
    let literal = t.new_value(&value, None);
    t.replace(argument, literal);
  }
  true
}

fn side_value(
  t: &Tree,
  side: NodeId,
  param_value: &impl Fn(&str) -> Option<Value>,
) -> Option<Value> {
  match t.syntax(side) {
    Syntax::Identifier { name } => param_value(name),
    _ => eval::evaluate(t, side).ok(),
  }
}

pub(crate) fn string_array_function_wrappers_all(
  t: &mut Tree,
  root: NodeId,
  decode_name: &str,
) -> PassResult {
  super::run_to_fixpoint(|| string_array_function_wrappers(t, root, decode_name))
}
