use super::run_to_fixpoint;
use super::PassResult;
use ahash::HashMap;
use ahash::HashMapExt;
use ast_js::eval;
use ast_js::query;
use ast_js::Flow;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;

/// A cached property of a matched hash object: either a plain literal-like
/// value or a single-return function.
enum Prop {
  Plain(NodeId),
  Func {
    params: Vec<String>,
    /// The ReturnStatement; its argument is re-read at every substitution
    /// since earlier rewrites may run through it.
    ret: NodeId,
  },
}

struct Hash {
  scope: NodeId,
  declarator: NodeId,
  id: NodeId,
  name: String,
  props: HashMap<String, Prop>,
}

/// Flattens call-dispatch objects: a never-reassigned object literal whose
/// properties are all literals or single-return functions. Member calls are
/// replaced by the function's return expression with arguments substituted
/// for parameters, member reads by the property value; fully literal
/// results get folded. The object binding is dropped once nothing else
/// refers to it.
pub fn flatten_hashed_members(t: &mut Tree, root: NodeId) -> PassResult {
  let mut hashes: Vec<Hash> = Vec::new();
  t.walk(root, &mut |n| {
    if let Some(hash) = match_hash_object(t, n) {
      hashes.push(hash);
    }
    Flow::Continue
  });
  if hashes.is_empty() {
    return Ok(false);
  }

  let mut changed = false;
  for hash in &hashes {
    changed |= rewrite_hash_uses(t, hash)?;
  }
  for hash in &hashes {
    if !t.is_attached_under(hash.declarator, root) {
      continue;
    }
    if !query::is_referenced(t, hash.id, hash.scope) {
      let removable = query::removable_ancestor(t, hash.declarator);
      if t.detach(removable) {
        tracing::debug!(object = %hash.name, "flatten_hashed_members: removed object");
        changed = true;
      }
    }
  }
  Ok(changed)
}

fn match_hash_object(t: &Tree, declarator: NodeId) -> Option<Hash> {
  let Syntax::VariableDeclarator {
    id,
    init: Some(init),
  } = t.syntax(declarator)
  else {
    return None;
  };
  let name = t.syntax(*id).ident_name()?.to_string();
  let Syntax::ObjectExpression { properties } = t.syntax(*init) else {
    return None;
  };
  let mut props = HashMap::new();
  for property in properties {
    let Syntax::Property {
      key,
      value,
      computed: false,
      ..
    } = t.syntax(*property)
    else {
      return None;
    };
    let key = query::prop_key_string(t, *key)?;
    if let Syntax::FunctionExpression { params, body, .. } = t.syntax(*value) {
      let Syntax::BlockStatement { body } = t.syntax(*body) else {
        return None;
      };
      let [ret] = body.as_slice() else {
        return None;
      };
      if !matches!(t.syntax(*ret), Syntax::ReturnStatement { argument: Some(_) }) {
        return None;
      }
      let mut names = Vec::with_capacity(params.len());
      for param in params {
        names.push(t.syntax(*param).ident_name()?.to_string());
      }
      props.insert(key, Prop::Func {
        params: names,
        ret: *ret,
      });
    } else if eval::is_literal_like(t, *value) {
      props.insert(key, Prop::Plain(*value));
    } else {
      return None;
    }
  }
  let scope = query::closest_block(t, declarator)?;
  if !query::is_final(t, &name, scope) {
    return None;
  }
  Some(Hash {
    scope,
    declarator,
    id: *id,
    name,
    props,
  })
}

fn rewrite_hash_uses(t: &mut Tree, hash: &Hash) -> PassResult {
  let mut changed = false;
  // Post-order, so uses nested inside other rewritable expressions resolve
  // inside-out, which is what lets chained hash objects settle in one run.
  let uses = t.collect_post(hash.scope, &mut |n| {
    is_member_call_on(t, n, &hash.name) || is_member_read_on(t, n, &hash.name)
  });
  for site in uses {
    if !t.is_attached_under(site, hash.scope) {
      continue;
    }
    if is_member_call_on(t, site, &hash.name) {
      changed |= rewrite_call(t, hash, site)?;
    } else if is_member_read_on(t, site, &hash.name) {
      changed |= rewrite_read(t, hash, site)?;
    }
  }
  Ok(changed)
}

fn is_member_call_on(t: &Tree, n: NodeId, name: &str) -> bool {
  let Syntax::CallExpression { callee, .. } = t.syntax(n) else {
    return false;
  };
  matches!(
    t.syntax(*callee),
    Syntax::MemberExpression { object, .. } if query::is_identifier_named(t, *object, name)
  )
}

fn is_member_read_on(t: &Tree, n: NodeId, name: &str) -> bool {
  let Syntax::MemberExpression {
    object, property, ..
  } = t.syntax(n)
  else {
    return false;
  };
  if !query::is_identifier_named(t, *object, name) {
    return false;
  }
  // Leave the callee of a member call to the call rewrite.
  if let Some(parent) = t.parent(n) {
    if matches!(t.syntax(parent), Syntax::CallExpression { callee, .. } if *callee == n) {
      return false;
    }
  }
  matches!(
    t.syntax(*property),
    Syntax::Identifier { .. } | Syntax::Literal { .. }
  ) && query::prop_key_string(t, *property).is_some()
}

fn rewrite_call(t: &mut Tree, hash: &Hash, call: NodeId) -> PassResult {
  let Syntax::CallExpression {
    callee, arguments, ..
  } = t.syntax(call)
  else {
    return Ok(false);
  };
  let arguments = arguments.clone();
  let Syntax::MemberExpression { property, .. } = t.syntax(*callee) else {
    return Ok(false);
  };
  let Some(key) = query::prop_key_string(t, *property) else {
    return Ok(false);
  };
  let Some(Prop::Func { params, ret }) = hash.props.get(&key) else {
    return Ok(false);
  };
  let argument = match t.syntax(*ret) {
    Syntax::ReturnStatement {
      argument: Some(argument),
    } => *argument,
    _ => return Ok(false),
  };
  let mut substitution: HashMap<String, NodeId> = HashMap::new();
  for (i, param) in params.iter().enumerate() {
    if let Some(arg) = arguments.get(i) {
      substitution.insert(param.clone(), *arg);
    }
  }
  let mut replacement = t.clone_subtree(argument)?;
  query::replace_identifiers(t, replacement, &substitution)?;
  if matches!(t.syntax(replacement), Syntax::BinaryExpression { .. })
    && eval::is_literal_like(t, replacement)
  {
    if let Ok(value) = eval::evaluate(t, replacement) {
      replacement = t.new_value(&value, None);
    }
  }
  tracing::debug!(object = %hash.name, prop = %key, "flatten_hashed_members: call");
  Ok(t.replace(call, replacement))
}

fn rewrite_read(t: &mut Tree, hash: &Hash, member: NodeId) -> PassResult {
  let Syntax::MemberExpression { property, .. } = t.syntax(member) else {
    return Ok(false);
  };
  let Some(key) = query::prop_key_string(t, *property) else {
    return Ok(false);
  };
  let replacement = match hash.props.get(&key) {
    Some(Prop::Plain(value)) => *value,
    // Passed around as a function value; left for a later run.
    Some(Prop::Func { .. }) => return Ok(false),
    None => return Ok(false),
  };
  let copy = t.clone_subtree(replacement)?;
  tracing::debug!(object = %hash.name, prop = %key, "flatten_hashed_members: read");
  Ok(t.replace(member, copy))
}

pub fn flatten_hashed_members_all(t: &mut Tree, root: NodeId) -> PassResult {
  run_to_fixpoint(|| flatten_hashed_members(t, root))
}
