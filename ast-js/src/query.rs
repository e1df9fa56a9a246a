//! Identifier and scope queries used by the rewrite passes. All matching is
//! by name within the nearest syntactic boundary (Program, BlockStatement,
//! SwitchCase); there is no binding resolution, so shadowed names are
//! indistinguishable from their outer namesakes. That mirrors the engine
//! this reimplements and passes rely on it.

use crate::eval::Value;
use crate::node::NodeId;
use crate::node::Tree;
use crate::syntax::Syntax;
use crate::walk::Flow;
use ahash::HashMap;
use ahash::HashSet;
use once_cell::sync::Lazy;

static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
  ]
  .into_iter()
  .collect()
});

pub fn is_identifier_named(tree: &Tree, id: NodeId, name: &str) -> bool {
  matches!(tree.syntax(id), Syntax::Identifier { name: n } if n == name)
}

/// Whether the name of an identifier or the value of a string literal equals
/// `name` (property positions accept both spellings).
pub fn is_name_equals(tree: &Tree, id: NodeId, name: &str) -> bool {
  match tree.syntax(id) {
    Syntax::Identifier { name: n } => n == name,
    Syntax::Literal {
      value: Value::Str(s),
      ..
    } => s == name,
    _ => false,
  }
}

pub fn is_literal_eq(tree: &Tree, id: NodeId, value: &Value) -> bool {
  matches!(tree.syntax(id), Syntax::Literal { value: v, .. } if v == value)
}

pub fn is_string_literal(tree: &Tree, id: NodeId) -> bool {
  tree.syntax(id).string_value().is_some()
}

/// Property key as a string: identifier name, or string literal value.
/// Numeric and computed keys yield None and are skipped by callers.
pub fn prop_key_string(tree: &Tree, id: NodeId) -> Option<String> {
  match tree.syntax(id) {
    Syntax::Identifier { name } => Some(name.clone()),
    Syntax::Literal {
      value: Value::Str(s),
      ..
    } => Some(s.clone()),
    _ => None,
  }
}

/// Nearest ancestor matching `pred`, not including `id` itself.
pub fn closest(tree: &Tree, id: NodeId, pred: impl Fn(&Syntax) -> bool) -> Option<NodeId> {
  let mut current = tree.parent(id);
  while let Some(node) = current {
    if pred(tree.syntax(node)) {
      return Some(node);
    }
    current = tree.parent(node);
  }
  None
}

/// Nearest enclosing syntactic scope boundary.
pub fn closest_block(tree: &Tree, id: NodeId) -> Option<NodeId> {
  closest(tree, id, |syntax| {
    matches!(
      syntax,
      Syntax::Program { .. } | Syntax::BlockStatement { .. } | Syntax::SwitchCase { .. }
    )
  })
}

/// Whether any other identifier with the same name occurs within `scope`.
pub fn is_referenced(tree: &Tree, ident: NodeId, scope: NodeId) -> bool {
  let Some(name) = tree.syntax(ident).ident_name() else {
    return false;
  };
  let mut found = false;
  tree.walk(scope, &mut |n| {
    if n != ident && is_identifier_named(tree, n, name) {
      found = true;
      Flow::Stop
    } else {
      Flow::Continue
    }
  });
  found
}

/// Whether no assignment expression within `scope` targets `name`.
pub fn is_final(tree: &Tree, name: &str, scope: NodeId) -> bool {
  let mut reassigned = false;
  tree.walk(scope, &mut |n| {
    if let Syntax::AssignmentExpression { left, .. } = tree.syntax(n) {
      if is_identifier_named(tree, *left, name) {
        reassigned = true;
        return Flow::Stop;
      }
    }
    Flow::Continue
  });
  !reassigned
}

/// Like [`is_final`], but only assignments occurring before `until` in
/// traversal order count.
pub fn is_final_until(tree: &Tree, name: &str, scope: NodeId, until: NodeId) -> bool {
  let mut reassigned = false;
  tree.walk(scope, &mut |n| {
    if n == until {
      return Flow::Stop;
    }
    if let Syntax::AssignmentExpression { left, .. } = tree.syntax(n) {
      if is_identifier_named(tree, *left, name) {
        reassigned = true;
        return Flow::Stop;
      }
    }
    Flow::Continue
  });
  !reassigned
}

/// Whether `id` is the declared name of its parent (variable declarator,
/// function declaration, or class declaration).
pub fn is_declared_id(tree: &Tree, id: NodeId) -> bool {
  let Some(parent) = tree.parent(id) else {
    return false;
  };
  match tree.syntax(parent) {
    Syntax::VariableDeclarator { id: declared, .. } => *declared == id,
    Syntax::FunctionDeclaration { id: declared, .. }
    | Syntax::ClassDeclaration { id: declared, .. } => *declared == Some(id),
    _ => false,
  }
}

/// Widens an identifier to the whole statement that can be deleted without
/// leaving a dangling declaration behind.
pub fn removable_ancestor(tree: &Tree, id: NodeId) -> NodeId {
  let mut result = id;
  if let Some(parent) = tree.parent(result) {
    if matches!(tree.syntax(parent), Syntax::FunctionDeclaration { id: declared, .. } if *declared == Some(result))
    {
      result = parent;
    }
  }
  if let Some(parent) = tree.parent(result) {
    if matches!(tree.syntax(parent), Syntax::VariableDeclarator { .. }) {
      result = parent;
    }
  }
  if let Some(parent) = tree.parent(result) {
    if matches!(tree.syntax(parent), Syntax::VariableDeclaration { declarations, .. } if declarations.len() == 1)
    {
      result = parent;
    }
  }
  if let Some(parent) = tree.parent(result) {
    if matches!(tree.syntax(parent), Syntax::ClassDeclaration { id: declared, .. } if *declared == Some(result))
    {
      result = parent;
    }
  }
  result
}

/// Removes the declaration behind `ident` when nothing else in `scope`
/// mentions the name. Returns whether a removal happened.
pub fn remove_if_unused(tree: &mut Tree, ident: NodeId, scope: Option<NodeId>) -> bool {
  let Some(scope) = scope.or_else(|| closest_block(tree, ident)) else {
    return false;
  };
  if is_referenced(tree, ident, scope) {
    tracing::debug!(node = ident.index(), "remove_if_unused: still referenced");
    return false;
  }
  let target = removable_ancestor(tree, ident);
  let removed = tree.detach(target);
  if removed {
    tracing::debug!(node = target.index(), "remove_if_unused: removed");
  }
  removed
}

/// Replaces every identifier under `root` whose name is mapped with a clone
/// of the mapped subtree. Substituted clones are not re-visited.
pub fn replace_identifiers(
  tree: &mut Tree,
  root: NodeId,
  map: &HashMap<String, NodeId>,
) -> crate::StructureResult<()> {
  let targets = tree.collect_post(root, &mut |n| {
    matches!(tree.syntax(n).ident_name(), Some(name) if map.contains_key(name))
  });
  for target in targets {
    let name = match tree.syntax(target).ident_name() {
      Some(name) => name.to_string(),
      None => continue,
    };
    let copy = tree.clone_subtree(map[&name])?;
    tree.replace(target, copy);
  }
  Ok(())
}

pub fn is_empty_block_or_statement(tree: &Tree, id: NodeId) -> bool {
  match tree.syntax(id) {
    Syntax::EmptyStatement => true,
    Syntax::BlockStatement { body } => body
      .iter()
      .all(|stmt| is_empty_block_or_statement(tree, *stmt)),
    _ => false,
  }
}

/// Whether `name` can appear as a bare property/identifier: ASCII
/// identifier syntax and not a reserved word.
pub fn is_valid_identifier_name(name: &str) -> bool {
  let mut chars = name.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
    return false;
  }
  if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
    return false;
  }
  !RESERVED_WORDS.contains(name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::syntax::AssignOp;
  use crate::syntax::VarDeclKind;

  fn tree_with_assignment() -> (Tree, NodeId) {
    // { a = 1; }
    let mut tree = Tree::new();
    let left = tree.new_identifier("a", None);
    let right = tree.new_value(&Value::Num(1.0), None);
    let assign = tree.alloc(Syntax::AssignmentExpression {
      operator: AssignOp::Assign,
      left,
      right,
    });
    let stmt = tree.alloc(Syntax::ExpressionStatement { expression: assign });
    let block = tree.alloc(Syntax::BlockStatement { body: vec![stmt] });
    tree.link_parents(block);
    (tree, block)
  }

  #[test]
  fn finality_sees_reassignments() {
    let (tree, block) = tree_with_assignment();
    assert!(!is_final(&tree, "a", block));
    assert!(is_final(&tree, "b", block));
  }

  #[test]
  fn removable_ancestor_widens_to_declaration() {
    let mut tree = Tree::new();
    let id = tree.new_identifier("x", None);
    let init = tree.new_value(&Value::Num(1.0), None);
    let declarator = tree.alloc(Syntax::VariableDeclarator {
      id,
      init: Some(init),
    });
    let decl = tree.alloc(Syntax::VariableDeclaration {
      kind: VarDeclKind::Var,
      declarations: vec![declarator],
    });
    tree.link_parents(decl);
    assert_eq!(removable_ancestor(&tree, id), decl);
  }

  #[test]
  fn valid_identifier_names() {
    assert!(is_valid_identifier_name("dd"));
    assert!(is_valid_identifier_name("a1"));
    assert!(is_valid_identifier_name("$x"));
    assert!(!is_valid_identifier_name("2b"));
    assert!(!is_valid_identifier_name("-c"));
    assert!(!is_valid_identifier_name("not valid!"));
    assert!(!is_valid_identifier_name("class"));
    assert!(!is_valid_identifier_name(""));
  }
}
