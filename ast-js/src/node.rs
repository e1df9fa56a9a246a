use crate::error::StructureError;
use crate::error::StructureResult;
use crate::eval::Value;
use crate::syntax::Syntax;
use ahash::HashSet;
use ahash::HashSetExt;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use derive_visitor::Visitor;
use derive_visitor::VisitorMut;

/// Index of a node in its owning [`Tree`]. Never dangles as long as it is
/// only used with the tree that produced it; detached nodes keep their slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Drive, DriveMut)]
pub struct NodeId(#[drive(skip)] u32);

impl NodeId {
  pub(crate) fn new(index: usize) -> NodeId {
    NodeId(u32::try_from(index).expect("tree larger than u32::MAX nodes"))
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
  pub block: bool,
  pub text: String,
}

#[derive(Clone, Debug)]
pub struct NodeData {
  pub syntax: Syntax,
  /// Back-reference to the structural parent. A lookup aid only; ownership
  /// always lives with the tree's node vector.
  pub parent: Option<NodeId>,
  pub leading_comments: Vec<Comment>,
  pub trailing_comments: Vec<Comment>,
}

#[derive(Visitor)]
#[visitor(NodeId(enter))]
struct ChildCollector {
  out: Vec<NodeId>,
}

impl ChildCollector {
  fn enter_node_id(&mut self, id: &NodeId) {
    self.out.push(*id);
  }
}

#[derive(VisitorMut)]
#[visitor(NodeId(enter))]
struct SlotVisitor<'a> {
  apply: &'a mut dyn FnMut(&mut NodeId),
}

impl SlotVisitor<'_> {
  fn enter_node_id(&mut self, slot: &mut NodeId) {
    (self.apply)(slot);
  }
}

/// Applies `apply` to every direct child slot of `syntax`, in traversal
/// order.
pub fn rewrite_child_slots(syntax: &mut Syntax, apply: &mut dyn FnMut(&mut NodeId)) {
  let mut visitor = SlotVisitor { apply };
  syntax.drive_mut(&mut visitor);
}

/// A tree together with its root node, as handed over by the parser.
#[derive(Clone, Debug)]
pub struct Ast {
  pub tree: Tree,
  pub root: NodeId,
}

/// Arena holding every node of one logical syntax tree by value.
///
/// Nodes are created by the parser in bulk or synthesized by rewrite passes
/// one at a time; they are destroyed only by becoming unreachable from the
/// root. All child links and parent back-references are [`NodeId`] indexes
/// into this arena, so detaching or copying a subtree can never produce a
/// dangling pointer.
#[derive(Clone, Debug, Default)]
pub struct Tree {
  nodes: Vec<NodeData>,
}

impl Tree {
  pub fn new() -> Tree {
    Tree::default()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn alloc(&mut self, syntax: Syntax) -> NodeId {
    let id = NodeId::new(self.nodes.len());
    self.nodes.push(NodeData {
      syntax,
      parent: None,
      leading_comments: Vec::new(),
      trailing_comments: Vec::new(),
    });
    id
  }

  /// Allocates a node with its parent back-reference already set. The caller
  /// is still responsible for storing the returned id in a child slot of
  /// `parent`.
  pub fn alloc_in(&mut self, syntax: Syntax, parent: NodeId) -> NodeId {
    let id = self.alloc(syntax);
    self.nodes[id.index()].parent = Some(parent);
    id
  }

  pub fn node(&self, id: NodeId) -> &NodeData {
    &self.nodes[id.index()]
  }

  pub fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
    &mut self.nodes[id.index()]
  }

  pub fn syntax(&self, id: NodeId) -> &Syntax {
    &self.nodes[id.index()].syntax
  }

  pub fn syntax_mut(&mut self, id: NodeId) -> &mut Syntax {
    &mut self.nodes[id.index()].syntax
  }

  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.nodes[id.index()].parent
  }

  pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
    self.nodes[id.index()].parent = parent;
  }

  /// Direct children of `id` in traversal order.
  pub fn children(&self, id: NodeId) -> Vec<NodeId> {
    let mut collector = ChildCollector { out: Vec::new() };
    self.nodes[id.index()].syntax.drive(&mut collector);
    collector.out
  }

  /// Sets the parent back-reference of every node reachable from `root` to
  /// its structural parent. Must run after parsing and after attaching any
  /// externally constructed subtree.
  pub fn link_parents(&mut self, root: NodeId) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
      for child in self.children(id) {
        self.nodes[child.index()].parent = Some(id);
        stack.push(child);
      }
    }
  }

  /// Deep-copies the subtree at `id`. The copy's internal parents are fresh
  /// and its own parent is unset; the caller attaches it. Fails without
  /// allocating a partial parent-linked copy when the subtree revisits a
  /// node.
  pub fn clone_subtree(&mut self, id: NodeId) -> StructureResult<NodeId> {
    let mut visited = HashSet::new();
    self.clone_rec(id, &mut visited)
  }

  fn clone_rec(&mut self, id: NodeId, visited: &mut HashSet<NodeId>) -> StructureResult<NodeId> {
    if !visited.insert(id) {
      return Err(StructureError::cyclic(id));
    }
    let child_ids = self.children(id);
    let mut copies = Vec::with_capacity(child_ids.len());
    for child in child_ids {
      copies.push(self.clone_rec(child, visited)?);
    }
    let mut syntax = self.nodes[id.index()].syntax.clone();
    let mut next = copies.iter().copied();
    rewrite_child_slots(&mut syntax, &mut |slot| {
      *slot = next.next().expect("copied child count must match child slots");
    });
    let leading = self.nodes[id.index()].leading_comments.clone();
    let trailing = self.nodes[id.index()].trailing_comments.clone();
    let copy = self.alloc(syntax);
    self.nodes[copy.index()].leading_comments = leading;
    self.nodes[copy.index()].trailing_comments = trailing;
    for child in copies {
      self.nodes[child.index()].parent = Some(copy);
    }
    Ok(copy)
  }

  /// Deep-copies the subtree at `id` into another tree, the required way to
  /// move structure between logical trees: no node is ever shared by two
  /// independently mutated arenas.
  pub fn copy_into(&self, id: NodeId, dest: &mut Tree) -> StructureResult<NodeId> {
    let mut visited = HashSet::new();
    self.copy_into_rec(id, dest, &mut visited)
  }

  fn copy_into_rec(
    &self,
    id: NodeId,
    dest: &mut Tree,
    visited: &mut HashSet<NodeId>,
  ) -> StructureResult<NodeId> {
    if !visited.insert(id) {
      return Err(StructureError::cyclic(id));
    }
    let child_ids = self.children(id);
    let mut copies = Vec::with_capacity(child_ids.len());
    for child in child_ids {
      copies.push(self.copy_into_rec(child, dest, visited)?);
    }
    let mut syntax = self.nodes[id.index()].syntax.clone();
    let mut next = copies.iter().copied();
    rewrite_child_slots(&mut syntax, &mut |slot| {
      *slot = next.next().expect("copied child count must match child slots");
    });
    let copy = dest.alloc(syntax);
    dest.nodes[copy.index()].leading_comments = self.nodes[id.index()].leading_comments.clone();
    dest.nodes[copy.index()].trailing_comments = self.nodes[id.index()].trailing_comments.clone();
    for child in copies {
      dest.nodes[child.index()].parent = Some(copy);
    }
    Ok(copy)
  }

  /// Swaps the child slot of `old`'s parent to point at `new` and fixes both
  /// parent back-references. Returns false when `old` has no parent or the
  /// parent holds no slot for it.
  pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
    let Some(parent) = self.parent(old) else {
      return false;
    };
    let mut swapped = false;
    rewrite_child_slots(&mut self.nodes[parent.index()].syntax, &mut |slot| {
      if *slot == old {
        *slot = new;
        swapped = true;
      }
    });
    if swapped {
      self.nodes[new.index()].parent = Some(parent);
      self.nodes[old.index()].parent = None;
    }
    swapped
  }

  /// Removes `id` from its parent. Only list slots (statement bodies,
  /// declarator/property/argument lists) and optional slots can lose a
  /// child; removal from a required slot would leave a hole, so it is
  /// refused instead.
  pub fn detach(&mut self, id: NodeId) -> bool {
    let Some(parent) = self.parent(id) else {
      return false;
    };
    fn from_list(list: &mut Vec<NodeId>, id: NodeId) -> bool {
      match list.iter().position(|n| *n == id) {
        Some(at) => {
          list.remove(at);
          true
        }
        None => false,
      }
    }
    fn from_holes(list: &mut [Option<NodeId>], id: NodeId) -> bool {
      for slot in list.iter_mut() {
        if *slot == Some(id) {
          *slot = None;
          return true;
        }
      }
      false
    }
    fn from_opt(slot: &mut Option<NodeId>, id: NodeId) -> bool {
      if *slot == Some(id) {
        *slot = None;
        return true;
      }
      false
    }
    let removed = match &mut self.nodes[parent.index()].syntax {
      Syntax::Program { body }
      | Syntax::BlockStatement { body }
      | Syntax::StaticBlock { body }
      | Syntax::ClassBody { body } => from_list(body, id),
      Syntax::SwitchCase { consequent, .. } => from_list(consequent, id),
      Syntax::VariableDeclaration { declarations, .. } => from_list(declarations, id),
      Syntax::VariableDeclarator { init, .. } => from_opt(init, id),
      Syntax::ObjectExpression { properties } | Syntax::ObjectPattern { properties } => {
        from_list(properties, id)
      }
      Syntax::SequenceExpression { expressions } => from_list(expressions, id),
      Syntax::CallExpression { arguments, .. } | Syntax::NewExpression { arguments, .. } => {
        from_list(arguments, id)
      }
      Syntax::ArrayExpression { elements } | Syntax::ArrayPattern { elements } => {
        from_holes(elements, id)
      }
      Syntax::IfStatement { alternate, .. } => from_opt(alternate, id),
      Syntax::ReturnStatement { argument } | Syntax::YieldExpression { argument, .. } => {
        from_opt(argument, id)
      }
      Syntax::ForStatement {
        init, test, update, ..
      } => from_opt(init, id) || from_opt(test, id) || from_opt(update, id),
      Syntax::FunctionDeclaration { params, .. }
      | Syntax::FunctionExpression { params, .. }
      | Syntax::ArrowFunctionExpression { params, .. } => from_list(params, id),
      Syntax::TryStatement {
        handler, finalizer, ..
      } => from_opt(handler, id) || from_opt(finalizer, id),
      Syntax::CatchClause { param, .. } => from_opt(param, id),
      Syntax::BreakStatement { label } | Syntax::ContinueStatement { label } => {
        from_opt(label, id)
      }
      _ => false,
    };
    if removed {
      self.nodes[id.index()].parent = None;
    }
    removed
  }

  /// Mutable access to a node's statement list, for kinds that have one.
  pub fn body_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
    match &mut self.nodes[id.index()].syntax {
      Syntax::Program { body }
      | Syntax::BlockStatement { body }
      | Syntax::StaticBlock { body } => Some(body),
      _ => None,
    }
  }

  /// Whether `id` is reachable from `root` by following parent links.
  pub fn is_attached_under(&self, id: NodeId, root: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
      if node == root {
        return true;
      }
      current = self.parent(node);
    }
    false
  }

  pub fn new_identifier(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
    let id = self.alloc(Syntax::Identifier {
      name: name.to_string(),
    });
    self.nodes[id.index()].parent = parent;
    id
  }

  /// Builds a literal (or the nearest expressible node) from a runtime
  /// value, following JSON notation where one exists: `undefined` becomes
  /// the identifier, arrays become array literals.
  pub fn new_value(&mut self, value: &Value, parent: Option<NodeId>) -> NodeId {
    let id = match value {
      Value::Undefined => self.alloc(Syntax::Identifier {
        name: "undefined".to_string(),
      }),
      Value::Arr(elements) => {
        let elems: Vec<Option<NodeId>> = elements
          .iter()
          .map(|element| Some(self.new_value(element, None)))
          .collect();
        let arr = self.alloc(Syntax::ArrayExpression { elements: elems });
        for element in self.children(arr) {
          self.nodes[element.index()].parent = Some(arr);
        }
        arr
      }
      Value::Obj => self.alloc(Syntax::ObjectExpression {
        properties: Vec::new(),
      }),
      other => self.alloc(Syntax::Literal {
        value: other.clone(),
        raw: None,
      }),
    };
    self.nodes[id.index()].parent = parent;
    id
  }

  pub fn new_throw(&mut self, message: &str, parent: Option<NodeId>) -> NodeId {
    let argument = self.new_value(&Value::Str(message.to_string()), None);
    let throw = self.alloc(Syntax::ThrowStatement { argument });
    self.nodes[argument.index()].parent = Some(throw);
    self.nodes[throw.index()].parent = parent;
    throw
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::syntax::BinaryOp;

  fn literal(tree: &mut Tree, value: f64) -> NodeId {
    tree.alloc(Syntax::Literal {
      value: Value::Num(value),
      raw: None,
    })
  }

  #[test]
  fn clone_subtree_relinks_parents() {
    let mut tree = Tree::new();
    let left = literal(&mut tree, 1.0);
    let right = literal(&mut tree, 2.0);
    let bin = tree.alloc(Syntax::BinaryExpression {
      operator: BinaryOp::Add,
      left,
      right,
    });
    tree.link_parents(bin);

    let copy = tree.clone_subtree(bin).unwrap();
    assert_ne!(copy, bin);
    assert_eq!(tree.parent(copy), None);
    let kids = tree.children(copy);
    assert_eq!(kids.len(), 2);
    for kid in kids {
      assert_eq!(tree.parent(kid), Some(copy));
      assert_ne!(kid, left);
      assert_ne!(kid, right);
    }
  }

  #[test]
  fn clone_subtree_rejects_cycles() {
    let mut tree = Tree::new();
    let arg = literal(&mut tree, 1.0);
    let unary = tree.alloc(Syntax::UnaryExpression {
      operator: crate::syntax::UnaryOp::Minus,
      argument: arg,
    });
    // Manufacture a self-referential slot.
    if let Syntax::UnaryExpression { argument, .. } = tree.syntax_mut(unary) {
      *argument = unary;
    }
    assert!(tree.clone_subtree(unary).is_err());
  }

  #[test]
  fn replace_rewires_parent_slot() {
    let mut tree = Tree::new();
    let old = literal(&mut tree, 1.0);
    let stmt = tree.alloc(Syntax::ExpressionStatement { expression: old });
    tree.link_parents(stmt);
    let new = literal(&mut tree, 2.0);
    assert!(tree.replace(old, new));
    assert_eq!(
      tree.children(stmt),
      vec![new],
      "slot should point at the replacement"
    );
    assert_eq!(tree.parent(new), Some(stmt));
    assert_eq!(tree.parent(old), None);
  }

  #[test]
  fn detach_removes_statement_from_block() {
    let mut tree = Tree::new();
    let a = tree.alloc(Syntax::EmptyStatement);
    let b = tree.alloc(Syntax::DebuggerStatement);
    let block = tree.alloc(Syntax::BlockStatement { body: vec![a, b] });
    tree.link_parents(block);
    assert!(tree.detach(a));
    assert_eq!(tree.children(block), vec![b]);
    assert_eq!(tree.parent(a), None);
    // Required slots refuse removal.
    let expr = literal(&mut tree, 1.0);
    let stmt = tree.alloc(Syntax::ExpressionStatement { expression: expr });
    tree.link_parents(stmt);
    assert!(!tree.detach(expr));
  }
}
