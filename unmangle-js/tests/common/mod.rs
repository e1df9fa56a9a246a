#![allow(dead_code)]

use ast_js::Ast;
use ast_js::NodeId;
use ast_js::Tree;
use emit_js::Options;

/// Parses `input`, runs `transform`, and compares the re-rendered source
/// against `expected` (both trimmed), printing a line diff on mismatch. The
/// four-space indent matches the fixtures this suite inherited.
pub fn run_test(input: &str, expected: &str, transform: impl FnOnce(&mut Tree, NodeId)) {
  let Ast { mut tree, root } = parse_js::parse(input).expect("test input must parse");
  transform(&mut tree, root);
  let actual = emit_js::generate(&tree, root, Options::with_indent("    "));
  assert_text_eq(actual.trim(), expected.trim());
}

pub fn assert_text_eq(actual: &str, expected: &str) {
  if actual != expected {
    let diff = similar::TextDiff::from_lines(expected, actual);
    panic!(
      "rendered output mismatch:\n{}",
      diff
        .iter_all_changes()
        .map(|change| format!("{}{}", change.tag(), change))
        .collect::<String>()
    );
  }
}

/// Checks that every reachable node's parent back-reference matches its
/// structural parent.
pub fn assert_parents_consistent(tree: &Tree, root: NodeId) {
  tree.walk(root, &mut |id| {
    for child in tree.children(id) {
      assert_eq!(
        tree.parent(child),
        Some(id),
        "stale parent link on node {child:?}"
      );
    }
    ast_js::Flow::Continue
  });
}
