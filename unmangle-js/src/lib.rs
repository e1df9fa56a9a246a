//! Source-to-source deobfuscation for ECMAScript. Parses a script, drives
//! the pattern-matching rewrite catalogue over the tree, and serializes the
//! result. Individual passes are exported for callers that already hold a
//! linked tree; a run that matches no obfuscation idiom is a no-op, not an
//! error.

use ast_js::Ast;
use ast_js::NodeId;
use ast_js::StructureResult;
use ast_js::Tree;

mod err;
pub mod pass;
pub mod sandbox;

pub use err::UnmangleError;

/// Runs the full pass catalogue once, in order: string-array decoding (with
/// hashed-object flattening before and after, and wrapper unwrapping
/// inside), control-flow unflattening, constant inlining, constant folding,
/// constant-condition simplification, computed-to-dot rewriting, and
/// hexadecimal cleanup of literal text. Mutates the tree in place; returns
/// whether anything changed.
pub fn deobfuscate(t: &mut Tree, root: NodeId) -> StructureResult<bool> {
  let mut changed = pass::string_array_transformations(t, root)?;
  changed |= pass::control_flow_flattening_all(t, root)?;
  changed |= pass::inline_constants_all(t, root)?;
  changed |= pass::eval_constant_expressions_all(t, root)?;
  changed |= pass::simplify_all(t, root)?;
  changed |= pass::computed_to_dot_all(t, root)?;
  changed |= pass::hexadecimal(t, root)?;
  Ok(changed)
}

/// Parse, deobfuscate, and re-render source text.
pub fn deobfuscate_source(source: &str) -> Result<String, UnmangleError> {
  let Ast { mut tree, root } = parse_js::parse(source)?;
  deobfuscate(&mut tree, root)?;
  Ok(emit_js::generate(&tree, root, emit_js::Options::default()))
}
