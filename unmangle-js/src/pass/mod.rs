//! The rewrite pass catalogue. Every pass is `fn(&mut Tree, NodeId) -> bool`
//! (did anything change), mutates in place, and treats a failed structural
//! match as "no change" rather than an error. `run_to_fixpoint` is the one
//! shared repetition combinator so all `*_all` variants share termination
//! semantics.

mod computed_to_dot;
mod control_flow;
mod fold;
mod hashed_object;
mod hexadecimal;
mod inline_constants;
mod simplify;
mod string_array;

pub use computed_to_dot::computed_to_dot;
pub use computed_to_dot::computed_to_dot_all;
pub use control_flow::control_flow_flattening;
pub use control_flow::control_flow_flattening_all;
pub use fold::eval_constant_expressions;
pub use fold::eval_constant_expressions_all;
pub use hashed_object::flatten_hashed_members;
pub use hashed_object::flatten_hashed_members_all;
pub use hexadecimal::hexadecimal;
pub use inline_constants::inline_constants;
pub use inline_constants::inline_constants_all;
pub use simplify::simplify;
pub use simplify::simplify_all;
pub use string_array::string_array_transformations;

/// A pass reports whether it changed the tree. The only error a pass can
/// raise is a structural one (a cyclic subtree met while cloning), which
/// aborts the invocation instead of risking a half-rewritten tree.
pub type PassResult = ast_js::StructureResult<bool>;

/// Iteration ceiling for fixpoint-driven passes. Hitting it means a pass
/// kept reporting changes on every round, which real inputs never need.
pub const MAX_FIXPOINT_ITERATIONS: usize = 64;

/// Re-invokes `pass` until it reports no change or the ceiling is reached.
/// Returns whether any invocation changed the tree.
pub fn run_to_fixpoint(mut pass: impl FnMut() -> PassResult) -> PassResult {
  let mut changed = false;
  for _ in 0..MAX_FIXPOINT_ITERATIONS {
    if !pass()? {
      return Ok(changed);
    }
    changed = true;
  }
  tracing::warn!(
    max = MAX_FIXPOINT_ITERATIONS,
    "fixpoint iteration ceiling reached before pass settled"
  );
  Ok(changed)
}
