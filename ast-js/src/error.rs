use crate::node::NodeId;
use core::fmt;
use core::fmt::Display;
use core::fmt::Formatter;
use std::error::Error;

/// Structural invariant violations raised by tree editing primitives.
///
/// Cloning a subtree that revisits a node is fatal for the whole enclosing
/// pass invocation: a partially copied subtree would break the
/// parent-consistency invariant, so the error must propagate instead of being
/// swallowed like an ordinary pattern mismatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StructureErrorType {
  CyclicSubtree,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StructureError {
  pub typ: StructureErrorType,
  pub node: NodeId,
}

impl StructureError {
  pub fn cyclic(node: NodeId) -> StructureError {
    StructureError {
      typ: StructureErrorType::CyclicSubtree,
      node,
    }
  }
}

impl Display for StructureError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self.typ {
      StructureErrorType::CyclicSubtree => {
        write!(f, "node {:?} revisited while cloning a subtree", self.node)
      }
    }
  }
}

impl Error for StructureError {}

pub type StructureResult<T> = Result<T, StructureError>;
