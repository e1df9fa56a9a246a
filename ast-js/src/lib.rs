pub mod error;
pub mod eval;
pub mod node;
pub mod num;
pub mod query;
pub mod syntax;
pub mod walk;

pub use error::StructureError;
pub use error::StructureResult;
pub use eval::NotEvaluable;
pub use eval::Value;
pub use node::Ast;
pub use node::Comment;
pub use node::NodeId;
pub use node::Tree;
pub use syntax::Syntax;
pub use walk::Flow;
