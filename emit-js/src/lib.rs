//! Tree-to-source serializer. One walk over the tree, emitting through four
//! overridable hook points (plain text, keywords, node-tagged tokens, line
//! breaks) so presentation layers can annotate output spans without touching
//! correctness. The generator layout and precedence rules follow astring.

use ast_js::Comment;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;

pub mod expr;
pub mod precedence;
pub mod stmt;

pub type WriteHook<'h> = Box<dyn FnMut(&str) -> String + 'h>;
pub type NodeHook<'h> = Box<dyn FnMut(&str, NodeId) -> String + 'h>;
pub type LineEndHook<'h> = Box<dyn FnMut() -> String + 'h>;

/// Intercepts emission of any node kind; return false to fall back to the
/// default generator.
pub trait EmitOverride {
  fn emit(&mut self, state: &mut State, id: NodeId) -> bool;
}

pub struct Options<'h> {
  /// Indent unit, two spaces unless configured.
  pub indent: String,
  pub starting_indent_level: usize,
  /// Emit attached comments.
  pub comments: bool,
  pub write: Option<WriteHook<'h>>,
  pub write_keyword: Option<WriteHook<'h>>,
  pub write_node: Option<NodeHook<'h>>,
  pub write_line_end: Option<LineEndHook<'h>>,
  pub generator: Option<&'h mut dyn EmitOverride>,
}

impl Default for Options<'_> {
  fn default() -> Self {
    Options {
      indent: "  ".to_string(),
      starting_indent_level: 0,
      comments: false,
      write: None,
      write_keyword: None,
      write_node: None,
      write_line_end: None,
      generator: None,
    }
  }
}

impl Options<'_> {
  pub fn with_indent(indent: &str) -> Self {
    Options {
      indent: indent.to_string(),
      ..Options::default()
    }
  }
}

pub struct State<'t, 'h> {
  pub tree: &'t Tree,
  pub indent: String,
  pub indent_level: usize,
  pub comments: bool,
  out: String,
  write_hook: Option<WriteHook<'h>>,
  keyword_hook: Option<WriteHook<'h>>,
  node_hook: Option<NodeHook<'h>>,
  line_end_hook: Option<LineEndHook<'h>>,
  interceptor: Option<&'h mut dyn EmitOverride>,
}

impl<'t, 'h> State<'t, 'h> {
  pub fn new(tree: &'t Tree, options: Options<'h>) -> State<'t, 'h> {
    State {
      tree,
      indent: options.indent,
      indent_level: options.starting_indent_level,
      comments: options.comments,
      out: String::new(),
      write_hook: options.write,
      keyword_hook: options.write_keyword,
      node_hook: options.write_node,
      line_end_hook: options.write_line_end,
      interceptor: options.generator,
    }
  }

  pub fn write(&mut self, code: &str) {
    match &mut self.write_hook {
      Some(hook) => {
        let rendered = hook(code);
        self.out.push_str(&rendered);
      }
      None => self.out.push_str(code),
    }
  }

  pub fn write_keyword(&mut self, code: &str) {
    match &mut self.keyword_hook {
      Some(hook) => {
        let rendered = hook(code);
        self.out.push_str(&rendered);
      }
      None => self.out.push_str(code),
    }
  }

  /// Emits token text tagged with the node it came from.
  pub fn write_node(&mut self, code: &str, node: NodeId) {
    match &mut self.node_hook {
      Some(hook) => {
        let rendered = hook(code, node);
        self.out.push_str(&rendered);
      }
      None => self.out.push_str(code),
    }
  }

  pub fn write_line_end(&mut self) {
    match &mut self.line_end_hook {
      Some(hook) => {
        let rendered = hook();
        self.out.push_str(&rendered);
      }
      None => self.out.push('\n'),
    }
  }

  pub fn current_indent(&self) -> String {
    self.indent.repeat(self.indent_level)
  }

  pub fn into_output(self) -> String {
    self.out
  }
}

/// Emits one node, consulting the generator override first.
pub fn emit_node(state: &mut State, id: NodeId) {
  if let Some(interceptor) = state.interceptor.take() {
    let handled = interceptor.emit(state, id);
    state.interceptor = Some(interceptor);
    if handled {
      return;
    }
  }
  emit_default(state, id);
}

/// Default, exhaustive emission dispatch.
pub fn emit_default(state: &mut State, id: NodeId) {
  match state.tree.syntax(id) {
    Syntax::Program { .. }
    | Syntax::BlockStatement { .. }
    | Syntax::StaticBlock { .. }
    | Syntax::ClassBody { .. }
    | Syntax::EmptyStatement
    | Syntax::DebuggerStatement
    | Syntax::ExpressionStatement { .. }
    | Syntax::IfStatement { .. }
    | Syntax::LabeledStatement { .. }
    | Syntax::BreakStatement { .. }
    | Syntax::ContinueStatement { .. }
    | Syntax::WithStatement { .. }
    | Syntax::SwitchStatement { .. }
    | Syntax::SwitchCase { .. }
    | Syntax::ReturnStatement { .. }
    | Syntax::ThrowStatement { .. }
    | Syntax::TryStatement { .. }
    | Syntax::CatchClause { .. }
    | Syntax::WhileStatement { .. }
    | Syntax::DoWhileStatement { .. }
    | Syntax::ForStatement { .. }
    | Syntax::ForInStatement { .. }
    | Syntax::ForOfStatement { .. }
    | Syntax::FunctionDeclaration { .. }
    | Syntax::VariableDeclaration { .. }
    | Syntax::VariableDeclarator { .. }
    | Syntax::ClassDeclaration { .. }
    | Syntax::MethodDefinition { .. }
    | Syntax::PropertyDefinition { .. }
    | Syntax::ImportDeclaration { .. }
    | Syntax::ImportSpecifier { .. }
    | Syntax::ImportDefaultSpecifier { .. }
    | Syntax::ImportNamespaceSpecifier { .. }
    | Syntax::ExportNamedDeclaration { .. }
    | Syntax::ExportSpecifier { .. }
    | Syntax::ExportDefaultDeclaration { .. }
    | Syntax::ExportAllDeclaration { .. } => stmt::emit_stmt(state, id),
    _ => expr::emit_expr(state, id),
  }
}

pub(crate) fn format_comments(state: &mut State, comments: &[Comment], indent: &str) {
  for comment in comments {
    state.write(indent);
    if comment.block {
      state.write("/*");
      // Re-indent block comment lines against the current indentation.
      let lines: Vec<&str> = comment.text.split('\n').collect();
      let end = lines.len() - 1;
      state.write(lines[0].trim());
      if end > 0 {
        state.write_line_end();
        for line in &lines[1..end] {
          state.write(&format!("{indent}{}", line.trim()));
          state.write_line_end();
        }
        state.write(&format!("{indent}{}", lines[end].trim()));
      }
      state.write("*/");
      state.write_line_end();
    } else {
      let text = format!("// {}", comment.text.trim());
      state.write(&text);
      state.write_line_end();
    }
  }
}

/// Renders `root` to source text.
pub fn generate(tree: &Tree, root: NodeId, options: Options) -> String {
  let mut state = State::new(tree, options);
  emit_node(&mut state, root);
  state.into_output()
}
