use crate::emit_node;
use crate::expr::format_sequence;
use crate::format_comments;
use crate::precedence::expr_precedence;
use crate::precedence::NEEDS_PARENS;
use crate::State;
use ast_js::syntax::MethodKind;
use ast_js::NodeId;
use ast_js::Syntax;

pub fn emit_stmt(state: &mut State, id: NodeId) {
  let tree = state.tree;
  match tree.syntax(id) {
    Syntax::Program { body } => {
      let indent = state.current_indent();
      if state.comments {
        let leading = tree.node(id).leading_comments.clone();
        format_comments(state, &leading, &indent);
      }
      for stmt in body {
        if state.comments {
          let leading = tree.node(*stmt).leading_comments.clone();
          format_comments(state, &leading, &indent);
        }
        state.write(&indent);
        emit_node(state, *stmt);
        state.write_line_end();
      }
      if state.comments {
        let trailing = tree.node(id).trailing_comments.clone();
        format_comments(state, &trailing, &indent);
      }
    }
    Syntax::BlockStatement { body } | Syntax::ClassBody { body } => {
      emit_block(state, id, body);
    }
    Syntax::StaticBlock { body } => {
      state.write("static ");
      let body = body.clone();
      emit_block(state, id, &body);
    }
    Syntax::EmptyStatement => state.write(";"),
    Syntax::DebuggerStatement => {
      state.write_node("debugger", id);
      state.write(";");
    }
    Syntax::ExpressionStatement { expression } => {
      let expr_syntax = tree.syntax(*expression);
      let precedence = expr_precedence(expr_syntax);
      let object_assign = precedence == Some(3)
        && matches!(expr_syntax, Syntax::AssignmentExpression { left, .. }
          if matches!(tree.syntax(*left), Syntax::ObjectExpression { .. } | Syntax::ObjectPattern { .. }));
      if precedence == Some(NEEDS_PARENS) || object_assign {
        state.write("(");
        emit_node(state, *expression);
        state.write(")");
      } else {
        emit_node(state, *expression);
      }
      state.write(";");
    }
    Syntax::IfStatement {
      test,
      consequent,
      alternate,
    } => {
      state.write_keyword("if");
      state.write(" (");
      emit_node(state, *test);
      state.write(") ");
      emit_node(state, *consequent);
      if let Some(alternate) = alternate {
        state.write(" ");
        state.write_keyword("else");
        state.write(" ");
        emit_node(state, *alternate);
      }
    }
    Syntax::LabeledStatement { label, body } => {
      emit_node(state, *label);
      state.write(": ");
      emit_node(state, *body);
    }
    Syntax::BreakStatement { label } => {
      state.write_keyword("break");
      if let Some(label) = label {
        state.write(" ");
        emit_node(state, *label);
      }
      state.write(";");
    }
    Syntax::ContinueStatement { label } => {
      state.write_keyword("continue");
      if let Some(label) = label {
        state.write(" ");
        emit_node(state, *label);
      }
      state.write(";");
    }
    Syntax::WithStatement { object, body } => {
      state.write_keyword("with");
      state.write(" (");
      emit_node(state, *object);
      state.write(") ");
      emit_node(state, *body);
    }
    Syntax::SwitchStatement {
      discriminant,
      cases,
    } => {
      let indent = state.current_indent();
      state.indent_level += 2;
      let case_indent = format!("{indent}{}", state.indent);
      let statement_indent = format!("{case_indent}{}", state.indent);
      state.write_keyword("switch");
      state.write(" (");
      emit_node(state, *discriminant);
      state.write(") {");
      state.write_line_end();
      for case in cases {
        let Syntax::SwitchCase { test, consequent } = tree.syntax(*case) else {
          continue;
        };
        if state.comments {
          let leading = tree.node(*case).leading_comments.clone();
          format_comments(state, &leading, &case_indent);
        }
        state.write(&case_indent);
        match test {
          Some(test) => {
            state.write_keyword("case");
            state.write(" ");
            emit_node(state, *test);
            state.write(":");
          }
          None => {
            state.write_keyword("default");
            state.write(":");
          }
        }
        state.write_line_end();
        for stmt in consequent {
          if state.comments {
            let leading = tree.node(*stmt).leading_comments.clone();
            format_comments(state, &leading, &statement_indent);
          }
          state.write(&statement_indent);
          emit_node(state, *stmt);
          state.write_line_end();
        }
      }
      state.indent_level -= 2;
      state.write(&format!("{indent}}}"));
    }
    // A bare SwitchCase is only reachable through the override hook.
    Syntax::SwitchCase { .. } => {}
    Syntax::ReturnStatement { argument } => {
      state.write_keyword("return");
      if let Some(argument) = argument {
        state.write(" ");
        emit_node(state, *argument);
      }
      state.write(";");
    }
    Syntax::ThrowStatement { argument } => {
      state.write_keyword("throw");
      state.write(" ");
      emit_node(state, *argument);
      state.write(";");
    }
    Syntax::TryStatement {
      block,
      handler,
      finalizer,
    } => {
      state.write_keyword("try");
      state.write(" ");
      emit_node(state, *block);
      if let Some(handler) = handler {
        let Syntax::CatchClause { param, body } = tree.syntax(*handler) else {
          unreachable!("try handler is always a catch clause");
        };
        state.write(" ");
        state.write_keyword("catch");
        match param {
          Some(param) => {
            state.write(" (");
            emit_node(state, *param);
            state.write(") ");
          }
          None => state.write(" "),
        }
        emit_node(state, *body);
      }
      if let Some(finalizer) = finalizer {
        state.write(" ");
        state.write_keyword("finally");
        state.write(" ");
        emit_node(state, *finalizer);
      }
    }
    Syntax::CatchClause { .. } => {}
    Syntax::WhileStatement { test, body } => {
      state.write_keyword("while");
      state.write(" (");
      emit_node(state, *test);
      state.write(") ");
      emit_node(state, *body);
    }
    Syntax::DoWhileStatement { body, test } => {
      state.write_keyword("do");
      state.write(" ");
      emit_node(state, *body);
      state.write(" ");
      state.write_keyword("while");
      state.write(" (");
      emit_node(state, *test);
      state.write(");");
    }
    Syntax::ForStatement {
      init,
      test,
      update,
      body,
    } => {
      state.write_keyword("for");
      state.write(" (");
      if let Some(init) = init {
        if matches!(tree.syntax(*init), Syntax::VariableDeclaration { .. }) {
          format_var_declaration(state, *init);
        } else {
          emit_node(state, *init);
        }
      }
      state.write("; ");
      if let Some(test) = test {
        emit_node(state, *test);
      }
      state.write("; ");
      if let Some(update) = update {
        emit_node(state, *update);
      }
      state.write(") ");
      emit_node(state, *body);
    }
    Syntax::ForInStatement { left, right, body } => {
      emit_for_in_of(state, *left, *right, *body, "in", false);
    }
    Syntax::ForOfStatement {
      left,
      right,
      body,
      is_await,
    } => {
      emit_for_in_of(state, *left, *right, *body, "of", *is_await);
    }
    Syntax::FunctionDeclaration {
      id: fn_id,
      params,
      body,
      is_async,
      is_generator,
    } => {
      emit_function(state, id, *fn_id, params, *body, *is_async, *is_generator);
    }
    Syntax::VariableDeclaration { .. } => {
      format_var_declaration(state, id);
      state.write(";");
    }
    Syntax::VariableDeclarator { id: pattern, init } => {
      emit_node(state, *pattern);
      if let Some(init) = init {
        state.write(" = ");
        emit_node(state, *init);
      }
    }
    Syntax::ClassDeclaration {
      id: class_id,
      super_class,
      body,
    } => {
      emit_class(state, id, *class_id, *super_class, *body);
    }
    Syntax::MethodDefinition {
      key,
      value,
      kind,
      computed,
      is_static,
    } => {
      let kind_prefix = match kind {
        MethodKind::Get => Some("get"),
        MethodKind::Set => Some("set"),
        MethodKind::Constructor | MethodKind::Method => None,
      };
      emit_method(state, *is_static, kind_prefix, *computed, *key, *value);
    }
    Syntax::PropertyDefinition {
      key,
      value,
      computed,
      is_static,
    } => {
      if *is_static {
        state.write_keyword("static");
        state.write(" ");
      }
      if *computed {
        state.write("[");
        emit_node(state, *key);
        state.write("]");
      } else {
        emit_node(state, *key);
      }
      match value {
        Some(value) => {
          state.write(" = ");
          emit_node(state, *value);
          state.write(";");
        }
        None => state.write(";"),
      }
    }
    Syntax::ImportDeclaration { specifiers, source } => {
      state.write_keyword("import");
      state.write(" ");
      let mut i = 0;
      if !specifiers.is_empty() {
        while i < specifiers.len() {
          if i > 0 {
            state.write(", ");
          }
          match tree.syntax(specifiers[i]) {
            Syntax::ImportDefaultSpecifier { local } => {
              emit_node(state, *local);
              i += 1;
            }
            Syntax::ImportNamespaceSpecifier { local } => {
              state.write("* ");
              state.write_keyword("as");
              state.write(" ");
              emit_node(state, *local);
              i += 1;
            }
            _ => break,
          }
        }
        if i < specifiers.len() {
          state.write("{");
          loop {
            let Syntax::ImportSpecifier { imported, local } = tree.syntax(specifiers[i]) else {
              break;
            };
            emit_node(state, *imported);
            if tree.syntax(*imported).ident_name() != tree.syntax(*local).ident_name() {
              state.write(" ");
              state.write_keyword("as");
              state.write(" ");
              emit_node(state, *local);
            }
            i += 1;
            if i < specifiers.len() {
              state.write(", ");
            } else {
              break;
            }
          }
          state.write("}");
        }
        state.write(" ");
        state.write_keyword("from");
        state.write(" ");
      }
      emit_node(state, *source);
      state.write(";");
    }
    Syntax::ImportSpecifier { .. }
    | Syntax::ImportDefaultSpecifier { .. }
    | Syntax::ImportNamespaceSpecifier { .. } => {}
    Syntax::ExportDefaultDeclaration { declaration } => {
      state.write_keyword("export");
      state.write(" ");
      state.write_keyword("default");
      state.write(" ");
      emit_node(state, *declaration);
      let decl_syntax = tree.syntax(*declaration);
      if expr_precedence(decl_syntax).is_some()
        && !matches!(decl_syntax, Syntax::FunctionExpression { .. })
      {
        state.write(";");
      }
    }
    Syntax::ExportNamedDeclaration {
      declaration,
      specifiers,
      source,
    } => {
      state.write_keyword("export");
      state.write(" ");
      if let Some(declaration) = declaration {
        emit_node(state, *declaration);
      } else {
        state.write("{");
        for (i, spec) in specifiers.iter().enumerate() {
          let Syntax::ExportSpecifier { local, exported } = tree.syntax(*spec) else {
            continue;
          };
          if i > 0 {
            state.write(", ");
          }
          emit_node(state, *local);
          if tree.syntax(*local).ident_name() != tree.syntax(*exported).ident_name() {
            state.write(" ");
            state.write_keyword("as");
            state.write(" ");
            emit_node(state, *exported);
          }
        }
        state.write("}");
        if let Some(source) = source {
          state.write(" ");
          state.write_keyword("from");
          state.write(" ");
          emit_node(state, *source);
        }
        state.write(";");
      }
    }
    Syntax::ExportSpecifier { .. } => {}
    Syntax::ExportAllDeclaration { exported, source } => {
      state.write_keyword("export");
      state.write(" * ");
      if let Some(exported) = exported {
        state.write_keyword("as");
        state.write(" ");
        emit_node(state, *exported);
        state.write(" ");
      }
      state.write_keyword("from");
      state.write(" ");
      emit_node(state, *source);
      state.write(";");
    }
    _ => unreachable!("emit_stmt called on an expression node"),
  }
}

fn emit_block(state: &mut State, id: NodeId, body: &[NodeId]) {
  let tree = state.tree;
  let indent = state.current_indent();
  state.indent_level += 1;
  let statement_indent = format!("{indent}{}", state.indent);
  state.write("{");
  if !body.is_empty() {
    state.write_line_end();
    if state.comments {
      let leading = tree.node(id).leading_comments.clone();
      format_comments(state, &leading, &statement_indent);
    }
    for stmt in body {
      if state.comments {
        let leading = tree.node(*stmt).leading_comments.clone();
        format_comments(state, &leading, &statement_indent);
      }
      state.write(&statement_indent);
      emit_node(state, *stmt);
      state.write_line_end();
    }
    state.write(&indent);
  } else if state.comments {
    let leading = tree.node(id).leading_comments.clone();
    if !leading.is_empty() {
      state.write_line_end();
      format_comments(state, &leading, &statement_indent);
      state.write(&indent);
    }
  }
  if state.comments {
    let trailing = tree.node(id).trailing_comments.clone();
    format_comments(state, &trailing, &statement_indent);
  }
  state.write("}");
  state.indent_level -= 1;
}

fn emit_for_in_of(
  state: &mut State,
  left: NodeId,
  right: NodeId,
  body: NodeId,
  keyword: &str,
  is_await: bool,
) {
  state.write_keyword("for");
  state.write(" ");
  if is_await {
    state.write_keyword("await");
    state.write(" ");
  }
  state.write("(");
  if matches!(state.tree.syntax(left), Syntax::VariableDeclaration { .. }) {
    format_var_declaration(state, left);
  } else {
    emit_node(state, left);
  }
  state.write(" ");
  state.write_keyword(keyword);
  state.write(" ");
  emit_node(state, right);
  state.write(") ");
  emit_node(state, body);
}

pub(crate) fn format_var_declaration(state: &mut State, id: NodeId) {
  let Syntax::VariableDeclaration { kind, declarations } = state.tree.syntax(id) else {
    return;
  };
  state.write_keyword(kind.as_str());
  state.write(" ");
  for (i, declarator) in declarations.iter().enumerate() {
    if i > 0 {
      state.write(", ");
    }
    emit_node(state, *declarator);
  }
}

pub(crate) fn emit_function(
  state: &mut State,
  node: NodeId,
  id: Option<NodeId>,
  params: &[NodeId],
  body: NodeId,
  is_async: bool,
  is_generator: bool,
) {
  if is_async {
    state.write_keyword("async");
    state.write(" ");
  }
  state.write_node(if is_generator { "function*" } else { "function" }, node);
  if let Some(id) = id {
    state.write(" ");
    let name = state
      .tree
      .syntax(id)
      .ident_name()
      .unwrap_or_default()
      .to_string();
    state.write_node(&name, id);
  }
  format_sequence(state, params);
  state.write(" ");
  emit_node(state, body);
}

pub(crate) fn emit_class(
  state: &mut State,
  node: NodeId,
  id: Option<NodeId>,
  super_class: Option<NodeId>,
  body: NodeId,
) {
  state.write_node("class", node);
  state.write(" ");
  if let Some(id) = id {
    let name = state
      .tree
      .syntax(id)
      .ident_name()
      .unwrap_or_default()
      .to_string();
    state.write_node(&name, id);
  }
  if let Some(super_class) = super_class {
    state.write(" ");
    state.write_keyword("extends");
    state.write(" ");
    let super_syntax = state.tree.syntax(super_class);
    let precedence = expr_precedence(super_syntax);
    let is_class = matches!(super_syntax, Syntax::ClassExpression { .. });
    if !is_class && precedence.map_or(false, |p| p <= NEEDS_PARENS) {
      state.write("(");
      emit_node(state, super_class);
      state.write(")");
    } else {
      emit_node(state, super_class);
    }
    state.write(" ");
  }
  emit_node(state, body);
}

pub(crate) fn emit_method(
  state: &mut State,
  is_static: bool,
  kind_prefix: Option<&str>,
  computed: bool,
  key: NodeId,
  value: NodeId,
) {
  let tree = state.tree;
  if is_static {
    state.write_keyword("static");
    state.write(" ");
  }
  if let Some(prefix) = kind_prefix {
    state.write_keyword(prefix);
    state.write(" ");
  }
  let (params, body, is_async, is_generator) = match tree.syntax(value) {
    Syntax::FunctionExpression {
      params,
      body,
      is_async,
      is_generator,
      ..
    } => (params.clone(), *body, *is_async, *is_generator),
    _ => return,
  };
  if is_async {
    state.write_keyword("async");
    state.write(" ");
  }
  if is_generator {
    state.write("*");
  }
  if computed {
    state.write("[");
    emit_node(state, key);
    state.write("]");
  } else {
    emit_node(state, key);
  }
  format_sequence(state, &params);
  state.write(" ");
  emit_node(state, body);
}
