use crate::emit_node;
use crate::format_comments;
use crate::precedence::expr_precedence;
use crate::precedence::needs_parens;
use crate::precedence::NEEDS_PARENS;
use crate::stmt::emit_function;
use crate::stmt::emit_method;
use crate::State;
use ast_js::num::format_number;
use ast_js::syntax::PropertyKind;
use ast_js::syntax::UnaryOp;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Value;

pub fn emit_expr(state: &mut State, id: NodeId) {
  let tree = state.tree;
  match tree.syntax(id) {
    Syntax::Identifier { name } => {
      let name = name.clone();
      state.write_node(&name, id);
    }
    Syntax::PrivateIdentifier { name } => {
      let name = name.clone();
      state.write_keyword("#");
      state.write_node(&name, id);
    }
    Syntax::Literal { value, raw } => {
      let text = match raw {
        Some(raw) => raw.clone(),
        None => stringify_value(value),
      };
      state.write_node(&text, id);
    }
    Syntax::ThisExpression => state.write_node("this", id),
    Syntax::Super => state.write_node("super", id),
    Syntax::MetaProperty { meta, property } => {
      emit_node(state, *meta);
      state.write(".");
      emit_node(state, *property);
    }
    Syntax::ArrayExpression { elements } | Syntax::ArrayPattern { elements } => {
      state.write("[");
      if !elements.is_empty() {
        let mut i = 0;
        loop {
          let element = elements[i];
          if let Some(element) = element {
            emit_node(state, element);
          }
          i += 1;
          if i < elements.len() {
            state.write(", ");
          } else {
            if element.is_none() {
              state.write(", ");
            }
            break;
          }
        }
      }
      state.write("]");
    }
    Syntax::ObjectExpression { properties } => {
      let indent = state.current_indent();
      state.indent_level += 1;
      let property_indent = format!("{indent}{}", state.indent);
      state.write("{");
      if !properties.is_empty() {
        state.write_line_end();
        if state.comments {
          let leading = tree.node(id).leading_comments.clone();
          format_comments(state, &leading, &property_indent);
        }
        for (i, property) in properties.iter().enumerate() {
          if state.comments {
            let leading = tree.node(*property).leading_comments.clone();
            format_comments(state, &leading, &property_indent);
          }
          state.write(&property_indent);
          emit_node(state, *property);
          if i + 1 < properties.len() {
            state.write(",");
            state.write_line_end();
          }
        }
        state.write_line_end();
        if state.comments {
          let trailing = tree.node(id).trailing_comments.clone();
          format_comments(state, &trailing, &property_indent);
        }
        state.write(&format!("{indent}}}"));
      } else {
        state.write("}");
      }
      state.indent_level -= 1;
    }
    Syntax::Property {
      key,
      value,
      kind,
      computed,
      shorthand,
      method,
    } => {
      if *method || *kind != PropertyKind::Init {
        let kind_prefix = match kind {
          PropertyKind::Get => Some("get"),
          PropertyKind::Set => Some("set"),
          PropertyKind::Init => None,
        };
        emit_method(state, false, kind_prefix, *computed, *key, *value);
      } else {
        if !*shorthand {
          if *computed {
            state.write("[");
            emit_node(state, *key);
            state.write("]");
          } else {
            emit_node(state, *key);
          }
          state.write(": ");
        }
        emit_node(state, *value);
      }
    }
    Syntax::ObjectPattern { properties } => {
      state.write("{");
      for (i, property) in properties.iter().enumerate() {
        if i > 0 {
          state.write(", ");
        }
        emit_node(state, *property);
      }
      state.write("}");
    }
    Syntax::FunctionExpression {
      id: fn_id,
      params,
      body,
      is_async,
      is_generator,
    } => {
      emit_function(state, id, *fn_id, params, *body, *is_async, *is_generator);
    }
    Syntax::ArrowFunctionExpression {
      params,
      body,
      is_async,
      ..
    } => {
      if *is_async {
        state.write_keyword("async");
        state.write(" ");
      }
      if params.len() == 1 && matches!(tree.syntax(params[0]), Syntax::Identifier { .. }) {
        emit_node(state, params[0]);
      } else {
        format_sequence(state, params);
      }
      state.write(" => ");
      if matches!(tree.syntax(*body), Syntax::ObjectExpression { .. }) {
        state.write("(");
        emit_node(state, *body);
        state.write(")");
      } else {
        emit_node(state, *body);
      }
    }
    Syntax::ClassExpression {
      id: class_id,
      super_class,
      body,
    } => {
      crate::stmt::emit_class(state, id, *class_id, *super_class, *body);
    }
    Syntax::SequenceExpression { expressions } => {
      format_sequence(state, expressions);
    }
    Syntax::TemplateLiteral {
      quasis,
      expressions,
    } => {
      state.write("`");
      for (i, expression) in expressions.iter().enumerate() {
        let quasi = quasis[i];
        let raw = match tree.syntax(quasi) {
          Syntax::TemplateElement { raw, .. } => raw.clone(),
          _ => String::new(),
        };
        state.write_node(&raw, quasi);
        state.write("${");
        emit_node(state, *expression);
        state.write("}");
      }
      if let Some(quasi) = quasis.last() {
        let raw = match tree.syntax(*quasi) {
          Syntax::TemplateElement { raw, .. } => raw.clone(),
          _ => String::new(),
        };
        state.write_node(&raw, *quasi);
      }
      state.write("`");
    }
    Syntax::TemplateElement { raw, .. } => {
      let raw = raw.clone();
      state.write_node(&raw, id);
    }
    Syntax::TaggedTemplateExpression { tag, quasi } => {
      format_expression(state, *tag, id, false);
      emit_node(state, *quasi);
    }
    Syntax::UnaryExpression { operator, argument } => {
      let operator = *operator;
      let argument = *argument;
      state.write(operator.as_str());
      let parens = needs_parens(tree, argument, id, false);
      if !parens && (operator.as_str().len() > 1 || same_sign_prefix(tree, operator, argument)) {
        state.write(" ");
      }
      if parens {
        state.write(if operator.as_str().len() > 1 { " (" } else { "(" });
        emit_node(state, argument);
        state.write(")");
      } else {
        emit_node(state, argument);
      }
    }
    Syntax::UpdateExpression {
      operator,
      prefix,
      argument,
    } => {
      if *prefix {
        state.write(operator.as_str());
        emit_node(state, *argument);
      } else {
        emit_node(state, *argument);
        state.write(operator.as_str());
      }
    }
    Syntax::AssignmentExpression {
      operator,
      left,
      right,
    } => {
      let op = operator.as_str();
      emit_node(state, *left);
      state.write(&format!(" {op} "));
      emit_node(state, *right);
    }
    Syntax::AssignmentPattern { left, right } => {
      emit_node(state, *left);
      state.write(" = ");
      emit_node(state, *right);
    }
    Syntax::BinaryExpression {
      operator,
      left,
      right,
    } => {
      let op = operator.as_str();
      let in_operator = op == "in";
      if in_operator {
        // Avoids confusion inside `for` loop initializers.
        state.write("(");
      }
      format_expression(state, *left, id, false);
      state.write(&format!(" {op} "));
      format_expression(state, *right, id, true);
      if in_operator {
        state.write(")");
      }
    }
    Syntax::LogicalExpression {
      operator,
      left,
      right,
    } => {
      let op = operator.as_str();
      format_expression(state, *left, id, false);
      state.write(&format!(" {op} "));
      format_expression(state, *right, id, true);
    }
    Syntax::ConditionalExpression {
      test,
      consequent,
      alternate,
    } => {
      // Conditional expressions sit at precedence 4.
      let test_prec = expr_precedence(tree.syntax(*test));
      if test_prec == Some(NEEDS_PARENS) || test_prec.map_or(false, |p| p <= 4) {
        state.write("(");
        emit_node(state, *test);
        state.write(")");
      } else {
        emit_node(state, *test);
      }
      state.write(" ? ");
      emit_node(state, *consequent);
      state.write(" : ");
      emit_node(state, *alternate);
    }
    Syntax::NewExpression { callee, arguments } => {
      state.write_keyword("new");
      state.write(" ");
      let precedence = expr_precedence(tree.syntax(*callee));
      if precedence == Some(NEEDS_PARENS)
        || precedence.map_or(false, |p| p < 19)
        || has_call_expression(tree, *callee)
      {
        state.write("(");
        emit_node(state, *callee);
        state.write(")");
      } else {
        emit_node(state, *callee);
      }
      format_sequence(state, arguments);
    }
    Syntax::CallExpression {
      callee,
      arguments,
      optional,
    } => {
      let precedence = expr_precedence(tree.syntax(*callee));
      if precedence == Some(NEEDS_PARENS) || precedence.map_or(false, |p| p < 19) {
        state.write("(");
        emit_node(state, *callee);
        state.write(")");
      } else {
        emit_node(state, *callee);
      }
      if *optional {
        state.write("?.");
      }
      format_sequence(state, arguments);
    }
    Syntax::ChainExpression { expression } => emit_node(state, *expression),
    Syntax::MemberExpression {
      object,
      property,
      computed,
      optional,
    } => {
      let precedence = expr_precedence(tree.syntax(*object));
      if precedence == Some(NEEDS_PARENS) || precedence.map_or(false, |p| p < 19) {
        state.write("(");
        emit_node(state, *object);
        state.write(")");
      } else {
        emit_node(state, *object);
      }
      if *computed {
        if *optional {
          state.write("?.");
        }
        state.write("[");
        emit_node(state, *property);
        state.write("]");
      } else {
        state.write(if *optional { "?." } else { "." });
        emit_node(state, *property);
      }
    }
    Syntax::SpreadElement { argument } | Syntax::RestElement { argument } => {
      state.write_node("...", id);
      emit_node(state, *argument);
    }
    Syntax::YieldExpression { argument, delegate } => {
      state.write_keyword(if *delegate { "yield*" } else { "yield" });
      if let Some(argument) = argument {
        state.write(" ");
        emit_node(state, *argument);
      }
    }
    Syntax::AwaitExpression { argument } => {
      state.write_node("await", id);
      state.write(" ");
      format_expression(state, *argument, id, false);
    }
    Syntax::ImportExpression { source } => {
      state.write_keyword("import");
      state.write("(");
      emit_node(state, *source);
      state.write(")");
    }
    other => unreachable!("emit_expr called on statement node {other:?}"),
  }
}

/// `(a, b, c)`.
pub fn format_sequence(state: &mut State, nodes: &[NodeId]) {
  state.write("(");
  for (i, node) in nodes.iter().enumerate() {
    if i > 0 {
      state.write(", ");
    }
    emit_node(state, *node);
  }
  state.write(")");
}

/// Emits `node` as an operand of `parent`, parenthesized when precedence
/// demands it.
pub fn format_expression(state: &mut State, node: NodeId, parent: NodeId, is_right: bool) {
  if needs_parens(state.tree, node, parent, is_right) {
    state.write("(");
    emit_node(state, node);
    state.write(")");
  } else {
    emit_node(state, node);
  }
}

/// `- -a`, `+ ++a`: a space keeps sign runs from merging into `--`/`++`.
fn same_sign_prefix(tree: &ast_js::Tree, operator: UnaryOp, argument: NodeId) -> bool {
  let op = operator.as_str();
  if op != "+" && op != "-" {
    return false;
  }
  match tree.syntax(argument) {
    Syntax::UnaryExpression {
      operator: inner, ..
    } => inner.as_str().starts_with(op),
    Syntax::UpdateExpression {
      operator: inner,
      prefix: true,
      ..
    } => inner.as_str().starts_with(op),
    _ => false,
  }
}

fn has_call_expression(tree: &ast_js::Tree, mut node: NodeId) -> bool {
  loop {
    match tree.syntax(node) {
      Syntax::CallExpression { .. } => return true,
      Syntax::MemberExpression { object, .. } => node = *object,
      _ => return false,
    }
  }
}

fn stringify_value(value: &Value) -> String {
  match value {
    Value::Undefined => "undefined".to_string(),
    Value::Null => "null".to_string(),
    Value::Bool(b) => b.to_string(),
    Value::Num(n) => format_number(*n),
    // JSON-style escaping for synthesized strings.
    Value::Str(s) => serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\"")),
    Value::BigInt(b) => format!("{}n", b.to_str_radix(10)),
    Value::Regex { pattern, flags } => format!("/{pattern}/{flags}"),
    Value::Arr(_) | Value::Obj => "null".to_string(),
  }
}
