use ast_js::Ast;
use error::SyntaxResult;
use parse::Parser;

pub mod error;
pub mod lex;
pub mod parse;

/// Parses ECMAScript source text (script grammar) into a linked [`Ast`].
pub fn parse(source: &str) -> SyntaxResult<Ast> {
  Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
  use super::*;
  use ast_js::syntax::BinaryOp;
  use ast_js::Syntax;
  use ast_js::Value;

  #[test]
  fn parses_var_with_raw_literal() {
    let ast = parse("var a = 0x555;").unwrap();
    let body = match ast.tree.syntax(ast.root) {
      Syntax::Program { body } => body.clone(),
      other => panic!("expected program, got {other:?}"),
    };
    assert_eq!(body.len(), 1);
    let decl = match ast.tree.syntax(body[0]) {
      Syntax::VariableDeclaration { declarations, .. } => declarations[0],
      other => panic!("expected declaration, got {other:?}"),
    };
    let init = match ast.tree.syntax(decl) {
      Syntax::VariableDeclarator { init, .. } => init.unwrap(),
      other => panic!("expected declarator, got {other:?}"),
    };
    match ast.tree.syntax(init) {
      Syntax::Literal { value, raw } => {
        assert_eq!(*value, Value::Num(1365.0));
        assert_eq!(raw.as_deref(), Some("0x555"));
      }
      other => panic!("expected literal, got {other:?}"),
    }
  }

  #[test]
  fn parses_binary_precedence() {
    let ast = parse("x = 1 + 2 * 3;").unwrap();
    let assign = ast
      .tree
      .find_first(ast.root, &mut |n| {
        matches!(ast.tree.syntax(n), Syntax::AssignmentExpression { .. })
      })
      .unwrap();
    let right = match ast.tree.syntax(assign) {
      Syntax::AssignmentExpression { right, .. } => *right,
      _ => unreachable!(),
    };
    match ast.tree.syntax(right) {
      Syntax::BinaryExpression { operator, right, .. } => {
        assert_eq!(*operator, BinaryOp::Add);
        assert!(matches!(
          ast.tree.syntax(*right),
          Syntax::BinaryExpression {
            operator: BinaryOp::Mul,
            ..
          }
        ));
      }
      other => panic!("expected binary, got {other:?}"),
    }
  }

  #[test]
  fn parses_exponent_right_associative() {
    let ast = parse("a = 2 ** 3 ** 2;").unwrap();
    let exp = ast
      .tree
      .find_first(ast.root, &mut |n| {
        matches!(
          ast.tree.syntax(n),
          Syntax::BinaryExpression {
            operator: BinaryOp::Exp,
            ..
          }
        )
      })
      .unwrap();
    match ast.tree.syntax(exp) {
      Syntax::BinaryExpression { right, .. } => {
        assert!(matches!(
          ast.tree.syntax(*right),
          Syntax::BinaryExpression {
            operator: BinaryOp::Exp,
            ..
          }
        ));
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn parses_regex_in_expression_position() {
    let ast = parse("var re = /^\\d+$/g;").unwrap();
    let lit = ast
      .tree
      .find_first(ast.root, &mut |n| {
        matches!(
          ast.tree.syntax(n),
          Syntax::Literal {
            value: Value::Regex { .. },
            ..
          }
        )
      })
      .unwrap();
    match ast.tree.syntax(lit) {
      Syntax::Literal {
        value: Value::Regex { pattern, flags },
        ..
      } => {
        assert_eq!(pattern, "^\\d+$");
        assert_eq!(flags, "g");
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn parses_division_after_identifier() {
    assert!(parse("var x = a / b / c;").is_ok());
  }

  #[test]
  fn parses_arrow_functions() {
    assert!(parse("var f = x => x + 1;").is_ok());
    assert!(parse("var g = (a, b) => { return a; };").is_ok());
    assert!(parse("var h = () => ({});").is_ok());
    assert!(parse("var i = async (a) => a;").is_ok());
  }

  #[test]
  fn parses_obfuscated_shapes() {
    let src = r#"
function _0x1bf7() {
  var _0x4c8e = ['abc', '\x64\x65\x66'];
  _0x1bf7 = function () {
    return _0x4c8e;
  };
  return _0x1bf7();
}
function _0x20ab(a, b) {
  var c = _0x1bf7();
  return _0x20ab = function (d, e) {
    d = d - 0x1a2;
    return c[d];
  }, _0x20ab(a, b);
}
while (true) {
  switch (_0x2f5a[_0x1d++]) {
    case '0':
      foo();
      continue;
  }
  break;
}
"#;
    assert!(parse(src).is_ok());
  }

  #[test]
  fn parses_templates() {
    assert!(parse("var s = `a${1 + 2}b${x}`;").unwrap().tree.len() > 0);
  }

  #[test]
  fn links_parents_over_whole_tree() {
    let ast = parse("if (a) { b(c, d[0]); } else { e = f ? g : h; }").unwrap();
    let mut ok = true;
    ast.tree.walk(ast.root, &mut |id| {
      for child in ast.tree.children(id) {
        if ast.tree.parent(child) != Some(id) {
          ok = false;
        }
      }
      ast_js::Flow::Continue
    });
    assert!(ok, "every child's parent link must point at its parent");
  }

  #[test]
  fn rejects_garbage() {
    assert!(parse("var = ;").is_err());
    assert!(parse("if (").is_err());
    assert!(parse("\"unterminated").is_err());
  }
}
