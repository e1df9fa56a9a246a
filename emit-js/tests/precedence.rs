use ast_js::Ast;
use emit_js::Options;

fn rendered(src: &str) -> String {
  let Ast { tree, root } = parse_js::parse(src).expect("source must parse");
  emit_js::generate(&tree, root, Options::default())
    .trim_end()
    .to_string()
}

#[test]
fn right_operand_ties_are_parenthesized() {
  assert_eq!(rendered("x = a - (b - c);"), "x = a - (b - c);");
  assert_eq!(rendered("x = (a - b) - c;"), "x = a - b - c;");
  assert_eq!(rendered("x = a / (b * c);"), "x = a / (b * c);");
  assert_eq!(rendered("x = 'a' + ('b' + 'c');"), "x = 'a' + ('b' + 'c');");
}

#[test]
fn lower_precedence_children_are_parenthesized() {
  assert_eq!(rendered("x = (a + b) * c;"), "x = (a + b) * c;");
  assert_eq!(rendered("x = (a = b) + 1;"), "x = (a = b) + 1;");
  assert_eq!(rendered("x = (a, b) + c;"), "x = (a, b) + c;");
  assert_eq!(rendered("call((a, b));"), "call((a, b));");
}

#[test]
fn exponentiation_associativity() {
  assert_eq!(rendered("x = a ** b ** c;"), "x = a ** b ** c;");
  assert_eq!(rendered("x = (a ** b) ** c;"), "x = (a ** b) ** c;");
  assert_eq!(rendered("x = (-a) ** b;"), "x = (-a) ** b;");
}

#[test]
fn nullish_never_mixes_bare() {
  assert_eq!(rendered("x = a ?? (b && c);"), "x = a ?? (b && c);");
  assert_eq!(rendered("x = (a && b) ?? c;"), "x = (a && b) ?? c;");
  assert_eq!(rendered("x = a ?? b ?? c;"), "x = (a ?? b) ?? c;");
}

#[test]
fn callee_and_member_object_wrapping() {
  assert_eq!(
    rendered("x = (function () {})();"),
    "x = (function() {})();"
  );
  assert_eq!(rendered("x = (a ? b : c)();"), "x = (a ? b : c)();");
  assert_eq!(rendered("x = (1).toString();"), "x = (1).toString();");
  assert_eq!(rendered("x = (a + b).length;"), "x = (a + b).length;");
}

#[test]
fn in_operator_is_always_wrapped() {
  assert_eq!(rendered("x = a in b;"), "x = (a in b);");
}

#[test]
fn unary_spacing_keeps_sign_runs_apart() {
  assert_eq!(rendered("x = - -a;"), "x = - -a;");
  assert_eq!(rendered("x = + +a;"), "x = + +a;");
  assert_eq!(rendered("x = -+a;"), "x = -+a;");
  assert_eq!(rendered("x = - --a;"), "x = - --a;");
  assert_eq!(rendered("x = typeof a;"), "x = typeof a;");
  assert_eq!(rendered("x = void (a + b);"), "x = void (a + b);");
}

#[test]
fn statement_level_disambiguation() {
  // Function and object expressions at statement start keep parentheses.
  assert_eq!(rendered("(function () { go(); })();"), "(function() {\n  go();\n})();");
}

#[test]
fn conditional_test_wrapping() {
  assert_eq!(rendered("x = (a = b) ? c : d;"), "x = (a = b) ? c : d;");
  assert_eq!(
    rendered("x = (p ? q : r) ? c : d;"),
    "x = (p ? q : r) ? c : d;"
  );
  assert_eq!(rendered("x = a + b ? c : d;"), "x = a + b ? c : d;");
}
