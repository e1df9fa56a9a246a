use ast_js::Ast;
use emit_js::Options;

/// generate ∘ parse must be idempotent: rendering, re-parsing, and
/// rendering again yields byte-identical text.
fn assert_stable(src: &str) {
  let Ast { tree, root } = parse_js::parse(src).expect("source must parse");
  let first = emit_js::generate(&tree, root, Options::default());
  let Ast {
    tree: reparsed,
    root: reparsed_root,
  } = parse_js::parse(&first).expect("rendered output must re-parse");
  let second = emit_js::generate(&reparsed, reparsed_root, Options::default());
  assert_eq!(first, second, "unstable rendering for {src:?}");
}

#[test]
fn statements_round_trip() {
  for src in [
    "var a = 1, b = 2;",
    "let x;",
    "const y = [1, 2, , 3];",
    "if (a) b(); else { c(); }",
    "while (a) { b(); }",
    "do a(); while (b);",
    "for (var i = 0; i < 10; i++) work(i);",
    "for (var k in obj) use(k);",
    "for (const v of list) use(v);",
    "switch (x) {\ncase 1:\na();\nbreak;\ndefault:\nb();\n}",
    "try { risky(); } catch (e) { handle(e); } finally { cleanup(); }",
    "try { risky(); } catch { recover(); }",
    "label: while (a) { break label; }",
    "throw new Error('nope');",
    "function f(a, b = 1, ...rest) { return a; }",
    "with (scope) { use(x); }",
    "debugger;",
    ";",
  ] {
    assert_stable(src);
  }
}

#[test]
fn expressions_round_trip() {
  for src in [
    "x = a + b * c;",
    "x = (a + b) * c;",
    "x = a ** b ** c;",
    "x = (a ** b) ** c;",
    "x = -(-a);",
    "x = - -a;",
    "x = !!a;",
    "x = typeof typeof a;",
    "x = a ? b : c;",
    "x = (a, b, c);",
    "x = a?.b?.[c]?.();",
    "x = a ?? (b || c);",
    "x = (a ?? b) || c;",
    "x = new Foo(1, 2);",
    "x = new (foo())();",
    "x = { a: 1, 'b c': 2, [k]: 3, d, e() {}, get f() {}, set g(v) {} };",
    "x = [1, , 2];",
    "x = function named() {};",
    "x = a => a + 1;",
    "x = (a, b) => { return a; };",
    "x = () => ({});",
    "x = `tpl ${a + 1} tail`;",
    "x = tag`quasi ${b}`;",
    "x = /ab+c/gi;",
    "x = 10n;",
    "x = a in b;",
    "x = a instanceof B;",
    "x = a++ + ++b;",
    "x = class extends Base {};",
    "({ a } = obj);",
    "[a, b] = pair;",
  ] {
    assert_stable(src);
  }
}

#[test]
fn clean_tree_renders_to_known_text() {
  let Ast { tree, root } =
    parse_js::parse("if(false){console.log(123)} else {console.log(456)}").unwrap();
  let text = emit_js::generate(&tree, root, Options::default());
  assert_eq!(
    text,
    "if (false) {\n  console.log(123);\n} else {\n  console.log(456);\n}\n"
  );
}

#[test]
fn honors_indent_options() {
  let Ast { tree, root } = parse_js::parse("while (a) { b(); }").unwrap();
  let text = emit_js::generate(&tree, root, Options::with_indent("\t"));
  assert_eq!(text, "while (a) {\n\tb();\n}\n");
}
