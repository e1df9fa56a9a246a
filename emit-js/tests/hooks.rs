use ast_js::Ast;
use ast_js::Comment;
use ast_js::NodeId;
use ast_js::Syntax;
use emit_js::EmitOverride;
use emit_js::Options;
use emit_js::State;

#[test]
fn write_hooks_wrap_emitted_spans() {
  let Ast { tree, root } = parse_js::parse("if (a) { b(); }").unwrap();
  let options = Options {
    write_keyword: Some(Box::new(|code: &str| format!("<kw>{code}</kw>"))),
    write_line_end: Some(Box::new(|| "<nl>".to_string())),
    ..Options::default()
  };
  let out = emit_js::generate(&tree, root, options);
  assert!(out.starts_with("<kw>if</kw> (a) {"), "got: {out}");
  assert!(out.contains("<nl>"));
  assert!(!out.contains('\n'));
}

#[test]
fn node_hook_sees_originating_nodes() {
  let Ast { tree, root } = parse_js::parse("foo(bar);").unwrap();
  let mut seen: Vec<(String, NodeId)> = Vec::new();
  {
    let options = Options {
      write_node: Some(Box::new(|code: &str, node: NodeId| {
        seen.push((code.to_string(), node));
        code.to_string()
      })),
      ..Options::default()
    };
    let out = emit_js::generate(&tree, root, options);
    assert_eq!(out, "foo(bar);\n");
  }
  let names: Vec<&str> = seen.iter().map(|(code, _)| code.as_str()).collect();
  assert_eq!(names, vec!["foo", "bar"]);
  for (code, node) in &seen {
    assert_eq!(tree.syntax(*node).ident_name(), Some(code.as_str()));
  }
}

struct NumbersAsHex;

impl EmitOverride for NumbersAsHex {
  fn emit(&mut self, state: &mut State, id: NodeId) -> bool {
    if let Syntax::Literal {
      value: ast_js::Value::Num(n),
      ..
    } = state.tree.syntax(id)
    {
      let text = format!("0x{:x}", *n as i64);
      state.write_node(&text, id);
      return true;
    }
    false
  }
}

#[test]
fn generator_override_intercepts_one_kind() {
  let Ast { tree, root } = parse_js::parse("use(255, 'str');").unwrap();
  let mut gen = NumbersAsHex;
  let options = Options {
    generator: Some(&mut gen),
    ..Options::default()
  };
  let out = emit_js::generate(&tree, root, options);
  assert_eq!(out, "use(0xff, 'str');\n");
}

#[test]
fn comments_emit_only_when_enabled() {
  let Ast { mut tree, root } = parse_js::parse("work();").unwrap();
  let stmt = tree.children(root)[0];
  tree.node_mut(stmt).leading_comments.push(Comment {
    block: false,
    text: "entry point".to_string(),
  });
  let silent = emit_js::generate(&tree, root, Options::default());
  assert_eq!(silent, "work();\n");
  let options = Options {
    comments: true,
    ..Options::default()
  };
  let chatty = emit_js::generate(&tree, root, options);
  assert_eq!(chatty, "// entry point\nwork();\n");
}
