mod common;

use common::run_test;
use unmangle_js::pass::simplify;
use unmangle_js::pass::simplify_all;

fn run(input: &str, expected: &str) {
  run_test(input, expected, |t, root| {
    simplify(t, root).unwrap();
  });
}

#[test]
fn if_always_true() {
  run(
    "var a = 1;\nif(true) {console.log(123)}\nvar b = 2;",
    "var a = 1;\n{\n    console.log(123);\n}\nvar b = 2;",
  );
}

#[test]
fn if_always_false() {
  run(
    "var a = 1;\nif(false) {console.log(123)}\nvar b = 2;",
    "var a = 1;\nvar b = 2;",
  );
}

#[test]
fn if_always_false_with_alternative() {
  run(
    "var a = 1;\nif(false) {console.log(123)} else {console.log(456)}\nvar b = 2;",
    "var a = 1;\n{\n    console.log(456);\n}\nvar b = 2;",
  );
}

#[test]
fn if_always_false_with_else_if() {
  run(
    "var a = 1;\nif(false) {console.log(123)} else if(1===1) {console.log(456)}\nvar b = 2;",
    "var a = 1;\nif (1 === 1) {\n    console.log(456);\n}\nvar b = 2;",
  );
}

#[test]
fn if_chain_collapses_inner_branches() {
  let input = "var a = 1;
if (false) {
    console.log(1);
} else if (1 === 1) {
    console.log(2);
} else if (false) {
    console.log(3);
} else if (true) {
    console.log(4);
}
var b = 2;";
  let expected = "var a = 1;
if (1 === 1) {
    console.log(2);
} else {
    console.log(4);
}
var b = 2;";
  run(input, expected);
}

#[test]
fn while_always_false_removed() {
  run(
    "before();\nwhile (false) { effect(); }\nafter();",
    "before();\nafter();",
  );
}

#[test]
fn empty_infinite_loop_becomes_throw() {
  run(
    "while (true) {}\ndone();",
    "throw \"infinity loop\";\ndone();",
  );
}

#[test]
fn do_while_false_runs_once() {
  run(
    "do { once(); } while (false);\nafter();",
    "{\n    once();\n}\nafter();",
  );
}

#[test]
fn conditional_with_literal_test() {
  run(
    "var x = true ? a() : b();\nvar y = 0 ? c : d;",
    "var x = a();\nvar y = d;",
  );
}

#[test]
fn nested_constant_branches_collapse_to_fixpoint() {
  run_test(
    "if (true) { if (false) { a(); } else { b(); } }",
    "{\n    {\n        b();\n    }\n}",
    |t, root| {
      simplify_all(t, root).unwrap();
    },
  );
}
