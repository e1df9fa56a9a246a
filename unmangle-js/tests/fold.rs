mod common;

use common::run_test;
use unmangle_js::pass::eval_constant_expressions;
use unmangle_js::pass::hexadecimal;

#[test]
fn folds_constant_expressions() {
  let input = "var a = 1365;
var c = !0;
var d = !true;
var e = ![];
var f = typeof 1;
var g = typeof undefined;
var h = 2 - 1;
var i = 2 > 1;
var j = true && false;
var k = 2 === 1;
var l = aa === aa;
var m = aa === bb;";
  let expected = "var a = 1365;
var c = true;
var d = false;
var e = false;
var f = \"number\";
var g = \"undefined\";
var h = 1;
var i = true;
var j = false;
var k = false;
var l = true;
var m = aa === bb;";
  run_test(input, expected, |t, root| {
    eval_constant_expressions(t, root).unwrap();
  });
}

#[test]
fn folds_string_concatenation_over_literals() {
  run_test(
    "var s = 'a' + 'b';",
    "var s = \"ab\";",
    |t, root| {
      eval_constant_expressions(t, root).unwrap();
    },
  );
}

#[test]
fn canonicalizes_hex_numbers() {
  run_test("var a = 0x555;", "var a = 1365;", |t, root| {
    eval_constant_expressions(t, root).unwrap();
  });
}

#[test]
fn typeof_window_folds_to_object() {
  run_test(
    "var t = typeof window;",
    "var t = \"object\";",
    |t, root| {
      eval_constant_expressions(t, root).unwrap();
    },
  );
}

#[test]
fn hexadecimal_normalizes_literal_text() {
  let input = "var a = 0x555;\nvar b = '\\x48\\x69\\x20\\x22x\\x22';\nvar c = 0x10n;";
  let expected = "var a = 1365;\nvar b = 'Hi \"x\"';\nvar c = 16n;";
  run_test(input, expected, |t, root| {
    hexadecimal(t, root).unwrap();
  });
}

#[test]
fn logical_or_keeps_operand_value() {
  run_test(
    "var x = 0 || 'fallback';\nvar y = 'kept' && 1;",
    "var x = \"fallback\";\nvar y = 1;",
    |t, root| {
      eval_constant_expressions(t, root).unwrap();
    },
  );
}
