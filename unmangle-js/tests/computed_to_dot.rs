mod common;

use common::run_test;
use unmangle_js::pass::computed_to_dot;

#[test]
fn rewrites_valid_identifier_keys() {
  let input = "var a = 1;
var c = window['location']['ancestorOrigins']['length'].toString();
var d = globalThis['a1']['2b']['-c']['dd']();
var b = 2;";
  let expected = "var a = 1;
var c = window.location.ancestorOrigins.length.toString();
var d = globalThis.a1['2b']['-c'].dd();
var b = 2;";
  run_test(input, expected, |t, root| {
    computed_to_dot(t, root).unwrap();
  });
}

#[test]
fn keeps_reserved_words_computed() {
  run_test(
    "x['class'] = y['typeof'];",
    "x['class'] = y['typeof'];",
    |t, root| {
      assert!(!computed_to_dot(t, root).unwrap());
    },
  );
}

#[test]
fn rewrites_computed_method_definitions() {
  let input = "class A {
    ['run']() {}
}";
  let expected = "class A{
    run() {}
}";
  run_test(input, expected, |t, root| {
    computed_to_dot(t, root).unwrap();
  });
}
