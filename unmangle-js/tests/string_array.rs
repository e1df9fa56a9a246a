mod common;

use ast_js::Ast;
use common::assert_parents_consistent;
use common::assert_text_eq;
use emit_js::Options;
use unmangle_js::pass::string_array_transformations;

fn transform(input: &str) -> String {
  let Ast { mut tree, root } = parse_js::parse(input).expect("test input must parse");
  string_array_transformations(&mut tree, root).unwrap();
  assert_parents_consistent(&tree, root);
  emit_js::generate(&tree, root, Options::with_indent("    "))
    .trim()
    .to_string()
}

const ARRAY_AND_DECODER: &str = "function _0x3427() {
    var _0x2f6c = ['Hello', 'World', 'log'];
    _0x3427 = function () {
        return _0x2f6c;
    };
    return _0x3427();
}
function _0x51ab(_0x1a2b, _0x3c4d) {
    var _0x5e6f = _0x3427();
    return _0x51ab = function (_0x7a8b, _0x9c0d) {
        _0x7a8b = _0x7a8b - 0x1a2;
        var _0x1e2f = _0x5e6f[_0x7a8b];
        return _0x1e2f;
    }, _0x51ab(_0x1a2b, _0x3c4d);
}
";

#[test]
fn decodes_literal_index_calls() {
  let input = format!(
    "{ARRAY_AND_DECODER}console[_0x51ab(0x1a4, 0x1a3)](_0x51ab(0x1a2, 0x1a5) + ' ' + _0x51ab(0x1a3, 0x1a2));"
  );
  let output = transform(&input);
  assert_text_eq(
    &output,
    "console[\"log\"](\"Hello\" + ' ' + \"World\");",
  );
}

#[test]
fn resolves_wrapper_functions_and_aliases() {
  let input = format!(
    "{ARRAY_AND_DECODER}function _0x1b2c(_0x10, _0x20) {{
    return _0x51ab(_0x10 - -0x10, _0x20);
}}
var _0xa11a5 = _0x51ab;
var first = _0x1b2c(0x192, 0x193);
var second = _0xa11a5(0x1a3, 0x999);"
  );
  let output = transform(&input);
  assert_text_eq(
    &output,
    "var first = \"Hello\";\nvar second = \"World\";",
  );
}

#[test]
fn resolves_chained_wrappers() {
  // _0x2c3d forwards through _0x1b2c; the chain must collapse into direct
  // decoder calls with the offsets combined.
  let input = format!(
    "{ARRAY_AND_DECODER}function _0x1b2c(_0x10, _0x20) {{
    return _0x51ab(_0x10 - -0x10, _0x20);
}}
function _0x2c3d(_0x30, _0x40) {{
    return _0x1b2c(_0x30 - 0x20, _0x40);
}}
var first = _0x2c3d(0x1b2, 0x1);
var second = _0x2c3d(0x1b4, 0x2);"
  );
  let output = transform(&input);
  assert_text_eq(
    &output,
    "var first = \"Hello\";\nvar second = \"log\";",
  );
}

#[test]
fn rotator_reorders_array_before_decoding() {
  let input = "function _0x3427() {
    var _0x2f6c = ['World', 'log', '66', 'Hello'];
    _0x3427 = function () {
        return _0x2f6c;
    };
    return _0x3427();
}
function _0x51ab(_0x1a2b, _0x3c4d) {
    var _0x5e6f = _0x3427();
    return _0x51ab = function (_0x7a8b, _0x9c0d) {
        _0x7a8b = _0x7a8b - 0x1a2;
        var _0x1e2f = _0x5e6f[_0x7a8b];
        return _0x1e2f;
    }, _0x51ab(_0x1a2b, _0x3c4d);
}
(function (_0x12, _0x34) {
    var _0x56 = _0x12();
    while (true) {
        try {
            var _0x78 = parseInt(_0x51ab(0x1a2, 0x0));
            if (_0x78 === _0x34) break;
            _0x56['push'](_0x56['shift']());
        } catch (_0xbc) {
            _0x56['push'](_0x56['shift']());
        }
    }
}(_0x3427, 0x42));
console[_0x51ab(0x1a5, 0x1)](_0x51ab(0x1a3, 0x2) + ' ' + _0x51ab(0x1a4, 0x3));";
  let output = transform(input);
  assert_text_eq(
    &output,
    "console[\"log\"](\"Hello\" + ' ' + \"World\");",
  );
}

#[test]
fn abandons_match_when_rotation_never_settles() {
  // The checksum can never be met, so the sandbox burns its budget and the
  // match must be abandoned with every node still in place.
  let input = "function _0x3427() {
    var _0x2f6c = ['a', 'b'];
    _0x3427 = function () {
        return _0x2f6c;
    };
    return _0x3427();
}
function _0x51ab(_0x1, _0x2) {
    var _0x3 = _0x3427();
    return _0x51ab = function (_0x4, _0x5) {
        var _0x6 = _0x3[_0x4];
        return _0x6;
    }, _0x51ab(_0x1, _0x2);
}
(function (_0x12, _0x34) {
    var _0x56 = _0x12();
    while (true) {
        try {
            var _0x78 = parseInt(_0x51ab(0x0, 0x0));
            if (_0x78 === _0x34) break;
            _0x56['push'](_0x56['shift']());
        } catch (_0xbc) {
            _0x56['push'](_0x56['shift']());
        }
    }
}(_0x3427, 0x42));
var keep = _0x51ab(0x0, 0x1);";
  let output = transform(input);
  assert!(
    output.contains("function _0x3427")
      && output.contains("function _0x51ab")
      && output.contains("keep = _0x51ab(0x0, 0x1)"),
    "nothing may be rewritten when the sandbox gives up:\n{output}"
  );
}

#[test]
fn concat_chain_arrays_are_accepted() {
  let input = "function _0x3427() {
    var _0x2f6c = (function () {
        return ['one'].concat((function () {
            return ['two', 'three'];
        }()));
    }());
    _0x3427 = function () {
        return _0x2f6c;
    };
    return _0x3427();
}
function _0x51ab(_0x1, _0x2) {
    var _0x3 = _0x3427();
    return _0x51ab = function (_0x4, _0x5) {
        var _0x6 = _0x3[_0x4];
        return _0x6;
    }, _0x51ab(_0x1, _0x2);
}
var pick = _0x51ab(0x1, 0x0);";
  let output = transform(input);
  assert_text_eq(&output, "var pick = \"two\";");
}
