mod common;

use ast_js::Ast;
use common::assert_parents_consistent;
use common::assert_text_eq;

#[test]
fn full_pipeline_cleans_combined_obfuscation() {
  let input = "function _0x3427() {
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
{
    var _0x9f = (\"1|0\")['split']('|'), _0xa0 = 0x0;
    while (!![]) {
        switch (_0x9f[_0xa0++]) {
            case '0':
                console[_0x51ab(0x1a4, 0x1)](_0x51ab(0x1a2, 0x2) + ' ' + _0x51ab(0x1a3, 0x3));
                continue;
            case '1':
                if (!0) {
                    setup();
                }
                continue;
        }
        break;
    }
}";
  let output = unmangle_js::deobfuscate_source(input).unwrap();
  let expected = "{
  {
    setup();
  }
  console.log(\"Hello World\");
}";
  assert_text_eq(output.trim(), expected);
}

#[test]
fn clean_input_is_a_fixpoint() {
  let input = "function greet(name) {\n  return \"Hi \" + name;\n}\ngreet(\"you\");\n";
  let once = unmangle_js::deobfuscate_source(input).unwrap();
  let twice = unmangle_js::deobfuscate_source(&once).unwrap();
  assert_text_eq(&twice, &once);
}

#[test]
fn pipeline_preserves_parent_links() {
  let input = "var a = 0x10;\nif (true) { use(a); } else { other(); }\nvar o = { k: function (x) { return x + 1; } };\nuse(o.k(2));";
  let Ast { mut tree, root } = parse_js::parse(input).unwrap();
  unmangle_js::deobfuscate(&mut tree, root).unwrap();
  assert_parents_consistent(&tree, root);
}

#[test]
fn no_idiom_means_no_change() {
  let input = "function add(a, b) {\n  return a + b;\n}\nadd(1, 2);\n";
  let output = unmangle_js::deobfuscate_source(input).unwrap();
  assert_text_eq(output.trim(), input.trim());
}
