mod common;

use common::run_test;
use unmangle_js::pass::control_flow_flattening;

#[test]
fn unshuffles_while_switch() {
  let input = "{
    var _0xa2e247 = (\"0|2|5|3|4|1\")['split']('|'), _0x4417ad = 0;
    while (true) {
        switch (_0xa2e247[_0x4417ad++]) {
            case '0':
                var _0x8b8be3 = _0x204e90[_0x3146b7];
                continue;
            case '1':
                _0x316448 && ((_0x57d5be.length == _0x8b8be3.length || _0x8b8be3.indexOf('.') === 0) && (_0x57c620 = true));
                continue;
            case '2':
                var _0x515e87 = _0x8b8be3[0] === String.fromCharCode(46) ? _0x8b8be3.slice(1) : _0x8b8be3;
                continue;
            case '3':
                var _0x454f95 = _0x57d5be.indexOf(_0x515e87, _0x39e22e);
                continue;
            case '4':
                var _0x316448 = _0x454f95 !== -1 && _0x454f95 === _0x39e22e;
                continue;
            case '5':
                var _0x39e22e = _0x57d5be.length - _0x515e87.length;
                continue;
        }
        break;
    }
}";
  let expected = "{
    var _0x8b8be3 = _0x204e90[_0x3146b7];
    var _0x515e87 = _0x8b8be3[0] === String.fromCharCode(46) ? _0x8b8be3.slice(1) : _0x8b8be3;
    var _0x39e22e = _0x57d5be.length - _0x515e87.length;
    var _0x454f95 = _0x57d5be.indexOf(_0x515e87, _0x39e22e);
    var _0x316448 = _0x454f95 !== -1 && _0x454f95 === _0x39e22e;
    _0x316448 && ((_0x57d5be.length == _0x8b8be3.length || _0x8b8be3.indexOf('.') === 0) && (_0x57c620 = true));
}";
  run_test(input, expected, |t, root| {
    control_flow_flattening(t, root).unwrap();
  });
}

#[test]
fn requires_true_test_and_numeric_cases() {
  // The loop condition is not constant-true, so nothing may change.
  let input = "{
    var order = (\"1|0\")['split']('|'), i = 0;
    while (cond) {
        switch (order[i++]) {
            case '0':
                a();
                continue;
            case '1':
                b();
                continue;
        }
        break;
    }
}";
  run_test(input, input, |t, root| {
    assert!(!control_flow_flattening(t, root).unwrap());
  });
}

#[test]
fn matches_not_test_over_empty_array() {
  let input = "{
    var _0x1 = (\"1|0\")['split']('|'), _0x2 = 0;
    while (!![]) {
        switch (_0x1[_0x2++]) {
            case '0':
                second();
                continue;
            case '1':
                first();
                continue;
        }
        break;
    }
}";
  let expected = "{
    first();
    second();
}";
  run_test(input, expected, |t, root| {
    control_flow_flattening(t, root).unwrap();
  });
}
