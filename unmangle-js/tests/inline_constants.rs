mod common;

use common::run_test;
use unmangle_js::pass::inline_constants;
use unmangle_js::pass::inline_constants_all;

const INPUT: &str = "{
    const a = 'he';
    const b = a + 'llo';
    const c = ' ';
    const d = 'wor';
    const e = d + 'ld';
    let f = '!';
    let g = '.';
    g = '..';
    const h = b + c + e + f + g;
    f = '!!';
    console.log(h);
}";

#[test]
fn single_run_inlines_final_literals() {
  let expected = "{
    const b = 'he' + 'llo';
    const e = 'wor' + 'ld';
    let f = '!';
    let g = '.';
    g = '..';
    const h = b + ' ' + e + '!' + g;
    f = '!!';
    console.log(h);
}";
  run_test(INPUT, expected, |t, root| {
    inline_constants(t, root).unwrap();
  });
}

#[test]
fn fixpoint_chases_newly_literal_initializers() {
  let expected = "{
    let f = '!';
    let g = '.';
    g = '..';
    const h = 'he' + 'llo' + ' ' + ('wor' + 'ld') + '!' + g;
    f = '!!';
    console.log(h);
}";
  run_test(INPUT, expected, |t, root| {
    inline_constants_all(t, root).unwrap();
  });
}

#[test]
fn top_level_declarations_are_kept() {
  run_test(
    "const k = 5;\nuse(k);",
    "const k = 5;\nuse(5);",
    |t, root| {
      inline_constants_all(t, root).unwrap();
    },
  );
}
