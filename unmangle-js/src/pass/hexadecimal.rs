use super::PassResult;
use ast_js::num::format_number;
use ast_js::NodeId;
use ast_js::Syntax;
use ast_js::Tree;
use ast_js::Value;

/// Rewrites literal source text into human-readable form: numeric raws to
/// plain decimal and `\xHH`/`\uHHHH` escapes in string raws to their
/// characters.
pub fn hexadecimal(t: &mut Tree, root: NodeId) -> PassResult {
  let literals = t.collect(root, &mut |n| t.syntax(n).is_literal());
  let mut changed = false;
  for id in literals {
    let Syntax::Literal { value, raw } = t.syntax_mut(id) else {
      continue;
    };
    match value {
      Value::Num(n) => {
        let decimal = format_number(*n);
        if raw.as_deref() != Some(decimal.as_str()) {
          *raw = Some(decimal);
          changed = true;
        }
      }
      Value::BigInt(b) => {
        let decimal = format!("{}n", b.to_str_radix(10));
        if raw.as_deref() != Some(decimal.as_str()) {
          *raw = Some(decimal);
          changed = true;
        }
      }
      Value::Str(_) => {
        if let Some(text) = raw {
          let unescaped = unescape_hex_sequences(text);
          if unescaped != *text {
            *raw = Some(unescaped);
            changed = true;
          }
        }
      }
      _ => {}
    }
  }
  Ok(changed)
}

/// Replaces `\xHH` and `\uHHHH` (lowercase hex, as the obfuscator emits)
/// anywhere in the raw text with the character they denote.
fn unescape_hex_sequences(raw: &str) -> String {
  let chars: Vec<char> = raw.chars().collect();
  let mut out = String::with_capacity(raw.len());
  let mut i = 0;
  while i < chars.len() {
    let replaced = if chars[i] == '\\' && i + 1 < chars.len() {
      let (kind, digits) = match chars[i + 1] {
        'x' => ('x', 2),
        'u' => ('u', 4),
        _ => (' ', 0),
      };
      if kind != ' ' && i + 2 + digits <= chars.len() {
        let hex: String = chars[i + 2..i + 2 + digits].iter().collect();
        if hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
          u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(|c| (c, 2 + digits))
        } else {
          None
        }
      } else {
        None
      }
    } else {
      None
    };
    match replaced {
      Some((c, consumed)) => {
        out.push(c);
        i += consumed;
      }
      None => {
        out.push(chars[i]);
        i += 1;
      }
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unescapes_lowercase_hex_only() {
    assert_eq!(unescape_hex_sequences("'\\x48\\x69'"), "'Hi'");
    assert_eq!(unescape_hex_sequences("'\\u0041'"), "'A'");
    assert_eq!(unescape_hex_sequences("'\\x4G'"), "'\\x4G'");
    assert_eq!(unescape_hex_sequences("'\\n'"), "'\\n'");
  }
}
