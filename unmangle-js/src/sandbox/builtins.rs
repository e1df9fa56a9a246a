//! The built-in functions and methods catalogued decoders actually use.
//! Anything else is an unsupported-subset error, by design.

use super::to_js_string;
use super::to_number;
use super::JsVal;
use super::Native;
use super::SandboxError;
use super::SandboxResult;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) fn call_native(native: Native, args: &[JsVal]) -> SandboxResult<JsVal> {
  match native {
    Native::StringNamespace => Err(SandboxError::thrown("String is not callable here")),
    Native::FromCharCode => {
      let mut out = String::new();
      for arg in args {
        let code = to_number(arg);
        let code = if code.is_finite() {
          (code as i64 as u32) & 0xffff
        } else {
          0
        };
        out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
      }
      Ok(JsVal::Str(out))
    }
    Native::ParseInt => {
      let text = args.first().map(to_js_string).unwrap_or_default();
      let radix = match args.get(1) {
        Some(r) => {
          let r = to_number(r);
          if r.is_nan() || r == 0.0 {
            10
          } else {
            r as u32
          }
        }
        None => 10,
      };
      Ok(JsVal::Num(parse_int(&text, radix)))
    }
    Native::ParseFloat => {
      let text = args.first().map(to_js_string).unwrap_or_default();
      Ok(JsVal::Num(parse_float_prefix(&text)))
    }
    Native::DecodeUriComponent => {
      let text = args.first().map(to_js_string).unwrap_or_default();
      decode_uri_component(&text)
        .map(JsVal::Str)
        .ok_or_else(|| SandboxError::thrown("URIError: malformed URI sequence"))
    }
  }
}

/// `parseInt` semantics: trimmed prefix parse, NaN when no digits.
fn parse_int(text: &str, mut radix: u32) -> f64 {
  let mut t = text.trim();
  let mut sign = 1.0;
  if let Some(rest) = t.strip_prefix('-') {
    sign = -1.0;
    t = rest;
  } else if let Some(rest) = t.strip_prefix('+') {
    t = rest;
  }
  if !(2..=36).contains(&radix) {
    return f64::NAN;
  }
  if (radix == 16 || radix == 10) && (t.starts_with("0x") || t.starts_with("0X")) {
    t = &t[2..];
    radix = 16;
  }
  let mut value = 0.0f64;
  let mut any = false;
  for c in t.chars() {
    match c.to_digit(radix) {
      Some(d) => {
        value = value * radix as f64 + d as f64;
        any = true;
      }
      None => break,
    }
  }
  if any {
    sign * value
  } else {
    f64::NAN
  }
}

fn parse_float_prefix(text: &str) -> f64 {
  let t = text.trim_start();
  let mut end = 0;
  let bytes = t.as_bytes();
  let mut seen_digit = false;
  let mut seen_dot = false;
  let mut seen_exp = false;
  while end < bytes.len() {
    let c = bytes[end] as char;
    let ok = match c {
      '0'..='9' => {
        seen_digit = true;
        true
      }
      '+' | '-' => end == 0 || matches!(bytes[end - 1] as char, 'e' | 'E'),
      '.' => {
        if seen_dot || seen_exp {
          false
        } else {
          seen_dot = true;
          true
        }
      }
      'e' | 'E' => {
        if seen_exp || !seen_digit {
          false
        } else {
          seen_exp = true;
          true
        }
      }
      _ => false,
    };
    if !ok {
      break;
    }
    end += 1;
  }
  if !seen_digit {
    return f64::NAN;
  }
  t[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn decode_uri_component(text: &str) -> Option<String> {
  let bytes = text.as_bytes();
  let mut out = Vec::new();
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] == b'%' {
      if i + 3 > bytes.len() {
        return None;
      }
      let hex = text.get(i + 1..i + 3)?;
      let byte = u8::from_str_radix(hex, 16).ok()?;
      out.push(byte);
      i += 3;
    } else {
      out.push(bytes[i]);
      i += 1;
    }
  }
  String::from_utf8(out).ok()
}

fn index_arg(args: &[JsVal], at: usize) -> f64 {
  args.get(at).map(to_number).unwrap_or(f64::NAN)
}

fn clamp_index(n: f64, len: usize) -> usize {
  if n.is_nan() {
    return 0;
  }
  if n < 0.0 {
    let adjusted = len as f64 + n;
    if adjusted < 0.0 {
      0
    } else {
      adjusted as usize
    }
  } else if n > len as f64 {
    len
  } else {
    n as usize
  }
}

pub(crate) fn string_method(s: &str, method: &str, args: &[JsVal]) -> SandboxResult<JsVal> {
  let chars: Vec<char> = s.chars().collect();
  match method {
    "split" => {
      let sep = match args.first() {
        None | Some(JsVal::Undefined) => {
          return Ok(JsVal::Arr(Rc::new(RefCell::new(vec![JsVal::Str(
            s.to_string(),
          )]))));
        }
        Some(sep) => to_js_string(sep),
      };
      let parts: Vec<JsVal> = if sep.is_empty() {
        chars.iter().map(|c| JsVal::Str(c.to_string())).collect()
      } else {
        s.split(sep.as_str())
          .map(|p| JsVal::Str(p.to_string()))
          .collect()
      };
      Ok(JsVal::Arr(Rc::new(RefCell::new(parts))))
    }
    "charAt" => {
      let index = index_arg(args, 0);
      let index = if index.is_nan() { 0.0 } else { index };
      Ok(JsVal::Str(
        chars
          .get(index as usize)
          .map(|c| c.to_string())
          .unwrap_or_default(),
      ))
    }
    "charCodeAt" => {
      let index = index_arg(args, 0);
      let index = if index.is_nan() { 0.0 } else { index };
      Ok(match chars.get(index as usize) {
        Some(c) => JsVal::Num(*c as u32 as f64),
        None => JsVal::Num(f64::NAN),
      })
    }
    "indexOf" => {
      let search = args.first().map(to_js_string).unwrap_or_default();
      let from = match args.get(1) {
        Some(v) => clamp_index(to_number(v), chars.len()),
        None => 0,
      };
      let haystack: String = chars[from.min(chars.len())..].iter().collect();
      Ok(JsVal::Num(match haystack.find(&search) {
        Some(byte_pos) => (haystack[..byte_pos].chars().count() + from) as f64,
        None => -1.0,
      }))
    }
    "slice" => {
      let start = clamp_index(index_arg(args, 0), chars.len());
      let end = match args.get(1) {
        Some(v) => clamp_index(to_number(v), chars.len()),
        None => chars.len(),
      };
      let out: String = if start < end {
        chars[start..end].iter().collect()
      } else {
        String::new()
      };
      Ok(JsVal::Str(out))
    }
    "substring" => {
      let mut start = clamp_index(index_arg(args, 0), chars.len());
      let mut end = match args.get(1) {
        Some(v) => {
          let n = to_number(v);
          if n < 0.0 || n.is_nan() {
            0
          } else {
            (n as usize).min(chars.len())
          }
        }
        None => chars.len(),
      };
      if start > end {
        std::mem::swap(&mut start, &mut end);
      }
      Ok(JsVal::Str(chars[start..end].iter().collect()))
    }
    "replace" => {
      let search = match args.first() {
        Some(JsVal::Str(s)) => s.clone(),
        _ => return Err(SandboxError::unsupported("non-string replace pattern")),
      };
      let replacement = args.get(1).map(to_js_string).unwrap_or_default();
      Ok(JsVal::Str(s.replacen(&search, &replacement, 1)))
    }
    "concat" => {
      let mut out = s.to_string();
      for arg in args {
        out.push_str(&to_js_string(arg));
      }
      Ok(JsVal::Str(out))
    }
    "toString" => Ok(JsVal::Str(s.to_string())),
    _ => Err(SandboxError::unsupported("string method")),
  }
}

pub(crate) fn array_method(
  elements: &Rc<RefCell<Vec<JsVal>>>,
  method: &str,
  args: &[JsVal],
) -> SandboxResult<JsVal> {
  match method {
    "push" => {
      let mut elements = elements.borrow_mut();
      for arg in args {
        elements.push(arg.clone());
      }
      Ok(JsVal::Num(elements.len() as f64))
    }
    "pop" => Ok(elements.borrow_mut().pop().unwrap_or(JsVal::Undefined)),
    "shift" => {
      let mut elements = elements.borrow_mut();
      if elements.is_empty() {
        Ok(JsVal::Undefined)
      } else {
        Ok(elements.remove(0))
      }
    }
    "unshift" => {
      let mut elements = elements.borrow_mut();
      for (i, arg) in args.iter().enumerate() {
        elements.insert(i, arg.clone());
      }
      Ok(JsVal::Num(elements.len() as f64))
    }
    "join" => {
      let sep = match args.first() {
        None | Some(JsVal::Undefined) => ",".to_string(),
        Some(v) => to_js_string(v),
      };
      let joined = elements
        .borrow()
        .iter()
        .map(|e| match e {
          JsVal::Undefined | JsVal::Null => String::new(),
          other => to_js_string(other),
        })
        .collect::<Vec<_>>()
        .join(&sep);
      Ok(JsVal::Str(joined))
    }
    "indexOf" => {
      let needle = args.first().cloned().unwrap_or(JsVal::Undefined);
      let found = elements.borrow().iter().position(|e| js_same(e, &needle));
      Ok(JsVal::Num(found.map(|i| i as f64).unwrap_or(-1.0)))
    }
    "reverse" => {
      elements.borrow_mut().reverse();
      Ok(JsVal::Arr(elements.clone()))
    }
    "concat" => {
      let mut out = elements.borrow().clone();
      for arg in args {
        match arg {
          JsVal::Arr(other) => out.extend(other.borrow().iter().cloned()),
          other => out.push(other.clone()),
        }
      }
      Ok(JsVal::Arr(Rc::new(RefCell::new(out))))
    }
    "slice" => {
      let borrowed = elements.borrow();
      let start = clamp_index(index_arg(args, 0), borrowed.len());
      let end = match args.get(1) {
        Some(v) => clamp_index(to_number(v), borrowed.len()),
        None => borrowed.len(),
      };
      let out = if start < end {
        borrowed[start..end].to_vec()
      } else {
        Vec::new()
      };
      Ok(JsVal::Arr(Rc::new(RefCell::new(out))))
    }
    _ => Err(SandboxError::unsupported("array method")),
  }
}

fn js_same(a: &JsVal, b: &JsVal) -> bool {
  match (a, b) {
    (JsVal::Undefined, JsVal::Undefined) | (JsVal::Null, JsVal::Null) => true,
    (JsVal::Bool(a), JsVal::Bool(b)) => a == b,
    (JsVal::Num(a), JsVal::Num(b)) => a == b,
    (JsVal::Str(a), JsVal::Str(b)) => a == b,
    (JsVal::Arr(a), JsVal::Arr(b)) => Rc::ptr_eq(a, b),
    (JsVal::Func(a), JsVal::Func(b)) => Rc::ptr_eq(a, b),
    _ => false,
  }
}
