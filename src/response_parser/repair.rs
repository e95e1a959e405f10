//! Deterministic JSON repair for common LLM output errors.
//!
//! Off by default; enabled with
//! [`ParserConfig::with_repair`](crate::ParserConfig::with_repair). Every
//! pass is string-literal aware and the result is only returned when
//! `serde_json` accepts it, so a repaired candidate is never partially valid.

use crate::response_parser::scan::LiteralState;

/// Attempt to repair common LLM JSON mistakes.
///
/// Returns the repaired string if the result is valid JSON, `None` if the
/// input was already valid or could not be repaired.
///
/// Repairs applied (in order):
/// 1. Strip `//` and `/* */` comments
/// 2. Replace Python literals: `True`, `False`, `None`
/// 3. Remove trailing commas before `}` or `]`
///
/// ```
/// use llm_response_parser::response_parser::repair::try_repair_json;
///
/// assert!(try_repair_json(r#"{"ok": 1}"#).is_none()); // already valid
///
/// let fixed = try_repair_json(r#"{"a": True, "b": [1, 2,],} // done"#).unwrap();
/// let v: serde_json::Value = serde_json::from_str(&fixed).unwrap();
/// assert_eq!(v["a"], true);
/// ```
pub fn try_repair_json(broken: &str) -> Option<String> {
    if serde_json::from_str::<serde_json::Value>(broken).is_ok() {
        return None;
    }

    let s = strip_comments(broken);
    let s = replace_python_literals(&s);
    let s = remove_trailing_commas(&s);

    serde_json::from_str::<serde_json::Value>(&s).is_ok().then_some(s)
}

fn strip_comments(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut literal = LiteralState::default();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if !literal.step(ch) {
            out.push(ch);
            i += 1;
            continue;
        }
        match (ch, chars.get(i + 1)) {
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }
    out
}

fn replace_python_literals(s: &str) -> String {
    const LITERALS: &[(&str, &str)] = &[("True", "true"), ("False", "false"), ("None", "null")];

    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut literal = LiteralState::default();
    let mut i = 0;

    'outer: while i < chars.len() {
        let ch = chars[i];
        if literal.step(ch) {
            for (from, to) in LITERALS {
                if word_at(&chars, i, from) {
                    out.push_str(to);
                    i += from.len();
                    continue 'outer;
                }
            }
        }
        out.push(ch);
        i += 1;
    }
    out
}

/// Whether `word` occurs at `i` as a whole identifier.
fn word_at(chars: &[char], i: usize, word: &str) -> bool {
    let len = word.chars().count();
    if i + len > chars.len() || !chars[i..i + len].iter().copied().eq(word.chars()) {
        return false;
    }
    let boundary = |c: Option<&char>| c.map_or(true, |c| !c.is_alphanumeric() && *c != '_');
    boundary(i.checked_sub(1).and_then(|j| chars.get(j))) && boundary(chars.get(i + len))
}

fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut literal = LiteralState::default();

    for (i, &ch) in chars.iter().enumerate() {
        if literal.step(ch) && ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}
