//! Balanced-bracket scanning and truncated-array salvage.
//!
//! This is the load-bearing layer: the array extractor and the direct-tag
//! extractor find JSON spans through [`find_balanced`], and the salvage
//! engine pairs every brace in one pass. Scans are single left-to-right
//! passes over the text; nothing here backtracks or rescans.

/// String-literal state of a left-to-right JSON scan.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LiteralState {
    in_string: bool,
    escaped: bool,
}

impl LiteralState {
    /// Advance over `ch`. Returns `true` when `ch` is structural, i.e. not
    /// part of a string literal (the quotes themselves count as literal).
    pub(crate) fn step(&mut self, ch: char) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == '"' {
                self.in_string = false;
            }
            false
        } else if ch == '"' {
            self.in_string = true;
            false
        } else {
            true
        }
    }
}

fn closer_for(open: u8) -> Option<char> {
    match open {
        b'[' => Some(']'),
        b'{' => Some('}'),
        _ => None,
    }
}

/// Return the span from the bracket at byte offset `start` through its
/// matching close, or `None` when `start` is not `[`/`{` or the span never
/// closes.
///
/// Brackets inside string literals are ignored and `\"` does not end a
/// string. Only the bracket kind found at `start` affects depth.
///
/// # Examples
///
/// ```
/// use llm_response_parser::response_parser::scan::find_balanced;
///
/// let input = r#"Result: {"a": [1, 2]} trailing"#;
/// assert_eq!(find_balanced(input, 8), Some(r#"{"a": [1, 2]}"#));
///
/// let escaped = r#"["a\"b]"] tail"#;
/// assert_eq!(find_balanced(escaped, 0), Some(r#"["a\"b]"]"#));
///
/// assert_eq!(find_balanced("[1, [2, 3]", 0), None);
/// ```
pub fn find_balanced(text: &str, start: usize) -> Option<&str> {
    let open_byte = *text.as_bytes().get(start)?;
    let close = closer_for(open_byte)?;
    let open = open_byte as char;

    let mut depth = 0usize;
    let mut literal = LiteralState::default();

    for (i, ch) in text[start..].char_indices() {
        if !literal.step(ch) {
            continue;
        }
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..=start + i]);
            }
        }
    }
    None
}

/// Every structural `{` in `text` with the byte offset of its matching `}`,
/// in order of the opening brace. Braces inside string literals are not
/// structural; an opening brace that never closes pairs with `None`.
///
/// One left-to-right pass with a stack of open braces.
fn object_spans(text: &str) -> Vec<(usize, Option<usize>)> {
    let mut spans = Vec::new();
    let mut open = Vec::new();
    let mut literal = LiteralState::default();

    for (i, ch) in text.char_indices() {
        if !literal.step(ch) {
            continue;
        }
        match ch {
            '{' => {
                open.push(spans.len());
                spans.push((i, None));
            }
            '}' => {
                if let Some(idx) = open.pop() {
                    spans[idx].1 = Some(i);
                }
            }
            _ => {}
        }
    }
    spans
}

/// Collect every independently balanced `{...}` span in `text`, left to right.
///
/// Each closed object is offered to `accept` in order of its opening brace.
/// Accepted spans are kept and objects inside them are skipped; a rejected
/// span's inner objects are still offered, so a complete object nested in a
/// broken one is found. Linear in `text` apart from the work `accept` does.
pub(crate) fn salvage_objects<'a, F>(text: &'a str, mut accept: F) -> Vec<&'a str>
where
    F: FnMut(&'a str) -> bool,
{
    let mut objects = Vec::new();
    let mut resume = 0;

    for (start, end) in object_spans(text) {
        let Some(end) = end else {
            continue;
        };
        if start < resume {
            continue;
        }
        let object = &text[start..=end];
        if accept(object) {
            objects.push(object);
            resume = end + 1;
        }
    }
    objects
}

/// All balanced `{...}` spans in `text`, without validating them as JSON.
///
/// ```
/// use llm_response_parser::response_parser::scan::balanced_objects;
///
/// let truncated = r#"[{"a":1},{"b":2},{"c":"#;
/// assert_eq!(balanced_objects(truncated), vec![r#"{"a":1}"#, r#"{"b":2}"#]);
/// ```
pub fn balanced_objects(text: &str) -> Vec<&str> {
    salvage_objects(text, |_| true)
}
