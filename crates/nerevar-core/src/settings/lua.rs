//! Literal-level helpers for the `config.lua` dialect. Everything here is
//! quote-aware: commas, braces and `--` inside string literals are data.

/// Feeds every byte outside string literals to `visit` until it returns false.
fn scan_unquoted(text: &str, mut visit: impl FnMut(usize, u8) -> bool) {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'\'' {
                    quote = Some(b);
                } else if !visit(i, b) {
                    return;
                }
            }
        }
        i += 1;
    }
}

pub(crate) fn strip_comment(line: &str) -> &str {
    let mut cut = line.len();
    let bytes = line.as_bytes();
    scan_unquoted(line, |i, b| {
        if b == b'-' && bytes.get(i + 1) == Some(&b'-') {
            cut = i;
            return false;
        }
        true
    });
    &line[..cut]
}

/// Net `{` minus `}` outside of strings.
pub(crate) fn brace_delta(text: &str) -> i32 {
    let mut depth = 0;
    scan_unquoted(text, |_, b| {
        match b {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
        true
    });
    depth
}

/// Splits on `sep` at nesting depth zero. Empty pieces (trailing commas) are
/// dropped.
pub(crate) fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    scan_unquoted(text, |i, b| {
        match b {
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => depth -= 1,
            _ if b == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        true
    });
    parts.push(&text[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// `key = value` at depth zero. Bracketed string keys (`["x"] = 1`) are
/// unwrapped.
pub(crate) fn split_field(item: &str) -> Option<(String, &str)> {
    let mut eq = None;
    let mut depth = 0i32;
    scan_unquoted(item, |i, b| {
        match b {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth -= 1,
            b'=' if depth == 0 => {
                eq = Some(i);
                return false;
            }
            _ => {}
        }
        true
    });
    let eq = eq?;
    let key = item[..eq].trim();
    let value = item[eq + 1..].trim();
    let key = match key.strip_prefix('[').and_then(|k| k.strip_suffix(']')) {
        Some(inner) => unquote(inner.trim())?,
        None => key.to_string(),
    };
    Some((key, value))
}

pub(crate) fn strip_braces(text: &str) -> Option<&str> {
    let text = text.trim();
    text.strip_prefix('{')?.strip_suffix('}').map(str::trim)
}

pub(crate) fn unquote(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let q = raw.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = raw.strip_prefix(q)?.strip_suffix(q)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => return None,
        }
    }
    Some(out)
}

pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

const RESERVED_WORDS: [&str; 22] = [
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// A name usable after `.` in Lua: identifier characters and not a keyword.
pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_WORDS.contains(&value)
}
