//! Escape sequence processing for string literals.
//!
//! Recognized: `\\`, `\'`, `\"`, `\n`, `\r`, `\t`, `\0`, `\a`, `\b`, `\f`,
//! `\v`, `\xHH`, `\uHHHH`, `\UHHHHHHHH` and backslash-newline (dropped).
//! Unrecognized escapes are preserved literally, backslash included, the way
//! the host language treats them.

#[inline]
fn resolve_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '0' => Some('\0'),
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0C}'),
        'v' => Some('\u{0B}'),
        _ => None,
    }
}

/// Read exactly `digits` hex digits from `chars` as a code point.
fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars.next()?.to_digit(16)?;
        code = code.checked_mul(16)?.checked_add(digit)?;
    }
    char::from_u32(code)
}

/// Process escape sequences in the body of a string literal.
///
/// Returns `None` when a numeric escape is truncated or names an invalid
/// code point; the lexer turns that into an error token.
pub(crate) fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\n') => {}
            Some('x') => result.push(hex_escape(&mut chars, 2)?),
            Some('u') => result.push(hex_escape(&mut chars, 4)?),
            Some('U') => result.push(hex_escape(&mut chars, 8)?),
            Some(esc) => {
                if let Some(resolved) = resolve_escape(esc) {
                    result.push(resolved);
                } else {
                    result.push('\\');
                    result.push(esc);
                }
            }
            None => result.push('\\'),
        }
    }

    Some(result)
}
