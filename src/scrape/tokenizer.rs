// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The shared constructor-call tokenizer.
//!
//! The upstream "schema" is a constructor-call grammar with no formal
//! specification: `Device(...)` argument lists mix quoted strings, bare
//! numbers, and a nested bracketed list of `Channel(...)` calls whose
//! arguments again contain quoted strings with commas. One
//! depth-and-quote-aware scanner serves every split — the array span,
//! the per-constructor argument lists, and the top-level comma
//! boundaries — instead of a regex per positional field.

/// Marker that introduces the device array in the page's script block.
const ARRAY_MARKER: &str = "devicesArr";

/// Returns the text between the brackets of `devicesArr = [ ... ]`.
///
/// `None` when the marker is absent — an authenticated page with no
/// devices is a legitimate state, so absence is not an error here.
/// The scan is bracket-depth and quote aware: nested channel arrays and
/// quoted strings containing `]` do not terminate the span early.
pub(crate) fn locate_array(html: &str) -> Option<&str> {
    let marker = html.find(ARRAY_MARKER)?;
    let rest = &html[marker + ARRAY_MARKER.len()..];
    let eq = rest.find('=')?;
    let open = eq + rest[eq..].find('[')?;
    let span = &rest[open..];
    let close = matching_close(span, '[', ']')?;
    Some(&span[1..close])
}

/// Splits a span into the argument lists of each `new <name>(...)`
/// invocation.
///
/// Returns the text between each invocation's parentheses. Invocations
/// whose closing parenthesis cannot be found (truncated markup) are
/// dropped.
pub(crate) fn split_constructors<'a>(span: &'a str, name: &str) -> Vec<&'a str> {
    let pattern = format!("new {name}");
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(found) = span[from..].find(&pattern) {
        let after = from + found + pattern.len();
        let tail = &span[after..];
        let open_rel = tail.find(|c: char| !c.is_whitespace());
        match open_rel {
            Some(rel) if tail[rel..].starts_with('(') => {
                let paren = &tail[rel..];
                if let Some(close) = matching_close(paren, '(', ')') {
                    out.push(&paren[1..close]);
                    from = after + rel + close + 1;
                    continue;
                }
                // Unterminated invocation: nothing more to recover
                break;
            }
            _ => {
                from = after;
            }
        }
    }
    out
}

/// Splits an argument list on top-level commas.
///
/// Commas inside parentheses, brackets, quoted strings, or after a
/// backslash escape do not split. Tokens keep their surrounding
/// whitespace and quotes; see [`unquote`].
pub(crate) fn split_args(args: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in args.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '\'' | '"' => match quote {
                Some(q) if q == ch => quote = None,
                Some(_) => {}
                None => quote = Some(ch),
            },
            '(' | '[' if quote.is_none() => depth += 1,
            ')' | ']' if quote.is_none() => depth = depth.saturating_sub(1),
            ',' if quote.is_none() && depth == 0 => {
                out.push(&args[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    out.push(&args[start..]);
    out
}

/// Strips surrounding whitespace, one layer of matching quotes, and
/// backslash escapes from a field token.
pub(crate) fn unquote(field: &str) -> String {
    let trimmed = field.trim();
    let bytes = trimmed.as_bytes();
    let inner = if bytes.len() >= 2
        && (bytes[0] == b'\'' || bytes[0] == b'"')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    if !inner.contains('\\') {
        return inner.trim().to_string();
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out.trim().to_string()
}

/// Index of the delimiter closing the one that starts the string.
///
/// `s` must begin with `open`. Quoted sections and backslash escapes are
/// skipped; `None` when the input ends before the matching close.
fn matching_close(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '\'' | '"' => match quote {
                Some(q) if q == ch => quote = None,
                Some(_) => {}
                None => quote = Some(ch),
            },
            _ if quote.is_some() => {}
            _ if ch == open => depth += 1,
            _ if ch == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_array_basic() {
        let html = "<script>var devicesArr = [new Device(1,'a')];</script>";
        assert_eq!(locate_array(html), Some("new Device(1,'a')"));
    }

    #[test]
    fn locate_array_missing_marker() {
        assert_eq!(locate_array("<html><body>sign in</body></html>"), None);
    }

    #[test]
    fn locate_array_tolerates_nested_brackets_and_newlines() {
        let html = "junk devicesArr =\n[\nnew Device(1,'x',[new Channel('T','1','C')])\n]; more";
        let span = locate_array(html).unwrap();
        assert!(span.contains("new Channel('T','1','C')"));
        assert!(!span.contains("more"));
    }

    #[test]
    fn locate_array_ignores_brackets_in_quotes() {
        let html = "devicesArr = [new Device(1,'odd ] name')];";
        assert_eq!(locate_array(html), Some("new Device(1,'odd ] name')"));
    }

    #[test]
    fn split_constructors_two_blocks() {
        let span = "new Device(1,'a'), new Device(2,'b')";
        assert_eq!(split_constructors(span, "Device"), vec!["1,'a'", "2,'b'"]);
    }

    #[test]
    fn split_constructors_nested_parens() {
        let span = "new Device(1,[new Channel('T','1','C')],'x')";
        let blocks = split_constructors(span, "Device");
        assert_eq!(blocks, vec!["1,[new Channel('T','1','C')],'x'"]);
        let channels = split_constructors(blocks[0], "Channel");
        assert_eq!(channels, vec!["'T','1','C'"]);
    }

    #[test]
    fn split_constructors_none_found() {
        assert!(split_constructors("garbage [1,2,3]", "Device").is_empty());
    }

    #[test]
    fn split_constructors_drops_unterminated_block() {
        let span = "new Device(1,'a'), new Device(2,'b'";
        assert_eq!(split_constructors(span, "Device"), vec!["1,'a'"]);
    }

    #[test]
    fn split_args_plain() {
        assert_eq!(split_args("1,'a',2.5"), vec!["1", "'a'", "2.5"]);
    }

    #[test]
    fn split_args_comma_inside_quotes() {
        assert_eq!(
            split_args("'Office, North','22.1'"),
            vec!["'Office, North'", "'22.1'"]
        );
    }

    #[test]
    fn split_args_comma_inside_nested_list() {
        let args = "1,[new Channel('T','1','C'), new Channel('H','2','%')],9";
        let tokens = split_args(args);
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].starts_with('['));
        assert!(tokens[1].contains("'%'"));
    }

    #[test]
    fn split_args_escaped_comma() {
        assert_eq!(split_args(r"'a\,b',2"), vec![r"'a\,b'", "2"]);
    }

    #[test]
    fn split_args_empty_fields_survive() {
        assert_eq!(split_args("1,,''"), vec!["1", "", "''"]);
    }

    #[test]
    fn unquote_strips_quotes_and_space() {
        assert_eq!(unquote(" 'EL-USB-TC' "), "EL-USB-TC");
        assert_eq!(unquote("\"x\""), "x");
        assert_eq!(unquote(" 42 "), "42");
    }

    #[test]
    fn unquote_unescapes() {
        assert_eq!(unquote(r"'It\'s here'"), "It's here");
        assert_eq!(unquote(r"'a\,b'"), "a,b");
    }

    #[test]
    fn unquote_leaves_mismatched_quotes() {
        assert_eq!(unquote("'open"), "'open");
        assert_eq!(unquote("'"), "'");
    }
}
