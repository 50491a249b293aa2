// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Low-level HTML string scans.
//!
//! Deliberately naive and tailored to the dashboard's markup: the two
//! things we pull out of raw HTML are hidden form inputs on the login
//! page and the signed-in account label. Neither justifies a full
//! parser.

/// Returns the `value` attribute of the hidden `<input>` whose `name`
/// attribute equals `name`.
///
/// Handles both quote styles and attribute order within the tag. An
/// input that exists with an empty value yields `Some("")` — the
/// anti-forgery tokens are submitted verbatim either way.
pub(crate) fn hidden_input_value(html: &str, name: &str) -> Option<String> {
    let idx = find_attr(html, "name", name)?;
    let tag_start = html[..idx].rfind('<')?;
    let tag_end = idx + html[idx..].find('>')?;
    let tag = &html[tag_start..tag_end];
    attr_value(tag, "value")
}

/// Returns the text content of the `<span>` (or any element) with the
/// given `id`, with whitespace collapsed.
///
/// Reads up to the first closing tag, so nested markup truncates the
/// text — the account label upstream is plain text. `None` when the
/// element is absent or its text is empty.
pub(crate) fn element_text(html: &str, id: &str) -> Option<String> {
    let idx = find_attr(html, "id", id)?;
    let after_open = idx + html[idx..].find('>')? + 1;
    let close_rel = html[after_open..].find("</")?;
    let inner = &html[after_open..after_open + close_rel];
    let text = normalize_ws(inner);
    if text.is_empty() { None } else { Some(text) }
}

/// Finds the byte offset of an `attr="value"` (or single-quoted)
/// occurrence in the document.
fn find_attr(html: &str, attr: &str, value: &str) -> Option<usize> {
    let double = format!("{attr}=\"{value}\"");
    let single = format!("{attr}='{value}'");
    html.find(&double).or_else(|| html.find(&single))
}

/// Returns the value of `attr` within a single tag's text.
fn attr_value(tag: &str, attr: &str) -> Option<String> {
    let pat = format!("{attr}=");
    let start = tag.find(&pat)? + pat.len();
    let rest = &tag[start..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let inner = &rest[quote.len_utf8()..];
    let end = inner.find(quote)?;
    Some(inner[..end].to_string())
}

/// Collapses whitespace runs to single spaces and trims.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
