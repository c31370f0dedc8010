//! String helpers used throughout the crate.
//!
//! Most functions work on `&str` and return owned `String`s. Blank handling
//! follows one rule: [`cleanup`] trims and turns empty text into `None`.

use crate::utils::error::Result;
use regex::Regex;
use std::collections::HashMap;

pub const WHITESPACES: &str = " \t\r\n";

/// Trims the input. Returns `None` when nothing is left.
pub fn cleanup(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strips everything from the last `.` of the final path segment on. A
/// leading `.` (as in `.bashrc`) does not start a suffix.
pub fn remove_suffix(name: &str) -> &str {
    let segment_start = name.rfind(['/', '\\']).map_or(0, |idx| idx + 1);
    match name[segment_start..].rfind('.') {
        Some(idx) if idx > 0 => &name[..segment_start + idx],
        _ => name,
    }
}

/// Replaces the suffix or appends one if there is none.
pub fn change_suffix(name: &str, suffix: &str) -> String {
    format!("{}.{}", remove_suffix(name), suffix)
}

pub fn first_up(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn first_down(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Removes every non-alphanumeric character and uppercases the character
/// following it. The first character is lowercased.
///
/// `"my-simple_name"` becomes `"mySimpleName"`.
pub fn camel_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut upper_next = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if upper_next {
                result.extend(ch.to_uppercase());
            } else {
                result.push(ch);
            }
            upper_next = false;
        } else {
            upper_next = !result.is_empty();
        }
    }
    first_down(&result)
}

/// Plain, non-regex replacement of every occurrence.
pub fn replace_literally_all(input: &str, search: &str, replacement: &str) -> String {
    if search.is_empty() {
        return input.to_string();
    }
    input.replace(search, replacement)
}

/// Replaces all keys of `replacements` in a single pass. Longer keys take
/// precedence over shorter ones sharing a prefix.
pub fn replace_all(input: &str, replacements: &HashMap<String, String>) -> Result<String> {
    replace_all_formatted(input, replacements, "%s")
}

/// Like [`replace_all`], but every key is first embedded into `key_format`
/// (`%s` marks the key), e.g. `"${%s}"` replaces `${name}`.
pub fn replace_all_formatted(
    input: &str,
    replacements: &HashMap<String, String>,
    key_format: &str,
) -> Result<String> {
    let mut entries: Vec<(String, &String)> = replacements
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key_format.replace("%s", key), value))
        .collect();
    if entries.is_empty() {
        return Ok(input.to_string());
    }
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

    let alternation = entries
        .iter()
        .map(|(key, _)| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&alternation)?;
    let lookup: HashMap<&str, &String> = entries
        .iter()
        .map(|(key, value)| (key.as_str(), *value))
        .collect();

    let replaced = pattern.replace_all(input, |caps: &regex::Captures| {
        let matched = &caps[0];
        lookup
            .get(matched)
            .map(|v| v.to_string())
            .unwrap_or_else(|| matched.to_string())
    });
    Ok(replaced.into_owned())
}

/// Replaces each region delimited by `open` and `close` (both included) with
/// the value computed from the enclosed text. An unclosed region is kept.
pub fn replace_regions<F>(input: &str, open: &str, close: &str, mut replacement: F) -> String
where
    F: FnMut(&str) -> String,
{
    if open.is_empty() || close.is_empty() {
        return input.to_string();
    }
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(open) {
        let inner_start = start + open.len();
        match rest[inner_start..].find(close) {
            Some(offset) => {
                let inner_end = inner_start + offset;
                result.push_str(&rest[..start]);
                result.push_str(&replacement(&rest[inner_start..inner_end]));
                rest = &rest[inner_end + close.len()..];
            }
            None => break,
        }
    }
    result.push_str(rest);
    result
}

pub fn starts_with_many<'a, S: AsRef<str>>(
    input: &str,
    candidates: &'a [S],
    case_sensitive: bool,
) -> Option<&'a str> {
    let haystack = fold(input, case_sensitive);
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|c| haystack.starts_with(&fold(c, case_sensitive)))
}

pub fn ends_with_many<'a, S: AsRef<str>>(
    input: &str,
    candidates: &'a [S],
    case_sensitive: bool,
) -> Option<&'a str> {
    let haystack = fold(input, case_sensitive);
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|c| haystack.ends_with(&fold(c, case_sensitive)))
}

fn fold(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Trims the supplied characters. `left`: `None` trims both ends,
/// `Some(true)` only the start, `Some(false)` only the end.
pub fn trim_chars<'a>(input: &'a str, chars: &str, left: Option<bool>) -> &'a str {
    let matcher = |c: char| chars.contains(c);
    match left {
        None => input.trim_matches(matcher),
        Some(true) => input.trim_start_matches(matcher),
        Some(false) => input.trim_end_matches(matcher),
    }
}

pub fn trim_whitespace(input: &str, left: Option<bool>) -> &str {
    trim_chars(input, WHITESPACES, left)
}

/// Joins the non-empty items.
pub fn concatenate<S: AsRef<str>>(delimiter: &str, items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(delimiter)
}

pub fn repeat(count: usize, text: &str) -> String {
    text.repeat(count)
}

pub fn fill_string(count: usize, ch: char) -> String {
    std::iter::repeat(ch).take(count).collect()
}

/// Cuts the text down to `limit` characters.
pub fn limit(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pads (or cuts) the text to exactly `limit` characters. With `align_left`
/// the text comes first and the padding follows.
pub fn padding(text: &str, limit_to: usize, pad: char, align_left: bool) -> String {
    let text = limit(text, limit_to);
    let fill = fill_string(limit_to - text.chars().count(), pad);
    if align_left {
        format!("{}{}", text, fill)
    } else {
        format!("{}{}", fill, text)
    }
}

pub fn to_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Byte ranges of all matches of `pattern` in `text`.
pub fn regex_regions(pattern: &Regex, text: &str) -> Vec<(usize, usize)> {
    pattern
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect()
}
