use crate::domain::ports::PropertySource;
use crate::utils::error::{KclError, Result};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Key/value pairs in the `.properties` file format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(KclError::IoError)?;
        content.parse()
    }

    pub fn load<R: Read>(mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        content.parse()
    }

    pub fn store<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.to_string_pretty().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_string_pretty())?;
        Ok(())
    }

    /// Serializes all entries sorted by key, one `key=value` per line.
    pub fn to_string_pretty(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl From<BTreeMap<String, String>> for Properties {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromStr for Properties {
    type Err = KclError;

    fn from_str(content: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for line in logical_lines(content) {
            let (key, value) = split_entry(&line);
            entries.insert(unescape(key)?, unescape(value)?);
        }
        Ok(Self { entries })
    }
}

impl PropertySource for Properties {
    fn get_property(&self, key: &str) -> Option<&str> {
        self.get(key)
    }

    fn set_property(&mut self, key: &str, value: &str) {
        self.set(key, value);
    }

    fn remove_property(&mut self, key: &str) -> Option<String> {
        self.remove(key)
    }

    fn property_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Joins continued lines and drops blanks and comments.
fn logical_lines(content: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Option<String> = None;
    for raw in content.lines() {
        let line = raw.trim_start();
        match current.as_mut() {
            Some(buffer) => {
                if ends_with_continuation(line) {
                    buffer.push_str(&line[..line.len() - 1]);
                } else {
                    buffer.push_str(line);
                    result.extend(current.take());
                }
            }
            None => {
                if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                    continue;
                }
                if ends_with_continuation(line) {
                    current = Some(line[..line.len() - 1].to_string());
                } else {
                    result.push(line.to_string());
                }
            }
        }
    }
    result.extend(current);
    result
}

/// Splits at the first unescaped `=`, `:` or whitespace.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..idx], line[idx + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[idx..].trim_start();
                let rest = rest
                    .strip_prefix(['=', ':'])
                    .map(str::trim_start)
                    .unwrap_or(rest);
                return (&line[..idx], rest);
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(text: &str) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('f') => result.push('\u{0C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = Some(&hex)
                    .filter(|hex| hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32)
                    .ok_or_else(|| KclError::parse(text, format!("bad unicode escape '\\u{}'", hex)))?;
                result.push(code);
            }
            Some(other) => result.push(other),
            None => {}
        }
    }
    Ok(result)
}

fn escape(text: &str, is_key: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for (idx, ch) in text.chars().enumerate() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\t' => result.push_str("\\t"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\u{0C}' => result.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                result.push('\\');
                result.push(ch);
            }
            ' ' if is_key || idx == 0 => result.push_str("\\ "),
            c if (c as u32) < 0x20 => result.push_str(&format!("\\u{:04X}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators_and_comments() {
        let content = "# comment\n! other comment\n\nkey1=value1\nkey2 : value2\nkey3 value3\nempty=\n";
        let props: Properties = content.parse().unwrap();
        assert_eq!(props.len(), 4);
        assert_eq!(props.get("key1"), Some("value1"));
        assert_eq!(props.get("key2"), Some("value2"));
        assert_eq!(props.get("key3"), Some("value3"));
        assert_eq!(props.get("empty"), Some(""));
    }

    #[test]
    fn test_parse_continuation_lines() {
        let content = "list = one, \\\n       two, \\\n       three\nnext=1\n";
        let props: Properties = content.parse().unwrap();
        assert_eq!(props.get("list"), Some("one, two, three"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn test_parse_escapes() {
        let content = "path\\ with\\ spaces=C\\:\\\\temp\ngreeting=Gr\\u00fc\\u00dfe\\tall\n";
        let props: Properties = content.parse().unwrap();
        assert_eq!(props.get("path with spaces"), Some("C:\\temp"));
        assert_eq!(props.get("greeting"), Some("Grüße\tall"));
    }

    #[test]
    fn test_bad_unicode_escape() {
        assert!("key=\\u12".parse::<Properties>().is_err());
        assert!("key=\\u+123".parse::<Properties>().is_err());
        assert!("key=\\u-12a".parse::<Properties>().is_err());
        assert!("key=\\u00zz".parse::<Properties>().is_err());
    }

    #[test]
    fn test_store_then_load_keeps_special_characters() {
        let mut props = Properties::new();
        props.set("a key", "multi\nline = value");
        props.set("url", "http://host:8080/#frag");
        let mut buffer = Vec::new();
        props.store(&mut buffer).unwrap();

        let loaded = Properties::load(buffer.as_slice()).unwrap();
        assert_eq!(loaded, props);
    }
}
