use crate::adapters::fs::read_text;
use crate::utils::error::{KclError, Result};
use crate::utils::text::cleanup;
use regex::RegexBuilder;
use std::cmp::Ordering;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_COMMENT_PREFIX: &str = "#";

/// A list of literals to detect or strip from text. Entries are kept
/// longest first so that overlapping literals are removed greedily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blacklist {
    entries: Vec<String>,
    lowercase: Vec<String>,
    comment_prefix: String,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new()
    }
}

fn longest_first(a: &str, b: &str) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| a.cmp(b))
}

impl Blacklist {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            lowercase: Vec::new(),
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
        }
    }

    /// Blank prefixes fall back to `#`.
    pub fn with_comment_prefix(mut self, prefix: Option<&str>) -> Self {
        self.comment_prefix =
            cleanup(prefix).unwrap_or_else(|| DEFAULT_COMMENT_PREFIX.to_string());
        self
    }

    pub fn comment_prefix(&self) -> &str {
        &self.comment_prefix
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds the cleaned literal. Blank input and duplicates are ignored.
    pub fn add(&mut self, literal: &str) {
        let Some(value) = cleanup(Some(literal)) else {
            return;
        };
        if let Err(idx) = self
            .entries
            .binary_search_by(|probe| longest_first(probe, &value))
        {
            self.lowercase.insert(idx, value.to_lowercase());
            self.entries.insert(idx, value);
        }
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.lowercase.clear();
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        let content = read_text(path)
            .map_err(|e| KclError::wrap(e, format!("Failed to load blacklist {}", path.display())))?;
        self.add_lines(&content);
        Ok(self)
    }

    pub fn load_from<R: Read>(&mut self, mut reader: R) -> Result<&mut Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| KclError::wrap(e, "Failed to load blacklist"))?;
        self.add_lines(&content);
        Ok(self)
    }

    fn add_lines(&mut self, content: &str) {
        let before = self.entries.len();
        for line in content.lines() {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with(self.comment_prefix.as_str()) {
                self.add(line);
            }
        }
        tracing::debug!("Blacklist grew by {} entries", self.entries.len() - before);
    }

    fn matches<F>(&self, text: &str, ignore_case: bool, test: F) -> bool
    where
        F: Fn(&str, &str) -> bool,
    {
        if ignore_case {
            let text = text.to_lowercase();
            self.lowercase.iter().any(|entry| test(&text, entry))
        } else {
            self.entries.iter().any(|entry| test(text, entry))
        }
    }

    /// True when the text equals one of the entries.
    pub fn test(&self, text: &str, ignore_case: bool) -> bool {
        self.matches(text, ignore_case, |text, entry| text == entry)
    }

    pub fn starts_with(&self, text: &str, ignore_case: bool) -> bool {
        self.matches(text, ignore_case, |text, entry| text.starts_with(entry))
    }

    pub fn ends_with(&self, text: &str, ignore_case: bool) -> bool {
        self.matches(text, ignore_case, |text, entry| text.ends_with(entry))
    }

    pub fn contains(&self, text: &str, ignore_case: bool) -> bool {
        self.matches(text, ignore_case, |text, entry| text.contains(entry))
    }

    /// Removes every blacklisted literal from the text.
    pub fn cleanup(&self, text: &str, ignore_case: bool) -> Result<String> {
        self.cleanup_with(text, ignore_case, |_| {})
    }

    /// Like [`Blacklist::cleanup`] but `removed` sees every literal as it
    /// occurred in the text.
    pub fn cleanup_with<F>(&self, text: &str, ignore_case: bool, mut removed: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let mut result = text.to_string();
        for entry in &self.entries {
            let pattern = RegexBuilder::new(&regex::escape(entry))
                .case_insensitive(ignore_case)
                .build()?;
            if !pattern.is_match(&result) {
                continue;
            }
            for found in pattern.find_iter(&result) {
                removed(found.as_str());
            }
            result = pattern.replace_all(&result, "").into_owned();
        }
        Ok(result)
    }
}
