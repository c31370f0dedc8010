use crate::config::properties::Properties;
use crate::core::copier::ByteCopier;
use crate::core::tokenizer::LiteralTokenizer;
use crate::domain::constants::Encoding;
use crate::utils::error::{KclError, Result};
use regex::Regex;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use url::Url;
use walkdir::WalkDir;

const SINGLE_SEGMENT: &str = "([^/]+)";
const ANY_SEGMENTS: &str = "(.+)";

/// Turns a file system wildcard pattern into an anchored regex.
///
/// `*` matches inside a single path segment, `**` spans segments. All
/// other characters match literally. Paths are expected with `/` as
/// separator.
pub fn compile_filesystem_pattern(pattern: &str) -> Result<Regex> {
    let mut expression = String::from("^");
    if cfg!(any(windows, target_os = "macos")) {
        expression.insert_str(0, "(?i)");
    }
    for token in LiteralTokenizer::new(pattern, &["**", "*"]).with_delimiters_returned(true) {
        match token {
            "**" => expression.push_str(ANY_SEGMENTS),
            "*" => expression.push_str(SINGLE_SEGMENT),
            literal => expression.push_str(&regex::escape(literal)),
        }
    }
    expression.push('$');
    tracing::debug!("Compiled pattern '{}' to '{}'", pattern, expression);
    Ok(Regex::new(&expression)?)
}

/// Relative path using `/` on every platform.
fn relative_name(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Collects everything below `dir` sorted by name. The optional filter is
/// matched against the path relative to `dir`.
pub fn list_recursive<P: AsRef<Path>>(
    dir: P,
    include_files: bool,
    include_dirs: bool,
    filter: Option<&Regex>,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut result = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| KclError::wrap(e, format!("cannot walk {}", dir.display())))?;
        let file_type = entry.file_type();
        let wanted = (file_type.is_dir() && include_dirs) || (!file_type.is_dir() && include_files);
        if !wanted {
            continue;
        }
        if let Some(filter) = filter {
            match relative_name(dir, entry.path()) {
                Some(name) if filter.is_match(&name) => {}
                _ => continue,
            }
        }
        result.push(entry.into_path());
    }
    Ok(result)
}

/// Reads a UTF-8 file. A leading byte order mark is dropped.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let data = std::fs::read(path)?;
    Encoding::Utf8.decode(&data)
}

pub fn read_lines<P: AsRef<Path>>(path: P, trim: bool, keep_empty: bool) -> Result<Vec<String>> {
    let text = read_text(path)?;
    Ok(text
        .lines()
        .map(|line| if trim { line.trim() } else { line })
        .filter(|line| keep_empty || !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Writes the text, creating missing parent directories.
pub fn write_text<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

pub fn load_properties<P: AsRef<Path>>(path: P) -> Result<Properties> {
    Properties::from_file(path)
}

/// Copies a file through a [`ByteCopier`] with the given buffer size.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q, buffer_size: usize) -> Result<u64> {
    let mut reader = BufReader::new(File::open(from)?);
    let mut writer = BufWriter::new(File::create(to)?);
    ByteCopier::new()
        .with_buffer_size(buffer_size)
        .copy(&mut reader, &mut writer)
}

/// Only `file:` URLs can be mapped to a path.
pub fn url_to_path(url: &str) -> Result<PathBuf> {
    let parsed = Url::parse(url).map_err(|e| KclError::parse(url, e.to_string()))?;
    if parsed.scheme() != "file" {
        return Err(KclError::InvalidValueError {
            field: "url".to_string(),
            value: url.to_string(),
            reason: format!("scheme '{}' is not supported", parsed.scheme()),
        });
    }
    parsed
        .to_file_path()
        .map_err(|_| KclError::parse(url, "not a local file path"))
}

/// The path must be absolute.
pub fn path_to_url<P: AsRef<Path>>(path: P) -> Result<Url> {
    let path = path.as_ref();
    Url::from_file_path(path).map_err(|_| KclError::InvalidValueError {
        field: "path".to_string(),
        value: path.display().to_string(),
        reason: "path must be absolute".to_string(),
    })
}
