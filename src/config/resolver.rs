use crate::config::properties::Properties;
use crate::domain::ports::PropertySource;
use crate::utils::error::Result;
use crate::utils::text::{cleanup, replace_all};
use std::collections::HashMap;

pub const DEFAULT_VAR_FORMAT: &str = "${%s}";
pub const DEFAULT_SYSTEM_PREFIX: &str = "sys";
pub const DEFAULT_ENV_PREFIX: &str = "env";

/// Substitutes variables like `${env:HOME}` within text.
///
/// Keys are embedded into the variable format at the time they are
/// registered, so [`PropertyResolver::with_var_format`] only affects keys
/// added afterwards. Variables without a registered value stay untouched.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    var_format: String,
    replacements: HashMap<String, String>,
}

impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyResolver {
    pub fn new() -> Self {
        Self {
            var_format: DEFAULT_VAR_FORMAT.to_string(),
            replacements: HashMap::new(),
        }
    }

    /// `%s` marks the position of the key. `None` restores `${%s}`.
    pub fn with_var_format(mut self, var_format: Option<&str>) -> Self {
        self.var_format = var_format.unwrap_or(DEFAULT_VAR_FORMAT).to_string();
        self
    }

    fn add<'a, I>(mut self, prefix: Option<&str>, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let prefix = cleanup(prefix);
        for (key, value) in entries {
            let key = match &prefix {
                Some(prefix) => format!("{}:{}", prefix, key),
                None => key.to_string(),
            };
            self.replacements
                .insert(self.var_format.replace("%s", &key), value.to_string());
        }
        self
    }

    pub fn with_map(self, prefix: Option<&str>, map: &HashMap<String, String>) -> Self {
        self.add(prefix, map.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn with_properties(self, prefix: Option<&str>, properties: &Properties) -> Self {
        self.add(prefix, properties.iter())
    }

    /// Registers the process environment. The prefix defaults to `env`.
    pub fn with_environment(self, prefix: Option<&str>) -> Self {
        let environment: HashMap<String, String> = std::env::vars().collect();
        self.with_environment_map(prefix, &environment)
    }

    pub fn with_environment_map(self, prefix: Option<&str>, map: &HashMap<String, String>) -> Self {
        let prefix = cleanup(prefix).unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string());
        self.with_map(Some(&prefix), map)
    }

    /// Registers information about the running system. The prefix defaults
    /// to `sys`.
    pub fn with_system_info(self, prefix: Option<&str>) -> Self {
        let prefix = cleanup(prefix).unwrap_or_else(|| DEFAULT_SYSTEM_PREFIX.to_string());
        let info = system_info();
        self.with_map(Some(&prefix), &info)
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    pub fn apply(&self, text: &str) -> Result<String> {
        replace_all(text, &self.replacements)
    }

    /// Resolves every value of the supplied source in place.
    pub fn apply_to<S: PropertySource + ?Sized>(&self, source: &mut S) -> Result<()> {
        for key in source.property_keys() {
            let resolved = match source.get_property(&key) {
                Some(value) => self.apply(value)?,
                None => continue,
            };
            source.set_property(&key, &resolved);
        }
        Ok(())
    }
}

fn system_info() -> HashMap<String, String> {
    let mut info = HashMap::new();
    info.insert("os.name".to_string(), std::env::consts::OS.to_string());
    info.insert("os.arch".to_string(), std::env::consts::ARCH.to_string());
    info.insert("os.family".to_string(), std::env::consts::FAMILY.to_string());
    info.insert(
        "file.separator".to_string(),
        std::path::MAIN_SEPARATOR.to_string(),
    );
    let path_separator = if cfg!(windows) { ";" } else { ":" };
    info.insert("path.separator".to_string(), path_separator.to_string());
    let line_separator = if cfg!(windows) { "\r\n" } else { "\n" };
    info.insert("line.separator".to_string(), line_separator.to_string());
    if let Ok(dir) = std::env::current_dir() {
        info.insert("user.dir".to_string(), dir.display().to_string());
    }
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        info.insert(
            "user.home".to_string(),
            std::path::PathBuf::from(home).display().to_string(),
        );
    }
    info.insert(
        "temp.dir".to_string(),
        std::env::temp_dir().display().to_string(),
    );
    info
}
