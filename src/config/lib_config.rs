use crate::core::copier::DEFAULT_BUFFER_SIZE;
use crate::config::resolver::DEFAULT_VAR_FORMAT;
use crate::utils::error::{KclError, Result};
use crate::utils::validation::{
    validate_contains, validate_disjoint, validate_non_empty_string, validate_positive_number,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const TRUE_VALUES: [&str; 8] = ["true", "ja", "yes", "on", "ein", "an", "1", "-1"];
const FALSE_VALUES: [&str; 6] = ["false", "nein", "no", "off", "aus", "0"];

/// Library wide settings, loadable from a TOML file:
///
/// ```toml
/// [booleans]
/// true_values = ["true", "yes"]
/// false_values = ["false", "no"]
///
/// [io]
/// buffer_size = 16384
///
/// [text]
/// default_var_format = "${%s}"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibConfig {
    pub booleans: BooleanConfig,
    pub io: IoConfig,
    pub text: TextConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanConfig {
    pub true_values: Vec<String>,
    pub false_values: Vec<String>,
}

impl Default for BooleanConfig {
    fn default() -> Self {
        Self {
            true_values: TRUE_VALUES.iter().map(|s| s.to_string()).collect(),
            false_values: FALSE_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub buffer_size: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub default_var_format: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_var_format: DEFAULT_VAR_FORMAT.to_string(),
        }
    }
}

impl LibConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(KclError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value. Unknown variables are
    /// kept as they are.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Maps the configured words to a boolean. Matching ignores case and
    /// surrounding whitespace.
    pub fn parse_boolean(&self, text: &str) -> Option<bool> {
        let text = text.trim();
        let matches = |values: &[String]| values.iter().any(|v| v.eq_ignore_ascii_case(text));
        if matches(self.booleans.true_values.as_slice()) {
            Some(true)
        } else if matches(self.booleans.false_values.as_slice()) {
            Some(false)
        } else {
            None
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.io.buffer_size
    }

    pub fn var_format(&self) -> &str {
        &self.text.default_var_format
    }
}

impl Validate for LibConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("io.buffer_size", self.io.buffer_size, 1)?;
        validate_non_empty_string("text.default_var_format", &self.text.default_var_format)?;
        validate_contains("text.default_var_format", &self.text.default_var_format, "%s")?;
        validate_disjoint(
            "booleans",
            &self.booleans.true_values,
            &self.booleans.false_values,
        )?;
        Ok(())
    }
}
