//! Typed access to textual key/value stores.
//!
//! A property knows its key, how to convert its text and whether it must be
//! present. Lists are stored as `key[0]`, `key[1]`, ... and maps as
//! `key[name]`.

use crate::config::lib_config::LibConfig;
use crate::domain::ports::{PropertySource, TypeAdapter};
use crate::domain::version::Version;
use crate::utils::error::{KclError, Result};
use crate::utils::text::cleanup;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// Adapter for every type with a `FromStr`/`Display` pair.
#[derive(Debug)]
pub struct FromStrAdapter<T> {
    _type: PhantomData<fn() -> T>,
}

impl<T> Default for FromStrAdapter<T> {
    fn default() -> Self {
        Self { _type: PhantomData }
    }
}

impl<T> Clone for FromStrAdapter<T> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<T> TypeAdapter<T> for FromStrAdapter<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    fn unmarshal(&self, text: &str) -> Result<T> {
        text.parse::<T>()
            .map_err(|e| KclError::parse(text, e.to_string()))
    }

    fn marshal(&self, value: &T) -> String {
        value.to_string()
    }
}

pub type VersionAdapter = FromStrAdapter<Version>;

/// Accepts the configured words for `true` and `false`, case-insensitively.
#[derive(Debug, Clone)]
pub struct BooleanAdapter {
    config: LibConfig,
}

impl Default for BooleanAdapter {
    fn default() -> Self {
        Self::new(LibConfig::default())
    }
}

impl BooleanAdapter {
    pub fn new(config: LibConfig) -> Self {
        Self { config }
    }
}

impl TypeAdapter<bool> for BooleanAdapter {
    fn unmarshal(&self, text: &str) -> Result<bool> {
        self.config
            .parse_boolean(text)
            .ok_or_else(|| KclError::parse(text, "not a boolean"))
    }

    fn marshal(&self, value: &bool) -> String {
        value.to_string()
    }
}

fn read_cleaned<S: PropertySource + ?Sized>(source: &S, key: &str) -> Option<String> {
    cleanup(source.get_property(key))
}

#[derive(Debug, Clone)]
pub struct SimpleProperty<T, A> {
    key: String,
    adapter: A,
    required: bool,
    description: Option<String>,
    default: Option<T>,
}

impl<T: Clone, A: TypeAdapter<T>> SimpleProperty<T, A> {
    pub fn new(key: impl Into<String>, adapter: A) -> Self {
        Self {
            key: key.into(),
            adapter,
            required: false,
            description: None,
            default: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the default from its textual form.
    pub fn with_textual_default(mut self, default: &str) -> Result<Self> {
        self.default = Some(self.adapter.unmarshal(default)?);
        Ok(self)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn value<S: PropertySource + ?Sized>(&self, source: &S) -> Result<Option<T>> {
        let value = match read_cleaned(source, &self.key) {
            Some(text) => Some(self.adapter.unmarshal(&text)?),
            None => self.default.clone(),
        };
        if value.is_none() && self.required {
            return Err(KclError::MissingPropertyError {
                property: self.key.clone(),
            });
        }
        Ok(value)
    }

    pub fn textual_value<S: PropertySource + ?Sized>(&self, source: &S) -> Result<Option<String>> {
        Ok(self.value(source)?.map(|v| self.adapter.marshal(&v)))
    }

    /// `None` removes the key.
    pub fn set_value<S: PropertySource + ?Sized>(&self, source: &mut S, value: Option<&T>) {
        match value {
            Some(value) => source.set_property(&self.key, &self.adapter.marshal(value)),
            None => {
                source.remove_property(&self.key);
            }
        }
    }
}

fn indexed_key_pattern(key: &str, index: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r"^{}\s*\[\s*({})\s*\]$",
        regex::escape(key),
        index
    ))?)
}

fn remove_matching<S: PropertySource + ?Sized>(source: &mut S, pattern: &Regex) {
    for key in source.property_keys() {
        if pattern.is_match(&key) {
            source.remove_property(&key);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListProperty<T, A> {
    key: String,
    adapter: A,
    required: bool,
    default: Option<Vec<T>>,
    pattern: Regex,
}

impl<T: Clone, A: TypeAdapter<T>> ListProperty<T, A> {
    pub fn new(key: impl Into<String>, adapter: A) -> Result<Self> {
        let key = key.into();
        let pattern = indexed_key_pattern(&key, r"\d+")?;
        Ok(Self {
            key,
            adapter,
            required: false,
            default: None,
            pattern,
        })
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, default: Vec<T>) -> Self {
        self.default = Some(default);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Values ordered by their index. Gaps in the numbering are skipped.
    pub fn value<S: PropertySource + ?Sized>(&self, source: &S) -> Result<Vec<T>> {
        let mut indexed: BTreeMap<u64, String> = BTreeMap::new();
        for key in source.property_keys() {
            let Some(caps) = self.pattern.captures(&key) else {
                continue;
            };
            let index = caps[1]
                .parse::<u64>()
                .map_err(|e| KclError::parse(key.as_str(), e.to_string()))?;
            if let Some(text) = read_cleaned(source, &key) {
                indexed.insert(index, text);
            }
        }

        let values = if indexed.is_empty() {
            self.default.clone().unwrap_or_default()
        } else {
            indexed
                .values()
                .map(|text| self.adapter.unmarshal(text))
                .collect::<Result<Vec<T>>>()?
        };
        if values.is_empty() && self.required {
            return Err(KclError::MissingPropertyError {
                property: self.key.clone(),
            });
        }
        Ok(values)
    }

    /// Replaces all existing entries of this list.
    pub fn set_value<S: PropertySource + ?Sized>(&self, source: &mut S, values: &[T]) {
        remove_matching(source, &self.pattern);
        for (index, value) in values.iter().enumerate() {
            let key = format!("{}[{}]", self.key, index);
            source.set_property(&key, &self.adapter.marshal(value));
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapProperty<T, A> {
    key: String,
    adapter: A,
    required: bool,
    default: Option<BTreeMap<String, T>>,
    pattern: Regex,
}

impl<T: Clone, A: TypeAdapter<T>> MapProperty<T, A> {
    pub fn new(key: impl Into<String>, adapter: A) -> Result<Self> {
        let key = key.into();
        let pattern = indexed_key_pattern(&key, r"[^\]]+?")?;
        Ok(Self {
            key,
            adapter,
            required: false,
            default: None,
            pattern,
        })
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Entries found in the source are merged over these defaults.
    pub fn with_default(mut self, default: BTreeMap<String, T>) -> Self {
        self.default = Some(default);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value<S: PropertySource + ?Sized>(&self, source: &S) -> Result<BTreeMap<String, T>> {
        let mut result = self.default.clone().unwrap_or_default();
        for key in source.property_keys() {
            let Some(caps) = self.pattern.captures(&key) else {
                continue;
            };
            let name = caps[1].to_string();
            if let Some(text) = read_cleaned(source, &key) {
                result.insert(name, self.adapter.unmarshal(&text)?);
            }
        }
        if result.is_empty() && self.required {
            return Err(KclError::MissingPropertyError {
                property: self.key.clone(),
            });
        }
        Ok(result)
    }

    /// Replaces all existing entries of this map.
    pub fn set_value<S: PropertySource + ?Sized>(&self, source: &mut S, values: &BTreeMap<String, T>) {
        remove_matching(source, &self.pattern);
        for (name, value) in values {
            let key = format!("{}[{}]", self.key, name);
            source.set_property(&key, &self.adapter.marshal(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::properties::Properties;
    use crate::utils::error::FailureCode;
    use std::collections::HashMap;

    fn source(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_property_with_default() {
        let port = SimpleProperty::new("port", FromStrAdapter::<u16>::default()).with_default(8080);
        assert_eq!(port.value(&source(&[])).unwrap(), Some(8080));
        assert_eq!(port.value(&source(&[("port", " 9000 ")])).unwrap(), Some(9000));
        assert_eq!(port.value(&source(&[("port", "   ")])).unwrap(), Some(8080));
    }

    #[test]
    fn test_required_property_missing() {
        let host = SimpleProperty::new("host", FromStrAdapter::<String>::default()).required(true);
        let err = host.value(&source(&[])).unwrap_err();
        assert_eq!(err.failure_code(), FailureCode::MissingProperty);
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_conversion_failure() {
        let port = SimpleProperty::new("port", FromStrAdapter::<u16>::default());
        let err = port.value(&source(&[("port", "eighty")])).unwrap_err();
        assert_eq!(err.failure_code(), FailureCode::ConversionFailure);
    }

    #[test]
    fn test_simple_property_set_and_remove() {
        let mut props = Properties::new();
        let enabled = SimpleProperty::new("enabled", BooleanAdapter::default());
        enabled.set_value(&mut props, Some(&true));
        assert_eq!(props.get("enabled"), Some("true"));
        enabled.set_value(&mut props, None);
        assert!(props.is_empty());
    }

    #[test]
    fn test_boolean_adapter_accepts_configured_words() {
        let adapter = BooleanAdapter::default();
        assert!(adapter.unmarshal("Ja").unwrap());
        assert!(!adapter.unmarshal("off").unwrap());
        assert!(adapter.unmarshal("maybe").is_err());
    }

    #[test]
    fn test_textual_default_and_version_adapter() {
        let min = SimpleProperty::new("min.version", VersionAdapter::default())
            .with_textual_default("1.2.3")
            .unwrap();
        assert_eq!(
            min.textual_value(&source(&[])).unwrap(),
            Some("1.2.3".to_string())
        );
    }

    #[test]
    fn test_list_property_sorted_by_index() {
        let list = ListProperty::new("hosts", FromStrAdapter::<String>::default()).unwrap();
        let src = source(&[
            ("hosts[10]", "c"),
            ("hosts[ 2 ]", "b"),
            ("hosts [0]", "a"),
            ("hosts[x]", "ignored"),
            ("hostsextra[1]", "ignored"),
            ("hosts[3]", "  "),
        ]);
        assert_eq!(list.value(&src).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_property_set_value_replaces() {
        let list = ListProperty::new("ids", FromStrAdapter::<u32>::default()).unwrap();
        let mut src = source(&[("ids[0]", "1"), ("ids[7]", "8"), ("other", "x")]);
        list.set_value(&mut src, &[5, 6]);
        assert_eq!(src.len(), 3);
        assert_eq!(list.value(&src).unwrap(), vec![5, 6]);
        assert_eq!(src.get("other").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_required_list_property() {
        let list = ListProperty::new("ids", FromStrAdapter::<u32>::default())
            .unwrap()
            .required(true);
        assert!(list.value(&source(&[])).is_err());
        let with_default = ListProperty::new("ids", FromStrAdapter::<u32>::default())
            .unwrap()
            .with_default(vec![1]);
        assert_eq!(with_default.value(&source(&[])).unwrap(), vec![1]);
    }

    #[test]
    fn test_map_property_merges_defaults() {
        let mut defaults = BTreeMap::new();
        defaults.insert("timeout".to_string(), 30);
        defaults.insert("retries".to_string(), 3);
        let map = MapProperty::new("net", FromStrAdapter::<u32>::default())
            .unwrap()
            .with_default(defaults);

        let src = source(&[("net[timeout]", "60"), ("net[ port ]", "80")]);
        let value = map.value(&src).unwrap();
        assert_eq!(value.len(), 3);
        assert_eq!(value["timeout"], 60);
        assert_eq!(value["retries"], 3);
        assert_eq!(value["port"], 80);
    }

    #[test]
    fn test_map_property_set_value_replaces() {
        let map = MapProperty::new("colors", FromStrAdapter::<String>::default()).unwrap();
        let mut props = Properties::new();
        props.set("colors[old]", "grey");
        let mut values = BTreeMap::new();
        values.insert("fg".to_string(), "black".to_string());
        map.set_value(&mut props, &values);
        assert_eq!(props.get("colors[old]"), None);
        assert_eq!(props.get("colors[fg]"), Some("black"));
        assert!(MapProperty::new("colors", FromStrAdapter::<String>::default())
            .unwrap()
            .required(true)
            .value(&Properties::new())
            .is_err());
    }
}
