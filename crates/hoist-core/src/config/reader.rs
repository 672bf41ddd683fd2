//! Untyped nested-table access for pods reading their own configuration.
//!
//! Missing keys read as the zero value without error; a key holding the
//! wrong type is an error.

use std::path::Path;

use anyhow::Context;
use toml::{Table, Value};

use super::store::CONFIG_PATH_ENV;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigReader {
    table: Table,
}

impl ConfigReader {
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    /// Load the file named by `CONFIG_PATH`.
    pub fn load_from_environment() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No value was found for the environment variable {}",
                    CONFIG_PATH_ENV
                )
            })?;
        Self::load_file(Path::new(&path))
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let table: Table = toml::from_str(content)?;
        Ok(Self { table })
    }

    pub fn read(&self, key: &str) -> Option<&Value> {
        self.table.get(key)
    }

    pub fn read_string(&self, key: &str) -> anyhow::Result<String> {
        match self.read(key) {
            None => Ok(String::new()),
            Some(Value::String(value)) => Ok(value.clone()),
            Some(_) => anyhow::bail!("{} is not a string value", key),
        }
    }

    pub fn read_bool(&self, key: &str) -> anyhow::Result<bool> {
        match self.read(key) {
            None => Ok(false),
            Some(Value::Boolean(value)) => Ok(*value),
            Some(_) => anyhow::bail!("{} is not a bool value", key),
        }
    }

    /// Nested table under `key`; absent reads as an empty reader.
    pub fn read_map(&self, key: &str) -> anyhow::Result<ConfigReader> {
        match self.read(key) {
            None => Ok(ConfigReader::default()),
            Some(Value::Table(table)) => Ok(ConfigReader::from_table(table.clone())),
            Some(_) => anyhow::bail!("{} is not a map", key),
        }
    }

    pub fn read_string_slice(&self, key: &str) -> anyhow::Result<Vec<String>> {
        let items = match self.read(key) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => anyhow::bail!("{} is not a string slice", key),
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(value) => Ok(value.clone()),
                other => anyhow::bail!("{} is not a string", other),
            })
            .collect()
    }

    /// Top-level keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.table.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
name = "web"
debug = true
ports = ["8080", "8443"]
count = 3

[database]
host = "db.internal"
"#;

    fn reader() -> ConfigReader {
        ConfigReader::parse(SAMPLE).unwrap()
    }

    #[test]
    fn reads_typed_values() {
        let reader = reader();
        assert_eq!(reader.read_string("name").unwrap(), "web");
        assert!(reader.read_bool("debug").unwrap());
        assert_eq!(reader.read_string_slice("ports").unwrap(), vec!["8080", "8443"]);
        assert_eq!(
            reader.read_map("database").unwrap().read_string("host").unwrap(),
            "db.internal"
        );
    }

    #[test]
    fn missing_keys_read_as_zero_values() {
        let reader = reader();
        assert_eq!(reader.read_string("absent").unwrap(), "");
        assert!(!reader.read_bool("absent").unwrap());
        assert!(reader.read_string_slice("absent").unwrap().is_empty());
        assert!(reader.read_map("absent").unwrap().keys().is_empty());
        assert!(reader.read("absent").is_none());
    }

    #[test]
    fn wrong_types_are_errors() {
        let reader = reader();
        assert!(reader.read_string("count").is_err());
        assert!(reader.read_bool("name").is_err());
        assert!(reader.read_map("name").is_err());
        assert!(reader.read_string_slice("name").is_err());
    }

    #[test]
    fn non_string_list_items_are_errors() {
        let reader = ConfigReader::parse("ports = [8080, 8443]").unwrap();
        assert!(reader.read_string_slice("ports").is_err());
    }

    #[test]
    fn keys_are_sorted() {
        assert_eq!(
            reader().keys(),
            vec!["count", "database", "debug", "name", "ports"]
        );
    }
}
