//! File-based option defaults.

use std::path::Path;

use toml::Value as TomlValue;

use super::value::Value;
use super::ConfigError;

/// Loads and parses a TOML defaults file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
pub(crate) fn load_defaults_file(
    path: &Path,
    required: bool,
) -> Result<Option<toml::Table>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Converts a TOML value into an example value. Datetimes become text.
pub(crate) fn from_toml(value: TomlValue) -> Value {
    match value {
        TomlValue::String(s) => Value::Text(s),
        TomlValue::Integer(i) => Value::Integer(i),
        TomlValue::Float(f) => Value::Float(f),
        TomlValue::Boolean(b) => Value::Bool(b),
        TomlValue::Datetime(dt) => Value::Text(dt.to_string()),
        TomlValue::Array(items) => Value::List(items.into_iter().map(from_toml).collect()),
        TomlValue::Table(table) => Value::Map(
            table
                .into_iter()
                .map(|(k, v)| (k, from_toml(v)))
                .collect(),
        ),
    }
}
