use std::path::Path;

use super::file::{from_toml, load_defaults_file};
use super::routing::{RoutingRef, ROUTING_KEY};
use super::value::Value;
use super::ConfigError;

/// Ordered option names with their example values.
///
/// Each example fixes the kind its environment variable is read as. Options
/// keep insertion order; re-adding a name replaces its example in place.
///
/// ## Example
///
/// ```
/// use dragon_standalone::Defaults;
///
/// let defaults = Defaults::new()
///     .with("DEBUG", false)
///     .with("PORT", 8000)
///     .with("ALLOWED_HOSTS", vec!["localhost"]);
///
/// assert_eq!(defaults.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Defaults {
    options: Vec<(String, Value)>,
}

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option with its example value.
    pub fn with(mut self, name: impl Into<String>, example: impl Into<Value>) -> Self {
        self.insert(name, example);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, example: impl Into<Value>) {
        let name = name.into();
        let example = example.into();
        match self.options.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = example,
            None => self.options.push((name, example)),
        }
    }

    /// Loads top-level keys of a TOML file as options, in file order.
    ///
    /// If `required` is `false`, a missing file yields empty defaults.
    pub fn from_toml_file(path: impl AsRef<Path>, required: bool) -> Result<Self, ConfigError> {
        let table = load_defaults_file(path.as_ref(), required)?;
        Ok(table.map(Self::from_table).unwrap_or_default())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: "<string>".into(),
            source: e,
        })?;
        Ok(Self::from_table(table))
    }

    fn from_table(table: toml::Table) -> Self {
        table
            .into_iter()
            .map(|(name, value)| (name, from_toml(value)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// A routing source given as a dotted path under the reserved key.
    pub(crate) fn routing_hint(&self) -> Option<RoutingRef> {
        self.get(ROUTING_KEY)
            .and_then(Value::as_str)
            .map(RoutingRef::dotted_path)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Defaults {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut defaults = Defaults::new();
        for (name, example) in iter {
            defaults.insert(name, example);
        }
        defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let defaults = Defaults::new().with("B", 1).with("A", 2).with("B", 3);
        let names: Vec<&str> = defaults.iter().map(|(name, _)| name).collect();

        assert_eq!(names, ["B", "A"]);
        assert_eq!(defaults.get("B"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_from_toml_str() {
        let defaults = Defaults::from_toml_str(
            r#"
            DEBUG = true
            SECRET_KEY = "dev"
            ALLOWED_HOSTS = ["localhost"]
            "#,
        )
        .unwrap();

        assert_eq!(defaults.get("DEBUG"), Some(&Value::Bool(true)));
        assert_eq!(defaults.get("SECRET_KEY"), Some(&Value::from("dev")));
        assert_eq!(
            defaults.get("ALLOWED_HOSTS"),
            Some(&Value::from(vec!["localhost"]))
        );
    }

    #[test]
    fn test_missing_optional_file_is_empty() {
        let defaults = Defaults::from_toml_file("/nonexistent/defaults.toml", false).unwrap();
        assert!(defaults.is_empty());
    }

    #[test]
    fn test_routing_hint() {
        let defaults = Defaults::new().with(ROUTING_KEY, "shop.urls");
        let routing = defaults.routing_hint().unwrap();
        assert_eq!(routing.as_dotted_path(), Some("shop.urls"));

        assert!(Defaults::new().with(ROUTING_KEY, 1).routing_hint().is_none());
    }
}
