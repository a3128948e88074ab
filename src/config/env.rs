use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, error};

use super::coerce::coercer_for;
use super::kind::ValueKind;
use super::source::{EnvSource, ProcessEnv};
use super::value::Value;
use super::ConfigError;

/// Names of the environment variables that were present and read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenEnvKeys(BTreeSet<String>);

impl SeenEnvKeys {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for SeenEnvKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        f.write_str(&names.join(", "))
    }
}

/// Reads environment variables as typed values, tracking which were present.
#[derive(Debug)]
pub struct TypedEnv<S = ProcessEnv> {
    source: S,
    seen: SeenEnvKeys,
}

impl<S: EnvSource> TypedEnv<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            seen: SeenEnvKeys::default(),
        }
    }

    /// Reads `name` and coerces it according to `kind`.
    ///
    /// An absent variable yields `default` unchanged. Text that does not parse
    /// under `kind` is a [`ConfigError::Coercion`]. Unsupported kinds log an
    /// error and yield `default` without consulting the environment.
    pub fn read(
        &mut self,
        name: &str,
        kind: ValueKind,
        default: &Value,
    ) -> Result<Value, ConfigError> {
        let Some(coerce) = coercer_for(kind) else {
            error!(option = name, "can't currently read {name} from the environment");
            return Ok(default.clone());
        };

        let Some(raw) = self.source.var(name) else {
            return Ok(default.clone());
        };

        let value = coerce(&raw, default).ok_or_else(|| ConfigError::Coercion {
            name: name.to_string(),
            kind,
            raw: raw.clone(),
        })?;

        debug!(option = name, %kind, "read option from environment");
        self.seen.0.insert(name.to_string());
        Ok(value)
    }

    pub fn seen(&self) -> &SeenEnvKeys {
        &self.seen
    }

    pub fn into_seen(self) -> SeenEnvKeys {
        self.seen
    }
}
