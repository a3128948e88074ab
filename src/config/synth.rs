//! One-shot synthesis of the resolved configuration.

use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::defaults::Defaults;
use super::env::{SeenEnvKeys, TypedEnv};
use super::kind::classify;
use super::routing::{RoutingRef, ROUTING_KEY};
use super::source::{EnvSource, ProcessEnv};
use super::value::Value;
use super::ConfigError;

/// The finished configuration handed to the web framework.
///
/// Holds one coerced value per declared option, in declaration order, and the
/// routing reference that travels under [`ROUTING_KEY`].
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    options: Vec<(String, Value)>,
    routing: RoutingRef,
    seen: SeenEnvKeys,
}

impl ResolvedConfig {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// True for every declared option and for [`ROUTING_KEY`].
    pub fn contains(&self, name: &str) -> bool {
        name == ROUTING_KEY || self.get(name).is_some()
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

    pub fn routing(&self) -> &RoutingRef {
        &self.routing
    }

    /// The environment variables that overrode a default.
    pub fn seen_env(&self) -> &SeenEnvKeys {
        &self.seen
    }

    /// Deserializes the options into a typed struct.
    ///
    /// Decimals and UUIDs are presented as strings.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let object = self
            .options
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }
}

/// Builds a [`ResolvedConfig`] at most once.
///
/// The first successful [`synthesize`](Self::synthesize) fixes the result;
/// every later call fails with [`ConfigError::AlreadyConfigured`] and leaves it
/// untouched.
#[derive(Debug, Default)]
pub struct Synthesizer {
    resolved: OnceLock<Arc<ResolvedConfig>>,
}

impl Synthesizer {
    pub const fn new() -> Self {
        Self {
            resolved: OnceLock::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub fn get(&self) -> Option<Arc<ResolvedConfig>> {
        self.resolved.get().cloned()
    }

    /// Resolves every option in `defaults` against `env`.
    ///
    /// `routing` falls back to a dotted path stored under [`ROUTING_KEY`] in
    /// `defaults`; with neither, synthesis fails with
    /// [`ConfigError::MissingRoutingSource`].
    pub fn synthesize<S: EnvSource>(
        &self,
        routing: Option<RoutingRef>,
        defaults: &Defaults,
        env: S,
    ) -> Result<Arc<ResolvedConfig>, ConfigError> {
        if self.is_configured() {
            return Err(ConfigError::AlreadyConfigured);
        }

        let resolved = Arc::new(resolve(routing, defaults, env)?);
        self.resolved
            .set(Arc::clone(&resolved))
            .map_err(|_| ConfigError::AlreadyConfigured)?;
        Ok(resolved)
    }
}

fn resolve<S: EnvSource>(
    routing: Option<RoutingRef>,
    defaults: &Defaults,
    env: S,
) -> Result<ResolvedConfig, ConfigError> {
    let routing = routing
        .or_else(|| defaults.routing_hint())
        .filter(|routing| !routing.is_empty())
        .ok_or(ConfigError::MissingRoutingSource)?;

    let mut env = TypedEnv::new(env);
    let mut options = Vec::with_capacity(defaults.len());

    for (name, example) in defaults.iter() {
        if name == ROUTING_KEY {
            continue;
        }

        let kind = classify(example);
        let value = env.read(name, kind, example)?;

        if !matches!(value, Value::Bool(_)) && value.is_falsy() {
            warn!(option = name, %value, "config value {name}={value} evaluates as falsey");
        }
        options.push((name.to_string(), value));
    }

    debug!(options = options.len(), routing = %routing, "configuration resolved");

    Ok(ResolvedConfig {
        options,
        routing,
        seen: env.into_seen(),
    })
}

static PROCESS: Synthesizer = Synthesizer::new();

/// Synthesizes the process-wide configuration from the process environment.
///
/// May succeed once per process; see [`Synthesizer`].
pub fn configure(
    routing: Option<RoutingRef>,
    defaults: &Defaults,
) -> Result<Arc<ResolvedConfig>, ConfigError> {
    PROCESS.synthesize(routing, defaults, ProcessEnv)
}

/// The process-wide configuration, once [`configure`] has succeeded.
pub fn configured() -> Option<Arc<ResolvedConfig>> {
    PROCESS.get()
}

pub(crate) fn process_synthesizer() -> &'static Synthesizer {
    &PROCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::routing::urlconf;
    use crate::config::source::MapEnv;
    use crate::test_support::capture_logs;
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use uuid::Uuid;

    fn routes() -> Option<RoutingRef> {
        Some(urlconf("site.urls"))
    }

    #[test]
    fn test_environment_overrides_default() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new().with("DEBUG", true);
        let env = MapEnv::new().with("DEBUG", "false");

        let config = synth.synthesize(routes(), &defaults, env).unwrap();

        assert_eq!(config.get("DEBUG"), Some(&Value::Bool(false)));
        assert!(config.seen_env().contains("DEBUG"));
    }

    #[test]
    fn test_absent_variables_keep_examples() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new()
            .with("SECRET_KEY", "dev")
            .with("PRICE", Decimal::new(995, 2))
            .with("INSTANCE", Uuid::from_u128(1))
            .with("ALLOWED_HOSTS", Value::tuple(Vec::<Value>::new()));

        let config = synth.synthesize(routes(), &defaults, MapEnv::new()).unwrap();

        for (name, example) in defaults.iter() {
            assert_eq!(config.get(name), Some(example));
        }
        assert!(config.seen_env().is_empty());
    }

    #[test]
    fn test_coercion_failure_names_the_variable() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new().with("PORT", 8000);
        let env = MapEnv::new().with("PORT", "notanumber");

        let err = synth.synthesize(routes(), &defaults, env).unwrap_err();

        assert!(matches!(err, ConfigError::Coercion { ref name, .. } if name == "PORT"));
        assert!(err.to_string().contains("PORT"));
        assert!(!synth.is_configured());
    }

    #[test]
    fn test_second_synthesis_is_rejected() {
        let synth = Synthesizer::new();
        let first = synth
            .synthesize(routes(), &Defaults::new().with("PORT", 8000), MapEnv::new())
            .unwrap();

        let err = synth
            .synthesize(routes(), &Defaults::new().with("PORT", 9000), MapEnv::new())
            .unwrap_err();

        assert!(matches!(err, ConfigError::AlreadyConfigured));
        let current = synth.get().unwrap();
        assert!(Arc::ptr_eq(&first, &current));
        assert_eq!(current.get("PORT"), Some(&Value::Integer(8000)));
    }

    #[test]
    fn test_missing_routing_source() {
        let synth = Synthesizer::new();
        let err = synth
            .synthesize(None, &Defaults::new().with("DEBUG", true), MapEnv::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoutingSource));

        let err = synth
            .synthesize(Some(urlconf("  ")), &Defaults::new(), MapEnv::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoutingSource));
    }

    #[test]
    fn test_routing_from_reserved_key() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new()
            .with(ROUTING_KEY, "shop.urls")
            .with("DEBUG", false);

        let config = synth.synthesize(None, &defaults, MapEnv::new()).unwrap();

        assert_eq!(config.routing().as_dotted_path(), Some("shop.urls"));
        assert!(config.contains(ROUTING_KEY));
        assert_eq!(config.get(ROUTING_KEY), None);
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn test_routing_is_never_forced() {
        let synth = Synthesizer::new();
        let routing = RoutingRef::deferred("routes", || vec!["^$"]);

        let config = synth
            .synthesize(Some(routing), &Defaults::new(), MapEnv::new())
            .unwrap();

        assert!(!config.routing().is_forced());
    }

    #[test]
    fn test_falsey_values_are_kept() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new().with("ALLOWED_HOSTS", vec!["localhost"]);
        let env = MapEnv::new().with("ALLOWED_HOSTS", "");

        let config = synth.synthesize(routes(), &defaults, env).unwrap();

        assert_eq!(config.get("ALLOWED_HOSTS"), Some(&Value::List(vec![])));
    }

    #[test]
    fn test_falsey_value_logs_one_warning() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new()
            .with("ALLOWED_HOSTS", vec!["localhost"])
            .with("DEBUG", true)
            .with("PORT", 8000);
        let env = MapEnv::new()
            .with("ALLOWED_HOSTS", "")
            .with("DEBUG", "false");

        let (config, logs) = capture_logs(|| synth.synthesize(routes(), &defaults, env));

        assert_eq!(config.unwrap().get("DEBUG"), Some(&Value::Bool(false)));
        let warnings = logs.at("WARN");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("config value ALLOWED_HOSTS="));
        assert!(warnings[0].contains("evaluates as falsey"));
    }

    #[test]
    fn test_false_boolean_is_not_warned() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new().with("DEBUG", false);

        let (config, logs) =
            capture_logs(|| synth.synthesize(routes(), &defaults, MapEnv::new()));

        assert_eq!(config.unwrap().get("DEBUG"), Some(&Value::Bool(false)));
        assert!(logs.at("WARN").is_empty());
    }

    #[test]
    fn test_null_example_logs_error_and_warning() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new().with("HANDLER", Value::Null);

        let (config, logs) =
            capture_logs(|| synth.synthesize(routes(), &defaults, MapEnv::new()));

        assert_eq!(config.unwrap().get("HANDLER"), Some(&Value::Null));
        assert_eq!(logs.at("ERROR").len(), 1);
        assert_eq!(logs.at("WARN").len(), 1);
    }

    #[test]
    fn test_keys_match_defaults_in_order() {
        let synth = Synthesizer::new();
        let defaults = Defaults::new()
            .with("Z", 1)
            .with("A", Value::Null)
            .with("M", Value::map([("x", "y")]));
        let env = MapEnv::new().with("M", "x=z,w=v").with("A", "ignored");

        let config = synth.synthesize(routes(), &defaults, env).unwrap();
        let names: Vec<&str> = config.iter().map(|(name, _)| name).collect();

        assert_eq!(names, ["Z", "A", "M"]);
        assert_eq!(config.get("A"), Some(&Value::Null));
        assert_eq!(config.get("M"), Some(&Value::map([("w", "v"), ("x", "z")])));
        assert!(!config.seen_env().contains("A"));
    }

    #[test]
    fn test_deserialize_into_struct() {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        struct Settings {
            debug: bool,
            port: u16,
            allowed_hosts: Vec<String>,
        }

        let synth = Synthesizer::new();
        let defaults = Defaults::new()
            .with("DEBUG", false)
            .with("PORT", 8000)
            .with("ALLOWED_HOSTS", vec!["localhost"]);
        let env = MapEnv::new().with("ALLOWED_HOSTS", "a.example,b.example");

        let settings: Settings = synth
            .synthesize(routes(), &defaults, env)
            .unwrap()
            .deserialize()
            .unwrap();

        assert!(!settings.debug);
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.allowed_hosts, ["a.example", "b.example"]);
    }
}
