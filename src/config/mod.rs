//! Typed configuration synthesized from environment variables.

mod coerce;
mod defaults;
mod env;
mod error;
mod file;
mod kind;
mod routing;
mod source;
mod synth;
mod value;

pub use defaults::Defaults;
pub use env::{SeenEnvKeys, TypedEnv};
pub use error::ConfigError;
pub use kind::{classify, Opaque, ValueKind};
pub use routing::{urlconf, RoutingRef, ROUTING_KEY};
pub use source::{EnvSource, MapEnv, ProcessEnv};
pub use synth::{configure, configured, ResolvedConfig, Synthesizer};
pub use value::Value;

pub(crate) use synth::process_synthesizer;
