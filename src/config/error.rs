use std::path::PathBuf;
use thiserror::Error;

use super::kind::ValueKind;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("configuration has already been synthesized for this process")]
    AlreadyConfigured,

    #[error("a routing source is required: pass one or set ROOT_URLCONF to a dotted path")]
    MissingRoutingSource,

    #[error("environment variable {name} = {raw:?} is not a valid {kind}")]
    Coercion {
        name: String,
        kind: ValueKind,
        raw: String,
    },

    #[error("required defaults file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read defaults file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse defaults file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] serde_json::Error),
}
