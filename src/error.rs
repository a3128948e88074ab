use std::path::PathBuf;

use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the dragon-standalone library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot determine entry point")]
    EntryPointUnresolvable,

    #[error("failed to resolve entry point path '{path}': {source}")]
    EntryPointPath {
        path: PathBuf,
        source: std::io::Error,
    },
}
