pub mod boundary;
pub mod config;
pub mod context;
mod error;
pub mod logging;

#[cfg(test)]
mod test_support;

pub use boundary::{BoundaryMonitor, LoadDecision, LoadObserver, LoadPipeline, SanctionedRoots};
pub use config::{
    configure, urlconf, ConfigError, Defaults, ResolvedConfig, RoutingRef, Value, ValueKind,
};
pub use context::{setup, Bootstrap, BootstrapBuilder, EntryPoint, SetupState};
pub use error::Error;
