//! Tracing initialization for services built on this crate.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "DRAGON_LOG";

/// Installs a global fmt subscriber.
///
/// Reads filter directives from `DRAGON_LOG` (for example
/// `DRAGON_LOG=dragon_standalone=debug`), falling back to
/// `dragon_standalone=info`. Later calls do nothing.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("dragon_standalone=info"));

        // A host may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init();
    });
}
