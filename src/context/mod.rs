//! Startup context for a standalone service.

mod entry;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::boundary::{BoundaryMonitor, LoadPipeline};
use crate::config::{Defaults, EnvSource, ProcessEnv, ResolvedConfig, RoutingRef, Synthesizer};
use crate::Error;

pub use entry::{looks_like_app, setup, EntryPoint, Setup, SetupState, APP_MARKERS, MAIN};

/// Everything a service needs after startup: who started it, its resolved
/// configuration, and the module-load pipeline.
///
/// ## Example
///
/// ```no_run
/// use dragon_standalone::{entry_point, urlconf, Bootstrap, Defaults};
///
/// let app = Bootstrap::builder()
///     .with_entry_point(entry_point!(main))
///     .with_routing(urlconf("site.urls"))
///     .with_defaults(Defaults::new().with("DEBUG", false).with("PORT", 8000))
///     .build()?;
///
/// let port = app.config().get("PORT");
/// # Ok::<(), dragon_standalone::Error>(())
/// ```
#[derive(Debug)]
pub struct Bootstrap {
    setup: SetupState,
    config: Arc<ResolvedConfig>,
    pipeline: Arc<LoadPipeline>,
    monitor: Option<Arc<BoundaryMonitor>>,
}

impl Bootstrap {
    /// Creates a new builder for constructing a `Bootstrap`.
    pub fn builder() -> BootstrapBuilder {
        BootstrapBuilder::default()
    }

    pub fn setup(&self) -> &SetupState {
        &self.setup
    }

    pub fn config(&self) -> &Arc<ResolvedConfig> {
        &self.config
    }

    pub fn pipeline(&self) -> &Arc<LoadPipeline> {
        &self.pipeline
    }

    /// The boundary monitor, installed only for app-like layouts.
    pub fn monitor(&self) -> Option<&Arc<BoundaryMonitor>> {
        self.monitor.as_ref()
    }

    /// Whether the service was started as the program's main.
    pub fn is_main(&self) -> bool {
        self.setup.entry().is_main()
    }
}

/// Builder for constructing a [`Bootstrap`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct BootstrapBuilder {
    entry: Option<EntryPoint>,
    routing: Option<RoutingRef>,
    defaults: Defaults,
    host_roots: Vec<PathBuf>,
}

impl BootstrapBuilder {
    /// Names the entry point explicitly instead of using the running executable.
    pub fn with_entry_point(mut self, entry: EntryPoint) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn with_routing(mut self, routing: RoutingRef) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Replaces the declared options.
    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_option(
        mut self,
        name: impl Into<String>,
        example: impl Into<crate::Value>,
    ) -> Self {
        self.defaults.insert(name, example);
        self
    }

    /// Sanctions a root that loads may come from, such as the framework's
    /// install location or the standard library.
    pub fn with_sanctioned_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.host_roots.push(root.into());
        self
    }

    /// Runs startup against the process-wide state and environment.
    pub fn build(self) -> Result<Bootstrap, Error> {
        self.build_with(
            entry::process_setup(),
            crate::config::process_synthesizer(),
            ProcessEnv,
        )
    }

    /// Runs startup against explicit state and environment.
    ///
    /// Resolves the entry point, installs the boundary monitor when the entry
    /// point lives in an app layout, then synthesizes the configuration.
    pub fn build_with<S: EnvSource>(
        self,
        setup: &Setup,
        synthesizer: &Synthesizer,
        env: S,
    ) -> Result<Bootstrap, Error> {
        let state = setup.resolve(self.entry)?.clone();
        let pipeline = Arc::new(LoadPipeline::new());

        let monitor = state.in_app().then(|| {
            BoundaryMonitor::register(
                &pipeline,
                state.app_dir(),
                state.app_parent(),
                self.host_roots,
            )
        });

        let config = synthesizer.synthesize(self.routing, &self.defaults, env)?;
        let seen = config.seen_env();
        if !seen.is_empty() {
            info!(vars = %seen, "Read {seen} from environment variables");
        }

        Ok(Bootstrap {
            setup: state,
            config,
            pipeline,
            monitor,
        })
    }
}
