//! Entry point resolution and application layout detection.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::debug;

use crate::Error;

/// Name carried by the program's main entry point.
pub const MAIN: &str = "main";

/// Sibling files or packages whose presence marks an application directory.
pub const APP_MARKERS: [&str; 6] = ["admin", "apps", "forms", "models", "views", "urls"];

const PACKAGE_INITS: [&str; 2] = ["__init__", "mod"];
const DEFAULT_EXTENSION: &str = "rs";

/// Identity of the code that starts the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    name: String,
    path: PathBuf,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// An entry point that is the program's main.
    pub fn main(path: impl Into<PathBuf>) -> Self {
        Self::new(MAIN, path)
    }

    /// Falls back to the running executable as the main entry point.
    pub fn from_current_exe() -> Option<Self> {
        std::env::current_exe().ok().map(Self::main)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_main(&self) -> bool {
        self.name == MAIN
    }
}

/// Captures the calling source file as an [`EntryPoint`].
///
/// `entry_point!()` names it after the calling module; `entry_point!(main)`
/// marks it as the program's main.
#[macro_export]
macro_rules! entry_point {
    () => {
        $crate::EntryPoint::new(module_path!(), file!())
    };
    (main) => {
        $crate::EntryPoint::main(file!())
    };
}

/// The resolved entry point and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupState {
    entry: EntryPoint,
    app_dir: PathBuf,
    app_parent: PathBuf,
    in_app: bool,
}

impl SetupState {
    /// Resolves the entry point's directory and checks it for an app layout.
    pub fn detect(entry: EntryPoint) -> Result<Self, Error> {
        let source = std::path::absolute(entry.path()).map_err(|source| Error::EntryPointPath {
            path: entry.path().to_path_buf(),
            source,
        })?;
        let app_dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| source.clone());
        let app_parent = app_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| app_dir.clone());
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or(DEFAULT_EXTENSION);
        let in_app = looks_like_app(&app_dir, extension);

        debug!(
            entry = entry.name(),
            app_dir = %app_dir.display(),
            in_app,
            "entry point resolved"
        );

        Ok(Self {
            entry,
            app_dir,
            app_parent,
            in_app,
        })
    }

    pub fn entry(&self) -> &EntryPoint {
        &self.entry
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn app_parent(&self) -> &Path {
        &self.app_parent
    }

    /// Whether the entry point sits inside a conventional application layout.
    pub fn in_app(&self) -> bool {
        self.in_app
    }
}

/// True if `dir` holds any marker as `<marker>.<ext>` or as a package
/// `<marker>/<init>.<ext>`.
pub fn looks_like_app(dir: &Path, extension: &str) -> bool {
    APP_MARKERS.iter().any(|marker| {
        dir.join(format!("{marker}.{extension}")).is_file()
            || PACKAGE_INITS
                .iter()
                .any(|init| dir.join(marker).join(format!("{init}.{extension}")).is_file())
    })
}

/// Resolves the [`SetupState`] once and caches it.
#[derive(Debug, Default)]
pub struct Setup {
    state: OnceLock<SetupState>,
}

impl Setup {
    pub const fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    /// Returns the cached state, resolving it on the first call.
    ///
    /// The first call uses `hint` when given and otherwise the running
    /// executable. Later calls ignore `hint`.
    pub fn resolve(&self, hint: Option<EntryPoint>) -> Result<&SetupState, Error> {
        if let Some(state) = self.state.get() {
            return Ok(state);
        }
        let entry = hint
            .or_else(EntryPoint::from_current_exe)
            .ok_or(Error::EntryPointUnresolvable)?;
        let state = SetupState::detect(entry)?;
        Ok(self.state.get_or_init(|| state))
    }

    pub fn state(&self) -> Option<&SetupState> {
        self.state.get()
    }
}

static PROCESS: Setup = Setup::new();

/// Resolves the process-wide [`SetupState`].
pub fn setup(hint: Option<EntryPoint>) -> Result<&'static SetupState, Error> {
    PROCESS.resolve(hint)
}

pub(crate) fn process_setup() -> &'static Setup {
    &PROCESS
}
