//! Load-time boundary auditing.
//!
//! A [`LoadPipeline`] is the extension point a host calls on every module load
//! attempt. The [`BoundaryMonitor`] observes those attempts and reports loads
//! whose candidate paths fall outside the sanctioned source roots. It never
//! handles or blocks a load.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, error};

/// What an observer did with a load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDecision {
    /// Resolution continues with the next observer.
    NotHandled,
    /// The observer resolved the module to this path.
    Resolved(PathBuf),
}

/// A hook consulted on every module load attempt.
pub trait LoadObserver: Send + Sync + fmt::Debug {
    fn observe(&self, module: &str, candidates: &[PathBuf]) -> LoadDecision;
}

/// Ordered observers plus the search roots modules are resolved from.
#[derive(Debug, Default)]
pub struct LoadPipeline {
    observers: RwLock<Vec<Arc<dyn LoadObserver>>>,
    search_roots: RwLock<Vec<PathBuf>>,
}

impl LoadPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an observer ahead of all existing ones.
    pub fn insert_first(&self, observer: Arc<dyn LoadObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, observer);
    }

    pub fn push(&self, observer: Arc<dyn LoadObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Prepends a search root. Returns `false` if it was already present.
    pub fn prepend_search_root(&self, root: impl Into<PathBuf>) -> bool {
        let root = root.into();
        let mut roots = self
            .search_roots
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if roots.contains(&root) {
            return false;
        }
        roots.insert(0, root);
        true
    }

    pub fn search_roots(&self) -> Vec<PathBuf> {
        self.search_roots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs a load attempt through the observers in order.
    ///
    /// Returns the first resolved path, or `None` when every observer passes.
    pub fn on_load(&self, module: &str, candidates: &[PathBuf]) -> Option<PathBuf> {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        observers
            .iter()
            .find_map(|observer| match observer.observe(module, candidates) {
                LoadDecision::Resolved(path) => Some(path),
                LoadDecision::NotHandled => None,
            })
    }
}

/// Path prefixes a load may come from without being reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanctionedRoots(Vec<PathBuf>);

impl SanctionedRoots {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut unique: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !unique.contains(&root) {
                unique.push(root);
            }
        }
        Self(unique)
    }

    /// Prefix match on whole path components.
    pub fn contains(&self, path: &Path) -> bool {
        self.0.iter().any(|root| path.starts_with(root))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Offence {
    module: String,
    candidates: String,
    app_root: String,
}

/// Reports module loads that reach outside the sanctioned roots.
///
/// Each distinct (module, candidate paths, app root) combination is logged
/// once at error level for the life of the monitor.
#[derive(Debug)]
pub struct BoundaryMonitor {
    app_root: PathBuf,
    roots: SanctionedRoots,
    already_warned: Mutex<HashSet<Offence>>,
}

impl BoundaryMonitor {
    /// Creates a monitor sanctioning `app_root` and every `host_roots` entry
    /// (framework install location, standard library location).
    pub fn new(
        app_root: impl Into<PathBuf>,
        host_roots: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let app_root = app_root.into();
        let roots = SanctionedRoots::new(std::iter::once(app_root.clone()).chain(host_roots));
        Self {
            app_root,
            roots,
            already_warned: Mutex::new(HashSet::new()),
        }
    }

    /// Installs a monitor as the first observer in `pipeline` and prepends
    /// `app_parent` to its search roots.
    pub fn register(
        pipeline: &LoadPipeline,
        app_root: impl Into<PathBuf>,
        app_parent: impl Into<PathBuf>,
        host_roots: impl IntoIterator<Item = PathBuf>,
    ) -> Arc<Self> {
        let monitor = Arc::new(Self::new(app_root, host_roots));
        pipeline.insert_first(Arc::clone(&monitor) as Arc<dyn LoadObserver>);

        let app_parent = app_parent.into();
        let added = pipeline.prepend_search_root(&app_parent);
        debug!(
            app_root = %monitor.app_root.display(),
            app_parent = %app_parent.display(),
            search_root_added = added,
            "boundary monitor registered"
        );
        monitor
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    pub fn sanctioned_roots(&self) -> &SanctionedRoots {
        &self.roots
    }

    /// Number of distinct offences reported so far.
    pub fn violations(&self) -> usize {
        self.already_warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl LoadObserver for BoundaryMonitor {
    fn observe(&self, module: &str, candidates: &[PathBuf]) -> LoadDecision {
        if candidates.iter().all(|path| self.roots.contains(path)) {
            return LoadDecision::NotHandled;
        }

        let offence = Offence {
            module: module.to_string(),
            candidates: candidates
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(":"),
            app_root: self.app_root.display().to_string(),
        };

        let mut warned = self
            .already_warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !warned.contains(&offence) {
            error!(
                module = %offence.module,
                candidates = %offence.candidates,
                app_root = %offence.app_root,
                "attempted import `{}` ({}) which is outside of {}",
                offence.module,
                offence.candidates,
                offence.app_root,
            );
            warned.insert(offence);
        }

        LoadDecision::NotHandled
    }
}
