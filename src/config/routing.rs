//! Deferred references to a routing table.
//!
//! The configuration core stores and forwards a [`RoutingRef`] but never
//! forces it; the web framework that consumes the resolved configuration does.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Reserved option key under which the routing source travels.
pub const ROUTING_KEY: &str = "ROOT_URLCONF";

type Routes = Box<dyn Any + Send + Sync>;
type Factory = dyn Fn() -> Routes + Send + Sync;

#[derive(Clone)]
enum Target {
    DottedPath,
    Deferred {
        factory: Arc<Factory>,
        cache: Arc<OnceLock<Routes>>,
    },
}

/// An opaque, lazily evaluated routing source.
#[derive(Clone)]
pub struct RoutingRef {
    label: String,
    target: Target,
}

impl RoutingRef {
    /// A routing table named by a dotted path, resolved by the framework.
    pub fn dotted_path(path: impl Into<String>) -> Self {
        Self {
            label: path.into(),
            target: Target::DottedPath,
        }
    }

    /// A routing table produced by `factory` on first use.
    pub fn deferred<F, T>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        Self {
            label: name.into(),
            target: Target::Deferred {
                factory: Arc::new(move || Box::new(factory()) as Routes),
                cache: Arc::new(OnceLock::new()),
            },
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The dotted path, if this reference was created from one.
    pub fn as_dotted_path(&self) -> Option<&str> {
        match self.target {
            Target::DottedPath => Some(&self.label),
            Target::Deferred { .. } => None,
        }
    }

    /// Evaluates the factory once and downcasts the cached routing table.
    ///
    /// Returns `None` for dotted paths or when `T` is not the produced type.
    pub fn force<T: Any>(&self) -> Option<&T> {
        match &self.target {
            Target::DottedPath => None,
            Target::Deferred { factory, cache } => {
                cache.get_or_init(|| factory()).downcast_ref::<T>()
            }
        }
    }

    pub fn is_forced(&self) -> bool {
        match &self.target {
            Target::DottedPath => false,
            Target::Deferred { cache, .. } => cache.get().is_some(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.label.trim().is_empty()
    }
}

/// Shorthand for [`RoutingRef::dotted_path`].
pub fn urlconf(dotted_path: impl Into<String>) -> RoutingRef {
    RoutingRef::dotted_path(dotted_path)
}

impl fmt::Display for RoutingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Target::DottedPath => write!(f, "urlconf('{}')", self.label),
            Target::Deferred { .. } => write!(f, "{}()", self.label),
        }
    }
}

impl fmt::Debug for RoutingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingRef")
            .field("label", &self.label)
            .field("forced", &self.is_forced())
            .finish()
    }
}
