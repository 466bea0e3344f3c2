//! Factory catalog: implementation kind -> provider constructor.
//!
//! The catalog is what stands in for runtime type lookup. Hosts register a
//! factory per implementation kind at startup and hand the catalog to their
//! repositories; declarations then name kinds instead of types. Each entry
//! remembers which capability its factory produces, so resolving a kind
//! under the wrong capability is a runtime error rather than a bad cast.

use std::any::Any;
use std::sync::Arc;

use plugboard_types::error::ProviderError;

use crate::provider::Provider;

/// A shareable provider constructor for capability `P`.
pub type ProviderFactory<P: ?Sized> = Arc<dyn Fn() -> Box<P> + Send + Sync>;

struct CatalogEntry {
    kind: String,
    capability: &'static str,
    // Holds a `ProviderFactory<P>`; the downcast in `resolve` is the
    // capability check.
    factory: Box<dyn Any + Send + Sync>,
}

/// Registry of provider factories, keyed by implementation kind.
///
/// One catalog serves every capability in the process; the kind namespace
/// is shared. Typically built once at startup and passed around in an
/// `Arc`.
pub struct FactoryCatalog {
    entries: Vec<CatalogEntry>,
}

impl FactoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a factory for the given kind.
    ///
    /// If the kind is already registered, its entry is replaced in place,
    /// whatever capability it previously produced.
    pub fn register<P, F>(&mut self, kind: impl Into<String>, factory: F)
    where
        P: Provider + ?Sized + 'static,
        F: Fn() -> Box<P> + Send + Sync + 'static,
    {
        let factory: ProviderFactory<P> = Arc::new(factory);
        let entry = CatalogEntry {
            kind: kind.into(),
            capability: capability_name::<P>(),
            factory: Box::new(factory),
        };
        match self.entries.iter().position(|e| e.kind == entry.kind) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Builder-style [`register`](Self::register), for startup population.
    pub fn with<P, F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        P: Provider + ?Sized + 'static,
        F: Fn() -> Box<P> + Send + Sync + 'static,
    {
        self.register(kind, factory);
        self
    }

    /// Resolve a kind to its factory under capability `P`.
    ///
    /// # Errors
    ///
    /// `UnknownKind` (listing the registered kinds) if nothing is registered
    /// under `kind`; `CapabilityMismatch` if the entry produces a different
    /// capability than `P`.
    pub fn resolve<P>(&self, kind: &str) -> Result<ProviderFactory<P>, ProviderError>
    where
        P: Provider + ?Sized + 'static,
    {
        let Some(entry) = self.entries.iter().find(|e| e.kind == kind) else {
            return Err(ProviderError::UnknownKind {
                kind: kind.to_string(),
                available: self.entries.iter().map(|e| e.kind.clone()).collect(),
            });
        };
        match entry.factory.downcast_ref::<ProviderFactory<P>>() {
            Some(factory) => Ok(Arc::clone(factory)),
            None => Err(ProviderError::CapabilityMismatch {
                kind: kind.to_string(),
                expected: capability_name::<P>().to_string(),
                actual: entry.capability.to_string(),
            }),
        }
    }

    /// Whether a factory is registered under this kind.
    pub fn contains(&self, kind: &str) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// All registered kinds, in registration order.
    pub fn kinds(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.kind.as_str()).collect()
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FactoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FactoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryCatalog")
            .field("kinds", &self.kinds())
            .finish()
    }
}

// Unqualified capability name for error messages; `type_name` is stable
// enough here because the value is only ever shown to humans.
fn capability_name<P: ?Sized>() -> &'static str {
    let full = std::any::type_name::<P>();
    full.rsplit("::").next().unwrap_or(full)
}
