//! Ordered, name-indexed provider collection.
//!
//! A `ProviderRegistry<P>` owns boxed providers of one capability `P`,
//! preserving the order they were added in (which, for configuration-driven
//! loads, is declaration order). Name lookups are ASCII-case-insensitive,
//! matching how provider names are written in configuration files.

use plugboard_types::error::ProviderError;
use plugboard_types::params::ProviderParams;

use crate::provider::Provider;

/// An ordered collection of providers indexed by instance name.
///
/// `P` is usually a capability trait object (`ProviderRegistry<dyn
/// CacheProvider>`); concrete types work too. Every member is initialized
/// and carries a unique, non-empty name.
pub struct ProviderRegistry<P: ?Sized> {
    providers: Vec<Box<P>>,
}

impl<P: Provider + ?Sized> ProviderRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a provider, initializing it first if nothing has yet.
    ///
    /// Auto-initialization runs with an empty name and no parameters, so an
    /// unnamed provider ends up named after its `kind()`.
    ///
    /// # Errors
    ///
    /// `DuplicateName` if a member already answers to the provider's name
    /// (case-insensitively); any error from the provider's own
    /// initialization. The registry is unchanged on error.
    pub fn add(&mut self, mut provider: Box<P>) -> Result<(), ProviderError> {
        if !provider.is_initialized() {
            provider.initialize("", ProviderParams::new())?;
        }
        if self.contains(provider.name()) {
            return Err(ProviderError::DuplicateName(provider.name().to_string()));
        }
        self.providers.push(provider);
        Ok(())
    }

    /// Look up a provider by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&P> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .map(|b| b.as_ref())
    }

    /// The provider at the given position in insertion order.
    pub fn get_index(&self, index: usize) -> Option<&P> {
        self.providers.get(index).map(|b| b.as_ref())
    }

    /// The first provider added, if any.
    pub fn first(&self) -> Option<&P> {
        self.get_index(0)
    }

    /// Whether a provider with this name is present, ignoring ASCII case.
    pub fn contains(&self, name: &str) -> bool {
        self.providers
            .iter()
            .any(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Remove a provider by name, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Box<P>> {
        let index = self
            .providers
            .iter()
            .position(|p| p.name().eq_ignore_ascii_case(name))?;
        Some(self.providers.remove(index))
    }

    /// Remove the provider at the given position, returning it.
    pub fn remove_at(&mut self, index: usize) -> Option<Box<P>> {
        if index < self.providers.len() {
            Some(self.providers.remove(index))
        } else {
            None
        }
    }

    /// Remove all providers.
    pub fn clear(&mut self) {
        self.providers.clear();
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// All member names, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Iterate over providers in insertion order.
    pub fn iter(&self) -> Iter<'_, P> {
        Iter {
            inner: self.providers.iter(),
        }
    }
}

impl<P: Provider + ?Sized> Default for ProviderRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Provider + ?Sized> std::fmt::Debug for ProviderRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl<'a, P: Provider + ?Sized> IntoIterator for &'a ProviderRegistry<P> {
    type Item = &'a P;
    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over registry members in insertion order.
pub struct Iter<'a, P: ?Sized> {
    inner: std::slice::Iter<'a, Box<P>>,
}

impl<'a, P: ?Sized> Iterator for Iter<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|b| b.as_ref())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<P: ?Sized> ExactSizeIterator for Iter<'_, P> {}
