//! Lazily loading provider repository.
//!
//! `ProviderRepository<P>` is the piece application code holds onto: it
//! owns a section name, a section source, and a factory catalog, and on
//! first access loads the section's providers into a registry and picks the
//! default. The load settles exactly once, success or failure, for the life
//! of the repository.

use std::sync::{Arc, OnceLock};

use plugboard_types::error::ProviderError;

use crate::catalog::FactoryCatalog;
use crate::loader;
use crate::provider::Provider;
use crate::registry::ProviderRegistry;
use crate::source::SectionSource;

struct SectionBacking {
    source: Arc<dyn SectionSource>,
    catalog: Arc<FactoryCatalog>,
}

struct Loaded<P: ?Sized> {
    registry: ProviderRegistry<P>,
    default_name: Option<String>,
}

/// Thread-safe, lazily loaded collection of providers for one capability.
///
/// Construction is cheap and infallible for the configuration-driven
/// variants; the actual load happens on the first call to
/// [`provider`](Self::provider) or [`providers`](Self::providers) and its
/// outcome is permanent. Under strict mode (the default) a missing section or an
/// unresolvable default is an error; under lenient mode the repository
/// degrades to an empty registry or a first-member default instead.
pub struct ProviderRepository<P: ?Sized> {
    section_name: String,
    strict: bool,
    backing: Option<SectionBacking>,
    state: OnceLock<Result<Loaded<P>, ProviderError>>,
}

impl<P: Provider + ?Sized + 'static> ProviderRepository<P> {
    /// Repository that loads the named section strictly: a missing section
    /// or an unresolvable default provider fails the load.
    pub fn new(
        section_name: impl Into<String>,
        source: Arc<dyn SectionSource>,
        catalog: Arc<FactoryCatalog>,
    ) -> Self {
        Self::with_strictness(section_name, source, catalog, true)
    }

    /// Repository that tolerates a missing section (empty registry) and an
    /// unresolvable default (falls back to the first provider, or none).
    pub fn lenient(
        section_name: impl Into<String>,
        source: Arc<dyn SectionSource>,
        catalog: Arc<FactoryCatalog>,
    ) -> Self {
        Self::with_strictness(section_name, source, catalog, false)
    }

    fn with_strictness(
        section_name: impl Into<String>,
        source: Arc<dyn SectionSource>,
        catalog: Arc<FactoryCatalog>,
        strict: bool,
    ) -> Self {
        Self {
            section_name: section_name.into(),
            strict,
            backing: Some(SectionBacking { source, catalog }),
            state: OnceLock::new(),
        }
    }

    /// Repository wrapping a single pre-built provider, which becomes the
    /// default. No section source is consulted, ever.
    ///
    /// # Errors
    ///
    /// Whatever the provider's initialization raises, if it was not yet
    /// initialized.
    pub fn from_provider(provider: Box<P>) -> Result<Self, ProviderError> {
        let mut registry = ProviderRegistry::new();
        registry.add(provider)?;
        let default_name = registry.first().map(|p| p.name().to_string());

        let state = OnceLock::new();
        let _ = state.set(Ok(Loaded {
            registry,
            default_name,
        }));
        Ok(Self {
            section_name: String::new(),
            strict: true,
            backing: None,
            state,
        })
    }

    /// Repository wrapping a pre-built registry. No explicit default is
    /// recorded, so [`provider`](Self::provider) yields the first member.
    pub fn from_registry(registry: ProviderRegistry<P>) -> Self {
        let state = OnceLock::new();
        let _ = state.set(Ok(Loaded {
            registry,
            default_name: None,
        }));
        Self {
            section_name: String::new(),
            strict: true,
            backing: None,
            state,
        }
    }

    /// The default provider, loading the section on first call.
    ///
    /// Resolution order: the recorded default name, else the first member.
    /// `Ok(None)` only happens for lenient repositories that ended up
    /// empty.
    ///
    /// # Errors
    ///
    /// The settled load error, on this call and every later one.
    pub fn provider(&self) -> Result<Option<&P>, ProviderError> {
        let loaded = self.loaded()?;
        let provider = match &loaded.default_name {
            Some(name) => loaded.registry.get(name),
            None => loaded.registry.first(),
        };
        Ok(provider)
    }

    /// All loaded providers, loading the section on first call.
    ///
    /// # Errors
    ///
    /// The settled load error, on this call and every later one.
    pub fn providers(&self) -> Result<&ProviderRegistry<P>, ProviderError> {
        Ok(&self.loaded()?.registry)
    }

    /// The configuration section this repository loads from. Empty for
    /// repositories built from a provider or registry.
    pub fn section_name(&self) -> &str {
        &self.section_name
    }

    /// Whether the load has settled, successfully or not.
    pub fn is_loaded(&self) -> bool {
        self.state.get().is_some()
    }

    fn loaded(&self) -> Result<&Loaded<P>, ProviderError> {
        match self.state.get_or_init(|| self.load_section()) {
            Ok(loaded) => Ok(loaded),
            Err(err) => Err(err.clone()),
        }
    }

    // One-time load body; runs inside the OnceLock settlement.
    fn load_section(&self) -> Result<Loaded<P>, ProviderError> {
        let Some(backing) = &self.backing else {
            return Ok(Loaded {
                registry: ProviderRegistry::new(),
                default_name: None,
            });
        };

        let Some(section) = backing.source.section(&self.section_name) else {
            if self.strict {
                return Err(ProviderError::SectionNotFound(self.section_name.clone()));
            }
            tracing::warn!(
                section = %self.section_name,
                "Provider section not found, continuing with no providers"
            );
            return Ok(Loaded {
                registry: ProviderRegistry::new(),
                default_name: None,
            });
        };

        let registry = loader::instantiate_providers::<P>(&backing.catalog, &section.providers)?;

        let default_name = match section.declared_default() {
            Some(name) if registry.contains(name) => Some(name.to_string()),
            Some(name) => {
                if self.strict {
                    return Err(ProviderError::NoDefaultProvider(self.section_name.clone()));
                }
                tracing::warn!(
                    section = %self.section_name,
                    default = %name,
                    "Declared default provider not loaded, falling back to first"
                );
                registry.first().map(|p| p.name().to_string())
            }
            None => registry.first().map(|p| p.name().to_string()),
        };

        if self.strict && default_name.is_none() {
            return Err(ProviderError::NoDefaultProvider(self.section_name.clone()));
        }

        tracing::info!(
            section = %self.section_name,
            providers = registry.len(),
            default = default_name.as_deref().unwrap_or(""),
            "Loaded provider section"
        );

        Ok(Loaded {
            registry,
            default_name,
        })
    }
}

impl<P: ?Sized> std::fmt::Debug for ProviderRepository<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRepository")
            .field("section_name", &self.section_name)
            .field("strict", &self.strict)
            .field("loaded", &self.state.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderCore;
    use plugboard_types::params::ProviderParams;
    use plugboard_types::section::{ProviderDecl, ProviderSection};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // --- Capability trait and mock implementations ---

    trait CacheProvider: Provider + std::fmt::Debug {
        fn backend(&self) -> &'static str;
    }

    #[derive(Debug)]
    struct InMemoryCache {
        core: ProviderCore,
    }

    impl Provider for InMemoryCache {
        fn kind(&self) -> &'static str {
            "in-memory"
        }

        fn core(&self) -> &ProviderCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ProviderCore {
            &mut self.core
        }
    }

    impl CacheProvider for InMemoryCache {
        fn backend(&self) -> &'static str {
            "memory"
        }
    }

    #[derive(Debug)]
    struct RedisCache {
        core: ProviderCore,
    }

    impl Provider for RedisCache {
        fn kind(&self) -> &'static str {
            "redis"
        }

        fn core(&self) -> &ProviderCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ProviderCore {
            &mut self.core
        }
    }

    impl CacheProvider for RedisCache {
        fn backend(&self) -> &'static str {
            "redis"
        }
    }

    // Section source over a plain map, counting lookups.
    struct MapSource {
        sections: HashMap<String, ProviderSection>,
        calls: AtomicUsize,
    }

    impl MapSource {
        fn new(sections: Vec<(&str, ProviderSection)>) -> Arc<Self> {
            Arc::new(Self {
                sections: sections
                    .into_iter()
                    .map(|(name, section)| (name.to_string(), section))
                    .collect(),
                calls: AtomicUsize::new(0),
            })
        }

        fn lookups(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SectionSource for MapSource {
        fn section(&self, name: &str) -> Option<ProviderSection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sections.get(name).cloned()
        }
    }

    fn cache_catalog() -> Arc<FactoryCatalog> {
        Arc::new(
            FactoryCatalog::new()
                .with::<dyn CacheProvider, _>("in-memory", || {
                    Box::new(InMemoryCache {
                        core: ProviderCore::new(),
                    })
                })
                .with::<dyn CacheProvider, _>("redis", || {
                    Box::new(RedisCache {
                        core: ProviderCore::new(),
                    })
                }),
        )
    }

    fn section(default: Option<&str>, providers: Vec<ProviderDecl>) -> ProviderSection {
        ProviderSection {
            default_provider: default.map(str::to_string),
            providers,
        }
    }

    #[test]
    fn test_declared_default_is_selected() {
        let source = MapSource::new(vec![(
            "cache",
            section(
                Some("fast"),
                vec![
                    ProviderDecl::new("slow", "redis"),
                    ProviderDecl::new("fast", "in-memory"),
                ],
            ),
        )]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("cache", source.clone(), cache_catalog());

        let provider = repo.provider().unwrap().unwrap();
        assert_eq!(provider.name(), "fast");
        assert_eq!(provider.backend(), "memory");
        assert_eq!(repo.providers().unwrap().len(), 2);
    }

    #[test]
    fn test_first_declared_is_default_when_none_declared() {
        let source = MapSource::new(vec![(
            "cache",
            section(
                None,
                vec![
                    ProviderDecl::new("A", "in-memory"),
                    ProviderDecl::new("B", "in-memory").with_param("k", "v"),
                ],
            ),
        )]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("cache", source.clone(), cache_catalog());

        assert_eq!(repo.providers().unwrap().len(), 2);
        assert_eq!(repo.provider().unwrap().unwrap().name(), "A");
        let b = repo.providers().unwrap().get("B").unwrap();
        assert_eq!(b.params().get("k"), Some("v"));
    }

    #[test]
    fn test_default_name_matches_case_insensitively() {
        let source = MapSource::new(vec![(
            "cache",
            section(Some("FAST"), vec![ProviderDecl::new("fast", "in-memory")]),
        )]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("cache", source.clone(), cache_catalog());

        assert_eq!(repo.provider().unwrap().unwrap().name(), "fast");
    }

    #[test]
    fn test_strict_missing_section_fails() {
        let source = MapSource::new(vec![]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("absent", source.clone(), cache_catalog());

        let err = repo.providers().unwrap_err();
        match err {
            ProviderError::SectionNotFound(name) => assert_eq!(name, "absent"),
            other => panic!("expected SectionNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_lenient_missing_section_yields_empty() {
        let source = MapSource::new(vec![]);
        let repo = ProviderRepository::<dyn CacheProvider>::lenient(
            "absent",
            source.clone(),
            cache_catalog(),
        );

        assert!(repo.providers().unwrap().is_empty());
        assert!(repo.provider().unwrap().is_none());
    }

    #[test]
    fn test_strict_empty_section_has_no_default() {
        let source = MapSource::new(vec![("cache", section(None, vec![]))]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("cache", source.clone(), cache_catalog());

        let err = repo.provider().unwrap_err();
        match err {
            ProviderError::NoDefaultProvider(name) => assert_eq!(name, "cache"),
            other => panic!("expected NoDefaultProvider, got: {other:?}"),
        }
    }

    #[test]
    fn test_lenient_empty_section_is_fine() {
        let source = MapSource::new(vec![("cache", section(None, vec![]))]);
        let repo = ProviderRepository::<dyn CacheProvider>::lenient(
            "cache",
            source.clone(),
            cache_catalog(),
        );

        assert!(repo.providers().unwrap().is_empty());
        assert!(repo.provider().unwrap().is_none());
    }

    #[test]
    fn test_strict_unknown_declared_default_fails() {
        let source = MapSource::new(vec![(
            "cache",
            section(Some("ghost"), vec![ProviderDecl::new("real", "in-memory")]),
        )]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("cache", source.clone(), cache_catalog());

        assert!(matches!(
            repo.provider().unwrap_err(),
            ProviderError::NoDefaultProvider(_)
        ));
    }

    #[test]
    fn test_lenient_unknown_declared_default_falls_back_to_first() {
        let source = MapSource::new(vec![(
            "cache",
            section(
                Some("ghost"),
                vec![
                    ProviderDecl::new("a", "in-memory"),
                    ProviderDecl::new("b", "redis"),
                ],
            ),
        )]);
        let repo = ProviderRepository::<dyn CacheProvider>::lenient(
            "cache",
            source.clone(),
            cache_catalog(),
        );

        assert_eq!(repo.provider().unwrap().unwrap().name(), "a");
    }

    #[test]
    fn test_unknown_kind_propagates_from_loader() {
        let source = MapSource::new(vec![(
            "cache",
            section(None, vec![ProviderDecl::new("x", "ghost-kind")]),
        )]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("cache", source.clone(), cache_catalog());

        assert!(matches!(
            repo.providers().unwrap_err(),
            ProviderError::UnknownKind { .. }
        ));
    }

    #[test]
    fn test_load_runs_once() {
        let source = MapSource::new(vec![(
            "cache",
            section(None, vec![ProviderDecl::new("a", "in-memory")]),
        )]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("cache", source.clone(), cache_catalog());

        assert!(!repo.is_loaded());
        repo.providers().unwrap();
        repo.providers().unwrap();
        repo.provider().unwrap();
        assert!(repo.is_loaded());
        assert_eq!(source.lookups(), 1);
    }

    #[test]
    fn test_failed_load_is_terminal() {
        let source = MapSource::new(vec![]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("absent", source.clone(), cache_catalog());

        assert!(matches!(
            repo.provider().unwrap_err(),
            ProviderError::SectionNotFound(_)
        ));
        assert!(matches!(
            repo.provider().unwrap_err(),
            ProviderError::SectionNotFound(_)
        ));
        assert!(repo.is_loaded());
        assert_eq!(source.lookups(), 1);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let source = MapSource::new(vec![(
            "cache",
            section(
                None,
                vec![
                    ProviderDecl::new("a", "in-memory"),
                    ProviderDecl::new("b", "redis"),
                ],
            ),
        )]);
        let repo =
            ProviderRepository::<dyn CacheProvider>::new("cache", source.clone(), cache_catalog());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let provider = repo.provider().unwrap().unwrap();
                    assert_eq!(provider.name(), "a");
                    assert_eq!(repo.providers().unwrap().len(), 2);
                });
            }
        });

        assert_eq!(source.lookups(), 1);
    }

    #[test]
    fn test_from_provider_wraps_single_instance() {
        let mut provider = RedisCache {
            core: ProviderCore::new(),
        };
        let mut params = ProviderParams::new();
        params.insert("host", "localhost");
        provider.initialize("primary", params).unwrap();

        let repo = ProviderRepository::<dyn CacheProvider>::from_provider(Box::new(provider))
            .unwrap();

        assert!(repo.is_loaded());
        assert_eq!(repo.section_name(), "");
        let member = repo.provider().unwrap().unwrap();
        assert_eq!(member.name(), "primary");
        assert_eq!(member.params().get("host"), Some("localhost"));
        assert_eq!(repo.providers().unwrap().len(), 1);
    }

    #[test]
    fn test_from_provider_initializes_when_needed() {
        let provider = InMemoryCache {
            core: ProviderCore::new(),
        };
        let repo = ProviderRepository::<dyn CacheProvider>::from_provider(Box::new(provider))
            .unwrap();

        let member = repo.provider().unwrap().unwrap();
        assert!(member.is_initialized());
        assert_eq!(member.name(), "in-memory");
    }

    #[test]
    fn test_from_registry_defaults_to_first() {
        let mut registry: ProviderRegistry<dyn CacheProvider> = ProviderRegistry::new();
        let mut first = InMemoryCache {
            core: ProviderCore::new(),
        };
        first.initialize("first", ProviderParams::new()).unwrap();
        registry.add(Box::new(first)).unwrap();
        let mut second = RedisCache {
            core: ProviderCore::new(),
        };
        second.initialize("second", ProviderParams::new()).unwrap();
        registry.add(Box::new(second)).unwrap();

        let repo = ProviderRepository::from_registry(registry);
        assert_eq!(repo.section_name(), "");
        assert_eq!(repo.provider().unwrap().unwrap().name(), "first");
        assert_eq!(repo.providers().unwrap().names(), vec!["first", "second"]);
    }
}
